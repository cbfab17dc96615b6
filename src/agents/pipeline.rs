//! Pipeline Orchestrator
//!
//! Sequences the agent chain, runs the captions/scenes pair concurrently,
//! and drives the bounded critic loop. On rejection the critic's feedback is
//! parsed for item indices so only the flagged captions/scenes are
//! regenerated; everything else is carried over by position.

use crate::agents::boss::BossAgent;
use crate::agents::captions::CaptionsAgent;
use crate::agents::concept::ConceptAgent;
use crate::agents::critic::CriticAgent;
use crate::agents::scenes::ScenesAgent;
use crate::assemble::assemble_spec;
use crate::feedback::parse_feedback_indices;
use crate::llm::LLM;
use crate::models::{
    BossPlan, CaptionsOutput, CriticFeedbackContext, CriticOutput, PackGenerationResult,
    PackSpecRow, PipelineStage, ScenesOutput, SubjectType,
};
use crate::resolver::ModelResolver;
use crate::types::AppResult;
use futures::future::BoxFuture;
use std::future::Future;
use std::time::Instant;
use tracing::{debug, error, info};

/// Per-stage progress callback; awaited before the pipeline proceeds.
pub type ProgressCallback = Box<dyn Fn(PipelineStage) -> BoxFuture<'static, ()> + Send + Sync>;

const DEFAULT_MAX_CRITIC_ITERATIONS: usize = 2;

// Partial rework only pays off for a proper subset of the pack; a critic
// that flags most positions gets a full regeneration instead.
const MAX_PARTIAL_INDICES: usize = 6;

pub struct PipelineOptions {
    pub max_critic_iterations: usize,
    pub on_progress: Option<ProgressCallback>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            max_critic_iterations: DEFAULT_MAX_CRITIC_ITERATIONS,
            on_progress: None,
        }
    }
}

/// Result of a single manual rework cycle.
#[derive(Debug, Clone)]
pub struct ReworkOutcome {
    pub spec: PackSpecRow,
    pub critic: CriticOutput,
}

/// Run the full pipeline: Concept → Boss → (Captions ∥ Scenes) → Assembly →
/// Critic, reworking on rejection up to `max_critic_iterations`.
///
/// Never returns an error: any stage failure is converted into
/// `{ok: false, error}` so callers don't handle exceptions from the entry
/// point. Persistence is the caller's job.
pub async fn run_pack_generation_pipeline(
    llm: &LLM,
    resolver: &dyn ModelResolver,
    request: &str,
    subject_type: SubjectType,
    options: PipelineOptions,
) -> PackGenerationResult {
    match run_pipeline_inner(llm, resolver, request, subject_type, &options).await {
        Ok(result) => result,
        Err(err) => {
            error!(error = %err, "Pack pipeline aborted");
            PackGenerationResult::failure(err.to_string())
        }
    }
}

async fn run_pipeline_inner(
    llm: &LLM,
    resolver: &dyn ModelResolver,
    request: &str,
    subject_type: SubjectType,
    options: &PipelineOptions,
) -> AppResult<PackGenerationResult> {
    let max_iterations = options.max_critic_iterations;

    let started = Instant::now();
    let brief = wrap_stage(
        PipelineStage::Concept,
        ConceptAgent::run(llm, resolver, request, subject_type),
    )
    .await?;
    info!(stage = %PipelineStage::Concept, elapsed_ms = started.elapsed().as_millis() as u64, "Stage done");
    report_progress(&options.on_progress, PipelineStage::Concept).await;

    let started = Instant::now();
    let plan = wrap_stage(PipelineStage::Boss, BossAgent::run(llm, resolver, &brief)).await?;
    info!(stage = %PipelineStage::Boss, elapsed_ms = started.elapsed().as_millis() as u64, "Stage done");
    report_progress(&options.on_progress, PipelineStage::Boss).await;

    let started = Instant::now();
    let (captions_result, scenes_result) = tokio::join!(
        CaptionsAgent::run(llm, resolver, &plan, None),
        ScenesAgent::run(llm, resolver, &plan, None),
    );
    let mut captions = captions_result.map_err(|e| e.at_stage(PipelineStage::Captions))?;
    let mut scenes = scenes_result.map_err(|e| e.at_stage(PipelineStage::Scenes))?;
    info!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Captions and scenes done"
    );
    report_progress(&options.on_progress, PipelineStage::Captions).await;
    report_progress(&options.on_progress, PipelineStage::Scenes).await;

    let mut spec = assemble_spec(&plan, &captions, &scenes);

    for iteration in 0..max_iterations {
        let critic_stage = if iteration == 0 {
            PipelineStage::Critic
        } else {
            PipelineStage::Critic2
        };

        debug!(
            iteration = iteration + 1,
            max_label_len_ru = spec.labels.iter().map(|l| l.chars().count()).max().unwrap_or(0),
            max_label_len_en = spec.labels_en.iter().map(|l| l.chars().count()).max().unwrap_or(0),
            sample_ru = spec.labels.first().map(String::as_str).unwrap_or(""),
            "Submitting spec to critic"
        );

        let started = Instant::now();
        let critic = wrap_stage(critic_stage, CriticAgent::run(llm, resolver, &spec)).await?;
        info!(
            stage = %critic_stage,
            iteration = iteration + 1,
            pass = critic.pass,
            reasons = ?critic.reasons,
            suggestions = ?critic.suggestions,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Critic verdict"
        );
        report_progress(&options.on_progress, critic_stage).await;

        if critic.pass {
            return Ok(PackGenerationResult::success(spec, plan));
        }
        if iteration == max_iterations - 1 {
            return Ok(PackGenerationResult::rejected(
                spec,
                plan,
                critic.reasons,
                critic.suggestions,
            ));
        }

        let feedback = CriticFeedbackContext {
            suggestions: critic.suggestions.clone(),
            reasons: Some(critic.reasons.clone()),
            previous_spec: Some(spec.clone()),
        };
        let indices = parse_feedback_indices(&critic.reasons, &critic.suggestions);

        let started = Instant::now();
        let (captions_result, scenes_result) = tokio::join!(
            rework_captions(llm, resolver, &plan, &feedback, &indices.captions, &captions),
            rework_scenes(llm, resolver, &plan, &feedback, &indices.scenes, &scenes),
        );
        captions = captions_result.map_err(|e| e.at_stage(PipelineStage::CaptionsRework))?;
        scenes = scenes_result.map_err(|e| e.at_stage(PipelineStage::ScenesRework))?;
        info!(
            caption_indices = ?indices.captions,
            scene_indices = ?indices.scenes,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Rework done"
        );
        report_progress(&options.on_progress, PipelineStage::CaptionsRework).await;
        report_progress(&options.on_progress, PipelineStage::ScenesRework).await;

        spec = assemble_spec(&plan, &captions, &scenes);
    }

    // Only reachable when the loop never ran (max_critic_iterations == 0)
    Ok(PackGenerationResult::failure(
        "Critic did not pass after max iterations",
    ))
}

/// One manual rework cycle for callers that already hold a plan:
/// (Captions ∥ Scenes) → Assembly → Critic, outside the bounded loop.
pub async fn rework_one_iteration(
    llm: &LLM,
    resolver: &dyn ModelResolver,
    plan: &BossPlan,
    suggestions: Vec<String>,
    previous_spec: Option<PackSpecRow>,
    reasons: Option<Vec<String>>,
) -> AppResult<ReworkOutcome> {
    let feedback = CriticFeedbackContext {
        suggestions,
        reasons: reasons.filter(|r| !r.is_empty()),
        previous_spec,
    };
    let feedback_ref = (!feedback.is_empty()).then_some(&feedback);

    let (captions_result, scenes_result) = tokio::join!(
        CaptionsAgent::run(llm, resolver, plan, feedback_ref),
        ScenesAgent::run(llm, resolver, plan, feedback_ref),
    );
    let captions = captions_result?;
    let scenes = scenes_result?;

    let spec = assemble_spec(plan, &captions, &scenes);
    let critic = CriticAgent::run(llm, resolver, &spec).await?;
    info!(
        pass = critic.pass,
        reasons = ?critic.reasons,
        suggestions = ?critic.suggestions,
        "Rework critic verdict"
    );
    Ok(ReworkOutcome { spec, critic })
}

async fn wrap_stage<T>(
    stage: PipelineStage,
    fut: impl Future<Output = AppResult<T>>,
) -> AppResult<T> {
    fut.await.map_err(|e| e.at_stage(stage))
}

async fn report_progress(callback: &Option<ProgressCallback>, stage: PipelineStage) {
    if let Some(callback) = callback {
        callback(stage).await;
    }
}

fn is_partial(indices: &[usize]) -> bool {
    (1..=MAX_PARTIAL_INDICES).contains(&indices.len())
}

async fn rework_captions(
    llm: &LLM,
    resolver: &dyn ModelResolver,
    plan: &BossPlan,
    feedback: &CriticFeedbackContext,
    indices: &[usize],
    previous: &CaptionsOutput,
) -> AppResult<CaptionsOutput> {
    if is_partial(indices) {
        info!(indices = ?indices, "Partial captions rework");
        let partial = CaptionsAgent::run_for_indices(llm, resolver, plan, feedback, indices).await?;
        Ok(splice_captions(previous, &partial, indices))
    } else {
        CaptionsAgent::run(llm, resolver, plan, Some(feedback)).await
    }
}

async fn rework_scenes(
    llm: &LLM,
    resolver: &dyn ModelResolver,
    plan: &BossPlan,
    feedback: &CriticFeedbackContext,
    indices: &[usize],
    previous: &ScenesOutput,
) -> AppResult<ScenesOutput> {
    if is_partial(indices) {
        info!(indices = ?indices, "Partial scenes rework");
        let partial = ScenesAgent::run_for_indices(llm, resolver, plan, feedback, indices).await?;
        Ok(splice_scenes(previous, &partial, indices))
    } else {
        ScenesAgent::run(llm, resolver, plan, Some(feedback)).await
    }
}

// Partial results come back ordered like the requested indices; re-insert
// them into a copy of the previous arrays by position. Positions the
// previous output never had are dropped rather than invented.
fn splice_captions(
    previous: &CaptionsOutput,
    partial: &CaptionsOutput,
    indices: &[usize],
) -> CaptionsOutput {
    let mut merged = previous.clone();
    for (k, &i) in indices.iter().enumerate() {
        if let (Some(slot), Some(new)) = (merged.labels.get_mut(i), partial.labels.get(k)) {
            *slot = new.clone();
        }
        if let (Some(slot), Some(new)) = (merged.labels_en.get_mut(i), partial.labels_en.get(k)) {
            *slot = new.clone();
        }
    }
    merged
}

fn splice_scenes(previous: &ScenesOutput, partial: &ScenesOutput, indices: &[usize]) -> ScenesOutput {
    let mut merged = previous.clone();
    for (k, &i) in indices.iter().enumerate() {
        if let (Some(slot), Some(new)) = (
            merged.scene_descriptions.get_mut(i),
            partial.scene_descriptions.get(k),
        ) {
            *slot = new.clone();
        }
        if let (Some(slot), Some(new)) = (
            merged.scene_descriptions_ru.get_mut(i),
            partial.scene_descriptions_ru.get(k),
        ) {
            *slot = new.clone();
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LLMAdapter;
    use crate::resolver::AgentRole;
    use crate::types::{AppError, LLMRequest, LLMResponse, TokenUsage};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    struct FixedResolver;

    impl ModelResolver for FixedResolver {
        fn resolve(&self, role: AgentRole) -> String {
            role.default_model().to_string()
        }
    }

    /// Routes calls by system prompt so the captions/scenes join order does
    /// not matter, records every call, and scripts the critic verdicts.
    struct ScriptedAdapter {
        calls: Arc<Mutex<Vec<String>>>,
        critic_verdicts: Mutex<VecDeque<CriticOutput>>,
        fail_scenes: bool,
    }

    impl ScriptedAdapter {
        fn new(verdicts: Vec<CriticOutput>) -> (Self, Arc<Mutex<Vec<String>>>) {
            let calls = Arc::new(Mutex::new(vec![]));
            (
                Self {
                    calls: Arc::clone(&calls),
                    critic_verdicts: Mutex::new(verdicts.into()),
                    fail_scenes: false,
                },
                calls,
            )
        }

        fn reply(content: serde_json::Value) -> LLMResponse {
            LLMResponse {
                content: Some(content.to_string()),
                finish_reason: "stop".to_string(),
                refusal: None,
                usage: TokenUsage::default(),
            }
        }
    }

    fn fail_verdict(reasons: &[&str]) -> CriticOutput {
        CriticOutput {
            pass: false,
            reasons: reasons.iter().map(|s| s.to_string()).collect(),
            suggestions: vec!["сделай честнее".to_string()],
        }
    }

    fn pass_verdict() -> CriticOutput {
        CriticOutput {
            pass: true,
            reasons: vec![],
            suggestions: vec![],
        }
    }

    fn nine(prefix: &str) -> Vec<String> {
        (1..=9).map(|i| format!("{prefix} {i}")).collect()
    }

    #[async_trait]
    impl LLMAdapter for ScriptedAdapter {
        async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
            let system = &request.messages[0].content;
            let user = &request.messages[1].content;
            let partial = user.contains("Rework request:");

            if system.contains("pack concept interpreter") {
                self.calls.lock().unwrap().push("concept".to_string());
                return Ok(Self::reply(serde_json::json!({
                    "subject_type": "single_male",
                    "setting": "beach",
                    "persona": "easygoing guy",
                    "tone": "self-ironic",
                    "timeline": "one_day",
                    "situation_types": ["too early", "sand", "frisbee"],
                    "shareability_hook": "beach honesty",
                    "title_hint": "Beach Day",
                    "visual_anchors": ["swim shorts", "harsh light"]
                })));
            }
            if system.contains("sticker pack planner") {
                self.calls.lock().unwrap().push("boss".to_string());
                return Ok(Self::reply(serde_json::json!({
                    "id": "beach_day",
                    "pack_template_id": "single_v1",
                    "subject_mode": "single",
                    "name_ru": "Пляж",
                    "name_en": "Beach",
                    "carousel_description_ru": "Пляжный день",
                    "carousel_description_en": "A beach day",
                    "mood": "playful",
                    "sort_order": 120,
                    "segment_id": "leisure",
                    "story_arc": "morning to sunset",
                    "tone": "self-ironic",
                    "moments": (1..=9).map(|i| format!("moment {i}")).collect::<Vec<_>>()
                })));
            }
            if system.contains("caption writer") {
                let kind = if partial { "captions:partial" } else { "captions:full" };
                self.calls.lock().unwrap().push(kind.to_string());
                let (ru, en) = if partial {
                    (nine("NEW-RU"), nine("NEW-EN"))
                } else {
                    (nine("ру"), nine("en"))
                };
                return Ok(Self::reply(serde_json::json!({
                    "labels": ru,
                    "labels_en": en
                })));
            }
            if system.contains("scene writer") {
                if self.fail_scenes {
                    return Err(AppError::LlmApi("OpenAI request failed: boom".to_string()));
                }
                let kind = if partial { "scenes:partial" } else { "scenes:full" };
                self.calls.lock().unwrap().push(kind.to_string());
                let scenes = if partial {
                    nine("{subject} NEW")
                } else {
                    nine("{subject} scene")
                };
                return Ok(Self::reply(serde_json::json!({
                    "scene_descriptions": scenes
                })));
            }
            if system.contains("quality gate") {
                self.calls.lock().unwrap().push("critic".to_string());
                let verdict = self
                    .critic_verdicts
                    .lock()
                    .unwrap()
                    .pop_front()
                    .unwrap_or_else(pass_verdict);
                return Ok(Self::reply(serde_json::to_value(verdict).unwrap()));
            }
            panic!("unrecognized system prompt");
        }
    }

    fn count(calls: &[String], tag: &str) -> usize {
        calls.iter().filter(|c| c.as_str() == tag).count()
    }

    fn progress_recorder() -> (ProgressCallback, Arc<Mutex<Vec<PipelineStage>>>) {
        let stages = Arc::new(Mutex::new(vec![]));
        let recorded = Arc::clone(&stages);
        let callback: ProgressCallback = Box::new(move |stage| {
            let recorded = Arc::clone(&recorded);
            Box::pin(async move {
                recorded.lock().unwrap().push(stage);
            })
        });
        (callback, stages)
    }

    #[tokio::test]
    async fn test_full_run_passes_first_critic() {
        let (adapter, calls) = ScriptedAdapter::new(vec![pass_verdict()]);
        let llm = LLM::with_adapter(Box::new(adapter));
        let (callback, stages) = progress_recorder();

        let result = run_pack_generation_pipeline(
            &llm,
            &FixedResolver,
            "beach day with dog",
            SubjectType::SingleMale,
            PipelineOptions {
                max_critic_iterations: 2,
                on_progress: Some(callback),
            },
        )
        .await;

        assert!(result.ok);
        let spec = result.spec.unwrap();
        let plan = result.plan.unwrap();
        assert_eq!(result.pack_id.as_deref(), Some("beach_day"));
        assert_eq!(plan.id, "beach_day");
        assert_eq!(plan.moments.len(), 9);
        assert_eq!(spec.labels.len(), 9);
        assert_eq!(spec.labels_en.len(), 9);
        assert_eq!(spec.scene_descriptions.len(), 9);
        assert_eq!(spec.sticker_count, 9);

        let calls = calls.lock().unwrap();
        assert_eq!(count(&calls, "concept"), 1);
        assert_eq!(count(&calls, "boss"), 1);
        assert_eq!(count(&calls, "captions:full"), 1);
        assert_eq!(count(&calls, "scenes:full"), 1);
        // Pass on the first critic call means no further agent calls
        assert_eq!(count(&calls, "critic"), 1);
        assert_eq!(count(&calls, "captions:partial"), 0);

        assert_eq!(
            *stages.lock().unwrap(),
            vec![
                PipelineStage::Concept,
                PipelineStage::Boss,
                PipelineStage::Captions,
                PipelineStage::Scenes,
                PipelineStage::Critic,
            ]
        );
    }

    #[tokio::test]
    async fn test_rejection_on_last_iteration_keeps_spec() {
        let (adapter, calls) = ScriptedAdapter::new(vec![
            fail_verdict(&["подписи звучат как нарратив"]),
            fail_verdict(&["подписи всё ещё нарратив"]),
        ]);
        let llm = LLM::with_adapter(Box::new(adapter));
        let (callback, stages) = progress_recorder();

        let result = run_pack_generation_pipeline(
            &llm,
            &FixedResolver,
            "beach day",
            SubjectType::SingleFemale,
            PipelineOptions {
                max_critic_iterations: 2,
                on_progress: Some(callback),
            },
        )
        .await;

        assert!(!result.ok);
        assert_eq!(result.error.as_deref(), Some("Pack rejected by Critic"));
        assert!(result.spec.is_some());
        assert!(result.plan.is_some());
        assert_eq!(
            result.critic_reasons.unwrap(),
            vec!["подписи всё ещё нарратив"]
        );
        assert!(result.critic_suggestions.is_some());

        let calls = calls.lock().unwrap();
        assert_eq!(count(&calls, "critic"), 2);
        // "подписи" with no number parses to no indices, so rework is full
        assert_eq!(count(&calls, "captions:full"), 2);
        assert_eq!(count(&calls, "scenes:full"), 2);

        assert_eq!(
            *stages.lock().unwrap(),
            vec![
                PipelineStage::Concept,
                PipelineStage::Boss,
                PipelineStage::Captions,
                PipelineStage::Scenes,
                PipelineStage::Critic,
                PipelineStage::CaptionsRework,
                PipelineStage::ScenesRework,
                PipelineStage::Critic2,
            ]
        );
    }

    #[tokio::test]
    async fn test_partial_rework_touches_only_flagged_positions() {
        let (adapter, calls) = ScriptedAdapter::new(vec![
            fail_verdict(&["caption 3 is too long", "scene 7 breaks subject lock"]),
            pass_verdict(),
        ]);
        let llm = LLM::with_adapter(Box::new(adapter));

        let result = run_pack_generation_pipeline(
            &llm,
            &FixedResolver,
            "beach day",
            SubjectType::SingleMale,
            PipelineOptions::default(),
        )
        .await;

        assert!(result.ok);
        let spec = result.spec.unwrap();

        let mut expected_labels = nine("ру");
        expected_labels[2] = "NEW-RU 1".to_string();
        assert_eq!(spec.labels, expected_labels);

        let mut expected_labels_en = nine("en");
        expected_labels_en[2] = "NEW-EN 1".to_string();
        assert_eq!(spec.labels_en, expected_labels_en);

        let mut expected_scenes = nine("{subject} scene");
        expected_scenes[6] = "{subject} NEW 1".to_string();
        assert_eq!(spec.scene_descriptions, expected_scenes);

        let calls = calls.lock().unwrap();
        assert_eq!(count(&calls, "captions:partial"), 1);
        assert_eq!(count(&calls, "scenes:partial"), 1);
        assert_eq!(count(&calls, "captions:full"), 1);
        assert_eq!(count(&calls, "scenes:full"), 1);
    }

    #[tokio::test]
    async fn test_many_flagged_indices_fall_back_to_full_rework() {
        // One reason referencing 7 captions: more than the partial threshold
        let reason = (1..=7)
            .map(|i| format!("caption {i}"))
            .collect::<Vec<_>>()
            .join(", ")
            + " are all weak";
        let (adapter, calls) = ScriptedAdapter::new(vec![fail_verdict(&[&reason]), pass_verdict()]);
        let llm = LLM::with_adapter(Box::new(adapter));

        let result = run_pack_generation_pipeline(
            &llm,
            &FixedResolver,
            "beach day",
            SubjectType::SingleMale,
            PipelineOptions::default(),
        )
        .await;

        assert!(result.ok);
        let calls = calls.lock().unwrap();
        assert_eq!(count(&calls, "captions:partial"), 0);
        assert_eq!(count(&calls, "captions:full"), 2);
    }

    #[tokio::test]
    async fn test_scene_failure_aborts_whole_run() {
        let (mut adapter, _calls) = ScriptedAdapter::new(vec![]);
        adapter.fail_scenes = true;
        let llm = LLM::with_adapter(Box::new(adapter));

        let result = run_pack_generation_pipeline(
            &llm,
            &FixedResolver,
            "beach day",
            SubjectType::SingleMale,
            PipelineOptions::default(),
        )
        .await;

        assert!(!result.ok);
        let error = result.error.unwrap();
        assert!(error.starts_with("scenes: "), "unexpected error: {error}");
        // No partial spec survives a failed parallel stage
        assert!(result.spec.is_none());
        assert!(result.plan.is_none());
    }

    #[tokio::test]
    async fn test_zero_iterations_has_distinct_terminal_message() {
        let (adapter, calls) = ScriptedAdapter::new(vec![]);
        let llm = LLM::with_adapter(Box::new(adapter));

        let result = run_pack_generation_pipeline(
            &llm,
            &FixedResolver,
            "beach day",
            SubjectType::SingleMale,
            PipelineOptions {
                max_critic_iterations: 0,
                on_progress: None,
            },
        )
        .await;

        assert!(!result.ok);
        assert_eq!(
            result.error.as_deref(),
            Some("Critic did not pass after max iterations")
        );
        assert_eq!(count(&calls.lock().unwrap(), "critic"), 0);
    }

    #[tokio::test]
    async fn test_rework_one_iteration_runs_single_cycle() {
        let (adapter, calls) = ScriptedAdapter::new(vec![pass_verdict()]);
        let llm = LLM::with_adapter(Box::new(adapter));

        let plan = BossPlan {
            id: "beach_day".to_string(),
            pack_template_id: "single_v1".to_string(),
            subject_mode: crate::models::SubjectMode::Single,
            name_ru: "Пляж".to_string(),
            name_en: "Beach".to_string(),
            carousel_description_ru: String::new(),
            carousel_description_en: String::new(),
            mood: "playful".to_string(),
            sort_order: Some(120.0),
            segment_id: "leisure".to_string(),
            story_arc: String::new(),
            tone: String::new(),
            day_structure: None,
            moments: (1..=9).map(|i| format!("moment {i}")).collect(),
        };

        let outcome = rework_one_iteration(
            &llm,
            &FixedResolver,
            &plan,
            vec!["сделай короче".to_string()],
            None,
            None,
        )
        .await
        .unwrap();

        assert!(outcome.critic.pass);
        assert_eq!(outcome.spec.id, "beach_day");
        assert_eq!(outcome.spec.labels.len(), 9);

        let calls = calls.lock().unwrap();
        assert_eq!(count(&calls, "concept"), 0);
        assert_eq!(count(&calls, "boss"), 0);
        assert_eq!(count(&calls, "captions:full"), 1);
        assert_eq!(count(&calls, "scenes:full"), 1);
        assert_eq!(count(&calls, "critic"), 1);
    }

    #[test]
    fn test_splice_preserves_untouched_positions() {
        let previous = CaptionsOutput {
            labels: nine("ру"),
            labels_en: nine("en"),
        };
        let partial = CaptionsOutput {
            labels: vec!["X".to_string(), "Y".to_string()],
            labels_en: vec!["x".to_string(), "y".to_string()],
        };
        let merged = splice_captions(&previous, &partial, &[2, 5]);
        for (i, label) in merged.labels.iter().enumerate() {
            match i {
                2 => assert_eq!(label, "X"),
                5 => assert_eq!(label, "Y"),
                _ => assert_eq!(label, &format!("ру {}", i + 1)),
            }
        }
        assert_eq!(merged.labels_en[2], "x");
        assert_eq!(merged.labels_en[5], "y");
    }

    #[test]
    fn test_splice_ignores_positions_beyond_previous_length() {
        let previous = ScenesOutput {
            scene_descriptions: vec!["{subject} a".to_string(), "{subject} b".to_string()],
            scene_descriptions_ru: vec![],
        };
        let partial = ScenesOutput {
            scene_descriptions: vec!["{subject} new".to_string()],
            scene_descriptions_ru: vec![],
        };
        let merged = splice_scenes(&previous, &partial, &[8]);
        assert_eq!(merged.scene_descriptions.len(), 2);
        assert_eq!(merged.scene_descriptions[0], "{subject} a");
    }

    #[test]
    fn test_partial_threshold_bounds() {
        assert!(!is_partial(&[]));
        assert!(is_partial(&[0]));
        assert!(is_partial(&[0, 1, 2, 3, 4, 5]));
        assert!(!is_partial(&[0, 1, 2, 3, 4, 5, 6]));
    }
}
