//! Captions Agent
//!
//! Writes nine short first-person captions (RU + EN) for the plan's moments.
//! Supports full regeneration with critic feedback attached, and a partial
//! mode that regenerates only the flagged positions.

use crate::llm::{CompletionOptions, LLM};
use crate::models::{BossPlan, CaptionsOutput, CriticFeedbackContext};
use crate::resolver::{AgentRole, ModelResolver};
use crate::types::AppResult;

const CAPTIONS_SYSTEM: &str = r#"You are a caption writer for sticker packs. Write short captions users would actually send in a private chat.

Captions are: inner reactions, admissions, replies to messages. NOT descriptions of actions.

Hard Rules:
- First-person only. 15–20 characters max (hard limit). No emojis. No narration. No explanations.
- Strict order: moments[0] → moments[8].
- FORBIDDEN: action descriptions, stage directions, screenplay tone.

Preferred Tone (IMPORTANT): Slight self-irony is preferred over positivity. If a caption sounds like something you would say confidently out loud, rewrite it as something you would admit privately in a chat.

For Awkward Moments: Confusion beats confidence. Honesty beats optimism. Quiet resignation beats enthusiasm.

Avoid: Postcard-style phrasing. Motivational tone. "Everything is great" energy.

Goal: Captions should feel like messages people hesitate to send — and then send anyway.

Output strict JSON with keys: labels (array of 9 strings, RU), labels_en (array of 9 strings, EN)."#;

const REWORK_REMINDER: &str = "CRITICAL: Write only what the sender would send in a chat as a sticker. No narration, no description of actions (e.g. no 'докладываю', 'записываю', 'reactions received').";

pub struct CaptionsAgent;

impl CaptionsAgent {
    /// Generate the full caption set. With feedback attached, the prompt also
    /// carries the critic's reasons, the rejected labels, and the suggestions.
    pub async fn run(
        llm: &LLM,
        resolver: &dyn ModelResolver,
        plan: &BossPlan,
        feedback: Option<&CriticFeedbackContext>,
    ) -> AppResult<CaptionsOutput> {
        let model = resolver.resolve(AgentRole::Captions);
        let mut user_message = format!(
            "Plan:\n{}\n\nOutput labels and labels_en as JSON.",
            serde_json::to_string_pretty(plan)?
        );
        if let Some(feedback) = feedback.filter(|f| !f.is_empty()) {
            user_message.push_str("\n\n");
            user_message.push_str(&feedback_sections(feedback).join("\n\n"));
        }
        llm.chat_json(&model, CAPTIONS_SYSTEM, &user_message, CompletionOptions::default())
            .await
    }

    /// Regenerate only the captions at the given 0-based positions. The
    /// returned arrays are sized to `indices.len()` and ordered like
    /// `indices`; splicing them back into the pack is the caller's job.
    pub async fn run_for_indices(
        llm: &LLM,
        resolver: &dyn ModelResolver,
        plan: &BossPlan,
        feedback: &CriticFeedbackContext,
        indices: &[usize],
    ) -> AppResult<CaptionsOutput> {
        let model = resolver.resolve(AgentRole::Captions);
        let mut user_message = format!(
            "Plan:\n{}\n\n{}",
            serde_json::to_string_pretty(plan)?,
            partial_request(plan, indices, "captions", "labels and labels_en"),
        );
        if !feedback.is_empty() {
            user_message.push_str("\n\n");
            user_message.push_str(&feedback_sections(feedback).join("\n\n"));
        }
        let mut output: CaptionsOutput = llm
            .chat_json(&model, CAPTIONS_SYSTEM, &user_message, CompletionOptions::default())
            .await?;
        output.labels.truncate(indices.len());
        output.labels_en.truncate(indices.len());
        Ok(output)
    }
}

fn feedback_sections(feedback: &CriticFeedbackContext) -> Vec<String> {
    let mut parts = vec![REWORK_REMINDER.to_string()];
    if let Some(reasons) = feedback.reasons.as_ref().filter(|r| !r.is_empty()) {
        parts.push(format!(
            "Critic reasons (what was wrong):\n{}",
            reasons.join("\n")
        ));
    }
    if let Some(previous) = feedback.previous_spec.as_ref() {
        if !previous.labels.is_empty() || !previous.labels_en.is_empty() {
            parts.push(format!(
                "Previous version (rejected — improve this):\nlabels (RU): {}\nlabels_en (EN): {}",
                serde_json::to_string(&previous.labels).unwrap_or_default(),
                serde_json::to_string(&previous.labels_en).unwrap_or_default(),
            ));
        }
    }
    if !feedback.suggestions.is_empty() {
        parts.push(format!(
            "Critic suggestions (apply these fixes):\n{}",
            feedback.suggestions.join("\n")
        ));
    }
    parts
}

/// Shared phrasing for targeted rework: name the 1-based positions (the
/// critic speaks 1-based) and pin the output size to the request.
pub(crate) fn partial_request(
    plan: &BossPlan,
    indices: &[usize],
    item_kind: &str,
    output_keys: &str,
) -> String {
    let positions = indices
        .iter()
        .map(|i| (i + 1).to_string())
        .collect::<Vec<_>>()
        .join(", ");
    let mut lines = vec![format!(
        "Rework request: regenerate ONLY the {item_kind} at positions {positions} (1-based). Keep every other position untouched."
    )];
    for &i in indices {
        if let Some(moment) = plan.moments.get(i) {
            lines.push(format!("{}. {}", i + 1, moment));
        }
    }
    lines.push(format!(
        "Output {output_keys} as JSON arrays with exactly {} entries each, one per requested position, in the same order as listed.",
        indices.len()
    ));
    lines.join("\n")
}
