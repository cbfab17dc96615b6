//! Scenes Agent
//!
//! Writes one subject-locked visual sentence per moment for downstream image
//! generation. Takes only the plan, so it can run alongside the captions
//! agent.

use crate::llm::{CompletionOptions, LLM};
use crate::models::{BossPlan, CriticFeedbackContext, ScenesOutput};
use crate::resolver::{AgentRole, ModelResolver};
use crate::types::AppResult;
use tracing::warn;

const SCENES_SYSTEM: &str = r#"You are a scene writer for sticker image generation. Create clean visual descriptions for the SAME person from the reference photo across 9 different moments.

SUBJECT LOCK (CRITICAL):
- {subject} ALWAYS refers to the SAME real person from the input photo.
- Every scene description MUST start with {subject}. {subject} must appear EXACTLY ONCE per scene.
- Never replace {subject} with pronouns or descriptions. Never introduce additional people.
- You do NOT describe appearance. The reference photo defines how {subject} looks. You only describe pose, posture, gesture, gaze, and tension.
- If {subject} is missing, duplicated, or replaced — the output is invalid.

Controlled Exaggeration: Emotion must be expressed through body posture, imbalance or asymmetry, gesture and hand tension, pauses and frozen moments. Do NOT exaggerate facial features. Do NOT describe appearance, age, or traits.

Scene Variety Requirement (MANDATORY): Across the 9 scenes you MUST include:
- 1 scene with visible hesitation or doubt
- 1 scene with mild overreaction
- 1 scene built around awkward pause or frozen stillness
- 1 scene that feels slightly self-exposing or embarrassing
These scenes must remain visually imperfect. Do NOT beautify or neutralize them.

Anti-Postcard Execution: For awkward or imperfect scenes: allow imbalance, asymmetry, being caught mid-reaction, uncomfortable but relatable body language. Avoid confident, polished, or posed stances in these scenes.

Existing Rules (REQUIRED): Chest-up framing only. One day, one environment. Identity lock (no appearance description). Prop-safe: max 1 prop per scene, fully visible, centered. Background: plain, neutral wall, single-tone, soft gradient only — no interiors, furniture, streets, bokeh. 2–3 scenes with gaze into the camera. Clean cut-out friendly composition. No captions, quotes, speech, UI, signs in the description.

Scene Format: Each scene = one sentence. Start with {subject}, chest-up framing, one clear pose or body position, one contained action or pause. Example structure: "{subject} chest-up, torso slightly leaned back, hands frozen mid-gesture, subtle tension in shoulders".

Final Validation: Before outputting each scene check: (1) Sentence starts with {subject}? (2) {subject} exactly once? (3) Same person as reference? (4) Emotion by body, not appearance? (5) Clean cut-out friendly? If any "no" — rewrite.

Goal: 9 visually distinct, emotionally varied scenes that move the SAME person through awkward, human moments people recognize and want to share in private chats.

Output strict JSON with one key: scene_descriptions (array of 9 strings in English). Each string = one sentence. Every element must start with {subject}. No extra text outside the JSON."#;

const SCENES_MAX_TOKENS: u32 = 8192;
const PACK_SIZE: usize = 9;

pub struct ScenesAgent;

impl ScenesAgent {
    /// Generate the full scene set. With feedback attached, the prompt also
    /// carries the critic's reasons, the rejected scenes, and the suggestions.
    pub async fn run(
        llm: &LLM,
        resolver: &dyn ModelResolver,
        plan: &BossPlan,
        feedback: Option<&CriticFeedbackContext>,
    ) -> AppResult<ScenesOutput> {
        let model = resolver.resolve(AgentRole::Scenes);
        let mut user_message = format!(
            "Plan:\n{}\n\nOutput scene_descriptions as JSON.",
            serde_json::to_string_pretty(plan)?
        );
        if let Some(feedback) = feedback.filter(|f| !f.is_empty()) {
            user_message.push_str("\n\n");
            user_message.push_str(&feedback_sections(feedback).join("\n\n"));
        }
        let mut output: ScenesOutput = llm
            .chat_json(&model, SCENES_SYSTEM, &user_message, Self::options())
            .await?;
        if output.scene_descriptions.len() < PACK_SIZE {
            warn!(
                count = output.scene_descriptions.len(),
                "Scenes agent returned fewer than 9 descriptions"
            );
        }
        output.scene_descriptions.truncate(PACK_SIZE);
        output.scene_descriptions_ru.truncate(PACK_SIZE);
        Ok(output)
    }

    /// Regenerate only the scenes at the given 0-based positions; same
    /// contract as `CaptionsAgent::run_for_indices`.
    pub async fn run_for_indices(
        llm: &LLM,
        resolver: &dyn ModelResolver,
        plan: &BossPlan,
        feedback: &CriticFeedbackContext,
        indices: &[usize],
    ) -> AppResult<ScenesOutput> {
        let model = resolver.resolve(AgentRole::Scenes);
        let mut user_message = format!(
            "Plan:\n{}\n\n{}",
            serde_json::to_string_pretty(plan)?,
            super::captions::partial_request(plan, indices, "scenes", "scene_descriptions"),
        );
        if !feedback.is_empty() {
            user_message.push_str("\n\n");
            user_message.push_str(&feedback_sections(feedback).join("\n\n"));
        }
        let mut output: ScenesOutput = llm
            .chat_json(&model, SCENES_SYSTEM, &user_message, Self::options())
            .await?;
        output.scene_descriptions.truncate(indices.len());
        output.scene_descriptions_ru.truncate(indices.len());
        Ok(output)
    }

    fn options() -> CompletionOptions {
        CompletionOptions {
            temperature: None,
            max_tokens: Some(SCENES_MAX_TOKENS),
        }
    }
}

fn feedback_sections(feedback: &CriticFeedbackContext) -> Vec<String> {
    let mut parts = Vec::new();
    if let Some(reasons) = feedback.reasons.as_ref().filter(|r| !r.is_empty()) {
        parts.push(format!(
            "Critic reasons (what was wrong):\n{}",
            reasons.join("\n")
        ));
    }
    if let Some(previous) = feedback.previous_spec.as_ref() {
        if !previous.scene_descriptions.is_empty() {
            parts.push(format!(
                "Previous version (rejected — improve this):\nscene_descriptions: {}",
                serde_json::to_string(&previous.scene_descriptions).unwrap_or_default(),
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
