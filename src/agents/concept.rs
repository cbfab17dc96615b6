//! Concept Agent
//!
//! Interprets the user's free-text request plus the detected subject type
//! into a grounded creative brief. Runs once per pipeline invocation.

use crate::llm::{CompletionOptions, LLM};
use crate::models::{ConceptBrief, SubjectType};
use crate::resolver::{AgentRole, ModelResolver};
use crate::types::AppResult;

const CONCEPT_SYSTEM: &str = r#"You are a pack concept interpreter. Interpret the user request and context into a clear, grounded pack concept.

You define: the theme of the day; the emotional range; the type of situations (not poses); visual anchors that downstream agents can execute safely.

Core Rules:
- One day, one theme.
- Think in moments people actually remember, not activities.
- Avoid abstract moods; prefer concrete situations.
- subject_type must strictly match the photo: single_male | single_female | couple | unknown.
- Never suggest couple dynamics for a single-subject photo.
- visual_anchors (2–4 items) are mandatory: how the theme is visually recognizable (clothing/vibe, light, simple cues). Stickers require minimal visuals.

Human Imperfection (MANDATORY):
Include at least one subtle human tension or imperfection in the concept: confusion, hesitation, emotional mismatch, mild disappointment, or social awkwardness. This is not drama. This is everyday human friction.

Do NOT: Describe poses or scenes. Describe appearance. Solve awkwardness — only allow it to exist.

Goal: Give Boss a concept that already contains emotional unevenness, so the pack cannot become postcard-perfect by default.

Output strict JSON with keys: subject_type, setting, persona, tone, timeline (always "one_day"), situation_types (array of 3-5 concrete situations, not emotions), shareability_hook (one phrase), title_hint (suggested pack title), visual_anchors (array of 2-4 strings)."#;

pub struct ConceptAgent;

impl ConceptAgent {
    pub async fn run(
        llm: &LLM,
        resolver: &dyn ModelResolver,
        request: &str,
        subject_type: SubjectType,
    ) -> AppResult<ConceptBrief> {
        let model = resolver.resolve(AgentRole::Concept);
        let user_message = format!(
            "User request: {request}\n\nPhoto context (subject_type): {subject_type}\n\nOutput the brief as JSON."
        );
        llm.chat_json(&model, CONCEPT_SYSTEM, &user_message, CompletionOptions::default())
            .await
    }
}
