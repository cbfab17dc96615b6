//! Boss Agent
//!
//! Turns the concept brief into the pack plan: metadata plus exactly nine
//! distinct moments of one day. The plan is created once and stays read-only
//! through every critic iteration.

use crate::llm::{CompletionOptions, LLM};
use crate::models::{BossPlan, ConceptBrief};
use crate::resolver::{AgentRole, ModelResolver};
use crate::types::AppResult;
use tracing::info;

const BOSS_SYSTEM: &str = r#"You are a sticker pack planner. Turn the concept into a plan of exactly 9 distinct moments of one day.

Each moment must: be clearly different from the others; represent a recognizable human situation; fit the same day and environment.

Anti-Postcard Rule (CRITICAL):
At least 2 of the 9 moments must be clearly uncomfortable, self-exposing, mildly embarrassing, or socially imperfect. If a moment feels safe to post publicly without hesitation, it is NOT anti-postcard enough. Do NOT smooth, replace, or reframe these moments positively.

Planning Rules:
- Avoid a "perfect arc". A good day can include confusion, overreaction, or small failures.
- Balance energy: not all moments should feel confident or calm.
- moments must be exactly 9; each must differ by situation, not emotion. Forbidden: emotions ("happy", "angry"), states ("tired", "in love").

Do NOT: Repeat emotional beats. Turn awkward moments into jokes. Turn the pack into motivation or inspiration.

Goal: Create a structure where at least part of the pack feels private, imperfect, and emotionally real.

Output strict JSON with keys: id (snake_case slug), pack_template_id (e.g. couple_v1), subject_mode (single or multi), name_ru, name_en, carousel_description_ru, carousel_description_en, mood, sort_order (number), segment_id, story_arc (one phrase), tone, day_structure (optional array of 9), moments (array of exactly 9 strings)."#;

pub struct BossAgent;

impl BossAgent {
    pub async fn run(llm: &LLM, resolver: &dyn ModelResolver, brief: &ConceptBrief) -> AppResult<BossPlan> {
        let model = resolver.resolve(AgentRole::Boss);
        let user_message = format!(
            "Brief:\n{}\n\nOutput the pack plan as JSON.",
            serde_json::to_string_pretty(brief)?
        );
        let plan: BossPlan = llm
            .chat_json(&model, BOSS_SYSTEM, &user_message, CompletionOptions::default())
            .await?;
        info!(
            pack_id = %plan.id,
            moment_count = plan.moments.len(),
            "Pack plan generated"
        );
        Ok(plan)
    }
}
