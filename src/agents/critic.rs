//! Critic Agent
//!
//! Automated quality gate over the fully assembled spec. Rule enforcement
//! (counts, caption length, subject lock, consistency) lives in the prompt;
//! the core only bounds the feedback arrays.

use crate::llm::{CompletionOptions, LLM};
use crate::models::{CriticOutput, PackSpecRow};
use crate::resolver::{AgentRole, ModelResolver};
use crate::types::AppResult;

const CRITIC_SYSTEM: &str = r#"You are a strict quality gate for sticker packs. Check format, rules, and usability.

You must check: caption length and sendability; scene count and uniqueness; rule compliance; consistency across the pack.

Reject (pass=false) when:
- Captions: descriptive or narrative; exceed 15–20 characters; don't read like a real message; violate first-person or no-emojis rule.
- Scenes: break subject lock ({subject}); complex or noisy backgrounds; break one-day or environment consistency; fail visual variety or cut-out safety.

Taste Check (SOFT, NON-BLOCKING): If all moments or captions feel emotionally safe, polite, or postcard-like, add a suggestion encouraging more awkward, self-ironic, or risky moments. Do NOT fail the pack for this alone — use it as a taste improvement hint.

Feedback Rules: Be specific. Reference exact indices (e.g. "caption 4", "scene 7"). Suggest concrete fixes. Avoid vague creative advice. Write reasons and suggestions in Russian (на русском языке).

Goal: Protect both technical quality and emotional interest, without blocking valid but improvable packs.

Output strict JSON with keys: pass (boolean), reasons (array of strings, in Russian), suggestions (array of 1-3 strings, in Russian)."#;

const CRITIC_MAX_TOKENS: u32 = 8192;
const MAX_FEEDBACK_ITEMS: usize = 3;

pub struct CriticAgent;

impl CriticAgent {
    pub async fn run(llm: &LLM, resolver: &dyn ModelResolver, spec: &PackSpecRow) -> AppResult<CriticOutput> {
        let model = resolver.resolve(AgentRole::Critic);
        let user_message = format!(
            "Full pack spec:\n{}\n\nOutput pass, reasons, and suggestions as JSON.",
            serde_json::to_string_pretty(spec)?
        );
        let options = CompletionOptions {
            temperature: Some(1.0),
            max_tokens: Some(CRITIC_MAX_TOKENS),
        };
        let mut verdict: CriticOutput = llm
            .chat_json(&model, CRITIC_SYSTEM, &user_message, options)
            .await?;
        verdict.reasons.truncate(MAX_FEEDBACK_ITEMS);
        verdict.suggestions.truncate(MAX_FEEDBACK_ITEMS);
        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LLMAdapter;
    use crate::models::SubjectMode;
    use crate::types::{LLMRequest, LLMResponse, TokenUsage};
    use async_trait::async_trait;

    struct CannedAdapter {
        reply: String,
    }

    #[async_trait]
    impl LLMAdapter for CannedAdapter {
        async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
            assert_eq!(request.temperature, Some(1.0));
            assert!(request.messages[1].content.starts_with("Full pack spec:"));
            Ok(LLMResponse {
                content: Some(self.reply.clone()),
                finish_reason: "stop".to_string(),
                refusal: None,
                usage: TokenUsage::default(),
            })
        }
    }

    struct FixedResolver;

    impl ModelResolver for FixedResolver {
        fn resolve(&self, role: AgentRole) -> String {
            role.default_model().to_string()
        }
    }

    fn spec() -> PackSpecRow {
        PackSpecRow {
            id: "beach_day".to_string(),
            pack_template_id: "single_v1".to_string(),
            name_ru: "Пляж".to_string(),
            name_en: "Beach".to_string(),
            carousel_description_ru: String::new(),
            carousel_description_en: String::new(),
            labels: vec!["ну пляж".to_string(); 9],
            labels_en: vec!["beach then".to_string(); 9],
            scene_descriptions: vec!["{subject} chest-up".to_string(); 9],
            scene_descriptions_ru: None,
            sort_order: 200,
            is_active: true,
            mood: "playful".to_string(),
            sticker_count: 9,
            subject_mode: SubjectMode::Single,
            cluster: false,
            segment_id: "home".to_string(),
        }
    }

    #[tokio::test]
    async fn test_verdict_feedback_is_bounded() {
        let reply = serde_json::to_string(&serde_json::json!({
            "pass": false,
            "reasons": ["r1", "r2", "r3", "r4", "r5"],
            "suggestions": ["s1", "s2", "s3", "s4"]
        }))
        .unwrap();
        let llm = LLM::with_adapter(Box::new(CannedAdapter { reply }));
        let verdict = CriticAgent::run(&llm, &FixedResolver, &spec()).await.unwrap();
        assert!(!verdict.pass);
        assert_eq!(verdict.reasons.len(), 3);
        assert_eq!(verdict.suggestions.len(), 3);
    }

    #[tokio::test]
    async fn test_pass_verdict_with_empty_feedback() {
        let reply = r#"{"pass":true,"reasons":[],"suggestions":[]}"#.to_string();
        let llm = LLM::with_adapter(Box::new(CannedAdapter { reply }));
        let verdict = CriticAgent::run(&llm, &FixedResolver, &spec()).await.unwrap();
        assert!(verdict.pass);
        assert!(verdict.reasons.is_empty());
    }
}
