// Per-agent model resolution
//
// Each agent role maps to a config key in the external key-value store; the
// value is a model id (e.g. gpt-4o-mini). An unset or blank value falls back
// to the hardcoded default for that role.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentRole {
    Concept,
    Boss,
    Captions,
    Scenes,
    Critic,
}

impl AgentRole {
    /// Config key for this role in the external store.
    pub fn config_key(&self) -> &'static str {
        match self {
            AgentRole::Concept => "pack_openai_model_concept",
            AgentRole::Boss => "pack_openai_model_boss",
            AgentRole::Captions => "pack_openai_model_captions",
            AgentRole::Scenes => "pack_openai_model_scenes",
            AgentRole::Critic => "pack_openai_model_critic",
        }
    }

    /// Model used when the store has no value for this role.
    pub fn default_model(&self) -> &'static str {
        match self {
            AgentRole::Concept => "gpt-4.1",
            AgentRole::Boss => "gpt-4.1",
            AgentRole::Captions => "gpt-4.1",
            AgentRole::Scenes => "gpt-4.1-vision",
            AgentRole::Critic => "gpt-3.5-turbo",
        }
    }
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AgentRole::Concept => "concept",
            AgentRole::Boss => "boss",
            AgentRole::Captions => "captions",
            AgentRole::Scenes => "scenes",
            AgentRole::Critic => "critic",
        };
        write!(f, "{name}")
    }
}

/// Model lookup seam. Resolved once per agent invocation; implementations
/// must fall back to `role.default_model()` for unset or blank values.
pub trait ModelResolver: Send + Sync {
    fn resolve(&self, role: AgentRole) -> String;
}

/// Resolver backed by environment variables: the role's config key,
/// uppercased (e.g. `PACK_OPENAI_MODEL_CONCEPT`).
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvModelResolver;

impl ModelResolver for EnvModelResolver {
    fn resolve(&self, role: AgentRole) -> String {
        let key = role.config_key().to_uppercase();
        match std::env::var(&key) {
            Ok(value) if !value.trim().is_empty() => value.trim().to_string(),
            _ => role.default_model().to_string(),
        }
    }
}
