// Packsmith - multi-agent LLM pipeline for sticker pack content generation

pub mod agents;
pub mod assemble;
pub mod config;
pub mod feedback;
pub mod llm;
pub mod models;
pub mod resolver;
pub mod types;

// Re-exports for convenience
pub use agents::{run_pack_generation_pipeline, rework_one_iteration, PipelineOptions};
pub use config::Config;
pub use models::{PackGenerationResult, PackSpecRow, PipelineStage, SubjectType};
// Note: Import specific items from types module instead of glob to avoid name conflicts
// e.g., use packsmith::types::{LLMRequest, LLMResponse, AppResult};
