//! Agent System
//!
//! This module contains the text-generation agents that produce sticker pack
//! content:
//!
//! - **Concept Agent**: interprets the user request into a creative brief
//! - **Boss Agent**: plans the pack (metadata + 9 moments of one day)
//! - **Captions Agent**: writes 9 chat-ready captions in RU and EN
//! - **Scenes Agent**: writes 9 subject-locked visual scene descriptions
//! - **Critic Agent**: pass/fail quality gate over the assembled spec
//!
//! ## Pipeline Overview
//!
//! ```text
//! User Request + SubjectType
//!      │
//!      ▼
//! ┌─────────────┐
//! │   Concept   │  → Creative brief
//! └─────────────┘
//!      │
//!      ▼
//! ┌─────────────┐
//! │    Boss     │  → Plan: 9 moments + metadata
//! └─────────────┘
//!      │
//!      ├──────────────┐
//!      ▼              ▼
//! ┌──────────┐  ┌──────────┐
//! │ Captions │  │  Scenes  │   (concurrent)
//! └──────────┘  └──────────┘
//!      │              │
//!      └──────┬───────┘
//!             ▼
//!       ┌──────────┐
//!       │ Assemble │  → PackSpecRow
//!       └──────────┘
//!             ▼
//!       ┌──────────┐     fail: rework flagged captions/scenes,
//!       │  Critic  │  ─────────reassemble, retry (bounded)
//!       └──────────┘
//!             │ pass
//!             ▼
//!        PackGenerationResult
//! ```

pub mod boss;
pub mod captions;
pub mod concept;
pub mod critic;
pub mod pipeline;
pub mod scenes;

// Re-export main components
pub use boss::BossAgent;
pub use captions::CaptionsAgent;
pub use concept::ConceptAgent;
pub use critic::CriticAgent;
pub use pipeline::{
    run_pack_generation_pipeline, rework_one_iteration, PipelineOptions, ProgressCallback,
    ReworkOutcome,
};
pub use scenes::ScenesAgent;
