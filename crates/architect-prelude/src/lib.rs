//! Unified prelude for the Architect agent orchestration engine.
//!
//! This crate provides a single import to bring in the commonly used types
//! from across every Architect crate. Use it when you need types from
//! several crates at once without managing a long list of individual
//! `use` lines — a CLI command handler that builds an `AgentLoop`, feeds it
//! a `GuardrailsEngine` and a `ConfirmPolicy`, and then renders a
//! `ReportData` is the typical case.
//!
//! Unlike a per-crate `prelude` submodule, each Architect crate already
//! curates its public surface at the crate root (`pub use` lines in
//! `lib.rs`), so this crate re-exports those roots directly rather than
//! introducing a redundant `prelude` module in every crate.
//!
//! # Example
//!
//! ```rust,ignore
//! use architect_prelude::*;
//!
//! # async fn example(provider: impl LlmProvider + 'static) -> RuntimeResult<()> {
//! let tools = ToolRegistry::default();
//! let guardrails = GuardrailsEngine::new(GuardrailsConfig::default());
//! let agent_loop = AgentLoop::new(provider, tools, AgentConfig::default());
//! let outcome = agent_loop.run("fix the failing test", "default", None).await?;
//! let report = ReportData::from_run(&outcome.state, &outcome.session, Vec::new());
//! println!("{}", report.render(ReportFormat::Markdown)?);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(clippy::all)]

pub use architect_checkpoint::*;
pub use architect_config::*;
pub use architect_confirm::*;
pub use architect_context::*;
pub use architect_core::*;
pub use architect_cost::*;
pub use architect_exec::*;
pub use architect_guardrails::*;
pub use architect_hooks::*;
pub use architect_index::*;
pub use architect_llm::*;
pub use architect_parallel::*;
pub use architect_pipeline::*;
pub use architect_ralph::*;
pub use architect_report::*;
pub use architect_review::*;
pub use architect_runtime::*;
pub use architect_tools::*;
pub use architect_workspace::*;
