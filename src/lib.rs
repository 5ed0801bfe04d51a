pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use adapters::{http::AppState, openai_improver, OpenAiClient, SharedImprover};
pub use config::ServiceConfig;
pub use core::retry::{RetryPolicy, Retrying};
pub use core::service::PromptImprover;
pub use domain::model::{
    ClarifyOutcome, ClarifyRequest, ImprovementRequest, ImprovementResult, QaPair, TargetModel,
};
pub use utils::error::{DepromptError, Result};
