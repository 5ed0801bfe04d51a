// Adapters layer: concrete implementations for external systems (completion API, HTTP surface).

pub mod http;
pub mod openai;

use crate::config::ServiceConfig;
use crate::core::service::PromptImprover;
use crate::domain::ports::CompletionClient;
use crate::utils::error::Result;
use std::sync::Arc;

pub use http::SharedImprover;
pub use openai::OpenAiClient;

/// 以 OpenAI 相容 API 建立服務
pub fn openai_improver(config: ServiceConfig) -> Result<SharedImprover> {
    let client: Arc<dyn CompletionClient> = Arc::new(OpenAiClient::from_config(&config)?);
    Ok(PromptImprover::new(config, client))
}
