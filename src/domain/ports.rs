use crate::domain::model::{ImprovementRequest, ImprovementResult};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// 送往補全 API 的單次請求
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// 上游回傳的補全文字，以及實際產生它的模型
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    pub model: String,
}

/// 外部補全服務。實作負責把傳輸層失敗分類成 `DepromptError`。
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, api_key: &str, request: &CompletionRequest) -> Result<Completion>;
}

#[async_trait]
impl<T: CompletionClient + ?Sized> CompletionClient for Arc<T> {
    async fn complete(&self, api_key: &str, request: &CompletionRequest) -> Result<Completion> {
        (**self).complete(api_key, request).await
    }
}

/// 可被裝飾（例如重試）的改寫操作
#[async_trait]
pub trait Improve: Send + Sync {
    async fn improve(&self, request: &ImprovementRequest) -> Result<ImprovementResult>;
}
