use crate::config::ServiceConfig;
use crate::core::clarify::{build_clarify_messages, parse_clarification, MAX_QUESTIONS};
use crate::core::instruction::build_improvement_messages;
use crate::core::response_parser::parse_improvement;
use crate::domain::model::{ClarifyOutcome, ClarifyRequest, ImprovementRequest, ImprovementResult};
use crate::domain::ports::{ChatMessage, Completion, CompletionClient, CompletionRequest, Improve};
use crate::utils::error::{DepromptError, Result, UnavailableKind};
use crate::utils::validation::validate_prompt_text;
use async_trait::async_trait;

const LOGGED_RAW_CHARS: usize = 200;

/// 無狀態的 prompt 改寫服務：驗證、組指令、呼叫一次上游、解析結果
pub struct PromptImprover<C: CompletionClient> {
    config: ServiceConfig,
    client: C,
}

impl<C: CompletionClient> PromptImprover<C> {
    pub fn new(config: ServiceConfig, client: C) -> Self {
        Self { config, client }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub async fn improve(&self, request: &ImprovementRequest) -> Result<ImprovementResult> {
        let prompt = validate_prompt_text("prompt", &request.raw_prompt, self.config.max_prompt_chars)?;
        let context = match request.context.as_deref().map(str::trim) {
            Some(context) if !context.is_empty() => Some(validate_prompt_text(
                "context",
                context,
                self.config.max_prompt_chars,
            )?),
            _ => None,
        };
        let api_key = self.config.require_api_key()?;

        tracing::info!(
            "✨ Improving prompt ({} chars, target: {})",
            prompt.chars().count(),
            request.target_model
        );

        let messages = build_improvement_messages(&prompt, context.as_deref(), request.target_model);
        let completion = self.call_upstream(api_key, messages).await?;

        let parsed = parse_improvement(&completion.text).inspect_err(|e| {
            tracing::warn!(
                "⚠️ Unparseable completion from {}: {} (raw: {:?})",
                completion.model,
                e,
                truncate(&completion.text, LOGGED_RAW_CHARS)
            );
        })?;

        tracing::info!("✅ Prompt improved by {}", completion.model);

        Ok(ImprovementResult {
            improved_prompt: parsed.improved_prompt,
            explanation: parsed.explanation,
            model_used: request.target_model.key().to_string(),
            upstream_model: completion.model,
            considerations: parsed.considerations,
        })
    }

    /// 詢問上游是否還需要更多背景資訊
    pub async fn clarify(&self, request: &ClarifyRequest) -> Result<ClarifyOutcome> {
        let prompt = validate_prompt_text("prompt", &request.raw_prompt, self.config.max_prompt_chars)?;

        let answered: Vec<_> = request
            .answers
            .iter()
            .filter(|pair| !pair.question.trim().is_empty() && !pair.answer.trim().is_empty())
            .cloned()
            .collect();
        if answered.len() >= self.config.max_clarify_rounds {
            tracing::debug!(
                "Clarification limit reached ({} answers), ready to improve",
                answered.len()
            );
            return Ok(ClarifyOutcome::Ready);
        }

        let api_key = self.config.require_api_key()?;

        tracing::info!(
            "❓ Generating clarifying questions ({} answered so far, target: {})",
            answered.len(),
            request.target_model
        );

        let messages = build_clarify_messages(&prompt, request.target_model, &answered);
        let completion = self.call_upstream(api_key, messages).await?;

        parse_clarification(&completion.text, MAX_QUESTIONS)
    }

    async fn call_upstream(&self, api_key: &str, messages: Vec<ChatMessage>) -> Result<Completion> {
        let request = CompletionRequest {
            model: self.config.model.clone(),
            messages,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        tracing::debug!("📡 Calling completion API with model {}", request.model);

        match tokio::time::timeout(self.config.timeout, self.client.complete(api_key, &request)).await
        {
            Ok(Ok(completion)) => Ok(completion),
            Ok(Err(e)) => {
                tracing::error!("❌ Completion call failed: {}", e);
                Err(e)
            }
            Err(_) => {
                tracing::error!(
                    "❌ Completion call timed out after {:?}",
                    self.config.timeout
                );
                Err(DepromptError::unavailable(
                    UnavailableKind::Timeout,
                    format!("no response within {:?}", self.config.timeout),
                ))
            }
        }
    }
}

#[async_trait]
impl<C: CompletionClient> Improve for PromptImprover<C> {
    async fn improve(&self, request: &ImprovementRequest) -> Result<ImprovementResult> {
        PromptImprover::improve(self, request).await
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => format!("{}...", &text[..index]),
        None => text.to_string(),
    }
}
