use serde::{Deserialize, Serialize};

/// 使用者想要最佳化的目標模型族群
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TargetModel {
    #[default]
    General,
    Gpt4o,
    Gpt4oMini,
    Gpt45,
    O3Mini,
    O1,
    Claude35Sonnet,
    Claude37Sonnet,
    Claude3Haiku,
    Gemini15Pro,
    Gemini20Pro,
    Gemini20Flash,
    MistralLarge2,
    Llama31_405b,
    Llama32_1b,
}

impl TargetModel {
    pub const ALL: [TargetModel; 15] = [
        TargetModel::General,
        TargetModel::Gpt4o,
        TargetModel::Gpt4oMini,
        TargetModel::Gpt45,
        TargetModel::O3Mini,
        TargetModel::O1,
        TargetModel::Claude35Sonnet,
        TargetModel::Claude37Sonnet,
        TargetModel::Claude3Haiku,
        TargetModel::Gemini15Pro,
        TargetModel::Gemini20Pro,
        TargetModel::Gemini20Flash,
        TargetModel::MistralLarge2,
        TargetModel::Llama31_405b,
        TargetModel::Llama32_1b,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            TargetModel::General => "general",
            TargetModel::Gpt4o => "gpt-4o",
            TargetModel::Gpt4oMini => "gpt-4o-mini",
            TargetModel::Gpt45 => "gpt-4.5",
            TargetModel::O3Mini => "o3-mini",
            TargetModel::O1 => "o1",
            TargetModel::Claude35Sonnet => "claude-3.5-sonnet",
            TargetModel::Claude37Sonnet => "claude-3.7-sonnet",
            TargetModel::Claude3Haiku => "claude-3-haiku",
            TargetModel::Gemini15Pro => "gemini-1.5-pro",
            TargetModel::Gemini20Pro => "gemini-2.0-pro",
            TargetModel::Gemini20Flash => "gemini-2.0-flash",
            TargetModel::MistralLarge2 => "mistral-large-2",
            TargetModel::Llama31_405b => "llama-3.1-405b",
            TargetModel::Llama32_1b => "llama-3.2-1b",
        }
    }

    /// 解析目標模型。未提供或無法辨識時退回 `General`。
    pub fn from_hint(hint: Option<&str>) -> Self {
        let Some(hint) = hint.map(str::trim).filter(|h| !h.is_empty()) else {
            return TargetModel::General;
        };

        match Self::ALL
            .iter()
            .find(|model| model.key().eq_ignore_ascii_case(hint))
        {
            Some(model) => *model,
            None => {
                tracing::debug!("Unrecognized target model '{}', using general profile", hint);
                TargetModel::General
            }
        }
    }
}

impl std::fmt::Display for TargetModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone)]
pub struct ImprovementRequest {
    pub raw_prompt: String,
    pub target_model: TargetModel,
    pub context: Option<String>,
}

impl ImprovementRequest {
    pub fn new(raw_prompt: impl Into<String>, target_model: Option<&str>) -> Self {
        Self {
            raw_prompt: raw_prompt.into(),
            target_model: TargetModel::from_hint(target_model),
            context: None,
        }
    }

    pub fn with_context(mut self, context: Option<String>) -> Self {
        self.context = context;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImprovementResult {
    pub improved_prompt: String,
    pub explanation: String,
    pub model_used: String,
    pub upstream_model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub considerations: Option<String>,
}

/// 一組已回答的澄清問題
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaPair {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone)]
pub struct ClarifyRequest {
    pub raw_prompt: String,
    pub target_model: TargetModel,
    pub answers: Vec<QaPair>,
}

impl ClarifyRequest {
    pub fn new(raw_prompt: impl Into<String>, target_model: Option<&str>) -> Self {
        Self {
            raw_prompt: raw_prompt.into(),
            target_model: TargetModel::from_hint(target_model),
            answers: Vec::new(),
        }
    }

    pub fn with_answers(mut self, answers: Vec<QaPair>) -> Self {
        self.answers = answers;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ClarifyOutcome {
    Ready,
    NeedAnswers { questions: Vec<String> },
}
