use crate::domain::model::TargetModel;

/// 目標模型的靜態說明，用於組合指令中的模型建議段落
#[derive(Debug, Clone, Copy)]
pub struct ModelGuidance {
    pub display_name: &'static str,
    pub context_window: u32,
    pub considerations: &'static [&'static str],
}

impl ModelGuidance {
    /// 轉為放進指令的文字區塊
    pub fn render(&self) -> String {
        let mut text = format!(
            "Target model: {} (context window: {} tokens)\n",
            self.display_name, self.context_window
        );
        for line in self.considerations {
            text.push_str("- ");
            text.push_str(line);
            text.push('\n');
        }
        text
    }
}

pub fn guidance_for(model: TargetModel) -> Option<&'static ModelGuidance> {
    let guidance = match model {
        TargetModel::General => return None,
        TargetModel::Gpt4o => &GPT_4O,
        TargetModel::Gpt4oMini => &GPT_4O_MINI,
        TargetModel::Gpt45 => &GPT_45,
        TargetModel::O3Mini => &O3_MINI,
        TargetModel::O1 => &O1,
        TargetModel::Claude35Sonnet => &CLAUDE_35_SONNET,
        TargetModel::Claude37Sonnet => &CLAUDE_37_SONNET,
        TargetModel::Claude3Haiku => &CLAUDE_3_HAIKU,
        TargetModel::Gemini15Pro => &GEMINI_15_PRO,
        TargetModel::Gemini20Pro => &GEMINI_20_PRO,
        TargetModel::Gemini20Flash => &GEMINI_20_FLASH,
        TargetModel::MistralLarge2 => &MISTRAL_LARGE_2,
        TargetModel::Llama31_405b => &LLAMA_31_405B,
        TargetModel::Llama32_1b => &LLAMA_32_1B,
    };
    Some(guidance)
}

static GPT_4O: ModelGuidance = ModelGuidance {
    display_name: "GPT-4o",
    context_window: 128_000,
    considerations: &[
        "Strong in most non-English languages",
        "Reasons well through complex, visual problems",
        "Performs best with clear, focused instructions",
    ],
};

static GPT_4O_MINI: ModelGuidance = ModelGuidance {
    display_name: "GPT-4o Mini",
    context_window: 128_000,
    considerations: &[
        "Good cost-to-performance ratio for everyday tasks",
        "Strong at code generation and factual answers",
        "Suited to high-volume applications",
    ],
};

static GPT_45: ModelGuidance = ModelGuidance {
    display_name: "GPT-4.5",
    context_window: 128_000,
    considerations: &[
        "Stronger at creative and subjective tasks",
        "Follows complex instructions precisely",
        "Fewer hallucinations on factual questions",
    ],
};

static O3_MINI: ModelGuidance = ModelGuidance {
    display_name: "o3-mini",
    context_window: 200_000,
    considerations: &[
        "Slower but more methodical answers",
        "Excels at formal reasoning, mathematics and coding",
        "Often works better with explicit reasoning instructions",
    ],
};

static O1: ModelGuidance = ModelGuidance {
    display_name: "o1",
    context_window: 200_000,
    considerations: &[
        "Built for maximum reasoning capability rather than speed",
        "Benefits from being asked to solve step by step",
        "Costly for simple tasks",
    ],
};

static CLAUDE_35_SONNET: ModelGuidance = ModelGuidance {
    display_name: "Claude 3.5 Sonnet",
    context_window: 200_000,
    considerations: &[
        "Strong technical accuracy with an approachable tone",
        "Works well within explicit guidelines",
        "Keeps context across very long exchanges",
    ],
};

static CLAUDE_37_SONNET: ModelGuidance = ModelGuidance {
    display_name: "Claude 3.7 Sonnet",
    context_window: 200_000,
    considerations: &[
        "Offers an extended thinking mode for complex problems",
        "Careful at weighing evidence and uncertainty",
        "Responds well to clearly delimited sections",
    ],
};

static CLAUDE_3_HAIKU: ModelGuidance = ModelGuidance {
    display_name: "Claude 3 Haiku",
    context_window: 200_000,
    considerations: &[
        "Fastest Claude model, suited to time-sensitive workloads",
        "Follows tonal and formatting guidance closely",
        "May struggle with complex multi-step reasoning",
    ],
};

static GEMINI_15_PRO: ModelGuidance = ModelGuidance {
    display_name: "Gemini 1.5 Pro",
    context_window: 2_000_000,
    considerations: &[
        "Very long context for integrating many documents",
        "Processes video, audio and images natively",
        "Benefits from structured prompts",
    ],
};

static GEMINI_20_PRO: ModelGuidance = ModelGuidance {
    display_name: "Gemini 2.0 Pro",
    context_window: 2_000_000,
    considerations: &[
        "Strong coding and reasoning",
        "Can use tools such as search and code execution",
        "Performs best with clear, structured instructions",
    ],
};

static GEMINI_20_FLASH: ModelGuidance = ModelGuidance {
    display_name: "Gemini 2.0 Flash",
    context_window: 1_000_000,
    considerations: &[
        "Optimized for latency-sensitive applications",
        "Balances performance and efficiency",
        "Good fit for interactive, user-facing features",
    ],
};

static MISTRAL_LARGE_2: ModelGuidance = ModelGuidance {
    display_name: "Mistral Large 2",
    context_window: 32_000,
    considerations: &[
        "Follows precise instructions and constraints well",
        "Keeps a consistent tone and voice",
        "Smaller context window, keep prompts compact",
    ],
};

static LLAMA_31_405B: ModelGuidance = ModelGuidance {
    display_name: "Llama 3.1 405B",
    context_window: 128_000,
    considerations: &[
        "Large open-weights model, often fine-tuned",
        "Competitive with closed models on many benchmarks",
        "Requires structured prompting for best results",
    ],
};

static LLAMA_32_1B: ModelGuidance = ModelGuidance {
    display_name: "Llama 3.2 1B",
    context_window: 128_000,
    considerations: &[
        "Compact model for on-device and edge deployments",
        "Best for simple, well-defined tasks",
        "Performs better with explicit instruction formats",
    ],
};
