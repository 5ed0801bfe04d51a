use crate::domain::guidance::guidance_for;
use crate::domain::model::TargetModel;
use crate::domain::ports::ChatMessage;

pub const IMPROVE_INSTRUCTION: &str = "You are an expert prompt engineer. Rewrite the following \
prompt to be more structured, precise, and model-appropriate, then explain the changes.";

pub const IMPROVED_PROMPT_LABEL: &str = "[Improved Prompt]";
pub const EXPLANATION_LABEL: &str = "[Explanation of Changes]";
pub const CONSIDERATIONS_LABEL: &str = "[Additional Considerations]";

const IMPROVE_STEPS: &str = "\
1. Add appropriate structure
2. Make it specific and precise
3. Optimize it for the target model
4. Add guardrails for edge cases
5. Keep the original intent and scope";

/// 組合改寫請求：一則 system 指令與一則帶有原始 prompt 的 user 訊息
pub fn build_improvement_messages(
    prompt: &str,
    context: Option<&str>,
    target: TargetModel,
) -> Vec<ChatMessage> {
    let mut system = String::with_capacity(1024);
    system.push_str(IMPROVE_INSTRUCTION);
    system.push_str("\n\n");
    system.push_str(IMPROVE_STEPS);
    system.push_str("\n\n");

    match guidance_for(target) {
        Some(guidance) => system.push_str(&guidance.render()),
        None => system.push_str("Target model: general purpose\n"),
    }

    system.push_str(&format!(
        "\nFormat your response exactly like this, with each label alone on its own line \
and no text before the first label:\n\
{IMPROVED_PROMPT_LABEL}\n\
...your improved prompt...\n\
{EXPLANATION_LABEL}\n\
...brief explanation of what changed and why...\n\
{CONSIDERATIONS_LABEL}\n\
...optional brief notes..."
    ));

    let mut user = format!("Original Prompt:\n{}", prompt);
    if let Some(context) = context {
        user.push_str("\n\nContext:\n");
        user.push_str(context);
    }

    vec![ChatMessage::system(system), ChatMessage::user(user)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::Role;

    #[test]
    fn test_messages_carry_instruction_and_prompt() {
        let messages = build_improvement_messages("write a poem", None, TargetModel::General);

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert!(messages[0].content.starts_with(IMPROVE_INSTRUCTION));
        assert!(messages[0].content.contains(IMPROVED_PROMPT_LABEL));
        assert!(messages[0].content.contains(EXPLANATION_LABEL));
        assert!(messages[0].content.contains("general purpose"));

        assert_eq!(messages[1].role, Role::User);
        assert_eq!(messages[1].content, "Original Prompt:\nwrite a poem");
    }

    #[test]
    fn test_model_guidance_is_appended() {
        let messages = build_improvement_messages("sort a list", None, TargetModel::O3Mini);
        assert!(messages[0].content.contains("Target model: o3-mini"));
        assert!(messages[0].content.contains("explicit reasoning instructions"));
    }

    #[test]
    fn test_context_goes_into_user_message() {
        let messages = build_improvement_messages(
            "summarize this",
            Some("legal contracts for a small law firm"),
            TargetModel::General,
        );
        assert!(messages[1]
            .content
            .ends_with("Context:\nlegal contracts for a small law firm"));
    }
}
