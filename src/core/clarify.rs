use crate::domain::guidance::guidance_for;
use crate::domain::model::{ClarifyOutcome, QaPair, TargetModel};
use crate::domain::ports::ChatMessage;
use crate::utils::error::{DepromptError, Result};

pub const MAX_QUESTIONS: usize = 3;
pub const COMPLETE_MARKER: &str = "COMPLETE";

const KEY_AREAS: &str = "\
- Use case and intended audience
- Specific requirements and constraints
- Success criteria and quality expectations
- Error handling and edge cases
- Output format";

/// 問答紀錄由呼叫端保存並每次帶入，伺服器端不保留任何對話狀態
pub fn build_clarify_messages(
    prompt: &str,
    target: TargetModel,
    answers: &[QaPair],
) -> Vec<ChatMessage> {
    let target_info = guidance_for(target)
        .map(|guidance| guidance.render())
        .unwrap_or_else(|| "General purpose model\n".to_string());

    let mut system = format!(
        "You are an expert prompt engineer gathering the context needed to improve a prompt.\n\n\
Original prompt:\n{prompt}\n\n\
Target model info:\n{target_info}\n"
    );

    if !answers.is_empty() {
        system.push_str("Questions answered so far:\n");
        for pair in answers {
            system.push_str(&format!("Q: {}\nA: {}\n", pair.question, pair.answer));
        }
        system.push('\n');
    }

    system.push_str(&format!(
        "Consider these key areas:\n{KEY_AREAS}\n\n\
If any area critical to this prompt is unclear, ask up to {MAX_QUESTIONS} ultra-brief \
questions (10 words max each), one per line, most important first.\n\
If enough context has been gathered, respond with only the word {COMPLETE_MARKER}."
    ));

    vec![
        ChatMessage::system(system),
        ChatMessage::user("Generate the next question to ask."),
    ]
}

fn strip_list_marker(line: &str) -> &str {
    let line = line.trim();
    let without_bullet = line
        .strip_prefix("- ")
        .or_else(|| line.strip_prefix("* "))
        .or_else(|| line.strip_prefix("• "));
    if let Some(rest) = without_bullet {
        return rest.trim();
    }

    // "1." 或 "1)" 之類的編號
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(rest) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            return rest.trim();
        }
    }
    line
}

pub fn parse_clarification(text: &str, max_questions: usize) -> Result<ClarifyOutcome> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(DepromptError::format("clarification reply is empty"));
    }

    let marker = trimmed.trim_end_matches('.');
    if marker.eq_ignore_ascii_case(COMPLETE_MARKER) {
        return Ok(ClarifyOutcome::Ready);
    }

    let questions: Vec<String> = trimmed
        .lines()
        .map(strip_list_marker)
        .filter(|line| !line.is_empty())
        .take(max_questions)
        .map(str::to_string)
        .collect();

    Ok(ClarifyOutcome::NeedAnswers { questions })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_marker_means_ready() {
        assert_eq!(parse_clarification("COMPLETE", 3).unwrap(), ClarifyOutcome::Ready);
        assert_eq!(parse_clarification(" complete.\n", 3).unwrap(), ClarifyOutcome::Ready);
    }

    #[test]
    fn test_questions_are_cleaned_and_capped() {
        let reply = "1. Who is the audience?\n\n2) What tone?\n- How long?\n* Any format?";
        let outcome = parse_clarification(reply, 3).unwrap();
        assert_eq!(
            outcome,
            ClarifyOutcome::NeedAnswers {
                questions: vec![
                    "Who is the audience?".to_string(),
                    "What tone?".to_string(),
                    "How long?".to_string(),
                ]
            }
        );
    }

    #[test]
    fn test_empty_reply_is_format_error() {
        assert!(matches!(
            parse_clarification("  \n", 3),
            Err(DepromptError::UpstreamFormat { .. })
        ));
    }

    #[test]
    fn test_history_is_included_in_instruction() {
        let answers = vec![QaPair {
            question: "Who reads it?".to_string(),
            answer: "Children".to_string(),
        }];
        let messages = build_clarify_messages("write a story", TargetModel::General, &answers);
        assert!(messages[0].content.contains("Q: Who reads it?\nA: Children"));
        assert!(messages[0].content.contains("General purpose model"));
    }
}
