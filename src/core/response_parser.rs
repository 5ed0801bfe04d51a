//! Strict parser for the labeled-section completion format.
//!
//! The completion must contain `[Improved Prompt]` followed by
//! `[Explanation of Changes]`, optionally followed by `[Additional Considerations]`.
//! Each label sits alone on its own line. Lines that only contain `---` are
//! separators and are dropped. Anything else is rejected, never guessed at.

use crate::utils::error::{DepromptError, Result};
use regex::Regex;
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedImprovement {
    pub improved_prompt: String,
    pub explanation: String,
    pub considerations: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    ImprovedPrompt,
    Explanation,
    Considerations,
}

impl Section {
    fn from_label(label: &str) -> Self {
        match label.to_ascii_lowercase().as_str() {
            "improved prompt" => Section::ImprovedPrompt,
            "explanation of changes" => Section::Explanation,
            _ => Section::Considerations,
        }
    }
}

fn section_label() -> &'static Regex {
    static LABEL: OnceLock<Regex> = OnceLock::new();
    LABEL.get_or_init(|| {
        Regex::new(
            r"(?mi)^[ \t]*\[(improved prompt|explanation of changes|additional considerations)\][ \t]*\r?$",
        )
        .expect("section label regex is valid")
    })
}

fn clean_body(body: &str) -> String {
    body.lines()
        .filter(|line| line.trim() != "---")
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

pub fn parse_improvement(text: &str) -> Result<ParsedImprovement> {
    let labels: Vec<_> = section_label().captures_iter(text).collect();

    let Some(first) = labels.first() else {
        return Err(DepromptError::format(
            "completion has no [Improved Prompt] section",
        ));
    };

    let preamble_end = first.get(0).map(|m| m.start()).unwrap_or(0);
    if !clean_body(&text[..preamble_end]).is_empty() {
        return Err(DepromptError::format(
            "completion has text before the first section label",
        ));
    }

    let mut sections = Vec::with_capacity(labels.len());
    for (index, caps) in labels.iter().enumerate() {
        let (Some(whole), Some(label)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let body_end = labels
            .get(index + 1)
            .and_then(|next| next.get(0))
            .map(|m| m.start())
            .unwrap_or(text.len());
        sections.push((
            Section::from_label(label.as_str()),
            clean_body(&text[whole.end()..body_end]),
        ));
    }

    let order: Vec<Section> = sections.iter().map(|(section, _)| *section).collect();
    let valid_order = matches!(
        order.as_slice(),
        [Section::ImprovedPrompt, Section::Explanation]
            | [Section::ImprovedPrompt, Section::Explanation, Section::Considerations]
    );
    if !valid_order {
        return Err(DepromptError::format(format!(
            "unexpected section layout: {:?}",
            order
        )));
    }

    let mut bodies = sections.into_iter().map(|(_, body)| body);
    let improved_prompt = bodies.next().unwrap_or_default();
    let explanation = bodies.next().unwrap_or_default();
    let considerations = bodies.next().filter(|body| !body.is_empty());

    if improved_prompt.is_empty() {
        return Err(DepromptError::format("[Improved Prompt] section is empty"));
    }
    if explanation.is_empty() {
        return Err(DepromptError::format(
            "[Explanation of Changes] section is empty",
        ));
    }

    Ok(ParsedImprovement {
        improved_prompt,
        explanation,
        considerations,
    })
}
