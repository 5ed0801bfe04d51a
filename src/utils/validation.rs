use crate::utils::error::{DepromptError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(DepromptError::configuration(format!(
            "{}: URL cannot be empty",
            field_name
        )));
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(DepromptError::configuration(format!(
                "{}: unsupported URL scheme: {}",
                field_name, scheme
            ))),
        },
        Err(e) => Err(DepromptError::configuration(format!(
            "{}: invalid URL format: {}",
            field_name, e
        ))),
    }
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(DepromptError::configuration(format!(
            "{}: value must be at least {} (got {})",
            field_name, min_value, value
        )));
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(DepromptError::configuration(format!(
            "{}: value cannot be empty or whitespace-only",
            field_name
        )));
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(DepromptError::configuration(format!(
            "{}: value must be between {} and {} (got {})",
            field_name, min, max, value
        )));
    }
    Ok(())
}

/// 清理使用者輸入的 prompt：去除前後空白後檢查非空與長度上限。
///
/// 長度以 Unicode 字元數計算，剛好等於上限視為合法。
pub fn validate_prompt_text(field_name: &str, value: &str, max_chars: usize) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DepromptError::validation(format!("{} is empty", field_name)));
    }

    let length = trimmed.chars().count();
    if length > max_chars {
        return Err(DepromptError::validation(format!(
            "{} too long ({} characters, maximum is {})",
            field_name, length, max_chars
        )));
    }

    Ok(trimmed.to_string())
}
