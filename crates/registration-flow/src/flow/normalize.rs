use super::errors::{FieldErrors, SubmitError};

pub const DEFAULT_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

/// Turns any submit failure into the single string shown above the form buttons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorNormalizer {
    default_message: String,
}

impl Default for ErrorNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_ERROR_MESSAGE)
    }
}

impl ErrorNormalizer {
    pub fn new(default_message: impl Into<String>) -> Self {
        Self {
            default_message: default_message.into(),
        }
    }

    pub fn default_message(&self) -> &str {
        &self.default_message
    }

    pub fn normalize(&self, error: &SubmitError) -> String {
        match error {
            SubmitError::FieldErrors(errors) => self
                .field_lines(errors)
                .unwrap_or_else(|| self.default_message.clone()),
            SubmitError::Generic {
                message: Some(message),
            } if !message.trim().is_empty() => message.clone(),
            SubmitError::Generic { .. } => self.default_message.clone(),
        }
    }

    /// `<Field> <first message>.` per field, newline separated. `None` unless every
    /// field carries at least one message.
    fn field_lines(&self, errors: &FieldErrors) -> Option<String> {
        if errors.is_empty() {
            return None;
        }

        let lines = errors
            .iter()
            .map(|(field, messages)| {
                messages
                    .first()
                    .map(|message| format!("{} {}.", capitalize_first_letter(field), message))
            })
            .collect::<Option<Vec<_>>>()?;

        Some(lines.join("\n"))
    }
}

fn capitalize_first_letter(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
