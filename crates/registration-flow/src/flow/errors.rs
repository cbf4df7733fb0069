use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Per-field messages, kept in the order the producer reported them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(IndexMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: impl Into<String>, message: impl Into<String>) -> Self {
        self.add(field, message);
        self
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// Adds a field entry verbatim, including an empty message list.
    pub fn insert_all(&mut self, field: impl Into<String>, messages: Vec<String>) {
        self.0.insert(field.into(), messages);
    }

    pub fn extend(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    pub fn first(&self, field: &str) -> Option<&str> {
        self.0
            .get(field)
            .and_then(|messages| messages.first())
            .map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            first = false;
            write!(f, "{field}: {}", messages.join(", "))?;
        }
        Ok(())
    }
}

/// Failure reported by a per-step or terminal submit action.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SubmitError {
    /// Structured rejection keyed by field name.
    #[error("submission rejected: {0}")]
    FieldErrors(FieldErrors),
    /// Anything else, with whatever readable message the producer had.
    #[error("{}", .message.as_deref().unwrap_or("submission failed"))]
    Generic { message: Option<String> },
}

impl SubmitError {
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FieldErrors(FieldErrors::new().with(field, message))
    }

    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: Some(message.into()),
        }
    }

    /// A failure that never produced a response, e.g. an unreachable backend.
    pub fn transport(error: impl fmt::Display) -> Self {
        Self::generic(error.to_string())
    }

    /// Classifies a decoded error response body.
    ///
    /// An object without an `error` key whose values are all non-empty string lists is a
    /// field-error map; everything else is generic, carrying the first string found under
    /// `error`, `message` or `detail`.
    pub fn from_response_body(body: &Value) -> Self {
        match body {
            Value::Object(map) => {
                if !map.contains_key("error") && !map.is_empty() {
                    if let Some(errors) = field_errors_from(map) {
                        return Self::FieldErrors(errors);
                    }
                }

                let message = ["error", "message", "detail"]
                    .iter()
                    .find_map(|key| map.get(*key).and_then(Value::as_str))
                    .map(str::to_string);
                Self::Generic { message }
            }
            Value::String(message) => Self::generic(message.clone()),
            _ => Self::Generic { message: None },
        }
    }
}

fn field_errors_from(map: &serde_json::Map<String, Value>) -> Option<FieldErrors> {
    let mut errors = FieldErrors::new();
    for (field, value) in map {
        let messages = value.as_array()?;
        if messages.is_empty() {
            return None;
        }
        let messages = messages
            .iter()
            .map(|message| message.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()?;
        errors.insert_all(field.clone(), messages);
    }
    Some(errors)
}

/// Raised when a navigator transition is asked to leave the active list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavigationError {
    #[error("step {step_number} is the last of {step_count} active steps")]
    AlreadyLastStep {
        step_number: usize,
        step_count: usize,
    },
    #[error("step {index} is outside the {step_count} active steps")]
    OutOfRange { index: usize, step_count: usize },
}

/// Rejected flow declarations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlowDefinitionError {
    #[error("a flow needs at least one step")]
    NoSteps,
    #[error("every step is conditional; at least one step must always be active")]
    NoUnconditionalStep,
    #[error("step id `{0}` is declared more than once")]
    DuplicateStep(String),
    #[error("no terminal submit action was provided")]
    MissingTerminalSubmit,
}
