use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use super::errors::{FieldErrors, SubmitError};
use super::validation::{self, ValidationRule};
use super::values::FormValues;

/// Async side effect run when a step (or the whole flow) is submitted.
#[async_trait]
pub trait SubmitAction: Send + Sync {
    async fn submit(&self, values: &FormValues) -> Result<(), SubmitError>;
}

/// Default per-step action: always succeeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAction;

#[async_trait]
impl SubmitAction for NoopAction {
    async fn submit(&self, _values: &FormValues) -> Result<(), SubmitError> {
        Ok(())
    }
}

/// Choice offered by a select field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Email,
    Password,
    Select {
        options: Vec<SelectOption>,
        multiple: bool,
    },
}

impl FieldKind {
    /// Value a field of this kind starts with when the step declares no default.
    pub fn empty_value(&self) -> Value {
        match self {
            FieldKind::Select { multiple: true, .. } => Value::Array(Vec::new()),
            _ => Value::String(String::new()),
        }
    }
}

/// Schema entry for one field of a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub name: String,
    pub label: String,
    #[serde(flatten)]
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldSpec {
    fn new(name: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind,
            required: false,
        }
    }

    pub fn text(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::Text)
    }

    pub fn email(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::Email)
    }

    pub fn password(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::Password)
    }

    pub fn select(
        name: impl Into<String>,
        label: impl Into<String>,
        options: Vec<SelectOption>,
    ) -> Self {
        Self::new(
            name,
            label,
            FieldKind::Select {
                options,
                multiple: false,
            },
        )
    }

    pub fn multi_select(
        name: impl Into<String>,
        label: impl Into<String>,
        options: Vec<SelectOption>,
    ) -> Self {
        Self::new(
            name,
            label,
            FieldKind::Select {
                options,
                multiple: true,
            },
        )
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

type InclusionPredicate = Arc<dyn Fn(&FormValues) -> bool + Send + Sync>;

/// Decides whether a declared step takes part in the active list.
#[derive(Clone, Default)]
pub enum Inclusion {
    #[default]
    Always,
    When(InclusionPredicate),
}

impl Inclusion {
    pub fn when<F>(predicate: F) -> Self
    where
        F: Fn(&FormValues) -> bool + Send + Sync + 'static,
    {
        Self::When(Arc::new(predicate))
    }

    /// Included while `field` holds exactly `expected`.
    pub fn field_equals(field: impl Into<String>, expected: impl Into<Value>) -> Self {
        let field = field.into();
        let expected = expected.into();
        Self::when(move |values| values.get(&field) == Some(&expected))
    }

    /// Included while the string in `field` is one of `accepted`.
    pub fn field_in(field: impl Into<String>, accepted: &[&str]) -> Self {
        let field = field.into();
        let accepted: Vec<String> = accepted.iter().map(|value| value.to_string()).collect();
        Self::when(move |values| {
            values
                .text(&field)
                .is_some_and(|value| accepted.iter().any(|candidate| candidate == value))
        })
    }

    pub fn includes(&self, values: &FormValues) -> bool {
        match self {
            Inclusion::Always => true,
            Inclusion::When(predicate) => predicate(values),
        }
    }

    pub fn is_conditional(&self) -> bool {
        matches!(self, Inclusion::When(_))
    }
}

impl fmt::Debug for Inclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Inclusion::Always => write!(f, "Always"),
            Inclusion::When(_) => write!(f, "When(..)"),
        }
    }
}

/// Static definition of one page of a flow.
#[derive(Clone)]
pub struct StepDescriptor {
    id: String,
    title: String,
    fields: Vec<FieldSpec>,
    defaults: FormValues,
    rules: Vec<ValidationRule>,
    action: Option<Arc<dyn SubmitAction>>,
    inclusion: Inclusion,
    locks_on_leave: bool,
}

impl StepDescriptor {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            fields: Vec::new(),
            defaults: FormValues::new(),
            rules: Vec::new(),
            action: None,
            inclusion: Inclusion::Always,
            locks_on_leave: false,
        }
    }

    /// Declares a field; its default is the kind's empty value unless one is set later.
    pub fn field(mut self, spec: FieldSpec) -> Self {
        if !self.defaults.contains(&spec.name) {
            self.defaults.insert(spec.name.clone(), spec.kind.empty_value());
        }
        self.fields.push(spec);
        self
    }

    pub fn default_value(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.defaults.insert(field, value);
        self
    }

    pub fn rule<F>(mut self, rule: F) -> Self
    where
        F: Fn(&FormValues, &mut FieldErrors) + Send + Sync + 'static,
    {
        self.rules.push(Arc::new(rule));
        self
    }

    pub fn action(mut self, action: Arc<dyn SubmitAction>) -> Self {
        self.action = Some(action);
        self
    }

    pub fn included(mut self, inclusion: Inclusion) -> Self {
        self.inclusion = inclusion;
        self
    }

    /// Once left, the user cannot navigate back onto this step.
    pub fn locks_on_leave(mut self) -> Self {
        self.locks_on_leave = true;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|field| field.name.as_str())
    }

    pub fn defaults(&self) -> &FormValues {
        &self.defaults
    }

    /// Keys a submit of this step may write: its declared fields and defaulted keys.
    pub fn owned_fields(&self) -> impl Iterator<Item = &str> {
        self.field_names()
            .chain(self.defaults.iter().map(|(name, _)| name.as_str()))
    }

    pub fn inclusion(&self) -> &Inclusion {
        &self.inclusion
    }

    pub fn is_locked_on_leave(&self) -> bool {
        self.locks_on_leave
    }

    pub fn submit_action(&self) -> Option<&Arc<dyn SubmitAction>> {
        self.action.as_ref()
    }

    /// Schema checks first, then the step's own rules, against `values`.
    pub fn validate(&self, values: &FormValues) -> FieldErrors {
        let mut errors = FieldErrors::new();
        for field in &self.fields {
            validation::check_field(field, values, &mut errors);
        }
        for rule in &self.rules {
            rule(values, &mut errors);
        }
        errors
    }
}

impl fmt::Debug for StepDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepDescriptor")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("fields", &self.fields)
            .field("defaults", &self.defaults)
            .field("rules", &self.rules.len())
            .field("has_action", &self.action.is_some())
            .field("inclusion", &self.inclusion)
            .field("locks_on_leave", &self.locks_on_leave)
            .finish()
    }
}
