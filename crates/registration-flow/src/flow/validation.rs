use std::sync::{Arc, LazyLock};

use regex::Regex;

use super::errors::FieldErrors;
use super::step::{FieldKind, FieldSpec};
use super::values::FormValues;

/// Cross-field check appended to a step's schema validation.
pub type ValidationRule = Arc<dyn Fn(&FormValues, &mut FieldErrors) + Send + Sync>;

pub const REQUIRED: &str = "is required";
pub const INVALID_EMAIL: &str = "must be a valid email address";
pub const UNKNOWN_OPTION: &str = "must be one of the listed options";

// A non-empty local part, then a domain of at least two non-empty dot-separated labels.
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s.]+(\.[^@\s.]+)+$").expect("Invalid regex pattern")
});

pub(crate) fn check_field(field: &FieldSpec, values: &FormValues, errors: &mut FieldErrors) {
    if values.is_blank(&field.name) {
        if field.required {
            errors.add(field.name.clone(), REQUIRED);
        }
        return;
    }

    match &field.kind {
        FieldKind::Email => {
            let valid = values.text(&field.name).is_some_and(looks_like_email);
            if !valid {
                errors.add(field.name.clone(), INVALID_EMAIL);
            }
        }
        FieldKind::Select { options, multiple } => {
            let chosen = if *multiple {
                values.list(&field.name)
            } else {
                values.text(&field.name).into_iter().collect()
            };
            let known = !chosen.is_empty()
                && chosen
                    .iter()
                    .all(|value| options.iter().any(|option| option.value == *value));
            if !known {
                errors.add(field.name.clone(), UNKNOWN_OPTION);
            }
        }
        FieldKind::Text | FieldKind::Password => {}
    }
}

fn looks_like_email(value: &str) -> bool {
    EMAIL_PATTERN.is_match(value.trim())
}

/// Requires `field` to hold at least `min` characters once filled in.
pub fn min_length(
    field: &'static str,
    min: usize,
) -> impl Fn(&FormValues, &mut FieldErrors) + Send + Sync + 'static {
    move |values: &FormValues, errors: &mut FieldErrors| {
        if let Some(value) = values.text(field) {
            if !value.is_empty() && value.chars().count() < min {
                errors.add(field, format!("must be at least {min} characters"));
            }
        }
    }
}

/// Requires `field` to repeat the value of `original`.
pub fn matches(
    field: &'static str,
    original: &'static str,
    message: &'static str,
) -> impl Fn(&FormValues, &mut FieldErrors) + Send + Sync + 'static {
    move |values: &FormValues, errors: &mut FieldErrors| {
        if values.text(field) != values.text(original) {
            errors.add(field, message);
        }
    }
}

/// Requires `field` to be exactly `count` ASCII digits once filled in.
pub fn digits(
    field: &'static str,
    count: usize,
) -> impl Fn(&FormValues, &mut FieldErrors) + Send + Sync + 'static {
    move |values: &FormValues, errors: &mut FieldErrors| {
        if let Some(value) = values.text(field) {
            let value = value.trim();
            if !value.is_empty()
                && (value.len() != count || !value.chars().all(|c| c.is_ascii_digit()))
            {
                errors.add(field, format!("must be {count} digits"));
            }
        }
    }
}
