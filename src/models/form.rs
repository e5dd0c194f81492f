//! Form state shared by the renewal and author forms

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use validator::ValidationErrors;

/// Date format accepted by every date field
pub const DATE_INPUT_FORMAT: &str = "%Y-%m-%d";

/// Field name -> messages, in a stable order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Messages attached to one field
    pub fn field(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `Ok(value)` when no field has an error
    pub fn into_result<T>(self, value: T) -> Result<T, FormErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl From<ValidationErrors> for FormErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut form_errors = FormErrors::new();
        for (field, field_errors) in errors.field_errors() {
            for error in field_errors.iter() {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value ({})", error.code));
                form_errors.add(&field.to_string(), message);
            }
        }
        form_errors
    }
}

/// A form as handed to the renderer: the submitted (or initial) values plus errors
#[derive(Debug, Clone, Serialize)]
pub struct FormState<T> {
    pub data: T,
    pub errors: FormErrors,
}

impl<T> FormState<T> {
    /// Unbound form showing initial values
    pub fn initial(data: T) -> Self {
        Self {
            data,
            errors: FormErrors::new(),
        }
    }

    pub fn with_errors(data: T, errors: FormErrors) -> Self {
        Self { data, errors }
    }
}

/// Result of processing a submitted form
#[derive(Debug)]
pub enum FormOutcome<T> {
    Saved(T),
    Invalid(FormErrors),
}

/// Parse an optional date field; blank means "no date"
pub fn parse_optional_date(
    errors: &mut FormErrors,
    field: &str,
    raw: &str,
) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match NaiveDate::parse_from_str(raw, DATE_INPUT_FORMAT) {
        Ok(date) => Some(date),
        Err(_) => {
            errors.add(field, "Enter a valid date.");
            None
        }
    }
}
