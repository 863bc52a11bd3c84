//! Pre-submit field validation

use std::collections::BTreeMap;

use super::{AssignmentForm, FieldName};
use crate::constants::MSG_REQUIRED;

/// Validation messages keyed by field; empty when the form is valid
pub type FieldErrors = BTreeMap<FieldName, Vec<String>>;

/// Check the form before it may be submitted
///
/// Only the assignment name is required.
#[must_use]
pub fn validate(form: &AssignmentForm) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if form.name.trim().is_empty() {
        errors
            .entry(FieldName::Name)
            .or_default()
            .push(MSG_REQUIRED.to_string());
    }
    errors
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "tests fail by panicking"
)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_name_is_required() {
        let mut form = AssignmentForm::default();
        form.name = "   ".to_string();

        let errors = validate(&form);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[&FieldName::Name], vec!["Required".to_string()]);
    }

    #[test]
    fn test_named_form_is_valid() {
        let mut form = AssignmentForm::default();
        form.name = "HW1".to_string();
        assert!(validate(&form).is_empty());
    }
}
