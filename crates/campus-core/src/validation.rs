//! Form validation helpers
//!
//! Forms report at most one message per field, keyed by field name, so a
//! screen can render each message next to its input.

use std::collections::BTreeMap;

use validator::ValidationErrors;

/// Per-field error messages, ordered by field name.
pub type FormErrors = BTreeMap<String, String>;

/// Collect the first message reported for each invalid field.
pub fn form_errors(errors: &ValidationErrors) -> FormErrors {
    errors
        .field_errors()
        .into_iter()
        .filter_map(|(field, errs)| {
            errs.first().map(|err| {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field));
                (field.to_string(), message)
            })
        })
        .collect()
}

/// Flatten all field messages into one line.
pub fn first_message(errors: &ValidationErrors) -> String {
    form_errors(errors)
        .into_values()
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CourseRequest;
    use validator::Validate;

    #[test]
    fn test_form_errors_keyed_by_field() {
        let errors = CourseRequest::default().validate().unwrap_err();
        let map = form_errors(&errors);
        assert_eq!(map["name"], "Course name is required");
        assert_eq!(map["description"], "Course description is required");
        assert_eq!(
            first_message(&errors),
            "Course description is required; Course name is required"
        );
    }
}
