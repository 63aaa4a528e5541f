// Validation helpers for request fields

use validator::ValidationErrors;

/// Trim a required field; empty after trimming is an error naming the field
pub fn trim_required(field: &str, name: &str) -> Result<String, String> {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        Err(format!("{} cannot be empty", name))
    } else {
        Ok(trimmed.to_string())
    }
}

/// Trim an optional field; empty becomes `None`
pub fn trim_optional(field: Option<&str>) -> Option<String> {
    field.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Flatten field errors into `field: message` pairs, sorted by field name
pub fn describe_validation_errors(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                format!("{}: {}", field, message)
            })
        })
        .collect();
    messages.sort();

    if messages.is_empty() {
        errors.to_string()
    } else {
        messages.join(", ")
    }
}
