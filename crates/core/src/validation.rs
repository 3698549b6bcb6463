//! Credential validation shared by registration, password change and the
//! JSON login endpoint.
//!
//! Rules are declared with `validator` derives; [`collect_messages`] turns
//! the resulting error tree into the flat list of sentences the HTML forms
//! display.

use std::borrow::Cow;

use serde::Deserialize;
use validator::{Validate, ValidationError, ValidationErrors};

/// A username/password pair as submitted on the registration form.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewCredentials {
    #[validate(
        length(
            min = 3,
            max = 32,
            message = "Username must be between 3 and 32 characters."
        ),
        custom(function = "validate_username_chars")
    )]
    pub username: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters."))]
    pub password: String,
}

/// A replacement password as submitted on the profile page.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewPassword {
    #[validate(length(min = 8, message = "Password must be at least 8 characters."))]
    pub password: String,
}

/// Usernames are restricted to ASCII letters, digits, `_` and `-`.
fn validate_username_chars(username: &str) -> Result<(), ValidationError> {
    let ok = username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if ok {
        return Ok(());
    }
    let mut err = ValidationError::new("username_chars");
    err.message = Some(Cow::Borrowed(
        "Username may only contain letters, digits, '_' and '-'.",
    ));
    Err(err)
}

/// Flatten validation errors into human-readable sentences.
///
/// Fields, and messages within a field, are sorted so the output is stable.
pub fn collect_messages(errors: &ValidationErrors) -> Vec<String> {
    let field_errors = errors.field_errors();
    let mut fields: Vec<_> = field_errors.iter().collect();
    fields.sort_by(|a, b| a.0.cmp(b.0));

    let mut messages = Vec::new();
    for (field, errs) in fields {
        let mut field_messages: Vec<String> = errs
            .iter()
            .map(|e| match &e.message {
                Some(msg) => msg.to_string(),
                None => format!("Invalid value for {field}."),
            })
            .collect();
        field_messages.sort();
        messages.extend(field_messages);
    }
    messages
}

/// Validate registration input, including the confirmation field.
///
/// Returns every problem found so the form can show them together.
pub fn check_registration(creds: &NewCredentials, confirm: &str) -> Vec<String> {
    let mut messages = match creds.validate() {
        Ok(()) => Vec::new(),
        Err(errors) => collect_messages(&errors),
    };
    if creds.password != confirm {
        messages.push("Passwords do not match.".to_string());
    }
    messages
}

/// Validate a replacement password and its confirmation.
pub fn check_new_password(password: &str, confirm: &str) -> Vec<String> {
    let input = NewPassword {
        password: password.to_string(),
    };
    let mut messages = match input.validate() {
        Ok(()) => Vec::new(),
        Err(errors) => collect_messages(&errors),
    };
    if password != confirm {
        messages.push("Passwords do not match.".to_string());
    }
    messages
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds(username: &str, password: &str) -> NewCredentials {
        NewCredentials {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn valid_registration_has_no_messages() {
        let messages = check_registration(&creds("ada_lovelace", "analytical"), "analytical");
        assert!(messages.is_empty(), "{messages:?}");
    }

    #[test]
    fn short_username_is_reported() {
        let messages = check_registration(&creds("ab", "analytical"), "analytical");
        assert_eq!(
            messages,
            vec!["Username must be between 3 and 32 characters."]
        );
    }

    #[test]
    fn username_with_spaces_is_reported() {
        let messages = check_registration(&creds("ada lovelace", "analytical"), "analytical");
        assert_eq!(
            messages,
            vec!["Username may only contain letters, digits, '_' and '-'."]
        );
    }

    #[test]
    fn all_problems_are_collected_in_field_order() {
        let messages = check_registration(&creds("a!", "short"), "other");
        assert_eq!(
            messages,
            vec![
                "Password must be at least 8 characters.",
                "Username may only contain letters, digits, '_' and '-'.",
                "Username must be between 3 and 32 characters.",
                "Passwords do not match.",
            ]
        );
    }

    #[test]
    fn new_password_rules() {
        assert!(check_new_password("long-enough", "long-enough").is_empty());
        assert_eq!(
            check_new_password("short", "short"),
            vec!["Password must be at least 8 characters."]
        );
        assert_eq!(
            check_new_password("long-enough", "long-enougH"),
            vec!["Passwords do not match."]
        );
    }
}
