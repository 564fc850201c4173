//! Field checks shared by the engine operations.

use crate::{EngineError, ResultEngine};

pub(crate) const NAME_MIN_LEN: usize = 2;
pub(crate) const NAME_MAX_LEN: usize = 100;
pub(crate) const DESCRIPTION_MAX_CHARS: usize = 500;

/// Check a user name. Length is measured in UTF-8 bytes, so a name made of
/// multi-byte characters reaches the bounds sooner.
pub(crate) fn validate_user_name(name: &str) -> ResultEngine<()> {
    check_name_length(name, name.len())
}

/// Check a group name. Length is measured in characters.
pub(crate) fn validate_group_name(name: &str) -> ResultEngine<()> {
    check_name_length(name, name.chars().count())
}

fn check_name_length(name: &str, len: usize) -> ResultEngine<()> {
    if name.is_empty() {
        return Err(EngineError::Validation("name is required".to_string()));
    }
    if len < NAME_MIN_LEN {
        return Err(EngineError::Validation(format!(
            "name must be at least {NAME_MIN_LEN} characters long"
        )));
    }
    if len > NAME_MAX_LEN {
        return Err(EngineError::Validation(format!(
            "name must be no more than {NAME_MAX_LEN} characters long"
        )));
    }
    Ok(())
}

/// Check a required email address with [`is_valid_email`].
pub(crate) fn validate_email(email: &str) -> ResultEngine<()> {
    if email.is_empty() {
        return Err(EngineError::Validation("email is required".to_string()));
    }
    if !is_valid_email(email) {
        return Err(EngineError::Validation("invalid email format".to_string()));
    }
    Ok(())
}

pub(crate) fn validate_description(description: Option<&str>) -> ResultEngine<()> {
    if description.is_some_and(|d| d.chars().count() > DESCRIPTION_MAX_CHARS) {
        return Err(EngineError::Validation(format!(
            "description must be no more than {DESCRIPTION_MAX_CHARS} characters long"
        )));
    }
    Ok(())
}

/// Minimal email shape check.
///
/// Accepts any string of at least 5 bytes with exactly one `@`, neither
/// first nor last, followed somewhere by a `.`. Not RFC 5322: addresses such
/// as `a@.b` pass on purpose.
pub fn is_valid_email(email: &str) -> bool {
    if email.len() < 5 {
        return false;
    }

    let mut at = None;
    for (i, c) in email.char_indices() {
        if c == '@' {
            if at.is_some() || i == 0 || i == email.len() - 1 {
                return false;
            }
            at = Some(i);
        }
    }

    match at {
        Some(i) => email[i + 1..].contains('.'),
        None => false,
    }
}

/// Trim optional free text, mapping blank values to `None`.
pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}
