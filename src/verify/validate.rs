//! Form validation run before any request is sent

use crate::client::models::{OrganizationDraft, User, UserDraft};
use crate::error::ValidationError;

/// Minimum accepted password length
pub const MIN_PASSWORD_LEN: usize = 8;

pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(())
}

/// Accepts `local@domain.tld` with no whitespace.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let invalid = || ValidationError::InvalidEmail(email.to_string());

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    let (host, tld) = domain.rsplit_once('.').ok_or_else(invalid)?;
    if host.is_empty() || tld.is_empty() {
        return Err(invalid());
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::WeakPassword(format!(
            "must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

/// Reject an email already used by one of the `known` live users.
///
/// `editing` is the ID of the user being edited, which may keep its own email.
pub fn check_unique_email(
    email: &str,
    known: &[User],
    editing: Option<&str>,
) -> Result<(), ValidationError> {
    let taken = known.iter().any(|u| {
        u.deleted_at.is_none()
            && Some(u.id.as_str()) != editing
            && u.email.eq_ignore_ascii_case(email)
    });
    if taken {
        return Err(ValidationError::DuplicateEmail(email.to_string()));
    }
    Ok(())
}

/// All checks for a user form. Every failing field is reported, in field
/// order; a single failure comes back as that field's error.
pub fn validate_user(
    draft: &UserDraft,
    known: &[User],
    editing: Option<&str>,
) -> Result<(), ValidationError> {
    let mut errors = Vec::new();
    if let Err(err) = validate_name(&draft.name) {
        errors.push(err);
    }
    match validate_email(&draft.email) {
        Ok(()) => {
            if let Err(err) = check_unique_email(&draft.email, known, editing) {
                errors.push(err);
            }
        }
        Err(err) => errors.push(err),
    }

    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Fields(errors)),
    }
}

pub fn validate_organization(draft: &OrganizationDraft) -> Result<(), ValidationError> {
    validate_name(&draft.name)
}
