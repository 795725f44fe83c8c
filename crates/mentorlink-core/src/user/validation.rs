//! Format rules for user-supplied contact fields.

use super::model::{NewUser, ProfilePatch};
use crate::error::{MentorError, Result};
use once_cell::sync::Lazy;
use regex::Regex;

/// `6000-0000`, `60000000`, optionally prefixed with a country code.
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\+\d{1,3}\s?)?\d{4}-?\d{4}$").expect("valid phone regex"));

/// Panamanian cedula: `<province>-<book>-<entry>`, e.g. `8-123-4567`, `PE-12-345`.
static CEDULA_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(?:[1-9]|1[0-3])(?:AV|PI)?|PE|E|N)-\d{1,4}-\d{1,6}$")
        .expect("valid cedula regex")
});

pub fn validate_full_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(MentorError::validation("Name must not be empty"));
    }
    Ok(())
}

pub fn validate_phone(phone: &str) -> Result<()> {
    if !PHONE_RE.is_match(phone.trim()) {
        return Err(MentorError::validation(format!(
            "Malformed phone number '{}'",
            phone
        )));
    }
    Ok(())
}

pub fn validate_cedula(cedula: &str) -> Result<()> {
    if !CEDULA_RE.is_match(&cedula.trim().to_uppercase()) {
        return Err(MentorError::validation(format!("Malformed cedula '{}'", cedula)));
    }
    Ok(())
}

pub fn validate_new_user(user: &NewUser) -> Result<()> {
    validate_full_name(&user.full_name)?;
    validate_phone(&user.phone)?;
    validate_cedula(&user.cedula)?;
    Ok(())
}

pub fn validate_patch(patch: &ProfilePatch) -> Result<()> {
    if let Some(name) = &patch.full_name {
        validate_full_name(name)?;
    }
    if let Some(phone) = &patch.phone {
        validate_phone(phone)?;
    }
    if let Some(cedula) = &patch.cedula {
        validate_cedula(cedula)?;
    }
    if let Some(skills) = &patch.skills {
        if skills.iter().any(|skill| skill.trim().is_empty()) {
            return Err(MentorError::validation("Skills must not be blank"));
        }
    }
    Ok(())
}
