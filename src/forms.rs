//! Client-side form checks run before any request is sent.

#[cfg(test)]
#[path = "forms_test.rs"]
mod forms_test;

use crate::net::types::ProfileUpdate;

pub const TWEET_MAX_CHARS: usize = 280;
pub const NAME_MAX_CHARS: usize = 50;
pub const BIO_MAX_CHARS: usize = 160;
pub const LOCATION_MAX_CHARS: usize = 30;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("Please fill in all fields")]
    MissingFields,

    #[error("Your chirp cannot be empty")]
    EmptyTweet,

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    /// # Errors
    ///
    /// Returns [`FormError::MissingFields`] if either field is empty.
    pub fn validate(&self) -> Result<(), FormError> {
        if self.email.is_empty() || self.password.is_empty() {
            return Err(FormError::MissingFields);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterForm {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegisterForm {
    /// # Errors
    ///
    /// Returns [`FormError::MissingFields`] if any field is empty.
    pub fn validate(&self) -> Result<(), FormError> {
        let fields = [&self.name, &self.username, &self.email, &self.password];
        if fields.iter().any(|field| field.is_empty()) {
            return Err(FormError::MissingFields);
        }
        Ok(())
    }
}

/// Check a tweet or reply body. Whitespace-only content counts as empty.
///
/// # Errors
///
/// Returns an error if the content is blank or longer than 280 characters.
pub fn validate_tweet(content: &str) -> Result<(), FormError> {
    if content.trim().is_empty() {
        return Err(FormError::EmptyTweet);
    }
    check_len("Chirp", content, TWEET_MAX_CHARS)
}

/// Length limits of the profile edit form.
///
/// # Errors
///
/// Returns [`FormError::TooLong`] for the first field over its limit.
pub fn validate_profile(update: &ProfileUpdate) -> Result<(), FormError> {
    check_len("Name", &update.name, NAME_MAX_CHARS)?;
    check_len("Bio", &update.bio, BIO_MAX_CHARS)?;
    check_len("Location", &update.location, LOCATION_MAX_CHARS)
}

fn check_len(field: &'static str, value: &str, max: usize) -> Result<(), FormError> {
    if value.chars().count() > max {
        return Err(FormError::TooLong { field, max });
    }
    Ok(())
}
