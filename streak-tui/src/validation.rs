//! Client-side checks run before any request reaches the backend.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use streak_types::{age_between, ProfileUpdateRequest, SignupRequest};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());
static DATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

pub const MIN_USERNAME_LEN: usize = 3;
pub const MIN_PASSWORD_LEN: usize = 6;
pub const MIN_AGE: i32 = 5;
pub const MAX_BIO_LEN: usize = 200;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("All required fields must be filled in")]
    MissingFields,
    #[error("Email address is not valid")]
    InvalidEmail,
    #[error("Username must be at least 3 characters")]
    UsernameTooShort,
    #[error("Password must be at least 6 characters")]
    PasswordTooShort,
    #[error("Birth date must use the YYYY-MM-DD format")]
    BirthDateFormat,
    #[error("Birth date is not a valid date")]
    BirthDateInvalid,
    #[error("Minimum age is 5 years")]
    TooYoung,
    #[error("Enter your username and password")]
    MissingCredentials,
    #[error("First and last name are required")]
    MissingName,
    #[error("Habit name is required")]
    EmptyHabitName,
    #[error("Write something first")]
    EmptyContent,
}

/// Raw signup form values as typed by the user.
#[derive(Debug, Clone, Default)]
pub struct SignupForm {
    pub email: String,
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: String,
    pub gender: String,
}

/// Checks run in order: required fields, email shape, username length,
/// password length, then the optional birth date (shape, calendar validity,
/// minimum age on `today`). Text fields other than the password are trimmed.
pub fn validate_signup(form: &SignupForm, today: NaiveDate) -> Result<SignupRequest, ValidationError> {
    let email = form.email.trim();
    let username = form.username.trim();
    let password = form.password.as_str();
    let first_name = form.first_name.trim();
    let last_name = form.last_name.trim();
    let birth_date = form.birth_date.trim();

    if email.is_empty() || username.is_empty() || password.is_empty() || first_name.is_empty() || last_name.is_empty() {
        return Err(ValidationError::MissingFields);
    }
    if !EMAIL_RE.is_match(email) {
        return Err(ValidationError::InvalidEmail);
    }
    if username.chars().count() < MIN_USERNAME_LEN {
        return Err(ValidationError::UsernameTooShort);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort);
    }

    let birth_date = if birth_date.is_empty() {
        None
    } else {
        validate_birth_date(birth_date, today)?;
        Some(birth_date.to_string())
    };

    Ok(SignupRequest {
        email: email.to_string(),
        username: username.to_string(),
        password: password.to_string(),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        birth_date,
        gender: non_empty(&form.gender),
    })
}

/// Shape, real calendar date, then minimum age.
pub fn validate_birth_date(value: &str, today: NaiveDate) -> Result<NaiveDate, ValidationError> {
    if !DATE_RE.is_match(value) {
        return Err(ValidationError::BirthDateFormat);
    }
    let mut parts = value.split('-').map(|p| p.parse::<u32>());
    let (Some(Ok(y)), Some(Ok(m)), Some(Ok(d))) = (parts.next(), parts.next(), parts.next()) else {
        return Err(ValidationError::BirthDateFormat);
    };
    let date = NaiveDate::from_ymd_opt(y as i32, m, d).ok_or(ValidationError::BirthDateInvalid)?;
    if age_between(date, today) < MIN_AGE {
        return Err(ValidationError::TooYoung);
    }
    Ok(date)
}

/// Username is trimmed, the password is taken verbatim.
pub fn validate_login(username: &str, password: &str) -> Result<(String, String), ValidationError> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err(ValidationError::MissingCredentials);
    }
    Ok((username.to_string(), password.to_string()))
}

pub fn validate_profile_edit(
    user_id: i64,
    first_name: &str,
    last_name: &str,
    gender: &str,
    birth_date: &str,
) -> Result<ProfileUpdateRequest, ValidationError> {
    let first_name = first_name.trim();
    let last_name = last_name.trim();
    if first_name.is_empty() || last_name.is_empty() {
        return Err(ValidationError::MissingName);
    }
    Ok(ProfileUpdateRequest {
        user_id,
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        gender: non_empty(gender),
        birth_date: non_empty(birth_date),
    })
}

pub fn validate_habit_name(name: &str) -> Result<String, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyHabitName);
    }
    Ok(name.to_string())
}

pub fn validate_content(content: &str) -> Result<String, ValidationError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(ValidationError::EmptyContent);
    }
    Ok(content.to_string())
}

/// Bio is trimmed and cut to [`MAX_BIO_LEN`] characters.
pub fn truncate_bio(bio: &str) -> String {
    bio.trim().chars().take(MAX_BIO_LEN).collect()
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
