//! Client-side checks run before credentials or registration data leave
//! the process. The server stays authoritative; these only catch obvious
//! mistakes without a round trip.

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::models::RegistrationRequest;

const MAX_EMAIL_LENGTH: usize = 100;
const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_PASSWORD_LENGTH: usize = 50;
const MAX_NAME_LENGTH: usize = 50;
const MAX_SUFFIX_LENGTH: usize = 4;
const MAX_ADDRESS_LENGTH: usize = 255;
const MIN_AGE: u32 = 1;
const MAX_AGE: u32 = 120;

/// Age assumed when the form leaves it blank.
const DEFAULT_AGE: u32 = 18;

static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
static PHONE_REGEX: OnceLock<Regex> = OnceLock::new();
static NAME_REGEX: OnceLock<Regex> = OnceLock::new();
static ADDRESS_REGEX: OnceLock<Regex> = OnceLock::new();

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Must be a valid email address")]
    InvalidEmail,

    #[error("Email must be less than {MAX_EMAIL_LENGTH} characters")]
    EmailTooLong,

    #[error("Password must be between {MIN_PASSWORD_LENGTH} and {MAX_PASSWORD_LENGTH} characters")]
    PasswordLength,

    #[error("Cellphone number must be between 11 and 13 digits")]
    InvalidCellphone,

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("Must be valid name format: {0}")]
    InvalidName(String),

    #[error("Must be valid address format: {0}")]
    InvalidAddress(String),

    #[error("Age must be between {MIN_AGE} and {MAX_AGE}")]
    AgeOutOfRange,
}

/// Email and password as typed into the sign-in form.
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_email(&self.email)?;
        validate_password(&self.password)
    }
}

fn email_regex() -> &'static Regex {
    EMAIL_REGEX.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"))
}

fn phone_regex() -> &'static Regex {
    PHONE_REGEX.get_or_init(|| Regex::new(r"^\d{11,13}$").expect("valid phone regex"))
}

fn name_regex() -> &'static Regex {
    NAME_REGEX.get_or_init(|| Regex::new(r"^\p{L}[\p{L}\p{M}'\- ]*$").expect("valid name regex"))
}

fn address_regex() -> &'static Regex {
    ADDRESS_REGEX.get_or_init(|| {
        Regex::new(r"^[\p{L}\p{N}][\p{L}\p{N}\p{M}'\-\s.,#]*$").expect("valid address regex")
    })
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let trimmed = email.trim();
    if !email_regex().is_match(trimmed) {
        return Err(ValidationError::InvalidEmail);
    }
    if trimmed.chars().count() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::EmailTooLong);
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    let len = password.chars().count();
    if !(MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&len) {
        return Err(ValidationError::PasswordLength);
    }
    Ok(())
}

pub fn validate_cellphone(number: &str) -> Result<(), ValidationError> {
    if !phone_regex().is_match(number) {
        return Err(ValidationError::InvalidCellphone);
    }
    Ok(())
}

fn validate_name(field: &'static str, name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field,
            max: MAX_NAME_LENGTH,
        });
    }
    if !name_regex().is_match(trimmed) {
        return Err(ValidationError::InvalidName(name.to_string()));
    }
    Ok(())
}

fn validate_suffix(suffix: Option<&str>) -> Result<(), ValidationError> {
    match suffix {
        Some(s) if s.chars().count() > MAX_SUFFIX_LENGTH => Err(ValidationError::TooLong {
            field: "Suffix",
            max: MAX_SUFFIX_LENGTH,
        }),
        _ => Ok(()),
    }
}

fn validate_age(age: u32) -> Result<(), ValidationError> {
    if !(MIN_AGE..=MAX_AGE).contains(&age) {
        return Err(ValidationError::AgeOutOfRange);
    }
    Ok(())
}

fn validate_address(address: &str) -> Result<(), ValidationError> {
    let trimmed = address.trim();
    if trimmed.chars().count() > MAX_ADDRESS_LENGTH {
        return Err(ValidationError::TooLong {
            field: "Complete address",
            max: MAX_ADDRESS_LENGTH,
        });
    }
    if !address_regex().is_match(trimmed) {
        return Err(ValidationError::InvalidAddress(address.to_string()));
    }
    Ok(())
}

/// Run every registration check in form order, stopping at the first failure.
pub fn validate_registration(request: &RegistrationRequest) -> Result<(), ValidationError> {
    validate_email(&request.email)?;
    validate_cellphone(&request.cellphone_number)?;
    validate_password(&request.password)?;
    validate_name("First name", &request.first_name)?;
    if let Some(middle) = request.middle_name.as_deref().filter(|m| !m.is_empty()) {
        validate_name("Middle name", middle)?;
    }
    validate_name("Last name", &request.last_name)?;
    validate_suffix(request.suffix.as_deref())?;
    validate_age(request.age.unwrap_or(DEFAULT_AGE))?;
    if let Some(address) = request.complete_address.as_deref() {
        validate_address(address)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserGender;

    fn registration() -> RegistrationRequest {
        RegistrationRequest {
            email: "juan.delacruz@school.edu".to_string(),
            cellphone_number: "09171234567".to_string(),
            password: "correct-horse".to_string(),
            role: None,
            first_name: "Juan".to_string(),
            middle_name: Some("Peña".to_string()),
            last_name: "Dela Cruz".to_string(),
            suffix: Some("Jr.".to_string()),
            age: Some(19),
            gender: UserGender::Male,
            complete_address: Some("12 Rizal St., Malabon City".to_string()),
        }
    }

    #[test]
    fn test_email_rules() {
        assert!(validate_email("a@b.co").is_ok());
        assert!(validate_email("  padded@school.edu  ").is_ok());
        assert_eq!(validate_email(""), Err(ValidationError::InvalidEmail));
        assert_eq!(validate_email("no-at-sign.com"), Err(ValidationError::InvalidEmail));
        assert_eq!(validate_email("a@nodot"), Err(ValidationError::InvalidEmail));
        assert_eq!(validate_email("two words@x.com"), Err(ValidationError::InvalidEmail));

        let long = format!("{}@school.edu", "a".repeat(95));
        assert_eq!(validate_email(&long), Err(ValidationError::EmailTooLong));
    }

    #[test]
    fn test_password_length() {
        assert_eq!(validate_password("short"), Err(ValidationError::PasswordLength));
        assert!(validate_password("12345678").is_ok());
        assert!(validate_password(&"p".repeat(50)).is_ok());
        assert_eq!(validate_password(&"p".repeat(51)), Err(ValidationError::PasswordLength));
    }

    #[test]
    fn test_credentials_validate() {
        assert!(Credentials::new("a@b.co", "longenough").validate().is_ok());
        assert_eq!(
            Credentials::new("a@b.co", "short").validate(),
            Err(ValidationError::PasswordLength)
        );
        let printed = format!("{:?}", Credentials::new("a@b.co", "longenough"));
        assert!(!printed.contains("longenough"));
    }

    #[test]
    fn test_registration_accepts_valid_form() {
        assert_eq!(validate_registration(&registration()), Ok(()));
    }

    #[test]
    fn test_registration_defaults_for_blank_fields() {
        let mut request = registration();
        request.age = None;
        request.middle_name = Some(String::new());
        request.complete_address = None;
        request.suffix = None;
        assert_eq!(validate_registration(&request), Ok(()));
    }

    #[test]
    fn test_registration_rejections() {
        let mut request = registration();
        request.cellphone_number = "0917-123".to_string();
        assert_eq!(validate_registration(&request), Err(ValidationError::InvalidCellphone));

        let mut request = registration();
        request.first_name = "J4n".to_string();
        assert_eq!(
            validate_registration(&request),
            Err(ValidationError::InvalidName("J4n".to_string()))
        );

        let mut request = registration();
        request.last_name = "x".repeat(51);
        assert!(matches!(
            validate_registration(&request),
            Err(ValidationError::TooLong { field: "Last name", .. })
        ));

        let mut request = registration();
        request.suffix = Some("Junior".to_string());
        assert!(matches!(
            validate_registration(&request),
            Err(ValidationError::TooLong { field: "Suffix", .. })
        ));

        let mut request = registration();
        request.age = Some(0);
        assert_eq!(validate_registration(&request), Err(ValidationError::AgeOutOfRange));

        let mut request = registration();
        request.complete_address = Some("@home".to_string());
        assert!(matches!(
            validate_registration(&request),
            Err(ValidationError::InvalidAddress(_))
        ));
    }
}
