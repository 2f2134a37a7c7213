//! Local input validation.
//!
//! Runs before credentials reach the network so obviously bad input fails
//! fast with every field problem reported at once.

use motodex_api::FieldError;
use motodex_api::model::{LoginCredentials, RegisterCredentials};

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Special characters accepted in passwords.
const PASSWORD_SYMBOLS: &str = "@$!%*?&";

/// Validation error for user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// Username is empty.
    EmptyUsername,
    /// Email address is empty.
    EmptyEmail,
    /// Email address format is invalid.
    InvalidEmail,
    /// Password is empty.
    EmptyPassword,
    /// Password is too weak.
    WeakPassword,
    /// Password confirmation differs.
    PasswordMismatch,
}

impl ValidationError {
    /// Get human-readable error message.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::EmptyUsername => "Username is required",
            Self::EmptyEmail => "Email address is required",
            Self::InvalidEmail => "Invalid email address format",
            Self::EmptyPassword => "Password is required",
            Self::WeakPassword => {
                "Password must be at least 8 characters with upper and lower case letters and a digit"
            }
            Self::PasswordMismatch => "Passwords do not match",
        }
    }

    /// Get the field name this error relates to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::EmptyUsername => "username",
            Self::EmptyEmail | Self::InvalidEmail => "email",
            Self::EmptyPassword | Self::WeakPassword => "password",
            Self::PasswordMismatch => "confirmPassword",
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ValidationError {}

/// Result of validating user input.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// Validate login input.
///
/// # Errors
///
/// Returns a vector of `ValidationError` if any fields are invalid.
pub fn validate_login(credentials: &LoginCredentials) -> ValidationResult {
    let mut errors = Vec::new();
    check_email(&credentials.email, &mut errors);
    if credentials.password.is_empty() {
        errors.push(ValidationError::EmptyPassword);
    }
    finish(errors)
}

/// Validate registration input.
///
/// # Errors
///
/// Returns a vector of `ValidationError` if any fields are invalid.
pub fn validate_registration(credentials: &RegisterCredentials) -> ValidationResult {
    let mut errors = Vec::new();

    if credentials.username.trim().is_empty() {
        errors.push(ValidationError::EmptyUsername);
    }
    check_email(&credentials.email, &mut errors);
    check_new_password(&credentials.password, &mut errors);
    if credentials.password != credentials.confirm_password {
        errors.push(ValidationError::PasswordMismatch);
    }

    finish(errors)
}

/// Validate a replacement password.
///
/// # Errors
///
/// Returns a vector of `ValidationError` if the password is too weak.
pub fn validate_new_password(password: &str) -> ValidationResult {
    let mut errors = Vec::new();
    check_new_password(password, &mut errors);
    finish(errors)
}

/// Converts validation failures into the API error taxonomy.
///
/// The status is 0 because no request was sent.
#[must_use]
pub fn into_api_error(errors: &[ValidationError]) -> motodex_api::Error {
    let message = errors
        .first()
        .map_or("Validation failed", ValidationError::message)
        .to_string();
    motodex_api::Error::Validation {
        status: 0,
        message,
        fields: errors
            .iter()
            .map(|e| FieldError::new(e.field(), e.message()))
            .collect(),
    }
}

/// Basic email validation: one `@`, no whitespace, dotted domain.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }

    domain.contains('.') && domain.split('.').all(|part| !part.is_empty())
}

/// Password strength rule for new passwords.
#[must_use]
pub fn is_strong_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LENGTH
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || PASSWORD_SYMBOLS.contains(c))
}

fn check_email(email: &str, errors: &mut Vec<ValidationError>) {
    if email.trim().is_empty() {
        errors.push(ValidationError::EmptyEmail);
    } else if !is_valid_email(email) {
        errors.push(ValidationError::InvalidEmail);
    }
}

fn check_new_password(password: &str, errors: &mut Vec<ValidationError>) {
    if password.is_empty() {
        errors.push(ValidationError::EmptyPassword);
    } else if !is_strong_password(password) {
        errors.push(ValidationError::WeakPassword);
    }
}

fn finish(errors: Vec<ValidationError>) -> ValidationResult {
    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
