//! Registration rules.
//!
//! Everything here is pure: inputs are the candidate payload, the configured
//! [`Policy`] and the reference date. Rules run in field order and the first
//! failure is returned.

use std::fmt;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex_lite::Regex;
use validator::{Validate, ValidateEmail, ValidationErrors};

use crate::config::{NamePolicy, PasswordPolicy, PhonePolicy, Policy};
use crate::user::{NewUser, Registration, User};

/// Accepted `date_of_birth` format.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z\s]+$").unwrap());
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?([0-9]+)$").unwrap());

pub type Result<T> = std::result::Result<T, ValidationError>;

/// Reason a registration was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must be {min} to {max} letters or spaces")]
    InvalidName { min: usize, max: usize },
    #[error("email address is not well formed")]
    InvalidEmailFormat,
    #[error("email must be from {}", .allowed.join(" or "))]
    InvalidEmailDomain { allowed: Vec<String> },
    #[error(
        "phone number must be {min} to {max} digits, optionally prefixed by '+'"
    )]
    InvalidPhoneFormat { min: usize, max: usize },
    #[error("password is too weak, {0}")]
    WeakPassword(PasswordIssue),
    #[error("date of birth {0}")]
    InvalidDateOfBirth(DateIssue),
    #[error("{message}")]
    InvalidField { field: String, message: String },
    #[error("email already registered")]
    DuplicateEmail,
}

impl ValidationError {
    /// Stable identifier of the failure.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidName { .. } => "InvalidName",
            Self::InvalidEmailFormat => "InvalidEmailFormat",
            Self::InvalidEmailDomain { .. } => "InvalidEmailDomain",
            Self::InvalidPhoneFormat { .. } => "InvalidPhoneFormat",
            Self::WeakPassword(_) => "WeakPassword",
            Self::InvalidDateOfBirth(_) => "InvalidDateOfBirth",
            Self::InvalidField { .. } => "InvalidField",
            Self::DuplicateEmail => "DuplicateEmail",
        }
    }

    /// Offending field of the payload.
    pub fn field(&self) -> &str {
        match self {
            Self::InvalidName { .. } => "name",
            Self::InvalidEmailFormat
            | Self::InvalidEmailDomain { .. }
            | Self::DuplicateEmail => "email",
            Self::InvalidPhoneFormat { .. } => "phone",
            Self::WeakPassword(_) => "password",
            Self::InvalidDateOfBirth(_) => "date_of_birth",
            Self::InvalidField { field, .. } => field.as_str(),
        }
    }
}

impl From<ValidationErrors> for ValidationError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields = errors.field_errors().into_iter().collect::<Vec<_>>();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        let (field, message) = fields
            .first()
            .map(|(field, issues)| {
                (
                    field.to_string(),
                    issues.first().map(|i| i.to_string()).unwrap_or_default(),
                )
            })
            .unwrap_or_default();

        Self::InvalidField { field, message }
    }
}

/// First unmet password requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordIssue {
    TooShort(usize),
    TooLong(usize),
    MissingUppercase,
    MissingLowercase,
    MissingDigit,
    MissingSymbol,
}

impl fmt::Display for PasswordIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort(min) => {
                write!(f, "it must contain at least {min} characters")
            },
            Self::TooLong(max) => {
                write!(f, "it must contain at most {max} characters")
            },
            Self::MissingUppercase => {
                f.write_str("it must contain an uppercase letter")
            },
            Self::MissingLowercase => {
                f.write_str("it must contain a lowercase letter")
            },
            Self::MissingDigit => f.write_str("it must contain a digit"),
            Self::MissingSymbol => f.write_str("it must contain a symbol"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateIssue {
    Unparseable,
    InFuture,
}

impl fmt::Display for DateIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unparseable => f.write_str("must be a YYYY-MM-DD date"),
            Self::InFuture => f.write_str("cannot be in the future"),
        }
    }
}

/// Check a full name.
pub fn validate_name(name: &str, policy: &NamePolicy) -> Result<()> {
    let length = name.chars().count();

    if name.trim().is_empty()
        || length < policy.min_length
        || length > policy.max_length
        || !NAME_RE.is_match(name)
    {
        return Err(ValidationError::InvalidName {
            min: policy.min_length,
            max: policy.max_length,
        });
    }

    Ok(())
}

/// Check an email address against the domain allow-list.
///
/// Returns the lowercased address on success.
pub fn validate_email(email: &str, allowed_domains: &[String]) -> Result<String> {
    let email = email.trim().to_lowercase();
    if !email.validate_email() {
        return Err(ValidationError::InvalidEmailFormat);
    }

    let domain = email.rsplit('@').next().unwrap_or_default();
    if allowed_domains
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(domain))
    {
        Ok(email)
    } else {
        Err(ValidationError::InvalidEmailDomain {
            allowed: allowed_domains.to_vec(),
        })
    }
}

/// Check an international phone number.
pub fn validate_phone(phone: &str, policy: &PhonePolicy) -> Result<()> {
    let digits = PHONE_RE
        .captures(phone)
        .and_then(|captures| captures.get(1))
        .map(|digits| digits.as_str());

    match digits {
        Some(digits)
            if (policy.min_digits..=policy.max_digits)
                .contains(&digits.len())
                && (policy.allow_leading_zero || !digits.starts_with('0')) =>
        {
            Ok(())
        },
        _ => Err(ValidationError::InvalidPhoneFormat {
            min: policy.min_digits,
            max: policy.max_digits,
        }),
    }
}

/// Check password strength.
pub fn validate_password(password: &str, policy: &PasswordPolicy) -> Result<()> {
    let length = password.chars().count();

    let issue = if length < policy.min_length {
        Some(PasswordIssue::TooShort(policy.min_length))
    } else if length > policy.max_length {
        Some(PasswordIssue::TooLong(policy.max_length))
    } else if policy.require_uppercase
        && !password.chars().any(char::is_uppercase)
    {
        Some(PasswordIssue::MissingUppercase)
    } else if policy.require_lowercase
        && !password.chars().any(char::is_lowercase)
    {
        Some(PasswordIssue::MissingLowercase)
    } else if policy.require_digit
        && !password.chars().any(|c| c.is_ascii_digit())
    {
        Some(PasswordIssue::MissingDigit)
    } else if policy.require_symbol
        && !password.chars().any(|c| policy.symbols.contains(c))
    {
        Some(PasswordIssue::MissingSymbol)
    } else {
        None
    };

    match issue {
        Some(issue) => Err(ValidationError::WeakPassword(issue)),
        None => Ok(()),
    }
}

/// Whole years elapsed between `date_of_birth` and `today`.
///
/// `None` if `date_of_birth` is after `today`.
pub fn age_on(date_of_birth: NaiveDate, today: NaiveDate) -> Option<u32> {
    today.years_since(date_of_birth)
}

/// Parse a date of birth and derive the age on `today`.
pub fn validate_date_of_birth(
    raw: &str,
    today: NaiveDate,
) -> Result<(NaiveDate, u32)> {
    let date = NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(
        |_| ValidationError::InvalidDateOfBirth(DateIssue::Unparseable),
    )?;

    age_on(date, today)
        .map(|age| (date, age))
        .ok_or(ValidationError::InvalidDateOfBirth(DateIssue::InFuture))
}

/// Refuse an email already present on `users`.
pub fn ensure_unique_email(users: &[User], email: &str) -> Result<()> {
    if users.iter().any(|user| user.email.eq_ignore_ascii_case(email)) {
        Err(ValidationError::DuplicateEmail)
    } else {
        Ok(())
    }
}

/// Validate a whole [`Registration`] into a [`NewUser`].
///
/// The password is kept as sent; hashing happens before storage.
pub fn validate(
    registration: &Registration,
    policy: &Policy,
    today: NaiveDate,
) -> Result<NewUser> {
    validate_name(&registration.name, &policy.name)?;
    let email = validate_email(&registration.email, &policy.allowed_domains)?;
    validate_phone(&registration.phone, &policy.phone)?;
    validate_password(&registration.password, &policy.password)?;
    let (date_of_birth, age) =
        validate_date_of_birth(&registration.date_of_birth, today)?;
    registration.validate()?;

    Ok(NewUser {
        name: registration.name.trim().to_owned(),
        email,
        phone: registration.phone.clone(),
        password: registration.password.clone(),
        date_of_birth,
        age,
        username: registration.username.clone(),
        gender: registration.gender,
        country: registration.country.clone(),
        city: registration.city.clone(),
        accept_marketing_emails: registration.accept_marketing_emails,
    })
}
