use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::user::errors::EmailError;
use crate::user::errors::PasswordPolicyError;
use crate::user::errors::UserIdError;

/// User aggregate entity.
///
/// Represents a registered account. `password_hash` is a PHC string, never
/// the plaintext.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub email: EmailAddress,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// User unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a new random user ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a user ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, UserIdError> {
        Uuid::parse_str(s)
            .map(UserId)
            .map_err(|e| UserIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Validated with an RFC 5322 parser; the domain must also contain a dot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a validated email address, keeping the input as-is.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322 or has no TLD
    pub fn new(email: String) -> Result<Self, EmailError> {
        let parsed = email_address::EmailAddress::from_str(&email)
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))?;

        let domain = parsed.domain();
        if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
            return Err(EmailError::InvalidFormat(format!(
                "Domain '{}' has no top-level domain",
                domain
            )));
        }

        Ok(EmailAddress(email))
    }

    /// Normalize then validate an email address.
    ///
    /// Lowercases the address and canonicalizes provider-specific aliases:
    /// Gmail ignores dots and `+tag` suffixes, Outlook and iCloud ignore
    /// `+tag`, Yahoo ignores `-tag`.
    ///
    /// # Errors
    /// * `InvalidFormat` - Normalized address is not a valid email
    pub fn normalized(email: &str) -> Result<Self, EmailError> {
        Self::new(normalize(email))
    }

    /// Get email as string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

const GMAIL_DOMAINS: &[&str] = &["gmail.com", "googlemail.com"];
const PLUS_TAG_DOMAINS: &[&str] = &[
    "outlook.com",
    "hotmail.com",
    "live.com",
    "icloud.com",
    "me.com",
    "mac.com",
];
const DASH_TAG_DOMAINS: &[&str] = &["yahoo.com", "ymail.com", "rocketmail.com"];

fn normalize(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let Some((local, domain)) = lowered.rsplit_once('@') else {
        return lowered;
    };

    if GMAIL_DOMAINS.contains(&domain) {
        let local = strip_tag(local, '+').replace('.', "");
        format!("{}@gmail.com", local)
    } else if PLUS_TAG_DOMAINS.contains(&domain) {
        format!("{}@{}", strip_tag(local, '+'), domain)
    } else if DASH_TAG_DOMAINS.contains(&domain) {
        format!("{}@{}", strip_tag(local, '-'), domain)
    } else {
        lowered
    }
}

fn strip_tag(local: &str, separator: char) -> &str {
    local
        .split_once(separator)
        .map_or(local, |(base, _)| base)
}

/// Plaintext password as submitted by a client.
///
/// Never logged: the `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    pub const MIN_LENGTH: usize = 8;

    /// Accept a new password that satisfies the length policy.
    ///
    /// Length is counted in characters, not bytes.
    ///
    /// # Errors
    /// * `TooShort` - Fewer than 8 characters
    pub fn new(password: String) -> Result<Self, PasswordPolicyError> {
        let actual = password.chars().count();
        if actual < Self::MIN_LENGTH {
            return Err(PasswordPolicyError::TooShort {
                min: Self::MIN_LENGTH,
                actual,
            });
        }
        Ok(Self(password))
    }

    /// Wrap a password presented at login. No policy applies, it only has to
    /// match the stored hash.
    pub fn presented(password: String) -> Self {
        Self(password)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// Command to register a new user with domain types
#[derive(Debug)]
pub struct RegisterCommand {
    pub email: EmailAddress,
    pub password: Password,
}

impl RegisterCommand {
    pub fn new(email: EmailAddress, password: Password) -> Self {
        Self { email, password }
    }
}

/// Command to exchange credentials for a session token
#[derive(Debug)]
pub struct LoginCommand {
    pub email: EmailAddress,
    pub password: Password,
}

impl LoginCommand {
    pub fn new(email: EmailAddress, password: Password) -> Self {
        Self { email, password }
    }
}

/// Issued session token for an authenticated user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: UserId,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}
