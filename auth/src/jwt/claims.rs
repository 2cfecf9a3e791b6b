use std::collections::HashMap;

use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Claim carrying the user identifier in session tokens.
pub const USER_ID_CLAIM: &str = "userId";

/// JWT claims for session tokens.
///
/// Registered claims (RFC 7519) used by the service plus custom fields via
/// the flattened `extra` map.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Subject (user identifier)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Expiration time (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    /// Issued at (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Claims {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create session claims for a user, valid for `lifetime` from now.
    ///
    /// The identifier is written both to `sub` and to the `userId` claim.
    pub fn for_user(user_id: impl ToString, lifetime: Duration) -> Self {
        let now = Utc::now();
        let user_id = user_id.to_string();

        Self::new()
            .with_subject(&user_id)
            .with_issued_at(now.timestamp())
            .with_expiration((now + lifetime).timestamp())
            .with_extra(USER_ID_CLAIM, user_id)
    }

    pub fn with_subject(mut self, sub: impl ToString) -> Self {
        self.sub = Some(sub.to_string());
        self
    }

    pub fn with_expiration(mut self, exp: i64) -> Self {
        self.exp = Some(exp);
        self
    }

    pub fn with_issued_at(mut self, iat: i64) -> Self {
        self.iat = Some(iat);
        self
    }

    /// Add a custom field. Values that fail to serialize are skipped.
    pub fn with_extra(mut self, key: impl ToString, value: impl Serialize) -> Self {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.extra.insert(key.to_string(), json_value);
        }
        self
    }

    /// User identifier carried by the token.
    ///
    /// Reads the `userId` claim, falling back to `sub`.
    pub fn user_id(&self) -> Option<&str> {
        self.extra
            .get(USER_ID_CLAIM)
            .and_then(|v| v.as_str())
            .or(self.sub.as_deref())
    }
}
