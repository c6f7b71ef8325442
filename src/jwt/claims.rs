use chrono::{TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims of the tokens a cluster CA signs.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Issuer. The cluster name of the signing CA.
    pub(crate) iss: String,
    /// Subject (whom token refers to).
    pub(crate) sub: String,
    /// Audience.
    pub(crate) aud: String,
    /// JWT ID. Must not be reused. Using UID.
    pub(crate) jti: Uuid,
    /// Issued at (as UTC timestamp).
    pub(crate) iat: u64,
    /// Expiration time (as UTC timestamp).
    pub(crate) exp: u64,
}

impl Clone for Claims {
    /// Clone the Claims instance. This implies a new UUID will be generated as its `jti`.
    fn clone(&self) -> Self {
        Self {
            iss: self.iss.clone(),
            sub: self.sub.clone(),
            aud: self.aud.clone(),
            jti: Uuid::now_v7(),
            iat: self.iat,
            exp: self.exp,
        }
    }
}

impl Claims {
    /// Create claims issued now and valid for `ttl`.
    pub fn new(issuer: String, subject: String, audience: String, ttl: TimeDelta) -> Self {
        let now = Utc::now();
        Self {
            iss: issuer,
            sub: subject,
            aud: audience,
            jti: Uuid::now_v7(), // Non-reusable JWT ID
            iat: now.timestamp().max(0) as u64,
            exp: (now + ttl).timestamp().max(0) as u64,
        }
    }

    pub fn issuer(&self) -> &str {
        &self.iss
    }

    pub fn subject(&self) -> &str {
        &self.sub
    }

    pub fn expires_at(&self) -> u64 {
        self.exp
    }
}
