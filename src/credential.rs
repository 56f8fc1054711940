use std::fmt::{Debug, Formatter};

use crate::utils::Redact;

/// Shared key that identifies a service client against the Cinco API.
///
/// Supplied by the caller on every signing call; this library never stores
/// or loads key material itself.
#[derive(Default, Clone)]
pub struct ApiKey {
    /// Key id, sent in clear as part of the authorization header.
    pub key_id: String,
    /// Shared secret used as HMAC key material. Never sent on the wire.
    pub secret: String,
}

impl ApiKey {
    /// Create a new api key.
    pub fn new(key_id: &str, secret: &str) -> Self {
        Self {
            key_id: key_id.to_string(),
            secret: secret.to_string(),
        }
    }

    /// Both halves must be present before signing. Signing with an empty
    /// secret would produce a signature the backend can never verify.
    pub fn is_valid(&self) -> bool {
        !self.key_id.is_empty() && !self.secret.is_empty()
    }
}

impl Debug for ApiKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKey")
            .field("key_id", &Redact::from(&self.key_id))
            .field("secret", &Redact::from(&self.secret))
            .finish()
    }
}
