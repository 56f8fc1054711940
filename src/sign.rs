//! Entry point dispatching between the two Cinco signing protocols.

use http::request::Parts;

use crate::{v1, v4, ApiKey, Result};

/// Wire protocol used to sign a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SigningVersion {
    /// The legacy newline string-to-sign scheme, kept for backward
    /// compatibility.
    V1,
    /// The SigV4-shaped canonical signing scheme. The default.
    #[default]
    V4,
}

/// Signer routes requests to the selected protocol implementation.
///
/// Signing is pure and reads no shared state, so a `Signer` can be shared
/// across threads freely.
///
/// # Example
///
/// ```no_run
/// use cincosign::{ApiKey, Signer, SigningVersion};
///
/// fn main() -> cincosign::Result<()> {
///     let key = ApiKey::new("my_key", "my_secret");
///     let (mut parts, body) = http::Request::post("http://localhost:5000/projects")
///         .body(r#"{"comments":"You can dance if you want to"}"#)
///         .expect("request must be valid")
///         .into_parts();
///
///     let signer = Signer::new(SigningVersion::V4);
///     signer.sign(&key, &mut parts, Some(body.as_bytes()))?;
///     Ok(())
/// }
/// ```
#[derive(Debug, Default)]
pub struct Signer {
    version: SigningVersion,
    v1: v1::RequestSigner,
    v4: v4::RequestSigner,
}

impl Signer {
    /// Create a new signer for the given protocol version.
    pub fn new(version: SigningVersion) -> Self {
        Self {
            version,
            v1: v1::RequestSigner::new(),
            v4: v4::RequestSigner::new(),
        }
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    #[cfg(test)]
    pub fn with_time(mut self, time: crate::time::DateTime) -> Self {
        self.v1 = self.v1.with_time(time);
        self.v4 = self.v4.with_time(time);
        self
    }

    /// Sign the request in place with the selected protocol.
    ///
    /// Pure routing; the result is exactly what the protocol signer
    /// produced.
    pub fn sign(&self, key: &ApiKey, req: &mut Parts, body: Option<&[u8]>) -> Result<()> {
        match self.version {
            SigningVersion::V1 => self.v1.sign(key, req, body),
            SigningVersion::V4 => self.v4.sign(key, req, body),
        }
    }
}
