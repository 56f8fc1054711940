//! The legacy Cinco signing protocol.
//!
//! Kept for backward compatibility with clients that predate the V4 scheme.
//! The string-to-sign is a simple newline-joined sequence terminated by the
//! literal protocol version marker `1`.

use std::fmt::Write;

use http::header::{AUTHORIZATION, CONTENT_TYPE, DATE};
use http::request::Parts;
use http::{HeaderMap, HeaderValue};
use log::debug;

use crate::constants::{CONTENT_MD5, CONTENT_TYPE_JSON, SIGNATURE_VERSION};
use crate::hash::{base64_hmac_sha256, hex_md5};
use crate::time::{format_iso8601_millis, now, DateTime};
use crate::{ApiKey, Error, Result};

/// RequestSigner that implements the legacy Cinco V1 scheme.
///
/// Produces `Authorization: CINCO <keyId>:<base64-hmac-sha256>` together
/// with a millisecond ISO8601 `Date` header.
#[derive(Debug, Default)]
pub struct RequestSigner {
    time: Option<DateTime>,
}

impl RequestSigner {
    /// Create a new V1 signer.
    pub fn new() -> Self {
        Self { time: None }
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    #[cfg(test)]
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Sign the request in place.
    ///
    /// The legacy protocol emits a fixed header set; anything the caller put
    /// on the request is dropped rather than merged.
    pub fn sign(&self, key: &ApiKey, req: &mut Parts, body: Option<&[u8]>) -> Result<()> {
        if !key.is_valid() {
            return Err(Error::credential_invalid(
                "api key must carry both key id and secret",
            ));
        }

        let signing_time = self.time.unwrap_or_else(now);
        let timestamp = format_iso8601_millis(signing_time);
        let body_md5 = body.map(hex_md5);

        let string_to_sign = {
            let mut s = String::new();
            writeln!(s, "{}", req.method)?;
            writeln!(s, "{}", req.uri.path())?;
            writeln!(s, "{timestamp}")?;
            if let Some(md5) = &body_md5 {
                writeln!(s, "{md5}")?;
            }
            // Protocol version marker, no trailing newline.
            write!(s, "1")?;
            s
        };
        debug!("calculated string to sign: {string_to_sign}");

        let signature = base64_hmac_sha256(key.secret.as_bytes(), string_to_sign.as_bytes());

        let mut headers = HeaderMap::with_capacity(5);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_JSON));
        headers.insert(DATE, timestamp.parse()?);
        headers.insert(SIGNATURE_VERSION, HeaderValue::from_static("1"));
        if let Some(md5) = &body_md5 {
            headers.insert(CONTENT_MD5, md5.parse()?);
        }

        let mut authorization: HeaderValue =
            format!("CINCO {}:{}", key.key_id, signature).parse()?;
        authorization.set_sensitive(true);
        headers.insert(AUTHORIZATION, authorization);

        req.headers = headers;
        Ok(())
    }
}
