//! The Cinco V4 signing protocol.
//!
//! A SigV4-shaped canonical signing process pinned to the pseudo scope
//! `<date>/internal/cinco/aws4_request`. This is the default protocol.

use std::fmt;
use std::fmt::Display;
use std::fmt::Write;

use http::header::{AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, HOST};
use http::request::Parts;
use http::HeaderValue;
use log::debug;

use crate::constants::{
    CINCO_REGION, CINCO_SERVICE, CONTENT_MD5, CONTENT_TYPE_JSON, SIGNATURE_VERSION, X_AMZ_DATE,
};
use crate::hash::{hex_hmac_sha256, hex_md5, hex_sha256, hmac_sha256};
use crate::time::{format_date, format_iso8601, now, DateTime};
use crate::{ApiKey, Error, Result};

/// RequestSigner that implements the Cinco V4 scheme.
///
/// - [Signature Version 4 signing process](https://docs.aws.amazon.com/general/latest/gr/signature-version-4.html)
#[derive(Debug, Default)]
pub struct RequestSigner {
    time: Option<DateTime>,
}

impl RequestSigner {
    /// Create a new V4 signer.
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

    /// Sign the request in place, augmenting its headers.
    pub fn sign(&self, key: &ApiKey, req: &mut Parts, body: Option<&[u8]>) -> Result<()> {
        if !key.is_valid() {
            return Err(Error::credential_invalid(
                "api key must carry both key id and secret",
            ));
        }

        let signing_time = self.time.unwrap_or_else(now);

        canonicalize_headers(req, body, signing_time)?;

        let creq = CanonicalRequest::build(req, body)?;
        debug!("calculated canonical request: {creq}");
        let encoded_req = hex_sha256(creq.to_string().as_bytes());

        // Scope: "20220313/internal/cinco/aws4_request"
        let scope = format!(
            "{}/{}/{}/aws4_request",
            format_date(signing_time),
            CINCO_REGION,
            CINCO_SERVICE
        );
        debug!("calculated scope: {scope}");

        // StringToSign:
        //
        // AWS4-HMAC-SHA256
        // 20220313T072004Z
        // 20220313/internal/cinco/aws4_request
        // <hashed_canonical_request>
        let string_to_sign = {
            let mut f = String::new();
            writeln!(f, "AWS4-HMAC-SHA256")?;
            writeln!(f, "{}", format_iso8601(signing_time))?;
            writeln!(f, "{}", &scope)?;
            write!(f, "{}", &encoded_req)?;
            f
        };
        debug!("calculated string to sign: {string_to_sign}");

        let signing_key = generate_signing_key(&key.secret, signing_time);
        let signature = hex_hmac_sha256(&signing_key, string_to_sign.as_bytes());

        let mut authorization = HeaderValue::from_str(&format!(
            "AWS4-HMAC-SHA256 Credential={}/{}, SignedHeaders={}, Signature={}",
            key.key_id,
            scope,
            creq.signed_headers.join(";"),
            signature
        ))?;
        authorization.set_sensitive(true);
        req.headers.insert(AUTHORIZATION, authorization);

        Ok(())
    }
}

/// Ensure every header the protocol signs is present on the request.
fn canonicalize_headers(req: &mut Parts, body: Option<&[u8]>, signing_time: DateTime) -> Result<()> {
    // Header values need to be trimmed before they enter the canonical
    // request.
    for (_, value) in req.headers.iter_mut() {
        normalize_header_value(value);
    }

    if !req.headers.contains_key(CONTENT_TYPE) {
        req.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_JSON));
    }

    req.headers
        .insert(SIGNATURE_VERSION, HeaderValue::from_static("4"));

    if let Some(body) = body {
        req.headers.insert(CONTENT_MD5, hex_md5(body).parse()?);
        req.headers
            .insert(CONTENT_LENGTH, HeaderValue::from(body.len()));
    }

    if !req.headers.contains_key(HOST) {
        let authority = req.uri.authority().ok_or_else(|| {
            Error::request_invalid("request without authority is invalid for signing")
        })?;
        req.headers.insert(HOST, authority.as_str().parse()?);
    }

    if !req.headers.contains_key(X_AMZ_DATE) {
        req.headers
            .insert(X_AMZ_DATE, format_iso8601(signing_time).parse()?);
    }

    Ok(())
}

fn normalize_header_value(value: &mut HeaderValue) {
    let bs = value.as_bytes();

    let start = bs.iter().position(|b| *b != b' ').unwrap_or(0);
    let end = bs.len() - bs.iter().rev().position(|b| *b != b' ').unwrap_or(0);

    // This can't fail because we started with a valid HeaderValue and then
    // only trimmed spaces.
    *value = HeaderValue::from_bytes(&bs[start..end]).expect("invalid header value")
}

/// The normalized request representation the signature is computed over.
///
/// Lives only for the duration of one signing call.
struct CanonicalRequest {
    method: http::Method,
    canonical_uri: String,
    canonical_headers: Vec<(String, String)>,
    signed_headers: Vec<String>,
    hashed_payload: String,
}

impl CanonicalRequest {
    fn build(req: &Parts, body: Option<&[u8]>) -> Result<Self> {
        let mut canonical_uri = req.uri.path().to_string();
        if canonical_uri != "/" && canonical_uri.ends_with('/') {
            canonical_uri.pop();
        }
        // The raw query is folded into the canonical URI and the canonical
        // query-string line stays empty. Strict SigV4 canonicalizes the
        // query separately; the Cinco verifier derives its headers from
        // this simpler form, so changing it would invalidate every
        // signature already in the wild.
        if let Some(query) = req.uri.query() {
            write!(canonical_uri, "?{query}")?;
        }

        let mut canonical_headers = req
            .headers
            .iter()
            .map(|(name, value)| {
                Ok((
                    name.as_str().to_lowercase(),
                    value.to_str()?.trim().to_string(),
                ))
            })
            .collect::<Result<Vec<_>>>()?;
        canonical_headers.sort();

        let signed_headers = canonical_headers
            .iter()
            .map(|(name, _)| name.clone())
            .collect();

        Ok(CanonicalRequest {
            method: req.method.clone(),
            canonical_uri,
            canonical_headers,
            signed_headers,
            hashed_payload: hex_sha256(body.unwrap_or_default()),
        })
    }
}

impl Display for CanonicalRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.method)?;
        writeln!(f, "{}", self.canonical_uri)?;
        // Canonical query string line, always empty (see build).
        writeln!(f)?;
        for (name, value) in &self.canonical_headers {
            writeln!(f, "{name}:{value}")?;
        }
        writeln!(f)?;
        writeln!(f, "{}", self.signed_headers.join(";"))?;
        write!(f, "{}", self.hashed_payload)
    }
}

fn generate_signing_key(secret: &str, time: DateTime) -> Vec<u8> {
    // Sign secret
    let secret = format!("AWS4{secret}");
    // Sign date
    let sign_date = hmac_sha256(secret.as_bytes(), format_date(time).as_bytes());
    // Sign region
    let sign_region = hmac_sha256(sign_date.as_slice(), CINCO_REGION.as_bytes());
    // Sign service
    let sign_service = hmac_sha256(sign_region.as_slice(), CINCO_SERVICE.as_bytes());
    // Sign request
    hmac_sha256(sign_service.as_slice(), "aws4_request".as_bytes())
}

#[cfg(test)]
mod tests {
    use http::Request;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::ErrorKind;

    fn test_time() -> DateTime {
        chrono::DateTime::parse_from_rfc3339("2022-03-13T07:20:04Z")
            .expect("must be valid rfc3339")
            .with_timezone(&chrono::Utc)
    }

    fn test_key() -> ApiKey {
        ApiKey::new("test_key", "test_secret")
    }

    #[test]
    fn test_sign_get_without_body() {
        let _ = env_logger::builder().is_test(true).try_init();

        let (mut parts, _) = Request::get("http://localhost:5000/projects")
            .body(())
            .expect("request must be valid")
            .into_parts();

        let signer = RequestSigner::new().with_time(test_time());
        signer
            .sign(&test_key(), &mut parts, None)
            .expect("must sign");

        assert_eq!(parts.headers[CONTENT_TYPE], CONTENT_TYPE_JSON);
        assert_eq!(parts.headers[HOST], "localhost:5000");
        assert_eq!(parts.headers[SIGNATURE_VERSION], "4");
        assert_eq!(parts.headers[X_AMZ_DATE], "20220313T072004Z");
        assert!(parts.headers.get(CONTENT_MD5).is_none());
        assert!(parts.headers.get(CONTENT_LENGTH).is_none());
        assert_eq!(
            parts.headers[AUTHORIZATION],
            "AWS4-HMAC-SHA256 Credential=test_key/20220313/internal/cinco/aws4_request, \
             SignedHeaders=content-type;host;signature-version;x-amz-date, \
             Signature=f4055de7e2d84ba502deeccda27f05ff4360596184c025e32043aebc87b104c0"
        );
    }

    #[test]
    fn test_sign_post_with_body() {
        let _ = env_logger::builder().is_test(true).try_init();

        let body = br#"{"comments":"You can dance if you want to"}"#;
        let (mut parts, _) = Request::post("http://localhost:5000/projects")
            .body(())
            .expect("request must be valid")
            .into_parts();

        let signer = RequestSigner::new().with_time(test_time());
        signer
            .sign(&test_key(), &mut parts, Some(body))
            .expect("must sign");

        assert_eq!(parts.headers[CONTENT_LENGTH], "43");
        assert_eq!(
            parts.headers[CONTENT_MD5],
            "082483c6aa229cb8487e562f2c5f2668"
        );
        assert_eq!(
            parts.headers[AUTHORIZATION],
            "AWS4-HMAC-SHA256 Credential=test_key/20220313/internal/cinco/aws4_request, \
             SignedHeaders=content-length;content-md5;content-type;host;signature-version;x-amz-date, \
             Signature=3c040d651714d6c0135a663b1b15b33ce0466285e4c3bd17fbefa77d3690dc2c"
        );
    }

    #[test]
    fn test_sign_trims_trailing_slash_and_folds_query() {
        let _ = env_logger::builder().is_test(true).try_init();

        let (mut parts, _) = Request::get("http://localhost:5000/projects/?foo=bar&baz=1")
            .body(())
            .expect("request must be valid")
            .into_parts();

        let signer = RequestSigner::new().with_time(test_time());
        signer
            .sign(&test_key(), &mut parts, None)
            .expect("must sign");

        assert_eq!(
            parts.headers[AUTHORIZATION],
            "AWS4-HMAC-SHA256 Credential=test_key/20220313/internal/cinco/aws4_request, \
             SignedHeaders=content-type;host;signature-version;x-amz-date, \
             Signature=57e1ba1802aefad36fb72435f638869a63e685d9842dd88549205a4740133902"
        );
    }

    #[test]
    fn test_canonical_uri() {
        let cases = vec![
            ("http://localhost:5000/", "/"),
            ("http://localhost:5000/projects", "/projects"),
            ("http://localhost:5000/projects/", "/projects"),
            ("http://localhost:5000/projects//", "/projects/"),
            ("http://localhost:5000/projects?a=1&b=2", "/projects?a=1&b=2"),
            ("http://localhost:5000/projects/?a=1", "/projects?a=1"),
        ];

        for (uri, expect) in cases {
            let (parts, _) = Request::get(uri)
                .body(())
                .expect("request must be valid")
                .into_parts();
            let creq = CanonicalRequest::build(&parts, None).expect("must build");
            assert_eq!(creq.canonical_uri, expect, "uri: {uri}");
        }
    }

    #[test]
    fn test_canonical_request_layout() {
        let (mut parts, _) = Request::get("http://localhost:5000/projects")
            .body(())
            .expect("request must be valid")
            .into_parts();
        canonicalize_headers(&mut parts, None, test_time()).expect("must canonicalize");

        let creq = CanonicalRequest::build(&parts, None).expect("must build");
        assert_eq!(
            creq.to_string(),
            "GET\n\
             /projects\n\
             \n\
             content-type:application/json; charset=UTF-8\n\
             host:localhost:5000\n\
             signature-version:4\n\
             x-amz-date:20220313T072004Z\n\
             \n\
             content-type;host;signature-version;x-amz-date\n\
             e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_caller_headers_are_signed() {
        let (mut parts, _) = Request::get("http://localhost:5000/projects")
            .header("X-Request-Id", "  abc123  ")
            .body(())
            .expect("request must be valid")
            .into_parts();

        let signer = RequestSigner::new().with_time(test_time());
        signer
            .sign(&test_key(), &mut parts, None)
            .expect("must sign");

        let auth = parts.headers[AUTHORIZATION]
            .to_str()
            .expect("must be valid");
        assert!(auth.contains(
            "SignedHeaders=content-type;host;signature-version;x-amz-date;x-request-id"
        ));
        // Values get trimmed before signing.
        assert_eq!(parts.headers["x-request-id"], "abc123");
    }

    #[test]
    fn test_sign_is_deterministic() {
        let build = || {
            Request::get("http://localhost:5000/projects?page=1")
                .body(())
                .expect("request must be valid")
                .into_parts()
                .0
        };

        let signer = RequestSigner::new().with_time(test_time());
        let mut first = build();
        let mut second = build();
        signer.sign(&test_key(), &mut first, None).expect("must sign");
        signer
            .sign(&test_key(), &mut second, None)
            .expect("must sign");

        assert_eq!(first.headers, second.headers);
    }

    #[test]
    fn test_sign_rejects_missing_authority() {
        let (mut parts, _) = Request::get("/projects")
            .body(())
            .expect("request must be valid")
            .into_parts();

        let err = RequestSigner::new()
            .with_time(test_time())
            .sign(&test_key(), &mut parts, None)
            .expect_err("must not sign without authority");
        assert_eq!(err.kind(), ErrorKind::RequestInvalid);
    }

    #[test]
    fn test_sign_rejects_missing_secret() {
        let (mut parts, _) = Request::get("http://localhost:5000/projects")
            .body(())
            .expect("request must be valid")
            .into_parts();

        let err = RequestSigner::new()
            .sign(&ApiKey::new("test_key", ""), &mut parts, None)
            .expect_err("must not sign with empty secret");
        assert_eq!(err.kind(), ErrorKind::CredentialInvalid);
    }

    #[test]
    fn test_signature_is_64_hex_chars() {
        let (mut parts, _) = Request::get("http://localhost:5000/projects")
            .body(())
            .expect("request must be valid")
            .into_parts();

        let signer = RequestSigner::new().with_time(test_time());
        signer
            .sign(&test_key(), &mut parts, None)
            .expect("must sign");

        let auth = parts.headers[AUTHORIZATION]
            .to_str()
            .expect("must be valid");
        let signature = auth
            .rsplit_once("Signature=")
            .expect("must carry signature")
            .1;
        assert_eq!(signature.len(), 64);
        assert!(signature.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
