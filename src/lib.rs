//! Signing Cinco API requests without effort.
//!
//! This crate signs outbound HTTP requests made by internal service clients
//! against the Cinco API, using a shared [`ApiKey`] instead of a login
//! session. Two wire protocols coexist:
//!
//! - **V1**: the legacy scheme, a newline-joined string-to-sign signed with
//!   HMAC-SHA256 and carried as `Authorization: CINCO <keyId>:<signature>`.
//! - **V4**: the default, an AWS-SigV4-shaped canonical signing process
//!   pinned to the pseudo scope `<date>/internal/cinco/aws4_request`.
//!
//! Signing is a pure function of the key, the request and the clock: no
//! I/O, no shared state, no retries. The signers only augment (or, for V1,
//! replace) the request headers; sending the request is the caller's job.
//!
//! ## Example
//!
//! ```no_run
//! use cincosign::{ApiKey, Signer, SigningVersion};
//!
//! fn main() -> cincosign::Result<()> {
//!     let key = ApiKey::new("my_key", "my_secret");
//!
//!     // Construct the request as usual.
//!     let (mut parts, body) = http::Request::post("http://localhost:5000/projects")
//!         .body(r#"{"comments":"You can dance if you want to"}"#)
//!         .expect("request must be valid")
//!         .into_parts();
//!
//!     // Sign it. V4 is the default; V1 stays available for old clients.
//!     let signer = Signer::new(SigningVersion::V4);
//!     signer.sign(&key, &mut parts, Some(body.as_bytes()))?;
//!
//!     // parts.headers now carries Authorization, Signature-Version,
//!     // X-Amz-Date, Host, Content-Type, Content-MD5 and Content-Length.
//!     Ok(())
//! }
//! ```
//!
//! ## Utilities
//!
//! - [`hash`]: hex/base64 digest and HMAC helpers shared by both protocols
//! - [`time`]: timestamp formatting helpers
//! - [`ApiError`]: maps failed API responses into typed errors

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;

mod constants;

mod credential;
pub use credential::ApiKey;

mod error;
pub use error::{Error, ErrorKind, Result};

mod response;
pub use response::ApiError;

mod sign;
pub use sign::{Signer, SigningVersion};

pub mod v1;
pub mod v4;
