//! Hash related utils.

use std::fmt;
use std::str::FromStr;

use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use hmac::Hmac;
use hmac::Mac;
use md5::Md5;
use sha1::Sha1;
use sha2::Digest;
use sha2::Sha256;

use crate::Error;

/// Digest algorithms supported by [`hash_hex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    /// MD5, used for body checksums (`Content-MD5`).
    Md5,
    /// SHA-1.
    Sha1,
    /// SHA-256, used for canonical request hashing and the HMAC chain.
    Sha256,
}

impl HashAlgorithm {
    /// Return the canonical lowercase name of this algorithm.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Md5 => "md5",
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "md5" | "md-5" => Ok(Self::Md5),
            "sha1" | "sha-1" => Ok(Self::Sha1),
            "sha256" | "sha-256" => Ok(Self::Sha256),
            _ => Err(Error::config_invalid(format!(
                "unsupported hash algorithm: {s}"
            ))),
        }
    }
}

/// Hex encoded digest over one or more buffers, fed in order.
pub fn hash_hex(algorithm: HashAlgorithm, buffers: &[&[u8]]) -> String {
    fn digest_all<D: Digest>(buffers: &[&[u8]]) -> Vec<u8> {
        let mut d = D::new();
        for buf in buffers {
            d.update(buf);
        }
        d.finalize().to_vec()
    }

    match algorithm {
        HashAlgorithm::Md5 => hex::encode(digest_all::<Md5>(buffers)),
        HashAlgorithm::Sha1 => hex::encode(digest_all::<Sha1>(buffers)),
        HashAlgorithm::Sha256 => hex::encode(digest_all::<Sha256>(buffers)),
    }
}

/// Base64 encode
pub fn base64_encode(content: &[u8]) -> String {
    BASE64_STANDARD.encode(content)
}

/// Base64 decode
pub fn base64_decode(content: &str) -> crate::Result<Vec<u8>> {
    BASE64_STANDARD
        .decode(content)
        .map_err(|e| Error::unexpected("base64 decode failed").with_source(e))
}

/// Hex encoded MD5 hash.
pub fn hex_md5(content: &[u8]) -> String {
    hex::encode(Md5::digest(content).as_slice())
}

/// Hex encoded SHA256 hash.
///
/// Use this function instead of `hex::encode(sha256(content))` can reduce
/// extra copy.
pub fn hex_sha256(content: &[u8]) -> String {
    hex::encode(Sha256::digest(content).as_slice())
}

/// HMAC with SHA256 hash.
pub fn hmac_sha256(key: &[u8], content: &[u8]) -> Vec<u8> {
    // SAFETY: HMAC's new_from_slice always returns Ok - it handles any key length
    let mut h = Hmac::<Sha256>::new_from_slice(key).unwrap();
    h.update(content);

    h.finalize().into_bytes().to_vec()
}

/// Hex encoded HMAC with SHA256 hash.
///
/// Use this function instead of `hex::encode(hmac_sha256(key, content))` can
/// reduce extra copy.
pub fn hex_hmac_sha256(key: &[u8], content: &[u8]) -> String {
    // SAFETY: HMAC's new_from_slice always returns Ok - it handles any key length
    let mut h = Hmac::<Sha256>::new_from_slice(key).unwrap();
    h.update(content);

    hex::encode(h.finalize().into_bytes())
}

/// Base64 encoded HMAC with SHA256 hash.
pub fn base64_hmac_sha256(key: &[u8], content: &[u8]) -> String {
    // SAFETY: HMAC's new_from_slice always returns Ok - it handles any key length
    let mut h = Hmac::<Sha256>::new_from_slice(key).unwrap();
    h.update(content);

    base64_encode(&h.finalize().into_bytes())
}
