// Headers used by the Cinco signing protocols.
pub const CONTENT_MD5: &str = "content-md5";
pub const SIGNATURE_VERSION: &str = "signature-version";
pub const X_AMZ_DATE: &str = "x-amz-date";

/// Content type every signed request defaults to.
pub const CONTENT_TYPE_JSON: &str = "application/json; charset=UTF-8";

// Fixed credential scope components. The Cinco API is not a real AWS
// service, so the "service" and "region" slots are pinned.
pub const CINCO_SERVICE: &str = "cinco";
pub const CINCO_REGION: &str = "internal";
