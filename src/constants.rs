pub const CERT_CHAIN_URL_HEADER: &str = "signaturecertchainurl";
pub const SIGNATURE_HEADER: &str = "signature";
pub const CERT_CHAIN_URL_SCHEME: &str = "https";
pub const CERT_CHAIN_URL_HOSTNAME: &str = "s3.amazonaws.com";
pub const CERT_CHAIN_URL_STARTPATH: &str = "/echo.api/";
pub const CERT_CHAIN_URL_PORT: u16 = 443;
pub const CERT_CHAIN_DOMAIN: &str = "echo-api.amazon.com";
pub const MIN_REMAINING_VALIDITY_DAYS: i64 = 1;
pub const MAX_CACHED_CERTIFICATES: usize = 16;
pub const DEFAULT_TIMESTAMP_TOLERANCE_IN_SECS: i64 = 100;
pub const MAX_TIMESTAMP_TOLERANCE_IN_SECS: i64 = 150;
pub const ENVELOPE_VERSION: &str = "1.0";
pub const LAUNCH_REQUEST: &str = "LaunchRequest";
pub const INTENT_REQUEST: &str = "IntentRequest";
pub const SESSION_ENDED_REQUEST: &str = "SessionEndedRequest";
