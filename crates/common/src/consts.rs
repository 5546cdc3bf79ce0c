/// Header carrying a caller-assigned request id; minted when absent.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

pub const CONFIG_PATH_ENV: &str = "BLUEPENCIL_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "./bluepencil.yaml";

pub const BIND_ADDRESS_ENV: &str = "BIND_ADDRESS";
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

pub const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";

/// Service name used when signing object-storage requests.
pub const S3_SERVICE_NAME: &str = "s3";

/// Fallback extension when the source URL path carries none.
pub const DEFAULT_MEDIA_EXTENSION: &str = "jpg";
