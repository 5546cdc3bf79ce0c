use std::env;

use crate::configuration::AwsCredentialsConfig;
use crate::errors::AwsError;

/// Resolve storage credentials: the config file wins, the standard AWS
/// environment variables are the fallback.
pub fn resolve_credentials(
    config: &AwsCredentialsConfig,
) -> Result<(String, String, Option<String>), AwsError> {
    let access_key_id = config
        .access_key_id
        .clone()
        .or_else(|| env::var("AWS_ACCESS_KEY_ID").ok())
        .ok_or_else(|| AwsError::CredentialError("AWS_ACCESS_KEY_ID not found".to_string()))?;

    let secret_access_key = config
        .secret_access_key
        .clone()
        .or_else(|| env::var("AWS_SECRET_ACCESS_KEY").ok())
        .ok_or_else(|| AwsError::CredentialError("AWS_SECRET_ACCESS_KEY not found".to_string()))?;

    let session_token = config
        .session_token
        .clone()
        .or_else(|| env::var("AWS_SESSION_TOKEN").ok());

    Ok((access_key_id, secret_access_key, session_token))
}
