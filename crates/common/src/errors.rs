use thiserror::Error;

#[derive(Debug, Error)]
pub enum AwsError {
    #[error("AWS credential error: {0}")]
    CredentialError(String),

    #[error("AWS signing error: {0}")]
    SigningError(String),
}
