use super::RequestError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Bad Alpaca request: {0}")]
    RequestError(#[from] RequestError),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}
