use axum::http::StatusCode;
use rotator_api::IdentityError;

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("Device number {device_number} does not exist, max device = {max_device}")]
    DeviceNotFound { device_number: u32, max_device: u32 },

    #[error("Invalid device number: {0}")]
    InvalidDeviceNumber(String),

    #[error("{0}")]
    Identity(#[from] IdentityError),

    #[error("Missing/empty parameter \"{0}\"")]
    MissingParameter(String),

    #[error("Malformed request: {0}")]
    MalformedRequest(String),
}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::DeviceNotFound { .. } => StatusCode::BAD_REQUEST,
            RequestError::InvalidDeviceNumber(_) => StatusCode::BAD_REQUEST,
            RequestError::Identity(_) => StatusCode::BAD_REQUEST,
            RequestError::MissingParameter(_) => StatusCode::BAD_REQUEST,
            RequestError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}
