#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("{0}")]
    InvalidOperation(&'static str),

    #[error("Device is not connected")]
    NotConnected,

    #[error("Device state lock poisoned")]
    LockPoisoned,
}
