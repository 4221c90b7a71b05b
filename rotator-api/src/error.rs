use std::error::Error as StdError;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Fallback code for driver errors outside the reserved range.
pub const DRIVER_ERROR_BASE: i32 = 0x500;
/// Highest code a driver error may carry.
pub const DRIVER_ERROR_MAX: i32 = 0xFFE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// No error.
    Success,
    /// Property or method is not available on this device.
    NotImplemented,
    /// Argument outside its domain or unparsable.
    InvalidValue,
    /// Property read before it was ever written.
    ValueNotSet,
    /// Device must be connected first.
    NotConnected,
    /// Operation rejected while parked.
    Parked,
    /// Operation rejected while slaved.
    Slaved,
    /// Operation conflicts with the current device state.
    InvalidOperation,
    /// Named action is not supported.
    ActionNotImplemented,
    /// Unexpected fault inside the driver.
    DriverError,
}

impl ErrorKind {
    pub fn code(&self) -> i32 {
        match self {
            ErrorKind::Success => 0x000,
            ErrorKind::NotImplemented => 0x400,
            ErrorKind::InvalidValue => 0x401,
            ErrorKind::ValueNotSet => 0x402,
            ErrorKind::NotConnected => 0x407,
            ErrorKind::Parked => 0x408,
            ErrorKind::Slaved => 0x409,
            ErrorKind::InvalidOperation => 0x40B,
            ErrorKind::ActionNotImplemented => 0x40C,
            ErrorKind::DriverError => DRIVER_ERROR_BASE,
        }
    }

    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorKind::Success => "",
            ErrorKind::NotImplemented => "Property or method not implemented.",
            ErrorKind::InvalidValue => "Invalid value given.",
            ErrorKind::ValueNotSet => "The value has not yet been set.",
            ErrorKind::NotConnected => "The device is not connected.",
            ErrorKind::Parked => "Illegal operation while parked.",
            ErrorKind::Slaved => "Illegal operation while slaved.",
            ErrorKind::InvalidOperation => "The requested operation cannot be done at this time.",
            ErrorKind::ActionNotImplemented => {
                "The requested action is not implemented in this driver."
            }
            ErrorKind::DriverError => "Internal driver error.",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Outcome of a device operation as carried in a response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResult {
    code: i32,
    message: String,
}

impl ErrorResult {
    pub fn success() -> Self {
        Self {
            code: 0,
            message: String::new(),
        }
    }

    /// Builds a result with the kind's default message.
    pub fn new(kind: ErrorKind) -> Self {
        Self::with_message(kind, kind.default_message())
    }

    pub fn with_message(kind: ErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();

        if kind != ErrorKind::Success {
            tracing::error!("{}: {}", kind, message);
        }

        Self {
            code: kind.code(),
            message,
        }
    }

    /// Driver error without an underlying cause.
    pub fn driver(code: i32, message: &str) -> Self {
        Self::driver_error(code, format!("{}: {message}", ErrorKind::DriverError))
    }

    /// Driver error wrapping `cause`. With `verbose` set the message embeds the
    /// cause's debug form and its whole source chain, otherwise only the cause's
    /// type name and display form.
    pub fn driver_with_cause<E>(code: i32, message: &str, cause: &E, verbose: bool) -> Self
    where
        E: StdError + ?Sized,
    {
        let head = format!("{}: {message}", ErrorKind::DriverError);

        let full_message = if verbose {
            let mut trace = format!("{head}\n{cause:?}");
            let mut source = cause.source();
            while let Some(inner) = source {
                trace.push_str(&format!("\nCaused by: {inner}"));
                source = inner.source();
            }
            trace
        } else {
            format!("{head}\n{}: {cause}", short_type_name::<E>())
        };

        Self::driver_error(code, full_message)
    }

    fn driver_error(code: i32, message: String) -> Self {
        let code = if code <= DRIVER_ERROR_BASE || code > DRIVER_ERROR_MAX {
            tracing::error!(
                "Bad driver error number {:#X}, using {:#X} instead",
                code,
                DRIVER_ERROR_BASE
            );
            DRIVER_ERROR_BASE
        } else {
            code
        };

        tracing::error!("{}", message);

        Self { code, message }
    }

    pub fn code(&self) -> i32 {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_success(&self) -> bool {
        self.code == 0
    }
}

impl Default for ErrorResult {
    fn default() -> Self {
        Self::success()
    }
}

impl From<ErrorKind> for ErrorResult {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

fn short_type_name<T: ?Sized>() -> &'static str {
    let name = std::any::type_name::<T>();
    let base = name.split('<').next().unwrap_or(name);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("motor stalled")]
    struct Stalled {
        #[source]
        source: io::Error,
    }

    #[test]
    fn test_catalog_codes() {
        assert_eq!(ErrorResult::success().code(), 0);
        assert_eq!(ErrorResult::new(ErrorKind::NotImplemented).code(), 0x400);
        assert_eq!(ErrorResult::new(ErrorKind::InvalidValue).code(), 0x401);
        assert_eq!(ErrorResult::new(ErrorKind::ValueNotSet).code(), 0x402);
        assert_eq!(ErrorResult::new(ErrorKind::NotConnected).code(), 0x407);
        assert_eq!(ErrorResult::new(ErrorKind::Parked).code(), 0x408);
        assert_eq!(ErrorResult::new(ErrorKind::Slaved).code(), 0x409);
        assert_eq!(ErrorResult::new(ErrorKind::InvalidOperation).code(), 0x40B);
        assert_eq!(ErrorResult::new(ErrorKind::ActionNotImplemented).code(), 0x40C);
    }

    #[test]
    fn test_default_messages() {
        let result = ErrorResult::new(ErrorKind::NotConnected);
        assert_eq!(result.message(), "The device is not connected.");
        assert!(!result.is_success());

        let result = ErrorResult::with_message(ErrorKind::InvalidValue, "Invalid Position=abc");
        assert_eq!(result.message(), "Invalid Position=abc");
        assert_eq!(result.code(), ErrorKind::InvalidValue.code());
    }

    #[test]
    fn test_driver_error_code_coercion() {
        assert_eq!(ErrorResult::driver(0x500, "boundary").code(), 0x500);
        assert_eq!(ErrorResult::driver(0x400, "too low").code(), 0x500);
        assert_eq!(ErrorResult::driver(0xFFF, "too high").code(), 0x500);
        assert_eq!(ErrorResult::driver(-1, "negative").code(), 0x500);
        assert_eq!(ErrorResult::driver(0x501, "lowest valid").code(), 0x501);
        assert_eq!(ErrorResult::driver(0xFFE, "highest valid").code(), 0xFFE);
        assert_eq!(ErrorResult::driver(0x7A0, "custom").code(), 0x7A0);
    }

    #[test]
    fn test_driver_error_terse_cause() {
        let cause = Stalled {
            source: io::Error::new(io::ErrorKind::TimedOut, "encoder silent"),
        };

        let result = ErrorResult::driver_with_cause(0x500, "Rotator.Move failed", &cause, false);

        assert_eq!(
            result.message(),
            "DriverError: Rotator.Move failed\nStalled: motor stalled"
        );
    }

    #[test]
    fn test_driver_error_verbose_cause() {
        let cause = Stalled {
            source: io::Error::new(io::ErrorKind::TimedOut, "encoder silent"),
        };

        let result = ErrorResult::driver_with_cause(0x500, "Rotator.Move failed", &cause, true);

        assert!(result.message().starts_with("DriverError: Rotator.Move failed\nStalled {"));
        assert!(result.message().ends_with("Caused by: encoder silent"));
    }
}
