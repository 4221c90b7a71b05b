use axum::Json;
use rotator_api::error::DRIVER_ERROR_BASE;
use rotator_api::{Envelope, ErrorKind, ErrorResult, RequestKind};
use serde::Serialize;

use crate::app::AlpacaState;
use crate::errors::{ApiError, DeviceError, RequestError};
use crate::extractors::AlpacaRequest;
use crate::services::RotatorDevice;

/// Why a capability did not produce a value.
#[derive(Debug)]
pub enum Failure {
    /// Request shape is wrong, answered at the transport level.
    Rejected(RequestError),
    /// Refused before the device was asked, e.g. not connected or bad argument.
    Refused(ErrorResult),
    /// The device operation itself failed.
    Device(DeviceError),
}

impl From<DeviceError> for Failure {
    fn from(e: DeviceError) -> Self {
        Failure::Device(e)
    }
}

impl From<RequestError> for Failure {
    fn from(e: RequestError) -> Self {
        Failure::Rejected(e)
    }
}

impl From<ErrorKind> for Failure {
    fn from(kind: ErrorKind) -> Self {
        Failure::Refused(ErrorResult::new(kind))
    }
}

/// Wraps the outcome of `capability` into the envelope for this request.
pub fn reply<T: Serialize>(
    state: &AlpacaState,
    request: &AlpacaRequest,
    capability: &str,
    outcome: Result<T, Failure>,
) -> Json<Envelope<T>> {
    let (value, result) = match outcome {
        Ok(value) => (Some(value), ErrorResult::success()),
        Err(failure) => (
            None,
            failure_result(
                capability,
                failure,
                state.settings.server.verbose_driver_exceptions,
            ),
        ),
    };

    let client_transaction_id = request.client_transaction_id();
    let envelope = match request.kind {
        RequestKind::Property => {
            Envelope::property(&state.transactions, client_transaction_id, value, result)
        }
        RequestKind::Method => {
            Envelope::method(&state.transactions, client_transaction_id, result, value)
        }
    };

    Json(envelope)
}

/// Reads a value from a connected device.
pub fn property<T, F>(
    state: &AlpacaState,
    request: &AlpacaRequest,
    capability: &str,
    read: F,
) -> Json<Envelope<T>>
where
    T: Serialize,
    F: FnOnce(&RotatorDevice) -> Result<T, DeviceError>,
{
    let outcome = ensure_connected(&request.device)
        .and_then(|()| read(request.device.as_ref()).map_err(Failure::from));

    reply(state, request, capability, outcome)
}

/// Runs an operation on a connected device. Arguments are looked up inside
/// `operation`, so a disconnected device answers `NotConnected` before any
/// missing argument is rejected.
pub fn method<F>(
    state: &AlpacaState,
    request: &AlpacaRequest,
    capability: &str,
    operation: F,
) -> Result<Json<Envelope<()>>, ApiError>
where
    F: FnOnce(&RotatorDevice) -> Result<(), Failure>,
{
    let outcome =
        ensure_connected(&request.device).and_then(|()| operation(request.device.as_ref()));

    match outcome {
        Err(Failure::Rejected(e)) => Err(e.into()),
        outcome => Ok(reply(state, request, capability, outcome)),
    }
}

pub fn ensure_connected(device: &RotatorDevice) -> Result<(), Failure> {
    if device.is_connected()? {
        Ok(())
    } else {
        Err(ErrorKind::NotConnected.into())
    }
}

fn failure_result(capability: &str, failure: Failure, verbose: bool) -> ErrorResult {
    match failure {
        Failure::Rejected(e) => ErrorResult::with_message(ErrorKind::InvalidValue, e.to_string()),
        Failure::Refused(result) => result,
        Failure::Device(DeviceError::InvalidOperation(message)) => {
            ErrorResult::with_message(ErrorKind::InvalidOperation, message)
        }
        Failure::Device(DeviceError::NotConnected) => ErrorResult::new(ErrorKind::NotConnected),
        Failure::Device(e) => ErrorResult::driver_with_cause(
            DRIVER_ERROR_BASE,
            &format!("Rotator.{capability} failed"),
            &e,
            verbose,
        ),
    }
}

/// Parses a finite number.
pub fn parse_number(name: &str, raw: &str) -> Result<f64, Failure> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| invalid_value(format!("Invalid {name}={raw}")))
}

/// Parses an angle that must already lie in [0, 360).
pub fn parse_angle(name: &str, raw: &str) -> Result<f64, Failure> {
    let angle = parse_number(name, raw)?;
    if (0.0..360.0).contains(&angle) {
        Ok(angle)
    } else {
        Err(invalid_value(format!("{name} out of range: {angle}")))
    }
}

pub fn parse_bool(name: &str, raw: &str) -> Result<bool, Failure> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(invalid_value(format!("Invalid {name}={raw}"))),
    }
}

fn invalid_value(message: String) -> Failure {
    Failure::Refused(ErrorResult::with_message(ErrorKind::InvalidValue, message))
}
