use axum::Json;
use axum::extract::State;
use rotator_api::models::DeviceMetadata;
use rotator_api::{Envelope, ErrorKind};

use super::dispatch::{Failure, parse_bool, reply};
use crate::app::AlpacaState;
use crate::errors::ApiError;
use crate::extractors::AlpacaRequest;

pub async fn put_action(
    State(state): State<AlpacaState>,
    request: AlpacaRequest,
) -> Json<Envelope<()>> {
    reply(&state, &request, "Action", Err(ErrorKind::ActionNotImplemented.into()))
}

pub async fn put_command_blind(
    State(state): State<AlpacaState>,
    request: AlpacaRequest,
) -> Json<Envelope<()>> {
    reply(&state, &request, "CommandBlind", Err(ErrorKind::NotImplemented.into()))
}

pub async fn put_command_bool(
    State(state): State<AlpacaState>,
    request: AlpacaRequest,
) -> Json<Envelope<bool>> {
    reply(&state, &request, "CommandBool", Err(ErrorKind::NotImplemented.into()))
}

pub async fn put_command_string(
    State(state): State<AlpacaState>,
    request: AlpacaRequest,
) -> Json<Envelope<String>> {
    reply(&state, &request, "CommandString", Err(ErrorKind::NotImplemented.into()))
}

pub async fn get_connected(
    State(state): State<AlpacaState>,
    request: AlpacaRequest,
) -> Json<Envelope<bool>> {
    let outcome = request.device.is_connected().map_err(Failure::from);
    reply(&state, &request, "Connected", outcome)
}

/// Connecting never requires a connection, and disconnecting a moving
/// rotator is refused by the device.
pub async fn put_connected(
    State(state): State<AlpacaState>,
    request: AlpacaRequest,
) -> Result<Json<Envelope<()>>, ApiError> {
    let raw = request.require("Connected")?;

    let outcome = parse_bool("Connected", raw)
        .and_then(|target| request.device.connect(target).map_err(Failure::from));

    Ok(reply(&state, &request, "Connected", outcome))
}

pub async fn get_description(
    State(state): State<AlpacaState>,
    request: AlpacaRequest,
) -> Json<Envelope<&'static str>> {
    reply(&state, &request, "Description", Ok(DeviceMetadata::DESCRIPTION))
}

pub async fn get_driver_info(
    State(state): State<AlpacaState>,
    request: AlpacaRequest,
) -> Json<Envelope<String>> {
    reply(&state, &request, "DriverInfo", Ok(DeviceMetadata::driver_info()))
}

pub async fn get_driver_version(
    State(state): State<AlpacaState>,
    request: AlpacaRequest,
) -> Json<Envelope<&'static str>> {
    reply(&state, &request, "DriverVersion", Ok(DeviceMetadata::VERSION))
}

pub async fn get_interface_version(
    State(state): State<AlpacaState>,
    request: AlpacaRequest,
) -> Json<Envelope<i32>> {
    reply(&state, &request, "InterfaceVersion", Ok(DeviceMetadata::INTERFACE_VERSION))
}

pub async fn get_name(
    State(state): State<AlpacaState>,
    request: AlpacaRequest,
) -> Json<Envelope<&'static str>> {
    reply(&state, &request, "Name", Ok(DeviceMetadata::NAME))
}

pub async fn get_supported_actions(
    State(state): State<AlpacaState>,
    request: AlpacaRequest,
) -> Json<Envelope<Vec<String>>> {
    reply(&state, &request, "SupportedActions", Ok(Vec::new()))
}
