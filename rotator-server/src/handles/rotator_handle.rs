use axum::extract::State;
use axum::routing::{get, put};
use axum::{Json, Router};
use rotator_api::Envelope;

use super::device_handle::*;
use super::dispatch::{Failure, method, parse_angle, parse_bool, parse_number, property, reply};
use crate::app::AlpacaState;
use crate::errors::ApiError;
use crate::extractors::AlpacaRequest;
use crate::services::normalize_degrees;

pub fn rotator_router(state: AlpacaState) -> Router {
    Router::new()
        .route("/api/v1/rotator/:device_number/action", put(put_action))
        .route("/api/v1/rotator/:device_number/commandblind", put(put_command_blind))
        .route("/api/v1/rotator/:device_number/commandbool", put(put_command_bool))
        .route("/api/v1/rotator/:device_number/commandstring", put(put_command_string))
        .route(
            "/api/v1/rotator/:device_number/connected",
            get(get_connected).put(put_connected),
        )
        .route("/api/v1/rotator/:device_number/description", get(get_description))
        .route("/api/v1/rotator/:device_number/driverinfo", get(get_driver_info))
        .route("/api/v1/rotator/:device_number/driverversion", get(get_driver_version))
        .route(
            "/api/v1/rotator/:device_number/interfaceversion",
            get(get_interface_version),
        )
        .route("/api/v1/rotator/:device_number/name", get(get_name))
        .route(
            "/api/v1/rotator/:device_number/supportedactions",
            get(get_supported_actions),
        )
        .route("/api/v1/rotator/:device_number/canreverse", get(get_can_reverse))
        .route("/api/v1/rotator/:device_number/ismoving", get(get_is_moving))
        .route(
            "/api/v1/rotator/:device_number/mechanicalposition",
            get(get_mechanical_position),
        )
        .route("/api/v1/rotator/:device_number/position", get(get_position))
        .route(
            "/api/v1/rotator/:device_number/reverse",
            get(get_reverse).put(put_reverse),
        )
        .route("/api/v1/rotator/:device_number/stepsize", get(get_step_size))
        .route(
            "/api/v1/rotator/:device_number/targetposition",
            get(get_target_position),
        )
        .route("/api/v1/rotator/:device_number/halt", put(put_halt))
        .route("/api/v1/rotator/:device_number/move", put(put_move))
        .route("/api/v1/rotator/:device_number/moveabsolute", put(put_move_absolute))
        .route(
            "/api/v1/rotator/:device_number/movemechanical",
            put(put_move_mechanical),
        )
        .route("/api/v1/rotator/:device_number/sync", put(put_sync))
        .with_state(state)
}

pub async fn get_can_reverse(
    State(state): State<AlpacaState>,
    request: AlpacaRequest,
) -> Json<Envelope<bool>> {
    let outcome = request.device.can_reverse().map_err(Failure::from);
    reply(&state, &request, "CanReverse", outcome)
}

pub async fn get_is_moving(
    State(state): State<AlpacaState>,
    request: AlpacaRequest,
) -> Json<Envelope<bool>> {
    property(&state, &request, "IsMoving", |device| device.is_moving())
}

pub async fn get_mechanical_position(
    State(state): State<AlpacaState>,
    request: AlpacaRequest,
) -> Json<Envelope<f64>> {
    property(&state, &request, "MechanicalPosition", |device| {
        device.mechanical_position()
    })
}

pub async fn get_position(
    State(state): State<AlpacaState>,
    request: AlpacaRequest,
) -> Json<Envelope<f64>> {
    property(&state, &request, "Position", |device| device.position())
}

pub async fn get_reverse(
    State(state): State<AlpacaState>,
    request: AlpacaRequest,
) -> Json<Envelope<bool>> {
    property(&state, &request, "Reverse", |device| device.reverse())
}

pub async fn put_reverse(
    State(state): State<AlpacaState>,
    request: AlpacaRequest,
) -> Result<Json<Envelope<()>>, ApiError> {
    method(&state, &request, "Reverse", |device| {
        let reverse = parse_bool("Reverse", request.require("Reverse")?)?;
        Ok(device.set_reverse(reverse)?)
    })
}

pub async fn get_step_size(
    State(state): State<AlpacaState>,
    request: AlpacaRequest,
) -> Json<Envelope<f64>> {
    property(&state, &request, "StepSize", |device| device.step_size())
}

pub async fn get_target_position(
    State(state): State<AlpacaState>,
    request: AlpacaRequest,
) -> Json<Envelope<f64>> {
    property(&state, &request, "TargetPosition", |device| {
        device.target_position()
    })
}

pub async fn put_halt(
    State(state): State<AlpacaState>,
    request: AlpacaRequest,
) -> Result<Json<Envelope<()>>, ApiError> {
    method(&state, &request, "Halt", |device| Ok(device.halt()?))
}

/// Relative move. Any finite delta is accepted and wrapped into one turn.
pub async fn put_move(
    State(state): State<AlpacaState>,
    request: AlpacaRequest,
) -> Result<Json<Envelope<()>>, ApiError> {
    method(&state, &request, "Move", |device| {
        let delta = normalize_degrees(parse_number("Position", request.require("Position")?)?);
        Ok(device.move_relative(delta)?)
    })
}

pub async fn put_move_absolute(
    State(state): State<AlpacaState>,
    request: AlpacaRequest,
) -> Result<Json<Envelope<()>>, ApiError> {
    method(&state, &request, "MoveAbsolute", |device| {
        let position = parse_angle("Position", request.require("Position")?)?;
        Ok(device.move_absolute(position)?)
    })
}

pub async fn put_move_mechanical(
    State(state): State<AlpacaState>,
    request: AlpacaRequest,
) -> Result<Json<Envelope<()>>, ApiError> {
    method(&state, &request, "MoveMechanical", |device| {
        let position = parse_angle("Position", request.require("Position")?)?;
        Ok(device.move_mechanical(position)?)
    })
}

pub async fn put_sync(
    State(state): State<AlpacaState>,
    request: AlpacaRequest,
) -> Result<Json<Envelope<()>>, ApiError> {
    method(&state, &request, "Sync", |device| {
        let position = parse_angle("Position", request.require("Position")?)?;
        Ok(device.sync(position)?)
    })
}
