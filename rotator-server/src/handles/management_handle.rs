use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use rotator_api::models::{API_VERSIONS, ConfiguredDevice, ServerDescription};
use rotator_api::request::{self, CLIENT_TRANSACTION_ID, FieldMatch};
use rotator_api::{Envelope, ErrorResult};

use crate::app::AlpacaState;

pub fn management_router(state: AlpacaState) -> Router {
    Router::new()
        .route("/management/apiversions", get(get_api_versions))
        .route("/management/v1/description", get(get_server_description))
        .route("/management/v1/configureddevices", get(get_configured_devices))
        .with_state(state)
}

/// Management calls carry no ClientID, and an unusable transaction id
/// is treated as absent.
fn client_transaction_id(fields: &[(String, String)]) -> u64 {
    request::find_field(fields, CLIENT_TRANSACTION_ID, FieldMatch::Caseless)
        .and_then(request::parse_id)
        .unwrap_or(0)
}

pub async fn get_api_versions(
    State(state): State<AlpacaState>,
    Query(fields): Query<Vec<(String, String)>>,
) -> Json<Envelope<Vec<u32>>> {
    Json(Envelope::property(
        &state.transactions,
        client_transaction_id(&fields),
        Some(API_VERSIONS.to_vec()),
        ErrorResult::success(),
    ))
}

pub async fn get_server_description(
    State(state): State<AlpacaState>,
    Query(fields): Query<Vec<(String, String)>>,
) -> Json<Envelope<ServerDescription>> {
    let description = ServerDescription::new(state.settings.server.location.clone());

    Json(Envelope::property(
        &state.transactions,
        client_transaction_id(&fields),
        Some(description),
        ErrorResult::success(),
    ))
}

pub async fn get_configured_devices(
    State(state): State<AlpacaState>,
    Query(fields): Query<Vec<(String, String)>>,
) -> Json<Envelope<Vec<ConfiguredDevice>>> {
    Json(Envelope::property(
        &state.transactions,
        client_transaction_id(&fields),
        Some(state.registry.configured_devices()),
        ErrorResult::success(),
    ))
}
