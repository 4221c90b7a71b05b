use std::sync::Arc;

use axum::Router;
use rotator_api::TransactionCounter;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::configs::Settings;
use crate::errors::handle_panic;
use crate::handles::*;
use crate::services::DeviceRegistry;

/// Shared by every handler for the lifetime of the server.
#[derive(Clone)]
pub struct AlpacaState {
    pub registry: Arc<DeviceRegistry>,
    pub transactions: Arc<TransactionCounter>,
    pub settings: Arc<Settings>,
}

impl AlpacaState {
    pub fn new(settings: Arc<Settings>) -> Self {
        Self {
            registry: Arc::new(DeviceRegistry::new(&settings.device)),
            transactions: Arc::new(TransactionCounter::new()),
            settings,
        }
    }
}

pub fn create_app(state: AlpacaState) -> Router {
    Router::new()
        .merge(rotator_router(state.clone()))
        .merge(management_router(state))
        .merge(setup_router())
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
