use axum::Router;
use axum::extract::Path;
use axum::response::Html;
use axum::routing::get;

const SERVER_SETUP_PAGE: &str =
    "<!DOCTYPE html><html><body><h2>Server setup is in the configuration file</h2></body></html>";
const DEVICE_SETUP_PAGE: &str =
    "<!DOCTYPE html><html><body><h2>Device setup is in the configuration file</h2></body></html>";

pub fn setup_router() -> Router {
    Router::new()
        .route("/setup", get(get_server_setup))
        .route("/setup/v1/rotator/:device_number/setup", get(get_device_setup))
}

pub async fn get_server_setup() -> Html<&'static str> {
    Html(SERVER_SETUP_PAGE)
}

pub async fn get_device_setup(Path(device_number): Path<String>) -> Html<&'static str> {
    tracing::debug!("Setup page requested for rotator {}", device_number);
    Html(DEVICE_SETUP_PAGE)
}
