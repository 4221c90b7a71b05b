use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::json;

mod common;
use common::mock_app::MockApp;

#[tokio::test]
async fn test_api_versions() {
    let app = MockApp::new();

    let (status, body) = app
        .get("/management/apiversions?ClientTransactionID=3")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["Value"], json!([1]));
    assert_eq!(body["ClientTransactionID"], 3);
}

#[tokio::test]
async fn test_server_description() {
    let app = MockApp::new();

    let (status, body) = app.get("/management/v1/description").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ClientTransactionID"], 0);
    assert_eq!(body["Value"]["ServerName"], "Sample ASCOM Rotator");
    assert_eq!(body["Value"]["Manufacturer"], "ASCOM Initiative");
    assert_eq!(body["Value"]["ManufacturerVersion"], "0.2");
    assert_eq!(body["Value"]["Location"], "Test Observatory");
}

#[tokio::test]
async fn test_configured_devices() {
    let app = MockApp::new();

    let (status, body) = app.get("/management/v1/configureddevices").await;
    assert_eq!(status, StatusCode::OK);

    let devices = body["Value"].as_array().unwrap();
    assert_eq!(devices.len(), 2);
    assert_eq!(devices[0]["DeviceNumber"], 0);
    assert_eq!(devices[0]["DeviceType"], "Rotator");
    assert_eq!(
        devices[0]["UniqueID"],
        "1892ED30-92F3-4236-843E-DA8EEEF2D1CC"
    );
    assert_eq!(devices[1]["DeviceNumber"], 1);
    assert_ne!(devices[1]["UniqueID"], devices[0]["UniqueID"]);
}

#[tokio::test]
async fn test_setup_pages() {
    let app = MockApp::new();

    for uri in ["/setup", "/setup/v1/rotator/0/setup"] {
        let request = Request::builder()
            .uri(uri)
            .method(Method::GET)
            .body(Body::empty())
            .unwrap();

        let (status, text) = app.send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert!(text.contains("configuration file"), "{uri}");
    }
}
