use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use rotator_server::app::{AlpacaState, create_app};
use rotator_server::configs::{Device, Discovery, Logger, Server, Settings};
use serde_json::Value;
use tower::ServiceExt;

pub struct MockApp {
    pub state: AlpacaState,
    pub router: Router,
}

impl MockApp {
    pub fn new() -> Self {
        Self::with_settings(Self::settings())
    }

    pub fn with_settings(settings: Settings) -> Self {
        let state = AlpacaState::new(Arc::new(settings));
        let router = create_app(state.clone());

        Self { state, router }
    }

    pub fn settings() -> Settings {
        Settings {
            server: Server {
                host: String::from("127.0.0.1"),
                port: 5555,
                location: String::from("Test Observatory"),
                verbose_driver_exceptions: false,
            },
            logger: Logger {
                level: String::from("debug"),
            },
            discovery: Discovery {
                enabled: false,
                port: 32227,
            },
            device: Device {
                count: 2,
                can_reverse: true,
                step_size: 1.0,
                steps_per_sec: 6,
            },
        }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, String) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .uri(uri)
            .method(Method::GET)
            .body(Body::empty())
            .unwrap();

        let (status, body) = self.send(request).await;
        (status, serde_json::from_str(&body).unwrap())
    }

    pub async fn put(&self, uri: &str, form: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .uri(uri)
            .method(Method::PUT)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .unwrap();

        let (status, body) = self.send(request).await;
        (status, serde_json::from_str(&body).unwrap())
    }

    /// Connects rotator `device_number` and checks the call succeeded.
    pub async fn connect(&self, device_number: u32) {
        let (status, body) = self
            .put(
                &format!("/api/v1/rotator/{device_number}/connected"),
                "Connected=True&ClientID=1&ClientTransactionID=1",
            )
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ErrorNumber"], 0);
    }
}
