use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::Method;
use axum::Form;
use rotator_api::request;
use rotator_api::{ClientIdentity, RequestKind};

use crate::app::AlpacaState;
use crate::errors::{ApiError, RequestError};
use crate::services::RotatorDevice;

/// A device request that passed validation: the device exists and the caller
/// supplied a well-formed `ClientID` and `ClientTransactionID`.
pub struct AlpacaRequest {
    pub device_number: u32,
    pub kind: RequestKind,
    pub identity: ClientIdentity,
    pub device: Arc<RotatorDevice>,
    fields: Vec<(String, String)>,
}

impl AlpacaRequest {
    /// Looks up a capability argument with the same name rule as the
    /// transaction id of this request kind.
    pub fn field(&self, name: &str) -> Option<&str> {
        request::find_field(&self.fields, name, self.kind.field_match())
    }

    pub fn require(&self, name: &str) -> Result<&str, RequestError> {
        self.field(name)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| RequestError::MissingParameter(name.to_string()))
    }

    pub fn client_transaction_id(&self) -> u64 {
        self.identity.client_transaction_id
    }

    async fn validate(req: Request, state: &AlpacaState) -> Result<Self, RequestError> {
        let (mut parts, body) = req.into_parts();

        let Path(device_number) = Path::<u32>::from_request_parts(&mut parts, state)
            .await
            .map_err(|e| RequestError::InvalidDeviceNumber(e.body_text()))?;

        let device = state
            .registry
            .get(device_number)
            .ok_or(RequestError::DeviceNotFound {
                device_number,
                max_device: state.registry.max_device_number(),
            })?;

        let (kind, fields) = if parts.method == Method::GET || parts.method == Method::HEAD {
            let Query(fields) = Query::<Vec<(String, String)>>::try_from_uri(&parts.uri)
                .map_err(|e| RequestError::MalformedRequest(e.body_text()))?;
            (RequestKind::Property, fields)
        } else {
            let req = Request::from_parts(parts, body);
            let Form(fields) = Form::<Vec<(String, String)>>::from_request(req, state)
                .await
                .map_err(|e| RequestError::MalformedRequest(e.body_text()))?;
            (RequestKind::Method, fields)
        };

        let identity = request::identify(&fields, kind)?;

        Ok(Self {
            device_number,
            kind,
            identity,
            device,
            fields,
        })
    }
}

#[async_trait]
impl FromRequest<AlpacaState> for AlpacaRequest {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &AlpacaState) -> Result<Self, Self::Rejection> {
        let uri = req.uri().clone();

        Self::validate(req, state).await.map_err(|e| {
            tracing::debug!("Rejected request to {}", uri);
            ApiError::from(e)
        })
    }
}
