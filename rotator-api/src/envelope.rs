use serde::{Deserialize, Serialize};

use crate::error::ErrorResult;
use crate::transaction::{TransactionContext, TransactionCounter};

/// Reply body for every device request.
///
/// Fields serialize in declaration order. `Value` is only present on success
/// and is never written as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(rename = "ServerTransactionID")]
    pub server_transaction_id: u64,
    #[serde(rename = "ClientTransactionID")]
    pub client_transaction_id: u64,
    #[serde(rename = "ErrorNumber")]
    pub error_number: i32,
    #[serde(rename = "ErrorMessage")]
    pub error_message: String,
    #[serde(rename = "Value", default, skip_serializing_if = "Option::is_none")]
    pub value: Option<T>,
}

impl<T: Serialize> Envelope<T> {
    pub fn new(context: TransactionContext, result: ErrorResult, value: Option<T>) -> Self {
        let value = value.filter(|value| result.is_success() && !serializes_to_null(value));

        if let Some(value) = &value {
            if let Ok(text) = serde_json::to_string(value) {
                tracing::debug!("{} -> {}", context.server_transaction_id, text);
            }
        }

        Self {
            server_transaction_id: context.server_transaction_id,
            client_transaction_id: context.client_transaction_id,
            error_number: result.code(),
            error_message: result.message().to_string(),
            value,
        }
    }

    /// Reply to a property read.
    pub fn property(
        counter: &TransactionCounter,
        client_transaction_id: u64,
        value: Option<T>,
        result: ErrorResult,
    ) -> Self {
        Self::new(counter.begin(client_transaction_id), result, value)
    }

    /// Reply to a method call or property write.
    pub fn method(
        counter: &TransactionCounter,
        client_transaction_id: u64,
        result: ErrorResult,
        value: Option<T>,
    ) -> Self {
        Self::new(counter.begin(client_transaction_id), result, value)
    }
}

fn serializes_to_null<T: Serialize>(value: &T) -> bool {
    matches!(
        serde_json::to_value(value),
        Ok(serde_json::Value::Null) | Err(_)
    )
}
