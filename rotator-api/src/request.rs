pub const CLIENT_ID: &str = "ClientID";
pub const CLIENT_TRANSACTION_ID: &str = "ClientTransactionID";

/// Raw request parameters in arrival order, from the query string of a read
/// or the form body of a write.
pub type Fields = [(String, String)];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// Property read, parameters from the query string.
    Property,
    /// Method call or property write, parameters from the form body.
    Method,
}

impl RequestKind {
    /// How parameter names are matched for this kind of request.
    pub fn field_match(&self) -> FieldMatch {
        match self {
            RequestKind::Property => FieldMatch::Caseless,
            RequestKind::Method => FieldMatch::Exact,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldMatch {
    Caseless,
    /// Exact name, empty values count as absent.
    Exact,
}

pub fn find_field<'a>(fields: &'a Fields, name: &str, matching: FieldMatch) -> Option<&'a str> {
    match matching {
        FieldMatch::Caseless => {
            let lower_name = name.to_ascii_lowercase();
            fields
                .iter()
                .find(|(key, _)| key.to_ascii_lowercase() == lower_name)
                .map(|(_, value)| value.as_str())
        }
        FieldMatch::Exact => fields
            .iter()
            .find(|(key, value)| key == name && !value.is_empty())
            .map(|(_, value)| value.as_str()),
    }
}

/// Parses a non-negative integer id.
pub fn parse_id(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("Missing Alpaca ClientID")]
    MissingClientId,

    #[error("Invalid ClientID {0}")]
    InvalidClientId(String),

    #[error("Invalid ClientTransactionID {0}")]
    InvalidClientTransactionId(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientIdentity {
    pub client_id: u64,
    pub client_transaction_id: u64,
}

/// Validates the caller fields every device request must carry.
///
/// `ClientID` is always matched without regard to case. `ClientTransactionID`
/// follows the request kind's matching rule and defaults to 0 when absent or
/// empty.
pub fn identify(fields: &Fields, kind: RequestKind) -> Result<ClientIdentity, IdentityError> {
    let client_id = find_field(fields, CLIENT_ID, FieldMatch::Caseless)
        .ok_or(IdentityError::MissingClientId)?;
    let client_id =
        parse_id(client_id).ok_or_else(|| IdentityError::InvalidClientId(client_id.to_string()))?;

    let client_transaction_id = match find_field(fields, CLIENT_TRANSACTION_ID, kind.field_match()) {
        Some(value) if !value.is_empty() => parse_id(value)
            .ok_or_else(|| IdentityError::InvalidClientTransactionId(value.to_string()))?,
        _ => 0,
    };

    Ok(ClientIdentity {
        client_id,
        client_transaction_id,
    })
}
