//! Protocol framing shared by the rotator server: the error catalog,
//! transaction ids, response envelopes and request field rules.

pub mod envelope;
pub mod error;
pub mod models;
pub mod request;
pub mod transaction;

pub use envelope::Envelope;
pub use error::{ErrorKind, ErrorResult};
pub use request::{ClientIdentity, FieldMatch, IdentityError, RequestKind};
pub use transaction::{TransactionContext, TransactionCounter};
