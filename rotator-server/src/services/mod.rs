mod discovery_service;
mod registry_service;
mod rotator_service;

pub use discovery_service::*;
pub use registry_service::*;
pub use rotator_service::*;
