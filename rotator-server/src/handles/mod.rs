mod device_handle;
mod dispatch;
mod management_handle;
mod rotator_handle;
mod setup_handle;

pub use device_handle::*;
pub use management_handle::*;
pub use rotator_handle::*;
pub use setup_handle::*;
