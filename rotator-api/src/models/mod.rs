mod device;
mod management;

pub use device::*;
pub use management::*;
