/// Public API for the OpenTMF driver-management library.
pub mod backend;
pub mod context;
pub mod errors;
pub mod ffi;
#[cfg(test)]
pub mod mock;

pub use backend::{Backend, Device, DeviceInfo, Driver, DriverInfo, NameList, driver_url};
pub use context::Context;
pub use errors::Status;
pub use ffi::Api;

/// Platform file name of the shared library (`libopentmf.so`, `libopentmf.dylib`, `opentmf.dll`).
#[must_use]
pub fn default_library_name() -> std::ffi::OsString {
    libloading::library_filename("opentmf")
}
