/// The OpenTMF contract as seen by the lister.
///
/// [`Backend`] is implemented by the dynamically loaded library
/// ([`super::Context`]) and, in tests, by an in-memory double. Handles and lists
/// borrow the backend that produced them, so none of them can outlive it.
use std::fmt;

use super::errors::Status;

/// URL scheme prefix used to address drivers and devices.
pub const URL_SCHEME: &str = "opentmf://";

/// Driver version as reported in the driver info record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    /// Free-form suffix such as `"-rc1"`, printed directly after the numbers.
    pub extra: String,
}

/// Renders `major.minor[.patch]`; the patch segment is omitted when zero.
/// The `extra` suffix is not part of this rendering.
impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)?;
        if self.patch > 0 {
            write!(f, ".{}", self.patch)?;
        }
        Ok(())
    }
}

/// Metadata of an opened driver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriverInfo {
    pub name: String,
    pub version: Version,
    pub description: String,
    pub authors: String,
    /// License identifier, e.g. `"GPL-2.0+"`.
    pub license: String,
    pub non_free: bool,
}

/// Metadata of an opened device.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceInfo {
    pub name: String,
    pub serial: String,
}

/// An ordered list of identifiers owned by the library.
///
/// Dropping a list releases it silently; call [`NameList::free`] to learn
/// whether the release succeeded.
pub trait NameList {
    /// Identifiers in library order.
    fn names(&self) -> &[String];

    /// Release the list back to the library.
    ///
    /// # Errors
    ///
    /// Returns the library status if the release failed.
    fn free(self) -> Result<(), Status>;
}

/// An initialized library context.
pub trait Backend {
    type DriverList<'a>: NameList
    where
        Self: 'a;
    type Driver<'a>: Driver
    where
        Self: 'a;
    type Device<'a>: Device
    where
        Self: 'a;

    /// Names of all installed drivers.
    ///
    /// # Errors
    ///
    /// Returns the library status if the list cannot be obtained.
    fn driver_list(&self) -> Result<Self::DriverList<'_>, Status>;

    /// Open a driver by its `opentmf://<name>` URL. The handle closes on drop.
    ///
    /// # Errors
    ///
    /// Returns the library status if the driver cannot be opened.
    fn open_driver(&self, url: &str) -> Result<Self::Driver<'_>, Status>;

    /// Open a device by its `opentmf://<driver><path>` URL. The handle closes on drop.
    ///
    /// # Errors
    ///
    /// Returns the library status if the device cannot be opened.
    fn open_device(&self, url: &str) -> Result<Self::Device<'_>, Status>;

    /// Tear down the context.
    ///
    /// # Errors
    ///
    /// Returns the library status if finalization failed.
    fn finalize(self) -> Result<(), Status>;
}

/// An opened driver handle.
pub trait Driver {
    type DeviceList<'d>: NameList
    where
        Self: 'd;

    fn info(&self) -> DriverInfo;

    /// Paths of the devices this driver currently sees.
    ///
    /// # Errors
    ///
    /// Returns the library status if the list cannot be obtained.
    fn device_list(&self) -> Result<Self::DeviceList<'_>, Status>;
}

/// An opened device handle.
pub trait Device {
    fn info(&self) -> DeviceInfo;
}

/// Build the URL addressing a driver.
#[must_use]
pub fn driver_url(driver: &str) -> String {
    let mut url = String::with_capacity(URL_SCHEME.len() + driver.len());
    url.push_str(URL_SCHEME);
    url.push_str(driver);
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_url() {
        assert_eq!(driver_url("demo"), "opentmf://demo");
    }

    fn version(major: u32, minor: u32, patch: u32) -> Version {
        Version {
            major,
            minor,
            patch,
            extra: "-rc1".to_owned(),
        }
    }

    #[test]
    fn test_version_without_patch() {
        assert_eq!(version(1, 2, 0).to_string(), "1.2");
    }

    #[test]
    fn test_version_with_patch() {
        assert_eq!(version(1, 2, 3).to_string(), "1.2.3");
    }

    #[test]
    fn test_version_zero() {
        assert_eq!(version(0, 0, 0).to_string(), "0.0");
    }

    #[test]
    fn test_driver_url_empty_name() {
        assert_eq!(driver_url(""), "opentmf://");
    }
}
