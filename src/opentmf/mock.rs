/// In-memory [`Backend`] that records every library interaction.
use std::cell::RefCell;
use std::rc::Rc;

use super::backend::{Backend, Device, DeviceInfo, Driver, DriverInfo, NameList, driver_url};
use super::errors::Status;

/// One recorded library interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    DriverList,
    FreeDriverList,
    Open(String),
    Close(String),
    DeviceList(String),
    FreeDeviceList(String),
    Finalize,
}

pub type CallLog = Rc<RefCell<Vec<Call>>>;

#[derive(Debug, Clone)]
pub struct MockDevice {
    pub path: String,
    pub info: DeviceInfo,
    pub open_error: Option<Status>,
}

impl MockDevice {
    pub fn new(path: &str, name: &str, serial: &str) -> Self {
        Self {
            path: path.to_owned(),
            info: DeviceInfo {
                name: name.to_owned(),
                serial: serial.to_owned(),
            },
            open_error: None,
        }
    }

    pub fn open_fails(mut self, status: Status) -> Self {
        self.open_error = Some(status);
        self
    }
}

#[derive(Debug, Clone)]
pub struct MockDriver {
    pub info: DriverInfo,
    pub open_error: Option<Status>,
    pub devices: Result<Vec<MockDevice>, Status>,
    pub free_devices_error: Option<Status>,
}

impl MockDriver {
    pub fn new(info: DriverInfo) -> Self {
        Self {
            info,
            open_error: None,
            devices: Ok(Vec::new()),
            free_devices_error: None,
        }
    }

    pub fn named(name: &str) -> Self {
        Self::new(DriverInfo {
            name: name.to_owned(),
            ..DriverInfo::default()
        })
    }

    pub fn open_fails(mut self, status: Status) -> Self {
        self.open_error = Some(status);
        self
    }

    pub fn device(mut self, device: MockDevice) -> Self {
        if let Ok(devices) = &mut self.devices {
            devices.push(device);
        }
        self
    }

    pub fn device_list_fails(mut self, status: Status) -> Self {
        self.devices = Err(status);
        self
    }

    pub fn free_devices_fails(mut self, status: Status) -> Self {
        self.free_devices_error = Some(status);
        self
    }

    fn url(&self) -> String {
        driver_url(&self.info.name)
    }
}

#[derive(Debug, Default)]
pub struct MockLibrary {
    drivers: Vec<MockDriver>,
    driver_list_error: Option<Status>,
    free_driver_list_error: Option<Status>,
    finalize_error: Option<Status>,
    log: CallLog,
}

impl MockLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn driver(mut self, driver: MockDriver) -> Self {
        self.drivers.push(driver);
        self
    }

    pub fn driver_list_fails(mut self, status: Status) -> Self {
        self.driver_list_error = Some(status);
        self
    }

    pub fn free_driver_list_fails(mut self, status: Status) -> Self {
        self.free_driver_list_error = Some(status);
        self
    }

    pub fn finalize_fails(mut self, status: Status) -> Self {
        self.finalize_error = Some(status);
        self
    }

    /// Shared handle on the call log; stays readable after `finalize`.
    pub fn log(&self) -> CallLog {
        Rc::clone(&self.log)
    }

    fn record(&self, call: Call) {
        self.log.borrow_mut().push(call);
    }
}

impl Backend for MockLibrary {
    type DriverList<'a>
        = MockList<'a>
    where
        Self: 'a;
    type Driver<'a>
        = MockDriverHandle<'a>
    where
        Self: 'a;
    type Device<'a>
        = MockDeviceHandle<'a>
    where
        Self: 'a;

    fn driver_list(&self) -> Result<MockList<'_>, Status> {
        self.record(Call::DriverList);
        if let Some(status) = &self.driver_list_error {
            return Err(status.clone());
        }
        Ok(MockList {
            log: &self.log,
            names: self.drivers.iter().map(|d| d.info.name.clone()).collect(),
            free_call: Call::FreeDriverList,
            free_error: self.free_driver_list_error.clone(),
            freed: false,
        })
    }

    fn open_driver(&self, url: &str) -> Result<MockDriverHandle<'_>, Status> {
        self.record(Call::Open(url.to_owned()));
        let driver = self
            .drivers
            .iter()
            .find(|d| d.url() == url)
            .ok_or_else(|| Status::new(-2, "Not found"))?;
        if let Some(status) = &driver.open_error {
            return Err(status.clone());
        }
        Ok(MockDriverHandle {
            log: &self.log,
            url: url.to_owned(),
            driver,
        })
    }

    fn open_device(&self, url: &str) -> Result<MockDeviceHandle<'_>, Status> {
        self.record(Call::Open(url.to_owned()));
        let device = self
            .drivers
            .iter()
            .filter_map(|d| d.devices.as_ref().ok().map(|devs| (d.url(), devs)))
            .flat_map(|(base, devs)| {
                devs.iter()
                    .map(move |dev| (format!("{base}{}", dev.path), dev))
            })
            .find(|(dev_url, _)| dev_url == url)
            .map(|(_, dev)| dev)
            .ok_or_else(|| Status::new(-2, "Not found"))?;
        if let Some(status) = &device.open_error {
            return Err(status.clone());
        }
        Ok(MockDeviceHandle {
            log: &self.log,
            url: url.to_owned(),
            device,
        })
    }

    fn finalize(self) -> Result<(), Status> {
        self.record(Call::Finalize);
        self.finalize_error.map_or(Ok(()), Err)
    }
}

pub struct MockDriverHandle<'a> {
    log: &'a CallLog,
    url: String,
    driver: &'a MockDriver,
}

impl Driver for MockDriverHandle<'_> {
    type DeviceList<'d>
        = MockList<'d>
    where
        Self: 'd;

    fn info(&self) -> DriverInfo {
        self.driver.info.clone()
    }

    fn device_list(&self) -> Result<MockList<'_>, Status> {
        self.log.borrow_mut().push(Call::DeviceList(self.url.clone()));
        let devices = self.driver.devices.as_ref().map_err(Clone::clone)?;
        Ok(MockList {
            log: self.log,
            names: devices.iter().map(|d| d.path.clone()).collect(),
            free_call: Call::FreeDeviceList(self.url.clone()),
            free_error: self.driver.free_devices_error.clone(),
            freed: false,
        })
    }
}

impl Drop for MockDriverHandle<'_> {
    fn drop(&mut self) {
        self.log.borrow_mut().push(Call::Close(self.url.clone()));
    }
}

pub struct MockDeviceHandle<'a> {
    log: &'a CallLog,
    url: String,
    device: &'a MockDevice,
}

impl Device for MockDeviceHandle<'_> {
    fn info(&self) -> DeviceInfo {
        self.device.info.clone()
    }
}

impl Drop for MockDeviceHandle<'_> {
    fn drop(&mut self) {
        self.log.borrow_mut().push(Call::Close(self.url.clone()));
    }
}

pub struct MockList<'a> {
    log: &'a CallLog,
    names: Vec<String>,
    free_call: Call,
    free_error: Option<Status>,
    freed: bool,
}

impl MockList<'_> {
    fn release(&mut self) -> Result<(), Status> {
        if self.freed {
            return Ok(());
        }
        self.freed = true;
        self.log.borrow_mut().push(self.free_call.clone());
        self.free_error.take().map_or(Ok(()), Err)
    }
}

impl NameList for MockList<'_> {
    fn names(&self) -> &[String] {
        &self.names
    }

    fn free(mut self) -> Result<(), Status> {
        self.release()
    }
}

impl Drop for MockList<'_> {
    fn drop(&mut self) {
        let _ = self.release();
    }
}
