/// Enumerate drivers (and optionally their devices) and print them.
use std::io::Write;

use crate::cli::OutputCtx;
use crate::cli::output::{write_device, write_driver, write_json_line};
use crate::opentmf::{Backend, Device, DeviceInfo, Driver, NameList, Status, driver_url};
use crate::types::{DeviceOutput, DriverOutput};

/// Options for one listing pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListOptions {
    /// Also enumerate the devices of every driver.
    pub show_devices: bool,
}

/// Final outcome of a listing pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    Failure,
}

impl RunStatus {
    /// Process exit code.
    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Failure => 1,
        }
    }
}

/// Run `lsopentmf`: initialize the library, list every driver, finalize.
///
/// Per-driver and per-device failures are reported on `err` and skipped.
/// Only a failed initialization, a failed driver list, or a failed
/// finalization produce [`RunStatus::Failure`].
///
/// # Errors
///
/// Returns an error only if writing to `out` or `err` fails.
pub fn run<B, F>(
    opts: ListOptions,
    ctx: &OutputCtx,
    init: F,
    out: &mut impl Write,
    err: &mut impl Write,
) -> anyhow::Result<RunStatus>
where
    B: Backend,
    F: FnOnce() -> Result<B, Status>,
{
    let t_init = ctx.timer("opentmf_init");
    let backend = match init() {
        Ok(backend) => backend,
        Err(status) => {
            writeln!(err, "Error initializing library: {status}")?;
            return Ok(RunStatus::Failure);
        }
    };
    drop(t_init);

    let mut status = list_drivers(&backend, opts, ctx, out, err)?;

    let _t_exit = ctx.timer("opentmf_exit");
    if let Err(s) = backend.finalize() {
        writeln!(err, "Error finalizing library: {s}")?;
        status = RunStatus::Failure;
    }

    Ok(status)
}

fn list_drivers<B: Backend>(
    backend: &B,
    opts: ListOptions,
    ctx: &OutputCtx,
    out: &mut impl Write,
    err: &mut impl Write,
) -> anyhow::Result<RunStatus> {
    let t_list = ctx.timer("opentmf_get_driver_list");
    let list = match backend.driver_list() {
        Ok(list) => list,
        Err(status) => {
            writeln!(err, "Error getting driver list: {status}")?;
            return Ok(RunStatus::Failure);
        }
    };
    drop(t_list);

    for name in list.names() {
        let url = driver_url(name);
        let t_open = ctx.timer(format!("opentmf_open {url}"));
        let opened = backend.open_driver(&url);
        drop(t_open);

        match opened {
            Ok(driver) => show_driver(backend, &driver, &url, opts, ctx, out, err)?,
            Err(status) => writeln!(err, "Error opening driver `{name}`: {status}")?,
        }
    }

    // A failed release is reported but does not change the exit status.
    if let Err(status) = list.free() {
        writeln!(err, "Error freeing driver list: {status}")?;
    }

    Ok(RunStatus::Success)
}

fn show_driver<'b, B: Backend + 'b>(
    backend: &'b B,
    driver: &B::Driver<'b>,
    url: &str,
    opts: ListOptions,
    ctx: &OutputCtx,
    out: &mut impl Write,
    err: &mut impl Write,
) -> anyhow::Result<()> {
    let info = driver.info();

    if ctx.json {
        let mut record = DriverOutput::new(&info);
        if opts.show_devices {
            let mut devices = Vec::new();
            for_each_device(backend, driver, url, ctx, err, |path, device| {
                devices.push(DeviceOutput::new(path, &device));
                Ok(())
            })?;
            record.devices = Some(devices);
        }
        write_json_line(out, &record)?;
        return Ok(());
    }

    write_driver(out, ctx.verbosity, &info)?;
    if opts.show_devices {
        for_each_device(backend, driver, url, ctx, err, |path, device| {
            write_device(out, ctx.verbosity, path, &device)?;
            Ok(())
        })?;
    }
    Ok(())
}

/// Open every device of `driver` in list order and hand its info to `visit`.
///
/// Each device handle is closed before the next one is opened.
fn for_each_device<'b, B, V>(
    backend: &'b B,
    driver: &B::Driver<'b>,
    url: &str,
    ctx: &OutputCtx,
    err: &mut impl Write,
    mut visit: V,
) -> anyhow::Result<()>
where
    B: Backend + 'b,
    V: FnMut(&str, DeviceInfo) -> anyhow::Result<()>,
{
    let t_list = ctx.timer(format!("opentmf_drv_get_device_list {url}"));
    let devices = match driver.device_list() {
        Ok(devices) => devices,
        Err(status) => {
            writeln!(err, "Error getting device list: {status}")?;
            return Ok(());
        }
    };
    drop(t_list);

    for path in devices.names() {
        let device_url = format!("{url}{path}");
        let t_open = ctx.timer(format!("opentmf_open {device_url}"));
        let opened = backend.open_device(&device_url);
        drop(t_open);

        match opened {
            Ok(device) => visit(path, device.info())?,
            Err(status) => writeln!(err, "Error opening device `{path}`: {status}")?,
        }
    }

    if let Err(status) = devices.free() {
        writeln!(err, "Error freeing device list: {status}")?;
    }
    Ok(())
}
