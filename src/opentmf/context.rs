/// Safe owners for the library context, handles, and identifier lists.
use std::ffi::CString;
use std::os::raw::c_char;
use std::ptr;

use super::backend::{Backend, Device, DeviceInfo, Driver, DriverInfo, NameList, Version};
use super::errors::Status;
use super::ffi::{Api, RawContext, RawHandle, c_str, string_list};

/// Status reported for URLs that cannot be passed to the library.
const INVALID_URL: i32 = -1;

/// An initialized OpenTMF context.
///
/// Finalized on drop unless [`Backend::finalize`] was called to observe the status.
pub struct Context<'lib> {
    api: &'lib Api,
    raw: *mut RawContext,
}

impl std::fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context").finish_non_exhaustive()
    }
}

impl<'lib> Context<'lib> {
    /// Create a library context (`opentmf_init`).
    ///
    /// # Errors
    ///
    /// Returns the library status if initialization failed.
    pub fn init(api: &'lib Api) -> Result<Self, Status> {
        let mut raw = ptr::null_mut();
        // SAFETY: `raw` is a valid out-pointer.
        let code = unsafe { (api.init)(&mut raw) };
        api.check(code)?;
        Ok(Self { api, raw })
    }

    fn exit(&mut self) -> Result<(), Status> {
        let raw = std::mem::replace(&mut self.raw, ptr::null_mut());
        if raw.is_null() {
            return Ok(());
        }
        // SAFETY: `raw` came from `opentmf_init` and is released exactly once.
        let code = unsafe { (self.api.exit)(raw) };
        self.api.check(code)
    }

    fn open(&self, url: &str) -> Result<Handle<'_>, Status> {
        // Identifiers come from C strings, so only a caller-built URL can hold a NUL.
        let c_url = CString::new(url).map_err(|_| Status::new(INVALID_URL, "Invalid URL"))?;
        let mut raw = ptr::null_mut();
        // SAFETY: context is live, `c_url` outlives the call, `raw` is a valid out-pointer.
        let code = unsafe { (self.api.open)(self.raw, c_url.as_ptr(), &mut raw) };
        self.api.check(code)?;
        Ok(Handle { api: self.api, raw })
    }
}

impl Drop for Context<'_> {
    fn drop(&mut self) {
        let _ = self.exit();
    }
}

impl<'lib> Backend for Context<'lib> {
    type DriverList<'a>
        = CList<'a>
    where
        Self: 'a;
    type Driver<'a>
        = Handle<'a>
    where
        Self: 'a;
    type Device<'a>
        = Handle<'a>
    where
        Self: 'a;

    fn driver_list(&self) -> Result<CList<'_>, Status> {
        let mut raw = ptr::null_mut();
        // SAFETY: context is live and `raw` is a valid out-pointer.
        let code = unsafe { (self.api.get_driver_list)(self.raw, &mut raw) };
        self.api.check(code)?;
        // SAFETY: on success the library hands out a null-terminated list.
        Ok(unsafe { CList::new(self.api, ListOwner::Context(self.raw), raw) })
    }

    fn open_driver(&self, url: &str) -> Result<Handle<'_>, Status> {
        self.open(url)
    }

    fn open_device(&self, url: &str) -> Result<Handle<'_>, Status> {
        self.open(url)
    }

    fn finalize(mut self) -> Result<(), Status> {
        self.exit()
    }
}

/// An opened driver or device handle; closed on drop.
pub struct Handle<'a> {
    api: &'a Api,
    raw: *mut RawHandle,
}

impl Drop for Handle<'_> {
    fn drop(&mut self) {
        // SAFETY: `raw` came from a successful `opentmf_open` and is closed once.
        unsafe { (self.api.close)(self.raw) };
    }
}

impl Driver for Handle<'_> {
    type DeviceList<'d>
        = CList<'d>
    where
        Self: 'd;

    fn info(&self) -> DriverInfo {
        // SAFETY: handle is live; the record is owned by the handle.
        let info = unsafe { (self.api.drv_get_info)(self.raw) };
        if info.is_null() {
            return DriverInfo::default();
        }
        // SAFETY: non-null record valid while the handle is open; strings are copied out.
        unsafe {
            let info = &*info;
            DriverInfo {
                name: c_str(info.name).into_owned(),
                version: Version {
                    major: info.version.major,
                    minor: info.version.minor,
                    patch: info.version.patch,
                    extra: c_str(info.version.extra).into_owned(),
                },
                description: c_str(info.description).into_owned(),
                authors: c_str(info.authors).into_owned(),
                license: c_str(info.license).into_owned(),
                non_free: info.non_free,
            }
        }
    }

    fn device_list(&self) -> Result<CList<'_>, Status> {
        let mut raw = ptr::null_mut();
        // SAFETY: handle is live and `raw` is a valid out-pointer.
        let code = unsafe { (self.api.drv_get_device_list)(self.raw, &mut raw) };
        self.api.check(code)?;
        // SAFETY: on success the library hands out a null-terminated list.
        Ok(unsafe { CList::new(self.api, ListOwner::Driver(self.raw), raw) })
    }
}

impl Device for Handle<'_> {
    fn info(&self) -> DeviceInfo {
        // SAFETY: handle is live; the record is owned by the handle.
        let info = unsafe { (self.api.dev_get_info)(self.raw) };
        if info.is_null() {
            return DeviceInfo::default();
        }
        // SAFETY: non-null record valid while the handle is open.
        unsafe {
            let info = &*info;
            DeviceInfo {
                name: c_str(info.name).into_owned(),
                serial: c_str(info.serial).into_owned(),
            }
        }
    }
}

/// Which object a list must be returned to.
#[derive(Clone, Copy)]
enum ListOwner {
    Context(*mut RawContext),
    Driver(*mut RawHandle),
}

/// A `char**` list owned by the library, with its entries copied out.
pub struct CList<'a> {
    api: &'a Api,
    owner: ListOwner,
    raw: *mut *mut c_char,
    names: Vec<String>,
    freed: bool,
}

impl<'a> CList<'a> {
    /// # Safety
    ///
    /// `raw` must be null or a null-terminated list obtained from `owner`.
    unsafe fn new(api: &'a Api, owner: ListOwner, raw: *mut *mut c_char) -> Self {
        // SAFETY: forwarded from the caller.
        let names = unsafe { string_list(raw) };
        Self {
            api,
            owner,
            raw,
            names,
            freed: false,
        }
    }

    fn release(&mut self) -> Result<(), Status> {
        if self.freed {
            return Ok(());
        }
        self.freed = true;
        // SAFETY: `raw` was produced by `owner`, which outlives `'a`; released once.
        let code = unsafe {
            match self.owner {
                ListOwner::Context(ctx) => (self.api.free_driver_list)(ctx, self.raw),
                ListOwner::Driver(drv) => (self.api.drv_free_device_list)(drv, self.raw),
            }
        };
        self.api.check(code)
    }
}

impl NameList for CList<'_> {
    fn names(&self) -> &[String] {
        &self.names
    }

    fn free(mut self) -> Result<(), Status> {
        self.release()
    }
}

impl Drop for CList<'_> {
    fn drop(&mut self) {
        let _ = self.release();
    }
}
