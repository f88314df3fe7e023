/// Raw C interface of `libopentmf`, resolved from the shared library at run time.
use std::borrow::Cow;
use std::ffi::{CStr, OsStr};
use std::os::raw::{c_char, c_int, c_uint};

use libloading::Library;

use super::errors::{LoadError, RawStatus, STATUS_SUCCESS, Status};

/// Opaque `struct opentmf_context`.
#[repr(C)]
pub struct RawContext {
    _private: [u8; 0],
}

/// Opaque `struct opentmf_handle` (driver or device).
#[repr(C)]
pub struct RawHandle {
    _private: [u8; 0],
}

/// `struct opentmf_version`.
#[repr(C)]
pub struct RawVersion {
    pub major: c_uint,
    pub minor: c_uint,
    pub patch: c_uint,
    pub extra: *const c_char,
}

/// `struct opentmf_driver_info`.
#[repr(C)]
pub struct RawDriverInfo {
    pub name: *const c_char,
    pub version: RawVersion,
    pub description: *const c_char,
    pub authors: *const c_char,
    pub license: *const c_char,
    pub non_free: bool,
}

/// `struct opentmf_device_info`.
#[repr(C)]
pub struct RawDeviceInfo {
    pub name: *const c_char,
    pub serial: *const c_char,
}

type InitFn = unsafe extern "C" fn(*mut *mut RawContext) -> c_int;
type ExitFn = unsafe extern "C" fn(*mut RawContext) -> c_int;
type GetDriverListFn = unsafe extern "C" fn(*mut RawContext, *mut *mut *mut c_char) -> c_int;
type FreeDriverListFn = unsafe extern "C" fn(*mut RawContext, *mut *mut c_char) -> c_int;
type OpenFn = unsafe extern "C" fn(*mut RawContext, *const c_char, *mut *mut RawHandle) -> c_int;
type CloseFn = unsafe extern "C" fn(*mut RawHandle);
type DrvGetInfoFn = unsafe extern "C" fn(*mut RawHandle) -> *const RawDriverInfo;
type DrvGetDeviceListFn = unsafe extern "C" fn(*mut RawHandle, *mut *mut *mut c_char) -> c_int;
type DrvFreeDeviceListFn = unsafe extern "C" fn(*mut RawHandle, *mut *mut c_char) -> c_int;
type DevGetInfoFn = unsafe extern "C" fn(*mut RawHandle) -> *const RawDeviceInfo;
type GetStatusStrFn = unsafe extern "C" fn(c_int) -> *const c_char;

/// Entry points of a loaded `libopentmf`.
///
/// The function pointers stay valid for as long as the `Api` (and therefore the
/// loaded library) is alive.
pub struct Api {
    pub(super) init: InitFn,
    pub(super) exit: ExitFn,
    pub(super) get_driver_list: GetDriverListFn,
    pub(super) free_driver_list: FreeDriverListFn,
    pub(super) open: OpenFn,
    pub(super) close: CloseFn,
    pub(super) drv_get_info: DrvGetInfoFn,
    pub(super) drv_get_device_list: DrvGetDeviceListFn,
    pub(super) drv_free_device_list: DrvFreeDeviceListFn,
    pub(super) dev_get_info: DevGetInfoFn,
    pub(super) get_status_str: GetStatusStrFn,
    /// Keeps the symbols above mapped; `None` only for in-process function tables.
    pub(super) _library: Option<Library>,
}

impl std::fmt::Debug for Api {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Api").finish_non_exhaustive()
    }
}

impl Api {
    /// Load the shared library at `path` and resolve every entry point.
    ///
    /// `path` may be a bare file name, in which case the system loader search
    /// path applies.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::Open` if the file cannot be loaded and
    /// `LoadError::Symbol` if any entry point is missing.
    pub fn load(path: &OsStr) -> Result<Self, LoadError> {
        // SAFETY: loading runs the library's initializers; libopentmf has no
        // initializer requirements beyond being a well-formed shared object.
        let library = unsafe { Library::new(path) }.map_err(|source| LoadError::Open {
            path: path.to_string_lossy().into_owned(),
            source,
        })?;

        Ok(Self {
            init: symbol(&library, "opentmf_init")?,
            exit: symbol(&library, "opentmf_exit")?,
            get_driver_list: symbol(&library, "opentmf_get_driver_list")?,
            free_driver_list: symbol(&library, "opentmf_free_driver_list")?,
            open: symbol(&library, "opentmf_open")?,
            close: symbol(&library, "opentmf_close")?,
            drv_get_info: symbol(&library, "opentmf_drv_get_info")?,
            drv_get_device_list: symbol(&library, "opentmf_drv_get_device_list")?,
            drv_free_device_list: symbol(&library, "opentmf_drv_free_device_list")?,
            dev_get_info: symbol(&library, "opentmf_dev_get_info")?,
            get_status_str: symbol(&library, "opentmf_get_status_str")?,
            _library: Some(library),
        })
    }

    /// Map a raw status code to `Ok` or a described [`Status`].
    ///
    /// # Errors
    ///
    /// Returns `Err(Status)` for any non-success code.
    pub fn check(&self, code: RawStatus) -> Result<(), Status> {
        if code == STATUS_SUCCESS {
            return Ok(());
        }
        // SAFETY: the status lookup accepts any code and returns a static string or null.
        let text = unsafe { c_str((self.get_status_str)(code)) };
        Err(Status::new(code, text))
    }
}

/// Resolve one entry point and copy the function pointer out of the symbol.
fn symbol<T: Copy>(library: &Library, name: &'static str) -> Result<T, LoadError> {
    // SAFETY: every `T` used with this helper mirrors the prototype in opentmf.h.
    let sym = unsafe { library.get::<T>(name.as_bytes()) }
        .map_err(|source| LoadError::Symbol { symbol: name, source })?;
    Ok(*sym)
}

/// Borrow a C string as UTF-8, treating null as empty.
///
/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string valid for `'a`.
pub unsafe fn c_str<'a>(ptr: *const c_char) -> Cow<'a, str> {
    if ptr.is_null() {
        Cow::Borrowed("")
    } else {
        // SAFETY: caller guarantees a valid NUL-terminated string.
        unsafe { CStr::from_ptr(ptr) }.to_string_lossy()
    }
}

/// Copy a null-terminated `char**` list into owned strings.
///
/// # Safety
///
/// `list` must be null or point to an array of C strings terminated by a null entry.
pub unsafe fn string_list(list: *const *mut c_char) -> Vec<String> {
    let mut names = Vec::new();
    if list.is_null() {
        return names;
    }
    let mut cursor = list;
    // SAFETY: caller guarantees the array is null-terminated.
    unsafe {
        while !(*cursor).is_null() {
            names.push(c_str(*cursor).into_owned());
            cursor = cursor.add(1);
        }
    }
    names
}
