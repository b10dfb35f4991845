use crate::{Error, Result};
use std::ffi::{CStr, CString, c_void};
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};
use std::ptr::NonNull;

/// Handle returned by `dlopen`, closed on drop
pub(crate) struct DynamicLibrary {
    handle: NonNull<c_void>,
    path: PathBuf,
}

// dlopen handles are process-global and usable from any thread.
unsafe impl Send for DynamicLibrary {}
unsafe impl Sync for DynamicLibrary {}

impl DynamicLibrary {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let c_path = CString::new(path.as_os_str().as_bytes()).map_err(|_| Error::Load {
            path: path.to_path_buf(),
            message: "path contains a NUL byte".to_string(),
        })?;

        let handle = unsafe { libc::dlopen(c_path.as_ptr(), libc::RTLD_NOW | libc::RTLD_LOCAL) };
        match NonNull::new(handle) {
            Some(handle) => Ok(Self {
                handle,
                path: path.to_path_buf(),
            }),
            None => Err(Error::Load {
                path: path.to_path_buf(),
                message: last_error(),
            }),
        }
    }

    pub(crate) fn symbol(&self, name: &str) -> Option<NonNull<c_void>> {
        let c_name = CString::new(name).ok()?;
        unsafe {
            libc::dlerror();
            NonNull::new(libc::dlsym(self.handle.as_ptr(), c_name.as_ptr()))
        }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for DynamicLibrary {
    fn drop(&mut self) {
        if unsafe { libc::dlclose(self.handle.as_ptr()) } != 0 {
            tracing::warn!(path = %self.path.display(), error = %last_error(), "dlclose failed");
        }
    }
}

fn last_error() -> String {
    let message = unsafe { libc::dlerror() };
    if message.is_null() {
        return "unknown dynamic loader error".to_string();
    }
    unsafe { CStr::from_ptr(message) }
        .to_string_lossy()
        .into_owned()
}
