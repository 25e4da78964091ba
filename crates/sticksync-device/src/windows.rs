//! Windows-specific volume queries

use std::ffi::OsStr;
use std::os::windows::ffi::OsStrExt;
use std::path::Path;
use sticksync_types::{Error, Result};
use tracing::debug;
use winapi::shared::minwindef::FALSE;
use winapi::shared::ntdef::ULARGE_INTEGER;
use winapi::um::fileapi::GetDiskFreeSpaceExW;

/// Free space available to the calling user, from `GetDiskFreeSpaceExW`
pub fn available_space(path: &Path) -> Result<u64> {
    let path_wide: Vec<u16> = OsStr::new(path)
        .encode_wide()
        .chain(std::iter::once(0))
        .collect();

    let mut free_bytes_available: ULARGE_INTEGER = unsafe { std::mem::zeroed() };
    let mut total_bytes: ULARGE_INTEGER = unsafe { std::mem::zeroed() };
    let mut total_free_bytes: ULARGE_INTEGER = unsafe { std::mem::zeroed() };

    let space_result = unsafe {
        GetDiskFreeSpaceExW(
            path_wide.as_ptr(),
            &mut free_bytes_available,
            &mut total_bytes,
            &mut total_free_bytes,
        )
    };

    if space_result == FALSE {
        let error = std::io::Error::last_os_error();
        return Err(Error::device(format!(
            "Failed to get disk space information for {}: {}",
            path.display(),
            error
        )));
    }

    let available = unsafe { *free_bytes_available.QuadPart() };
    debug!("{} has {} bytes available", path.display(), available);
    Ok(available)
}
