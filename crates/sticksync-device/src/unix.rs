//! Unix-specific volume queries

use std::ffi::CString;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use sticksync_types::{Error, Result};
use tracing::debug;

/// Free space available to unprivileged users, from `statvfs`
pub fn available_space(path: &Path) -> Result<u64> {
    let path_cstring = CString::new(path.as_os_str().as_bytes())
        .map_err(|e| Error::device(format!("Invalid path {}: {}", path.display(), e)))?;

    let mut statvfs_buf: libc::statvfs = unsafe { std::mem::zeroed() };

    let result = unsafe { libc::statvfs(path_cstring.as_ptr(), &mut statvfs_buf) };

    if result != 0 {
        let error = std::io::Error::last_os_error();
        return Err(Error::device(format!(
            "Failed to get filesystem statistics for {}: {}",
            path.display(),
            error
        )));
    }

    let block_size = statvfs_buf.f_frsize as u64;
    let available_blocks = statvfs_buf.f_bavail as u64;
    let available = available_blocks.saturating_mul(block_size);

    debug!("{} has {} bytes available", path.display(), available);
    Ok(available)
}
