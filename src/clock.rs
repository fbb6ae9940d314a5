// src/clock.rs

//! Local time formatting for status labels.

use anyhow::{bail, Context, Result};
use std::ffi::CString;

/// Longest formatted string `format_local_time` produces, NUL excluded.
pub const MAX_FORMATTED_LEN: usize = 63;

/// Formats the current local time with `strftime` conversion specifiers.
///
/// Fails if `format` contains a NUL byte or the result does not fit in
/// `MAX_FORMATTED_LEN` bytes.
pub fn format_local_time(format: &str) -> Result<String> {
    if format.is_empty() {
        return Ok(String::new());
    }
    let c_format = CString::new(format).context("Time format contains a NUL byte")?;

    // SAFETY: time/localtime_r only write into the locals passed to them.
    let tm = unsafe {
        let now = libc::time(std::ptr::null_mut());
        let mut tm: libc::tm = std::mem::zeroed();
        if libc::localtime_r(&now, &mut tm).is_null() {
            bail!("localtime_r failed: {}", std::io::Error::last_os_error());
        }
        tm
    };

    let mut buffer = [0u8; MAX_FORMATTED_LEN + 1];
    // SAFETY: strftime writes at most buffer.len() bytes including the NUL.
    let written = unsafe {
        libc::strftime(
            buffer.as_mut_ptr() as *mut libc::c_char,
            buffer.len(),
            c_format.as_ptr(),
            &tm,
        )
    };
    if written == 0 {
        bail!(
            "Formatted time for {:?} is empty or longer than {} bytes",
            format,
            MAX_FORMATTED_LEN
        );
    }
    String::from_utf8(buffer[..written].to_vec()).context("Formatted time is not valid UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_literal_and_numeric_fields() {
        assert_eq!(format_local_time("at %%").unwrap(), "at %");
        let year = format_local_time("%Y").unwrap();
        assert_eq!(year.len(), 4);
        assert!(year.chars().all(|c| c.is_ascii_digit()));
        let stamp = format_local_time("%D %H:%M").unwrap();
        assert_eq!(stamp.len(), "01/02/26 13:45".len());
    }

    #[test]
    fn empty_format_is_empty() {
        assert_eq!(format_local_time("").unwrap(), "");
    }

    #[test]
    fn rejects_nul_and_overflow() {
        assert!(format_local_time("%H\0%M").is_err());
        let long = "x".repeat(MAX_FORMATTED_LEN + 1);
        assert!(format_local_time(&long).is_err());
        let fits = "x".repeat(MAX_FORMATTED_LEN);
        assert_eq!(format_local_time(&fits).unwrap(), fits);
    }
}
