//! Artifact download and SHA-256 verification helpers.

use crate::core::error::{OpavmError, Result};
use crate::core::github::ReleaseSource;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

/// Writer that hashes everything passing through it
struct HashingWriter<W> {
    inner: W,
    hasher: Sha256,
}

impl<W: Write> Write for HashingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.hasher.update(&buf[..written]);
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Stream `url` into `dest`, fsync it and return its hex SHA-256 digest.
/// `dest` is expected to live in a staging directory the caller discards on error.
pub fn download_to<S: ReleaseSource + ?Sized>(
    source: &S,
    url: &str,
    dest: &Path,
) -> Result<String> {
    let file = File::create(dest)?;
    let mut writer = HashingWriter {
        inner: file,
        hasher: Sha256::new(),
    };
    let size = source.download(url, &mut writer)?;
    writer.flush()?;
    writer.inner.sync_all()?;

    let sha256 = hex::encode(writer.hasher.finalize());
    log::debug!("Downloaded {size} bytes to {} (sha256 {sha256})", dest.display());
    Ok(sha256)
}

/// First 64-hex-digit token of a `sha256sum`-style file, lowercased
pub fn parse_checksum_text(text: &str, asset: &str) -> Result<String> {
    text.lines()
        .filter_map(|line| line.split_whitespace().next())
        .find(|token| token.len() == 64 && token.chars().all(|c| c.is_ascii_hexdigit()))
        .map(str::to_ascii_lowercase)
        .ok_or_else(|| OpavmError::InvalidChecksumFile {
            asset: asset.to_string(),
        })
}

/// Compare digests exactly; a mismatch is never retried
pub fn verify_checksum(asset: &str, expected: &str, actual: &str) -> Result<()> {
    if expected.eq_ignore_ascii_case(actual) {
        Ok(())
    } else {
        Err(OpavmError::checksum_mismatch(asset, expected, actual))
    }
}

#[cfg(unix)]
pub fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = std::fs::metadata(path)?.permissions();
    perms.set_mode(perms.mode() | 0o755);
    std::fs::set_permissions(path, perms)?;
    Ok(())
}

#[cfg(not(unix))]
pub fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}
