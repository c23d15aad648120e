use std::{fs, io::Write, path::Path};

use tempfile::NamedTempFile;

use crate::errors::Result;

pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)?;
    Ok(())
}

/// Replaces `path` with `data` by staging to a uniquely named temporary file
/// in the same directory and renaming it over the target. The target is either
/// fully old or fully new, and no other file in the directory is touched.
pub fn replace_file(path: &Path, data: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    ensure_dir(dir)?;
    let mut staged = NamedTempFile::new_in(dir)?;
    staged.write_all(data)?;
    staged.flush()?;
    staged.as_file().sync_all()?;
    staged.persist(path).map_err(|err| err.error)?;
    Ok(())
}
