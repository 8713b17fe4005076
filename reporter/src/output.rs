use std::path::{Path, PathBuf};

use crate::error::ReportError;

/// Create the output directory and its parents if they do not exist yet.
pub fn ensure_output_dir(dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir).map_err(|e| ReportError::io(dir, e))?;
    Ok(())
}

/// Write `file_name` in `dir` through a temporary file that is renamed over the target once
/// `write` succeeds, so the target is never left partially written.
///
/// The temporary file keeps the extension of `file_name`, for writers that pick the encoding from
/// the path. It is removed if `write` fails.
pub fn write_atomically<F>(dir: &Path, file_name: &str, write: F) -> anyhow::Result<PathBuf>
where
    F: FnOnce(&Path) -> anyhow::Result<()>,
{
    let target = dir.join(file_name);
    let suffix = Path::new(file_name)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();

    let temp = tempfile::Builder::new()
        .prefix(".tmp-")
        .suffix(&suffix)
        .tempfile_in(dir)
        .map_err(|e| ReportError::io(dir, e))?;

    write(temp.path())?;

    temp.persist(&target)
        .map_err(|e| ReportError::io(&target, e.error))?;

    Ok(target)
}
