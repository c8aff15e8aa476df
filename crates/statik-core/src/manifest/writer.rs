//! Manifest persistence.

use std::fs;
use std::path::PathBuf;

use crate::error::Result;

use super::Manifest;

/// Write `manifest` back to its file.
///
/// The text goes to a sibling temporary file first and is renamed over the
/// manifest, so an interrupted write never leaves a truncated manifest.
pub fn write_manifest(manifest: &Manifest) -> Result<()> {
    let path = manifest.path();
    let mut tmp_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    tmp_name.push(".tmp");
    let tmp_path: PathBuf = path.with_file_name(tmp_name);

    fs::write(&tmp_path, manifest.render())?;
    if let Err(err) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(err.into());
    }

    tracing::debug!(
        "Wrote {} ({} new lines)",
        path.display(),
        manifest.appended()
    );
    Ok(())
}
