//! List command implementation for statik CLI.

use std::path::Path;

use statik_core::{Manifest, RuntimeDirs};

use crate::colors;

/// Print every registration in the manifest, active or disabled.
pub fn execute(root: &Path) -> anyhow::Result<()> {
    let dirs = RuntimeDirs::new(root);
    let manifest = Manifest::load(&dirs.manifest_path)?;

    let mut active = 0;
    let mut disabled = 0;
    for (entry, is_active) in manifest.registrations() {
        let (marker, color) = if is_active {
            active += 1;
            ("[x]", colors::GREEN)
        } else {
            disabled += 1;
            ("[ ]", colors::DIM)
        };
        let opts = if entry.opts.is_empty() {
            String::new()
        } else {
            format!(" {}{}{}", colors::DIM, entry.opts, colors::RESET)
        };
        println!(
            "{}{}{} {:<24} {}{}",
            color, marker, colors::RESET, entry.name, entry.target, opts
        );
    }

    println!();
    println!(
        "{}{}{} active, {} disabled",
        colors::BOLD,
        active,
        colors::RESET,
        disabled
    );
    Ok(())
}
