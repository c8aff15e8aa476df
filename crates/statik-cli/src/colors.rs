//! Terminal colors and progress lines for CLI output.

use std::io::{self, Write};

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
pub const DIM: &str = "\x1b[2m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const BLUE: &str = "\x1b[34m";
pub const CYAN: &str = "\x1b[36m";
pub const RED: &str = "\x1b[31m";

/// Start a progress line; finish it with [`done`].
pub fn step(label: &str) {
    print!("{BLUE}  ◆ {label}{RESET} ... ");
    io::stdout().flush().ok();
}

/// Finish a progress line started by [`step`].
pub fn done(detail: &str) {
    println!("{GREEN}✓{RESET} ({detail})");
}
