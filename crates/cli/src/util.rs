//! CLI utility functions.

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

pub fn format_bytes(bytes: usize) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    // Anything that would print as "1024.0 KB" is shown in MB instead.
    const MB_THRESHOLD: usize = 1_048_525;

    match bytes {
        0..1024 => format!("{bytes} B"),
        1024..MB_THRESHOLD => format!("{:.1} KB", bytes as f64 / KB),
        _ => format!("{:.2} MB", bytes as f64 / MB),
    }
}

/// A steady-ticking stderr spinner showing `message`.
pub fn spinner(message: impl Into<String>) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.enable_steady_tick(Duration::from_millis(80));
    bar.set_message(message.into());
    bar
}

pub fn read_file(path: &Path, what: &str) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("Failed to read {what}: {}", path.display()))
}
