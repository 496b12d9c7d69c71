//! Plain-text build summaries.

use std::time::Duration;

use fob_dev_config::StatsOptions;
use owo_colors::OwoColorize;

use crate::compilation::{Compilation, StaticCompilation};

/// Format file size in human-readable format.
///
/// # Examples
///
/// ```
/// use fob_dev_middleware::stats::format_size;
///
/// assert_eq!(format_size(0), "0 B");
/// assert_eq!(format_size(500), "500 B");
/// assert_eq!(format_size(1536), "1.50 KB");
/// ```
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];

    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.2} {}", size, UNITS[unit_idx])
    }
}

/// Format duration in human-readable format.
///
/// ```
/// use std::time::Duration;
/// use fob_dev_middleware::stats::format_duration;
///
/// assert_eq!(format_duration(Duration::from_millis(50)), "50ms");
/// assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();

    if total_ms < 1000 {
        format!("{}ms", total_ms)
    } else if total_ms < 60_000 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

/// Which parts of the summary a preset shows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Sections {
    header: bool,
    hash: bool,
    assets: bool,
    warnings: bool,
    errors: bool,
    timings: bool,
}

impl Sections {
    fn for_options(options: &StatsOptions) -> Self {
        let mut sections = match options.preset_name() {
            "none" => Sections::default(),
            "errors-only" => Sections {
                errors: true,
                ..Sections::default()
            },
            "errors-warnings" => Sections {
                warnings: true,
                errors: true,
                ..Sections::default()
            },
            "minimal" => Sections {
                header: true,
                warnings: true,
                errors: true,
                ..Sections::default()
            },
            "verbose" | "detailed" => Sections {
                header: true,
                hash: true,
                assets: true,
                warnings: true,
                errors: true,
                timings: true,
            },
            // "normal" and unknown presets
            _ => Sections {
                header: true,
                assets: true,
                warnings: true,
                errors: true,
                timings: true,
                ..Sections::default()
            },
        };

        if let Some(assets) = options.assets {
            sections.assets = assets;
        }
        if let Some(warnings) = options.warnings {
            sections.warnings = warnings;
        }
        if let Some(errors) = options.errors {
            sections.errors = errors;
        }
        if let Some(timings) = options.timings {
            sections.timings = timings;
        }

        sections
    }
}

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{count} {word}")
    } else {
        format!("{count} {word}s")
    }
}

/// Render a summary of one compilation.
///
/// Returns an empty string when nothing is selected (for example the `none`
/// preset, or `errors-only` on a clean build).
pub fn summary(compilation: &StaticCompilation, options: &StatsOptions) -> String {
    let sections = Sections::for_options(options);
    let colors = options.colors == Some(true);
    let mut lines = Vec::new();

    if sections.header {
        let errors = compilation.errors().len();
        let warnings = compilation.warnings().len();

        let status = if errors > 0 {
            let text = format!("compiled with {}", plural(errors, "error"));
            if colors { text.red().bold().to_string() } else { text }
        } else if warnings > 0 {
            let text = format!("compiled with {}", plural(warnings, "warning"));
            if colors { text.yellow().bold().to_string() } else { text }
        } else {
            let text = "compiled successfully".to_string();
            if colors { text.green().bold().to_string() } else { text }
        };

        let mut header = match compilation.name() {
            Some(name) => format!("{name} {status}"),
            None => status,
        };
        if sections.timings {
            if let Some(duration) = compilation.elapsed() {
                header.push_str(&format!(" in {}", format_duration(duration)));
            }
        }
        lines.push(header);
    }

    if let (true, Some(hash)) = (sections.hash, compilation.hash()) {
        lines.push(format!("hash {hash}"));
    }

    if sections.assets {
        for asset in compilation.assets() {
            let size = format_size(asset.size);
            if colors {
                lines.push(format!("asset {} {}", asset.name.bold(), size.dimmed()));
            } else {
                lines.push(format!("asset {} {}", asset.name, size));
            }
        }
    }

    if sections.warnings {
        for warning in compilation.warnings() {
            let text = format!("WARNING {warning}");
            lines.push(if colors { text.yellow().to_string() } else { text });
        }
    }

    if sections.errors {
        for error in compilation.errors() {
            let text = format!("ERROR {error}");
            lines.push(if colors { text.red().to_string() } else { text });
        }
    }

    lines.join("\n")
}
