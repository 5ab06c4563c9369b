/// Output formatting: aligned text table or JSON. TTY detection.
use std::io::{IsTerminal, Write};

use colored::Colorize;

use crate::cluster::{ClusterError, Report};
use crate::types::{ClusterRow, ErrorOutput, HEADER};

/// Output context passed to the renderer.
#[allow(clippy::struct_excessive_bools)]
pub struct OutputCtx {
    pub json: bool,
    pub no_header: bool,
    /// Color rows by status; set when stdout is a terminal.
    pub color: bool,
    /// When true, report phase timings to stderr.
    pub debug: bool,
}

impl OutputCtx {
    /// Construct from CLI args.
    #[must_use]
    pub fn new(json: bool, no_header: bool, debug: bool) -> Self {
        Self {
            json,
            no_header,
            color: std::io::stdout().is_terminal(),
            debug,
        }
    }

    /// Start a named debug timer. Reports elapsed time on drop only when `--debug` is set.
    #[must_use]
    pub fn timer(&self, label: &'static str) -> DebugTimer {
        DebugTimer::new(label, self.debug)
    }
}

// --- Cluster output ---

/// Render the whole report in the selected format: a pretty-printed JSON
/// array followed by a newline, or the text table.
///
/// # Errors
///
/// Returns `ClusterError::Json` if the records cannot be serialized.
pub fn render_report(report: &Report, ctx: &OutputCtx) -> Result<String, ClusterError> {
    if ctx.json {
        let mut s = serde_json::to_string_pretty(&report.records)?;
        s.push('\n');
        Ok(s)
    } else {
        Ok(format_table(&report.rows, !ctx.no_header, ctx.color))
    }
}

/// Write the report to stdout in the selected format.
///
/// The whole document is rendered before anything is written.
///
/// # Errors
///
/// - `ClusterError::Json` — the records cannot be serialized
/// - `ClusterError::Output` — stdout cannot be written
pub fn write_report(report: &Report, ctx: &OutputCtx) -> Result<(), ClusterError> {
    let text = render_report(report, ctx)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    out.write_all(text.as_bytes())
        .and_then(|()| out.flush())
        .map_err(ClusterError::Output)
}

/// Render rows as space-separated, left-aligned columns.
///
/// Every column but the last is padded to its widest cell (header included
/// when shown). With `color`, data rows are green when the status starts with
/// `online` and red otherwise; the header is never colored.
#[must_use]
pub fn format_table(rows: &[ClusterRow], header: bool, color: bool) -> String {
    let mut lines: Vec<[&str; 7]> = Vec::with_capacity(rows.len() + 1);
    if header {
        lines.push(HEADER);
    }
    lines.extend(rows.iter().map(ClusterRow::cells));

    let mut widths = [0usize; 6];
    for cells in &lines {
        for (width, cell) in widths.iter_mut().zip(cells.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut text = String::new();
    for (idx, cells) in lines.iter().enumerate() {
        let mut line = String::new();
        for (cell, width) in cells.iter().zip(widths) {
            line.push_str(&format!("{cell:<width$} "));
        }
        line.push_str(cells[6]);

        let is_header = header && idx == 0;
        if color && !is_header {
            let painted = if cells[3].starts_with("online") {
                line.green()
            } else {
                line.red()
            };
            text.push_str(&painted.to_string());
        } else {
            text.push_str(&line);
        }
        text.push('\n');
    }
    text
}

// --- Error output ---

/// Write an error to stderr, as a JSON envelope when `--json` was given.
pub fn write_error(err: &ClusterError, json: bool) {
    let stderr = std::io::stderr();
    let mut out = stderr.lock();
    if json {
        let s = serde_json::to_string_pretty(&ErrorOutput::from_cluster_error(err))
            .unwrap_or_default();
        let _ = writeln!(out, "{s}");
    } else {
        let _ = writeln!(out, "Error: {err}");
    }
}

// --- Debug timer ---

/// A RAII timer that logs elapsed milliseconds on drop.
///
/// Created via [`OutputCtx::timer`]. Does nothing when `debug` is false.
pub struct DebugTimer {
    label: &'static str,
    start: std::time::Instant,
    active: bool,
}

impl DebugTimer {
    #[must_use]
    fn new(label: &'static str, active: bool) -> Self {
        Self {
            label,
            start: std::time::Instant::now(),
            active,
        }
    }
}

impl Drop for DebugTimer {
    fn drop(&mut self) {
        if self.active {
            let ms = self.start.elapsed().as_secs_f64() * 1000.0;
            tracing::debug!(phase = self.label, elapsed_ms = ms, "timing");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(version: &str, cluster: &str, status: &str, log: &str) -> ClusterRow {
        ClusterRow {
            version: version.to_owned(),
            cluster: cluster.to_owned(),
            port: "5432".to_owned(),
            status: status.to_owned(),
            owner: "postgres".to_owned(),
            data_directory: format!("/var/lib/postgresql/{version}/{cluster}"),
            log_file: log.to_owned(),
        }
    }

    #[test]
    fn test_table_with_header() {
        let rows = [row(
            "13",
            "main",
            "online",
            "/var/log/postgresql/postgresql-13-main.log",
        )];
        let text = format_table(&rows, true, false);
        assert_eq!(
            text,
            "Ver Cluster Port Status Owner    Data directory              Log file\n\
             13  main    5432 online postgres /var/lib/postgresql/13/main /var/log/postgresql/postgresql-13-main.log\n"
        );
    }

    #[test]
    fn test_table_without_header() {
        let rows = [
            row("9.6", "main", "down", "/l/a.log"),
            row("13", "replica", "online", "/l/b.log"),
        ];
        let text = format_table(&rows, false, false);
        assert_eq!(
            text,
            "9.6 main    5432 down   postgres /var/lib/postgresql/9.6/main   /l/a.log\n\
             13  replica 5432 online postgres /var/lib/postgresql/13/replica /l/b.log\n"
        );
    }

    #[test]
    fn test_last_column_not_padded() {
        let rows = [
            row("13", "main", "online", "short"),
            row("13", "other", "online", "a-much-longer-destination"),
        ];
        let text = format_table(&rows, true, false);
        for line in text.lines() {
            assert!(!line.ends_with(' '), "{line:?}");
        }
    }

    #[test]
    fn test_empty_table_prints_header_only() {
        assert_eq!(
            format_table(&[], true, false),
            "Ver Cluster Port Status Owner Data directory Log file\n"
        );
        assert_eq!(format_table(&[], false, false), "");
    }

    #[test]
    fn test_colored_rows() {
        colored::control::set_override(true);
        let rows = [
            row("13", "main", "online,recovery", "/l/a.log"),
            row("13", "old", "down", "/l/b.log"),
        ];
        let text = format_table(&rows, true, true);
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("Ver "), "header is never colored");
        assert!(lines[1].starts_with("\u{1b}[32m"), "{:?}", lines[1]);
        assert!(lines[1].ends_with("\u{1b}[0m"));
        assert!(lines[2].starts_with("\u{1b}[31m"), "{:?}", lines[2]);
    }
}
