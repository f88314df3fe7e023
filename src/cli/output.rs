/// Output formatting: text at three verbosity levels, JSON lines, debug timing.
use std::io::{self, Write};

use serde::Serialize;

use super::args::Verbosity;
use crate::opentmf::{DeviceInfo, DriverInfo};

/// Output context passed to all formatters.
#[derive(Debug, Clone, Copy)]
pub struct OutputCtx {
    pub verbosity: Verbosity,
    /// Emit JSON lines instead of text.
    pub json: bool,
    /// When true, print library call timing to stderr.
    pub debug: bool,
}

impl OutputCtx {
    /// Construct from CLI args.
    #[must_use]
    pub fn new(verbosity: Verbosity, json: bool, debug: bool) -> Self {
        Self {
            verbosity,
            json,
            debug,
        }
    }

    /// Start a named debug timer. Prints elapsed on drop only when `--debug` is set.
    #[must_use]
    pub fn timer(&self, label: impl Into<String>) -> DebugTimer {
        DebugTimer::new(label.into(), self.debug)
    }
}

fn free_word(non_free: bool) -> &'static str {
    if non_free { "non-free" } else { "free" }
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

// --- Drivers ---

/// Write one driver at the given verbosity.
///
/// # Errors
///
/// Returns any error from the underlying writer.
pub fn write_driver(out: &mut impl Write, verbosity: Verbosity, info: &DriverInfo) -> io::Result<()> {
    let version = &info.version;
    match verbosity {
        Verbosity::Names => writeln!(out, "{}", info.name),
        Verbosity::Summary => writeln!(
            out,
            "{}\t{version}{}\t{}\t{}",
            info.name,
            version.extra,
            info.license,
            free_word(info.non_free)
        ),
        Verbosity::Detailed => {
            writeln!(out, "Driver: {}", info.name)?;
            writeln!(out, "Version: {version}{}", version.extra)?;
            write_multi_line(out, "Description", &info.description)?;
            write_multi_line(out, "Authors", &info.authors)?;
            writeln!(out, "License: {}", info.license)?;
            writeln!(out, "Free: {}", yes_no(!info.non_free))?;
            writeln!(out)
        }
    }
}

// --- Devices ---

/// Write one device (indented under its driver) at the given verbosity.
///
/// # Errors
///
/// Returns any error from the underlying writer.
pub fn write_device(
    out: &mut impl Write,
    verbosity: Verbosity,
    path: &str,
    info: &DeviceInfo,
) -> io::Result<()> {
    match verbosity {
        Verbosity::Names => writeln!(out, "  {path}"),
        Verbosity::Summary => writeln!(out, "  {path}\t{}\t{}", info.name, info.serial),
        Verbosity::Detailed => {
            writeln!(out, "  Path: {path}")?;
            writeln!(out, "  Name: {}", info.name)?;
            writeln!(out, "  Serial: {}", info.serial)?;
            writeln!(out)
        }
    }
}

// --- Multi-line fields ---

/// Write a labelled field whose text may span several lines.
///
/// Single-line text renders as `Label: text`. Otherwise the label stands alone
/// and every line of the text follows, indented by two spaces; a final line
/// without a trailing newline gets one.
///
/// # Errors
///
/// Returns any error from the underlying writer.
pub fn write_multi_line(out: &mut impl Write, label: &str, text: &str) -> io::Result<()> {
    if !text.contains('\n') {
        return writeln!(out, "{label}: {text}");
    }
    writeln!(out, "{label}:")?;
    for line in text.split_inclusive('\n') {
        write!(out, "  {line}")?;
        if !line.ends_with('\n') {
            writeln!(out)?;
        }
    }
    Ok(())
}

// --- JSON ---

/// Write `value` as one compact JSON line.
///
/// # Errors
///
/// Returns serialization or writer errors.
pub fn write_json_line<T: Serialize + ?Sized>(out: &mut impl Write, value: &T) -> io::Result<()> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)
}

// --- Debug timer ---

/// A RAII timer that prints elapsed milliseconds to stderr on drop.
///
/// Created via [`OutputCtx::timer`]. Does nothing when `debug` is false.
pub struct DebugTimer {
    label: String,
    start: std::time::Instant,
    active: bool,
}

impl DebugTimer {
    #[must_use]
    fn new(label: String, active: bool) -> Self {
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
            eprintln!("[debug] {}: {ms:.2}ms", self.label);
        }
    }
}
