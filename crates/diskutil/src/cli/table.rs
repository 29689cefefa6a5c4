//! Fixed-width disk table: `DISK  BAY  SERVICE?  LOCATE?`.

use std::io::{self, Write};

use diskutil_lib::led::LedState;

use super::{DiskRecord, Reporter};

const DISK_WIDTH: usize = 25;
const BAY_WIDTH: usize = 25;
const LED_WIDTH: usize = 8;

/// Placeholder for a missing disk name or bay label.
const MISSING: &str = "-";

const REVERSE: &str = "\x1b[7m";
const RESET: &str = "\x1b[0m";

fn format_line(disk: &str, bay: &str, service: &str, locate: &str) -> String {
    format!("{disk:>DISK_WIDTH$} {bay:<BAY_WIDTH$} {service} {locate}")
        .trim_end()
        .to_string()
}

pub(super) fn format_header() -> String {
    format_line(
        "DISK",
        "BAY",
        &format!("{:<LED_WIDTH$}", "SERVICE?"),
        "LOCATE?",
    )
}

/// One LED column. ON is shown in reverse video when `highlight` is set.
pub(super) fn led_cell(state: LedState, highlight: bool) -> String {
    let text = format!("{:<LED_WIDTH$}", state.to_string());
    if highlight && state == LedState::On {
        format!("{REVERSE}{text}{RESET}")
    } else {
        text
    }
}

pub(super) fn format_row(record: &DiskRecord, highlight: bool) -> String {
    format_line(
        record.logical_name.as_deref().unwrap_or(MISSING),
        record.bay_label.as_deref().unwrap_or(MISSING),
        &led_cell(record.leds.service, highlight),
        &led_cell(record.leds.locate, highlight),
    )
}

/// Writes the table as the walk produces it.
pub(super) struct TableReporter<W: Write> {
    out: W,
    highlight: bool,
}

impl<W: Write> TableReporter<W> {
    pub(super) fn new(out: W, highlight: bool) -> Self {
        TableReporter { out, highlight }
    }

    #[cfg(test)]
    pub(super) fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Reporter for TableReporter<W> {
    fn header(&mut self) -> io::Result<()> {
        writeln!(self.out, "{}", format_header())
    }

    fn disk(&mut self, record: &DiskRecord) -> io::Result<()> {
        writeln!(self.out, "{}", format_row(record, self.highlight))?;
        self.out.flush()
    }
}
