//! Consumers for the stream of readings.
//!
//! Both sinks render the same seven cells in the same order, only the framing
//! differs: the terminal sink keeps a fixed width table updated in place, the
//! pipe sink appends one timestamped line per reading for a downstream
//! consumer following the stream.

use std::io::{self, Write};

use time::format_description::well_known::Rfc3339;

use crate::payload::SensorReading;

const COLUMN_WIDTH: usize = 12;
const HEADERS: [&str; 7] = [
    "Humidity",
    "Radon ST avg",
    "Radon LT avg",
    "Temperature",
    "Pressure",
    "CO2 level",
    "VOC level",
];

/// Consumes readings one at a time, never buffering more than the current
/// one.
pub trait Sink {
    fn emit(&mut self, reading: &SensorReading) -> io::Result<()>;

    /// Release the output resource. Called once when the poll loop exits.
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// The value and unit cells of one reading, in stable column order.
fn cells(reading: &SensorReading) -> [String; 7] {
    [
        format!("{:.1} %rH", reading.humidity),
        radon_cell(reading.radon_short),
        radon_cell(reading.radon_long),
        format!("{:.2} degC", reading.temperature),
        format!("{:.2} hPa", reading.pressure),
        format!("{} ppm", reading.co2),
        format!("{} ppb", reading.tvoc),
    ]
}

fn radon_cell(value: Option<u16>) -> String {
    match value {
        Some(value) => format!("{} Bq/m3", value),
        None => "N/A".to_string(),
    }
}

/// Interactive display: a fixed width table whose value row is redrawn in
/// place on every reading.
pub struct TerminalSink<W: Write> {
    out: W,
    drawn: bool,
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W) -> Self {
        TerminalSink { out, drawn: false }
    }

    fn row(cells: &[String]) -> String {
        cells
            .iter()
            .map(|cell| format!("{:^1$}", cell, COLUMN_WIDTH))
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

impl<W: Write> Sink for TerminalSink<W> {
    fn emit(&mut self, reading: &SensorReading) -> io::Result<()> {
        if !self.drawn {
            let header = Self::row(&HEADERS.map(String::from));
            writeln!(self.out, "{}", header)?;
            writeln!(self.out, "{}", "-".repeat(header.len()))?;
            // placeholder line for the first cursor-up
            writeln!(self.out)?;
            self.drawn = true;
        }
        // move back over the previous value row and overwrite it
        write!(self.out, "\x1b[1A\r\x1b[2K")?;
        writeln!(self.out, "{}", Self::row(&cells(reading)))?;
        self.out.flush()
    }

    fn close(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

/// Machine readable output: one flushed line per reading, capture timestamp
/// first, then the cells in column order.
pub struct PipeSink<W: Write> {
    out: W,
}

impl<W: Write> PipeSink<W> {
    pub fn new(out: W) -> Self {
        PipeSink { out }
    }
}

impl<W: Write> Sink for PipeSink<W> {
    fn emit(&mut self, reading: &SensorReading) -> io::Result<()> {
        let timestamp = reading
            .captured_at
            .format(&Rfc3339)
            .map_err(io::Error::other)?;
        writeln!(self.out, "{},{}", timestamp, cells(reading).join(","))?;
        self.out.flush()
    }

    fn close(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}
