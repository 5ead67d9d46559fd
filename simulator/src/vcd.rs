//! Incremental value-change-dump writer for waveform traces.
//!
//! The header is produced from a static signal table so a sink can be opened
//! before any model exists; samples are appended one timestamp at a time and
//! only changed signals are emitted.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// One traced signal: display name and bit width.
pub struct SignalDef {
    pub name: &'static str,
    pub width: u32,
}

pub struct VcdWriter {
    out: BufWriter<File>,
    defs: &'static [SignalDef],
    last: Vec<Option<u64>>,
}

impl VcdWriter {
    pub fn create(path: &Path, defs: &'static [SignalDef]) -> io::Result<Self> {
        let mut out = BufWriter::new(File::create(path)?);

        writeln!(out, "$timescale 1ns $end")?;
        writeln!(out, "$scope module tb $end")?;
        for (idx, def) in defs.iter().enumerate() {
            if def.width == 1 {
                writeln!(out, "$var wire 1 {} {} $end", ident(idx), def.name)?;
            } else {
                writeln!(
                    out,
                    "$var wire {} {} {} [{}:0] $end",
                    def.width,
                    ident(idx),
                    def.name,
                    def.width - 1
                )?;
            }
        }
        writeln!(out, "$upscope $end")?;
        writeln!(out, "$enddefinitions $end")?;

        Ok(Self {
            out,
            defs,
            last: vec![None; defs.len()],
        })
    }

    /// Record one sample. `values` must match the signal table in length and
    /// order; signals whose value is unchanged since the previous sample are
    /// skipped, and a timestamp with no changes writes nothing.
    pub fn dump(&mut self, time: u64, values: &[u64]) -> io::Result<()> {
        debug_assert_eq!(values.len(), self.defs.len());

        if self
            .last
            .iter()
            .zip(values)
            .all(|(last, value)| *last == Some(*value))
        {
            return Ok(());
        }

        writeln!(self.out, "#{time}")?;
        for (idx, (def, value)) in self.defs.iter().zip(values).enumerate() {
            if self.last[idx] == Some(*value) {
                continue;
            }
            if def.width == 1 {
                writeln!(self.out, "{}{}", value & 1, ident(idx))?;
            } else {
                let mask = if def.width >= 64 {
                    u64::MAX
                } else {
                    (1u64 << def.width) - 1
                };
                writeln!(
                    self.out,
                    "b{:0width$b} {}",
                    value & mask,
                    ident(idx),
                    width = def.width as usize
                )?;
            }
            self.last[idx] = Some(*value);
        }
        Ok(())
    }

    pub fn finish(mut self) -> io::Result<()> {
        self.out.flush()
    }
}

/// VCD identifier codes: printable ASCII starting at '!'.
fn ident(idx: usize) -> char {
    char::from(b'!' + idx as u8)
}
