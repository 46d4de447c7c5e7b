use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use serde_json as json;

use crate::{specification::result::Result, trace::VerdictEntry};

/// Appends verdicts as JSON lines.
pub struct VerdictWriter<W: Write> {
    output: W,
    written: usize,
}

impl VerdictWriter<BufWriter<File>> {
    pub fn create(path: &Path) -> Result<Self> {
        log::info!("storing verdicts in {}", path.display());
        let file = File::options().append(true).create(true).open(path)?;
        Ok(VerdictWriter::new(BufWriter::new(file)))
    }
}

impl<W: Write> VerdictWriter<W> {
    pub fn new(output: W) -> Self {
        VerdictWriter { output, written: 0 }
    }

    pub fn write(&mut self, entry: &VerdictEntry) -> Result<()> {
        json::to_writer(&mut self.output, entry)?;
        self.output.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn finish(mut self) -> Result<W> {
        self.output.flush()?;
        Ok(self.output)
    }
}
