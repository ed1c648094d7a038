use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::parser::Record;

pub fn format_line(r: &Record) -> String {
    format!("職稱: {}, 姓名: {}, 研究領域: {}\n", r.title, r.name, r.research)
}

/// Write the run's records, one line each, replacing any previous file.
pub fn write_summary(path: &Path, records: &[Record]) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut out = BufWriter::new(file);
    for r in records {
        out.write_all(format_line(r).as_bytes())?;
    }
    out.flush()
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

// ── Tests ──
