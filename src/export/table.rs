use std::path::Path;

use anyhow::{bail, Context, Result};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};

use crate::model::HazardCodeSet;

pub const CAS_COLUMN: &str = "CAS";
pub const HAZARDS_COLUMN: &str = "Hazards";
pub const PRECAUTIONS_COLUMN: &str = "Precautions";

/// An input CSV held in memory until the codes are known.
#[derive(Debug, Clone)]
pub struct Table {
    pub headers: StringRecord,
    pub rows: Vec<StringRecord>,
}

impl Table {
    pub fn read(path: &Path) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        let headers = reader
            .headers()
            .with_context(|| format!("Failed to read header of {}", path.display()))?
            .clone();
        let rows = reader
            .records()
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("Failed to read rows of {}", path.display()))?;
        Ok(Self { headers, rows })
    }

    /// Values of column `name` in row order; short rows give "".
    pub fn column(&self, name: &str) -> Result<Vec<String>> {
        let Some(idx) = self.headers.iter().position(|h| h.trim() == name) else {
            bail!("Input CSV has no '{}' column", name);
        };
        Ok(self
            .rows
            .iter()
            .map(|row| row.get(idx).unwrap_or("").to_string())
            .collect())
    }

    /// Write the table back out with Hazards/Precautions filled in, one entry of `codes` per row.
    /// Existing Hazards/Precautions columns are overwritten in place.
    pub fn write_with_codes(&self, path: &Path, codes: &[HazardCodeSet]) -> Result<()> {
        if codes.len() != self.rows.len() {
            bail!(
                "Got {} code sets for {} rows",
                codes.len(),
                self.rows.len()
            );
        }

        let mut headers: Vec<String> = self.headers.iter().map(str::to_string).collect();
        // rows wider than the header keep their extra fields ahead of the code columns
        let widest = self.rows.iter().map(StringRecord::len).max().unwrap_or(0);
        if widest > headers.len() {
            headers.resize(widest, String::new());
        }
        let hazards_idx = column_slot(&mut headers, HAZARDS_COLUMN);
        let precautions_idx = column_slot(&mut headers, PRECAUTIONS_COLUMN);

        let mut writer = WriterBuilder::new()
            .flexible(true)
            .from_path(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        writer.write_record(&headers)?;

        for (row, code) in self.rows.iter().zip(codes) {
            let mut fields: Vec<&str> = row.iter().collect();
            if fields.len() < headers.len() {
                fields.resize(headers.len(), "");
            }
            fields[hazards_idx] = code.hazards.as_str();
            fields[precautions_idx] = code.precautions.as_str();
            writer.write_record(&fields)?;
        }
        writer
            .flush()
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}

fn column_slot(headers: &mut Vec<String>, name: &str) -> usize {
    match headers.iter().position(|h| h.trim() == name) {
        Some(idx) => idx,
        None => {
            headers.push(name.to_string());
            headers.len() - 1
        }
    }
}
