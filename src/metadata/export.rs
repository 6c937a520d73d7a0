//! Exchange file writers
//!
//! CSV rows are padded to the full header so every record has a cell for
//! every column; list values use their literal form (`['Rock']`). JSON
//! objects carry only their own fields.

use super::{ExchangeTable, FILE_COLUMN};
use crate::config::ExportFormat;
use crate::error::Result;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

impl ExchangeTable {
    /// Write the table as CSV
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let header = self.header();
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(&header)?;

        for record in self.records() {
            let row = header.iter().map(|column| {
                if column == FILE_COLUMN {
                    record.file.display().to_string()
                } else {
                    record
                        .fields
                        .get(column)
                        .map(ToString::to_string)
                        .unwrap_or_default()
                }
            });
            csv_writer.write_record(row)?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Write the table as a JSON array of objects
    pub fn write_json<W: Write>(&self, mut writer: W) -> Result<()> {
        serde_json::to_writer_pretty(&mut writer, self.records())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }

    /// Write the table to `output`, or to `music_metadata.<ext>` when unset
    pub fn export(&self, format: ExportFormat, output: Option<&Path>) -> Result<PathBuf> {
        let path = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| format.default_output());

        let writer = BufWriter::new(File::create(&path)?);
        match format {
            ExportFormat::Csv => self.write_csv(writer)?,
            ExportFormat::Json => self.write_json(writer)?,
        }

        info!(path = %path.display(), records = self.len(), ?format, "Exported metadata");
        Ok(path)
    }
}
