use crate::error::{CliError, Result};
use bio::io::fasta;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputRecord {
    pub id: String,
    pub sequence: String,
}

/// Reads every record of every input in order, stopping after `limit` records.
pub fn read_records(paths: &[impl AsRef<Path>], limit: Option<usize>) -> Result<Vec<InputRecord>> {
    let mut records = Vec::new();
    for path in paths {
        let path = path.as_ref();
        let reader = fasta::Reader::from_file(path).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e,
        })?;
        for record in reader.records() {
            if limit.is_some_and(|n| records.len() >= n) {
                return Ok(records);
            }
            let record = record.map_err(|e| CliError::FileParsing {
                path: path.to_path_buf(),
                source: e.into(),
            })?;
            records.push(InputRecord {
                id: record.id().to_string(),
                sequence: String::from_utf8_lossy(record.seq()).into_owned(),
            });
        }
    }
    Ok(records)
}

pub struct OutputRecord {
    pub id: String,
    pub description: String,
    pub sequence: String,
}

pub fn write_records<W: Write>(writer: W, records: &[OutputRecord]) -> Result<()> {
    let mut writer = fasta::Writer::new(writer);
    for record in records {
        writer.write(
            &record.id,
            Some(record.description.as_str()),
            record.sequence.as_bytes(),
        )?;
    }
    writer.flush()?;
    Ok(())
}
