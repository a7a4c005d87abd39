use crate::error::QueryError;
use crate::reshape::OutputRecord;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, clap::ValueEnum)]
pub enum OutputFormat {
    #[value(name = "yaml", help = "YAML sequence of records")]
    Yaml,
    #[value(name = "json", help = "Pretty-printed JSON array of records")]
    Json,
}

/// Write all records as one top-level list, even when there are none
pub fn write_records<W: Write>(
    output: &mut W,
    format: OutputFormat,
    records: &[OutputRecord],
) -> Result<(), QueryError> {
    match format {
        OutputFormat::Yaml => {
            serde_yaml::to_writer(&mut *output, records)?;
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *output, records)?;
            writeln!(output)?;
        }
    }
    Ok(())
}
