use anyhow::{Context, Result, bail};
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;

/// `--export` flag shared by every calculator command.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ExportArgs {
    /// Also write the result to a .json or .csv file
    #[arg(long, value_name = "PATH")]
    pub export: Option<PathBuf>,
}

impl ExportArgs {
    /// Writes `record` (JSON) or `rows` (CSV) when an export path was given.
    pub fn write<T: Serialize, R: Serialize>(&self, record: &T, rows: &[R]) -> Result<()> {
        if let Some(path) = &self.export {
            let written = export(record, rows, path)?;
            println!("Exported to {}", written.display());
        }
        Ok(())
    }
}

/// Writes `record` as pretty JSON or `rows` as CSV, chosen by the file
/// extension. Returns the written path.
pub fn export<T: Serialize, R: Serialize>(record: &T, rows: &[R], path: &Path) -> Result<PathBuf> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    match extension.as_deref() {
        Some("json") => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create export file: {}", path.display()))?;
            serde_json::to_writer_pretty(file, record)
                .with_context(|| format!("Failed to write JSON to {}", path.display()))?;
        }
        Some("csv") => {
            let mut writer = csv::Writer::from_path(path)
                .with_context(|| format!("Failed to create export file: {}", path.display()))?;
            for row in rows {
                writer
                    .serialize(row)
                    .with_context(|| format!("Failed to write CSV row to {}", path.display()))?;
            }
            writer.flush()?;
        }
        _ => bail!(
            "Unsupported export format for {}, use .json or .csv",
            path.display()
        ),
    }

    debug!("Exported {} rows to {}", rows.len(), path.display());
    Ok(path.to_path_buf())
}
