use std::fs;
use std::path::{Path, PathBuf};

use amortization_core::report::Workbook;

/// Write each sheet of the workbook to `<dir>/<stem>_<sheet>.csv`.
///
/// Returns the written paths in sheet order.
pub fn write_csv_sheets(
    book: &Workbook,
    dir: &Path,
    stem: &str,
) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    fs::create_dir_all(dir)
        .map_err(|e| format!("Failed to create '{}': {}", dir.display(), e))?;

    let mut written = Vec::with_capacity(book.sheets.len());
    for sheet in &book.sheets {
        let path = dir.join(format!("{}_{}.csv", stem, sheet.name));
        let mut wtr = csv::WriterBuilder::new()
            .flexible(true)
            .from_path(&path)
            .map_err(|e| format!("Failed to create '{}': {}", path.display(), e))?;

        for row in &sheet.rows {
            wtr.write_record(row.iter().map(|cell| cell.to_string()))?;
        }
        wtr.flush()?;

        tracing::debug!(sheet = %sheet.name, path = %path.display(), "wrote sheet");
        written.push(path);
    }
    Ok(written)
}
