//! JSON export of a result table.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use log::info;

use crate::error::Result;
use crate::table::ResultTable;

/// Export a result table as `{ "header": [...], "rows": [[...], ...] }`.
///
/// Numeric cells serialize as numbers and empty cells as null, so the
/// file round-trips without string parsing.
pub fn write_results_json<P: AsRef<Path>>(table: &ResultTable, path: P) -> Result<()> {
    let file = File::create(path.as_ref())?;
    serde_json::to_writer_pretty(BufWriter::new(file), table)?;
    info!("result table saved to {}", path.as_ref().display());
    Ok(())
}
