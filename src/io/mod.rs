pub mod csv;
pub mod excel;
pub mod json;

// Re-export commonly used functions
pub use self::csv::{read_csv, write_results_csv};
pub use self::excel::{read_excel, write_results};
pub use self::json::write_results_json;

/// Portable text normalization for spreadsheet content: non-ASCII
/// characters are dropped rather than failing the load.
pub(crate) fn normalize_ascii(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii()).collect()
}
