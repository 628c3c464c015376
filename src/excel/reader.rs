//! Spreadsheet reader - first worksheet of .xlsx/.ods → data rows

use crate::error::{TallyError, TallyResult};
use crate::types::{Cell, RawRow, Sheet, HEADER_ROWS, ROW_WIDTH};
use calamine::{open_workbook_auto, Data, Range, Reader};
use glob::{MatchOptions, Pattern};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Supported spreadsheet containers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    /// Office Open XML workbook
    Xlsx,
    /// OpenDocument spreadsheet
    Ods,
}

impl SheetFormat {
    pub const ALL: [SheetFormat; 2] = [SheetFormat::Ods, SheetFormat::Xlsx];

    /// Detect the format from the file extension (case-insensitive)
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "xlsx" => Some(SheetFormat::Xlsx),
            "ods" => Some(SheetFormat::Ods),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            SheetFormat::Xlsx => "xlsx",
            SheetFormat::Ods => "ods",
        }
    }
}

impl std::fmt::Display for SheetFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Find every `.ods` and `.xlsx` file directly inside `dir`, sorted by path
pub fn discover_files(dir: &Path) -> TallyResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(TallyError::Discovery(format!(
            "'{}' is not a directory",
            dir.display()
        )));
    }

    let base = dir.to_str().ok_or_else(|| {
        TallyError::Discovery(format!("'{}' is not valid UTF-8", dir.display()))
    })?;
    let options = MatchOptions {
        case_sensitive: false,
        ..MatchOptions::new()
    };

    let mut files = Vec::new();
    for format in SheetFormat::ALL {
        let pattern = Path::new(&Pattern::escape(base))
            .join(format!("*.{}", format.extension()))
            .to_string_lossy()
            .into_owned();
        let entries = glob::glob_with(&pattern, options)
            .map_err(|e| TallyError::Discovery(format!("Invalid pattern '{}': {}", pattern, e)))?;

        for entry in entries {
            match entry {
                Ok(path) if path.is_file() => files.push(path),
                Ok(_) => {}
                Err(e) => warn!("Skipping unreadable entry: {}", e),
            }
        }
    }

    files.sort();
    files.dedup();
    debug!("Discovered {} spreadsheet(s) in {}", files.len(), dir.display());
    Ok(files)
}

/// Reads the data rows of a workbook's first worksheet
pub struct SheetReader {
    path: PathBuf,
}

impl SheetReader {
    /// Create a new sheet reader
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn format(&self) -> TallyResult<SheetFormat> {
        SheetFormat::from_path(&self.path)
            .ok_or_else(|| TallyError::UnsupportedFormat(self.path.clone()))
    }

    /// Read the first worksheet, skipping the header row
    pub fn read(&self) -> TallyResult<Sheet> {
        let format = self.format()?;
        debug!("Opening {} as {}", self.path.display(), format);

        let mut workbook =
            open_workbook_auto(&self.path).map_err(|e| TallyError::workbook(&self.path, e))?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| TallyError::workbook(&self.path, "workbook has no worksheets"))?
            .map_err(|e| TallyError::workbook(&self.path, e))?;

        Ok(rows_from_range(&range))
    }
}

/// Data rows in absolute sheet coordinates. calamine trims leading empty rows
/// and columns from a range, so cells are looked up by absolute position to
/// keep row numbers aligned with what the user sees.
fn rows_from_range(range: &Range<Data>) -> Sheet {
    let Some((end_row, _)) = range.end() else {
        return Sheet::default();
    };

    let rows: Vec<RawRow> = (HEADER_ROWS as u32..=end_row)
        .map(|row| {
            (0..ROW_WIDTH as u32)
                .map(|col| range.get_value((row, col)).map_or(Cell::Empty, cell_from_data))
                .collect()
        })
        .collect();

    Sheet::new(rows)
}

/// Convert a calamine cell into a [`Cell`]
fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Int(i) => Cell::Int(*i),
        Data::Float(f) => Cell::Float(*f),
        Data::String(s) => Cell::Text(s.clone()),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map_or(Cell::Float(dt.as_f64()), Cell::DateTime),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => Cell::Text(e.to_string()),
        Data::Empty => Cell::Empty,
    }
}
