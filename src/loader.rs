use std::sync::{Arc, Mutex, PoisonError};

use log::info;

use crate::error::{DashboardError, Result};
use crate::table::Table;

/// Name of the spreadsheet the dashboard reads and writes.
pub const SPREADSHEET_NAME: &str = "WorldCups";

/// The first worksheet of the remote spreadsheet, as a grid of cell text.
///
/// Row 0 is the header. Rows may be shorter than the header when trailing
/// cells are blank.
pub trait Worksheet {
    fn read_all(&self) -> Result<Vec<Vec<String>>>;

    /// Replaces the whole worksheet with `grid`. Nothing outside `grid` survives.
    fn replace_all(&self, grid: &[Vec<String>]) -> Result<()>;
}

/// Obtains an authorized handle on the worksheet for one render cycle.
pub trait Connector: Send + Sync {
    fn connect(&self) -> Result<Box<dyn Worksheet>>;
}

/// Load the worksheet into a table
///
/// Reads every cell of the worksheet and builds a [`Table`] from it. Fully
/// empty rows are dropped; numeric coercion is left to the normalizer.
///
/// # Arguments
/// * `sheet` - The worksheet to read
///
/// # Returns
/// * `Result<Table>` - The snapshot, or the worksheet's access error
pub fn fetch_table(sheet: &dyn Worksheet) -> Result<Table> {
    let grid = sheet.read_all()?;
    let table = Table::from_grid(grid);
    info!(
        "fetched {} rows x {} columns from worksheet",
        table.len(),
        table.columns().len()
    );
    Ok(table)
}

/// Worksheet held in process memory.
///
/// Clones share the same cells, so a clone handed out by [`Connector::connect`]
/// writes through to the original.
#[derive(Clone, Debug, Default)]
pub struct MemoryWorksheet {
    grid: Arc<Mutex<Vec<Vec<String>>>>,
}

impl MemoryWorksheet {
    pub fn new(grid: Vec<Vec<String>>) -> Self {
        MemoryWorksheet {
            grid: Arc::new(Mutex::new(grid)),
        }
    }

    /// Builds a worksheet from string slices, header first.
    pub fn from_rows(rows: &[&[&str]]) -> Self {
        MemoryWorksheet::new(
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    /// Current contents.
    pub fn snapshot(&self) -> Vec<Vec<String>> {
        self.grid.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Worksheet for MemoryWorksheet {
    fn read_all(&self) -> Result<Vec<Vec<String>>> {
        Ok(self.snapshot())
    }

    fn replace_all(&self, grid: &[Vec<String>]) -> Result<()> {
        let mut cells = self
            .grid
            .lock()
            .map_err(|_| DashboardError::SheetWrite("worksheet lock poisoned".to_string()))?;
        *cells = grid.to_vec();
        Ok(())
    }
}

impl Connector for MemoryWorksheet {
    fn connect(&self) -> Result<Box<dyn Worksheet>> {
        Ok(Box::new(self.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Value, WINNER};

    #[test]
    fn fetch_drops_empty_rows() {
        let sheet = MemoryWorksheet::from_rows(&[
            &["Year", "Winner"],
            &["1930", "Uruguay"],
            &["", ""],
            &["1934", "Italy"],
        ]);
        let table = fetch_table(&sheet).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.value(1, WINNER), Some(&Value::Text("Italy".into())));
    }

    #[test]
    fn connected_handles_share_cells() {
        let sheet = MemoryWorksheet::from_rows(&[&["Year"], &["1930"]]);
        let handle = sheet.connect().unwrap();
        handle.replace_all(&[vec!["Year".to_string()]]).unwrap();
        assert_eq!(sheet.snapshot(), vec![vec!["Year".to_string()]]);
    }
}
