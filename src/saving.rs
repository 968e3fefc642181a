use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::filter::FilteredView;
use crate::loader::Worksheet;

/// Contents of the editable grid at the moment the user asks to save.
///
/// May differ from the view it was built from in row count and cell values.
/// Cells are kept as the text the user typed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EditedView {
    pub columns: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<String>>,
}

impl EditedView {
    /// Grid snapshot of a filtered view, as first shown to the user.
    pub fn from_view(view: &FilteredView<'_>) -> Self {
        EditedView {
            columns: view.columns().to_vec(),
            rows: view
                .rows()
                .map(|row| row.iter().map(|cell| cell.display()).collect())
                .collect(),
        }
    }

    /// Header followed by the rows, each row padded or cut to the header width.
    pub fn to_grid(&self) -> Vec<Vec<String>> {
        let width = self.columns.len();
        std::iter::once(self.columns.clone())
            .chain(self.rows.iter().map(|row| {
                let mut row = row.clone();
                row.resize(width, String::new());
                row
            }))
            .collect()
    }
}

/// Overwrite the remote worksheet with the edited grid
///
/// This is a destructive replace, not a merge: rows hidden by the active filter
/// and columns missing from `edited` are gone from the worksheet afterwards.
/// No revision check is made, so the last writer wins when two users save.
///
/// # Arguments
/// * `sheet` - Worksheet handle obtained for this action
/// * `edited` - Current grid contents
///
/// # Returns
/// * `Result<()>` - `SheetWrite` or `Timeout` when the worksheet rejects the write
pub fn write_back(sheet: &dyn Worksheet, edited: &EditedView) -> Result<()> {
    warn!(
        "replacing worksheet contents with {} rows; rows outside the current filter are discarded",
        edited.rows.len()
    );
    sheet.replace_all(&edited.to_grid())?;
    info!("worksheet now holds {} data rows", edited.rows.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{FilterState, apply};
    use crate::loader::{MemoryWorksheet, fetch_table};
    use crate::normalize::Normalizer;

    fn remote() -> MemoryWorksheet {
        MemoryWorksheet::from_rows(&[
            &["Year", "Winner", "GoalsScored", "Attendance"],
            &["1930", "Uruguay", "70", "590.549"],
            &["1934", "Italy", "70", "363.000"],
            &["1938", "Italy", "84", "375.700"],
        ])
    }

    #[test]
    fn saving_a_filtered_grid_drops_hidden_rows() {
        let sheet = remote();
        let mut table = fetch_table(&sheet).unwrap();
        Normalizer::default().apply(&mut table);

        let state = FilterState::resolve(&table, None, None, Some(vec!["Italy".into()]));
        let edited = EditedView::from_view(&apply(&table, &state));
        write_back(&sheet, &edited).unwrap();

        let stored = sheet.snapshot();
        assert_eq!(stored.len(), 3);
        assert!(stored.iter().all(|row| row[1] != "Uruguay"));
        // normalized attendance is written back without grouping separators
        assert_eq!(stored[1], vec!["1934", "Italy", "70", "363000"]);
    }

    #[test]
    fn removing_a_row_in_the_grid_removes_it_remotely() {
        let sheet = remote();
        let table = fetch_table(&sheet).unwrap();
        let mut edited = EditedView::from_view(&FilteredView::all(&table));
        edited.rows.remove(1);
        edited.rows[0][2] = "71".to_string();

        write_back(&sheet, &edited).unwrap();

        let reloaded = fetch_table(&sheet).unwrap();
        assert_eq!(reloaded.len(), 2);
        assert_eq!(sheet.snapshot()[1][2], "71");
        assert!(sheet.snapshot().iter().all(|row| row[0] != "1934"));
    }

    #[test]
    fn inserted_rows_are_padded_to_header_width() {
        let edited = EditedView {
            columns: vec!["Year".into(), "Winner".into()],
            rows: vec![vec!["2022".into()], vec!["2018".into(), "France".into(), "extra".into()]],
        };
        assert_eq!(
            edited.to_grid(),
            vec![
                vec!["Year".to_string(), "Winner".to_string()],
                vec!["2022".to_string(), String::new()],
                vec!["2018".to_string(), "France".to_string()],
            ]
        );
    }
}
