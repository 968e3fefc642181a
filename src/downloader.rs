use crate::error::{DashboardError, Result};
use crate::filter::FilteredView;
#[cfg(feature = "web")]
use crate::table::Value;

/// File name offered for the CSV download.
pub const CSV_FILENAME: &str = "data_piala_dunia.csv";
pub const CSV_MIME: &str = "text/csv";

#[cfg(feature = "web")]
pub const XLSX_FILENAME: &str = "data_piala_dunia.xlsx";
#[cfg(feature = "web")]
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Convert the filtered view to CSV format
///
/// Writes a header row with the table's column names followed by one record per
/// row of the view. Numbers are written without a trailing `.0` when integral and
/// missing cells are written as empty fields. Quoting is left to the `csv` crate.
///
/// # Arguments
/// * `view` - The rows to export
///
/// # Returns
/// * `Result<Vec<u8>>` - UTF-8 CSV bytes or an export error
///
/// # Examples
/// ```
/// use worldcup_dashboard::downloader::to_csv;
/// use worldcup_dashboard::filter::FilteredView;
/// use worldcup_dashboard::table::{Table, Value};
///
/// let table = Table::new(
///     vec!["Year".into(), "Winner".into()],
///     vec![vec![Value::Number(1930.0), Value::Text("Uruguay".into())]],
/// );
/// let csv = to_csv(&FilteredView::all(&table)).unwrap();
/// assert_eq!(String::from_utf8(csv).unwrap(), "Year,Winner\n1930,Uruguay\n");
/// ```
pub fn to_csv(view: &FilteredView<'_>) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(view.columns())
        .map_err(|e| DashboardError::Export(e.to_string()))?;

    for row in view.rows() {
        writer
            .write_record(row.iter().map(|cell| cell.display()))
            .map_err(|e| DashboardError::Export(e.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|e| DashboardError::Export(e.to_string()))
}

/// Convert the filtered view to XLSX format
///
/// Exports the same rows as [`to_csv`] into a single worksheet using the
/// rust_xlsxwriter library. Numeric cells are written as numbers, text as
/// strings, and missing cells are left empty.
///
/// # Arguments
/// * `view` - The rows to export
///
/// # Returns
/// * `Result<Vec<u8>>` - XLSX file content as bytes or an export error
#[cfg(feature = "web")]
pub fn to_xlsx(view: &FilteredView<'_>) -> Result<Vec<u8>> {
    use rust_xlsxwriter::{Workbook, Worksheet};

    let export = |e: rust_xlsxwriter::XlsxError| DashboardError::Export(e.to_string());

    let mut workbook = Workbook::new();
    let mut worksheet = Worksheet::new();

    for (c, name) in view.columns().iter().enumerate() {
        worksheet.write_string(0, c as u16, name.as_str()).map_err(export)?;
    }

    for (r, row) in view.rows().enumerate() {
        let r = (r + 1) as u32;
        for (c, cell) in row.iter().enumerate() {
            let c = c as u16;
            match cell {
                Value::Number(n) => {
                    worksheet.write_number(r, c, *n).map_err(export)?;
                }
                Value::Text(s) => {
                    worksheet.write_string(r, c, s.as_str()).map_err(export)?;
                }
                Value::Missing => {}
            }
        }
    }

    workbook.push_worksheet(worksheet);
    workbook.save_to_buffer().map_err(export)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{FilterState, apply};
    use crate::normalize::Normalizer;
    use crate::table::{Table, Value};

    fn loaded() -> Table {
        let grid = [
            vec!["Year", "Country", "Winner", "GoalsScored", "Attendance"],
            vec!["1930", "Uruguay", "Uruguay", "70", "590.549"],
            vec!["1934", "Italy", "Italy", "70", "363.000"],
            vec!["1938", "France", "Italy", "84", ""],
            vec!["1950", "Brazil", "Uruguay", "88", "1.045.246"],
        ];
        let mut table = Table::from_grid(
            grid.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        );
        Normalizer::default().apply(&mut table);
        table
    }

    #[test]
    fn csv_round_trips_filtered_rows() {
        let table = loaded();
        let mut state = FilterState::defaults(&table);
        state.year_max = 1938;
        let view = apply(&table, &state);

        let bytes = to_csv(&view).unwrap();
        let mut reader = csv::Reader::from_reader(bytes.as_slice());

        let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(headers, view.columns());

        let records: Vec<Vec<String>> = reader
            .records()
            .map(|r| r.unwrap().iter().map(String::from).collect())
            .collect();
        assert_eq!(records.len(), view.len());

        for (record, row) in records.iter().zip(view.rows()) {
            for (field, cell) in record.iter().zip(row) {
                match cell {
                    Value::Number(n) => assert_eq!(field.parse::<f64>().unwrap(), *n),
                    Value::Text(s) => assert_eq!(field, s),
                    Value::Missing => assert!(field.is_empty()),
                }
            }
        }
        assert_eq!(records[2][4], "");
    }

    #[test]
    fn csv_quotes_fields_with_commas() {
        let table = Table::new(
            vec!["Winner".into()],
            vec![vec![Value::Text("Korea, Republic of".into())]],
        );
        let bytes = to_csv(&FilteredView::all(&table)).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "Winner\n\"Korea, Republic of\"\n");
    }

    #[test]
    fn csv_of_empty_view_is_header_only() {
        let table = loaded();
        let state = FilterState::resolve(&table, None, None, Some(Vec::new()));
        let bytes = to_csv(&apply(&table, &state)).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "Year,Country,Winner,GoalsScored,Attendance\n"
        );
    }
}
