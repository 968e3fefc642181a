use std::collections::HashSet;

use crate::table::{Row, Table, Value, WINNER, YEAR};

/// Current values of the filter controls.
///
/// Both year bounds are inclusive. A winner matches only if it is present in
/// `countries`; missing winners never match.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterState {
    pub year_min: i64,
    pub year_max: i64,
    pub countries: HashSet<String>,
}

impl FilterState {
    /// Full year range and every distinct winner selected.
    ///
    /// A table without any year yields the range `0..=0`, which matches no row
    /// since rows without a year are never included.
    pub fn defaults(table: &Table) -> Self {
        let (year_min, year_max) = table.year_bounds().unwrap_or((0, 0));
        FilterState {
            year_min,
            year_max,
            countries: table.distinct_winners().into_iter().collect(),
        }
    }

    /// Fills controls the user has not touched with their defaults.
    ///
    /// `countries: None` means no explicit selection was made; `Some(vec![])`
    /// is an explicit empty selection.
    pub fn resolve(
        table: &Table,
        year_min: Option<i64>,
        year_max: Option<i64>,
        countries: Option<Vec<String>>,
    ) -> Self {
        let defaults = FilterState::defaults(table);
        FilterState {
            year_min: year_min.unwrap_or(defaults.year_min),
            year_max: year_max.unwrap_or(defaults.year_max),
            countries: countries.map_or(defaults.countries, |c| c.into_iter().collect()),
        }
    }

    fn admits(&self, row: &Row, year_col: usize, winner_col: usize) -> bool {
        let in_range = row[year_col]
            .as_number()
            .is_some_and(|y| y >= self.year_min as f64 && y <= self.year_max as f64);
        let selected = row[winner_col]
            .as_text()
            .is_some_and(|w| self.countries.contains(w));
        in_range && selected
    }
}

/// Rows of a [`Table`] currently matching the filter, in table order.
///
/// Borrows the table; it is rebuilt from scratch on every render.
#[derive(Clone, Debug)]
pub struct FilteredView<'a> {
    table: &'a Table,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    /// Every row of `table`, unfiltered.
    pub fn all(table: &'a Table) -> Self {
        FilteredView {
            table,
            indices: (0..table.len()).collect(),
        }
    }

    pub fn columns(&self) -> &'a [String] {
        self.table.columns()
    }

    pub fn rows(&self) -> impl Iterator<Item = &'a Row> + '_ {
        let table = self.table;
        self.indices.iter().map(move |&i| &table.rows()[i])
    }

    /// Positions of the included rows inside the source table.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Cells of one column across the view; empty if the column is absent.
    pub fn column(&self, name: &str) -> Vec<&'a Value> {
        match self.table.column_index(name) {
            Some(col) => self.rows().map(|row| &row[col]).collect(),
            None => Vec::new(),
        }
    }
}

/// Applies `state` to `table`. A table lacking a Year or Winner column yields
/// an empty view.
pub fn apply<'a>(table: &'a Table, state: &FilterState) -> FilteredView<'a> {
    let indices = match (table.column_index(YEAR), table.column_index(WINNER)) {
        (Some(year_col), Some(winner_col)) => table
            .rows()
            .iter()
            .enumerate()
            .filter(|(_, row)| state.admits(row, year_col, winner_col))
            .map(|(i, _)| i)
            .collect(),
        _ => Vec::new(),
    };
    FilteredView { table, indices }
}
