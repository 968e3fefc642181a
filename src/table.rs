pub const YEAR: &str = "Year";
pub const WINNER: &str = "Winner";
pub const GOALS_SCORED: &str = "GoalsScored";
pub const MATCHES_PLAYED: &str = "MatchesPlayed";
pub const QUALIFIED_TEAMS: &str = "QualifiedTeams";
pub const ATTENDANCE: &str = "Attendance";

/// A single cell after loading.
///
/// Freshly fetched cells are either `Text` or `Missing`; the normalizer turns
/// the numeric columns into `Number` or `Missing`.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
    Missing,
}

impl Value {
    /// Builds a cell from raw sheet text. Empty strings are missing.
    pub fn from_raw(raw: &str) -> Self {
        if raw.is_empty() {
            Value::Missing
        } else {
            Value::Text(raw.to_string())
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// Text form used by the grid, the CSV export and write-back.
    pub fn display(&self) -> String {
        match self {
            Value::Number(n) => format_number(*n),
            Value::Text(s) => s.clone(),
            Value::Missing => String::new(),
        }
    }
}

/// Integral values print without a fractional part (`1930`, not `1930.0`).
///
/// ```
/// use worldcup_dashboard::table::format_number;
///
/// assert_eq!(format_number(1930.0), "1930");
/// assert_eq!(format_number(2.5), "2.5");
/// ```
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

pub type Row = Vec<Value>;

/// In-memory snapshot of the worksheet, valid for one render cycle.
///
/// Every row holds exactly `columns.len()` cells.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Value::Missing);
                row
            })
            .collect();
        Table { columns, rows }
    }

    /// Builds a table from a raw worksheet grid whose first row is the header.
    ///
    /// Short rows are padded with missing cells, blank header cells are named
    /// `Unnamed: <index>`, and rows with no value at all are dropped.
    pub fn from_grid(grid: Vec<Vec<String>>) -> Self {
        let mut lines = grid.into_iter();
        let header = match lines.next() {
            Some(header) => header,
            None => return Table::default(),
        };
        let body: Vec<Vec<String>> = lines.collect();

        let width = body
            .iter()
            .map(|row| row.len())
            .chain(std::iter::once(header.len()))
            .max()
            .unwrap_or(0);

        let columns = (0..width)
            .map(|i| match header.get(i) {
                Some(name) if !name.trim().is_empty() => name.clone(),
                _ => format!("Unnamed: {}", i),
            })
            .collect();

        let rows = body
            .iter()
            .map(|line| {
                (0..width)
                    .map(|i| line.get(i).map_or(Value::Missing, |raw| Value::from_raw(raw)))
                    .collect::<Row>()
            })
            .filter(|row| !row.iter().all(Value::is_missing))
            .collect();

        Table { columns, rows }
    }

    /// Header followed by every row in display form.
    pub fn to_grid(&self) -> Vec<Vec<String>> {
        std::iter::once(self.columns.clone())
            .chain(
                self.rows
                    .iter()
                    .map(|row| row.iter().map(Value::display).collect()),
            )
            .collect()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [Row] {
        &mut self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let col = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Observed `(min, max)` of the Year column, ignoring missing years.
    pub fn year_bounds(&self) -> Option<(i64, i64)> {
        let col = self.column_index(YEAR)?;
        let years = self.rows.iter().filter_map(|r| r[col].as_number());
        years.fold(None, |acc, y| match acc {
            None => Some((y, y)),
            Some((lo, hi)) => Some((lo.min(y), hi.max(y))),
        })
        .map(|(lo, hi)| (lo as i64, hi as i64))
    }

    /// Distinct non-missing winners in order of first appearance.
    pub fn distinct_winners(&self) -> Vec<String> {
        let Some(col) = self.column_index(WINNER) else {
            return Vec::new();
        };
        let mut seen = Vec::new();
        for row in &self.rows {
            if let Some(name) = row[col].as_text() {
                if !seen.iter().any(|s: &String| s == name) {
                    seen.push(name.to_string());
                }
            }
        }
        seen
    }
}
