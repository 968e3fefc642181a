use log::warn;

use crate::table::{ATTENDANCE, GOALS_SCORED, MATCHES_PLAYED, QUALIFIED_TEAMS, Table, Value, YEAR};

/// Turns the raw text of one cell into a number.
///
/// Returning `None` marks the cell missing; it never aborts the load.
pub trait CoercionStrategy: Send + Sync {
    fn coerce(&self, raw: &str) -> Option<f64>;
}

/// Plain decimal parse of the trimmed text. Only finite values are accepted.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainNumber;

impl CoercionStrategy for PlainNumber {
    fn coerce(&self, raw: &str) -> Option<f64> {
        raw.trim().parse::<f64>().ok().filter(|n| n.is_finite())
    }
}

/// Integers written with a digit grouping separator, e.g. `1.234.567`.
///
/// Every occurrence of the separator is removed before parsing, so the
/// separator can never act as a decimal point in this column.
#[derive(Clone, Copy, Debug)]
pub struct GroupedNumber {
    pub separator: char,
}

impl GroupedNumber {
    pub fn dotted() -> Self {
        GroupedNumber { separator: '.' }
    }
}

impl CoercionStrategy for GroupedNumber {
    fn coerce(&self, raw: &str) -> Option<f64> {
        let stripped: String = raw.chars().filter(|c| *c != self.separator).collect();
        PlainNumber.coerce(&stripped)
    }
}

/// A cell that could not be parsed and was recorded as missing.
#[derive(Clone, Debug, PartialEq)]
pub struct CoercionWarning {
    pub row: usize,
    pub column: String,
    pub raw: String,
}

struct ColumnRule {
    column: String,
    strategy: Box<dyn CoercionStrategy>,
}

/// Column-by-column numeric coercion.
pub struct Normalizer {
    rules: Vec<ColumnRule>,
}

impl Normalizer {
    pub fn new() -> Self {
        Normalizer { rules: Vec::new() }
    }

    pub fn with_rule(mut self, column: &str, strategy: impl CoercionStrategy + 'static) -> Self {
        self.rules.push(ColumnRule {
            column: column.to_string(),
            strategy: Box::new(strategy),
        });
        self
    }

    /// Rules for the World Cup sheet: dotted thousands in Attendance, plain
    /// numbers for the other statistics.
    pub fn world_cup() -> Self {
        Normalizer::new()
            .with_rule(ATTENDANCE, GroupedNumber::dotted())
            .with_rule(GOALS_SCORED, PlainNumber)
            .with_rule(MATCHES_PLAYED, PlainNumber)
            .with_rule(QUALIFIED_TEAMS, PlainNumber)
            .with_rule(YEAR, PlainNumber)
    }

    /// Coerces every ruled column present in `table`; absent columns are skipped.
    pub fn apply(&self, table: &mut Table) -> Vec<CoercionWarning> {
        let mut warnings = Vec::new();

        for rule in &self.rules {
            let Some(col) = table.column_index(&rule.column) else {
                continue;
            };
            for (index, row) in table.rows_mut().iter_mut().enumerate() {
                let parsed = match &row[col] {
                    Value::Text(raw) => rule.strategy.coerce(raw).ok_or_else(|| raw.clone()),
                    _ => continue,
                };
                row[col] = match parsed {
                    Ok(n) => Value::Number(n),
                    Err(raw) => {
                        warn!("row {}: cannot read {:?} in {} as a number", index, raw, rule.column);
                        warnings.push(CoercionWarning {
                            row: index,
                            column: rule.column.clone(),
                            raw,
                        });
                        Value::Missing
                    }
                };
            }
        }

        warnings
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Normalizer::world_cup()
    }
}
