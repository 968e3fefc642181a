use crate::filter::FilteredView;
use crate::table::{ATTENDANCE, GOALS_SCORED, MATCHES_PLAYED, WINNER};

/// Scalar metrics shown next to the filter controls. `None` when the view
/// holds no usable value for the column.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Summary {
    pub mean_goals: Option<f64>,
    pub max_attendance: Option<f64>,
    pub max_matches: Option<f64>,
}

/// One bar of the wins chart.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct WinnerCount {
    pub country: String,
    pub wins: usize,
}

/// Mean of the numeric cells of `column`, ignoring missing ones.
pub fn mean(view: &FilteredView<'_>, column: &str) -> Option<f64> {
    let values: Vec<f64> = view.column(column).into_iter().filter_map(|v| v.as_number()).collect();
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

pub fn max(view: &FilteredView<'_>, column: &str) -> Option<f64> {
    view.column(column)
        .into_iter()
        .filter_map(|v| v.as_number())
        .fold(None, |acc: Option<f64>, n| Some(acc.map_or(n, |m| m.max(n))))
}

pub fn summarize(view: &FilteredView<'_>) -> Summary {
    Summary {
        mean_goals: mean(view, GOALS_SCORED),
        max_attendance: max(view, ATTENDANCE),
        max_matches: max(view, MATCHES_PLAYED),
    }
}

/// Rows per winner, most wins first. Ties keep the order in which the
/// countries first appear in the view.
pub fn winner_counts(view: &FilteredView<'_>) -> Vec<WinnerCount> {
    let mut counts: Vec<WinnerCount> = Vec::new();
    for value in view.column(WINNER) {
        let Some(name) = value.as_text() else {
            continue;
        };
        match counts.iter_mut().find(|c| c.country == name) {
            Some(entry) => entry.wins += 1,
            None => counts.push(WinnerCount {
                country: name.to_string(),
                wins: 1,
            }),
        }
    }
    // stable sort
    counts.sort_by(|a, b| b.wins.cmp(&a.wins));
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{FilterState, apply};
    use crate::normalize::Normalizer;
    use crate::table::Table;

    fn table(rows: &[&[&str]]) -> Table {
        let mut grid = vec![
            ["Year", "Winner", "GoalsScored", "MatchesPlayed", "QualifiedTeams", "Attendance"]
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>(),
        ];
        grid.extend(rows.iter().map(|r| r.iter().map(|s| s.to_string()).collect()));
        let mut table = Table::from_grid(grid);
        Normalizer::default().apply(&mut table);
        table
    }

    #[test]
    fn two_edition_scenario() {
        let table = table(&[
            &["1930", "Uruguay", "70", "18", "13", "590549"],
            &["1934", "Italy", "70", "17", "16", "363000"],
        ]);
        let state = FilterState::resolve(
            &table,
            Some(1930),
            Some(1934),
            Some(vec!["Uruguay".into(), "Italy".into()]),
        );
        let view = apply(&table, &state);
        assert_eq!(view.len(), 2);

        let summary = summarize(&view);
        assert_eq!(format!("{:.2}", summary.mean_goals.unwrap()), "70.00");
        assert_eq!(summary.max_attendance, Some(590549.0));
        assert_eq!(summary.max_matches, Some(18.0));

        let counts = winner_counts(&view);
        assert_eq!(
            counts,
            vec![
                WinnerCount { country: "Uruguay".into(), wins: 1 },
                WinnerCount { country: "Italy".into(), wins: 1 },
            ]
        );
    }

    #[test]
    fn counts_sorted_by_wins_and_sum_to_view_size() {
        let table = table(&[
            &["1930", "Uruguay", "70", "18", "13", "590.549"],
            &["1934", "Italy", "70", "17", "16", "363.000"],
            &["1938", "Italy", "84", "18", "15", "375.700"],
            &["1950", "Uruguay", "88", "22", "13", "1.045.246"],
            &["1954", "Germany FR", "140", "26", "16", "768.607"],
            &["1958", "Brazil", "126", "35", "16", "819.810"],
            &["1962", "Brazil", "89", "32", "16", "893.172"],
            &["1966", "", "89", "32", "16", "1.563.135"],
        ]);
        let view = apply(&table, &FilterState::defaults(&table));
        let counts = winner_counts(&view);

        let order: Vec<(&str, usize)> = counts.iter().map(|c| (c.country.as_str(), c.wins)).collect();
        assert_eq!(order, vec![("Uruguay", 2), ("Italy", 2), ("Brazil", 2), ("Germany FR", 1)]);
        assert_eq!(counts.iter().map(|c| c.wins).sum::<usize>(), view.len());
        assert_eq!(max(&view, ATTENDANCE), Some(1045246.0));
    }

    #[test]
    fn mean_ignores_missing_values() {
        let table = table(&[
            &["1930", "Uruguay", "70", "18", "13", "1"],
            &["1934", "Italy", "", "17", "16", "2"],
            &["1938", "Italy", "80", "18", "15", "3"],
        ]);
        let view = apply(&table, &FilterState::defaults(&table));
        assert_eq!(mean(&view, GOALS_SCORED), Some(75.0));
    }

    #[test]
    fn empty_view_has_no_metrics() {
        let table = table(&[&["1930", "Uruguay", "70", "18", "13", "590549"]]);
        let state = FilterState::resolve(&table, None, None, Some(Vec::new()));
        let view = apply(&table, &state);

        assert_eq!(summarize(&view), Summary::default());
        assert!(winner_counts(&view).is_empty());
    }
}
