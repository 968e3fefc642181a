use serde::Serialize;

use crate::aggregate::{self, WinnerCount};
use crate::filter::{self, FilterState};
use crate::graph::{self, LINE_CHARTS, LineChartSpec, MapRegion};
use crate::saving::EditedView;
use crate::table::Table;

#[cfg(feature = "web")]
use crate::error::{DashboardError, Result};
#[cfg(feature = "web")]
use crate::downloader::{CSV_FILENAME, XLSX_FILENAME};
#[cfg(feature = "web")]
use crate::graph::GraphOptions;
#[cfg(feature = "web")]
use log::warn;

pub const PAGE_TITLE: &str = "Dashboard Interaktif Piala Dunia FIFA";
pub const SAVE_SUCCESS: &str = "Data berhasil diperbarui di Google Sheets!";

/// Confirmation shown above the grid after a completed action.
///
/// Failures of save and download are shown in place by the page itself, so
/// the edits in the grid survive them.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Notice {
    pub message: String,
}

impl Notice {
    /// The page reloaded after a successful write-back.
    pub fn saved() -> Self {
        Notice {
            message: SAVE_SUCCESS.to_string(),
        }
    }
}

/// Per-session state that lives outside the render function.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UiState {
    pub notice: Option<Notice>,
    /// Cells the normalizer could not read during this cycle.
    pub coercion_warnings: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CountryOption {
    pub name: String,
    pub selected: bool,
}

/// Metric strings as displayed.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Metrics {
    pub mean_goals: String,
    pub max_attendance: String,
    pub max_matches: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Series {
    pub spec: LineChartSpec,
    pub points: Vec<(f64, f64)>,
}

/// Everything one render cycle shows, computed without side effects.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderedOutput {
    pub year_bounds: Option<(i64, i64)>,
    pub filter: FilterState,
    pub country_options: Vec<CountryOption>,
    pub metrics: Metrics,
    pub grid: EditedView,
    pub series: Vec<Series>,
    pub winner_counts: Vec<WinnerCount>,
    pub map_regions: Vec<MapRegion>,
    pub unmatched_countries: Vec<String>,
    pub ui: UiState,
}

/// Renders the dashboard model for the current table and control values.
pub fn render(table: &Table, filter: &FilterState, ui: &UiState) -> RenderedOutput {
    let view = filter::apply(table, filter);
    let summary = aggregate::summarize(&view);
    let winner_counts = aggregate::winner_counts(&view);
    let (map_regions, unmatched_countries) = graph::map_regions(&winner_counts);

    let country_options = table
        .distinct_winners()
        .into_iter()
        .map(|name| CountryOption {
            selected: filter.countries.contains(&name),
            name,
        })
        .collect();

    RenderedOutput {
        year_bounds: table.year_bounds(),
        filter: filter.clone(),
        country_options,
        metrics: Metrics {
            mean_goals: format_mean(summary.mean_goals),
            max_attendance: format_grouped(summary.max_attendance),
            max_matches: format_grouped(summary.max_matches),
        },
        grid: EditedView::from_view(&view),
        series: LINE_CHARTS
            .iter()
            .map(|spec| Series {
                spec: *spec,
                points: graph::line_series(&view, spec.column),
            })
            .collect(),
        winner_counts,
        map_regions,
        unmatched_countries,
        ui: ui.clone(),
    }
}

const NOT_A_NUMBER: &str = "NaN";

/// Two decimals, `NaN` when there is nothing to average.
pub fn format_mean(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => NOT_A_NUMBER.to_string(),
    }
}

/// Rounded to an integer with `,` between thousands, `NaN` when absent.
///
/// ```
/// use worldcup_dashboard::dashboard::format_grouped;
///
/// assert_eq!(format_grouped(Some(1234567.0)), "1,234,567");
/// assert_eq!(format_grouped(None), "NaN");
/// ```
pub fn format_grouped(value: Option<f64>) -> String {
    let Some(v) = value else {
        return NOT_A_NUMBER.to_string();
    };
    let digits = format!("{:.0}", v.abs());
    let mut out = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if v < 0.0 && digits != "0" {
        out.insert(0, '-');
    }
    out
}

#[cfg(feature = "web")]
const DASHBOARD_TEMPLATE: &str = include_str!("./static/dashboard.hbs");
#[cfg(feature = "web")]
const ERROR_TEMPLATE: &str = include_str!("./static/error.hbs");

#[cfg(feature = "web")]
fn templates() -> Result<handlebars::Handlebars<'static>> {
    let mut hb = handlebars::Handlebars::new();
    hb.register_template_string("dashboard", DASHBOARD_TEMPLATE)
        .map_err(|e| DashboardError::Render(e.to_string()))?;
    hb.register_template_string("error", ERROR_TEMPLATE)
        .map_err(|e| DashboardError::Render(e.to_string()))?;
    Ok(hb)
}

/// Chart markup, or a notice in its place when drawing failed.
#[cfg(feature = "web")]
fn chart_or_notice(name: &str, drawn: std::result::Result<String, Box<dyn std::error::Error>>) -> String {
    match drawn {
        Ok(svg) => svg,
        Err(e) => {
            warn!("chart {:?} could not be drawn: {}", name, e);
            format!("<p class=\"chart-error\">Grafik tidak dapat ditampilkan: {}</p>", html_escape(&e.to_string()))
        }
    }
}

#[cfg(feature = "web")]
fn html_escape(text: &str) -> String {
    handlebars::html_escape(text)
}

/// Query string reproducing the filter, used by the download links.
#[cfg(feature = "web")]
pub fn filter_query(filter: &FilterState) -> String {
    let mut countries: Vec<&String> = filter.countries.iter().collect();
    countries.sort();
    let mut query = format!("year_min={}&year_max={}&filtered=1", filter.year_min, filter.year_max);
    for country in countries {
        query.push_str("&countries=");
        query.push_str(&urlencoding::encode(country));
    }
    query
}

/// Renders the full dashboard page.
#[cfg(feature = "web")]
pub fn to_html(output: &RenderedOutput) -> Result<String> {
    let charts: Vec<serde_json::Value> = output
        .series
        .iter()
        .map(|series| {
            let options = GraphOptions {
                title: series.spec.title.to_string(),
                x_label: "Year".to_string(),
                y_label: series.spec.column.to_string(),
                ..GraphOptions::default()
            };
            serde_json::json!({
                "heading": series.spec.heading,
                "points": series.points.len(),
                "svg": chart_or_notice(
                    series.spec.title,
                    graph::line_chart_svg(&series.points, series.spec.color, &options),
                ),
            })
        })
        .collect();

    let bar_options = GraphOptions {
        title: "Jumlah Kemenangan per Negara".to_string(),
        x_label: "Wins".to_string(),
        y_label: "Country".to_string(),
        ..GraphOptions::default()
    };
    let map_options = GraphOptions {
        title: "Peta Kemenangan Piala Dunia".to_string(),
        x_label: "Longitude".to_string(),
        y_label: "Latitude".to_string(),
        height: 450,
        ..GraphOptions::default()
    };

    let (year_lo, year_hi) = output
        .year_bounds
        .unwrap_or((output.filter.year_min, output.filter.year_max));

    let data = serde_json::json!({
        "title": PAGE_TITLE,
        "notice": output.ui.notice,
        "coercion_warnings": output.ui.coercion_warnings,
        "year_lo": year_lo,
        "year_hi": year_hi,
        "year_min": output.filter.year_min,
        "year_max": output.filter.year_max,
        "countries": output.country_options,
        "metrics": output.metrics,
        "grid": output.grid,
        "charts": charts,
        "bar_svg": chart_or_notice("wins", graph::bar_chart_svg(&output.winner_counts, &bar_options)),
        "map_svg": chart_or_notice("map", graph::choropleth_svg(&output.map_regions, &map_options)),
        "unmatched": output.unmatched_countries,
        "download_query": filter_query(&output.filter),
        "csv_filename": CSV_FILENAME,
        "xlsx_filename": XLSX_FILENAME,
    });

    templates()?
        .render("dashboard", &data)
        .map_err(|e| DashboardError::Render(e.to_string()))
}

/// Page shown instead of the dashboard when the render cycle cannot complete.
#[cfg(feature = "web")]
pub fn error_html(err: &DashboardError) -> String {
    let data = serde_json::json!({ "title": PAGE_TITLE, "message": err.to_string() });
    templates()
        .and_then(|hb| {
            hb.render("error", &data)
                .map_err(|e| DashboardError::Render(e.to_string()))
        })
        .unwrap_or_else(|_| format!("<h1>{}</h1><p>{}</p>", PAGE_TITLE, html_escape(&err.to_string())))
}
