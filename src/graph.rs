use crate::aggregate::WinnerCount;
use crate::filter::FilteredView;
use crate::gazetteer::{self, Country};
use crate::table::{ATTENDANCE, GOALS_SCORED, MATCHES_PLAYED, QUALIFIED_TEAMS, YEAR};

#[cfg(feature = "web")]
use plotters::prelude::*;
#[cfg(feature = "web")]
use std::error::Error;
#[cfg(feature = "web")]
use std::ops::Range;

/// One of the time-series charts drawn against Year.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineChartSpec {
    /// Section heading above the chart
    pub heading: &'static str,

    /// Title drawn inside the chart
    pub title: &'static str,

    /// Column plotted on the Y axis
    pub column: &'static str,

    /// Fixed series color as RGB
    pub color: (u8, u8, u8),
}

/// The four statistics charts, in display order.
pub const LINE_CHARTS: [LineChartSpec; 4] = [
    LineChartSpec {
        heading: "Jumlah Gol",
        title: "Jumlah Gol dari Waktu ke Waktu",
        column: GOALS_SCORED,
        color: (0, 0, 255),
    },
    LineChartSpec {
        heading: "Jumlah Pertandingan",
        title: "Jumlah Pertandingan",
        column: MATCHES_PLAYED,
        color: (255, 165, 0),
    },
    LineChartSpec {
        heading: "Jumlah Tim Lolos",
        title: "Jumlah Tim yang Lolos",
        column: QUALIFIED_TEAMS,
        color: (0, 128, 0),
    },
    LineChartSpec {
        heading: "Jumlah Penonton",
        title: "Jumlah Penonton",
        column: ATTENDANCE,
        color: (255, 0, 0),
    },
];

/// (Year, value) points of `column` in view order
///
/// Rows where either the year or the value is missing contribute no point.
///
/// # Arguments
/// * `view` - Filtered rows
/// * `column` - Column plotted on the Y axis
///
/// # Returns
/// * `Vec<(f64, f64)>` - One point per usable row; empty for an empty view
pub fn line_series(view: &FilteredView<'_>, column: &str) -> Vec<(f64, f64)> {
    let years = view.column(YEAR);
    let values = view.column(column);
    years
        .iter()
        .zip(values.iter())
        .filter_map(|(y, v)| Some((y.as_number()?, v.as_number()?)))
        .collect()
}

/// A country shaded on the map.
#[derive(Clone, Debug, PartialEq)]
pub struct MapRegion {
    pub country: &'static Country,
    pub wins: usize,
}

/// Matches winner counts against the gazetteer
///
/// # Returns
/// * `(Vec<MapRegion>, Vec<String>)` - Matched regions, and the names no
///   gazetteer entry matched (drawn without fill)
pub fn map_regions(counts: &[WinnerCount]) -> (Vec<MapRegion>, Vec<String>) {
    let mut matched = Vec::new();
    let mut unmatched = Vec::new();
    for count in counts {
        match gazetteer::lookup(&count.country) {
            Some(country) => matched.push(MapRegion {
                country,
                wins: count.wins,
            }),
            None => unmatched.push(count.country.clone()),
        }
    }
    (matched, unmatched)
}

const VIRIDIS: [(u8, u8, u8); 5] = [
    (68, 1, 84),
    (59, 82, 139),
    (33, 145, 140),
    (94, 201, 98),
    (253, 231, 37),
];

/// Viridis color for `t` in `0.0..=1.0` (clamped), linearly interpolated.
pub fn viridis(t: f64) -> (u8, u8, u8) {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let scaled = t * (VIRIDIS.len() - 1) as f64;
    let lower = (scaled.floor() as usize).min(VIRIDIS.len() - 2);
    let frac = scaled - lower as f64;
    let (a, b) = (VIRIDIS[lower], VIRIDIS[lower + 1]);
    let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * frac).round() as u8;
    (mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

/// Configuration options for chart generation
///
/// This structure contains the customizable properties shared by all charts.
#[cfg(feature = "web")]
#[derive(Clone, Debug)]
pub struct GraphOptions {
    /// Title displayed at the top of the chart
    pub title: String,

    /// Label for the X-axis
    pub x_label: String,

    /// Label for the Y-axis
    pub y_label: String,

    /// Width of the chart in pixels
    pub width: u32,

    /// Height of the chart in pixels
    pub height: u32,
}

#[cfg(feature = "web")]
impl Default for GraphOptions {
    /// Creates a default configuration for chart generation
    ///
    /// # Returns
    /// * `GraphOptions` - 800x400 pixel chart with generic labels
    fn default() -> Self {
        Self {
            title: "Graph".to_string(),
            x_label: "X Axis".to_string(),
            y_label: "Y Axis".to_string(),
            width: 800,
            height: 400,
        }
    }
}

/// Axis ranges enclosing every point with a little headroom.
#[cfg(feature = "web")]
fn padded_ranges(points: &[(f64, f64)]) -> (Range<f64>, Range<f64>) {
    if points.is_empty() {
        return (0.0..1.0, 0.0..1.0);
    }
    let span = |values: Vec<f64>| {
        let lo = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let hi = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let pad = if hi > lo { (hi - lo) * 0.05 } else { 1.0 };
        (lo - pad)..(hi + pad)
    };
    (
        span(points.iter().map(|p| p.0).collect()),
        span(points.iter().map(|p| p.1).collect()),
    )
}

/// Creates a line chart with point markers as an SVG document
///
/// # Arguments
/// * `points` - (Year, value) pairs, drawn in the given order
/// * `color` - Series color as RGB
/// * `options` - Chart styling options
///
/// # Returns
/// * A Result containing the SVG markup or an error
///
/// # Implementation Notes
/// * An empty series still draws the axes so the page layout stays stable
#[cfg(feature = "web")]
pub fn line_chart_svg(
    points: &[(f64, f64)],
    color: (u8, u8, u8),
    options: &GraphOptions,
) -> Result<String, Box<dyn Error>> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (options.width, options.height))
            .into_drawing_area();
        root.fill(&WHITE)?;

        let (x_range, y_range) = padded_ranges(points);

        let mut chart = ChartBuilder::on(&root)
            .caption(&options.title, ("sans-serif", 22).into_font())
            .margin(10)
            .x_label_area_size(30)
            .y_label_area_size(70)
            .build_cartesian_2d(x_range, y_range)?;

        chart
            .configure_mesh()
            .x_desc(&options.x_label)
            .y_desc(&options.y_label)
            .x_label_formatter(&|x| format!("{:.0}", x))
            .y_label_formatter(&|y| format!("{:.0}", y))
            .draw()?;

        let stroke = RGBColor(color.0, color.1, color.2);
        chart.draw_series(LineSeries::new(points.iter().copied(), stroke.stroke_width(2)))?;
        chart.draw_series(points.iter().map(|&p| Circle::new(p, 4, stroke.filled())))?;

        root.present()?;
    }
    Ok(svg)
}

/// Creates a horizontal bar chart of wins per country
///
/// Generates one bar per country, the first entry at the bottom, each bar in
/// its own palette color.
///
/// # Arguments
/// * `counts` - Winner counts, already sorted
/// * `options` - Chart styling options
///
/// # Returns
/// * A Result containing the SVG markup or an error
#[cfg(feature = "web")]
pub fn bar_chart_svg(counts: &[WinnerCount], options: &GraphOptions) -> Result<String, Box<dyn Error>> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (options.width, options.height))
            .into_drawing_area();
        root.fill(&WHITE)?;

        let max_wins = counts.iter().map(|c| c.wins).max().unwrap_or(0) as f64;
        let bars = counts.len().max(1);
        let labels: Vec<&str> = counts.iter().map(|c| c.country.as_str()).collect();

        let mut chart = ChartBuilder::on(&root)
            .caption(&options.title, ("sans-serif", 22).into_font())
            .margin(10)
            .x_label_area_size(30)
            .y_label_area_size(120)
            .build_cartesian_2d(0.0..max_wins + 1.0, -0.5..bars as f64 - 0.5)?;

        chart
            .configure_mesh()
            .disable_y_mesh()
            .y_labels(bars)
            .y_label_formatter(&|y| label_at(&labels, *y))
            .x_label_formatter(&|x| format!("{:.0}", x))
            .x_desc(&options.x_label)
            .y_desc(&options.y_label)
            .draw()?;

        chart.draw_series(counts.iter().enumerate().map(|(i, c)| {
            let y = i as f64;
            Rectangle::new([(0.0, y - 0.4), (c.wins as f64, y + 0.4)], Palette99::pick(i).filled())
        }))?;

        root.present()?;
    }
    Ok(svg)
}

#[cfg(feature = "web")]
fn label_at(labels: &[&str], y: f64) -> String {
    let index = y.round();
    if (y - index).abs() > 0.01 || index < 0.0 {
        return String::new();
    }
    labels.get(index as usize).map(|s| s.to_string()).unwrap_or_default()
}

/// Creates the wins map as an SVG document
///
/// Countries are placed on an equirectangular longitude/latitude grid at their
/// gazetteer centroid and drawn as filled tiles on a Viridis scale from the
/// fewest to the most wins. Names without a gazetteer entry are never passed in.
///
/// # Arguments
/// * `regions` - Matched countries with their win counts
/// * `options` - Chart styling options
///
/// # Returns
/// * A Result containing the SVG markup or an error
#[cfg(feature = "web")]
pub fn choropleth_svg(regions: &[MapRegion], options: &GraphOptions) -> Result<String, Box<dyn Error>> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (options.width, options.height))
            .into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(&options.title, ("sans-serif", 22).into_font())
            .margin(10)
            .x_label_area_size(30)
            .y_label_area_size(40)
            .build_cartesian_2d(-180.0..180.0, -60.0..85.0)?;

        chart
            .configure_mesh()
            .x_desc(&options.x_label)
            .y_desc(&options.y_label)
            .draw()?;

        let lo = regions.iter().map(|r| r.wins).min().unwrap_or(0) as f64;
        let hi = regions.iter().map(|r| r.wins).max().unwrap_or(0) as f64;
        let shade = |wins: usize| {
            let t = if hi > lo { (wins as f64 - lo) / (hi - lo) } else { 1.0 };
            let (r, g, b) = viridis(t);
            RGBColor(r, g, b)
        };

        chart.draw_series(regions.iter().map(|region| {
            let (lon, lat) = (region.country.lon, region.country.lat);
            Rectangle::new([(lon - 6.0, lat - 4.0), (lon + 6.0, lat + 4.0)], shade(region.wins).filled())
        }))?;

        chart.draw_series(regions.iter().map(|region| {
            Text::new(
                format!("{} ({})", region.country.iso3, region.wins),
                (region.country.lon - 6.0, region.country.lat + 8.0),
                ("sans-serif", 11).into_font(),
            )
        }))?;

        root.present()?;
    }
    Ok(svg)
}
