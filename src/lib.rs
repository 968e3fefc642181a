/*!
# World Cup Dashboard

A browser-based dashboard over the FIFA World Cup statistics kept in a shared
Google spreadsheet, built in Rust.

## Overview

Each page view runs one render cycle from scratch: authenticate with a
service-account credential, fetch the `WorldCups` spreadsheet, coerce the
statistics columns to numbers, apply the year/winner filter, aggregate, and
render tables, metrics and charts. Edits made in the grid can be written back
to the spreadsheet, and the filtered rows can be downloaded as CSV or XLSX.

## Architecture

### Frontend Layer
- **Technologies**: HTML, CSS, a little JavaScript, inline SVG
- **Key Components**:
  - Filter sidebar - year range and winner multi-select, plus the metrics
  - Editable grid - cell edits, row insert/delete, save button
  - Charts - four time series, wins per country, wins map

### Backend Layer
- **Technologies**: Rust, axum, plotters, handlebars
- **Core Components**:
  - Credential Loader - secret store and token exchange
  - Sheet Fetcher - open-by-name and read of the first worksheet
  - Type Normalizer - pluggable per-column numeric coercion
  - Filter Engine and Aggregator - pure functions over the loaded table
  - Write-Back Handler - destructive replace of the worksheet
  - Export Handler - CSV and XLSX downloads

### Data Persistence Layer
- None of its own. The remote spreadsheet is the single source of truth and
  the last writer wins.

## Modules

- **table**: cell values and the loaded table
- **normalize**: numeric coercion strategies
- **filter**: filter state and filtered view
- **aggregate**: summary metrics and winner counts
- **secrets**: secret store and service-account document
- **loader**: worksheet abstraction and fetch
- **saving**: edited grid and write-back
- **downloader**: CSV/XLSX export
- **gazetteer**: country names and centroids for the map
- **graph**: chart series and SVG rendering
- **dashboard**: the render function and HTML pages
- **login**, **google**, **app**: token exchange, Google client, routing (feature `web`)

## REST API Endpoints

- `/` - Dashboard, filtered by `year_min`, `year_max`, `countries`
- `/api/save` - Replaces the worksheet with the posted grid
- `/download.csv`, `/download.xlsx` - Filtered rows as a file
*/

pub mod aggregate;
pub mod dashboard;
pub mod downloader;
pub mod error;
pub mod filter;
pub mod gazetteer;
pub mod graph;
pub mod loader;
pub mod normalize;
pub mod saving;
pub mod secrets;
pub mod table;

#[cfg(feature = "web")]
pub mod app;
#[cfg(feature = "web")]
pub mod google;
#[cfg(feature = "web")]
pub mod login;

pub use error::{DashboardError, Result};
