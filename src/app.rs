#![cfg(feature = "web")]

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use axum_extra::extract::Query;
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::dashboard::{self, Notice, SAVE_SUCCESS, UiState};
use crate::downloader::{self, CSV_FILENAME, CSV_MIME, XLSX_FILENAME, XLSX_MIME};
use crate::error::{DashboardError, Result};
use crate::filter::{self, FilterState};
use crate::loader::{Connector, fetch_table};
use crate::normalize::Normalizer;
use crate::saving::{EditedView, write_back};
use crate::table::Table;

pub const BIND_ADDRESS: &str = "127.0.0.1:3000";

pub struct AppState {
    connector: Arc<dyn Connector>,
}

/// Filter controls as they arrive in the query string.
///
/// `filtered` is set by the filter form; without it the country selection
/// falls back to every winner. `saved` is set by the page reloading itself
/// after a successful save.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct FilterParams {
    year_min: Option<i64>,
    year_max: Option<i64>,
    #[serde(default)]
    countries: Vec<String>,
    filtered: Option<String>,
    saved: Option<String>,
}

impl FilterParams {
    fn notice(&self) -> Option<Notice> {
        self.saved.as_ref().map(|_| Notice::saved())
    }

    fn resolve(self, table: &Table) -> FilterState {
        let countries = self.filtered.map(|_| self.countries);
        FilterState::resolve(table, self.year_min, self.year_max, countries)
    }
}

#[derive(Serialize)]
struct SaveResponse {
    status: String,
    message: Option<String>,
}

pub fn router(connector: Arc<dyn Connector>) -> Router {
    let app_state = Arc::new(AppState { connector });

    Router::new()
        .route("/", get(serve_dashboard))
        .route("/api/save", post(save_edits))
        .route("/download.csv", get(download_csv))
        .route("/download.xlsx", get(download_xlsx))
        .with_state(app_state)
}

pub async fn run(connector: Arc<dyn Connector>) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let app = router(connector);

    let listener = TcpListener::bind(BIND_ADDRESS).await?;
    info!("Listening on http://{}", BIND_ADDRESS);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Connects, fetches and normalizes the worksheet.
fn load(connector: &dyn Connector) -> Result<(Table, usize)> {
    let sheet = connector.connect()?;
    let mut table = fetch_table(sheet.as_ref())?;
    let warnings = Normalizer::default().apply(&mut table);
    Ok((table, warnings.len()))
}

fn dashboard_cycle(connector: &dyn Connector, params: FilterParams) -> Result<String> {
    let (table, coercion_warnings) = load(connector)?;
    let ui = UiState {
        notice: params.notice(),
        coercion_warnings,
    };
    let filter = params.resolve(&table);
    dashboard::to_html(&dashboard::render(&table, &filter, &ui))
}

/// Runs blocking remote work off the async executor.
async fn blocking<T, F>(work: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| DashboardError::Render(format!("worker task failed: {}", e)))?
}

fn status_for(err: &DashboardError) -> StatusCode {
    match err {
        DashboardError::Auth(_)
        | DashboardError::SheetAccess(_)
        | DashboardError::SheetWrite(_)
        | DashboardError::Timeout { .. } => StatusCode::BAD_GATEWAY,
        DashboardError::Export(_) | DashboardError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn serve_dashboard(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FilterParams>,
) -> Response {
    let connector = Arc::clone(&state.connector);

    match blocking(move || dashboard_cycle(connector.as_ref(), params)).await {
        Ok(page) => Html(page).into_response(),
        Err(e) => {
            error!("render cycle failed: {}", e);
            (status_for(&e), Html(dashboard::error_html(&e))).into_response()
        }
    }
}

async fn save_edits(
    State(state): State<Arc<AppState>>,
    Json(edited): Json<EditedView>,
) -> Response {
    let connector = Arc::clone(&state.connector);

    let outcome = blocking(move || {
        let sheet = connector.connect()?;
        write_back(sheet.as_ref(), &edited)
    })
    .await;

    match outcome {
        Ok(()) => Json(SaveResponse {
            status: "ok".to_string(),
            message: Some(SAVE_SUCCESS.to_string()),
        })
        .into_response(),
        Err(e) => {
            error!("write-back failed: {}", e);
            (
                status_for(&e),
                Json(SaveResponse {
                    status: "error".to_string(),
                    message: Some(e.to_string()),
                }),
            )
                .into_response()
        }
    }
}

/// Serializes the filtered view with `export` and offers it as an attachment.
async fn download(
    state: Arc<AppState>,
    params: FilterParams,
    export: fn(&filter::FilteredView<'_>) -> Result<Vec<u8>>,
    filename: &'static str,
    mime: &'static str,
) -> Response {
    let connector = Arc::clone(&state.connector);

    let outcome = blocking(move || {
        let (table, _) = load(connector.as_ref())?;
        let filter = params.resolve(&table);
        export(&filter::apply(&table, &filter))
    })
    .await;

    match outcome {
        Ok(bytes) => (
            [
                (header::CONTENT_TYPE, mime.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", filename),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(e) => {
            error!("export failed: {}", e);
            (
                status_for(&e),
                Json(SaveResponse {
                    status: "error".to_string(),
                    message: Some(e.to_string()),
                }),
            )
                .into_response()
        }
    }
}

async fn download_csv(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FilterParams>,
) -> Response {
    download(state, params, downloader::to_csv, CSV_FILENAME, CSV_MIME).await
}

async fn download_xlsx(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FilterParams>,
) -> Response {
    download(state, params, downloader::to_xlsx, XLSX_FILENAME, XLSX_MIME).await
}
