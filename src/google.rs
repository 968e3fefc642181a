#![cfg(feature = "web")]

use std::path::PathBuf;

use log::info;
use reqwest::Url;
use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;

use crate::error::{DashboardError, Result, from_transport};
use crate::loader::{Connector, SPREADSHEET_NAME, Worksheet};
use crate::login::{self, Session};
use crate::secrets::{DEFAULT_SECRETS_PATH, SERVICE_ACCOUNT_SECRET, SecretStore};

const DRIVE_FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";
const SHEETS_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const SPREADSHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";

/// Base URLs of the Drive file search and the Sheets API.
#[derive(Clone, Debug)]
pub struct Endpoints {
    pub drive_files: String,
    pub sheets: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Endpoints {
            drive_files: DRIVE_FILES_URL.to_string(),
            sheets: SHEETS_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    #[serde(default)]
    sheet_id: i64,
    title: String,
    #[serde(default)]
    index: u32,
    #[serde(default)]
    grid_properties: GridProperties,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GridProperties {
    #[serde(default)]
    row_count: u32,
    #[serde(default)]
    column_count: u32,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

/// The first worksheet of a Google spreadsheet.
pub struct GoogleWorksheet {
    http: Client,
    token: String,
    sheets_url: String,
    spreadsheet_id: String,
    sheet_id: i64,
    title: String,
    row_count: u32,
    column_count: u32,
}

impl GoogleWorksheet {
    /// Opens the spreadsheet called `name` and selects its first worksheet.
    pub fn open(session: Session, name: &str) -> Result<Self> {
        GoogleWorksheet::open_with(session, name, &Endpoints::default())
    }

    pub fn open_with(session: Session, name: &str, endpoints: &Endpoints) -> Result<Self> {
        let Session { http, token } = session;

        let query = format!(
            "name = '{}' and mimeType = '{}' and trashed = false",
            name.replace('\'', "\\'"),
            SPREADSHEET_MIME
        );
        let resp = http
            .get(&endpoints.drive_files)
            .bearer_auth(&token)
            .query(&[
                ("q", query.as_str()),
                ("fields", "files(id)"),
                ("supportsAllDrives", "true"),
                ("includeItemsFromAllDrives", "true"),
            ])
            .send()
            .map_err(|e| from_transport(e, "spreadsheet lookup", DashboardError::SheetAccess))?;
        let spreadsheet_id = first_file(read_json(check_access(resp, name)?, name)?, name)?;

        let resp = http
            .get(format!("{}/{}", endpoints.sheets, spreadsheet_id))
            .bearer_auth(&token)
            .query(&[(
                "fields",
                "sheets.properties(sheetId,title,index,gridProperties(rowCount,columnCount))",
            )])
            .send()
            .map_err(|e| from_transport(e, "worksheet lookup", DashboardError::SheetAccess))?;
        let first = first_sheet(read_json(check_access(resp, name)?, name)?, name)?;

        info!(
            "opened spreadsheet {:?}, worksheet {:?} ({}x{})",
            name, first.title, first.grid_properties.row_count, first.grid_properties.column_count
        );
        Ok(GoogleWorksheet {
            http,
            token,
            sheets_url: endpoints.sheets.clone(),
            spreadsheet_id,
            sheet_id: first.sheet_id,
            title: first.title,
            row_count: first.grid_properties.row_count,
            column_count: first.grid_properties.column_count,
        })
    }

    /// A1 range covering the whole worksheet.
    fn range(&self) -> String {
        format!("'{}'", self.title.replace('\'', "''"))
    }

    fn values_url(&self, suffix: &str) -> Result<Url> {
        let target = format!("{}{}", self.range(), suffix);
        let mut url = Url::parse(&self.sheets_url)
            .map_err(|e| DashboardError::SheetAccess(format!("bad endpoint: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| DashboardError::SheetAccess("bad endpoint".to_string()))?
            .extend([self.spreadsheet_id.as_str(), "values", target.as_str()]);
        Ok(url)
    }

    /// Request growing the worksheet to hold `grid`, if it is too small.
    ///
    /// The worksheet is never shrunk.
    fn resize_request(&self, grid: &[Vec<String>]) -> Option<serde_json::Value> {
        let rows = grid.len() as u32;
        let columns = grid.iter().map(Vec::len).max().unwrap_or(0) as u32;
        if rows <= self.row_count && columns <= self.column_count {
            return None;
        }
        Some(json!({
            "requests": [{
                "updateSheetProperties": {
                    "properties": {
                        "sheetId": self.sheet_id,
                        "gridProperties": {
                            "rowCount": rows.max(self.row_count),
                            "columnCount": columns.max(self.column_count),
                        },
                    },
                    "fields": "gridProperties(rowCount,columnCount)",
                },
            }],
        }))
    }
}

impl Worksheet for GoogleWorksheet {
    fn read_all(&self) -> Result<Vec<Vec<String>>> {
        let resp = self
            .http
            .get(self.values_url("")?)
            .bearer_auth(&self.token)
            .query(&[("majorDimension", "ROWS")])
            .send()
            .map_err(|e| from_transport(e, "worksheet read", DashboardError::SheetAccess))?;
        let range: ValueRange = read_json(check_access(resp, &self.title)?, &self.title)?;

        Ok(range
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect())
    }

    /// Grows the worksheet when needed, clears it, then writes `grid` from A1.
    fn replace_all(&self, grid: &[Vec<String>]) -> Result<()> {
        if let Some(request) = self.resize_request(grid) {
            info!("growing worksheet {:?} to fit {} rows", self.title, grid.len());
            let resp = self
                .http
                .post(format!("{}/{}:batchUpdate", self.sheets_url, self.spreadsheet_id))
                .bearer_auth(&self.token)
                .json(&request)
                .send()
                .map_err(|e| from_transport(e, "worksheet resize", DashboardError::SheetWrite))?;
            check_write(resp)?;
        }

        let url = self.values_url(":clear").map_err(as_write_error)?;
        let resp = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .json(&json!({}))
            .send()
            .map_err(|e| from_transport(e, "worksheet clear", DashboardError::SheetWrite))?;
        check_write(resp)?;

        let url = self.values_url("").map_err(as_write_error)?;
        let resp = self
            .http
            .put(url)
            .bearer_auth(&self.token)
            .query(&[("valueInputOption", "USER_ENTERED")])
            .json(&json!({
                "range": self.range(),
                "majorDimension": "ROWS",
                "values": grid,
            }))
            .send()
            .map_err(|e| from_transport(e, "worksheet write", DashboardError::SheetWrite))?;
        check_write(resp)?;
        Ok(())
    }
}

/// Connects to the `WorldCups` spreadsheet with the credential in the secret store.
#[derive(Clone, Debug)]
pub struct GoogleConnector {
    secrets: PathBuf,
    spreadsheet: String,
}

impl GoogleConnector {
    pub fn new(secrets: impl Into<PathBuf>, spreadsheet: &str) -> Self {
        GoogleConnector {
            secrets: secrets.into(),
            spreadsheet: spreadsheet.to_string(),
        }
    }
}

impl Default for GoogleConnector {
    fn default() -> Self {
        GoogleConnector::new(DEFAULT_SECRETS_PATH, SPREADSHEET_NAME)
    }
}

impl Connector for GoogleConnector {
    fn connect(&self) -> Result<Box<dyn Worksheet>> {
        let store = SecretStore::load(&self.secrets)?;
        let key = store.service_account(SERVICE_ACCOUNT_SECRET)?;
        let session = login::authorize(&key)?;
        Ok(Box::new(GoogleWorksheet::open(session, &self.spreadsheet)?))
    }
}

fn first_file(list: FileList, name: &str) -> Result<String> {
    list.files
        .into_iter()
        .next()
        .map(|f| f.id)
        .ok_or_else(|| DashboardError::SheetAccess(format!("spreadsheet {:?} not found", name)))
}

/// Worksheet with the lowest index.
fn first_sheet(meta: SpreadsheetMeta, name: &str) -> Result<SheetProperties> {
    meta.sheets
        .into_iter()
        .map(|s| s.properties)
        .min_by_key(|p| p.index)
        .ok_or_else(|| DashboardError::SheetAccess(format!("spreadsheet {:?} has no worksheet", name)))
}

fn cell_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        serde_json::Value::Bool(true) => "TRUE".to_string(),
        serde_json::Value::Bool(false) => "FALSE".to_string(),
        other => other.to_string(),
    }
}

fn check_access(resp: Response, what: &str) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().unwrap_or_default();
    Err(DashboardError::SheetAccess(match status {
        StatusCode::NOT_FOUND => format!("{:?} not found", what),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => format!("permission denied for {:?}: {}", what, body),
        _ => format!("{:?}: HTTP {}: {}", what, status, body),
    }))
}

fn check_write(resp: Response) -> Result<()> {
    let status = resp.status();
    if status.is_success() {
        return Ok(());
    }
    let body = resp.text().unwrap_or_default();
    Err(DashboardError::SheetWrite(match status {
        StatusCode::UNAUTHORIZED => format!("stale session handle: {}", body),
        StatusCode::FORBIDDEN => format!("permission denied: {}", body),
        StatusCode::TOO_MANY_REQUESTS => format!("quota exceeded: {}", body),
        _ => format!("HTTP {}: {}", status, body),
    }))
}

fn read_json<T: serde::de::DeserializeOwned>(resp: Response, what: &str) -> Result<T> {
    resp.json()
        .map_err(|e| DashboardError::SheetAccess(format!("unreadable response for {:?}: {}", what, e)))
}

fn as_write_error(err: DashboardError) -> DashboardError {
    match err {
        DashboardError::SheetAccess(msg) => DashboardError::SheetWrite(msg),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::time::Duration;

    fn sheet(title: &str) -> GoogleWorksheet {
        GoogleWorksheet {
            http: Client::new(),
            token: "t".into(),
            sheets_url: SHEETS_BASE_URL.into(),
            spreadsheet_id: "abc123".into(),
            sheet_id: 7,
            title: title.into(),
            row_count: 21,
            column_count: 10,
        }
    }

    fn served_by(server: &MockServer) -> GoogleWorksheet {
        GoogleWorksheet {
            sheets_url: server.url("/v4/spreadsheets"),
            ..sheet("Sheet1")
        }
    }

    fn grid(rows: usize, columns: usize) -> Vec<Vec<String>> {
        (0..rows)
            .map(|r| (0..columns).map(|c| format!("{}-{}", r, c)).collect())
            .collect()
    }

    fn session() -> Session {
        Session {
            http: Client::new(),
            token: "t".into(),
        }
    }

    #[test]
    fn values_url_escapes_sheet_title() {
        let url = sheet("Sheet 1").values_url(":clear").unwrap();
        assert!(url.as_str().starts_with("https://sheets.googleapis.com/v4/spreadsheets/abc123/values/"));
        assert!(url.as_str().ends_with(":clear"));
        assert!(!url.as_str().contains(' '));
    }

    #[test]
    fn quotes_in_titles_are_doubled() {
        assert_eq!(sheet("Piala's").range(), "'Piala''s'");
    }

    #[test]
    fn non_string_cells_become_text() {
        assert_eq!(cell_text(json!(1930)), "1930");
        assert_eq!(cell_text(json!(null)), "");
        assert_eq!(cell_text(json!(true)), "TRUE");
        assert_eq!(cell_text(json!("Uruguay")), "Uruguay");
    }

    #[test]
    fn resize_only_when_grid_outgrows_sheet() {
        let ws = sheet("Sheet1");
        assert!(ws.resize_request(&grid(21, 10)).is_none());

        let request = ws.resize_request(&grid(23, 6)).unwrap();
        let props = &request["requests"][0]["updateSheetProperties"]["properties"];
        assert_eq!(props["sheetId"], 7);
        assert_eq!(props["gridProperties"]["rowCount"], 23);
        assert_eq!(props["gridProperties"]["columnCount"], 10);
    }

    #[test]
    fn open_picks_lowest_index_worksheet() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/drive/v3/files");
            then.status(200).json_body(json!({ "files": [{ "id": "wc" }] }));
        });
        server.mock(|when, then| {
            when.method(GET).path("/v4/spreadsheets/wc");
            then.status(200).json_body(json!({
                "sheets": [
                    { "properties": { "sheetId": 9, "title": "Notes", "index": 1 } },
                    { "properties": { "sheetId": 0, "title": "Data", "index": 0,
                        "gridProperties": { "rowCount": 21, "columnCount": 10 } } },
                ]
            }));
        });

        let endpoints = Endpoints {
            drive_files: server.url("/drive/v3/files"),
            sheets: server.url("/v4/spreadsheets"),
        };
        let ws = GoogleWorksheet::open_with(session(), SPREADSHEET_NAME, &endpoints).unwrap();
        assert_eq!(ws.title, "Data");
        assert_eq!(ws.sheet_id, 0);
        assert_eq!((ws.row_count, ws.column_count), (21, 10));
    }

    #[test]
    fn unknown_spreadsheet_is_not_found() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/drive/v3/files");
            then.status(200).json_body(json!({ "files": [] }));
        });

        let endpoints = Endpoints {
            drive_files: server.url("/drive/v3/files"),
            sheets: server.url("/v4/spreadsheets"),
        };
        let err = GoogleWorksheet::open_with(session(), "WorldCups", &endpoints)
            .err()
            .unwrap();
        assert!(matches!(&err, DashboardError::SheetAccess(msg) if msg.contains("not found")), "{err}");
    }

    #[test]
    fn read_errors_are_sheet_access() {
        for (status, fragment) in [(404, "not found"), (403, "permission denied"), (401, "permission denied")] {
            let server = MockServer::start();
            server.mock(|when, then| {
                when.method(GET).path_includes("/values/");
                then.status(status).body("denied");
            });

            let err = served_by(&server).read_all().unwrap_err();
            assert!(
                matches!(&err, DashboardError::SheetAccess(msg) if msg.contains(fragment)),
                "{status}: {err}"
            );
        }
    }

    #[test]
    fn write_errors_are_sheet_write() {
        for (status, fragment) in [(401, "stale session"), (403, "permission denied"), (429, "quota exceeded")] {
            let server = MockServer::start();
            server.mock(|when, then| {
                when.method(POST).path_includes(":clear");
                then.status(status).body("rejected");
            });

            let err = served_by(&server).replace_all(&grid(2, 2)).unwrap_err();
            assert!(
                matches!(&err, DashboardError::SheetWrite(msg) if msg.contains(fragment)),
                "{status}: {err}"
            );
        }
    }

    #[test]
    fn grows_sheet_before_clearing_and_writing() {
        let server = MockServer::start();
        let resize = server.mock(|when, then| {
            when.method(POST)
                .path("/v4/spreadsheets/abc123:batchUpdate")
                .header("authorization", "Bearer t")
                .body_includes("\"rowCount\":23");
            then.status(200).json_body(json!({}));
        });
        let clear = server.mock(|when, then| {
            when.method(POST).path_includes(":clear");
            then.status(200).json_body(json!({}));
        });
        let write = server.mock(|when, then| {
            when.method(PUT)
                .path_includes("/values/")
                .query_param("valueInputOption", "USER_ENTERED");
            then.status(200).json_body(json!({}));
        });

        served_by(&server).replace_all(&grid(23, 6)).unwrap();

        resize.assert_calls(1);
        clear.assert_calls(1);
        write.assert_calls(1);
    }

    #[test]
    fn failed_resize_leaves_sheet_untouched() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path_includes(":batchUpdate");
            then.status(403).body("no edit rights");
        });
        let clear = server.mock(|when, then| {
            when.method(POST).path_includes(":clear");
            then.status(200).json_body(json!({}));
        });

        let err = served_by(&server).replace_all(&grid(23, 6)).unwrap_err();
        assert!(matches!(err, DashboardError::SheetWrite(_)));
        clear.assert_calls(0);
    }

    #[test]
    fn slow_sheet_times_out() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path_includes("/values/");
            then.status(200)
                .delay(Duration::from_secs(2))
                .json_body(json!({ "values": [] }));
        });

        let ws = GoogleWorksheet {
            http: Client::builder().timeout(Duration::from_millis(200)).build().unwrap(),
            ..served_by(&server)
        };
        match ws.read_all().unwrap_err() {
            DashboardError::Timeout { operation, seconds } => {
                assert_eq!(operation, "worksheet read");
                assert_eq!(seconds, crate::error::REMOTE_TIMEOUT_SECS);
            }
            other => panic!("expected timeout, got {other}"),
        }
    }
}
