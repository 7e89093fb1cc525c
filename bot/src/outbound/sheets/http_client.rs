//! Reqwest-backed Sheets v4 adapter.
//!
//! This adapter owns transport details only: URL construction, bearer
//! authentication, timeout and HTTP error mapping, and JSON decoding into
//! string rows.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::debug;

use super::dto::{ValueRangeBody, ValueRangeDto};
use crate::domain::ports::{
    SheetAddress, SheetReadError, SheetReader, SheetRows, SheetWrite, SheetWriteError, SheetWriter,
};

const DEFAULT_USER_AGENT: &str = "battalion-bot/0.1";

/// Endpoint and credentials for the values API.
#[derive(Debug, Clone)]
pub struct SheetsHttpConfig {
    /// API root; `v4/spreadsheets/...` is appended.
    pub api_base: Url,
    /// OAuth access token sent as a bearer token.
    pub access_token: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

/// Sheets adapter performing one HTTP request per read or write.
pub struct SheetsHttpClient {
    client: Client,
    api_base: Url,
    access_token: String,
}

impl SheetsHttpClient {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    /// ```rust,ignore
    /// let client = SheetsHttpClient::new(SheetsHttpConfig {
    ///     api_base: settings.sheets_api_base()?,
    ///     access_token: token,
    ///     timeout: settings.http_timeout(),
    /// })?;
    /// ```
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(config: SheetsHttpConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(DEFAULT_USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            api_base: config.api_base,
            access_token: config.access_token,
        })
    }

    fn values_url(&self, address: &SheetAddress) -> Result<Url, String> {
        values_url(&self.api_base, address)
    }
}

#[async_trait]
impl SheetReader for SheetsHttpClient {
    async fn read_range(&self, address: &SheetAddress) -> Result<SheetRows, SheetReadError> {
        let url = self
            .values_url(address)
            .map_err(SheetReadError::rejected)?;
        let response = self
            .client
            .get(url)
            .bearer_auth(self.access_token.as_str())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_read_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_read_transport_error)?;
        if !status.is_success() {
            return Err(map_read_status(status, body.as_ref()));
        }

        let decoded: ValueRangeDto = serde_json::from_slice(body.as_ref()).map_err(|error| {
            SheetReadError::decode(format!("invalid values payload: {error}"))
        })?;
        let rows = decoded.into_rows();
        debug!(address = %address, rows = rows.len(), "sheet range read");
        Ok(rows)
    }
}

#[async_trait]
impl SheetWriter for SheetsHttpClient {
    async fn write_range(&self, write: &SheetWrite) -> Result<(), SheetWriteError> {
        let mut url = self
            .values_url(&write.address)
            .map_err(SheetWriteError::rejected)?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", write.mode.as_str());
        let body = ValueRangeBody {
            range: write.address.range(),
            major_dimension: "ROWS",
            values: &write.values,
        };

        let response = self
            .client
            .put(url)
            .bearer_auth(self.access_token.as_str())
            .json(&body)
            .send()
            .await
            .map_err(map_write_transport_error)?;

        let status = response.status();
        if status.is_success() {
            debug!(address = %write.address, rows = write.values.len(), "sheet range written");
            return Ok(());
        }
        let body = response.bytes().await.map_err(map_write_transport_error)?;
        Err(map_write_status(status, body.as_ref()))
    }
}

fn values_url(api_base: &Url, address: &SheetAddress) -> Result<Url, String> {
    let mut url = api_base.clone();
    url.path_segments_mut()
        .map_err(|()| format!("api base {api_base} cannot carry a path"))?
        .pop_if_empty()
        .extend([
            "v4",
            "spreadsheets",
            address.source_id(),
            "values",
            address.range(),
        ]);
    Ok(url)
}

fn map_read_transport_error(error: reqwest::Error) -> SheetReadError {
    if error.is_timeout() {
        SheetReadError::timeout(error.to_string())
    } else {
        SheetReadError::transport(error.to_string())
    }
}

fn map_write_transport_error(error: reqwest::Error) -> SheetWriteError {
    if error.is_timeout() {
        SheetWriteError::timeout(error.to_string())
    } else {
        SheetWriteError::transport(error.to_string())
    }
}

fn map_read_status(status: StatusCode, body: &[u8]) -> SheetReadError {
    let message = status_message(status, body);
    match status {
        StatusCode::TOO_MANY_REQUESTS => SheetReadError::rate_limited(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            SheetReadError::timeout(message)
        }
        _ if status.is_client_error() => SheetReadError::rejected(message),
        _ => SheetReadError::transport(message),
    }
}

// No rate-limited variant on the write side; a throttled write is a
// transport failure the submitter can retry.
fn map_write_status(status: StatusCode, body: &[u8]) -> SheetWriteError {
    let message = status_message(status, body);
    match status {
        StatusCode::TOO_MANY_REQUESTS => SheetWriteError::transport(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            SheetWriteError::timeout(message)
        }
        _ if status.is_client_error() => SheetWriteError::rejected(message),
        _ => SheetWriteError::transport(message),
    }
}

fn status_message(status: StatusCode, body: &[u8]) -> String {
    let preview = body_preview(body);
    if preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {preview}", status.as_u16())
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
