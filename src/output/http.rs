//! HTTP write endpoint sink.
//!
//! Lines are buffered and sent as the body of a single POST when the sink is
//! finished. There is no batching and no retry: any non-2xx answer is
//! reported as a delivery failure.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Url;

use super::LineSink;
use crate::error::{Error, Result};
use crate::timestamp::Precision;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Posts buffered lines to an InfluxDB write endpoint.
pub struct HttpSink {
    client: Client,
    url: Url,
    token: Option<String>,
    body: String,
    lines: usize,
}

impl HttpSink {
    /// Create a sink for `url`, e.g. `http://localhost:8086/write?db=mydb`.
    ///
    /// A `precision` query parameter is added when `precision` is not
    /// nanoseconds and the URL does not already carry one.
    pub fn new(url: &str, precision: Precision, timeout: Duration) -> Result<Self> {
        let url = write_url(url, precision)?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;

        Ok(Self {
            client,
            url,
            token: None,
            body: String::new(),
            lines: 0,
        })
    }

    /// Send `Authorization: Token <token>` with the request.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Number of lines waiting to be posted.
    pub fn pending_lines(&self) -> usize {
        self.lines
    }

    /// Post the buffered lines. An empty buffer posts nothing.
    pub fn post(&mut self) -> Result<()> {
        if self.lines == 0 {
            log::debug!("Nothing to post to {}", self.url);
            return Ok(());
        }

        let lines = std::mem::take(&mut self.lines);
        let body = std::mem::take(&mut self.body);

        let mut request = self
            .client
            .post(self.url.clone())
            .header(CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(body);
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Token {}", token));
        }

        let response = request.send().map_err(|e| Error::Http(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(Error::DeliveryFailure {
                status: status.as_u16(),
                body: body.trim().to_string(),
            });
        }

        log::info!("Wrote {} lines to {}", lines, self.url);
        Ok(())
    }
}

impl LineSink for HttpSink {
    fn write_line(&mut self, line: &str) -> Result<()> {
        self.body.push_str(line);
        self.body.push('\n');
        self.lines += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.post()
    }
}

/// Validate the endpoint URL and add the precision parameter if needed.
fn write_url(url: &str, precision: Precision) -> Result<Url> {
    let invalid = |message: String| Error::InvalidUrl {
        url: url.to_string(),
        message,
    };

    let mut parsed = Url::parse(url).map_err(|e| invalid(e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid(format!(
            "unsupported scheme '{}', use http or https",
            parsed.scheme()
        )));
    }

    let has_precision = parsed.query_pairs().any(|(key, _)| key == "precision");
    if precision != Precision::Nanoseconds && !has_precision {
        parsed
            .query_pairs_mut()
            .append_pair("precision", precision.as_str());
    }

    Ok(parsed)
}
