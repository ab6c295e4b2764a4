// HTTP client for the extraction backend
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::multipart::{Form, Part};
use tracing::{debug, warn};

use crate::types::{Rect, Result, SelectionRect, SnipError};

use super::protocol::ExtractionResult;

// Backend-supplied filenames are used as URL segments and on-disk names;
// anything outside this set is refused
static SAFE_FILENAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").unwrap());

/// The region actually transmitted: four scalars in render-pixel space,
/// the 1-based page, and the zoom factor the raster was produced at so
/// the backend can invert the scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionParams {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub page: u32,
    pub scale: f32,
}

impl RegionParams {
    /// Region selection rule: a committed selection for the current page
    /// is sent as drawn; otherwise the whole current raster is sent.
    pub fn resolve(
        selection: Option<SelectionRect>,
        current_page: u32,
        raster_bounds: (u32, u32),
        zoom: f32,
    ) -> Self {
        match selection.filter(|sel| sel.page == current_page) {
            Some(sel) => Self {
                x: sel.rect.x,
                y: sel.rect.y,
                w: sel.rect.w,
                h: sel.rect.h,
                page: sel.page,
                scale: zoom,
            },
            None => Self {
                x: 0.0,
                y: 0.0,
                w: raster_bounds.0 as f32,
                h: raster_bounds.1 as f32,
                page: current_page,
                scale: zoom,
            },
        }
    }

    pub fn rect(&self) -> Rect {
        Rect {
            x: self.x,
            y: self.y,
            w: self.w,
            h: self.h,
        }
    }
}

#[derive(Clone)]
pub struct ExtractionClient {
    base_url: String,
    http: reqwest::Client,
}

impl ExtractionClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn download_url(&self, filename: &str) -> String {
        format!("{}/download/{}", self.base_url, filename)
    }

    /// Submit a region of the given PDF for extraction. 2xx responses
    /// decode fail-soft; non-2xx surfaces the body verbatim; transport
    /// failures are reported separately so the user knows to start the
    /// backend instead of re-reading an error body.
    pub async fn submit(
        &self,
        file_name: &str,
        file_bytes: Vec<u8>,
        region: RegionParams,
    ) -> Result<ExtractionResult> {
        debug!(
            page = region.page,
            x = region.x,
            y = region.y,
            w = region.w,
            h = region.h,
            scale = region.scale,
            "submitting region"
        );

        let file_part = Part::bytes(file_bytes)
            .file_name(file_name.to_string())
            .mime_str("application/pdf")
            .map_err(|e| SnipError::TransportError(e.to_string()))?;

        let form = Form::new()
            .part("file", file_part)
            .text("x", region.x.to_string())
            .text("y", region.y.to_string())
            .text("w", region.w.to_string())
            .text("h", region.h.to_string())
            .text("page", region.page.to_string())
            .text("scale", region.scale.to_string());

        let response = self
            .http
            .post(format!("{}/extract_region", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            return Err(SnipError::BackendError(body));
        }

        match serde_json::from_str(&body) {
            Ok(value) => Ok(ExtractionResult::from_value(value)),
            Err(e) => {
                // Fail soft: a 2xx with an undecodable body is an empty
                // result, not a hard failure
                warn!(error = %e, "backend returned 2xx with non-JSON body");
                Ok(ExtractionResult::default())
            }
        }
    }

    /// Fetch a generated output file's bytes for client-side save.
    pub async fn download(&self, filename: &str) -> Result<Vec<u8>> {
        if !SAFE_FILENAME.is_match(filename) {
            return Err(SnipError::BackendError(format!(
                "refusing suspicious filename: {filename}"
            )));
        }

        let response = self
            .http
            .get(self.download_url(filename))
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SnipError::BackendError(body));
        }

        let bytes = response.bytes().await.map_err(transport_error)?;
        Ok(bytes.to_vec())
    }

    /// Reachability probe against the backend's health endpoint.
    pub async fn health(&self) -> Result<()> {
        let response = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .map_err(transport_error)?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(SnipError::BackendError(format!(
                "health check returned {}",
                response.status()
            )))
        }
    }
}

fn transport_error(e: reqwest::Error) -> SnipError {
    // Status-carrying errors are backend errors; everything else is the
    // wire (connection refused, DNS, timed out)
    match e.status() {
        Some(status) => SnipError::BackendError(format!("{status}: {e}")),
        None => SnipError::TransportError(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SelectionRect;

    #[test]
    fn committed_selection_is_sent_as_drawn() {
        let sel = SelectionRect {
            rect: Rect { x: 12.0, y: 34.0, w: 40.0, h: 30.0 },
            page: 3,
        };
        let params = RegionParams::resolve(Some(sel), 3, (400, 500), 0.5);
        assert_eq!(params.rect(), sel.rect);
        assert_eq!(params.page, 3);
        assert_eq!(params.scale, 0.5);
    }

    #[test]
    fn no_selection_falls_back_to_full_raster_bounds() {
        let params = RegionParams::resolve(None, 2, (400, 500), 1.0);
        assert_eq!(params.rect(), Rect { x: 0.0, y: 0.0, w: 400.0, h: 500.0 });
        assert_eq!(params.page, 2);
    }

    #[test]
    fn stale_selection_for_another_page_is_ignored() {
        let sel = SelectionRect {
            rect: Rect { x: 1.0, y: 1.0, w: 10.0, h: 10.0 },
            page: 1,
        };
        let params = RegionParams::resolve(Some(sel), 2, (300, 200), 0.5);
        assert_eq!(params.rect(), Rect { x: 0.0, y: 0.0, w: 300.0, h: 200.0 });
    }

    #[test]
    fn download_urls_target_the_named_file() {
        let client = ExtractionClient::new("http://localhost:5001/");
        assert_eq!(client.download_url("a.csv"), "http://localhost:5001/download/a.csv");
        assert_eq!(client.download_url("b.csv"), "http://localhost:5001/download/b.csv");
    }

    #[test]
    fn suspicious_filenames_are_refused() {
        assert!(SAFE_FILENAME.is_match("asset.csv"));
        assert!(SAFE_FILENAME.is_match("statement_type.csv"));
        assert!(!SAFE_FILENAME.is_match("../etc/passwd"));
        assert!(!SAFE_FILENAME.is_match(".hidden"));
        assert!(!SAFE_FILENAME.is_match("a/b.csv"));
        assert!(!SAFE_FILENAME.is_match(""));
    }
}
