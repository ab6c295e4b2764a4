// Page rasterization and render scheduling
use std::path::Path;
use std::process::Command;

use image::DynamicImage;

use crate::config::BASE_RENDER_DPI;
use crate::types::{Result, SnipError};

/// A completed render of one page at one zoom level. Region coordinates
/// and the full-page fallback are expressed against these dimensions.
pub struct RasterPage {
    pub page: u32,
    pub width: u32,
    pub height: u32,
    pub image: DynamicImage,
}

/// The external rasterizer contract: given a PDF on disk, produce a
/// raster of one page whose dimensions are proportional to `zoom`.
pub trait PageRenderer: Send + Sync + 'static {
    fn render_page(&self, pdf_path: &Path, page: u32, zoom: f32) -> Result<RasterPage>;
}

/// Rasterizes through poppler's pdftoppm into a temp dir, then reads
/// the PNG back. Resolution scales linearly with the zoom factor.
pub struct PopplerRenderer;

impl PageRenderer for PopplerRenderer {
    fn render_page(&self, pdf_path: &Path, page: u32, zoom: f32) -> Result<RasterPage> {
        let dpi = ((BASE_RENDER_DPI * zoom).round() as u32).max(1);
        let dir = tempfile::tempdir()?;
        let prefix = dir.path().join("page");

        let output = Command::new("pdftoppm")
            .args([
                "-png",
                "-f", &page.to_string(),
                "-l", &page.to_string(),
                "-r", &dpi.to_string(),
            ])
            .arg(pdf_path)
            .arg(&prefix)
            .output()
            .map_err(|e| SnipError::RenderFailure(format!("pdftoppm: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SnipError::RenderFailure(format!(
                "pdftoppm exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        // pdftoppm pads the page number in the output name; with a single
        // page requested there is exactly one PNG in the dir
        let png_path = std::fs::read_dir(dir.path())?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .find(|p| p.extension().is_some_and(|ext| ext == "png"))
            .ok_or_else(|| SnipError::RenderFailure(format!("no raster produced for page {page}")))?;

        let image = image::open(&png_path)
            .map_err(|e| SnipError::RenderFailure(e.to_string()))?;

        Ok(RasterPage {
            page,
            width: image.width(),
            height: image.height(),
            image,
        })
    }
}

// Scheduler state: at most one render in flight, at most one pending
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    Idle,
    Rendering(u32),
}

/// Serializes renders against a one-at-a-time rasterizer and coalesces
/// bursts of page requests to "latest wins". The session drives the
/// actual rasterization; this machine only decides what runs when.
#[derive(Debug)]
pub struct RenderScheduler {
    state: RenderState,
    pending: Option<u32>,
}

impl Default for RenderScheduler {
    fn default() -> Self {
        Self {
            state: RenderState::Idle,
            pending: None,
        }
    }
}

impl RenderScheduler {
    /// Ask to display `page`. Returns Some(page) when the caller should
    /// start rendering it now; otherwise it is queued, overwriting any
    /// previously queued page.
    pub fn request(&mut self, page: u32) -> Option<u32> {
        match self.state {
            RenderState::Idle => {
                self.state = RenderState::Rendering(page);
                Some(page)
            }
            RenderState::Rendering(_) => {
                self.pending = Some(page);
                None
            }
        }
    }

    /// The in-flight render finished. Returns Some(next) when a pending
    /// request exists; the caller starts it immediately (no Idle visit).
    pub fn complete(&mut self) -> Option<u32> {
        match self.pending.take() {
            Some(next) => {
                self.state = RenderState::Rendering(next);
                Some(next)
            }
            None => {
                self.state = RenderState::Idle;
                None
            }
        }
    }

    /// The in-flight render failed: back to idle, pending dropped.
    /// No automatic retry.
    pub fn fail(&mut self) {
        self.state = RenderState::Idle;
        self.pending = None;
    }

    pub fn is_rendering(&self) -> bool {
        matches!(self.state, RenderState::Rendering(_))
    }

    pub fn in_flight(&self) -> Option<u32> {
        match self.state {
            RenderState::Rendering(page) => Some(page),
            RenderState::Idle => None,
        }
    }
}
