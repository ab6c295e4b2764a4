// Configuration constants for pdfsnip
use std::env;
use std::path::PathBuf;

// Selection: drags smaller than this (either axis) are discarded
pub const MIN_SELECTION_PX: f32 = 5.0;

// Zoom stepping
pub const DEFAULT_ZOOM: f32 = 0.5;
pub const MIN_ZOOM: f32 = 0.25;
pub const MAX_ZOOM: f32 = 4.0;
pub const ZOOM_STEP: f32 = 0.25;

// Confidence tiers
pub const HIGH_CONFIDENCE: f64 = 0.90;
pub const MEDIUM_CONFIDENCE: f64 = 0.70;

// How many low-confidence fields / warnings the summary shows
pub const MAX_DETAIL_ENTRIES: usize = 5;

// pdftoppm resolution at zoom 1.0; raster dimensions scale with zoom
pub const BASE_RENDER_DPI: f32 = 72.0;

// Get extraction backend base URL from environment or use default
pub fn backend_url() -> String {
    env::var("PDFSNIP_BACKEND_URL")
        .unwrap_or_else(|_| "http://localhost:5001".to_string())
}

// Where downloaded CSV files land
pub fn output_dir() -> PathBuf {
    env::var("PDFSNIP_OUTPUT_DIR")
        .unwrap_or_else(|_| "./output".to_string())
        .into()
}
