// Core types and errors for pdfsnip

// Pointer position in current-render pixel space
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct PixelPos {
    pub x: f32,
    pub y: f32,
}

impl PixelPos {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<(f32, f32)> for PixelPos {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

// Axis-aligned rectangle in current-render pixel space
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    // Bounding box of two corner points, any orientation
    pub fn from_corners(a: PixelPos, b: PixelPos) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            w: (b.x - a.x).abs(),
            h: (b.y - a.y).abs(),
        }
    }
}

// A committed region selection, tagged with the page it was drawn on
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SelectionRect {
    pub rect: Rect,
    pub page: u32,
}

// Error types
#[derive(Debug, thiserror::Error)]
pub enum SnipError {
    #[error("File is not a PDF")]
    InvalidSourceType,

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("Render failed: {0}")]
    RenderFailure(String),

    #[error("No PDF loaded")]
    NoFileLoaded,

    #[error("Nothing to extract: no rendered page and no selection")]
    NoRegion,

    #[error("Backend error: {0}")]
    BackendError(String),

    #[error("Connection error: {0} (is the extraction backend running?)")]
    TransportError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SnipError>;
