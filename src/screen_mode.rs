// Screen mode management for pdfsnip

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenMode {
    Viewer,   // Page image + activity log
    Preview,  // Full screen extracted-record preview
}

impl ScreenMode {
    pub fn next(self) -> Self {
        match self {
            ScreenMode::Viewer => ScreenMode::Preview,
            ScreenMode::Preview => ScreenMode::Viewer,
        }
    }
}
