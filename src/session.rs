// Session context: owns the document/viewport/selection/result state and
// drives the async render and extraction operations
use std::path::Path;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config;
use crate::document::SourceDocument;
use crate::extraction::client::{ExtractionClient, RegionParams};
use crate::extraction::confidence::ConfidenceSummary;
use crate::extraction::protocol::ExtractionResult;
use crate::presenter::ActivityLog;
use crate::render::{PageRenderer, RasterPage, RenderScheduler};
use crate::selection::SelectionTracker;
use crate::types::{PixelPos, Rect, Result, SnipError};
use crate::viewport::ViewportState;

type RenderHandle = JoinHandle<Result<RasterPage>>;
type ExtractHandle = JoinHandle<Result<ExtractionResult>>;

/// The single owner of mutable session state. All mutation happens on
/// the event-processing thread; overlapping async work is serialized
/// through the scheduler state and the extract handle, not locks.
pub struct Session {
    renderer: Arc<dyn PageRenderer>,
    client: ExtractionClient,
    document: Option<SourceDocument>,
    pub viewport: ViewportState,
    selection: SelectionTracker,
    scheduler: RenderScheduler,
    displayed: Option<RasterPage>,
    live_rect: Option<Rect>,
    last_result: Option<ExtractionResult>,
    pub log: ActivityLog,
    render_task: Option<RenderHandle>,
    extract_task: Option<ExtractHandle>,
}

impl Session {
    pub fn new(renderer: Arc<dyn PageRenderer>, client: ExtractionClient) -> Self {
        Self {
            renderer,
            client,
            document: None,
            viewport: ViewportState::default(),
            selection: SelectionTracker::default(),
            scheduler: RenderScheduler::default(),
            displayed: None,
            live_rect: None,
            last_result: None,
            log: ActivityLog::default(),
            render_task: None,
            extract_task: None,
        }
    }

    pub fn document(&self) -> Option<&SourceDocument> {
        self.document.as_ref()
    }

    pub fn displayed(&self) -> Option<&RasterPage> {
        self.displayed.as_ref()
    }

    pub fn live_rect(&self) -> Option<Rect> {
        self.live_rect
    }

    pub fn committed_selection(&self) -> Option<crate::types::SelectionRect> {
        self.selection.committed()
    }

    pub fn last_result(&self) -> Option<&ExtractionResult> {
        self.last_result.as_ref()
    }

    pub fn backend_url(&self) -> &str {
        self.client.base_url()
    }

    pub fn is_rendering(&self) -> bool {
        self.scheduler.is_rendering()
    }

    pub fn is_extracting(&self) -> bool {
        self.extract_task.is_some()
    }

    /// Load a new source file, replacing the previous document and every
    /// piece of derived state. Refuses non-PDF input without touching
    /// the current session.
    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        let document = SourceDocument::load(path)?;

        // Dropping the handles discards any in-flight results for the
        // previous document
        self.render_task = None;
        self.extract_task = None;
        self.scheduler = RenderScheduler::default();
        self.selection.clear();
        self.live_rect = None;
        self.displayed = None;
        self.last_result = None;
        self.log.clear();

        self.viewport.reset(document.page_count());
        self.log.success(format!(
            "Loaded {} ({} pages)",
            document.file_name(),
            document.page_count()
        ));
        info!(file = document.file_name(), pages = document.page_count(), "document loaded");
        self.document = Some(document);

        self.request_render(self.viewport.current_page());
        Ok(())
    }

    /// Navigate by `delta` pages; re-renders when the page changes.
    pub fn navigate(&mut self, delta: i32) {
        if self.viewport.change_page(delta) {
            self.request_render(self.viewport.current_page());
        }
    }

    /// Step the zoom; re-renders the current page at the new scale.
    pub fn change_zoom(&mut self, steps: i32) {
        if self.viewport.change_zoom(steps) {
            self.request_render(self.viewport.current_page());
        }
    }

    fn request_render(&mut self, page: u32) {
        if self.document.is_none() {
            return;
        }
        if let Some(start) = self.scheduler.request(page) {
            self.spawn_render(start);
        } else {
            debug!(page, "render queued behind in-flight page");
        }
    }

    fn spawn_render(&mut self, page: u32) {
        let Some(document) = &self.document else { return };
        let renderer = Arc::clone(&self.renderer);
        let path = document.path().to_path_buf();
        let zoom = self.viewport.zoom();
        debug!(page, zoom, "render started");
        self.render_task = Some(tokio::task::spawn_blocking(move || {
            renderer.render_page(&path, page, zoom)
        }));
    }

    /// Pointer down in render-pixel space: anchor a new drag.
    pub fn pointer_down(&mut self, pos: PixelPos) {
        if self.displayed.is_none() {
            return;
        }
        self.selection.begin(pos);
    }

    /// Pointer move: refresh the live overlay rectangle.
    pub fn pointer_move(&mut self, pos: PixelPos) {
        if let Some(rect) = self.selection.update(pos) {
            self.live_rect = Some(rect);
        }
    }

    /// Pointer up: commit if large enough; the overlay now shows the
    /// committed rectangle (or whatever was committed before).
    pub fn pointer_up(&mut self, pos: PixelPos) {
        let page = self.viewport.current_page();
        if let Some(sel) = self.selection.end(pos, page) {
            self.log.success(format!(
                "Selected region [{}, {}] {}x{} on page {}",
                sel.rect.x.round(),
                sel.rect.y.round(),
                sel.rect.w.round(),
                sel.rect.h.round(),
                sel.page
            ));
        }
        self.live_rect = self.selection.committed().map(|s| s.rect);
    }

    /// Remove the committed selection and erase the overlay.
    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.live_rect = None;
    }

    /// Submit the selected region (or the whole page) for extraction.
    /// Rejected while a submission is outstanding; the guard re-enables
    /// unconditionally when the request settles in `poll`.
    pub fn submit(&mut self) -> Result<()> {
        if self.extract_task.is_some() {
            self.log.info("Extraction already running");
            return Ok(());
        }
        let Some(document) = &self.document else {
            return Err(SnipError::NoFileLoaded);
        };
        let selection = self.selection.committed();
        let bounds = match &self.displayed {
            Some(raster) => (raster.width, raster.height),
            None if selection.is_none() => return Err(SnipError::NoRegion),
            None => (0, 0),
        };

        let region = RegionParams::resolve(
            selection,
            self.viewport.current_page(),
            bounds,
            self.viewport.zoom(),
        );
        let client = self.client.clone();
        let file_name = document.file_name().to_string();
        let bytes = document.bytes().to_vec();

        self.log.info(format!(
            "Sending page {} region to {} ...",
            region.page,
            self.client.base_url()
        ));
        self.extract_task = Some(tokio::spawn(async move {
            client.submit(&file_name, bytes, region).await
        }));
        Ok(())
    }

    /// Drive settled async work. Called from the event loop each tick;
    /// returns true when something changed and the shell should redraw.
    pub async fn poll(&mut self) -> bool {
        let mut changed = false;

        if let Some(task) = self.render_task.take_if(|t| t.is_finished()) {
            let outcome = task
                .await
                .unwrap_or_else(|e| Err(SnipError::RenderFailure(e.to_string())));
            match outcome {
                Ok(raster) => {
                    debug!(page = raster.page, w = raster.width, h = raster.height, "render complete");
                    self.displayed = Some(raster);
                    // Selections never survive a completed render
                    self.selection.clear();
                    self.live_rect = None;
                    if let Some(next) = self.scheduler.complete() {
                        self.spawn_render(next);
                    }
                }
                Err(e) => {
                    self.scheduler.fail();
                    self.log.error(e.to_string());
                }
            }
            changed = true;
        }

        if let Some(task) = self.extract_task.take_if(|t| t.is_finished()) {
            let outcome = task
                .await
                .unwrap_or_else(|e| Err(SnipError::TransportError(e.to_string())));
            match outcome {
                Ok(result) => {
                    match result.message.as_deref() {
                        Some(message) => self.log.success(message.to_string()),
                        None => self.log.success("Extraction complete"),
                    }
                    if let Some(report) = &result.confidence {
                        let summary = ConfidenceSummary::from_report(report);
                        self.log.info(format!("Overall confidence: {}", summary.overall));
                        for field in &summary.low_fields {
                            self.log.info(format!("Low confidence - {field}"));
                        }
                    }
                    if let Some(output) = &result.output {
                        self.log.info(format!(
                            "{} output files ready to download",
                            output.csv_files.len()
                        ));
                    }
                    self.last_result = Some(result);
                }
                Err(e) => self.log.error(e.to_string()),
            }
            changed = true;
        }

        changed
    }

    /// Fetch every generated file from the last result into the output
    /// directory. Failures are logged per file and do not stop the rest.
    pub async fn download_outputs(&mut self) -> usize {
        let filenames: Vec<String> = match self.last_result.as_ref().and_then(|r| r.output.as_ref()) {
            Some(output) => output.csv_files.clone(),
            None => {
                self.log.info("No generated files to download");
                return 0;
            }
        };

        let dir = config::output_dir();
        if let Err(e) = std::fs::create_dir_all(&dir) {
            self.log.error(format!("Cannot create {}: {e}", dir.display()));
            return 0;
        }

        let mut saved = 0;
        for name in filenames {
            match self.client.download(&name).await {
                Ok(bytes) => {
                    let target = dir.join(&name);
                    match std::fs::write(&target, bytes) {
                        Ok(()) => {
                            self.log.success(format!("Saved {}", target.display()));
                            saved += 1;
                        }
                        Err(e) => self.log.error(format!("Write {name}: {e}")),
                    }
                }
                Err(e) => self.log.error(format!("Download {name}: {e}")),
            }
        }
        saved
    }

    /// Startup reachability probe; result goes to the activity log.
    pub async fn probe_backend(&mut self) {
        match self.client.health().await {
            Ok(()) => self.log.info(format!("Backend ready at {}", self.client.base_url())),
            Err(e) => self.log.error(e.to_string()),
        }
    }
}
