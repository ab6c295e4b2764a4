// End-to-end pipeline tests against a mock renderer and an unreachable
// backend: load, coalesced navigation, selection, submission guard.
use std::path::Path;
use std::sync::{Arc, Mutex};

use image::DynamicImage;
use lopdf::{dictionary, Document, Object};
use pdfsnip::extraction::ExtractionClient;
use pdfsnip::render::{PageRenderer, RasterPage};
use pdfsnip::session::Session;
use pdfsnip::types::{PixelPos, Result};

/// Records every page it is asked to rasterize
struct MockRenderer {
    rendered: Mutex<Vec<u32>>,
}

impl MockRenderer {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            rendered: Mutex::new(Vec::new()),
        })
    }

    fn pages(&self) -> Vec<u32> {
        self.rendered.lock().unwrap().clone()
    }
}

impl PageRenderer for MockRenderer {
    fn render_page(&self, _pdf_path: &Path, page: u32, zoom: f32) -> Result<RasterPage> {
        self.rendered.lock().unwrap().push(page);
        let width = (800.0 * zoom) as u32;
        let height = (1000.0 * zoom) as u32;
        Ok(RasterPage {
            page,
            width,
            height,
            image: DynamicImage::new_rgba8(width, height),
        })
    }
}

/// Write a minimal valid PDF with `n` empty pages
fn write_test_pdf(path: &Path, n: usize) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let kids: Vec<Object> = (0..n)
        .map(|_| {
            doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            })
            .into()
        })
        .collect();

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => n as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}

// Backend that refuses connections immediately
fn dead_backend_client() -> ExtractionClient {
    ExtractionClient::new("http://127.0.0.1:1")
}

async fn settle(session: &mut Session) {
    for _ in 0..200 {
        session.poll().await;
        if !session.is_rendering() && !session.is_extracting() {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
    panic!("session did not settle");
}

fn session_with(renderer: Arc<MockRenderer>) -> Session {
    Session::new(renderer, dead_backend_client())
}

#[tokio::test]
async fn load_renders_first_page_and_resets_viewport() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("doc.pdf");
    write_test_pdf(&pdf, 3);

    let renderer = MockRenderer::new();
    let mut session = session_with(Arc::clone(&renderer));
    session.load_file(&pdf).unwrap();

    assert_eq!(session.viewport.current_page(), 1);
    assert_eq!(session.viewport.page_count(), 3);

    settle(&mut session).await;
    assert_eq!(renderer.pages(), vec![1]);
    assert_eq!(session.displayed().unwrap().page, 1);
}

#[tokio::test]
async fn rapid_navigation_coalesces_to_last_page() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("doc.pdf");
    write_test_pdf(&pdf, 3);

    let renderer = MockRenderer::new();
    let mut session = session_with(Arc::clone(&renderer));
    session.load_file(&pdf).unwrap();

    // Two rapid "next" clicks before the first render is observed
    session.navigate(1);
    session.navigate(1);
    assert_eq!(session.viewport.current_page(), 3);

    settle(&mut session).await;
    // Page 2 was requested but never rendered
    assert_eq!(renderer.pages(), vec![1, 3]);
    assert_eq!(session.displayed().unwrap().page, 3);
}

#[tokio::test]
async fn page_change_clears_committed_selection() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("doc.pdf");
    write_test_pdf(&pdf, 3);

    let renderer = MockRenderer::new();
    let mut session = session_with(renderer);
    session.load_file(&pdf).unwrap();
    settle(&mut session).await;

    session.pointer_down(PixelPos::new(100.0, 100.0));
    session.pointer_move(PixelPos::new(140.0, 130.0));
    session.pointer_up(PixelPos::new(140.0, 130.0));
    assert!(session.committed_selection().is_some());

    session.navigate(1);
    settle(&mut session).await;
    assert!(session.committed_selection().is_none());
    assert!(session.live_rect().is_none());
}

#[tokio::test]
async fn selection_drawn_on_page_three_is_tagged_with_it() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("doc.pdf");
    write_test_pdf(&pdf, 3);

    let renderer = MockRenderer::new();
    let mut session = session_with(renderer);
    session.load_file(&pdf).unwrap();
    session.navigate(1);
    session.navigate(1);
    settle(&mut session).await;

    // 40x30 drag on page 3
    session.pointer_down(PixelPos::new(100.0, 100.0));
    session.pointer_move(PixelPos::new(140.0, 130.0));
    session.pointer_up(PixelPos::new(140.0, 130.0));

    let sel = session.committed_selection().unwrap();
    assert_eq!(sel.page, 3);
    assert_eq!(sel.rect.w, 40.0);
    assert_eq!(sel.rect.h, 30.0);
}

#[tokio::test]
async fn submit_guard_rejects_overlap_and_reenables_on_settlement() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("doc.pdf");
    write_test_pdf(&pdf, 1);

    let renderer = MockRenderer::new();
    let mut session = session_with(renderer);
    session.load_file(&pdf).unwrap();
    settle(&mut session).await;

    session.submit().unwrap();
    assert!(session.is_extracting());
    // Second submit while outstanding: ignored, not interleaved
    session.submit().unwrap();

    settle(&mut session).await;
    assert!(!session.is_extracting());
    // The dead backend produced a connectivity error in the log
    let errors: Vec<_> = session
        .log
        .entries()
        .iter()
        .filter(|e| e.severity == pdfsnip::presenter::Severity::Error)
        .collect();
    assert!(!errors.is_empty());
    assert!(errors
        .iter()
        .any(|e| e.message.contains("extraction backend running")));

    // Guard is re-enabled: a retry is accepted
    session.submit().unwrap();
    assert!(session.is_extracting());
    settle(&mut session).await;
}

#[tokio::test]
async fn submit_without_document_fails_before_any_network_call() {
    let renderer = MockRenderer::new();
    let mut session = session_with(renderer);
    match session.submit() {
        Err(pdfsnip::types::SnipError::NoFileLoaded) => {}
        other => panic!("expected NoFileLoaded, got {:?}", other.map(|_| ())),
    }
    assert!(!session.is_extracting());
}

#[tokio::test]
async fn new_file_load_resets_log_and_results() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.pdf");
    let second = dir.path().join("second.pdf");
    write_test_pdf(&first, 2);
    write_test_pdf(&second, 1);

    let renderer = MockRenderer::new();
    let mut session = session_with(renderer);
    session.load_file(&first).unwrap();
    settle(&mut session).await;
    session.log.info("some activity");
    assert!(session.log.entries().len() >= 2);

    session.load_file(&second).unwrap();
    // Log restarts with the load entry; derived state is gone
    assert_eq!(session.log.entries().len(), 1);
    assert!(session.log.entries()[0].message.contains("second.pdf"));
    assert_eq!(session.viewport.current_page(), 1);
    assert_eq!(session.viewport.page_count(), 1);
    assert!(session.last_result().is_none());
    settle(&mut session).await;
    assert_eq!(session.displayed().unwrap().page, 1);
}
