// pdfsnip - render a PDF page, drag a region, ship it to the extraction
// backend, inspect the confidence-scored result
use anyhow::Result;
use clap::Parser;
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers, MouseButton,
        MouseEvent, MouseEventKind,
    },
    execute,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use std::{
    io::{self, Write},
    path::PathBuf,
    sync::Arc,
    time::Duration,
};
use tracing_subscriber::EnvFilter;

use pdfsnip::extraction::ExtractionClient;
use pdfsnip::presenter;
use pdfsnip::render::PopplerRenderer;
use pdfsnip::screen_mode::ScreenMode;
use pdfsnip::session::Session;
use pdfsnip::theme::SnipTheme;
use pdfsnip::types::PixelPos;
use pdfsnip::{config, file_picker, viuer_display};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    pdf_file: Option<PathBuf>,
    #[arg(short, long, default_value_t = 1)]
    page: u32,
    /// Extraction backend base URL (overrides PDFSNIP_BACKEND_URL)
    #[arg(long)]
    backend: Option<String>,
}

struct Shell {
    session: Session,
    screen_mode: ScreenMode,
    redraw: bool,
    open_file_picker: bool,
    exit: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let pdf_path = if let Some(path) = args.pdf_file {
        path
    } else {
        println!("Launching pdfsnip file picker...");
        if let Some(path) = file_picker::pick_pdf_file()? {
            println!("Selected: {}", path.display());
            path
        } else {
            println!("No file selected");
            return Ok(());
        }
    };

    let backend = args.backend.unwrap_or_else(config::backend_url);
    let mut session = Session::new(Arc::new(PopplerRenderer), ExtractionClient::new(backend));
    session.load_file(&pdf_path)?;
    if args.page > 1 {
        session.navigate(args.page as i32 - 1);
    }
    session.probe_backend().await;

    let mut shell = Shell {
        session,
        screen_mode: ScreenMode::Viewer,
        redraw: true,
        open_file_picker: false,
        exit: false,
    };

    setup_terminal()?;
    let result = run_app(&mut shell).await;
    restore_terminal()?;

    result
}

fn setup_terminal() -> Result<()> {
    enable_raw_mode()?;
    execute!(io::stdout(), EnterAlternateScreen, Hide, EnableMouseCapture)?;
    Ok(())
}

fn restore_terminal() -> Result<()> {
    let _ = viuer_display::clear_graphics();
    execute!(io::stdout(), Clear(ClearType::All), MoveTo(0, 0))?;
    execute!(io::stdout(), Show, LeaveAlternateScreen, DisableMouseCapture)?;
    disable_raw_mode()?;
    Ok(())
}

async fn run_app(shell: &mut Shell) -> Result<()> {
    let mut last_term_size = (0, 0);

    loop {
        let (term_width, term_height) = terminal::size()?;
        if (term_width, term_height) != last_term_size {
            shell.redraw = true;
            last_term_size = (term_width, term_height);
        }

        // Settle finished render/extraction work
        if shell.session.poll().await {
            shell.redraw = true;
        }

        if shell.open_file_picker {
            shell.open_file_picker = false;
            restore_terminal()?;
            if let Some(new_path) = file_picker::pick_pdf_file()? {
                if let Err(e) = shell.session.load_file(&new_path) {
                    shell.session.log.error(e.to_string());
                }
            }
            setup_terminal()?;
            shell.redraw = true;
        }

        if shell.redraw {
            draw(shell, term_width, term_height)?;
            shell.redraw = false;
        }

        if shell.exit {
            break;
        }

        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) => handle_key(shell, key.code, key.modifiers).await,
                Event::Mouse(mouse) => {
                    if shell.screen_mode == ScreenMode::Viewer {
                        handle_mouse_event(shell, mouse, term_width, term_height);
                    }
                }
                _ => {}
            }
        }
    }

    Ok(())
}

async fn handle_key(shell: &mut Shell, code: KeyCode, modifiers: KeyModifiers) {
    if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
        shell.exit = true;
        return;
    }
    if code == KeyCode::Char('o') && modifiers.contains(KeyModifiers::CONTROL) {
        shell.open_file_picker = true;
        return;
    }

    match code {
        KeyCode::Char('q') => shell.exit = true,
        KeyCode::Tab => {
            shell.screen_mode = shell.screen_mode.next();
            shell.redraw = true;
        }
        KeyCode::Left | KeyCode::PageUp => {
            shell.session.navigate(-1);
            shell.redraw = true;
        }
        KeyCode::Right | KeyCode::PageDown => {
            shell.session.navigate(1);
            shell.redraw = true;
        }
        KeyCode::Char('+') | KeyCode::Char('=') => {
            shell.session.change_zoom(1);
            shell.redraw = true;
        }
        KeyCode::Char('-') => {
            shell.session.change_zoom(-1);
            shell.redraw = true;
        }
        KeyCode::Char('c') => {
            shell.session.clear_selection();
            shell.session.log.info("Selection cleared");
            shell.redraw = true;
        }
        KeyCode::Char('e') | KeyCode::Enter => {
            if let Err(e) = shell.session.submit() {
                shell.session.log.error(e.to_string());
            }
            shell.redraw = true;
        }
        KeyCode::Char('d') => {
            shell.session.download_outputs().await;
            shell.redraw = true;
        }
        _ => {}
    }
}

// Translate terminal cells in the page panel to render-pixel space.
// The cell grid is an approximation of the displayed raster; the drag
// rectangle inherits that granularity.
fn panel_to_pixel(
    shell: &Shell,
    column: u16,
    row: u16,
    panel_w: u16,
    panel_h: u16,
) -> Option<PixelPos> {
    let raster = shell.session.displayed()?;
    if column >= panel_w || row < 1 || row >= panel_h {
        return None;
    }
    let rel_x = column as f32 / panel_w as f32;
    let rel_y = (row - 1) as f32 / (panel_h - 1) as f32;
    Some(PixelPos::new(
        rel_x * raster.width as f32,
        rel_y * raster.height as f32,
    ))
}

fn handle_mouse_event(shell: &mut Shell, mouse: MouseEvent, term_width: u16, term_height: u16) {
    let panel_w = term_width / 2;
    let panel_h = term_height.saturating_sub(2);

    let Some(pos) = panel_to_pixel(shell, mouse.column, mouse.row, panel_w, panel_h) else {
        return;
    };

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            shell.session.pointer_down(pos);
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            shell.session.pointer_move(pos);
            shell.redraw = true;
        }
        MouseEventKind::Up(MouseButton::Left) => {
            shell.session.pointer_up(pos);
            shell.redraw = true;
        }
        _ => {}
    }
}

fn draw(shell: &Shell, term_width: u16, term_height: u16) -> Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, Clear(ClearType::All), MoveTo(0, 0))?;

    match shell.screen_mode {
        ScreenMode::Viewer => {
            render_panel_header(&mut stdout, 0, term_width, "PDF REGION EXTRACT", SnipTheme::accent_header())?;

            let panel_w = term_width / 2;
            let panel_h = term_height.saturating_sub(3);

            if let Some(raster) = shell.session.displayed() {
                let _ = viuer_display::display_page(
                    &raster.image,
                    shell.session.live_rect(),
                    0,
                    1,
                    panel_w.saturating_sub(1),
                    panel_h,
                );
            }

            render_log_panel(&mut stdout, shell, panel_w, 1, term_width - panel_w, panel_h)?;
        }
        ScreenMode::Preview => {
            render_panel_header(&mut stdout, 0, term_width, "EXTRACTED RECORDS", SnipTheme::success())?;
            render_preview(&mut stdout, shell, term_width, term_height)?;
        }
    }

    render_status_bar(&mut stdout, shell, term_width, term_height)?;
    stdout.flush()?;
    Ok(())
}

fn render_panel_header(
    stdout: &mut io::Stdout,
    y: u16,
    width: u16,
    title: &str,
    color: Color,
) -> Result<()> {
    execute!(stdout, MoveTo(0, y))?;
    execute!(stdout, SetBackgroundColor(color))?;
    execute!(stdout, SetForegroundColor(SnipTheme::text_header()))?;
    write!(stdout, "{:^width$}", format!(" {} ", title), width = width as usize)?;
    execute!(stdout, ResetColor)?;
    Ok(())
}

fn render_log_panel(
    stdout: &mut io::Stdout,
    shell: &Shell,
    x: u16,
    y: u16,
    width: u16,
    height: u16,
) -> Result<()> {
    let max_lines = height as usize;
    let max_text = (width as usize).saturating_sub(12);

    for (i, entry) in shell.session.log.tail(max_lines).iter().enumerate() {
        execute!(stdout, MoveTo(x, y + i as u16))?;
        execute!(stdout, SetForegroundColor(SnipTheme::text_dim()))?;
        write!(stdout, "{} ", entry.time.format("%H:%M:%S"))?;
        execute!(stdout, SetForegroundColor(SnipTheme::severity(entry.severity)))?;
        let line: String = entry.message.chars().take(max_text).collect();
        execute!(stdout, Print(line), ResetColor)?;
    }
    Ok(())
}

fn render_preview(
    stdout: &mut io::Stdout,
    shell: &Shell,
    term_width: u16,
    term_height: u16,
) -> Result<()> {
    let max_lines = term_height.saturating_sub(3) as usize;
    let max_text = term_width as usize;

    let lines = match shell.session.last_result() {
        Some(result) => {
            let mut lines = presenter::result_block(result, shell.session.backend_url());
            if let Some(data) = &result.data {
                if !lines.is_empty() {
                    lines.push(String::new());
                }
                lines.extend(presenter::preview(data));
            }
            if lines.is_empty() {
                vec!["(no data extracted)".to_string()]
            } else {
                lines
            }
        }
        None => vec!["No extraction result yet - press 'e' to extract".to_string()],
    };

    for (i, line) in lines.iter().take(max_lines).enumerate() {
        execute!(stdout, MoveTo(2, 2 + i as u16))?;
        execute!(stdout, SetForegroundColor(SnipTheme::text_primary()))?;
        let clipped: String = line.chars().take(max_text).collect();
        execute!(stdout, Print(clipped), ResetColor)?;
    }
    Ok(())
}

fn render_status_bar(
    stdout: &mut io::Stdout,
    shell: &Shell,
    width: u16,
    height: u16,
) -> Result<()> {
    execute!(stdout, MoveTo(0, height - 1))?;
    execute!(stdout, SetBackgroundColor(SnipTheme::bg_status()))?;
    execute!(stdout, SetForegroundColor(SnipTheme::text_status()))?;

    let viewport = &shell.session.viewport;
    let selection = match shell.session.committed_selection() {
        Some(sel) => format!(
            "{}x{} @ p{}",
            sel.rect.w.round(),
            sel.rect.h.round(),
            sel.page
        ),
        None => "whole page".to_string(),
    };
    let busy = if shell.session.is_extracting() {
        " | extracting..."
    } else if shell.session.is_rendering() {
        " | rendering..."
    } else {
        ""
    };

    let status = format!(
        " Page {}/{} | Zoom {:.2} | Region: {}{} | e Extract | c Clear | d Download | Tab Records | Ctrl+O Open | q Quit ",
        viewport.current_page(),
        viewport.page_count(),
        viewport.zoom(),
        selection,
        busy
    );

    let status_len = status.chars().count();
    execute!(stdout, Print(&status))?;
    execute!(stdout, Print(" ".repeat((width as usize).saturating_sub(status_len))))?;
    execute!(stdout, ResetColor)?;

    Ok(())
}
