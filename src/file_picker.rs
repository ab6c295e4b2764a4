use anyhow::Result;
use crossterm::{
    cursor::MoveTo,
    event::{self, Event, KeyCode, MouseButton, MouseEventKind},
    execute,
    style::{Attribute, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use nucleo::{Config, Nucleo, Utf32String};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::Command;
use std::sync::Arc;

use crate::theme::SnipTheme;

/// Use nucleo to pick a PDF file with interactive fuzzy finding
pub fn pick_pdf_file() -> Result<Option<PathBuf>> {
    let pdf_files = find_pdf_files()?;

    if pdf_files.is_empty() {
        println!("No PDF files found under Documents or the current directory");
        return Ok(None);
    }

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    terminal::enable_raw_mode()?;
    execute!(stdout, crossterm::event::EnableMouseCapture)?;

    let result = run_fuzzy_picker(&pdf_files);

    execute!(stdout, crossterm::event::DisableMouseCapture)?;
    terminal::disable_raw_mode()?;
    execute!(stdout, LeaveAlternateScreen)?;

    result
}

/// Run the interactive fuzzy picker
fn run_fuzzy_picker(files: &[String]) -> Result<Option<PathBuf>> {
    let mut stdout = io::stdout();

    let mut nucleo = Nucleo::<Arc<str>>::new(
        Config::DEFAULT,
        Arc::new(|| {}),
        None,
        1,
    );

    let injector = nucleo.injector();
    for file in files {
        let file_arc: Arc<str> = Arc::from(file.as_str());
        let _ = injector.push(file_arc.clone(), |data, cols: &mut [Utf32String]| {
            cols[0] = data.as_ref().into();
        });
    }

    let home_prefix = dirs::home_dir()
        .map(|h| h.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut query = String::new();
    let mut selected_index = 0usize;
    let mut scroll_offset = 0usize;

    loop {
        execute!(stdout, Clear(ClearType::All), MoveTo(0, 0))?;

        let (term_width, term_height) = terminal::size().unwrap_or((80, 24));

        execute!(
            stdout,
            MoveTo(0, 0),
            SetBackgroundColor(SnipTheme::accent_picker()),
            SetForegroundColor(SnipTheme::text_header()),
            SetAttribute(Attribute::Bold),
            Print(format!("  {:<width$}", "pdfsnip - pick a PDF", width = (term_width - 2) as usize)),
            ResetColor,
            SetAttribute(Attribute::Reset)
        )?;

        execute!(
            stdout,
            MoveTo(0, 2),
            SetForegroundColor(SnipTheme::accent_header()),
            Print("  Search: "),
            SetForegroundColor(SnipTheme::text_primary()),
            Print(&query),
            SetForegroundColor(SnipTheme::text_dim()),
            Print("_"),
            ResetColor
        )?;

        let snapshot = nucleo.snapshot();
        let all_matches = snapshot.matched_items(..).collect::<Vec<_>>();

        let max_path_width = (term_width as usize).saturating_sub(5);
        let max_display_items = (term_height as usize).saturating_sub(7).min(15);

        if selected_index >= scroll_offset + max_display_items {
            scroll_offset = selected_index.saturating_sub(max_display_items - 1);
        } else if selected_index < scroll_offset {
            scroll_offset = selected_index;
        }

        let visible_matches = all_matches
            .iter()
            .skip(scroll_offset)
            .take(max_display_items)
            .collect::<Vec<_>>();

        for (display_i, item) in visible_matches.iter().enumerate() {
            let actual_index = scroll_offset + display_i;
            let path = item.data.as_ref();

            // Shorten home-relative paths for display
            let clean_path = if !home_prefix.is_empty() && path.starts_with(&home_prefix) {
                &path[home_prefix.len().saturating_add(1).min(path.len())..]
            } else {
                path
            };

            let line_pos = 4 + display_i as u16;
            execute!(stdout, MoveTo(0, line_pos), Clear(ClearType::CurrentLine))?;

            let display_str = if clean_path.len() > max_path_width {
                if let Some(filename) = clean_path.split('/').last() {
                    if filename.len() <= max_path_width.saturating_sub(4) {
                        format!(".../{}", filename)
                    } else {
                        let truncate_len = max_path_width.saturating_sub(3).min(filename.len());
                        format!("{}...", &filename[..truncate_len])
                    }
                } else {
                    let truncate_len = max_path_width.saturating_sub(3).min(clean_path.len());
                    format!("{}...", &clean_path[..truncate_len])
                }
            } else {
                clean_path.to_string()
            };

            let final_display: String = display_str.chars().take(max_path_width).collect();

            if actual_index == selected_index {
                execute!(
                    stdout,
                    SetForegroundColor(SnipTheme::success()),
                    Print("  > "),
                    SetForegroundColor(SnipTheme::text_primary()),
                    Print(&final_display),
                    ResetColor
                )?;
            } else {
                execute!(
                    stdout,
                    Print("    "),
                    SetForegroundColor(SnipTheme::text_secondary()),
                    Print(&final_display),
                    ResetColor
                )?;
            }
        }

        for i in visible_matches.len()..max_display_items {
            let line_pos = 4 + i as u16;
            execute!(stdout, MoveTo(0, line_pos), Clear(ClearType::CurrentLine))?;
        }

        let help_line = (4 + max_display_items + 1) as u16;
        let scroll_indicator = if all_matches.len() > max_display_items {
            format!(
                "  Showing {}-{} of {} files",
                scroll_offset + 1,
                (scroll_offset + visible_matches.len()).min(all_matches.len()),
                all_matches.len()
            )
        } else {
            format!("  {} files", all_matches.len())
        };

        execute!(
            stdout,
            MoveTo(0, help_line),
            Clear(ClearType::CurrentLine),
            SetForegroundColor(SnipTheme::text_dim()),
            Print(&scroll_indicator),
            ResetColor
        )?;

        execute!(
            stdout,
            MoveTo(0, help_line + 1),
            Clear(ClearType::CurrentLine),
            SetForegroundColor(SnipTheme::text_dim()),
            Print("  Up/Down Navigate  -  Enter Select  -  Esc Back  -  Type to search"),
            ResetColor
        )?;

        stdout.flush()?;

        if event::poll(std::time::Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) => {
                    if key.modifiers.contains(crossterm::event::KeyModifiers::CONTROL) {
                        match key.code {
                            KeyCode::Char('q') | KeyCode::Char('c') => return Ok(None),
                            _ => {}
                        }
                    } else {
                        match key.code {
                            KeyCode::Esc => {
                                return Ok(None);
                            }
                            KeyCode::Enter => {
                                if !all_matches.is_empty() && selected_index < all_matches.len() {
                                    let selected = all_matches[selected_index].data.as_ref();
                                    return Ok(Some(PathBuf::from(selected)));
                                }
                            }
                            KeyCode::Up => {
                                if selected_index > 0 {
                                    selected_index -= 1;
                                }
                            }
                            KeyCode::Down => {
                                if selected_index < all_matches.len().saturating_sub(1) {
                                    selected_index += 1;
                                }
                            }
                            KeyCode::PageUp => {
                                selected_index = selected_index.saturating_sub(max_display_items);
                            }
                            KeyCode::PageDown => {
                                selected_index = (selected_index + max_display_items)
                                    .min(all_matches.len().saturating_sub(1));
                            }
                            KeyCode::Home => {
                                selected_index = 0;
                            }
                            KeyCode::End => {
                                selected_index = all_matches.len().saturating_sub(1);
                            }
                            KeyCode::Backspace => {
                                query.pop();
                                selected_index = 0;
                                scroll_offset = 0;
                                nucleo.pattern.reparse(
                                    0,
                                    &query,
                                    nucleo::pattern::CaseMatching::Smart,
                                    nucleo::pattern::Normalization::Smart,
                                    false,
                                );
                            }
                            KeyCode::Char(c) => {
                                query.push(c);
                                selected_index = 0;
                                scroll_offset = 0;
                                nucleo.pattern.reparse(
                                    0,
                                    &query,
                                    nucleo::pattern::CaseMatching::Smart,
                                    nucleo::pattern::Normalization::Smart,
                                    false,
                                );
                            }
                            _ => {}
                        }
                    }
                }
                Event::Mouse(mouse) => match mouse.kind {
                    MouseEventKind::ScrollUp => {
                        if selected_index > 0 {
                            selected_index = selected_index.saturating_sub(3);
                        }
                    }
                    MouseEventKind::ScrollDown => {
                        selected_index = (selected_index + 3).min(all_matches.len().saturating_sub(1));
                    }
                    MouseEventKind::Down(MouseButton::Left) => {
                        let click_y = mouse.row;
                        if click_y >= 4 && click_y < (4 + max_display_items as u16) {
                            let clicked_index = scroll_offset + (click_y - 4) as usize;
                            if clicked_index < all_matches.len() {
                                selected_index = clicked_index;
                            }
                        }
                    }
                    _ => {}
                },
                _ => {}
            }
        }

        nucleo.tick(10);
    }
}

/// Find PDF files under Documents and the current directory
fn find_pdf_files() -> Result<Vec<String>> {
    let mut search_dirs: Vec<String> = Vec::new();
    if let Some(documents) = dirs::document_dir() {
        search_dirs.push(documents.to_string_lossy().into_owned());
    }
    search_dirs.push(".".to_string());

    let mut all_files = Vec::new();
    for search_dir in &search_dirs {
        let files = find_pdfs_in_dir(search_dir)?;
        all_files.extend(files);
    }

    all_files.sort();
    all_files.dedup();

    Ok(all_files)
}

fn find_pdfs_in_dir(search_dir: &str) -> Result<Vec<String>> {
    // Try fd first (faster), fallback to find
    let output = if command_exists("fd") {
        Command::new("fd")
            .args(["-e", "pdf", "-t", "f", ".", search_dir])
            .output()
    } else {
        Command::new("find")
            .args([search_dir, "-name", "*.pdf", "-type", "f"])
            .output()
    };

    match output {
        Ok(output) if output.status.success() => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let files: Vec<String> = stdout
                .lines()
                .map(|s| s.to_string())
                .filter(|s| !s.is_empty())
                .collect();
            Ok(files)
        }
        _ => Ok(Vec::new()),
    }
}

/// Check if a command exists
fn command_exists(cmd: &str) -> bool {
    Command::new("which")
        .arg(cmd)
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}
