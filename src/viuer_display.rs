use anyhow::Result;
use viuer::{print, Config};
use std::io::{self, Write};

use crate::types::Rect;

/// Display a rendered page image using viuer, with the selection
/// rectangle (live or committed) burned into the frame as an overlay.
///
/// viuer handles protocol detection (Kitty, iTerm, block fallback), so
/// this works across terminals.
pub fn display_page(
    image: &image::DynamicImage,
    overlay: Option<Rect>,
    x: u16,
    y: u16,
    max_width: u16,
    max_height: u16,
) -> Result<()> {
    // Save cursor position for split view consistency
    print!("\x1b[s");
    io::stdout().flush()?;

    let config = Config {
        transparent: true,
        absolute_offset: true,
        x,
        y: y as i16,
        restore_cursor: false,
        width: Some(max_width as u32),
        height: Some(max_height as u32),
        truecolor: true,
        use_kitty: true,
        use_iterm: true,
    };

    let mut rgba = image.to_rgba8();
    let (width, height) = (rgba.width(), rgba.height());

    if let Some(rect) = overlay {
        draw_rect_outline(&mut rgba, rect);
    }

    // Bridge image 0.25 buffers to the image 0.24 types viuer expects
    let raw_buffer = rgba.into_raw();
    let old_image = image_0_24::ImageBuffer::from_raw(width, height, raw_buffer)
        .ok_or_else(|| anyhow::anyhow!("Failed to create image buffer"))?;
    let old_dynamic = image_0_24::DynamicImage::ImageRgba8(old_image);

    let _ = print(&old_dynamic, &config)?;

    print!("\x1b[u");
    io::stdout().flush()?;

    Ok(())
}

// Two-pixel green outline, clamped to the image bounds
fn draw_rect_outline(rgba: &mut image::RgbaImage, rect: Rect) {
    let (img_w, img_h) = (rgba.width() as i64, rgba.height() as i64);
    let x0 = rect.x as i64;
    let y0 = rect.y as i64;
    let x1 = (rect.x + rect.w) as i64;
    let y1 = (rect.y + rect.h) as i64;
    let green = image::Rgba([0u8, 255, 65, 255]);

    let mut put = |x: i64, y: i64| {
        if x >= 0 && y >= 0 && x < img_w && y < img_h {
            rgba.put_pixel(x as u32, y as u32, green);
        }
    };

    for x in x0..=x1 {
        for t in 0..2 {
            put(x, y0 + t);
            put(x, y1 - t);
        }
    }
    for y in y0..=y1 {
        for t in 0..2 {
            put(x0 + t, y);
            put(x1 - t, y);
        }
    }
}

/// Clear any displayed graphics
pub fn clear_graphics() -> Result<()> {
    // Kitty protocol clear
    if std::env::var("KITTY_WINDOW_ID").is_ok()
        || std::env::var("TERM_PROGRAM").unwrap_or_default() == "ghostty"
    {
        print!("\x1b_Ga=d\x1b\\");
        io::stdout().flush()?;
    }

    // iTerm2 clear sequence
    if std::env::var("TERM_PROGRAM").unwrap_or_default() == "iTerm.app" {
        print!("\x1b]1337;File=inline=0:\x07");
        io::stdout().flush()?;
    }

    // Block-mode fallback
    print!("\x1b[2J");
    io::stdout().flush()?;

    Ok(())
}
