//! Drawing of the input window.
//!
//! The window has no widgets. Each frame is composed as an RGBA image
//! (buffer text, caret, voice indicator) and copied into a `softbuffer`
//! surface. Glyphs come from the `font8x8` bitmap font, scaled up.

use crate::{AppError, AppResult, TrayIconState, tray_manager::icon_image};

use std::{num::NonZeroU32, panic::Location, rc::Rc};

use error_location::ErrorLocation;
use font8x8::{BASIC_FONTS, LATIN_FONTS, UnicodeFonts};
use image::{Rgba, RgbaImage, imageops};
use softbuffer::{Context, Surface};
use tao::window::Window;
use tracing::{debug, instrument};

pub(crate) const BACKGROUND: Rgba<u8> = Rgba([0x21, 0x21, 0x21, 0xff]);
const BORDER: Rgba<u8> = Rgba([0x61, 0x61, 0x61, 0xff]);
pub(crate) const TEXT: Rgba<u8> = Rgba([0xee, 0xee, 0xee, 0xff]);
pub(crate) const PLACEHOLDER_TEXT: Rgba<u8> = Rgba([0x75, 0x75, 0x75, 0xff]);

/// Shown while the buffer is empty.
pub const PLACEHOLDER: &str = "type or say a command";

const BORDER_WIDTH: u32 = 2;
pub(crate) const PADDING: u32 = 24;
/// Each font pixel becomes a `GLYPH_SCALE` square.
const GLYPH_SCALE: u32 = 4;
/// Width and height of one character cell in window pixels.
pub const CELL: u32 = 8 * GLYPH_SCALE;
const CARET_WIDTH: u32 = 3;

/// Compose one frame of the input window.
///
/// Text longer than the window keeps its end visible, since that is where
/// typing and transcripts land.
pub fn render_input(text: &str, listening: bool, width: u32, height: u32) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(width, height, BACKGROUND);
    draw_border(&mut canvas);

    let indicator = icon_image(if listening {
        TrayIconState::Listening
    } else {
        TrayIconState::Idle
    });

    let text_top = height.saturating_sub(CELL) / 2;
    let text_width = width.saturating_sub(3 * PADDING + indicator.width());
    let max_chars = (text_width / CELL).saturating_sub(1) as usize;

    if text.is_empty() {
        draw_caret(&mut canvas, PADDING, text_top);
        draw_text(
            &mut canvas,
            PLACEHOLDER,
            PADDING + CARET_WIDTH * 3,
            text_top,
            PLACEHOLDER_TEXT,
        );
    } else {
        let end = draw_text(
            &mut canvas,
            visible_tail(text, max_chars),
            PADDING,
            text_top,
            TEXT,
        );
        draw_caret(&mut canvas, end + 2, text_top);
    }

    let indicator_x = width.saturating_sub(PADDING + indicator.width());
    let indicator_y = height.saturating_sub(indicator.height()) / 2;
    imageops::overlay(
        &mut canvas,
        &indicator,
        i64::from(indicator_x),
        i64::from(indicator_y),
    );

    canvas
}

/// The last `max_chars` characters of `text`.
pub fn visible_tail(text: &str, max_chars: usize) -> &str {
    let count = text.chars().count();
    if count <= max_chars {
        return text;
    }

    match text.char_indices().nth(count - max_chars) {
        Some((start, _)) => &text[start..],
        None => "",
    }
}

/// Bitmap for `c`, with `?` for characters the font does not cover.
pub fn glyph(c: char) -> [u8; 8] {
    BASIC_FONTS
        .get(c)
        .or_else(|| LATIN_FONTS.get(c))
        .or_else(|| BASIC_FONTS.get('?'))
        .unwrap_or([0; 8])
}

/// Draw `text` with its top-left corner at `(x, y)`. Returns the x after the
/// last character. Pixels outside the canvas are clipped.
fn draw_text(canvas: &mut RgbaImage, text: &str, x: u32, y: u32, colour: Rgba<u8>) -> u32 {
    let mut pen = x;

    for c in text.chars() {
        for (row, bits) in glyph(c).iter().enumerate() {
            for col in 0..8u32 {
                if bits & (1 << col) == 0 {
                    continue;
                }
                fill_rect(
                    canvas,
                    pen + col * GLYPH_SCALE,
                    y + row as u32 * GLYPH_SCALE,
                    GLYPH_SCALE,
                    GLYPH_SCALE,
                    colour,
                );
            }
        }
        pen += CELL;
    }

    pen
}

fn draw_caret(canvas: &mut RgbaImage, x: u32, y: u32) {
    fill_rect(canvas, x, y, CARET_WIDTH, CELL, TEXT);
}

fn draw_border(canvas: &mut RgbaImage) {
    let (width, height) = canvas.dimensions();
    fill_rect(canvas, 0, 0, width, BORDER_WIDTH, BORDER);
    fill_rect(canvas, 0, height.saturating_sub(BORDER_WIDTH), width, BORDER_WIDTH, BORDER);
    fill_rect(canvas, 0, 0, BORDER_WIDTH, height, BORDER);
    fill_rect(canvas, width.saturating_sub(BORDER_WIDTH), 0, BORDER_WIDTH, height, BORDER);
}

fn fill_rect(canvas: &mut RgbaImage, x: u32, y: u32, w: u32, h: u32, colour: Rgba<u8>) {
    for py in y..y.saturating_add(h) {
        for px in x..x.saturating_add(w) {
            if let Some(pixel) = canvas.get_pixel_mut_checked(px, py) {
                *pixel = colour;
            }
        }
    }
}

/// `softbuffer` pixel layout: `0x00RRGGBB`.
pub fn to_surface_pixel(pixel: Rgba<u8>) -> u32 {
    let [r, g, b, _] = pixel.0;
    (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
}

/// The input window's drawing surface and what it currently shows.
///
/// Lives on the main thread with the window.
pub struct InputCanvas {
    window: Rc<Window>,
    surface: Surface<Rc<Window>, Rc<Window>>,
    text: String,
    listening: bool,
}

impl InputCanvas {
    /// Attach a software-rendered surface to `window`.
    #[track_caller]
    #[instrument(skip(window))]
    pub fn new(window: Rc<Window>) -> AppResult<Self> {
        let context = Context::new(Rc::clone(&window)).map_err(|e| AppError::SurfaceError {
            reason: format!("Failed to create drawing context: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let surface =
            Surface::new(&context, Rc::clone(&window)).map_err(|e| AppError::SurfaceError {
                reason: format!("Failed to create drawing surface: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        Ok(Self {
            window,
            surface,
            text: String::new(),
            listening: false,
        })
    }

    /// Show `text` on the next redraw.
    pub fn set_text(&mut self, text: String) {
        self.text = text;
        self.window.request_redraw();
    }

    /// Switch the voice indicator on the next redraw.
    pub fn set_listening(&mut self, listening: bool) {
        self.listening = listening;
        self.window.request_redraw();
    }

    /// Draw the current state into the window.
    #[track_caller]
    pub fn redraw(&mut self) -> AppResult<()> {
        let size = self.window.inner_size();
        let (Some(width), Some(height)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
        else {
            return Ok(());
        };

        self.surface
            .resize(width, height)
            .map_err(|e| AppError::SurfaceError {
                reason: format!("Failed to resize drawing surface: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let frame = render_input(&self.text, self.listening, size.width, size.height);

        let mut buffer = self.surface.buffer_mut().map_err(|e| AppError::SurfaceError {
            reason: format!("Failed to map drawing buffer: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        for (dst, pixel) in buffer.iter_mut().zip(frame.pixels()) {
            *dst = to_surface_pixel(*pixel);
        }

        buffer.present().map_err(|e| AppError::SurfaceError {
            reason: format!("Failed to present frame: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        debug!(
            chars = self.text.chars().count(),
            listening = self.listening,
            "Input window drawn"
        );

        Ok(())
    }
}
