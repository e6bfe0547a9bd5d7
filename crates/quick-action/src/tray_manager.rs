//! System tray icon with state-based updates.
//!
//! Shows whether the launcher is idle or listening, with a context menu for
//! command management and exit.

use crate::{AppError, AppResult, TrayIconState};

use std::panic::Location;

use error_location::ErrorLocation;
use image::{Rgba, RgbaImage};
use tracing::{info, instrument};
use tray_icon::menu::{Menu, MenuId, MenuItem};
use tray_icon::{Icon, TrayIcon, TrayIconBuilder};

const ICON_SIZE: u32 = 32;

/// System tray icon manager.
pub struct TrayManager {
    tray_icon: TrayIcon,
    manage_item_id: MenuId,
    exit_item_id: MenuId,
}

impl TrayManager {
    /// Create a new tray manager in the idle state.
    #[track_caller]
    #[instrument]
    pub fn new() -> AppResult<Self> {
        let menu = Menu::new();

        let manage_item = MenuItem::new("Manage commands", true, None);
        let exit_item = MenuItem::new("Exit", true, None);

        let manage_id = manage_item.id().clone();
        let exit_id = exit_item.id().clone();

        menu.append(&manage_item)
            .map_err(|e| AppError::SurfaceError {
                reason: format!("Failed to add manage menu: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        menu.append(&exit_item).map_err(|e| AppError::SurfaceError {
            reason: format!("Failed to add exit menu: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let icon = Self::render_icon(TrayIconState::Idle)?;

        let tray_icon = TrayIconBuilder::new()
            .with_tooltip(Self::tooltip(TrayIconState::Idle))
            .with_menu(Box::new(menu))
            .with_icon(icon)
            .build()
            .map_err(|e| AppError::SurfaceError {
                reason: format!("Failed to create tray icon: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!("System tray icon initialized");

        Ok(Self {
            tray_icon,
            manage_item_id: manage_id,
            exit_item_id: exit_id,
        })
    }

    /// Update the tray icon state with new icon and tooltip.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn update_state(&mut self, state: TrayIconState) -> AppResult<()> {
        self.tray_icon
            .set_icon(Some(Self::render_icon(state)?))
            .map_err(|e| AppError::SurfaceError {
                reason: format!("Failed to update icon: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        self.tray_icon
            .set_tooltip(Some(Self::tooltip(state)))
            .map_err(|e| AppError::SurfaceError {
                reason: format!("Failed to update tooltip: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        Ok(())
    }

    fn tooltip(state: TrayIconState) -> &'static str {
        match state {
            TrayIconState::Idle => "Quick Action - Ready",
            TrayIconState::Listening => "Quick Action - Listening...",
        }
    }

    /// Build the icon for `state` as a filled disc.
    #[track_caller]
    fn render_icon(state: TrayIconState) -> AppResult<Icon> {
        let rgba = icon_image(state);
        let (width, height) = (rgba.width(), rgba.height());

        Icon::from_rgba(rgba.into_raw(), width, height).map_err(|e| AppError::SurfaceError {
            reason: format!("Failed to create icon from RGBA: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    /// Get the manage menu item ID.
    pub fn manage_item_id(&self) -> &MenuId {
        &self.manage_item_id
    }

    /// Get the exit menu item ID.
    pub fn exit_item_id(&self) -> &MenuId {
        &self.exit_item_id
    }
}

/// Disc icon: grey when idle, red while listening. Outside the disc is
/// transparent.
pub fn icon_image(state: TrayIconState) -> RgbaImage {
    let fill = match state {
        TrayIconState::Idle => Rgba([0x9e, 0x9e, 0x9e, 0xff]),
        TrayIconState::Listening => Rgba([0xe5, 0x39, 0x35, 0xff]),
    };
    let centre = (ICON_SIZE as f32 - 1.0) / 2.0;
    let radius = ICON_SIZE as f32 / 2.0 - 1.0;

    RgbaImage::from_fn(ICON_SIZE, ICON_SIZE, |x, y| {
        let (dx, dy) = (x as f32 - centre, y as f32 - centre);
        if dx * dx + dy * dy <= radius * radius {
            fill
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}
