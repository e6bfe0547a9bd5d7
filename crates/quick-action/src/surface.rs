//! Input surface boundary.
//!
//! The coordinator drives the window and tray through [`Surface`]. The real
//! implementation forwards to the main UI thread as [`UiCommand`]s.

use crate::{AppError, AppResult, SessionEvent, TrayIconState, UiCommand};

use quick_action_core::{dispatch::Launcher, registry::RunMode};

use std::{panic::Location, sync::Arc};

use error_location::ErrorLocation;
use tao::{
    dpi::{PhysicalPosition, PhysicalSize},
    event_loop::EventLoopProxy,
    keyboard::Key,
};
use tracing::{info, instrument, warn};

/// Input window width in physical pixels.
pub const SURFACE_WIDTH: u32 = 1000;
/// Input window height in physical pixels.
pub const SURFACE_HEIGHT: u32 = 160;

/// What the coordinator can ask of the input surface.
pub trait Surface {
    /// Place the window on the active monitor and make it visible.
    fn show(&mut self);
    /// Hide the window without destroying it.
    fn hide(&mut self);
    /// Take keyboard focus so typing lands in the buffer.
    fn focus(&mut self);
    /// Display `buffer` as the current input.
    fn render(&mut self, buffer: &str);
    /// Reflect whether voice capture is active.
    fn set_listening(&mut self, listening: bool);
    /// Open the external command management surface.
    fn open_management(&mut self) -> AppResult<()>;
}

/// Surface backed by the tao window and tray on the main thread.
pub struct WindowSurface {
    proxy: EventLoopProxy<UiCommand>,
    launcher: Arc<dyn Launcher>,
    manage_command: String,
}

impl WindowSurface {
    /// `manage_command` is the shell command that starts the management
    /// CLI; it is run in a visible terminal.
    pub fn new(
        proxy: EventLoopProxy<UiCommand>,
        launcher: Arc<dyn Launcher>,
        manage_command: String,
    ) -> Self {
        Self {
            proxy,
            launcher,
            manage_command,
        }
    }

    fn send(&self, command: UiCommand) {
        if let Err(e) = self.proxy.send_event(command) {
            warn!(error = %e, "UI thread is gone, dropping command");
        }
    }
}

impl Surface for WindowSurface {
    fn show(&mut self) {
        self.send(UiCommand::Show);
    }

    fn hide(&mut self) {
        self.send(UiCommand::Hide);
    }

    fn focus(&mut self) {
        self.send(UiCommand::Focus);
    }

    fn render(&mut self, buffer: &str) {
        self.send(UiCommand::Render(buffer.to_string()));
    }

    fn set_listening(&mut self, listening: bool) {
        let state = if listening {
            TrayIconState::Listening
        } else {
            TrayIconState::Idle
        };
        self.send(UiCommand::SetState(state));
    }

    #[instrument(skip(self))]
    fn open_management(&mut self) -> AppResult<()> {
        self.launcher
            .launch(&self.manage_command, RunMode::Visible)?;
        info!("Opened command management");
        Ok(())
    }
}

/// Shell command that runs this executable's `manage` subcommand.
#[track_caller]
pub fn manage_command() -> AppResult<String> {
    let exe = std::env::current_exe().map_err(|e| AppError::SurfaceError {
        reason: format!("Failed to locate own executable: {}", e),
        location: ErrorLocation::from(Location::caller()),
    })?;

    Ok(format!("\"{}\" manage", exe.display()))
}

/// Top-left corner that centres the window horizontally at 60% of the
/// monitor height.
pub fn surface_origin(
    monitor_position: PhysicalPosition<i32>,
    monitor_size: PhysicalSize<u32>,
    window_size: PhysicalSize<u32>,
) -> PhysicalPosition<i32> {
    let x = (i64::from(monitor_size.width) - i64::from(window_size.width)) / 2;
    let y = i64::from(monitor_size.height) * 6 / 10 - i64::from(window_size.height) / 2;

    PhysicalPosition::new(
        monitor_position.x + x.max(0) as i32,
        monitor_position.y + y.max(0) as i32,
    )
}

/// Session event for a key pressed in the input window.
///
/// `text` is the character output of the key, if any.
pub fn key_event(key: &Key<'_>, text: Option<&str>) -> Option<SessionEvent> {
    match key {
        Key::Enter => Some(SessionEvent::Commit),
        Key::Escape => Some(SessionEvent::Escape),
        Key::Backspace => Some(SessionEvent::Backspace),
        _ => text
            .filter(|t| !t.is_empty() && !t.chars().any(char::is_control))
            .map(|t| SessionEvent::Typed(t.to_string())),
    }
}
