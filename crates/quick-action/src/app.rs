use crate::{
    AppResult, SessionCoordinator, SessionEvent, UiCommand, surface::WindowSurface,
};

use quick_action_core::voice::VoiceCapture;

use tao::event_loop::EventLoopProxy;
use tokio::sync::{mpsc, watch};
use tracing::{error, info, instrument};
use tray_icon::menu::{MenuEvent, MenuId};

/// The coordinator as wired for the real window and microphone.
pub type LiveCoordinator = SessionCoordinator<WindowSurface, Option<VoiceCapture>>;

/// Main application loop.
///
/// Runs on the async runtime thread and feeds every session event to the
/// coordinator in arrival order. Window and tray updates go back to the main
/// thread through `ui_proxy` because `TrayIcon` is `!Send` and must remain on
/// the UI thread.
pub struct App {
    pub(crate) coordinator: LiveCoordinator,
    pub(crate) events_rx: mpsc::Receiver<SessionEvent>,
    pub(crate) ui_proxy: EventLoopProxy<UiCommand>,
    pub(crate) shutdown_tx: watch::Sender<bool>,
    pub(crate) manage_menu_id: MenuId,
    pub(crate) exit_menu_id: MenuId,
}

impl App {
    /// Run the main application event loop.
    #[instrument(skip(self))]
    pub(crate) async fn run(mut self) -> AppResult<()> {
        info!("Quick Action starting");

        // MenuEvent::receiver() is a blocking crossbeam receiver; one blocking
        // task forwards it and exits on the first send after the loop ends.
        let (tray_event_tx, mut tray_event_rx) = mpsc::channel(32);
        let tray_handle = tokio::task::spawn_blocking(move || {
            let receiver = MenuEvent::receiver();
            while let Ok(event) = receiver.recv() {
                if tray_event_tx.blocking_send(event).is_err() {
                    break;
                }
            }
        });

        loop {
            tokio::select! {
                Some(event) = tray_event_rx.recv() => {
                    if let Some(event) = self.tray_event(&event) {
                        if !self.coordinator.handle(event) {
                            break;
                        }
                    }
                }

                Some(event) = self.events_rx.recv() => {
                    if !self.coordinator.handle(event) {
                        break;
                    }
                }

                else => {
                    info!("All channels closed, shutting down");
                    self.coordinator.handle(SessionEvent::Shutdown);
                    break;
                }
            }
        }

        drop(tray_event_rx);

        match tokio::time::timeout(std::time::Duration::from_secs(1), tray_handle).await {
            Ok(Ok(())) => info!("Tray event forwarder stopped cleanly"),
            Ok(Err(e)) => error!(error = ?e, "Tray event forwarder task panicked"),
            Err(_) => info!(
                "Tray event forwarder did not stop within timeout, \
                     will be cleaned up on exit"
            ),
        }

        let _ = self.shutdown_tx.send(true);
        let _ = self.ui_proxy.send_event(UiCommand::Shutdown);
        info!("Quick Action shut down successfully");

        Ok(())
    }

    /// Map a tray menu click to a session event.
    fn tray_event(&self, event: &MenuEvent) -> Option<SessionEvent> {
        if event.id == self.manage_menu_id {
            Some(SessionEvent::OpenManagement)
        } else if event.id == self.exit_menu_id {
            info!("Exit requested from tray menu");
            Some(SessionEvent::Shutdown)
        } else {
            None
        }
    }
}
