//! Global hotkey bridge.
//!
//! Registers one configurable key combination and turns each press into a
//! [`SessionEvent::Toggle`]. The bridge only enqueues; all state lives in the
//! coordinator.

use crate::{AppError, AppResult, SessionEvent};

use std::{panic::Location, str::FromStr, time::Duration};

use error_location::ErrorLocation;
use global_hotkey::{
    GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState,
    hotkey::HotKey,
};
use tokio::sync::{
    mpsc::{self, error::TrySendError},
    watch,
};
use tracing::{debug, info, instrument, warn};

/// Parse a combination such as `alt+space` or `ctrl+shift+k`.
#[track_caller]
pub fn parse_hotkey(combination: &str) -> AppResult<HotKey> {
    HotKey::from_str(combination).map_err(|e| AppError::HotkeyRegistrationFailed {
        reason: format!("Invalid hotkey '{}': {}", combination, e),
        location: ErrorLocation::from(Location::caller()),
    })
}

/// Forwards presses of one registered hotkey to the coordinator.
pub struct HotkeyHandler {
    hotkey_id: u32,
    events_tx: mpsc::Sender<SessionEvent>,
}

impl HotkeyHandler {
    /// Register `combination` as the global hotkey.
    ///
    /// Must be called on a thread with a message pump (e.g. the main thread
    /// running a `tao` event loop) so that `WM_HOTKEY` messages are
    /// dispatched on Windows. The returned [`GlobalHotKeyManager`] must be
    /// kept alive on that thread for the hotkey to remain registered.
    #[track_caller]
    #[instrument]
    pub fn register_hotkey(combination: &str) -> AppResult<(GlobalHotKeyManager, u32)> {
        let hotkey = parse_hotkey(combination)?;

        let manager =
            GlobalHotKeyManager::new().map_err(|e| AppError::HotkeyRegistrationFailed {
                reason: format!("Failed to create manager: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        manager
            .register(hotkey)
            .map_err(|e| AppError::HotkeyRegistrationFailed {
                reason: format!("Failed to register {}: {}", combination, e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!(hotkey = combination, "Global hotkey registered");

        Ok((manager, hotkey.id()))
    }

    /// Create a handler for a previously registered hotkey.
    ///
    /// The `hotkey_id` should come from [`Self::register_hotkey`]. This struct
    /// is `Send` and can live on any thread; it only listens on the global
    /// [`GlobalHotKeyEvent`] channel.
    pub fn new(hotkey_id: u32, events_tx: mpsc::Sender<SessionEvent>) -> Self {
        Self {
            hotkey_id,
            events_tx,
        }
    }

    /// Run the hotkey forwarding loop until a shutdown signal is received.
    #[instrument(skip(self))]
    pub async fn run(&self, mut shutdown_rx: watch::Receiver<bool>) -> AppResult<()> {
        let receiver = GlobalHotKeyEvent::receiver().clone();
        let (event_tx, mut event_rx) = mpsc::channel(32);

        // GlobalHotKeyEvent::receiver() is a blocking crossbeam receiver; one
        // blocking task forwards it. It exits on the first send after
        // event_rx is dropped.
        let handle = tokio::task::spawn_blocking(move || {
            while let Ok(event) = receiver.recv() {
                if event_tx.blocking_send(event).is_err() {
                    break;
                }
            }
        });

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    info!("Hotkey handler shutting down");
                    break;
                }
                Some(event) = event_rx.recv() => {
                    if let Err(e) = self.forward(event) {
                        warn!(error = ?e, "Coordinator stopped listening, hotkey handler exiting");
                        break;
                    }
                }
            }
        }

        drop(event_rx);

        // The blocking task may sit in recv() until the next hotkey event.
        match tokio::time::timeout(Duration::from_secs(1), handle).await {
            Ok(Ok(())) => debug!("Hotkey event forwarder stopped cleanly"),
            Ok(Err(e)) => warn!(error = ?e, "Hotkey event forwarder task panicked"),
            Err(_) => debug!(
                "Hotkey event forwarder did not stop within timeout, \
                   will be cleaned up on exit"
            ),
        }

        Ok(())
    }

    /// Enqueue a toggle for a press of our hotkey. Never blocks: when the
    /// queue is full the press is dropped.
    #[track_caller]
    pub fn forward(&self, event: GlobalHotKeyEvent) -> AppResult<()> {
        if event.id != self.hotkey_id || event.state != HotKeyState::Pressed {
            return Ok(());
        }

        match self.events_tx.try_send(SessionEvent::Toggle) {
            Ok(()) => {
                debug!("Toggle enqueued");
                Ok(())
            }
            Err(TrySendError::Full(_)) => {
                warn!("Event queue full, hotkey press dropped");
                Ok(())
            }
            Err(TrySendError::Closed(_)) => Err(AppError::ChannelSendFailed {
                message: "Session event channel closed".to_string(),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }
}
