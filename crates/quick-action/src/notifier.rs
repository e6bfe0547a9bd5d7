use quick_action_core::CoreError;

use tracing::warn;

/// Reports launch problems to the user.
pub trait Notifier: Send + Sync {
    fn launch_failed(&self, error: &CoreError);
}

/// Desktop notifications via the platform notification service.
#[derive(Debug, Default)]
pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    fn launch_failed(&self, error: &CoreError) {
        let body = match error {
            CoreError::LaunchFailed { command, source, .. } => {
                format!("Could not start `{}`: {}", command, source)
            }
            other => other.to_string(),
        };

        if let Err(e) = notify_rust::Notification::new()
            .summary("Quick Action")
            .body(&body)
            .show()
        {
            warn!(error = %e, "Failed to show notification");
        }
    }
}
