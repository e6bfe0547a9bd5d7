use crate::{CoreError, CoreResult, dispatch::Launcher, registry::Registry};

use std::sync::Arc;

use tracing::{error, info, instrument};

/// Split committed input on its first space into `(prefix, value)`.
///
/// Without a space the whole input is the prefix and the value is empty.
pub fn resolve(input: &str) -> (&str, &str) {
    input.split_once(' ').unwrap_or((input, ""))
}

/// Outcome of one dispatch batch.
#[derive(Debug, Default)]
pub struct DispatchReport {
    /// Number of registry matches.
    pub matched: usize,
    /// Number of processes successfully started.
    pub launched: usize,
    /// One entry per command that failed to start.
    pub failures: Vec<CoreError>,
}

/// Resolves committed input against the registry and launches the matches.
pub struct DispatchEngine {
    registry: Arc<Registry>,
    launcher: Arc<dyn Launcher>,
}

impl DispatchEngine {
    /// Engine looking up in `registry` and starting through `launcher`.
    pub fn new(registry: Arc<Registry>, launcher: Arc<dyn Launcher>) -> Self {
        Self { registry, launcher }
    }

    /// Launch every command registered for `input`.
    ///
    /// Zero matches is a no-op. A launch failure is recorded in the report
    /// and the remaining commands still start.
    ///
    /// # Errors
    ///
    /// Only a failed registry lookup is returned as an error.
    #[instrument(skip(self))]
    pub fn execute(&self, input: &str) -> CoreResult<DispatchReport> {
        let (prefix, value) = resolve(input);
        let commands = self.registry.lookup(prefix, value)?;

        let mut report = DispatchReport {
            matched: commands.len(),
            ..DispatchReport::default()
        };

        for resolved in commands {
            match self.launcher.launch(&resolved.command, resolved.run_mode) {
                Ok(()) => report.launched += 1,
                Err(e) => {
                    error!(error = %e, "Command failed to launch");
                    report.failures.push(e);
                }
            }
        }

        info!(
            prefix,
            value,
            matched = report.matched,
            launched = report.launched,
            failed = report.failures.len(),
            "Dispatch complete"
        );

        Ok(report)
    }
}
