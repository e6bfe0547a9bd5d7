//! From committed input to started processes.

mod engine;
mod launcher;

pub use {
    engine::{DispatchEngine, DispatchReport, resolve},
    launcher::{DEFAULT_TERMINAL, Launcher, ShellLauncher},
};
