//! Quick-action core library
//!
//! Command registry, voice capture and dispatch for a hotkey launcher.
//! Committed input is split into `prefix value`, looked up in a SQLite
//! registry, and every match is launched through the system shell.
//!
//! # Example
//!
//! ```no_run
//! use quick_action_core::{
//!     CoreResult,
//!     dispatch::{DispatchEngine, ShellLauncher},
//!     registry::{Registry, RunMode},
//! };
//!
//! use std::{path::Path, sync::Arc};
//!
//! fn main() -> CoreResult<()> {
//!     let registry = Arc::new(Registry::open(Path::new("actions.db"))?);
//!     registry.add("open", "browser", "firefox", RunMode::Silent)?;
//!
//!     let engine = DispatchEngine::new(registry, Arc::new(ShellLauncher::default()));
//!     let report = engine.execute("open browser")?;
//!
//!     println!("Launched {} of {}", report.launched, report.matched);
//!     Ok(())
//! }
//! ```

pub mod audio;
pub mod dispatch;
mod error;
pub mod registry;
pub mod voice;

pub use error::{CoreError, Result as CoreResult};

#[cfg(test)]
mod tests;
