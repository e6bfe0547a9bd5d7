//! Persisted `(prefix, value) -> command` mapping.

mod entry;
mod store;

pub use {
    entry::{CommandEntry, EntryId, ResolvedCommand, RunMode},
    store::Registry,
};
