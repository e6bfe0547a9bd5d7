//! Command management over a terminal.
//!
//! Backs the `list`/`add`/`delete` subcommands and the interactive `manage`
//! loop that the `11` sentinel opens. Rows are addressed by their position
//! in the last listing shown, resolved to the entry's id and re-read from
//! the registry before anything is deleted.

use crate::{AppError, AppResult};

use quick_action_core::{
    CoreError,
    registry::{CommandEntry, EntryId, Registry, RunMode},
};

use std::io::{BufRead, Write};

use tracing::{info, instrument};

/// Print every entry as a numbered table.
pub fn list<W: Write>(registry: &Registry, out: &mut W) -> AppResult<()> {
    show(registry, out)?;
    Ok(())
}

/// Print the table and return the ids in display order.
fn show<W: Write>(registry: &Registry, out: &mut W) -> AppResult<Vec<EntryId>> {
    let entries = registry.all()?;
    write_table(&entries, out)?;
    Ok(entries.iter().map(|entry| entry.id).collect())
}

/// Register one command and report its id.
#[instrument(skip(registry, out))]
pub fn add<W: Write>(
    registry: &Registry,
    prefix: &str,
    value: &str,
    command: &str,
    run_mode: RunMode,
    out: &mut W,
) -> AppResult<()> {
    let id = registry.add(prefix, value, command, run_mode)?;
    info!(id, "Command added");
    writeln!(out, "Added #{}: {} -> {} ({})", id, input_of(prefix, value), command, run_mode)?;
    Ok(())
}

/// Remove every entry matching the full tuple and report how many went.
#[instrument(skip(registry, out))]
pub fn delete<W: Write>(
    registry: &Registry,
    prefix: &str,
    value: &str,
    command: &str,
    run_mode: RunMode,
    out: &mut W,
) -> AppResult<()> {
    let removed = registry.delete(prefix, value, command, run_mode)?;
    info!(removed, "Commands deleted");
    writeln!(out, "Removed {} entr{}", removed, if removed == 1 { "y" } else { "ies" })?;
    Ok(())
}

/// Interactive loop: `list`, `add`, `delete <n>`, `help`, `quit`.
///
/// Returns on `quit` or end of input.
pub fn interactive<R: BufRead, W: Write>(
    registry: &Registry,
    input: &mut R,
    out: &mut W,
) -> AppResult<()> {
    writeln!(out, "Quick Action command manager. Type `help` for commands.")?;
    // Numbers typed by the user refer to this listing until the next one.
    let mut shown = show(registry, out)?;

    loop {
        let Some(line) = prompt(input, out, "> ")? else {
            return Ok(());
        };

        let mut words = line.split_whitespace();
        match (words.next(), words.next()) {
            (None, _) => {}
            (Some("list" | "ls"), _) => shown = show(registry, out)?,
            (Some("add"), _) => add_interactive(registry, input, out)?,
            (Some("delete" | "rm"), Some(n)) => delete_numbered(registry, &shown, n, out)?,
            (Some("delete" | "rm"), None) => writeln!(out, "Usage: delete <n>")?,
            (Some("help" | "?"), _) => write_help(out)?,
            (Some("quit" | "exit" | "q"), _) => return Ok(()),
            (Some(other), _) => writeln!(out, "Unknown command `{}`. Type `help`.", other)?,
        }
    }
}

fn add_interactive<R: BufRead, W: Write>(
    registry: &Registry,
    input: &mut R,
    out: &mut W,
) -> AppResult<()> {
    let Some(prefix) = prompt(input, out, "prefix: ")? else {
        return Ok(());
    };
    let Some(value) = prompt(input, out, "value (optional): ")? else {
        return Ok(());
    };
    let Some(command) = prompt(input, out, "command: ")? else {
        return Ok(());
    };
    let Some(silent) = prompt(input, out, "run silently? [y/N]: ")? else {
        return Ok(());
    };

    let run_mode = if matches!(silent.to_ascii_lowercase().as_str(), "y" | "yes") {
        RunMode::Silent
    } else {
        RunMode::Visible
    };

    match add(registry, &prefix, &value, &command, run_mode, out) {
        Err(AppError::Core {
            source: CoreError::Validation { field, .. },
            ..
        }) => writeln!(out, "Not added: {} must not be empty", field)?,
        other => other?,
    }

    Ok(())
}

/// Delete the entry shown as number `n` (1-based) in the last listing.
fn delete_numbered<W: Write>(
    registry: &Registry,
    shown: &[EntryId],
    n: &str,
    out: &mut W,
) -> AppResult<()> {
    let id = n
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|index| shown.get(index));

    let Some(&id) = id else {
        writeln!(out, "No entry number {}", n)?;
        return Ok(());
    };

    match registry.get(id)? {
        Some(entry) => delete(
            registry,
            &entry.prefix,
            &entry.value,
            &entry.command,
            entry.run_mode,
            out,
        ),
        None => {
            writeln!(out, "Entry {} was already removed. Type `list` to refresh.", n)?;
            Ok(())
        }
    }
}

/// Read one trimmed line after printing `label`. `None` at end of input.
fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W, label: &str) -> AppResult<Option<String>> {
    write!(out, "{}", label)?;
    out.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn write_table<W: Write>(entries: &[CommandEntry], out: &mut W) -> AppResult<()> {
    if entries.is_empty() {
        writeln!(out, "No commands registered.")?;
        return Ok(());
    }

    for (n, entry) in entries.iter().enumerate() {
        writeln!(
            out,
            "{:>3}. {:<24} {:<8} {}",
            n + 1,
            input_of(&entry.prefix, &entry.value),
            entry.run_mode,
            entry.command
        )?;
    }
    Ok(())
}

fn write_help<W: Write>(out: &mut W) -> AppResult<()> {
    writeln!(out, "  list        show registered commands")?;
    writeln!(out, "  add         register a command (prompts for each field)")?;
    writeln!(out, "  delete <n>  remove entry number n and its exact duplicates")?;
    writeln!(out, "  quit        leave")?;
    Ok(())
}

/// The input text that triggers an entry.
fn input_of(prefix: &str, value: &str) -> String {
    if value.is_empty() {
        prefix.to_string()
    } else {
        format!("{} {}", prefix, value)
    }
}
