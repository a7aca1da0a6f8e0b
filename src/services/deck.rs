use std::fs;
use std::path::Path;

use log::info;

use crate::error::{LexideckError, Result};
use crate::model::entry::WordEntry;
use crate::model::note::Note;
use crate::services::{anki, render};

pub struct DeckConfig<'a> {
    /// Display name of the deck inside the flashcard application.
    pub name: &'a str,
    /// Location of the persisted note set.
    pub notes_path: &'a Path,
    /// Location of the packaged deck artifact.
    pub package_path: &'a Path,
}

/// Loads the persisted note set, or an empty one when no file exists
/// yet. A file that exists but does not parse is fatal: silently
/// resetting it would drop the user's accumulated deck.
pub fn load_notes(path: &Path) -> Result<Vec<Note>> {
    if !path.exists() {
        info!("no existing note found, the deck is built from scratch");
        return Ok(Vec::new());
    }

    let data = fs::read_to_string(path)?;
    let notes = serde_json::from_str(&data).map_err(|source| LexideckError::CorruptNoteSet {
        path: path.to_path_buf(),
        source,
    })?;

    info!("existing notes are loaded to build the deck");
    Ok(notes)
}

/// Writes the whole note set back, creating parent directories as
/// needed. The file is always the full accumulated set, never a delta.
pub fn save_notes(notes: &[Note], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(notes)?)?;
    Ok(())
}

/// Merges freshly rendered notes into the accumulated set. Exact
/// duplicates are never appended, whether they come from a previous run
/// or from the same one; survivors keep their arrival order.
pub fn merge_notes(existing: Vec<Note>, entries: &[WordEntry]) -> Vec<Note> {
    let mut notes = existing;

    for entry in entries {
        let note = render::render_note(entry);
        if !notes.contains(&note) {
            notes.push(note);
        }
    }

    notes
}

/// Assembles and exports the deck: loads the persisted notes, appends
/// the new ones, persists the full set and packages one card per
/// accumulated note (not just the new ones). Returns the accumulated
/// set.
pub fn generate_deck(entries: &[WordEntry], cfg: &DeckConfig) -> Result<Vec<Note>> {
    let notes = merge_notes(load_notes(cfg.notes_path)?, entries);

    save_notes(&notes, cfg.notes_path)?;
    info!("all the notes are saved: {}", cfg.notes_path.display());

    anki::write_package(&notes, cfg.name, cfg.package_path)?;

    Ok(notes)
}
