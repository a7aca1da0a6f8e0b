use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use log::info;
use rusqlite::{params, Connection};
use serde_json::json;
use sha2::{Digest, Sha256};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::Result;
use crate::model::note::Note;

/// Fixed identifiers so that re-importing a regenerated deck updates the
/// existing notes instead of forking a second deck.
pub const DECK_ID: i64 = 1239922789;
pub const MODEL_ID: i64 = 1154577639;

const FIELD_SEPARATOR: char = '\u{1f}';

const CARD_CSS: &str = "\
.card {
  font-family: Arial;
  font-size: 18px;
  text-align: left;
  color: #333;
  background-color: #f8f9fa;
  padding: 20px;
}

.word {
  font-size: 24px;
  font-weight: bold;
  margin-bottom: 12px;
}

.type_word {
  font-style: italic;
  font-size: 18px;
  color: #555;
}

.group {
  margin-bottom: 16px;
}

.translation_title {
  font-weight: bold;
  font-style: italic;
  color: #888;
  margin-bottom: 6px;
}

.meaning {
  font-weight: bold;
  color: #007bff;
  margin-bottom: 5px;
}

ul {
  list-style-type: disc;
  margin-left: 20px;
}

i {
  color: #666;
}
";

/// Writes the packaged deck: a zip holding the SQLite collection plus an
/// empty media manifest. Parent directories are created, an existing
/// package is overwritten.
pub fn write_package(notes: &[Note], deck_name: &str, output_path: &Path) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let collection_path = collection_tmp_path(output_path);
    if collection_path.exists() {
        fs::remove_file(&collection_path)?;
    }

    let result = write_collection(notes, deck_name, &collection_path)
        .and_then(|_| zip_package(&collection_path, output_path));

    // The staging database is never left behind, even on failure.
    let _ = fs::remove_file(&collection_path);
    result?;

    info!("deck packaged: {}", output_path.display());
    Ok(())
}

fn collection_tmp_path(output_path: &Path) -> PathBuf {
    let mut path = output_path.to_path_buf();
    path.set_extension("anki2.tmp");
    path
}

fn write_collection(notes: &[Note], deck_name: &str, path: &Path) -> Result<()> {
    let conn = Connection::open(path)?;

    conn.execute_batch(
        "CREATE TABLE col (
            id integer primary key,
            crt integer not null,
            mod integer not null,
            scm integer not null,
            ver integer not null,
            dty integer not null,
            usn integer not null,
            ls integer not null,
            conf text not null,
            models text not null,
            decks text not null,
            dconf text not null,
            tags text not null
        );
        CREATE TABLE notes (
            id integer primary key,
            guid text not null,
            mid integer not null,
            mod integer not null,
            usn integer not null,
            tags text not null,
            flds text not null,
            sfld integer not null,
            csum integer not null,
            flags integer not null,
            data text not null
        );
        CREATE TABLE cards (
            id integer primary key,
            nid integer not null,
            did integer not null,
            ord integer not null,
            mod integer not null,
            usn integer not null,
            type integer not null,
            queue integer not null,
            due integer not null,
            ivl integer not null,
            factor integer not null,
            reps integer not null,
            lapses integer not null,
            left integer not null,
            odue integer not null,
            odid integer not null,
            flags integer not null,
            data text not null
        );
        CREATE TABLE revlog (
            id integer primary key,
            cid integer not null,
            usn integer not null,
            ease integer not null,
            ivl integer not null,
            lastIvl integer not null,
            factor integer not null,
            time integer not null,
            type integer not null
        );
        CREATE TABLE graves (
            usn integer not null,
            oid integer not null,
            type integer not null
        );
        CREATE INDEX ix_notes_usn on notes (usn);
        CREATE INDEX ix_cards_usn on cards (usn);
        CREATE INDEX ix_cards_nid on cards (nid);
        CREATE INDEX ix_cards_sched on cards (did, queue, due);
        CREATE INDEX ix_notes_csum on notes (csum);",
    )?;

    let now_secs = Utc::now().timestamp();
    let now_millis = Utc::now().timestamp_millis();

    conn.execute(
        "INSERT INTO col (id, crt, mod, scm, ver, dty, usn, ls, conf, models, decks, dconf, tags)
         VALUES (1, ?1, ?2, ?2, 11, 0, 0, 0, ?3, ?4, ?5, ?6, '{}')",
        params![
            now_secs,
            now_millis,
            conf_json().to_string(),
            models_json(now_secs).to_string(),
            decks_json(deck_name, now_secs).to_string(),
            dconf_json().to_string(),
        ],
    )?;

    for (i, note) in notes.iter().enumerate() {
        let note_id = now_millis + i as i64;
        let guid = note_guid(note);
        let flds = format!("{}{}{}", note.front, FIELD_SEPARATOR, note.back);

        conn.execute(
            "INSERT INTO notes (id, guid, mid, mod, usn, tags, flds, sfld, csum, flags, data)
             VALUES (?1, ?2, ?3, ?4, -1, '', ?5, ?6, ?7, 0, '')",
            params![
                note_id,
                guid,
                MODEL_ID,
                now_secs,
                flds,
                note.front,
                field_checksum(&note.front),
            ],
        )?;

        conn.execute(
            "INSERT INTO cards (id, nid, did, ord, mod, usn, type, queue, due,
                                ivl, factor, reps, lapses, left, odue, odid, flags, data)
             VALUES (?1, ?2, ?3, 0, ?4, -1, 0, 0, ?5, 0, 0, 0, 0, 0, 0, 0, 0, '')",
            params![now_millis + notes.len() as i64 + i as i64, note_id, DECK_ID, now_secs, i as i64 + 1],
        )?;
    }

    Ok(())
}

/// Stable per-note identity: re-exporting the same note set always
/// produces the same guids, so Anki treats it as an update.
fn note_guid(note: &Note) -> String {
    let mut hasher = Sha256::new();
    hasher.update(note.front.as_bytes());
    hasher.update([0x1f]);
    hasher.update(note.back.as_bytes());
    let digest = hasher.finalize();
    hex::encode(&digest[..8])
}

/// Integer checksum over the sort field, stored so Anki can find
/// duplicates without parsing the fields blob.
fn field_checksum(front: &str) -> i64 {
    let digest = Sha256::digest(front.as_bytes());
    let hex_prefix = hex::encode(&digest[..4]);
    i64::from_str_radix(&hex_prefix, 16).unwrap_or(0)
}

fn conf_json() -> serde_json::Value {
    json!({
        "activeDecks": [1],
        "addToCur": true,
        "collapseTime": 1200,
        "curDeck": 1,
        "curModel": MODEL_ID.to_string(),
        "dueCounts": true,
        "estTimes": true,
        "newBury": true,
        "newSpread": 0,
        "nextPos": 1,
        "sortBackwards": false,
        "sortType": "noteFld",
        "timeLim": 0
    })
}

fn models_json(now_secs: i64) -> serde_json::Value {
    json!({
        (MODEL_ID.to_string()): {
            "id": MODEL_ID,
            "name": "lexideck model",
            "type": 0,
            "mod": now_secs,
            "usn": -1,
            "sortf": 0,
            "did": DECK_ID,
            "tmpls": [{
                "name": "lexideck card",
                "ord": 0,
                "qfmt": "{{Front}}",
                "afmt": "{{Back}}",
                "did": null,
                "bqfmt": "",
                "bafmt": ""
            }],
            "flds": [
                {"name": "Front", "ord": 0, "sticky": false, "rtl": false,
                 "font": "Arial", "size": 20, "media": []},
                {"name": "Back", "ord": 1, "sticky": false, "rtl": false,
                 "font": "Arial", "size": 20, "media": []}
            ],
            "css": CARD_CSS,
            "latexPre": "\\documentclass[12pt]{article}\n\\special{papersize=3in,5in}\n\\usepackage[utf8]{inputenc}\n\\usepackage{amssymb,amsmath}\n\\pagestyle{empty}\n\\setlength{\\parindent}{0in}\n\\begin{document}\n",
            "latexPost": "\\end{document}",
            "req": [[0, "all", [0]]]
        }
    })
}

fn decks_json(deck_name: &str, now_secs: i64) -> serde_json::Value {
    json!({
        (DECK_ID.to_string()): {
            "id": DECK_ID,
            "name": deck_name,
            "desc": "",
            "mod": now_secs,
            "usn": -1,
            "collapsed": false,
            "browserCollapsed": false,
            "newToday": [0, 0],
            "revToday": [0, 0],
            "lrnToday": [0, 0],
            "timeToday": [0, 0],
            "dyn": 0,
            "extendNew": 0,
            "extendRev": 0,
            "conf": 1
        }
    })
}

fn dconf_json() -> serde_json::Value {
    json!({
        "1": {
            "id": 1,
            "name": "Default",
            "autoplay": true,
            "dyn": 0,
            "lapse": {
                "delays": [10], "leechAction": 0, "leechFails": 8,
                "minInt": 1, "mult": 0
            },
            "maxTaken": 60,
            "mod": 0,
            "new": {
                "bury": true, "delays": [1, 10], "initialFactor": 2500,
                "ints": [1, 4, 7], "order": 1, "perDay": 20, "separate": true
            },
            "replayq": true,
            "rev": {
                "bury": true, "ease4": 1.3, "fuzz": 0.05, "ivlFct": 1,
                "maxIvl": 36500, "minSpace": 1, "perDay": 100
            },
            "timer": 0,
            "usn": -1
        }
    })
}

fn zip_package(collection_path: &Path, output_path: &Path) -> Result<()> {
    let file = File::create(output_path)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file("collection.anki2", options)?;
    zip.write_all(&fs::read(collection_path)?)?;

    zip.start_file("media", options)?;
    zip.write_all(b"{}")?;

    zip.finish()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    fn note(front: &str, back: &str) -> Note {
        Note {
            front: front.to_string(),
            back: back.to_string(),
        }
    }

    #[test]
    fn package_contains_collection_and_media() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("decks").join("Test.apkg");

        write_package(&[note("f1", "b1"), note("f2", "b2")], "Test", &path).unwrap();

        let mut archive = ZipArchive::new(File::open(&path).unwrap()).unwrap();
        let names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        assert!(names.contains(&"collection.anki2".to_string()));
        assert!(names.contains(&"media".to_string()));

        let mut media = String::new();
        archive
            .by_name("media")
            .unwrap()
            .read_to_string(&mut media)
            .unwrap();
        assert_eq!(media, "{}");
    }

    #[test]
    fn collection_holds_one_note_and_card_per_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Test.apkg");
        let notes = vec![note("f1", "b1"), note("f2", "b2"), note("f3", "b3")];

        write_package(&notes, "Test", &path).unwrap();

        let mut archive = ZipArchive::new(File::open(&path).unwrap()).unwrap();
        let mut bytes = Vec::new();
        archive
            .by_name("collection.anki2")
            .unwrap()
            .read_to_end(&mut bytes)
            .unwrap();

        let db_path = dir.path().join("collection.anki2");
        fs::write(&db_path, &bytes).unwrap();
        let conn = Connection::open(&db_path).unwrap();

        let note_count: i64 = conn
            .query_row("SELECT count(*) FROM notes", [], |row| row.get(0))
            .unwrap();
        let card_count: i64 = conn
            .query_row("SELECT count(*) FROM cards", [], |row| row.get(0))
            .unwrap();
        assert_eq!(note_count, 3);
        assert_eq!(card_count, 3);

        let deck_name: String = conn
            .query_row("SELECT decks FROM col", [], |row| row.get(0))
            .unwrap();
        assert!(deck_name.contains("\"name\":\"Test\""));
    }

    #[test]
    fn guid_is_stable_and_distinguishes_notes() {
        let a = note("front", "back");
        let b = note("front", "back");
        let c = note("front", "other");

        assert_eq!(note_guid(&a), note_guid(&b));
        assert_ne!(note_guid(&a), note_guid(&c));
    }

    #[test]
    fn overwrites_an_existing_package() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Test.apkg");
        fs::write(&path, "old content").unwrap();

        write_package(&[note("f", "b")], "Test", &path).unwrap();

        assert!(ZipArchive::new(File::open(&path).unwrap()).is_ok());
    }

    #[test]
    fn staging_database_is_cleaned_up() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Test.apkg");

        write_package(&[note("f", "b")], "Test", &path).unwrap();

        assert!(!collection_tmp_path(&path).exists());
    }
}
