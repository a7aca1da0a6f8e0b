use std::{thread, time::Duration};

use log::{debug, warn};
use rand::{thread_rng, Rng};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;

use crate::config::Settings;
use crate::error::Result;
use crate::model::entry::{self, WordEntry};

const TIMEOUT_SECS: u64 = 10;
// Polite pacing towards the upstream service: every request waits a
// random delay drawn from this range first.
const PAUSE_MIN_SECS: f64 = 5.0;
const PAUSE_MAX_SECS: f64 = 8.0;

/// One word that could not be translated, with a human-readable reason.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct TranslationFailure {
    pub word: String,
    pub error: String,
}

/// Queries the translation API for every word, strictly one at a time.
///
/// Returns the per-word batches of validated senses plus the failures.
/// A failing word never aborts the run; it is recorded and the loop
/// moves on to the next word.
pub fn fetch_translations(
    words: &[String],
    settings: &Settings,
) -> Result<(Vec<Vec<WordEntry>>, Vec<TranslationFailure>)> {
    let client = Client::builder()
        .timeout(Duration::from_secs(TIMEOUT_SECS))
        .build()?;

    let mut batches: Vec<Vec<WordEntry>> = Vec::new();
    let mut failures: Vec<TranslationFailure> = Vec::new();

    for word in words {
        pause();

        match fetch_word(&client, word, settings) {
            Ok(batch) => batches.push(batch),
            Err(error) => {
                warn!("failed to fetch the word '{word}': {error}");
                failures.push(TranslationFailure {
                    word: word.clone(),
                    error,
                });
            }
        }
    }

    Ok((batches, failures))
}

fn pause() {
    let wait = thread_rng().gen_range(PAUSE_MIN_SECS..PAUSE_MAX_SECS);
    debug!("pacing: sleeping {wait:.1}s before next request");
    thread::sleep(Duration::from_secs_f64(wait));
}

fn fetch_word(
    client: &Client,
    word: &str,
    settings: &Settings,
) -> std::result::Result<Vec<WordEntry>, String> {
    let guess_direction = settings.guess_direction.to_string();
    let response = client
        .get(&settings.api_url)
        .query(&[
            ("query", word),
            ("src", settings.src.as_str()),
            ("dst", settings.dst.as_str()),
            ("guess_direction", guess_direction.as_str()),
            ("follow_corrections", settings.follow_corrections.as_str()),
        ])
        .send()
        .map_err(|e| e.to_string())?;

    if response.status() == StatusCode::INTERNAL_SERVER_ERROR {
        return Err("500 error, please check the spelling".to_string());
    }

    let response = response.error_for_status().map_err(|e| e.to_string())?;

    let data: Vec<Value> = response.json().map_err(|e| e.to_string())?;

    entry::parse_batch(&data).map_err(|e| e.to_string())
}
