use log::{error, info};

mod config;
mod error;
mod model;
mod services;

use config::Settings;
use error::Result;
use services::{api, deck, normalize, wordlist};

fn run(settings: &Settings) -> Result<()> {
    let words = wordlist::read_input_words(&settings.input_path(), settings.words_limit)?;
    info!("{} loaded words", words.len());

    let (batches, failures) = api::fetch_translations(&words, settings)?;
    info!(
        "API returned {} translations and {} errors",
        batches.len(),
        failures.len()
    );

    let entries = normalize::normalize(batches);
    info!("data preprocessing is done");

    deck::generate_deck(
        &entries,
        &deck::DeckConfig {
            name: &settings.deck_name,
            notes_path: &settings.notes_path(),
            package_path: &settings.deck_path(),
        },
    )?;
    info!(
        "the {} deck generated: {}",
        settings.deck_name,
        settings.deck_path().display()
    );

    if !entries.is_empty() {
        let translated: Vec<String> = entries.iter().map(|e| e.text.clone()).collect();

        let mut to_remove = translated.clone();
        to_remove.extend(failures.iter().map(|f| f.word.clone()));
        wordlist::remove_words(&to_remove, &settings.input_path())?;
        info!(
            "translated words are removed from the original file: {}",
            settings.input_path().display()
        );

        wordlist::append_history(&translated, &settings.history_path())?;
        info!(
            "translated words are saved in the history file: {}",
            settings.history_path().display()
        );
    }

    if !failures.is_empty() {
        wordlist::append_errors(&failures, &settings.errors_path())?;
        info!("errors exported: {}", settings.errors_path().display());
    }

    Ok(())
}

fn main() {
    env_logger::init();
    info!("starting of the application");

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            error!("error while loading settings from the environment: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&settings) {
        error!("application crashed due to an unexpected error: {e}");
        std::process::exit(1);
    }
}
