use std::env::{self, VarError};
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{LexideckError, Result};

pub const DEFAULT_API_URL: &str = "https://linguee-api.fly.dev/api/v2/translations";
pub const DEFAULT_DECK_NAME: &str = "Lexideck";
pub const DEFAULT_WORDS_LIMIT: usize = 5;

/// How the API should react when it suggests a spelling correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowCorrections {
    Never,
    Always,
    OnEmptyTranslations,
}

impl FollowCorrections {
    pub fn as_str(&self) -> &'static str {
        match self {
            FollowCorrections::Never => "never",
            FollowCorrections::Always => "always",
            FollowCorrections::OnEmptyTranslations => "on_empty_translations",
        }
    }
}

impl FromStr for FollowCorrections {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "never" => Ok(FollowCorrections::Never),
            "always" => Ok(FollowCorrections::Always),
            "on_empty_translations" => Ok(FollowCorrections::OnEmptyTranslations),
            other => Err(format!(
                "expected one of never/always/on_empty_translations, got '{other}'"
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    /// Source language code, e.g. "en".
    pub src: String,
    /// Target language code, e.g. "fr".
    pub dst: String,
    /// Maximum number of words pulled from the input list per run.
    pub words_limit: usize,
    pub deck_name: String,
    pub api_url: String,
    pub guess_direction: bool,
    pub follow_corrections: FollowCorrections,
}

impl Settings {
    /// Reads all settings from `LEXIDECK_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(Settings {
            src: read_env_var("LEXIDECK_SRC")?,
            dst: read_env_var("LEXIDECK_DST")?,
            words_limit: read_env_var_or("LEXIDECK_WORDS_LIMIT", DEFAULT_WORDS_LIMIT)?,
            deck_name: read_env_var_with_default("LEXIDECK_DECK_NAME", DEFAULT_DECK_NAME)?,
            api_url: read_env_var_with_default("LEXIDECK_API_URL", DEFAULT_API_URL)?,
            guess_direction: read_env_var_or("LEXIDECK_GUESS_DIRECTION", false)?,
            follow_corrections: read_env_var_or(
                "LEXIDECK_FOLLOW_CORRECTIONS",
                FollowCorrections::Never,
            )?,
        })
    }

    pub fn input_path(&self) -> PathBuf {
        PathBuf::from(format!("data/{}_{}/input_words.csv", self.src, self.dst))
    }

    pub fn output_folder(&self) -> PathBuf {
        PathBuf::from(format!("outputs/{}_{}", self.src, self.dst))
    }

    pub fn errors_path(&self) -> PathBuf {
        self.output_folder().join("errors.csv")
    }

    pub fn history_path(&self) -> PathBuf {
        self.output_folder().join("history.csv")
    }

    pub fn notes_path(&self) -> PathBuf {
        self.output_folder().join(format!("{}.json", self.deck_name))
    }

    pub fn deck_path(&self) -> PathBuf {
        self.output_folder().join(format!("{}.apkg", self.deck_name))
    }
}

fn read_env_var(key: &str) -> Result<String> {
    env::var(key).map_err(|error| match error {
        VarError::NotPresent => LexideckError::MissingEnvVar {
            key: key.to_string(),
        },
        VarError::NotUnicode(value) => LexideckError::MalformedEnvVar {
            key: key.to_string(),
            value: value.to_string_lossy().into_owned(),
            reason: "not valid unicode".to_string(),
        },
    })
}

fn read_env_var_with_default(key: &str, default: &str) -> Result<String> {
    match env::var(key) {
        Ok(value) => Ok(value),
        Err(VarError::NotPresent) => Ok(default.to_string()),
        Err(VarError::NotUnicode(value)) => Err(LexideckError::MalformedEnvVar {
            key: key.to_string(),
            value: value.to_string_lossy().into_owned(),
            reason: "not valid unicode".to_string(),
        }),
    }
}

fn read_env_var_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(value) => value.parse().map_err(|error: <T as FromStr>::Err| {
            LexideckError::MalformedEnvVar {
                key: key.to_string(),
                value,
                reason: error.to_string(),
            }
        }),
        Err(VarError::NotPresent) => Ok(default),
        Err(VarError::NotUnicode(value)) => Err(LexideckError::MalformedEnvVar {
            key: key.to_string(),
            value: value.to_string_lossy().into_owned(),
            reason: "not valid unicode".to_string(),
        }),
    }
}
