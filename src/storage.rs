//! Card store: loads an ordered, immutable deck from CSV or JSON.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::models::Card;

/// Bundled deck used when no deck path is configured.
const BUNDLED_CAPITALS: &str = include_str!("../bundled_decks/world-capitals.csv");
const BUNDLED_TITLE: &str = "World Capitals";

/// Ordered deck of cards, keyed by position.
#[derive(Debug, Clone)]
pub struct CardStore {
    title: String,
    cards: Vec<Card>,
}

/// One deck row, shared by the CSV and JSON readers.
///
/// Every field is optional here so that incomplete rows can be skipped
/// instead of failing the whole deck.
#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(default)]
    front: Option<String>,
    #[serde(default)]
    back: Option<String>,
    #[serde(default)]
    extra: Option<String>,
}

impl CardStore {
    /// Build a store from already-validated cards, renumbering ids by position.
    pub fn from_cards(title: impl Into<String>, cards: Vec<Card>) -> Self {
        let cards = cards
            .into_iter()
            .enumerate()
            .map(|(id, card)| Card { id, ..card })
            .collect();
        Self {
            title: title.into(),
            cards,
        }
    }

    /// The deck that ships with the binary.
    pub fn bundled() -> Result<Self> {
        Self::from_csv_str(BUNDLED_TITLE, BUNDLED_CAPITALS)
            .context("Failed to parse bundled deck")
    }

    /// Load a deck file, choosing the parser by extension.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read deck file: {:?}", path))?;

        let title = path
            .file_stem()
            .and_then(|s| s.to_str())
            .map(filename_to_title_case)
            .unwrap_or_else(|| "Deck".to_string());

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        let store = match ext.as_deref() {
            Some("json") => Self::from_json_str(&title, &content),
            Some("csv") | None => Self::from_csv_str(&title, &content),
            Some(other) => bail!("Unsupported deck format '.{}': {:?}", other, path),
        }
        .with_context(|| format!("Failed to parse deck file: {:?}", path))?;

        debug!(path = %path.display(), cards = store.len(), "deck loaded");
        Ok(store)
    }

    /// Load from an optional path, falling back to the bundled deck.
    pub fn load_or_bundled(path: Option<&PathBuf>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Self::bundled(),
        }
    }

    /// Parse a `Front,Back,Extra` CSV with a header row.
    pub fn from_csv_str(title: &str, content: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let headers = reader.headers()?.clone();
        let has_front = headers.iter().any(|h| h.eq_ignore_ascii_case("front"));
        let has_back = headers.iter().any(|h| h.eq_ignore_ascii_case("back"));
        if !has_front || !has_back {
            bail!("CSV header must contain Front and Back columns, found: {:?}", headers);
        }
        // Normalize header case so serde field names match.
        reader.set_headers(headers.iter().map(str::to_lowercase).collect());

        let mut cards = Vec::new();
        for (row, result) in reader.deserialize::<RawRecord>().enumerate() {
            let record = match result {
                Ok(r) => r,
                Err(e) => {
                    warn!(row = row + 2, error = %e, "skipping unreadable deck row");
                    continue;
                }
            };
            if let Some(card) = make_card(cards.len(), record.front, record.back, record.extra) {
                cards.push(card);
            } else {
                warn!(row = row + 2, "skipping deck row without front or back");
            }
        }

        Ok(Self::from_cards(title, cards))
    }

    /// Parse a JSON array of `{front, back, extra}` objects.
    pub fn from_json_str(title: &str, content: &str) -> Result<Self> {
        let records: Vec<RawRecord> = serde_json::from_str(content)?;

        let mut cards = Vec::new();
        for (i, record) in records.into_iter().enumerate() {
            match make_card(cards.len(), record.front, record.back, record.extra) {
                Some(card) => cards.push(card),
                None => warn!(entry = i, "skipping deck entry without front or back"),
            }
        }

        Ok(Self::from_cards(title, cards))
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn get(&self, id: usize) -> Option<&Card> {
        self.cards.get(id)
    }

    #[cfg(test)]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }
}

fn make_card(
    id: usize,
    front: Option<String>,
    back: Option<String>,
    extra: Option<String>,
) -> Option<Card> {
    let front = front.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())?;
    let back = back.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())?;
    Some(Card::new(id, front, back, extra.map(|s| s.trim().to_string())))
}

/// Convert a filename (snake_case or kebab-case) to Title Case.
fn filename_to_title_case(name: &str) -> String {
    name.split(|c| c == '_' || c == '-')
        .filter(|s| !s.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => {
                    first.to_uppercase().collect::<String>() + chars.as_str().to_lowercase().as_str()
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
