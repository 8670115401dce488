//! Cast and crew metadata, its gallery layout and thumbnails
//!
//! The cast table is scraped once per movie and persisted as a JSON side-file
//! so it can be inspected or reused by later runs.

pub mod gallery;
pub mod imdb;
pub mod thumbnail;

pub use gallery::{build_pages, GalleryPage};
pub use imdb::ImdbScraper;
pub use thumbnail::{HttpThumbnailFetcher, Thumbnail, ThumbnailFetcher};

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::info;

/// A cast or crew member as listed on the credits page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastEntry {
    pub name: String,
    pub character: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SideFileDetails {
    character: String,
    image_url: Option<String>,
}

/// Cast entries in source order, unique by name.
/// A repeated name updates the existing entry in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CastTable {
    entries: Vec<CastEntry>,
}

impl CastTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entry: CastEntry) {
        match self.entries.iter_mut().find(|e| e.name == entry.name) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    pub fn entries(&self) -> &[CastEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `{ name: { character, image_url } }` in table order
    pub fn to_json(&self) -> Result<String> {
        let mut map = Map::new();
        for entry in &self.entries {
            let details = SideFileDetails {
                character: entry.character.clone(),
                image_url: entry.image_url.clone(),
            };
            map.insert(entry.name.clone(), serde_json::to_value(details)?);
        }
        Ok(serde_json::to_string_pretty(&Value::Object(map))?)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let map: Map<String, Value> = serde_json::from_str(content)?;
        let mut table = Self::new();
        for (name, details) in map {
            let details: SideFileDetails = serde_json::from_value(details)?;
            table.insert(CastEntry {
                name,
                character: details.character,
                image_url: details.image_url,
            });
        }
        Ok(table)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        info!("💾 Cast information saved to: {}", path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let table = Self::from_json(&content)
            .map_err(|e| Error::InvalidInput(format!("corrupt cast file {}: {}", path.display(), e)))?;
        info!("📁 Loaded {} cast entries from {}", table.len(), path.display());
        Ok(table)
    }
}

impl FromIterator<CastEntry> for CastTable {
    fn from_iter<I: IntoIterator<Item = CastEntry>>(iter: I) -> Self {
        let mut table = Self::new();
        for entry in iter {
            table.insert(entry);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry(name: &str, character: &str, image: Option<&str>) -> CastEntry {
        CastEntry {
            name: name.to_string(),
            character: character.to_string(),
            image_url: image.map(str::to_string),
        }
    }

    #[test]
    fn test_insert_keeps_first_position() {
        let table: CastTable = vec![
            entry("Leonardo DiCaprio", "Cobb", None),
            entry("Elliot Page", "Ariadne", None),
            entry("Leonardo DiCaprio", "Dom Cobb", Some("https://img/leo.jpg")),
        ]
        .into_iter()
        .collect();

        assert_eq!(table.len(), 2);
        assert_eq!(table.entries()[0].character, "Dom Cobb");
        assert_eq!(table.entries()[1].name, "Elliot Page");
    }

    #[test]
    fn test_json_preserves_insertion_order() {
        let table: CastTable = vec![
            entry("Zoe", "Z", None),
            entry("Adam", "A", Some("https://img/a.jpg")),
        ]
        .into_iter()
        .collect();

        let json = table.to_json().unwrap();
        assert!(json.find("Zoe").unwrap() < json.find("Adam").unwrap());
        assert!(json.contains("\"image_url\": null"));

        let parsed = CastTable::from_json(&json).unwrap();
        assert_eq!(parsed, table);
    }

    #[test]
    fn test_side_file_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("full_cast_crew.json");
        let table: CastTable = vec![entry("Tom Hardy", "Eames", None)].into_iter().collect();

        table.save(&path).unwrap();
        assert_eq!(CastTable::load(&path).unwrap(), table);

        std::fs::write(&path, "[1, 2, 3]").unwrap();
        assert!(matches!(CastTable::load(&path), Err(Error::InvalidInput(_))));
    }
}
