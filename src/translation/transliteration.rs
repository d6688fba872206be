/*!
 * Phonetic transliteration of CJK text.
 *
 * The segmenter treats transliteration as an opaque string produced by a
 * `Transliterator`. The bundled `ReadingTable` maps single characters to
 * readings loaded from a tab-separated file (`字<TAB>zì`), which is enough
 * for pinyin, jyutping or romaji tables.
 */

use anyhow::{Context, Result};
use log::{debug, warn};
use std::collections::HashMap;
use std::fmt::Debug;
use std::path::Path;

/// Generates a romanization for a CJK-only string
pub trait Transliterator: Send + Sync + Debug {
    fn generate(&self, cjk_text: &str) -> String;
}

/// Character-to-reading lookup table
#[derive(Debug, Clone, Default)]
pub struct ReadingTable {
    readings: HashMap<char, String>,
}

impl ReadingTable {
    /// Create an empty table; every character passes through unchanged
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a table from tab-separated `char<TAB>reading` lines.
    /// Blank lines and lines starting with `#` are ignored; the first
    /// reading listed for a character wins.
    pub fn parse(contents: &str) -> Self {
        let mut readings = HashMap::new();
        for (line_no, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut parts = line.splitn(2, '\t');
            let key = parts.next().unwrap_or_default().trim();
            let reading = parts.next().unwrap_or_default().trim();

            let mut chars = key.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if !reading.is_empty() => {
                    readings.entry(c).or_insert_with(|| reading.to_string());
                }
                _ => warn!("Skipping malformed reading table line {}: {:?}", line_no + 1, line),
            }
        }
        Self { readings }
    }

    /// Load a table from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read transliteration table: {:?}", path))?;
        let table = Self::parse(&contents);
        debug!("Loaded {} readings from {:?}", table.len(), path);
        Ok(table)
    }

    /// Add or replace a reading
    pub fn insert(&mut self, c: char, reading: impl Into<String>) {
        self.readings.insert(c, reading.into());
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }
}

impl Transliterator for ReadingTable {
    /// Readings separated by spaces; unknown characters are kept as-is
    fn generate(&self, cjk_text: &str) -> String {
        cjk_text
            .chars()
            .map(|c| match self.readings.get(&c) {
                Some(reading) => reading.clone(),
                None => c.to_string(),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}
