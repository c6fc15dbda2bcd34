//! Legacy-label → canonical topic/product mapping tables.

use crate::context::Language;
use crate::error::Result;
use crate::store::LedgerStore;
use std::collections::HashMap;

/// Suffix of the per-language mapping table (`en_map`, `de_map`).
pub const MAPPING_TABLE_SUFFIX: &str = "_map";

/// Mapping for one language. Keys are trimmed, lowercased legacy labels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageMapping {
    pub categories: HashMap<String, Vec<String>>,
    pub products: HashMap<String, Vec<String>>,
}

fn key(label: &str) -> String {
    label.trim().to_lowercase()
}

fn split_labels(csv: &str) -> Vec<String> {
    csv.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl LanguageMapping {
    /// Register a legacy label with its canonical topics and products
    /// (comma-separated lists).
    pub fn insert(&mut self, legacy: &str, topics_csv: &str, products_csv: &str) {
        let k = key(legacy);
        let topics = split_labels(topics_csv);
        let products = split_labels(products_csv);
        if !topics.is_empty() {
            self.categories.insert(k.clone(), topics);
        }
        if !products.is_empty() {
            self.products.insert(k, products);
        }
    }

    /// Build from raw table rows `(legacy, topics[, products])`.
    ///
    /// Rows without a topics column are skipped. When the products column is
    /// missing the topics column stands in for it.
    #[must_use]
    pub fn from_rows(rows: &[Vec<String>]) -> Self {
        let mut mapping = Self::default();
        for row in rows {
            if row.len() < 2 || row[0].trim().is_empty() {
                continue;
            }
            let products = row.get(2).unwrap_or(&row[1]);
            mapping.insert(&row[0], &row[1], products);
        }
        mapping
    }

    /// First canonical topic for a legacy label.
    #[must_use]
    pub fn topic(&self, label: &str) -> Option<&str> {
        self.categories
            .get(&key(label))
            .and_then(|v| v.first())
            .map(String::as_str)
    }

    /// First canonical product for a legacy label.
    #[must_use]
    pub fn product(&self, label: &str) -> Option<&str> {
        self.products
            .get(&key(label))
            .and_then(|v| v.first())
            .map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.products.is_empty()
    }
}

/// Mappings for every output language. Read-only once loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingTable {
    pub en: LanguageMapping,
    pub de: LanguageMapping,
}

impl MappingTable {
    #[must_use]
    pub fn for_language(&self, language: Language) -> &LanguageMapping {
        match language {
            Language::En => &self.en,
            Language::De => &self.de,
        }
    }

    pub fn for_language_mut(&mut self, language: Language) -> &mut LanguageMapping {
        match language {
            Language::En => &mut self.en,
            Language::De => &mut self.de,
        }
    }
}

/// Table name holding the mapping for `language`.
#[must_use]
pub fn table_name(language: Language) -> String {
    format!("{}{MAPPING_TABLE_SUFFIX}", language.as_str())
}

/// Load the mapping tables of every language from the ledger store.
pub async fn load(ledger: &dyn LedgerStore) -> Result<MappingTable> {
    let mut table = MappingTable::default();
    for language in Language::ALL {
        let name = table_name(language);
        let rows = ledger.get_rows(&name).await?;
        if rows.is_empty() {
            tracing::warn!("Mapping table {name} is empty, {language} topics will pass through");
        }
        *table.for_language_mut(language) = LanguageMapping::from_rows(&rows);
        tracing::debug!("Loaded {} mapping rows for {language}", rows.len());
    }
    Ok(table)
}
