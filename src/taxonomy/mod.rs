//! Topic and product classification.
//!
//! The legacy page carries one primary tag label plus a meta-keywords list.
//! Each label is looked up in the language's [`LanguageMapping`]; mapped
//! labels contribute their first canonical topic/product, unmapped labels
//! pass through as topics unchanged. The primary label's mappings always
//! lead the lists, and the provenance topic always closes the topic list.

mod mapping;

pub use mapping::{load, table_name, LanguageMapping, MappingTable, MAPPING_TABLE_SUFFIX};

use crate::context::topic_path;
use crate::dom::{self, Document};
use crate::error::Result;
use crate::result::Warnings;
use crate::store::{sanitize_name, DocumentStore};
use futures::future::try_join_all;

/// Element holding the primary legacy topic label.
pub const PRIMARY_LABEL: &str = ".tag-Label";

/// Topic appended to every migrated article to mark where it came from.
pub const PROVENANCE_TOPIC: &str = "CMOByAdobe";

/// Canonical topics and products of one article, in output order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Taxonomy {
    pub topics: Vec<String>,
    pub products: Vec<String>,
}

impl Taxonomy {
    /// Comma-joined topics, as written to the article.
    #[must_use]
    pub fn topics_line(&self) -> String {
        self.topics.join(", ")
    }

    /// Comma-joined products, as written to the article.
    #[must_use]
    pub fn products_line(&self) -> String {
        self.products.join(", ")
    }
}

/// Primary label and meta keywords of a page.
#[must_use]
pub fn read_labels(doc: &Document) -> (String, Vec<String>) {
    let primary = dom::text_content(&doc.select(PRIMARY_LABEL))
        .trim()
        .replace("&amp;", "&");
    let keywords = dom::get_attribute(&doc.select(r#"[name="keywords"]"#), "content")
        .unwrap_or_default()
        .split(',')
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect();
    (primary, keywords)
}

/// Classify labels against a mapping. Pure; unmapped labels are reported
/// through `warnings`.
pub fn classify(
    primary: &str,
    keywords: &[String],
    mapping: &LanguageMapping,
    warnings: &mut Warnings,
) -> Taxonomy {
    let mut topics: Vec<String> = Vec::new();
    let mut products: Vec<String> = Vec::new();

    let candidates = std::iter::once(primary).chain(keywords.iter().map(String::as_str));
    for candidate in candidates {
        let label = candidate.trim();
        if label.is_empty() {
            continue;
        }
        let is_primary = label == primary;

        match mapping.topic(label) {
            Some(topic) if is_primary => topics.insert(0, topic.to_string()),
            Some(topic) => topics.push(topic.to_string()),
            None => {
                warnings.push(format!("Found an unmapped topic: {label}"));
                topics.push(label.to_string());
            }
        }

        match mapping.product(label) {
            Some(product) if is_primary => products.insert(0, product.to_string()),
            Some(product) => products.push(product.to_string()),
            None => {}
        }
    }

    topics.push(PROVENANCE_TOPIC.to_string());

    Taxonomy {
        topics: dedupe(topics),
        products: dedupe(products),
    }
}

/// Trim, drop empties, keep the first occurrence of each label.
fn dedupe(labels: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(labels.len());
    for label in labels {
        let label = label.trim();
        if !label.is_empty() && !out.iter().any(|l| l == label) {
            out.push(label.to_string());
        }
    }
    out
}

/// Classify the page and create a stub document for every topic that needs
/// one (`check_exists` off, or no document yet under `{prefix}/topics`).
pub async fn resolve(
    doc: &Document,
    output_prefix: &str,
    check_exists: bool,
    mapping: &LanguageMapping,
    store: &dyn DocumentStore,
    warnings: &mut Warnings,
) -> Result<Taxonomy> {
    let (primary, keywords) = read_labels(doc);
    if primary.is_empty() {
        warnings.push("No primary topic label found");
    }
    let taxonomy = classify(&primary, &keywords, mapping, warnings);

    let path = topic_path(output_prefix);
    // Stubs live at distinct paths, so they can be written concurrently.
    try_join_all(taxonomy.topics.iter().map(|topic| {
        let path = path.as_str();
        async move {
            let name = sanitize_name(topic);
            if name.is_empty() {
                return Ok(());
            }
            if !check_exists || !store.exists(path, &name).await? {
                tracing::info!("Found a new topic: {name}");
                let body = format!("<h1>{}</h1>", html_escape::encode_text(topic));
                store.create(path, &name, &body).await?;
            }
            Ok::<(), crate::error::Error>(())
        }
    }))
    .await?;

    Ok(taxonomy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryDocumentStore;

    fn mapping() -> LanguageMapping {
        let mut m = LanguageMapping::default();
        m.insert("Marketing", "Digital Marketing", "Marketo Engage");
        m.insert("AI", "Artificial Intelligence", "Adobe Sensei");
        m.insert("Analytics", "Analytics, Data", "Adobe Analytics");
        m
    }

    fn kw(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn primary_then_keywords_then_provenance() {
        let mut warnings = Warnings::new();
        let taxonomy = classify("Marketing", &kw(&["AI"]), &mapping(), &mut warnings);

        assert_eq!(
            taxonomy.topics,
            vec!["Digital Marketing", "Artificial Intelligence", PROVENANCE_TOPIC]
        );
        assert_eq!(taxonomy.products, vec!["Marketo Engage", "Adobe Sensei"]);
        assert!(warnings.is_empty());
    }

    #[test]
    fn mapped_primary_moves_to_front() {
        let mut warnings = Warnings::new();
        let taxonomy = classify("ai", &kw(&["Analytics", "Marketing"]), &mapping(), &mut warnings);

        assert_eq!(
            taxonomy.topics,
            vec!["Artificial Intelligence", "Analytics", "Digital Marketing", PROVENANCE_TOPIC]
        );
        assert_eq!(
            taxonomy.products,
            vec!["Adobe Sensei", "Adobe Analytics", "Marketo Engage"]
        );
    }

    #[test]
    fn unmapped_keyword_passes_through_without_product() {
        let mut warnings = Warnings::new();
        let taxonomy = classify("Marketing", &kw(&["Underdogs"]), &mapping(), &mut warnings);

        assert_eq!(
            taxonomy.topics,
            vec!["Digital Marketing", "Underdogs", PROVENANCE_TOPIC]
        );
        assert_eq!(taxonomy.products, vec!["Marketo Engage"]);
        assert!(warnings.contains("Underdogs"));
    }

    #[test]
    fn unmapped_primary_keeps_first_position() {
        let mut warnings = Warnings::new();
        let taxonomy = classify("Leadership", &kw(&["AI"]), &mapping(), &mut warnings);

        assert_eq!(
            taxonomy.topics,
            vec!["Leadership", "Artificial Intelligence", PROVENANCE_TOPIC]
        );
        assert_eq!(taxonomy.products, vec!["Adobe Sensei"]);
    }

    #[test]
    fn duplicates_and_blanks_removed() {
        let mut warnings = Warnings::new();
        let taxonomy = classify(
            "Marketing",
            &kw(&["marketing", "", "AI", "ai", PROVENANCE_TOPIC]),
            &mapping(),
            &mut warnings,
        );

        assert_eq!(
            taxonomy.topics,
            vec!["Digital Marketing", "Artificial Intelligence", PROVENANCE_TOPIC]
        );
        assert_eq!(taxonomy.topics_line(), "Digital Marketing, Artificial Intelligence, CMOByAdobe");
        assert_eq!(taxonomy.products_line(), "Marketo Engage, Adobe Sensei");
    }

    #[test]
    fn reads_primary_label_and_keywords() {
        let doc = dom::parse(
            r#"<html><head><meta name="keywords" content="AI, Customer Experience ,"></head>
               <body><span class="tag-Label"> Strategy &amp;amp; Planning </span></body></html>"#,
        );
        let (primary, keywords) = read_labels(&doc);
        assert_eq!(primary, "Strategy & Planning");
        assert_eq!(keywords, vec!["AI", "Customer Experience"]);
    }

    #[tokio::test]
    async fn creates_missing_topic_stubs() {
        let doc = dom::parse(
            r#"<html><head><meta name="keywords" content="AI, R&amp;D"></head>
               <body><span class="tag-Label">Marketing</span></body></html>"#,
        );
        let store = MemoryDocumentStore::with_existing([("en/topics", "Digital Marketing")]);
        let mut warnings = Warnings::new();

        let taxonomy = resolve(&doc, "en", true, &mapping(), &store, &mut warnings)
            .await
            .expect("resolve");

        assert_eq!(
            taxonomy.topics,
            vec!["Digital Marketing", "Artificial Intelligence", "R&D", PROVENANCE_TOPIC]
        );
        assert_eq!(store.write_count(), 3);
        assert_eq!(
            store.get("en/topics", "R&D").as_deref(),
            Some("<h1>R&amp;D</h1>")
        );
        assert_eq!(store.get("en/topics", "Digital Marketing").as_deref(), Some(""));
    }
}
