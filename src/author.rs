//! Byline extraction and author profile creation.

use crate::context::author_path;
use crate::dom::{self, Document, NodeRef};
use crate::error::Result;
use crate::result::Warnings;
use crate::store::{sanitize_name, DocumentStore};

/// Author block of the article template.
pub const AUTHOR_BLOCK: &str = ".articleAuthor";

/// Contact/social sub-block dropped from author profiles.
pub const AUTHOR_DATA_BLOCK: &str = ".authorData";

/// Author fields read from the article markup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Byline {
    /// Given and family name, trimmed and joined by one space.
    pub name: String,
    /// Job title, possibly empty.
    pub job_title: String,
}

impl Byline {
    /// Read the byline from `itemprop` microdata.
    #[must_use]
    pub fn read(doc: &Document) -> Self {
        let given = dom::text_content(&doc.select(r#"[itemprop="givenName"]"#));
        let family = dom::text_content(&doc.select(r#"[itemprop="familyName"]"#));
        let name = format!("{} {}", given.trim(), family.trim()).trim().to_string();
        let job_title = dom::text_content(&doc.select(r#"[itemprop="jobTitle"]"#))
            .trim()
            .to_string();
        Self { name, job_title }
    }
}

/// Body of the author profile document.
///
/// Built from a copy of the author block so the article tree is not
/// touched: the byline heading and job title are appended and the author
/// data sub-block removed. A page without an author block still gets the
/// heading and title.
#[must_use]
pub fn profile_body(doc: &Document, byline: &Byline) -> String {
    let block = doc.select(AUTHOR_BLOCK).first();
    let profile = if block.exists() {
        dom::clone_element(&block)
    } else {
        dom::parse(r#"<div class="articleAuthor"></div>"#)
    };

    let root = profile.select(AUTHOR_BLOCK).first();
    if let Some(root_node) = dom::first_node(&root) {
        dom::append_child(&root_node, &dom::element_with_text(&profile, "h2", &byline.name));
        dom::append_child(&root_node, &dom::element_with_text(&profile, "p", &byline.job_title));
    }
    dom::remove(&profile.select(AUTHOR_DATA_BLOCK));

    dom::inner_html(&root).to_string()
}

/// Derive the byline, create the author profile when needed, and return the
/// two paragraphs (`by {name}`, `posted_on`) to splice into the article.
///
/// The profile is written under `{prefix}/authors` when the sanitized name is
/// non-empty and either `check_exists` is off or no such document exists.
pub async fn extract<'a>(
    doc: &'a Document,
    output_prefix: &str,
    posted_on: &str,
    check_exists: bool,
    store: &dyn DocumentStore,
    warnings: &mut Warnings,
) -> Result<Vec<NodeRef<'a>>> {
    let byline = Byline::read(doc);

    let nodes = vec![
        dom::element_with_text(doc, "p", &format!("by {}", byline.name)),
        dom::element_with_text(doc, "p", posted_on),
    ];

    let filename = sanitize_name(&byline.name);
    if filename.is_empty() {
        warnings.push("No author name found, skipping author profile");
        return Ok(nodes);
    }

    if !doc.select(AUTHOR_BLOCK).exists() {
        warnings.push(format!("No author block found for {}", byline.name));
    }
    let body = profile_body(doc, &byline);

    let path = author_path(output_prefix);
    if !check_exists || !store.exists(&path, &filename).await? {
        tracing::info!("Creating author profile {path}/{filename}");
        store.create(&path, &filename, &body).await?;
    }

    Ok(nodes)
}
