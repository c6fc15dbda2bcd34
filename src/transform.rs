//! Document transformation.
//!
//! Turns one fetched legacy article page into the body stored in the
//! content store. The passes run in a fixed order over a single mutable
//! tree:
//!
//! 1. image source fixups
//! 2. removal of the template's own `<hr>` markers
//! 3. hero/title reorder and the three-break skeleton around the hero
//! 4. byline paragraphs (author profile created on the side)
//! 5. topics/products summary (topic stubs created on the side)
//! 6. embed wrappers and stray iframes replaced by embed placeholders
//! 7. inline-markup normalization
//! 8. removal of decorative leftovers, then serialization
//!
//! Every structural pass is fail-soft: a template quirk that does not match
//! becomes a warning and the pass is skipped. Only collaborator I/O errors
//! abort the transform.

use crate::author;
use crate::context::ArticleContext;
use crate::dom::{self, Document, NodeRef, Selection};
use crate::embed;
use crate::error::Result;
use crate::fetch::EmbedFetcher;
use crate::inline;
use crate::result::{TransformOutcome, Warnings};
use crate::store::DocumentStore;
use crate::taxonomy::{self, LanguageMapping, Taxonomy};
use crate::url_utils::{self, DEFAULT_IMAGE_EXTENSION};

/// Main article container; everything outside it is dropped.
pub const MAIN_CONTAINER: &str = ".container";

/// First top-level section: the hero banner.
pub const HERO_SECTION: &str = ".container > div.position:nth-of-type(1)";

/// Title block of the second top-level section.
pub const TITLE_BLOCK: &str = ".container > div.position:nth-of-type(2) .title";

/// Wrappers around third-party embeds.
pub const EMBED_WRAPPERS: &str = ".embed-wrapper, .spotify-wrapper";

/// Custom element wrapping a resolved embed URL.
pub const EMBED_PLACEHOLDER: &str = "hlxembed";

/// Template blocks with no place in the migrated document.
pub const LEFTOVER_BLOCKS: [&str; 3] = [".taglabel", ".socialmediashare", author::AUTHOR_BLOCK];

/// Runs the pipeline against injected collaborators.
#[derive(Clone, Copy)]
pub struct Transformer<'a> {
    pub store: &'a dyn DocumentStore,
    pub embeds: &'a dyn EmbedFetcher,
    pub mapping: &'a LanguageMapping,
    /// Skip author/topic documents that already exist.
    pub check_related_exists: bool,
}

impl Transformer<'_> {
    /// Transform `raw_html` and store the article body.
    ///
    /// Returns the publish date, or `"N/A"` without touching the store when
    /// the page is empty. The future is not `Send`: the document tree is
    /// single-threaded and lives across the collaborator calls.
    pub async fn transform(&self, ctx: &ArticleContext, raw_html: &str) -> Result<TransformOutcome> {
        if raw_html.trim().is_empty() {
            tracing::warn!("Empty page body for {}", ctx.source);
            return Ok(TransformOutcome::empty());
        }

        let mut warnings = Warnings::new();
        let doc = dom::parse(raw_html);
        if ctx.date_inferred {
            warnings.push(format!("No publish date in {}, dated {}", ctx.source, ctx.date));
        }

        fix_images(&doc, &ctx.origin);
        remove_rules(&doc);
        let hero_break = reorder_sections(&doc, &mut warnings);

        let byline = author::extract(
            &doc,
            ctx.output_prefix(),
            &ctx.posted_on(),
            self.check_related_exists,
            self.store,
            &mut warnings,
        )
        .await?;
        match hero_break {
            Some(anchor) => splice_after(&anchor, &byline),
            None => warnings.push("No hero section, byline omitted"),
        }

        let taxonomy = taxonomy::resolve(
            &doc,
            ctx.output_prefix(),
            self.check_related_exists,
            self.mapping,
            self.store,
            &mut warnings,
        )
        .await?;

        if !doc.select(MAIN_CONTAINER).exists() {
            warnings.push(format!("No main container in {}, using page body", ctx.source));
        }
        let container = match main_container(&doc) {
            Some(c) => c,
            None => {
                warnings.push(format!("No main container in {}, nothing to store", ctx.source));
                return Ok(TransformOutcome {
                    date: ctx.date.clone(),
                    topics: taxonomy.topics,
                    products: taxonomy.products,
                    warnings,
                });
            }
        };
        append_summary(&doc, &container, &taxonomy);

        self.replace_embeds(&doc, ctx, &mut warnings).await;
        replace_iframes(&doc);

        inline::normalize_all(&doc);
        strip_leftovers(&doc);

        let content = container.inner_html().to_string();
        self.store
            .create(&ctx.publish_path(), &ctx.slug, &content)
            .await?;
        tracing::info!("Stored {}/{}", ctx.publish_path(), ctx.slug);

        Ok(TransformOutcome {
            date: ctx.date.clone(),
            topics: taxonomy.topics,
            products: taxonomy.products,
            warnings,
        })
    }

    /// Replace each embed wrapper's content by a placeholder for its
    /// resolved URL. Unresolved wrappers are left as they are.
    async fn replace_embeds(&self, doc: &Document, ctx: &ArticleContext, warnings: &mut Warnings) {
        let wrappers: Vec<NodeRef> = doc.select(EMBED_WRAPPERS).nodes().to_vec();
        for wrapper in wrappers {
            let view = Selection::from(wrapper);
            match embed::resolve(&view, self.embeds).await {
                Some(src) => {
                    dom::clear_children(&wrapper);
                    dom::append_child(&wrapper, &placeholder(doc, &src));
                }
                None => warnings.push(format!(
                    "Unsupported embed - could not resolve embed src in {}",
                    ctx.source
                )),
            }
        }
    }
}

/// `.container`, or `body` for pages built without one.
#[must_use]
pub fn main_container(doc: &Document) -> Option<NodeRef<'_>> {
    dom::first_node(&doc.select(MAIN_CONTAINER)).or_else(|| dom::first_node(&doc.select("body")))
}

/// Qualify image sources against the page origin.
///
/// - root-relative sources get the origin, plus `.jpeg` when the file has
///   no extension
/// - data-URI or missing sources are replaced by a lazy-load `data-src`
/// - images with no usable source at all are dropped
pub fn fix_images(doc: &Document, origin: &str) {
    for img in doc.select("img").nodes() {
        let sel = Selection::from(*img);
        let src = dom::non_empty_attribute(&sel, "src");
        let lazy = dom::non_empty_attribute(&sel, "data-src");

        match (src, lazy) {
            (Some(src), _) if url_utils::is_root_relative(&src) => {
                let mut src = src;
                if !url_utils::has_extension(&src) {
                    src.push_str(DEFAULT_IMAGE_EXTENSION);
                }
                dom::set_attribute(&sel, "src", &url_utils::qualify(&src, origin));
            }
            (Some(src), Some(lazy)) if src.starts_with("data:") => {
                dom::set_attribute(&sel, "src", &url_utils::qualify(&lazy, origin));
            }
            (Some(src), _) if url_utils::is_protocol_relative(&src) => {
                dom::set_attribute(&sel, "src", &url_utils::normalize_protocol_relative(&src));
            }
            (Some(_), _) => {}
            (None, Some(lazy)) => {
                dom::set_attribute(&sel, "src", &url_utils::qualify(&lazy, origin));
            }
            (None, None) => {
                tracing::debug!("dropping image without source");
                dom::detach(img);
            }
        }
    }
}

/// Drop the template's `<hr>`s; the pipeline inserts its own breaks.
pub fn remove_rules(doc: &Document) {
    dom::remove(&doc.select(".container hr"));
}

/// Move the second section's title in front of the hero banner and frame
/// the hero with breaks: `title, hr, hero, hr, hr`.
///
/// Returns the break right after the hero, where the byline goes.
pub fn reorder_sections<'a>(doc: &'a Document, warnings: &mut Warnings) -> Option<NodeRef<'a>> {
    let Some(hero) = dom::first_node(&doc.select(HERO_SECTION)) else {
        warnings.push("No hero section found");
        return None;
    };

    let titles: Vec<NodeRef> = doc.select(TITLE_BLOCK).nodes().to_vec();
    if titles.is_empty() {
        warnings.push("No title block in second section");
    }
    for title in &titles {
        dom::insert_before(&hero, title);
    }

    dom::insert_before(&hero, &dom::new_element(doc, "hr"));
    let hero_break = dom::new_element(doc, "hr");
    dom::insert_after(&hero, &hero_break);
    dom::insert_after(&hero_break, &dom::new_element(doc, "hr"));

    Some(hero_break)
}

/// Insert `nodes` in order right after `anchor`.
pub fn splice_after(anchor: &NodeRef, nodes: &[NodeRef]) {
    let mut previous = *anchor;
    for node in nodes {
        dom::insert_after(&previous, node);
        previous = *node;
    }
}

/// Closing break plus `Topics:` and `Products:` paragraphs.
pub fn append_summary(doc: &Document, container: &NodeRef, taxonomy: &Taxonomy) {
    dom::append_child(container, &dom::new_element(doc, "hr"));
    dom::append_child(
        container,
        &dom::element_with_text(doc, "p", &format!("Topics: {}", taxonomy.topics_line())),
    );
    dom::append_child(
        container,
        &dom::element_with_text(doc, "p", &format!("Products: {}", taxonomy.products_line())),
    );
}

/// `<hlxembed>url</hlxembed>` with protocol-relative URLs made https.
#[must_use]
pub fn placeholder<'a>(doc: &'a Document, src: &str) -> NodeRef<'a> {
    dom::element_with_text(
        doc,
        EMBED_PLACEHOLDER,
        &url_utils::normalize_protocol_relative(src),
    )
}

/// Replace every remaining iframe by a placeholder for its source. Iframes
/// without a source are just removed.
pub fn replace_iframes(doc: &Document) {
    let iframes: Vec<NodeRef> = doc.select("iframe").nodes().to_vec();
    for iframe in iframes {
        if let Some(src) = embed::iframe_source(&Selection::from(iframe)) {
            dom::insert_after(&iframe, &placeholder(doc, &src));
        }
        dom::detach(&iframe);
    }
}

/// Remove tag labels, share widgets and the author block.
pub fn strip_leftovers(doc: &Document) {
    for selector in LEFTOVER_BLOCKS {
        dom::remove(&doc.select(selector));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn container_html(doc: &Document) -> String {
        main_container(doc)
            .map(|c| c.inner_html().to_string())
            .unwrap_or_default()
    }

    #[test]
    fn root_relative_image_without_extension() {
        let doc = dom::parse(r#"<div class="container"><img src="/img/foo"></div>"#);
        fix_images(&doc, "https://example.com");
        assert_eq!(
            dom::get_attribute(&doc.select("img"), "src").as_deref(),
            Some("https://example.com/img/foo.jpeg")
        );
    }

    #[test]
    fn root_relative_image_with_extension() {
        let doc = dom::parse(r#"<div class="container"><img src="/img/foo.png"></div>"#);
        fix_images(&doc, "https://example.com");
        assert_eq!(
            dom::get_attribute(&doc.select("img"), "src").as_deref(),
            Some("https://example.com/img/foo.png")
        );
    }

    #[test]
    fn lazy_source_replaces_data_uri() {
        let doc = dom::parse(
            r#"<div class="container">
                <img id="a" src="data:image/gif;base64,R0lGOD" data-src="/img/a.jpg">
                <img id="b" data-src="https://cdn.example.com/b.jpg">
                <img id="c" src="data:image/gif;base64,R0lGOD">
            </div>"#,
        );
        fix_images(&doc, "https://example.com");

        assert_eq!(
            dom::get_attribute(&doc.select("#a"), "src").as_deref(),
            Some("https://example.com/img/a.jpg")
        );
        assert_eq!(
            dom::get_attribute(&doc.select("#b"), "src").as_deref(),
            Some("https://cdn.example.com/b.jpg")
        );
        assert!(dom::get_attribute(&doc.select("#c"), "src")
            .is_some_and(|s| s.starts_with("data:")));
    }

    #[test]
    fn image_without_any_source_dropped() {
        let doc = dom::parse(r#"<div class="container"><img alt="x"><img src="https://a/b.png"></div>"#);
        fix_images(&doc, "https://example.com");
        assert_eq!(doc.select("img").length(), 1);
    }

    #[test]
    fn hero_framed_by_breaks() {
        let doc = dom::parse(
            r#"<div class="container"><hr>
                <div class="position" id="hero">hero</div>
                <div class="position"><div class="title">Title</div><p>body</p></div>
            </div>"#,
        );
        let mut warnings = Warnings::new();
        remove_rules(&doc);
        let anchor = reorder_sections(&doc, &mut warnings).expect("hero");
        splice_after(
            &anchor,
            &[dom::element_with_text(&doc, "p", "by A"), dom::element_with_text(&doc, "p", "posted on B")],
        );

        let order: Vec<String> = main_container(&doc)
            .expect("container")
            .children()
            .into_iter()
            .filter_map(|n| {
                let tag = dom::node_tag(&n)?;
                Some(match n.attr("class").map(|c| c.to_string()) {
                    Some(class) => format!("{tag}.{class}"),
                    None => format!("{tag}:{}", n.text().trim()),
                })
            })
            .collect();
        assert_eq!(
            order,
            vec![
                "div.title",
                "hr:",
                "div.position",
                "hr:",
                "p:by A",
                "p:posted on B",
                "hr:",
                "div.position",
            ]
        );
        assert!(warnings.is_empty());
    }

    #[test]
    fn missing_hero_is_a_warning() {
        let doc = dom::parse(r#"<div class="container"><p>flat page</p></div>"#);
        let mut warnings = Warnings::new();
        assert!(reorder_sections(&doc, &mut warnings).is_none());
        assert!(warnings.contains("No hero section"));
        assert!(!doc.select("hr").exists());
    }

    #[test]
    fn stray_iframes_become_placeholders() {
        let doc = dom::parse(
            r#"<div class="container">
                <p><iframe src="//player.vimeo.com/video/1"></iframe></p>
                <iframe data-src="https://www.youtube.com/embed/2"></iframe>
                <iframe></iframe>
            </div>"#,
        );
        replace_iframes(&doc);

        assert!(!doc.select("iframe").exists());
        let urls: Vec<String> = doc
            .select(EMBED_PLACEHOLDER)
            .nodes()
            .iter()
            .map(|n| n.text().to_string())
            .collect();
        assert_eq!(
            urls,
            vec!["https://player.vimeo.com/video/1", "https://www.youtube.com/embed/2"]
        );
    }

    #[test]
    fn summary_and_leftovers() {
        let doc = dom::parse(
            r#"<div class="container"><p>body</p><div class="taglabel">tag</div>
               <div class="socialmediashare">share</div><div class="articleAuthor">me</div></div>"#,
        );
        let container = main_container(&doc).expect("container");
        append_summary(
            &doc,
            &container,
            &Taxonomy {
                topics: vec!["A".into(), "B".into()],
                products: vec![],
            },
        );
        strip_leftovers(&doc);

        let html = container_html(&doc);
        assert!(html.ends_with("<hr><p>Topics: A, B</p><p>Products: </p>"));
        assert!(!html.contains("share"));
        assert!(!html.contains("articleAuthor"));
    }
}
