//! Performance benchmarks for article-migrator.
//!
//! Run with: `cargo bench`
//!
//! The synchronous DOM passes are measured one by one on a synthetic legacy
//! article, then the full transform against in-memory collaborators.

use article_migrator::dom;
use article_migrator::fetch::StaticFetcher;
use article_migrator::store::MemoryDocumentStore;
use article_migrator::taxonomy::LanguageMapping;
use article_migrator::{inline, transform, ArticleContext, Transformer, Warnings};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

const ARTICLE_URL: &str = "https://cmo.example.com/articles/2020/1/benchmark-article.html";

fn sample_article(paragraphs: usize) -> String {
    let mut body = String::new();
    for i in 0..paragraphs {
        body.push_str(&format!(
            "<p><em>Lead {i} </em><em>continues</em> with <b> bold</b><b>text </b>and \
             <a href=\"/link/{i}\">a link</a>.</p><img src=\"/img/figure-{i}\">"
        ));
    }
    format!(
        r#"<html><head><meta name="keywords" content="AI, Analytics, Leadership"></head>
<body><div class="container">
<div class="position"><img src="/img/hero"></div>
<div class="position"><div class="title"><h1>Benchmark Article</h1></div>{body}
<div class="embed-wrapper"><iframe src="//player.vimeo.com/video/1"></iframe></div>
<hr><span class="tag-Label">Marketing</span>
<div class="articleAuthor"><span itemprop="givenName">Ada</span> <span itemprop="familyName">Lovelace</span>
<span itemprop="jobTitle">Analyst</span><div class="authorData">bio</div></div>
</div></div></body></html>"#
    )
}

fn bench_inline_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("inline_normalize_all");
    for paragraphs in [10, 100] {
        let html = sample_article(paragraphs);
        group.throughput(Throughput::Bytes(html.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(paragraphs), &html, |b, html| {
            b.iter(|| {
                let doc = dom::parse(black_box(html));
                inline::normalize_all(&doc);
                doc
            });
        });
    }
    group.finish();
}

fn bench_structural_passes(c: &mut Criterion) {
    let html = sample_article(50);
    c.bench_function("fix_images_and_reorder", |b| {
        b.iter(|| {
            let doc = dom::parse(black_box(&html));
            let mut warnings = Warnings::new();
            transform::fix_images(&doc, "https://cmo.example.com");
            transform::remove_rules(&doc);
            transform::reorder_sections(&doc, &mut warnings);
            transform::replace_iframes(&doc);
            transform::strip_leftovers(&doc);
            doc
        });
    });
}

fn bench_full_transform(c: &mut Criterion) {
    let html = sample_article(50);
    let ctx = ArticleContext::from_url(ARTICLE_URL).expect("valid url");
    let mut mapping = LanguageMapping::default();
    mapping.insert("Marketing", "Digital Marketing", "Marketo Engage");
    let fetcher = StaticFetcher::new();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime");

    c.bench_function("full_transform", |b| {
        b.iter(|| {
            let store = MemoryDocumentStore::new();
            let transformer = Transformer {
                store: &store,
                embeds: &fetcher,
                mapping: &mapping,
                check_related_exists: true,
            };
            runtime
                .block_on(transformer.transform(&ctx, black_box(&html)))
                .expect("transform")
        });
    });
}

criterion_group!(
    benches,
    bench_inline_normalize,
    bench_structural_passes,
    bench_full_transform
);
criterion_main!(benches);
