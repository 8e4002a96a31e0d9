//! Performance benchmarks for rs-purifier.
//!
//! Run with: `cargo bench`
//!
//! Benchmarks include:
//! - Tag tree construction of a small article
//! - Policy extraction through the agent
//! - Scaling with document size

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rs_purifier::policy::{Policy, Rule};
use rs_purifier::selector::Selector;
use rs_purifier::tree::{self, TagTable};
use rs_purifier::{Agent, AgentOptions};

const SAMPLE_HTML: &str = r#"
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Sample Article</title>
</head>
<body>
    <nav>
        <a href="/">Home</a>
        <a href="/about">About</a>
    </nav>
    <header class="article-header"><h1>Sample Article Title</h1></header>
    <div class="article-main">
        <p class="byline">By a staff writer</p>
        <p>This is the first paragraph of the article. It contains some meaningful
        content that the policy should extract.</p>
        <p>Here is a second paragraph with more content and a
        <a href="/related">related link</a>.</p>
        <ul><li>First point</li><li>Second point</li></ul>
        <div class="share">Share this article</div>
        <footer class="article-footer"><p>Copyright 2024</p></footer>
    </div>
</body>
</html>
"#;

const URL: &str = "https://example.com/news/sample";

#[allow(clippy::unwrap_used)]
fn agent() -> Agent {
    let policy = Policy::builder("policy_bench", "r:https://example\\.com/news/.*")
        .template(vec![
            Rule::new(Selector::attr("header", "class", "article-header").unwrap()),
            Rule::new(Selector::attr("div", "class", "article-main").unwrap())
                .end(Selector::attr("footer", "class", "article-footer").unwrap())
                .ignore(Selector::attr("div", "class", "share").unwrap()),
        ])
        .compact(true)
        .build()
        .unwrap();

    let mut builder = Agent::builder(&AgentOptions::default());
    builder.register(policy).unwrap();
    builder.build()
}

fn bench_tree_build(c: &mut Criterion) {
    let table = TagTable::default();
    c.bench_function("tree_build", |b| {
        b.iter(|| tree::parse(black_box(SAMPLE_HTML), &table, 512));
    });
}

fn bench_policy_extract(c: &mut Criterion) {
    let agent = agent();
    c.bench_function("policy_extract", |b| {
        b.iter(|| agent.extract("text/html", URL, black_box(SAMPLE_HTML), false));
    });
    c.bench_function("policy_extract_links", |b| {
        b.iter(|| agent.extract("text/html", URL, black_box(SAMPLE_HTML), true));
    });
}

/// Benchmark with the article body repeated to growing sizes
fn bench_document_size(c: &mut Criterion) {
    let agent = agent();
    let paragraph = "<p>Filler paragraph with <b>inline</b> markup and text.</p>\n";

    let mut group = c.benchmark_group("document_size");

    for repeat in [10_usize, 100, 1000] {
        let html = SAMPLE_HTML.replace(
            "<div class=\"share\">",
            &format!("{}<div class=\"share\">", paragraph.repeat(repeat)),
        );
        let size_kb = html.len() / 1024;
        group.throughput(Throughput::Bytes(html.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("extract", format!("{repeat} paragraphs ({size_kb}KB)")),
            &html,
            |b, html| {
                b.iter(|| agent.extract("text/html", URL, black_box(html), false));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_tree_build, bench_policy_extract, bench_document_size);
criterion_main!(benches);
