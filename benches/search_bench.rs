use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use retropad::buffer::{Document, DocumentHost};
use retropad::editor::HistoryManager;
use retropad::search::{find_next, replace_all, FindPreviousMode, SearchQuery};

fn sample_text() -> String {
    "The quick brown fox jumps over the lazy dog. Grüße aus 日本.\n".repeat(4096)
}

fn bench_find(c: &mut Criterion) {
    let text = sample_text();
    let len = text.chars().count();
    let mut group = c.benchmark_group("search_find");
    group.bench_function("forward_case_insensitive_wrap", |b| {
        let query = SearchQuery::forward("LAZY CAT", false);
        b.iter(|| find_next(black_box(&text), &query, len / 2, FindPreviousMode::Reverse));
    });
    group.bench_function("reverse_from_end", |b| {
        let query = SearchQuery::backward("quick", true);
        b.iter(|| find_next(black_box(&text), &query, len, FindPreviousMode::Reverse));
    });
    group.finish();
}

fn bench_replace_all(c: &mut Criterion) {
    let text = sample_text();
    let mut group = c.benchmark_group("search_replace_all");
    group.bench_function("replace_common_word", |b| {
        b.iter(|| replace_all(black_box(&text), "the", "a", false));
    });
    group.finish();
}

fn bench_snapshot_history(c: &mut Criterion) {
    let mut group = c.benchmark_group("history_snapshot");
    group.bench_function("hundred_edits_on_large_document", |b| {
        b.iter_batched(
            || {
                let mut doc = Document::from_str(&sample_text());
                let history = HistoryManager::new();
                history.bind(&mut doc);
                (doc, history)
            },
            |(mut doc, history)| {
                for _ in 0..100 {
                    doc.insert_str("x");
                }
                while history.undo(&mut doc) {}
                doc.cursor_offset()
            },
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

criterion_group!(benches, bench_find, bench_replace_all, bench_snapshot_history);
criterion_main!(benches);
