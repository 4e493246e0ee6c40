use criterion::{black_box, criterion_group, criterion_main, Criterion};
use vellum_html::{Token, Tokenizer};
use vellum_tree::{Arena, NamePool};

const PAGE: &str = include_str!("testdata/page.html");

fn tokenize(c: &mut Criterion) {
    c.bench_function("tokenize_page", move |b| {
        b.iter(|| {
            let mut tokenizer = Tokenizer::new(black_box(PAGE));
            let mut count = 0usize;
            loop {
                match tokenizer.next_token() {
                    Token::Eof => break,
                    _ => count += 1,
                }
            }
            black_box(count)
        })
    });
}

fn build_tree(c: &mut Criterion) {
    c.bench_function("parse_page", move |b| {
        b.iter(|| {
            let arena = Arena::new();
            let names = NamePool::new(&arena);
            let doc = vellum_html::parse_html(&arena, &names, black_box(PAGE));
            black_box(doc.root().is_some())
        })
    });
}

criterion_group!(benches, tokenize, build_tree);
criterion_main!(benches);
