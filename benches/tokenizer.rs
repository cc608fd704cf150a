//! Tokenizer and region classification throughput.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use texspell::checker::region::RegionClassifier;
use texspell::checker::tokenizer::tokenize;
use texspell::RegionTag;

const PROSE_LINE: &str =
    "The quick brown fox jumps over the lazy dog while \\emph{nobody} watches the \\textbf{river}.";

const COMMAND_HEAVY_LINE: &str =
    "\\section{Intro}\\label{sec:intro}\\cite{knuth84}\\ref{fig:one}\\begin{itemize}\\item{first}";

fn generate_document(lines: usize) -> String {
    (0..lines)
        .map(|i| {
            if i % 4 == 0 {
                COMMAND_HEAVY_LINE.to_string()
            } else {
                PROSE_LINE.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn bench_tokenize_line(c: &mut Criterion) {
    c.bench_function("tokenizer/prose_line", |b| {
        b.iter(|| black_box(tokenize(black_box(PROSE_LINE)).count()));
    });

    c.bench_function("tokenizer/command_heavy_line", |b| {
        b.iter(|| black_box(tokenize(black_box(COMMAND_HEAVY_LINE)).count()));
    });
}

fn bench_tokenize_document(c: &mut Criterion) {
    let mut group = c.benchmark_group("tokenizer/document");

    for lines in [100, 1_000, 10_000] {
        let text = generate_document(lines);
        group.bench_with_input(BenchmarkId::from_parameter(lines), &text, |b, text| {
            b.iter(|| {
                let tokens: usize = text.lines().map(|line| tokenize(line).count()).sum();
                black_box(tokens)
            });
        });
    }

    group.finish();
}

fn bench_classify(c: &mut Criterion) {
    let classifier = RegionClassifier::new();
    let stacks = vec![
        Vec::new(),
        vec![RegionTag::new("texSectionArg"), RegionTag::new("texCmd")],
        vec![RegionTag::new("texMathZoneX"), RegionTag::new("texMathText"), RegionTag::new("texArg")],
        vec![RegionTag::new("texDocZone"), RegionTag::new("texComment")],
        vec![RegionTag::new("texDocZone"), RegionTag::new("texRefArg"), RegionTag::new("texCmd")],
    ];

    c.bench_function("region/classify", |b| {
        b.iter(|| {
            stacks
                .iter()
                .filter(|stack| classifier.is_spellcheckable(black_box(stack)))
                .count()
        });
    });
}

criterion_group!(benches, bench_tokenize_line, bench_tokenize_document, bench_classify);
criterion_main!(benches);
