use criterion::*;
use filing_spider::sec::parse_dataset;
use filing_spider::{PhraseScanner, CONTEXT_WIDTH};

const PHRASE: &str = "accrued performance-based compensation";

// a filing-sized document with the phrase scattered through it
#[inline]
fn filing_text(paragraphs: usize, every: usize) -> String {
    let filler = "The Company recognizes revenue when control of the promised goods or services \
                  is transferred to customers, in an amount that reflects the consideration \
                  expected in exchange for those goods or services. ";
    let mut text = String::with_capacity(paragraphs * filler.len());
    for i in 0..paragraphs {
        text.push_str("<p>");
        text.push_str(filler);
        if i % every == 0 {
            text.push_str("Accrued Performance-Based Compensation was reclassified. ");
        }
        text.push_str("</p>\n");
    }
    text
}

// a company_tickers_exchange.json sized table
#[inline]
fn tickers_table(rows: usize) -> String {
    let data = (0..rows)
        .map(|i| format!(r#"[{}, "Company {i}", "T{i}", "Nasdaq"]"#, 1000 + i))
        .collect::<Vec<_>>()
        .join(",");
    format!(r#"{{"fields": ["cik", "name", "ticker", "exchange"], "data": [{data}]}}"#)
}

// scan
// ----------------------------------------------------------
fn benchmark_scan(c: &mut Criterion) {
    let scanner = PhraseScanner::new(PHRASE, CONTEXT_WIDTH).expect("phrase compiles");
    let sparse = filing_text(20_000, 5_000);
    let dense = filing_text(20_000, 10);

    let mut group = c.benchmark_group("scan filing");
    group.throughput(Throughput::Bytes(sparse.len() as u64));
    group.bench_function("sparse matches", |b| {
        b.iter(|| scanner.find_matches(black_box(&sparse)))
    });
    group.bench_function("dense matches", |b| {
        b.iter(|| scanner.find_matches(black_box(&dense)))
    });
    group.finish();
}

// deserialize tickers
// ----------------------------------------------------------
fn benchmark_tickers(c: &mut Criterion) {
    let table = tickers_table(10_000);

    c.bench_function("deserialize tickers table", |b| {
        b.iter(|| parse_dataset(black_box(&table)).expect("tickers parse"))
    });
}

criterion_group!(benches, benchmark_scan, benchmark_tickers);
criterion_main!(benches);
