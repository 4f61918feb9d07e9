use std::collections::{HashMap, HashSet};

use pretty_assertions::assert_eq;
use swat_core::normalize::parse_ranking_csv;
use swat_core::schedule::{drive_blocking, ChunkCursor, ChunkedJob};
use swat_core::{
    reconcile, ComparisonResult, CoreError, KeywordStatus, Metric, RawRecord, ReconcileJob,
    Schema, SourceDataset,
};

fn sorted(mut results: Vec<ComparisonResult>) -> Vec<ComparisonResult> {
    results.sort_by(|a, b| a.keyword.cmp(&b.keyword));
    results
}

/// Deterministic pseudo-random keyword sets with overlaps and duplicates.
fn generated_sources() -> (SourceDataset, Vec<SourceDataset>) {
    let mut seed: u64 = 0x5eed;
    let mut next = move || {
        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        seed >> 33
    };

    let mut make = |name: &str, n: usize| {
        let records = (0..n)
            .map(|_| {
                let id = next() % 1_500;
                RawRecord::new(format!("kw-{id}"))
                    .with_position((next() % 100) as i64 + 1)
                    .with_url(format!("/{name}/{id}"))
                    .with_volume((next() % 10_000) as i64)
            })
            .collect();
        SourceDataset::new(name, records)
    };

    let primary = make("mine", 800);
    let comparisons = vec![make("alpha", 600), make("beta", 400), make("gamma", 300)];
    (primary, comparisons)
}

fn keyword_set(dataset: &SourceDataset) -> HashSet<&str> {
    dataset.records.iter().map(|r| r.keyword.as_str()).collect()
}

#[test]
fn reconciling_twice_is_idempotent() {
    let (primary, comparisons) = generated_sources();
    let first = sorted(reconcile(&primary, &comparisons).unwrap());
    let second = sorted(reconcile(&primary, &comparisons).unwrap());
    assert_eq!(first, second);
}

#[test]
fn every_union_keyword_appears_exactly_once() {
    let (primary, comparisons) = generated_sources();
    let results = reconcile(&primary, &comparisons).unwrap();

    let mut expected: HashSet<&str> = keyword_set(&primary);
    for c in &comparisons {
        expected.extend(keyword_set(c));
    }

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for r in &results {
        *counts.entry(r.keyword.as_str()).or_default() += 1;
    }

    assert_eq!(counts.len(), expected.len());
    assert!(counts.values().all(|&n| n == 1));
    assert!(expected.iter().all(|k| counts.contains_key(k)));
}

#[test]
fn status_matches_source_membership() {
    let (primary, comparisons) = generated_sources();
    let results = reconcile(&primary, &comparisons).unwrap();

    let in_primary = keyword_set(&primary);
    let comparison_sets: Vec<HashSet<&str>> = comparisons.iter().map(keyword_set).collect();

    for r in &results {
        let p = in_primary.contains(r.keyword.as_str());
        let c = comparison_sets.iter().any(|s| s.contains(r.keyword.as_str()));
        let expected = match (p, c) {
            (true, true) => KeywordStatus::Common,
            (true, false) => KeywordStatus::PrimaryOnly,
            (false, true) => KeywordStatus::ComparisonOnly,
            (false, false) => unreachable!("keyword outside the union: {}", r.keyword),
        };
        assert_eq!(r.status, expected, "keyword {}", r.keyword);
        assert_eq!(r.comparison_info.len(), comparisons.len());
        for (info, source) in r.comparison_info.iter().zip(&comparisons) {
            assert_eq!(info.source_name, source.name);
        }
    }
}

#[test]
fn chunk_size_does_not_change_output() {
    let records: Vec<RawRecord> = (0..1_200)
        .map(|i| {
            RawRecord::new(format!("keyword {i}"))
                .with_position(i % 30 + 1)
                .with_url(format!("/p/{i}"))
        })
        .collect();
    let primary = SourceDataset::new("mine", records[..900].to_vec());
    let comparisons = vec![
        SourceDataset::new("a", records[300..].to_vec()),
        SourceDataset::new("b", records[1_000..].to_vec()),
    ];

    let run = |chunk_size: usize| {
        let mut job = ReconcileJob::new(&primary, &comparisons).unwrap();
        assert_eq!(job.total(), 1_200);
        let mut slices = 0;
        drive_blocking(&mut job, chunk_size, |_| slices += 1);
        (sorted(job.finish()), slices)
    };

    let (small, small_slices) = run(500);
    let (large, large_slices) = run(1_200);
    assert_eq!(small_slices, 3);
    assert_eq!(large_slices, 1);
    assert_eq!(small, large);
}

#[test]
fn cursor_is_caller_owned_and_resumable() {
    let (primary, comparisons) = generated_sources();
    let mut job = ReconcileJob::new(&primary, &comparisons).unwrap();
    let total = job.total();

    // Step a few slices, "pause", then resume from the saved cursor.
    let mut cursor = ChunkCursor::new(total, 250);
    for _ in 0..2 {
        let (next, progress) = cursor.advance(&mut job);
        assert!(!progress.done);
        cursor = next;
    }
    let saved = cursor;
    let mut last = None;
    let mut cursor = saved;
    while !cursor.is_done() {
        let (next, progress) = cursor.advance(&mut job);
        cursor = next;
        last = Some(progress);
    }
    assert_eq!(last.unwrap().fraction, 1.0);
    assert_eq!(job.finish().len(), total);
}

#[test]
fn csv_scenario_end_to_end() {
    let schema = Schema::ranking();
    let mine = parse_ranking_csv("Keyword,Pos,URL\nShoes,3,/shoes\n", "Mio Sito", &schema).unwrap();
    let comp_a = parse_ranking_csv(
        "\u{feff}keyword,position,url,Volume,Key Diff\r\nshoes,5,/a/shoes,1000,30\r\nBoots,2,/a/boots,450,12\r\n",
        "CompA",
        &schema,
    )
    .unwrap();

    let primary = SourceDataset::new("Mio Sito", mine.records);
    let comparisons = vec![SourceDataset::new("CompA", comp_a.records)];
    let results = sorted(reconcile(&primary, &comparisons).unwrap());

    assert_eq!(results.len(), 2);
    let boots = &results[0];
    assert_eq!(boots.keyword, "boots");
    assert_eq!(boots.status, KeywordStatus::ComparisonOnly);
    assert_eq!(boots.primary_info.position, Metric::Absent);
    assert_eq!(boots.primary_info.url, Metric::Absent);
    assert_eq!(boots.metrics.volume, Metric::Present(450));
    assert_eq!(boots.metrics.difficulty, Metric::Present(12));

    let shoes = &results[1];
    assert_eq!(shoes.status, KeywordStatus::Common);
    assert_eq!(shoes.primary_info.position, Metric::Present(3));
    assert_eq!(shoes.comparison_info[0].position, Metric::Present(5));
    // Primary has no volume column, and primary metrics win even when absent.
    assert_eq!(shoes.metrics.volume, Metric::Absent);
}

#[test]
fn header_only_files_are_nothing_to_analyze() {
    let schema = Schema::ranking();
    let mine = parse_ranking_csv("Keyword,Pos,URL\n\n", "mine", &schema).unwrap();
    let other = parse_ranking_csv("Keyword,Pos,URL\n,3,/x\n", "other", &schema).unwrap();
    assert_eq!(other.rows_skipped, 1);

    let primary = SourceDataset::new("mine", mine.records);
    let comparisons = vec![SourceDataset::new("other", other.records)];
    assert_eq!(
        reconcile(&primary, &comparisons).unwrap_err(),
        CoreError::NothingToAnalyze
    );
}
