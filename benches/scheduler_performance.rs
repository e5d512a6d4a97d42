//! Performance benchmarks for rating updates and table scheduling

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Arc;
use table_matcher::rating::{EloRatingEngine, RatingEngine};
use table_matcher::roster::{CsvRosterStore, InMemoryRosterStore};
use table_matcher::types::{MatchResult, Player};
use table_matcher::{SessionScheduler, TableMatcherService};

fn bench_roster(count: usize) -> Vec<Player> {
    (1..=count)
        .map(|i| Player::new(i.to_string(), format!("Player {}", i), 900 + (i as i64 * 37) % 500))
        .collect()
}

fn bench_rating_update(c: &mut Criterion) {
    let engine = EloRatingEngine::default();

    c.bench_function("elo_update", |b| {
        b.iter(|| black_box(engine.compute_update(black_box(1210), black_box(1385), 2, 1)))
    });
}

fn bench_session_start(c: &mut Criterion) {
    let roster = bench_roster(64);

    c.bench_function("session_start_64_players_8_tables", |b| {
        b.iter(|| {
            let mut scheduler = SessionScheduler::new(Arc::new(EloRatingEngine::default()));
            black_box(scheduler.start_session(8, roster.clone()))
        })
    });
}

fn bench_record_and_refill(c: &mut Criterion) {
    let roster = bench_roster(64);

    c.bench_function("record_result_64_players", |b| {
        b.iter(|| {
            let mut players = roster.clone();
            let mut scheduler = SessionScheduler::new(Arc::new(EloRatingEngine::default()));
            let _ = scheduler.start_session(8, players.clone());

            for _ in 0..16 {
                let Some(seated) = scheduler.active_matches().first().cloned() else {
                    break;
                };
                let result = MatchResult {
                    winner_id: seated.player1_id,
                    loser_id: seated.player2_id,
                    winner_score: 2,
                    loser_score: 1,
                };
                let _ = black_box(scheduler.record_result(&mut players, &result));
            }
        })
    });
}

fn bench_service_record(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("service_record_in_memory", |b| {
        b.iter(|| {
            rt.block_on(async {
                let service = TableMatcherService::new(
                    "bench",
                    Default::default(),
                    Arc::new(InMemoryRosterStore::with_players(bench_roster(32))),
                    Arc::new(EloRatingEngine::default()),
                    Arc::new(table_matcher::metrics::MetricsCollector::new().unwrap()),
                );
                let snapshot = service.start_session(Some(4)).await.unwrap();
                let seated = &snapshot.active_matches[0];

                black_box(
                    service
                        .record_result(MatchResult {
                            winner_id: seated.player1_id.clone(),
                            loser_id: seated.player2_id.clone(),
                            winner_score: 2,
                            loser_score: 0,
                        })
                        .await,
                )
            })
        })
    });
}

fn bench_csv_parse(c: &mut Criterion) {
    let rendered = CsvRosterStore::render(&bench_roster(500)).unwrap();

    c.bench_function("csv_parse_500_players", |b| {
        b.iter(|| black_box(CsvRosterStore::parse(black_box(&rendered))))
    });
}

criterion_group!(
    benches,
    bench_rating_update,
    bench_session_start,
    bench_record_and_refill,
    bench_service_record,
    bench_csv_parse
);
criterion_main!(benches);
