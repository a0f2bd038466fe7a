// tests/congress.rs
mod common;

use common::*;
use eden::config::consts::{col, DISTRICTS};
use eden::core::net::Throttle;
use eden::progress::{NullProgress, Progress};
use eden::scrape::{collect, retry_errored, DistrictSource};
use eden::specs::district::query_url;
use eden::store::{read_table, CheckpointStore, ResumeState};
use eden::table::{Cell, Table};

const TILES: &str = "http://tiles.test/query";
const IL_13: &str = r#"{"features":[{"attributes":{"STATE":"17","CD118":"13"}}]}"#;
const GA_10: &str = r#"{"features":[{"attributes":{"STATE":"13","CD118":"10"}}]}"#;
const IL_07: &str = r#"{"features":[{"attributes":{"STATE":"17","CD118":"07"}}]}"#;

fn master() -> Table {
    table(
        &[col::PLACE, col::STATE_CODE, col::LATITUDE, col::LONGITUDE],
        &[
            &["springfield", "il", "39.78", "-89.65"],
            &["nowhere", "il", "?", "?"],
            &["athens", "ga", "33.95", "-83.38"],
            &["chicago", "il", "41.88", "-87.63"],
        ],
    )
}

fn run(store: &CheckpointStore, client: &FakeClient, progress: &mut dyn Progress) -> Table {
    let src = DistrictSource::new(client, TILES);
    collect(store, &src, || Ok(master()), &quick_fetch(), &Throttle::none(), progress).unwrap()
}

/// Notes, per finished row, whether a checkpoint was on disk at that moment.
struct CheckpointWatch<'a> {
    store: &'a CheckpointStore,
    seen: Vec<(String, bool)>,
}

impl Progress for CheckpointWatch<'_> {
    fn item_done(&mut self, label: &str) {
        let on_disk = self.store.checkpoint_path(DISTRICTS).exists();
        self.seen.push((label.to_string(), on_disk));
    }
}

#[test]
fn rows_without_coordinates_are_missing_and_count_toward_checkpoints() {
    let dir = tempfile::tempdir().unwrap();
    let store = CheckpointStore::new(dir.path());
    let client = FakeClient::new();
    client
        .page(&query_url(TILES, "39.78", "-89.65"), IL_13)
        .page(&query_url(TILES, "33.95", "-83.38"), GA_10)
        .page(&query_url(TILES, "41.88", "-87.63"), IL_07);

    let mut watch = CheckpointWatch { store: &store, seen: Vec::new() };
    let t = run(&store, &client, &mut watch);

    let d = t.column(col::DISTRICT).unwrap();
    assert_eq!(t.get(0, d), &Cell::value("il-13"));
    assert_eq!(t.get(1, d), &Cell::Missing);
    assert_eq!(t.get(2, d), &Cell::value("ga-10"));
    assert_eq!(client.calls().len(), 3);

    // the second row, fetched or not, completes the first batch of two
    let seen = watch.seen;
    assert_eq!(seen.len(), 4);
    assert_eq!(seen[2], (String::from("athens, ga"), true));
    assert_eq!(store.state(DISTRICTS), ResumeState::Complete);
}

#[test]
fn tile_server_error_is_errored_and_retried_later() {
    let dir = tempfile::tempdir().unwrap();
    let store = CheckpointStore::new(dir.path());
    let client = FakeClient::new();
    let athens = query_url(TILES, "33.95", "-83.38");
    client
        .page(&query_url(TILES, "39.78", "-89.65"), IL_13)
        .page(&athens, r#"{"error":{"code":500,"message":"Unable to complete operation."}}"#)
        .page(&query_url(TILES, "41.88", "-87.63"), "<html>Bad Gateway</html>");

    let t = run(&store, &client, &mut NullProgress);
    let d = t.column(col::DISTRICT).unwrap();
    assert!(t.get(2, d).is_errored());
    assert!(t.get(3, d).is_errored());
    // one try plus one retry
    assert_eq!(client.count(&athens), 2);

    let ledger = read_table(&store.errors_path(DISTRICTS)).unwrap();
    assert_eq!(ledger.len(), 2);

    assert_eq!(retry_errored(&store, DISTRICTS).unwrap(), 2);
    client.reset_calls();
    client.page(&athens, GA_10).page(&query_url(TILES, "41.88", "-87.63"), IL_07);
    let t = run(&store, &client, &mut NullProgress);

    assert_eq!(client.calls().len(), 2);
    assert_eq!(t.get(2, d), &Cell::value("ga-10"));
    assert_eq!(t.get(3, d), &Cell::value("il-07"));
    assert!(!store.errors_path(DISTRICTS).exists());
}
