// tests/catalog.rs
mod common;

use common::*;
use eden::catalog::{list_places, state_by_code, StateInfo};
use eden::config::consts::PLACES;
use eden::core::net::Throttle;
use eden::error::{EdenError, SourceError};
use eden::progress::NullProgress;
use eden::store::{read_table, CheckpointStore, ResumeState};

fn three_states() -> Vec<StateInfo> {
    ["al", "ak", "az"].iter().filter_map(|c| state_by_code(c).copied()).collect()
}

fn list(store: &CheckpointStore, client: &FakeClient) -> Result<eden::catalog::Catalog, EdenError> {
    list_places(store, client, BASE, &quick_fetch(), &Throttle::none(), &three_states(), &mut NullProgress)
}

#[test]
fn lists_every_state_and_finalizes() {
    let dir = tempfile::tempdir().unwrap();
    let store = CheckpointStore::new(dir.path());
    let client = FakeClient::new();
    client
        .page(&state_url("al"), &directory_page("alabama", &["birmingham", "mobile"]))
        .page(&state_url("ak"), &directory_page("alaska", &["juneau"]))
        .page(&state_url("az"), &directory_page("arizona", &["tucson", "mobile"]));

    let cat = list(&store, &client).unwrap();
    assert_eq!(cat.len(), 5);
    assert_eq!(store.state(PLACES), ResumeState::Complete);
    assert!(!store.checkpoint_path(PLACES).exists());

    let t = read_table(&store.final_path(PLACES)).unwrap();
    assert_eq!(t.headers(), &["Place", "State", "StateCode"]);
    assert_eq!(t.rows()[2][0].as_value(), Some("juneau"));
    assert_eq!(t.rows()[2][1].as_value(), Some("alaska"));

    client.reset_calls();
    assert_eq!(list(&store, &client).unwrap().len(), 5);
    assert!(client.calls().is_empty());
}

#[test]
fn resumes_at_the_first_unlisted_state() {
    let dir = tempfile::tempdir().unwrap();
    let store = CheckpointStore::new(dir.path());
    let client = FakeClient::new();
    client
        .page(&state_url("al"), &directory_page("alabama", &["birmingham"]))
        .fail(&state_url("ak"), SourceError::Unavailable("HTTP 403".into()));

    assert!(list(&store, &client).is_err());
    assert_eq!(store.state(PLACES), ResumeState::Partial);
    assert_eq!(read_table(&store.checkpoint_path(PLACES)).unwrap().len(), 1);

    let client = FakeClient::new();
    client
        .page(&state_url("ak"), &directory_page("alaska", &["juneau"]))
        .page(&state_url("az"), &directory_page("arizona", &["tucson"]));
    let cat = list(&store, &client).unwrap();

    assert_eq!(client.count(&state_url("al")), 0);
    assert_eq!(client.calls().len(), 2);
    let names: Vec<&str> = cat.places().iter().map(|p| p.place.as_str()).collect();
    assert_eq!(names, vec!["birmingham", "juneau", "tucson"]);
}

#[test]
fn state_without_a_page_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let store = CheckpointStore::new(dir.path());
    let client = FakeClient::new();
    client
        .page(&state_url("al"), &directory_page("alabama", &["birmingham"]))
        .page(&state_url("az"), &directory_page("arizona", &["tucson"]));

    let cat = list(&store, &client).unwrap();
    assert_eq!(cat.len(), 2);
    assert_eq!(store.state(PLACES), ResumeState::Complete);
}
