// tests/common/mod.rs
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use eden::config::options::{EdenConfig, FetchOptions};
use eden::core::net::HttpClient;
use eden::error::SourceError;
use eden::table::{Cell, Table};

pub const BASE: &str = "http://places.test";

/// Canned responses by URL; unknown URLs are 404. Every request is logged.
#[derive(Clone, Default)]
pub struct FakeClient {
    responses: Rc<RefCell<HashMap<String, Result<Vec<u8>, SourceError>>>>,
    calls: Rc<RefCell<Vec<String>>>,
}

impl FakeClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(&self, url: &str, body: &str) -> &Self {
        self.responses.borrow_mut().insert(url.to_string(), Ok(body.as_bytes().to_vec()));
        self
    }

    pub fn bytes(&self, url: &str, body: Vec<u8>) -> &Self {
        self.responses.borrow_mut().insert(url.to_string(), Ok(body));
        self
    }

    pub fn fail(&self, url: &str, err: SourceError) -> &Self {
        self.responses.borrow_mut().insert(url.to_string(), Err(err));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn reset_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn count(&self, url: &str) -> usize {
        self.calls.borrow().iter().filter(|c| c.as_str() == url).count()
    }
}

impl HttpClient for FakeClient {
    fn get_bytes(&self, url: &str) -> Result<Vec<u8>, SourceError> {
        self.calls.borrow_mut().push(url.to_string());
        self.responses
            .borrow()
            .get(url)
            .cloned()
            .unwrap_or_else(|| Err(SourceError::NotFound(url.to_string())))
    }
}

/// No sleeping, one retry, small checkpoint interval.
pub fn quick_fetch() -> FetchOptions {
    FetchOptions {
        delay_min_ms: 0,
        delay_max_ms: 0,
        retries: 1,
        backoff_ms: 0,
        checkpoint_every: 2,
        max_consecutive_errors: 10,
        ..FetchOptions::default()
    }
}

pub fn config(root: &std::path::Path) -> EdenConfig {
    let mut cfg = EdenConfig::default();
    cfg.root = root.to_path_buf();
    cfg.fetch = quick_fetch();
    cfg.sources.bestplaces = BASE.to_string();
    cfg
}

/// Table from text cells; `""` is pending and `"?"` missing.
pub fn table(headers: &[&str], rows: &[&[&str]]) -> Table {
    let mut t = Table::new(headers.iter().map(|h| h.to_string()).collect());
    for r in rows {
        t.push_row(r.iter().map(|c| Cell::from_text(c)).collect());
    }
    t
}

pub fn county_page(county: &str) -> String {
    format!(
        r#"<html><body><h1>Place</h1><p><b>County:</b> <a href="/county/x/{c}">{county}</a></p></body></html>"#,
        c = county.to_lowercase().replace(' ', "_"),
    )
}

pub fn place_url(state: &str, place: &str) -> String {
    format!("{BASE}/city/{state}/{place}")
}

pub fn state_url(code: &str) -> String {
    format!("{BASE}/find/state.aspx?state={code}")
}

/// A state directory page listing `slugs` under `state`.
pub fn directory_page(state: &str, slugs: &[&str]) -> String {
    let links: String = slugs
        .iter()
        .map(|s| format!(r#"<a href="../city/{state}/{s}">{s}</a><br>"#))
        .collect();
    format!(r#"<html><body><div class="col-md-4">{links}</div></body></html>"#)
}
