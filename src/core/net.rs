// src/core/net.rs
// Blocking HTTP GET (ureq), request classification, politeness delay, bounded retry.

use std::io::Read;
use std::thread;
use std::time::Duration;

use rand::Rng;

use crate::config::options::FetchOptions;
use crate::error::SourceError;

/// The only way the pipeline talks to the outside world.
pub trait HttpClient {
    fn get_bytes(&self, url: &str) -> Result<Vec<u8>, SourceError>;

    fn get_text(&self, url: &str) -> Result<String, SourceError> {
        let bytes = self.get_bytes(url)?;
        Ok(match String::from_utf8(bytes) {
            Ok(s) => s,
            Err(e) => String::from_utf8_lossy(&e.into_bytes()).into_owned(),
        })
    }
}

pub struct UreqClient {
    agent: ureq::Agent,
}

impl UreqClient {
    pub fn new(opts: &FetchOptions) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(opts.timeout_secs.min(15)))
            .timeout_read(opts.timeout())
            .timeout(opts.timeout() * 4) // whole zip downloads included
            .user_agent(&opts.user_agent)
            .build();
        Self { agent }
    }
}

impl HttpClient for UreqClient {
    fn get_bytes(&self, url: &str) -> Result<Vec<u8>, SourceError> {
        logd!("GET {url}");
        let resp = self.agent.get(url).call().map_err(|e| classify(url, e))?;
        let mut buf = Vec::new();
        resp.into_reader()
            .read_to_end(&mut buf)
            .map_err(|e| SourceError::Transient(format!("reading body of {url}: {e}")))?;
        Ok(buf)
    }
}

fn classify(url: &str, err: ureq::Error) -> SourceError {
    match err {
        ureq::Error::Status(404 | 410, _) => SourceError::NotFound(s!(url)),
        ureq::Error::Status(code, _) if code == 429 || code >= 500 => {
            SourceError::Transient(format!("HTTP {code} {url}"))
        }
        ureq::Error::Status(code, _) => SourceError::Unavailable(format!("HTTP {code} {url}")),
        ureq::Error::Transport(t) => match t.kind() {
            ureq::ErrorKind::Dns | ureq::ErrorKind::InvalidUrl | ureq::ErrorKind::UnknownScheme => {
                SourceError::Unavailable(format!("{url}: {t}"))
            }
            _ => SourceError::Transient(format!("{url}: {t}")),
        },
    }
}

/// Randomized pause between outbound requests to the same host.
pub struct Throttle {
    min_ms: u64,
    max_ms: u64,
}

impl Throttle {
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms: min_ms.min(max_ms), max_ms: max_ms.max(min_ms) }
    }

    pub fn from_options(opts: &FetchOptions) -> Self {
        Self::new(opts.delay_min_ms, opts.delay_max_ms)
    }

    /// No sleeping at all.
    pub fn none() -> Self {
        Self { min_ms: 0, max_ms: 0 }
    }

    pub fn next_delay(&self) -> Duration {
        if self.max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(self.min_ms..=self.max_ms))
    }

    pub fn pause(&self) {
        let d = self.next_delay();
        if !d.is_zero() {
            thread::sleep(d);
        }
    }
}

/// Run `f`, retrying `Transient` failures up to `opts.retries` more times with backoff.
/// Other errors return immediately.
pub fn with_retry<T>(
    opts: &FetchOptions,
    what: &str,
    mut f: impl FnMut() -> Result<T, SourceError>,
) -> Result<T, SourceError> {
    let mut attempt = 0u32;
    loop {
        match f() {
            Err(e) if e.is_transient() && attempt < opts.retries => {
                let wait = opts.backoff(attempt);
                logw!("{what}: {e}; retry {} of {} in {:?}", attempt + 1, opts.retries, wait);
                thread::sleep(wait);
                attempt += 1;
            }
            other => return other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn quick(retries: u32) -> FetchOptions {
        FetchOptions { retries, backoff_ms: 0, ..FetchOptions::default() }
    }

    #[test]
    fn retries_transient_then_succeeds() {
        let calls = Cell::new(0);
        let r = with_retry(&quick(3), "t", || {
            calls.set(calls.get() + 1);
            if calls.get() < 3 { Err(SourceError::Transient(s!("reset"))) } else { Ok(7) }
        });
        assert_eq!(r, Ok(7));
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn gives_up_after_bound() {
        let calls = Cell::new(0);
        let r: Result<(), _> = with_retry(&quick(2), "t", || {
            calls.set(calls.get() + 1);
            Err(SourceError::Transient(s!("timeout")))
        });
        assert!(matches!(r, Err(SourceError::Transient(_))));
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn does_not_retry_fatal() {
        let calls = Cell::new(0);
        let r: Result<(), _> = with_retry(&quick(5), "t", || {
            calls.set(calls.get() + 1);
            Err(SourceError::Unavailable(s!("dns")))
        });
        assert!(matches!(r, Err(SourceError::Unavailable(_))));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn throttle_stays_in_window() {
        let t = Throttle::new(900, 100); // swapped on purpose
        for _ in 0..50 {
            let d = t.next_delay().as_millis() as u64;
            assert!((100..=900).contains(&d));
        }
        assert!(Throttle::none().next_delay().is_zero());
    }
}
