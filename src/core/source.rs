use crate::core::category::Category;
use crate::core::errors::Result;
use crate::core::feeds::FeedParser;
use crate::core::prefix::Prefix;
use crate::core::snapshot::{self, Snapshot};
use crate::core::transport::Transport;
use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use log::{debug, error, info, trace, warn};
use parking_lot::Mutex;
use serde::Serialize;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/*-------------------------------------------------------------------------------------------------
  Source
-------------------------------------------------------------------------------------------------*/

/// A named IP-range feed with its locally cached snapshot.
///
/// Refreshes are serialized by a per-source lock. The snapshot itself is published through an
/// [ArcSwap]: a refresh builds a complete new [Snapshot] and swaps it in, so lookups running
/// concurrently with a refresh see either the old or the new snapshot, never a mix.
#[derive(Debug)]
pub struct Source {
    key: String,
    url: String,
    name: String,
    description: String,
    categories: Vec<Category>,
    refresh_interval: Duration,
    cache_file: PathBuf,
    parser: Box<dyn FeedParser>,

    snapshot: ArcSwap<Snapshot>,
    refresh_lock: Mutex<()>,
}

/// How a [Source::refresh] call brought the snapshot up to date.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RefreshOutcome {
    /// The in-memory snapshot was still fresh; no I/O.
    Fresh,

    /// A fresh snapshot was adopted from the cache file; no network request.
    LoadedFromCache,

    /// The feed was downloaded and parsed.
    Fetched {
        prefixes: usize,
        skipped: usize,

        /// Whether the new snapshot was written to the cache file.
        persisted: bool,
    },
}

/// Point-in-time summary of a source, for status listings.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct SourceStatus {
    pub key: String,
    pub name: String,
    pub url: String,
    pub refresh_interval_secs: u64,
    pub last_update: Option<DateTime<Utc>>,
    pub prefixes: usize,
}

/*--------------------------------------------------------------------------------------
  Source Implementation
--------------------------------------------------------------------------------------*/

impl Source {
    /// Create a source with an empty snapshot. The snapshot is cached at
    /// `<data_dir>/<key>.bin`.
    #[allow(clippy::too_many_arguments)]
    pub fn new<P: FeedParser + 'static>(
        key: &str,
        url: &str,
        name: &str,
        description: &str,
        categories: Vec<Category>,
        refresh_interval: Duration,
        data_dir: &Path,
        parser: P,
    ) -> Self {
        Self {
            key: key.to_string(),
            url: url.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            categories,
            refresh_interval,
            cache_file: data_dir.join(format!("{key}.bin")),
            parser: Box::new(parser),
            snapshot: ArcSwap::from_pointee(Snapshot::default()),
            refresh_lock: Mutex::new(()),
        }
    }

    /*-------------------------------------------------------------------------
      Getters
    -------------------------------------------------------------------------*/

    /// Registry key, also the cache file stem.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Default categories reported for prefixes that carry no override.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    pub fn cache_file(&self) -> &Path {
        &self.cache_file
    }

    /// The current snapshot. Holding the returned [Arc] keeps that snapshot alive even if a
    /// refresh replaces it meanwhile.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshot.load_full()
    }

    pub fn status(&self) -> SourceStatus {
        let snapshot = self.snapshot.load();
        SourceStatus {
            key: self.key.clone(),
            name: self.name.clone(),
            url: self.url.clone(),
            refresh_interval_secs: self.refresh_interval.as_secs(),
            last_update: (snapshot.last_update != DateTime::<Utc>::default())
                .then_some(snapshot.last_update),
            prefixes: snapshot.prefixes.len(),
        }
    }

    /*-------------------------------------------------------------------------
      Containment
    -------------------------------------------------------------------------*/

    /// The first prefix, in feed document order, that contains `ip`.
    pub fn contains_ip(&self, ip: IpAddr) -> Option<Prefix> {
        self.snapshot
            .load()
            .prefixes
            .iter()
            .find(|prefix| prefix.contains(ip))
            .cloned()
    }

    /*-------------------------------------------------------------------------
      Refresh
    -------------------------------------------------------------------------*/

    /// Bring the snapshot up to date, downloading the feed only when neither the in-memory
    /// snapshot nor the cache file is younger than the refresh interval.
    ///
    /// On a fetch or parse failure the current snapshot keeps serving lookups and the error is
    /// returned. If the cache file held a readable snapshot that is stale but newer than the
    /// in-memory one, that snapshot is adopted first.
    pub fn refresh(&self, transport: &dyn Transport) -> Result<RefreshOutcome> {
        let _guard = self.refresh_lock.lock();

        // Freshness check
        if self.snapshot.load().is_fresh(self.refresh_interval) {
            trace!("{}: snapshot is fresh", self.key);
            return Ok(RefreshOutcome::Fresh);
        }

        // Disk fallback
        let stale_cached = match snapshot::load(&self.cache_file) {
            Ok(cached) if cached.is_fresh(self.refresh_interval) => {
                info!(
                    "{}: using fresh cache file {:?} updated at {}",
                    self.key, self.cache_file, cached.last_update
                );
                self.snapshot.store(Arc::new(cached));
                return Ok(RefreshOutcome::LoadedFromCache);
            }
            Ok(cached) => {
                debug!(
                    "{}: cache file updated at {} is stale",
                    self.key, cached.last_update
                );
                Some(cached)
            }
            Err(_) => None,
        };

        // Network fetch and parse
        let parsed = transport
            .get(&self.url)
            .and_then(|body| self.parser.parse(&body));

        let parsed = match parsed {
            Ok(parsed) => parsed,
            Err(error) => {
                error!("{}: failed to refresh from {}: {}", self.key, self.url, error);
                if let Some(cached) = stale_cached {
                    if cached.last_update > self.snapshot.load().last_update {
                        warn!(
                            "{}: serving stale cache file updated at {}",
                            self.key, cached.last_update
                        );
                        self.snapshot.store(Arc::new(cached));
                    }
                }
                return Err(error);
            }
        };

        // Commit
        let prefixes = parsed.prefixes.len();
        let skipped = parsed.skipped;
        let fresh = Arc::new(Snapshot::new(parsed.prefixes));
        self.snapshot.store(Arc::clone(&fresh));
        info!("{}: refreshed {} prefixes from {}", self.key, prefixes, self.url);

        let persisted = snapshot::save(&self.cache_file, &fresh).is_ok();

        Ok(RefreshOutcome::Fetched {
            prefixes,
            skipped,
            persisted,
        })
    }

    /// Adopt the cache file's snapshot regardless of its age, for use without network access.
    /// Returns whether a snapshot was adopted; a cache file older than the in-memory snapshot
    /// is ignored.
    pub fn load_cached(&self) -> bool {
        let _guard = self.refresh_lock.lock();

        match snapshot::load(&self.cache_file) {
            Ok(cached) if cached.last_update > self.snapshot.load().last_update => {
                debug!(
                    "{}: adopted cache file updated at {}",
                    self.key, cached.last_update
                );
                self.snapshot.store(Arc::new(cached));
                true
            }
            _ => false,
        }
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::errors::{log_error, Error};
    use crate::core::feeds::FeedFormat;
    use crate::core::transport::tests::{FakeResponse, FakeTransport};
    use std::fs;
    use std::thread;
    use test_log::test;

    /*----------------------------------------------------------------------------------
      Test Helper Functions
    ----------------------------------------------------------------------------------*/

    pub(crate) const FAKE_URL: &str = "https://www.example.com/ranges.json";

    pub(crate) const FAKE_FEED_JSON: &str = r#"{
      "syncToken": "1640995200",
      "createDate": "2022-01-01-00-00-00",
      "prefixes": [
        {
          "ip_prefix": "192.168.1.0/24",
          "region": "us-west-1",
          "service": "FakeService1",
          "network_border_group": "us-west-1"
        },
        {
          "ip_prefix": "10.0.0.0/8",
          "region": "us-east-1",
          "service": "FakeService2",
          "network_border_group": "us-east-1"
        }
      ]
    }"#;

    pub(crate) fn test_source(key: &str, url: &str, data_dir: &Path) -> Source {
        Source::new(
            key,
            url,
            "Fake Source",
            "A fake source for testing purposes",
            vec![Category::by_id("datacenter").unwrap()],
            Duration::from_secs(60),
            data_dir,
            FeedFormat::Aws,
        )
    }

    fn fake_transport() -> FakeTransport {
        FakeTransport::new().respond(FAKE_URL, FakeResponse::Body(FAKE_FEED_JSON.to_string()))
    }

    /*----------------------------------------------------------------------------------
      Refresh
    ----------------------------------------------------------------------------------*/

    #[test]
    fn test_refresh_fetches_and_finds_ip() {
        let directory = tempfile::tempdir().unwrap();
        let source = test_source("fake", FAKE_URL, directory.path());
        let transport = fake_transport();

        let outcome = source.refresh(&transport).inspect_err(log_error).unwrap();
        assert_eq!(
            outcome,
            RefreshOutcome::Fetched {
                prefixes: 2,
                skipped: 0,
                persisted: true
            }
        );
        assert_eq!(transport.requests(), 1);
        assert!(source.snapshot().is_fresh(source.refresh_interval()));
        assert!(source.cache_file().exists());

        let prefix = source.contains_ip("192.168.1.5".parse().unwrap()).unwrap();
        assert_eq!(prefix.details["Service"], "FakeService1");
        assert_eq!(prefix.details["Region"], "us-west-1");

        assert_eq!(source.contains_ip("8.8.8.8".parse().unwrap()), None);
    }

    #[test]
    fn test_refresh_twice_fetches_once() {
        let directory = tempfile::tempdir().unwrap();
        let source = test_source("fake", FAKE_URL, directory.path());
        let transport = fake_transport();

        source.refresh(&transport).unwrap();
        let outcome = source.refresh(&transport).unwrap();

        assert_eq!(outcome, RefreshOutcome::Fresh);
        assert_eq!(transport.requests(), 1);
    }

    #[test]
    fn test_concurrent_refreshes_fetch_once() {
        let directory = tempfile::tempdir().unwrap();
        let source = test_source("fake", FAKE_URL, directory.path());
        let transport = fake_transport().delay(Duration::from_millis(50));

        thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| source.refresh(&transport)))
                .collect();
            for handle in handles {
                assert!(handle.join().unwrap().is_ok());
            }
        });

        assert_eq!(transport.requests(), 1);
        assert_eq!(source.snapshot().prefixes.len(), 2);
    }

    #[test]
    fn test_lookups_during_refresh_see_whole_snapshots() {
        let directory = tempfile::tempdir().unwrap();
        let source = test_source("fake", FAKE_URL, directory.path());
        let transport = fake_transport().delay(Duration::from_millis(20));

        thread::scope(|scope| {
            scope.spawn(|| source.refresh(&transport));
            for _ in 0..50 {
                let length = source.snapshot().prefixes.len();
                assert!(length == 0 || length == 2);
                thread::sleep(Duration::from_millis(1));
            }
        });

        assert_eq!(source.snapshot().prefixes.len(), 2);
    }

    #[test]
    fn test_refresh_uses_fresh_cache_file() {
        let directory = tempfile::tempdir().unwrap();
        let writer = test_source("fake", FAKE_URL, directory.path());
        writer.refresh(&fake_transport()).unwrap();

        // A second instance (another process/run) sharing the data directory
        let reader = test_source("fake", FAKE_URL, directory.path());
        let transport = fake_transport();
        let outcome = reader.refresh(&transport).unwrap();

        assert_eq!(outcome, RefreshOutcome::LoadedFromCache);
        assert_eq!(transport.requests(), 0);
        assert_eq!(reader.snapshot(), writer.snapshot());
    }

    #[test]
    fn test_refresh_ignores_stale_cache_file() {
        let directory = tempfile::tempdir().unwrap();
        let source = test_source("fake", FAKE_URL, directory.path());
        let stale = Snapshot {
            last_update: Utc::now() - chrono::Duration::hours(1),
            prefixes: Vec::new(),
        };
        snapshot::save(source.cache_file(), &stale).unwrap();

        let transport = fake_transport();
        let outcome = source.refresh(&transport).unwrap();

        assert!(matches!(outcome, RefreshOutcome::Fetched { prefixes: 2, .. }));
        assert_eq!(transport.requests(), 1);
    }

    #[test]
    fn test_refresh_after_corrupt_cache_file_fetches() {
        let directory = tempfile::tempdir().unwrap();
        let source = test_source("fake", FAKE_URL, directory.path());
        fs::write(source.cache_file(), b"{\"last_update\": \"2024-").unwrap();

        let transport = fake_transport();
        let outcome = source.refresh(&transport).inspect_err(log_error).unwrap();

        assert!(matches!(
            outcome,
            RefreshOutcome::Fetched {
                persisted: true,
                ..
            }
        ));
        assert_eq!(transport.requests(), 1);
        assert_eq!(snapshot::load(source.cache_file()).unwrap(), *source.snapshot());
    }

    #[test]
    fn test_refresh_http_error_keeps_snapshot() {
        let directory = tempfile::tempdir().unwrap();
        let source = test_source("fake", FAKE_URL, directory.path());
        let failing = FakeTransport::new().respond(FAKE_URL, FakeResponse::Status(500));

        let result = source.refresh(&failing);
        assert!(matches!(result, Err(Error::HttpStatus { .. })));
        assert!(source.snapshot().prefixes.is_empty());
        assert_eq!(source.contains_ip("192.168.1.5".parse().unwrap()), None);
    }

    #[test]
    fn test_refresh_failure_serves_stale_cache_file() {
        let directory = tempfile::tempdir().unwrap();
        let source = test_source("fake", FAKE_URL, directory.path());
        let stale = Snapshot {
            last_update: Utc::now() - chrono::Duration::hours(1),
            prefixes: crate::core::prefix::tests::test_prefixes(),
        };
        snapshot::save(source.cache_file(), &stale).unwrap();

        let failing = FakeTransport::new().respond(FAKE_URL, FakeResponse::Status(503));
        assert!(source.refresh(&failing).is_err());

        assert_eq!(*source.snapshot(), stale);
        assert!(source.contains_ip("10.1.2.3".parse().unwrap()).is_some());

        // Stale data does not suppress the next network attempt
        let transport = fake_transport();
        source.refresh(&transport).unwrap();
        assert_eq!(transport.requests(), 1);
    }

    #[test]
    fn test_refresh_malformed_feed_keeps_snapshot() {
        let directory = tempfile::tempdir().unwrap();
        let source = test_source("fake", FAKE_URL, directory.path());
        source.refresh(&fake_transport()).unwrap();
        let before = source.snapshot();

        // Force the next refresh past the freshness check
        source.snapshot.store(Arc::new(Snapshot {
            last_update: Utc::now() - chrono::Duration::hours(1),
            ..(*before).clone()
        }));
        fs::remove_file(source.cache_file()).unwrap();

        let garbage = FakeTransport::new().respond(FAKE_URL, FakeResponse::Body("[1, 2".into()));
        let result = source.refresh(&garbage);

        assert!(matches!(result, Err(Error::Decode(_))));
        assert_eq!(source.snapshot().prefixes, before.prefixes);
    }

    #[test]
    fn test_refresh_unwritable_cache_still_commits() {
        let directory = tempfile::tempdir().unwrap();
        // A regular file where the data directory should be
        let not_a_directory = directory.path().join("data");
        fs::write(&not_a_directory, b"").unwrap();
        let source = test_source("fake", FAKE_URL, &not_a_directory);

        let outcome = source.refresh(&fake_transport()).unwrap();

        assert!(matches!(
            outcome,
            RefreshOutcome::Fetched {
                persisted: false,
                ..
            }
        ));
        assert_eq!(source.snapshot().prefixes.len(), 2);
    }

    /*----------------------------------------------------------------------------------
      Load Cached / Status
    ----------------------------------------------------------------------------------*/

    #[test]
    fn test_load_cached_adopts_stale_snapshot() {
        let directory = tempfile::tempdir().unwrap();
        let source = test_source("fake", FAKE_URL, directory.path());
        assert!(!source.load_cached()); // No cache file yet

        let stale = Snapshot {
            last_update: Utc::now() - chrono::Duration::days(30),
            prefixes: crate::core::prefix::tests::test_prefixes(),
        };
        snapshot::save(source.cache_file(), &stale).unwrap();

        assert!(source.load_cached());
        assert_eq!(*source.snapshot(), stale);
        assert!(!source.load_cached()); // Not newer than the in-memory snapshot
    }

    #[test]
    fn test_status() {
        let directory = tempfile::tempdir().unwrap();
        let source = test_source("fake", FAKE_URL, directory.path());

        let status = source.status();
        assert_eq!(status.key, "fake");
        assert_eq!(status.refresh_interval_secs, 60);
        assert_eq!(status.last_update, None);
        assert_eq!(status.prefixes, 0);

        source.refresh(&fake_transport()).unwrap();
        let status = source.status();
        assert!(status.last_update.is_some());
        assert_eq!(status.prefixes, 2);
    }
}
