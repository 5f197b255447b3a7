use crate::core::errors::{Error, Result};
use crate::core::registry::Registry;
use crate::core::source::RefreshOutcome;
use crate::core::transport::Transport;
use log::{info, warn};
use std::thread;

/*-------------------------------------------------------------------------------------------------
  Refresh Report
-------------------------------------------------------------------------------------------------*/

/// Per-source results of a [refresh_all] call, in registry order.
#[derive(Debug, Default)]
pub struct RefreshReport {
    pub results: Vec<(String, Result<RefreshOutcome>)>,
}

impl RefreshReport {
    /// Sources whose refresh attempt failed, with the error.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &Error)> {
        self.results
            .iter()
            .filter_map(|(key, result)| result.as_ref().err().map(|error| (key.as_str(), error)))
    }

    /// Number of sources whose feed was downloaded during this refresh.
    pub fn fetched(&self) -> usize {
        self.results
            .iter()
            .filter(|(_, result)| matches!(result, Ok(RefreshOutcome::Fetched { .. })))
            .count()
    }

    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }
}

/*-------------------------------------------------------------------------------------------------
  Refresh All Sources
-------------------------------------------------------------------------------------------------*/

/// Refresh every registered source concurrently, one thread per source, and wait for all of
/// them. A failing source is logged and reported; it never stops the others.
pub fn refresh_all(registry: &Registry, transport: &dyn Transport) -> RefreshReport {
    let results = thread::scope(|scope| {
        let handles: Vec<_> = registry
            .sources()
            .iter()
            .map(|source| (source.key(), scope.spawn(move || source.refresh(transport))))
            .collect();

        handles
            .into_iter()
            .map(|(key, handle)| {
                let result = handle
                    .join()
                    .unwrap_or_else(|panic| std::panic::resume_unwind(panic));
                (key.to_string(), result)
            })
            .collect()
    });

    let report = RefreshReport { results };

    for (key, error) in report.failures() {
        warn!("Failure updating source `{}`: {}", key, error);
    }
    info!(
        "Refreshed {} sources ({} downloaded, {} failed)",
        report.results.len(),
        report.fetched(),
        report.failures().count()
    );

    report
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::source::tests::{test_source, FAKE_FEED_JSON, FAKE_URL};
    use crate::core::transport::tests::{FakeResponse, FakeTransport};
    use test_log::test;

    const BROKEN_URL: &str = "https://www.example.com/broken.json";

    #[test]
    fn test_refresh_all_isolates_failures() {
        let directory = tempfile::tempdir().unwrap();
        let registry = Registry::from_sources(vec![
            test_source("fake", FAKE_URL, directory.path()),
            test_source("broken", BROKEN_URL, directory.path()),
        ])
        .unwrap();
        let transport = FakeTransport::new()
            .respond(FAKE_URL, FakeResponse::Body(FAKE_FEED_JSON.to_string()))
            .respond(BROKEN_URL, FakeResponse::Status(500));

        let report = refresh_all(&registry, &transport);

        assert_eq!(report.results.len(), 2);
        assert_eq!(report.results[0].0, "fake");
        assert_eq!(report.fetched(), 1);
        assert!(!report.is_success());

        let failures: Vec<&str> = report.failures().map(|(key, _)| key).collect();
        assert_eq!(failures, vec!["broken"]);

        assert_eq!(registry.get("fake").unwrap().snapshot().prefixes.len(), 2);
        assert!(registry.get("broken").unwrap().snapshot().prefixes.is_empty());
    }

    #[test]
    fn test_refresh_all_twice_fetches_each_source_once() {
        let directory = tempfile::tempdir().unwrap();
        let registry =
            Registry::from_sources(vec![test_source("fake", FAKE_URL, directory.path())]).unwrap();
        let transport = FakeTransport::new()
            .respond(FAKE_URL, FakeResponse::Body(FAKE_FEED_JSON.to_string()));

        assert!(refresh_all(&registry, &transport).is_success());
        let second = refresh_all(&registry, &transport);

        assert!(matches!(second.results[0].1, Ok(RefreshOutcome::Fresh)));
        assert_eq!(transport.requests(), 1);
    }

    #[test]
    fn test_refresh_all_empty_registry() {
        let registry = Registry::from_sources(Vec::new()).unwrap();
        let report = refresh_all(&registry, &FakeTransport::new());
        assert!(report.results.is_empty());
        assert!(report.is_success());
    }
}
