use crate::core::category::{self, Category};
use crate::core::errors::{Error, Result};
use crate::core::feeds::FeedFormat;
use crate::core::source::Source;
use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;

/*-------------------------------------------------------------------------------------------------
  Source Definitions
-------------------------------------------------------------------------------------------------*/

struct SourceDefinition {
    key: &'static str,
    url: &'static str,
    name: &'static str,
    description: &'static str,
    categories: &'static [&'static str],
    refresh_hours: u64,
    format: FeedFormat,
}

const SOURCE_DEFINITIONS: [SourceDefinition; 6] = [
    SourceDefinition {
        key: "aws",
        url: "https://ip-ranges.amazonaws.com/ip-ranges.json",
        name: "Amazon AWS",
        description: "Amazon AWS IP Ranges",
        categories: &["datacenter"],
        refresh_hours: 48,
        format: FeedFormat::Aws,
    },
    SourceDefinition {
        key: "google",
        url: "https://www.gstatic.com/ipranges/cloud.json",
        name: "Google Cloud",
        description: "Google Cloud IP Ranges",
        categories: &["datacenter"],
        refresh_hours: 48,
        format: FeedFormat::GoogleCloud,
    },
    SourceDefinition {
        key: "googlebot",
        url: "https://developers.google.com/static/search/apis/ipranges/googlebot.json",
        name: "GoogleBot",
        description: "GoogleBot IP Ranges of the main crawlers",
        categories: &["crawler"],
        refresh_hours: 24,
        format: FeedFormat::GoogleBot,
    },
    SourceDefinition {
        key: "googlebot-special",
        url: "https://developers.google.com/static/search/apis/ipranges/special-crawlers.json",
        name: "GoogleBot Special Crawlers",
        description: "GoogleBot IP Ranges of the special crawlers",
        categories: &["crawler"],
        refresh_hours: 24,
        format: FeedFormat::GoogleBot,
    },
    SourceDefinition {
        key: "google-user-triggered-fetchers-google",
        url: "https://developers.google.com/static/search/apis/ipranges/user-triggered-fetchers-google.json",
        name: "GoogleBot Users Triggered (Google)",
        description: "GoogleBot IP Ranges of the user triggered crawlers (google IPs)",
        categories: &["crawler"],
        refresh_hours: 24,
        format: FeedFormat::GoogleBot,
    },
    SourceDefinition {
        key: "bingbot",
        url: "https://www.bing.com/toolbox/bingbot.json",
        name: "BingBot",
        description: "BingBot IP Ranges",
        categories: &["crawler"],
        refresh_hours: 24,
        format: FeedFormat::BingBot,
    },
];

/*-------------------------------------------------------------------------------------------------
  Registry
-------------------------------------------------------------------------------------------------*/

/// The fixed set of sources known to the process, built once at startup.
///
/// Sources iterate in registration order. Keys and URLs are pairwise distinct.
#[derive(Debug)]
pub struct Registry {
    sources: Vec<Source>,
}

impl Registry {
    /// Build the registry of built-in sources, caching their snapshots in `data_dir`.
    pub fn new(data_dir: &Path) -> Result<Self> {
        let sources = SOURCE_DEFINITIONS
            .iter()
            .map(|definition| {
                let categories = definition
                    .categories
                    .iter()
                    .map(|id| {
                        Category::by_id(id).ok_or_else(|| {
                            Error::config(format!(
                                "Unknown category `{}` on source `{}`",
                                id, definition.key
                            ))
                        })
                    })
                    .collect::<Result<Vec<Category>>>()?;

                Ok(Source::new(
                    definition.key,
                    definition.url,
                    definition.name,
                    definition.description,
                    categories,
                    Duration::from_secs(definition.refresh_hours * 60 * 60),
                    data_dir,
                    definition.format,
                ))
            })
            .collect::<Result<Vec<Source>>>()?;

        Self::from_sources(sources)
    }

    /// Build a registry from explicit sources, rejecting duplicate keys or URLs. Cache files
    /// are `<data_dir>/<key>.bin`, so unique keys within one data directory give unique files.
    pub fn from_sources(sources: Vec<Source>) -> Result<Self> {
        let mut keys = BTreeSet::new();
        let mut urls = BTreeSet::new();

        for source in &sources {
            if !keys.insert(source.key()) {
                return Err(Error::config(format!(
                    "Duplicate source key: `{}`",
                    source.key()
                )));
            }
            if !urls.insert(source.url()) {
                return Err(Error::config(format!(
                    "Duplicate URL: `{}` on the source `{}`",
                    source.url(),
                    source.name()
                )));
            }
            if source.categories().iter().any(|category| category.id.is_empty()) {
                return Err(Error::config(format!(
                    "Invalid category on the source `{}`",
                    source.name()
                )));
            }
        }

        Ok(Self { sources })
    }

    /*-------------------------------------------------------------------------
      Getters
    -------------------------------------------------------------------------*/

    /// All sources in registration order.
    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub fn get(&self, key: &str) -> Option<&Source> {
        self.sources.iter().find(|source| source.key() == key)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// The fixed category catalog.
    pub fn categories(&self) -> &'static [Category] {
        category::categories()
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
