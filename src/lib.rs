//! Find which published IP ranges contain an IP address.
//!
//! `whoip` keeps a registry of public IP-range feeds (Amazon AWS, Google Cloud, the GoogleBot
//! crawler lists and BingBot), refreshes each feed on its own interval, caches the parsed
//! snapshots on disk, and answers lookups against the in-memory snapshots.
//!
//! ```no_run
//! let data_dir = std::env::temp_dir().join("whoip");
//! std::fs::create_dir_all(&data_dir).unwrap();
//!
//! let client = whoip::ClientBuilder::new(&data_dir).build().unwrap();
//! for found in client.find_ip("66.249.66.1".parse().unwrap()) {
//!     let categories: Vec<&str> = found.categories.iter().map(|c| c.id.as_str()).collect();
//!     println!("{} {} [{}]", found.name, found.prefix.network, categories.join(", "));
//! }
//! ```

mod core;

/*-------------------------------------------------------------------------------------------------
  Library Interface
-------------------------------------------------------------------------------------------------*/

pub use crate::core::category::{categories, Category};
pub use crate::core::client::{find_ip, Client, ClientBuilder};
pub use crate::core::errors::{Error, Result};
pub use crate::core::feeds::{FeedFormat, FeedParser, ParsedFeed};
pub use crate::core::lookup::{Match, MatchedPrefix};
pub use crate::core::prefix::Prefix;
pub use crate::core::refresh::{refresh_all, RefreshReport};
pub use crate::core::registry::Registry;
pub use crate::core::snapshot::Snapshot;
pub use crate::core::source::{RefreshOutcome, Source, SourceStatus};
pub use crate::core::transport::{HttpTransport, Transport};

/// Lower-level access to the snapshot cache and the lookup scan.
pub mod cache {
    pub use crate::core::lookup::find_ip;
    pub use crate::core::snapshot::{load, save};
}

pub use ipnetwork;
