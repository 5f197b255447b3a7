use crate::core::category::{self, Category};
use crate::core::errors::Result;
use crate::core::lookup::{self, Match};
use crate::core::refresh::{self, RefreshReport};
use crate::core::registry::Registry;
use crate::core::source::SourceStatus;
use crate::core::transport::{HttpTransport, Transport};
use crate::core::utils::get_env_var;
use log::info;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/*-------------------------------------------------------------------------------------------------
  Simple Interface
-------------------------------------------------------------------------------------------------*/

/// _**Simple library interface**_ that refreshes the built-in sources (cached in `data_dir`)
/// and returns the sources whose published ranges contain `ip`.
///
/// ```no_run
/// let data_dir = std::env::temp_dir().join("whoip");
/// std::fs::create_dir_all(&data_dir).unwrap();
///
/// let matches = whoip::find_ip(&data_dir, "66.249.66.1".parse().unwrap()).unwrap();
/// for found in &matches {
///     println!("{} {}", found.name, found.prefix.network);
/// }
/// ```
pub fn find_ip(data_dir: &Path, ip: IpAddr) -> Result<Vec<Match>> {
    Ok(ClientBuilder::new(data_dir).build()?.find_ip(ip))
}

/*-------------------------------------------------------------------------------------------------
  Client Builder
-------------------------------------------------------------------------------------------------*/

/// A builder for the [Client] struct that allows you to customize the client configuration.
///
/// ```
/// let client = whoip::ClientBuilder::with_defaults(std::env::temp_dir().join("whoip"))
///     .request_timeout(2000) // 2 seconds
///     .retry_count(3)
///     .retry_initial_delay(100) // 100 ms
///     .retry_backoff_factor(2)
///     .refresh_on_lookup(false)
///     .build()
///     .unwrap();
///
/// assert_eq!(client.request_timeout(), 2000);
/// assert!(!client.refresh_on_lookup());
/// ```
///
/// The [ClientBuilder::new] method sources configuration values from environment variables when
/// set and uses default values when they are not. [ClientBuilder::with_defaults] ignores the
/// environment.
#[derive(Clone, Debug)]
pub struct ClientBuilder {
    data_dir: PathBuf,
    request_timeout: u64,
    retry_count: u32,
    retry_initial_delay: u64,
    retry_backoff_factor: u64,
    refresh_on_lookup: bool,
    registry: Option<Arc<Registry>>,
    transport: Option<Arc<dyn Transport>>,
}

/*--------------------------------------------------------------------------------------
  Client Builder Implementation
--------------------------------------------------------------------------------------*/

impl ClientBuilder {
    /// Create a new [ClientBuilder] with default configuration values, caching snapshots in
    /// `data_dir`. The directory must exist and be writable.
    ///
    /// ```
    /// let builder = whoip::ClientBuilder::with_defaults("/tmp/whoip");
    /// let client = builder.build().unwrap();
    ///
    /// assert_eq!(client.request_timeout(), 5000);
    /// assert_eq!(client.retry_count(), 1);
    /// assert_eq!(client.retry_initial_delay(), 200);
    /// assert_eq!(client.retry_backoff_factor(), 2);
    /// assert!(client.refresh_on_lookup());
    /// ```
    pub fn with_defaults<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            request_timeout: 5000, // 5 seconds
            retry_count: 1,
            retry_initial_delay: 200, // 200 ms
            retry_backoff_factor: 2,
            refresh_on_lookup: true,
            registry: None,
            transport: None,
        }
    }

    /// Create a new [ClientBuilder] reading initial configuration values from environment
    /// variables when set and default values when the environment variables are not set.
    ///
    /// The environment variables used to set the initial configuration values are:
    /// - `WHOIP_REQUEST_TIMEOUT`
    /// - `WHOIP_RETRY_COUNT`
    /// - `WHOIP_RETRY_INITIAL_DELAY`
    /// - `WHOIP_RETRY_BACKOFF_FACTOR`
    /// - `WHOIP_REFRESH_ON_LOOKUP`
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        let default = ClientBuilder::with_defaults(data_dir);

        Self {
            request_timeout: get_env_var("WHOIP_REQUEST_TIMEOUT", default.request_timeout),
            retry_count: get_env_var("WHOIP_RETRY_COUNT", default.retry_count),
            retry_initial_delay: get_env_var(
                "WHOIP_RETRY_INITIAL_DELAY",
                default.retry_initial_delay,
            ),
            retry_backoff_factor: get_env_var(
                "WHOIP_RETRY_BACKOFF_FACTOR",
                default.retry_backoff_factor,
            ),
            refresh_on_lookup: get_env_var("WHOIP_REFRESH_ON_LOOKUP", default.refresh_on_lookup),
            ..default
        }
    }

    /*-------------------------------------------------------------------------
      Setters
    -------------------------------------------------------------------------*/

    /// Set the maximum time (in milliseconds) a single feed request may take; defaults to
    /// `5000` milliseconds (5 seconds).
    pub fn request_timeout(&mut self, request_timeout: u64) -> &mut Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Set the number of attempts made to download a feed per refresh; defaults to `1`.
    pub fn retry_count(&mut self, retry_count: u32) -> &mut Self {
        self.retry_count = retry_count;
        self
    }

    /// Set the initial delay (in milliseconds) between download attempts; defaults to `200`
    /// milliseconds.
    ///
    /// The delay between retry attempts is calculated as:
    /// `retry_initial_delay * (retry_backoff_factor ^ attempt)`.
    pub fn retry_initial_delay(&mut self, retry_initial_delay: u64) -> &mut Self {
        self.retry_initial_delay = retry_initial_delay;
        self
    }

    /// Set the backoff factor used to increase the delay between download attempts; defaults
    /// to `2`.
    pub fn retry_backoff_factor(&mut self, retry_backoff_factor: u64) -> &mut Self {
        self.retry_backoff_factor = retry_backoff_factor;
        self
    }

    /// Set whether [Client::find_ip] refreshes every source before answering; defaults to
    /// `true`. When disabled, lookups answer from cached snapshots only.
    pub fn refresh_on_lookup(&mut self, refresh_on_lookup: bool) -> &mut Self {
        self.refresh_on_lookup = refresh_on_lookup;
        self
    }

    /// Use `registry` instead of the built-in sources.
    pub fn registry(&mut self, registry: Registry) -> &mut Self {
        self.registry = Some(Arc::new(registry));
        self
    }

    /// Use `transport` instead of the HTTP transport built from the timeout and retry settings.
    pub fn transport(&mut self, transport: Arc<dyn Transport>) -> &mut Self {
        self.transport = Some(transport);
        self
    }

    /*-------------------------------------------------------------------------
      Build Method
    -------------------------------------------------------------------------*/

    pub fn build(&self) -> Result<Client> {
        let registry = match &self.registry {
            Some(registry) => Arc::clone(registry),
            None => Arc::new(Registry::new(&self.data_dir)?),
        };

        let transport = match &self.transport {
            Some(transport) => Arc::clone(transport),
            None => Arc::new(HttpTransport::new(
                self.request_timeout,
                self.retry_count,
                self.retry_initial_delay,
                self.retry_backoff_factor,
            )?),
        };

        Ok(Client {
            data_dir: self.data_dir.clone(),
            request_timeout: self.request_timeout,
            retry_count: self.retry_count,
            retry_initial_delay: self.retry_initial_delay,
            retry_backoff_factor: self.retry_backoff_factor,
            refresh_on_lookup: self.refresh_on_lookup,
            registry,
            transport,
        })
    }
}

/*-------------------------------------------------------------------------------------------------
  Client
-------------------------------------------------------------------------------------------------*/

/// Answers "which published ranges contain this IP?" across all registered sources, refreshing
/// their snapshots from the network or the local cache as needed.
///
/// A [Client] is cheap to clone; clones share the registry (and so the snapshots and refresh
/// locks) and the transport.
#[derive(Clone, Debug)]
pub struct Client {
    data_dir: PathBuf,
    request_timeout: u64,
    retry_count: u32,
    retry_initial_delay: u64,
    retry_backoff_factor: u64,
    refresh_on_lookup: bool,
    registry: Arc<Registry>,
    transport: Arc<dyn Transport>,
}

/*--------------------------------------------------------------------------------------
  Client Implementation
--------------------------------------------------------------------------------------*/

impl Client {
    /*-------------------------------------------------------------------------
      Getters
    -------------------------------------------------------------------------*/

    /// Directory holding the per-source snapshot cache files.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn request_timeout(&self) -> u64 {
        self.request_timeout
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    pub fn retry_initial_delay(&self) -> u64 {
        self.retry_initial_delay
    }

    pub fn retry_backoff_factor(&self) -> u64 {
        self.retry_backoff_factor
    }

    pub fn refresh_on_lookup(&self) -> bool {
        self.refresh_on_lookup
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /*-------------------------------------------------------------------------
      Operations
    -------------------------------------------------------------------------*/

    /// Refresh every source concurrently; see [refresh_all](crate::refresh_all).
    pub fn refresh(&self) -> RefreshReport {
        refresh::refresh_all(&self.registry, self.transport.as_ref())
    }

    /// Adopt each source's cache file regardless of age. Returns the number of sources that
    /// adopted a snapshot.
    pub fn load_cached(&self) -> usize {
        let loaded = self
            .registry
            .sources()
            .iter()
            .filter(|source| source.load_cached())
            .count();
        info!("Loaded {} cached snapshots from: {:?}", loaded, self.data_dir);
        loaded
    }

    /// Find the sources whose ranges contain `ip`.
    ///
    /// With refresh-on-lookup enabled (the default) every source is refreshed first, so this
    /// blocks for at most the request timeout (times the retry budget) when feeds are stale.
    /// Failed refreshes are logged and the lookup answers from the last good snapshots.
    pub fn find_ip(&self, ip: IpAddr) -> Vec<Match> {
        if self.refresh_on_lookup {
            self.refresh();
        } else {
            self.load_cached();
        }
        lookup::find_ip(&self.registry, ip)
    }

    /// Status of every registered source, in registry order.
    pub fn sources(&self) -> Vec<SourceStatus> {
        self.registry
            .sources()
            .iter()
            .map(|source| source.status())
            .collect()
    }

    /// The fixed category catalog.
    pub fn categories(&self) -> &'static [Category] {
        category::categories()
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
