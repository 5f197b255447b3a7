use crate::core::category::Category;
use crate::core::registry::Registry;
use crate::core::source::Source;
use ipnetwork::IpNetwork;
use log::debug;
use serde::Serialize;
use std::collections::BTreeMap;
use std::net::IpAddr;

/*-------------------------------------------------------------------------------------------------
  Lookup Results
-------------------------------------------------------------------------------------------------*/

/// A source whose published ranges contain the looked-up address.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Match {
    pub url: String,
    pub name: String,
    pub description: String,

    /// The matched prefix's own categories when it has any, else the source's.
    pub categories: Vec<Category>,

    pub prefix: MatchedPrefix,
}

/// The containing prefix, rendered with its network as a CIDR string.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct MatchedPrefix {
    pub network: IpNetwork,
    pub details: BTreeMap<String, String>,
}

/*-------------------------------------------------------------------------------------------------
  Find IP
-------------------------------------------------------------------------------------------------*/

/// Scan every source's current snapshot for a prefix containing `ip`.
///
/// Each source contributes at most one [Match]: the first containing prefix in its feed's
/// document order (no longest-prefix tie-break). Matches follow registry order. This does not
/// refresh anything; see [Client::find_ip](crate::Client::find_ip).
pub fn find_ip(registry: &Registry, ip: IpAddr) -> Vec<Match> {
    let matches: Vec<Match> = registry
        .sources()
        .iter()
        .filter_map(|source| match_source(source, ip))
        .collect();

    debug!(
        "{} found in {} of {} sources",
        ip,
        matches.len(),
        registry.len()
    );

    matches
}

fn match_source(source: &Source, ip: IpAddr) -> Option<Match> {
    source.contains_ip(ip).map(|prefix| Match {
        url: source.url().to_string(),
        name: source.name().to_string(),
        description: source.description().to_string(),
        categories: if prefix.categories.is_empty() {
            source.categories().to_vec()
        } else {
            prefix.categories
        },
        prefix: MatchedPrefix {
            network: prefix.network,
            details: prefix.details,
        },
    })
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
