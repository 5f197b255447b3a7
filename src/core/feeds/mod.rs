use crate::core::errors::Result;
use crate::core::prefix::Prefix;
use crate::core::utils::ipnetwork::parse_cidr;
use ipnetwork::IpNetwork;
use log::{debug, warn};
use std::fmt;

/*-------------------------------------------------------------------------------------------------
  Feed Modules
-------------------------------------------------------------------------------------------------*/

mod aws;
mod bingbot;
mod google;

/*-------------------------------------------------------------------------------------------------
  Feed Parser
-------------------------------------------------------------------------------------------------*/

/// Turns one feed document into prefixes.
///
/// Implementations are pure: an undecodable envelope fails the whole parse, while individual
/// entries whose network does not parse are dropped and counted in [ParsedFeed::skipped].
pub trait FeedParser: fmt::Debug + Send + Sync {
    fn parse(&self, body: &[u8]) -> Result<ParsedFeed>;
}

/// Prefixes parsed from a feed document, in document order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ParsedFeed {
    pub prefixes: Vec<Prefix>,

    /// Number of entries dropped because their network field(s) did not parse.
    pub skipped: usize,
}

/*--------------------------------------------------------------------------------------
  Feed Formats
--------------------------------------------------------------------------------------*/

/// The feed document shapes published by the built-in sources.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FeedFormat {
    /// `{prefixes: [{ip_prefix, region, service, network_border_group}], ipv6_prefixes: [...]}`
    Aws,

    /// `{prefixes: [{ipv4Prefix | ipv6Prefix, service, scope}]}`
    GoogleCloud,

    /// `{prefixes: [{ipv4Prefix | ipv6Prefix}]}`
    GoogleBot,

    /// `{prefixes: [{ipv4Prefix | ipv6Prefix}]}`
    BingBot,
}

impl FeedParser for FeedFormat {
    fn parse(&self, body: &[u8]) -> Result<ParsedFeed> {
        match self {
            FeedFormat::Aws => aws::parse(body),
            FeedFormat::GoogleCloud => google::parse_cloud(body),
            FeedFormat::GoogleBot => google::parse_crawler(body),
            FeedFormat::BingBot => bingbot::parse(body),
        }
    }
}

/*-------------------------------------------------------------------------------------------------
  Helper Functions
-------------------------------------------------------------------------------------------------*/

/// Network of an entry publishing either an IPv4 or an IPv6 prefix field; the IPv4 field is
/// tried first.
pub(crate) fn dual_stack_network(ipv4: Option<&str>, ipv6: Option<&str>) -> Option<IpNetwork> {
    ipv4.and_then(parse_cidr).or_else(|| ipv6.and_then(parse_cidr))
}

/// Build a [ParsedFeed] from feed entries, counting the entries `to_prefix` rejects.
pub(crate) fn collect_prefixes<T, I, F>(feed: &str, entries: I, to_prefix: F) -> ParsedFeed
where
    I: IntoIterator<Item = T>,
    F: Fn(T) -> Option<Prefix>,
{
    let mut parsed = ParsedFeed::default();

    for entry in entries {
        match to_prefix(entry) {
            Some(prefix) => parsed.prefixes.push(prefix),
            None => parsed.skipped += 1,
        }
    }

    if parsed.skipped > 0 {
        warn!(
            "{} feed: skipped {} entries with an invalid network",
            feed, parsed.skipped
        );
    }
    debug!("{} feed: parsed {} prefixes", feed, parsed.prefixes.len());

    parsed
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::Error;

    #[test]
    fn test_dual_stack_network_prefers_ipv4() {
        assert_eq!(
            dual_stack_network(Some("66.249.64.0/27"), Some("2001:4860:4801:10::/64")),
            Some("66.249.64.0/27".parse().unwrap())
        );
        assert_eq!(
            dual_stack_network(Some("bogus"), Some("2001:4860:4801:10::/64")),
            Some("2001:4860:4801:10::/64".parse().unwrap())
        );
        assert_eq!(
            dual_stack_network(None, Some("2001:4860:4801:10::/64")),
            Some("2001:4860:4801:10::/64".parse().unwrap())
        );
        assert_eq!(dual_stack_network(None, None), None);
        assert_eq!(dual_stack_network(Some("bogus"), Some("")), None);
    }

    #[test]
    fn test_every_format_rejects_a_malformed_envelope() {
        for format in [
            FeedFormat::Aws,
            FeedFormat::GoogleCloud,
            FeedFormat::GoogleBot,
            FeedFormat::BingBot,
        ] {
            let result = format.parse(b"<html>Service Unavailable</html>");
            assert!(matches!(result, Err(Error::Decode(_))), "{:?}", format);
        }
    }

    #[test]
    fn test_every_format_accepts_an_empty_document() {
        for format in [
            FeedFormat::Aws,
            FeedFormat::GoogleCloud,
            FeedFormat::GoogleBot,
            FeedFormat::BingBot,
        ] {
            let parsed = format.parse(b"{}").unwrap();
            assert_eq!(parsed, ParsedFeed::default(), "{:?}", format);
        }
    }
}
