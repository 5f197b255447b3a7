use crate::core::category::Category;
use ipnetwork::IpNetwork;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::IpAddr;

/*-------------------------------------------------------------------------------------------------
  Prefix
-------------------------------------------------------------------------------------------------*/

/// A published network range with the descriptive fields its feed attached to it.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Prefix {
    /// IPv4 or IPv6 network prefix.
    pub network: IpNetwork,

    /// Free-form detail fields (e.g. `Region`, `Service`); empty for feeds without details.
    #[serde(default)]
    pub details: BTreeMap<String, String>,

    /// Categories that override the owning source's defaults; empty means "use the source's".
    #[serde(default)]
    pub categories: Vec<Category>,
}

impl Prefix {
    pub fn new(network: IpNetwork) -> Self {
        Self {
            network,
            details: BTreeMap::new(),
            categories: Vec::new(),
        }
    }

    /// Attach detail fields to the prefix.
    pub fn with_details<I, K, V>(mut self, details: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.details
            .extend(details.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Network containment; an IPv4-mapped IPv6 address (`::ffff:a.b.c.d`) is tested as the
    /// IPv4 address it carries.
    pub fn contains(&self, ip: IpAddr) -> bool {
        self.network.contains(unmap_ipv4(ip))
    }
}

fn unmap_ipv4(ip: IpAddr) -> IpAddr {
    match ip {
        IpAddr::V6(ipv6) => ipv6.to_ipv4_mapped().map_or(ip, IpAddr::V4),
        IpAddr::V4(_) => ip,
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /*----------------------------------------------------------------------------------
      Test Helper Functions
    ----------------------------------------------------------------------------------*/

    pub(crate) fn test_prefixes() -> Vec<Prefix> {
        vec![
            Prefix::new("192.168.1.0/24".parse().unwrap())
                .with_details([("Service", "FakeService1"), ("Region", "us-west-1")]),
            Prefix::new("10.0.0.0/8".parse().unwrap())
                .with_details([("Service", "FakeService2"), ("Region", "us-east-1")]),
        ]
    }

    /*----------------------------------------------------------------------------------
      Prefix
    ----------------------------------------------------------------------------------*/

    #[test]
    fn test_prefix_contains() {
        let prefixes = test_prefixes();
        assert!(prefixes[0].contains("192.168.1.5".parse().unwrap()));
        assert!(!prefixes[0].contains("192.168.2.5".parse().unwrap()));
        assert!(prefixes[1].contains("10.255.255.255".parse().unwrap()));
        assert!(!prefixes[1].contains("2001:db8::1".parse().unwrap())); // Address family mismatch
    }

    #[test]
    fn test_prefix_contains_ipv4_mapped_ipv6() {
        let prefixes = test_prefixes();
        assert!(prefixes[0].contains("::ffff:192.168.1.5".parse().unwrap()));
        assert!(!prefixes[0].contains("::ffff:192.168.2.5".parse().unwrap()));

        // IPv4-compatible (non-mapped) addresses stay IPv6
        assert!(!prefixes[1].contains("::10.0.0.1".parse().unwrap()));

        let ipv6 = Prefix::new("2001:db8::/32".parse().unwrap());
        assert!(ipv6.contains("2001:db8::1".parse().unwrap()));
    }

    #[test]
    fn test_prefix_with_details() {
        let prefix = &test_prefixes()[0];
        assert_eq!(prefix.details["Service"], "FakeService1");
        assert_eq!(prefix.details["Region"], "us-west-1");
        assert!(prefix.categories.is_empty());
    }

    #[test]
    fn test_prefix_missing_optional_fields() {
        let prefix: Prefix = serde_json::from_str(r#"{"network": "66.249.64.0/27"}"#).unwrap();
        assert_eq!(prefix, Prefix::new("66.249.64.0/27".parse().unwrap()));
    }
}
