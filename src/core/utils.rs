use log::{info, warn};
use std::env;

/*-------------------------------------------------------------------------------------------------
  Utilities
-------------------------------------------------------------------------------------------------*/

/*--------------------------------------------------------------------------------------
  Environment Variables
--------------------------------------------------------------------------------------*/

/// Get and parse an environment variable value or return a default value.
pub(crate) fn get_env_var<T: std::str::FromStr>(env_var: &str, default: T) -> T {
    env::var(env_var)
        .ok()
        .and_then(|value| {
            value
                .parse::<T>()
                .inspect(|_| info!("Using {}: {}", env_var, value))
                .inspect_err(|_| warn!("Invalid {}: {}", env_var, value))
                .ok()
        })
        .unwrap_or(default)
}

/*--------------------------------------------------------------------------------------
  IP Network Supplemental Functions
--------------------------------------------------------------------------------------*/

pub mod ipnetwork {
    use ipnetwork::{IpNetwork, Ipv4Network, Ipv6Network};

    /*
        The IpNetwork type keeps whatever host bits were present in the parsed
        string (`10.0.0.1/8` stays `10.0.0.1/8`). Feeds are expected to publish
        network prefixes, but snapshots and lookup results should always carry
        the network address, so prefixes are reduced before they are stored.
    */

    pub fn network_prefix(ip_network: &IpNetwork) -> IpNetwork {
        match ip_network {
            IpNetwork::V4(ipv4_network) => {
                Ipv4Network::new(ipv4_network.network(), ipv4_network.prefix())
                    .map(IpNetwork::V4)
                    .unwrap_or(*ip_network)
            }
            IpNetwork::V6(ipv6_network) => {
                Ipv6Network::new(ipv6_network.network(), ipv6_network.prefix())
                    .map(IpNetwork::V6)
                    .unwrap_or(*ip_network)
            }
        }
    }

    /// Parse a CIDR string (`address/length`) into a network prefix. A bare
    /// address without an explicit prefix length is rejected.
    pub fn parse_cidr(value: &str) -> Option<IpNetwork> {
        let value = value.trim();
        if !value.contains('/') {
            return None;
        }
        value
            .parse::<IpNetwork>()
            .ok()
            .map(|ip_network| network_prefix(&ip_network))
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
