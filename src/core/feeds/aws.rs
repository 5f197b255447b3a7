use crate::core::errors::Result;
use crate::core::feeds::{collect_prefixes, ParsedFeed};
use crate::core::prefix::Prefix;
use crate::core::utils::ipnetwork::parse_cidr;
use log::info;
use serde::Deserialize;

/*-------------------------------------------------------------------------------------------------
  Parse AWS IP Ranges
-------------------------------------------------------------------------------------------------*/

pub(crate) fn parse(body: &[u8]) -> Result<ParsedFeed> {
    let json_ip_ranges: JsonIpRanges = serde_json::from_slice(body)?;

    if let (Some(sync_token), Some(create_date)) =
        (&json_ip_ranges.sync_token, &json_ip_ranges.create_date)
    {
        info!("AWS IP Ranges syncToken {} created {}", sync_token, create_date);
    }

    // A null array reads as empty and a null detail field as ""
    let ipv4_entries = json_ip_ranges
        .prefixes
        .unwrap_or_default()
        .into_iter()
        .map(|prefix| {
            let network = prefix.ip_prefix.as_deref().and_then(parse_cidr);
            (network, prefix.details)
        });
    let ipv6_entries = json_ip_ranges
        .ipv6_prefixes
        .unwrap_or_default()
        .into_iter()
        .map(|prefix| {
            let network = prefix.ipv6_prefix.as_deref().and_then(parse_cidr);
            (network, prefix.details)
        });

    Ok(collect_prefixes(
        "AWS",
        ipv4_entries.chain(ipv6_entries),
        |(network, details)| {
            network.map(|network| {
                Prefix::new(network).with_details([
                    ("Region", details.region.unwrap_or_default()),
                    ("Service", details.service.unwrap_or_default()),
                    (
                        "NetworkBorderGroup",
                        details.network_border_group.unwrap_or_default(),
                    ),
                ])
            })
        },
    ))
}

/*-------------------------------------------------------------------------------------------------
  JSON Data Structures
-------------------------------------------------------------------------------------------------*/

#[derive(Debug, Deserialize)]
struct JsonIpRanges {
    #[serde(rename = "syncToken")]
    sync_token: Option<String>,

    #[serde(rename = "createDate")]
    create_date: Option<String>,

    #[serde(default)]
    prefixes: Option<Vec<JsonIpPrefix>>,

    #[serde(default)]
    ipv6_prefixes: Option<Vec<JsonIpv6Prefix>>,
}

#[derive(Debug, Deserialize)]
struct JsonIpPrefix {
    ip_prefix: Option<String>,

    #[serde(flatten)]
    details: JsonPrefixDetails,
}

#[derive(Debug, Deserialize)]
struct JsonIpv6Prefix {
    ipv6_prefix: Option<String>,

    #[serde(flatten)]
    details: JsonPrefixDetails,
}

#[derive(Debug, Default, Deserialize)]
struct JsonPrefixDetails {
    region: Option<String>,
    service: Option<String>,
    network_border_group: Option<String>,
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
