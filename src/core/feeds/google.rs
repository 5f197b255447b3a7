use crate::core::errors::Result;
use crate::core::feeds::{collect_prefixes, dual_stack_network, ParsedFeed};
use crate::core::prefix::Prefix;
use log::info;
use serde::Deserialize;

/*-------------------------------------------------------------------------------------------------
  Parse Google Cloud IP Ranges
-------------------------------------------------------------------------------------------------*/

pub(crate) fn parse_cloud(body: &[u8]) -> Result<ParsedFeed> {
    let json_ip_ranges: JsonCloudIpRanges = serde_json::from_slice(body)?;

    if let (Some(sync_token), Some(creation_time)) =
        (&json_ip_ranges.sync_token, &json_ip_ranges.creation_time)
    {
        info!(
            "Google Cloud IP Ranges syncToken {} created {}",
            sync_token, creation_time
        );
    }

    Ok(collect_prefixes(
        "Google Cloud",
        json_ip_ranges.prefixes.unwrap_or_default(),
        |prefix| {
            dual_stack_network(
                prefix.ipv4_prefix.as_deref(),
                prefix.ipv6_prefix.as_deref(),
            )
            .map(|network| {
                Prefix::new(network).with_details([
                    ("Service", prefix.service.unwrap_or_default()),
                    ("Scope", prefix.scope.unwrap_or_default()),
                ])
            })
        },
    ))
}

/*-------------------------------------------------------------------------------------------------
  Parse GoogleBot IP Ranges
-------------------------------------------------------------------------------------------------*/

/// Parse the GoogleBot crawler feeds (common crawlers, special crawlers and user-triggered
/// fetchers share one document shape).
pub(crate) fn parse_crawler(body: &[u8]) -> Result<ParsedFeed> {
    let json_ip_ranges: JsonCrawlerIpRanges = serde_json::from_slice(body)?;

    if let Some(creation_time) = &json_ip_ranges.creation_time {
        info!("GoogleBot IP Ranges created {}", creation_time);
    }

    Ok(collect_prefixes(
        "GoogleBot",
        json_ip_ranges.prefixes.unwrap_or_default(),
        |prefix| {
            dual_stack_network(
                prefix.ipv4_prefix.as_deref(),
                prefix.ipv6_prefix.as_deref(),
            )
            .map(Prefix::new)
        },
    ))
}

/*-------------------------------------------------------------------------------------------------
  JSON Data Structures
-------------------------------------------------------------------------------------------------*/

/*--------------------------------------------------------------------------------------
  Google Cloud
--------------------------------------------------------------------------------------*/

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonCloudIpRanges {
    sync_token: Option<String>,
    creation_time: Option<String>,

    #[serde(default)]
    prefixes: Option<Vec<JsonCloudIpPrefix>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonCloudIpPrefix {
    ipv4_prefix: Option<String>,
    ipv6_prefix: Option<String>,

    service: Option<String>,
    scope: Option<String>,
}

/*--------------------------------------------------------------------------------------
  GoogleBot
--------------------------------------------------------------------------------------*/

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JsonCrawlerIpRanges {
    pub(crate) creation_time: Option<String>,

    #[serde(default)]
    pub(crate) prefixes: Option<Vec<JsonCrawlerIpPrefix>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JsonCrawlerIpPrefix {
    pub(crate) ipv4_prefix: Option<String>,
    pub(crate) ipv6_prefix: Option<String>,
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
