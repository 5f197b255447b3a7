use crate::core::errors::Result;
use crate::core::feeds::google::JsonCrawlerIpRanges;
use crate::core::feeds::{collect_prefixes, dual_stack_network, ParsedFeed};
use crate::core::prefix::Prefix;
use log::info;

/*-------------------------------------------------------------------------------------------------
  Parse BingBot IP Ranges
-------------------------------------------------------------------------------------------------*/

// BingBot publishes the same dual-field document shape as GoogleBot.
pub(crate) fn parse(body: &[u8]) -> Result<ParsedFeed> {
    let json_ip_ranges: JsonCrawlerIpRanges = serde_json::from_slice(body)?;

    if let Some(creation_time) = &json_ip_ranges.creation_time {
        info!("BingBot IP Ranges created {}", creation_time);
    }

    Ok(collect_prefixes(
        "BingBot",
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
  Unit Tests
-------------------------------------------------------------------------------------------------*/
