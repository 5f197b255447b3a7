use log::{info, warn};
use std::net::IpAddr;
use whoip::{Match, RefreshReport};

/*-------------------------------------------------------------------------------------------------
  Logging Functions
-------------------------------------------------------------------------------------------------*/

/*--------------------------------------------------------------------------------------
  Lookup Results
--------------------------------------------------------------------------------------*/

pub fn lookup_results(ip: &IpAddr, matches: &[Match]) {
    match matches.len() {
        0 => warn!("{ip} was not found in any source"),
        count => {
            let sources: Vec<&str> = matches.iter().map(|found| found.name.as_str()).collect();
            info!("Found {ip} in {count} source(s): {}", sources.join(", "));
        }
    }
}

/*--------------------------------------------------------------------------------------
  Refresh Report
--------------------------------------------------------------------------------------*/

pub fn refresh_report(report: &RefreshReport) {
    let failures = report.failures().count();
    if failures > 0 {
        warn!(
            "{failures} of {} source(s) could not be refreshed; results may be incomplete",
            report.results.len()
        );
    }
}
