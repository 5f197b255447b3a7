use std::path::Path;
use whoip::Match;

/*-------------------------------------------------------------------------------------------------
  Save Matches to CSV File
-------------------------------------------------------------------------------------------------*/

pub fn save(matches: &[Match], path: &Path) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_path(path)?;

    // Write header
    writer.serialize([
        "IP Prefix",
        "Source",
        "URL",
        "Categories",
        "Details",
    ])?;

    // Write match records
    for found in matches {
        let record = (
            found.prefix.network.to_string(),
            &found.name,
            &found.url,
            crate::cli::utils::join_categories(&found.categories),
            crate::cli::utils::join_details(&found.prefix.details),
        );
        writer.serialize(record)?;
    }

    writer.flush()?;

    Ok(())
}
