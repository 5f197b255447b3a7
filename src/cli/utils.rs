use log::{debug, warn};
use std::env;
use std::fs;
use std::path::PathBuf;

/*-------------------------------------------------------------------------------------------------
  Utility Functions
-------------------------------------------------------------------------------------------------*/

/*--------------------------------------------------------------------------------------
  Data Directory
--------------------------------------------------------------------------------------*/

/// Resolve the snapshot cache directory. Candidates are tried in order: `WHOIP_DATA_DIR`, the
/// platform data directory, `$HOME/.local/share`, and the system temporary directory. The
/// first one that can be created and written wins.
pub fn data_directory() -> whoip::Result<PathBuf> {
    first_usable_directory(data_directory_candidates())
}

fn data_directory_candidates() -> Vec<PathBuf> {
    let mut candidates: Vec<PathBuf> = env::var_os("WHOIP_DATA_DIR")
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .into_iter()
        .collect();

    candidates.extend(dirs::data_dir().map(|base| base.join("whoip")));
    candidates.extend(
        dirs::home_dir().map(|home| home.join(".local").join("share").join("whoip")),
    );
    candidates.push(env::temp_dir().join("whoip"));

    candidates
}

/// Create each candidate in turn and return the first writable one.
pub fn first_usable_directory<I>(candidates: I) -> whoip::Result<PathBuf>
where
    I: IntoIterator<Item = PathBuf>,
{
    let mut rejected = Vec::new();

    for candidate in candidates {
        let usable = fs::create_dir_all(&candidate)
            .and_then(|_| fs::metadata(&candidate))
            .map(|metadata| !metadata.permissions().readonly());

        match usable {
            Ok(true) => {
                debug!("Using data directory: {:?}", candidate);
                return Ok(candidate);
            }
            Ok(false) => warn!("Data directory {:?} is read-only", candidate),
            Err(error) => warn!("Unable to create the data directory {:?}: {}", candidate, error),
        }
        rejected.push(format!("{:?}", candidate));
    }

    Err(whoip::Error::config(format!(
        "No usable data directory (tried: {}); set WHOIP_DATA_DIR",
        rejected.join(", ")
    )))
}

/*--------------------------------------------------------------------------------------
  Categories Cell
--------------------------------------------------------------------------------------*/

pub fn join_categories(categories: &[whoip::Category]) -> String {
    categories
        .iter()
        .map(|category| category.id.as_str())
        .collect::<Vec<&str>>()
        .join(", ")
}

/// `Key=Value` pairs in key order.
pub fn join_details<'a, I>(details: I) -> String
where
    I: IntoIterator<Item = (&'a String, &'a String)>,
{
    details
        .into_iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<String>>()
        .join(", ")
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
