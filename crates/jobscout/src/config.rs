//! Profile and path resolution for the CLI.

use std::path::{Path, PathBuf};

use miette::Result;
use tracing::info;

use jobscout_search::SearchProfile;

const LEDGER_FILE: &str = "sent_jobs.json";

/// Load a search profile from a JSON file, or the built-in default.
///
/// The profile is validated before it is returned.
pub async fn load_profile(path: Option<&Path>) -> Result<SearchProfile> {
    let profile = match path {
        Some(path) => {
            let content = tokio::fs::read_to_string(path).await.map_err(|e| {
                miette::miette!("failed to read profile {}: {}", path.display(), e)
            })?;
            let profile: SearchProfile = serde_json::from_str(&content).map_err(|e| {
                miette::miette!("failed to parse profile {}: {}", path.display(), e)
            })?;
            info!(path = %path.display(), roles = profile.roles.len(), "loaded search profile");
            profile
        }
        None => {
            info!("no profile given, using defaults");
            SearchProfile::default()
        }
    };

    profile.validate().map_err(|e| miette::miette!("{}", e))?;
    Ok(profile)
}

/// Ledger path from the command line, else `<data dir>/jobscout/sent_jobs.json`.
pub fn ledger_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit.unwrap_or_else(|| {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("jobscout")
            .join(LEDGER_FILE)
    })
}
