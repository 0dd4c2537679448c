//! Environment loading helpers

use std::path::PathBuf;

/// Load variables from a `.env` file in the current directory or any parent
///
/// Variables already present in the process environment are not overridden.
/// Returns the path that was loaded, or `None` when no file was found.
pub fn load_dotenv() -> Option<PathBuf> {
    match dotenvy::dotenv() {
        Ok(path) => {
            tracing::debug!(path = %path.display(), "Loaded environment file");
            Some(path)
        }
        Err(e) if e.not_found() => None,
        Err(e) => {
            tracing::warn!("Could not read .env file: {e}");
            None
        }
    }
}
