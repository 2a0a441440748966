use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    pub fn db_path() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            let state_dir = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join("fighthype");
            Some(state_dir.join("highlights.db"))
        } else {
            ProjectDirs::from("", "", "fighthype")
                .map(|proj_dirs| proj_dirs.data_local_dir().join("highlights.db"))
        }
    }

    pub fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "fighthype").map(|proj_dirs| proj_dirs.config_dir().to_path_buf())
    }
}
