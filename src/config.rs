use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::models::{AuthConfig, GeneralConfig};

pub const GENERAL_CONFIG_FILE: &str = "conf.json";
pub const CONFIG_DIR: &str = ".config/nibblefibble";

/// `$HOME/.config/nibblefibble`
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_DIR))
}

async fn read(path: &Path) -> Result<String, Error> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| io_error(path, e))
}

fn io_error(path: &Path, source: std::io::Error) -> Error {
    match source.kind() {
        ErrorKind::NotFound => Error::ConfigNotFound {
            path: path.to_path_buf(),
        },
        _ => Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        },
    }
}

/// Every regular file in `dir` except the general config, sorted by path.
pub async fn list_authorization_files(dir: &Path) -> Result<Vec<PathBuf>, Error> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| io_error(dir, e))?;

    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(|e| io_error(dir, e))? {
        if entry.file_name() == GENERAL_CONFIG_FILE {
            continue;
        }
        // follows symlinks, so a linked authorization file still counts
        let path = entry.path();
        let is_file = tokio::fs::metadata(&path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false);
        if is_file {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

pub async fn load_general_config(dir: &Path) -> Result<GeneralConfig, Error> {
    let path = dir.join(GENERAL_CONFIG_FILE);
    let content = read(&path).await?;
    serde_json::from_str(&content).map_err(|source| Error::ConfigParse { path, source })
}

pub async fn load_auth_config(path: &Path) -> Result<AuthConfig, Error> {
    let content = read(path).await?;
    serde_json::from_str(&content).map_err(|source| Error::AuthFileParse {
        path: path.to_path_buf(),
        source,
    })
}
