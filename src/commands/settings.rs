use crate::models::settings::APP_DIR;
use crate::models::Settings;
use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

pub fn default_settings_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
        .context("Could not find data directory")?
        .join(APP_DIR);
    Ok(data_dir.join("settings.json"))
}

fn resolve_path(path: Option<&Path>) -> Result<PathBuf> {
    match path {
        Some(p) => Ok(p.to_path_buf()),
        None => default_settings_path(),
    }
}

/// Load settings from `path` (or the default location); a missing file
/// yields the defaults.
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let settings_path = resolve_path(path)?;

    if !settings_path.exists() {
        debug!("No settings file at {:?}, using defaults", settings_path);
        return Ok(Settings::default());
    }

    let content = fs::read_to_string(&settings_path)
        .with_context(|| format!("Failed to read settings from {:?}", settings_path))?;

    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse settings in {:?}", settings_path))
}

pub fn save_settings(settings: &Settings, path: Option<&Path>) -> Result<PathBuf> {
    let settings_path = resolve_path(path)?;

    if let Some(parent) = settings_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create settings directory {:?}", parent))?;
    }

    let content =
        serde_json::to_string_pretty(settings).context("Failed to serialize settings")?;
    fs::write(&settings_path, content)
        .with_context(|| format!("Failed to write settings to {:?}", settings_path))?;

    Ok(settings_path)
}

/// Print the effective settings, optionally writing them back to disk.
pub fn show_settings(
    settings: &Settings,
    path: Option<&Path>,
    save: bool,
    out: &mut impl Write,
) -> Result<()> {
    writeln!(out, "{}", serde_json::to_string_pretty(settings)?)?;
    writeln!(out, "journal database: {}", settings.journal_db_path().display())?;
    if save {
        let written = save_settings(settings, path)?;
        writeln!(out, "saved to {}", written.display())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let settings = load_settings(Some(&dir.path().join("absent.json"))).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("conf").join("settings.json");
        let settings = Settings {
            journal_db_path: Some(dir.path().join("j.db")),
            request_interval_ms: 2000,
            ..Settings::default()
        };

        let mut out = Vec::new();
        show_settings(&settings, Some(&path), true, &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("saved to"));

        assert_eq!(load_settings(Some(&path)).unwrap(), settings);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(load_settings(Some(&path)).is_err());
    }
}
