use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::constants;

/// User preferences stored in `prefs.toml` under the config directory.
#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq)]
pub struct Config {
  pub theme_name: Option<String>,
  /// Audio file played by the background-music toggle.
  pub music_path: Option<PathBuf>,
  /// Background-music volume, 0-100.
  pub volume: Option<u8>,
}

impl Config {
  pub fn load() -> Self {
    if let Some(proj_dirs) = ProjectDirs::from("", "", &constants().app_name) {
      let config_file = proj_dirs.config_dir().join("prefs.toml");
      if let Ok(content) = std::fs::read_to_string(config_file)
        && let Ok(config) = toml::from_str(&content)
      {
        return config;
      }
    }
    Self::default()
  }

  pub fn save(&self) {
    if let Some(proj_dirs) = ProjectDirs::from("", "", &constants().app_name) {
      let config_dir = proj_dirs.config_dir();
      if std::fs::create_dir_all(config_dir).is_ok() {
        let config_file = config_dir.join("prefs.toml");
        if let Ok(content) = toml::to_string(self) {
          let _ = std::fs::write(config_file, content);
        }
      }
    }
  }

  /// Configured volume clamped to 0-100, or the default.
  pub fn volume(&self) -> u8 {
    self.volume.unwrap_or(constants().default_volume).min(100)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_full_prefs() {
    let config: Config =
      toml::from_str("theme_name = \"matinee\"\nmusic_path = \"/tmp/theme.mp3\"\nvolume = 20\n").unwrap();
    assert_eq!(config.theme_name.as_deref(), Some("matinee"));
    assert_eq!(config.music_path, Some(PathBuf::from("/tmp/theme.mp3")));
    assert_eq!(config.volume(), 20);
  }

  #[test]
  fn missing_fields_default() {
    let config: Config = toml::from_str("").unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.volume(), constants().default_volume);
  }

  #[test]
  fn volume_is_clamped() {
    let config = Config { volume: Some(250), ..Config::default() };
    assert_eq!(config.volume(), 100);
  }
}
