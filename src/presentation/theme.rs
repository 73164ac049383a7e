use std::{collections::HashMap, fs, path::PathBuf, str::FromStr};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Client-local key the theme is saved under.
pub const THEME_KEY: &str = "ocuTheme";

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// String key/value storage that outlives a single page view.
pub trait PreferenceStore {
    fn load(&self, key: &str) -> Option<String>;
    fn save(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Saved theme, falling back to light for missing or unknown values.
pub fn load_theme(store: &dyn PreferenceStore) -> Theme {
    store
        .load(THEME_KEY)
        .and_then(|v| Theme::from_str(&v).ok())
        .unwrap_or_default()
}

#[derive(Debug, Default)]
pub struct MemoryPreferences {
    values: HashMap<String, String>,
}

impl PreferenceStore for MemoryPreferences {
    fn load(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn save(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Preferences kept as a flat JSON object on disk.
#[derive(Debug)]
pub struct FilePreferences {
    path: PathBuf,
    values: HashMap<String, String>,
}

impl FilePreferences {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = if path.exists() {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("reading preferences from {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("parsing preferences in {}", path.display()))?
        } else {
            HashMap::new()
        };
        Ok(Self { path, values })
    }
}

impl PreferenceStore for FilePreferences {
    fn load(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn save(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        let raw = serde_json::to_string_pretty(&self.values)?;
        fs::write(&self.path, raw)
            .with_context(|| format!("writing preferences to {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_light() {
        let store = MemoryPreferences::default();
        assert_eq!(load_theme(&store), Theme::Light);
    }

    #[test]
    fn unknown_saved_value_falls_back_to_light() {
        let mut store = MemoryPreferences::default();
        store.save(THEME_KEY, "solarized").unwrap();
        assert_eq!(load_theme(&store), Theme::Light);
    }

    #[test]
    fn toggle_flips_and_names_are_lowercase() {
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
        assert_eq!(Theme::Dark.to_string(), "dark");
    }

    #[test]
    fn file_store_survives_reopen() {
        let path = std::env::temp_dir().join(format!(
            "classroom-prefs-{}.json",
            uuid::Uuid::new_v4()
        ));

        let mut store = FilePreferences::open(&path).unwrap();
        store.save(THEME_KEY, "dark").unwrap();

        let reopened = FilePreferences::open(&path).unwrap();
        assert_eq!(load_theme(&reopened), Theme::Dark);

        fs::remove_file(&path).unwrap();
    }
}
