//! Process-wide user preferences
//!
//! Favorites, theme, accent color and the one-time hotkey hint. Values are
//! loaded from storage on first access and written back on every change.
//! Changes are announced on the [`EventBus`].

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::bus::{EventBus, UiEvent};
use crate::storage::{self, Storage, ACCENT_KEY, FAVORITES_KEY, HOTKEY_HINT_KEY, THEME_KEY};

/// Color theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn parse(value: &str) -> Option<Theme> {
        match value.trim().to_lowercase().as_str() {
            "dark" => Some(Theme::Dark),
            "light" => Some(Theme::Light),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn toggled(&self) -> Theme {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default)]
struct Prefs {
    favorites: Vec<String>,
    theme: Theme,
    accent_hsl: Option<String>,
    seen_hotkey_hint: bool,
}

/// Lazily loaded preference store shared between terminals
pub struct PreferenceStore {
    storage: Arc<dyn Storage>,
    bus: Arc<EventBus>,
    prefs: Mutex<Option<Prefs>>,
}

impl fmt::Debug for PreferenceStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreferenceStore")
            .field("loaded", &self.prefs.lock().is_some())
            .finish_non_exhaustive()
    }
}

impl PreferenceStore {
    pub fn new(storage: Arc<dyn Storage>, bus: Arc<EventBus>) -> Self {
        Self {
            storage,
            bus,
            prefs: Mutex::new(None),
        }
    }

    fn load(&self) -> Prefs {
        let store = self.storage.as_ref();
        Prefs {
            favorites: storage::read_json(store, FAVORITES_KEY).unwrap_or_default(),
            theme: storage::read_raw(store, THEME_KEY)
                .and_then(|t| Theme::parse(&t))
                .unwrap_or_default(),
            accent_hsl: storage::read_raw(store, ACCENT_KEY),
            seen_hotkey_hint: storage::read_raw(store, HOTKEY_HINT_KEY).is_some(),
        }
    }

    /// Run `f` against the loaded preferences, loading them first if needed
    fn with<R>(&self, f: impl FnOnce(&mut Prefs) -> R) -> R {
        let mut guard = self.prefs.lock();
        let prefs = guard.get_or_insert_with(|| self.load());
        f(prefs)
    }

    pub fn favorites(&self) -> Vec<String> {
        self.with(|p| p.favorites.clone())
    }

    pub fn is_favorite(&self, project_id: &str) -> bool {
        self.with(|p| p.favorites.iter().any(|f| f == project_id))
    }

    /// Flip a project's favorite flag; returns whether it is now a favorite
    pub fn toggle_favorite(&self, project_id: &str) -> bool {
        let (now_favorite, favorites) = self.with(|p| {
            let now_favorite = match p.favorites.iter().position(|f| f == project_id) {
                Some(index) => {
                    p.favorites.remove(index);
                    false
                }
                None => {
                    p.favorites.push(project_id.to_string());
                    true
                }
            };
            (now_favorite, p.favorites.clone())
        });
        storage::write_json(self.storage.as_ref(), FAVORITES_KEY, &favorites);
        self.bus.publish(&UiEvent::FavoritesUpdated(favorites));
        now_favorite
    }

    pub fn theme(&self) -> Theme {
        self.with(|p| p.theme)
    }

    pub fn set_theme(&self, theme: Theme) {
        let changed = self.with(|p| std::mem::replace(&mut p.theme, theme) != theme);
        storage::write_raw(self.storage.as_ref(), THEME_KEY, theme.as_str());
        if changed {
            self.bus.publish(&UiEvent::ThemeChanged(theme));
        }
    }

    pub fn toggle_theme(&self) -> Theme {
        let next = self.theme().toggled();
        self.set_theme(next);
        next
    }

    pub fn accent_hsl(&self) -> Option<String> {
        self.with(|p| p.accent_hsl.clone())
    }

    pub fn set_accent_hsl(&self, hsl: &str) {
        self.with(|p| p.accent_hsl = Some(hsl.to_string()));
        storage::write_raw(self.storage.as_ref(), ACCENT_KEY, hsl);
    }

    /// True exactly once: the first time the hotkey hint should be shown
    pub fn take_hotkey_hint(&self) -> bool {
        let first = self.with(|p| !std::mem::replace(&mut p.seen_hotkey_hint, true));
        if first {
            storage::write_raw(self.storage.as_ref(), HOTKEY_HINT_KEY, "true");
        }
        first
    }
}
