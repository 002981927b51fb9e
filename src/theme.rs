//! Display theme, the persisted preference, and the mascot mode derived from it.
//!
//! The `data-theme` attribute on the root element is the single source of
//! truth. Nothing caches the mode; every interaction re-derives it.

use crate::error::FxResult;
use crate::stage::Stage;

pub const THEME_ATTR: &str = "data-theme";
pub const THEME_KEY: &str = "theme";
pub const TOGGLE_CLASS: &str = "theme-toggle";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// Mascot personality: calm Steve on light pages, explosive Creeper otherwise.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Quiet,
    Alert,
}

impl Mode {
    /// Quiet only for an attribute that is exactly `"light"`.
    pub fn from_theme_attr(attr: Option<&str>) -> Self {
        match attr {
            Some("light") => Mode::Quiet,
            _ => Mode::Alert,
        }
    }

    pub fn current<S: Stage>(stage: &S) -> Self {
        Self::from_theme_attr(stage.root_attr(THEME_ATTR).as_deref())
    }
}

/// Durable per-origin key/value storage (`localStorage` in the browser).
pub trait PreferenceStore {
    fn get(&self, key: &str) -> FxResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> FxResult<()>;
}

/// The `.theme-toggle` button and the stored preference behind it.
pub struct ThemeSwitch<'a, S: Stage, P: PreferenceStore> {
    stage: &'a S,
    prefs: &'a P,
    button: Option<S::Node>,
}

impl<'a, S: Stage, P: PreferenceStore> ThemeSwitch<'a, S, P> {
    pub fn new(stage: &'a S, prefs: &'a P) -> Self {
        let button = stage.by_class(TOGGLE_CLASS).into_iter().next();
        Self { stage, prefs, button }
    }

    /// Apply a previously saved theme. Absent or unknown values leave the
    /// page untouched.
    pub fn restore(&self) -> Option<Theme> {
        let saved = match self.prefs.get(THEME_KEY) {
            Ok(v) => v,
            Err(err) => {
                log::warn!("theme preference unreadable: {err}");
                None
            }
        };
        let theme = saved.as_deref().and_then(Theme::parse)?;
        self.apply(theme);
        Some(theme)
    }

    /// Flip between light and dark; an unset attribute counts as dark.
    pub fn toggle(&self) -> Theme {
        let current = match self.stage.root_attr(THEME_ATTR).as_deref() {
            Some("light") => Theme::Light,
            _ => Theme::Dark,
        };
        let next = current.flipped();
        self.apply(next);
        if let Err(err) = self.prefs.set(THEME_KEY, next.as_str()) {
            log::warn!("theme preference not saved: {err}");
        }
        next
    }

    fn apply(&self, theme: Theme) {
        if let Err(err) = self.stage.set_root_attr(THEME_ATTR, theme.as_str()) {
            log::warn!("could not set {THEME_ATTR}: {err}");
        }
        if let Some(button) = &self.button {
            let pressed = if theme == Theme::Light { "true" } else { "false" };
            if let Err(err) = self.stage.set_attr(button, "aria-pressed", pressed) {
                log::debug!("aria-pressed not updated: {err}");
            }
        }
    }
}
