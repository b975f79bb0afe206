//! Global layout and readability preferences.
//!
//! One [`ConfigProvider`] is built at startup and passed by reference to the
//! components that need it. Every change is written through the injected
//! [`Storage`] immediately, under the key [`PREFERENCES_KEY`], as JSON:
//!
//! ```json
//! { "direction": "rtl", "size": "large", "autoContrast": true }
//! ```
//!
//! | Preference      | Values                     | Default  |
//! |-----------------|----------------------------|----------|
//! | `direction`     | `ltr`, `rtl`               | `ltr`    |
//! | `size`          | `small`, `medium`, `large` | `medium` |
//! | `autoContrast`  | bool                       | `false`  |
//!
//! When auto-contrast is on, components ask [`ConfigProvider::foreground_for`]
//! for a readable text color instead of using their own.

use std::fmt;
use std::str::FromStr;

use lumo_color::{ContrastOptions, accessible_text_color};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::storage::{Storage, StorageError};

/// Storage key for the serialized [`Preferences`].
pub const PREFERENCES_KEY: &str = "lumo.preferences";

/// A preference string that names no known value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}' (expected one of: {expected})")]
pub struct UnknownValue {
    pub kind: &'static str,
    pub value: String,
    pub expected: &'static str,
}

// ---------------------------------------------------------------------------
// Direction / Size
// ---------------------------------------------------------------------------

/// Inline text direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Ltr,
    Rtl,
}

impl Direction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ltr => "ltr",
            Self::Rtl => "rtl",
        }
    }

    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Ltr => Self::Rtl,
            Self::Rtl => Self::Ltr,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ltr" => Ok(Self::Ltr),
            "rtl" => Ok(Self::Rtl),
            _ => Err(UnknownValue {
                kind: "direction",
                value: s.to_string(),
                expected: "ltr, rtl",
            }),
        }
    }
}

/// Component size scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Size {
    Small,
    #[default]
    Medium,
    Large,
}

impl Size {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Size {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "small" | "sm" => Ok(Self::Small),
            "medium" | "md" => Ok(Self::Medium),
            "large" | "lg" => Ok(Self::Large),
            _ => Err(UnknownValue {
                kind: "size",
                value: s.to_string(),
                expected: "small, medium, large",
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Preferences
// ---------------------------------------------------------------------------

/// The persisted preference record. Missing fields take their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Preferences {
    pub direction: Direction,
    pub size: Size,
    pub auto_contrast: bool,
}

// ---------------------------------------------------------------------------
// ConfigProvider
// ---------------------------------------------------------------------------

/// Owner of the application's [`Preferences`].
#[derive(Debug)]
pub struct ConfigProvider<S: Storage> {
    storage: S,
    prefs: Preferences,
}

impl<S: Storage> ConfigProvider<S> {
    /// Read persisted preferences from `storage`.
    ///
    /// A stored value that is not valid JSON for [`Preferences`] is logged
    /// and replaced by the defaults; it is left in storage until the next
    /// write.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if `storage` cannot be read.
    pub fn load(storage: S) -> Result<Self, StorageError> {
        let prefs = match storage.load(PREFERENCES_KEY)? {
            None => Preferences::default(),
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|error| {
                warn!(key = PREFERENCES_KEY, %error, "ignoring corrupt preferences");
                Preferences::default()
            }),
        };
        debug!(?prefs, "preferences loaded");
        Ok(Self { storage, prefs })
    }

    #[must_use]
    pub const fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    /// Apply `change` and persist the result.
    ///
    /// In-memory state is only updated once the write succeeds.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the new preferences cannot be stored.
    pub fn update(&mut self, change: impl FnOnce(&mut Preferences)) -> Result<(), StorageError> {
        let mut next = self.prefs;
        change(&mut next);
        if next == self.prefs {
            return Ok(());
        }
        let json = serde_json::to_string(&next).map_err(|source| StorageError::Json {
            key: PREFERENCES_KEY.to_string(),
            source,
        })?;
        self.storage.store(PREFERENCES_KEY, &json)?;
        self.prefs = next;
        Ok(())
    }

    /// # Errors
    ///
    /// See [`ConfigProvider::update`].
    pub fn set_direction(&mut self, direction: Direction) -> Result<(), StorageError> {
        self.update(|p| p.direction = direction)
    }

    /// Flip between `ltr` and `rtl`, returning the new direction.
    ///
    /// # Errors
    ///
    /// See [`ConfigProvider::update`].
    pub fn toggle_direction(&mut self) -> Result<Direction, StorageError> {
        let next = self.prefs.direction.toggled();
        self.set_direction(next)?;
        Ok(next)
    }

    /// # Errors
    ///
    /// See [`ConfigProvider::update`].
    pub fn set_size(&mut self, size: Size) -> Result<(), StorageError> {
        self.update(|p| p.size = size)
    }

    /// # Errors
    ///
    /// See [`ConfigProvider::update`].
    pub fn set_auto_contrast(&mut self, enabled: bool) -> Result<(), StorageError> {
        self.update(|p| p.auto_contrast = enabled)
    }

    /// Drop persisted preferences and return to the defaults.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the stored value cannot be removed.
    pub fn reset(&mut self) -> Result<(), StorageError> {
        self.storage.remove(PREFERENCES_KEY)?;
        self.prefs = Preferences::default();
        Ok(())
    }

    /// Contrast options matching the current preferences: the default
    /// candidates, AA, and large text when the size scale is `large`.
    #[must_use]
    pub fn contrast_options(&self) -> ContrastOptions {
        ContrastOptions::default().large_text(self.prefs.size == Size::Large)
    }

    /// The text color a component on `background` should use, or `None`
    /// when auto-contrast is off and the component keeps its own.
    #[must_use]
    pub fn foreground_for(&self, background: &str) -> Option<String> {
        self.prefs.auto_contrast.then(|| {
            let options = self.contrast_options();
            accessible_text_color(background, &options).to_string()
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
