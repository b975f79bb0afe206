//! Color-scheme selection.
//!
//! The user picks `light`, `dark`, or `system`. `system` defers to whatever
//! the host reports, so the concrete [`Appearance`] is only known once the
//! host's preference is supplied. The choice is stored as a bare string under
//! [`COLOR_SCHEME_KEY`].

use std::fmt;
use std::str::FromStr;

use tracing::warn;

use crate::config::UnknownValue;
use crate::storage::{Storage, StorageError};

/// Storage key for the selected [`ColorScheme`].
pub const COLOR_SCHEME_KEY: &str = "lumo.color-scheme";

/// What the user asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorScheme {
    Light,
    Dark,
    #[default]
    System,
}

/// What is actually shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Appearance {
    Light,
    Dark,
}

impl ColorScheme {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::System => "system",
        }
    }

    #[must_use]
    pub const fn resolve(self, system_prefers_dark: bool) -> Appearance {
        match self {
            Self::Light => Appearance::Light,
            Self::Dark => Appearance::Dark,
            Self::System if system_prefers_dark => Appearance::Dark,
            Self::System => Appearance::Light,
        }
    }
}

impl fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColorScheme {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            "system" | "auto" => Ok(Self::System),
            _ => Err(UnknownValue {
                kind: "color scheme",
                value: s.to_string(),
                expected: "light, dark, system",
            }),
        }
    }
}

impl Appearance {
    /// Default page background for this appearance.
    #[must_use]
    pub const fn surface(self) -> &'static str {
        match self {
            Self::Light => "#ffffff",
            Self::Dark => "#121212",
        }
    }
}

impl From<Appearance> for ColorScheme {
    fn from(appearance: Appearance) -> Self {
        match appearance {
            Appearance::Light => Self::Light,
            Appearance::Dark => Self::Dark,
        }
    }
}

// ---------------------------------------------------------------------------
// ThemeProvider
// ---------------------------------------------------------------------------

/// Owner of the selected [`ColorScheme`].
#[derive(Debug)]
pub struct ThemeProvider<S: Storage> {
    storage: S,
    scheme: ColorScheme,
}

impl<S: Storage> ThemeProvider<S> {
    /// Read the stored scheme. Unknown values are logged and treated as
    /// [`ColorScheme::System`].
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if `storage` cannot be read.
    pub fn load(storage: S) -> Result<Self, StorageError> {
        let scheme = match storage.load(COLOR_SCHEME_KEY)? {
            None => ColorScheme::default(),
            Some(raw) => raw.parse().unwrap_or_else(|error: UnknownValue| {
                warn!(key = COLOR_SCHEME_KEY, %error, "ignoring stored color scheme");
                ColorScheme::default()
            }),
        };
        Ok(Self { storage, scheme })
    }

    #[must_use]
    pub const fn scheme(&self) -> ColorScheme {
        self.scheme
    }

    /// # Errors
    ///
    /// Returns a [`StorageError`] if the scheme cannot be stored.
    pub fn set_scheme(&mut self, scheme: ColorScheme) -> Result<(), StorageError> {
        self.storage.store(COLOR_SCHEME_KEY, scheme.as_str())?;
        self.scheme = scheme;
        Ok(())
    }

    #[must_use]
    pub const fn appearance(&self, system_prefers_dark: bool) -> Appearance {
        self.scheme.resolve(system_prefers_dark)
    }

    /// Switch to the opposite of what is currently shown. The result is
    /// always an explicit `light` or `dark`, never `system`.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the scheme cannot be stored.
    pub fn toggle(&mut self, system_prefers_dark: bool) -> Result<ColorScheme, StorageError> {
        let next = match self.appearance(system_prefers_dark) {
            Appearance::Light => ColorScheme::Dark,
            Appearance::Dark => ColorScheme::Light,
        };
        self.set_scheme(next)?;
        Ok(next)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
