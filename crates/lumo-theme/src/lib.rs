//! # lumo-theme — preferences and color scheme for lumo
//!
//! - **[`storage`]** — the `Storage` capability, with in-memory and on-disk
//!   implementations
//! - **[`config`]** — `ConfigProvider`: direction, size, auto-contrast
//! - **[`theme`]** — `ThemeProvider`: light / dark / system
//!
//! Providers are plain values built once and passed by reference; there is
//! no global state. Auto-contrast delegates to `lumo_color`.

pub mod config;
pub mod storage;
pub mod theme;

pub use config::{ConfigProvider, Direction, PREFERENCES_KEY, Preferences, Size, UnknownValue};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
pub use theme::{Appearance, COLOR_SCHEME_KEY, ColorScheme, ThemeProvider};
