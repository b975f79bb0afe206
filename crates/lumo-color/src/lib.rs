// SPDX-License-Identifier: MIT
//
// lumo-color — readable text on arbitrary backgrounds.
//
// A small, pure pipeline for WCAG contrast work:
//
//   "rgba(255 0 0 / .5)"
//       │
//       ▼
//   color.rs:      parse into ColorRgba (hex, rgb(), rgba())
//       │
//       ▼
//   contrast.rs:   relative luminance → contrast ratio → AA/AAA check
//       │          → pick the light or dark text candidate
//       ▼
//   background.rs: walk a container chain, compositing translucent layers,
//                  to find the opaque color actually behind the text
//
// Nothing here keeps state between calls. The only side effect is a
// `tracing` warning when `contrast_ratio` is handed an unparsable color.

// Single-char channel names (r, g, b, a) are the color-science convention.
#![allow(clippy::many_single_char_names)]

pub mod background;
pub mod color;
pub mod contrast;

pub use background::{LayerId, LayerRef, LayerTree, Surface, resolve_background};
pub use color::{
    ChannelPolicy, ColorRgba, ParseColorError, is_transparent_keyword, parse_color,
    parse_color_with,
};
pub use contrast::{
    ContrastOptions, TextSize, UnknownWcagLevel, WcagLevel, WcagReport, accessible_text_color,
    contrast_ratio, luminance, meets_wcag, try_contrast_ratio,
};
