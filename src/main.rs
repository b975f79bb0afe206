// SPDX-License-Identifier: MIT
//
// lumo — WCAG contrast from the command line.
//
// This is the binary that wires together both crates:
//
//   lumo-color → parsing, luminance, contrast, WCAG checks, text-color
//                picking, background resolution
//   lumo-theme → persisted preferences and color scheme
//
// Every subcommand is a thin shell over one library operation:
//
//   lumo parse <COLOR>              canonical rgb()/rgba() and hex forms
//   lumo luminance <COLOR>          relative luminance
//   lumo contrast <A> <B>           ratio + AA/AAA report
//   lumo check <RATIO>              pass/fail, exit status 1 on fail
//   lumo pick <BACKGROUND>          light or dark text candidate
//   lumo resolve <LAYER>...         composite a container chain
//   lumo prefs                      show / change stored preferences
//
// Diagnostics go to stderr through tracing; set RUST_LOG=debug to see the
// resolver walk and storage writes.

use std::env;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use lumo_color::{
    ChannelPolicy, ContrastOptions, LayerTree, WcagLevel, WcagReport, accessible_text_color,
    contrast_ratio, meets_wcag, parse_color_with, resolve_background, try_contrast_ratio,
};
use lumo_theme::{ColorScheme, ConfigProvider, Direction, FileStorage, Size, ThemeProvider};

// ─── Command line ───────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "lumo", version)]
#[command(about = "Measure WCAG contrast and pick readable text colors")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a color and print its canonical forms.
    Parse {
        color: String,

        /// How out-of-range rgb()/rgba() values are treated.
        #[arg(long, default_value = "permissive")]
        policy: ChannelPolicy,
    },

    /// Print the WCAG relative luminance of a color.
    Luminance { color: String },

    /// Print the contrast ratio between two colors.
    Contrast { first: String, second: String },

    /// Check a contrast ratio against a WCAG level.
    Check {
        ratio: f64,

        #[arg(long, default_value = "AA")]
        level: WcagLevel,

        /// Large text (18pt, or 14pt bold).
        #[arg(long)]
        large: bool,
    },

    /// Pick the more readable of two text colors for a background.
    Pick {
        background: String,

        #[arg(long, default_value = "#ffffff")]
        light: String,

        #[arg(long, default_value = "#000000")]
        dark: String,

        #[arg(long, default_value = "AA")]
        level: WcagLevel,

        #[arg(long)]
        large: bool,
    },

    /// Resolve the effective background of a container chain.
    ///
    /// Layers are listed innermost first. Use `none` for a layer that paints
    /// no background at all.
    Resolve {
        #[arg(required = true)]
        layers: Vec<String>,

        /// Also pick a text color for the resolved background.
        #[arg(long)]
        text: bool,
    },

    /// Show or change stored preferences.
    Prefs {
        /// Preference directory (default: $XDG_CONFIG_HOME/lumo).
        #[arg(long, env = "LUMO_PREFS_DIR")]
        dir: Option<PathBuf>,

        #[arg(long)]
        direction: Option<Direction>,

        #[arg(long)]
        size: Option<Size>,

        /// on / off
        #[arg(long, value_parser = clap::builder::BoolishValueParser::new())]
        auto_contrast: Option<bool>,

        #[arg(long)]
        scheme: Option<ColorScheme>,

        /// Forget all stored preferences first.
        #[arg(long)]
        reset: bool,

        /// Treat the host as preferring a dark appearance.
        #[arg(long)]
        dark_host: bool,
    },
}

// ─── Commands ───────────────────────────────────────────────────────────────

/// Run one command, writing its report to `out`.
///
/// `Ok(false)` means the command ran but its check failed (exit status 1).
fn run(cli: Cli, out: &mut dyn Write) -> Result<bool> {
    match cli.command {
        Command::Parse { color, policy } => {
            let parsed = parse_color_with(&color, policy)
                .with_context(|| format!("cannot parse '{color}'"))?;
            writeln!(out, "{parsed}")?;
            writeln!(out, "{}", parsed.to_hex())?;
            Ok(true)
        }

        Command::Luminance { color } => {
            let parsed = parse_color_with(&color, ChannelPolicy::Permissive)
                .with_context(|| format!("cannot parse '{color}'"))?;
            writeln!(out, "{:.4}", parsed.luminance())?;
            Ok(true)
        }

        Command::Contrast { first, second } => {
            let ratio = try_contrast_ratio(&first, &second)?;
            let report = WcagReport::evaluate(ratio);
            writeln!(out, "contrast  {ratio:.2}:1")?;
            writeln!(
                out,
                "AA        {}  (large: {})",
                verdict(report.aa),
                verdict(report.aa_large)
            )?;
            writeln!(
                out,
                "AAA       {}  (large: {})",
                verdict(report.aaa),
                verdict(report.aaa_large)
            )?;
            Ok(true)
        }

        Command::Check {
            ratio,
            level,
            large,
        } => {
            let pass = meets_wcag(ratio, level, large);
            writeln!(out, "{level} {}", verdict(pass))?;
            Ok(pass)
        }

        Command::Pick {
            background,
            light,
            dark,
            level,
            large,
        } => {
            let options = ContrastOptions::default()
                .light(light)
                .dark(dark)
                .level(level)
                .large_text(large);
            write_pick(out, &background, &options)?;
            Ok(true)
        }

        Command::Resolve { layers, text } => {
            let (tree, leaf) = LayerTree::chain(
                layers
                    .iter()
                    .map(|layer| (!layer.eq_ignore_ascii_case("none")).then_some(layer.as_str())),
            );
            let resolved = leaf.and_then(|id| resolve_background(&tree.surface(id)));
            match resolved {
                Some(color) => {
                    writeln!(out, "{color}")?;
                    if text {
                        write_pick(out, &color, &ContrastOptions::default())?;
                    }
                }
                None => writeln!(out, "none")?,
            }
            Ok(true)
        }

        Command::Prefs {
            dir,
            direction,
            size,
            auto_contrast,
            scheme,
            reset,
            dark_host,
        } => {
            let dir = dir.map_or_else(default_prefs_dir, Ok)?;
            let storage = FileStorage::new(dir);
            let mut config = ConfigProvider::load(&storage)?;
            let mut theme = ThemeProvider::load(&storage)?;

            if reset {
                config.reset()?;
            }
            config.update(|prefs| {
                if let Some(direction) = direction {
                    prefs.direction = direction;
                }
                if let Some(size) = size {
                    prefs.size = size;
                }
                if let Some(enabled) = auto_contrast {
                    prefs.auto_contrast = enabled;
                }
            })?;
            if let Some(scheme) = scheme {
                theme.set_scheme(scheme)?;
            }

            let prefs = config.preferences();
            let appearance = theme.appearance(dark_host);
            writeln!(out, "direction      {}", prefs.direction)?;
            writeln!(out, "size           {}", prefs.size)?;
            writeln!(
                out,
                "auto-contrast  {}",
                if prefs.auto_contrast { "on" } else { "off" }
            )?;
            writeln!(
                out,
                "scheme         {} ({})",
                theme.scheme(),
                ColorScheme::from(appearance)
            )?;
            if let Some(fg) = config.foreground_for(appearance.surface()) {
                writeln!(out, "text           {fg} on {}", appearance.surface())?;
            }
            Ok(true)
        }
    }
}

fn write_pick(out: &mut dyn Write, background: &str, options: &ContrastOptions) -> Result<()> {
    let picked = accessible_text_color(background, options);
    let ratio = contrast_ratio(background, picked);
    let pass = meets_wcag(ratio, options.wcag_level, options.is_large_text);
    writeln!(
        out,
        "{picked}  {ratio:.2}:1  {} {}",
        options.wcag_level,
        verdict(pass)
    )?;
    Ok(())
}

const fn verdict(pass: bool) -> &'static str {
    if pass { "pass" } else { "fail" }
}

fn default_prefs_dir() -> Result<PathBuf> {
    if let Some(config) = env::var_os("XDG_CONFIG_HOME") {
        return Ok(PathBuf::from(config).join("lumo"));
    }
    let home = env::var_os("HOME").context("neither XDG_CONFIG_HOME nor HOME is set; pass --dir")?;
    Ok(PathBuf::from(home).join(".config").join("lumo"))
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let mut stdout = io::stdout().lock();
    match run(cli, &mut stdout) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("lumo: {e:#}");
            process::exit(1);
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
