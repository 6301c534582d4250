//! Run configuration: page profiles, grid, style, and asset locations
//!
//! The configuration is parsed once at startup into an immutable value and
//! passed by reference into each render job; nothing mutates it afterwards.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

use crate::constants::DEFAULT_LINE_SPACING;
use crate::error::{CardError, Result};
use crate::grid::GridSpec;
use crate::style::{Alignment, CardStyle, Color};

/// A named physical page size with its default font size
#[derive(Debug, Clone, PartialEq)]
pub struct PageProfile {
    pub key: String,
    pub width_mm: f32,
    pub height_mm: f32,
    pub font_size: f32,
}

impl PageProfile {
    pub fn new(key: &str, width_mm: f32, height_mm: f32, font_size: f32) -> Self {
        Self {
            key: key.to_string(),
            width_mm,
            height_mm,
            font_size,
        }
    }
}

/// One `PAGE_SIZES` entry as it appears in the configuration file
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageSizeDef {
    pub width_mm: f32,
    pub height_mm: f32,
    pub font_size: f32,
}

/// The `GRID` block of the configuration file
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct GridDef {
    pub rows: usize,
    pub cols: usize,
}

/// Typed run configuration, deserialized from a JSON document with the
/// upper-case key set the card generator has always used.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Config {
    pub page_sizes: BTreeMap<String, PageSizeDef>,
    pub grid: GridDef,
    pub spacing_mm: f32,
    pub padding_mm: f32,
    pub border_color: String,
    pub font_color: String,
    /// Background opacity in percent, 0-100
    pub background_alpha: u8,
    pub text_align: Alignment,
    pub line_spacing: f32,
    /// Ordered background image paths, cycled by card index
    pub backgrounds: Vec<PathBuf>,
    pub font_path: PathBuf,
    pub card_text_input: PathBuf,
    pub output_prefix: String,
    /// Page size keys rendered when the CLI names none
    pub execution_profiles: Vec<String>,
}

fn default_page_sizes() -> BTreeMap<String, PageSizeDef> {
    let entries = [
        ("letter", 216.0, 279.0, 18.0),
        ("legal", 216.0, 356.0, 18.0),
        ("a4", 210.0, 297.0, 24.0),
        ("a3", 297.0, 420.0, 34.0),
        ("a2", 420.0, 594.0, 44.0),
        ("a1", 594.0, 841.0, 54.0),
        ("a0", 841.0, 1189.0, 64.0),
        ("ledger", 279.0, 432.0, 34.0),
    ];
    entries
        .into_iter()
        .map(|(key, width_mm, height_mm, font_size)| {
            (
                key.to_string(),
                PageSizeDef {
                    width_mm,
                    height_mm,
                    font_size,
                },
            )
        })
        .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            page_sizes: default_page_sizes(),
            grid: GridDef { rows: 3, cols: 3 },
            spacing_mm: 5.0,
            padding_mm: 5.0,
            border_color: "#495057".to_string(),
            font_color: "#495057".to_string(),
            background_alpha: 100,
            text_align: Alignment::Center,
            line_spacing: DEFAULT_LINE_SPACING,
            backgrounds: Vec::new(),
            font_path: PathBuf::from("~/.fonts/Anton-Regular.ttf"),
            card_text_input: PathBuf::from("affirmations.txt"),
            output_prefix: "card_".to_string(),
            execution_profiles: vec!["letter".to_string()],
        }
    }
}

impl Config {
    /// Parse a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            CardError::Config(format!("cannot read config '{}': {e}", path.display()))
        })?;
        serde_json::from_str(&raw)
            .map_err(|e| CardError::Config(format!("invalid config '{}': {e}", path.display())))
    }

    /// Parse a configuration file, falling back to defaults when it does
    /// not exist
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            warn!(path = %path.display(), "config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Fail fast on anything that would abort every job anyway
    pub fn validate(&self) -> Result<()> {
        self.grid_spec().validate()?;
        if self.background_alpha > 100 {
            return Err(CardError::Config(format!(
                "BACKGROUND_ALPHA must be 0-100, got {}",
                self.background_alpha
            )));
        }
        if self.backgrounds.is_empty() {
            return Err(CardError::Config(
                "BACKGROUNDS must list at least one image".to_string(),
            ));
        }
        if self.line_spacing <= 0.0 {
            return Err(CardError::Config(format!(
                "LINE_SPACING must be positive, got {}",
                self.line_spacing
            )));
        }
        Color::from_hex(&self.border_color)?;
        Color::from_hex(&self.font_color)?;
        for key in &self.execution_profiles {
            if !self.page_sizes.contains_key(key) {
                return Err(CardError::Config(format!(
                    "EXECUTION_PROFILES names unknown page size '{key}'"
                )));
            }
        }
        if !self.card_text_input.is_file() {
            return Err(CardError::Config(format!(
                "card text file '{}' not found",
                self.card_text_input.display()
            )));
        }
        let font = self.font_file();
        if !font.is_file() {
            return Err(CardError::Config(format!(
                "font file '{}' not found",
                font.display()
            )));
        }
        Ok(())
    }

    /// Font path with a leading `~/` expanded against `$HOME`
    pub fn font_file(&self) -> PathBuf {
        expand_home(&self.font_path)
    }

    pub fn grid_spec(&self) -> GridSpec {
        GridSpec {
            rows: self.grid.rows,
            cols: self.grid.cols,
            padding_mm: self.padding_mm,
            spacing_mm: self.spacing_mm,
        }
    }

    /// Resolved card style; fails on unparseable colors
    pub fn style(&self) -> Result<CardStyle> {
        Ok(CardStyle {
            border_color: Color::from_hex(&self.border_color)?,
            font_color: Color::from_hex(&self.font_color)?,
            background_alpha: self.background_alpha,
            text_align: self.text_align,
        })
    }

    pub fn profile(&self, key: &str) -> Option<PageProfile> {
        self.page_sizes
            .get(key)
            .map(|def| PageProfile::new(key, def.width_mm, def.height_mm, def.font_size))
    }

    /// Deterministic output filename for one profile
    pub fn output_path(&self, profile_key: &str, custom_name: Option<&str>) -> PathBuf {
        match custom_name {
            Some(name) => PathBuf::from(format!("{name}_{profile_key}.pdf")),
            None => PathBuf::from(format!("{}{profile_key}.pdf", self.output_prefix)),
        }
    }

    /// Split positional CLI arguments into profile keys and an optional
    /// custom output name.
    ///
    /// A trailing argument that is not a known page size key becomes the
    /// custom name; with no (remaining) keys the configured execution
    /// profiles apply.
    pub fn split_profile_args(&self, args: &[String]) -> (Vec<String>, Option<String>) {
        let mut keys: Vec<String> = args.to_vec();
        let custom_name = match keys.last() {
            Some(last) if !self.page_sizes.contains_key(last) => keys.pop(),
            _ => None,
        };
        if keys.is_empty() {
            keys = self.execution_profiles.clone();
        }
        (keys, custom_name)
    }
}

fn expand_home(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~") {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    path.to_path_buf()
}
