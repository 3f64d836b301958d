use ratatui::style::Color;
use serde::Deserialize;
use tracing::warn;

use crate::observer::Orientation;
use crate::view::{Direction, PaneOptions, ViewOptions};

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct LayoutConfig {
    pub orientation: Orientation,
    pub direction: Direction,
    /// Minimum pane extent in cells.
    pub min_pane_size: f64,
    /// Key the layout persists under; `None` disables persistence.
    pub storage_key: Option<String>,
    pub first: PaneOptions,
    pub middle: PaneOptions,
    pub third: PaneOptions,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            orientation: Orientation::Vertical,
            direction: Direction::Ltr,
            min_pane_size: 12.0,
            storage_key: Some("default".to_string()),
            first: PaneOptions::default(),
            middle: PaneOptions::default(),
            third: PaneOptions::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Theme
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct Theme {
    pub border: Color,
    pub border_drag: Color,
    pub title: Color,
    pub dim: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            border: Color::DarkGray,
            border_drag: Color::Cyan,
            title: Color::Cyan,
            dim: Color::DarkGray,
        }
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default)]
pub struct Config {
    pub layout: LayoutConfig,
    pub theme: Theme,
}

impl Config {
    pub fn load() -> Self {
        let path = dirs::config_dir()
            .map(|d| d.join("trisplit").join("config.toml"))
            .unwrap_or_default();

        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(_) => return Self::default(),
        };

        let raw: RawConfig = match toml::from_str(&content) {
            Ok(r) => r,
            Err(err) => {
                warn!(path = %path.display(), %err, "invalid config, using defaults");
                return Self::default();
            }
        };

        Self::from_raw(raw)
    }

    /// Translate the config into view options, with an optional storage
    /// key override from the command line.
    pub fn view_options(&self, key_override: Option<String>) -> ViewOptions {
        ViewOptions {
            orientation: self.layout.orientation,
            direction: self.layout.direction,
            first: self.layout.first,
            middle: self.layout.middle,
            third: self.layout.third,
            storage_key: key_override.or_else(|| self.layout.storage_key.clone()),
            min_size: self.layout.min_pane_size,
        }
    }

    fn from_raw(raw: RawConfig) -> Self {
        let mut config = Self::default();

        if let Some(l) = raw.layout {
            match l.orientation.as_deref() {
                Some("vertical") => config.layout.orientation = Orientation::Vertical,
                Some("horizontal") => config.layout.orientation = Orientation::Horizontal,
                _ => {}
            }
            match l.direction.as_deref() {
                Some("ltr") => config.layout.direction = Direction::Ltr,
                Some("rtl") => config.layout.direction = Direction::Rtl,
                _ => {}
            }
            if let Some(v) = l.min_pane_size {
                if v > 0.0 {
                    config.layout.min_pane_size = v;
                }
            }
            if let Some(k) = l.storage_key {
                config.layout.storage_key = if k.is_empty() { None } else { Some(k) };
            }
            for (pane, raw_pane) in [
                (&mut config.layout.first, l.first),
                (&mut config.layout.middle, l.middle),
                (&mut config.layout.third, l.third),
            ] {
                let Some(rp) = raw_pane else { continue };
                if let Some(v) = rp.visible {
                    pane.visible = v;
                }
                if let Some(r) = rp.ratio {
                    if r > 0.0 && r < 1.0 {
                        pane.preferred_ratio = Some(r);
                    }
                }
            }
        }

        if let Some(t) = raw.theme {
            if let Some(c) = t.border.as_deref().and_then(parse_color) {
                config.theme.border = c;
            }
            if let Some(c) = t.border_drag.as_deref().and_then(parse_color) {
                config.theme.border_drag = c;
            }
            if let Some(c) = t.title.as_deref().and_then(parse_color) {
                config.theme.title = c;
            }
            if let Some(c) = t.dim.as_deref().and_then(parse_color) {
                config.theme.dim = c;
            }
        }

        config
    }
}

// ---------------------------------------------------------------------------
// Raw TOML structs (all-optional for merge)
// ---------------------------------------------------------------------------

#[derive(Deserialize, Default)]
struct RawConfig {
    layout: Option<RawLayout>,
    theme: Option<RawTheme>,
}

#[derive(Deserialize, Default)]
struct RawLayout {
    orientation: Option<String>,
    direction: Option<String>,
    min_pane_size: Option<f64>,
    storage_key: Option<String>,
    first: Option<RawPane>,
    middle: Option<RawPane>,
    third: Option<RawPane>,
}

#[derive(Deserialize, Default)]
struct RawPane {
    visible: Option<bool>,
    ratio: Option<f64>,
}

#[derive(Deserialize, Default)]
struct RawTheme {
    border: Option<String>,
    border_drag: Option<String>,
    title: Option<String>,
    dim: Option<String>,
}

pub fn parse_color(s: &str) -> Option<Color> {
    let s = s.trim().to_lowercase();

    if let Some(hex) = s.strip_prefix('#') {
        if hex.len() != 6 {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        return Some(Color::Rgb(r, g, b));
    }

    match s.as_str() {
        "reset" => Some(Color::Reset),
        "black" => Some(Color::Black),
        "red" => Some(Color::Red),
        "green" => Some(Color::Green),
        "yellow" => Some(Color::Yellow),
        "blue" => Some(Color::Blue),
        "magenta" => Some(Color::Magenta),
        "cyan" => Some(Color::Cyan),
        "gray" | "grey" => Some(Color::Gray),
        "white" => Some(Color::White),
        "dark_gray" | "dark_grey" | "darkgray" | "darkgrey" => Some(Color::DarkGray),
        _ => None,
    }
}
