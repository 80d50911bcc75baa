//! Configuration: config-directory management, TOML app config, and the
//! parsed color theme.

use color_eyre::eyre::eyre;
use color_eyre::Result;
use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use supports_color::Stream;

/// Manages the config directory and config file operations.
#[derive(Clone)]
pub struct ConfigManager {
    pub(crate) config_dir: PathBuf,
}

impl ConfigManager {
    /// Create a ConfigManager with a custom config directory (primarily for testing)
    pub fn with_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Create a new ConfigManager for the given app name
    pub fn new(app_name: &str) -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| eyre!("Could not determine config directory"))?
            .join(app_name);

        Ok(Self { config_dir })
    }

    /// Get the config directory path
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Get path to a specific config file
    pub fn config_path(&self, path: &str) -> PathBuf {
        self.config_dir.join(path)
    }

    /// Ensure the config directory exists
    pub fn ensure_config_dir(&self) -> Result<()> {
        if !self.config_dir.exists() {
            std::fs::create_dir_all(&self.config_dir)?;
        }
        Ok(())
    }

    /// Default configuration rendered as TOML with a usage header. Written
    /// by `--generate-config`.
    pub fn generate_default_config(&self) -> String {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config)
            .unwrap_or_else(|e| panic!("Failed to serialize default config: {}", e));
        format!(
            "# bandui configuration\n\
             # Colors accept named colors (\"red\", \"dark_gray\"), hex (\"#ff0000\"),\n\
             # and indexed(0-255) entries; they adapt to terminal capabilities.\n\n{}",
            toml_str
        )
    }

    /// Load `config.toml` from the config directory, falling back to
    /// defaults when the file does not exist.
    pub fn load_config(&self) -> Result<AppConfig> {
        let path = self.config_path("config.toml");
        if !path.exists() {
            return Ok(AppConfig::default());
        }
        let text = std::fs::read_to_string(&path)?;
        let config: AppConfig = toml::from_str(&text)?;
        Ok(config)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Configuration format version (for future compatibility)
    pub version: String,
    pub display: DisplayConfig,
    pub performance: PerformanceConfig,
    pub chart: ChartConfig,
    pub theme: ThemeConfig,
    pub debug: DebugConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: "0.1".to_string(),
            display: DisplayConfig::default(),
            performance: PerformanceConfig::default(),
            chart: ChartConfig::default(),
            theme: ThemeConfig::default(),
            debug: DebugConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Percentage of the main area given to the data table (the plot gets
    /// the rest).
    pub table_width_percent: u16,
    /// Display row numbers on the left side of the table
    pub row_numbers: bool,
    /// Number of spaces between columns in the data table (>= 0)
    pub table_cell_padding: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            table_width_percent: 30,
            row_numbers: true,
            table_cell_padding: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    /// Event polling interval in milliseconds. Lower values = more
    /// responsive but higher CPU usage.
    pub event_poll_interval_ms: u64,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            event_poll_interval_ms: 25,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// How far band colors are dimmed toward the terminal background
    /// (0 = full palette color, 100 = invisible). Terminal cells have no
    /// alpha, so this stands in for the background alpha of the bands.
    pub band_dim_percent: u8,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            band_dim_percent: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ThemeConfig {
    pub colors: ColorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    pub text_primary: String,
    pub text_secondary: String,
    pub dimmed: String,
    pub border: String,
    pub border_active: String,
    pub error: String,
    pub success: String,
    pub warning: String,
    pub controls_bg: String,
    pub table_header: String,
    pub row_numbers: String,
    pub marker: String,
    pub selection: String,
    pub chart_series_color_1: String,
    pub chart_series_color_2: String,
    pub chart_series_color_3: String,
    pub chart_series_color_4: String,
    pub chart_series_color_5: String,
    pub chart_series_color_6: String,
    pub chart_series_color_7: String,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            text_primary: "white".to_string(),
            text_secondary: "gray".to_string(),
            dimmed: "dark_gray".to_string(),
            border: "dark_gray".to_string(),
            border_active: "cyan".to_string(),
            error: "red".to_string(),
            success: "green".to_string(),
            warning: "yellow".to_string(),
            controls_bg: "indexed(236)".to_string(),
            table_header: "cyan".to_string(),
            row_numbers: "dark_gray".to_string(),
            // Marker lines keep the red the original used.
            marker: "#d63031".to_string(),
            selection: "#cfe3ff".to_string(),
            chart_series_color_1: "cyan".to_string(),
            chart_series_color_2: "yellow".to_string(),
            chart_series_color_3: "green".to_string(),
            chart_series_color_4: "magenta".to_string(),
            chart_series_color_5: "blue".to_string(),
            chart_series_color_6: "red".to_string(),
            chart_series_color_7: "white".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DebugConfig {
    /// Enable debug-level tracing when a log file is configured
    pub enabled: bool,
}

/// Parses color strings into terminal colors, adapting to the terminal's
/// capabilities (truecolor, 256, basic ANSI).
pub struct ColorParser {
    supports_true_color: bool,
    supports_256: bool,
    no_color: bool,
}

impl ColorParser {
    /// Create a new ColorParser with automatic terminal capability detection
    pub fn new() -> Self {
        let no_color = std::env::var("NO_COLOR").is_ok();
        let support = supports_color::on(Stream::Stdout);

        Self {
            supports_true_color: support.as_ref().map(|s| s.has_16m).unwrap_or(false),
            supports_256: support.as_ref().map(|s| s.has_256).unwrap_or(false),
            no_color,
        }
    }

    /// A parser that assumes truecolor support (tests and non-terminal output).
    pub fn truecolor() -> Self {
        Self {
            supports_true_color: true,
            supports_256: true,
            no_color: false,
        }
    }

    /// Parse a color string (hex, indexed, or named) to a terminal color.
    pub fn parse(&self, s: &str) -> Result<Color> {
        if self.no_color {
            return Ok(Color::Reset);
        }

        let trimmed = s.trim();

        // Hex format: "#ff0000" or "#FF0000" (6-character hex)
        if trimmed.starts_with('#') && trimmed.len() == 7 {
            let (r, g, b) = parse_hex(trimmed)?;
            return Ok(self.adapt_rgb(r, g, b));
        }

        // Indexed colors: "indexed(236)" for explicit 256-color palette
        if trimmed.to_lowercase().starts_with("indexed(") && trimmed.ends_with(')') {
            let num_str = &trimmed[8..trimmed.len() - 1];
            let num = num_str.parse::<u8>().map_err(|_| {
                eyre!(
                    "Invalid indexed color: '{}'. Expected format: indexed(0-255)",
                    trimmed
                )
            })?;
            return Ok(Color::Indexed(num));
        }

        // Named colors (case-insensitive)
        let lower = trimmed.to_lowercase();
        match lower.as_str() {
            "black" => Ok(Color::Black),
            "red" => Ok(Color::Red),
            "green" => Ok(Color::Green),
            "yellow" => Ok(Color::Yellow),
            "blue" => Ok(Color::Blue),
            "magenta" => Ok(Color::Magenta),
            "cyan" => Ok(Color::Cyan),
            "white" => Ok(Color::White),

            "bright_black" | "bright black" => Ok(Color::Indexed(8)),
            "bright_red" | "bright red" => Ok(Color::Indexed(9)),
            "bright_green" | "bright green" => Ok(Color::Indexed(10)),
            "bright_yellow" | "bright yellow" => Ok(Color::Indexed(11)),
            "bright_blue" | "bright blue" => Ok(Color::Indexed(12)),
            "bright_magenta" | "bright magenta" => Ok(Color::Indexed(13)),
            "bright_cyan" | "bright cyan" => Ok(Color::Indexed(14)),
            "bright_white" | "bright white" => Ok(Color::Indexed(15)),

            "gray" | "grey" => Ok(Color::Indexed(8)),
            "dark_gray" | "dark gray" | "dark_grey" | "dark grey" => Ok(Color::Indexed(8)),
            "light_gray" | "light gray" | "light_grey" | "light grey" => Ok(Color::Indexed(7)),

            "reset" | "default" | "none" => Ok(Color::Reset),

            _ => Err(eyre!(
                "Unknown color name: '{}'. Supported: basic ANSI colors (red, blue, etc.), \
                 bright variants (bright_red, etc.), or hex colors (#ff0000)",
                trimmed
            )),
        }
    }

    /// Convert RGB values to the richest color the terminal supports.
    pub fn adapt_rgb(&self, r: u8, g: u8, b: u8) -> Color {
        if self.supports_true_color {
            Color::Rgb(r, g, b)
        } else if self.supports_256 {
            Color::Indexed(rgb_to_256_color(r, g, b))
        } else {
            rgb_to_basic_ansi(r, g, b)
        }
    }

    /// Adapt an already-built color: RGB values are downconverted on
    /// terminals without truecolor, everything else passes through.
    pub fn adapt(&self, color: Color) -> Color {
        match color {
            Color::Rgb(r, g, b) => self.adapt_rgb(r, g, b),
            other => other,
        }
    }
}

impl Default for ColorParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse hex color string (#ff0000) to RGB components
fn parse_hex(s: &str) -> Result<(u8, u8, u8)> {
    if !s.starts_with('#') || s.len() != 7 {
        return Err(eyre!(
            "Invalid hex color format: '{}'. Expected format: #rrggbb",
            s
        ));
    }

    let r = u8::from_str_radix(&s[1..3], 16)
        .map_err(|_| eyre!("Invalid red component in hex color: {}", s))?;
    let g = u8::from_str_radix(&s[3..5], 16)
        .map_err(|_| eyre!("Invalid green component in hex color: {}", s))?;
    let b = u8::from_str_radix(&s[5..7], 16)
        .map_err(|_| eyre!("Invalid blue component in hex color: {}", s))?;

    Ok((r, g, b))
}

/// Convert RGB to nearest 256-color palette index
/// Uses standard xterm 256-color palette
pub fn rgb_to_256_color(r: u8, g: u8, b: u8) -> u8 {
    // Check if it's a gray shade (r ≈ g ≈ b)
    let max_diff = r.max(g).max(b) as i16 - r.min(g).min(b) as i16;
    if max_diff < 10 {
        // Map to grayscale ramp (232-255)
        let gray = (r as u16 + g as u16 + b as u16) / 3;
        if gray < 8 {
            return 16; // Black
        } else if gray > 247 {
            return 231; // White
        } else {
            return 232 + ((gray - 8) * 24 / 240) as u8;
        }
    }

    // Map to 6x6x6 color cube (16-231)
    let r_idx = (r as u16 * 5 / 255) as u8;
    let g_idx = (g as u16 * 5 / 255) as u8;
    let b_idx = (b as u16 * 5 / 255) as u8;

    16 + 36 * r_idx + 6 * g_idx + b_idx
}

/// Convert RGB to nearest basic ANSI color (8 colors)
pub fn rgb_to_basic_ansi(r: u8, g: u8, b: u8) -> Color {
    let r_bright = r > 128;
    let g_bright = g > 128;
    let b_bright = b > 128;

    // Check for grayscale
    let max_diff = r.max(g).max(b) as i16 - r.min(g).min(b) as i16;
    if max_diff < 30 {
        let avg = (r as u16 + g as u16 + b as u16) / 3;
        return if avg < 64 { Color::Black } else { Color::White };
    }

    match (r_bright, g_bright, b_bright) {
        (false, false, false) => Color::Black,
        (true, false, false) => Color::Red,
        (false, true, false) => Color::Green,
        (true, true, false) => Color::Yellow,
        (false, false, true) => Color::Blue,
        (true, false, true) => Color::Magenta,
        (false, true, true) => Color::Cyan,
        (true, true, true) => Color::White,
    }
}

/// Theme containing parsed colors ready for use
#[derive(Debug, Clone)]
pub struct Theme {
    pub colors: HashMap<String, Color>,
}

impl Theme {
    /// Create a Theme from a ThemeConfig by parsing all color strings
    pub fn from_config(config: &ThemeConfig) -> Result<Self> {
        let parser = ColorParser::new();
        let c = &config.colors;
        let entries: [(&str, &String); 20] = [
            ("text_primary", &c.text_primary),
            ("text_secondary", &c.text_secondary),
            ("dimmed", &c.dimmed),
            ("border", &c.border),
            ("border_active", &c.border_active),
            ("error", &c.error),
            ("success", &c.success),
            ("warning", &c.warning),
            ("controls_bg", &c.controls_bg),
            ("table_header", &c.table_header),
            ("row_numbers", &c.row_numbers),
            ("marker", &c.marker),
            ("selection", &c.selection),
            ("chart_series_color_1", &c.chart_series_color_1),
            ("chart_series_color_2", &c.chart_series_color_2),
            ("chart_series_color_3", &c.chart_series_color_3),
            ("chart_series_color_4", &c.chart_series_color_4),
            ("chart_series_color_5", &c.chart_series_color_5),
            ("chart_series_color_6", &c.chart_series_color_6),
            ("chart_series_color_7", &c.chart_series_color_7),
        ];

        let mut colors = HashMap::with_capacity(entries.len());
        for (name, value) in entries {
            colors.insert(name.to_string(), parser.parse(value)?);
        }
        Ok(Self { colors })
    }

    /// Look up a theme color; unknown names fall back to Reset.
    pub fn get(&self, name: &str) -> Color {
        self.colors.get(name).copied().unwrap_or(Color::Reset)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme::from_config(&ThemeConfig::default()).unwrap_or_else(|_| Theme {
            colors: HashMap::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> ColorParser {
        ColorParser::truecolor()
    }

    #[test]
    fn parse_named_colors() {
        assert_eq!(parser().parse("red").unwrap(), Color::Red);
        assert_eq!(parser().parse("Bright_Blue").unwrap(), Color::Indexed(12));
        assert_eq!(parser().parse("dark gray").unwrap(), Color::Indexed(8));
    }

    #[test]
    fn parse_hex_colors() {
        assert_eq!(
            parser().parse("#d63031").unwrap(),
            Color::Rgb(0xd6, 0x30, 0x31)
        );
        assert!(parser().parse("#xyzxyz").is_err());
        assert!(parser().parse("#fff").is_err());
    }

    #[test]
    fn parse_indexed_colors() {
        assert_eq!(parser().parse("indexed(236)").unwrap(), Color::Indexed(236));
        assert!(parser().parse("indexed(999)").is_err());
    }

    #[test]
    fn parse_unknown_name_errors() {
        assert!(parser().parse("mauve-ish").is_err());
    }

    #[test]
    fn rgb_256_gray_ramp_and_cube() {
        assert_eq!(rgb_to_256_color(0, 0, 0), 16);
        assert_eq!(rgb_to_256_color(255, 255, 255), 231);
        // Saturated red lands in the color cube.
        let red = rgb_to_256_color(255, 0, 0);
        assert!((16..=231).contains(&red));
    }

    #[test]
    fn basic_ansi_fallback() {
        assert_eq!(rgb_to_basic_ansi(250, 20, 20), Color::Red);
        assert_eq!(rgb_to_basic_ansi(20, 200, 20), Color::Green);
        assert_eq!(rgb_to_basic_ansi(30, 30, 30), Color::Black);
    }

    #[test]
    fn default_theme_parses_every_color() {
        let theme = Theme::from_config(&ThemeConfig::default()).unwrap();
        assert!(theme.colors.len() >= 20);
    }

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = AppConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.display.table_width_percent, 30);
        assert_eq!(parsed.chart.band_dim_percent, 60);
        assert_eq!(parsed.performance.event_poll_interval_ms, 25);
    }

    #[test]
    fn partial_config_uses_defaults() {
        let parsed: AppConfig = toml::from_str("[display]\ntable_width_percent = 50\n").unwrap();
        assert_eq!(parsed.display.table_width_percent, 50);
        assert!(parsed.display.row_numbers);
        assert_eq!(parsed.chart.band_dim_percent, 60);
    }
}
