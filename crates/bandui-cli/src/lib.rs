//! Shared CLI definitions for bandui.
//!
//! Used by the main application and by the build script (manpage).

use clap::Parser;
use std::path::PathBuf;

/// Parse a delimiter argument: a single ASCII character, or the escape
/// sequences `\t` (tab) and `\s` (space).
fn parse_delimiter(s: &str) -> Result<u8, String> {
    match s {
        "\\t" => Ok(b'\t'),
        "\\s" => Ok(b' '),
        _ => {
            let bytes = s.as_bytes();
            if bytes.len() == 1 {
                Ok(bytes[0])
            } else {
                Err(format!(
                    "delimiter must be a single ASCII character, \\t, or \\s (got {:?})",
                    s
                ))
            }
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "bandui",
    version,
    about = "Time-series visualization in the terminal: line series, categorical background bands, and value markers"
)]
pub struct Args {
    /// Path to the CSV file to open (not required with --generate-config)
    #[arg(required_unless_present = "generate_config", value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Specify the delimiter to use when reading the file (single character, \t, or \s)
    #[arg(long = "delimiter", value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,

    /// Specify that the file has no header row
    #[arg(long = "no-header", action)]
    pub no_header: bool,

    /// Number of rows to use when inferring CSV schema (default: 1000). Larger values reduce risk of wrong type (e.g. int then N/A).
    #[arg(long = "infer-schema-length", value_name = "N")]
    pub infer_schema_length: Option<usize>,

    /// Override the configuration directory (default: platform config dir, e.g. ~/.config/bandui)
    #[arg(long = "config-dir", value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// Generate default configuration file and exit
    #[arg(long = "generate-config", action)]
    pub generate_config: bool,

    /// Force overwrite existing config file when using --generate-config
    #[arg(long = "force", requires = "generate_config", action)]
    pub force: bool,

    /// Write tracing output to this file (the terminal stays clean without it)
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Enable debug-level tracing (requires --log-file to be visible anywhere)
    #[arg(long = "debug", action)]
    pub debug: bool,
}
