//! Command-line interface for the memlayout utility
//!
//! Renders memory map documents to SVG or Graphviz DOT, checks them, and
//! dumps the loaded document tree as JSON.

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::ffi::OsString;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use memlayout::core::logging::init_logging;
use memlayout::core::Renderer;
use memlayout::plugins::Orchestrator;
use memlayout::yaml::{self, Value};

/// Memlayout - Draw memory maps from indented text
#[derive(Parser)]
#[command(name = "memlayout")]
#[command(about = "A Rust utility to draw memory layout diagrams as SVG or Graphviz DOT")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Set log level (trace|debug|info|warn|error)
    #[arg(long, value_enum, default_value_t = LogLevel::Warn, global = true)]
    pub log_level: LogLevel,

    /// Set log format (compact|pretty|json)
    #[arg(long, value_enum, default_value_t = LogFormat::Compact, global = true)]
    pub log_format: LogFormat,
}

/// Log level options
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log format options
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

/// Output formats
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq, Default)]
pub enum FormatChoice {
    /// Standalone SVG image
    #[default]
    Svg,
    /// Graphviz DOT source
    Dot,
}

impl FormatChoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormatChoice::Svg => "svg",
            FormatChoice::Dot => "dot",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render a memory map document
    Render {
        /// Input document (use - for stdin)
        input: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = FormatChoice::Svg)]
        format: FormatChoice,

        /// Output file (use - for stdout); defaults to the input name with
        /// the format's suffix
        #[arg(short, long, conflicts_with = "output_prefix")]
        output: Option<PathBuf>,

        /// Output file name without the format suffix
        #[arg(long)]
        output_prefix: Option<PathBuf>,
    },

    /// Check that a document loads and describes a valid memory map
    Check {
        /// Input document (use - for stdin)
        input: PathBuf,
    },

    /// Print the loaded document tree as JSON
    Dump {
        /// Input document (use - for stdin)
        input: PathBuf,
    },

    /// Show supported output formats
    Formats {
        /// Show in JSON format
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Serialize)]
struct FormatInfo {
    name: &'static str,
    version: &'static str,
    suffix: &'static str,
}

#[derive(Debug, Serialize)]
struct FormatList {
    formats: Vec<FormatInfo>,
    total: usize,
}

/// Main CLI application
pub struct MemlayoutApp {
    orchestrator: Orchestrator,
}

impl MemlayoutApp {
    /// Create a new application instance with every renderer registered
    pub fn new() -> Self {
        Self {
            orchestrator: Orchestrator::with_all_renderers(),
        }
    }

    /// Run the application with the given CLI arguments
    pub fn run(&self, cli: Cli) -> Result<()> {
        // Environment variables take precedence over the flags
        let log_level = std::env::var("MEMLAYOUT_LOG_LEVEL")
            .ok()
            .or_else(|| std::env::var("RUST_LOG").ok())
            .unwrap_or_else(|| cli.log_level.as_str().to_string());
        let log_format = std::env::var("MEMLAYOUT_LOG_FORMAT")
            .ok()
            .unwrap_or_else(|| cli.log_format.as_str().to_string());

        if let Err(e) = init_logging(Some(&log_level), Some(&log_format)) {
            eprintln!("Warning: Failed to initialize logging: {}", e);
        }

        if cli.verbose {
            eprintln!("memlayout v{}", env!("CARGO_PKG_VERSION"));
        }

        match cli.command {
            Commands::Render {
                input,
                format,
                output,
                output_prefix,
            } => self.render_command(input, format, output, output_prefix, cli.verbose),
            Commands::Check { input } => self.check_command(input, cli.verbose),
            Commands::Dump { input } => self.dump_command(input, cli.verbose),
            Commands::Formats { json } => self.formats_command(json, cli.verbose),
        }
    }

    /// Handle the render command
    fn render_command(
        &self,
        input: PathBuf,
        format: FormatChoice,
        output: Option<PathBuf>,
        output_prefix: Option<PathBuf>,
        verbose: bool,
    ) -> Result<()> {
        let content = self.read_input(&input)?;
        if verbose {
            eprintln!("Read {} bytes of input", content.len());
        }

        let rendered = self.orchestrator.process(&content, format.as_str())?;
        let suffix = self
            .orchestrator
            .renderer(format.as_str())
            .map(|renderer| renderer.file_suffix())
            .unwrap_or_default();
        let destination = output_path(&input, output, output_prefix, suffix);

        if verbose {
            eprintln!(
                "Writing {} output to {}",
                format.as_str(),
                destination.display()
            );
        }
        self.write_output(&destination, &rendered)?;
        info!(output = %destination.display(), format = format.as_str(), "Diagram written");
        Ok(())
    }

    /// Handle the check command
    fn check_command(&self, input: PathBuf, verbose: bool) -> Result<()> {
        let content = self.read_input(&input)?;
        if verbose {
            eprintln!("Read {} bytes of input", content.len());
        }

        match self.orchestrator.build_map(&content) {
            Ok(map) => {
                println!("✓ Valid memory map with {} regions", map.len());
                Ok(())
            }
            Err(e) => {
                println!("✗ Invalid memory map: {}", e);
                Err(e)
            }
        }
    }

    /// Handle the dump command
    fn dump_command(&self, input: PathBuf, verbose: bool) -> Result<()> {
        let content = self.read_input(&input)?;
        if verbose {
            eprintln!("Read {} bytes of input", content.len());
        }

        let root = yaml::load_str(&content)?;
        debug!(root_type = root.type_name(), "Document loaded");
        println!("{}", serde_json::to_string_pretty(&to_json(&root))?);
        Ok(())
    }

    /// Handle the formats command
    fn formats_command(&self, json: bool, verbose: bool) -> Result<()> {
        if verbose {
            eprintln!("Listing supported output formats");
        }

        let formats: Vec<FormatInfo> = self
            .orchestrator
            .renderer_names()
            .iter()
            .filter_map(|name| self.orchestrator.renderer(name))
            .map(|renderer| FormatInfo {
                name: renderer.name(),
                version: renderer.version(),
                suffix: renderer.file_suffix(),
            })
            .collect();

        if json {
            let list = FormatList {
                total: formats.len(),
                formats,
            };
            println!("{}", serde_json::to_string_pretty(&list)?);
        } else {
            println!("Supported output formats:");
            for format in &formats {
                println!(
                    "  {:<5} - {} files, renderer v{}",
                    format.name, format.suffix, format.version
                );
            }
            println!();
            println!("Total: {} output formats supported", formats.len());
        }
        Ok(())
    }

    /// Read input from file or stdin
    pub fn read_input(&self, input: &Path) -> Result<String> {
        if input.to_string_lossy() == "-" {
            let mut content = String::new();
            io::stdin().read_to_string(&mut content)?;
            Ok(content)
        } else {
            fs::read_to_string(input)
                .map_err(|e| anyhow!("Failed to read input file '{}': {}", input.display(), e))
        }
    }

    /// Write output to file, or to stdout for `-`
    pub fn write_output(&self, output: &Path, content: &str) -> Result<()> {
        if output.to_string_lossy() == "-" {
            print!("{}", content);
            if !content.is_empty() && !content.ends_with('\n') {
                println!();
            }
            io::stdout().flush()?;
        } else {
            fs::write(output, content).map_err(|e| {
                anyhow!("Failed to write output file '{}': {}", output.display(), e)
            })?;
        }
        Ok(())
    }
}

impl Default for MemlayoutApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Where rendered output goes
///
/// An explicit `--output` wins, then `--output-prefix` plus the suffix.
/// Otherwise the input name loses a `.mld` extension and gains the suffix;
/// input from stdin goes to stdout.
pub fn output_path(
    input: &Path,
    output: Option<PathBuf>,
    output_prefix: Option<PathBuf>,
    suffix: &str,
) -> PathBuf {
    if let Some(output) = output {
        return output;
    }
    let base = match output_prefix {
        Some(prefix) => prefix,
        None if input.to_string_lossy() == "-" => return PathBuf::from("-"),
        None if input.extension().is_some_and(|ext| ext == "mld") => input.with_extension(""),
        None => input.to_path_buf(),
    };
    let mut name = OsString::from(base);
    name.push(suffix);
    PathBuf::from(name)
}

/// Convert a loaded document into JSON, keeping mapping order
pub fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Integer(i) => match (i64::try_from(*i), u64::try_from(*i)) {
            (Ok(signed), _) => serde_json::Value::from(signed),
            (_, Ok(unsigned)) => serde_json::Value::from(unsigned),
            _ => serde_json::Value::String(i.to_string()),
        },
        // JSON has no infinities or NaN
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or_else(|| serde_json::Value::String(value.to_string())),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Sequence(items) => serde_json::Value::Array(items.iter().map(to_json).collect()),
        Value::Mapping(map) => serde_json::Value::Object(
            map.iter()
                .map(|(key, value)| (key.to_string(), to_json(value)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;
    use tempfile::tempdir;

    const INPUT: &str = "layout:\n  0x0000: RAM\n  0x8000: ROM\n";

    #[test]
    fn test_cli_parsing_render_command() {
        let args = vec![
            "memlayout", "render", "board.mld", "--format", "dot", "--output", "out.dot",
        ];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Render {
                input,
                format,
                output,
                output_prefix,
            } => {
                assert_eq!(input.to_string_lossy(), "board.mld");
                assert_eq!(format, FormatChoice::Dot);
                assert_eq!(output.unwrap().to_string_lossy(), "out.dot");
                assert!(output_prefix.is_none());
            }
            _ => panic!("Expected Render command"),
        }
    }

    #[test]
    fn test_cli_parsing_render_defaults() {
        let cli = Cli::try_parse_from(vec!["memlayout", "render", "board.mld"]).unwrap();
        assert_eq!(cli.log_level, LogLevel::Warn);
        match cli.command {
            Commands::Render { format, output, .. } => {
                assert_eq!(format, FormatChoice::Svg);
                assert!(output.is_none());
            }
            _ => panic!("Expected Render command"),
        }
    }

    #[test]
    fn test_output_and_prefix_conflict() {
        let args = vec![
            "memlayout", "render", "a.mld", "--output", "x.svg", "--output-prefix", "y",
        ];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_unknown_format_rejected_by_parser() {
        let args = vec!["memlayout", "render", "a.mld", "--format", "png"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_cli_parsing_other_commands() {
        let cli = Cli::try_parse_from(vec!["memlayout", "check", "-"]).unwrap();
        assert!(matches!(cli.command, Commands::Check { .. }));

        let cli = Cli::try_parse_from(vec!["memlayout", "dump", "a.mld"]).unwrap();
        assert!(matches!(cli.command, Commands::Dump { .. }));

        let cli = Cli::try_parse_from(vec!["memlayout", "formats", "--json"]).unwrap();
        assert!(matches!(cli.command, Commands::Formats { json: true }));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = vec!["memlayout", "check", "a.mld", "--verbose", "--log-level", "debug"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.log_level, LogLevel::Debug);
    }

    #[test]
    fn test_output_path() {
        let input = Path::new("maps/bbc.mld");
        assert_eq!(
            output_path(input, None, None, ".svg"),
            PathBuf::from("maps/bbc.svg")
        );
        assert_eq!(
            output_path(Path::new("bbc.txt"), None, None, ".dot"),
            PathBuf::from("bbc.txt.dot")
        );
        assert_eq!(
            output_path(input, None, Some(PathBuf::from("out/map")), ".svg"),
            PathBuf::from("out/map.svg")
        );
        assert_eq!(
            output_path(input, Some(PathBuf::from("x.svg")), None, ".dot"),
            PathBuf::from("x.svg")
        );
        assert_eq!(
            output_path(Path::new("-"), None, None, ".svg"),
            PathBuf::from("-")
        );
    }

    #[test]
    fn test_to_json_keeps_order_and_types() {
        let root = yaml::load_str("b: 1\na:\n  - x\n  - 2.5\n  - ~\nc: .inf\n").unwrap();
        let json = to_json(&root);
        assert_eq!(
            serde_json::to_string(&json).unwrap(),
            r#"{"b":1,"a":["x",2.5,null],"c":".inf"}"#
        );
    }

    #[test]
    fn test_to_json_full_width_integers() {
        let root = yaml::load_str("high: 0xffff800000000000\nlow: -5\n").unwrap();
        assert_eq!(
            serde_json::to_string(&to_json(&root)).unwrap(),
            r#"{"high":18446603336221196288,"low":-5}"#
        );
    }

    #[test]
    fn test_read_input_from_file() {
        let app = MemlayoutApp::new();
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("board.mld");
        fs::write(&file_path, INPUT).unwrap();

        let content = app.read_input(&file_path).unwrap();
        assert_eq!(content, INPUT);
    }

    #[test]
    fn test_read_input_missing_file() {
        let app = MemlayoutApp::new();
        let err = app.read_input(Path::new("/nonexistent/board.mld")).unwrap_err();
        assert!(err.to_string().contains("Failed to read input file"));
    }

    #[test]
    fn test_write_output_to_file() {
        let app = MemlayoutApp::new();
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("board.svg");

        app.write_output(&file_path, "<svg/>").unwrap();
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "<svg/>");
    }

    #[test]
    fn test_render_command_default_output() {
        let app = MemlayoutApp::new();
        let dir = tempdir().unwrap();
        let input = dir.path().join("board.mld");
        fs::write(&input, INPUT).unwrap();

        app.render_command(input, FormatChoice::Dot, None, None, false)
            .unwrap();
        let rendered = fs::read_to_string(dir.path().join("board.dot")).unwrap();
        assert!(rendered.starts_with("digraph memory"));
    }

    #[test]
    fn test_render_command_reports_errors() {
        let app = MemlayoutApp::new();
        let dir = tempdir().unwrap();
        let input = dir.path().join("bad.mld");
        fs::write(&input, "defaults:\n  fill: red\n").unwrap();

        let err = app
            .render_command(input, FormatChoice::Svg, None, None, false)
            .unwrap_err();
        assert!(err.to_string().contains("'layout' not defined"));
        assert!(!dir.path().join("bad.svg").exists());
    }

    #[test]
    fn test_formats_command() {
        let app = MemlayoutApp::new();
        assert!(app.formats_command(true, false).is_ok());
        assert!(app.formats_command(false, false).is_ok());
    }
}
