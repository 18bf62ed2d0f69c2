//! `markweave`: parses a Markdown file (or stdin) with the GFM recognizer set
//! and prints the mdast tree as JSON.
//!
//! Usage:
//!   markweave [FILE]                   - parse FILE, or stdin when absent
//!   markweave --config <PATH> [FILE]   - use an explicit config file
//!   markweave --no-position --compact  - drop positions, print on one line
//!   markweave --write-config [--config <PATH>] - write the default config

use anyhow::{Context, Result};
use clap::Parser as _;
use log::{debug, info};
use markweave_config::Config;
use markweave_engine::{Node, ParseOptions, Parser, Registry, gfm_registry_builder};
use std::{
    io::{self, Read, Write},
    path::{Path, PathBuf},
};

#[derive(Debug, clap::Parser)]
#[command(name = "markweave", version, about = "Parse Markdown into an mdast JSON tree")]
struct Cli {
    /// Markdown file to parse; stdin when absent
    file: Option<PathBuf>,

    /// Config file to use instead of ~/.config/markweave/config.toml
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Omit source positions from the output
    #[arg(long)]
    no_position: bool,

    /// Print JSON on a single line
    #[arg(long)]
    compact: bool,

    /// Write the default config to the config path and exit
    #[arg(long)]
    write_config: bool,

    /// Log engine phases at debug level
    #[arg(long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(if cli.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        })
        .parse_default_env()
        .init();

    if cli.write_config {
        let path = write_default_config(cli.config.as_deref())?;
        println!("wrote {}", path.display());
        return Ok(());
    }

    let config = resolve_config(cli.config.as_deref())?;
    let input = read_input(cli.file.as_deref())?;
    let root = run(&input, &config, cli.no_position)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_json(&mut out, &root, cli.compact)?;
    Ok(())
}

/// An explicit `--config` file must exist; the default path is optional.
fn resolve_config(explicit: Option<&Path>) -> Result<Config> {
    match explicit {
        Some(path) => {
            let path = Config::expand_path(path).unwrap_or_else(|| path.to_path_buf());
            Config::load_from_path(&path)?
                .with_context(|| format!("config file '{}' does not exist", path.display()))
        }
        None => {
            let config = Config::load()?;
            if config.is_none() {
                debug!(
                    "no config at {}, using defaults",
                    Config::config_path().display()
                );
            }
            Ok(config.unwrap_or_default())
        }
    }
}

/// Writes [`Config::default`] to the explicit path, or to the default one.
fn write_default_config(explicit: Option<&Path>) -> Result<PathBuf> {
    let config = Config::default();
    match explicit {
        Some(path) => {
            let path = Config::expand_path(path).unwrap_or_else(|| path.to_path_buf());
            config
                .save_to_path(&path)
                .with_context(|| format!("failed to write '{}'", path.display()))?;
            Ok(path)
        }
        None => {
            config.save().context("failed to write the default config")?;
            Ok(Config::config_path())
        }
    }
}

fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read '{}'", path.display())),
        None => {
            let mut input = String::new();
            io::stdin()
                .read_to_string(&mut input)
                .context("failed to read stdin")?;
            Ok(input)
        }
    }
}

fn build_registry(config: &Config) -> Result<Registry> {
    let builder = config
        .disabled
        .iter()
        .fold(gfm_registry_builder().strict(config.strict), |b, name| {
            b.disable(name.as_str())
        });
    let registry = builder.build().context("failed to build the recognizer registry")?;
    info!("recognizers: {}", registry.names().join(", "));
    Ok(registry)
}

fn run(input: &str, config: &Config, no_position: bool) -> Result<Node> {
    let options = ParseOptions {
        reserve_position: config.reserve_position && !no_position,
    };
    let parser = Parser::new(build_registry(config)?);
    Ok(parser.parse(input, &options)?)
}

fn write_json(out: &mut impl Write, root: &Node, compact: bool) -> Result<()> {
    if compact {
        serde_json::to_writer(&mut *out, root)?;
    } else {
        serde_json::to_writer_pretty(&mut *out, root)?;
    }
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn json(input: &str, config: &Config, no_position: bool) -> serde_json::Value {
        let root = run(input, config, no_position).unwrap();
        serde_json::to_value(&root).unwrap()
    }

    #[test]
    fn cli_flags_parse() {
        let cli = Cli::try_parse_from(["markweave", "--no-position", "--compact", "doc.md"]).unwrap();
        assert!(cli.no_position);
        assert!(cli.compact);
        assert!(!cli.verbose);
        assert_eq!(cli.file, Some(PathBuf::from("doc.md")));
        assert_eq!(cli.config, None);
    }

    #[test]
    fn no_position_flag_overrides_config() {
        let value = json("# a", &Config::default(), true);
        assert_eq!(value["children"][0]["type"], "heading");
        assert!(value.get("position").is_none());
        assert!(value["children"][0].get("position").is_none());
    }

    #[test]
    fn positions_follow_config() {
        let value = json("a", &Config::default(), false);
        assert_eq!(value["position"]["start"]["offset"], 0);
        assert_eq!(value["position"]["end"]["offset"], 1);
    }

    #[test]
    fn disabled_recognizers_are_left_out() {
        let config = Config {
            disabled: vec!["emphasis".to_string()],
            ..Config::default()
        };
        let value = json("*a*", &config, true);
        assert_eq!(value["children"][0]["children"][0]["type"], "text");
        assert_eq!(value["children"][0]["children"][0]["value"], "*a*");
    }

    #[test]
    fn compact_output_is_one_line() {
        let root = run("a", &Config::default(), true).unwrap();
        let mut out = Vec::new();
        write_json(&mut out, &root, true).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn explicit_config_must_exist() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.toml");
        assert!(resolve_config(Some(&missing)).is_err());
    }

    #[test]
    fn explicit_config_is_loaded() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "reserve_position = false\n").unwrap();
        let config = resolve_config(Some(&path)).unwrap();
        assert!(!config.reserve_position);
    }

    #[test]
    fn write_config_flag_parses() {
        let cli = Cli::try_parse_from(["markweave", "--write-config", "--config", "m.toml"]).unwrap();
        assert!(cli.write_config);
        assert_eq!(cli.config, Some(PathBuf::from("m.toml")));
        assert_eq!(cli.file, None);
    }

    #[test]
    fn written_config_loads_back() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");
        assert_eq!(write_default_config(Some(&path)).unwrap(), path);
        let config = resolve_config(Some(&path)).unwrap();
        assert!(config.reserve_position);
        assert!(!config.strict);
        assert!(config.disabled.is_empty());
    }

    #[test]
    fn reads_input_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("doc.md");
        std::fs::write(&path, "# hi\n").unwrap();
        assert_eq!(read_input(Some(&path)).unwrap(), "# hi\n");
    }
}
