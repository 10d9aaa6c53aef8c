use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use markup_merge::rules::parse_key_rule;

#[derive(Parser, Debug)]
#[command(name = "markup-merge")]
#[command(about = "Merge, compare and render markup documents")]
pub struct Cli {
    /// Log merge decisions at debug level on stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Merge two files and print (or write) the combined tree.
    Merge(MergeArgs),
    /// Report whether two files can be merged, without writing anything.
    Check(CheckArgs),
    /// Show the serialized form of a single file.
    Render(RenderArgs),
}

/// Options shared by every command that compares two trees.
#[derive(clap::Args, Debug)]
pub struct ComparatorArgs {
    /// Comparator rules TOML file (`deep = [..]` and a `[keys]` table).
    #[arg(long)]
    pub rules: Option<PathBuf>,
    /// Require ATTRIBUTE to agree on elements named TAG (TAG=ATTRIBUTE).
    #[arg(long = "key", value_name = "TAG=ATTRIBUTE", value_parser = parse_key_arg)]
    pub keys: Vec<(String, String)>,
    /// Compare children of elements named TAG pairwise.
    #[arg(long = "deep", value_name = "TAG")]
    pub deep: Vec<String>,
    /// Re-align children after insertions instead of matching position by position.
    #[arg(long)]
    pub lookahead: bool,
    /// Merge the single top-level element of each file instead of the documents.
    #[arg(long)]
    pub root_element: bool,
}

#[derive(Parser, Debug)]
pub struct MergeArgs {
    pub left: PathBuf,
    pub right: PathBuf,
    #[command(flatten)]
    pub comparator: ComparatorArgs,
    /// Write the merged tree here instead of stdout.
    #[arg(long)]
    pub output: Option<PathBuf>,
    /// Print matched/imported counters on stderr.
    #[arg(long)]
    pub summary: bool,
}

#[derive(Parser, Debug)]
pub struct CheckArgs {
    pub left: PathBuf,
    pub right: PathBuf,
    #[command(flatten)]
    pub comparator: ComparatorArgs,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    /// Exit with an error when the trees cannot be merged.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Parser, Debug)]
pub struct RenderArgs {
    pub file: PathBuf,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

fn parse_key_arg(raw: &str) -> Result<(String, String), String> {
    parse_key_rule(raw).map_err(|err| err.to_string())
}
