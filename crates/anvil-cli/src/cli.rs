use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "anvil",
    about = "Anvil fusion engine: repair, combine, and enchant items against a rule file",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Rule file (TOML). The stock rules are used when omitted.
    #[arg(long, global = true)]
    pub rules: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Fuse two items and show the result and price
    Fuse(FuseArgs),
    /// Find enchantments by name
    Lookup(LookupArgs),
    /// Validate a rule file
    Check(CheckArgs),
    /// List repair materials
    Materials(MaterialsArgs),
}

#[derive(Args)]
pub struct FuseArgs {
    /// Left item (JSON file)
    pub left: PathBuf,
    /// Right item (JSON file); an empty slot when omitted
    pub right: Option<PathBuf>,
    /// New display name; an empty string clears it
    #[arg(long)]
    pub rename: Option<String>,
    /// Also show the classifying stage and the cost breakdown
    #[arg(long)]
    pub explain: bool,
}

#[derive(Args)]
pub struct LookupArgs {
    pub name: String,
}

#[derive(Args)]
pub struct CheckArgs {
    pub path: PathBuf,
}

#[derive(Args)]
pub struct MaterialsArgs {
    /// Show a single material
    pub material: Option<String>,
}
