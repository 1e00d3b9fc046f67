//! CLI argument definitions for memscan.

use clap::{ArgGroup, Parser};
use memscan::ValueType;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "memscan")]
#[command(about = "Find, narrow and watch values in a running process", version)]
#[command(group(ArgGroup::new("target").required(true).args(["pid", "name"])))]
pub struct Args {
    /// Target process ID
    #[arg(long)]
    pub pid: Option<u32>,

    /// Target executable name (exact match, e.g. game.exe)
    #[arg(long)]
    pub name: Option<String>,

    /// Value type: int, float or double
    #[arg(short = 't', long = "type", default_value = "int")]
    pub value_type: ValueType,

    /// Configuration file (defaults to memscan.toml when present)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print address lists as JSON
    #[arg(long)]
    pub json: bool,

    /// Value for the initial scan
    pub value: String,
}
