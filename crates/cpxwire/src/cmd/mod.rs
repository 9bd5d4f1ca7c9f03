use clap::{Args, Subcommand};
use std::path::PathBuf;

use cpxwire_value::Port;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod decode;
pub mod encode;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode a kernel message and print its content.
    Decode(DecodeArgs),
    /// Encode JSON content into a kernel message.
    Encode(EncodeArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Decode(args) => decode::run(args, format),
        Command::Encode(args) => encode::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Message file to decode ("-" reads stdin).
    pub path: PathBuf,
    /// Maximum container nesting accepted.
    #[arg(long, value_name = "N")]
    pub max_depth: Option<usize>,
    /// Maximum message size accepted, in bytes.
    #[arg(long, value_name = "BYTES")]
    pub max_size: Option<usize>,
    /// Fail when the message is a connection-interrupted notification.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// JSON object to encode.
    #[arg(conflicts_with = "file", required_unless_present = "file")]
    pub json: Option<String>,
    /// Read the JSON object from a file.
    #[arg(long, short = 'f')]
    pub file: Option<PathBuf>,
    /// Write the encoded message to this file instead of stdout.
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,
    /// Message id placed in the header.
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub id: i32,
    /// Remote (destination) port as NAME:DISPOSITION.
    #[arg(long, value_parser = encode::parse_port, value_name = "NAME:DISP")]
    pub remote: Option<Port>,
    /// Local (reply) port as NAME:DISPOSITION.
    #[arg(long, value_parser = encode::parse_port, value_name = "NAME:DISP")]
    pub local: Option<Port>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
