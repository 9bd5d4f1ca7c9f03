mod cmd;
mod exit;
mod json;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "cpxwire", version, about = "CPX@ kernel message codec CLI")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(
        long,
        value_name = "LEVEL",
        default_value = "warn",
        env = "CPXWIRE_LOG",
        global = true
    )]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use cpxwire_value::Port;

    use super::*;

    #[test]
    fn parses_encode_subcommand() {
        let cli = Cli::try_parse_from([
            "cpxwire",
            "encode",
            r#"{"k":"v"}"#,
            "--id",
            "-7",
            "--remote",
            "0x1234:17",
        ])
        .expect("encode args should parse");

        let Command::Encode(args) = cli.command else {
            panic!("expected encode");
        };
        assert_eq!(args.id, -7);
        assert_eq!(args.remote, Some(Port::new(0x1234, 17)));
        assert_eq!(args.local, None);
    }

    #[test]
    fn rejects_conflicting_payload_args() {
        let err = Cli::try_parse_from([
            "cpxwire",
            "encode",
            r#"{"x":1}"#,
            "--file",
            "payload.json",
        ])
        .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn parses_decode_subcommand() {
        let cli = Cli::try_parse_from(["cpxwire", "decode", "msg.bin", "--max-depth", "8"])
            .expect("decode args should parse");
        let Command::Decode(args) = cli.command else {
            panic!("expected decode");
        };
        assert_eq!(args.max_depth, Some(8));
        assert!(!args.strict);
    }
}
