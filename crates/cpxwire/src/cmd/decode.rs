use std::io::Read;

use cpxwire_codec::{deserialize_with_config, CodecConfig};
use tracing::debug;

use crate::cmd::DecodeArgs;
use crate::exit::{codec_error, io_error, CliResult, SUCCESS};
use crate::output::{print_decoded, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let wire = if args.path.as_os_str() == "-" {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .map_err(|err| io_error("failed to read stdin", err))?;
        buf
    } else {
        std::fs::read(&args.path).map_err(|err| {
            io_error(&format!("failed to read {}", args.path.display()), err)
        })?
    };

    let mut config = CodecConfig::default();
    if let Some(max_depth) = args.max_depth {
        config.max_depth = max_depth;
    }
    if let Some(max_size) = args.max_size {
        config.max_message_size = max_size;
    }

    debug!(size = wire.len(), "decoding message");
    let decoded =
        deserialize_with_config(&wire, &config).map_err(|err| codec_error("decode failed", err))?;
    if args.strict && decoded.is_connection_interrupted() {
        return decoded
            .into_message()
            .map(|_| SUCCESS)
            .map_err(|err| codec_error("decode failed", err));
    }
    print_decoded(&decoded, wire.len(), format);

    Ok(SUCCESS)
}
