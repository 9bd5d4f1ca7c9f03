use cpxwire_codec::{serialize_with_config, CodecConfig};
use cpxwire_value::{Message, Port};
use tracing::info;

use crate::cmd::EncodeArgs;
use crate::exit::{
    codec_error, io_error, json_error, CliError, CliResult, DATA_INVALID, SUCCESS, USAGE,
};
use crate::json::dictionary_from_json;
use crate::output::{print_encoded, OutputFormat};

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let text = match (&args.json, &args.file) {
        (Some(json), _) => json.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .map_err(|err| io_error(&format!("failed to read {}", path.display()), err))?,
        (None, None) => return Err(CliError::new(USAGE, "provide JSON or --file")),
    };

    let json: serde_json::Value = serde_json::from_str(&text)
        .map_err(|err| CliError::new(DATA_INVALID, format!("invalid JSON: {err}")))?;
    let content = dictionary_from_json(&json).map_err(|err| json_error("invalid content", err))?;

    let message = Message::new(
        args.remote.unwrap_or(Port::NULL),
        args.local.unwrap_or(Port::NULL),
        args.id,
        content,
    );
    let wire = serialize_with_config(&message, &CodecConfig::default())
        .map_err(|err| codec_error("encode failed", err))?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, wire.as_bytes())
                .map_err(|err| io_error(&format!("failed to write {}", path.display()), err))?;
            info!(path = %path.display(), size = wire.len(), "wrote message");
            if !matches!(format, OutputFormat::Raw) {
                print_encoded(&message, &wire, format);
            }
        }
        None => print_encoded(&message, &wire, format),
    }

    Ok(SUCCESS)
}

/// Parse `NAME:DISPOSITION`, each part decimal or `0x` hex.
pub fn parse_port(s: &str) -> Result<Port, String> {
    let (name, disposition) = s
        .split_once(':')
        .ok_or_else(|| format!("expected NAME:DISPOSITION, got '{s}'"))?;
    let name = parse_number(name).map_err(|err| format!("invalid port name '{name}': {err}"))?;
    let disposition = parse_number(disposition)
        .map_err(|err| format!("invalid disposition '{disposition}': {err}"))?;
    let disposition =
        u8::try_from(disposition).map_err(|_| format!("disposition {disposition} out of range"))?;
    Ok(Port::new(name, disposition))
}

fn parse_number(s: &str) -> Result<u32, std::num::ParseIntError> {
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse(),
    }
}
