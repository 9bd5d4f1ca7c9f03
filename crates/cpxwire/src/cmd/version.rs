use cpxwire_codec::ENVELOPE_VERSION;

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("cpxwire {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: cpxwire");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!("envelope: CPX@ v{ENVELOPE_VERSION}");
    println!(
        "target: {}",
        option_env!("CPXWIRE_BUILD_TARGET").unwrap_or("unknown")
    );
    println!(
        "profile: {}",
        option_env!("CPXWIRE_BUILD_PROFILE").unwrap_or("unknown")
    );
    println!(
        "endian: {}",
        if cfg!(target_endian = "little") {
            "little"
        } else {
            "big"
        }
    );

    Ok(SUCCESS)
}
