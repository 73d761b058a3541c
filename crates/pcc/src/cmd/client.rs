use std::net::SocketAddr;

use pcc_frame::FrameConfig;
use pcc_peer::{send_payload_with_config, FileSource};

use crate::cmd::{parse_timeout, ClientArgs};
use crate::exit::{io_error, peer_error, CliResult, SUCCESS};

pub fn run(args: ClientArgs) -> CliResult<i32> {
    let timeout = parse_timeout(args.timeout.as_deref())?;
    let config = FrameConfig {
        read_timeout: timeout,
        write_timeout: timeout,
        ..FrameConfig::default()
    };

    let mut source = FileSource::open(&args.file)
        .map_err(|err| io_error(&format!("failed opening {}", args.file.display()), err))?;

    let addr = SocketAddr::from((args.ip, args.port));
    let count = send_payload_with_config(addr, &mut source, &config)
        .map_err(|err| peer_error("exchange failed", err))?;

    println!("# of printable characters: {count}");
    Ok(SUCCESS)
}
