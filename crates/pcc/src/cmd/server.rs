use std::net::SocketAddr;
use std::sync::Arc;

use pcc_frame::FrameConfig;
use pcc_peer::{PccServer, ShutdownAction, ShutdownCoordinator};

use crate::cmd::{parse_timeout, ServerArgs};
use crate::exit::{peer_error, CliError, CliResult, SUCCESS};
use crate::output::print_report;

pub fn run(args: ServerArgs) -> CliResult<i32> {
    let config = FrameConfig {
        read_timeout: parse_timeout(args.read_timeout.as_deref())?,
        write_timeout: parse_timeout(args.write_timeout.as_deref())?,
        ..FrameConfig::default()
    };

    let shutdown = Arc::new(ShutdownCoordinator::new());
    install_ctrlc_handler(Arc::clone(&shutdown))?;

    let addr = SocketAddr::from((args.bind, args.port));
    let mut server = PccServer::bind(addr, shutdown)
        .map_err(|err| peer_error("bind failed", err))?
        .with_frame_config(config);

    let tally = server.serve().map_err(|err| {
        tracing::error!(error = %err, "fatal error; terminating");
        peer_error("server failed", err)
    })?;

    print_report(&tally, args.format);
    Ok(SUCCESS)
}

fn install_ctrlc_handler(shutdown: Arc<ShutdownCoordinator>) -> CliResult<()> {
    ctrlc::set_handler(move || match shutdown.request_shutdown() {
        ShutdownAction::Immediate => tracing::info!("interrupt received; reporting"),
        ShutdownAction::Deferred => {
            tracing::info!("interrupt received; finishing current connection first")
        }
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}
