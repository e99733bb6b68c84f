//! Command dispatch: bridges CLI args -> integration session -> output formatting.

pub mod config_cmd;
pub mod devices;
pub mod entities;
pub mod gate;
pub mod io;
pub mod util;
pub mod watch;

use std::time::Duration;

use acogo_core::{Integration, SessionConfig};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Session id of the single session a CLI invocation runs.
const SESSION_ID: &str = "cli";

/// Run a cloud-bound command inside a fresh integration session.
///
/// Only `watch` keeps the pollers; one-shot commands read the first refresh.
pub async fn dispatch(
    cmd: Command,
    mut config: SessionConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Watch(ref args) => watch::apply_overrides(args, &mut config),
        Command::Entities(ref args) => {
            if let Some(filter) = args.port_filter {
                config.port_filter = filter.into();
            }
            disable_polling(&mut config);
        }
        _ => disable_polling(&mut config),
    }

    let integration = Integration::new();
    let session = integration.setup(SESSION_ID, config).await?;

    let result = match cmd {
        Command::Devices(args) => devices::handle(&session, args, global),
        Command::Gate(args) => gate::handle(&session, args, global).await,
        Command::Io(args) => io::handle(&session, args, global).await,
        Command::Entities(args) => entities::handle(&session, &args, global).await,
        Command::Watch(_) => watch::handle(&session, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    };

    integration.unload(SESSION_ID).await;
    result
}

fn disable_polling(config: &mut SessionConfig) {
    config.gate_interval = Duration::ZERO;
    config.io_interval = Duration::ZERO;
}
