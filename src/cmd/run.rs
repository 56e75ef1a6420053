//! `gelf-relay run` — start the relay.
//!
//! Resolves settings, then hands over to [`startup::start`]. Returns only
//! when startup fails; a started relay serves until the process is killed.

use crate::cli::RunArgs;
use crate::config::Settings;
use crate::error::RelayError;
use crate::firebase::{self, FirebaseDatabase};
use crate::logging;
use crate::startup;

pub async fn execute(args: RunArgs) -> Result<(), RelayError> {
    let log_format = logging::resolve_format(args.pretty, args.json);
    logging::init(&args.log_level, log_format);

    let settings = Settings::from_args(&args)?;
    tracing::debug!(
        host = %settings.host,
        port = settings.port,
        auth = settings.credentials.is_some(),
        "configuration loaded"
    );

    let database = FirebaseDatabase::new(firebase::build_http_client());
    let relay = startup::start(&settings, &database).await?;

    tracing::info!(
        gelf = %relay.gelf_addr(),
        http = %relay.http_addr(),
        version = env!("CARGO_PKG_VERSION"),
        "gelf-relay running"
    );
    relay.run().await;
    Ok(())
}
