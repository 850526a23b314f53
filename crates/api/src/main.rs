//! ClassBatch - native messaging host for the ClassBatch browser extension
//!
//! The browser starts this binary and talks to it over stdin/stdout.
//! Positional arguments are supplied by the browser (extension origin,
//! manifest path) and are ignored; the config file is found by probing or
//! through `CLASSBATCH_CONFIG`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use classbatch_host::utils::init_logging;
use classbatch_host::{serve, AppContext, MessageRouter};
use tracing::{info, warn};

fn main() -> anyhow::Result<()> {
    // Load environment variables before configuration so overrides apply
    let dotenv = dotenvy::dotenv();

    let explicit = std::env::var_os("CLASSBATCH_CONFIG").map(PathBuf::from);
    let config = classbatch_infra::config::load(explicit).context("failed to load configuration")?;
    init_logging(&config.logging).context("failed to initialise logging")?;

    match dotenv {
        Ok(path) => info!(path = %path.display(), "Loaded .env"),
        Err(err) if err.not_found() => {}
        Err(err) => warn!(error = %err, "Could not load .env file"),
    }
    info!(version = env!("CARGO_PKG_VERSION"), "ClassBatch host starting");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build Tokio runtime")?;

    runtime.block_on(async {
        let context = Arc::new(AppContext::new(config).context("failed to initialise services")?);
        let router = Arc::new(MessageRouter::new(context));

        serve(router, tokio::io::stdin(), tokio::io::stdout())
            .await
            .context("native messaging channel failed")?;

        info!("Input closed; shutting down");
        Ok(())
    })
}
