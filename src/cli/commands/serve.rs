//! Serve command - live HTTP view of the root.

use std::path::PathBuf;

use crate::config::Settings;

/// Arguments for the serve command.
pub struct ServeArgs {
    pub root: Option<PathBuf>,
    pub bind: Option<String>,
}

/// Run the serve command.
pub async fn run(args: ServeArgs, mut config: Settings) -> anyhow::Result<()> {
    let ServeArgs { root, bind } = args;

    // CLI flags win over config
    if let Some(root) = root {
        config.root = root;
    }
    if let Some(bind) = bind {
        config.server.bind = bind;
    }

    serve(config).await
}

#[cfg(feature = "http-server")]
async fn serve(config: Settings) -> anyhow::Result<()> {
    crate::server::serve(config).await
}

#[cfg(not(feature = "http-server"))]
async fn serve(_config: Settings) -> anyhow::Result<()> {
    anyhow::bail!(
        "HTTP server support is not compiled in. Rebuild with: cargo build --features http-server"
    )
}
