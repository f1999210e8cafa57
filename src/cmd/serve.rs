//! Board server command — `taskdeck serve`.

use anyhow::Result;

use taskdeck::api::server::{ServerConfig, start_server};
use taskdeck::config::Config;

pub async fn cmd_serve(config: Config) -> Result<()> {
    println!(
        "taskdeck serving workspace {} at http://{}:{}",
        config.workspace_dir.display(),
        config.host,
        config.port
    );

    start_server(ServerConfig {
        host: config.host,
        port: config.port,
        workspace_dir: config.workspace_dir,
    })
    .await
}
