//! hotpack worker entry point.
//!
//! Boots the cache controller on a stdio line transport: one raw JSON
//! bundle payload per stdin line, one broadcast status integer per stdout
//! line. Logging goes to stderr to keep the transport clean.

use anyhow::Result;
use hotpack_core::config::AppConfig;
use hotpack_core::vfs::VfsDb;
use hotpack_worker::controller::CacheController;
use hotpack_worker::ingest::Envelope;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;
use url::Url;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    let base = Url::parse(&config.base_url)?;

    tracing::info!(db_path = %config.db_path.display(), base = %base, "starting hotpack worker");

    let vfs = VfsDb::open(&config.db_path, base).await?;
    let mut controller = CacheController::new(vfs, &config);
    controller.install().await;
    controller.activate();

    let mut updates = controller.subscribe();
    let (messages, queue) = tokio::sync::mpsc::channel(8);
    let loop_handle = tokio::spawn(controller.run(queue));

    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Ok(status) = updates.recv().await {
            let line = format!("{}\n", status.code());
            if stdout.write_all(line.as_bytes()).await.is_err() {
                break;
            }
            let _ = stdout.flush().await;
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        messages.send(Envelope::ingest(line.into_bytes())).await?;
    }

    drop(messages);
    loop_handle.await?;
    // the controller going away drops the broadcast sender, so the writer
    // drains every buffered status and exits on its own
    writer.await?;

    Ok(())
}
