use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// 等待 Ctrl+C，然后停止后台任务
///
/// Visit writes happen inline on the request path, so there is no buffer
/// left to flush here.
pub async fn listen_for_shutdown(background_tasks: Vec<JoinHandle<()>>) {
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received");
        }
        Err(e) => {
            warn!(
                "Failed to listen for Ctrl+C: {}. Proceeding with shutdown anyway.",
                e
            );
        }
    }

    for task in &background_tasks {
        task.abort();
    }
    info!("Stopped {} background tasks", background_tasks.len());
}
