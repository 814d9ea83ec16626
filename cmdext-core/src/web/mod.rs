// cmdext-core/src/web/mod.rs

pub mod routes;

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use axum_server::Handle;
use tokio::task::JoinHandle;
use tracing::{error, info};
use crate::Error;
use crate::api::ManagementApi;

pub use routes::{router, ApiError};

/// How long in-flight requests get to finish after `stop`.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// The management HTTP listener. Each connection and request is served on its
/// own tokio task; `stop` closes the listener and joins the accept loop.
pub struct WebServer {
    handle: Handle,
    task: JoinHandle<io::Result<()>>,
    local_addr: SocketAddr,
}

impl WebServer {
    /// Bind `addr` and start serving. Returns once the socket is listening,
    /// or with `Error::Transport` if the bind failed.
    pub async fn start(addr: SocketAddr, api: Arc<ManagementApi>) -> Result<Self, Error> {
        let app = router(api);
        let handle = Handle::new();

        let server = axum_server::bind(addr)
            .handle(handle.clone())
            .serve(app.into_make_service());
        let task = tokio::spawn(async move {
            let res = server.await;
            if let Err(e) = &res {
                error!("Web server error: {}", e);
            }
            res
        });

        match handle.listening().await {
            Some(local_addr) => {
                info!("Web server listening on http://{}", local_addr);
                Ok(Self { handle, task, local_addr })
            }
            None => {
                let reason = match task.await {
                    Ok(Err(e)) => e.to_string(),
                    Ok(Ok(())) => "server exited before listening".to_string(),
                    Err(e) => e.to_string(),
                };
                Err(Error::Transport(format!("failed to bind {}: {}", addr, reason)))
            }
        }
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting, let in-flight handlers finish, then join the loop.
    pub async fn stop(self) -> Result<(), Error> {
        self.handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
        let result = match self.task.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(Error::Transport(e.to_string())),
            Err(e) => Err(Error::Transport(format!("web server task failed: {}", e))),
        };
        info!("Web server stopped");
        result
    }
}
