//! Owns both refresh instances and mirrors the original's `StartupService`
//! lifecycle: `start()` spawns both workers, `stop()` cancels them.

use crate::refresh::{CredentialRefresher, TokenRefreshService};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub struct TokenRefreshSupervisor<C: CredentialRefresher + 'static, T: CredentialRefresher + 'static> {
    connectors: Arc<TokenRefreshService<C>>,
    toolsets: Arc<TokenRefreshService<T>>,
    cancel: CancellationToken,
    handles: Vec<JoinHandle<()>>,
}

impl<C: CredentialRefresher + 'static, T: CredentialRefresher + 'static> TokenRefreshSupervisor<C, T> {
    pub fn new(connector_refresher: C, toolset_refresher: T) -> Self {
        Self {
            connectors: Arc::new(TokenRefreshService::new("connector", connector_refresher)),
            toolsets: Arc::new(TokenRefreshService::new("toolset", toolset_refresher)),
            cancel: CancellationToken::new(),
            handles: Vec::new(),
        }
    }

    pub fn connectors(&self) -> &Arc<TokenRefreshService<C>> {
        &self.connectors
    }

    pub fn toolsets(&self) -> &Arc<TokenRefreshService<T>> {
        &self.toolsets
    }

    pub fn start(&mut self) {
        let connectors = self.connectors.clone();
        let cancel_a = self.cancel.clone();
        self.handles.push(tokio::spawn(async move { connectors.run(cancel_a).await }));

        let toolsets = self.toolsets.clone();
        let cancel_b = self.cancel.clone();
        self.handles.push(tokio::spawn(async move { toolsets.run(cancel_b).await }));
    }

    pub async fn stop(&mut self) {
        self.cancel.cancel();
        for handle in self.handles.drain(..) {
            let _ = handle.await;
        }
    }
}
