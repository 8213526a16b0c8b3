//! Guarded handle that owns the session manager for a surface.

use std::sync::{Arc, RwLock};

use pluribus_auth::Surface;

use crate::gateway::AuthGateway;
use crate::manager::{SessionError, SessionManager};

/// Owning handle with explicit construction and teardown.
///
/// Consumers reach the manager only through an established context. After
/// [`shutdown`](Self::shutdown), access is a hard configuration error
/// ([`SessionError::ContextClosed`]), never a silently absent session.
pub struct SessionContext {
    manager: RwLock<Option<Arc<SessionManager>>>,
}

impl SessionContext {
    pub fn establish(surface: Surface, gateway: Arc<dyn AuthGateway>) -> Self {
        Self {
            manager: RwLock::new(Some(Arc::new(SessionManager::new(surface, gateway)))),
        }
    }

    /// Handle to the session manager.
    pub fn manager(&self) -> Result<Arc<SessionManager>, SessionError> {
        self.manager
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
            .ok_or(SessionError::ContextClosed)
    }

    /// Tear the context down. In-flight operations on already-obtained
    /// handles complete; new handle requests fail.
    pub fn shutdown(&self) {
        let mut guard = self
            .manager
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if guard.take().is_some() {
            tracing::debug!("session context shut down");
        }
    }
}
