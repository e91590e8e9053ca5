//! OAuth token refresh scheduling (spec 4.D) and role-based tool
//! permissions (spec 4.L).

pub mod error;
pub mod permission;
pub mod reconcile;
pub mod refresh;
pub mod supervisor;

pub use error::{AuthError, Result};
pub use permission::{PermissionManager, Role};
pub use reconcile::{reconcile, ReconcileAction};
pub use refresh::{
    CredentialRefresher, CredentialStatus, RefreshFailure, RefreshFailureKind, RefreshedToken,
    TerminalFailureHook, TokenRefreshService,
};
pub use supervisor::TokenRefreshSupervisor;
