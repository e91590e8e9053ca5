//! Hot-swap contract with data sources (spec 4.D). Clients holding
//! provider-native credential objects must reconcile with the KV store
//! before each outbound call.

use meridian_core::config::CredentialRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileAction {
    /// In-memory credential already matches the stored record.
    NoChange,
    /// Only the access token changed; update the existing client object.
    UpdateAccessToken,
    /// The refresh token changed (user re-authenticated); rebuild the
    /// client's credential object from scratch.
    Rebuild,
}

/// Cheap, idempotent, side-effect-free by design — safe to call before
/// every outbound request without blocking concurrent callers.
pub fn reconcile(in_memory: &CredentialRecord, stored: &CredentialRecord) -> ReconcileAction {
    if in_memory.refresh_token != stored.refresh_token {
        return ReconcileAction::Rebuild;
    }
    if in_memory.access_token != stored.access_token {
        return ReconcileAction::UpdateAccessToken;
    }
    ReconcileAction::NoChange
}
