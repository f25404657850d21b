/// Decides whether a caller may use a guarded endpoint.
pub trait AccessPolicy: Send + Sync + 'static {
    fn can_access(&self, username: Option<&str>) -> bool;
}

pub const ADMIN_USERNAME: &str = "admin";

/// Only the administrator gets through; a missing username is denied.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdminOnly;

impl AccessPolicy for AdminOnly {
    fn can_access(&self, username: Option<&str>) -> bool {
        tracing::debug!(?username, "checking access with admin-only policy");
        username == Some(ADMIN_USERNAME)
    }
}
