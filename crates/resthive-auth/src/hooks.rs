//! `JwtHooks`: an illustrative `resthive_core::Hooks::authorize` that gates
//! dispatch on the role decoded from the ambient JWT auth context (see
//! `context`). A host application wires it onto whichever resources need
//! it via `Resource::with_hooks`.

use crate::context;
use async_trait::async_trait;
use resthive_core::resource::{Hooks, Mode};
use resthive_core::router::ResourcePath;
use resthive_core::{Error, Result};
use std::collections::HashSet;

/// Denies dispatch unless the current request's role is in
/// `allowed_roles`. An empty set allows everyone, including requests
/// with no auth context at all — the same default-open posture
/// `NoopHooks` takes.
pub struct JwtHooks {
    allowed_roles: HashSet<String>,
}

impl JwtHooks {
    pub fn new() -> Self {
        Self {
            allowed_roles: HashSet::new(),
        }
    }

    /// Permit `role` to dispatch against resources carrying this hook set.
    pub fn allow_role(mut self, role: impl Into<String>) -> Self {
        self.allowed_roles.insert(role.into());
        self
    }
}

impl Default for JwtHooks {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Hooks for JwtHooks {
    async fn authorize(&self, path: &ResourcePath, _mode: Mode) -> Result<()> {
        if self.allowed_roles.is_empty() {
            return Ok(());
        }
        let role = context::current().map(|auth| auth.role);
        match role {
            Some(role) if self.allowed_roles.contains(&role) => Ok(()),
            // Denied requests surface as a plain 404, not a 401/403 the
            // pipeline's closed error set doesn't carry.
            _ => Err(Error::NotFound(format!("{} not found", path.target.name))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AuthResult;
    use resthive_core::schema::Schema;

    fn path_for<'a>(resource: &'a resthive_core::resource::Resource) -> ResourcePath<'a> {
        ResourcePath {
            components: vec![],
            target: resource,
            item_id: None,
        }
    }

    #[tokio::test]
    async fn test_empty_allowlist_permits_everyone() {
        let hooks = JwtHooks::new();
        let resource = resthive_core::resource::Resource::without_storer("foo", Schema::new());
        assert!(hooks.authorize(&path_for(&resource), Mode::List).await.is_ok());
    }

    #[tokio::test]
    async fn test_denies_role_not_in_allowlist() {
        let hooks = JwtHooks::new().allow_role("admin");
        let resource = resthive_core::resource::Resource::without_storer("foo", Schema::new());
        let auth = AuthResult::anonymous("web_anon");
        let result = context::scope(auth, hooks.authorize(&path_for(&resource), Mode::List)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_allows_role_in_allowlist() {
        let hooks = JwtHooks::new().allow_role("admin");
        let resource = resthive_core::resource::Resource::without_storer("foo", Schema::new());
        let auth = AuthResult::anonymous("admin");
        let result = context::scope(auth, hooks.authorize(&path_for(&resource), Mode::List)).await;
        assert!(result.is_ok());
    }
}
