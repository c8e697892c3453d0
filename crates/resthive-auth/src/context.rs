//! Ambient per-request auth context.
//!
//! `resthive_core::Hooks::authorize` only receives a `ResourcePath` and a
//! `Mode` — it has no request object to pull an `Authorization` header
//! from. The server binding authenticates once per request and sets the
//! result as a task-local for the duration of the pipeline dispatch, the
//! same way `tracing` makes the current span available without threading
//! it through every call; `JwtHooks` reads it back out.

use crate::AuthResult;
use std::future::Future;

tokio::task_local! {
    static CURRENT: AuthResult;
}

/// Run `fut` with `auth` as the ambient auth context.
pub async fn scope<F: Future>(auth: AuthResult, fut: F) -> F::Output {
    CURRENT.scope(auth, fut).await
}

/// The auth result for the request currently executing, if any. `None`
/// outside of a `scope` call (e.g. in a unit test that never set one).
pub fn current() -> Option<AuthResult> {
    CURRENT.try_with(|auth| auth.clone()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_current_outside_scope_is_none() {
        assert!(current().is_none());
    }

    #[tokio::test]
    async fn test_current_inside_scope() {
        let auth = AuthResult::anonymous("web_anon");
        scope(auth.clone(), async {
            assert_eq!(current().unwrap().role, "web_anon");
        })
        .await;
    }
}
