//! Path-matched interceptors.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use heron_core::{Request, RequestContext, ResponseWriter};

use crate::interceptor::{action, BoxFuture, Interceptor, InterceptorAction, Phase};

type RequestCheck = Arc<dyn Fn(&Request) -> bool + Send + Sync>;

/// An interceptor selected by the request path.
///
/// Matching is done on the path without its query string:
///
/// 1. if a custom check is set with [`when`](Self::when), it alone decides;
/// 2. in strict mode the path must equal the match path;
/// 3. otherwise the path must not start with any excluded prefix, and must
///    start with the match path.
///
/// Prefixes are compared as plain strings, so `/api` also matches `/apiary`.
///
/// # Example
///
/// ```
/// use heron_middleware::PathInterceptor;
///
/// let guard = PathInterceptor::before("/admin", |_ctx, _resp, _req| async move { true })
///     .exclude("/admin/login");
///
/// assert!(guard.matches_path("/admin/users"));
/// assert!(!guard.matches_path("/admin/login"));
/// assert!(!guard.matches_path("/public"));
/// ```
pub struct PathInterceptor {
    phase: Phase,
    match_path: String,
    excludes: Vec<String>,
    strict: bool,
    check: Option<RequestCheck>,
    action: InterceptorAction,
}

impl PathInterceptor {
    /// Creates an interceptor running `func` for paths under `match_path`.
    pub fn new<F, Fut>(phase: Phase, match_path: impl Into<String>, func: F) -> Self
    where
        F: Fn(RequestContext, ResponseWriter, Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        Self {
            phase,
            match_path: match_path.into(),
            excludes: Vec::new(),
            strict: false,
            check: None,
            action: action(func),
        }
    }

    /// Creates a before-phase interceptor.
    pub fn before<F, Fut>(match_path: impl Into<String>, func: F) -> Self
    where
        F: Fn(RequestContext, ResponseWriter, Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        Self::new(Phase::Before, match_path, func)
    }

    /// Creates an after-phase interceptor.
    pub fn after<F, Fut>(match_path: impl Into<String>, func: F) -> Self
    where
        F: Fn(RequestContext, ResponseWriter, Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        Self::new(Phase::After, match_path, func)
    }

    /// Skips paths starting with `prefix`.
    #[must_use]
    pub fn exclude(mut self, prefix: impl Into<String>) -> Self {
        self.excludes.push(prefix.into());
        self
    }

    /// Requires the path to equal the match path exactly.
    ///
    /// Exclusions are not consulted in strict mode.
    #[must_use]
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    /// Replaces path matching with a custom check over the whole request.
    #[must_use]
    pub fn when<C>(mut self, check: C) -> Self
    where
        C: Fn(&Request) -> bool + Send + Sync + 'static,
    {
        self.check = Some(Arc::new(check));
        self
    }

    /// Returns the match path.
    #[must_use]
    pub fn match_path(&self) -> &str {
        &self.match_path
    }

    /// Applies the path rules to `path`, ignoring any custom check.
    ///
    /// A query string, if present, is stripped first.
    #[must_use]
    pub fn matches_path(&self, path: &str) -> bool {
        let path = path.split_once('?').map_or(path, |(path, _)| path);

        if self.strict {
            return path == self.match_path;
        }
        if self.excludes.iter().any(|prefix| path.starts_with(prefix.as_str())) {
            return false;
        }
        path.starts_with(self.match_path.as_str())
    }
}

impl fmt::Debug for PathInterceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathInterceptor")
            .field("phase", &self.phase)
            .field("match_path", &self.match_path)
            .field("excludes", &self.excludes)
            .field("strict", &self.strict)
            .field("custom_check", &self.check.is_some())
            .finish_non_exhaustive()
    }
}

impl Interceptor for PathInterceptor {
    fn name(&self) -> &str {
        &self.match_path
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn applies_to(&self, req: &Request) -> bool {
        match &self.check {
            Some(check) => check(req),
            None => self.matches_path(req.path()),
        }
    }

    fn run<'a>(
        &'a self,
        ctx: &'a RequestContext,
        resp: &'a ResponseWriter,
        req: &'a Request,
    ) -> BoxFuture<'a, bool> {
        (self.action)(ctx.clone(), resp.clone(), req.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interceptor::test_support::{context, request};

    fn allow(prefix: &str) -> PathInterceptor {
        PathInterceptor::before(prefix, |_ctx, _resp, _req| async move { true })
    }

    #[test]
    fn test_prefix_match() {
        let interceptor = allow("/api");
        assert!(interceptor.matches_path("/api"));
        assert!(interceptor.matches_path("/api/users"));
        assert!(interceptor.matches_path("/apiary"));
        assert!(!interceptor.matches_path("/static/app.js"));
    }

    #[test]
    fn test_root_matches_everything() {
        let interceptor = allow("/");
        assert!(interceptor.matches_path("/"));
        assert!(interceptor.matches_path("/any/thing"));
    }

    #[test]
    fn test_excludes_checked_first() {
        let interceptor = allow("/").exclude("/login").exclude("/static");
        assert!(interceptor.matches_path("/users"));
        assert!(!interceptor.matches_path("/login"));
        assert!(!interceptor.matches_path("/static/css/site.css"));
    }

    #[test]
    fn test_strict_match() {
        let interceptor = allow("/users").strict().exclude("/users");
        assert!(interceptor.matches_path("/users"));
        assert!(interceptor.matches_path("/users?page=2"));
        assert!(!interceptor.matches_path("/users/42"));
    }

    #[test]
    fn test_query_is_ignored() {
        let interceptor = allow("/api").exclude("/api/public");
        assert!(!interceptor.matches_path("/api/public?x=/api"));
        assert!(!interceptor.matches_path("/other?next=/api"));
    }

    #[test]
    fn test_custom_check_overrides_path() {
        let interceptor = allow("/never")
            .strict()
            .when(|req| req.header("x-debug").is_some());

        let plain = request("/never");
        let flagged = Request::builder()
            .uri("/elsewhere")
            .header("x-debug", "1")
            .body("")
            .unwrap();

        assert!(!interceptor.applies_to(&plain));
        assert!(interceptor.applies_to(&flagged));
    }

    #[test]
    fn test_applies_to_uses_request_path() {
        let interceptor = allow("/admin").exclude("/admin/login");
        assert!(interceptor.applies_to(&request("/admin/panel?tab=1")));
        assert!(!interceptor.applies_to(&request("/admin/login?next=/admin")));
    }

    #[tokio::test]
    async fn test_run_invokes_action() {
        let interceptor = PathInterceptor::after("/", |ctx, _resp, req| async move {
            ctx.insert("seen", req.path().to_string());
            false
        });

        let ctx = context();
        let req = request("/users");
        let resp = ResponseWriter::new();

        assert!(!interceptor.run(&ctx, &resp, &req).await);
        assert_eq!(ctx.get("seen"), Some("/users".into()));
        assert_eq!(interceptor.phase(), Phase::After);
    }
}
