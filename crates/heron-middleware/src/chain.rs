//! Ordered before/after interceptor chain.

use std::fmt;
use std::sync::Arc;

use heron_core::{Request, RequestContext, ResponseWriter};
use tracing::debug;

use crate::interceptor::{Interceptor, Phase};

/// A type-erased interceptor that can be stored in a vector.
pub type BoxedInterceptor = Arc<dyn Interceptor>;

/// Interceptors split by phase, each list kept in registration order.
///
/// # Example
///
/// ```
/// use heron_middleware::{FnInterceptor, InterceptorChain, Phase};
///
/// let mut chain = InterceptorChain::new();
/// chain.push(FnInterceptor::before("first", |_c, _r, _q| async { true }));
/// chain.push(FnInterceptor::after("audit", |_c, _r, _q| async { true }));
///
/// assert_eq!(chain.names(Phase::Before), vec!["first"]);
/// assert_eq!(chain.len(), 2);
/// ```
#[derive(Default, Clone)]
pub struct InterceptorChain {
    before: Vec<BoxedInterceptor>,
    after: Vec<BoxedInterceptor>,
}

impl InterceptorChain {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an interceptor to the list for its phase.
    pub fn push<I: Interceptor>(&mut self, interceptor: I) {
        self.push_arc(Arc::new(interceptor));
    }

    /// Appends an already shared interceptor.
    pub fn push_arc(&mut self, interceptor: BoxedInterceptor) {
        match interceptor.phase() {
            Phase::Before => self.before.push(interceptor),
            Phase::After => self.after.push(interceptor),
        }
    }

    /// Runs the before-phase interceptors.
    ///
    /// Returns `false` as soon as one applicable interceptor returns
    /// `false`; the remaining ones are not evaluated. In that case neither
    /// the handler nor the after-phase interceptors must run.
    pub async fn run_before(&self, ctx: &RequestContext, resp: &ResponseWriter, req: &Request) -> bool {
        Self::run_list(&self.before, Phase::Before, ctx, resp, req).await
    }

    /// Runs the after-phase interceptors with the same contract as
    /// [`run_before`](Self::run_before).
    pub async fn run_after(&self, ctx: &RequestContext, resp: &ResponseWriter, req: &Request) -> bool {
        Self::run_list(&self.after, Phase::After, ctx, resp, req).await
    }

    async fn run_list(
        list: &[BoxedInterceptor],
        phase: Phase,
        ctx: &RequestContext,
        resp: &ResponseWriter,
        req: &Request,
    ) -> bool {
        for interceptor in list {
            if !interceptor.applies_to(req) {
                continue;
            }
            if !interceptor.run(ctx, resp, req).await {
                debug!(
                    phase = %phase,
                    interceptor = %interceptor.name(),
                    path = %req.path(),
                    "interceptor stopped the chain"
                );
                return false;
            }
        }
        true
    }

    /// Returns the interceptor names of a phase, in order.
    #[must_use]
    pub fn names(&self, phase: Phase) -> Vec<&str> {
        let list = match phase {
            Phase::Before => &self.before,
            Phase::After => &self.after,
        };
        list.iter().map(|i| i.name()).collect()
    }

    /// Returns the total number of interceptors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.before.len() + self.after.len()
    }

    /// Returns true if no interceptors are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.before.is_empty() && self.after.is_empty()
    }
}

impl fmt::Debug for InterceptorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterceptorChain")
            .field("before", &self.names(Phase::Before))
            .field("after", &self.names(Phase::After))
            .finish()
    }
}
