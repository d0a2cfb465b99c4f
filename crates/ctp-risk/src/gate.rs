//! The risk gate wrapper.
//!
//! `RiskGate<I, O>` binds one action to an explicit pre/post check pair,
//! resolved at construction time rather than by name lookup at call
//! time. Call protocol:
//!
//! 1. capability guard (if a category is configured) — configuration
//!    error before anything runs;
//! 2. pre-check — absent or falsy means veto: logged, action skipped,
//!    `Ok(None)` returned;
//! 3. the action runs exactly once;
//! 4. post-check — absent is a configuration error surfaced to the
//!    caller (the action's side effect has already happened); present,
//!    it receives the result and its return value is discarded;
//! 5. the action's result is returned.

use std::sync::Arc;

use tracing::debug;

use crate::category::{ConnectionStatus, RiskCategory};
use crate::context::RiskContext;
use crate::error::{RiskError, RiskResult};

type Action<I, O> = Box<dyn Fn(I) -> O + Send + Sync>;
type PreCheck = Box<dyn Fn() -> bool + Send + Sync>;
type PostCheck<O> = Box<dyn Fn(&O) + Send + Sync>;

/// A trading action wrapped in a risk-check envelope.
pub struct RiskGate<I, O> {
    name: String,
    action: Action<I, O>,
    pre: Option<PreCheck>,
    post: Option<PostCheck<O>>,
    guard: Option<(RiskCategory, Arc<dyn ConnectionStatus>)>,
    ctx: Arc<RiskContext>,
}

impl<I, O> RiskGate<I, O> {
    /// Start building a gate around an action.
    pub fn builder<F>(name: impl Into<String>, action: F) -> RiskGateBuilder<I, O>
    where
        F: Fn(I) -> O + Send + Sync + 'static,
    {
        RiskGateBuilder {
            name: name.into(),
            action: Box::new(action),
            pre: None,
            post: None,
            guard: None,
        }
    }

    /// The gated action's name, used in logs and errors.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invoke the gated action under the full check protocol.
    ///
    /// Returns `Ok(None)` on a veto (expected outcome, logged through the
    /// bus), `Ok(Some(result))` when the action ran and the post-check
    /// completed.
    pub fn call(&self, input: I) -> RiskResult<Option<O>> {
        if let Some((category, status)) = &self.guard {
            category.ensure(status.as_ref())?;
        }

        let passed = match &self.pre {
            Some(pre) => pre(),
            // No pre-check configured: never a silent pass
            None => false,
        };

        if !passed {
            self.ctx
                .log(format!("pre-check failed for {}, aborting", self.name));
            debug!(action = %self.name, "risk gate veto");
            return Ok(None);
        }

        let result = (self.action)(input);

        let post = self
            .post
            .as_ref()
            .ok_or_else(|| RiskError::MissingPostCheck(self.name.clone()))?;
        post(&result);

        Ok(Some(result))
    }
}

/// Builder for [`RiskGate`].
pub struct RiskGateBuilder<I, O> {
    name: String,
    action: Action<I, O>,
    pre: Option<PreCheck>,
    post: Option<PostCheck<O>>,
    guard: Option<(RiskCategory, Arc<dyn ConnectionStatus>)>,
}

impl<I, O> std::fmt::Debug for RiskGateBuilder<I, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RiskGateBuilder")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<I, O> RiskGateBuilder<I, O> {
    /// Set the pre-check. Without one, every call vetoes.
    #[must_use]
    pub fn pre_check<F>(mut self, pre: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        self.pre = Some(Box::new(pre));
        self
    }

    /// Set the post-check. Without one, a passing call fails with
    /// [`RiskError::MissingPostCheck`] after the action has run.
    #[must_use]
    pub fn post_check<F>(mut self, post: F) -> Self
    where
        F: Fn(&O) + Send + Sync + 'static,
    {
        self.post = Some(Box::new(post));
        self
    }

    /// Guard the gate with a risk category. The category name is parsed
    /// here, so an unrecognized category fails before any call is made.
    pub fn category(
        mut self,
        name: &str,
        status: Arc<dyn ConnectionStatus>,
    ) -> RiskResult<Self> {
        let category = RiskCategory::parse(name)?;
        self.guard = Some((category, status));
        Ok(self)
    }

    /// Finish the gate, binding it to the shared context.
    #[must_use]
    pub fn build(self, ctx: Arc<RiskContext>) -> RiskGate<I, O> {
        RiskGate {
            name: self.name,
            action: self.action,
            pre: self.pre,
            post: self.post,
            guard: self.guard,
            ctx,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::NoopRealtimeCheck;
    use ctp_bus::EventBus;
    use ctp_core::EventKind;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn detached_ctx() -> Arc<RiskContext> {
        Arc::new(RiskContext::new())
    }

    struct Status {
        market: bool,
        trader: bool,
    }

    impl ConnectionStatus for Status {
        fn market_connected(&self) -> bool {
            self.market
        }
        fn trader_connected(&self) -> bool {
            self.trader
        }
    }

    #[test]
    fn test_pass_runs_action_and_post_once() {
        let action_calls = Arc::new(AtomicU32::new(0));
        let post_results: Arc<Mutex<Vec<i32>>> = Arc::new(Mutex::new(Vec::new()));

        let counter = action_calls.clone();
        let sink = post_results.clone();
        let gate = RiskGate::builder("send_order", move |size: i32| {
            counter.fetch_add(1, Ordering::SeqCst);
            size * 2
        })
        .pre_check(|| true)
        .post_check(move |result| sink.lock().push(*result))
        .build(detached_ctx());

        let result = gate.call(21).unwrap();

        assert_eq!(result, Some(42));
        assert_eq!(action_calls.load(Ordering::SeqCst), 1);
        // Post-check saw exactly the action's result
        assert_eq!(post_results.lock().as_slice(), [42]);
    }

    #[test]
    fn test_falsy_pre_check_vetoes() {
        let action_calls = Arc::new(AtomicU32::new(0));

        let counter = action_calls.clone();
        let gate = RiskGate::builder("send_order", move |_: ()| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .pre_check(|| false)
        .post_check(|_| {})
        .build(detached_ctx());

        let result = gate.call(()).unwrap();

        assert_eq!(result, None);
        assert_eq!(action_calls.load(Ordering::SeqCst), 0, "action must not run");
    }

    #[test]
    fn test_absent_pre_check_is_veto_not_pass() {
        let action_calls = Arc::new(AtomicU32::new(0));

        let counter = action_calls.clone();
        let gate = RiskGate::builder("send_order", move |_: ()| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .post_check(|_| {})
        .build(detached_ctx());

        assert_eq!(gate.call(()).unwrap(), None);
        assert_eq!(action_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_missing_post_check_fails_after_action_ran() {
        let action_calls = Arc::new(AtomicU32::new(0));

        let counter = action_calls.clone();
        let gate = RiskGate::builder("send_order", move |_: ()| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .pre_check(|| true)
        .build(detached_ctx());

        let err = gate.call(()).unwrap_err();

        assert_eq!(err, RiskError::MissingPostCheck("send_order".to_string()));
        // Known hazard: the action's side effect has already happened
        assert_eq!(action_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unknown_category_rejected_at_build() {
        let status = Arc::new(Status {
            market: true,
            trader: true,
        });

        let err = RiskGate::<(), ()>::builder("send_order", |_| {})
            .category("ledger", status)
            .unwrap_err();

        assert_eq!(err, RiskError::InvalidCategory("ledger".to_string()));
    }

    #[test]
    fn test_capability_guard_precedes_hooks() {
        let pre_calls = Arc::new(AtomicU32::new(0));
        let status = Arc::new(Status {
            market: false,
            trader: true,
        });

        let counter = pre_calls.clone();
        let gate = RiskGate::builder("subscribe", |_: ()| {})
            .pre_check(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                true
            })
            .post_check(|_| {})
            .category("market", status)
            .unwrap()
            .build(detached_ctx());

        let err = gate.call(()).unwrap_err();

        assert!(matches!(err, RiskError::MissingCapability(_)));
        assert_eq!(pre_calls.load(Ordering::SeqCst), 0, "no hook may run");
    }

    #[tokio::test]
    async fn test_veto_is_logged_through_bus() {
        let (bus, _join) = EventBus::spawn(16);
        let ctx = Arc::new(RiskContext::new());
        ctx.attach(bus.clone(), Arc::new(NoopRealtimeCheck)).unwrap();

        let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        bus.register(
            EventKind::Log,
            Arc::new(move |event| sink.lock().push(event.payload.clone())),
        );

        let gate = RiskGate::builder("send_order", |_: ()| {})
            .pre_check(|| false)
            .post_check(|_| {})
            .build(ctx);

        assert_eq!(gate.call(()).unwrap(), None);
        tokio::time::sleep(Duration::from_millis(20)).await;

        let logs = seen.lock();
        assert_eq!(logs.len(), 1);
        assert!(logs[0].contains("pre-check failed for send_order"));
    }
}
