//! Per-session AI usage accounting.
//!
//! The ledger is an injected component with explicit lifecycle, not a
//! process-global singleton. It lives in memory for the process lifetime;
//! multi-process deployments must put an implementation of [`UsageLedger`]
//! over a shared store or accept per-process budget drift.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::domain::foundation::{SessionId, Timestamp};

/// Accumulated AI usage for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionUsage {
    /// Number of assistance invocations (attempted calls count too).
    pub calls: u32,
    /// Total tokens consumed across successful calls.
    pub total_tokens: u32,
    /// Accumulated cost in cents.
    pub cost_cents: u32,
    /// When the session's first assistance call happened.
    pub started_at: Timestamp,
}

impl SessionUsage {
    fn fresh() -> Self {
        Self {
            calls: 0,
            total_tokens: 0,
            cost_cents: 0,
            started_at: Timestamp::now(),
        }
    }
}

/// The per-session budget ceilings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetLimits {
    /// Maximum assistance invocations per session.
    pub max_calls: u32,
    /// Maximum accumulated cost in cents per session.
    pub max_cost_cents: u32,
}

/// Whether an assistance invocation may call the completion service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetDecision {
    /// Within budget; the completion call may proceed.
    Proceed,
    /// Budget exhausted; serve the deterministic fallback. Permanent for
    /// the session - counters only grow.
    Exhausted,
}

impl BudgetDecision {
    /// Returns true if the completion call may proceed.
    pub fn may_proceed(&self) -> bool {
        matches!(self, Self::Proceed)
    }
}

/// Tracks assistance usage per session and enforces the budget.
///
/// `begin_call` increments the call counter *before* the completion attempt:
/// a failed call still counts against the ceiling.
pub trait UsageLedger: Send + Sync {
    /// Registers an invocation and decides whether it may call out.
    fn begin_call(&self, session: &SessionId, limits: &BudgetLimits) -> BudgetDecision;

    /// Records token and cost accounting for a successful call.
    fn record(&self, session: &SessionId, tokens: u32, cost_cents: u32);

    /// Returns the usage accumulated for a session, if any.
    fn usage(&self, session: &SessionId) -> Option<SessionUsage>;

    /// Clears a session's usage (explicit fresh-session requests only).
    fn reset(&self, session: &SessionId);
}

/// In-memory ledger guarded by a mutex.
#[derive(Default)]
pub struct InMemoryUsageLedger {
    sessions: Mutex<HashMap<String, SessionUsage>>,
}

impl InMemoryUsageLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sessions with recorded usage.
    pub fn session_count(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }
}

impl UsageLedger for InMemoryUsageLedger {
    fn begin_call(&self, session: &SessionId, limits: &BudgetLimits) -> BudgetDecision {
        let mut sessions = self.sessions.lock().unwrap();
        let usage = sessions
            .entry(session.as_str().to_string())
            .or_insert_with(SessionUsage::fresh);
        usage.calls += 1;
        if usage.calls > limits.max_calls || usage.cost_cents >= limits.max_cost_cents {
            BudgetDecision::Exhausted
        } else {
            BudgetDecision::Proceed
        }
    }

    fn record(&self, session: &SessionId, tokens: u32, cost_cents: u32) {
        let mut sessions = self.sessions.lock().unwrap();
        let usage = sessions
            .entry(session.as_str().to_string())
            .or_insert_with(SessionUsage::fresh);
        usage.total_tokens += tokens;
        usage.cost_cents += cost_cents;
    }

    fn usage(&self, session: &SessionId) -> Option<SessionUsage> {
        self.sessions.lock().unwrap().get(session.as_str()).copied()
    }

    fn reset(&self, session: &SessionId) {
        self.sessions.lock().unwrap().remove(session.as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> SessionId {
        SessionId::new("budget-session").unwrap()
    }

    fn limits() -> BudgetLimits {
        BudgetLimits {
            max_calls: 3,
            max_cost_cents: 50,
        }
    }

    #[test]
    fn calls_within_ceiling_proceed() {
        let ledger = InMemoryUsageLedger::new();
        let s = session();
        for _ in 0..3 {
            assert!(ledger.begin_call(&s, &limits()).may_proceed());
        }
    }

    #[test]
    fn call_past_ceiling_is_exhausted_permanently() {
        let ledger = InMemoryUsageLedger::new();
        let s = session();
        for _ in 0..3 {
            ledger.begin_call(&s, &limits());
        }
        for _ in 0..5 {
            assert_eq!(ledger.begin_call(&s, &limits()), BudgetDecision::Exhausted);
        }
    }

    #[test]
    fn failed_calls_still_count() {
        // begin_call increments before the attempt; no compensating
        // decrement exists, so three failures exhaust a ceiling of three.
        let ledger = InMemoryUsageLedger::new();
        let s = session();
        for _ in 0..3 {
            ledger.begin_call(&s, &limits());
            // no record() - the call failed
        }
        assert_eq!(ledger.begin_call(&s, &limits()), BudgetDecision::Exhausted);
    }

    #[test]
    fn cost_ceiling_blocks_even_with_calls_remaining() {
        let ledger = InMemoryUsageLedger::new();
        let s = session();
        ledger.begin_call(&s, &limits());
        ledger.record(&s, 500, 50);
        assert_eq!(ledger.begin_call(&s, &limits()), BudgetDecision::Exhausted);
    }

    #[test]
    fn sessions_are_independent() {
        let ledger = InMemoryUsageLedger::new();
        let a = SessionId::new("a").unwrap();
        let b = SessionId::new("b").unwrap();
        for _ in 0..4 {
            ledger.begin_call(&a, &limits());
        }
        assert_eq!(ledger.begin_call(&a, &limits()), BudgetDecision::Exhausted);
        assert!(ledger.begin_call(&b, &limits()).may_proceed());
    }

    #[test]
    fn record_accumulates() {
        let ledger = InMemoryUsageLedger::new();
        let s = session();
        ledger.begin_call(&s, &limits());
        ledger.record(&s, 100, 2);
        ledger.record(&s, 50, 1);
        let usage = ledger.usage(&s).unwrap();
        assert_eq!(usage.calls, 1);
        assert_eq!(usage.total_tokens, 150);
        assert_eq!(usage.cost_cents, 3);
    }

    #[test]
    fn reset_clears_session() {
        let ledger = InMemoryUsageLedger::new();
        let s = session();
        for _ in 0..4 {
            ledger.begin_call(&s, &limits());
        }
        ledger.reset(&s);
        assert!(ledger.usage(&s).is_none());
        assert!(ledger.begin_call(&s, &limits()).may_proceed());
    }
}
