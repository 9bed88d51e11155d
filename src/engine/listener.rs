//! Hooks for observing an execution.

use crate::rule::Rule;

/// Receives callbacks while the engine runs. All hooks default to no-ops.
///
/// Listeners observe only; they have no access to the fact store.
pub trait ExecutionListener {
    /// A pass is about to evaluate conditions. Passes count from 1.
    fn begin_cycle(&self, _pass: u64) {}

    /// A rule's condition was evaluated. Retracted rules are not reported.
    fn rule_evaluated(&self, _rule: &Rule, _matched: bool) {}

    /// A rule's actions all ran successfully.
    fn rule_fired(&self, _rule: &Rule) {}
}
