//! Execution cycle driver.
//!
//! Each pass resets the variable change counter, evaluates every
//! non-retracted rule against the current facts (a condition that reads a
//! retracted fact does not match), orders the matches by
//! descending salience (registration order breaks ties) and fires them one
//! after another against the live store. The run ends when:
//!
//! - a rule completes the store (`Outcome::Halted`),
//! - a pass matches nothing and changes nothing (`Outcome::Converged`), or
//! - the pass budget is spent (`ExecutionError::CycleExceeded`).

mod listener;
mod report;

pub use listener::ExecutionListener;
pub use report::{ExecutionId, ExecutionReport, Outcome};

use chrono::Utc;
use tracing::{debug, info, info_span, trace, warn};

use crate::config::{EngineConfig, ErrorPolicy};
use crate::error::{EngineError, EngineResult, ExecutionError, FactError, ValidationError};
use crate::knowledge::KnowledgeBase;
use crate::rule::Rule;
use crate::store::FactStore;

/// Forward-chaining rule engine.
pub struct Engine {
    config: EngineConfig,
    listeners: Vec<Box<dyn ExecutionListener>>,
}

impl Engine {
    /// Create an engine with the given configuration.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            listeners: Vec::new(),
        }
    }

    /// Create an engine with default configuration and the given pass budget.
    #[must_use]
    pub fn with_max_cycle(max_cycle: u64) -> Self {
        Self::new(EngineConfig {
            max_cycle,
            ..EngineConfig::default()
        })
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Register a listener. Listeners are called in registration order.
    pub fn add_listener(&mut self, listener: impl ExecutionListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Run `kb` against `store` with the configured pass budget.
    ///
    /// # Errors
    /// See [`execute_with_max_cycle`](Self::execute_with_max_cycle).
    pub fn execute(&self, store: &mut FactStore, kb: &KnowledgeBase) -> EngineResult<ExecutionReport> {
        self.execute_with_max_cycle(store, kb, self.config.max_cycle)
    }

    /// Run `kb` against `store` for at most `max_cycle` passes.
    ///
    /// # Errors
    /// - `InvalidMaxCycle` if `max_cycle` is zero
    /// - `CycleExceeded` if rules still matched after `max_cycle` passes
    /// - `RuleFailed` if a condition or action failed under `ErrorPolicy::Abort`
    pub fn execute_with_max_cycle(
        &self,
        store: &mut FactStore,
        kb: &KnowledgeBase,
        max_cycle: u64,
    ) -> EngineResult<ExecutionReport> {
        if max_cycle == 0 {
            return Err(ValidationError::InvalidMaxCycle { value: max_cycle }.into());
        }

        let execution_id = ExecutionId::new();
        let span = info_span!(
            "execute",
            %execution_id,
            knowledge_base = kb.name(),
            version = kb.version()
        );
        let _guard = span.enter();

        let started_at = Utc::now();
        let mut passes = 0u64;
        let mut rules_fired = 0u64;

        let outcome = if store.is_complete() {
            debug!("store already complete, nothing to run");
            Outcome::Halted
        } else {
            loop {
                let pass = passes + 1;
                store.reset_variable_change_count();
                for listener in &self.listeners {
                    listener.begin_cycle(pass);
                }

                let matched = self.select(store, kb, pass)?;
                debug!(pass, matched = matched.len(), "rules selected");

                for rule in &matched {
                    if self.fire(rule, store, pass)? {
                        rules_fired += 1;
                    }
                }
                passes = pass;

                if store.is_complete() {
                    break Outcome::Halted;
                }
                if matched.is_empty() && !store.has_variable_change() {
                    break Outcome::Converged;
                }
                if passes >= max_cycle {
                    warn!(max_cycle, rules_fired, "maximum cycle reached");
                    return Err(ExecutionError::CycleExceeded { max_cycle }.into());
                }
            }
        };

        info!(?outcome, passes, rules_fired, "execution finished");
        Ok(ExecutionReport {
            execution_id,
            knowledge_base: kb.name().to_string(),
            version: kb.version().to_string(),
            fingerprint: kb.fingerprint(),
            outcome,
            passes,
            rules_fired,
            started_at,
            finished_at: Utc::now(),
        })
    }

    /// Evaluate every non-retracted rule once without firing anything.
    ///
    /// Returns the matches in the order they would fire.
    ///
    /// # Errors
    /// Returns `RuleFailed` if a condition fails under `ErrorPolicy::Abort`.
    pub fn matching_rules<'kb>(
        &self,
        store: &FactStore,
        kb: &'kb KnowledgeBase,
    ) -> EngineResult<Vec<&'kb Rule>> {
        self.select(store, kb, 0)
    }

    fn select<'kb>(
        &self,
        store: &FactStore,
        kb: &'kb KnowledgeBase,
        pass: u64,
    ) -> EngineResult<Vec<&'kb Rule>> {
        let mut matched = Vec::new();
        for rule in kb.rules() {
            if store.is_retracted(rule.name()) {
                trace!(rule = rule.name(), "skipping retracted rule");
                continue;
            }

            let hit = match rule.evaluate(store) {
                Ok(hit) => hit,
                Err(EngineError::Fact(FactError::FactRetracted { name })) => {
                    trace!(rule = rule.name(), fact = %name, "condition reads a retracted fact");
                    false
                }
                Err(err) => {
                    self.on_rule_error(rule, pass, err)?;
                    false
                }
            };
            trace!(rule = rule.name(), matched = hit, "condition evaluated");
            for listener in &self.listeners {
                listener.rule_evaluated(rule, hit);
            }
            if hit {
                matched.push(rule);
            }
        }

        // Stable: equal salience keeps registration order.
        matched.sort_by(|a, b| b.salience().cmp(&a.salience()));
        Ok(matched)
    }

    /// Returns whether the rule fired; `false` means it failed and was skipped.
    fn fire(&self, rule: &Rule, store: &mut FactStore, pass: u64) -> EngineResult<bool> {
        trace!(rule = rule.name(), salience = rule.salience(), "firing rule");
        match rule.fire(store) {
            Ok(()) => {
                for listener in &self.listeners {
                    listener.rule_fired(rule);
                }
                Ok(true)
            }
            Err(err) => {
                self.on_rule_error(rule, pass, err)?;
                Ok(false)
            }
        }
    }

    fn on_rule_error(&self, rule: &Rule, pass: u64, err: EngineError) -> EngineResult<()> {
        match self.config.error_policy {
            ErrorPolicy::Abort => Err(ExecutionError::RuleFailed {
                rule: rule.name().to_string(),
                pass,
                source: Box::new(err),
            }
            .into()),
            ErrorPolicy::SkipRule => {
                warn!(rule = rule.name(), pass, error = %err, "rule failed, skipping");
                Ok(())
            }
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
