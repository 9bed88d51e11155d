//! Rules: a salience, a condition and an ordered list of actions.
//!
//! Conditions and actions arrive as opaque callables; whatever compiled the
//! rule script decided what they do. A rule is immutable once built.

use std::fmt;

use crate::error::{EngineResult, ValidationError};
use crate::resolver::is_identifier;
use crate::store::FactStore;

/// Condition of a rule, evaluated against the current facts.
pub type Condition = Box<dyn Fn(&FactStore) -> EngineResult<bool>>;

/// One action of a rule. Actions may write facts, retract names and
/// complete the run.
pub type Action = Box<dyn Fn(&mut FactStore) -> EngineResult<()>>;

/// A condition/action rule.
pub struct Rule {
    name: String,
    description: String,
    salience: i32,
    condition: Condition,
    actions: Vec<Action>,
}

impl Rule {
    /// Starts building a rule named `name`.
    pub fn builder(name: impl Into<String>) -> RuleBuilder {
        RuleBuilder::new(name)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Priority among simultaneously matched rules; higher fires first.
    #[must_use]
    pub const fn salience(&self) -> i32 {
        self.salience
    }

    #[must_use]
    pub fn action_count(&self) -> usize {
        self.actions.len()
    }

    /// Evaluates the condition.
    ///
    /// # Errors
    /// Propagates whatever the condition fails with.
    pub fn evaluate(&self, store: &FactStore) -> EngineResult<bool> {
        (self.condition)(store)
    }

    /// Runs every action in order, stopping at the first failure.
    ///
    /// # Errors
    /// Propagates the first failing action's error.
    pub fn fire(&self, store: &mut FactStore) -> EngineResult<()> {
        for action in &self.actions {
            action(store)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("salience", &self.salience)
            .field("actions", &self.actions.len())
            .finish_non_exhaustive()
    }
}

/// Builder for [`Rule`].
///
/// # Example
/// ```rust,ignore
/// let rule = Rule::builder("UserTestRule")
///     .description("rename Watson")
///     .salience(10)
///     .when(|facts| Ok(facts.get_value("User.Name")?.as_str() == Some("Watson")))
///     .then(|facts| Ok(facts.set_value("User.Name", "FromRuleScope")?))
///     .then_retract_self()
///     .build()?;
/// ```
#[derive(Default)]
pub struct RuleBuilder {
    name: String,
    description: Option<String>,
    salience: i32,
    condition: Option<Condition>,
    actions: Vec<Action>,
}

impl RuleBuilder {
    /// Creates a builder for a rule named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set a human-readable description (optional).
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the salience (default: 0).
    #[must_use]
    pub fn salience(mut self, salience: i32) -> Self {
        self.salience = salience;
        self
    }

    /// Set the condition (required).
    #[must_use]
    pub fn when<F>(mut self, condition: F) -> Self
    where
        F: Fn(&FactStore) -> EngineResult<bool> + 'static,
    {
        self.condition = Some(Box::new(condition));
        self
    }

    /// Append an action (at least one required).
    #[must_use]
    pub fn then<F>(mut self, action: F) -> Self
    where
        F: Fn(&mut FactStore) -> EngineResult<()> + 'static,
    {
        self.actions.push(Box::new(action));
        self
    }

    /// Append an action retracting this rule, so it stops matching.
    #[must_use]
    pub fn then_retract_self(self) -> Self {
        let name = self.name.clone();
        self.then(move |store| {
            store.retract(name.as_str());
            Ok(())
        })
    }

    /// Append an action retracting the fact or rule `name`.
    #[must_use]
    pub fn then_retract(self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.then(move |store| {
            store.retract(name.as_str());
            Ok(())
        })
    }

    /// Append an action completing the run.
    #[must_use]
    pub fn then_complete(self) -> Self {
        self.then(|store| {
            store.complete();
            Ok(())
        })
    }

    /// Validate and build the rule.
    ///
    /// # Errors
    /// Returns `InvalidRuleName`, `MissingField` (no condition) or
    /// `MissingActions`.
    pub fn build(self) -> Result<Rule, ValidationError> {
        if !is_identifier(&self.name) {
            return Err(ValidationError::InvalidRuleName { name: self.name });
        }
        let condition = self.condition.ok_or_else(|| ValidationError::MissingField {
            field: "condition".to_string(),
        })?;
        if self.actions.is_empty() {
            return Err(ValidationError::MissingActions { name: self.name });
        }

        Ok(Rule {
            description: self.description.unwrap_or_default(),
            name: self.name,
            salience: self.salience,
            condition,
            actions: self.actions,
        })
    }
}
