//! Knowledge base: the ordered rule set of one ruleset version.

use crate::error::ValidationError;
use crate::rule::Rule;

/// An ordered collection of rules, read-only while executing.
///
/// Registration order is kept and breaks salience ties when firing.
#[derive(Debug)]
pub struct KnowledgeBase {
    name: String,
    version: String,
    rules: Vec<Rule>,
}

impl KnowledgeBase {
    /// Creates an empty knowledge base.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            rules: Vec::new(),
        }
    }

    /// Registers a rule at the end of the rule order.
    ///
    /// # Errors
    /// Returns `DuplicateRule` if a rule with the same name is registered.
    pub fn add_rule(&mut self, rule: Rule) -> Result<(), ValidationError> {
        if self.rule(rule.name()).is_some() {
            return Err(ValidationError::DuplicateRule {
                knowledge_base: self.name.clone(),
                name: rule.name().to_string(),
            });
        }
        self.rules.push(rule);
        Ok(())
    }

    /// Builder-style [`add_rule`](Self::add_rule).
    ///
    /// # Errors
    /// Returns `DuplicateRule` if a rule with the same name is registered.
    pub fn with_rule(mut self, rule: Rule) -> Result<Self, ValidationError> {
        self.add_rule(rule)?;
        Ok(self)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Rules in registration order.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    #[must_use]
    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.name() == name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Stable digest of the ruleset's identity and rule order.
    ///
    /// Covers the name, the version, and each rule's name, salience and
    /// description. Conditions and actions are opaque and not covered.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"chainrule:kb:v1\0");
        update_field(&mut hasher, self.name.as_bytes());
        update_field(&mut hasher, self.version.as_bytes());
        for rule in &self.rules {
            update_field(&mut hasher, rule.name().as_bytes());
            hasher.update(&rule.salience().to_le_bytes());
            update_field(&mut hasher, rule.description().as_bytes());
        }
        hasher.finalize().to_hex().to_string()
    }
}

// Length prefix keeps ("ab", "c") distinct from ("a", "bc").
fn update_field(hasher: &mut blake3::Hasher, bytes: &[u8]) {
    hasher.update(&(bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}
