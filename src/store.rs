//! The fact store: named facts, retraction and change tracking.
//!
//! A [`FactStore`] binds names to caller-owned fact objects and routes every
//! path operation to the [`resolver`](crate::resolver) after checking that
//! the named fact exists and is not retracted. It also carries the two
//! signals the execution cycle reads: the variable change counter and the
//! completion flag.

use std::collections::HashMap;

use tracing::trace;

use crate::error::FactError;
use crate::fact::FactRef;
use crate::resolver::{self, is_identifier, FactPath};
use crate::value::{RuntimeType, Value};

/// Holds every fact visible to one rule execution.
///
/// Retracted names stay bound; they are only hidden from resolution until
/// [`reset`](FactStore::reset). The retraction set also holds rule names,
/// which the engine uses to stop evaluating a rule.
#[derive(Default)]
pub struct FactStore {
    facts: HashMap<String, FactRef>,
    retracted: Vec<String>,
    variable_change_count: u64,
    complete: bool,
}

impl FactStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `fact` under `name`, replacing any previous binding.
    ///
    /// # Errors
    /// Returns `InvalidFactKind` unless `fact` is an object handle, and
    /// `InvalidPath` if `name` is not an identifier.
    pub fn add(&mut self, name: impl Into<String>, fact: impl Into<Value>) -> Result<(), FactError> {
        let name = name.into();
        if !is_identifier(&name) {
            return Err(FactError::InvalidPath {
                reason: "fact names must be identifiers".to_string(),
                path: name,
            });
        }
        match fact.into() {
            Value::Object(obj) => {
                trace!(fact = %name, "fact added");
                self.facts.insert(name, obj);
                Ok(())
            }
            other => Err(FactError::InvalidFactKind {
                name,
                kind: other.kind(),
            }),
        }
    }

    /// Returns true if a fact is bound under `name`, retracted or not.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.facts.contains_key(name)
    }

    /// Number of bound facts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Hides `name` from resolution. Retracting twice is a no-op.
    pub fn retract(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.is_retracted(&name) {
            trace!(name = %name, "retracted");
            self.retracted.push(name);
        }
    }

    #[must_use]
    pub fn is_retracted(&self, name: &str) -> bool {
        self.retracted.iter().any(|r| r == name)
    }

    /// Retracted names, in retraction order.
    #[must_use]
    pub fn retracted(&self) -> &[String] {
        &self.retracted
    }

    /// Restores every retracted name.
    pub fn reset(&mut self) {
        self.retracted.clear();
    }

    fn lookup<'p>(&self, parsed: FactPath<'p>) -> Result<(&FactRef, FactPath<'p>), FactError> {
        let Some(obj) = self.facts.get(parsed.fact) else {
            return Err(FactError::FactNotFound {
                name: parsed.fact.to_string(),
            });
        };
        if self.is_retracted(parsed.fact) {
            return Err(FactError::FactRetracted {
                name: parsed.fact.to_string(),
            });
        }
        Ok((obj, parsed))
    }

    /// Declared type at `path`, e.g. `User.Name`.
    ///
    /// # Errors
    /// Returns `FactNotFound`, `FactRetracted`, or a resolution error.
    pub fn get_type(&self, path: &str) -> Result<RuntimeType, FactError> {
        let (obj, parsed) = self.lookup(FactPath::parse(path)?)?;
        resolver::resolve_type(obj, &parsed.segments)
    }

    /// Current value at `path`. A bare fact name yields the fact itself.
    ///
    /// # Errors
    /// Returns `FactNotFound`, `FactRetracted`, or a resolution error.
    pub fn get_value(&self, path: &str) -> Result<Value, FactError> {
        let (obj, parsed) = self.lookup(FactPath::parse(path)?)?;
        resolver::resolve_value(obj, &parsed.segments)
    }

    /// Writes `value` at `path`, counting one variable change on success.
    ///
    /// # Errors
    /// Returns `FactNotFound`, `FactRetracted`, `NoPathSpecified`, or a
    /// resolution error. Failed writes are not counted.
    pub fn set_value(&mut self, path: &str, value: impl Into<Value>) -> Result<(), FactError> {
        let (obj, parsed) = self.lookup(FactPath::parse(path)?)?;
        if parsed.segments.is_empty() {
            return Err(FactError::NoPathSpecified {
                fact: parsed.fact.to_string(),
            });
        }
        resolver::assign_value(obj, &parsed.segments, value.into())?;
        self.variable_change_count += 1;
        trace!(path, changes = self.variable_change_count, "value set");
        Ok(())
    }

    /// Calls the method at `path` with `args`. Method calls never count as
    /// variable changes, even if the method mutates its object.
    ///
    /// # Errors
    /// Returns `FactNotFound`, `FactRetracted`, `NoPathSpecified`, or a
    /// resolution or argument error.
    pub fn exec_method(&self, path: &str, args: Vec<Value>) -> Result<Value, FactError> {
        let (obj, parsed) = self.lookup(FactPath::parse_call(path)?)?;
        if parsed.segments.is_empty() {
            return Err(FactError::NoPathSpecified {
                fact: parsed.fact.to_string(),
            });
        }
        resolver::invoke_method(obj, &parsed.segments, args)
    }

    /// Marks the run complete; the engine stops after the current pass.
    pub fn complete(&mut self) {
        self.complete = true;
    }

    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn reset_variable_change_count(&mut self) {
        self.variable_change_count = 0;
    }

    pub fn increment_variable_change_count(&mut self) {
        self.variable_change_count += 1;
    }

    #[must_use]
    pub const fn has_variable_change(&self) -> bool {
        self.variable_change_count > 0
    }

    #[must_use]
    pub const fn variable_change_count(&self) -> u64 {
        self.variable_change_count
    }

    /// Drops every binding and clears all state so the store can be reused.
    pub fn reset_all(&mut self) {
        self.facts.clear();
        self.retracted.clear();
        self.variable_change_count = 0;
        self.complete = false;
    }
}

impl std::fmt::Debug for FactStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.facts.keys().collect();
        names.sort();
        f.debug_struct("FactStore")
            .field("facts", &names)
            .field("retracted", &self.retracted)
            .field("variable_change_count", &self.variable_change_count)
            .field("complete", &self.complete)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FactError;
    use crate::fact::{fact_ref, unknown_field, Fact, MethodSignature};
    use crate::value::Kind;

    struct User {
        name: String,
    }

    impl Fact for User {
        fn type_name(&self) -> &'static str {
            "User"
        }

        fn field_type(&self, field: &str) -> Option<RuntimeType> {
            (field == "Name").then_some(RuntimeType::String)
        }

        fn field(&self, field: &str) -> Option<Value> {
            (field == "Name").then(|| Value::String(self.name.clone()))
        }

        fn set_field(&mut self, field: &str, value: Value) -> Result<(), FactError> {
            match (field, value) {
                ("Name", Value::String(name)) => {
                    self.name = name;
                    Ok(())
                }
                (field, _) => Err(unknown_field(&*self, field)),
            }
        }

        fn method(&self, name: &str) -> Option<MethodSignature> {
            match name {
                "GetName" => Some(MethodSignature::new(Vec::new()).returns(1)),
                "SetName" => Some(MethodSignature::new(vec![RuntimeType::String])),
                _ => None,
            }
        }

        fn call(&mut self, name: &str, args: Vec<Value>) -> Result<Vec<Value>, FactError> {
            match name {
                "GetName" => Ok(vec![Value::String(self.name.clone())]),
                "SetName" => {
                    self.name = args.into_iter().next().and_then(Value::into_string).unwrap_or_default();
                    Ok(Vec::new())
                }
                _ => Err(FactError::method_failed(name, "no such method")),
            }
        }
    }

    fn store_with_user() -> (FactStore, std::rc::Rc<std::cell::RefCell<User>>) {
        let user = fact_ref(User {
            name: "Watson".to_string(),
        });
        let mut store = FactStore::new();
        store.add("User", user.clone()).unwrap();
        (store, user)
    }

    #[test]
    fn test_add_rejects_scalars() {
        let mut store = FactStore::new();
        let err = store.add("Answer", 42).unwrap_err();
        assert!(matches!(err, FactError::InvalidFactKind { kind: Kind::Int, .. }));
        let err = store.add("Name", "Watson").unwrap_err();
        assert!(matches!(err, FactError::InvalidFactKind { kind: Kind::String, .. }));
        assert!(store.is_empty());
    }

    #[test]
    fn test_add_rejects_bad_names() {
        let mut store = FactStore::new();
        let user = fact_ref(User { name: String::new() });
        assert!(matches!(
            store.add("the user", user),
            Err(FactError::InvalidPath { .. })
        ));
    }

    #[test]
    fn test_add_overwrites_binding() {
        let (mut store, _) = store_with_user();
        let other = fact_ref(User {
            name: "Holmes".to_string(),
        });
        store.add("User", other).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get_value("User.Name").unwrap(), Value::from("Holmes"));
    }

    #[test]
    fn test_missing_fact() {
        let (mut store, _) = store_with_user();
        assert!(matches!(store.get_value("Ghost.Name"), Err(FactError::FactNotFound { .. })));
        assert!(matches!(store.get_type("Ghost"), Err(FactError::FactNotFound { .. })));
        assert!(matches!(
            store.set_value("Ghost.Name", "x"),
            Err(FactError::FactNotFound { .. })
        ));
        assert!(matches!(
            store.exec_method("Ghost.GetName", Vec::new()),
            Err(FactError::FactNotFound { .. })
        ));
    }

    #[test]
    fn test_retract_and_reset() {
        let (mut store, _) = store_with_user();
        store.retract("User");
        store.retract("User");
        assert!(store.is_retracted("User"));
        assert_eq!(store.retracted(), vec!["User".to_string()].as_slice());
        assert!(store.contains("User"));
        assert!(matches!(store.get_value("User.Name"), Err(FactError::FactRetracted { .. })));
        assert!(matches!(
            store.exec_method("User.GetName", Vec::new()),
            Err(FactError::FactRetracted { .. })
        ));

        store.reset();
        assert!(!store.is_retracted("User"));
        assert_eq!(store.get_value("User.Name").unwrap(), Value::from("Watson"));
    }

    #[test]
    fn test_set_value_counts_only_successes() {
        let (mut store, user) = store_with_user();
        assert!(!store.has_variable_change());

        store.set_value("User.Name", "Holmes").unwrap();
        assert_eq!(store.variable_change_count(), 1);
        assert_eq!(user.borrow().name, "Holmes");

        assert!(store.set_value("User.Name", 7).is_err());
        assert!(store.set_value("User.Age", 7).is_err());
        assert!(matches!(
            store.set_value("User", "x"),
            Err(FactError::NoPathSpecified { .. })
        ));
        assert_eq!(store.variable_change_count(), 1);

        store.reset_variable_change_count();
        assert!(!store.has_variable_change());
        store.increment_variable_change_count();
        assert!(store.has_variable_change());
    }

    #[test]
    fn test_exec_method_does_not_count_changes() {
        let (store, user) = store_with_user();
        let ret = store
            .exec_method("User.SetName", vec![Value::from("FromRule")])
            .unwrap();
        assert!(ret.is_null());
        assert_eq!(user.borrow().name, "FromRule");
        assert_eq!(store.exec_method("User.GetName()", Vec::new()).unwrap(), Value::from("FromRule"));
        assert!(!store.has_variable_change());
    }

    #[test]
    fn test_get_type() {
        let (store, _) = store_with_user();
        assert_eq!(store.get_type("User").unwrap(), RuntimeType::Object("User"));
        assert_eq!(store.get_type("User.Name").unwrap(), RuntimeType::String);
    }

    #[test]
    fn test_call_suffix_only_allowed_on_methods() {
        let (mut store, user) = store_with_user();
        assert!(matches!(
            store.get_value("User.Name()"),
            Err(FactError::InvalidPath { .. })
        ));
        assert!(matches!(
            store.get_type("User.Name()"),
            Err(FactError::InvalidPath { .. })
        ));
        assert!(matches!(
            store.set_value("User.Name()", "Holmes"),
            Err(FactError::InvalidPath { .. })
        ));
        assert_eq!(user.borrow().name, "Watson");
        assert_eq!(store.variable_change_count(), 0);
        assert_eq!(
            store.exec_method("User.GetName()", Vec::new()).unwrap(),
            Value::from("Watson")
        );
    }

    #[test]
    fn test_external_mutation_is_visible() {
        let (store, user) = store_with_user();
        user.borrow_mut().name = "Lestrade".to_string();
        assert_eq!(store.get_value("User.Name").unwrap(), Value::from("Lestrade"));
    }

    #[test]
    fn test_complete_and_reset_all() {
        let (mut store, _) = store_with_user();
        store.retract("User");
        store.set_value("User.Name", "x").unwrap_err();
        store.increment_variable_change_count();
        store.complete();
        assert!(store.is_complete());

        store.reset_all();
        assert!(store.is_empty());
        assert!(store.retracted().is_empty());
        assert!(!store.has_variable_change());
        assert!(!store.is_complete());
    }
}
