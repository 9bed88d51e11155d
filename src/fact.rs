//! The capability set a fact object exposes to rules.
//!
//! Rules never see concrete Rust types. They reach facts through
//! [`Fact`], which lets the path resolver read a field, learn its declared
//! type, write it, and call a method by name. Facts are shared with the
//! caller through [`FactRef`], so a write made by a rule is visible through
//! the caller's own handle.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::FactError;
use crate::value::{RuntimeType, Value};

/// Shared, mutable handle to a fact object.
pub type FactRef = Rc<RefCell<dyn Fact>>;

/// Wraps a fact so it can be handed to a [`FactStore`](crate::FactStore)
/// while the caller keeps a typed handle to the same instance.
///
/// ```
/// use chainrule::{fact_ref, FactStore};
/// # use chainrule::{Fact, FactError, RuntimeType, Value};
/// # struct Counter { hits: i64 }
/// # impl Fact for Counter {
/// #     fn type_name(&self) -> &'static str { "Counter" }
/// #     fn field_type(&self, f: &str) -> Option<RuntimeType> { (f == "Hits").then_some(RuntimeType::Int) }
/// #     fn field(&self, f: &str) -> Option<Value> { (f == "Hits").then(|| Value::Int(self.hits)) }
/// #     fn set_field(&mut self, _: &str, v: Value) -> Result<(), FactError> {
/// #         self.hits = v.as_int().unwrap_or_default();
/// #         Ok(())
/// #     }
/// # }
/// let counter = fact_ref(Counter { hits: 0 });
/// let mut store = FactStore::new();
/// store.add("Counter", counter.clone()).unwrap();
/// store.set_value("Counter.Hits", 3).unwrap();
/// assert_eq!(counter.borrow().hits, 3);
/// ```
pub fn fact_ref<T: Fact + 'static>(fact: T) -> Rc<RefCell<T>> {
    Rc::new(RefCell::new(fact))
}

/// Declared shape of a callable method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    /// Fixed parameter types, in order.
    pub params: Vec<RuntimeType>,
    /// Element type of the trailing variadic parameter, if any.
    pub variadic: Option<RuntimeType>,
    /// Number of values the method returns.
    pub returns: usize,
}

impl MethodSignature {
    /// Signature with the given fixed parameters and no return value.
    #[must_use]
    pub fn new(params: Vec<RuntimeType>) -> Self {
        Self {
            params,
            variadic: None,
            returns: 0,
        }
    }

    /// Adds a trailing variadic parameter.
    #[must_use]
    pub fn variadic(mut self, element: RuntimeType) -> Self {
        self.variadic = Some(element);
        self
    }

    /// Sets the number of returned values.
    #[must_use]
    pub fn returns(mut self, count: usize) -> Self {
        self.returns = count;
        self
    }

    #[must_use]
    pub const fn is_variadic(&self) -> bool {
        self.variadic.is_some()
    }
}

/// A mutable aggregate that rules can navigate by name.
///
/// Field names and method names are the identifiers used in rule paths, so
/// `User.Address.City` reads `Address` from the `User` fact, expects an
/// object back, then reads `City` from it. Nested objects that rules should
/// mutate in place are returned as `Value::Object` handles.
///
/// Implementations only store what [`set_field`](Fact::set_field) receives;
/// the resolver has already checked the value against
/// [`field_type`](Fact::field_type). Arguments passed to
/// [`call`](Fact::call) have likewise been checked against
/// [`method`](Fact::method).
pub trait Fact {
    /// Name of the concrete type, used in errors and object type checks.
    fn type_name(&self) -> &'static str;

    /// Declared type of a field, `None` if there is no such field.
    fn field_type(&self, field: &str) -> Option<RuntimeType>;

    /// Current value of a field, `None` if there is no such field.
    fn field(&self, field: &str) -> Option<Value>;

    /// Stores a value into a field.
    ///
    /// # Errors
    /// Returns `AttributeNotFound` if the field does not exist.
    fn set_field(&mut self, field: &str, value: Value) -> Result<(), FactError>;

    /// Signature of a method, `None` if there is no such method.
    fn method(&self, _name: &str) -> Option<MethodSignature> {
        None
    }

    /// Invokes a method. Returned vectors longer than one are rejected by
    /// the resolver.
    ///
    /// # Errors
    /// Returns `MethodNotFound` for unknown methods, or `MethodFailed` when
    /// the method itself fails.
    fn call(&mut self, name: &str, _args: Vec<Value>) -> Result<Vec<Value>, FactError> {
        Err(FactError::MethodNotFound {
            type_name: self.type_name().to_string(),
            method: name.to_string(),
        })
    }
}

/// Builds the error for a field a fact does not have.
#[must_use]
pub fn unknown_field(fact: &(impl Fact + ?Sized), field: &str) -> FactError {
    FactError::AttributeNotFound {
        type_name: fact.type_name().to_string(),
        attribute: field.to_string(),
    }
}
