//! Dynamic values flowing through rule conditions and actions.
//!
//! `Value` is what the path resolver reads out of facts and writes back into
//! them. `RuntimeType` describes what a field or method parameter declares,
//! and `Kind` is the coarse classification used when checking arguments.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::fact::{Fact, FactRef};

/// Coarse classification of a value or declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    Null,
    Bool,
    Int,
    Float,
    String,
    List,
    Object,
    /// Declared "accept anything" parameter or field.
    Any,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::String => "string",
            Self::List => "list",
            Self::Object => "object",
            Self::Any => "any",
        };
        f.write_str(name)
    }
}

/// Declared type of a fact field or method parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RuntimeType {
    Null,
    Bool,
    Int,
    Float,
    String,
    List(Box<RuntimeType>),
    /// A fact object of the named type.
    Object(&'static str),
    Any,
}

impl RuntimeType {
    /// Creates a list type with the given element type.
    #[must_use]
    pub fn list_of(element: Self) -> Self {
        Self::List(Box::new(element))
    }

    #[must_use]
    pub const fn kind(&self) -> Kind {
        match self {
            Self::Null => Kind::Null,
            Self::Bool => Kind::Bool,
            Self::Int => Kind::Int,
            Self::Float => Kind::Float,
            Self::String => Kind::String,
            Self::List(_) => Kind::List,
            Self::Object(_) => Kind::Object,
            Self::Any => Kind::Any,
        }
    }

    /// Returns true if `value` may be stored in a slot of this type.
    ///
    /// Object slots also accept `Null`, which clears the reference.
    #[must_use]
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::Any, _) => true,
            (Self::List(element), Value::List(items)) => items.iter().all(|v| element.accepts(v)),
            (Self::Object(_), Value::Null) => true,
            (Self::Object(name), Value::Object(obj)) => obj
                .try_borrow()
                .map_or(false, |fact| fact.type_name() == *name),
            (expected, actual) => expected.kind() == actual.kind(),
        }
    }
}

impl fmt::Display for RuntimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List(element) => write!(f, "list<{element}>"),
            Self::Object(name) => write!(f, "{name}"),
            other => write!(f, "{}", other.kind()),
        }
    }
}

/// A dynamic value.
///
/// `Object` carries a live handle: reads and writes through it reach the same
/// instance the caller holds.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Object(FactRef),
}

impl Value {
    #[must_use]
    pub const fn kind(&self) -> Kind {
        match self {
            Self::Null => Kind::Null,
            Self::Bool(_) => Kind::Bool,
            Self::Int(_) => Kind::Int,
            Self::Float(_) => Kind::Float,
            Self::String(_) => Kind::String,
            Self::List(_) => Kind::List,
            Self::Object(_) => Kind::Object,
        }
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub const fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Integers widen to floats.
    #[allow(clippy::cast_precision_loss)]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    pub const fn as_object(&self) -> Option<&FactRef> {
        match self {
            Self::Object(v) => Some(v),
            _ => None,
        }
    }

    /// Consumes the value, returning the owned string if it is one.
    pub fn into_string(self) -> Option<String> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    /// Consumes the value, returning the object handle if it is one.
    pub fn into_object(self) -> Option<FactRef> {
        match self {
            Self::Object(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "Null"),
            Self::Bool(v) => write!(f, "Bool({v})"),
            Self::Int(v) => write!(f, "Int({v})"),
            Self::Float(v) => write!(f, "Float({v})"),
            Self::String(v) => write!(f, "String({v:?})"),
            Self::List(v) => f.debug_tuple("List").field(v).finish(),
            Self::Object(obj) => match obj.try_borrow() {
                Ok(fact) => write!(f, "Object({})", fact.type_name()),
                Err(_) => write!(f, "Object(<borrowed>)"),
            },
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(v) => write!(f, "{v:?}"),
            Self::List(v) => write!(f, "list[{}]", v.len()),
            Self::Object(_) => write!(f, "{self:?}"),
        }
    }
}

/// Objects compare by identity, everything else by value.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::List(v)
    }
}

impl<T: Fact + 'static> From<Rc<std::cell::RefCell<T>>> for Value {
    fn from(v: Rc<std::cell::RefCell<T>>) -> Self {
        let obj: FactRef = v;
        Self::Object(obj)
    }
}

impl From<FactRef> for Value {
    fn from(v: FactRef) -> Self {
        Self::Object(v)
    }
}
