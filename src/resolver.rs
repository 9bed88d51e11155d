//! Path resolution over fact objects.
//!
//! Each function consumes one path segment, resolves it against the current
//! object and recurses on the result, so an N-segment path performs N single
//! step resolutions. Nothing here holds state; every mutation lands on the
//! caller-owned objects through [`Fact::set_field`] and [`Fact::call`].

use std::cell::{Ref, RefMut};
use std::rc::Rc;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::FactError;
use crate::fact::{Fact, FactRef, MethodSignature};
use crate::value::{Kind, RuntimeType, Value};

static IDENTIFIER: OnceLock<Regex> = OnceLock::new();

/// Returns true if `s` is a valid fact, field, method or rule name.
pub fn is_identifier(s: &str) -> bool {
    IDENTIFIER
        .get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier regex is valid"))
        .is_match(s)
}

/// A dotted path split into the fact name and the segments after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactPath<'a> {
    /// Name of the fact the path starts from.
    pub fact: &'a str,
    /// Field and method names following the fact name.
    pub segments: Vec<&'a str>,
}

impl<'a> FactPath<'a> {
    /// Parses a field path such as `User.Address.City`.
    ///
    /// Every segment must be an identifier.
    ///
    /// # Errors
    /// Returns `InvalidPath` for empty or malformed segments, including a
    /// trailing `()`.
    pub fn parse(path: &'a str) -> Result<Self, FactError> {
        Self::split(path, path.trim())
    }

    /// Parses a method path such as `User.GetName()`.
    ///
    /// Like [`parse`](Self::parse), but a trailing `()` on the last segment
    /// is accepted and stripped.
    ///
    /// # Errors
    /// Returns `InvalidPath` for empty or malformed segments.
    pub fn parse_call(path: &'a str) -> Result<Self, FactError> {
        let trimmed = path.trim();
        Self::split(path, trimmed.strip_suffix("()").unwrap_or(trimmed))
    }

    fn split(path: &str, trimmed: &'a str) -> Result<Self, FactError> {
        let mut parts = trimmed.split('.');
        let fact = parts.next().unwrap_or_default();
        let segments: Vec<&str> = parts.collect();

        for part in std::iter::once(fact).chain(segments.iter().copied()) {
            if !is_identifier(part) {
                return Err(FactError::InvalidPath {
                    path: path.to_string(),
                    reason: if part.is_empty() {
                        "empty segment".to_string()
                    } else {
                        format!("'{part}' is not an identifier")
                    },
                });
            }
        }

        Ok(Self { fact, segments })
    }
}

fn borrow(obj: &FactRef) -> Result<Ref<'_, dyn Fact + 'static>, FactError> {
    obj.try_borrow().map_err(|_| FactError::FactInUse)
}

fn borrow_mut(obj: &FactRef) -> Result<RefMut<'_, dyn Fact + 'static>, FactError> {
    obj.try_borrow_mut().map_err(|_| FactError::FactInUse)
}

/// Reads `segment` from `obj` and requires it to be another object.
fn step(obj: &FactRef, segment: &str) -> Result<FactRef, FactError> {
    let fact = borrow(obj)?;
    match fact.field(segment) {
        Some(Value::Object(next)) => Ok(next),
        _ => Err(FactError::AttributeNotFound {
            type_name: fact.type_name().to_string(),
            attribute: segment.to_string(),
        }),
    }
}

/// Declared type at the end of `path`, or the object's own type when the
/// path is empty.
///
/// # Errors
/// Returns `AttributeNotFound` if any segment does not name a field.
pub fn resolve_type(obj: &FactRef, path: &[&str]) -> Result<RuntimeType, FactError> {
    match path {
        [] => Ok(RuntimeType::Object(borrow(obj)?.type_name())),
        [field] => {
            let fact = borrow(obj)?;
            let declared = fact.field_type(field);
            declared.ok_or_else(|| crate::fact::unknown_field(&*fact, field))
        }
        [head, rest @ ..] => resolve_type(&step(obj, head)?, rest),
    }
}

/// Value at the end of `path`, or the object itself when the path is empty.
///
/// Object values come back as live handles.
///
/// # Errors
/// Returns `AttributeNotFound` if any segment does not name a field.
pub fn resolve_value(obj: &FactRef, path: &[&str]) -> Result<Value, FactError> {
    match path {
        [] => Ok(Value::Object(Rc::clone(obj))),
        [field] => {
            let fact = borrow(obj)?;
            let value = fact.field(field);
            value.ok_or_else(|| crate::fact::unknown_field(&*fact, field))
        }
        [head, rest @ ..] => resolve_value(&step(obj, head)?, rest),
    }
}

/// Writes `value` into the field named by the last segment of `path`.
///
/// # Errors
/// Returns `NoPathSpecified` for an empty path, `AttributeNotFound` for an
/// unknown field and `TypeMismatch` when the field does not accept the value.
pub fn assign_value(obj: &FactRef, path: &[&str], value: Value) -> Result<(), FactError> {
    match path {
        [] => Err(FactError::NoPathSpecified {
            fact: borrow(obj)?.type_name().to_string(),
        }),
        [field] => {
            // Released before checking `value`, which may be this very object.
            let (type_name, declared) = {
                let fact = borrow(obj)?;
                (fact.type_name(), fact.field_type(field))
            };
            let declared = declared.ok_or_else(|| FactError::AttributeNotFound {
                type_name: type_name.to_string(),
                attribute: (*field).to_string(),
            })?;
            if !declared.accepts(&value) {
                return Err(FactError::TypeMismatch {
                    type_name: type_name.to_string(),
                    attribute: (*field).to_string(),
                    expected: declared.to_string(),
                    actual: value.kind(),
                });
            }
            borrow_mut(obj)?.set_field(field, value)
        }
        [head, rest @ ..] => assign_value(&step(obj, head)?, rest, value),
    }
}

/// Calls the method named by the last segment of `path`.
///
/// Returns `Value::Null` for methods without a return value.
///
/// # Errors
/// Returns `NoPathSpecified`, `AttributeNotFound`, `MethodNotFound`,
/// `ArgumentCountMismatch`, `ArgumentTypeMismatch` or
/// `UnsupportedMultiReturn`, or whatever the method itself fails with.
pub fn invoke_method(obj: &FactRef, path: &[&str], args: Vec<Value>) -> Result<Value, FactError> {
    match path {
        [] => Err(FactError::NoPathSpecified {
            fact: borrow(obj)?.type_name().to_string(),
        }),
        [method] => call_method(obj, method, args),
        [head, rest @ ..] => invoke_method(&step(obj, head)?, rest, args),
    }
}

fn call_method(obj: &FactRef, method: &str, args: Vec<Value>) -> Result<Value, FactError> {
    let (type_name, signature) = {
        let fact = borrow(obj)?;
        (fact.type_name(), fact.method(method))
    };
    let signature = signature.ok_or_else(|| FactError::MethodNotFound {
        type_name: type_name.to_string(),
        method: method.to_string(),
    })?;

    check_arguments(method, &signature, &args)?;
    if signature.returns > 1 {
        return Err(FactError::UnsupportedMultiReturn {
            method: method.to_string(),
            count: signature.returns,
        });
    }

    let mut returned = borrow_mut(obj)?.call(method, args)?;
    match returned.len() {
        0 => Ok(Value::Null),
        1 => Ok(returned.pop().unwrap_or_default()),
        count => Err(FactError::UnsupportedMultiReturn {
            method: method.to_string(),
            count,
        }),
    }
}

fn kinds_match(declared: Kind, actual: Kind) -> bool {
    declared == Kind::Any || declared == actual
}

/// Checks argument count and kinds against a method signature.
///
/// # Errors
/// Returns `ArgumentCountMismatch` or `ArgumentTypeMismatch`.
pub fn check_arguments(
    method: &str,
    signature: &MethodSignature,
    args: &[Value],
) -> Result<(), FactError> {
    let fixed = signature.params.len();
    let count_ok = if signature.is_variadic() {
        args.len() >= fixed
    } else {
        args.len() == fixed
    };
    if !count_ok {
        return Err(FactError::ArgumentCountMismatch {
            method: method.to_string(),
            expected: fixed,
            actual: args.len(),
        });
    }

    // Non-variadic calls never reach the repeated tail.
    let variadic = signature.variadic.clone().unwrap_or(RuntimeType::Any);
    let declared = signature.params.iter().chain(std::iter::repeat(&variadic));
    for (index, (param, arg)) in declared.zip(args).enumerate() {
        if !kinds_match(param.kind(), arg.kind()) {
            return Err(FactError::ArgumentTypeMismatch {
                method: method.to_string(),
                index,
                expected: param.kind(),
                actual: arg.kind(),
            });
        }
    }
    Ok(())
}
