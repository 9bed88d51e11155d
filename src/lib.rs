//! # chainrule - forward-chaining rule engine core
//!
//! chainrule runs condition/action rules against a store of application
//! objects until nothing changes any more, a rule halts the run, or a pass
//! budget runs out. Rule scripts reach into the objects with dotted paths
//! such as `User.Address.City` or `User.SetName("x")`.
//!
//! ## Core Concepts
//!
//! - **Fact**: a named, mutable object implementing [`Fact`]
//! - **FactStore**: the named facts of one run, with retraction and change tracking
//! - **Rule**: salience, condition and actions
//! - **KnowledgeBase**: the ordered rules of one ruleset version
//! - **Engine**: the execution cycle driver
//!
//! ## Usage
//!
//! ```rust,ignore
//! use chainrule::{fact_ref, Engine, FactStore, KnowledgeBase, Rule, Value};
//!
//! let user = fact_ref(User { name: "Watson".into() });
//! let mut store = FactStore::new();
//! store.add("User", user.clone())?;
//!
//! let kb = KnowledgeBase::new("Test", "0.1.1").with_rule(
//!     Rule::builder("UserTestRule")
//!         .salience(10)
//!         .when(|f| Ok(f.exec_method("User.GetName", vec![])? == Value::from("Watson")))
//!         .then(|f| {
//!             f.exec_method("User.SetName", vec!["FromRuleScope".into()])?;
//!             Ok(())
//!         })
//!         .then_retract_self()
//!         .build()?,
//! )?;
//!
//! let report = Engine::with_max_cycle(5).execute(&mut store, &kb)?;
//! assert!(report.converged());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod engine;
pub mod error;
pub mod fact;
pub mod knowledge;
pub mod resolver;
pub mod rule;
pub mod store;
pub mod value;

// Re-export primary types at crate root for convenience
pub use config::{EngineConfig, ErrorPolicy};
pub use engine::{Engine, ExecutionId, ExecutionListener, ExecutionReport, Outcome};
pub use error::{EngineError, EngineResult, ExecutionError, FactError, ValidationError};
pub use fact::{fact_ref, unknown_field, Fact, FactRef, MethodSignature};
pub use knowledge::KnowledgeBase;
pub use resolver::FactPath;
pub use rule::{Action, Condition, Rule, RuleBuilder};
pub use store::FactStore;
pub use value::{Kind, RuntimeType, Value};
