//! mamdani - Mamdani fuzzy inference
//!
//! A small engine for rule-based fuzzy models: named linguistic variables
//! carry triangular or trapezoidal fuzzy sets, rules combine clauses with
//! `and` / `or` / `and_not`, and evaluation maps crisp inputs to crisp
//! outputs through fuzzification, min/max rule firing, max aggregation and
//! centroid defuzzification.
//!
//! # Architecture
//!
//! - [`membership`] - membership function shapes and their evaluation
//! - [`variable`] - linguistic variables owning named fuzzy sets
//! - [`rule`] - antecedents, consequents and the clause operators
//! - [`system`] - the immutable model and its builder
//! - [`inference`] - the evaluation pipeline and run reports
//! - [`parser`] - one-line textual definitions for variables, sets and rules
//! - [`config`] - TOML and environment configuration for the CLI
//! - [`demo`] - the built-in project risk model
//!
//! # Example
//!
//! ```rust
//! use mamdani::{CrispValues, FuzzySystem, Operator, Role, Rule, Shape};
//!
//! let mut b = FuzzySystem::builder("heater");
//! b.add_variable("temp", Role::Input, (0.0, 40.0)).unwrap()
//!     .add_variable("power", Role::Output, (0.0, 100.0)).unwrap();
//! b.add_fuzzy_set("temp", "cold", Shape::Triangular, vec![0.0, 0.0, 20.0]).unwrap()
//!     .add_fuzzy_set("power", "high", Shape::Triangular, vec![50.0, 100.0, 100.0]).unwrap();
//! b.add_rule(Rule::when("temp", "cold", Operator::And).then("power", "high")).unwrap();
//! let system = b.build().unwrap();
//!
//! let mut inputs = CrispValues::new();
//! inputs.insert("temp".to_string(), 5.0);
//! let outputs = system.run(&inputs).unwrap();
//! assert!((outputs["power"] - 250.0 / 3.0).abs() < 1e-9);
//! ```

pub mod config;
pub mod demo;
pub mod error;
pub mod inference;
pub mod membership;
pub mod parser;
pub mod rule;
pub mod system;
pub mod variable;

// Re-export model types
pub use membership::{MembershipFunction, Shape};
pub use rule::{combine, Antecedent, Consequent, Operator, Rule, RuleBuilder};
pub use system::{FuzzySystem, FuzzySystemBuilder};
pub use variable::{Role, Variable};

// Re-export evaluation types
pub use inference::{
    aggregate, firing_strength, CrispValues, DegreeTable, Diagnostic, InferenceReport, RuleFiring,
};

// Re-export parsing
pub use parser::{
    parse_assignment, parse_fuzzy_set, parse_rule, parse_variable, FuzzySetDef, ParseError,
    VariableDef,
};

// Re-export configuration and errors
pub use config::{ConfigError, EngineConfig, GeneralConfig, LogLevel, MamdaniConfig, OutputFormat};
pub use error::{ErrorCategory, ErrorCode, ErrorContext, FuzzyError, FuzzyResult};
