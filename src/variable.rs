//! Linguistic variables
//!
//! A variable owns its fuzzy sets and fuzzifies crisp values against all of
//! them at once. The declared range is descriptive: values outside it are
//! still fuzzified, they simply fall outside every set's support.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{ErrorCode, FuzzyError, FuzzyResult};
use crate::membership::MembershipFunction;

/// Whether a variable is read from the inputs or produced by the rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Input,
    Output,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Input => "IN",
            Role::Output => "OUT",
        }
    }

    pub fn from_token(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "in" | "input" => Some(Role::Input),
            "out" | "output" => Some(Role::Output),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named variable with its fuzzy sets
#[derive(Debug, Clone)]
pub struct Variable {
    name: String,
    role: Role,
    range: (f64, f64),
    sets: IndexMap<String, MembershipFunction>,
}

impl Variable {
    /// Create a variable with no fuzzy sets.
    ///
    /// The range bounds must be finite and ordered.
    pub fn new(name: impl Into<String>, role: Role, range: (f64, f64)) -> FuzzyResult<Self> {
        let name = name.into();
        let (lower, upper) = range;
        if !lower.is_finite() || !upper.is_finite() || lower > upper {
            return Err(FuzzyError::new(
                ErrorCode::InvalidRange,
                format!("Invalid range [{}, {}] for variable '{}'", lower, upper, name),
            )
            .with_context("variable", &name)
            .with_hint("Use [lower, upper] with lower <= upper"));
        }

        Ok(Self {
            name,
            role,
            range,
            sets: IndexMap::new(),
        })
    }

    /// Attach a fuzzy set; names must be unique within the variable
    pub fn add_fuzzy_set(&mut self, set: MembershipFunction) -> FuzzyResult<()> {
        if self.sets.contains_key(set.name()) {
            return Err(FuzzyError::duplicate_fuzzy_set(&self.name, set.name()));
        }
        self.sets.insert(set.name().to_string(), set);
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    pub fn fuzzy_set(&self, name: &str) -> Option<&MembershipFunction> {
        self.sets.get(name)
    }

    pub fn fuzzy_sets(&self) -> impl Iterator<Item = &MembershipFunction> {
        self.sets.values()
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Fuzzify a crisp value against every owned set
    pub fn fuzzify(&self, value: f64) -> IndexMap<String, f64> {
        self.sets
            .iter()
            .map(|(name, set)| (name.clone(), set.fuzzify(value)))
            .collect()
    }

    /// The set with the highest degree for a value (first wins on ties)
    pub fn dominant_set(&self, value: f64) -> Option<(&str, f64)> {
        let mut best: Option<(&str, f64)> = None;
        for set in self.fuzzy_sets() {
            let degree = set.fuzzify(value);
            match best {
                Some((_, d)) if d >= degree => {}
                _ => best = Some((set.name(), degree)),
            }
        }
        best
    }
}
