//! Built-in demonstration model: project risk
//!
//! Two inputs, `proj_funding` (0..100) and `exp_level` (0..60), and one
//! output, `risk` (0..100), tied together by five rules.

use crate::error::FuzzyResult;
use crate::inference::CrispValues;
use crate::membership::Shape;
use crate::rule::{Operator, Rule};
use crate::system::{FuzzySystem, FuzzySystemBuilder};
use crate::variable::Role;

pub const NAME: &str = "test_case";
pub const DESCRIPTION: &str = "Predefined system for testing.";

/// Builder preloaded with the demonstration model
pub fn builder() -> FuzzyResult<FuzzySystemBuilder> {
    let mut b = FuzzySystem::builder(NAME).description(DESCRIPTION);

    b.add_variable("proj_funding", Role::Input, (0.0, 100.0))?
        .add_variable("exp_level", Role::Input, (0.0, 60.0))?
        .add_variable("risk", Role::Output, (0.0, 100.0))?;

    b.add_fuzzy_set("proj_funding", "very_low", Shape::Trapezoidal, vec![0.0, 0.0, 10.0, 30.0])?
        .add_fuzzy_set("proj_funding", "low", Shape::Trapezoidal, vec![10.0, 30.0, 40.0, 60.0])?
        .add_fuzzy_set("proj_funding", "medium", Shape::Trapezoidal, vec![40.0, 60.0, 70.0, 90.0])?
        .add_fuzzy_set("proj_funding", "high", Shape::Trapezoidal, vec![70.0, 90.0, 100.0, 100.0])?;

    b.add_fuzzy_set("exp_level", "beginner", Shape::Triangular, vec![0.0, 15.0, 30.0])?
        .add_fuzzy_set("exp_level", "intermediate", Shape::Triangular, vec![15.0, 30.0, 45.0])?
        .add_fuzzy_set("exp_level", "expert", Shape::Triangular, vec![30.0, 60.0, 60.0])?;

    b.add_fuzzy_set("risk", "low", Shape::Triangular, vec![0.0, 25.0, 50.0])?
        .add_fuzzy_set("risk", "normal", Shape::Triangular, vec![25.0, 50.0, 75.0])?
        .add_fuzzy_set("risk", "high", Shape::Triangular, vec![50.0, 100.0, 100.0])?;

    b.add_rule(
        Rule::when("proj_funding", "high", Operator::Or)
            .or("exp_level", "expert")
            .then("risk", "low"),
    )?
    .add_rule(
        Rule::when("proj_funding", "medium", Operator::And)
            .and("exp_level", "intermediate")
            .then("risk", "normal"),
    )?
    .add_rule(
        Rule::when("proj_funding", "medium", Operator::And)
            .and("exp_level", "beginner")
            .then("risk", "normal"),
    )?
    .add_rule(
        Rule::when("proj_funding", "low", Operator::And)
            .and("exp_level", "beginner")
            .then("risk", "high"),
    )?
    .add_rule(
        Rule::when("proj_funding", "very_low", Operator::AndNot)
            .and_not("exp_level", "expert")
            .then("risk", "high"),
    )?;

    Ok(b)
}

/// The demonstration model, built
pub fn system() -> FuzzyResult<FuzzySystem> {
    builder()?.build()
}

/// Inputs the demonstration runs with by default
pub fn default_inputs() -> CrispValues {
    let mut inputs = CrispValues::new();
    inputs.insert("proj_funding".to_string(), 50.0);
    inputs.insert("exp_level".to_string(), 40.0);
    inputs
}
