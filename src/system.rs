//! Fuzzy system model and its builder
//!
//! [`FuzzySystemBuilder`] accumulates variables, fuzzy sets and rules,
//! rejecting bad definitions as they arrive. [`FuzzySystemBuilder::build`]
//! checks the cross references that can only be verified once the model is
//! complete and freezes everything into a [`FuzzySystem`], which is
//! read-only from then on. Evaluation lives in [`crate::inference`].

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::error::{ErrorCode, FuzzyError, FuzzyResult};
use crate::inference::CrispValues;
use crate::membership::{MembershipFunction, Shape};
use crate::rule::Rule;
use crate::variable::{Role, Variable};

/// An immutable fuzzy inference model
#[derive(Debug, Clone)]
pub struct FuzzySystem {
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) variables: IndexMap<String, Variable>,
    pub(crate) rules: Vec<Rule>,
}

impl FuzzySystem {
    /// Start building a model
    pub fn builder(name: impl Into<String>) -> FuzzySystemBuilder {
        FuzzySystemBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.variables.values()
    }

    pub fn inputs(&self) -> impl Iterator<Item = &Variable> {
        self.variables.values().filter(|v| v.role() == Role::Input)
    }

    pub fn outputs(&self) -> impl Iterator<Item = &Variable> {
        self.variables.values().filter(|v| v.role() == Role::Output)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// INPUT variables that have no value in `inputs`
    pub fn missing_inputs(&self, inputs: &CrispValues) -> Vec<&str> {
        self.inputs()
            .filter(|v| !inputs.contains_key(v.name()))
            .map(Variable::name)
            .collect()
    }
}

/// Builder for [`FuzzySystem`]
#[derive(Debug, Clone)]
pub struct FuzzySystemBuilder {
    name: String,
    description: String,
    variables: IndexMap<String, Variable>,
    rules: Vec<Rule>,
    strict_operators: bool,
}

impl FuzzySystemBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            variables: IndexMap::new(),
            rules: Vec::new(),
            strict_operators: false,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Reject unrecognized operator tokens in `add_rule` instead of
    /// evaluating them as `and`
    pub fn strict_operators(mut self, strict: bool) -> Self {
        self.strict_operators = strict;
        self
    }

    /// Declare a variable
    pub fn add_variable(
        &mut self,
        name: impl Into<String>,
        role: Role,
        range: (f64, f64),
    ) -> FuzzyResult<&mut Self> {
        let variable = Variable::new(name, role, range)?;
        if self.variables.contains_key(variable.name()) {
            return Err(FuzzyError::duplicate_variable(variable.name()));
        }
        debug!(variable = variable.name(), role = %role, "declared variable");
        self.variables.insert(variable.name().to_string(), variable);
        Ok(self)
    }

    /// Attach a fuzzy set to a declared variable
    pub fn add_fuzzy_set(
        &mut self,
        variable: &str,
        set: impl Into<String>,
        shape: Shape,
        parameters: Vec<f64>,
    ) -> FuzzyResult<&mut Self> {
        let owner = self.variables.get_mut(variable).ok_or_else(|| {
            FuzzyError::undefined_variable(variable)
                .with_hint("Declare the variable before adding fuzzy sets to it")
        })?;
        let set = MembershipFunction::new(set, shape, parameters)?;
        owner.add_fuzzy_set(set)?;
        Ok(self)
    }

    /// Append a rule
    pub fn add_rule(&mut self, rule: Rule) -> FuzzyResult<&mut Self> {
        if self.strict_operators {
            if let Some(clause) = rule.antecedents.iter().find(|c| !c.operator.is_recognized()) {
                return Err(FuzzyError::unrecognized_operator(clause.operator.as_str())
                    .with_context("rule", rule.label(self.rules.len())));
            }
        }
        self.rules.push(rule);
        Ok(self)
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Verify rule references and freeze the model.
    ///
    /// Consequents must name an OUTPUT variable and one of its sets, since
    /// defuzzification needs that set's shape. Antecedents are looked up
    /// leniently at run time (a missing variable or set reads as degree 0),
    /// so unknown names there are only warned about.
    pub fn build(self) -> FuzzyResult<FuzzySystem> {
        for (index, rule) in self.rules.iter().enumerate() {
            let label = rule.label(index);
            let target = &rule.consequent;
            let variable = self.variables.get(&target.variable).ok_or_else(|| {
                FuzzyError::undefined_variable(&target.variable).with_context("rule", &label)
            })?;

            if variable.role() != Role::Output {
                return Err(FuzzyError::new(
                    ErrorCode::InvalidRole,
                    format!(
                        "Rule '{}' concludes on '{}', which is not an OUT variable",
                        label, target.variable
                    ),
                )
                .with_context("rule", &label)
                .with_context("variable", &target.variable));
            }

            if variable.fuzzy_set(&target.set).is_none() {
                return Err(FuzzyError::undefined_fuzzy_set(&target.variable, &target.set)
                    .with_context("rule", &label));
            }

            for clause in &rule.antecedents {
                match self.variables.get(&clause.variable) {
                    None => warn!(
                        rule = %label,
                        variable = %clause.variable,
                        "antecedent refers to an undeclared variable; it will read as 0"
                    ),
                    Some(v) if v.fuzzy_set(&clause.set).is_none() => warn!(
                        rule = %label,
                        variable = %clause.variable,
                        set = %clause.set,
                        "antecedent refers to an undeclared fuzzy set; it will read as 0"
                    ),
                    Some(_) => {}
                }
            }
        }

        debug!(
            system = %self.name,
            variables = self.variables.len(),
            rules = self.rules.len(),
            "built fuzzy system"
        );

        Ok(FuzzySystem {
            name: self.name,
            description: self.description,
            variables: self.variables,
            rules: self.rules,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::Operator;

    fn base() -> FuzzySystemBuilder {
        let mut b = FuzzySystem::builder("tipping").description("service to tip");
        b.add_variable("service", Role::Input, (0.0, 10.0)).unwrap();
        b.add_variable("tip", Role::Output, (0.0, 30.0)).unwrap();
        b.add_fuzzy_set("service", "poor", Shape::Triangular, vec![0.0, 0.0, 5.0])
            .unwrap();
        b.add_fuzzy_set("service", "good", Shape::Triangular, vec![5.0, 10.0, 10.0])
            .unwrap();
        b.add_fuzzy_set("tip", "cheap", Shape::Triangular, vec![0.0, 5.0, 10.0])
            .unwrap();
        b.add_fuzzy_set("tip", "generous", Shape::Trapezoidal, vec![15.0, 20.0, 25.0, 30.0])
            .unwrap();
        b
    }

    #[test]
    fn test_build_and_inspect() {
        let mut b = base();
        b.add_rule(Rule::when("service", "good", Operator::And).then("tip", "generous"))
            .unwrap();
        let system = b.build().unwrap();

        assert_eq!(system.name(), "tipping");
        assert_eq!(system.description(), "service to tip");
        assert_eq!(system.inputs().count(), 1);
        assert_eq!(system.outputs().next().map(Variable::name), Some("tip"));
        assert_eq!(system.rules().len(), 1);
        assert_eq!(system.variable("service").map(Variable::len), Some(2));
    }

    #[test]
    fn test_duplicate_variable_rejected() {
        let mut b = base();
        let err = b.add_variable("tip", Role::Output, (0.0, 1.0)).unwrap_err();
        assert_eq!(err.code, ErrorCode::DuplicateVariable);
    }

    #[test]
    fn test_fuzzy_set_on_unknown_variable_rejected() {
        let mut b = base();
        let err = b
            .add_fuzzy_set("food", "bland", Shape::Triangular, vec![0.0, 1.0, 2.0])
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::UndefinedVariable);
        assert_eq!(err.context_field("variable"), Some("food"));
    }

    #[test]
    fn test_malformed_set_rejected_at_construction() {
        let mut b = base();
        let err = b
            .add_fuzzy_set("service", "ok", Shape::Trapezoidal, vec![1.0, 2.0, 3.0])
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::MalformedMembershipFunction);
        assert!(b.variable("service").unwrap().fuzzy_set("ok").is_none());
    }

    #[test]
    fn test_consequent_must_be_declared_output_set() {
        let mut b = base();
        b.add_rule(Rule::when("service", "poor", Operator::And).then("tip", "zero"))
            .unwrap();
        assert_eq!(b.build().unwrap_err().code, ErrorCode::UndefinedFuzzySet);

        let mut b = base();
        b.add_rule(Rule::when("service", "poor", Operator::And).then("mood", "sad"))
            .unwrap();
        assert_eq!(b.build().unwrap_err().code, ErrorCode::UndefinedVariable);

        let mut b = base();
        b.add_rule(Rule::when("service", "poor", Operator::And).then("service", "good"))
            .unwrap();
        assert_eq!(b.build().unwrap_err().code, ErrorCode::InvalidRole);
    }

    #[test]
    fn test_lenient_antecedents_still_build() {
        let mut b = base();
        b.add_rule(Rule::when("food", "bland", Operator::And).then("tip", "cheap"))
            .unwrap();
        assert!(b.build().is_ok());
    }

    #[test]
    fn test_strict_operators() {
        let rule = Rule::when("service", "good", Operator::from_token("xor")).then("tip", "cheap");

        let mut lenient = base();
        assert!(lenient.add_rule(rule.clone()).is_ok());

        let mut strict = base().strict_operators(true);
        let err = strict.add_rule(rule).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnrecognizedOperator);
        assert_eq!(strict.rule_count(), 0);
    }

    #[test]
    fn test_missing_inputs() {
        let system = base().build().unwrap();
        let mut supplied = CrispValues::new();
        assert_eq!(system.missing_inputs(&supplied), vec!["service"]);
        supplied.insert("service".to_string(), 3.0);
        assert!(system.missing_inputs(&supplied).is_empty());
    }
}
