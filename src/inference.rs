//! Mamdani inference
//!
//! Evaluation is a straight pipeline over an immutable [`FuzzySystem`]:
//!
//! 1. fuzzify every supplied crisp input against all sets of its variable
//! 2. fold each rule's antecedents into a firing strength
//! 3. aggregate strengths per (output variable, set) with `max`
//! 4. defuzzify each output variable with a weighted average of set centroids
//!
//! Only step 1 can fail. Lookups that miss later on read as 0.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::error::{FuzzyError, FuzzyResult};
use crate::rule::{combine, Antecedent, Consequent, Rule};
use crate::system::FuzzySystem;

/// Variable name to crisp value
pub type CrispValues = IndexMap<String, f64>;

/// Variable name to (set name to degree)
pub type DegreeTable = IndexMap<String, IndexMap<String, f64>>;

/// Non-fatal findings made while evaluating rules
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// Operator token outside {and, or, and_not}; evaluated as `and`
    UnrecognizedOperator { rule: String, operator: String },
    /// Antecedent variable has no fuzzified value in this run; read as 0
    MissingAntecedentInput { rule: String, variable: String },
}

/// Firing strength of one rule in one run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleFiring {
    pub rule: String,
    pub strength: f64,
    pub consequent: Consequent,
}

/// Everything a run computed, in pipeline order
#[derive(Debug, Clone, Default, Serialize)]
pub struct InferenceReport {
    pub fuzzified: DegreeTable,
    pub firings: Vec<RuleFiring>,
    pub aggregated: DegreeTable,
    pub results: CrispValues,
    pub diagnostics: Vec<Diagnostic>,
}

impl InferenceReport {
    pub fn result(&self, variable: &str) -> Option<f64> {
        self.results.get(variable).copied()
    }
}

/// Degree of one clause, defaulting to 0 when the variable or set is absent
fn clause_degree(fuzzified: &DegreeTable, clause: &Antecedent) -> f64 {
    fuzzified
        .get(&clause.variable)
        .and_then(|sets| sets.get(&clause.set))
        .copied()
        .unwrap_or(0.0)
}

/// Left fold of the rule's clauses, starting from 1.
///
/// Each clause folds in with its own operator, so a leading `or` clause
/// leaves the accumulator at 1 no matter its degree.
pub fn firing_strength(rule: &Rule, fuzzified: &DegreeTable) -> f64 {
    rule.antecedents.iter().fold(1.0, |acc, clause| {
        combine(acc, clause_degree(fuzzified, clause), &clause.operator)
    })
}

/// Max-aggregate rule strengths per (output variable, output set)
pub fn aggregate<'a, I>(firings: I) -> DegreeTable
where
    I: IntoIterator<Item = (&'a Consequent, f64)>,
{
    let mut aggregated = DegreeTable::new();
    for (target, strength) in firings {
        let degree = aggregated
            .entry(target.variable.clone())
            .or_default()
            .entry(target.set.clone())
            .or_insert(0.0);
        *degree = degree.max(strength);
    }
    aggregated
}

fn diagnose(rule: &Rule, label: &str, fuzzified: &DegreeTable) -> Vec<Diagnostic> {
    let mut found = Vec::new();
    for clause in &rule.antecedents {
        if !clause.operator.is_recognized() {
            warn!(
                rule = %label,
                operator = %clause.operator,
                "Unknown operator: {}. Defaulting to 'and'.",
                clause.operator
            );
            found.push(Diagnostic::UnrecognizedOperator {
                rule: label.to_string(),
                operator: clause.operator.as_str().to_string(),
            });
        }
        match fuzzified.get(&clause.variable) {
            None => {
                debug!(rule = %label, variable = %clause.variable, "no input for antecedent, reading 0");
                found.push(Diagnostic::MissingAntecedentInput {
                    rule: label.to_string(),
                    variable: clause.variable.clone(),
                });
            }
            Some(sets) if !sets.contains_key(&clause.set) => {
                debug!(rule = %label, variable = %clause.variable, set = %clause.set, "unknown set, reading 0");
            }
            Some(_) => {}
        }
    }
    found
}

impl FuzzySystem {
    /// Fuzzify the supplied inputs.
    ///
    /// Fails on the first name that is not a declared variable, or on a
    /// value that is not finite; nothing is returned in that case.
    pub fn fuzzify_inputs(&self, inputs: &CrispValues) -> FuzzyResult<DegreeTable> {
        let mut fuzzified = DegreeTable::with_capacity(inputs.len());
        for (name, value) in inputs {
            let variable = self
                .variables
                .get(name)
                .ok_or_else(|| FuzzyError::undefined_variable(name))?;
            if !value.is_finite() {
                return Err(FuzzyError::invalid_input(name, *value));
            }
            fuzzified.insert(name.clone(), variable.fuzzify(*value));
        }
        Ok(fuzzified)
    }

    /// Weighted average of set centroids per output variable.
    ///
    /// Infinite degrees are skipped. A variable whose degrees sum to 0
    /// reports 0. Entries naming sets the model does not know are ignored.
    pub fn defuzzify(&self, aggregated: &DegreeTable) -> CrispValues {
        let mut results = CrispValues::with_capacity(aggregated.len());
        for (name, degrees) in aggregated {
            let Some(variable) = self.variables.get(name) else {
                debug!(variable = %name, "skipping undeclared output variable");
                continue;
            };

            let mut numerator = 0.0;
            let mut denominator = 0.0;
            for (set_name, degree) in degrees {
                if degree.is_infinite() {
                    continue;
                }
                let Some(set) = variable.fuzzy_set(set_name) else {
                    debug!(variable = %name, set = %set_name, "skipping undeclared output set");
                    continue;
                };
                numerator += degree * set.representative_point();
                denominator += degree;
            }

            let crisp = if denominator > 0.0 {
                numerator / denominator
            } else {
                0.0
            };
            results.insert(name.clone(), crisp);
        }
        results
    }

    /// Run the model and return the crisp outputs
    pub fn run(&self, inputs: &CrispValues) -> FuzzyResult<CrispValues> {
        self.run_detailed(inputs).map(|report| report.results)
    }

    /// Run the model and keep every intermediate table
    pub fn run_detailed(&self, inputs: &CrispValues) -> FuzzyResult<InferenceReport> {
        let fuzzified = self.fuzzify_inputs(inputs)?;

        let mut diagnostics = Vec::new();
        let mut firings = Vec::with_capacity(self.rules.len());
        for (index, rule) in self.rules.iter().enumerate() {
            let label = rule.label(index);
            diagnostics.extend(diagnose(rule, &label, &fuzzified));
            let strength = firing_strength(rule, &fuzzified);
            trace!(rule = %label, strength, "rule fired");
            firings.push(RuleFiring {
                rule: label,
                strength,
                consequent: rule.consequent.clone(),
            });
        }

        let aggregated = aggregate(firings.iter().map(|f| (&f.consequent, f.strength)));
        let results = self.defuzzify(&aggregated);

        debug!(
            system = %self.name,
            inputs = inputs.len(),
            rules = firings.len(),
            outputs = results.len(),
            "simulation complete"
        );

        Ok(InferenceReport {
            fuzzified,
            firings,
            aggregated,
            results,
            diagnostics,
        })
    }
}
