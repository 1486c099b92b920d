//! Fuzzy IF-THEN rules
//!
//! A rule is an ordered list of antecedent clauses and one consequent.
//! Each clause carries the operator that folds its degree into the running
//! firing strength (see [`combine`]); the order of clauses matters.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Operator folding a clause's degree into the accumulated strength
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    /// min(acc, d)
    #[default]
    And,
    /// max(acc, d)
    Or,
    /// min(acc, 1 - d)
    AndNot,
    /// Any other token; evaluated as `And` and reported as a diagnostic
    Unrecognized(String),
}

impl Operator {
    /// Map a token to an operator. Matching is exact and lowercase; any
    /// other token is kept as `Unrecognized` rather than rejected.
    pub fn from_token(s: &str) -> Self {
        match s {
            "and" => Operator::And,
            "or" => Operator::Or,
            "and_not" => Operator::AndNot,
            other => Operator::Unrecognized(other.to_string()),
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Operator::Unrecognized(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Operator::And => "and",
            Operator::Or => "or",
            Operator::AndNot => "and_not",
            Operator::Unrecognized(token) => token,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fold one clause degree into the accumulated firing strength
pub fn combine(acc: f64, degree: f64, op: &Operator) -> f64 {
    match op {
        Operator::And | Operator::Unrecognized(_) => acc.min(degree),
        Operator::Or => acc.max(degree),
        Operator::AndNot => acc.min(1.0 - degree),
    }
}

/// IF-part clause: `<variable> is <set>`, joined by `operator`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Antecedent {
    pub variable: String,
    pub set: String,
    pub operator: Operator,
}

impl Antecedent {
    pub fn new(variable: impl Into<String>, set: impl Into<String>, operator: Operator) -> Self {
        Self {
            variable: variable.into(),
            set: set.into(),
            operator,
        }
    }
}

/// THEN-part: `<variable> is <set>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consequent {
    pub variable: String,
    pub set: String,
}

impl Consequent {
    pub fn new(variable: impl Into<String>, set: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
            set: set.into(),
        }
    }
}

/// A fuzzy rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Optional label, used in diagnostics only
    pub name: Option<String>,
    pub antecedents: Vec<Antecedent>,
    pub consequent: Consequent,
}

impl Rule {
    pub fn new(antecedents: Vec<Antecedent>, consequent: Consequent) -> Self {
        Self {
            name: None,
            antecedents,
            consequent,
        }
    }

    /// Start a rule from its first clause.
    ///
    /// ```rust
    /// use mamdani::{Operator, Rule};
    ///
    /// let rule = Rule::when("proj_funding", "medium", Operator::And)
    ///     .and("exp_level", "intermediate")
    ///     .then("risk", "normal");
    /// assert_eq!(rule.antecedents.len(), 2);
    /// ```
    pub fn when(variable: impl Into<String>, set: impl Into<String>, operator: Operator) -> RuleBuilder {
        RuleBuilder {
            name: None,
            antecedents: vec![Antecedent::new(variable, set, operator)],
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Label used when reporting on this rule
    pub fn label(&self, index: usize) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("rule #{}", index + 1))
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, clause) in self.antecedents.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{} {} {}", clause.variable, clause.set, clause.operator)?;
        }
        write!(f, " => {} {}", self.consequent.variable, self.consequent.set)
    }
}

/// Accumulates antecedent clauses until `then` supplies the consequent
#[derive(Debug, Clone)]
pub struct RuleBuilder {
    name: Option<String>,
    antecedents: Vec<Antecedent>,
}

impl RuleBuilder {
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Append a clause with an explicit operator
    pub fn clause(mut self, variable: impl Into<String>, set: impl Into<String>, operator: Operator) -> Self {
        self.antecedents.push(Antecedent::new(variable, set, operator));
        self
    }

    pub fn and(self, variable: impl Into<String>, set: impl Into<String>) -> Self {
        self.clause(variable, set, Operator::And)
    }

    pub fn or(self, variable: impl Into<String>, set: impl Into<String>) -> Self {
        self.clause(variable, set, Operator::Or)
    }

    pub fn and_not(self, variable: impl Into<String>, set: impl Into<String>) -> Self {
        self.clause(variable, set, Operator::AndNot)
    }

    pub fn then(self, variable: impl Into<String>, set: impl Into<String>) -> Rule {
        Rule {
            name: self.name,
            antecedents: self.antecedents,
            consequent: Consequent::new(variable, set),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combine_operators() {
        assert_eq!(combine(0.6, 0.4, &Operator::And), 0.4);
        assert_eq!(combine(0.6, 0.4, &Operator::Or), 0.6);
        assert!((combine(0.9, 0.4, &Operator::AndNot) - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_and_not_boundaries() {
        assert_eq!(combine(1.0, 0.0, &Operator::AndNot), 1.0);
        assert_eq!(combine(1.0, 1.0, &Operator::AndNot), 0.0);
        for d in [0.0, 0.1, 0.25, 0.5, 0.75, 1.0] {
            for acc in [0.0, 0.3, 1.0] {
                assert_eq!(combine(acc, d, &Operator::AndNot), acc.min(1.0 - d));
            }
        }
    }

    #[test]
    fn test_unrecognized_behaves_as_and() {
        let op = Operator::from_token("xor");
        assert_eq!(op, Operator::Unrecognized("xor".to_string()));
        assert!(!op.is_recognized());
        assert_eq!(combine(0.7, 0.2, &op), combine(0.7, 0.2, &Operator::And));
    }

    #[test]
    fn test_operator_tokens() {
        assert_eq!(Operator::from_token("and"), Operator::And);
        assert_eq!(Operator::from_token("or"), Operator::Or);
        assert_eq!(Operator::from_token("and_not"), Operator::AndNot);
        assert!(!Operator::from_token("nand").is_recognized());
        assert_eq!(Operator::default(), Operator::And);
    }

    #[test]
    fn test_uppercase_operator_is_unrecognized() {
        let op = Operator::from_token("OR");
        assert_eq!(op, Operator::Unrecognized("OR".to_string()));
        // evaluated as `and`, not `or`
        assert_eq!(combine(1.0, 0.2, &op), 0.2);
        assert_eq!(Operator::from_token("AND_NOT"), Operator::Unrecognized("AND_NOT".to_string()));
        assert_eq!(Operator::default(), Operator::And);
    }

    #[test]
    fn test_rule_builder_preserves_clause_order() {
        let rule = Rule::when("proj_funding", "very_low", Operator::AndNot)
            .and_not("exp_level", "expert")
            .named("r5")
            .then("risk", "high");

        assert_eq!(rule.name.as_deref(), Some("r5"));
        assert_eq!(rule.antecedents[0].variable, "proj_funding");
        assert_eq!(rule.antecedents[1].operator, Operator::AndNot);
        assert_eq!(rule.consequent, Consequent::new("risk", "high"));
        assert_eq!(
            rule.to_string(),
            "proj_funding very_low and_not exp_level expert and_not => risk high"
        );
    }

    #[test]
    fn test_label_falls_back_to_position() {
        let rule = Rule::new(vec![], Consequent::new("risk", "low"));
        assert_eq!(rule.label(2), "rule #3");
        assert_eq!(rule.with_name("safe").label(2), "safe");
    }
}
