//! Definition line parser
//!
//! Parses the one-line definitions used to describe a model on the command
//! line:
//!
//! ```text
//! proj_funding IN [0, 100]                       variable
//! proj_funding low TRAP 10 30 40 60              fuzzy set
//! proj_funding low and exp_level beginner => risk high   rule
//! proj_funding=50                                input assignment
//! ```
//!
//! In rules, every clause is followed by its operator slot (`and`, `or`,
//! `and_not`), which binds to that clause. Only the last clause may leave the
//! slot empty, in which case it uses `and`. Any other token in the slot is
//! kept as an unrecognized operator and evaluates as `and`.

use nom::{
    bytes::complete::take_while1,
    character::complete::{char, space0, space1},
    combinator::{all_consuming, opt},
    multi::{many0, separated_list0},
    number::complete::double,
    sequence::{delimited, preceded, separated_pair, terminated, tuple},
    IResult,
};

use crate::error::{ErrorCode, FuzzyError, FuzzyResult};
use crate::membership::Shape;
use crate::rule::{Antecedent, Consequent, Operator, Rule};
use crate::system::FuzzySystemBuilder;
use crate::variable::Role;

/// Parser error type
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("Syntax error at position {position}: {message}")]
    Syntax { position: usize, message: String },

    #[error("Unknown variable type '{token}', expected IN or OUT")]
    UnknownRole { token: String },

    #[error("Unknown fuzzy set type '{token}', expected TRI or TRAP")]
    UnknownShape { token: String },

    #[error("Invalid rule format, expected 'var set op var set => out_var out_set'")]
    MissingArrow,

    #[error("Incomplete clause: '{variable}' has no fuzzy set")]
    IncompleteClause { variable: String },

    #[error("Rule has no antecedent clauses")]
    EmptyAntecedent,

    #[error("Rule consequent must be 'out_var out_set', got '{text}'")]
    BadConsequent { text: String },
}

impl From<ParseError> for FuzzyError {
    fn from(err: ParseError) -> Self {
        let code = match &err {
            ParseError::UnknownRole { .. } => ErrorCode::UnknownRole,
            ParseError::UnknownShape { .. } => ErrorCode::UnknownShape,
            _ => ErrorCode::InvalidSyntax,
        };
        let fuzzy = FuzzyError::new(code, err.to_string());
        match err {
            ParseError::Syntax { position, .. } => {
                fuzzy.with_context("position", position.to_string())
            }
            ParseError::UnknownRole { token } | ParseError::UnknownShape { token } => {
                fuzzy.with_context("token", token)
            }
            _ => fuzzy,
        }
    }
}

/// A parsed `name IN|OUT [lower, upper]` line
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDef {
    pub name: String,
    pub role: Role,
    pub range: (f64, f64),
}

impl VariableDef {
    pub fn apply(self, builder: &mut FuzzySystemBuilder) -> FuzzyResult<()> {
        builder.add_variable(self.name, self.role, self.range)?;
        Ok(())
    }
}

/// A parsed `variable set TRI|TRAP v1 v2 ...` line
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzySetDef {
    pub variable: String,
    pub name: String,
    pub shape: Shape,
    pub parameters: Vec<f64>,
}

impl FuzzySetDef {
    pub fn apply(self, builder: &mut FuzzySystemBuilder) -> FuzzyResult<()> {
        builder.add_fuzzy_set(&self.variable, self.name, self.shape, self.parameters)?;
        Ok(())
    }
}

/// Identifier: letters, digits, `_`, `-` and `.`
fn ident(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '_' || c == '-' || c == '.')(input)
}

/// Any run of non-whitespace characters
fn token(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_whitespace())(input)
}

fn range(input: &str) -> IResult<&str, (f64, f64)> {
    delimited(
        terminated(char('['), space0),
        separated_pair(
            double,
            delimited(space0, char(','), space0),
            double,
        ),
        preceded(space0, char(']')),
    )(input)
}

fn syntax_error(line: &str, err: nom::Err<nom::error::Error<&str>>, expected: &str) -> ParseError {
    let position = match &err {
        nom::Err::Error(e) | nom::Err::Failure(e) => line.len() - e.input.len(),
        nom::Err::Incomplete(_) => line.len(),
    };
    ParseError::Syntax {
        position,
        message: format!("expected {}", expected),
    }
}

/// Parse `name IN|OUT [lower, upper]`
pub fn parse_variable(line: &str) -> Result<VariableDef, ParseError> {
    let line = line.trim();
    let (_, (name, _, role, _, range)) = all_consuming(tuple((
        ident,
        space1,
        ident,
        space0,
        terminated(range, space0),
    )))(line)
    .map_err(|e| syntax_error(line, e, "'<name> <IN|OUT> [<lower>, <upper>]'"))?;

    let role = Role::from_token(role).ok_or_else(|| ParseError::UnknownRole {
        token: role.to_string(),
    })?;

    Ok(VariableDef {
        name: name.to_string(),
        role,
        range,
    })
}

/// Parse `variable set TRI|TRAP v1 v2 ...`.
///
/// The parameter count is checked by the builder, not here.
pub fn parse_fuzzy_set(line: &str) -> Result<FuzzySetDef, ParseError> {
    let line = line.trim();
    let (_, (variable, _, name, _, shape, parameters)) = all_consuming(tuple((
        ident,
        space1,
        ident,
        space1,
        ident,
        terminated(many0(preceded(space1, double)), space0),
    )))(line)
    .map_err(|e| syntax_error(line, e, "'<variable> <set> <TRI|TRAP> <values...>'"))?;

    let shape = Shape::from_token(shape).ok_or_else(|| ParseError::UnknownShape {
        token: shape.to_string(),
    })?;

    Ok(FuzzySetDef {
        variable: variable.to_string(),
        name: name.to_string(),
        shape,
        parameters,
    })
}

/// Parse `var set op var set [op] => out_var out_set`
pub fn parse_rule(line: &str) -> Result<Rule, ParseError> {
    let (lhs, rhs) = line.split_once("=>").ok_or(ParseError::MissingArrow)?;

    let words = |text: &str| -> Vec<String> {
        text.split_whitespace().map(str::to_string).collect()
    };

    let target = words(rhs);
    let [variable, set] = <[String; 2]>::try_from(target).map_err(|_| ParseError::BadConsequent {
        text: rhs.trim().to_string(),
    })?;

    let (_, tokens) = all_consuming(delimited(space0, separated_list0(space1, token), space0))(lhs)
        .map_err(|e| syntax_error(lhs, e, "whitespace separated clauses"))?;

    let mut antecedents = Vec::new();
    let mut rest = tokens.as_slice();
    while let Some((var, tail)) = rest.split_first() {
        let (set, tail) = tail.split_first().ok_or_else(|| ParseError::IncompleteClause {
            variable: var.to_string(),
        })?;
        let (operator, tail) = match tail.split_first() {
            Some((op, after)) => (Operator::from_token(op), after),
            None => (Operator::And, tail),
        };
        antecedents.push(Antecedent::new(*var, *set, operator));
        rest = tail;
    }

    if antecedents.is_empty() {
        return Err(ParseError::EmptyAntecedent);
    }

    Ok(Rule::new(antecedents, Consequent::new(variable, set)))
}

/// Parse `name=value`
pub fn parse_assignment(line: &str) -> Result<(String, f64), ParseError> {
    let line = line.trim();
    let (_, (name, value)) = all_consuming(separated_pair(
        ident,
        delimited(space0, char('='), space0),
        terminated(double, opt(space1)),
    ))(line)
    .map_err(|e| syntax_error(line, e, "'<name>=<number>'"))?;
    Ok((name.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_variable() {
        let def = parse_variable("proj_funding IN [0, 100]").unwrap();
        assert_eq!(def.name, "proj_funding");
        assert_eq!(def.role, Role::Input);
        assert_eq!(def.range, (0.0, 100.0));

        let def = parse_variable("  risk out [0.5,99.5] ").unwrap();
        assert_eq!(def.role, Role::Output);
        assert_eq!(def.range, (0.5, 99.5));
    }

    #[test]
    fn test_parse_variable_errors() {
        assert!(matches!(
            parse_variable("risk INOUT [0, 1]"),
            Err(ParseError::UnknownRole { token }) if token == "INOUT"
        ));
        assert!(matches!(parse_variable("risk OUT 0, 1"), Err(ParseError::Syntax { .. })));
        assert!(matches!(parse_variable("risk OUT [0, 1] extra"), Err(ParseError::Syntax { .. })));
    }

    #[test]
    fn test_parse_fuzzy_set() {
        let def = parse_fuzzy_set("proj_funding low TRAP 10 30 40 60").unwrap();
        assert_eq!(def.variable, "proj_funding");
        assert_eq!(def.name, "low");
        assert_eq!(def.shape, Shape::Trapezoidal);
        assert_eq!(def.parameters, vec![10.0, 30.0, 40.0, 60.0]);

        let def = parse_fuzzy_set("exp_level expert tri 30 60 60").unwrap();
        assert_eq!(def.shape, Shape::Triangular);
        assert_eq!(def.parameters.len(), 3);
    }

    #[test]
    fn test_parse_fuzzy_set_errors() {
        assert!(matches!(
            parse_fuzzy_set("x low GAUSS 1 2"),
            Err(ParseError::UnknownShape { .. })
        ));
        assert!(matches!(
            parse_fuzzy_set("x low TRI 1 two 3"),
            Err(ParseError::Syntax { .. })
        ));
    }

    #[test]
    fn test_parse_rule_operators_bind_to_preceding_clause() {
        let rule = parse_rule("proj_funding high or exp_level expert or => risk low").unwrap();
        assert_eq!(rule.antecedents.len(), 2);
        assert_eq!(rule.antecedents[0].operator, Operator::Or);
        assert_eq!(rule.antecedents[1].operator, Operator::Or);
        assert_eq!(rule.consequent, Consequent::new("risk", "low"));
    }

    #[test]
    fn test_parse_rule_trailing_clause_defaults_to_and() {
        let rule = parse_rule("proj_funding medium and exp_level beginner => risk normal").unwrap();
        assert_eq!(rule.antecedents[0], Antecedent::new("proj_funding", "medium", Operator::And));
        assert_eq!(rule.antecedents[1], Antecedent::new("exp_level", "beginner", Operator::And));

        let rule = parse_rule("a x and_not b y => o z").unwrap();
        assert_eq!(rule.antecedents[0].operator, Operator::AndNot);
        assert_eq!(rule.antecedents[1].operator, Operator::And);
    }

    #[test]
    fn test_parse_rule_operator_slot_is_positional() {
        let rule = parse_rule("a x xor b y => o z").unwrap();
        assert_eq!(rule.antecedents.len(), 2);
        assert_eq!(rule.antecedents[0].operator, Operator::Unrecognized("xor".to_string()));
        assert_eq!(rule.antecedents[1], Antecedent::new("b", "y", Operator::And));

        let rule = parse_rule("a x xor => o z").unwrap();
        assert_eq!(rule.antecedents.len(), 1);
        assert_eq!(rule.antecedents[0].operator, Operator::Unrecognized("xor".to_string()));

        // uppercase tokens are not operators
        let rule = parse_rule("a x OR b y => o z").unwrap();
        assert_eq!(rule.antecedents[0].operator, Operator::Unrecognized("OR".to_string()));
    }

    #[test]
    fn test_unrecognized_operator_rule_strict_and_lenient() {
        let lines = |builder: &mut FuzzySystemBuilder| {
            parse_variable("speed IN [0, 10]").unwrap().apply(builder).unwrap();
            parse_variable("load IN [0, 10]").unwrap().apply(builder).unwrap();
            parse_variable("brake OUT [0, 1]").unwrap().apply(builder).unwrap();
            parse_fuzzy_set("speed fast TRAP 5 8 10 10").unwrap().apply(builder).unwrap();
            parse_fuzzy_set("load heavy TRAP 5 8 10 10").unwrap().apply(builder).unwrap();
            parse_fuzzy_set("brake hard TRI 0.5 1 1").unwrap().apply(builder).unwrap();
        };
        let rule = parse_rule("speed fast xor load heavy => brake hard").unwrap();

        let mut strict = FuzzySystemBuilder::new("strict").strict_operators(true);
        lines(&mut strict);
        let err = strict.add_rule(rule.clone()).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnrecognizedOperator);
        assert_eq!(err.context_field("operator"), Some("xor"));

        let mut lenient = FuzzySystemBuilder::new("lenient");
        lines(&mut lenient);
        lenient.add_rule(rule).unwrap();
        let system = lenient.build().unwrap();

        let mut inputs = crate::inference::CrispValues::new();
        inputs.insert("speed".to_string(), 9.0);
        inputs.insert("load".to_string(), 0.0);
        let report = system.run_detailed(&inputs).unwrap();

        // xor evaluates as and: min(1, 1) then min(1, 0)
        assert_eq!(report.firings[0].strength, 0.0);
        assert!(report.diagnostics.contains(&crate::inference::Diagnostic::UnrecognizedOperator {
            rule: "rule #1".to_string(),
            operator: "xor".to_string(),
        }));
    }

    #[test]
    fn test_parse_rule_errors() {
        assert_eq!(parse_rule("a x b y"), Err(ParseError::MissingArrow));
        assert_eq!(
            parse_rule("a x and b => o z"),
            Err(ParseError::IncompleteClause { variable: "b".to_string() })
        );
        assert_eq!(parse_rule("  => o z"), Err(ParseError::EmptyAntecedent));
        assert!(matches!(parse_rule("a x => o"), Err(ParseError::BadConsequent { .. })));
    }

    #[test]
    fn test_parse_assignment() {
        assert_eq!(parse_assignment("proj_funding=50").unwrap(), ("proj_funding".to_string(), 50.0));
        assert_eq!(parse_assignment(" exp_level = 40.5 ").unwrap(), ("exp_level".to_string(), 40.5));
        assert!(parse_assignment("exp_level=high").is_err());
    }

    #[test]
    fn test_parse_error_converts_with_code() {
        let err: FuzzyError = parse_fuzzy_set("x low BELL 1 2 3").unwrap_err().into();
        assert_eq!(err.code, ErrorCode::UnknownShape);
        assert_eq!(err.context_field("token"), Some("BELL"));

        let err: FuzzyError = parse_rule("nonsense").unwrap_err().into();
        assert_eq!(err.code, ErrorCode::InvalidSyntax);
    }

    #[test]
    fn test_definitions_apply_to_builder() {
        let mut builder = FuzzySystemBuilder::new("lines");
        parse_variable("speed IN [0, 10]").unwrap().apply(&mut builder).unwrap();
        parse_variable("brake OUT [0, 1]").unwrap().apply(&mut builder).unwrap();
        parse_fuzzy_set("speed fast TRAP 5 8 10 10").unwrap().apply(&mut builder).unwrap();
        parse_fuzzy_set("brake hard TRI 0.5 1 1").unwrap().apply(&mut builder).unwrap();
        builder.add_rule(parse_rule("speed fast => brake hard").unwrap()).unwrap();

        let err = parse_fuzzy_set("speed slow TRI 0 5").unwrap().apply(&mut builder).unwrap_err();
        assert_eq!(err.code, ErrorCode::MalformedMembershipFunction);

        let system = builder.build().unwrap();
        let mut inputs = crate::inference::CrispValues::new();
        inputs.insert("speed".to_string(), 9.0);
        let results = system.run(&inputs).unwrap();
        assert!((results["brake"] - 2.5 / 3.0).abs() < 1e-9);
    }
}
