//! Membership functions
//!
//! Piecewise-linear fuzzy set shapes over the real line:
//! - Triangular: (left, peak, right)
//! - Trapezoidal: (left, left_top, right_top, right)
//!
//! Parameters are validated once, when the function is constructed, so
//! fuzzification itself never fails.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{FuzzyError, FuzzyResult};

/// Membership function shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    /// Triangular: (a, b, c)
    Triangular,
    /// Trapezoidal: (a, b, c, d)
    Trapezoidal,
}

impl Shape {
    /// Number of parameters the shape takes
    pub fn arity(&self) -> usize {
        match self {
            Shape::Triangular => 3,
            Shape::Trapezoidal => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Shape::Triangular => "TRI",
            Shape::Trapezoidal => "TRAP",
        }
    }

    pub fn from_token(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "tri" | "triangle" | "triangular" => Some(Shape::Triangular),
            "trap" | "trapezoid" | "trapezoidal" => Some(Shape::Trapezoidal),
            _ => None,
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named membership function
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MembershipFunction {
    name: String,
    shape: Shape,
    parameters: Vec<f64>,
}

impl MembershipFunction {
    /// Create a membership function, checking the parameters against the shape.
    ///
    /// Parameters must be finite, there must be exactly [`Shape::arity`] of
    /// them, and they must be non-decreasing. Equal neighbours are allowed and
    /// describe a vertical edge (a "shoulder").
    pub fn new(name: impl Into<String>, shape: Shape, parameters: Vec<f64>) -> FuzzyResult<Self> {
        let name = name.into();

        if parameters.len() != shape.arity() {
            return Err(FuzzyError::malformed_membership(
                &name,
                format!(
                    "{} set '{}' takes {} parameters, got {}",
                    shape,
                    name,
                    shape.arity(),
                    parameters.len()
                ),
            ));
        }

        if let Some(bad) = parameters.iter().find(|p| !p.is_finite()) {
            return Err(FuzzyError::malformed_membership(
                &name,
                format!("{} set '{}' has a non-finite parameter: {}", shape, name, bad),
            ));
        }

        if parameters.windows(2).any(|w| w[0] > w[1]) {
            return Err(FuzzyError::malformed_membership(
                &name,
                format!(
                    "{} set '{}' parameters must be non-decreasing, got {:?}",
                    shape, name, parameters
                ),
            )
            .with_hint("Order the points left to right, e.g. TRI 0 15 30"));
        }

        Ok(Self {
            name,
            shape,
            parameters,
        })
    }

    pub fn triangular(name: impl Into<String>, a: f64, b: f64, c: f64) -> FuzzyResult<Self> {
        Self::new(name, Shape::Triangular, vec![a, b, c])
    }

    pub fn trapezoidal(
        name: impl Into<String>,
        a: f64,
        b: f64,
        c: f64,
        d: f64,
    ) -> FuzzyResult<Self> {
        Self::new(name, Shape::Trapezoidal, vec![a, b, c, d])
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn parameters(&self) -> &[f64] {
        &self.parameters
    }

    /// Degree of membership of a crisp value, in [0, 1]
    pub fn fuzzify(&self, x: f64) -> f64 {
        let p = &self.parameters;
        match self.shape {
            Shape::Triangular => {
                let (a, b, c) = (p[0], p[1], p[2]);
                if a <= x && x <= b {
                    rising(x, a, b)
                } else if b <= x && x <= c {
                    falling(x, b, c)
                } else {
                    0.0
                }
            }
            Shape::Trapezoidal => {
                let (a, b, c, d) = (p[0], p[1], p[2], p[3]);
                if a <= x && x <= b {
                    rising(x, a, b)
                } else if b <= x && x <= c {
                    1.0
                } else if c <= x && x <= d {
                    falling(x, c, d)
                } else {
                    0.0
                }
            }
        }
    }

    /// Point used by the centroid defuzzifier: the mean of the parameters
    pub fn representative_point(&self) -> f64 {
        self.parameters.iter().sum::<f64>() / self.parameters.len() as f64
    }

    /// Interval where membership is positive (closed, endpoints included)
    pub fn support(&self) -> (f64, f64) {
        (self.parameters[0], self.parameters[self.parameters.len() - 1])
    }

    /// Interval where membership is 1
    pub fn core(&self) -> (f64, f64) {
        match self.shape {
            Shape::Triangular => (self.parameters[1], self.parameters[1]),
            Shape::Trapezoidal => (self.parameters[1], self.parameters[2]),
        }
    }
}

// Zero-width ramps are vertical edges: the edge point itself is fully in the set.
fn rising(x: f64, lo: f64, hi: f64) -> f64 {
    if hi == lo {
        1.0
    } else {
        (x - lo) / (hi - lo)
    }
}

fn falling(x: f64, lo: f64, hi: f64) -> f64 {
    if hi == lo {
        1.0
    } else {
        (hi - x) / (hi - lo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_triangular_membership() {
        let mf = MembershipFunction::triangular("warm", 0.0, 5.0, 10.0).unwrap();

        assert!(close(mf.fuzzify(0.0), 0.0));
        assert!(close(mf.fuzzify(2.5), 0.5));
        assert!(close(mf.fuzzify(5.0), 1.0));
        assert!(close(mf.fuzzify(7.5), 0.5));
        assert!(close(mf.fuzzify(10.0), 0.0));
    }

    #[test]
    fn test_trapezoidal_plateau() {
        let mf = MembershipFunction::trapezoidal("low", 10.0, 30.0, 40.0, 60.0).unwrap();

        assert!(close(mf.fuzzify(30.0), 1.0));
        assert!(close(mf.fuzzify(35.0), 1.0));
        assert!(close(mf.fuzzify(40.0), 1.0));
        assert!(close(mf.fuzzify(20.0), 0.5));
        assert!(close(mf.fuzzify(50.0), 0.5));
    }

    #[test]
    fn test_zero_outside_support() {
        let tri = MembershipFunction::triangular("t", 15.0, 30.0, 45.0).unwrap();
        let trap = MembershipFunction::trapezoidal("z", 40.0, 60.0, 70.0, 90.0).unwrap();

        for x in [-1e9, -3.0, 0.0, 14.999, 45.001, 100.0, 1e9] {
            assert_eq!(tri.fuzzify(x), 0.0, "triangle at {}", x);
        }
        for x in [-1e9, 0.0, 39.9, 90.1, 1e9] {
            assert_eq!(trap.fuzzify(x), 0.0, "trapezoid at {}", x);
        }
    }

    #[test]
    fn test_shoulders_do_not_divide_by_zero() {
        let left = MembershipFunction::trapezoidal("very_low", 0.0, 0.0, 10.0, 30.0).unwrap();
        assert!(close(left.fuzzify(0.0), 1.0));
        assert!(close(left.fuzzify(20.0), 0.5));

        let right = MembershipFunction::triangular("expert", 30.0, 60.0, 60.0).unwrap();
        assert!(close(right.fuzzify(60.0), 1.0));
        assert!(close(right.fuzzify(45.0), 0.5));
        assert_eq!(right.fuzzify(60.5), 0.0);

        let spike = MembershipFunction::triangular("exact", 5.0, 5.0, 5.0).unwrap();
        assert!(close(spike.fuzzify(5.0), 1.0));
        assert_eq!(spike.fuzzify(5.1), 0.0);
    }

    #[test]
    fn test_wrong_parameter_count_rejected() {
        let err = MembershipFunction::new("bad", Shape::Triangular, vec![0.0, 1.0]).unwrap_err();
        assert_eq!(err.code, ErrorCode::MalformedMembershipFunction);
        assert_eq!(err.context_field("set"), Some("bad"));

        let err = MembershipFunction::new("bad", Shape::Trapezoidal, vec![0.0, 1.0, 2.0])
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::MalformedMembershipFunction);
    }

    #[test]
    fn test_unordered_or_non_finite_rejected() {
        let err = MembershipFunction::triangular("bad", 10.0, 5.0, 20.0).unwrap_err();
        assert_eq!(err.code, ErrorCode::MalformedMembershipFunction);

        let err = MembershipFunction::trapezoidal("bad", 0.0, f64::NAN, 2.0, 3.0).unwrap_err();
        assert_eq!(err.code, ErrorCode::MalformedMembershipFunction);
    }

    #[test]
    fn test_representative_point_is_parameter_mean() {
        let high = MembershipFunction::triangular("high", 50.0, 100.0, 100.0).unwrap();
        assert!(close(high.representative_point(), 250.0 / 3.0));

        let trap = MembershipFunction::trapezoidal("low", 10.0, 30.0, 40.0, 60.0).unwrap();
        assert!(close(trap.representative_point(), 35.0));
    }

    #[test]
    fn test_core_and_support() {
        let trap = MembershipFunction::trapezoidal("m", 40.0, 60.0, 70.0, 90.0).unwrap();
        assert_eq!(trap.support(), (40.0, 90.0));
        assert_eq!(trap.core(), (60.0, 70.0));

        let tri = MembershipFunction::triangular("n", 25.0, 50.0, 75.0).unwrap();
        assert_eq!(tri.core(), (50.0, 50.0));
    }

    #[test]
    fn test_shape_tokens() {
        assert_eq!(Shape::from_token("TRI"), Some(Shape::Triangular));
        assert_eq!(Shape::from_token("trap"), Some(Shape::Trapezoidal));
        assert_eq!(Shape::from_token("Trapezoidal"), Some(Shape::Trapezoidal));
        assert_eq!(Shape::from_token("gauss"), None);
    }
}
