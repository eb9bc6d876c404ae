//! Edge/condition operator semantics (spec §4.A).
//!
//! `equals`/`not_equals` coerce both operands to string; `contains` tests
//! substring on the left operand coerced to string; `greater_than`/
//! `less_than` coerce both operands to `f64` and the clause evaluates to
//! `false` if either coercion fails.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A comparison operator usable in edge conditions and condition-node
/// clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Equals,
    NotEquals,
    Contains,
    GreaterThan,
    LessThan,
}

/// Render a JSON value the way the operators coerce it to a string: plain
/// strings pass through unquoted, everything else uses its JSON form.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse::<f64>().ok(),
        _ => None,
    }
}

impl Operator {
    /// Evaluate `left <op> right` per the coercion rules above.
    #[must_use]
    pub fn evaluate(self, left: &Value, right: &Value) -> bool {
        match self {
            Self::Equals => stringify(left) == stringify(right),
            Self::NotEquals => stringify(left) != stringify(right),
            Self::Contains => stringify(left).contains(&stringify(right)),
            Self::GreaterThan => match (as_f64(left), as_f64(right)) {
                (Some(l), Some(r)) => l > r,
                _ => false,
            },
            Self::LessThan => match (as_f64(left), as_f64(right)) {
                (Some(l), Some(r)) => l < r,
                _ => false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case::equals_coerces_numbers_to_strings(Operator::Equals, json!(5), json!("5"), true)]
    #[case::equals_mismatch(Operator::Equals, json!(5), json!("6"), false)]
    #[case::not_equals_differing(Operator::NotEquals, json!("a"), json!("b"), true)]
    #[case::not_equals_same(Operator::NotEquals, json!("a"), json!("a"), false)]
    #[case::contains_match(Operator::Contains, json!("hello world"), json!("world"), true)]
    #[case::contains_no_match(Operator::Contains, json!("hello"), json!("world"), false)]
    #[case::greater_than_numeric(Operator::GreaterThan, json!(5), json!(3), true)]
    #[case::less_than_numeric_strings(Operator::LessThan, json!("3"), json!("5"), true)]
    #[case::greater_than_bad_left_is_false(Operator::GreaterThan, json!("abc"), json!(3), false)]
    #[case::less_than_bad_right_is_false(Operator::LessThan, json!(3), json!("xyz"), false)]
    #[case::null_stringifies_literally(Operator::Equals, Value::Null, json!("null"), true)]
    fn evaluate_matches_expected(#[case] op: Operator, #[case] left: Value, #[case] right: Value, #[case] expected: bool) {
        assert_eq!(op.evaluate(&left, &right), expected);
    }
}
