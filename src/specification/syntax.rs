use serde::{Deserialize, Serialize};

use crate::specification::{
    ltl::{Formula, Operator},
    result::{Result, SpecificationError},
};

/// A formula in its syntactic form, as handed over by a parsing front-end:
/// a label with up to two operands, not yet checked against the label's
/// arity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Syntax {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<Box<Syntax>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<Box<Syntax>>,
}

impl Syntax {
    pub fn leaf(label: impl Into<String>) -> Self {
        Syntax {
            label: label.into(),
            left: None,
            right: None,
        }
    }

    pub fn unary(label: impl Into<String>, sub: Syntax) -> Self {
        Syntax {
            label: label.into(),
            left: Some(Box::new(sub)),
            right: None,
        }
    }

    pub fn binary(
        label: impl Into<String>,
        left: Syntax,
        right: Syntax,
    ) -> Self {
        Syntax {
            label: label.into(),
            left: Some(Box::new(left)),
            right: Some(Box::new(right)),
        }
    }

    pub fn to_formula(&self) -> Result<Formula> {
        let left = self
            .left
            .as_ref()
            .map(|left| left.to_formula())
            .transpose()?;
        let right = self
            .right
            .as_ref()
            .map(|right| right.to_formula())
            .transpose()?;
        Formula::from_parts(&self.label, left, right)
    }
}

impl Formula {
    /// Builds a single node, checking the operands against the label's
    /// arity.
    pub fn from_parts(
        label: &str,
        left: Option<Formula>,
        right: Option<Formula>,
    ) -> Result<Formula> {
        use Operator as Op;

        if label.trim().is_empty() {
            return Err(SpecificationError::MalformedFormula {
                label: label.to_string(),
                reason: "empty label".to_string(),
            });
        }

        Ok(match (Op::from_label(label), left, right) {
            (Op::True, None, None) => Formula::True,
            (Op::False, None, None) => Formula::False,
            (Op::Atom, None, None) => Formula::Atom(label.to_string()),
            (Op::Not, Some(sub), None) => Formula::not(sub),
            (Op::Yesterday, Some(sub), None) => Formula::yesterday(sub),
            (Op::Once, Some(sub), None) => Formula::once(sub),
            (Op::Historically, Some(sub), None) => Formula::historically(sub),
            (Op::Next, Some(sub), None) => Formula::next(sub),
            (Op::Eventually, Some(sub), None) => Formula::eventually(sub),
            (Op::Always, Some(sub), None) => Formula::always(sub),
            (Op::And, Some(left), Some(right)) => Formula::and(left, right),
            (Op::Or, Some(left), Some(right)) => Formula::or(left, right),
            (Op::Implies, Some(left), Some(right)) => {
                Formula::implies(left, right)
            }
            (Op::Since, Some(left), Some(right)) => Formula::since(left, right),
            (Op::Until, Some(left), Some(right)) => Formula::until(left, right),
            (operator, left, right) => {
                return Err(SpecificationError::MalformedFormula {
                    label: label.to_string(),
                    reason: format!(
                        "expected {} operand(s), got {}",
                        operator.arity(),
                        match (left.is_some(), right.is_some()) {
                            (false, false) => "none",
                            (true, false) => "a left operand only",
                            (false, true) => "a right operand only",
                            (true, true) => "two operands",
                        }
                    ),
                });
            }
        })
    }
}

impl TryFrom<Syntax> for Formula {
    type Error = SpecificationError;

    fn try_from(value: Syntax) -> Result<Self> {
        value.to_formula()
    }
}

impl From<Formula> for Syntax {
    fn from(value: Formula) -> Self {
        Syntax {
            label: value.label().to_string(),
            left: value.left().map(|left| Box::new(left.clone().into())),
            right: value.right().map(|right| Box::new(right.clone().into())),
        }
    }
}
