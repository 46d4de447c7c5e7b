use std::{collections::HashMap, fmt, str::FromStr};

use log::debug;
use serde::Serialize;

use crate::specification::{
    ltl::Formula,
    result::{Result, SpecificationError},
};

pub mod sample;
pub mod writer;

/// A finite sequence of boolean assignments whose last state loops back to
/// `lasso`, standing for the infinite word
/// `states[..lasso] (states[lasso..])^ω`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trace {
    id: Option<String>,
    literals: Vec<String>,
    positions: HashMap<String, usize>,
    states: Vec<Vec<bool>>,
    lasso: usize,
}

impl Trace {
    pub fn new(
        literals: Vec<String>,
        states: Vec<Vec<bool>>,
        lasso: usize,
    ) -> Result<Self> {
        if states.is_empty() {
            return Err(SpecificationError::EmptyTrace);
        }
        if lasso >= states.len() {
            return Err(SpecificationError::InvalidLasso {
                lasso,
                length: states.len(),
            });
        }
        for (state, values) in states.iter().enumerate() {
            if values.len() != literals.len() {
                return Err(SpecificationError::InconsistentState {
                    state,
                    expected: literals.len(),
                    actual: values.len(),
                });
            }
        }
        let mut positions = HashMap::with_capacity(literals.len());
        for (position, literal) in literals.iter().enumerate() {
            if positions.insert(literal.clone(), position).is_some() {
                return Err(SpecificationError::DuplicateLiteral(
                    literal.clone(),
                ));
            }
        }
        Ok(Trace {
            id: None,
            literals,
            positions,
            states,
            lasso,
        })
    }

    /// Parses `1,0;0,1;1,1` with an optional `::<lasso>` suffix. Values map
    /// positionally onto `literals`, or onto `p0, p1, ...` when none are
    /// given.
    pub fn parse(text: &str, literals: Option<&[String]>) -> Result<Self> {
        let (body, lasso) = match text.split_once("::") {
            Some((body, lasso)) => {
                let lasso = lasso.trim().parse::<usize>().map_err(|error| {
                    SpecificationError::InvalidTrace(format!(
                        "lasso index '{}': {}",
                        lasso.trim(),
                        error
                    ))
                })?;
                (body, lasso)
            }
            None => (text, 0),
        };

        if body.trim().is_empty() {
            return Err(SpecificationError::EmptyTrace);
        }

        let states: Vec<Vec<bool>> = body
            .trim()
            .split(';')
            .map(|state| state.split(',').map(parse_value).collect())
            .collect();

        let literals = match literals {
            Some(literals) => literals.to_vec(),
            None => (0..states[0].len()).map(|i| format!("p{}", i)).collect(),
        };

        let trace = Trace::new(literals, states, lasso)?;
        debug!(
            "parsed trace of {} states over {:?} with lasso {}",
            trace.len(),
            trace.literals,
            trace.lasso
        );
        Ok(trace)
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn literals(&self) -> &[String] {
        &self.literals
    }

    pub fn states(&self) -> &[Vec<bool>] {
        &self.states
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn lasso(&self) -> usize {
        self.lasso
    }

    pub fn has_literal(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    /// The value of an atomic proposition at an index.
    pub fn value(&self, atom: &str, index: usize) -> Result<bool> {
        let position = self.positions.get(atom).ok_or_else(|| {
            SpecificationError::UnknownAtom {
                atom: atom.to_string(),
                index,
            }
        })?;
        let state = self.states.get(index).ok_or(
            SpecificationError::IndexOutOfRange {
                index,
                length: self.len(),
            },
        )?;
        Ok(state[*position])
    }
}

fn parse_value(token: &str) -> bool {
    matches!(
        token.trim().to_lowercase().as_str(),
        "1" | "t" | "true" | "yes"
    )
}

impl FromStr for Trace {
    type Err = SpecificationError;

    fn from_str(s: &str) -> Result<Self> {
        Trace::parse(s, None)
    }
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, state) in self.states.iter().enumerate() {
            if index > 0 {
                write!(f, ";")?;
            }
            for (position, value) in state.iter().enumerate() {
                if position > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{}", if *value { 1 } else { 0 })?;
            }
        }
        write!(f, "::{}", self.lasso)
    }
}

/// Whether a sample trace is meant to satisfy the formula.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Positive,
    Negative,
}

impl Polarity {
    pub fn expected(&self) -> bool {
        *self == Polarity::Positive
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Polarity::Positive => write!(f, "positive"),
            Polarity::Negative => write!(f, "negative"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VerdictEntry {
    pub formula: Formula,
    pub trace_id: Option<String>,
    pub trace: String,
    pub polarity: Polarity,
    pub expected: bool,
    pub actual: bool,
}

impl VerdictEntry {
    pub fn is_match(&self) -> bool {
        self.expected == self.actual
    }
}
