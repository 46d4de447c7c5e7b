use std::collections::{BTreeSet, HashSet};

use log::trace;
use serde::{Deserialize, Serialize};

use crate::{
    specification::{
        result::{Result, SpecificationError},
        syntax::Syntax,
    },
    trace::Trace,
};

/// The closed set of operators a formula node can carry.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Operator {
    True,
    False,
    Atom,
    Not,
    Yesterday,
    Once,
    Historically,
    Next,
    Eventually,
    Always,
    And,
    Or,
    Implies,
    Since,
    Until,
}

impl Operator {
    /// Any label that isn't an operator names an atomic proposition.
    pub fn from_label(label: &str) -> Operator {
        use Operator::*;
        match label {
            "TRUE" => True,
            "FALSE" => False,
            "!" => Not,
            "Y" => Yesterday,
            "O" => Once,
            "H" => Historically,
            "X" => Next,
            "F" => Eventually,
            "G" => Always,
            "&" => And,
            "|" => Or,
            "=>" => Implies,
            "S" => Since,
            "U" => Until,
            _ => Atom,
        }
    }

    pub fn label(&self) -> Option<&'static str> {
        use Operator::*;
        match self {
            True => Some("TRUE"),
            False => Some("FALSE"),
            Atom => None,
            Not => Some("!"),
            Yesterday => Some("Y"),
            Once => Some("O"),
            Historically => Some("H"),
            Next => Some("X"),
            Eventually => Some("F"),
            Always => Some("G"),
            And => Some("&"),
            Or => Some("|"),
            Implies => Some("=>"),
            Since => Some("S"),
            Until => Some("U"),
        }
    }

    pub fn arity(&self) -> usize {
        use Operator::*;
        match self {
            True | False | Atom => 0,
            Not | Yesterday | Once | Historically | Next | Eventually
            | Always => 1,
            And | Or | Implies | Since | Until => 2,
        }
    }
}

/// A PLTL formula. Every node owns its operands, so a formula is a finite
/// tree and structural equality is node identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Syntax", into = "Syntax")]
pub enum Formula {
    True,
    False,
    Atom(String),
    Not(Box<Formula>),
    Yesterday(Box<Formula>),
    Once(Box<Formula>),
    Historically(Box<Formula>),
    Next(Box<Formula>),
    Eventually(Box<Formula>),
    Always(Box<Formula>),
    And(Box<Formula>, Box<Formula>),
    Or(Box<Formula>, Box<Formula>),
    Implies(Box<Formula>, Box<Formula>),
    Since(Box<Formula>, Box<Formula>),
    Until(Box<Formula>, Box<Formula>),
}

impl Formula {
    pub fn atom(name: impl Into<String>) -> Self {
        Formula::Atom(name.into())
    }

    pub fn not(sub: Formula) -> Self {
        Formula::Not(Box::new(sub))
    }

    pub fn yesterday(sub: Formula) -> Self {
        Formula::Yesterday(Box::new(sub))
    }

    pub fn once(sub: Formula) -> Self {
        Formula::Once(Box::new(sub))
    }

    pub fn historically(sub: Formula) -> Self {
        Formula::Historically(Box::new(sub))
    }

    pub fn next(sub: Formula) -> Self {
        Formula::Next(Box::new(sub))
    }

    pub fn eventually(sub: Formula) -> Self {
        Formula::Eventually(Box::new(sub))
    }

    pub fn always(sub: Formula) -> Self {
        Formula::Always(Box::new(sub))
    }

    pub fn and(left: Formula, right: Formula) -> Self {
        Formula::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: Formula, right: Formula) -> Self {
        Formula::Or(Box::new(left), Box::new(right))
    }

    pub fn implies(left: Formula, right: Formula) -> Self {
        Formula::Implies(Box::new(left), Box::new(right))
    }

    pub fn since(left: Formula, right: Formula) -> Self {
        Formula::Since(Box::new(left), Box::new(right))
    }

    pub fn until(left: Formula, right: Formula) -> Self {
        Formula::Until(Box::new(left), Box::new(right))
    }

    pub fn operator(&self) -> Operator {
        match self {
            Formula::True => Operator::True,
            Formula::False => Operator::False,
            Formula::Atom(_) => Operator::Atom,
            Formula::Not(_) => Operator::Not,
            Formula::Yesterday(_) => Operator::Yesterday,
            Formula::Once(_) => Operator::Once,
            Formula::Historically(_) => Operator::Historically,
            Formula::Next(_) => Operator::Next,
            Formula::Eventually(_) => Operator::Eventually,
            Formula::Always(_) => Operator::Always,
            Formula::And(_, _) => Operator::And,
            Formula::Or(_, _) => Operator::Or,
            Formula::Implies(_, _) => Operator::Implies,
            Formula::Since(_, _) => Operator::Since,
            Formula::Until(_, _) => Operator::Until,
        }
    }

    /// The operator label, or the proposition name for atoms.
    pub fn label(&self) -> &str {
        match self {
            Formula::Atom(name) => name.as_str(),
            other => other.operator().label().unwrap_or_default(),
        }
    }

    pub fn left(&self) -> Option<&Formula> {
        match self {
            Formula::True | Formula::False | Formula::Atom(_) => None,
            Formula::Not(sub)
            | Formula::Yesterday(sub)
            | Formula::Once(sub)
            | Formula::Historically(sub)
            | Formula::Next(sub)
            | Formula::Eventually(sub)
            | Formula::Always(sub)
            | Formula::And(sub, _)
            | Formula::Or(sub, _)
            | Formula::Implies(sub, _)
            | Formula::Since(sub, _)
            | Formula::Until(sub, _) => Some(sub.as_ref()),
        }
    }

    pub fn right(&self) -> Option<&Formula> {
        match self {
            Formula::And(_, right)
            | Formula::Or(_, right)
            | Formula::Implies(_, right)
            | Formula::Since(_, right)
            | Formula::Until(_, right) => Some(right.as_ref()),
            _ => None,
        }
    }

    pub fn children(&self) -> impl Iterator<Item = &Formula> {
        self.left().into_iter().chain(self.right())
    }

    pub fn is_leaf(&self) -> bool {
        self.left().is_none() && self.right().is_none()
    }

    /// Distinct sub-formulas in post-order, including `self` last.
    /// Structurally equal sub-formulas appear once, at their first
    /// occurrence.
    pub fn collect_all_nodes(&self) -> Vec<&Formula> {
        fn go<'a>(
            node: &'a Formula,
            seen: &mut HashSet<&'a Formula>,
            nodes: &mut Vec<&'a Formula>,
        ) {
            for child in node.children() {
                go(child, seen, nodes);
            }
            if seen.insert(node) {
                nodes.push(node);
            }
        }
        let mut seen = HashSet::new();
        let mut nodes = Vec::new();
        go(self, &mut seen, &mut nodes);
        nodes
    }

    pub fn atoms(&self) -> BTreeSet<&str> {
        self.collect_all_nodes()
            .into_iter()
            .filter_map(|node| match node {
                Formula::Atom(name) => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// One side of an until, as produced by expanding a derived operator.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Operand<'a> {
    Top,
    Holds(&'a Formula),
    Fails(&'a Formula),
}

/// A future operator rewritten one level into until form, borrowing the
/// operands of the expanded node.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Expansion<'a> {
    Until {
        left: Operand<'a>,
        right: Operand<'a>,
    },
    NotUntil {
        left: Operand<'a>,
        right: Operand<'a>,
    },
}

impl<'a> Expansion<'a> {
    pub fn until(left: &'a Formula, right: &'a Formula) -> Self {
        Expansion::Until {
            left: Operand::Holds(left),
            right: Operand::Holds(right),
        }
    }

    /// F φ ⇔ TRUE U φ
    pub fn eventually(sub: &'a Formula) -> Self {
        Expansion::Until {
            left: Operand::Top,
            right: Operand::Holds(sub),
        }
    }

    /// G φ ⇔ ¬F(¬φ) ⇔ ¬(TRUE U ¬φ)
    pub fn always(sub: &'a Formula) -> Self {
        Expansion::NotUntil {
            left: Operand::Top,
            right: Operand::Fails(sub),
        }
    }
}

/// Evaluates formulas over a borrowed trace.
///
/// Past operators recurse towards index 0. Future operators walk forward
/// and may wrap from the last state to the lasso index, but only once per
/// query session. Every top-level query (`holds`, `holds_throughout`,
/// `holds_at_start`) starts a new session, so an evaluator never carries loop
/// state from one query into the next and the trace itself is never mutated.
///
/// Nothing is memoized, since sub-formulas containing future operators
/// share the loop budget. Each nested past operator walks the prefix again,
/// so `H(H(H(p)))` at index `n` costs on the order of `n^3` steps.
pub struct Evaluator<'a> {
    trace: &'a Trace,
    loop_taken: bool,
}

impl<'a> Evaluator<'a> {
    pub fn new(trace: &'a Trace) -> Self {
        Evaluator {
            trace,
            loop_taken: false,
        }
    }

    pub fn holds(&mut self, formula: &Formula, index: usize) -> Result<bool> {
        if index >= self.trace.len() {
            return Err(SpecificationError::IndexOutOfRange {
                index,
                length: self.trace.len(),
            });
        }
        self.check_atoms(formula, index)?;
        self.reset();
        let value = self.evaluate(formula, index)?;
        trace!(
            "{} at {} of trace {}: {}",
            formula,
            index,
            self.trace.id().unwrap_or("?"),
            value
        );
        Ok(value)
    }

    /// Whether the formula holds at every index of the trace.
    pub fn holds_throughout(&mut self, formula: &Formula) -> Result<bool> {
        for index in 0..self.trace.len() {
            if !self.holds(formula, index)? {
                log::debug!(
                    "{} fails at index {} of trace {}",
                    formula,
                    index,
                    self.trace.id().unwrap_or("?")
                );
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Whether the trace, read once from its first state, satisfies the
    /// formula.
    pub fn holds_at_start(&mut self, formula: &Formula) -> Result<bool> {
        let value = self.holds(formula, 0)?;
        log::debug!(
            "{} over trace {}: {}",
            formula,
            self.trace.id().unwrap_or("?"),
            if value { "SAT" } else { "UNSAT" }
        );
        Ok(value)
    }

    /// Every atom must name a literal of the trace, including atoms in
    /// operands that short-circuiting would never reach.
    fn check_atoms(&self, formula: &Formula, index: usize) -> Result<()> {
        match formula
            .atoms()
            .into_iter()
            .find(|atom| !self.trace.has_literal(atom))
        {
            Some(atom) => Err(SpecificationError::UnknownAtom {
                atom: atom.to_string(),
                index,
            }),
            None => Ok(()),
        }
    }

    /// Clears the loop budget, starting a new session.
    pub fn reset(&mut self) {
        self.loop_taken = false;
    }

    pub fn predecessor(index: usize) -> Option<usize> {
        index.checked_sub(1)
    }

    /// The next index within the current session. Past the last state this
    /// wraps to the lasso index the first time and yields `None` after that.
    pub fn successor(&mut self, index: usize) -> Option<usize> {
        if index + 1 < self.trace.len() {
            Some(index + 1)
        } else if !self.loop_taken {
            self.loop_taken = true;
            trace!("wrapping from {} to lasso {}", index, self.trace.lasso());
            Some(self.trace.lasso())
        } else {
            trace!("loop already taken at {}", index);
            None
        }
    }

    /// Evaluates within the current session, without resetting the loop
    /// budget or checking the index.
    pub fn evaluate(
        &mut self,
        formula: &Formula,
        index: usize,
    ) -> Result<bool> {
        Ok(match formula {
            Formula::True => true,
            Formula::False => false,
            Formula::Atom(name) => self.trace.value(name, index)?,
            Formula::Not(sub) => !self.evaluate(sub, index)?,
            Formula::And(left, right) => {
                self.evaluate(left, index)? && self.evaluate(right, index)?
            }
            Formula::Or(left, right) => {
                self.evaluate(left, index)? || self.evaluate(right, index)?
            }
            Formula::Implies(left, right) => {
                !self.evaluate(left, index)? || self.evaluate(right, index)?
            }
            Formula::Yesterday(sub) => match Self::predecessor(index) {
                Some(previous) => self.evaluate(sub, previous)?,
                None => false,
            },
            Formula::Once(sub) => {
                self.evaluate(sub, index)?
                    || match Self::predecessor(index) {
                        Some(previous) => self.evaluate(formula, previous)?,
                        None => false,
                    }
            }
            Formula::Historically(sub) => {
                self.evaluate(sub, index)?
                    && match Self::predecessor(index) {
                        Some(previous) => self.evaluate(formula, previous)?,
                        None => true,
                    }
            }
            Formula::Since(left, right) => {
                self.evaluate(right, index)?
                    || match Self::predecessor(index) {
                        Some(previous) => {
                            self.evaluate(left, index)?
                                && self.evaluate(formula, previous)?
                        }
                        None => false,
                    }
            }
            Formula::Next(sub) => match self.successor(index) {
                Some(next) => self.evaluate(sub, next)?,
                None => false,
            },
            Formula::Until(left, right) => self
                .evaluate_expansion(Expansion::until(left, right), index)?,
            Formula::Eventually(sub) => {
                self.evaluate_expansion(Expansion::eventually(sub), index)?
            }
            Formula::Always(sub) => {
                self.evaluate_expansion(Expansion::always(sub), index)?
            }
        })
    }

    fn evaluate_expansion(
        &mut self,
        expansion: Expansion,
        index: usize,
    ) -> Result<bool> {
        match expansion {
            Expansion::Until { left, right } => {
                self.evaluate_until(left, right, index)
            }
            Expansion::NotUntil { left, right } => {
                Ok(!self.evaluate_until(left, right, index)?)
            }
        }
    }

    //   l U r at i
    // ⇔ r(i) ∨ (l(i) ∧ (l U r)(next(i)))
    fn evaluate_until(
        &mut self,
        left: Operand,
        right: Operand,
        mut index: usize,
    ) -> Result<bool> {
        loop {
            if self.evaluate_operand(right, index)? {
                return Ok(true);
            }
            if !self.evaluate_operand(left, index)? {
                return Ok(false);
            }
            match self.successor(index) {
                Some(next) => index = next,
                None => return Ok(false),
            }
        }
    }

    fn evaluate_operand(
        &mut self,
        operand: Operand,
        index: usize,
    ) -> Result<bool> {
        match operand {
            Operand::Top => Ok(true),
            Operand::Holds(formula) => self.evaluate(formula, index),
            Operand::Fails(formula) => Ok(!self.evaluate(formula, index)?),
        }
    }
}
