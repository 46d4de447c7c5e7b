use serde::Serialize;

use crate::{
    specification::{
        ltl::{Evaluator, Formula},
        result::Result,
    },
    trace::Trace,
};

/// Truth values of every distinct sub-formula at every index of a trace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TruthTable {
    length: usize,
    lasso: usize,
    rows: Vec<Row>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub formula: Formula,
    pub values: Vec<bool>,
}

impl TruthTable {
    /// Rows follow `Formula::collect_all_nodes`, so operands come before the
    /// formulas built from them and the whole formula comes last.
    pub fn compute(trace: &Trace, formula: &Formula) -> Result<Self> {
        let mut evaluator = Evaluator::new(trace);
        let rows = formula
            .collect_all_nodes()
            .into_iter()
            .map(|node| {
                let values = (0..trace.len())
                    .map(|index| evaluator.holds(node, index))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Row {
                    formula: node.clone(),
                    values,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(TruthTable {
            length: trace.len(),
            lasso: trace.lasso(),
            rows,
        })
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn lasso(&self) -> usize {
        self.lasso
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, formula: &Formula) -> Option<&Row> {
        self.rows.iter().find(|row| &row.formula == formula)
    }
}
