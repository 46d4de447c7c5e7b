use std::fmt::{self, Display};

use crate::specification::{ltl::Formula, table::TruthTable};

/// Prefix notation: `U(p,!(q))`, `G(p)`, `TRUE`.
impl Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.left(), self.right()) {
            (Some(left), Some(right)) => {
                write!(f, "{}({},{})", self.label(), left, right)
            }
            (Some(sub), None) => write!(f, "{}({})", self.label(), sub),
            _ => write!(f, "{}", self.label()),
        }
    }
}

/// One row per sub-formula with `1`/`0` cells, headed by the state indices
/// and the lasso target.
impl Display for TruthTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = self;
        let formulas: Vec<String> = table
            .rows()
            .iter()
            .map(|row| row.formula.to_string())
            .collect();
        let width = formulas
            .iter()
            .map(String::len)
            .chain(std::iter::once(1))
            .max()
            .unwrap_or(1);
        let cell = table.length().saturating_sub(1).to_string().len();

        write!(f, "{:<width$} |", "#")?;
        for index in 0..table.length() {
            write!(f, " {:>cell$}", index)?;
        }
        write!(f, " -> {}", table.lasso())?;

        for (formula, row) in formulas.iter().zip(table.rows()) {
            write!(f, "\n{:<width$} |", formula)?;
            for value in &row.values {
                write!(f, " {:>cell$}", if *value { 1 } else { 0 })?;
            }
        }
        Ok(())
    }
}
