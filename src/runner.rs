use anyhow::{Context, Result, bail};
use log::{debug, info, warn};

use crate::{
    specification::ltl::{Evaluator, Formula},
    trace::{Polarity, Trace, VerdictEntry, sample::Sample},
};

/// How a trace is judged to satisfy a formula.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    /// The formula holds at the first state.
    #[default]
    AtStart,
    /// The formula holds at every state.
    Throughout,
}

#[derive(Clone, Debug, Default)]
pub struct RunnerOptions {
    pub mode: Mode,
    pub exit_on_mismatch: bool,
}

#[derive(Clone, Debug)]
pub struct Classification {
    pub formulas: Vec<Formula>,
    pub verdicts: Vec<VerdictEntry>,
}

impl Classification {
    pub fn mismatches(&self) -> impl Iterator<Item = &VerdictEntry> {
        self.verdicts.iter().filter(|verdict| !verdict.is_match())
    }

    pub fn is_consistent(&self) -> bool {
        self.mismatches().next().is_none()
    }

    /// Formulas accepting every positive and rejecting every negative trace.
    pub fn consistent_formulas(&self) -> Vec<&Formula> {
        self.formulas
            .iter()
            .filter(|formula| {
                self.verdicts
                    .iter()
                    .filter(|verdict| &verdict.formula == *formula)
                    .all(VerdictEntry::is_match)
            })
            .collect()
    }
}

pub fn classify(
    sample: &Sample,
    formulas: &[Formula],
    options: &RunnerOptions,
) -> Result<Classification> {
    info!(
        "classifying {} positive and {} negative traces against {} formula(s)",
        sample.positive.len(),
        sample.negative.len(),
        formulas.len()
    );

    let mut verdicts = Vec::new();
    for formula in formulas {
        for (polarity, trace) in sample.traces() {
            let entry = judge(formula, polarity, trace, options.mode)?;
            let line = trace.id().unwrap_or("?");
            if entry.is_match() {
                debug!(
                    "{} {} trace on line {} is {}",
                    formula,
                    polarity,
                    line,
                    sat(entry.actual)
                );
            } else if options.exit_on_mismatch {
                bail!(
                    "mismatch: {} {} trace on line {} is {}",
                    formula,
                    polarity,
                    line,
                    sat(entry.actual)
                );
            } else {
                warn!(
                    "{} {} trace on line {} is {}",
                    formula,
                    polarity,
                    line,
                    sat(entry.actual)
                );
            }
            verdicts.push(entry);
        }
    }
    debug!("finished classifying");

    Ok(Classification {
        formulas: formulas.to_vec(),
        verdicts,
    })
}

fn judge(
    formula: &Formula,
    polarity: Polarity,
    trace: &Trace,
    mode: Mode,
) -> Result<VerdictEntry> {
    let mut evaluator = Evaluator::new(trace);
    let actual = match mode {
        Mode::AtStart => evaluator.holds_at_start(formula),
        Mode::Throughout => evaluator.holds_throughout(formula),
    }
    .with_context(|| {
        format!(
            "evaluating {} on trace {} (line {})",
            formula,
            trace,
            trace.id().unwrap_or("?")
        )
    })?;
    Ok(VerdictEntry {
        formula: formula.clone(),
        trace_id: trace.id().map(str::to_string),
        trace: trace.to_string(),
        polarity,
        expected: polarity.expected(),
        actual,
    })
}

fn sat(value: bool) -> &'static str {
    if value { "SAT" } else { "UNSAT" }
}
