use std::{fs, path::Path, str::FromStr};

use log::{debug, info};

use crate::{
    specification::result::{Result, SpecificationError},
    trace::{Polarity, Trace},
};

const SEPARATOR: &str = "---";

/// Example traces for classifying candidate formulas, read from a file of
/// `---`-separated sections:
///
/// ```text
/// p,q
/// ---
/// 1,0;0,1::1
/// ---
/// 0,0;0,0
/// ```
///
/// The first section declares the literals, the second holds positive
/// traces and the third negative ones, one per line. Anything after a third
/// separator is ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub literals: Vec<String>,
    pub positive: Vec<Trace>,
    pub negative: Vec<Trace>,
}

impl Sample {
    pub fn load(path: &Path) -> Result<Self> {
        info!("loading sample from {}", path.display());
        fs::read_to_string(path)?.parse()
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let mut sections: Vec<Vec<(usize, &str)>> = vec![Vec::new()];
        for (number, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line == SEPARATOR {
                sections.push(Vec::new());
            } else if !line.is_empty()
                && let Some(section) = sections.last_mut()
            {
                section.push((number + 1, line));
            }
        }

        if sections.len() < 3 {
            return Err(SpecificationError::MalformedSample(format!(
                "expected literals, positive and negative sections separated \
                 by '{}', found {} section(s)",
                SEPARATOR,
                sections.len()
            )));
        }

        let literals: Vec<String> = match sections[0].as_slice() {
            [(_, line)] => line
                .split(',')
                .map(|literal| literal.trim().to_string())
                .filter(|literal| !literal.is_empty())
                .collect(),
            [] => Vec::new(),
            [_, (number, _), ..] => {
                return Err(SpecificationError::MalformedSample(format!(
                    "line {}: literals must be declared on a single line",
                    number
                )));
            }
        };
        if literals.is_empty() {
            return Err(SpecificationError::MalformedSample(
                "no literals declared".to_string(),
            ));
        }

        let positive = parse_traces(&sections[1], &literals)?;
        let negative = parse_traces(&sections[2], &literals)?;
        debug!(
            "sample over {:?}: {} positive, {} negative",
            literals,
            positive.len(),
            negative.len()
        );

        Ok(Sample {
            literals,
            positive,
            negative,
        })
    }

    /// All traces, positive ones first.
    pub fn traces(&self) -> impl Iterator<Item = (Polarity, &Trace)> {
        self.positive
            .iter()
            .map(|trace| (Polarity::Positive, trace))
            .chain(
                self.negative
                    .iter()
                    .map(|trace| (Polarity::Negative, trace)),
            )
    }
}

fn parse_traces(
    lines: &[(usize, &str)],
    literals: &[String],
) -> Result<Vec<Trace>> {
    lines
        .iter()
        .map(|(number, line)| {
            Trace::parse(line, Some(literals))
                .map(|trace| trace.with_id(number.to_string()))
                .map_err(|error| {
                    SpecificationError::MalformedSample(format!(
                        "line {}: {}",
                        number, error
                    ))
                })
        })
        .collect()
}

impl FromStr for Sample {
    type Err = SpecificationError;

    fn from_str(s: &str) -> Result<Self> {
        Sample::parse(s)
    }
}
