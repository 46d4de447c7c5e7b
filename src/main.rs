use std::{path::PathBuf, str::FromStr};

use anyhow::{Context, Result};
use clap::Parser;
use serde_json as json;

use pltl::{
    runner::{Mode, RunnerOptions, classify},
    specification::{
        ltl::{Evaluator, Formula},
        table::TruthTable,
    },
    trace::{Trace, sample::Sample, writer::VerdictWriter},
};

#[derive(Parser)]
#[command(version, about)]
struct CLI {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Evaluate a formula on a single lasso trace.
    Check {
        #[arg(long)]
        formula: FormulaSource,
        #[arg(long)]
        trace: String,
        #[arg(long, value_delimiter = ',')]
        literals: Option<Vec<String>>,
        #[arg(long, default_value_t = 0, conflicts_with = "throughout")]
        index: usize,
        #[arg(long, default_value_t = false)]
        throughout: bool,
    },
    /// Print the value of every sub-formula at every index.
    Table {
        #[arg(long)]
        formula: FormulaSource,
        #[arg(long)]
        trace: String,
        #[arg(long, value_delimiter = ',')]
        literals: Option<Vec<String>>,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Check formulas against the positive and negative traces of a sample.
    Classify {
        sample: PathBuf,
        #[arg(long = "formula", required = true)]
        formulas: Vec<FormulaSource>,
        #[arg(long, default_value_t = false)]
        throughout: bool,
        #[arg(long)]
        report: Option<PathBuf>,
        #[arg(long, default_value_t = false)]
        exit_on_mismatch: bool,
    },
}

/// A formula given either as a path to a JSON file or as inline JSON.
#[derive(Clone)]
struct FormulaSource {
    formula: Formula,
}

impl FromStr for FormulaSource {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let path = std::path::Path::new(s);
        let text = if path.is_file() {
            std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?
        } else {
            s.to_string()
        };
        let formula = json::from_str::<Formula>(&text)
            .with_context(|| format!("parsing formula {}", s))?;
        Ok(FormulaSource { formula })
    }
}

fn main() -> Result<()> {
    let env = env_logger::Env::default().default_filter_or("info");
    env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .format_target(true)
        .init();
    let cli = CLI::parse();
    match run(cli.command) {
        Ok(true) => Ok(()),
        Ok(false) => std::process::exit(1),
        Err(error) => {
            eprintln!("{:#}", error);
            std::process::exit(2);
        }
    }
}

fn run(command: Command) -> Result<bool> {
    match command {
        Command::Check {
            formula,
            trace,
            literals,
            index,
            throughout,
        } => {
            let trace = Trace::parse(&trace, literals.as_deref())
                .with_context(|| format!("parsing trace {}", trace))?;
            let mut evaluator = Evaluator::new(&trace);
            let holds = if throughout {
                evaluator.holds_throughout(&formula.formula)?
            } else {
                evaluator.holds(&formula.formula, index)?
            };
            println!("{}", holds);
            Ok(holds)
        }
        Command::Table {
            formula,
            trace,
            literals,
            json: as_json,
        } => {
            let trace = Trace::parse(&trace, literals.as_deref())
                .with_context(|| format!("parsing trace {}", trace))?;
            let table = TruthTable::compute(&trace, &formula.formula)?;
            if as_json {
                println!("{}", json::to_string_pretty(&table)?);
            } else {
                println!("{}", table);
            }
            Ok(true)
        }
        Command::Classify {
            sample,
            formulas,
            throughout,
            report,
            exit_on_mismatch,
        } => {
            let sample = Sample::load(&sample)
                .with_context(|| format!("loading {}", sample.display()))?;
            let formulas: Vec<Formula> = formulas
                .into_iter()
                .map(|source| source.formula)
                .collect();
            let options = RunnerOptions {
                mode: if throughout {
                    Mode::Throughout
                } else {
                    Mode::AtStart
                },
                exit_on_mismatch,
            };
            let classification = classify(&sample, &formulas, &options)?;

            if let Some(path) = report {
                let mut writer = VerdictWriter::create(&path)
                    .with_context(|| {
                        format!("opening {}", path.display())
                    })?;
                for verdict in &classification.verdicts {
                    writer.write(verdict)?;
                }
                log::info!("wrote {} verdicts", writer.written());
                writer.finish()?;
            }

            for formula in &classification.formulas {
                let mismatches = classification
                    .mismatches()
                    .filter(|verdict| &verdict.formula == formula)
                    .count();
                if mismatches == 0 {
                    println!("{}: consistent", formula);
                } else {
                    println!("{}: {} mismatch(es)", formula, mismatches);
                }
            }
            Ok(classification.is_consistent())
        }
    }
}
