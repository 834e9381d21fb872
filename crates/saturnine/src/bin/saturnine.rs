//! Command-line front end for the saturnine prover.

use clap::{value_parser, Arg, ArgAction, Command};
use saturnine::output::{write_answer, write_refutation, write_status};
use saturnine::parser::parse_problem_file;
use saturnine::{
    LiteralSelection, OrderingKind, Outcome, OutputMode, Prover, ProverConfig, SplitMode,
    TerminationReason,
};
use std::path::PathBuf;
use std::process::ExitCode;

fn cli() -> Command {
    Command::new("saturnine")
        .about("Saturation-based theorem prover for first-order logic with equality")
        .arg(
            Arg::new("problem")
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .help("TPTP problem file (CNF or FOF)"),
        )
        .arg(
            Arg::new("include")
                .long("include")
                .short('I')
                .action(ArgAction::Append)
                .value_parser(value_parser!(PathBuf))
                .help("Directory searched for include directives (repeatable)"),
        )
        .arg(
            Arg::new("selection")
                .long("selection")
                .value_parser(["0", "20", "21", "22"])
                .default_value("21")
                .help("Literal selection function"),
        )
        .arg(
            Arg::new("age-weight-ratio")
                .long("age-weight-ratio")
                .default_value("1:4")
                .help("Age to weight pick ratio, as a:w"),
        )
        .arg(
            Arg::new("ordering")
                .long("ordering")
                .value_parser(["kbo", "lpo"])
                .default_value("kbo")
                .help("Simplification ordering"),
        )
        .arg(
            Arg::new("splitting")
                .long("splitting")
                .value_parser(["off", "input", "full"])
                .default_value("full")
                .help("Clause splitting mode"),
        )
        .arg(
            Arg::new("time-limit")
                .long("time-limit")
                .short('t')
                .value_parser(value_parser!(u64))
                .default_value("600")
                .help("Soft time limit in deciseconds"),
        )
        .arg(
            Arg::new("memory-limit")
                .long("memory-limit")
                .short('m')
                .value_parser(value_parser!(usize))
                .help("Soft memory limit in MB"),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .value_parser(value_parser!(u64))
                .default_value("0")
                .help("Random seed for tie-breaking"),
        )
        .arg(
            Arg::new("max-clauses")
                .long("max-clauses")
                .value_parser(value_parser!(usize))
                .default_value("0")
                .help("Clause limit, 0 for unlimited"),
        )
        .arg(
            Arg::new("max-iterations")
                .long("max-iterations")
                .value_parser(value_parser!(usize))
                .default_value("0")
                .help("Given-clause iteration limit, 0 for unlimited"),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .value_parser(["proof", "stats", "quiet"])
                .default_value("proof")
                .help("What to print after the run"),
        )
}

fn build_config(matches: &clap::ArgMatches) -> Result<ProverConfig, String> {
    let mut config = ProverConfig::default();

    config.selection = match matches.get_one::<String>("selection").unwrap().as_str() {
        "0" => LiteralSelection::Sel0,
        "20" => LiteralSelection::Sel20,
        "22" => LiteralSelection::Sel22,
        _ => LiteralSelection::Sel21,
    };

    let ratio = matches.get_one::<String>("age-weight-ratio").unwrap();
    let parts: Vec<&str> = ratio.split(':').collect();
    if parts.len() != 2 {
        return Err(format!("malformed age-weight ratio: {}", ratio));
    }
    let age: u32 = parts[0]
        .parse()
        .map_err(|_| format!("malformed age-weight ratio: {}", ratio))?;
    let weight: u32 = parts[1]
        .parse()
        .map_err(|_| format!("malformed age-weight ratio: {}", ratio))?;
    config.age_weight_ratio = (age, weight);

    config.ordering = match matches.get_one::<String>("ordering").unwrap().as_str() {
        "lpo" => OrderingKind::Lpo,
        _ => OrderingKind::Kbo,
    };
    config.split_mode = match matches.get_one::<String>("splitting").unwrap().as_str() {
        "off" => SplitMode::Off,
        "input" => SplitMode::Input,
        _ => SplitMode::Full,
    };
    config = config.with_time_limit_ds(*matches.get_one::<u64>("time-limit").unwrap());
    config.memory_limit_mb = matches.get_one::<usize>("memory-limit").copied();
    config.seed = *matches.get_one::<u64>("seed").unwrap();
    config.max_clauses = *matches.get_one::<usize>("max-clauses").unwrap();
    config.max_iterations = *matches.get_one::<usize>("max-iterations").unwrap();
    config.output = match matches.get_one::<String>("output").unwrap().as_str() {
        "stats" => OutputMode::Statistics,
        "quiet" => OutputMode::Quiet,
        _ => OutputMode::Proof,
    };
    config.include_dirs = matches
        .get_many::<PathBuf>("include")
        .map(|dirs| dirs.cloned().collect())
        .unwrap_or_default();
    Ok(config)
}

/// Process exit code for a finished run: 0 for a refutation or a
/// genuinely satisfiable saturation, 1 when the prover gave up (limits,
/// or saturation under an incomplete strategy).
fn exit_code(outcome: Outcome, termination: TerminationReason) -> u8 {
    match outcome {
        Outcome::Refutation(_) => 0,
        Outcome::Saturated => {
            if termination == TerminationReason::Satisfiable {
                0
            } else {
                1
            }
        }
        _ => 1,
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let matches = cli().get_matches();

    let mut config = match build_config(&matches) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("saturnine: {}", message);
            return ExitCode::from(2);
        }
    };

    let path = matches.get_one::<PathBuf>("problem").unwrap();
    let problem = match parse_problem_file(path, &config.include_dirs) {
        Ok(problem) => problem,
        Err(error) => {
            eprintln!("saturnine: {}", error);
            println!("% SZS status SyntaxError for {}", path.display());
            return ExitCode::from(2);
        }
    };
    config.problem_name = problem.name.clone();

    let mut prover = Prover::new(problem, config);
    let outcome = prover.prove();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_status(&mut out, outcome, &prover).ok();

    if let Outcome::Refutation(refutation) = outcome {
        // Surface witnesses for existential conjectures
        if prover.answers.is_active() {
            if let Some(tuple) = prover.extract_answer(refutation) {
                write_answer(&mut out, &tuple, &prover).ok();
            }
        }
        if prover.config.output == OutputMode::Proof {
            write_refutation(&mut out, refutation, &prover).ok();
        }
    }

    if prover.config.output != OutputMode::Quiet {
        println!("{}", prover.stats);
    }

    ExitCode::from(exit_code(outcome, prover.stats.termination))
}
