mod report;

use clap::{Parser, Subcommand};
use shopmix_core::{BuiltModel, MilpAdapter, Outcome, ResultExtractor, Scenario};
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "shopmix")]
#[command(about = "Profit-maximizing production mix planner", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a scenario and report the optimal production plan
    Solve {
        /// Scenario JSON file (defaults to the built-in furniture shop)
        #[arg(short, long)]
        scenario: Option<PathBuf>,
        /// Output format (pretty, json)
        #[arg(short, long, default_value = "pretty")]
        format: String,
        /// Show shadow prices and slack
        #[arg(short, long)]
        analysis: bool,
        /// Give up after this many seconds
        #[arg(long)]
        time_limit: Option<f64>,
    },
    /// Check a scenario and show the model it produces
    Check {
        /// Scenario JSON file (defaults to the built-in furniture shop)
        #[arg(short, long)]
        scenario: Option<PathBuf>,
    },
    /// Print the built-in scenario as JSON, for use as a template
    Scenario,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        std::process::exit(1);
    }
}

fn load_scenario(path: Option<&PathBuf>) -> Scenario {
    let Some(path) = path else {
        return Scenario::furniture();
    };
    match Scenario::from_path(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Solve {
            scenario,
            format,
            analysis,
            time_limit,
        } => {
            let scenario = load_scenario(scenario.as_ref());

            let built = match BuiltModel::new(&scenario) {
                Ok(b) => b,
                Err(e) => {
                    eprintln!("Model error: {}", e);
                    std::process::exit(1);
                }
            };

            let mut adapter = MilpAdapter::new();
            if let Some(seconds) = time_limit {
                match Duration::try_from_secs_f64(seconds) {
                    Ok(limit) => adapter = adapter.with_time_limit(limit),
                    Err(e) => {
                        eprintln!("Invalid time limit {}: {}", seconds, e);
                        std::process::exit(1);
                    }
                }
            }

            let solved = built.solve(&adapter);
            let outcome = match solved.extract(&ResultExtractor::new()) {
                Ok(o) => o,
                Err(e) => {
                    eprintln!("Internal error: {}", e);
                    std::process::exit(2);
                }
            };

            if format == "json" {
                match serde_json::to_string_pretty(&outcome) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Error serializing result: {}", e);
                        std::process::exit(1);
                    }
                }
                if outcome.failure().is_some() {
                    std::process::exit(1);
                }
                return;
            }

            match outcome {
                Outcome::Extracted(result) => {
                    let mut out = String::new();
                    if let Err(e) = report::render(&mut out, &scenario, &result, analysis) {
                        eprintln!("Error formatting report: {}", e);
                        std::process::exit(1);
                    }
                    print!("{}", out);
                }
                Outcome::Rejected(failure) => {
                    println!("{}", failure);
                    std::process::exit(1);
                }
            }
        }
        Commands::Check { scenario } => {
            let scenario = load_scenario(scenario.as_ref());

            match scenario.build_model() {
                Ok(model) => {
                    println!("✓ scenario is valid");
                    println!("  {} products", model.variables.len());
                    println!("  {} constraints", model.constraints.len());
                    for c in &model.constraints {
                        let terms: Vec<String> = c
                            .coefficients
                            .iter()
                            .map(|(p, coef)| format!("{} {}", coef, p))
                            .collect();
                        println!("    {:24} {} {} {}", c.name, terms.join(" + "), c.relation, c.bound);
                    }
                }
                Err(e) => {
                    eprintln!("✗ scenario has errors:");
                    eprintln!("  {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Scenario => match Scenario::furniture().to_json_pretty() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
    }
}
