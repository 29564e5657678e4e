//! Readiness Eval CLI
//!
//! Entry point for the `readiness-eval` command-line tool.

use clap::{Parser, Subcommand};
use readiness_eval::behavioral::{render_markdown, BehavioralRequirements, BehavioralValidator};
use readiness_eval::config::EvalConfig;
use readiness_eval::runner::TestRunner;
use readiness_eval::scoring::{
    compare_evaluations, score_interpretation, CodeQualityMetrics, EvaluationResult, Evaluator,
};
use readiness_eval::{evaluate_unit, TestRunResult};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "readiness-eval")]
#[command(about = "Test execution and scoring for generated code", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stage a program and its tests, run the suite, and score it
    Run {
        /// Path to the generated program source
        #[arg(long)]
        program: PathBuf,

        /// Path to the generated test suite
        #[arg(long)]
        tests: PathBuf,

        /// Path to config file (default: built-in defaults)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,
    },

    /// Run a test file and print structured results
    Test {
        /// Path to the test file
        test_file: PathBuf,

        /// Override the timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Path to config file (default: built-in defaults)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Validate a program against behavioral requirements
    Validate {
        /// Path to the program under validation
        program: PathBuf,

        /// Path to the behavioral requirements TOML file
        #[arg(long)]
        requirements: PathBuf,

        /// Working directory for scenario execution
        #[arg(long)]
        workdir: Option<PathBuf>,

        /// Path to config file (default: built-in defaults)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,

        /// Output a markdown report
        #[arg(long)]
        markdown: bool,
    },

    /// Score a program from saved test results
    Score {
        /// Path to the program that was tested
        program: PathBuf,

        /// Path to a JSON file of test results
        #[arg(long)]
        results: PathBuf,

        /// Path to a JSON file of code-quality metrics
        #[arg(long)]
        metrics: Option<PathBuf>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Compare evaluation results across rounds
    Compare {
        /// Path to a JSON file of [round, evaluation] pairs, in run order
        scores: PathBuf,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            program,
            tests,
            config,
        } => run_pipeline(&program, &tests, config),
        Commands::Test {
            test_file,
            timeout,
            config,
            json,
        } => run_test(&test_file, timeout, config, json),
        Commands::Validate {
            program,
            requirements,
            workdir,
            config,
            json,
            markdown,
        } => run_validate(&program, &requirements, workdir, config, json, markdown),
        Commands::Score {
            program,
            results,
            metrics,
            json,
        } => run_score(&program, &results, metrics, json),
        Commands::Compare { scores, json } => run_compare(&scores, json),
    }
}

fn load_config(path: Option<PathBuf>) -> EvalConfig {
    let config = match path {
        Some(path) => EvalConfig::load(&path),
        None => Ok(EvalConfig::default()),
    };
    match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            process::exit(1);
        }
    }
}

fn run_pipeline(program: &Path, tests: &Path, config_path: Option<PathBuf>) {
    let config = load_config(config_path);

    let program_source = match fs::read_to_string(program) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error reading program {}: {}", program.display(), e);
            process::exit(1);
        }
    };
    let test_source = match fs::read_to_string(tests) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error reading tests {}: {}", tests.display(), e);
            process::exit(1);
        }
    };

    let outcome = match evaluate_unit(&program_source, &test_source, &config) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("Evaluation failed: {}", e);
            process::exit(1);
        }
    };

    let json = match serde_json::to_string_pretty(&outcome) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            process::exit(1);
        }
    };
    println!("{}", json);

    // Persist the outcome for later comparison across rounds.
    if let Err(e) = save_outcome(&config.results_dir, &outcome.unit_id, &json) {
        eprintln!("Warning: could not save results: {}", e);
    }

    if !outcome.evaluation.success {
        process::exit(1);
    }
}

fn save_outcome(results_dir: &Path, unit_id: &str, json: &str) -> std::io::Result<()> {
    fs::create_dir_all(results_dir)?;
    let path = results_dir.join(format!("{}.json", unit_id));
    fs::write(&path, json)?;
    eprintln!("Results saved to: {}", path.display());
    Ok(())
}

fn run_test(test_file: &Path, timeout: Option<u64>, config_path: Option<PathBuf>, json: bool) {
    let config = load_config(config_path);

    let mut runner = TestRunner::new(test_file.to_path_buf(), &config);
    if let Some(seconds) = timeout {
        runner = runner.with_timeout(Duration::from_secs(seconds));
    }

    let results = match runner.run() {
        Ok(results) => results,
        Err(e) => {
            eprintln!("Test run failed: {}", e);
            process::exit(1);
        }
    };

    if json {
        match results.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(1);
            }
        }
    } else {
        println!("{}", results.coverage_summary());
        for detail in &results.details {
            let reason = if detail.reason.is_empty() {
                String::new()
            } else {
                format!(" - {}", detail.reason)
            };
            println!("  {:?} {}{}", detail.status, detail.name, reason);
        }
        if results.parse_degraded {
            println!(
                "  (output parsing degraded: {})",
                results.parse_error.as_deref().unwrap_or("unknown")
            );
        }
    }

    if !results.success {
        process::exit(1);
    }
}

fn run_validate(
    program: &Path,
    requirements_path: &Path,
    workdir: Option<PathBuf>,
    config_path: Option<PathBuf>,
    json: bool,
    markdown: bool,
) {
    let config = load_config(config_path);

    let requirements = match BehavioralRequirements::load(requirements_path) {
        Ok(requirements) => requirements,
        Err(e) => {
            eprintln!("Error loading requirements: {}", e);
            process::exit(1);
        }
    };

    let validator = BehavioralValidator::new(requirements, &config);
    let report = validator.validate(program, workdir.as_deref());

    if markdown {
        println!("{}", render_markdown(&report));
    } else if json {
        match report.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(1);
            }
        }
    } else {
        println!(
            "Behavioral score: {:.1}/{:.1} ({:.1}%), {} passed, {} failed",
            report.score,
            report.total_weight,
            report.score_percent(),
            report.passed,
            report.failed
        );
        for result in &report.results {
            let marker = if result.passed { "PASS" } else { "FAIL" };
            match &result.error {
                Some(error) => println!("  {} {} ({})", marker, result.name, error),
                None => println!("  {} {}", marker, result.name),
            }
        }
        if let Some(error) = &report.error {
            println!("  Error: {}", error);
        }
    }

    if report.failed > 0 || report.error.is_some() {
        process::exit(1);
    }
}

fn run_score(program: &Path, results_path: &Path, metrics_path: Option<PathBuf>, json: bool) {
    let results = match read_json::<TestRunResult>(results_path) {
        Ok(results) => results,
        Err(e) => {
            eprintln!("Error reading test results: {}", e);
            process::exit(1);
        }
    };

    let metrics = match metrics_path {
        Some(path) => match read_json::<CodeQualityMetrics>(&path) {
            Ok(metrics) => Some(metrics),
            Err(e) => {
                eprintln!("Error reading metrics: {}", e);
                process::exit(1);
            }
        },
        None => None,
    };

    let evaluator = Evaluator::new(&EvalConfig::default());
    let evaluation = match evaluator.evaluate(program, &results, metrics.as_ref()) {
        Ok(evaluation) => evaluation,
        Err(e) => {
            eprintln!("Scoring failed: {}", e);
            process::exit(1);
        }
    };

    if json {
        match evaluation.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(1);
            }
        }
    } else {
        println!("Score: {}/100 ({})", evaluation.score, score_interpretation(evaluation.score));
        println!("{}", evaluation.reasoning);
    }

    if !evaluation.success {
        process::exit(1);
    }
}

fn run_compare(scores_path: &Path, json: bool) {
    let rounds = match read_json::<Vec<(String, EvaluationResult)>>(scores_path) {
        Ok(rounds) => rounds,
        Err(e) => {
            eprintln!("Error reading scores: {}", e);
            process::exit(1);
        }
    };

    let comparison = match compare_evaluations(&rounds) {
        Ok(comparison) => comparison,
        Err(e) => {
            eprintln!("Comparison failed: {}", e);
            process::exit(1);
        }
    };

    if json {
        match serde_json::to_string_pretty(&comparison) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(1);
            }
        }
    } else {
        println!(
            "Best: {} ({}), Worst: {} ({}), Average: {:.1}",
            comparison.best_round,
            comparison.best_score,
            comparison.worst_round,
            comparison.worst_score,
            comparison.average_score
        );
        println!(
            "Improvement: {:+}, Trend: {:?}",
            comparison.improvement, comparison.trend
        );
        for round in &comparison.all_scores {
            println!("  {}: {}", round.round, round.score);
        }
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, String> {
    let raw = fs::read_to_string(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    serde_json::from_str(&raw).map_err(|e| format!("{}: {}", path.display(), e))
}
