//! CLI entrypoint for the ecert conformance harness.

use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand, ValueEnum};
use ecert_harness::fixtures::fixture_paths;
use ecert_harness::report::FixtureDigest;
use ecert_harness::runner::execute_calls;
use ecert_harness::structured_log::{LogEmitter, LogEntry, LogLevel};
use ecert_harness::verify::{VerificationSummary, sort_results};
use ecert_harness::{ConformanceReport, FixtureSet, HarnessError, RuntimeCall, TestRunner};
use ecert_membrane::{DiagnosticStyle, RuntimeConfig, RuntimeMode};

/// Conformance tooling for the ecert runtime.
#[derive(Debug, Parser)]
#[command(name = "ecert-harness")]
#[command(about = "Conformance testing harness for the ecert runtime")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    Strict,
    Hardened,
    Both,
}

impl ModeArg {
    fn modes(self) -> &'static [RuntimeMode] {
        match self {
            Self::Strict => &[RuntimeMode::Strict],
            Self::Hardened => &[RuntimeMode::Hardened],
            Self::Both => &[RuntimeMode::Strict, RuntimeMode::Hardened],
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Hardened => "hardened",
            Self::Both => "strict+hardened",
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Verify the runtime against fixture files.
    Verify {
        /// Directory containing fixture JSON files.
        #[arg(long)]
        fixture: PathBuf,
        /// Mode(s) to verify under.
        #[arg(long, value_enum, default_value = "both")]
        mode: ModeArg,
        /// Output report path (markdown; JSON is written alongside).
        #[arg(long)]
        report: Option<PathBuf>,
        /// Structured JSONL log path.
        #[arg(long)]
        log: Option<PathBuf>,
        /// Optional fixed timestamp string for deterministic report generation.
        #[arg(long)]
        timestamp: Option<String>,
    },
    /// Run one call script and print what the program would observe.
    Run {
        #[arg(long, value_enum, default_value = "strict")]
        mode: ModeArg,
        /// Text fed to standard input.
        #[arg(long, default_value = "")]
        stdin: String,
        /// JSON array of calls, e.g. `[{"op":"get_integer"}]`.
        #[arg(long)]
        calls: String,
        /// Use the legacy right-operand diagnostic.
        #[arg(long)]
        legacy_diagnostic: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Verify {
            fixture,
            mode,
            report,
            log,
            timestamp,
        } => {
            eprintln!("Verifying against fixtures in {}", fixture.display());
            let paths = fixture_paths(&fixture)?;
            let mut fixture_sets = Vec::new();
            let mut digests = Vec::new();
            for path in paths {
                match FixtureSet::from_file(&path).and_then(|set| set.validate().map(|()| set)) {
                    Ok(set) => {
                        digests.push(FixtureDigest::from_file(&path)?);
                        fixture_sets.push(set);
                    }
                    Err(err) => eprintln!("Skipping {}: {}", path.display(), err),
                }
            }
            if fixture_sets.is_empty() {
                return Err(HarnessError::NoFixtures(fixture).into());
            }

            let mut emitter = match &log {
                Some(path) => Some(LogEmitter::to_file(path, "verify")?),
                None => None,
            };

            let started = Instant::now();
            let mut results = Vec::new();
            for &run_mode in mode.modes() {
                let runner = TestRunner::new("fixture-verify", run_mode);
                for set in &fixture_sets {
                    results.extend(runner.run(set));
                }
            }
            sort_results(&mut results);

            if let Some(emitter) = emitter.as_mut() {
                for result in &results {
                    emitter.emit_entry(LogEntry::for_result(result))?;
                }
            }

            let summary = VerificationSummary::from_results(results);
            let report_doc = ConformanceReport {
                title: String::from("ecert Conformance Report"),
                mode: mode.label().to_string(),
                timestamp: timestamp.unwrap_or_else(ecert_membrane::log::now_utc),
                fixtures: digests,
                summary,
            };

            eprintln!(
                "Verification complete: total={}, passed={}, failed={}",
                report_doc.summary.total, report_doc.summary.passed, report_doc.summary.failed
            );

            if let Some(mut emitter) = emitter {
                let level = if report_doc.summary.all_passed() {
                    LogLevel::Info
                } else {
                    LogLevel::Error
                };
                emitter.emit_entry(
                    LogEntry::new("", level, "verify_complete")
                        .with_duration_ms(started.elapsed().as_millis() as u64)
                        .with_details(serde_json::json!({
                            "total": report_doc.summary.total,
                            "passed": report_doc.summary.passed,
                            "failed": report_doc.summary.failed,
                        })),
                )?;
                emitter.flush()?;
            }

            if let Some(report_path) = report {
                eprintln!("Writing report to {}", report_path.display());
                std::fs::write(&report_path, report_doc.to_markdown())?;
                let json_path = report_path.with_extension("json");
                std::fs::write(&json_path, report_doc.to_json())?;
            }

            if !report_doc.summary.all_passed() {
                return Err("Conformance verification failed".into());
            }
        }
        Command::Run {
            mode,
            stdin,
            calls,
            legacy_diagnostic,
        } => {
            let run_mode = match mode {
                ModeArg::Strict => RuntimeMode::Strict,
                ModeArg::Hardened => RuntimeMode::Hardened,
                ModeArg::Both => return Err(HarnessError::Mode("both".into()).into()),
            };
            let diagnostic = if legacy_diagnostic {
                DiagnosticStyle::Legacy
            } else {
                DiagnosticStyle::Corrected
            };
            let calls = RuntimeCall::parse_list(&calls)?;
            let run = execute_calls(&stdin, &calls, RuntimeConfig::new(run_mode, diagnostic))?;

            let mut stdout = std::io::stdout().lock();
            stdout.write_all(run.stdout.as_bytes())?;
            stdout.flush()?;
            eprintln!();
            eprintln!("returns: {}", serde_json::Value::Array(run.returns));
            eprintln!("heals: {}", run.heals);
            eprintln!("exit: {}", run.exit);
            if run.exit != 0 {
                std::process::exit(run.exit);
            }
        }
    }

    Ok(())
}
