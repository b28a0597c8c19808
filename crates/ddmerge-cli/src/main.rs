//! ddmerge - default-data merge CLI
//!
//! Loads a baseline default-data document, enriches it from the configured
//! project sources and DriverLog, and writes the merged dataset.
//!
//! ## Commands
//!
//! - `run`: normalize, reconcile project lists, integrate DriverLog data
//! - `normalize`: only fill in the dataset's defaults
//! - `check`: normalize and report invariant violations

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ddmerge_core::obs::PipelineSpan;
use ddmerge_core::{
    check, normalize_default_data, DefaultData, DefaultDataPipeline, PipelineReport, Violation,
};
use ddmerge_remote::{default_registry, HttpJsonFetcher, RemoteConfig};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn, Level};

#[derive(Parser, Debug)]
#[command(name = "ddmerge")]
#[command(author = "ddmerge developers")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Merge project directories and DriverLog data into a default-data set", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the full pipeline over a baseline dataset
    Run {
        /// Baseline default-data JSON file
        #[arg(short, long)]
        default_data: PathBuf,

        /// DriverLog document (http(s)://, file:// or a path)
        #[arg(long, env = "DDMERGE_DRIVERLOG_URI")]
        driverlog_uri: Option<String>,

        /// Output path for the merged dataset (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also write the pipeline report as JSON to this path
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Only normalize a dataset
    Normalize {
        /// Default-data JSON file
        #[arg(short, long)]
        default_data: PathBuf,

        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Normalize a dataset and verify its invariants
    Check {
        /// Default-data JSON file
        #[arg(short, long)]
        default_data: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    ddmerge_core::init_tracing(cli.json, level);

    match cli.command {
        Commands::Run {
            default_data,
            driverlog_uri,
            output,
            report,
        } => {
            let pipeline = build_pipeline(driverlog_uri)?;
            cmd_run(
                &pipeline,
                &default_data,
                output.as_deref(),
                report.as_deref(),
            )
            .await
        }
        Commands::Normalize {
            default_data,
            output,
        } => cmd_normalize(&default_data, output.as_deref()),
        Commands::Check { default_data } => cmd_check(&default_data, cli.json),
    }
}

/// Pipeline wired to the HTTP retrievers, configured from the environment
fn build_pipeline(driverlog_uri: Option<String>) -> Result<DefaultDataPipeline> {
    let config = RemoteConfig::from_env();
    let registry = default_registry(&config).context("Failed to set up project retrievers")?;
    let fetcher =
        HttpJsonFetcher::from_config(&config).context("Failed to set up DriverLog fetcher")?;

    let pipeline = DefaultDataPipeline::new(registry, Arc::new(fetcher));
    Ok(match driverlog_uri {
        Some(uri) if !uri.is_empty() => pipeline.with_driverlog_uri(uri),
        _ => pipeline,
    })
}

async fn cmd_run(
    pipeline: &DefaultDataPipeline,
    default_data: &Path,
    output: Option<&Path>,
    report_path: Option<&Path>,
) -> Result<()> {
    let data = load_default_data(default_data)?;
    let outcome = pipeline.run(data).await;

    summarize(&outcome.report);
    if let Some(path) = report_path {
        write_json(&outcome.report, Some(path))?;
    }
    write_default_data(&outcome.data, output)
}

fn cmd_normalize(default_data: &Path, output: Option<&Path>) -> Result<()> {
    let _span = PipelineSpan::enter("normalize");
    let mut data = load_default_data(default_data)?;
    let report = normalize_default_data(&mut data);
    info!(
        releases_defaulted = report.releases_defaulted,
        user_ids_assigned = report.user_ids_assigned,
        independent_added = report.independent_added,
        "Dataset normalized"
    );
    write_default_data(&data, output)
}

fn cmd_check(default_data: &Path, json: bool) -> Result<()> {
    let violations = check_file(default_data)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&violations)?);
    } else if violations.is_empty() {
        println!("✓ {:?}: no violations", default_data);
    } else {
        for violation in &violations {
            println!("✗ {violation}");
        }
    }

    if !violations.is_empty() {
        anyhow::bail!("{} invariant violation(s)", violations.len());
    }
    Ok(())
}

fn check_file(default_data: &Path) -> Result<Vec<Violation>> {
    let _span = PipelineSpan::enter("check");
    let mut data = load_default_data(default_data)?;
    normalize_default_data(&mut data);
    Ok(check(&data))
}

fn summarize(report: &PipelineReport) {
    info!(
        sources = report.reconcile.sources_processed,
        repos_added = report.reconcile.repos_added,
        repos_merged = report.reconcile.repos_merged,
        groups_created = report.reconcile.groups_created,
        "Project lists reconciled"
    );
    for issue in &report.reconcile.issues {
        warn!(
            organization = %issue.organization,
            uri = %issue.uri,
            "Source skipped: {}",
            issue.detail
        );
    }
    if let Some(drivers) = &report.driverlog {
        info!(
            attached = drivers.attached,
            dropped = drivers.dropped,
            users_added = drivers.users_added,
            "DriverLog integrated"
        );
    }
    if let Some(err) = &report.driverlog_error {
        warn!("DriverLog not integrated: {err}");
    }
}

fn load_default_data(path: &Path) -> Result<DefaultData> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read default data: {:?}", path))?;
    DefaultData::from_json_str(&content)
        .with_context(|| format!("Invalid default data in {:?}", path))
}

fn write_default_data(data: &DefaultData, output: Option<&Path>) -> Result<()> {
    write_json(data, output)
}

fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            std::fs::write(path, rendered + "\n")
                .with_context(|| format!("Failed to write {:?}", path))?;
            info!(path = ?path, "Written");
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ddmerge_core::fakes::{MemoryJsonFetcher, OrganizationRetriever};
    use ddmerge_core::{RepoCandidate, RetrieverRegistry};
    use serde_json::{json, Value};
    use tempfile::tempdir;

    fn write_file(dir: &Path, name: &str, value: Value) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, serde_json::to_string(&value).unwrap()).unwrap();
        path
    }

    #[test]
    fn test_cli_parses_run_with_globals() {
        let cli = Cli::try_parse_from([
            "ddmerge",
            "--json",
            "run",
            "--default-data",
            "default_data.json",
            "--driverlog-uri",
            "file:///tmp/driverlog.json",
            "-o",
            "out.json",
        ])
        .unwrap();
        assert!(cli.json);
        assert!(!cli.verbose);
        match cli.command {
            Commands::Run {
                default_data,
                driverlog_uri,
                output,
                report,
            } => {
                assert_eq!(default_data, PathBuf::from("default_data.json"));
                assert_eq!(driverlog_uri.as_deref(), Some("file:///tmp/driverlog.json"));
                assert_eq!(output, Some(PathBuf::from("out.json")));
                assert!(report.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_requires_default_data() {
        assert!(Cli::try_parse_from(["ddmerge", "check"]).is_err());
    }

    #[test]
    fn test_normalize_writes_output() {
        let dir = tempdir().unwrap();
        let input = write_file(
            dir.path(),
            "in.json",
            json!({
                "repos": [{"module": "nova"}],
                "users": [{"launchpad_id": "john_doe", "user_name": "John Doe",
                           "companies": [{"company_name": "Mirantis", "end_date": null}]}],
            }),
        );
        let output = dir.path().join("out.json");

        cmd_normalize(&input, Some(&output)).unwrap();

        let written: Value =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(written["repos"][0]["releases"], json!([]));
        assert_eq!(written["users"][0]["user_id"], "john_doe");
        assert_eq!(written["users"][0]["companies"][0]["end_date"], 0);
    }

    #[test]
    fn test_check_reports_duplicate_module() {
        let dir = tempdir().unwrap();
        let input = write_file(
            dir.path(),
            "dup.json",
            json!({"repos": [{"module": "nova"}, {"module": "nova"}]}),
        );

        let violations = check_file(&input).unwrap();
        assert_eq!(
            violations,
            vec![Violation::DuplicateModule {
                module: "nova".to_string()
            }]
        );
        assert!(cmd_check(&input, false).is_err());
    }

    #[test]
    fn test_load_rejects_invalid_document() {
        let dir = tempdir().unwrap();
        let input = write_file(dir.path(), "bad.json", json!({"repos": {"module": "nova"}}));
        let err = load_default_data(&input).unwrap_err();
        assert!(err.to_string().contains("Invalid default data"));
    }

    #[tokio::test]
    async fn test_run_with_injected_collaborators() {
        let dir = tempdir().unwrap();
        let input = write_file(
            dir.path(),
            "baseline.json",
            json!({
                "project_sources": [{"organization": "openstack", "uri": "gerrit://"}],
            }),
        );
        let output = dir.path().join("merged.json");
        let report_path = dir.path().join("report.json");

        let registry = RetrieverRegistry::new().register(
            "gerrit",
            Arc::new(OrganizationRetriever::new().with(
                "openstack",
                vec![RepoCandidate::new("nova", "git://git.openstack.org/openstack/nova.git")
                    .with_gerrit(true)],
            )),
        );
        let pipeline = DefaultDataPipeline::new(registry, Arc::new(MemoryJsonFetcher::new()));

        cmd_run(&pipeline, &input, Some(&output), Some(&report_path))
            .await
            .unwrap();

        let merged: Value =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(merged["repos"][0]["module"], "nova");
        assert_eq!(merged["module_groups"][0]["id"], "openstack");

        let report: Value =
            serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
        assert_eq!(report["reconcile"]["repos_added"], 1);
    }
}
