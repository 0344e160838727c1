mod cli;
mod config;

use cli::{Args, Command, RunArgs};
use config::ConfigFile;
use owo_colors::{OwoColorize, Stream};
use sbom_visor::adapters::outbound::console::StderrProgressReporter;
use sbom_visor::adapters::outbound::filesystem::FileSystemReader;
use sbom_visor::adapters::outbound::network::OsvClient;
use sbom_visor::application::dto::{RunRequest, RunSummary};
use sbom_visor::application::use_cases::{CheckVulnerabilitiesUseCase, RunPipelineUseCase};
use sbom_visor::sbom_analysis::domain::SbomFormat;
use sbom_visor::shared::error::{category_of, ExitCode};
use sbom_visor::shared::Result;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    let args = Args::parse_args();
    init_tracing(args.verbose);

    let Command::Run(run_args) = args.command;
    let exit_code = match run(run_args).await {
        Ok(summary) => {
            print_summary(&summary);
            summary.exit_code()
        }
        Err(e) => {
            print_error(&e);
            ExitCode::ApplicationError
        }
    };
    process::exit(exit_code.as_i32());
}

/// Logs go to stderr: `warn` by default, `debug` with `-v`, `RUST_LOG` wins
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init();
}

async fn run(args: RunArgs) -> Result<RunSummary> {
    let format: SbomFormat = args.format.parse()?;
    let config = load_config(&args)?.unwrap_or_default();
    let request = build_request(&args, format, &config)?;

    let vulnerability_checker = match &request.lookup {
        Some(settings) => {
            let client = OsvClient::new(settings.api_url.clone(), settings.timeout)?
                .with_max_concurrent(settings.max_concurrent);
            Some(CheckVulnerabilitiesUseCase::new(
                client,
                settings.max_concurrent,
                settings.timeout,
            ))
        }
        None => None,
    };

    let pipeline = RunPipelineUseCase::new(
        FileSystemReader::new(),
        StderrProgressReporter::new(),
        vulnerability_checker,
    );
    pipeline.execute(&request).await
}

/// Explicit `--config`, else `sbom-visor.config.yml` next to the document
fn load_config(args: &RunArgs) -> Result<Option<ConfigFile>> {
    if let Some(path) = &args.config {
        return config::load_config_from_path(path).map(Some);
    }
    config::discover_config(&document_dir(&args.file))
}

fn document_dir(file: &Path) -> PathBuf {
    match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Merges CLI flags over config values over built-in defaults
fn build_request(args: &RunArgs, format: SbomFormat, config: &ConfigFile) -> Result<RunRequest> {
    let config_schema = match format {
        SbomFormat::CycloneDx => config.cyclonedx_schema.clone(),
        SbomFormat::Spdx => config.spdx_schema.clone(),
    };
    let check_vulnerabilities =
        !args.no_vuln_check && config.check_vulnerabilities.unwrap_or(true);

    let request = RunRequest::builder(args.file.clone(), format)
        .encoding(args.encoding.forced())
        .schema_path(args.schema.clone().or(config_schema))
        .output_dir(args.output_dir.clone().or_else(|| config.output_dir.clone()))
        .csv_file(args.csv_file.clone().or_else(|| config.csv_file.clone()))
        .graph_file(args.graph_file.clone().or_else(|| config.graph_file.clone()))
        .report_file(args.report_file.clone().or_else(|| config.report_file.clone()))
        .report_format(args.report_format.or(config.report_format()?))
        .check_vulnerabilities(check_vulnerabilities)
        .api_url(args.osv_url.clone().or_else(|| config.osv_api_url.clone()))
        .max_concurrent(args.max_concurrent.or(config.max_concurrent_lookups))
        .timeout_secs(args.timeout.or(config.lookup_timeout_secs))
        .build()?;
    Ok(request)
}

fn print_summary(summary: &RunSummary) {
    if summary.cycles_detected > 0 {
        tracing::debug!(cycles = summary.cycles_detected, "cycles marked in the rendered tree");
    }
    if !summary.has_failures() {
        eprintln!("\n✨ Done.");
        return;
    }

    let failed: Vec<String> = summary
        .failures()
        .map(|result| result.stage.to_string())
        .collect();
    eprintln!(
        "\n⚠️  {} output stage(s) failed: {}",
        failed.len(),
        failed.join(", ")
    );
}

/// Prints `error[<Category>]`, the message and the cause chain
fn print_error(error: &anyhow::Error) {
    let category = category_of(error)
        .map(|category| category.as_str())
        .unwrap_or("Error");
    let label = format!("error[{}]", category);
    eprintln!(
        "\n❌ {}: {}",
        label.if_supports_color(Stream::Stderr, |text| text.red()),
        error
    );

    for cause in error.chain().skip(1) {
        eprintln!("\nCaused by: {}", cause);
    }
    eprintln!();
}
