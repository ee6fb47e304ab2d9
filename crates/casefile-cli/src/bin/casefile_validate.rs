use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use casefile_cli::{describe_file, init_tracing, print_report_table, BatchReport, FileReport};
use casefile_core::UploadConfig;
use casefile_infra::TracingAuditSink;
use casefile_processing::{PipelineOptions, UploadPipeline};

#[derive(Parser, Debug)]
#[command(name = "casefile-validate")]
#[command(about = "Run the upload acceptance checks over local files as one submission")]
struct Args {
    /// Declared MIME type for every file (default: guessed from the extension)
    #[arg(long = "type", value_name = "MIME")]
    declared_type: Option<String>,

    /// Print a JSON report instead of a table
    #[arg(long)]
    json: bool,

    /// Delete every given file when the batch is rejected
    #[arg(long)]
    dispose: bool,

    /// Files to validate
    #[arg(required = true, value_name = "FILE")]
    files: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let config = UploadConfig::from_env().context("Failed to load upload configuration")?;
    init_tracing(args.json, &config.environment);

    if let Err(e) = config.check_submission_shape(args.files.len(), args.files.len()) {
        eprintln!("Error: {}", e);
        return Ok(ExitCode::FAILURE);
    }

    let mut files = Vec::with_capacity(args.files.len());
    for path in &args.files {
        files.push(describe_file(path, args.declared_type.as_deref()).await?);
    }

    tracing::debug!(
        file_count = files.len(),
        dispose = args.dispose,
        "Validating submission"
    );

    let pipeline = UploadPipeline::new(&config)?
        .with_audit_sink(Arc::new(TracingAuditSink::new()))
        .with_options(PipelineOptions {
            dispose_rejected: args.dispose,
        });

    let results = pipeline.validate_batch(&files).await;
    let file_reports: Vec<FileReport> = files
        .iter()
        .zip(&results)
        .map(|(file, result)| FileReport::new(file, result))
        .collect();
    let decision = pipeline.decide(&files, results).await;

    let report = BatchReport::new(file_reports, &decision, config.is_production());
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report_table(&report);
    }

    Ok(if report.accepted {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
