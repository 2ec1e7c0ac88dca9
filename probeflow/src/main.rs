use anyhow::Context;
use clap::Parser;
use probeflow::config::PipelineConfig;
use probeflow::context::{RunContext, RunIdentity};
use probeflow::core::BuildReport;
use probeflow::observability::init_logging;
use probeflow::pipeline::{geo_pipeline, CLEAN, STAGE_NAMES};
use std::path::PathBuf;
use tracing::{error, info};

/// Fetch a GEO series archive and turn it into trimmed probe tables.
#[derive(Debug, Parser)]
#[command(name = "probeflow", version, about)]
struct Cli {
    /// Stage to build, together with every stage it depends on
    #[arg(default_value = CLEAN, value_parser = STAGE_NAMES)]
    stage: String,

    /// GEO series accession
    #[arg(long, default_value = "GSE68849")]
    dataset_id: String,

    /// Directory the raw archive is downloaded to
    #[arg(long, default_value = "data")]
    download_dir: PathBuf,

    /// Directory for decompressed files and section tables
    #[arg(long, default_value = "processed_data")]
    processed_dir: PathBuf,

    /// Directory for trimmed probe tables
    #[arg(long, default_value = "trimmed_probes")]
    trimmed_dir: PathBuf,
}

impl Cli {
    fn config(&self) -> PipelineConfig {
        PipelineConfig::new()
            .with_dataset_id(&self.dataset_id)
            .with_download_dir(&self.download_dir)
            .with_processed_dir(&self.processed_dir)
            .with_trimmed_dir(&self.trimmed_dir)
    }
}

fn log_report(report: &BuildReport) {
    for stage in &report.stages {
        info!(
            stage = %stage.name,
            status = %stage.status,
            duration_ms = stage.duration_ms,
            "Stage summary"
        );
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(matches!(
        std::env::var("PROBEFLOW_LOG_FORMAT").as_deref(),
        Ok("json")
    ));

    let config = cli.config();
    let graph = geo_pipeline(&config).context("invalid pipeline definition")?;
    let ctx = RunContext::new(RunIdentity::new(&config.dataset_id));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?;

    match runtime.block_on(graph.build(&cli.stage, &ctx)) {
        Ok(report) => {
            log_report(&report);
            info!(build_target = %report.target, "Build succeeded");
            Ok(())
        }
        Err(err) => {
            log_report(&err.report);
            error!(build_target = %err.report.target, "Build failed");
            Err(err).with_context(|| format!("building '{}' for {}", cli.stage, config.dataset_id))
        }
    }
}
