use clap::Parser;
use std::env;
use std::process;
use std::sync::Arc;
use tracing::{debug, error, info, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use vbdrake_cli::cli::commands::{CliArgs, Commands, LaunchArgs, RakeArgs, StatusArgs};
use vbdrake_cli::cli::output::OutputFormatter;
use vbdrake_cli::{NAME, VERSION};
use vbdrake_core::config::RakeConfig;
use vbdrake_core::domain::{Cause, Draw, JobGrid, Measure, RakingJob, Scenario};
use vbdrake_core::progress::{LoggingHandler, ProgressHandler};
use vbdrake_launcher::{BarHandler, JobPlan, StatusReport, WorkflowRunner};
use vbdrake_pipeline::{PipelineOrchestrator, RakingContext};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("{} v{} starting", NAME, VERSION);

    let exit_code = match &args.command {
        Commands::Rake(rake_args) => handle_rake(rake_args, &args).await,
        Commands::Launch(launch_args) => handle_launch(launch_args, &args).await,
        Commands::Status(status_args) => handle_status(status_args, &args).await,
    };

    process::exit(exit_code);
}

fn init_logging_from_args(args: &CliArgs) {
    use std::sync::Once;
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let level = if let Some(level_str) = &args.log_level {
            parse_level(level_str)
        } else if args.verbose {
            Level::DEBUG
        } else if args.quiet {
            Level::ERROR
        } else {
            let level_str = env::var("VBDRAKE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
            parse_level(&level_str)
        };

        let mut filter = EnvFilter::from_default_env();

        if env::var("RUST_LOG").is_err() {
            for target in [
                "vbdrake",
                "vbdrake_core",
                "vbdrake_pipeline",
                "vbdrake_launcher",
                "vbdrake_cli",
            ] {
                filter = filter.add_directive(format!("{}={}", target, level).parse().unwrap());
            }
        }

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    });
}

fn parse_level(level_str: &str) -> Level {
    match level_str.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
                level_str
            );
            Level::INFO
        }
    }
}

fn load_config(args: &CliArgs) -> Option<RakeConfig> {
    let config = match RakeConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            return None;
        }
    };
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        eprintln!("\nPlease check your config file and environment variables.");
        return None;
    }
    Some(config)
}

fn build_grid(
    cause: Option<Cause>,
    scenario: Option<Scenario>,
    measure: Option<Measure>,
    draw: Option<Draw>,
) -> JobGrid {
    let mut grid = JobGrid::new();
    if let Some(cause) = cause {
        grid = grid.causes(vec![cause]);
    }
    if let Some(scenario) = scenario {
        grid = grid.scenarios(vec![scenario]);
    }
    if let Some(measure) = measure {
        grid = grid.measures(vec![measure]);
    }
    if let Some(draw) = draw {
        grid = grid.draws(vec![draw]);
    }
    grid
}

async fn handle_rake(args: &RakeArgs, global: &CliArgs) -> i32 {
    let Some(config) = load_config(global) else {
        return 1;
    };

    let job = RakingJob {
        cause: args.cause,
        scenario: args.scenario,
        measure: args.measure,
        draw: args.draw,
    };
    info!(job = %job, "Raking single draw");

    let mut context = RakingContext::new(config, job);
    let summary = match PipelineOrchestrator::new().execute(&mut context).await {
        Ok(summary) => summary,
        Err(e) => {
            error!("Raking failed: {:#}", e);
            return 1;
        }
    };

    let formatter = OutputFormatter::new(args.format);
    match formatter.format_summary(&summary) {
        Ok(text) => {
            println!("{}", text);
            0
        }
        Err(e) => {
            error!("Failed to format output: {:#}", e);
            1
        }
    }
}

async fn handle_launch(args: &LaunchArgs, global: &CliArgs) -> i32 {
    let Some(config) = load_config(global) else {
        return 1;
    };

    let grid = build_grid(args.cause, args.scenario, args.measure, args.draw);
    let plan = JobPlan::new(&grid, &config, args.force);

    if args.dry_run {
        println!(
            "{} pending, {} already done",
            plan.pending.len(),
            plan.already_done.len()
        );
        for job in &plan.pending {
            println!("  {}", job);
        }
        return 0;
    }

    if plan.is_empty() {
        info!(
            skipped = plan.already_done.len(),
            "All outputs already exist, nothing to do"
        );
        return 0;
    }

    let handler: Arc<dyn ProgressHandler> =
        if global.quiet || !atty::is(atty::Stream::Stderr) {
            Arc::new(LoggingHandler)
        } else {
            Arc::new(BarHandler::new(plan.pending.len()))
        };

    let concurrency = args.jobs.unwrap_or(config.concurrency);
    let skipped = plan.already_done.len();
    let runner = WorkflowRunner::new(concurrency);
    let manifest = match runner.run(plan, &config, handler).await {
        Ok(manifest) => manifest,
        Err(e) => {
            error!("Run failed: {:#}", e);
            return 1;
        }
    };

    let manifest_dir = args
        .manifest_dir
        .clone()
        .unwrap_or_else(|| config.output_root.clone());
    match manifest.write(&manifest_dir) {
        Ok(path) => info!(manifest = %path.display(), "Run manifest written"),
        Err(e) => {
            error!("Failed to write run manifest: {:#}", e);
            return 1;
        }
    }

    println!(
        "Run {}: {} succeeded, {} failed, {} skipped",
        manifest.run_id,
        manifest.succeeded.len(),
        manifest.failed.len(),
        skipped
    );
    for failure in &manifest.failed {
        eprintln!("  FAILED {}: {}", failure.job, failure.error);
    }

    if manifest.all_succeeded() {
        0
    } else {
        1
    }
}

async fn handle_status(args: &StatusArgs, global: &CliArgs) -> i32 {
    let Some(config) = load_config(global) else {
        return 1;
    };

    let grid = build_grid(args.cause, args.scenario, args.measure, None);
    let report = match StatusReport::collect(&grid, &config) {
        Ok(report) => report,
        Err(e) => {
            error!("Failed to scan outputs: {}", e);
            return 1;
        }
    };

    let formatter = OutputFormatter::new(args.format);
    match formatter.format_status(&report) {
        Ok(text) => {
            println!("{}", text);
            0
        }
        Err(e) => {
            error!("Failed to format output: {:#}", e);
            1
        }
    }
}
