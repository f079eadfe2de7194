mod cli;

use mosaic::{
    config::{self, Config},
    ExecContext, Job, ProcessExecutor, ProgressInfo,
};
use mosaic_av::tools::REQUIRED_TOOLS;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, PackageArgs};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "mosaic=trace,mosaic_av=trace,mosaic_ladder=trace".to_string()
        } else {
            "mosaic=debug,mosaic_av=debug,mosaic_ladder=debug".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Hls(args) => runtime()?.block_on(package(args, "hls", config_path)),
        Commands::Dash(args) => runtime()?.block_on(package(args, "dash", config_path)),
        Commands::Probe { input, json } => {
            runtime()?.block_on(probe_input(&input, json, config_path))
        }
        Commands::Ladder { input } => runtime()?.block_on(print_ladder(&input, config_path)),
        Commands::Normalize { input, output } => {
            runtime()?.block_on(normalize(&input, &output, config_path))
        }
        Commands::CheckTools => check_tools(config_path),
        Commands::Validate {
            config: validate_path,
        } => {
            let path = validate_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("mosaic {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().context("Failed to start async runtime")
}

/// Executor honouring the configured tool paths. A configured path that does
/// not exist falls back to PATH.
fn executor(config: &Config) -> ProcessExecutor {
    let mut exec = ProcessExecutor::new();
    for name in REQUIRED_TOOLS {
        let Some(configured) = config.tools.path_for(name) else {
            continue;
        };
        match mosaic_av::get_tool_path(name, Some(configured)) {
            Ok(path) => exec = exec.with_tool_path(name, path),
            Err(e) => tracing::warn!("{}", e),
        }
    }
    exec
}

/// Context cancelled on Ctrl-C.
fn interruptible_context() -> ExecContext {
    let ctx = ExecContext::new();
    let cancel = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling");
            cancel.cancel();
        }
    });
    ctx
}

async fn package(args: PackageArgs, format: &str, config_path: Option<&Path>) -> Result<()> {
    let mut config = config::load_config_or_default(config_path)?;

    // CLI flags override the file
    if let Some(gpu) = args.gpu {
        config.encoder.gpu = gpu;
    }
    if let Some(threads) = args.threads {
        config.encoder.threads = threads;
    }
    if let Some(level) = args.log_level {
        config.encoder.log_level = level;
    }
    if args.normalize_orientation {
        config.encoder.normalize_orientation = true;
    }
    if let Some(secs) = args.timeout {
        config.encoder.timeout_secs = Some(secs);
    }

    let options = config.package_options()?;
    let packager = mosaic::Packager::new(Arc::new(executor(&config)), options);
    let ctx = interruptible_context();

    let job = Job::new(args.input, args.output_dir)
        .with_profile(args.profile)
        .with_progress_handler(print_progress);

    let report = match format {
        "dash" => packager.encode_dash(&ctx, job).await,
        _ => packager.encode_hls(&ctx, job).await,
    };
    eprintln!();
    let report = report.with_context(|| format!("{} packaging failed", format.to_uppercase()))?;

    println!(
        "Packaged {}x{} source into {} renditions:",
        report.info.width,
        report.info.height,
        report.renditions.len()
    );
    for rendition in &report.renditions {
        println!("  {}", rendition);
    }
    if let Some(usage) = report.usage {
        println!(
            "CPU: {:.1}s user, {:.1}s system; peak memory {} MiB",
            usage.user_time,
            usage.system_time,
            usage.max_memory / (1024 * 1024)
        );
    }

    Ok(())
}

fn print_progress(progress: ProgressInfo) {
    eprint!(
        "\r[{:5.1}%] {} {} {}",
        progress.percentage, progress.current_time, progress.bitrate, progress.speed
    );
}

async fn probe_input(input: &str, json: bool, config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let ctx = interruptible_context();
    let info = mosaic_av::probe(&ctx, &executor(&config), input)
        .await
        .with_context(|| format!("Failed to probe {}", input))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        println!("Input: {}", input);
        println!("Coded size: {}x{}", info.width, info.height);
        if info.rotation != 0 {
            println!(
                "Rotation: {} (displays as {}x{})",
                info.rotation,
                info.display_width(),
                info.display_height()
            );
        }
        println!("Frame rate: {:.3} fps", info.fps);
        println!("Audio: {}", if info.has_audio { "yes" } else { "no" });
        if let Some(duration) = info.duration {
            let secs = duration as u64;
            println!(
                "Duration: {:02}:{:02}:{:02}",
                secs / 3600,
                (secs / 60) % 60,
                secs % 60
            );
        }
    }

    Ok(())
}

async fn print_ladder(input: &str, config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let ctx = interruptible_context();
    let info = mosaic_av::probe(&ctx, &executor(&config), input)
        .await
        .with_context(|| format!("Failed to probe {}", input))?;

    let ladder = mosaic_ladder::build_with_policy(&info, config.ladder.low_resolution);
    let optimized = mosaic_ladder::optimize::apply(ladder);

    println!(
        "Source: {}x{} @ {:.3} fps",
        info.display_width(),
        info.display_height(),
        info.fps
    );
    if optimized.is_empty() {
        println!(
            "No renditions (low-resolution policy: {})",
            config.ladder.low_resolution
        );
    }
    for rendition in &optimized {
        println!("  {}", rendition);
    }

    Ok(())
}

async fn normalize(input: &str, output: &Path, config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let ctx = match config.encoder.timeout_secs {
        Some(secs) => interruptible_context().with_timeout(Duration::from_secs(secs)),
        None => interruptible_context(),
    };

    let outcome = mosaic_av::normalize_orientation(&ctx, &executor(&config), input, output)
        .await
        .with_context(|| format!("Failed to normalize {}", input))?;

    match outcome {
        mosaic_av::NormalizeOutcome::Remuxed => {
            println!("No rotation; remuxed to {}", output.display())
        }
        mosaic_av::NormalizeOutcome::Rotated { rotation, encoder } => println!(
            "Rotated {} degrees with {} into {}",
            rotation,
            encoder,
            output.display()
        ),
    }

    Ok(())
}

fn check_tools(config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    println!("Checking external tools...\n");

    let mut all_ok = true;

    for tool in mosaic_av::check_tools(|name| config.tools.path_for(name)) {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version);
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
        Ok(())
    } else {
        anyhow::bail!("Some required tools are missing; install ffmpeg and ffprobe")
    }
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            config::load_config(p)?
        }
        None => {
            println!("No config file specified, using defaults");
            Config::default()
        }
    };

    let options = config.package_options()?;
    println!("✓ Configuration is valid");
    println!(
        "  Threads: {}",
        match options.encoder.threads {
            0 => "auto".to_string(),
            n => n.to_string(),
        }
    );
    println!("  GPU: {}", options.encoder.gpu);
    println!("  ffmpeg log level: {}", options.encoder.log_level);
    println!("  Normalize orientation: {}", options.normalize_orientation);
    println!("  Low-resolution policy: {}", options.low_resolution);
    if let Some(timeout) = options.timeout {
        println!("  Timeout: {}s", timeout.as_secs());
    }

    Ok(())
}
