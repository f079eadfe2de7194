use crate::encoder::{parse_progress, progress_info, ArgumentBuilder, DashCmaf, EncodePlan, HlsCmaf};
use crate::job::{Job, ProgressHandler};
use crate::options::PackageOptions;
use mosaic_av::{
    normalize_orientation, probe, CommandExecutor, CommandOutput, Error, ExecContext, Result,
    Workspace,
};
use mosaic_common::{Profile, Rendition, Usage, VideoInfo};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Progress chunks buffered between the ffmpeg reader and the handler.
const PROGRESS_BUFFER: usize = 16;

/// What a finished packaging run produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackageReport {
    /// Source metadata as encoded (upright after normalization).
    pub info: VideoInfo,
    /// Segmenting profile used.
    pub profile: Profile,
    /// Renditions written, highest first.
    pub renditions: Vec<Rendition>,
    /// Resource usage of the ffmpeg run, when reported.
    pub usage: Option<Usage>,
}

/// Drives one packaging job through an injected [`CommandExecutor`].
///
/// # Example
///
/// ```no_run
/// use mosaic::{ExecContext, Job, PackageOptions, Packager, ProcessExecutor};
/// use std::sync::Arc;
///
/// # async fn run() -> mosaic::Result<()> {
/// let packager = Packager::new(Arc::new(ProcessExecutor::new()), PackageOptions::default());
/// let job = Job::new("input.mp4", "out/");
/// let report = packager.encode_hls(&ExecContext::new(), job).await?;
/// println!("{} renditions", report.renditions.len());
/// # Ok(())
/// # }
/// ```
pub struct Packager {
    executor: Arc<dyn CommandExecutor>,
    options: PackageOptions,
}

impl Packager {
    pub fn new(executor: Arc<dyn CommandExecutor>, options: PackageOptions) -> Self {
        Self { executor, options }
    }

    pub fn options(&self) -> &PackageOptions {
        &self.options
    }

    /// Package `job` as HLS with CMAF segments.
    pub async fn encode_hls(&self, ctx: &ExecContext, job: Job) -> Result<PackageReport> {
        self.encode(ctx, job, &HlsCmaf).await
    }

    /// Package `job` as DASH with CMAF segments.
    pub async fn encode_dash(&self, ctx: &ExecContext, job: Job) -> Result<PackageReport> {
        self.encode(ctx, job, &DashCmaf).await
    }

    /// Package `job` with the format produced by `builder`.
    ///
    /// Any intermediate file from orientation normalization lives in a private
    /// workspace that is removed when this returns, whatever the outcome.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] for an empty input or an empty ladder
    /// - [`Error::Probe`] / [`Error::Orientation`] from the preparation stages
    /// - [`Error::Encode`] wrapping the failed ffmpeg run
    /// - [`Error::Cancelled`] if `ctx` is cancelled or the timeout elapses
    pub async fn encode(
        &self,
        ctx: &ExecContext,
        job: Job,
        builder: &dyn ArgumentBuilder,
    ) -> Result<PackageReport> {
        if job.input.trim().is_empty() {
            return Err(Error::config("input path is required"));
        }
        if job.output_dir.as_os_str().is_empty() {
            return Err(Error::config("output directory is required"));
        }

        let ctx = match self.options.timeout {
            Some(timeout) => ctx.child().with_timeout(timeout),
            None => ctx.child(),
        };
        // Dropping this future mid-run cancels the ffmpeg task it spawned.
        let _cancel_on_drop = ctx.token().clone().drop_guard();

        tracing::info!("Probing {}", job.input);
        let probed = probe(&ctx, self.executor.as_ref(), &job.input).await?;

        // The workspace holds the upright intermediate until ffmpeg is done.
        let (input, info, _workspace) = if self.options.normalize_orientation {
            let workspace = Workspace::new()?;
            let upright = workspace.intermediate_for(&job.input);
            tracing::info!("Normalizing orientation of {}", job.input);
            normalize_orientation(&ctx, self.executor.as_ref(), &job.input, &upright).await?;
            (
                upright.to_string_lossy().into_owned(),
                upright_info(&probed),
                Some(workspace),
            )
        } else {
            (job.input.clone(), probed, None)
        };

        let renditions = plan_renditions(&info, &self.options)?;
        let profile = Profile::for_kind(job.profile);
        tracing::info!(
            "Planned {} renditions for {}x{} ({} profile)",
            renditions.len(),
            info.width,
            info.height,
            job.profile
        );

        std::fs::create_dir_all(&job.output_dir)?;

        let plan = EncodePlan {
            input,
            output_dir: job.output_dir.clone(),
            info: info.clone(),
            profile,
            renditions: renditions.clone(),
            options: self.options.encoder.clone(),
            progress: job.progress_handler.is_some(),
        };
        let cmd = builder.build_args(&plan);
        tracing::debug!("ffmpeg {}", cmd.join(" "));

        tracing::info!("Packaging {} as {}", job.input, builder.name());
        let output = match job.progress_handler {
            Some(ref handler) => self.run_with_progress(&ctx, cmd, handler, info.duration).await,
            None => self.executor.execute(&ctx, "ffmpeg", &cmd).await,
        }
        .map_err(|e| Error::encode(builder.name(), e))?;

        tracing::info!(
            "Packaged {} into {}",
            job.input,
            job.output_dir.display()
        );

        Ok(PackageReport {
            info,
            profile,
            renditions,
            usage: output.usage,
        })
    }

    /// Run ffmpeg on a spawned task and feed each progress chunk to `handler`
    /// in arrival order. The task's result is read once the channel closes.
    async fn run_with_progress(
        &self,
        ctx: &ExecContext,
        cmd: Vec<String>,
        handler: &ProgressHandler,
        duration: Option<f64>,
    ) -> Result<CommandOutput> {
        let (tx, mut rx) = mpsc::channel(PROGRESS_BUFFER);
        let executor = Arc::clone(&self.executor);
        let task_ctx = ctx.clone();

        let task = tokio::spawn(async move {
            executor
                .execute_with_progress(&task_ctx, Some(tx), "ffmpeg", &cmd)
                .await
        });

        while let Some(chunk) = rx.recv().await {
            handler(progress_info(&parse_progress(&chunk), duration));
        }

        task.await?
    }
}

/// Build and optimize the ladder, rejecting an empty result.
fn plan_renditions(info: &VideoInfo, options: &PackageOptions) -> Result<Vec<Rendition>> {
    let ladder = mosaic_ladder::build_with_policy(info, options.low_resolution);
    let renditions = mosaic_ladder::optimize::apply(ladder);
    if renditions.is_empty() {
        return Err(Error::config(format!(
            "no renditions for a {}x{} source with the {} low-resolution policy",
            info.display_width(),
            info.display_height(),
            options.low_resolution
        )));
    }
    Ok(renditions)
}

/// Metadata of the normalized intermediate: display dimensions, no rotation.
fn upright_info(info: &VideoInfo) -> VideoInfo {
    VideoInfo {
        width: info.display_width(),
        height: info.display_height(),
        rotation: 0,
        ..info.clone()
    }
}
