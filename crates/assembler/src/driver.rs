//! Pipeline driver.
//!
//! Runs one recording through
//! `FetchMetadata → FetchShapes → Reconcile → FetchWebcam → FetchSlides →
//! RenderClips → Concatenate → ReformatWebcam → Compose → Cleanup`.
//! Descriptors are fetched and reconciled in memory before any staging
//! directory exists, so an unreachable, malformed or unreconcilable recording
//! leaves nothing on disk.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use futures::{stream, StreamExt, TryStreamExt};
use tokio_util::sync::CancellationToken;

use recast_common::config::{AppConfig, PipelineSettings};
use recast_common::error::{RecastError, RecastResult};
use recast_fetch::{Fetcher, SessionUrl};
use recast_presentation_model::naming::{
    image_name, output_file_name, WEBCAM_MP4, WEBCAM_REFORMATTED, WEBCAM_WEBM,
};
use recast_presentation_model::{
    parse_metadata, parse_slides, reconcile, RecordingMetadata, SlideDescriptor, Timeline,
};
use recast_render_engine::{EncodeOrchestrator, ProcessRunner};

use crate::progress::{AssemblyProgress, AssemblyStage, ProgressCallback};
use crate::staging::StagingDir;

/// A downloaded webcam recording smaller than this is treated as missing.
///
/// Some servers answer a missing container with a short error page and a
/// success status. Real recordings are far larger.
pub const WEBCAM_NOT_FOUND_THRESHOLD_BYTES: u64 = 1000;

/// Everything known about a recording before any media is downloaded.
#[derive(Debug, Clone)]
pub struct Presentation {
    pub session: SessionUrl,
    pub metadata: RecordingMetadata,
    pub slides: Vec<SlideDescriptor>,
    pub timeline: Timeline,
}

/// Drives a full assembly run.
pub struct Assembler {
    fetcher: Arc<dyn Fetcher>,
    encoder: EncodeOrchestrator,
    pipeline: PipelineSettings,
    progress: Option<ProgressCallback>,
}

impl Assembler {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        runner: Arc<dyn ProcessRunner>,
        config: &AppConfig,
    ) -> Self {
        Self {
            fetcher,
            encoder: EncodeOrchestrator::new(runner, config.render.clone()),
            pipeline: config.pipeline.clone(),
            progress: None,
        }
    }

    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Fetch and reconcile the descriptors without downloading media.
    pub async fn inspect(&self, session_url: &str) -> RecastResult<Presentation> {
        let session = SessionUrl::parse(session_url)?;
        let (metadata, slides) = self.load_descriptors(&session).await?;
        let timeline = self.reconcile_timeline(&metadata, &slides)?;
        Ok(Presentation {
            session,
            metadata,
            slides,
            timeline,
        })
    }

    /// Assemble the recording behind `session_url` into `output_dir`.
    ///
    /// Returns the path of the composite video. On failure the staging
    /// directory is left in place for inspection; on cancellation it is
    /// removed.
    pub async fn assemble(
        &self,
        session_url: &str,
        output_dir: &Path,
        cancel: &CancellationToken,
    ) -> RecastResult<PathBuf> {
        let started = Instant::now();
        let session = SessionUrl::parse(session_url)?;
        tracing::info!(
            presentation_id = session.presentation_id(),
            base_url = session.base_url(),
            "Starting assembly"
        );

        let (metadata, slides) = guarded(cancel, self.load_descriptors(&session)).await?;
        let timeline = self.reconcile_timeline(&metadata, &slides)?;

        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(|e| RecastError::filesystem(output_dir, e))?;
        let staging_root = self
            .pipeline
            .staging_root
            .clone()
            .unwrap_or_else(|| output_dir.to_path_buf());
        let staging = StagingDir::create(&staging_root, session.presentation_id()).await?;

        let built = guarded(
            cancel,
            self.build(&session, &metadata, &slides, &timeline, &staging, output_dir),
        )
        .await;

        match built {
            Ok(output) => {
                self.report(AssemblyStage::Cleanup, 0, 1);
                if self.pipeline.keep_staging {
                    tracing::info!(staging = %staging.path().display(), "Keeping staging directory");
                } else {
                    staging.remove().await?;
                }
                self.report(AssemblyStage::Complete, 1, 1);
                tracing::info!(
                    output = %output.display(),
                    elapsed_ms = started.elapsed().as_millis(),
                    "Assembly finished"
                );
                Ok(output)
            }
            Err(RecastError::Cancelled) => {
                tracing::warn!(staging = %staging.path().display(), "Assembly cancelled");
                let path = staging.path().to_path_buf();
                if let Err(e) = staging.remove().await {
                    tracing::warn!(staging = %path.display(), error = %e, "Failed to remove staging directory");
                }
                Err(RecastError::Cancelled)
            }
            Err(e) => {
                tracing::error!(
                    staging = %staging.path().display(),
                    error = %e,
                    "Assembly failed; staging directory kept"
                );
                Err(e)
            }
        }
    }

    async fn load_descriptors(
        &self,
        session: &SessionUrl,
    ) -> RecastResult<(RecordingMetadata, Vec<SlideDescriptor>)> {
        self.report(AssemblyStage::FetchMetadata, 0, 1);
        let raw = self.fetcher.fetch(&session.metadata_url()).await?;
        let metadata = parse_metadata(&raw)?;
        tracing::info!(
            meeting_name = %metadata.meeting_name,
            total_duration_ms = metadata.total_duration_ms,
            "Loaded recording metadata"
        );

        self.report(AssemblyStage::FetchShapes, 0, 1);
        let raw = self.fetcher.fetch(&session.shapes_url()).await?;
        let slides = parse_slides(&raw)?;
        tracing::info!(slides = slides.len(), "Loaded shape descriptor");

        Ok((metadata, slides))
    }

    fn reconcile_timeline(
        &self,
        metadata: &RecordingMetadata,
        slides: &[SlideDescriptor],
    ) -> RecastResult<Timeline> {
        self.report(AssemblyStage::Reconcile, 0, 1);
        let timeline = reconcile(slides, metadata)?;
        tracing::info!(
            slides = timeline.len(),
            clip_secs = timeline.clip_duration_sum(),
            total_secs = timeline.total_duration_secs,
            "Timeline reconciled"
        );
        Ok(timeline)
    }

    async fn build(
        &self,
        session: &SessionUrl,
        metadata: &RecordingMetadata,
        slides: &[SlideDescriptor],
        timeline: &Timeline,
        staging: &StagingDir,
        output_dir: &Path,
    ) -> RecastResult<PathBuf> {
        let webcam = self.fetch_webcam(session, staging).await?;
        self.fetch_slide_images(session, slides, staging).await?;

        let clips = self.render_clips(timeline, staging).await?;

        self.report(AssemblyStage::Concatenate, 0, 1);
        let merged = self.encoder.concatenate_clips(&clips, staging.path()).await?;

        self.report(AssemblyStage::ReformatWebcam, 0, 1);
        let webcam = self
            .encoder
            .reformat_webcam(&webcam, &staging.join(WEBCAM_REFORMATTED))
            .await?;

        self.report(AssemblyStage::Compose, 0, 1);
        let output = output_dir.join(output_file_name(&metadata.meeting_name));
        self.encoder
            .compose_side_by_side(&merged, &webcam, timeline.total_duration_secs, &output)
            .await
    }

    /// Download the webcam recording, falling back from `.webm` to `.mp4`
    /// when the primary container is missing.
    async fn fetch_webcam(
        &self,
        session: &SessionUrl,
        staging: &StagingDir,
    ) -> RecastResult<PathBuf> {
        self.report(AssemblyStage::FetchWebcam, 0, 1);

        let primary = staging.join(WEBCAM_WEBM);
        let url = session.webcam_url(WEBCAM_WEBM);
        match self.fetcher.fetch_to_file(&url, &primary).await {
            Ok(bytes) if bytes >= WEBCAM_NOT_FOUND_THRESHOLD_BYTES => {
                tracing::info!(url, bytes, "Fetched webcam recording");
                self.report(AssemblyStage::FetchWebcam, 1, 1);
                return Ok(primary);
            }
            Ok(bytes) => tracing::warn!(
                url,
                bytes,
                threshold = WEBCAM_NOT_FOUND_THRESHOLD_BYTES,
                "Webcam recording implausibly small; trying {WEBCAM_MP4}"
            ),
            Err(e) if e.is_not_found() => {
                tracing::warn!(url, "Webcam recording not found; trying {WEBCAM_MP4}")
            }
            Err(e) => return Err(e),
        }

        let fallback = staging.join(WEBCAM_MP4);
        let url = session.webcam_url(WEBCAM_MP4);
        let bytes = self.fetcher.fetch_to_file(&url, &fallback).await?;
        tracing::info!(url, bytes, "Fetched webcam recording");
        self.report(AssemblyStage::FetchWebcam, 1, 1);
        Ok(fallback)
    }

    async fn fetch_slide_images(
        &self,
        session: &SessionUrl,
        slides: &[SlideDescriptor],
        staging: &StagingDir,
    ) -> RecastResult<()> {
        let total = slides.len();
        self.report(AssemblyStage::FetchSlides, 0, total);
        let done = AtomicUsize::new(0);
        let done = &done;

        stream::iter(slides)
            .map(|slide| async move {
                let url = session.slide_url(&slide.image_ref);
                let path = staging.join(&image_name(slide.index));
                let bytes = self.fetcher.fetch_to_file(&url, &path).await?;
                tracing::debug!(index = slide.index, url, bytes, "Fetched slide image");
                let completed = done.fetch_add(1, Ordering::Relaxed) + 1;
                self.report(AssemblyStage::FetchSlides, completed, total);
                Ok::<_, RecastError>(())
            })
            .buffered(self.pipeline.effective_jobs())
            .try_collect::<Vec<()>>()
            .await?;
        Ok(())
    }

    /// Render one clip per timeline entry. The returned paths are in
    /// timeline order regardless of completion order.
    async fn render_clips(
        &self,
        timeline: &Timeline,
        staging: &StagingDir,
    ) -> RecastResult<Vec<PathBuf>> {
        let total = timeline.len();
        self.report(AssemblyStage::RenderClips, 0, total);
        let done = AtomicUsize::new(0);
        let done = &done;

        stream::iter(&timeline.entries)
            .map(|entry| async move {
                let image = staging.join(&entry.image_file_name);
                let clip = staging.join(&entry.clip_file_name);
                let clip = self
                    .encoder
                    .render_slide_clip(&image, entry.duration_secs, &clip)
                    .await?;
                let completed = done.fetch_add(1, Ordering::Relaxed) + 1;
                self.report(AssemblyStage::RenderClips, completed, total);
                Ok::<_, RecastError>(clip)
            })
            .buffered(self.pipeline.effective_jobs())
            .try_collect()
            .await
    }

    fn report(&self, stage: AssemblyStage, completed: usize, total: usize) {
        tracing::debug!(stage = stage.as_str(), completed, total, "Progress");
        if let Some(cb) = &self.progress {
            cb(AssemblyProgress {
                stage,
                completed,
                total,
            });
        }
    }
}

/// Run `work` unless `cancel` fires first. Dropping `work` kills any
/// transcoder it has running.
async fn guarded<T>(
    cancel: &CancellationToken,
    work: impl Future<Output = RecastResult<T>>,
) -> RecastResult<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(RecastError::Cancelled),
        result = work => result,
    }
}
