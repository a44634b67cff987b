//! Encode steps: slide clips, concatenation, webcam reformat, composite.
//!
//! Each step is one blocking transcoder invocation with no retry. Argument
//! builders are plain functions so the exact command lines can be checked
//! without a transcoder installed.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use recast_common::config::RenderSettings;
use recast_common::error::{RecastError, RecastResult};
use recast_presentation_model::naming::{CONCAT_MANIFEST, MERGED_SLIDES};

use crate::process::ProcessRunner;

/// Issues the encode steps against a [`ProcessRunner`].
#[derive(Clone)]
pub struct EncodeOrchestrator {
    runner: Arc<dyn ProcessRunner>,
    settings: RenderSettings,
}

impl EncodeOrchestrator {
    pub fn new(runner: Arc<dyn ProcessRunner>, settings: RenderSettings) -> Self {
        Self { runner, settings }
    }

    /// Turn one still image into a clip of `duration_secs` at the canonical
    /// frame size.
    ///
    /// A zero duration yields a single-frame clip, which lasts
    /// `1 / output_fps` seconds. Every zero-length slide therefore pushes
    /// later slides that much behind the webcam track; this is accepted as a
    /// known approximation.
    pub async fn render_slide_clip(
        &self,
        image: &Path,
        duration_secs: f64,
        clip: &Path,
    ) -> RecastResult<PathBuf> {
        let args = slide_clip_args(&self.settings, image, duration_secs, clip);
        self.invoke("render slide clip", args).await?;
        Ok(clip.to_path_buf())
    }

    /// Join clips in list order by stream copy.
    ///
    /// A single clip is returned as-is without invoking the transcoder. The
    /// clips must share codec parameters, which holds for everything
    /// produced by [`Self::render_slide_clip`].
    pub async fn concatenate_clips(
        &self,
        clips: &[PathBuf],
        staging: &Path,
    ) -> RecastResult<PathBuf> {
        match clips {
            [] => Err(RecastError::invalid_duration("no slide clips to concatenate")),
            [only] => {
                tracing::debug!(clip = %only.display(), "Single clip; skipping concatenation");
                Ok(only.clone())
            }
            _ => {
                let manifest = staging.join(CONCAT_MANIFEST);
                tokio::fs::write(&manifest, concat_manifest(clips, staging))
                    .await
                    .map_err(|e| RecastError::filesystem(&manifest, e))?;

                let merged = staging.join(MERGED_SLIDES);
                self.invoke("concatenate clips", concat_args(&manifest, &merged))
                    .await?;
                Ok(merged)
            }
        }
    }

    /// Rescale and pad the webcam recording into the right-hand column.
    pub async fn reformat_webcam(&self, source: &Path, target: &Path) -> RecastResult<PathBuf> {
        let args = webcam_args(&self.settings, source, target);
        self.invoke("reformat webcam", args).await?;
        Ok(target.to_path_buf())
    }

    /// Place slides and webcam side by side with webcam audio, cut to
    /// `total_duration_secs`.
    pub async fn compose_side_by_side(
        &self,
        slides: &Path,
        webcam: &Path,
        total_duration_secs: f64,
        output: &Path,
    ) -> RecastResult<PathBuf> {
        let args = compose_args(slides, webcam, total_duration_secs, output);
        self.invoke("compose side by side", args).await?;
        Ok(output.to_path_buf())
    }

    async fn invoke(&self, step: &str, args: Vec<String>) -> RecastResult<()> {
        tracing::debug!(step, args = ?args, "Running transcoder");
        let started = Instant::now();
        let outcome = self.runner.run(&args).await?;

        if !outcome.success {
            return Err(RecastError::external_tool(
                format!("{} ({step})", self.runner.program()),
                outcome.status_label(),
                outcome.stderr.trim(),
            ));
        }

        tracing::debug!(
            step,
            elapsed_ms = started.elapsed().as_millis(),
            "Transcoder step finished"
        );
        Ok(())
    }
}

fn base_args() -> Vec<String> {
    vec![
        "-y".to_string(),
        "-hide_banner".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
    ]
}

/// Scale to fit inside the canonical frame keeping aspect, then letterbox.
pub fn slide_filter(settings: &RenderSettings) -> String {
    let w = settings.slide_width;
    let h = settings.slide_height;
    format!(
        "scale='if(gt(a,{w}/{h}),{w},-2)':'if(gt(a,{w}/{h}),-2,{h})',pad={w}:{h}:(ow-iw)/2:(oh-ih)/2:color={pad}",
        pad = settings.pad_color
    )
}

pub fn slide_clip_args(
    settings: &RenderSettings,
    image: &Path,
    duration_secs: f64,
    clip: &Path,
) -> Vec<String> {
    let mut args = base_args();
    args.extend([
        "-loop".to_string(),
        "1".to_string(),
        "-r".to_string(),
        settings.input_fps.to_string(),
        "-f".to_string(),
        "image2".to_string(),
        "-i".to_string(),
        image.display().to_string(),
        "-c:v".to_string(),
        settings.video_codec.clone(),
        "-r".to_string(),
        settings.output_fps.to_string(),
    ]);

    if duration_secs > 0.0 {
        args.push("-t".to_string());
        args.push(format!("{duration_secs}"));
    } else {
        args.push("-frames:v".to_string());
        args.push("1".to_string());
    }

    args.extend([
        "-pix_fmt".to_string(),
        settings.pixel_format.clone(),
        "-vf".to_string(),
        slide_filter(settings),
        clip.display().to_string(),
    ]);
    args
}

/// Manifest for the concat demuxer, one `file` line per clip in order.
///
/// The demuxer resolves relative entries against the manifest's own
/// directory, so clips inside `manifest_dir` are written relative to it.
/// Clips elsewhere are written as given and must be absolute.
pub fn concat_manifest(clips: &[PathBuf], manifest_dir: &Path) -> String {
    clips
        .iter()
        .map(|clip| {
            let entry = clip.strip_prefix(manifest_dir).unwrap_or(clip);
            let quoted = entry.display().to_string().replace('\'', r"'\''");
            format!("file '{quoted}'\n")
        })
        .collect()
}

pub fn concat_args(manifest: &Path, merged: &Path) -> Vec<String> {
    let mut args = base_args();
    args.extend([
        "-f".to_string(),
        "concat".to_string(),
        "-safe".to_string(),
        "0".to_string(),
        "-i".to_string(),
        manifest.display().to_string(),
        "-c".to_string(),
        "copy".to_string(),
        merged.display().to_string(),
    ]);
    args
}

pub fn webcam_args(settings: &RenderSettings, source: &Path, target: &Path) -> Vec<String> {
    let mut args = base_args();
    args.extend([
        "-i".to_string(),
        source.display().to_string(),
        "-q:a".to_string(),
        "0".to_string(),
        "-q:v".to_string(),
        "0".to_string(),
        "-vf".to_string(),
        format!(
            "scale={}:-2,pad=height={}:color={}",
            settings.webcam_width, settings.slide_height, settings.pad_color
        ),
        target.display().to_string(),
    ]);
    args
}

pub fn compose_args(
    slides: &Path,
    webcam: &Path,
    total_duration_secs: f64,
    output: &Path,
) -> Vec<String> {
    let mut args = base_args();
    args.extend([
        "-i".to_string(),
        slides.display().to_string(),
        "-i".to_string(),
        webcam.display().to_string(),
        "-filter_complex".to_string(),
        "[0:v][1:v]hstack=inputs=2[v]".to_string(),
        "-t".to_string(),
        format!("{total_duration_secs}"),
        "-map".to_string(),
        "[v]".to_string(),
        "-map".to_string(),
        "1:a".to_string(),
        output.display().to_string(),
    ]);
    args
}
