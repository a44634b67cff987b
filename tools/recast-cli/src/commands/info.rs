//! Show recording information.

use std::sync::Arc;

use recast_assembler::Assembler;
use recast_common::config::AppConfig;
use recast_fetch::HttpFetcher;
use recast_presentation_model::naming::output_file_name;
use recast_render_engine::FfmpegRunner;

pub async fn run(config: AppConfig, url: String, json: bool) -> anyhow::Result<()> {
    let fetcher = Arc::new(HttpFetcher::new()?);
    let runner = Arc::new(FfmpegRunner::new(config.render.ffmpeg_binary.clone()));
    let presentation = Assembler::new(fetcher, runner, &config)
        .inspect(&url)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to inspect recording: {e}"))?;

    let output_file = output_file_name(&presentation.metadata.meeting_name);

    if json {
        let report = serde_json::json!({
            "presentation_id": presentation.session.presentation_id(),
            "base_url": presentation.session.base_url(),
            "meeting_name": presentation.metadata.meeting_name,
            "total_duration_ms": presentation.metadata.total_duration_ms,
            "output_file": output_file,
            "slides": presentation.slides,
            "timeline": presentation.timeline,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let meta = &presentation.metadata;
    let timeline = &presentation.timeline;

    println!("Recording: {}", meta.meeting_name);
    println!("  ID: {}", presentation.session.presentation_id());
    println!("  Assets: {}", presentation.session.base_url());
    println!("  Duration: {:.2}s", timeline.total_duration_secs);
    println!("  Output file: {output_file}");
    println!();

    println!("Slides ({}):", timeline.len());
    for (slide, entry) in presentation.slides.iter().zip(&timeline.entries) {
        println!(
            "  {:>3}. {:>8.1}s  +{:>7.2}s  {}",
            entry.index + 1,
            slide.start_secs,
            entry.duration_secs,
            slide.image_ref
        );
    }
    println!();
    println!("  Clip total: {:.2}s", timeline.clip_duration_sum());

    Ok(())
}
