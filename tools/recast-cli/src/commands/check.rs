//! Check the transcoder and configuration.

use recast_common::config::{config_file_path, AppConfig};
use recast_render_engine::FfmpegRunner;

pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    println!("Recast System Check");
    println!("{}", "=".repeat(50));

    let binary = &config.render.ffmpeg_binary;
    let ffmpeg_ok = FfmpegRunner::new(binary.clone()).is_available().await;
    if ffmpeg_ok {
        println!("[OK] Transcoder: {binary}");
    } else {
        println!("[FAIL] Transcoder: {binary} could not be executed");
    }

    let path = config_file_path();
    if path.exists() {
        println!("[OK] Config: {}", path.display());
    } else {
        println!("[INFO] Config: {} (not present, using defaults)", path.display());
    }

    let render = &config.render;
    println!();
    println!("Render settings:");
    println!(
        "  Slide frame: {}x{} (pad: {})",
        render.slide_width, render.slide_height, render.pad_color
    );
    println!("  Webcam column: {}px wide", render.webcam_width);
    println!(
        "  Clips: {} {} at {}fps (stills read at {}fps)",
        render.video_codec, render.pixel_format, render.output_fps, render.input_fps
    );
    println!("  Jobs: {}", config.pipeline.effective_jobs());

    println!();
    if ffmpeg_ok {
        println!("Recast is ready.");
    } else {
        println!("ffmpeg is required. Install it or set render.ffmpeg_binary in the config.");
    }

    Ok(())
}
