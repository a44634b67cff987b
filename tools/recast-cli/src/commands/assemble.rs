//! Assemble a recording into a composite video.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use recast_assembler::{AssemblyProgress, AssemblyStage, Assembler, ProgressCallback};
use recast_common::config::AppConfig;
use recast_fetch::HttpFetcher;
use recast_render_engine::FfmpegRunner;

pub async fn run(config: AppConfig, url: String, output_dir: PathBuf) -> anyhow::Result<()> {
    let runner = Arc::new(FfmpegRunner::new(config.render.ffmpeg_binary.clone()));
    if !runner.is_available().await {
        anyhow::bail!(
            "{} is not available; install ffmpeg or set render.ffmpeg_binary in the config",
            config.render.ffmpeg_binary
        );
    }
    let fetcher = Arc::new(HttpFetcher::new()?);

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nInterrupted, cancelling...");
            on_interrupt.cancel();
        }
    });

    println!("Assembling: {url}");
    println!("  Output directory: {}", output_dir.display());
    println!("  Jobs: {}", config.pipeline.effective_jobs());

    let progress_cb: ProgressCallback = Box::new(print_progress);
    let assembler = Assembler::new(fetcher, runner, &config).with_progress(progress_cb);

    match assembler.assemble(&url, &output_dir, &cancel).await {
        Ok(output) => {
            println!("\nAssembly complete: {}", output.display());
            Ok(())
        }
        Err(e) => {
            println!();
            Err(anyhow::anyhow!("Assembly failed: {e}"))
        }
    }
}

fn print_progress(p: AssemblyProgress) {
    let label = match p.stage {
        AssemblyStage::FetchMetadata => "Fetching metadata",
        AssemblyStage::FetchShapes => "Fetching slide descriptor",
        AssemblyStage::Reconcile => "Reconciling timeline",
        AssemblyStage::FetchWebcam => "Fetching webcam recording",
        AssemblyStage::FetchSlides => "Fetching slides",
        AssemblyStage::RenderClips => "Rendering slide clips",
        AssemblyStage::Concatenate => "Concatenating clips",
        AssemblyStage::ReformatWebcam => "Reformatting webcam",
        AssemblyStage::Compose => "Composing video",
        AssemblyStage::Cleanup => "Cleaning up",
        AssemblyStage::Complete => return,
    };

    match p.stage {
        AssemblyStage::FetchSlides | AssemblyStage::RenderClips => {
            print!("\r  {label}: {}/{}  ", p.completed, p.total);
            if p.completed == p.total {
                println!();
            }
        }
        // completion of a single-step stage is not worth a line
        _ if p.completed > 0 => return,
        _ => println!("  {label}"),
    }
    std::io::stdout().flush().ok();
}
