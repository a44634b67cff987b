//! Staging file names.
//!
//! Per-slide names are one-based so `s1.png`/`v1.mp4` is the first slide.

/// Primary webcam container published by the recording server.
pub const WEBCAM_WEBM: &str = "webcams.webm";

/// Alternate webcam container used by some server versions.
pub const WEBCAM_MP4: &str = "webcams.mp4";

/// Webcam track rescaled for side-by-side placement.
pub const WEBCAM_REFORMATTED: &str = "webcams_right.mp4";

/// All slide clips joined into one track.
pub const MERGED_SLIDES: &str = "slides.mp4";

/// Concatenation manifest consumed by the transcoder.
pub const CONCAT_MANIFEST: &str = "clips.txt";

/// Staging name for the image of slide `index`.
pub fn image_name(index: usize) -> String {
    format!("s{}.png", index + 1)
}

/// Staging name for the rendered clip of slide `index`.
pub fn clip_name(index: usize) -> String {
    format!("v{}.mp4", index + 1)
}

/// Output file name derived from a meeting name.
///
/// Path separators and control characters become `_`; an empty or
/// dot-only name falls back to `recording`.
pub fn output_file_name(meeting_name: &str) -> String {
    let sanitized: String = meeting_name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '\0' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.trim_matches('.').is_empty() {
        return "recording.mp4".to_string();
    }
    format!("{sanitized}.mp4")
}
