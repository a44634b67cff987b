//! Assembly progress reporting.

/// Stages of an assembly run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblyStage {
    FetchMetadata,
    FetchShapes,
    Reconcile,
    FetchWebcam,
    FetchSlides,
    RenderClips,
    Concatenate,
    ReformatWebcam,
    Compose,
    Cleanup,
    Complete,
}

impl AssemblyStage {
    pub fn as_str(self) -> &'static str {
        match self {
            AssemblyStage::FetchMetadata => "fetch_metadata",
            AssemblyStage::FetchShapes => "fetch_shapes",
            AssemblyStage::Reconcile => "reconcile",
            AssemblyStage::FetchWebcam => "fetch_webcam",
            AssemblyStage::FetchSlides => "fetch_slides",
            AssemblyStage::RenderClips => "render_clips",
            AssemblyStage::Concatenate => "concatenate",
            AssemblyStage::ReformatWebcam => "reformat_webcam",
            AssemblyStage::Compose => "compose",
            AssemblyStage::Cleanup => "cleanup",
            AssemblyStage::Complete => "complete",
        }
    }
}

/// Progress report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssemblyProgress {
    pub stage: AssemblyStage,

    /// Units finished within the stage (slides for the per-slide stages).
    pub completed: usize,

    /// Units in the stage; `1` for single-step stages.
    pub total: usize,
}

/// Progress callback for assembly runs.
pub type ProgressCallback = Box<dyn Fn(AssemblyProgress) + Send + Sync>;
