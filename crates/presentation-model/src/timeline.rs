//! Timeline reconciliation.
//!
//! Interior slides are bounded by the next slide's appearance, so their
//! declared intervals are trusted as-is. The last slide has no such bound and
//! its declared `out` regularly drifts from the real recording length, so its
//! duration is recomputed from the server's total duration instead.

use serde::{Deserialize, Serialize};

use recast_common::error::{RecastError, RecastResult};

use crate::metadata::RecordingMetadata;
use crate::naming;
use crate::slides::SlideDescriptor;

/// One slide's final scheduling record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    /// Same as the source `SlideDescriptor::index`.
    pub index: usize,

    /// How long this slide's clip plays. Never negative.
    pub duration_secs: f64,

    /// Staging name of the fetched slide image.
    pub image_file_name: String,

    /// Staging name of the rendered clip.
    pub clip_file_name: String,
}

impl TimelineEntry {
    fn new(index: usize, duration_secs: f64) -> Self {
        Self {
            index,
            duration_secs,
            image_file_name: naming::image_name(index),
            clip_file_name: naming::clip_name(index),
        }
    }
}

/// Reconciled timeline for a whole recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    /// One entry per slide, in playback order.
    pub entries: Vec<TimelineEntry>,

    /// Corrected recording end (`round2(total_duration_ms / 1000)`); the
    /// composite is truncated to this length.
    pub total_duration_secs: f64,
}

impl Timeline {
    /// Sum of all clip durations.
    pub fn clip_duration_sum(&self) -> f64 {
        self.entries.iter().map(|e| e.duration_secs).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Truncate to tenths of a second.
///
/// The nudge absorbs binary representation error so `5.3 - 0.0` stays `5.3`
/// instead of collapsing to `5.2`.
pub fn round1(secs: f64) -> f64 {
    let scaled = secs * 10.0;
    (scaled + 1e-6 * scaled.signum()).trunc() / 10.0
}

/// Round half away from zero to hundredths of a second.
pub fn round2(secs: f64) -> f64 {
    (secs * 100.0).round() / 100.0
}

/// Compute per-slide clip durations.
///
/// Every slide but the last plays for `round1(end - start)`. The last slide
/// plays from its start until `round2(total_duration_ms / 1000)`, whatever
/// its own declared end says. Negative results clamp to zero.
pub fn reconcile(
    slides: &[SlideDescriptor],
    metadata: &RecordingMetadata,
) -> RecastResult<Timeline> {
    let total_ms = metadata.total_duration_ms;
    if !total_ms.is_finite() || total_ms < 0.0 {
        return Err(RecastError::invalid_duration(format!(
            "recording duration must be a non-negative number of milliseconds, got {total_ms}"
        )));
    }

    let Some((last, interior)) = slides.split_last() else {
        return Err(RecastError::invalid_duration(
            "shape descriptor lists no slides to reconcile",
        ));
    };

    let mut entries = Vec::with_capacity(slides.len());
    for slide in interior {
        let declared = round1(slide.end_secs - slide.start_secs);
        entries.push(TimelineEntry::new(
            slide.index,
            clamp_duration(slide, declared),
        ));
    }

    let total_duration_secs = round2(total_ms / 1000.0);
    let corrected = round2(total_duration_secs - last.start_secs);
    tracing::debug!(
        index = last.index,
        declared_end = last.end_secs,
        corrected_end = total_duration_secs,
        duration_secs = corrected,
        "Corrected last slide against recording duration"
    );
    entries.push(TimelineEntry::new(last.index, clamp_duration(last, corrected)));

    Ok(Timeline {
        entries,
        total_duration_secs,
    })
}

fn clamp_duration(slide: &SlideDescriptor, duration_secs: f64) -> f64 {
    if duration_secs < 0.0 {
        tracing::warn!(
            index = slide.index,
            start_secs = slide.start_secs,
            end_secs = slide.end_secs,
            duration_secs,
            "Slide interval is inverted; using a zero-length clip"
        );
        return 0.0;
    }
    // Normalises -0.0 to 0.0.
    duration_secs.max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn slide(index: usize, start: f64, end: f64) -> SlideDescriptor {
        SlideDescriptor {
            index,
            start_secs: start,
            end_secs: end,
            image_ref: format!("presentation/p/slide-{}.png", index + 1),
        }
    }

    fn durations(timeline: &Timeline) -> Vec<f64> {
        timeline.entries.iter().map(|e| e.duration_secs).collect()
    }

    #[test]
    fn test_round1_truncates() {
        assert_eq!(round1(5.0), 5.0);
        assert_eq!(round1(5.39), 5.3);
        assert_eq!(round1(5.3 - 0.0), 5.3);
        assert_eq!(round1(30.1 - 12.4), 17.7);
        assert_eq!(round1(0.0), 0.0);
    }

    #[test]
    fn test_round2_rounds() {
        assert_eq!(round2(18.0), 18.0);
        assert_eq!(round2(7.499), 7.5);
        assert_eq!(round2(12.344), 12.34);
    }

    #[test]
    fn test_three_slides_with_zero_length_middle() {
        let slides = vec![slide(0, 0.0, 5.0), slide(1, 5.0, 5.0), slide(2, 10.0, 99.0)];
        let meta = RecordingMetadata::new(18000.0, "Lecture");
        let timeline = reconcile(&slides, &meta).unwrap();
        assert_eq!(durations(&timeline), vec![5.0, 0.0, 8.0]);
        assert_eq!(timeline.total_duration_secs, 18.0);
    }

    #[test]
    fn test_single_slide_is_metadata_derived() {
        let slides = vec![slide(0, 0.0, 0.0)];
        let meta = RecordingMetadata::new(7500.0, "Lecture");
        let timeline = reconcile(&slides, &meta).unwrap();
        assert_eq!(durations(&timeline), vec![7.5]);
    }

    #[test]
    fn test_last_slide_ignores_declared_end() {
        let meta = RecordingMetadata::new(61_237.0, "Lecture");
        let a = reconcile(&[slide(0, 0.0, 40.0), slide(1, 40.0, 55.0)], &meta).unwrap();
        let b = reconcile(&[slide(0, 0.0, 40.0), slide(1, 40.0, 75.0)], &meta).unwrap();
        assert_eq!(a.entries[1].duration_secs, 21.24);
        assert_eq!(a, b);
    }

    #[test]
    fn test_inverted_interval_clamps_to_zero() {
        let slides = vec![slide(0, 8.0, 3.0), slide(1, 8.0, 10.0)];
        let meta = RecordingMetadata::new(10_000.0, "Lecture");
        let timeline = reconcile(&slides, &meta).unwrap();
        assert_eq!(durations(&timeline), vec![0.0, 2.0]);
    }

    #[test]
    fn test_last_slide_after_recording_end_clamps_to_zero() {
        let slides = vec![slide(0, 0.0, 5.0), slide(1, 12.0, 13.0)];
        let meta = RecordingMetadata::new(10_000.0, "Lecture");
        let timeline = reconcile(&slides, &meta).unwrap();
        assert_eq!(durations(&timeline), vec![5.0, 0.0]);
    }

    #[test]
    fn test_entries_carry_asset_names() {
        let slides = vec![slide(0, 0.0, 1.0), slide(1, 1.0, 2.0)];
        let meta = RecordingMetadata::new(2000.0, "Lecture");
        let timeline = reconcile(&slides, &meta).unwrap();
        assert_eq!(timeline.entries[0].image_file_name, "s1.png");
        assert_eq!(timeline.entries[1].clip_file_name, "v2.mp4");
    }

    #[test]
    fn test_rejects_empty_and_invalid_durations() {
        let meta = RecordingMetadata::new(1000.0, "Lecture");
        assert!(matches!(
            reconcile(&[], &meta),
            Err(RecastError::InvalidDuration { .. })
        ));

        for bad in [-1.0, f64::NAN, f64::INFINITY] {
            let meta = RecordingMetadata::new(bad, "Lecture");
            assert!(matches!(
                reconcile(&[slide(0, 0.0, 1.0)], &meta),
                Err(RecastError::InvalidDuration { .. })
            ));
        }
    }

    fn slide_list() -> impl Strategy<Value = Vec<SlideDescriptor>> {
        prop::collection::vec((0.0f64..600.0, 0.0f64..120.0), 1..40).prop_map(|spans| {
            let mut start = 0.0;
            spans
                .into_iter()
                .enumerate()
                .map(|(index, (gap, len))| {
                    start += gap;
                    slide(index, start, start + len)
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_reconcile_preserves_length_and_order(
            slides in slide_list(),
            total_ms in 0.0f64..100_000_000.0,
        ) {
            let meta = RecordingMetadata::new(total_ms, "p");
            let timeline = reconcile(&slides, &meta).unwrap();
            prop_assert_eq!(timeline.len(), slides.len());
            for (entry, slide) in timeline.entries.iter().zip(&slides) {
                prop_assert_eq!(entry.index, slide.index);
                prop_assert!(entry.duration_secs >= 0.0);
            }
        }

        #[test]
        fn prop_interior_and_last_durations(
            slides in slide_list(),
            total_ms in 0.0f64..100_000_000.0,
        ) {
            let meta = RecordingMetadata::new(total_ms, "p");
            let timeline = reconcile(&slides, &meta).unwrap();
            let last = slides.len() - 1;
            for (i, slide) in slides.iter().enumerate() {
                let expected = if i == last {
                    round2(round2(total_ms / 1000.0) - slide.start_secs)
                } else {
                    round1(slide.end_secs - slide.start_secs)
                };
                prop_assert_eq!(timeline.entries[i].duration_secs, expected.max(0.0));
            }
        }
    }
}
