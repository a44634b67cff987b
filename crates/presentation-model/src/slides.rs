//! Slide intervals from the shape descriptor (`shapes.svg`).
//!
//! The descriptor is an SVG document whose root carries one `<image>` per
//! slide, in playback order:
//!
//! ```xml
//! <svg>
//!   <image in="0.0" out="12.4" xlink:href="presentation/abc/slide-1.png"/>
//!   <image in="12.4" out="30.1" xlink:href="presentation/abc/slide-2.png"/>
//! </svg>
//! ```

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::{Deserialize, Serialize};

use recast_common::error::{RecastError, RecastResult};

/// One slide's on-screen interval as declared by the recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlideDescriptor {
    /// Zero-based playback position.
    pub index: usize,

    /// Declared appearance time (seconds).
    pub start_secs: f64,

    /// Declared disappearance time (seconds). May precede `start_secs`.
    pub end_secs: f64,

    /// Image reference relative to the presentation base URL.
    pub image_ref: String,
}

/// Parse shape-descriptor bytes into slides in document order.
///
/// Only `<image>` elements that are direct children of the `<svg>` root are
/// slides; images nested in drawing groups are ignored. Missing `in`/`out`
/// attributes read as `0.0`.
pub fn parse_slides(bytes: &[u8]) -> RecastResult<Vec<SlideDescriptor>> {
    let svg = std::str::from_utf8(bytes)
        .map_err(|e| RecastError::malformed(format!("shapes are not valid UTF-8: {e}")))?;

    let mut reader = Reader::from_str(svg);
    reader.config_mut().trim_text(true);

    let mut slides = Vec::new();
    let mut depth = 0usize;
    let mut saw_root = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                check_root(&e, depth, &mut saw_root)?;
                if depth == 1 && e.local_name().as_ref() == b"image" {
                    slides.push(read_slide(&e, slides.len())?);
                }
                depth += 1;
            }
            Ok(Event::Empty(e)) => {
                check_root(&e, depth, &mut saw_root)?;
                if depth == 1 && e.local_name().as_ref() == b"image" {
                    slides.push(read_slide(&e, slides.len())?);
                }
            }
            Ok(Event::End(_)) => depth = depth.saturating_sub(1),
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(RecastError::malformed(format!(
                    "shapes are not well-formed XML at byte {}: {e}",
                    reader.buffer_position()
                )));
            }
        }
    }

    if !saw_root {
        return Err(RecastError::malformed("shape document has no <svg> root"));
    }
    if depth != 0 {
        return Err(RecastError::malformed("shape document ends inside an element"));
    }

    Ok(slides)
}

fn check_root(element: &BytesStart<'_>, depth: usize, saw_root: &mut bool) -> RecastResult<()> {
    if depth != 0 {
        return Ok(());
    }
    if *saw_root {
        return Err(RecastError::malformed("shape document has more than one root"));
    }
    if element.local_name().as_ref() != b"svg" {
        return Err(RecastError::malformed(format!(
            "expected <svg> root, found <{}>",
            String::from_utf8_lossy(element.local_name().as_ref())
        )));
    }
    *saw_root = true;
    Ok(())
}

fn read_slide(element: &BytesStart<'_>, index: usize) -> RecastResult<SlideDescriptor> {
    let mut slide = SlideDescriptor {
        index,
        start_secs: 0.0,
        end_secs: 0.0,
        image_ref: String::new(),
    };

    for attr in element.attributes() {
        let attr = attr.map_err(|e| {
            RecastError::malformed(format!("bad attribute on slide {}: {e}", index + 1))
        })?;
        let value = attr.unescape_value().map_err(|e| {
            RecastError::malformed(format!("bad attribute value on slide {}: {e}", index + 1))
        })?;

        // Matched by local name so `xlink:href` and `href` are equivalent.
        match attr.key.local_name().as_ref() {
            b"in" => slide.start_secs = parse_seconds(&value, "in", index)?,
            b"out" => slide.end_secs = parse_seconds(&value, "out", index)?,
            b"href" => slide.image_ref = value.trim().to_string(),
            _ => {}
        }
    }

    Ok(slide)
}

fn parse_seconds(value: &str, attr: &str, index: usize) -> RecastResult<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(0.0);
    }
    trimmed.parse::<f64>().map_err(|_| {
        RecastError::malformed(format!(
            "slide {} has non-numeric {attr}={value:?}",
            index + 1
        ))
    })
}
