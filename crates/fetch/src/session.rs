//! Session URL resolution.
//!
//! Users paste a playback link such as
//! `https://bbb.example.org/playback/presentation/2.3/<id>` or
//! `https://bbb.example.org/playback/presentation/2.0/playback.html?meetingId=<id>`.
//! Every asset of that recording lives under
//! `https://bbb.example.org/presentation/<id>/`.

use reqwest::Url;

use recast_common::error::{RecastError, RecastResult};

/// A resolved recording location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUrl {
    presentation_id: String,
    base_url: String,
}

impl SessionUrl {
    /// Resolve a playback link.
    ///
    /// The presentation id is the `meetingId` query parameter when present,
    /// otherwise the final non-empty path segment.
    pub fn parse(raw: &str) -> RecastResult<Self> {
        let raw = raw.trim();
        let url =
            Url::parse(raw).map_err(|e| RecastError::invalid_session_url(raw, e.to_string()))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(RecastError::invalid_session_url(
                raw,
                format!("unsupported scheme {:?}", url.scheme()),
            ));
        }
        if url.host_str().is_none() {
            return Err(RecastError::invalid_session_url(raw, "missing host"));
        }

        let from_query = url
            .query_pairs()
            .find(|(key, value)| key == "meetingId" && !value.is_empty())
            .map(|(_, value)| value.into_owned());
        let from_path = || {
            url.path_segments()
                .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
                .map(str::to_string)
        };

        let presentation_id = from_query
            .or_else(from_path)
            .ok_or_else(|| RecastError::invalid_session_url(raw, "no presentation id in URL"))?;

        if !is_valid_presentation_id(&presentation_id) {
            return Err(RecastError::invalid_session_url(
                raw,
                format!("{presentation_id:?} is not a presentation id"),
            ));
        }

        let base_url = format!(
            "{}/presentation/{}",
            url.origin().ascii_serialization(),
            presentation_id
        );

        Ok(Self {
            presentation_id,
            base_url,
        })
    }

    /// Final identifier of the recording; also names the staging directory.
    pub fn presentation_id(&self) -> &str {
        &self.presentation_id
    }

    /// `<origin>/presentation/<id>`, without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn metadata_url(&self) -> String {
        format!("{}/metadata.xml", self.base_url)
    }

    pub fn shapes_url(&self) -> String {
        format!("{}/shapes.svg", self.base_url)
    }

    /// URL of a webcam recording container (`webcams.webm`, `webcams.mp4`).
    pub fn webcam_url(&self, file_name: &str) -> String {
        format!("{}/video/{}", self.base_url, file_name)
    }

    /// Resolve a slide `href` from the shape descriptor.
    pub fn slide_url(&self, image_ref: &str) -> String {
        if image_ref.starts_with("http://") || image_ref.starts_with("https://") {
            return image_ref.to_string();
        }
        format!("{}/{}", self.base_url, image_ref.trim_start_matches('/'))
    }
}

/// Ids are used as directory names, so only `[A-Za-z0-9_-]` is accepted.
fn is_valid_presentation_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
