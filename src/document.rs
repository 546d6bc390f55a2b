//! Annotation documents on disk.
//!
//! A document describes one widget: its annotation, the media to show and
//! display options. It can live anywhere, or next to a media file as a
//! sidecar named `<file>.<ext>.annotated`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::Options;
use crate::error::Error;
use crate::media::MediaSources;
use crate::model::{build_annotation, Annotation, RawAnnotation};

pub const SIDECAR_EXTENSION: &str = "annotated";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Document {
    #[serde(flatten)]
    pub annotation: RawAnnotation,
    #[serde(flatten)]
    pub media: MediaSources,
    #[serde(default)]
    pub options: Options,
    /// Directory media paths are relative to.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

pub fn sidecar_path(media_path: &Path) -> PathBuf {
    media_path.with_extension(format!(
        "{}.{SIDECAR_EXTENSION}",
        media_path
            .extension()
            .unwrap_or_default()
            .to_str()
            .unwrap_or("")
    ))
}

/// `path` itself when it is a document, otherwise its sidecar.
pub fn document_path(path: &Path) -> PathBuf {
    let is_document = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e == SIDECAR_EXTENSION || e.eq_ignore_ascii_case("json"));
    if is_document {
        path.to_path_buf()
    } else {
        sidecar_path(path)
    }
}

impl Document {
    pub fn from_json(json: &str, base_dir: impl Into<PathBuf>) -> Result<Self, serde_json::Error> {
        let mut document: Document = serde_json::from_str(json)?;
        document.base_dir = base_dir.into();
        document.options = document.options.normalized();
        Ok(document)
    }

    /// Load the document for `path`, a document or a media file with a
    /// sidecar. A missing document means the widget has no annotation.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let doc_path = document_path(path);
        if !doc_path.exists() {
            return Err(Error::MissingAnnotation(doc_path.display().to_string()));
        }
        let data = std::fs::read_to_string(&doc_path).map_err(|source| Error::Io {
            path: doc_path.clone(),
            source,
        })?;
        let base_dir = doc_path.parent().map(Path::to_path_buf).unwrap_or_default();
        let mut document = Self::from_json(&data, base_dir).map_err(|source| Error::Json {
            path: doc_path.clone(),
            source,
        })?;

        // A sidecar without media of its own annotates the file beside it.
        if doc_path != path && document.media == MediaSources::default() {
            document.media.image = path
                .file_name()
                .and_then(|n| n.to_str())
                .map(str::to_string);
        }
        log::info!("loaded annotation {:?} from {}", document.annotation.id, doc_path.display());
        Ok(document)
    }

    pub fn build_annotation(&self) -> Result<Annotation, Error> {
        build_annotation(Some(self.annotation.clone()), &self.element_name())
    }

    /// Media URLs with relative paths resolved against the document.
    pub fn resolved_media(&self) -> MediaSources {
        let resolve = |url: &Option<String>| url.as_ref().map(|u| self.resolve(u));
        MediaSources {
            image: resolve(&self.media.image),
            video: resolve(&self.media.video),
            poster: resolve(&self.media.poster),
            audio: resolve(&self.media.audio),
        }
    }

    fn resolve(&self, url: &str) -> String {
        if url.contains("://") || Path::new(url).is_absolute() {
            url.to_string()
        } else {
            self.base_dir.join(url).display().to_string()
        }
    }

    fn element_name(&self) -> String {
        format!("annotation {:?}", self.annotation.id)
    }
}
