use serde::{Deserialize, Serialize};

use crate::aspect;
use crate::error::Error;

// ── Raw input ───────────────────────────────────────────────────────────────

/// A hotspot as written in an annotation document.
///
/// `centre` holds the normalized coordinates as `"x,y"`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RawHotspot {
    #[serde(default)]
    pub centre: String,
    #[serde(default)]
    pub caption: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RawAnnotation {
    pub id: String,
    #[serde(default)]
    pub aspect: Option<String>,
    #[serde(default)]
    pub hotspots: Vec<RawHotspot>,
}

// ── Registry ────────────────────────────────────────────────────────────────

/// A point of interest in normalized space: `x` and `y` both run 0 to 100
/// across the media width, `y` before aspect scaling.
#[derive(Clone, Debug, PartialEq)]
pub struct Hotspot {
    pub x: f32,
    pub y: f32,
    pub caption: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Annotation {
    id: String,
    aspect_ratio: f32,
    hotspots: Vec<Hotspot>,
}

impl Annotation {
    pub fn new(id: impl Into<String>, aspect_ratio: f32, hotspots: Vec<Hotspot>) -> Self {
        let aspect_ratio = if aspect_ratio.is_finite() && aspect_ratio > 0.0 {
            aspect_ratio
        } else {
            aspect::DEFAULT_ASPECT_RATIO
        };
        Self {
            id: id.into(),
            aspect_ratio,
            hotspots,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Height over width of the annotated media.
    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    pub fn hotspots(&self) -> &[Hotspot] {
        &self.hotspots
    }

    pub fn hotspot(&self, index: usize) -> Option<&Hotspot> {
        self.hotspots.get(index)
    }

    pub fn is_empty(&self) -> bool {
        self.hotspots.is_empty()
    }

    /// Map a normalized y value into true space. Every y coordinate goes
    /// through here; x is never scaled.
    pub fn true_height(&self, h: f32) -> f32 {
        h * self.aspect_ratio
    }

    /// Position of a hotspot in true space.
    pub fn true_position(&self, hotspot: &Hotspot) -> (f32, f32) {
        (hotspot.x, self.true_height(hotspot.y))
    }

    /// Identifier namespacing everything drawn for this widget.
    pub fn unique_id(&self) -> String {
        format!("annotated-{}", self.id.replace(' ', "-").to_lowercase())
    }
}

/// Split a `"x,y"` centre into two coordinates.
///
/// Anything but exactly two finite numbers yields `None`.
pub fn parse_centre(centre: &str) -> Option<(f32, f32)> {
    let mut parts = centre.split(',');
    let (Some(x), Some(y), None) = (parts.next(), parts.next(), parts.next()) else {
        return None;
    };
    let x: f32 = x.trim().parse().ok()?;
    let y: f32 = y.trim().parse().ok()?;
    (x.is_finite() && y.is_finite()).then_some((x, y))
}

/// Build the immutable registry for one widget.
///
/// A missing annotation is a configuration error. Malformed hotspots are
/// dropped, and an unusable aspect expression degrades to 1.
pub fn build_annotation(raw: Option<RawAnnotation>, element: &str) -> Result<Annotation, Error> {
    let raw = raw.ok_or_else(|| Error::MissingAnnotation(element.to_string()))?;
    let aspect_ratio = aspect::aspect_ratio(raw.aspect.as_deref());

    let mut hotspots = Vec::with_capacity(raw.hotspots.len());
    for (i, entry) in raw.hotspots.into_iter().enumerate() {
        match parse_centre(&entry.centre) {
            Some((x, y)) => hotspots.push(Hotspot {
                x,
                y,
                caption: entry.caption,
            }),
            None => log::warn!(
                "{element}: dropping hotspot {i} with centre {:?}",
                entry.centre
            ),
        }
    }

    log::debug!(
        "{element}: annotation {:?} with {} hotspots, aspect {aspect_ratio}",
        raw.id,
        hotspots.len()
    );
    Ok(Annotation::new(raw.id, aspect_ratio, hotspots))
}
