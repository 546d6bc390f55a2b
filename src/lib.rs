//! Interactive hotspots over an image, video or poster.
//!
//! The library is host-agnostic: it owns the hotspot registry, the caption
//! placement math and the visibility state machine. A UI host (the `annotated`
//! binary draws with egui) feeds it bounding boxes, pointer events and a
//! monotonic clock, and reads back what to draw.

pub mod aspect;
pub mod caption;
pub mod config;
pub mod document;
pub mod error;
pub mod geometry;
pub mod input;
pub mod letterbox;
pub mod media;
pub mod model;
pub mod placement;
pub mod timeline;
pub mod visibility;
pub mod widget;

pub use config::Options;
pub use document::Document;
pub use error::Error;
pub use geometry::Rect;
pub use model::{build_annotation, Annotation, Hotspot, RawAnnotation, RawHotspot};
pub use placement::{compute_placement, place_caption, Placement, Side};
pub use visibility::{Layer, VisibilityState};
pub use widget::Annotated;
