//! One annotated widget instance.
//!
//! `Annotated` owns everything a single widget needs: its annotation, the
//! parsed captions, the chosen media, the input mode and the visibility
//! machine. Hosts forward boxes and events in and read layer state back out.

use std::time::Duration;

use crate::caption::Caption;
use crate::config::Options;
use crate::document::Document;
use crate::error::Error;
use crate::geometry::Rect;
use crate::input::{Action, InputEvent, InputMode};
use crate::letterbox::{self, WrapperBox};
use crate::media::{self, Capabilities, MediaPlan, MediaSources, Playback};
use crate::model::{build_annotation, Annotation, RawAnnotation};
use crate::placement::{self, Placement};
use crate::visibility::VisibilityState;

/// Width of the hotspot coordinate space; its height is the true height of
/// the same value.
pub const VIEW_BOX_WIDTH: f32 = 100.0;
/// Hotspot and cutout radius in view box units.
pub const HOTSPOT_RADIUS: f32 = 10.0;
/// Share of the cutout radius drawn fully transparent before the edge fade.
pub const CUTOUT_SOLID: f32 = 0.8;

pub struct Annotated {
    annotation: Annotation,
    captions: Vec<Caption>,
    options: Options,
    media: MediaPlan,
    input_mode: InputMode,
    visibility: VisibilityState,
    playback: Playback,
    wrapper: Option<WrapperBox>,
}

impl Annotated {
    pub fn new(
        annotation: Annotation,
        media: &MediaSources,
        options: Options,
        caps: Capabilities,
    ) -> Self {
        let options = options.normalized();
        let media = media::resolve(media, caps);
        let captions = annotation
            .hotspots()
            .iter()
            .map(|h| Caption::parse(&h.caption))
            .collect();
        let visibility = VisibilityState::new(annotation.hotspots().len(), &options);
        let playback = Playback::new(&media);
        log::info!(
            "{}: {} hotspots, {:?} input, visual {:?}",
            annotation.unique_id(),
            annotation.hotspots().len(),
            caps.input_mode(),
            media.visual
        );
        Self {
            annotation,
            captions,
            options,
            media,
            input_mode: caps.input_mode(),
            visibility,
            playback,
            wrapper: None,
        }
    }

    /// Build from raw input. A missing annotation fails construction.
    pub fn from_raw(
        raw: Option<RawAnnotation>,
        element: &str,
        media: &MediaSources,
        options: Options,
        caps: Capabilities,
    ) -> Result<Self, Error> {
        let annotation = build_annotation(raw, element)?;
        Ok(Self::new(annotation, media, options, caps))
    }

    pub fn from_document(document: &Document, caps: Capabilities) -> Result<Self, Error> {
        let annotation = document.build_annotation()?;
        Ok(Self::new(
            annotation,
            &document.resolved_media(),
            document.options,
            caps,
        ))
    }

    pub fn annotation(&self) -> &Annotation {
        &self.annotation
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn media(&self) -> &MediaPlan {
        &self.media
    }

    pub fn input_mode(&self) -> InputMode {
        self.input_mode
    }

    pub fn visibility(&self) -> &VisibilityState {
        &self.visibility
    }

    pub fn playback(&self) -> &Playback {
        &self.playback
    }

    pub fn caption(&self, index: usize) -> Option<&Caption> {
        self.captions.get(index)
    }

    pub fn unique_id(&self) -> String {
        self.annotation.unique_id()
    }

    /// `(width, height)` of the hotspot coordinate space.
    pub fn view_box(&self) -> (f32, f32) {
        (VIEW_BOX_WIDTH, self.annotation.true_height(VIEW_BOX_WIDTH))
    }

    /// Centre of hotspot `index` in view box units.
    pub fn hotspot_center(&self, index: usize) -> Option<(f32, f32)> {
        self.annotation
            .hotspot(index)
            .map(|h| self.annotation.true_position(h))
    }

    /// Topmost hotspot under a view box point.
    pub fn hotspot_at(&self, x: f32, y: f32) -> Option<usize> {
        (0..self.annotation.hotspots().len()).rev().find(|&i| {
            self.hotspot_center(i).is_some_and(|(cx, cy)| {
                let (dx, dy) = (x - cx, y - cy);
                dx * dx + dy * dy <= HOTSPOT_RADIUS * HOTSPOT_RADIUS
            })
        })
    }

    /// The info control is only offered when there is something to preview.
    pub fn info_affordance_visible(&self) -> bool {
        !self.annotation.is_empty()
    }

    /// Route an input event for hotspot `index` according to the widget's
    /// input mode. `measure` is only called when the hotspot activates.
    pub fn handle_hotspot_event(
        &mut self,
        index: usize,
        event: InputEvent,
        hotspot_box: &Rect,
        container_box: &Rect,
        measure: impl FnOnce(&Caption, f32) -> f32,
    ) -> Option<Action> {
        let action = self.input_mode.action(event)?;
        match action {
            Action::Activate => {
                self.hotspot_on(index, hotspot_box, container_box, measure);
            }
            Action::Deactivate => self.hotspot_off(index),
        }
        Some(action)
    }

    /// Route an input event for the info control.
    pub fn handle_info_event(&mut self, event: InputEvent, now: Duration) -> Option<Action> {
        let action = self.input_mode.action(event)?;
        match action {
            Action::Activate => self.info_on(now),
            Action::Deactivate => self.info_off(),
        }
        Some(action)
    }

    /// Activate hotspot `index`: measure its caption at the candidate width,
    /// place it, and show cutout, overlay and caption.
    pub fn hotspot_on(
        &mut self,
        index: usize,
        hotspot_box: &Rect,
        container_box: &Rect,
        measure: impl FnOnce(&Caption, f32) -> f32,
    ) -> Option<Placement> {
        let caption = self.captions.get(index)?;
        let aspect_ratio = self.annotation.aspect_ratio();
        let placement = placement::place_caption(hotspot_box, container_box, aspect_ratio, |width| {
            measure(caption, width)
        });
        self.visibility
            .activate(index, placement)
            .then_some(placement)
    }

    pub fn hotspot_off(&mut self, index: usize) {
        self.visibility.deactivate(index);
    }

    pub fn info_on(&mut self, now: Duration) {
        if !self.info_affordance_visible() {
            return;
        }
        self.visibility.info_preview(now);
    }

    pub fn info_off(&mut self) {
        self.visibility.info_cancel();
    }

    /// Apply timers due at `now`. Returns whether anything visible changed.
    pub fn tick(&mut self, now: Duration) -> bool {
        let layers = self.visibility.tick(now);
        let volume = self.playback.tick(now);
        layers || volume
    }

    /// When the host should call [`Annotated::tick`] next, if ever.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.visibility.next_deadline()
    }

    pub fn needs_animation(&self) -> bool {
        self.playback.is_fading()
    }

    /// Recompute the media wrapper for a container of the given size.
    pub fn resize(&mut self, width: f32, height: f32) -> WrapperBox {
        let wrapper = letterbox::cover(width, height, self.annotation.aspect_ratio());
        if self.wrapper != Some(wrapper) {
            log::debug!("{}: wrapper {wrapper:?}", self.unique_id());
            self.wrapper = Some(wrapper);
        }
        wrapper
    }

    pub fn wrapper(&self) -> Option<WrapperBox> {
        self.wrapper
    }

    pub fn play(&mut self, now: Duration) {
        self.playback.play(now);
    }

    pub fn stop(&mut self, now: Duration) {
        self.playback.stop(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RawHotspot;
    use crate::visibility::Layer;

    fn raw(centres: &[&str]) -> RawAnnotation {
        RawAnnotation {
            id: "Test".into(),
            aspect: Some("1/2".into()),
            hotspots: centres
                .iter()
                .map(|c| RawHotspot {
                    centre: c.to_string(),
                    caption: format!("at {c}"),
                })
                .collect(),
        }
    }

    fn widget(centres: &[&str], caps: Capabilities) -> Annotated {
        let media = MediaSources {
            image: Some("a.png".into()),
            ..Default::default()
        };
        Annotated::from_raw(Some(raw(centres)), "test", &media, Options::default(), caps).unwrap()
    }

    #[test]
    fn missing_annotation_fails_construction() {
        let result = Annotated::from_raw(
            None,
            "#widget",
            &MediaSources::default(),
            Options::default(),
            Capabilities::default(),
        );
        assert!(matches!(result, Err(Error::MissingAnnotation(_))));
    }

    #[test]
    fn view_box_and_centres_use_true_height() {
        let w = widget(&["10,40", "90,80"], Capabilities::default());
        assert_eq!(w.view_box(), (100.0, 50.0));
        assert_eq!(w.hotspot_center(0), Some((10.0, 20.0)));
        assert_eq!(w.hotspot_center(1), Some((90.0, 40.0)));
        assert_eq!(w.hotspot_center(2), None);
    }

    #[test]
    fn hit_testing_prefers_the_later_hotspot() {
        let w = widget(&["10,40", "15,40"], Capabilities::default());
        assert_eq!(w.hotspot_at(12.0, 20.0), Some(1));
        assert_eq!(w.hotspot_at(1.0, 20.0), Some(0));
        assert_eq!(w.hotspot_at(50.0, 45.0), None);
    }

    #[test]
    fn pointer_widget_ignores_touch_events() {
        let mut w = widget(&["10,40"], Capabilities::default());
        let hotspot = Rect::new(10.0, 10.0, 30.0, 30.0);
        let container = Rect::new(0.0, 0.0, 400.0, 200.0);

        let ignored = w.handle_hotspot_event(0, InputEvent::TouchStart, &hotspot, &container, |_, _| 10.0);
        assert_eq!(ignored, None);
        assert!(w.visibility().is_idle());

        let action = w.handle_hotspot_event(0, InputEvent::PointerEnter, &hotspot, &container, |_, _| 10.0);
        assert_eq!(action, Some(Action::Activate));
        assert_eq!(w.visibility().active(), Some(0));
    }

    #[test]
    fn caption_is_measured_with_its_own_content() {
        let mut w = widget(&["10,40", "90,80"], Capabilities::default());
        let mut seen = None;
        w.hotspot_on(
            1,
            &Rect::new(350.0, 140.0, 370.0, 160.0),
            &Rect::new(0.0, 0.0, 400.0, 300.0),
            |caption, width| {
                seen = Some((caption.plain_text(), width));
                100.0
            },
        );
        let (text, width) = seen.unwrap();
        assert_eq!(text, "at 90,80");
        assert_eq!(width, 350.0 * placement::WIDTH_FACTOR);
    }

    #[test]
    fn empty_widget_hides_info_and_never_previews() {
        let mut w = widget(&[], Capabilities::default());
        assert!(!w.info_affordance_visible());
        w.info_on(Duration::ZERO);
        assert!(!w.visibility().info_live());
        assert_eq!(w.visibility().dim(), Layer::Hidden);
        assert_eq!(w.next_deadline(), None);
    }

    #[test]
    fn play_and_stop_are_noops_for_images() {
        let mut w = widget(&["1,1"], Capabilities::default());
        w.play(Duration::ZERO);
        assert!(!w.playback().is_playing());
        w.stop(Duration::from_secs(1));
        assert!(!w.tick(Duration::from_secs(2)));
    }

    #[test]
    fn resize_tracks_the_container() {
        let mut w = widget(&["1,1"], Capabilities::default());
        let b = w.resize(400.0, 400.0);
        assert_eq!(b.width, 800.0);
        assert_eq!(b.left, -200.0);
        assert_eq!(w.wrapper(), Some(b));
    }
}
