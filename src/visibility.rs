//! Which layers of a widget are shown.
//!
//! Three layers matter: the dimming overlay, one cutout per hotspot punched
//! through it, and the caption. At most one hotspot is active at a time. The
//! info preview briefly reveals every cutout and then fades out through two
//! timed steps, each of which only applies while its preview is still live.

use std::time::Duration;

use crate::config::Options;
use crate::placement::Placement;
use crate::timeline::Timeline;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layer {
    Hidden,
    Visible,
}

impl Layer {
    pub fn is_visible(self) -> bool {
        self == Layer::Visible
    }

    /// Target opacity for a layer whose shown opacity is `full`.
    pub fn opacity(self, full: f32) -> f32 {
        match self {
            Layer::Hidden => 0.0,
            Layer::Visible => full,
        }
    }
}

/// Caption content and box, kept after hiding so the host can fade it out.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CaptionBox {
    pub index: usize,
    pub placement: Placement,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum InfoStep {
    FadeOverlay { generation: u64, at: Duration },
    FadeCutouts { generation: u64 },
}

#[derive(Debug)]
pub struct VisibilityState {
    dim: Layer,
    cutouts: Vec<Layer>,
    caption: Option<CaptionBox>,
    caption_layer: Layer,
    active: Option<usize>,

    info_live: bool,
    info_generation: u64,
    info_delay: Duration,
    fade_delay: Duration,
    timeline: Timeline<InfoStep>,
}

impl VisibilityState {
    pub fn new(hotspot_count: usize, options: &Options) -> Self {
        Self {
            dim: Layer::Hidden,
            cutouts: vec![Layer::Hidden; hotspot_count],
            caption: None,
            caption_layer: Layer::Hidden,
            active: None,
            info_live: false,
            info_generation: 0,
            info_delay: options.info_delay(),
            fade_delay: options.animation_duration() * 2,
            timeline: Timeline::new(),
        }
    }

    pub fn dim(&self) -> Layer {
        self.dim
    }

    pub fn cutout(&self, index: usize) -> Layer {
        self.cutouts.get(index).copied().unwrap_or(Layer::Hidden)
    }

    pub fn cutouts(&self) -> &[Layer] {
        &self.cutouts
    }

    pub fn caption(&self) -> Option<&CaptionBox> {
        self.caption.as_ref()
    }

    pub fn caption_layer(&self) -> Layer {
        self.caption_layer
    }

    /// A hidden caption sits behind the media so it never catches input.
    pub fn caption_in_front(&self) -> bool {
        self.caption_layer.is_visible()
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_none()
    }

    pub fn info_live(&self) -> bool {
        self.info_live
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.timeline.next_deadline()
    }

    /// Show hotspot `index` with its caption at `placement`. Any other active
    /// hotspot loses its cutout, and a running info preview is superseded.
    pub fn activate(&mut self, index: usize, placement: Placement) -> bool {
        if index >= self.cutouts.len() {
            log::warn!("activate: no hotspot {index}");
            return false;
        }
        self.info_live = false;
        for (i, cutout) in self.cutouts.iter_mut().enumerate() {
            if i != index {
                *cutout = Layer::Hidden;
            }
        }
        self.cutouts[index] = Layer::Visible;
        self.dim = Layer::Visible;
        self.caption = Some(CaptionBox { index, placement });
        self.caption_layer = Layer::Visible;
        self.active = Some(index);
        log::debug!("hotspot {index} active, caption {placement:?}");
        true
    }

    /// Hide hotspot `index`. A leave event for a hotspot that is no longer
    /// the active one only clears its own cutout.
    pub fn deactivate(&mut self, index: usize) {
        let Some(cutout) = self.cutouts.get_mut(index) else {
            log::warn!("deactivate: no hotspot {index}");
            return;
        };
        *cutout = Layer::Hidden;
        if self.active.is_some_and(|active| active != index) {
            return;
        }
        self.dim = Layer::Hidden;
        self.caption_layer = Layer::Hidden;
        self.active = None;
        log::debug!("hotspot {index} inactive");
    }

    /// Reveal every cutout, then fade the overlay after the info delay and
    /// the cutouts after twice the animation duration.
    pub fn info_preview(&mut self, now: Duration) {
        self.info_generation += 1;
        self.info_live = true;
        self.active = None;
        self.caption_layer = Layer::Hidden;
        self.cutouts.fill(Layer::Visible);
        self.dim = Layer::Visible;
        self.timeline.schedule(
            now + self.info_delay,
            InfoStep::FadeOverlay {
                generation: self.info_generation,
                at: now + self.info_delay,
            },
        );
        log::debug!("info preview {} started", self.info_generation);
    }

    /// Stop the info preview at once. Steps still pending from it become
    /// no-ops.
    pub fn info_cancel(&mut self) {
        self.info_live = false;
        self.active = None;
        self.caption_layer = Layer::Hidden;
        self.cutouts.fill(Layer::Hidden);
        self.dim = Layer::Hidden;
    }

    /// Apply timed steps due at `now`. Returns whether any layer changed.
    pub fn tick(&mut self, now: Duration) -> bool {
        let mut changed = false;
        // A fired step may schedule its follow-up already due at `now`.
        while !self.timeline.is_empty() {
            let due = self.timeline.drain_due(now);
            if due.is_empty() {
                break;
            }
            for step in due {
                changed |= self.apply(step);
            }
        }
        changed
    }

    fn apply(&mut self, step: InfoStep) -> bool {
        match step {
            InfoStep::FadeOverlay { generation, at } => {
                if generation != self.info_generation {
                    return false;
                }
                self.timeline
                    .schedule(at + self.fade_delay, InfoStep::FadeCutouts { generation });
                if !self.info_live {
                    return false;
                }
                self.dim = Layer::Hidden;
                true
            }
            InfoStep::FadeCutouts { generation } => {
                if generation != self.info_generation {
                    return false;
                }
                let live = std::mem::replace(&mut self.info_live, false);
                if !live {
                    return false;
                }
                self.cutouts.fill(Layer::Hidden);
                log::debug!("info preview {generation} finished");
                true
            }
        }
    }
}
