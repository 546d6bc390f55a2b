//! Caption placement next to a hotspot.
//!
//! The caption goes on whichever side of the hotspot has more room, takes 90%
//! of that room, and is vertically centred on the hotspot. Inputs and outputs
//! share the caller's coordinate space; margins are measured against the
//! container so its on-screen offset never leaks into the result.

use crate::geometry::{Margins, Rect};

/// Share of the free margin the caption may occupy.
pub const WIDTH_FACTOR: f32 = 0.9;
/// Gap between hotspot and caption, as a share of the free margin.
pub const GAP_FACTOR: f32 = 0.05;
/// Distance kept from the container's top edge when clamping.
pub const EDGE_INSET: f32 = 5.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub side: Side,
    pub left: f32,
    pub top: f32,
    pub width: f32,
    /// Measured caption height the placement was computed for.
    pub height: f32,
}

impl Placement {
    pub fn rect(&self) -> Rect {
        Rect::new(self.left, self.top, self.left + self.width, self.top + self.height)
    }
}

/// Side and width the caption would get before any vertical fitting.
///
/// Ties go to the left.
pub fn candidate(hotspot: &Rect, container: &Rect) -> (Side, f32) {
    let margins = Margins::between(hotspot, container);
    let (side, room) = if margins.left >= margins.right {
        (Side::Left, margins.left)
    } else {
        (Side::Right, margins.right)
    };
    (side, (room * WIDTH_FACTOR).max(0.0))
}

pub fn compute_placement(
    hotspot: &Rect,
    container: &Rect,
    caption_height: f32,
    aspect_ratio: f32,
) -> Placement {
    let margins = Margins::between(hotspot, container);
    let (side, mut width) = candidate(hotspot, container);

    let mut top = hotspot.center_y() - caption_height / 2.0;
    if top < container.top {
        top = container.top + EDGE_INSET;
    }
    if top + caption_height > container.bottom {
        top -= top + caption_height - container.bottom;
    }

    // Translation alone could not fit the caption: trade width for height,
    // using the aspect ratio as the exchange rate.
    if top < container.top {
        let overflow = container.top - top;
        width = (width - overflow / aspect_ratio - EDGE_INSET * 2.0).max(0.0);
        top = container.top + EDGE_INSET;
    }

    let left = match side {
        Side::Left => hotspot.left - width - margins.left * GAP_FACTOR,
        Side::Right => hotspot.right + margins.right * GAP_FACTOR,
    };

    Placement {
        side,
        left,
        top,
        width,
        height: caption_height,
    }
}

/// Two-pass placement: measure the caption laid out at the candidate width,
/// then finalize its position with the measured height.
pub fn place_caption(
    hotspot: &Rect,
    container: &Rect,
    aspect_ratio: f32,
    measure: impl FnOnce(f32) -> f32,
) -> Placement {
    let (_, width) = candidate(hotspot, container);
    let height = measure(width);
    compute_placement(hotspot, container, height, aspect_ratio)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn container() -> Rect {
        Rect::new(0.0, 0.0, 400.0, 300.0)
    }

    #[test]
    fn hotspot_near_right_edge_places_caption_left() {
        let hotspot = Rect::new(350.0, 140.0, 370.0, 160.0);
        let p = compute_placement(&hotspot, &container(), 100.0, 1.0);
        assert_eq!(p.side, Side::Left);
        assert_eq!(p.width, 350.0 * WIDTH_FACTOR);
        assert_eq!(p.top, 100.0);
        assert_eq!(p.left, 350.0 - p.width - 350.0 * GAP_FACTOR);
        assert!(p.top >= 0.0 && p.top <= 200.0);
    }

    #[test]
    fn hotspot_near_left_edge_places_caption_right() {
        let hotspot = Rect::new(20.0, 40.0, 40.0, 60.0);
        let p = compute_placement(&hotspot, &container(), 50.0, 1.0);
        assert_eq!(p.side, Side::Right);
        assert_eq!(p.width, 360.0 * WIDTH_FACTOR);
        assert_eq!(p.left, 40.0 + 360.0 * GAP_FACTOR);
    }

    #[test]
    fn equal_margins_resolve_left() {
        let hotspot = Rect::new(190.0, 140.0, 210.0, 160.0);
        assert_eq!(candidate(&hotspot, &container()).0, Side::Left);
    }

    #[test]
    fn top_is_clamped_to_inset() {
        let hotspot = Rect::new(300.0, 0.0, 320.0, 20.0);
        let p = compute_placement(&hotspot, &container(), 100.0, 1.0);
        assert_eq!(p.top, EDGE_INSET);
        assert_eq!(p.width, 300.0 * WIDTH_FACTOR);
    }

    #[test]
    fn bottom_overflow_is_shifted_up() {
        let hotspot = Rect::new(300.0, 270.0, 320.0, 290.0);
        let p = compute_placement(&hotspot, &container(), 100.0, 1.0);
        assert_eq!(p.top + p.height, 300.0);
        assert_eq!(p.top, 200.0);
    }

    #[test]
    fn caption_taller_than_container_trades_width() {
        let hotspot = Rect::new(300.0, 140.0, 320.0, 160.0);
        let p = compute_placement(&hotspot, &container(), 340.0, 0.5);
        // shifted to -40, so 40 / 0.5 + 10 is taken off 270
        assert_eq!(p.width, 300.0 * WIDTH_FACTOR - 80.0 - 10.0);
        assert_eq!(p.top, EDGE_INSET);
        assert_eq!(p.left, 300.0 - p.width - 300.0 * GAP_FACTOR);
    }

    #[test]
    fn degenerate_shrink_never_goes_negative() {
        let hotspot = Rect::new(30.0, 140.0, 40.0, 160.0);
        let p = compute_placement(&hotspot, &Rect::new(0.0, 0.0, 80.0, 300.0), 5000.0, 1.0);
        assert_eq!(p.width, 0.0);
    }

    #[test]
    fn offset_container_gives_translated_result() {
        let hotspot = Rect::new(350.0, 140.0, 370.0, 160.0);
        let base = compute_placement(&hotspot, &container(), 100.0, 1.0);

        let moved = compute_placement(
            &Rect::new(450.0, 190.0, 470.0, 210.0),
            &Rect::new(100.0, 50.0, 500.0, 350.0),
            100.0,
            1.0,
        );
        assert_eq!(moved.side, base.side);
        assert_eq!(moved.width, base.width);
        assert_eq!(moved.left, base.left + 100.0);
        assert_eq!(moved.top, base.top + 50.0);
    }

    #[test]
    fn identical_inputs_give_identical_output() {
        let hotspot = Rect::new(120.0, 10.0, 140.0, 30.0);
        let a = compute_placement(&hotspot, &container(), 80.0, 0.75);
        let b = compute_placement(&hotspot, &container(), 80.0, 0.75);
        assert_eq!(a, b);
    }

    #[test]
    fn two_pass_measures_at_candidate_width() {
        let hotspot = Rect::new(350.0, 140.0, 370.0, 160.0);
        let mut measured_at = None;
        let p = place_caption(&hotspot, &container(), 1.0, |width| {
            measured_at = Some(width);
            60.0
        });
        assert_eq!(measured_at, Some(350.0 * WIDTH_FACTOR));
        assert_eq!(p.height, 60.0);
        assert_eq!(p.top, 120.0);
    }
}
