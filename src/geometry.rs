/// Axis-aligned box in screen points, as reported by the host's layout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Rect {
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn from_center(cx: f32, cy: f32, half_w: f32, half_h: f32) -> Self {
        Self::new(cx - half_w, cy - half_h, cx + half_w, cy + half_h)
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn center_y(&self) -> f32 {
        self.top + self.height() / 2.0
    }
}

impl From<egui::Rect> for Rect {
    fn from(r: egui::Rect) -> Self {
        Self::new(r.min.x, r.min.y, r.max.x, r.max.y)
    }
}

impl From<Rect> for egui::Rect {
    fn from(r: Rect) -> Self {
        egui::Rect::from_min_max(egui::pos2(r.left, r.top), egui::pos2(r.right, r.bottom))
    }
}

/// Distances from a box to each edge of its container. Always container
/// relative, regardless of where the container sits on screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Margins {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Margins {
    pub fn between(inner: &Rect, container: &Rect) -> Self {
        Self {
            left: inner.left - container.left,
            right: container.right - inner.right,
            top: inner.top - container.top,
            bottom: container.bottom - inner.bottom,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn margins_ignore_container_offset() {
        let container = Rect::new(0.0, 0.0, 400.0, 300.0);
        let hotspot = Rect::new(350.0, 140.0, 370.0, 160.0);
        let at_origin = Margins::between(&hotspot, &container);

        let shift = |r: Rect| Rect::new(r.left + 120.0, r.top + 45.0, r.right + 120.0, r.bottom + 45.0);
        let shifted = Margins::between(&shift(hotspot), &shift(container));

        assert_eq!(at_origin, shifted);
        assert_eq!(at_origin.left, 350.0);
        assert_eq!(at_origin.right, 30.0);
        assert_eq!(at_origin.top, 140.0);
        assert_eq!(at_origin.bottom, 140.0);
    }

    #[test]
    fn egui_round_trip_keeps_edges() {
        let r = Rect::new(1.0, 2.0, 30.0, 40.0);
        let e: egui::Rect = r.into();
        assert_eq!(e.width(), 29.0);
        assert_eq!(Rect::from(e), r);
    }
}
