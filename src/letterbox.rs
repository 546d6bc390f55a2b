/// Where the media wrapper sits relative to its container, in container
/// pixels. Offsets are zero or negative: the wrapper covers the container and
/// overhangs it equally on both sides of one axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WrapperBox {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

/// Fit media of the given height/width `aspect_ratio` so it covers a
/// `width` x `height` container, centred.
pub fn cover(width: f32, height: f32, aspect_ratio: f32) -> WrapperBox {
    if width <= 0.0 || height <= 0.0 {
        return WrapperBox {
            left: 0.0,
            top: 0.0,
            width: width.max(0.0),
            height: height.max(0.0),
        };
    }

    if height / width > aspect_ratio {
        // container is taller than the media
        let wrapper_width = height / aspect_ratio;
        WrapperBox {
            left: -(wrapper_width - width) / 2.0,
            top: 0.0,
            width: wrapper_width,
            height,
        }
    } else {
        // container is wider than the media
        let wrapper_height = width * aspect_ratio;
        WrapperBox {
            left: 0.0,
            top: -(wrapper_height - height) / 2.0,
            width,
            height: wrapper_height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tall_container_pads_width() {
        let b = cover(400.0, 600.0, 0.75);
        assert_eq!(b.width, 800.0);
        assert_eq!(b.height, 600.0);
        assert_eq!(b.left, -200.0);
        assert_eq!(b.top, 0.0);
    }

    #[test]
    fn wide_container_pads_height() {
        let b = cover(800.0, 300.0, 0.75);
        assert_eq!(b.width, 800.0);
        assert_eq!(b.height, 600.0);
        assert_eq!(b.top, -150.0);
        assert_eq!(b.left, 0.0);
    }

    #[test]
    fn matching_aspect_fits_exactly() {
        let b = cover(400.0, 300.0, 0.75);
        assert_eq!(b, WrapperBox { left: 0.0, top: 0.0, width: 400.0, height: 300.0 });
    }

    #[test]
    fn empty_container_collapses() {
        let b = cover(0.0, 300.0, 0.75);
        assert_eq!(b.width, 0.0);
        assert_eq!(b.left, 0.0);
    }
}
