use std::time::Duration;

use annotated::input::{Action, InputEvent};
use annotated::media::{Capabilities, MediaSources, Visual};
use annotated::visibility::Layer;
use annotated::{Annotated, Document, Options, Rect, Side};

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

fn harbour(caps: Capabilities) -> Annotated {
    let document = Document::from_json(
        r#"{
            "id": "Harbour",
            "aspect": "3/4",
            "video": "clips/harbour",
            "poster": "clips/harbour.jpg",
            "hotspots": [
                {"centre": "20,30", "caption": "<b>Lighthouse</b><p>Built 1890</p>"},
                {"centre": "70,60", "caption": "Fish market"},
                {"centre": "broken", "caption": "never shown"}
            ],
            "options": {"info_delay_ms": 600}
        }"#,
        "/srv",
    )
    .unwrap();
    Annotated::from_document(&document, caps).unwrap()
}

fn container() -> Rect {
    Rect::new(0.0, 0.0, 400.0, 300.0)
}

#[test]
fn registry_drops_malformed_and_scales_y() {
    let widget = harbour(Capabilities::default());
    assert_eq!(widget.annotation().hotspots().len(), 2);
    assert_eq!(widget.hotspot_center(0), Some((20.0, 22.5)));
    assert_eq!(widget.view_box(), (100.0, 75.0));
}

#[test]
fn at_most_one_hotspot_is_active() {
    let mut widget = harbour(Capabilities::default());
    let a = Rect::new(70.0, 80.0, 90.0, 100.0);
    let b = Rect::new(270.0, 170.0, 290.0, 190.0);

    widget.hotspot_on(0, &a, &container(), |_, _| 40.0);
    widget.hotspot_on(1, &b, &container(), |_, _| 40.0);

    let visibility = widget.visibility();
    assert_eq!(visibility.active(), Some(1));
    assert_eq!(visibility.cutout(0), Layer::Hidden);
    assert_eq!(visibility.cutout(1), Layer::Visible);
    assert_eq!(visibility.caption().map(|c| c.index), Some(1));
    assert_eq!(visibility.caption().map(|c| c.placement.side), Some(Side::Left));
}

#[test]
fn scenario_right_edge_hotspot() {
    let mut widget = harbour(Capabilities::default());
    let placement = widget
        .hotspot_on(
            0,
            &Rect::new(350.0, 140.0, 370.0, 160.0),
            &container(),
            |_, _| 100.0,
        )
        .unwrap();
    assert_eq!(placement.side, Side::Left);
    assert_eq!(placement.width, 350.0 * annotated::placement::WIDTH_FACTOR);
    assert!(placement.top >= 0.0 && placement.top <= 200.0);
    assert!(placement.top + placement.height <= 300.0);
}

#[test]
fn info_preview_cancelled_early_changes_nothing_later() {
    let mut widget = harbour(Capabilities::default());
    widget.info_on(ms(0));
    assert_eq!(widget.visibility().dim(), Layer::Visible);
    widget.info_off();

    let dim = widget.visibility().dim();
    let cutouts = widget.visibility().cutouts().to_vec();
    assert!(!widget.tick(ms(600)));
    assert!(!widget.tick(ms(1000)));
    assert_eq!(widget.visibility().dim(), dim);
    assert_eq!(widget.visibility().cutouts(), cutouts.as_slice());
}

#[test]
fn info_preview_uses_configured_delay() {
    let mut widget = harbour(Capabilities::default());
    widget.info_on(ms(100));
    assert_eq!(widget.next_deadline(), Some(ms(700)));
    widget.tick(ms(700));
    assert_eq!(widget.visibility().dim(), Layer::Hidden);
    assert_eq!(widget.next_deadline(), Some(ms(1100)));
    widget.tick(ms(1100));
    assert!(widget.visibility().cutouts().iter().all(|c| *c == Layer::Hidden));
}

#[test]
fn zero_hotspots_hide_the_info_affordance() {
    let mut widget = Annotated::from_raw(
        Some(annotated::RawAnnotation {
            id: "empty".into(),
            ..Default::default()
        }),
        "#empty",
        &MediaSources::default(),
        Options::default(),
        Capabilities::default(),
    )
    .unwrap();
    assert!(!widget.info_affordance_visible());
    assert_eq!(widget.handle_info_event(InputEvent::PointerEnter, ms(0)), Some(Action::Activate));
    assert!(!widget.visibility().info_live());
    assert_eq!(widget.visibility().dim(), Layer::Hidden);
}

#[test]
fn touch_device_without_autoplay_shows_poster() {
    let caps = Capabilities::from_user_agent("Mozilla/5.0 (iPhone; CPU iPhone OS 17_0)", true);
    let mut widget = harbour(caps);
    let poster = std::path::Path::new("/srv").join("clips/harbour.jpg");
    assert_eq!(
        widget.media().visual,
        Some(Visual::Poster(poster.display().to_string()))
    );

    let hotspot = Rect::new(70.0, 80.0, 90.0, 100.0);
    let ignored =
        widget.handle_hotspot_event(0, InputEvent::PointerEnter, &hotspot, &container(), |_, _| 10.0);
    assert_eq!(ignored, None);
    widget.handle_hotspot_event(0, InputEvent::TouchStart, &hotspot, &container(), |_, _| 10.0);
    assert_eq!(widget.visibility().active(), Some(0));
    widget.handle_hotspot_event(0, InputEvent::TouchCancel, &hotspot, &container(), |_, _| 10.0);
    assert!(widget.visibility().is_idle());

    widget.play(ms(0));
    assert!(!widget.playback().is_playing());
}

#[test]
fn video_widget_fades_in_on_play() {
    let mut widget = harbour(Capabilities::default());
    assert!(widget.media().is_video());
    widget.play(ms(0));
    assert!(widget.needs_animation());
    widget.tick(ms(750));
    assert_eq!(widget.playback().volume(), 1.0);
}
