//! Choosing what the widget shows underneath its hotspots.
//!
//! Device capabilities are decided once by the caller and passed in; nothing
//! here queries the environment.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::input::InputMode;

pub const VIDEO_FORMATS: [&str; 3] = ["mp4", "ogg", "webm"];
pub const VOLUME_FADE: Duration = Duration::from_millis(750);
/// How far playback steps back when stopped, so resuming repeats a moment.
pub const STOP_REWIND: Duration = Duration::from_millis(400);

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaSources {
    #[serde(default)]
    pub image: Option<String>,
    /// Video location without extension; one source per [`VIDEO_FORMATS`].
    #[serde(default)]
    pub video: Option<String>,
    #[serde(default)]
    pub poster: Option<String>,
    #[serde(default)]
    pub audio: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capabilities {
    pub touch: bool,
    pub autoplay: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            touch: false,
            autoplay: true,
        }
    }
}

impl Capabilities {
    /// iPhone and iPod browsers refuse to autoplay; everything else is
    /// assumed to allow it.
    pub fn from_user_agent(user_agent: &str, touch: bool) -> Self {
        let ua = user_agent.to_ascii_lowercase();
        let autoplay = !(ua.contains("iphone") || ua.contains("ipod"));
        Self { touch, autoplay }
    }

    pub fn input_mode(&self) -> InputMode {
        if self.touch {
            InputMode::Touch
        } else {
            InputMode::Pointer
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct VideoSource {
    pub url: String,
    pub mime: String,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Visual {
    Image(String),
    Video {
        sources: Vec<VideoSource>,
        poster: Option<String>,
    },
    /// The video's poster standing in as a still image.
    Poster(String),
}

impl Visual {
    /// The still to draw, if any: the image, the poster stand-in, or the
    /// video's own poster.
    pub fn still(&self) -> Option<&str> {
        match self {
            Visual::Image(url) | Visual::Poster(url) => Some(url),
            Visual::Video { poster, .. } => poster.as_deref(),
        }
    }

    pub fn is_video(&self) -> bool {
        matches!(self, Visual::Video { .. })
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MediaPlan {
    pub visual: Option<Visual>,
    /// Looping background audio.
    pub audio: Option<String>,
}

impl MediaPlan {
    pub fn is_video(&self) -> bool {
        self.visual.as_ref().is_some_and(Visual::is_video)
    }
}

/// Pick exactly one visual: an image first, then autoplaying video, then the
/// poster as an image only where video cannot autoplay.
pub fn resolve(sources: &MediaSources, caps: Capabilities) -> MediaPlan {
    let visual = if let Some(image) = &sources.image {
        Some(Visual::Image(image.clone()))
    } else if let Some(video) = sources.video.as_ref().filter(|_| caps.autoplay) {
        Some(Visual::Video {
            sources: VIDEO_FORMATS
                .iter()
                .map(|ext| VideoSource {
                    url: format!("{video}.{ext}"),
                    mime: format!("video/{ext}"),
                })
                .collect(),
            poster: sources.poster.clone(),
        })
    } else if let Some(poster) = sources.poster.as_ref().filter(|_| !caps.autoplay) {
        Some(Visual::Poster(poster.clone()))
    } else {
        None
    };

    if visual.is_none() {
        log::warn!("no usable media among {sources:?}");
    }

    MediaPlan {
        visual,
        audio: sources.audio.clone().filter(|_| caps.autoplay),
    }
}

// ── Playback ────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
enum Fade {
    In { start: Duration },
    Out { start: Duration },
}

/// Transport for the video visual: `play` starts and fades the volume in,
/// `stop` fades it out, then pauses and steps back. Without a video both are
/// no-ops.
///
/// This is a model of the player, not a player. The host owns the decoder and
/// reports its media time through [`Playback::set_position`]; the rewind on
/// stop applies to the last reported position. A host without a decoder (the
/// desktop viewer) never reports one, so the rewind stays at zero.
#[derive(Debug)]
pub struct Playback {
    enabled: bool,
    playing: bool,
    volume: f32,
    position: Duration,
    fade: Option<Fade>,
}

impl Playback {
    pub fn new(plan: &MediaPlan) -> Self {
        Self {
            enabled: plan.is_video(),
            playing: false,
            volume: 0.0,
            position: Duration::ZERO,
            fade: None,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Media time as last reported by the host, moved back by a completed
    /// stop.
    pub fn position(&self) -> Duration {
        self.position
    }

    pub fn set_position(&mut self, position: Duration) {
        self.position = position;
    }

    pub fn is_fading(&self) -> bool {
        self.fade.is_some()
    }

    pub fn play(&mut self, now: Duration) {
        if !self.enabled {
            return;
        }
        self.playing = true;
        self.fade = Some(Fade::In { start: now });
    }

    pub fn stop(&mut self, now: Duration) {
        if !self.enabled || !self.playing {
            return;
        }
        self.fade = Some(Fade::Out { start: now });
    }

    /// Advance the volume fade. Returns whether anything changed.
    pub fn tick(&mut self, now: Duration) -> bool {
        let Some(fade) = self.fade else {
            return false;
        };
        let (start, fading_in) = match fade {
            Fade::In { start } => (start, true),
            Fade::Out { start } => (start, false),
        };
        let t = (now.saturating_sub(start).as_secs_f32() / VOLUME_FADE.as_secs_f32()).min(1.0);
        self.volume = if fading_in { t } else { 1.0 - t };

        if t >= 1.0 {
            self.fade = None;
            if !fading_in {
                self.playing = false;
                self.position = self.position.saturating_sub(STOP_REWIND);
            }
        }
        true
    }
}
