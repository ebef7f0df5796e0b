//! Panel label text and the fade/slide swap between texts.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone};
use clockweather_core::PanelConfig;
use clockweather_weather::Observation;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::alternation::DisplayMode;
use crate::animation::{self, ease_in_quad, ease_out_quad, Tween};
use crate::timer::TimerSlot;

/// Prefix shown before the time when `show-clock-icon` is on
pub const CLOCK_ICON: &str = "🕒";

/// Abbreviated weekday, day.month., 24-hour time, e.g. `Mon 05.02. 14:07`
pub const CLOCK_FORMAT: &str = "%a %d.%m. %H:%M";

const OPAQUE: u8 = 255;

/// Text widget owned by the host shell.
///
/// The panel only writes text and drives opacity and vertical translation.
pub trait PanelLabel: Send + Sync {
    fn text(&self) -> String;

    fn set_text(&self, text: &str);

    fn set_opacity(&self, opacity: u8);

    fn set_translation_y(&self, y: f32);

    /// Stop any animation the host itself runs on the widget.
    fn remove_all_transitions(&self) {}
}

/// Clock text, optionally prefixed with the clock icon and one space.
pub fn clock_text<Tz: TimeZone>(now: &DateTime<Tz>, show_icon: bool) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let time = now.format(CLOCK_FORMAT);
    if show_icon {
        format!("{CLOCK_ICON} {time}")
    } else {
        time.to_string()
    }
}

/// Text for `mode`: the cached weather verbatim, or the clock.
pub fn compose_text<Tz: TimeZone>(
    mode: DisplayMode,
    weather: &Observation,
    show_clock_icon: bool,
    now: &DateTime<Tz>,
) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match mode {
        DisplayMode::Weather => weather.label(),
        DisplayMode::Clock => clock_text(now, show_clock_icon),
    }
}

/// Transition timing
#[derive(Debug, Clone, Copy)]
pub struct TransitionTiming {
    /// Length of each of the two phases
    pub phase: Duration,
    pub frame: Duration,
    /// Vertical distance the text slides out and in
    pub offset: f32,
}

impl Default for TransitionTiming {
    fn default() -> Self {
        Self {
            phase: Duration::from_millis(160),
            frame: Duration::from_millis(16),
            offset: 12.0,
        }
    }
}

impl From<&PanelConfig> for TransitionTiming {
    fn from(config: &PanelConfig) -> Self {
        Self {
            phase: config.transition(),
            frame: config.frame(),
            ..Self::default()
        }
    }
}

/// Opacity and vertical offset last written to the label
#[derive(Debug, Clone, Copy, PartialEq)]
struct Pose {
    opacity: u8,
    y: f32,
}

impl Pose {
    const REST: Pose = Pose {
        opacity: OPAQUE,
        y: 0.0,
    };
}

/// Host label that remembers the pose written to it
struct TrackedLabel {
    inner: Arc<dyn PanelLabel>,
    pose: Mutex<Pose>,
}

impl TrackedLabel {
    fn pose(&self) -> Pose {
        *self.pose.lock()
    }
}

impl PanelLabel for TrackedLabel {
    fn text(&self) -> String {
        self.inner.text()
    }

    fn set_text(&self, text: &str) {
        self.inner.set_text(text);
    }

    fn set_opacity(&self, opacity: u8) {
        self.pose.lock().opacity = opacity;
        self.inner.set_opacity(opacity);
    }

    fn set_translation_y(&self, y: f32) {
        self.pose.lock().y = y;
        self.inner.set_translation_y(y);
    }

    fn remove_all_transitions(&self) {
        self.inner.remove_all_transitions();
    }
}

/// Writes text to the host label, animated or not.
///
/// Only one transition runs at a time; starting another cancels the one in
/// flight and fades out from wherever the old one left the label. Once
/// `teardown` fires, transitions stop touching the label.
pub struct LabelRenderer {
    label: Arc<TrackedLabel>,
    timing: TransitionTiming,
    teardown: CancellationToken,
    transition: Mutex<TimerSlot>,
}

impl LabelRenderer {
    pub fn new(label: Arc<dyn PanelLabel>, timing: TransitionTiming, teardown: CancellationToken) -> Self {
        Self {
            label: Arc::new(TrackedLabel {
                inner: label,
                pose: Mutex::new(Pose::REST),
            }),
            timing,
            teardown,
            transition: Mutex::new(TimerSlot::new("label-transition")),
        }
    }

    /// Set `text` at rest with no animation, cancelling any transition.
    pub fn show(&self, text: &str) {
        self.transition.lock().cancel();
        self.label.remove_all_transitions();
        self.label.set_text(text);
        self.label.set_opacity(OPAQUE);
        self.label.set_translation_y(0.0);
    }

    /// Fade/slide the current text out, swap in `text`, slide it back in.
    pub fn slide_to(&self, text: String) {
        if self.teardown.is_cancelled() {
            return;
        }

        let label = Arc::clone(&self.label);
        let timing = self.timing;
        let teardown = self.teardown.clone();
        let handle = tokio::spawn(async move {
            run_transition(label, text, timing, teardown).await;
        });
        self.transition.lock().replace(handle);
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.lock().is_armed()
    }
}

async fn run_transition(
    label: Arc<TrackedLabel>,
    text: String,
    timing: TransitionTiming,
    teardown: CancellationToken,
) {
    let start = label.pose();
    let out = Tween {
        from_opacity: start.opacity,
        to_opacity: 0,
        from_y: start.y,
        to_y: -timing.offset,
        easing: ease_out_quad,
    };
    if !animation::play(label.as_ref(), out, timing.phase, timing.frame, &teardown).await {
        return;
    }

    if teardown.is_cancelled() {
        return;
    }
    label.set_text(&text);
    label.set_translation_y(timing.offset);

    let back = Tween {
        from_opacity: 0,
        to_opacity: OPAQUE,
        from_y: timing.offset,
        to_y: 0.0,
        easing: ease_in_quad,
    };
    animation::play(label.as_ref(), back, timing.phase, timing.frame, &teardown).await;
}
