//! Opacity/translation tweens for the label transition.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::label::PanelLabel;

pub type Easing = fn(f32) -> f32;

pub fn ease_out_quad(t: f32) -> f32 {
    t * (2.0 - t)
}

pub fn ease_in_quad(t: f32) -> f32 {
    t * t
}

/// Start and end values of the two animated label properties
#[derive(Debug, Clone, Copy)]
pub struct Tween {
    pub from_opacity: u8,
    pub to_opacity: u8,
    pub from_y: f32,
    pub to_y: f32,
    pub easing: Easing,
}

impl Tween {
    /// Property values at `progress` in `0.0..=1.0`
    pub fn at(&self, progress: f32) -> (u8, f32) {
        let t = (self.easing)(progress.clamp(0.0, 1.0));
        let opacity = f32::from(self.from_opacity)
            + (f32::from(self.to_opacity) - f32::from(self.from_opacity)) * t;
        let y = self.from_y + (self.to_y - self.from_y) * t;
        (opacity.round().clamp(0.0, 255.0) as u8, y)
    }
}

/// Drive `tween` on `label` over `duration`, one step per `frame`.
///
/// Returns false if `teardown` fired before the last frame; nothing is written
/// to the label after that.
pub async fn play(
    label: &dyn PanelLabel,
    tween: Tween,
    duration: Duration,
    frame: Duration,
    teardown: &CancellationToken,
) -> bool {
    let start = Instant::now();
    let frame = frame.max(Duration::from_millis(1));

    loop {
        if teardown.is_cancelled() {
            return false;
        }

        let progress = if duration.is_zero() {
            1.0
        } else {
            start.elapsed().as_secs_f32() / duration.as_secs_f32()
        };
        let (opacity, y) = tween.at(progress);
        label.set_opacity(opacity);
        label.set_translation_y(y);

        if progress >= 1.0 {
            return true;
        }

        tokio::select! {
            _ = teardown.cancelled() => return false,
            _ = tokio::time::sleep(frame) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_easing_endpoints() {
        for easing in [ease_out_quad as Easing, ease_in_quad] {
            assert_eq!(easing(0.0), 0.0);
            assert_eq!(easing(1.0), 1.0);
        }
        assert!(ease_out_quad(0.5) > 0.5);
        assert!(ease_in_quad(0.5) < 0.5);
    }

    #[test]
    fn test_tween_interpolates_both_properties() {
        let tween = Tween {
            from_opacity: 255,
            to_opacity: 0,
            from_y: 0.0,
            to_y: -12.0,
            easing: ease_in_quad,
        };
        assert_eq!(tween.at(0.0), (255, 0.0));
        assert_eq!(tween.at(1.0), (0, -12.0));
        assert_eq!(tween.at(2.0), (0, -12.0));

        let (opacity, y) = tween.at(0.5);
        assert_eq!(opacity, 191);
        assert!((y + 3.0).abs() < f32::EPSILON);
    }
}
