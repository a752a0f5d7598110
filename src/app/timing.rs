use std::time::{Duration, Instant};
use winit::window::Window;

const TITLE_INTERVAL_SECS: f32 = 0.5;

pub struct FrameTiming {
    last_frame_time: Option<Instant>,
    last_fps_time: Instant,
    frame_count: u32,
    pub frame_dt: f32,
    paint_ms: f32,
    base_title: String,
}

impl FrameTiming {
    pub fn new(base_title: impl Into<String>) -> Self {
        Self {
            last_frame_time: None,
            last_fps_time: Instant::now(),
            frame_count: 0,
            frame_dt: 1.0 / 60.0,
            paint_ms: 0.0,
            base_title: base_title.into(),
        }
    }

    pub fn set_paint_time(&mut self, elapsed: Duration) {
        self.paint_ms = elapsed.as_secs_f32() * 1000.0;
    }

    /// Advances the frame clock; every half second the window title shows the rate.
    pub fn update(&mut self, window: Option<&Window>, now: Instant) {
        let dt = match self.last_frame_time {
            Some(last) => now.saturating_duration_since(last),
            None => Duration::from_millis(16),
        };
        self.last_frame_time = Some(now);
        // long stalls (dialogs, minimised window) would otherwise spin the camera
        self.frame_dt = dt.as_secs_f32().clamp(0.0, 0.1);

        self.frame_count = self.frame_count.saturating_add(1);
        let elapsed = now.saturating_duration_since(self.last_fps_time).as_secs_f32();
        if elapsed >= TITLE_INTERVAL_SECS {
            let fps = self.frame_count as f32 / elapsed;
            if let Some(window) = window {
                window.set_title(&self.title(fps));
            }
            self.frame_count = 0;
            self.last_fps_time = now;
        }
    }

    fn title(&self, fps: f32) -> String {
        format!(
            "{} - {:.1} fps (frame {:.2} ms, paint {:.2} ms)",
            self.base_title,
            fps,
            self.frame_dt * 1000.0,
            self.paint_ms
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_delta_is_clamped() {
        let mut timing = FrameTiming::new("Scene");
        let start = Instant::now();
        timing.update(None, start);
        assert!((timing.frame_dt - 0.016).abs() < 1e-6);

        timing.update(None, start + Duration::from_secs(5));
        assert_eq!(timing.frame_dt, 0.1);
    }

    #[test]
    fn title_reports_rates() {
        let mut timing = FrameTiming::new("Scene");
        timing.set_paint_time(Duration::from_micros(2500));
        let title = timing.title(59.94);
        assert!(title.starts_with("Scene - 59.9 fps"));
        assert!(title.ends_with("paint 2.50 ms)"));
    }
}
