//! Frame timing and render counters
//!
//! Keeps a rolling window of frame durations and derives FPS and min/max
//! frame times from it. Derived values refresh at most ten times a second
//! so the on-screen numbers stay readable.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::gfx::rendering::render_engine::FrameStats;

const DEFAULT_SAMPLES: usize = 120;
const UPDATE_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceMetrics {
    pub fps: f32,
    /// Average over the window, in milliseconds.
    pub frame_time_ms: f32,
    pub min_frame_time_ms: f32,
    pub max_frame_time_ms: f32,
    pub draw_calls: u32,
    pub vertex_count: u32,
}

impl Default for PerformanceMetrics {
    fn default() -> Self {
        Self {
            fps: 0.0,
            frame_time_ms: 0.0,
            min_frame_time_ms: 0.0,
            max_frame_time_ms: 0.0,
            draw_calls: 0,
            vertex_count: 0,
        }
    }
}

pub struct PerformanceMonitor {
    frame_times: VecDeque<Duration>,
    max_samples: usize,
    /// Time accumulated since metrics were last derived.
    since_update: Duration,
    last_frame: Option<Instant>,
    metrics: PerformanceMetrics,
}

impl Default for PerformanceMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl PerformanceMonitor {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_SAMPLES)
    }

    pub fn with_capacity(max_samples: usize) -> Self {
        let max_samples = max_samples.max(1);
        Self {
            frame_times: VecDeque::with_capacity(max_samples),
            max_samples,
            since_update: Duration::ZERO,
            last_frame: None,
            metrics: PerformanceMetrics::default(),
        }
    }

    /// Marks a frame boundary and returns the time since the previous one.
    /// The very first call returns zero.
    pub fn tick(&mut self) -> Duration {
        let now = Instant::now();
        let delta = self
            .last_frame
            .map(|last| now.duration_since(last))
            .unwrap_or_default();
        self.last_frame = Some(now);

        if !delta.is_zero() {
            self.record_frame(delta);
        }
        delta
    }

    /// Adds one frame duration to the window.
    pub fn record_frame(&mut self, frame_time: Duration) {
        if self.frame_times.len() >= self.max_samples {
            self.frame_times.pop_front();
        }
        self.frame_times.push_back(frame_time);

        self.since_update += frame_time;
        if self.since_update >= UPDATE_INTERVAL || self.metrics.fps == 0.0 {
            self.since_update = Duration::ZERO;
            self.update_metrics();
        }
    }

    fn update_metrics(&mut self) {
        let (Some(min), Some(max)) = (self.frame_times.iter().min(), self.frame_times.iter().max())
        else {
            return;
        };

        let total: Duration = self.frame_times.iter().sum();
        let average_ms = total.as_secs_f32() * 1000.0 / self.frame_times.len() as f32;

        self.metrics.frame_time_ms = average_ms;
        self.metrics.fps = if average_ms > 0.0 {
            1000.0 / average_ms
        } else {
            0.0
        };
        self.metrics.min_frame_time_ms = min.as_secs_f32() * 1000.0;
        self.metrics.max_frame_time_ms = max.as_secs_f32() * 1000.0;
    }

    pub fn update_render_stats(&mut self, stats: FrameStats) {
        self.metrics.draw_calls = stats.draw_calls;
        self.metrics.vertex_count = stats.vertices;
    }

    pub fn metrics(&self) -> &PerformanceMetrics {
        &self.metrics
    }

    /// Frame times in milliseconds, oldest first.
    pub fn frame_time_history(&self) -> Vec<f32> {
        self.frame_times
            .iter()
            .map(|d| d.as_secs_f32() * 1000.0)
            .collect()
    }

    pub fn render_ui(&self, ui: &imgui::Ui) {
        ui.window("Performance")
            .size([260.0, 190.0], imgui::Condition::FirstUseEver)
            .position([10.0, 420.0], imgui::Condition::FirstUseEver)
            .build(|| {
                let m = &self.metrics;
                ui.text(format!("FPS: {:.1}", m.fps));
                ui.text(format!("Frame time: {:.2} ms", m.frame_time_ms));
                ui.text(format!(
                    "  min {:.2} / max {:.2} ms",
                    m.min_frame_time_ms, m.max_frame_time_ms
                ));
                ui.separator();
                ui.text(format!("Draw calls: {}", m.draw_calls));
                ui.text(format!("Vertices: {}", m.vertex_count));

                if !self.frame_times.is_empty() {
                    ui.separator();
                    let history = self.frame_time_history();
                    ui.plot_lines("##frame_times", &history)
                        .graph_size([240.0, 50.0])
                        .scale_min(0.0)
                        .scale_max(50.0)
                        .build();
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn first_frame_fills_metrics_immediately() {
        let mut monitor = PerformanceMonitor::new();
        monitor.record_frame(ms(20));

        let m = monitor.metrics();
        assert!((m.fps - 50.0).abs() < 1e-3);
        assert!((m.frame_time_ms - 20.0).abs() < 1e-3);
    }

    #[test]
    fn window_drops_oldest_samples() {
        let mut monitor = PerformanceMonitor::with_capacity(3);
        for t in [100, 10, 20, 90] {
            monitor.record_frame(ms(t));
        }

        assert_eq!(monitor.frame_time_history().len(), 3);
        let m = monitor.metrics();
        assert!((m.min_frame_time_ms - 10.0).abs() < 1e-3);
        assert!((m.max_frame_time_ms - 90.0).abs() < 1e-3);
        assert!((m.frame_time_ms - 40.0).abs() < 1e-3);
    }

    #[test]
    fn metrics_refresh_on_interval() {
        let mut monitor = PerformanceMonitor::new();
        monitor.record_frame(ms(10));
        // 90ms of further frames stays under the refresh interval.
        for _ in 0..3 {
            monitor.record_frame(ms(30));
        }
        assert!((monitor.metrics().frame_time_ms - 10.0).abs() < 1e-3);

        monitor.record_frame(ms(30));
        assert!((monitor.metrics().frame_time_ms - 26.0).abs() < 1e-3);
    }

    #[test]
    fn render_stats_pass_through() {
        let mut monitor = PerformanceMonitor::new();
        monitor.update_render_stats(FrameStats {
            draw_calls: 7,
            vertices: 1234,
        });
        assert_eq!(monitor.metrics().draw_calls, 7);
        assert_eq!(monitor.metrics().vertex_count, 1234);
    }

    #[test]
    fn first_tick_is_zero() {
        let mut monitor = PerformanceMonitor::new();
        assert_eq!(monitor.tick(), Duration::ZERO);
        assert!(monitor.frame_time_history().is_empty());
    }
}
