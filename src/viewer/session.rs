//! Viewer session: owns the frame-delivery thread.
//!
//! The delivery thread polls the sensor on a fixed interval, copies
//! any ready frame into the shared surfaces, and invalidates the view
//! so the frontend refetches. A not-ready channel is skipped for that
//! cycle and the surfaces stay bit-for-bit unchanged.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{info, warn};

use crate::diagnostics::stats::{SessionSnapshot, SessionStats};
use crate::sensor::backend::DepthSensor;
use crate::sensor::error::Result;
use crate::sensor::types::FrameChannel;

use super::surface::{ColorSurface, DepthSurface};

/// Callback invoked when a channel's display frame changes.
pub type InvalidateCallback = Arc<dyn Fn(FrameChannel) + Send + Sync>;

/// Polling interval of the delivery thread, roughly the sensor's 30Hz
/// frame rate.
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(33);

/// Active viewer session for an open sensor.
pub struct ViewSession {
    sensor: Arc<dyn DepthSensor>,
    color: Arc<Mutex<ColorSurface>>,
    depth: Arc<Mutex<DepthSurface>>,
    stats: Arc<Mutex<SessionStats>>,
    running: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl ViewSession {
    /// Open the sensor and start frame delivery.
    pub fn start(sensor: Arc<dyn DepthSensor>, on_invalidate: InvalidateCallback) -> Result<Self> {
        Self::start_with_interval(sensor, on_invalidate, DEFAULT_FRAME_INTERVAL)
    }

    /// Start with a custom polling interval (short intervals keep
    /// tests fast).
    pub fn start_with_interval(
        sensor: Arc<dyn DepthSensor>,
        on_invalidate: InvalidateCallback,
        interval: Duration,
    ) -> Result<Self> {
        sensor.open()?;

        let geometries = (|| {
            let color = sensor.geometry(FrameChannel::Color)?;
            let depth = sensor.geometry(FrameChannel::Depth)?;
            Ok((color, depth))
        })();
        let (color_geometry, depth_geometry) = match geometries {
            Ok(pair) => pair,
            Err(e) => {
                if let Err(close_err) = sensor.close() {
                    warn!("failed to close sensor after setup error: {close_err}");
                }
                return Err(e);
            }
        };

        info!("viewer session starting: color {color_geometry}, depth {depth_geometry}");

        let color = Arc::new(Mutex::new(ColorSurface::new(color_geometry)));
        let depth = Arc::new(Mutex::new(DepthSurface::new(depth_geometry)));
        let stats = Arc::new(Mutex::new(SessionStats::new()));
        let running = Arc::new(AtomicBool::new(true));

        let thread = {
            let sensor_thread = Arc::clone(&sensor);
            let color_thread = Arc::clone(&color);
            let depth_thread = Arc::clone(&depth);
            let stats_thread = Arc::clone(&stats);
            let running_thread = Arc::clone(&running);

            std::thread::Builder::new()
                .name("frame-delivery".to_string())
                .spawn(move || {
                    // Scratch buffers are allocated once; geometry is
                    // fixed for the session.
                    let mut color_buf =
                        vec![0u8; color_geometry.byte_len(FrameChannel::Color)];
                    let mut depth_buf = vec![0u16; depth_geometry.pixel_count()];

                    while running_thread.load(Ordering::Relaxed) {
                        deliver_color(
                            sensor_thread.as_ref(),
                            &mut color_buf,
                            &color_thread,
                            &stats_thread,
                            &on_invalidate,
                        );
                        deliver_depth(
                            sensor_thread.as_ref(),
                            &mut depth_buf,
                            &depth_thread,
                            &stats_thread,
                            &on_invalidate,
                        );
                        std::thread::sleep(interval);
                    }
                })
                .expect("failed to spawn frame-delivery thread")
        };

        Ok(Self {
            sensor,
            color,
            depth,
            stats,
            running,
            thread: Some(thread),
        })
    }

    pub fn sensor(&self) -> &Arc<dyn DepthSensor> {
        &self.sensor
    }

    pub fn color(&self) -> &Arc<Mutex<ColorSurface>> {
        &self.color
    }

    pub fn depth(&self) -> &Arc<Mutex<DepthSurface>> {
        &self.depth
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Take a snapshot of session diagnostics.
    pub fn diagnostics(&self) -> SessionSnapshot {
        self.stats.lock().snapshot()
    }

    /// Stop frame delivery and close the sensor. Idempotent.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
        if let Err(e) = self.sensor.close() {
            warn!("failed to close sensor: {e}");
        }
    }
}

impl Drop for ViewSession {
    fn drop(&mut self) {
        self.stop();
    }
}

fn deliver_color(
    sensor: &dyn DepthSensor,
    buf: &mut [u8],
    surface: &Mutex<ColorSurface>,
    stats: &Mutex<SessionStats>,
    on_invalidate: &InvalidateCallback,
) {
    match sensor.copy_color_frame(buf) {
        Ok(true) => {
            if let Err(e) = surface.lock().update(buf) {
                warn!("color surface update failed: {e}");
                return;
            }
            stats.lock().record_frame(FrameChannel::Color);
            on_invalidate(FrameChannel::Color);
        }
        Ok(false) => stats.lock().record_skip(FrameChannel::Color),
        Err(e) => warn!("color frame copy failed: {e}"),
    }
}

fn deliver_depth(
    sensor: &dyn DepthSensor,
    buf: &mut [u16],
    surface: &Mutex<DepthSurface>,
    stats: &Mutex<SessionStats>,
    on_invalidate: &InvalidateCallback,
) {
    match sensor.copy_depth_frame(buf) {
        Ok(true) => {
            if let Err(e) = surface.lock().update(buf) {
                warn!("depth surface update failed: {e}");
                return;
            }
            stats.lock().record_frame(FrameChannel::Depth);
            on_invalidate(FrameChannel::Depth);
        }
        Ok(false) => stats.lock().record_skip(FrameChannel::Depth),
        Err(e) => warn!("depth frame copy failed: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::kinect::backend::KinectSensor;
    use crate::sensor::kinect::mock::MockKinect;
    use crate::sensor::simulated::SimulatedSensor;
    use crate::sensor::types::FrameGeometry;

    const TEST_INTERVAL: Duration = Duration::from_millis(2);

    fn noop_invalidate() -> InvalidateCallback {
        Arc::new(|_| {})
    }

    fn wait_for<F: Fn() -> bool>(cond: F) {
        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        while !cond() {
            assert!(
                std::time::Instant::now() < deadline,
                "condition not met within 2s"
            );
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    fn simulated() -> Arc<dyn DepthSensor> {
        Arc::new(SimulatedSensor::with_geometry(
            FrameGeometry::new(4, 2),
            FrameGeometry::new(4, 2),
        ))
    }

    #[test]
    fn frames_arrive_from_simulated_sensor() {
        let mut session =
            ViewSession::start_with_interval(simulated(), noop_invalidate(), TEST_INTERVAL)
                .unwrap();
        wait_for(|| session.color().lock().sequence() > 0);
        wait_for(|| session.depth().lock().sequence() > 0);
        session.stop();
    }

    #[test]
    fn invalidate_fires_per_channel() {
        let color_hits = Arc::new(AtomicBool::new(false));
        let depth_hits = Arc::new(AtomicBool::new(false));
        let color_flag = Arc::clone(&color_hits);
        let depth_flag = Arc::clone(&depth_hits);
        let on_invalidate: InvalidateCallback = Arc::new(move |channel| match channel {
            FrameChannel::Color => color_flag.store(true, Ordering::Relaxed),
            FrameChannel::Depth => depth_flag.store(true, Ordering::Relaxed),
        });

        let mut session =
            ViewSession::start_with_interval(simulated(), on_invalidate, TEST_INTERVAL).unwrap();
        wait_for(|| color_hits.load(Ordering::Relaxed) && depth_hits.load(Ordering::Relaxed));
        session.stop();
    }

    #[test]
    fn start_propagates_open_failure() {
        let sensor = Arc::new(KinectSensor::new(Arc::new(MockKinect::new())));
        let result = ViewSession::start_with_interval(sensor, noop_invalidate(), TEST_INTERVAL);
        assert!(result.is_err());
    }

    #[test]
    fn skipped_channel_leaves_surface_unchanged() {
        let mock = Arc::new(
            MockKinect::new()
                .with_geometry(FrameGeometry::new(1, 1), FrameGeometry::new(2, 1))
                .with_color_frame(vec![200, 200, 200, 255])
                .with_depth_frame(vec![4000, 2000]),
        );
        let sensor = Arc::new(KinectSensor::new(Arc::clone(&mock)));
        let mut session =
            ViewSession::start_with_interval(sensor, noop_invalidate(), TEST_INTERVAL).unwrap();

        wait_for(|| session.depth().lock().sequence() > 0);
        let raw_before = session.depth().lock().raw().to_vec();
        let display_before = session.depth().lock().bitmap();
        let seq_before = session.depth().lock().sequence();

        mock.set_depth_ready(false);
        // Give the delivery thread a few cycles to observe not-ready.
        std::thread::sleep(Duration::from_millis(20));

        let depth = session.depth().lock();
        assert_eq!(depth.raw(), raw_before.as_slice());
        assert_eq!(depth.bitmap(), display_before);
        // sequence may have advanced between the reads above and the
        // readiness toggle, but never after the skip started
        assert!(depth.sequence() >= seq_before);
        drop(depth);

        let snapshot = session.diagnostics();
        assert!(snapshot.depth_skip_count > 0);
        session.stop();
    }

    #[test]
    fn diagnostics_count_delivered_frames() {
        let mut session =
            ViewSession::start_with_interval(simulated(), noop_invalidate(), TEST_INTERVAL)
                .unwrap();
        wait_for(|| session.diagnostics().color_frame_count > 2);
        let snapshot = session.diagnostics();
        assert!(snapshot.color_fps > 0.0);
        session.stop();
    }

    #[test]
    fn stop_is_idempotent_and_closes_sensor() {
        let sensor = simulated();
        let mut session =
            ViewSession::start_with_interval(Arc::clone(&sensor), noop_invalidate(), TEST_INTERVAL)
                .unwrap();
        session.stop();
        session.stop();
        assert!(!session.is_running());
        assert!(!sensor.is_open());
    }

    #[test]
    fn session_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<ViewSession>();
    }
}
