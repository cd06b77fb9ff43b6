use std::sync::Arc;

use parking_lot::Mutex;
use tauri::{AppHandle, Emitter, Manager, State};
use tauri_plugin_clipboard_manager::ClipboardExt;
use tracing::{info, warn};

use crate::diagnostics::stats::SessionSnapshot;
use crate::mapping::dump;
use crate::sensor::backend::DepthSensor;
use crate::sensor::types::{FrameGeometry, SensorInfo};

use super::encode;
use super::session::{InvalidateCallback, ViewSession};

/// Event emitted when a channel's display frame changes. The frontend
/// responds by refetching that channel.
pub const FRAME_INVALIDATED_EVENT: &str = "frame-invalidated";

const JPEG_QUALITY: u8 = 85;

/// Managed state holding the process-wide sensor.
pub struct SensorState {
    pub sensor: Arc<dyn DepthSensor>,
}

/// Managed state holding the active viewer session, if any.
pub struct ViewerState {
    pub session: Mutex<Option<ViewSession>>,
}

impl ViewerState {
    pub fn new() -> Self {
        Self {
            session: Mutex::new(None),
        }
    }
}

impl Default for ViewerState {
    fn default() -> Self {
        Self::new()
    }
}

/// Payload of the `frame-invalidated` event.
#[derive(Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidatePayload {
    pub channel: crate::sensor::types::FrameChannel,
}

/// Per-channel geometry returned by `open_sensor`.
#[derive(Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionGeometry {
    pub color: FrameGeometry,
    pub depth: FrameGeometry,
}

/// Open the sensor and start frame delivery. Replaces any existing
/// session.
#[tauri::command]
pub async fn open_sensor(
    app: AppHandle,
    sensor_state: State<'_, SensorState>,
    viewer_state: State<'_, ViewerState>,
) -> Result<SessionGeometry, String> {
    let mut guard = viewer_state.session.lock();
    if let Some(mut existing) = guard.take() {
        existing.stop();
    }

    let on_invalidate: InvalidateCallback = Arc::new(move |channel| {
        if let Err(e) = app.emit(FRAME_INVALIDATED_EVENT, InvalidatePayload { channel }) {
            warn!("failed to emit {FRAME_INVALIDATED_EVENT}: {e}");
        }
    });

    let session = ViewSession::start(Arc::clone(&sensor_state.sensor), on_invalidate)
        .map_err(|e| e.to_string())?;

    let geometry = SessionGeometry {
        color: session.color().lock().geometry(),
        depth: session.depth().lock().geometry(),
    };
    *guard = Some(session);
    Ok(geometry)
}

/// Stop frame delivery and close the sensor. Idempotent.
#[tauri::command]
pub async fn close_sensor(viewer_state: State<'_, ViewerState>) -> Result<(), String> {
    let mut guard = viewer_state.session.lock();
    if let Some(mut session) = guard.take() {
        session.stop();
    }
    Ok(())
}

/// Latest thresholded color frame as base64-encoded JPEG.
#[tauri::command]
pub async fn color_frame(viewer_state: State<'_, ViewerState>) -> Result<String, String> {
    let guard = viewer_state.session.lock();
    let session = guard
        .as_ref()
        .ok_or_else(|| "no active viewer session".to_string())?;

    let (geometry, bitmap) = {
        let surface = session.color().lock();
        if surface.sequence() == 0 {
            return Err("no frame available".to_string());
        }
        (surface.geometry(), surface.bitmap())
    };

    let jpeg = encode::bgra_to_jpeg(&bitmap, geometry.width, geometry.height, JPEG_QUALITY);
    Ok(encode::to_base64(&jpeg))
}

/// Latest rescaled depth frame as base64-encoded PNG.
#[tauri::command]
pub async fn depth_frame(viewer_state: State<'_, ViewerState>) -> Result<String, String> {
    let guard = viewer_state.session.lock();
    let session = guard
        .as_ref()
        .ok_or_else(|| "no active viewer session".to_string())?;

    let (geometry, bitmap) = {
        let surface = session.depth().lock();
        if surface.sequence() == 0 {
            return Err("no frame available".to_string());
        }
        (surface.geometry(), surface.bitmap())
    };

    let png = encode::gray_to_png(&bitmap, geometry.width, geometry.height);
    Ok(encode::to_base64(&png))
}

/// Identification data for the configured sensor.
#[tauri::command]
pub async fn sensor_info(sensor_state: State<'_, SensorState>) -> Result<SensorInfo, String> {
    Ok(sensor_state.sensor.info())
}

/// Diagnostic stats for the active viewer session.
#[tauri::command]
pub async fn get_diagnostics(
    viewer_state: State<'_, ViewerState>,
) -> Result<SessionSnapshot, String> {
    let guard = viewer_state.session.lock();
    let session = guard
        .as_ref()
        .ok_or_else(|| "no active viewer session".to_string())?;
    Ok(session.diagnostics())
}

/// Run the depth-grid sweep and copy its tables to the clipboard.
#[tauri::command]
pub async fn copy_depth_table(
    app: AppHandle,
    sensor_state: State<'_, SensorState>,
) -> Result<(), String> {
    let table = dump::depth_grid_tables(sensor_state.sensor.as_ref(), &dump::DepthGridSpec::default())
        .map_err(|e| e.to_string())?;
    app.clipboard().write_text(table).map_err(|e| e.to_string())
}

/// Run the camera-grid sweep and copy its tables to the clipboard.
#[tauri::command]
pub async fn copy_camera_table(
    app: AppHandle,
    sensor_state: State<'_, SensorState>,
) -> Result<(), String> {
    let table =
        dump::camera_grid_tables(sensor_state.sensor.as_ref(), &dump::CameraGridSpec::default())
            .map_err(|e| e.to_string())?;
    app.clipboard().write_text(table).map_err(|e| e.to_string())
}

/// Shutdown path: dump both mapping sweeps to the clipboard while the
/// sensor is still open, then stop the session. Runs synchronously on
/// the window-close event so the dump lands before the process exits.
pub fn shutdown(app: &AppHandle) {
    let viewer_state: State<'_, ViewerState> = app.state();
    let mut guard = viewer_state.session.lock();
    let Some(mut session) = guard.take() else {
        return;
    };

    match dump::shutdown_dump(session.sensor().as_ref()) {
        Ok(tables) => {
            if let Err(e) = app.clipboard().write_text(tables) {
                warn!("failed to write mapping dump to clipboard: {e}");
            } else {
                info!("mapping dump written to clipboard");
            }
        }
        Err(e) => warn!("mapping dump failed: {e}"),
    }

    session.stop();
}
