pub mod diagnostics;
pub mod mapping;
pub mod sensor;
pub mod viewer;

use std::sync::Arc;

use tauri::Manager;

use sensor::backend::DepthSensor;
use sensor::simulated::SimulatedSensor;
use viewer::commands::{
    close_sensor, color_frame, copy_camera_table, copy_depth_table, depth_frame, get_diagnostics,
    open_sensor, sensor_info, SensorState, ViewerState,
};

/// Create the depth sensor for this process.
///
/// When `SIMULATED_KINECT=1` is set, synthetic frames are used instead
/// of real hardware. Without the `kinect` feature the simulated sensor
/// is the only option.
fn create_sensor() -> Arc<dyn DepthSensor> {
    if SimulatedSensor::is_enabled() {
        tracing::info!("using simulated sensor (SIMULATED_KINECT set)");
        return Arc::new(SimulatedSensor::new());
    }

    #[cfg(feature = "kinect")]
    {
        Arc::new(sensor::kinect::backend::KinectSensor::new(Arc::new(
            sensor::kinect::sdk::Kcb::new(),
        )))
    }

    #[cfg(not(feature = "kinect"))]
    {
        tracing::warn!("built without the kinect feature, falling back to simulated sensor");
        Arc::new(SimulatedSensor::new())
    }
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tauri::Builder::default()
        .plugin(tauri_plugin_clipboard_manager::init())
        .plugin(tauri_plugin_single_instance::init(|_app, _args, _cwd| {}))
        .manage(SensorState {
            sensor: create_sensor(),
        })
        .manage(ViewerState::new())
        .invoke_handler(tauri::generate_handler![
            open_sensor,
            close_sensor,
            color_frame,
            depth_frame,
            sensor_info,
            get_diagnostics,
            copy_depth_table,
            copy_camera_table,
        ])
        .setup(|app| {
            if cfg!(debug_assertions) {
                app.handle().plugin(
                    tauri_plugin_log::Builder::new()
                        .targets([
                            tauri_plugin_log::Target::new(tauri_plugin_log::TargetKind::Stdout),
                            tauri_plugin_log::Target::new(tauri_plugin_log::TargetKind::Webview),
                            tauri_plugin_log::Target::new(tauri_plugin_log::TargetKind::LogDir {
                                file_name: None,
                            }),
                        ])
                        .level(log::LevelFilter::Debug)
                        .build(),
                )?;
            }
            Ok(())
        })
        .on_window_event(|window, event| {
            // Dump the mapping tables to the clipboard before the main
            // window goes away; the window then closes normally.
            if window.label() == "main" {
                if let tauri::WindowEvent::CloseRequested { .. } = event {
                    viewer::commands::shutdown(window.app_handle());
                }
            }
        })
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
