//! Raw KCBv2 FFI declarations.
//!
//! Only compiled when the `kinect` feature is enabled AND the KCBv2
//! DLL is available for linking. All access goes through the safe
//! `Kcb` wrapper — never call these directly.

#![allow(non_snake_case)]

use crate::sensor::types::{CameraSpacePoint, ColorSpacePoint, DepthSpacePoint};

use super::types::{HResult, KcbFrameDescription};

#[link(name = "KCBv2")]
extern "C" {
    /// Open the default Kinect sensor. Returns `KCB_INVALID_HANDLE`
    /// when no sensor is present.
    pub fn KCBOpenDefaultSensor() -> i32;

    /// Close a sensor and invalidate its handle.
    pub fn KCBCloseSensor(kcbHandle: *mut i32) -> HResult;

    /// Get the color frame descriptor for the requested image format.
    pub fn KCBGetColorFrameDescription(
        kcbHandle: i32,
        eFormat: i32,
        pDescription: *mut KcbFrameDescription,
    ) -> HResult;

    /// Get the depth frame descriptor.
    pub fn KCBGetDepthFrameDescription(
        kcbHandle: i32,
        pDescription: *mut KcbFrameDescription,
    ) -> HResult;

    /// Copy the latest color frame into the caller's buffer.
    /// Returns `E_PENDING` when no new frame is available.
    pub fn KCBGetColorFrame(
        kcbHandle: i32,
        cbBufferSize: u32,
        pbBuffer: *mut u8,
        liTimeStamp: *mut i64,
    ) -> HResult;

    /// Copy the latest depth frame into the caller's buffer.
    pub fn KCBGetDepthFrame(
        kcbHandle: i32,
        cuiBufferSize: u32,
        puiBuffer: *mut u16,
        liTimeStamp: *mut i64,
    ) -> HResult;

    /// Map a depth-space point at a given depth to color space.
    pub fn KCBMapDepthPointToColorSpace(
        kcbHandle: i32,
        depthPoint: DepthSpacePoint,
        depth: u16,
        pColorPoint: *mut ColorSpacePoint,
    ) -> HResult;

    /// Map a camera-space point to color space.
    pub fn KCBMapCameraPointToColorSpace(
        kcbHandle: i32,
        cameraPoint: CameraSpacePoint,
        pColorPoint: *mut ColorSpacePoint,
    ) -> HResult;
}
