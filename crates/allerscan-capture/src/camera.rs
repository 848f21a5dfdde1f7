// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Live camera session owned by the scan page.
//
// At most one stream is held at a time. Remounting or switching cameras
// stops the old stream before opening the new one, and dropping the session
// stops whatever is still running.

use tracing::{debug, info, instrument, warn};

use allerscan_bridge::traits::{CameraStream, NativeCamera, VideoFrame};
use allerscan_core::error::{AllerscanError, Result};
use allerscan_core::types::FacingMode;

/// Shown when the camera cannot be opened.
pub const CAMERA_ALERT: &str =
    "Unable to access camera. Please ensure camera permissions are granted.";

/// Camera state for one visit to the scan page.
#[derive(Default)]
pub struct CameraSession {
    stream: Option<Box<dyn CameraStream>>,
    facing: FacingMode,
    ready: bool,
    capturing: bool,
    alert: Option<String>,
}

impl CameraSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn facing(&self) -> FacingMode {
        self.facing
    }

    /// The preview is showing real frames.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn is_capturing(&self) -> bool {
        self.capturing
    }

    pub fn has_stream(&self) -> bool {
        self.stream.is_some()
    }

    /// The open stream has reported a device failure not yet acted on.
    pub fn stream_failed(&self) -> bool {
        self.stream.as_ref().is_some_and(|s| s.failure().is_some())
    }

    /// Blocking alert to show, if the last open failed.
    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    /// Open a stream on the current facing mode. Any previous stream is
    /// stopped first. Failure leaves the session without a stream and sets
    /// the alert.
    #[instrument(skip_all, fields(facing = ?self.facing))]
    pub fn mount<C: NativeCamera + ?Sized>(&mut self, camera: &C) {
        self.release();
        match camera.open_stream(self.facing) {
            Ok(stream) => {
                info!("camera stream opened");
                self.stream = Some(stream);
                self.alert = None;
                self.refresh_readiness();
            }
            Err(e) => {
                warn!(error = %e, "camera unavailable");
                self.alert = Some(CAMERA_ALERT.to_owned());
            }
        }
    }

    /// Switch between front and rear cameras and reopen.
    pub fn toggle_facing<C: NativeCamera + ?Sized>(&mut self, camera: &C) {
        self.facing = self.facing.toggled();
        self.mount(camera);
    }

    /// Stop the stream when leaving the page.
    pub fn unmount(&mut self) {
        self.release();
    }

    /// Mark the preview ready once a frame with real dimensions has arrived.
    ///
    /// A stream that reports a device failure (permission refused after the
    /// prompt, device unplugged) is released and the alert raised.
    pub fn refresh_readiness(&mut self) -> bool {
        if let Some(reason) = self.stream.as_ref().and_then(|s| s.failure()) {
            warn!(%reason, "camera stream failed");
            self.release();
            self.alert = Some(CAMERA_ALERT.to_owned());
            return false;
        }
        if !self.ready
            && let Some(frame) = self.stream.as_ref().and_then(|s| s.current_frame())
            && frame.width > 0
            && frame.height > 0
        {
            debug!(width = frame.width, height = frame.height, "camera ready");
            self.ready = true;
        }
        self.ready
    }

    pub fn can_capture(&self) -> bool {
        self.ready && !self.capturing && self.stream.is_some()
    }

    /// Grab the current full-resolution frame and enter the capturing state.
    pub fn begin_capture(&mut self) -> Result<VideoFrame> {
        if !self.can_capture() {
            return Err(AllerscanError::CameraNotReady);
        }
        let frame = self
            .stream
            .as_ref()
            .and_then(|s| s.current_frame())
            .ok_or(AllerscanError::CameraNotReady)?;
        self.capturing = true;
        Ok(frame)
    }

    pub fn finish_capture(&mut self) {
        self.capturing = false;
    }

    fn release(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
            debug!(facing = ?stream.facing(), "camera stream released");
        }
        self.ready = false;
        self.capturing = false;
    }
}

impl Drop for CameraSession {
    fn drop(&mut self) {
        self.release();
    }
}


#[cfg(test)]
mod tests {
    use super::fake::FakeCamera;
    use super::*;
    use crate::gallery::fake::FakePicker;
    use crate::gallery::pick_image;
    use crate::{BarcodeEntry, VoiceEntry};
    use allerscan_core::types::ScanRequest;

    #[test]
    fn mount_opens_rear_camera_and_becomes_ready() {
        let camera = FakeCamera::warm();
        let mut session = CameraSession::new();
        session.mount(&camera);
        assert_eq!(session.facing(), FacingMode::Environment);
        assert!(session.is_ready());
        assert!(session.can_capture());
    }

    #[test]
    fn zero_sized_frames_are_not_ready() {
        let camera = FakeCamera::default();
        let mut session = CameraSession::new();
        session.mount(&camera);
        assert!(session.has_stream());
        assert!(!session.refresh_readiness());
        assert!(matches!(session.begin_capture(), Err(AllerscanError::CameraNotReady)));
    }

    #[test]
    fn toggling_never_holds_two_streams() {
        let camera = FakeCamera::warm();
        let mut session = CameraSession::new();
        session.mount(&camera);
        session.toggle_facing(&camera);
        assert_eq!(session.facing(), FacingMode::User);
        assert_eq!(camera.live(), 1);
        session.toggle_facing(&camera);
        assert_eq!(camera.live(), 1);
        session.unmount();
        assert_eq!(camera.live(), 0);
    }

    #[test]
    fn drop_releases_stream() {
        let camera = FakeCamera::warm();
        {
            let mut session = CameraSession::new();
            session.mount(&camera);
            assert_eq!(camera.live(), 1);
        }
        assert_eq!(camera.live(), 0);
    }

    #[test]
    fn denied_camera_sets_alert() {
        let camera = FakeCamera {
            deny: true,
            ..FakeCamera::default()
        };
        let mut session = CameraSession::new();
        session.mount(&camera);
        assert_eq!(session.alert(), Some(CAMERA_ALERT));
        assert!(!session.is_ready());
        assert!(!session.can_capture());
    }

    #[test]
    fn capture_is_exclusive_until_finished() {
        let camera = FakeCamera::warm();
        let mut session = CameraSession::new();
        session.mount(&camera);
        let frame = session.begin_capture().expect("frame");
        assert_eq!((frame.width, frame.height), (4, 2));
        assert!(session.is_capturing());
        assert!(session.begin_capture().is_err());
        session.finish_capture();
        assert!(session.can_capture());
    }

    #[test]
    fn stream_failure_after_open_releases_and_alerts() {
        let camera = FakeCamera {
            warm: true,
            fail_after_open: Some("NotAllowedError"),
            ..FakeCamera::default()
        };
        let mut session = CameraSession::new();
        session.mount(&camera);
        assert!(!session.stream_failed());
        assert!(!session.has_stream());
        assert_eq!(camera.live(), 0);
        assert_eq!(session.alert(), Some(CAMERA_ALERT));
        assert!(!session.can_capture());
    }

    #[test]
    fn denied_camera_leaves_other_inputs_working() {
        let camera = FakeCamera {
            deny: true,
            ..FakeCamera::default()
        };
        let mut session = CameraSession::new();
        session.mount(&camera);
        assert!(session.alert().is_some());

        let picker = FakePicker {
            choice: Some("/photos/soup.jpg"),
            bytes: vec![0xFF, 0xD8, 0xFF],
        };
        let picked = pick_image(&picker).expect("gallery pick");
        assert!(matches!(picked, Some(ScanRequest::Upload(_))));

        let mut barcode = BarcodeEntry::default();
        barcode.set_input("4006381333931");
        assert_eq!(
            barcode.submit().expect("barcode"),
            ScanRequest::Barcode("4006381333931".into())
        );

        let mut voice = VoiceEntry::default();
        voice.set_text("peanut noodles");
        assert!(matches!(voice.submit().expect("voice"), ScanRequest::Voice(_)));
    }
}
