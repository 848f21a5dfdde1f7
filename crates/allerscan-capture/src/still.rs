// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Camera stills: full-resolution frame to JPEG upload.

use std::time::Duration;

use image::RgbImage;
use image::codecs::jpeg::JpegEncoder;
use tracing::{debug, instrument};

use allerscan_bridge::traits::VideoFrame;
use allerscan_core::config::AppConfig;
use allerscan_core::error::{AllerscanError, Result};
use allerscan_core::types::{ImageKind, ImageUpload, ScanRequest};

/// File name given to every camera still.
pub const CAPTURE_FILE_NAME: &str = "camera-capture.jpg";

/// Encode a frame as JPEG at its native resolution.
#[instrument(skip(frame), fields(width = frame.width, height = frame.height))]
pub fn encode_jpeg(frame: &VideoFrame, quality: u8) -> Result<Vec<u8>> {
    if frame.width == 0 || frame.height == 0 {
        return Err(AllerscanError::CameraNotReady);
    }
    let image = RgbImage::from_raw(frame.width, frame.height, frame.rgb.clone()).ok_or_else(|| {
        AllerscanError::ImageError(format!(
            "frame buffer holds {} bytes, expected {}",
            frame.rgb.len(),
            frame.width as usize * frame.height as usize * 3
        ))
    })?;

    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100))
        .encode_image(&image)
        .map_err(|e| AllerscanError::ImageError(format!("JPEG encode failed: {e}")))?;
    debug!(bytes = out.len(), "still encoded");
    Ok(out)
}

/// Decode a compressed preview frame (JPEG, PNG) into packed RGB.
pub fn decode_frame(bytes: &[u8]) -> Result<VideoFrame> {
    let image = image::load_from_memory(bytes)
        .map_err(|e| AllerscanError::ImageError(format!("frame decode failed: {e}")))?
        .into_rgb8();
    let (width, height) = image.dimensions();
    Ok(VideoFrame {
        width,
        height,
        rgb: image.into_raw(),
    })
}

/// Wrap an encoded still as an upload request.
pub fn still_request(frame: &VideoFrame, quality: u8) -> Result<ScanRequest> {
    Ok(ScanRequest::Upload(ImageUpload {
        file_name: CAPTURE_FILE_NAME.to_owned(),
        kind: ImageKind::Jpeg,
        bytes: encode_jpeg(frame, quality)?,
    }))
}

/// Encode, then hold for the configured capture delay before emitting.
pub async fn emit_still(frame: VideoFrame, config: &AppConfig) -> Result<ScanRequest> {
    let request = still_request(&frame, config.jpeg_quality)?;
    tokio::time::sleep(Duration::from_millis(config.capture_delay_ms)).await;
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(width: u32, height: u32) -> VideoFrame {
        VideoFrame {
            width,
            height,
            rgb: vec![128; (width * height * 3) as usize],
        }
    }

    #[test]
    fn encodes_at_native_resolution() {
        let bytes = encode_jpeg(&frame(64, 48), 90).expect("encode");
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        let decoded = image::load_from_memory(&bytes).expect("decode");
        assert_eq!((decoded.width(), decoded.height()), (64, 48));
    }

    #[test]
    fn short_buffer_is_image_error() {
        let bad = VideoFrame {
            width: 10,
            height: 10,
            rgb: vec![0; 5],
        };
        assert!(matches!(encode_jpeg(&bad, 90), Err(AllerscanError::ImageError(_))));
    }

    #[test]
    fn decoded_frame_keeps_dimensions() {
        let jpeg = encode_jpeg(&frame(32, 24), 95).expect("encode");
        let decoded = decode_frame(&jpeg).expect("decode");
        assert_eq!((decoded.width, decoded.height), (32, 24));
        assert_eq!(decoded.rgb.len(), 32 * 24 * 3);
    }

    #[test]
    fn garbage_frame_is_image_error() {
        assert!(matches!(decode_frame(b"not an image"), Err(AllerscanError::ImageError(_))));
    }

    #[tokio::test]
    async fn still_is_tagged_as_jpeg_upload() {
        let config = AppConfig {
            capture_delay_ms: 0,
            ..AppConfig::default()
        };
        let request = emit_still(frame(8, 8), &config).await.expect("still");
        match request {
            ScanRequest::Upload(upload) => {
                assert_eq!(upload.file_name, CAPTURE_FILE_NAME);
                assert_eq!(upload.kind, ImageKind::Jpeg);
                assert!(!upload.bytes.is_empty());
            }
            other => panic!("unexpected request: {other:?}"),
        }
    }
}
