// src/video.rs - Camera capture with a front/rear facing selector
use image::{DynamicImage, ImageBuffer};
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    ApiBackend, CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType,
    Resolution,
};
use nokhwa::Camera;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CameraFacing {
    Front,
    Rear,
}

impl CameraFacing {
    pub fn label(&self) -> &'static str {
        match self {
            CameraFacing::Front => "Front camera",
            CameraFacing::Rear => "Rear camera",
        }
    }

    // Device 0 is the default (front/user-facing) camera on the machines
    // this runs on; a rear camera, when present, enumerates after it.
    fn device_index(&self) -> u32 {
        match self {
            CameraFacing::Front => 0,
            CameraFacing::Rear => 1,
        }
    }
}

impl Default for CameraFacing {
    fn default() -> Self {
        CameraFacing::Front
    }
}

#[derive(Debug, Error)]
pub enum VideoError {
    #[error("no {0} device is available")]
    NoDevice(&'static str),
    #[error("failed to open camera: {0}")]
    Open(nokhwa::NokhwaError),
    #[error("failed to open camera stream: {0}")]
    Stream(nokhwa::NokhwaError),
    #[error("failed to capture frame: {0}")]
    Capture(nokhwa::NokhwaError),
    #[error("failed to decode frame: {0}")]
    Decode(nokhwa::NokhwaError),
    #[error("captured frame had inconsistent dimensions")]
    BadFrame,
}

pub struct VideoSource {
    camera: Camera,
    facing: CameraFacing,
}

impl VideoSource {
    pub fn open(facing: CameraFacing) -> Result<Self, VideoError> {
        if facing == CameraFacing::Rear {
            // Rear selection is best-effort: refuse up front when the device
            // list can't possibly contain a second camera.
            let devices = nokhwa::query(ApiBackend::Auto).map_err(VideoError::Open)?;
            if devices.len() < 2 {
                return Err(VideoError::NoDevice("rear"));
            }
        }

        let format = CameraFormat::new(Resolution::new(640, 480), FrameFormat::MJPEG, 30);
        let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Exact(format));

        debug!(?facing, "opening camera");
        let camera = Camera::new(CameraIndex::Index(facing.device_index()), requested)
            .map_err(VideoError::Open)?;

        info!(?facing, "camera opened");
        Ok(Self { camera, facing })
    }

    pub fn facing(&self) -> CameraFacing {
        self.facing
    }

    pub fn read_frame(&mut self) -> Result<DynamicImage, VideoError> {
        if !self.camera.is_stream_open() {
            self.camera.open_stream().map_err(VideoError::Stream)?;
        }

        let frame = self.camera.frame().map_err(VideoError::Capture)?;
        let decoded = frame
            .decode_image::<RgbFormat>()
            .map_err(VideoError::Decode)?;

        let width = decoded.width();
        let height = decoded.height();
        let rgb_data = decoded.into_vec();

        let mut rgba_data = Vec::with_capacity((width * height * 4) as usize);
        for chunk in rgb_data.chunks(3) {
            rgba_data.push(chunk[0]);
            rgba_data.push(chunk[1]);
            rgba_data.push(chunk[2]);
            rgba_data.push(255);
        }

        let img: ImageBuffer<image::Rgba<u8>, Vec<u8>> =
            ImageBuffer::from_raw(width, height, rgba_data).ok_or(VideoError::BadFrame)?;

        // Mirror the front camera so the preview behaves like a mirror.
        if self.facing == CameraFacing::Front {
            Ok(DynamicImage::ImageRgba8(image::imageops::flip_horizontal(
                &img,
            )))
        } else {
            Ok(DynamicImage::ImageRgba8(img))
        }
    }
}

impl Drop for VideoSource {
    fn drop(&mut self) {
        let _ = self.camera.stop_stream();
    }
}
