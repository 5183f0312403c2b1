//! Device geometry: scales peer coordinates to physical screen pixels.
//!
//! The peer computes touch positions against the video frame it receives,
//! which is usually downscaled from the physical display.  A point is only
//! meaningful if the peer's reporting resolution matches the frame size the
//! agent is currently streaming; after a rotation or resize the two briefly
//! disagree and such events are dropped.

use mirror_core::protocol::{Point, Size};

use crate::application::dispatch_events::CoordinateMapper;

/// Maps points in video-frame space to device-physical space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameGeometry {
    video_size: Size,
    device_size: Size,
}

impl FrameGeometry {
    pub fn new(video_size: Size, device_size: Size) -> Self {
        Self {
            video_size,
            device_size,
        }
    }

    pub fn video_size(&self) -> Size {
        self.video_size
    }

    pub fn device_size(&self) -> Size {
        self.device_size
    }
}

impl CoordinateMapper for FrameGeometry {
    fn map(&self, point: Point, screen_size: Size) -> Option<Point> {
        if screen_size != self.video_size || screen_size.width == 0 || screen_size.height == 0 {
            return None;
        }
        if point.x >= screen_size.width || point.y >= screen_size.height {
            return None;
        }
        let x = u32::from(point.x) * u32::from(self.device_size.width) / u32::from(screen_size.width);
        let y = u32::from(point.y) * u32::from(self.device_size.height) / u32::from(screen_size.height);
        // x < device width, so the conversion back cannot fail.
        Some(Point::new(u16::try_from(x).ok()?, u16::try_from(y).ok()?))
    }
}
