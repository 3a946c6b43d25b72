//! Photo acquisition: live camera streams, picked files and previews.

mod device;
mod error;
mod mjpeg;
mod photo;

pub use device::{
    CAPTURE_QUALITY, Camera, CameraStream, CommandCamera, Facing, NoCamera, StreamRequest,
};
pub use error::CameraError;
pub use mjpeg::JpegFrameDecoder;
pub use photo::{PhotoPreview, load_photo_file};
