use std::io;

/// Errors that can occur while acquiring a photo.
///
/// The `Display` text of each variant is shown to the visitor as-is.
#[derive(Debug, thiserror::Error)]
pub enum CameraError {
    /// No streaming backend is available; the file picker should be used.
    #[error("Unable to access camera on this terminal. Enter a photo file path instead.")]
    Unsupported,

    #[error("Camera permission was denied. Please allow access and try again.")]
    PermissionDenied,

    #[error("No camera device was found on this device.")]
    NotFound,

    #[error("Camera is currently in use by another app. Close it and try again.")]
    Busy,

    /// The session is remote, so the camera would not be the visitor's.
    #[error("Camera access requires a local session; it is not available over SSH.")]
    InsecureContext,

    /// Any other capture failure. `detail` is logged, not displayed.
    #[error("Unable to start camera. Please try again.")]
    Failed { detail: String },

    /// A picked photo file could not be read.
    #[error("Unable to read photo file: {0}")]
    PhotoFile(#[from] io::Error),

    /// A picked file does not look like an image.
    #[error("Not an image file: {0}")]
    NotAnImage(String),
}

impl CameraError {
    /// Maps a failure to launch the capture program.
    pub(crate) fn from_spawn(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::Unsupported,
            io::ErrorKind::PermissionDenied => Self::PermissionDenied,
            _ => Self::Failed {
                detail: err.to_string(),
            },
        }
    }

    /// Maps an I/O error raised while reading from the device.
    pub(crate) fn from_device_io(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => Self::PermissionDenied,
            io::ErrorKind::NotFound => Self::NotFound,
            io::ErrorKind::ResourceBusy => Self::Busy,
            _ => Self::Failed {
                detail: err.to_string(),
            },
        }
    }

    /// Classifies the diagnostic output of a capture program that stopped
    /// before producing a frame.
    pub(crate) fn from_stderr(stderr: &str) -> Self {
        let lower = stderr.to_lowercase();
        if lower.contains("permission denied") || lower.contains("not permitted") {
            Self::PermissionDenied
        } else if lower.contains("busy") {
            Self::Busy
        } else if lower.contains("no such device")
            || lower.contains("no such file or directory")
            || lower.contains("not found")
        {
            Self::NotFound
        } else {
            Self::Failed {
                detail: stderr.trim().lines().last().unwrap_or_default().to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_not_found_falls_back_to_picker() {
        let err = io::Error::new(io::ErrorKind::NotFound, "no ffmpeg");
        assert!(matches!(CameraError::from_spawn(&err), CameraError::Unsupported));
    }

    #[test]
    fn spawn_permission_denied() {
        let err = io::Error::new(io::ErrorKind::PermissionDenied, "nope");
        assert!(matches!(
            CameraError::from_spawn(&err),
            CameraError::PermissionDenied
        ));
    }

    #[test]
    fn device_io_busy() {
        let err = io::Error::new(io::ErrorKind::ResourceBusy, "busy");
        assert!(matches!(CameraError::from_device_io(&err), CameraError::Busy));
    }

    #[test]
    fn stderr_classification() {
        assert!(matches!(
            CameraError::from_stderr("/dev/video0: Permission denied"),
            CameraError::PermissionDenied
        ));
        assert!(matches!(
            CameraError::from_stderr("ioctl(VIDIOC_STREAMON): Device or resource busy"),
            CameraError::Busy
        ));
        assert!(matches!(
            CameraError::from_stderr("/dev/video0: No such file or directory"),
            CameraError::NotFound
        ));
    }

    #[test]
    fn stderr_other_keeps_last_line() {
        match CameraError::from_stderr("starting\nsomething odd happened\n") {
            CameraError::Failed { detail } => assert_eq!(detail, "something odd happened"),
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[test]
    fn messages_are_distinct() {
        let messages: Vec<String> = [
            CameraError::PermissionDenied,
            CameraError::NotFound,
            CameraError::Busy,
            CameraError::InsecureContext,
            CameraError::Failed {
                detail: String::new(),
            },
        ]
        .iter()
        .map(ToString::to_string)
        .collect();
        for (i, a) in messages.iter().enumerate() {
            for b in &messages[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
