//! TUI screen implementations.

pub mod camera;
pub mod help;
pub mod photo_path;
pub mod registration;

pub use camera::{CameraState, draw_camera};
pub use help::{HelpState, draw_help};
pub use photo_path::{PhotoPathState, draw_photo_path};
pub use registration::{RegistrationState, draw_registration};
