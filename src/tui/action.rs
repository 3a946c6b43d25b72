//! Actions returned by screen event handlers.

use std::path::PathBuf;

use crossterm::event::KeyEvent;

use crate::form::FormEvent;

use super::app::Screen;

/// An action that a screen handler returns to the [`App`](super::App).
///
/// The `App` interprets these to update the form, drive the camera and
/// navigate between screens.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// No state change needed.
    None,
    /// Navigate to the given screen.
    Navigate(Screen),
    /// Apply an edit to the form.
    Form(FormEvent),
    /// Validate and send the registration.
    Submit,
    /// Close the open dialog.
    DismissDialog,
    /// Clear the form, photo and camera.
    Reset,
    /// Start the camera stream.
    OpenCamera,
    /// Take the current camera frame as the visitor photo.
    CapturePhoto,
    /// Stop the camera without taking a photo.
    CloseCamera,
    /// Ask for a photo file path.
    PickPhoto,
    /// Use the photo stored at the given path.
    LoadPhoto(PathBuf),
    /// Remove the selected photo.
    ClearPhoto,
    /// Quit the application.
    Quit,
}

/// Common behavior for screens that need no outside context to handle keys.
pub trait ScreenState {
    /// Process a key event and return an [`Action`] for the `App` to apply.
    fn handle_key(&mut self, key: KeyEvent) -> Action;
}
