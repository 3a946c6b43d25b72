use std::mem;
use std::path::Path;
use std::time::Duration;

use chrono::{Local, NaiveDateTime, Utc};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::layout::{Constraint, Layout};
use ratatui::{Frame, Terminal};
use tokio::runtime::{Builder, Runtime};
use tracing::{debug, info, warn};

use crate::camera::{
    Camera, CameraError, CameraStream, PhotoPreview, StreamRequest, load_photo_file,
};
use crate::form::{FailureKind, FormEvent, FormState, SubmitStatus, reduce};
use crate::model::Photo;
use crate::submission::{IntakeClient, SubmitError};

use super::action::{Action, ScreenState};
use super::error::AppError;
use super::screens::{
    CameraState, HelpState, PhotoPathState, RegistrationState, draw_camera, draw_help,
    draw_photo_path, draw_registration,
};
use super::widgets::{StatusBarContext, draw_dialog, draw_status_bar};

/// How long the loop waits for a key before refreshing the camera stream.
const FRAME_INTERVAL: Duration = Duration::from_millis(100);

/// All screens the app can navigate between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    /// The visitor form.
    Registration,
    /// Live camera stream.
    Camera,
    /// Photo file prompt.
    PhotoPath,
    /// Show keybinding help.
    Help,
}

impl Screen {
    fn hint(self) -> &'static str {
        match self {
            Self::Registration => "Tab: next  Enter: submit  Ctrl+N: add vehicle  F1: help",
            Self::Camera => "Enter: capture  Esc: close",
            Self::PhotoPath => "Enter: use photo  Esc: cancel",
            Self::Help => "q/Esc: back",
        }
    }
}

/// Local wall-clock time, as typed into date-time fields.
fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Classifies a failed submission for the dialog shown to the visitor.
fn failure_kind(err: &SubmitError) -> FailureKind {
    if err.is_rejection() {
        FailureKind::Rejected
    } else {
        FailureKind::Unexpected
    }
}

/// Top-level application state.
pub struct App {
    screen: Screen,
    form: FormState,
    registration: RegistrationState,
    camera_screen: CameraState,
    photo_path: PhotoPathState,
    help: HelpState,
    client: IntakeClient,
    runtime: Runtime,
    camera: Box<dyn Camera>,
    stream: Option<CameraStream>,
    camera_error: Option<String>,
    preview: Option<PhotoPreview>,
    should_quit: bool,
}

impl App {
    /// Creates a new `App` on the [`Screen::Registration`] screen.
    pub fn new(client: IntakeClient, camera: Box<dyn Camera>) -> Result<Self, AppError> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        Ok(Self {
            screen: Screen::Registration,
            form: FormState::new(now()),
            registration: RegistrationState::new(),
            camera_screen: CameraState,
            photo_path: PhotoPathState::new(),
            help: HelpState::new(),
            client,
            runtime,
            camera,
            stream: None,
            camera_error: None,
            preview: None,
            should_quit: false,
        })
    }

    /// Main event loop: draw → send pending submission or read event → dispatch.
    ///
    /// A pending submission is sent right after the frame showing it is drawn.
    /// While the camera is open, the loop wakes up regularly to pick up frames.
    #[cfg_attr(coverage_nightly, coverage(off))]
    #[mutants::skip]
    pub fn run<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> Result<(), AppError> {
        while !self.should_quit {
            terminal.draw(|frame| self.draw(frame))?;

            if self.form.is_submitting() {
                self.send_pending();
                continue;
            }
            if self.stream.is_some() && !event::poll(FRAME_INTERVAL)? {
                self.poll_camera();
                continue;
            }
            if let Event::Key(key) = event::read()? {
                self.handle_key(key);
            }
            self.poll_camera();
        }
        Ok(())
    }

    #[cfg_attr(coverage_nightly, coverage(off))]
    #[mutants::skip]
    fn draw(&self, frame: &mut Frame) {
        let [main_area, status_area] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(frame.area());

        match self.screen {
            Screen::Registration => draw_registration(
                &self.registration,
                &self.form,
                self.camera_error.as_deref(),
                self.preview.as_ref(),
                frame,
                main_area,
            ),
            Screen::Camera => draw_camera(self.stream.as_ref(), frame, main_area),
            Screen::PhotoPath => draw_photo_path(&self.photo_path, frame, main_area),
            Screen::Help => draw_help(&self.help, frame, main_area),
        }

        let ctx = StatusBarContext {
            environment: self.client.environment(),
            submitting: self.form.is_submitting(),
            hint: self.screen.hint(),
        };
        draw_status_bar(&ctx, frame, status_area);

        if let Some(dialog) = self.form.dialog() {
            draw_dialog(dialog, frame, main_area);
        }
    }

    /// Handles a key event: global keys first, then screen-specific.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        if key.code == KeyCode::F(1) && self.screen != Screen::Help {
            self.help.open_from(self.screen);
            self.screen = Screen::Help;
            return;
        }

        let action = match self.screen {
            Screen::Registration => self.registration.handle_key(key, &self.form),
            Screen::Camera => self.camera_screen.handle_key(key),
            Screen::PhotoPath => self.photo_path.handle_key(key),
            Screen::Help => self.help.handle_key(key),
        };
        self.apply(action);
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::None => {}
            Action::Navigate(screen) => self.screen = screen,
            Action::Form(event) => self.update(event),
            Action::Submit => self.update(FormEvent::SubmitRequested { now: now() }),
            Action::DismissDialog => {
                let succeeded = *self.form.status() == SubmitStatus::Succeeded;
                self.update(FormEvent::DialogDismissed { now: now() });
                if succeeded {
                    self.registration.reset();
                }
            }
            Action::Reset => self.reset(),
            Action::OpenCamera => self.open_camera(),
            Action::CapturePhoto => self.capture_photo(),
            Action::CloseCamera => {
                self.stream = None;
                self.screen = Screen::Registration;
            }
            Action::PickPhoto => {
                self.photo_path.reset();
                self.screen = Screen::PhotoPath;
            }
            Action::LoadPhoto(path) => self.load_photo(&path),
            Action::ClearPhoto => self.update(FormEvent::PhotoCleared),
            Action::Quit => self.should_quit = true,
        }
    }

    /// Applies a form event and drops the preview once the photo is gone.
    fn update(&mut self, event: FormEvent) {
        let current = mem::replace(&mut self.form, FormState::new(NaiveDateTime::default()));
        self.form = reduce(current, event);
        if self.form.values().photo.is_none() {
            self.preview = None;
        }
    }

    fn reset(&mut self) {
        if self.form.is_submitting() {
            return;
        }
        self.update(FormEvent::ResetRequested { now: now() });
        self.registration.reset();
        self.stream = None;
        self.camera_error = None;
        self.preview = None;
        self.screen = Screen::Registration;
    }

    fn open_camera(&mut self) {
        self.camera_error = None;
        self.stream = None;
        match self.camera.open(&StreamRequest::default()) {
            Ok(stream) => {
                self.stream = Some(stream);
                self.screen = Screen::Camera;
            }
            Err(CameraError::Unsupported) => {
                info!("camera streaming unavailable, asking for a photo file");
                self.photo_path.reset();
                self.screen = Screen::PhotoPath;
            }
            Err(err) => self.camera_failed(err),
        }
    }

    /// Picks up new frames; a failing stream is closed and its error shown.
    fn poll_camera(&mut self) {
        let Some(stream) = self.stream.as_mut() else {
            return;
        };
        if let Err(err) = stream.poll() {
            self.camera_failed(err);
        }
    }

    fn capture_photo(&mut self) {
        let Some(stream) = self.stream.take() else {
            self.screen = Screen::Registration;
            return;
        };
        match stream.capture(Utc::now().timestamp_millis()) {
            Ok(photo) => {
                self.select_photo(photo);
                self.screen = Screen::Registration;
            }
            Err(err) => self.camera_failed(err),
        }
    }

    fn camera_failed(&mut self, err: CameraError) {
        if let CameraError::Failed { detail } = &err {
            warn!(%detail, "camera failure");
        } else {
            warn!(error = %err, "camera unavailable");
        }
        self.stream = None;
        self.camera_error = Some(err.to_string());
        self.screen = Screen::Registration;
    }

    fn load_photo(&mut self, path: &Path) {
        match load_photo_file(path) {
            Ok(photo) => {
                self.select_photo(photo);
                self.screen = Screen::Registration;
            }
            Err(err) => {
                debug!(path = %path.display(), error = %err, "photo file rejected");
                self.photo_path.set_error(err.to_string());
            }
        }
    }

    fn select_photo(&mut self, photo: Photo) {
        self.camera_error = None;
        self.preview = match PhotoPreview::create(&photo) {
            Ok(preview) => Some(preview),
            Err(err) => {
                warn!(error = %err, "could not write photo preview");
                None
            }
        };
        self.update(FormEvent::PhotoSelected(photo));
    }

    /// Sends the pending registration and records the outcome.
    pub fn send_pending(&mut self) {
        let Some(record) = self.form.pending_submission().cloned() else {
            return;
        };
        let event = match self.runtime.block_on(self.client.submit(&record)) {
            Ok(_) => FormEvent::SubmitSucceeded,
            Err(err) => {
                warn!(error = %err, "registration not submitted");
                FormEvent::SubmitFailed(failure_kind(&err))
            }
        };
        self.update(event);
    }

    /// Returns the current screen.
    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// Returns `true` if the app should quit.
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Returns the form state.
    pub fn form(&self) -> &FormState {
        &self.form
    }

    /// Returns the message of the last camera failure, if any.
    pub fn camera_error(&self) -> Option<&str> {
        self.camera_error.as_deref()
    }

    /// Returns the preview of the selected photo, if any.
    pub fn preview(&self) -> Option<&PhotoPreview> {
        self.preview.as_ref()
    }

    /// Returns `true` while a camera stream is open.
    pub fn camera_open(&self) -> bool {
        self.stream.is_some()
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::thread::{self, JoinHandle};

    use bytes::Bytes;
    use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};

    use super::*;
    use crate::config::{AppConfig, Environment};
    use crate::form::{DialogKind, TextField};
    use crate::model::{FieldKey, Gender};

    /// Camera stand-in returning a canned outcome.
    enum FakeCamera {
        Frames(Vec<Bytes>),
        Fails(fn() -> CameraError),
    }

    impl Camera for FakeCamera {
        fn open(&self, _request: &StreamRequest) -> Result<CameraStream, CameraError> {
            match self {
                FakeCamera::Frames(frames) => {
                    let (tx, rx) = mpsc::channel();
                    for frame in frames {
                        tx.send(Ok(frame.clone())).unwrap();
                    }
                    Ok(CameraStream::from_frames(rx))
                }
                FakeCamera::Fails(err) => Err(err()),
            }
        }
    }

    fn one_frame(jpeg: &'static [u8]) -> FakeCamera {
        FakeCamera::Frames(vec![Bytes::from_static(jpeg)])
    }

    fn refused_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);
        url
    }

    fn make_app_with(camera: FakeCamera, api_url: String) -> App {
        let config = AppConfig {
            api_url,
            api_key: "k".into(),
            ..AppConfig::default()
        };
        let client = IntakeClient::new(&config, Environment::Development).unwrap();
        App::new(client, Box::new(camera)).unwrap()
    }

    fn make_app(camera: FakeCamera) -> App {
        make_app_with(camera, refused_url())
    }

    /// Answers one request with `200 OK` and the given JSON body.
    fn serve_once(body: &'static str) -> (String, JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let handle = thread::spawn(move || {
            let (mut socket, _) = listener.accept().unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0_u8; 4096];
            while !request_complete(&buf) {
                let n = socket.read(&mut chunk).unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
            }
            let response = format!(
                "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).unwrap();
        });
        (url, handle)
    }

    /// A multipart request ends with the closing boundary, or the last chunk.
    fn request_complete(buf: &[u8]) -> bool {
        buf.ends_with(b"--\r\n") || buf.ends_with(b"\r\n0\r\n\r\n")
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn ctrl_press(ch: char) -> KeyEvent {
        KeyEvent {
            code: KeyCode::Char(ch),
            modifiers: KeyModifiers::CONTROL,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn release(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        }
    }

    fn fill_valid(app: &mut App) {
        let tomorrow = (now() + chrono::Duration::days(1))
            .format("%Y%m%d%H%M")
            .to_string();
        for event in [
            FormEvent::TextChanged(TextField::FullName, "john doe".into()),
            FormEvent::TextChanged(TextField::Phone, "919876543210".into()),
            FormEvent::GenderSelected(Gender::Male),
            FormEvent::TextChanged(TextField::Departure, tomorrow),
        ] {
            app.apply(Action::Form(event));
        }
    }

    fn photo_file(dir: &tempfile::TempDir) -> std::path::PathBuf {
        let path = dir.path().join("visitor.jpg");
        std::fs::write(&path, b"\xFF\xD8jpeg\xFF\xD9").unwrap();
        path
    }

    mod navigation {
        use super::*;

        #[test]
        fn new_starts_on_registration() {
            let app = make_app(FakeCamera::Frames(vec![]));
            assert_eq!(app.screen(), Screen::Registration);
            assert!(!app.should_quit());
            assert!(!app.camera_open());
        }

        #[test]
        fn ctrl_c_quits() {
            let mut app = make_app(FakeCamera::Frames(vec![]));
            app.handle_key(ctrl_press('c'));
            assert!(app.should_quit());
        }

        #[test]
        fn release_events_are_ignored() {
            let mut app = make_app(FakeCamera::Frames(vec![]));
            app.handle_key(release(KeyCode::Char('j')));
            assert_eq!(app.form().values().full_name, "");
        }

        #[test]
        fn f1_opens_help_and_esc_returns() {
            let mut app = make_app(FakeCamera::Frames(vec![]));
            app.handle_key(press(KeyCode::F(1)));
            assert_eq!(app.screen(), Screen::Help);
            app.handle_key(press(KeyCode::Esc));
            assert_eq!(app.screen(), Screen::Registration);
        }

        #[test]
        fn successive_events_build_on_each_other() {
            let mut app = make_app(FakeCamera::Frames(vec![]));
            fill_valid(&mut app);
            app.apply(Action::Form(FormEvent::VehicleAdded));
            app.apply(Action::Form(FormEvent::VehicleNumberChanged(0, "ka01".into())));
            let values = app.form().values();
            assert_eq!(values.full_name, "John Doe");
            assert_eq!(values.phone, "919876543210");
            assert_eq!(values.vehicles[0].number, "KA 01");
        }

        #[test]
        fn typing_edits_the_form() {
            let mut app = make_app(FakeCamera::Frames(vec![]));
            for ch in "jane".chars() {
                app.handle_key(press(KeyCode::Char(ch)));
            }
            assert_eq!(app.form().values().full_name, "Jane");
        }
    }

    mod camera {
        use super::*;

        #[test]
        fn capture_sets_photo_and_preview() {
            let mut app = make_app(one_frame(b"\xFF\xD8one\xFF\xD9"));
            app.apply(Action::OpenCamera);
            assert_eq!(app.screen(), Screen::Camera);
            assert!(app.camera_open());

            app.handle_key(press(KeyCode::Enter));
            assert_eq!(app.screen(), Screen::Registration);
            assert!(!app.camera_open());
            let photo = app.form().values().photo.as_ref().unwrap();
            assert!(photo.file_name.starts_with("visitor-photo-"));
            assert!(photo.file_name.ends_with(".jpg"));
            assert_eq!(photo.content_type, "image/jpeg");
            assert!(app.preview().unwrap().path().exists());
        }

        #[test]
        fn close_stops_stream_without_photo() {
            let mut app = make_app(one_frame(b"\xFF\xD8x\xFF\xD9"));
            app.apply(Action::OpenCamera);
            app.handle_key(press(KeyCode::Esc));
            assert!(!app.camera_open());
            assert!(app.form().values().photo.is_none());
            assert_eq!(app.screen(), Screen::Registration);
        }

        #[test]
        fn unsupported_falls_back_to_file_prompt() {
            let mut app = make_app(FakeCamera::Fails(|| CameraError::Unsupported));
            app.apply(Action::OpenCamera);
            assert_eq!(app.screen(), Screen::PhotoPath);
            assert_eq!(app.camera_error(), None);
        }

        #[test]
        fn busy_camera_shows_message() {
            let mut app = make_app(FakeCamera::Fails(|| CameraError::Busy));
            app.apply(Action::OpenCamera);
            assert_eq!(app.screen(), Screen::Registration);
            assert_eq!(
                app.camera_error(),
                Some("Camera is currently in use by another app. Close it and try again.")
            );
        }

        #[test]
        fn stream_error_closes_camera() {
            let mut app = make_app(FakeCamera::Frames(vec![]));
            app.stream = Some({
                let (tx, rx) = mpsc::channel();
                tx.send(Err(CameraError::PermissionDenied)).unwrap();
                CameraStream::from_frames(rx)
            });
            app.screen = Screen::Camera;
            app.poll_camera();
            assert!(!app.camera_open());
            assert_eq!(app.screen(), Screen::Registration);
            assert_eq!(
                app.camera_error(),
                Some("Camera permission was denied. Please allow access and try again.")
            );
        }

        #[test]
        fn successful_capture_clears_camera_error() {
            let mut app = make_app(one_frame(b"\xFF\xD8y\xFF\xD9"));
            app.camera_error = Some("old".into());
            app.apply(Action::OpenCamera);
            app.apply(Action::CapturePhoto);
            assert_eq!(app.camera_error(), None);
        }
    }

    mod photo_file {
        use super::*;

        #[test]
        fn typed_path_loads_photo() {
            let dir = tempfile::tempdir().unwrap();
            let path = photo_file(&dir);
            let mut app = make_app(FakeCamera::Fails(|| CameraError::Unsupported));
            app.apply(Action::PickPhoto);
            assert_eq!(app.screen(), Screen::PhotoPath);
            for ch in path.to_string_lossy().chars() {
                app.handle_key(press(KeyCode::Char(ch)));
            }
            app.handle_key(press(KeyCode::Enter));
            assert_eq!(app.screen(), Screen::Registration);
            let photo = app.form().values().photo.as_ref().unwrap();
            assert_eq!(photo.file_name, "visitor.jpg");
            assert!(app.preview().is_some());
        }

        #[test]
        fn bad_path_stays_on_prompt() {
            let mut app = make_app(FakeCamera::Fails(|| CameraError::Unsupported));
            app.apply(Action::PickPhoto);
            app.apply(Action::LoadPhoto("/nonexistent/face.jpg".into()));
            assert_eq!(app.screen(), Screen::PhotoPath);
            assert!(app.form().values().photo.is_none());
        }

        #[test]
        fn clearing_photo_deletes_preview() {
            let dir = tempfile::tempdir().unwrap();
            let mut app = make_app(FakeCamera::Frames(vec![]));
            app.apply(Action::LoadPhoto(photo_file(&dir)));
            let preview_path = app.preview().unwrap().path().to_path_buf();
            app.apply(Action::ClearPhoto);
            assert!(app.preview().is_none());
            assert!(!preview_path.exists());
        }
    }

    mod submission {
        use super::*;

        #[test]
        fn invalid_submit_opens_validation_dialog() {
            let mut app = make_app(FakeCamera::Frames(vec![]));
            app.handle_key(ctrl_press('s'));
            let dialog = app.form().dialog().unwrap();
            assert_eq!(dialog.title, "Validation Error");
            assert!(app.form().visible_error(FieldKey::Phone).is_some());

            app.handle_key(press(KeyCode::Enter));
            assert!(app.form().dialog().is_none());
        }

        #[test]
        fn unreachable_endpoint_keeps_data() {
            let mut app = make_app(FakeCamera::Frames(vec![]));
            fill_valid(&mut app);
            app.apply(Action::Submit);
            assert!(app.form().is_submitting());

            app.send_pending();
            let dialog = app.form().dialog().unwrap();
            assert_eq!(dialog.kind, DialogKind::Error);
            assert_eq!(dialog.title, "Error");
            assert_eq!(
                dialog.message,
                "An unexpected error occurred. Please try again later."
            );
            assert_eq!(app.form().values().full_name, "John Doe");
        }

        #[test]
        fn success_resets_after_dismissal() {
            let dir = tempfile::tempdir().unwrap();
            let (url, server) = serve_once("{\"id\":1}");
            let mut app = make_app_with(FakeCamera::Frames(vec![]), url);
            fill_valid(&mut app);
            app.apply(Action::LoadPhoto(photo_file(&dir)));
            let preview_path = app.preview().unwrap().path().to_path_buf();

            app.apply(Action::Submit);
            app.send_pending();
            server.join().unwrap();
            assert_eq!(app.form().dialog().unwrap().title, "Success!");
            assert_eq!(app.form().values().full_name, "John Doe");

            app.handle_key(press(KeyCode::Enter));
            assert!(app.form().dialog().is_none());
            assert_eq!(app.form().values().full_name, "");
            assert!(app.preview().is_none());
            assert!(!preview_path.exists());
        }

        #[test]
        fn send_without_pending_is_noop() {
            let mut app = make_app(FakeCamera::Frames(vec![]));
            app.send_pending();
            assert_eq!(*app.form().status(), SubmitStatus::Idle);
        }

        #[test]
        fn rejection_maps_to_submission_error() {
            assert_eq!(
                failure_kind(&SubmitError::EmptyResponse),
                FailureKind::Rejected
            );
            assert_eq!(
                failure_kind(&SubmitError::InvalidPhotoType("x".into())),
                FailureKind::Unexpected
            );
        }
    }

    mod reset {
        use super::*;

        #[test]
        fn reset_clears_form_photo_and_camera() {
            let dir = tempfile::tempdir().unwrap();
            let mut app = make_app(one_frame(b"\xFF\xD8z\xFF\xD9"));
            fill_valid(&mut app);
            app.apply(Action::LoadPhoto(photo_file(&dir)));
            app.camera_error = Some("old".into());
            app.apply(Action::OpenCamera);

            app.apply(Action::Reset);
            assert_eq!(app.screen(), Screen::Registration);
            assert!(!app.camera_open());
            assert!(app.preview().is_none());
            assert_eq!(app.camera_error(), None);
            assert_eq!(app.form().values().full_name, "");
            assert!(app.form().values().photo.is_none());
        }
    }
}
