use std::io::{self, Read};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use tokio_util::codec::Decoder;
use tracing::{debug, warn};

use super::error::CameraError;
use super::mjpeg::JpegFrameDecoder;
use crate::model::Photo;

/// JPEG quality requested for captured stills.
pub const CAPTURE_QUALITY: f32 = 0.9;

/// How long [`CameraStream::capture`] waits for a first frame.
const FIRST_FRAME_TIMEOUT: Duration = Duration::from_secs(3);

// Bytes of capture-program diagnostics kept for error classification.
const STDERR_TAIL: usize = 8 * 1024;

/// Which way the camera should face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Facing {
    /// Towards the visitor.
    #[default]
    User,
    Environment,
}

impl Facing {
    pub fn as_str(&self) -> &'static str {
        match self {
            Facing::User => "user",
            Facing::Environment => "environment",
        }
    }
}

/// Parameters of a stream request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamRequest {
    pub facing: Facing,
    pub quality: f32,
}

impl Default for StreamRequest {
    fn default() -> Self {
        Self {
            facing: Facing::User,
            quality: CAPTURE_QUALITY,
        }
    }
}

/// A source of live camera streams.
pub trait Camera {
    /// Starts streaming. The returned handle owns the device until dropped.
    fn open(&self, request: &StreamRequest) -> Result<CameraStream, CameraError>;
}

/// A camera that cannot stream; every open asks for the file fallback.
#[derive(Debug, Default)]
pub struct NoCamera;

impl Camera for NoCamera {
    fn open(&self, _request: &StreamRequest) -> Result<CameraStream, CameraError> {
        Err(CameraError::Unsupported)
    }
}

/// Kills the capture process when dropped.
#[derive(Debug)]
struct ProcessGuard(Child);

impl Drop for ProcessGuard {
    fn drop(&mut self) {
        if let Err(err) = self.0.kill() {
            debug!(error = %err, "capture process already exited");
        }
        let _ = self.0.wait();
        debug!("camera stream stopped");
    }
}

/// An open camera stream.
///
/// Frames arrive in the background; [`poll`](Self::poll) picks up the latest
/// one. Dropping the stream stops the device.
#[derive(Debug)]
pub struct CameraStream {
    frames: Receiver<Result<Bytes, CameraError>>,
    latest: Option<Bytes>,
    received: u64,
    _process: Option<ProcessGuard>,
}

impl CameraStream {
    /// Wraps a channel of decoded frames.
    pub fn from_frames(frames: Receiver<Result<Bytes, CameraError>>) -> Self {
        Self {
            frames,
            latest: None,
            received: 0,
            _process: None,
        }
    }

    fn with_process(frames: Receiver<Result<Bytes, CameraError>>, child: Child) -> Self {
        Self {
            _process: Some(ProcessGuard(child)),
            ..Self::from_frames(frames)
        }
    }

    /// Drains pending frames, keeping the newest.
    ///
    /// Returns `true` if a new frame arrived. A stream that ended after
    /// delivering frames keeps its last one.
    pub fn poll(&mut self) -> Result<bool, CameraError> {
        let mut fresh = false;
        loop {
            match self.frames.try_recv() {
                Ok(Ok(frame)) => {
                    self.latest = Some(frame);
                    self.received += 1;
                    fresh = true;
                }
                Ok(Err(err)) => return Err(err),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => return Ok(fresh),
            }
        }
    }

    /// Returns `true` once at least one frame has arrived.
    pub fn is_live(&self) -> bool {
        self.latest.is_some()
    }

    /// Number of frames received so far.
    pub fn frames_received(&self) -> u64 {
        self.received
    }

    /// Size in bytes of the most recent frame.
    pub fn latest_len(&self) -> Option<usize> {
        self.latest.as_ref().map(Bytes::len)
    }

    /// Takes the current frame as a still photo and stops the stream.
    ///
    /// `millis` is the capture time used in the file name.
    pub fn capture(mut self, millis: i64) -> Result<Photo, CameraError> {
        self.poll()?;
        if self.latest.is_none() {
            match self.frames.recv_timeout(FIRST_FRAME_TIMEOUT) {
                Ok(Ok(frame)) => self.latest = Some(frame),
                Ok(Err(err)) => return Err(err),
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => {
                    return Err(CameraError::Failed {
                        detail: "no frame received from camera".into(),
                    });
                }
            }
        }
        let frame = self.latest.take().unwrap_or_default();
        Ok(Photo::new(
            format!("visitor-photo-{millis}.jpg"),
            "image/jpeg",
            frame,
        ))
    }
}

/// A camera backed by an external program that writes MJPEG to stdout.
#[derive(Debug, Clone)]
pub struct CommandCamera {
    program: String,
    args: Vec<String>,
    remote: bool,
}

impl CommandCamera {
    /// Builds a camera from a configured command line, or `None` if empty.
    pub fn from_command(command: &[String]) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
            remote: is_remote_session(),
        })
    }

    /// Marks whether the app runs in a remote session.
    pub fn remote(mut self, remote: bool) -> Self {
        self.remote = remote;
        self
    }

    fn arguments(&self, request: &StreamRequest) -> Vec<String> {
        let quality = request.quality.to_string();
        self.args
            .iter()
            .map(|arg| {
                arg.replace("{facing}", request.facing.as_str())
                    .replace("{quality}", &quality)
            })
            .collect()
    }
}

impl Camera for CommandCamera {
    fn open(&self, request: &StreamRequest) -> Result<CameraStream, CameraError> {
        if self.remote {
            return Err(CameraError::InsecureContext);
        }

        let mut child = Command::new(&self.program)
            .args(self.arguments(request))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| {
                warn!(program = %self.program, error = %err, "failed to start capture program");
                CameraError::from_spawn(&err)
            })?;

        let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
            return Err(CameraError::Failed {
                detail: "capture program pipes unavailable".into(),
            });
        };

        let (tx, rx) = mpsc::channel();
        thread::spawn(move || pump_frames(stdout, stderr, &tx));
        debug!(program = %self.program, facing = request.facing.as_str(), "camera stream started");
        Ok(CameraStream::with_process(rx, child))
    }
}

/// Returns `true` inside an SSH session, where the camera is not the visitor's.
fn is_remote_session() -> bool {
    std::env::var_os("SSH_CONNECTION").is_some() || std::env::var_os("SSH_TTY").is_some()
}

/// Reads MJPEG from `stdout` and forwards decoded frames until the stream ends
/// or the receiver goes away.
fn pump_frames<R, E>(mut stdout: R, stderr: E, tx: &Sender<Result<Bytes, CameraError>>)
where
    R: Read,
    E: Read + Send + 'static,
{
    let diagnostics = thread::spawn(move || stderr_tail(stderr));
    let mut decoder = JpegFrameDecoder::new();
    let mut buf = BytesMut::with_capacity(64 * 1024);
    let mut chunk = [0_u8; 8192];
    let mut delivered = 0_u64;

    loop {
        match stdout.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => {
                buf.extend_from_slice(&chunk[..n]);
                loop {
                    match decoder.decode(&mut buf) {
                        Ok(Some(frame)) => {
                            delivered += 1;
                            if tx.send(Ok(frame)).is_err() {
                                return;
                            }
                        }
                        Ok(None) => break,
                        Err(err) => {
                            let _ = tx.send(Err(CameraError::Failed {
                                detail: err.to_string(),
                            }));
                            return;
                        }
                    }
                }
            }
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) => {
                let _ = tx.send(Err(CameraError::from_device_io(&err)));
                return;
            }
        }
    }

    if delivered == 0 {
        let stderr = diagnostics.join().unwrap_or_default();
        warn!(stderr = %stderr.trim(), "capture program ended without a frame");
        let _ = tx.send(Err(CameraError::from_stderr(&stderr)));
    }
}

fn stderr_tail(mut stderr: impl Read) -> String {
    let mut tail = Vec::new();
    let mut chunk = [0_u8; 1024];
    loop {
        match stderr.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => {
                tail.extend_from_slice(&chunk[..n]);
                if tail.len() > STDERR_TAIL {
                    tail.drain(..tail.len() - STDERR_TAIL);
                }
            }
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(_) => break,
        }
    }
    String::from_utf8_lossy(&tail).into_owned()
}
