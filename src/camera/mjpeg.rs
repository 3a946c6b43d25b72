use std::io;

use bytes::{Bytes, BytesMut};
use tokio_util::codec::Decoder;

// Start-of-image and end-of-image JPEG markers.
const SOI: [u8; 2] = [0xFF, 0xD8];
const EOI: [u8; 2] = [0xFF, 0xD9];

/// Upper bound on a single frame; anything larger is treated as a broken stream.
const MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

/// Splits a Motion-JPEG byte stream into individual JPEG frames.
///
/// Frames are delimited by SOI/EOI markers; bytes between frames are
/// discarded. Streams carrying embedded thumbnails (EXIF) are not supported.
#[derive(Debug, Default)]
pub struct JpegFrameDecoder {
    // Offset into the buffered frame already searched for EOI.
    scanned: usize,
}

impl JpegFrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }
}

fn find(haystack: &[u8], needle: [u8; 2]) -> Option<usize> {
    haystack.windows(2).position(|w| w == needle)
}

impl Decoder for JpegFrameDecoder {
    type Item = Bytes;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Bytes>, io::Error> {
        if self.scanned == 0 {
            match find(src, SOI) {
                Some(start) => {
                    let _ = src.split_to(start);
                    self.scanned = SOI.len();
                }
                None => {
                    // Keep a trailing 0xFF; it may be the first half of a marker.
                    let keep = usize::from(src.last() == Some(&0xFF));
                    let _ = src.split_to(src.len() - keep);
                    return Ok(None);
                }
            }
        }

        match find(&src[self.scanned..], EOI) {
            Some(offset) => {
                let end = self.scanned + offset + EOI.len();
                self.scanned = 0;
                Ok(Some(src.split_to(end).freeze()))
            }
            None => {
                if src.len() > MAX_FRAME_LEN {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        "camera frame exceeds maximum size",
                    ));
                }
                self.scanned = src.len().saturating_sub(1).max(SOI.len());
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(payload: &[u8]) -> Vec<u8> {
        let mut out = SOI.to_vec();
        out.extend_from_slice(payload);
        out.extend_from_slice(&EOI);
        out
    }

    #[test]
    fn decodes_single_frame() {
        let mut decoder = JpegFrameDecoder::new();
        let mut buf = BytesMut::from(&frame(b"abc")[..]);
        let decoded = decoder.decode(&mut buf).unwrap().unwrap();
        assert_eq!(&decoded[..], &frame(b"abc")[..]);
        assert!(buf.is_empty());
    }

    #[test]
    fn skips_leading_garbage() {
        let mut decoder = JpegFrameDecoder::new();
        let mut data = b"junk".to_vec();
        data.extend(frame(b"x"));
        let mut buf = BytesMut::from(&data[..]);
        let decoded = decoder.decode(&mut buf).unwrap().unwrap();
        assert_eq!(&decoded[..], &frame(b"x")[..]);
    }

    #[test]
    fn waits_for_complete_frame() {
        let mut decoder = JpegFrameDecoder::new();
        let whole = frame(b"hello world");
        let (head, tail) = whole.split_at(7);

        let mut buf = BytesMut::from(head);
        assert_eq!(decoder.decode(&mut buf).unwrap(), None);
        buf.extend_from_slice(tail);
        let decoded = decoder.decode(&mut buf).unwrap().unwrap();
        assert_eq!(&decoded[..], &whole[..]);
    }

    #[test]
    fn marker_split_across_reads() {
        let mut decoder = JpegFrameDecoder::new();
        let whole = frame(b"data");
        let split = whole.len() - 1;

        let mut buf = BytesMut::from(&whole[..split]);
        assert_eq!(decoder.decode(&mut buf).unwrap(), None);
        buf.extend_from_slice(&whole[split..]);
        assert_eq!(
            &decoder.decode(&mut buf).unwrap().unwrap()[..],
            &whole[..]
        );
    }

    #[test]
    fn soi_split_across_reads() {
        let mut decoder = JpegFrameDecoder::new();
        let mut buf = BytesMut::from(&b"zz\xFF"[..]);
        assert_eq!(decoder.decode(&mut buf).unwrap(), None);
        assert_eq!(&buf[..], b"\xFF");
        buf.extend_from_slice(&frame(b"q")[1..]);
        assert_eq!(
            &decoder.decode(&mut buf).unwrap().unwrap()[..],
            &frame(b"q")[..]
        );
    }

    #[test]
    fn consecutive_frames() {
        let mut decoder = JpegFrameDecoder::new();
        let mut data = frame(b"one");
        data.extend(frame(b"two"));
        let mut buf = BytesMut::from(&data[..]);
        assert_eq!(&decoder.decode(&mut buf).unwrap().unwrap()[..], &frame(b"one")[..]);
        assert_eq!(&decoder.decode(&mut buf).unwrap().unwrap()[..], &frame(b"two")[..]);
        assert_eq!(decoder.decode(&mut buf).unwrap(), None);
    }

    #[test]
    fn no_marker_discards_bytes() {
        let mut decoder = JpegFrameDecoder::new();
        let mut buf = BytesMut::from(&b"nothing here"[..]);
        assert_eq!(decoder.decode(&mut buf).unwrap(), None);
        assert!(buf.is_empty());
    }
}
