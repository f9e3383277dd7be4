//! Shared helpers for the integration suites
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use mctop::capture::{CaptureError, FramePoll, FrameSource, LinkType};

pub const PORT: u16 = 11211;

/// Build a minimal Ethernet + IPv4 + TCP frame around `payload`.
#[must_use]
pub fn ipv4_frame(src_port: u16, dst_port: u16, payload: &[u8]) -> Vec<u8> {
    let mut frame = vec![0u8; 14];
    frame[12..14].copy_from_slice(&0x0800u16.to_be_bytes());

    let mut ip = vec![0u8; 20];
    ip[0] = 0x45;
    ip[2..4].copy_from_slice(&((40 + payload.len()) as u16).to_be_bytes());
    ip[8] = 64;
    ip[9] = 6;
    frame.extend_from_slice(&ip);

    let mut tcp = vec![0u8; 20];
    tcp[0..2].copy_from_slice(&src_port.to_be_bytes());
    tcp[2..4].copy_from_slice(&dst_port.to_be_bytes());
    tcp[12] = 5 << 4;
    frame.extend_from_slice(&tcp);

    frame.extend_from_slice(payload);
    frame
}

/// A frame from the server to some client.
#[must_use]
pub fn response_frame(payload: &[u8]) -> Vec<u8> {
    ipv4_frame(PORT, 49152, payload)
}

/// A frame from some client to the server.
#[must_use]
pub fn request_frame(payload: &[u8]) -> Vec<u8> {
    ipv4_frame(49152, PORT, payload)
}

/// Frame source fed from a script of frames; yields timeouts once the
/// script is exhausted.
pub struct ScriptedSource {
    frames: Arc<Mutex<VecDeque<Vec<u8>>>>,
}

impl ScriptedSource {
    #[must_use]
    pub fn new(frames: Vec<Vec<u8>>) -> Self {
        Self {
            frames: Arc::new(Mutex::new(frames.into())),
        }
    }

    /// Handle for appending frames after the engine has started.
    #[must_use]
    pub fn feeder(&self) -> Arc<Mutex<VecDeque<Vec<u8>>>> {
        Arc::clone(&self.frames)
    }
}

impl FrameSource for ScriptedSource {
    fn link_type(&self) -> LinkType {
        LinkType::Ethernet
    }

    fn poll(&mut self) -> Result<FramePoll, CaptureError> {
        let next = self.frames.lock().unwrap().pop_front();
        match next {
            Some(frame) => Ok(FramePoll::Frame(frame)),
            None => {
                std::thread::sleep(std::time::Duration::from_millis(5));
                Ok(FramePoll::TimedOut)
            }
        }
    }

    fn describe(&self) -> String {
        "scripted".to_string()
    }
}

/// Spin until `predicate` holds or two seconds pass.
pub fn wait_for(predicate: impl Fn() -> bool) -> bool {
    let deadline = std::time::Instant::now() + std::time::Duration::from_secs(2);
    while std::time::Instant::now() < deadline {
        if predicate() {
            return true;
        }
        std::thread::sleep(std::time::Duration::from_millis(5));
    }
    predicate()
}
