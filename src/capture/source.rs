//! Packet source abstraction and the live pcap implementation
//!
//! The capture engine only sees the `FrameSource` trait, so tests can
//! script frames without touching a real interface. The live source wraps
//! a pcap capture handle opened with a read timeout: the timeout is what
//! bounds the capture thread's blocking read and makes shutdown prompt.

use tracing::debug;

use crate::capture::error::CaptureError;
use crate::constants::capture::READ_TIMEOUT_MS;

/// Link-layer framing of a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkType {
    Ethernet,
    Other(i32),
}

/// One poll of the source: a raw link-layer frame, or a timeout tick that
/// gives the caller a chance to re-check its lifecycle state.
#[derive(Debug)]
pub enum FramePoll {
    Frame(Vec<u8>),
    TimedOut,
}

/// An opaque provider of raw link-layer frames.
pub trait FrameSource: Send {
    /// Link-layer type of the frames this source yields.
    fn link_type(&self) -> LinkType;

    /// Pull the next frame, or time out within a bounded interval.
    fn poll(&mut self) -> Result<FramePoll, CaptureError>;

    /// Short human-readable name for logs.
    fn describe(&self) -> String;
}

/// Live capture from a network interface via pcap.
pub struct LiveSource {
    capture: pcap::Capture<pcap::Active>,
    interface: String,
    link: LinkType,
}

impl LiveSource {
    /// Open `interface` for live capture, filtered to TCP traffic on
    /// `port`. Failures here (permissions, unknown device, bad filter)
    /// are fatal and must reach the controller before any thread starts.
    pub fn open(
        interface: &str,
        port: u16,
        snaplen: i32,
        promiscuous: bool,
    ) -> Result<Self, CaptureError> {
        let inactive =
            pcap::Capture::from_device(interface).map_err(|e| CaptureError::Open {
                interface: interface.to_string(),
                source: e,
            })?;

        let mut capture = inactive
            .promisc(promiscuous)
            .snaplen(snaplen)
            .timeout(READ_TIMEOUT_MS)
            .open()
            .map_err(|e| CaptureError::Open {
                interface: interface.to_string(),
                source: e,
            })?;

        let expression = format!("tcp port {}", port);
        capture
            .filter(&expression, true)
            .map_err(|e| CaptureError::Filter {
                expression: expression.clone(),
                source: e,
            })?;
        debug!("installed capture filter '{}'", expression);

        let datalink = capture.get_datalink();
        let link = if datalink == pcap::Linktype::ETHERNET {
            LinkType::Ethernet
        } else {
            LinkType::Other(datalink.0)
        };

        Ok(Self {
            capture,
            interface: interface.to_string(),
            link,
        })
    }
}

impl FrameSource for LiveSource {
    fn link_type(&self) -> LinkType {
        self.link
    }

    fn poll(&mut self) -> Result<FramePoll, CaptureError> {
        match self.capture.next_packet() {
            Ok(packet) => Ok(FramePoll::Frame(packet.data.to_vec())),
            Err(pcap::Error::TimeoutExpired) => Ok(FramePoll::TimedOut),
            Err(e) => Err(CaptureError::Read(e)),
        }
    }

    fn describe(&self) -> String {
        self.interface.clone()
    }
}
