//! Capture error types
//!
//! Distinguishes the fatal open-time failures (surfaced to the controller
//! before any thread runs) from mid-run read failures (tolerated up to a
//! threshold).

use std::fmt;

/// Errors that can occur while opening or reading the packet source
#[derive(Debug)]
pub enum CaptureError {
    /// Opening the packet source on the named interface failed
    /// (permissions, no such device)
    Open {
        interface: String,
        source: pcap::Error,
    },

    /// Installing the port filter failed
    Filter {
        expression: String,
        source: pcap::Error,
    },

    /// The interface's link layer is not one we can demux
    UnsupportedLinkType { interface: String, link_type: i32 },

    /// Spawning the capture thread failed
    Spawn(std::io::Error),

    /// A read from the packet source failed mid-run
    Read(pcap::Error),
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open { interface, source } => {
                write!(f, "Failed to open packet source on '{}': {}", interface, source)
            }
            Self::Filter { expression, source } => {
                write!(f, "Failed to install filter '{}': {}", expression, source)
            }
            Self::UnsupportedLinkType {
                interface,
                link_type,
            } => {
                write!(
                    f,
                    "Interface '{}' has unsupported link type {} (only Ethernet is supported)",
                    interface, link_type
                )
            }
            Self::Spawn(e) => write!(f, "Failed to spawn capture thread: {}", e),
            Self::Read(e) => write!(f, "Packet source read failed: {}", e),
        }
    }
}

impl std::error::Error for CaptureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Open { source, .. } | Self::Filter { source, .. } | Self::Read(source) => {
                Some(source)
            }
            Self::Spawn(e) => Some(e),
            Self::UnsupportedLinkType { .. } => None,
        }
    }
}

// anyhow picks these up through the blanket std::error::Error impl
