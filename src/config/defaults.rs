//! Default values for configuration fields

use crate::constants;

pub fn port() -> u16 {
    constants::protocol::DEFAULT_PORT
}

pub fn refresh_interval() -> u64 {
    1
}

pub fn snaplen() -> i32 {
    constants::capture::DEFAULT_SNAPLEN
}

pub fn promiscuous() -> bool {
    true
}

pub fn queue_capacity() -> usize {
    constants::queue::DEFAULT_CAPACITY
}
