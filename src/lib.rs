//! rtsp-wire - RTSP message layer
//!
//! This crate reads and writes RTSP control messages on a byte stream that
//! also carries interleaved binary (RTP/RTCP) frames.

pub mod rtsp;
