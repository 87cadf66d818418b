//! # MSC Core
//!
//! Core types and utilities shared by the MSC codec crates.
//!
//! This crate provides the building blocks the codec consumes:
//! - Error handling types
//! - Bitstream reading/writing utilities
//! - Planar YUV 4:2:0 frame buffers and borrowed frame views
//! - A decode-side frame pool
//! - Packets and their length header
//! - PSNR measurement

pub mod error;
pub mod bitstream;
pub mod frame;
pub mod pool;
pub mod packet;
pub mod quality;

pub use error::{BitstreamError, CodecError, Error, Result};
pub use bitstream::{BitReader, BitWriter};
pub use frame::{plane_dimensions, Frame, FrameFlags, FrameView, Plane, PlaneView, NUM_PLANES};
pub use pool::FramePool;
pub use packet::{Packet, PacketFlags, PACKET_HEADER_SIZE};
