//! MSC video codec.
//!
//! MSC codes planar YUV 4:2:0 video in one of two stream variants:
//!
//! - **RLE**: every plane row is run-length coded. Lossless and stateless.
//! - **Transform**: each 16x16 macroblock is split into six 8x8 blocks that
//!   are DCT transformed, quantized, zigzag scanned and coded with an
//!   adaptive arithmetic coder. Frames are intra coded on a fixed cadence
//!   and coded as a difference from the previous reconstruction otherwise.
//!
//! The arithmetic models adapt over the whole stream and are never reset,
//! so transform packets must be decoded in order, each exactly once.
//!
//! ## Example
//!
//! ```ignore
//! use msc_codec::{MscConfig, MscDecoder, MscEncoder};
//!
//! let mut encoder = MscEncoder::new(MscConfig::new(width, height))?;
//! let mut decoder = MscDecoder::new(&encoder.extradata(), width, height)?;
//!
//! let packet = encoder.encode(&frame.view())?;
//! let decoded = decoder.decode(packet.data())?;
//! ```

#![warn(missing_docs)]

pub mod arith;
pub mod block;
pub mod config;
mod context;
pub mod dct;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod macroblock;
pub mod model;
pub mod quant;
pub mod rle;
pub mod tables;

pub use arith::{ArithmeticDecoder, ArithmeticEncoder, Symbol};
pub use config::{Extradata, MscConfig, StreamVariant, MAX_DIMENSION};
pub use decoder::MscDecoder;
pub use encoder::MscEncoder;
pub use error::{MscError, Result};
pub use model::{FrequencyModel, ModelSet, MAXIMUM_SCALE};
pub use quant::QuantMatrices;
