//! MSC decoder.

use crate::arith::ArithmeticDecoder;
use crate::config::{Extradata, MscConfig, StreamVariant};
use crate::context::CodecContext;
use crate::error::{MscError, Result};
use crate::rle;
use msc_core::bitstream::BitReader;
use msc_core::frame::{Frame, FrameFlags, NUM_PLANES};
use msc_core::packet::split_payload;
use msc_core::pool::FramePool;
use tracing::{debug, trace};

/// Frames kept for reuse by [`MscDecoder::recycle`].
const POOL_SIZE: usize = 4;

/// MSC decoder.
#[derive(Debug)]
pub struct MscDecoder {
    context: CodecContext,
    pool: FramePool,
    /// Set once a transform frame fails mid-way; the models can no longer
    /// be trusted.
    desynced: bool,
}

impl MscDecoder {
    /// Create a decoder from the encoder's extradata and the frame size.
    pub fn new(extradata: &[u8], width: u32, height: u32) -> Result<Self> {
        let config = Extradata::parse(extradata)?.to_config(width, height);
        Self::with_config(config)
    }

    /// Create a decoder from an explicit configuration.
    pub fn with_config(config: MscConfig) -> Result<Self> {
        let context = CodecContext::new(config)?;
        let pool = FramePool::new(context.config.width, context.config.height, POOL_SIZE);
        Ok(Self {
            context,
            pool,
            desynced: false,
        })
    }

    /// Decoder configuration.
    pub fn config(&self) -> &MscConfig {
        &self.context.config
    }

    /// Number of frames decoded so far.
    pub fn frame_count(&self) -> u64 {
        self.context.frame_index
    }

    /// Hand a decoded frame back so a later decode can reuse its buffers.
    pub fn recycle(&mut self, frame: Frame) {
        self.pool.release(frame);
    }

    /// Decode one packet into a frame.
    ///
    /// A transform packet that fails to decode leaves the adaptive models
    /// in an unknown state, so every later packet of the stream fails too.
    pub fn decode(&mut self, data: &[u8]) -> Result<Frame> {
        if self.desynced {
            return Err(MscError::corrupt(
                "stream state lost after an earlier decode error",
            ));
        }

        let variant = self.context.config.variant;
        let intra = self.context.is_intra();
        let mut frame = self
            .pool
            .acquire()
            .map_err(|e| MscError::OutOfMemory(e.to_string()))?;

        let result = match variant {
            StreamVariant::Rle => Self::decode_rle(data, &mut frame),
            StreamVariant::Transform => self.decode_transform(data, &mut frame, intra),
        };
        if let Err(e) = result {
            self.pool.release(frame);
            return Err(e);
        }

        frame.flags.set(FrameFlags::KEYFRAME, intra);
        frame.pts = Some(self.context.frame_index as i64);
        debug!(
            frame = self.context.frame_index,
            intra,
            size = data.len(),
            "MSC frame decoded"
        );
        self.context.frame_index += 1;
        Ok(frame)
    }

    fn decode_rle(data: &[u8], frame: &mut Frame) -> Result<()> {
        let mut pos = 0;
        for plane in 0..NUM_PLANES {
            pos = rle::decode_plane(data, pos, frame.plane_mut(plane))?;
        }
        if pos < data.len() {
            trace!(trailing = data.len() - pos, "ignoring bytes after last RLE plane");
        }
        Ok(())
    }

    fn decode_transform(&mut self, data: &[u8], frame: &mut Frame, intra: bool) -> Result<()> {
        let payload = split_payload(data).map_err(|e| match e {
            msc_core::Error::BufferTooSmall { needed, available } => {
                MscError::TruncatedPacket { needed, available }
            }
            other => other.into(),
        })?;

        let mut reader = BitReader::new(payload);
        let mut decoder = ArithmeticDecoder::new(&mut reader)?;
        let mut reference = self.context.take_reference()?;

        let result = self
            .context
            .decode_macroblocks(&mut decoder, &mut reader, &mut reference, intra);
        if result.is_ok() {
            copy_frame(&reference, frame);
        } else {
            self.desynced = true;
        }
        self.context.restore_reference(reference);
        result
    }
}

/// Copy the visible samples of `src` into `dst` (same dimensions).
fn copy_frame(src: &Frame, dst: &mut Frame) {
    for plane in 0..NUM_PLANES {
        let from = src.plane(plane);
        let to = dst.plane_mut(plane);
        for y in 0..from.height() as usize {
            to.row_mut(y).copy_from_slice(from.row(y));
        }
    }
}
