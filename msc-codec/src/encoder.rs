//! MSC encoder.

use crate::arith::ArithmeticEncoder;
use crate::config::{Extradata, MscConfig, StreamVariant, EXTRADATA_SIZE};
use crate::context::CodecContext;
use crate::error::{MscError, Result};
use crate::rle;
use msc_core::bitstream::BitWriter;
use msc_core::frame::{FrameView, NUM_PLANES};
use msc_core::packet::{frame_payload, Packet};
use msc_core::CodecError;

/// Output buffer size as a multiple of the luma sample count.
const OUTPUT_BUFFER_FACTOR: usize = 6;

/// MSC encoder.
pub struct MscEncoder {
    context: CodecContext,
    /// Transform output buffer, reused for every frame.
    writer: BitWriter,
    /// RLE scratch buffer, reused for every frame.
    rle_buffer: Vec<u8>,
}

impl MscEncoder {
    /// Create an encoder for `config`.
    pub fn new(config: MscConfig) -> Result<Self> {
        let context = CodecContext::new(config)?;
        let samples = context.config.width as usize * context.config.height as usize;
        let capacity = samples
            .checked_mul(OUTPUT_BUFFER_FACTOR)
            .ok_or_else(|| MscError::OutOfMemory("output buffer size overflows".into()))?;

        let (writer, rle_buffer) = match context.config.variant {
            StreamVariant::Transform => (
                BitWriter::try_with_capacity(capacity)
                    .map_err(|e| MscError::OutOfMemory(e.to_string()))?,
                Vec::new(),
            ),
            StreamVariant::Rle => {
                let mut buffer = Vec::new();
                buffer
                    .try_reserve_exact(capacity)
                    .map_err(|_| MscError::OutOfMemory(format!("{} byte RLE buffer", capacity)))?;
                (BitWriter::new(), buffer)
            }
        };

        Ok(Self {
            context,
            writer,
            rle_buffer,
        })
    }

    /// Encoder configuration.
    pub fn config(&self) -> &MscConfig {
        &self.context.config
    }

    /// Stream extradata for the decoder.
    pub fn extradata(&self) -> [u8; EXTRADATA_SIZE] {
        self.stream_parameters().to_bytes()
    }

    /// Stream parameters in structured form.
    pub fn stream_parameters(&self) -> Extradata {
        self.context.config.extradata()
    }

    /// Number of frames encoded so far.
    pub fn frame_count(&self) -> u64 {
        self.context.frame_index
    }

    /// Encode one frame.
    ///
    /// Frames must match the configured dimensions. Intra frames are marked
    /// as keyframes on the returned packet.
    pub fn encode(&mut self, frame: &FrameView<'_>) -> Result<Packet> {
        let config = &self.context.config;
        if frame.width() != config.width || frame.height() != config.height {
            return Err(msc_core::Error::from(CodecError::DimensionMismatch {
                width: frame.width(),
                height: frame.height(),
                expected_width: config.width,
                expected_height: config.height,
            })
            .into());
        }

        let variant = config.variant;
        let intra = self.context.is_intra();
        let data = match variant {
            StreamVariant::Rle => self.encode_rle(frame),
            StreamVariant::Transform => self.encode_transform(frame, intra)?,
        };

        let mut packet = Packet::new(data);
        packet.pts = Some(self.context.frame_index as i64);
        packet.set_keyframe(intra);

        tracing::debug!(
            frame = self.context.frame_index,
            intra,
            size = packet.size(),
            "MSC frame encoded"
        );
        self.context.frame_index += 1;
        Ok(packet)
    }

    /// Runs are built in the scratch buffer; the packet gets an exact-size
    /// copy so the scratch capacity survives for the next frame.
    fn encode_rle(&mut self, frame: &FrameView<'_>) -> Vec<u8> {
        self.rle_buffer.clear();
        for plane in 0..NUM_PLANES {
            rle::encode_plane(frame.plane(plane), &mut self.rle_buffer);
        }
        self.rle_buffer.as_slice().to_vec()
    }

    fn encode_transform(&mut self, frame: &FrameView<'_>, intra: bool) -> Result<Vec<u8>> {
        let mut reference = self.context.take_reference()?;
        self.writer.clear();

        let mut encoder = ArithmeticEncoder::new();
        self.context
            .encode_macroblocks(&mut encoder, &mut self.writer, frame, &mut reference, intra);
        encoder.flush(&mut self.writer);

        self.context.restore_reference(reference);
        Ok(frame_payload(self.writer.data())?)
    }
}

impl std::fmt::Debug for MscEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MscEncoder")
            .field("config", &self.context.config)
            .field("frame_count", &self.context.frame_index)
            .finish()
    }
}
