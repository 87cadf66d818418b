//! State shared by the encoder and decoder of one stream.
//!
//! Both sides run the same macroblock loop over the same models and the
//! same reference frame; the only difference is which way symbols flow
//! through the arithmetic coder. Keeping that loop here is what keeps the
//! two sides in lockstep.

use crate::arith::{ArithmeticDecoder, ArithmeticEncoder};
use crate::block::{decode_block, encode_block, reconstruct_block, transform_block, Block};
use crate::config::{MscConfig, StreamVariant};
use crate::error::{MscError, Result};
use crate::macroblock::{get_blocks, mb_grid, put_blocks};
use crate::model::ModelSet;
use crate::quant::QuantMatrices;
use crate::tables::{BLOCKS_PER_MB, BLOCK_COEFFS};
use msc_core::bitstream::{BitReader, BitWriter};
use msc_core::frame::{Frame, FrameView};
use tracing::{debug, warn};

/// Scratch blocks for one macroblock.
type MacroblockBlocks = [Block; BLOCKS_PER_MB];

/// Per-stream codec state.
#[derive(Debug)]
pub(crate) struct CodecContext {
    pub config: MscConfig,
    pub mb_cols: usize,
    pub mb_rows: usize,
    pub quant: QuantMatrices,
    pub models: ModelSet,
    /// Last reconstructed frame, allocated on first use.
    reference: Option<Frame>,
    /// Index of the next frame to code.
    pub frame_index: u64,
}

impl CodecContext {
    pub fn new(config: MscConfig) -> Result<Self> {
        config.validate()?;
        let (mb_cols, mb_rows) = mb_grid(config.width, config.height);

        debug!(
            width = config.width,
            height = config.height,
            variant = ?config.variant,
            qscale = config.qscale,
            keyframe_interval = config.keyframe_interval,
            mb_cols,
            mb_rows,
            "MSC context created"
        );

        Ok(Self {
            quant: QuantMatrices::new(config.qscale),
            models: ModelSet::new(),
            config,
            mb_cols,
            mb_rows,
            reference: None,
            frame_index: 0,
        })
    }

    /// Whether the next frame is intra coded.
    pub fn is_intra(&self) -> bool {
        self.config.variant == StreamVariant::Rle
            || self.frame_index % self.config.keyframe_interval as u64 == 0
    }

    /// Move the reference frame out, allocating it on the first call.
    pub fn take_reference(&mut self) -> Result<Frame> {
        match self.reference.take() {
            Some(frame) => Ok(frame),
            None => Frame::new(self.config.width, self.config.height)
                .map_err(|e| MscError::OutOfMemory(format!("reference frame: {}", e))),
        }
    }

    /// Put the reference frame back after a frame has been coded.
    pub fn restore_reference(&mut self, frame: Frame) {
        self.reference = Some(frame);
    }

    #[cfg(test)]
    pub fn reference(&self) -> Option<&Frame> {
        self.reference.as_ref()
    }

    /// Transform code every macroblock of `source`, reconstructing into
    /// `reference` exactly as the decoder will.
    pub fn encode_macroblocks(
        &mut self,
        encoder: &mut ArithmeticEncoder,
        writer: &mut BitWriter,
        source: &FrameView<'_>,
        reference: &mut Frame,
        intra: bool,
    ) {
        let mut input: MacroblockBlocks = [[0; BLOCK_COEFFS]; BLOCKS_PER_MB];
        let mut prediction: MacroblockBlocks = [[0; BLOCK_COEFFS]; BLOCKS_PER_MB];
        let mut output: MacroblockBlocks = [[0; BLOCK_COEFFS]; BLOCKS_PER_MB];
        let mut scanned: Block = [0; BLOCK_COEFFS];

        for mb_y in 0..self.mb_rows {
            for mb_x in 0..self.mb_cols {
                get_blocks(source, mb_x, mb_y, &mut input);
                if !intra {
                    get_blocks(&reference.view(), mb_x, mb_y, &mut prediction);
                    for (block, pred) in input.iter_mut().zip(prediction.iter()) {
                        for (s, &p) in block.iter_mut().zip(pred.iter()) {
                            *s -= p;
                        }
                    }
                }

                for (i, block) in input.iter().enumerate() {
                    if let Some(level) = transform_block(block, &self.quant, intra, &mut scanned) {
                        warn!(
                            frame = self.frame_index,
                            mb_x,
                            mb_y,
                            block = i,
                            level,
                            "quantized coefficient clipped"
                        );
                    }
                    encode_block(encoder, writer, &mut self.models, &scanned);
                    reconstruct_block(&scanned, &self.quant, intra, &mut output[i]);
                }

                if !intra {
                    add_prediction(&mut output, &prediction);
                }
                put_blocks(reference, mb_x, mb_y, &output);
            }
        }
    }

    /// Decode every macroblock of a frame into `reference`.
    pub fn decode_macroblocks(
        &mut self,
        decoder: &mut ArithmeticDecoder,
        reader: &mut BitReader<'_>,
        reference: &mut Frame,
        intra: bool,
    ) -> Result<()> {
        let mut prediction: MacroblockBlocks = [[0; BLOCK_COEFFS]; BLOCKS_PER_MB];
        let mut output: MacroblockBlocks = [[0; BLOCK_COEFFS]; BLOCKS_PER_MB];
        let mut scanned: Block = [0; BLOCK_COEFFS];

        for mb_y in 0..self.mb_rows {
            for mb_x in 0..self.mb_cols {
                if !intra {
                    get_blocks(&reference.view(), mb_x, mb_y, &mut prediction);
                }
                for block in output.iter_mut() {
                    decode_block(decoder, reader, &mut self.models, &mut scanned)?;
                    reconstruct_block(&scanned, &self.quant, intra, block);
                }
                if !intra {
                    add_prediction(&mut output, &prediction);
                }
                put_blocks(reference, mb_x, mb_y, &output);
            }
        }
        Ok(())
    }
}

fn add_prediction(output: &mut MacroblockBlocks, prediction: &MacroblockBlocks) {
    for (block, pred) in output.iter_mut().zip(prediction.iter()) {
        for (s, &p) in block.iter_mut().zip(pred.iter()) {
            *s = s.saturating_add(p);
        }
    }
}
