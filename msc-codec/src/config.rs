//! Stream configuration and the extradata that carries it to the decoder.

use crate::error::{MscError, Result};
use crate::quant::{MAX_QSCALE, MIN_QSCALE};
use byteorder::{ByteOrder, LittleEndian};
use msc_core::CodecError;

/// Largest supported frame width or height.
pub const MAX_DIMENSION: u32 = 16384;

/// Default quantizer scale.
pub const DEFAULT_QSCALE: u8 = 8;

/// Default distance between intra frames.
pub const DEFAULT_KEYFRAME_INTERVAL: u32 = 25;

/// Codec tag at the start of the extradata.
pub const MSC_TAG: [u8; 4] = *b"MSC0";

/// Size of the extradata block.
pub const EXTRADATA_SIZE: usize = 8;

/// How frames are coded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StreamVariant {
    /// Lossless run-length coding of the raw planes.
    Rle,
    /// DCT, quantization and adaptive arithmetic coding.
    #[default]
    Transform,
}

impl StreamVariant {
    fn to_byte(self) -> u8 {
        match self {
            StreamVariant::Rle => 0,
            StreamVariant::Transform => 1,
        }
    }

    fn from_byte(value: u8) -> Option<Self> {
        match value {
            0 => Some(StreamVariant::Rle),
            1 => Some(StreamVariant::Transform),
            _ => None,
        }
    }
}

/// Encoder configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MscConfig {
    /// Frame width in luma samples.
    pub width: u32,
    /// Frame height in luma rows.
    pub height: u32,
    /// Coding variant.
    pub variant: StreamVariant,
    /// Quantizer scale (1-31, larger is coarser).
    pub qscale: u8,
    /// Frames between intra frames; 1 makes every frame intra.
    pub keyframe_interval: u32,
}

impl MscConfig {
    /// Create a transform-coded configuration with default quantization.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            variant: StreamVariant::default(),
            qscale: DEFAULT_QSCALE,
            keyframe_interval: DEFAULT_KEYFRAME_INTERVAL,
        }
    }

    /// Set the coding variant.
    pub fn with_variant(mut self, variant: StreamVariant) -> Self {
        self.variant = variant;
        self
    }

    /// Set the quantizer scale.
    pub fn with_qscale(mut self, qscale: u8) -> Self {
        self.qscale = qscale;
        self
    }

    /// Set the intra frame interval.
    pub fn with_keyframe_interval(mut self, interval: u32) -> Self {
        self.keyframe_interval = interval;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(MscError::InvalidConfig(
                "Width and height must be non-zero".into(),
            ));
        }

        if self.width > MAX_DIMENSION || self.height > MAX_DIMENSION {
            return Err(msc_core::Error::from(CodecError::DimensionsExceeded {
                width: self.width,
                height: self.height,
                max_width: MAX_DIMENSION,
                max_height: MAX_DIMENSION,
            })
            .into());
        }

        if !(MIN_QSCALE..=MAX_QSCALE).contains(&self.qscale) {
            return Err(MscError::InvalidConfig(format!(
                "qscale {} outside {}..={}",
                self.qscale, MIN_QSCALE, MAX_QSCALE
            )));
        }

        if self.keyframe_interval == 0 || self.keyframe_interval > u16::MAX as u32 {
            return Err(MscError::InvalidConfig(format!(
                "keyframe interval {} outside 1..={}",
                self.keyframe_interval,
                u16::MAX
            )));
        }

        Ok(())
    }

    /// Stream parameters the decoder needs.
    pub fn extradata(&self) -> Extradata {
        Extradata {
            qscale: self.qscale,
            variant: self.variant,
            keyframe_interval: self.keyframe_interval as u16,
        }
    }
}

/// Decoder-side stream parameters.
///
/// Layout: `"MSC0"`, qscale (u8), variant (u8), keyframe interval (u16 LE).
/// A single byte is read as a bare qscale for a transform stream with the
/// default interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extradata {
    /// Quantizer scale.
    pub qscale: u8,
    /// Coding variant.
    pub variant: StreamVariant,
    /// Frames between intra frames.
    pub keyframe_interval: u16,
}

impl Extradata {
    /// Serialize to the 8-byte form.
    pub fn to_bytes(&self) -> [u8; EXTRADATA_SIZE] {
        let mut out = [0u8; EXTRADATA_SIZE];
        out[..4].copy_from_slice(&MSC_TAG);
        out[4] = self.qscale;
        out[5] = self.variant.to_byte();
        LittleEndian::write_u16(&mut out[6..8], self.keyframe_interval);
        out
    }

    /// Parse and validate extradata.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let extradata = match data.len() {
            1 => Self {
                qscale: data[0],
                variant: StreamVariant::Transform,
                keyframe_interval: DEFAULT_KEYFRAME_INTERVAL as u16,
            },
            EXTRADATA_SIZE => {
                if data[..4] != MSC_TAG {
                    return Err(MscError::InvalidExtradata(format!(
                        "unknown tag {:02x?}",
                        &data[..4]
                    )));
                }
                let variant = StreamVariant::from_byte(data[5]).ok_or_else(|| {
                    MscError::InvalidExtradata(format!("unknown variant {}", data[5]))
                })?;
                Self {
                    qscale: data[4],
                    variant,
                    keyframe_interval: LittleEndian::read_u16(&data[6..8]),
                }
            }
            n => {
                return Err(MscError::InvalidExtradata(format!(
                    "expected 1 or {} bytes, got {}",
                    EXTRADATA_SIZE, n
                )))
            }
        };

        if !(MIN_QSCALE..=MAX_QSCALE).contains(&extradata.qscale) {
            return Err(MscError::InvalidExtradata(format!(
                "qscale {} outside {}..={}",
                extradata.qscale, MIN_QSCALE, MAX_QSCALE
            )));
        }
        if extradata.keyframe_interval == 0 {
            return Err(MscError::InvalidExtradata(
                "keyframe interval must be non-zero".into(),
            ));
        }
        Ok(extradata)
    }

    /// Configuration for a `width` x `height` stream with these parameters.
    pub fn to_config(&self, width: u32, height: u32) -> MscConfig {
        MscConfig::new(width, height)
            .with_variant(self.variant)
            .with_qscale(self.qscale)
            .with_keyframe_interval(self.keyframe_interval as u32)
    }
}
