//! Planar YUV 4:2:0 frame buffers.
//!
//! A frame is three 8-bit planes: full-resolution luma and two chroma planes
//! subsampled by two in each direction. Chroma dimensions round up, so a
//! 17x17 frame carries 9x9 chroma planes.

use crate::error::{Error, Result};
use bitflags::bitflags;
use std::fmt;

/// Number of planes in a YUV 4:2:0 frame.
pub const NUM_PLANES: usize = 3;

/// Row alignment used for frames allocated by this crate.
pub const STRIDE_ALIGN: usize = 32;

/// Dimensions of `plane` for a frame of `width` x `height`.
pub fn plane_dimensions(width: u32, height: u32, plane: usize) -> (u32, u32) {
    if plane == 0 {
        (width, height)
    } else {
        ((width + 1) >> 1, (height + 1) >> 1)
    }
}

bitflags! {
    /// Frame flags indicating frame properties.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FrameFlags: u32 {
        /// This is a keyframe (intra coded).
        const KEYFRAME = 0x0001;
    }
}

/// A borrowed, read-only view of one plane.
#[derive(Clone, Copy)]
pub struct PlaneView<'a> {
    data: &'a [u8],
    width: u32,
    height: u32,
    stride: usize,
}

impl<'a> PlaneView<'a> {
    /// Wrap plane memory with an explicit stride.
    ///
    /// The slice must hold `height` rows of `stride` bytes, except that the
    /// final row only needs `width` bytes.
    pub fn new(data: &'a [u8], width: u32, height: u32, stride: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::invalid_param("plane dimensions must be non-zero"));
        }
        if stride < width as usize {
            return Err(Error::invalid_param(format!(
                "stride {} smaller than width {}",
                stride, width
            )));
        }
        let needed = stride * (height as usize - 1) + width as usize;
        if data.len() < needed {
            return Err(Error::BufferTooSmall {
                needed,
                available: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    /// Plane width in samples.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Plane height in rows.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes between the starts of consecutive rows.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// The visible samples of row `y`.
    pub fn row(&self, y: usize) -> &'a [u8] {
        let start = y * self.stride;
        &self.data[start..start + self.width as usize]
    }

    /// Sample at `(x, y)` with coordinates clamped to the plane edge.
    #[inline]
    pub fn sample_clamped(&self, x: usize, y: usize) -> u8 {
        let x = x.min(self.width as usize - 1);
        let y = y.min(self.height as usize - 1);
        self.data[y * self.stride + x]
    }
}

impl fmt::Debug for PlaneView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaneView")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("stride", &self.stride)
            .finish()
    }
}

/// An owned plane buffer.
#[derive(Clone)]
pub struct Plane {
    data: Vec<u8>,
    width: u32,
    height: u32,
    stride: usize,
}

impl Plane {
    /// Allocate a zeroed plane with a stride aligned to [`STRIDE_ALIGN`].
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::invalid_param("plane dimensions must be non-zero"));
        }
        let stride = (width as usize + STRIDE_ALIGN - 1) & !(STRIDE_ALIGN - 1);
        let size = stride
            .checked_mul(height as usize)
            .ok_or_else(|| Error::out_of_memory("plane size overflows usize"))?;

        let mut data = Vec::new();
        data.try_reserve_exact(size).map_err(|_| {
            Error::out_of_memory(format!("could not allocate {} byte plane", size))
        })?;
        data.resize(size, 0);

        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    /// Plane width in samples.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Plane height in rows.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes between the starts of consecutive rows.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Raw plane memory including row padding.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The visible samples of row `y`.
    pub fn row(&self, y: usize) -> &[u8] {
        let start = y * self.stride;
        &self.data[start..start + self.width as usize]
    }

    /// Mutable access to the visible samples of row `y`.
    pub fn row_mut(&mut self, y: usize) -> &mut [u8] {
        let start = y * self.stride;
        &mut self.data[start..start + self.width as usize]
    }

    /// Fill every sample, padding included.
    pub fn fill(&mut self, value: u8) {
        self.data.fill(value);
    }

    /// Borrow this plane as a view.
    pub fn view(&self) -> PlaneView<'_> {
        PlaneView {
            data: &self.data,
            width: self.width,
            height: self.height,
            stride: self.stride,
        }
    }
}

impl fmt::Debug for Plane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plane")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("stride", &self.stride)
            .finish()
    }
}

/// A borrowed YUV 4:2:0 picture, the encoder's input.
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    width: u32,
    height: u32,
    planes: [PlaneView<'a>; NUM_PLANES],
}

impl<'a> FrameView<'a> {
    /// Assemble a frame view, checking each plane against the 4:2:0 layout.
    pub fn new(width: u32, height: u32, planes: [PlaneView<'a>; NUM_PLANES]) -> Result<Self> {
        for (index, plane) in planes.iter().enumerate() {
            let (w, h) = plane_dimensions(width, height, index);
            if plane.width != w || plane.height != h {
                return Err(Error::invalid_param(format!(
                    "plane {} is {}x{}, expected {}x{}",
                    index, plane.width, plane.height, w, h
                )));
            }
        }
        Ok(Self {
            width,
            height,
            planes,
        })
    }

    /// Build a view from three slices and their strides.
    pub fn from_slices(
        width: u32,
        height: u32,
        data: [&'a [u8]; NUM_PLANES],
        strides: [usize; NUM_PLANES],
    ) -> Result<Self> {
        let mut views = Vec::with_capacity(NUM_PLANES);
        for index in 0..NUM_PLANES {
            let (w, h) = plane_dimensions(width, height, index);
            views.push(PlaneView::new(data[index], w, h, strides[index])?);
        }
        Self::new(width, height, [views[0], views[1], views[2]])
    }

    /// Frame width in luma samples.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Frame height in luma rows.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get a plane view.
    pub fn plane(&self, index: usize) -> &PlaneView<'a> {
        &self.planes[index]
    }
}

/// An owned YUV 4:2:0 frame.
#[derive(Clone)]
pub struct Frame {
    width: u32,
    height: u32,
    planes: [Plane; NUM_PLANES],
    /// Frame flags.
    pub flags: FrameFlags,
    /// Presentation timestamp, if known.
    pub pts: Option<i64>,
}

impl Frame {
    /// Allocate a zeroed frame.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let (cw, ch) = plane_dimensions(width, height, 1);
        Ok(Self {
            width,
            height,
            planes: [Plane::new(width, height)?, Plane::new(cw, ch)?, Plane::new(cw, ch)?],
            flags: FrameFlags::empty(),
            pts: None,
        })
    }

    /// Copy a borrowed frame into newly allocated storage.
    pub fn from_view(view: &FrameView<'_>) -> Result<Self> {
        let mut frame = Self::new(view.width(), view.height())?;
        for index in 0..NUM_PLANES {
            let src = view.plane(index);
            let dst = &mut frame.planes[index];
            for y in 0..src.height() as usize {
                dst.row_mut(y).copy_from_slice(src.row(y));
            }
        }
        Ok(frame)
    }

    /// Get the frame width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the frame height.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Check if this is a keyframe.
    pub fn is_keyframe(&self) -> bool {
        self.flags.contains(FrameFlags::KEYFRAME)
    }

    /// Get a plane.
    pub fn plane(&self, index: usize) -> &Plane {
        &self.planes[index]
    }

    /// Get a mutable plane.
    pub fn plane_mut(&mut self, index: usize) -> &mut Plane {
        &mut self.planes[index]
    }

    /// Get the stride (bytes per row) for a plane.
    pub fn stride(&self, plane: usize) -> usize {
        self.planes[plane].stride
    }

    /// Fill all planes with a value.
    pub fn fill(&mut self, value: u8) {
        for plane in &mut self.planes {
            plane.fill(value);
        }
    }

    /// Borrow the frame as encoder input.
    pub fn view(&self) -> FrameView<'_> {
        FrameView {
            width: self.width,
            height: self.height,
            planes: [
                self.planes[0].view(),
                self.planes[1].view(),
                self.planes[2].view(),
            ],
        }
    }

    /// Compare the visible samples of two frames, ignoring stride padding.
    pub fn same_pixels(&self, other: &Frame) -> bool {
        if self.width != other.width || self.height != other.height {
            return false;
        }
        (0..NUM_PLANES).all(|index| {
            let (a, b) = (&self.planes[index], &other.planes[index]);
            (0..a.height as usize).all(|y| a.row(y) == b.row(y))
        })
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("pts", &self.pts)
            .field("flags", &self.flags)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plane_dimensions_round_up() {
        assert_eq!(plane_dimensions(17, 17, 0), (17, 17));
        assert_eq!(plane_dimensions(17, 17, 1), (9, 9));
        assert_eq!(plane_dimensions(16, 15, 2), (8, 8));
    }

    #[test]
    fn test_frame_creation() {
        let frame = Frame::new(1920, 1080).unwrap();
        assert_eq!(frame.width(), 1920);
        assert_eq!(frame.height(), 1080);
        assert_eq!(frame.plane(1).width(), 960);
        assert_eq!(frame.plane(2).height(), 540);
    }

    #[test]
    fn test_stride_alignment() {
        let frame = Frame::new(100, 100).unwrap();
        assert_eq!(frame.stride(0) % STRIDE_ALIGN, 0);
        assert!(frame.stride(0) >= 100);
        assert!(frame.stride(1) >= 50);
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(Frame::new(0, 16).is_err());
        assert!(Plane::new(16, 0).is_err());
    }

    #[test]
    fn test_plane_view_validation() {
        let data = vec![0u8; 40];
        assert!(PlaneView::new(&data, 8, 5, 8).is_ok());
        // Last row only needs `width` bytes: 3 * 10 + 8 = 38.
        let short = vec![0u8; 38];
        assert!(PlaneView::new(&short, 8, 4, 10).is_ok());
        assert!(PlaneView::new(&short, 8, 4, 11).is_err());
        assert!(PlaneView::new(&data, 8, 5, 7).is_err());
        assert!(PlaneView::new(&data, 8, 6, 8).is_err());
    }

    #[test]
    fn test_sample_clamped() {
        let data: Vec<u8> = (0..16).collect();
        let view = PlaneView::new(&data, 4, 4, 4).unwrap();
        assert_eq!(view.sample_clamped(1, 1), 5);
        assert_eq!(view.sample_clamped(10, 0), 3);
        assert_eq!(view.sample_clamped(10, 10), 15);
    }

    #[test]
    fn test_view_roundtrip() {
        let luma: Vec<u8> = (0..64).collect();
        let chroma = vec![128u8; 16];
        let view = FrameView::from_slices(8, 8, [luma.as_slice(), chroma.as_slice(), chroma.as_slice()], [8, 4, 4]).unwrap();
        let frame = Frame::from_view(&view).unwrap();

        assert_eq!(frame.plane(0).row(1), &luma[8..16]);
        assert!(frame.same_pixels(&Frame::from_view(&frame.view()).unwrap()));
    }

    #[test]
    fn test_view_rejects_wrong_chroma_size() {
        let luma = vec![0u8; 64];
        let chroma = vec![0u8; 64];
        let u = PlaneView::new(&chroma, 8, 8, 8).unwrap();
        let y = PlaneView::new(&luma, 8, 8, 8).unwrap();
        assert!(FrameView::new(8, 8, [y, u, u]).is_err());
    }
}
