//! Frame pool for decode-side buffer reuse.
//!
//! Decoders hand out frames from the pool; callers that are done with a
//! frame can return it so the next decode skips the allocation.

use crate::error::Result;
use crate::frame::{Frame, FrameFlags};
use std::collections::VecDeque;

/// A pool of reusable frames of one fixed size.
#[derive(Debug)]
pub struct FramePool {
    /// Available frames.
    available: VecDeque<Frame>,
    /// Frame dimensions.
    width: u32,
    height: u32,
    /// Maximum number of frames to keep in the pool.
    max_size: usize,
    /// Total frames allocated (for statistics).
    total_allocated: usize,
}

impl FramePool {
    /// Create a new frame pool.
    pub fn new(width: u32, height: u32, max_size: usize) -> Self {
        Self {
            available: VecDeque::with_capacity(max_size),
            width,
            height,
            max_size,
            total_allocated: 0,
        }
    }

    /// Acquire a frame from the pool.
    ///
    /// Returns a pooled frame if one is available, otherwise allocates a new
    /// one. Pooled frames keep their old pixels.
    pub fn acquire(&mut self) -> Result<Frame> {
        if let Some(mut frame) = self.available.pop_front() {
            frame.flags = FrameFlags::empty();
            frame.pts = None;
            Ok(frame)
        } else {
            let frame = Frame::new(self.width, self.height)?;
            self.total_allocated += 1;
            Ok(frame)
        }
    }

    /// Release a frame back to the pool.
    pub fn release(&mut self, frame: Frame) {
        if self.available.len() < self.max_size
            && frame.width() == self.width
            && frame.height() == self.height
        {
            self.available.push_back(frame);
        }
        // Otherwise, the frame is dropped
    }

    /// Get the number of available frames.
    pub fn available(&self) -> usize {
        self.available.len()
    }

    /// Get the total number of allocated frames.
    pub fn total_allocated(&self) -> usize {
        self.total_allocated
    }
}
