//! Macroblock geometry and block transfer between planes and blocks.
//!
//! A macroblock is 16x16 luma plus the co-located 8x8 of each chroma plane,
//! split into six blocks:
//!
//! ```text
//! +---+---+
//! | 0 | 1 |   4 = U
//! +---+---+   5 = V
//! | 2 | 3 |
//! +---+---+
//! ```
//!
//! Reads clamp to the plane edge so partial macroblocks replicate the last
//! row and column; writes drop samples outside the plane.

use crate::block::Block;
use crate::tables::{BLOCKS_PER_MB, BLOCK_SIZE, MB_SIZE};
use msc_core::frame::{Frame, FrameView, Plane, PlaneView};

/// Macroblock columns and rows covering a `width` x `height` frame.
pub fn mb_grid(width: u32, height: u32) -> (usize, usize) {
    (
        (width as usize).div_ceil(MB_SIZE),
        (height as usize).div_ceil(MB_SIZE),
    )
}

/// Plane index and top-left sample of `block` in macroblock `(mb_x, mb_y)`.
#[inline]
pub fn block_origin(block: usize, mb_x: usize, mb_y: usize) -> (usize, usize, usize) {
    debug_assert!(block < BLOCKS_PER_MB);
    if block < 4 {
        (
            0,
            mb_x * MB_SIZE + (block & 1) * BLOCK_SIZE,
            mb_y * MB_SIZE + (block >> 1) * BLOCK_SIZE,
        )
    } else {
        (block - 3, mb_x * BLOCK_SIZE, mb_y * BLOCK_SIZE)
    }
}

/// Copy the 8x8 block at `(x, y)` out of `plane`, replicating edges.
pub fn get_block(plane: &PlaneView<'_>, x: usize, y: usize, block: &mut Block) {
    for by in 0..BLOCK_SIZE {
        for bx in 0..BLOCK_SIZE {
            block[by * BLOCK_SIZE + bx] = plane.sample_clamped(x + bx, y + by) as i16;
        }
    }
}

/// Store `block` at `(x, y)` in `plane`, clamped to 0..=255.
pub fn put_block(plane: &mut Plane, x: usize, y: usize, block: &Block) {
    let width = plane.width() as usize;
    let height = plane.height() as usize;
    if x >= width {
        return;
    }
    let cols = BLOCK_SIZE.min(width - x);
    for by in 0..BLOCK_SIZE.min(height.saturating_sub(y)) {
        let row = &mut plane.row_mut(y + by)[x..x + cols];
        let src = &block[by * BLOCK_SIZE..by * BLOCK_SIZE + cols];
        for (dst, &s) in row.iter_mut().zip(src) {
            *dst = s.clamp(0, 255) as u8;
        }
    }
}

/// Read the six blocks of a macroblock.
pub fn get_blocks(
    frame: &FrameView<'_>,
    mb_x: usize,
    mb_y: usize,
    blocks: &mut [Block; BLOCKS_PER_MB],
) {
    for (i, block) in blocks.iter_mut().enumerate() {
        let (plane, x, y) = block_origin(i, mb_x, mb_y);
        get_block(frame.plane(plane), x, y, block);
    }
}

/// Write the six blocks of a macroblock.
pub fn put_blocks(frame: &mut Frame, mb_x: usize, mb_y: usize, blocks: &[Block; BLOCKS_PER_MB]) {
    for (i, block) in blocks.iter().enumerate() {
        let (plane, x, y) = block_origin(i, mb_x, mb_y);
        put_block(frame.plane_mut(plane), x, y, block);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::BLOCK_COEFFS;

    #[test]
    fn test_grid_rounds_up() {
        assert_eq!(mb_grid(16, 16), (1, 1));
        assert_eq!(mb_grid(17, 17), (2, 2));
        assert_eq!(mb_grid(1920, 1080), (120, 68));
        assert_eq!(mb_grid(1, 1), (1, 1));
    }

    #[test]
    fn test_block_origins() {
        assert_eq!(block_origin(0, 1, 2), (0, 16, 32));
        assert_eq!(block_origin(1, 1, 2), (0, 24, 32));
        assert_eq!(block_origin(2, 1, 2), (0, 16, 40));
        assert_eq!(block_origin(3, 1, 2), (0, 24, 40));
        assert_eq!(block_origin(4, 1, 2), (1, 8, 16));
        assert_eq!(block_origin(5, 1, 2), (2, 8, 16));
    }

    #[test]
    fn test_edge_blocks_replicate() {
        let mut frame = Frame::new(17, 17).unwrap();
        for y in 0..17 {
            for (x, px) in frame.plane_mut(0).row_mut(y).iter_mut().enumerate() {
                *px = (x + y * 8) as u8;
            }
        }
        let view = frame.view();
        let mut blocks = [[0i16; BLOCK_COEFFS]; BLOCKS_PER_MB];
        get_blocks(&view, 1, 1, &mut blocks);

        // Block 0 of macroblock (1, 1) starts on the last sample.
        let corner = (16 + 16 * 8) as i16;
        assert!(blocks[0].iter().all(|&s| s == corner));
        // Block 3 lies wholly outside and clamps to the same sample.
        assert!(blocks[3].iter().all(|&s| s == corner));
    }

    #[test]
    fn test_put_block_stays_in_bounds() {
        let mut frame = Frame::new(17, 17).unwrap();
        let mut blocks = [[300i16; BLOCK_COEFFS]; BLOCKS_PER_MB];
        blocks[4] = [-5; BLOCK_COEFFS];
        put_blocks(&mut frame, 1, 1, &blocks);

        assert_eq!(frame.plane(0).row(16)[16], 255);
        assert_eq!(frame.plane(0).row(16)[15], 0);
        assert_eq!(frame.plane(0).row(15)[16], 0);
        assert_eq!(frame.plane(1).row(8)[8], 0);
        assert_eq!(frame.plane(2).row(8)[8], 255);
    }
}
