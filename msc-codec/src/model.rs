//! Adaptive order-0 frequency models.
//!
//! A model keeps cumulative counts for an alphabet of `2^bits` symbols plus
//! a virtual index -1 whose total is always zero. Symbol `c` owns the count
//! range `[totals[c], totals[c + 1])` and the model scale is
//! `totals[len]`. Every coded symbol bumps its own count, so the encoder and
//! decoder must update their models in exactly the same order.

use crate::arith::Symbol;

/// Largest cumulative total a model may reach before it is rescaled.
pub const MAXIMUM_SCALE: u16 = 16383;

/// Widest alphabet a model supports.
///
/// `2^12 + 1` is the largest initial total that stays below
/// [`MAXIMUM_SCALE`] with room to adapt.
pub const MAX_MODEL_BITS: u32 = 12;

/// Number of coefficient models, one per magnitude bucket.
pub const NUM_ARITH_MODELS: usize = 10;

/// Alphabet width of the DC model.
pub const ARITH_CODER_BITS: u32 = 11;

/// Alphabet width of the last-nonzero-position model (64 positions).
pub const LAST_POSITION_BITS: u32 = 6;

/// Alphabet width of the model-index side channel.
pub const MODEL_INDEX_BITS: u32 = 4;

/// An adaptive cumulative frequency table.
#[derive(Debug, Clone)]
pub struct FrequencyModel {
    /// Cumulative totals for indices -1..=len, shifted by one slot.
    totals: Vec<u16>,
    bits: u32,
    len: usize,
}

impl FrequencyModel {
    /// Create a model over `2^bits` symbols with every count set to one.
    ///
    /// # Panics
    ///
    /// Panics if `bits` is zero or greater than [`MAX_MODEL_BITS`]. Model
    /// widths are compile-time constants of the codec.
    pub fn new(bits: u32) -> Self {
        assert!(
            (1..=MAX_MODEL_BITS).contains(&bits),
            "model width {} outside 1..={}",
            bits,
            MAX_MODEL_BITS
        );
        let len = 1usize << bits;
        // totals[i] = i + 1 for i in -1..=len
        let totals = (0..=len as u16 + 1).collect();
        Self { totals, bits, len }
    }

    /// Alphabet width in bits.
    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// Number of symbols in the alphabet.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Cumulative totals for indices -1..=len.
    pub fn totals(&self) -> &[u16] {
        &self.totals
    }

    /// Total count of the model, the denominator of every symbol range.
    #[inline]
    pub fn scale(&self) -> u16 {
        self.totals[self.len + 1]
    }

    /// Count range of `symbol`.
    #[inline]
    pub fn symbol(&self, symbol: usize) -> Symbol {
        debug_assert!(symbol < self.len, "symbol {} outside alphabet", symbol);
        Symbol {
            low_count: self.totals[symbol + 1],
            high_count: self.totals[symbol + 2],
            scale: self.scale(),
        }
    }

    /// Find the symbol whose range contains `count`.
    ///
    /// Scans from the top of the table down to the first index whose total
    /// is `<= count`. Returns `None` when `count` lands on the virtual -1
    /// slot or at/above the scale, neither of which a valid stream produces.
    pub fn find(&self, count: u16) -> Option<(usize, Symbol)> {
        let mut slot = self.len + 1;
        while count < self.totals[slot] {
            slot -= 1;
        }
        if slot == 0 || slot == self.len + 1 {
            return None;
        }
        Some((
            slot - 1,
            Symbol {
                low_count: self.totals[slot],
                high_count: self.totals[slot + 1],
                scale: self.scale(),
            },
        ))
    }

    /// Count one occurrence of `symbol`, rescaling at [`MAXIMUM_SCALE`].
    pub fn update(&mut self, symbol: usize) {
        debug_assert!(symbol < self.len, "symbol {} outside alphabet", symbol);
        for total in &mut self.totals[symbol + 2..] {
            *total += 1;
        }
        if self.scale() >= MAXIMUM_SCALE {
            self.rescale();
        }
    }

    /// Halve every total while keeping each symbol range at least one wide.
    fn rescale(&mut self) {
        for i in 1..self.totals.len() {
            self.totals[i] /= 2;
            if self.totals[i] <= self.totals[i - 1] {
                self.totals[i] = self.totals[i - 1] + 1;
            }
        }
    }
}

/// Value added to a coefficient in bucket `index` to make it non-negative.
#[inline]
pub fn coefficient_offset(index: usize) -> i32 {
    (1 << (index + 1)) - 1
}

/// Value added to a DC coefficient to make it non-negative.
pub const DC_OFFSET: i32 = (1 << (ARITH_CODER_BITS - 1)) - 1;

/// The per-stream model state of a codec context.
///
/// Created once and mutated by every coded block for the lifetime of the
/// stream; it is never reset between frames.
#[derive(Debug, Clone)]
pub struct ModelSet {
    /// Position of the last nonzero coefficient in scan order.
    pub last_position: FrequencyModel,
    /// Which coefficient model codes the AC coefficients of a block.
    pub model_index: FrequencyModel,
    /// DC coefficients.
    pub dc: FrequencyModel,
    /// AC coefficient models; model `i` codes magnitudes below `2^(i+1)`.
    pub coefficients: [FrequencyModel; NUM_ARITH_MODELS],
}

impl ModelSet {
    /// Create the initial model state of a stream.
    pub fn new() -> Self {
        Self {
            last_position: FrequencyModel::new(LAST_POSITION_BITS),
            model_index: FrequencyModel::new(MODEL_INDEX_BITS),
            dc: FrequencyModel::new(ARITH_CODER_BITS),
            coefficients: std::array::from_fn(|i| FrequencyModel::new(i as u32 + 2)),
        }
    }
}

impl Default for ModelSet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_strictly_increasing(model: &FrequencyModel) {
        let totals = model.totals();
        for i in 1..totals.len() {
            assert!(
                totals[i - 1] < totals[i],
                "totals[{}] = {} not below totals[{}] = {}",
                i - 1,
                totals[i - 1],
                i,
                totals[i]
            );
        }
        assert!(model.scale() <= MAXIMUM_SCALE);
    }

    #[test]
    fn test_initial_distribution() {
        let model = FrequencyModel::new(3);
        assert_eq!(model.len(), 8);
        assert_eq!(model.totals(), &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
        assert_eq!(model.scale(), 9);

        let s = model.symbol(0);
        assert_eq!((s.low_count, s.high_count, s.scale), (1, 2, 9));
        let s = model.symbol(7);
        assert_eq!((s.low_count, s.high_count, s.scale), (8, 9, 9));
    }

    #[test]
    fn test_update_widens_symbol() {
        let mut model = FrequencyModel::new(2);
        model.update(1);
        model.update(1);

        let s = model.symbol(1);
        assert_eq!(s.high_count - s.low_count, 3);
        assert_eq!(model.scale(), 7);
        assert_eq!(model.symbol(0).high_count - model.symbol(0).low_count, 1);
    }

    #[test]
    fn test_find_matches_symbol() {
        let mut model = FrequencyModel::new(4);
        for s in [3, 3, 7, 0, 15, 3] {
            model.update(s);
        }
        for symbol in 0..model.len() {
            let range = model.symbol(symbol);
            for count in range.low_count..range.high_count {
                let (found, found_range) = model.find(count).unwrap();
                assert_eq!(found, symbol);
                assert_eq!(found_range, range);
            }
        }
    }

    #[test]
    fn test_find_rejects_escape_and_scale() {
        let model = FrequencyModel::new(2);
        // Count 0 falls in the virtual -1 slot.
        assert!(model.find(0).is_none());
        assert!(model.find(model.scale()).is_none());
        assert!(model.find(u16::MAX).is_none());
    }

    #[test]
    fn test_rescale_keeps_invariants() {
        let mut model = FrequencyModel::new(5);
        let mut rescales = 0;
        let mut last_scale = model.scale();
        while rescales < 2 {
            model.update(31);
            if model.scale() < last_scale {
                rescales += 1;
                assert_strictly_increasing(&model);
            }
            last_scale = model.scale();
        }
        assert_strictly_increasing(&model);
    }

    #[test]
    fn test_rescale_with_widest_model() {
        let mut model = FrequencyModel::new(MAX_MODEL_BITS);
        for i in 0..20_000usize {
            model.update((i * 7) % 3);
        }
        assert_strictly_increasing(&model);
    }

    #[test]
    #[should_panic]
    fn test_zero_width_model_panics() {
        let _ = FrequencyModel::new(0);
    }

    #[test]
    fn test_model_set_layout() {
        let models = ModelSet::new();
        assert_eq!(models.last_position.len(), 64);
        assert_eq!(models.model_index.len(), 16);
        assert_eq!(models.dc.len(), 2048);
        for (i, model) in models.coefficients.iter().enumerate() {
            // Offset values span -offset..=offset, all inside the alphabet.
            assert!(2 * coefficient_offset(i) < model.len() as i32);
        }
        assert_eq!(DC_OFFSET, 1023);
    }
}
