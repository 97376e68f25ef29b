//! Y. Hatanaka numerical differential algorithm
use crate::error::FormatError;

/// Default compression order, as used by `RNX2CRX`
pub const DEFAULT_ORDER: usize = 3;

/// Highest compression order we accept
pub const MAX_ORDER: usize = 7;

/// [DataArc] recovers numerical data that was compressed as Nth order
/// differences of the true sequence, as designed by Y. Hatanaka.
/// It holds a stack of `order` partial sums: slot 0 is the recovered
/// value, slot `order - 1` the highest order difference.
#[derive(Debug, Clone, PartialEq)]
pub struct DataArc {
    order: usize,
    /// Number of differences absorbed so far, saturates at `order`
    index: usize,
    data: Vec<i64>,
}

impl Default for DataArc {
    fn default() -> Self {
        Self::new(DEFAULT_ORDER)
    }
}

impl DataArc {
    /// Builds a new [DataArc] that has not absorbed anything yet.
    /// `order` is brought back to 1..=[MAX_ORDER].
    pub fn new(order: usize) -> Self {
        Self {
            order: order.clamp(1, MAX_ORDER),
            index: 0,
            data: Vec::with_capacity(MAX_ORDER),
        }
    }

    /// (Re)initializes this arc at given `order`, seeded with absolute `value`.
    /// This is the `k&v` token. `order` is brought back to 1..=[MAX_ORDER].
    pub fn force_init(&mut self, order: usize, value: i64) {
        self.order = order.clamp(1, MAX_ORDER);
        self.data.clear();
        self.data.push(value);
        self.index = 1;
    }

    /// Returns true once this arc has absorbed at least one value
    pub fn is_initialized(&self) -> bool {
        self.index > 0
    }

    /// Current compression order
    pub fn order(&self) -> usize {
        self.order
    }

    /// Absorbs the next difference and returns the recovered value.
    /// Fails when the recovered sums no longer fit on 64 bits.
    pub fn update(&mut self, diff: i64) -> Result<i64, FormatError> {
        if self.index < self.order {
            // still building the difference pyramid
            self.data.push(diff);
            self.index += 1;
        } else {
            let top = &mut self.data[self.order - 1];
            *top = top.checked_add(diff).ok_or(FormatError::ArcOverflow)?;
        }
        // integrate downwards
        for slot in (0..self.index - 1).rev() {
            self.data[slot] = self.data[slot]
                .checked_add(self.data[slot + 1])
                .ok_or(FormatError::ArcOverflow)?;
        }
        Ok(self.data[0])
    }

    /// Returns the recovered value, 0 prior any update
    pub fn value(&self) -> i64 {
        self.data.first().copied().unwrap_or(0)
    }
}
