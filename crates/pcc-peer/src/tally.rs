use std::fmt;

/// Lowest printable byte value (space).
pub const MIN_PRINTABLE: u8 = 32;
/// Highest printable byte value (tilde).
pub const MAX_PRINTABLE: u8 = 126;
/// Number of printable byte values.
pub const PRINTABLE_COUNT: usize = (MAX_PRINTABLE - MIN_PRINTABLE + 1) as usize;

/// One counter per printable ASCII value.
///
/// Used both for the per-connection counts and for the server-wide
/// aggregate. Counters are `u32` to match the wire width and wrap on
/// overflow.
#[derive(Clone, PartialEq, Eq)]
pub struct CharTally {
    counts: [u32; PRINTABLE_COUNT],
}

impl CharTally {
    pub fn new() -> Self {
        Self {
            counts: [0; PRINTABLE_COUNT],
        }
    }

    /// Whether `byte` lies in the printable range `[32, 126]`.
    pub fn is_printable(byte: u8) -> bool {
        (MIN_PRINTABLE..=MAX_PRINTABLE).contains(&byte)
    }

    /// Count every printable byte of `chunk`. Returns how many there were.
    pub fn record(&mut self, chunk: &[u8]) -> u32 {
        let mut printable = 0u32;
        for &byte in chunk {
            if Self::is_printable(byte) {
                let slot = &mut self.counts[(byte - MIN_PRINTABLE) as usize];
                *slot = slot.wrapping_add(1);
                printable += 1;
            }
        }
        printable
    }

    /// Add `other` into `self`, value by value.
    pub fn merge(&mut self, other: &CharTally) {
        for (total, local) in self.counts.iter_mut().zip(other.counts.iter()) {
            *total = total.wrapping_add(*local);
        }
    }

    /// Count for a single byte value. Non-printable values are always 0.
    pub fn get(&self, byte: u8) -> u32 {
        if Self::is_printable(byte) {
            self.counts[(byte - MIN_PRINTABLE) as usize]
        } else {
            0
        }
    }

    /// Sum of all counters.
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| u64::from(c)).sum()
    }

    /// Every printable value with its count, ascending from space to tilde.
    pub fn iter(&self) -> impl Iterator<Item = CharCount> + '_ {
        (MIN_PRINTABLE..=MAX_PRINTABLE).map(move |byte| CharCount {
            byte,
            count: self.get(byte),
        })
    }
}

impl Default for CharTally {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CharTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().filter(|c| c.count > 0).map(|c| (c.glyph(), c.count)))
            .finish()
    }
}

/// A single line of the shutdown report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharCount {
    pub byte: u8,
    pub count: u32,
}

impl CharCount {
    pub fn glyph(&self) -> char {
        char::from(self.byte)
    }
}

impl fmt::Display for CharCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "char '{}' : {} times", self.glyph(), self.count)
    }
}
