//! # Inequality bounds
//!
//! Optional per-node bounds mined from top-level inequalities that are
//! satisfied under the current assignment. A node carries up to four
//! inclusive bounds (unsigned and signed min/max) which are normalized into
//! at most two disjoint unsigned ranges, one per signed half of the value
//! space, before they are consulted by inverse value computation.

use crate::bitvec::BitVector;

#[derive(Clone, Debug, Default)]
pub struct Bounds {
    pub min_u: Option<BitVector>,
    pub max_u: Option<BitVector>,
    pub min_s: Option<BitVector>,
    pub max_s: Option<BitVector>,
}

impl Bounds {
    pub fn reset(&mut self) {
        *self = Bounds::default();
    }

    pub fn is_unset(&self) -> bool {
        self.min_u.is_none() && self.max_u.is_none() && self.min_s.is_none() && self.max_s.is_none()
    }

    /// Intersect the stored bounds with a new inclusive `[min, max]` bound.
    /// Exclusive endpoints are tightened by one before composing; callers
    /// must not pass exclusive endpoints that would wrap.
    pub fn update(
        &mut self,
        min: &BitVector,
        max: &BitVector,
        min_is_exclusive: bool,
        max_is_exclusive: bool,
        is_signed: bool,
    ) {
        let one = BitVector::one(min.width());
        let min = if min_is_exclusive { *min + one } else { *min };
        let max = if max_is_exclusive { *max - one } else { *max };

        if is_signed {
            if self.min_s.map_or(true, |m| m.slt(&min)) {
                self.min_s = Some(min);
            }
            if self.max_s.map_or(true, |m| max.slt(&m)) {
                self.max_s = Some(max);
            }
        } else {
            if self.min_u.map_or(true, |m| m.ult(&min)) {
                self.min_u = Some(min);
            }
            if self.max_u.map_or(true, |m| max.ult(&m)) {
                self.max_u = Some(max);
            }
        }
    }

    /// Normalize the mixed signed/unsigned bounds into unsigned ranges.
    pub fn normalize(&self, width: u32) -> NormalizedRanges {
        let mut ranges = NormalizedRanges::full(width);

        let min_u = self.min_u.unwrap_or_else(|| BitVector::zero(width));
        let max_u = self.max_u.unwrap_or_else(|| BitVector::ones(width));
        ranges = ranges.intersect(&NormalizedRanges::from_unsigned(&min_u, &max_u));

        let min_s = self.min_s.unwrap_or_else(|| BitVector::min_signed(width));
        let max_s = self.max_s.unwrap_or_else(|| BitVector::max_signed(width));
        ranges.intersect(&NormalizedRanges::from_signed(&min_s, &max_s))
    }
}

/// At most two disjoint inclusive unsigned ranges: `lo` within
/// `[0, max_signed]` and `hi` within `[min_signed, ones]`. Both being `None`
/// means no value is feasible.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NormalizedRanges {
    pub lo: Option<(BitVector, BitVector)>,
    pub hi: Option<(BitVector, BitVector)>,
}

impl NormalizedRanges {
    pub fn full(width: u32) -> Self {
        Self {
            lo: Some((BitVector::zero(width), BitVector::max_signed(width))),
            hi: Some((BitVector::min_signed(width), BitVector::ones(width))),
        }
    }

    /// Split an unsigned interval at the signed boundary.
    pub fn from_unsigned(min: &BitVector, max: &BitVector) -> Self {
        assert!(min.ulte(max), "unsigned interval endpoints are reversed");
        let width = min.width();
        let smax = BitVector::max_signed(width);
        let smin = BitVector::min_signed(width);
        Self {
            lo: if min.ulte(&smax) {
                Some((*min, if max.ult(&smax) { *max } else { smax }))
            } else {
                None
            },
            hi: if smin.ulte(max) {
                Some((if smin.ult(min) { *min } else { smin }, *max))
            } else {
                None
            },
        }
    }

    /// Map a signed interval (signed order) onto the two unsigned halves.
    pub fn from_signed(min: &BitVector, max: &BitVector) -> Self {
        assert!(min.slte(max), "signed interval endpoints are reversed");
        let width = min.width();
        match (min.msb(), max.msb()) {
            // both negative: one interval in the upper unsigned half
            (true, true) => Self {
                lo: None,
                hi: Some((*min, *max)),
            },
            // both non-negative: one interval in the lower unsigned half
            (false, false) => Self {
                lo: Some((*min, *max)),
                hi: None,
            },
            // spans zero
            (true, false) => Self {
                lo: Some((BitVector::zero(width), *max)),
                hi: Some((*min, BitVector::ones(width))),
            },
            (false, true) => unreachable!("interval endpoints are ordered"),
        }
    }

    pub fn intersect(&self, other: &NormalizedRanges) -> NormalizedRanges {
        fn meet(
            a: Option<(BitVector, BitVector)>,
            b: Option<(BitVector, BitVector)>,
        ) -> Option<(BitVector, BitVector)> {
            let (a_min, a_max) = a?;
            let (b_min, b_max) = b?;
            let min = if a_min.ult(&b_min) { b_min } else { a_min };
            let max = if a_max.ult(&b_max) { a_max } else { b_max };
            if min.ulte(&max) {
                Some((min, max))
            } else {
                None
            }
        }

        NormalizedRanges {
            lo: meet(self.lo, other.lo),
            hi: meet(self.hi, other.hi),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lo.is_none() && self.hi.is_none()
    }

    pub fn contains(&self, v: &BitVector) -> bool {
        let inside = |range: &Option<(BitVector, BitVector)>| {
            range.map_or(false, |(min, max)| min.ulte(v) && v.ulte(&max))
        };
        inside(&self.lo) || inside(&self.hi)
    }

    /// The ranges as a list of inclusive unsigned intervals.
    pub fn intervals(&self) -> Vec<(BitVector, BitVector)> {
        self.lo.iter().chain(self.hi.iter()).copied().collect()
    }
}
