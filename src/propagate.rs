//! # Operator propagation
//!
//! For every operator kind this module answers two questions about an
//! unknown operand `x` at position `pos_x`, a target value `t` and the
//! current values `s` of the remaining operands:
//!
//! - *invertibility*: is there a value for `x` within its ternary domain
//!   that makes the operator produce `t` given `s`? If so, construct one.
//! - *consistency*: is there a value for `x` within its domain that could
//!   produce `t` for *some* choice of the other operands? If so, construct
//!   one.
//!
//! Both checks are constructive: a `Some` answer always carries a witness
//! that matches the domain's constant bits. Where a condition contains an
//! existential that can not be resolved exactly (remainder and division
//! corner cases on wide domains), the search for a witness is bounded and
//! failure is reported as "not invertible" rather than guessed.

#![allow(clippy::many_single_char_names)]

use crate::bitvec::BitVector;
use crate::bounds::NormalizedRanges;
use crate::node::BVOperator;
use crate::rng::Rng;
use crate::ternary::TernaryBitVector;
use divisors::get_divisors;

/// Probability (permille) for keeping the current value of don't-care bits
/// when reconstructing a full-width value around an extracted slice.
const PROB_KEEP: u32 = 500;

/// Enumeration threshold for existential witness searches.
const MAX_ENUMERATE: u64 = 4096;

/// Bounded number of random tries for witness searches beyond the
/// enumeration threshold.
const NTRIES: u32 = 64;

pub(crate) fn eval_with(
    op: BVOperator,
    operands: &[BitVector],
    pos_x: u32,
    v: &BitVector,
) -> BitVector {
    let mut operands = operands.to_vec();
    operands[pos_x as usize] = *v;
    op.evaluate(&operands)
}

/// Compute an inverse value for `x` at `pos_x`, `None` iff the
/// invertibility condition does not hold.
pub fn inverse_value(
    rng: &mut Rng,
    op: BVOperator,
    x: &TernaryBitVector,
    operands: &[BitVector],
    t: &BitVector,
    pos_x: u32,
    bounds: Option<&NormalizedRanges>,
) -> Option<BitVector> {
    let w = x.width();

    // A fixed domain leaves a single candidate.
    if x.is_fixed() {
        let v = x.lo();
        return (eval_with(op, operands, pos_x, &v) == *t).then_some(v);
    }

    match op {
        BVOperator::Add => {
            let s = &operands[1 - pos_x as usize];
            let v = *t - *s;
            x.mcb(&v).then_some(v)
        }
        BVOperator::Xor => {
            let s = &operands[1 - pos_x as usize];
            let v = *s ^ *t;
            x.mcb(&v).then_some(v)
        }
        BVOperator::Not => {
            let v = !*t;
            x.mcb(&v).then_some(v)
        }
        BVOperator::And => {
            let s = operands[1 - pos_x as usize];
            // constant bits come from the domain, bits where s is 1 must
            // reproduce t, the remainder is arbitrary
            let fixed_bit_mask = x.constant_bit_mask() | s;
            let fixed_bits = x.constant_bits() | (s & *t);
            let v = (BitVector::random(rng, w) & !fixed_bit_mask) | fixed_bits;
            ((v & s) == *t && x.mcb(&v)).then_some(v)
        }
        BVOperator::Eq => {
            let s = operands[1 - pos_x as usize];
            if t.is_true() {
                return x.mcb(&s).then_some(s);
            }
            let r = x.sample(rng);
            if r != s {
                return Some(r);
            }
            // the sample collided with s; flipping an unknown bit keeps the
            // constant bits intact and guarantees disequality
            let free = x.lo() ^ x.hi();
            Some(r ^ (BitVector::one(w) << free.ctz()))
        }
        BVOperator::Concat => {
            let s = operands[1 - pos_x as usize];
            let (ws, wt) = (s.width(), t.width());
            let tx = if pos_x == 0 {
                if t.extract(ws - 1, 0) != s {
                    return None;
                }
                t.extract(wt - 1, ws)
            } else {
                if t.extract(wt - 1, wt - ws) != s {
                    return None;
                }
                t.extract(w - 1, 0)
            };
            x.mcb(&tx).then_some(tx)
        }
        BVOperator::Extract { hi, lo } => extract_value(rng, x, &operands[0], hi, lo, t),
        BVOperator::Sext { n } => sext_value(x, n, t),
        BVOperator::Ite => {
            match pos_x {
                0 => {
                    // pick a condition value that selects a branch already
                    // carrying the target
                    let mut candidates = Vec::new();
                    if operands[1] == *t {
                        candidates.push(BitVector::one(1));
                    }
                    if operands[2] == *t {
                        candidates.push(BitVector::zero(1));
                    }
                    candidates.retain(|c| x.mcb(c));
                    if candidates.is_empty() {
                        None
                    } else {
                        Some(rng.pick_from_slice(&candidates))
                    }
                }
                1 => (operands[0].is_true() && x.mcb(t)).then_some(*t),
                _ => (operands[0].is_false() && x.mcb(t)).then_some(*t),
            }
        }
        BVOperator::Mul => {
            let s = operands[1 - pos_x as usize];
            if s.is_zero() {
                return t.is_zero().then(|| x.sample(rng));
            }
            if ((-s | s) & *t) != *t {
                return None;
            }
            let c = s.ctz();
            if c == 0 {
                let v = *t * s.modinverse().expect("odd values have a modular inverse");
                return x.mcb(&v).then_some(v);
            }
            // s = s' * 2^c with s' odd: the low w-c bits of x are determined
            // modulo 2^(w-c), the top c bits are arbitrary
            let y = (*t >> c) * (s >> c).modinverse().expect("odd values have a modular inverse");
            let low = y.extract(w - c - 1, 0);
            if !x.extract(w - c - 1, 0).mcb(&low) {
                return None;
            }
            let high = x.extract(w - 1, w - c).sample(rng);
            Some(high.concat(&low))
        }
        BVOperator::Shl => {
            let s = operands[1 - pos_x as usize];
            if pos_x == 0 {
                inverse_shl_pos0(rng, x, s.value(), t)
            } else {
                if t.is_zero() {
                    if s.is_zero() {
                        return Some(x.sample(rng));
                    }
                    let min_shift = BitVector::new(u64::from(w - s.ctz()), w);
                    return x.sample_in_range(rng, &min_shift, &BitVector::ones(w));
                }
                if s.ctz() > t.ctz() {
                    return None;
                }
                let shift = t.ctz() - s.ctz();
                let v = BitVector::new(u64::from(shift), w);
                ((s << shift) == *t && x.mcb(&v)).then_some(v)
            }
        }
        BVOperator::Shr => {
            let s = operands[1 - pos_x as usize];
            if pos_x == 0 {
                inverse_shr_pos0(rng, x, s.value(), t)
            } else {
                inverse_shr_pos1(rng, x, &s, t)
            }
        }
        BVOperator::Ashr => {
            let s = operands[1 - pos_x as usize];
            if pos_x == 0 {
                inverse_ashr_pos0(rng, x, s.value(), t)
            } else if s.msb() {
                // s >>a x = t with a negative s behaves like !s >> x = !t
                inverse_shr_pos1(rng, x, &!s, &!*t)
            } else {
                inverse_shr_pos1(rng, x, &s, t)
            }
        }
        BVOperator::Udiv => {
            let s = operands[1 - pos_x as usize];
            let one = BitVector::one(w);
            if pos_x == 0 {
                if s.is_zero() {
                    // x / 0 = ones by convention
                    return t.is_ones().then(|| x.sample(rng));
                }
                if t.is_zero() {
                    return x.sample_in_range(rng, &BitVector::zero(w), &(s - one));
                }
                if s.umulo(t) {
                    return None;
                }
                let lo = s * *t;
                let rem = s - one;
                let hi = if lo.uaddo(&rem) { BitVector::ones(w) } else { lo + rem };
                x.sample_in_range(rng, &lo, &hi)
            } else {
                if t.is_ones() {
                    // s / 0 = ones always, s / 1 = ones iff s = ones
                    let hi = if s.is_ones() { one } else { BitVector::zero(w) };
                    return x.sample_in_range(rng, &BitVector::zero(w), &hi);
                }
                if t.is_zero() {
                    if s.is_ones() {
                        return None;
                    }
                    return x.sample_in_range(rng, &(s + one), &BitVector::ones(w));
                }
                let lo = s.udiv(&(*t + one)) + one;
                let hi = s.udiv(t);
                if hi.ult(&lo) {
                    return None;
                }
                x.sample_in_range(rng, &lo, &hi)
            }
        }
        BVOperator::Urem => {
            let s = operands[1 - pos_x as usize];
            let one = BitVector::one(w);
            let ones = BitVector::ones(w);
            if pos_x == 0 {
                if s.is_zero() {
                    // x % 0 = x by convention
                    return x.mcb(t).then_some(*t);
                }
                if !t.ult(&s) {
                    return None;
                }
                // candidates are t, t + s, t + 2s, ... up to ones
                let k_max = (ones - *t).udiv(&s).value();
                if k_max <= MAX_ENUMERATE {
                    let candidates: Vec<BitVector> = (0..=k_max)
                        .map(|k| BitVector::new(k, w) * s + *t)
                        .filter(|v| x.mcb(v))
                        .collect();
                    if candidates.is_empty() {
                        None
                    } else {
                        Some(rng.pick_from_slice(&candidates))
                    }
                } else {
                    for _ in 0..NTRIES {
                        let v = BitVector::new(rng.pick_uniform(0, k_max), w) * s + *t;
                        if x.mcb(&v) {
                            return Some(v);
                        }
                    }
                    x.mcb(t).then_some(*t)
                }
            } else {
                if s == *t {
                    // s % 0 = s, and s % x = s for every x > s
                    let mut ranges = vec![(BitVector::zero(w), BitVector::zero(w))];
                    if !s.is_ones() {
                        ranges.push((s + one, ones));
                    }
                    return x.sample_in_ranges(rng, &ranges);
                }
                if s.ult(t) {
                    return None;
                }
                // x must divide s - t and exceed t
                let d = (s - *t).value();
                let mut divs = get_divisors(d);
                divs.push(1);
                divs.push(d);
                divs.sort_unstable();
                divs.dedup();
                let candidates: Vec<u64> = divs
                    .into_iter()
                    .filter(|&y| y > t.value() && x.mcb(&BitVector::new(y, w)))
                    .collect();
                if candidates.is_empty() {
                    None
                } else {
                    Some(BitVector::new(rng.pick_from_slice(&candidates), w))
                }
            }
        }
        BVOperator::Ult | BVOperator::Slt => {
            let s = operands[1 - pos_x as usize];
            let ranges = ineq_ranges(op, &s, t.is_true(), pos_x, bounds)?;
            x.sample_in_ranges(rng, &ranges.intervals())
        }
    }
}

/// Compute a consistent value for `x` at `pos_x`, `None` iff the
/// consistency condition does not hold.
pub fn consistent_value(
    rng: &mut Rng,
    op: BVOperator,
    x: &TernaryBitVector,
    operands: &[BitVector],
    t: &BitVector,
    pos_x: u32,
) -> Option<BitVector> {
    let w = x.width();

    match op {
        BVOperator::Add | BVOperator::Xor | BVOperator::Eq => Some(x.sample(rng)),
        BVOperator::Not => {
            let v = !*t;
            x.mcb(&v).then_some(v)
        }
        BVOperator::And => {
            let v = x.force_mcb(&(BitVector::random(rng, w) | *t));
            ((v & *t) == *t).then_some(v)
        }
        BVOperator::Concat => {
            let s = operands[1 - pos_x as usize];
            let wt = t.width();
            let tx = if pos_x == 0 {
                t.extract(wt - 1, s.width())
            } else {
                t.extract(w - 1, 0)
            };
            x.mcb(&tx).then_some(tx)
        }
        BVOperator::Extract { hi, lo } => extract_value(rng, x, &operands[0], hi, lo, t),
        BVOperator::Sext { n } => sext_value(x, n, t),
        BVOperator::Ite => {
            if pos_x != 0 && x.mcb(t) {
                Some(*t)
            } else {
                Some(x.sample(rng))
            }
        }
        BVOperator::Mul => {
            if t.is_zero() {
                return Some(x.sample(rng));
            }
            // x must be non-zero with no more trailing zeros than t
            let ct = t.ctz();
            let r = x.sample(rng);
            if !r.is_zero() && r.ctz() <= ct {
                return Some(r);
            }
            for i in 0..=ct {
                if x.hi().bit(i) {
                    return Some(r | (BitVector::one(w) << i));
                }
            }
            None
        }
        BVOperator::Shl => {
            if pos_x == 0 {
                if t.is_zero() {
                    return Some(x.sample(rng));
                }
                let max_shift = t.ctz().min(w - 1);
                let start = rng.pick_uniform(0, u64::from(max_shift)) as u32;
                for offset in 0..=max_shift {
                    let y = (start + offset) % (max_shift + 1);
                    if let Some(v) = inverse_shl_pos0(rng, x, u64::from(y), t) {
                        return Some(v);
                    }
                }
                None
            } else {
                if t.is_zero() {
                    return Some(x.sample(rng));
                }
                x.sample_in_range(rng, &BitVector::zero(w), &BitVector::new(u64::from(t.ctz()), w))
            }
        }
        BVOperator::Shr => {
            if pos_x == 0 {
                if t.is_zero() {
                    return Some(x.sample(rng));
                }
                let max_shift = t.clz().min(w - 1);
                let start = rng.pick_uniform(0, u64::from(max_shift)) as u32;
                for offset in 0..=max_shift {
                    let y = (start + offset) % (max_shift + 1);
                    if let Some(v) = inverse_shr_pos0(rng, x, u64::from(y), t) {
                        return Some(v);
                    }
                }
                None
            } else {
                if t.is_zero() {
                    return Some(x.sample(rng));
                }
                x.sample_in_range(rng, &BitVector::zero(w), &BitVector::new(u64::from(t.clz()), w))
            }
        }
        BVOperator::Ashr => {
            if pos_x == 0 {
                if t.is_zero() {
                    return sample_with_msb(rng, x, false);
                }
                if t.is_ones() {
                    return sample_with_msb(rng, x, true);
                }
                let limit = if t.msb() { t.clo() } else { t.clz() };
                let max_shift = (limit - 1).min(w - 1);
                let start = rng.pick_uniform(0, u64::from(max_shift)) as u32;
                for offset in 0..=max_shift {
                    let y = (start + offset) % (max_shift + 1);
                    if let Some(v) = inverse_ashr_pos0(rng, x, u64::from(y), t) {
                        return Some(v);
                    }
                }
                None
            } else {
                if t.is_zero() || t.is_ones() {
                    return Some(x.sample(rng));
                }
                let limit = if t.msb() { t.clo() } else { t.clz() };
                x.sample_in_range(rng, &BitVector::zero(w), &BitVector::new(u64::from(limit - 1), w))
            }
        }
        BVOperator::Udiv => {
            let one = BitVector::one(w);
            let ones = BitVector::ones(w);
            if pos_x == 0 {
                if t.is_ones() {
                    // y / 0 = ones for every y
                    return Some(x.sample(rng));
                }
                if t.is_zero() {
                    // any value but ones is less than some divisor
                    let r = x.sample(rng);
                    if !r.is_ones() {
                        return Some(r);
                    }
                    let free = x.lo() ^ x.hi();
                    if free.is_zero() {
                        return None;
                    }
                    return Some(r ^ (one << free.ctz()));
                }
                let feasible = |v: &BitVector| !v.ult(t) && v.udiv(&v.udiv(t)) == *t;
                if x.num_free_bits() <= 12 {
                    let candidates: Vec<BitVector> = (0..(1u64 << x.num_free_bits()))
                        .map(|k| x.value_at(k))
                        .filter(feasible)
                        .collect();
                    if candidates.is_empty() {
                        None
                    } else {
                        Some(rng.pick_from_slice(&candidates))
                    }
                } else {
                    for _ in 0..NTRIES {
                        let v = x.sample(rng);
                        if feasible(&v) {
                            return Some(v);
                        }
                    }
                    x.mcb(t).then_some(*t)
                }
            } else {
                if t.is_ones() {
                    return x.sample_in_range(rng, &BitVector::zero(w), &one);
                }
                if t.is_zero() {
                    return x.sample_in_range(rng, &one, &ones);
                }
                x.sample_in_range(rng, &one, &ones.udiv(t))
            }
        }
        BVOperator::Urem => {
            let one = BitVector::one(w);
            let ones = BitVector::ones(w);
            if pos_x == 0 {
                if t.is_ones() {
                    return x.mcb(&ones).then_some(ones);
                }
                // either exactly t (dividend smaller than the divisor) or
                // any value v > 2t (with divisor v - t)
                let mut ranges = vec![(*t, *t)];
                if !t.uaddo(t) {
                    let double = *t + *t;
                    if !double.is_ones() {
                        ranges.push((double + one, ones));
                    }
                }
                x.sample_in_ranges(rng, &ranges)
            } else {
                // either zero (remainder is the dividend) or any value > t
                let mut ranges = vec![(BitVector::zero(w), BitVector::zero(w))];
                if !t.is_ones() {
                    ranges.push((*t + one, ones));
                }
                x.sample_in_ranges(rng, &ranges)
            }
        }
        BVOperator::Ult => {
            let one = BitVector::one(w);
            let ones = BitVector::ones(w);
            match (pos_x, t.is_true()) {
                (0, true) => x.sample_in_range(rng, &BitVector::zero(w), &(ones - one)),
                (1, true) => x.sample_in_range(rng, &one, &ones),
                _ => Some(x.sample(rng)),
            }
        }
        BVOperator::Slt => {
            let one = BitVector::one(w);
            match (pos_x, t.is_true()) {
                (0, true) => {
                    let r = NormalizedRanges::from_signed(
                        &BitVector::min_signed(w),
                        &(BitVector::max_signed(w) - one),
                    );
                    x.sample_in_ranges(rng, &r.intervals())
                }
                (1, true) => {
                    let r = NormalizedRanges::from_signed(
                        &(BitVector::min_signed(w) + one),
                        &BitVector::max_signed(w),
                    );
                    x.sample_in_ranges(rng, &r.intervals())
                }
                _ => Some(x.sample(rng)),
            }
        }
    }
}

/// The feasible unsigned ranges for the unknown operand of an inequality,
/// intersected with externally derived bounds if any. `None` means no
/// feasible value exists.
pub fn ineq_ranges(
    op: BVOperator,
    s: &BitVector,
    t: bool,
    pos_x: u32,
    extra: Option<&NormalizedRanges>,
) -> Option<NormalizedRanges> {
    let w = s.width();
    let one = BitVector::one(w);
    let base = match op {
        BVOperator::Ult => {
            let (min, max) = match (pos_x, t) {
                (0, true) => {
                    if s.is_zero() {
                        return None;
                    }
                    (BitVector::zero(w), *s - one)
                }
                (0, false) => (*s, BitVector::ones(w)),
                (1, true) => {
                    if s.is_ones() {
                        return None;
                    }
                    (*s + one, BitVector::ones(w))
                }
                _ => (BitVector::zero(w), *s),
            };
            NormalizedRanges::from_unsigned(&min, &max)
        }
        BVOperator::Slt => {
            let (min, max) = match (pos_x, t) {
                (0, true) => {
                    if s.is_min_signed() {
                        return None;
                    }
                    (BitVector::min_signed(w), *s - one)
                }
                (0, false) => (*s, BitVector::max_signed(w)),
                (1, true) => {
                    if s.is_max_signed() {
                        return None;
                    }
                    (*s + one, BitVector::max_signed(w))
                }
                _ => (BitVector::min_signed(w), *s),
            };
            NormalizedRanges::from_signed(&min, &max)
        }
        _ => unreachable!("ranges are only defined for inequalities"),
    };
    let ranges = match extra {
        Some(e) => base.intersect(e),
        None => base,
    };
    if ranges.is_empty() {
        None
    } else {
        Some(ranges)
    }
}

/// Reconstruct a full-width value whose `[hi:lo]` slice is `t`, drawing the
/// don't-care slices from the domain and keeping their current values with
/// probability `PROB_KEEP`.
fn extract_value(
    rng: &mut Rng,
    x: &TernaryBitVector,
    x_val: &BitVector,
    hi: u32,
    lo: u32,
    t: &BitVector,
) -> Option<BitVector> {
    let w = x.width();
    if !x.extract(hi, lo).mcb(t) {
        return None;
    }
    let mut v = *t;
    if hi < w - 1 {
        let left = if rng.pick_with_prob(PROB_KEEP) {
            x_val.extract(w - 1, hi + 1)
        } else {
            x.extract(w - 1, hi + 1).sample(rng)
        };
        v = left.concat(&v);
    }
    if lo > 0 {
        let right = if rng.pick_with_prob(PROB_KEEP) {
            x_val.extract(lo - 1, 0)
        } else {
            x.extract(lo - 1, 0).sample(rng)
        };
        v = v.concat(&right);
    }
    Some(v)
}

/// The operand value of a sign extension with target `t`, if the extension
/// bits of `t` are a proper sign fill and the body matches the domain.
fn sext_value(x: &TernaryBitVector, n: u32, t: &BitVector) -> Option<BitVector> {
    let (wt, wx) = (t.width(), x.width());
    debug_assert_eq!(wt, wx + n);
    let ext = t.extract(wt - 1, wx - 1);
    if !(ext.is_zero() || ext.is_ones()) {
        return None;
    }
    let tx = t.extract(wx - 1, 0);
    x.mcb(&tx).then_some(tx)
}

/// Inverse for `x << shift = t` with a known shift amount.
fn inverse_shl_pos0(rng: &mut Rng, x: &TernaryBitVector, shift: u64, t: &BitVector) -> Option<BitVector> {
    let w = x.width();
    if shift >= u64::from(w) {
        return t.is_zero().then(|| x.sample(rng));
    }
    let shift = shift as u32;
    if shift == 0 {
        return x.mcb(t).then_some(*t);
    }
    if ((*t >> shift) << shift) != *t {
        return None;
    }
    let low = t.extract(w - 1, shift);
    if !x.extract(w - shift - 1, 0).mcb(&low) {
        return None;
    }
    let high = x.extract(w - 1, w - shift).sample(rng);
    Some(high.concat(&low))
}

/// Inverse for `x >> shift = t` with a known shift amount.
fn inverse_shr_pos0(rng: &mut Rng, x: &TernaryBitVector, shift: u64, t: &BitVector) -> Option<BitVector> {
    let w = x.width();
    if shift >= u64::from(w) {
        return t.is_zero().then(|| x.sample(rng));
    }
    let shift = shift as u32;
    if shift == 0 {
        return x.mcb(t).then_some(*t);
    }
    if ((*t << shift) >> shift) != *t {
        return None;
    }
    let high = t.extract(w - shift - 1, 0);
    if !x.extract(w - 1, shift).mcb(&high) {
        return None;
    }
    let low = x.extract(shift - 1, 0).sample(rng);
    Some(high.concat(&low))
}

/// Inverse for `x >>a shift = t` with a known shift amount.
fn inverse_ashr_pos0(rng: &mut Rng, x: &TernaryBitVector, shift: u64, t: &BitVector) -> Option<BitVector> {
    let w = x.width();
    if shift >= u64::from(w) {
        if t.is_zero() {
            return sample_with_msb(rng, x, false);
        }
        if t.is_ones() {
            return sample_with_msb(rng, x, true);
        }
        return None;
    }
    let shift = shift as u32;
    if shift == 0 {
        return x.mcb(t).then_some(*t);
    }
    if (*t << shift).ashr(shift) != *t {
        return None;
    }
    let high = t.extract(w - shift - 1, 0);
    if !x.extract(w - 1, shift).mcb(&high) {
        return None;
    }
    let low = x.extract(shift - 1, 0).sample(rng);
    Some(high.concat(&low))
}

/// Inverse for `s >> x = t`, solving for the shift amount.
fn inverse_shr_pos1(rng: &mut Rng, x: &TernaryBitVector, s: &BitVector, t: &BitVector) -> Option<BitVector> {
    let w = x.width();
    if t.is_zero() {
        if s.is_zero() {
            return Some(x.sample(rng));
        }
        let min_shift = BitVector::new(u64::from(w - s.clz()), w);
        return x.sample_in_range(rng, &min_shift, &BitVector::ones(w));
    }
    if s.clz() > t.clz() {
        return None;
    }
    let shift = t.clz() - s.clz();
    let v = BitVector::new(u64::from(shift), w);
    ((*s >> shift) == *t && x.mcb(&v)).then_some(v)
}

/// A random domain value with the given most significant bit, if any.
fn sample_with_msb(rng: &mut Rng, x: &TernaryBitVector, value: bool) -> Option<BitVector> {
    let w = x.width();
    if x.is_fixed_bit(w - 1) {
        if x.fixed_bit(w - 1) != value {
            return None;
        }
        return Some(x.sample(rng));
    }
    let mut narrowed = *x;
    narrowed.fix_bit(w - 1, value);
    Some(narrowed.sample(rng))
}
