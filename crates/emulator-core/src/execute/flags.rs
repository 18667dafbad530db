//! Condition-flag computation for arithmetic and logical results.

use crate::state::Pstate;

/// Describes how flags change after an instruction executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlagsUpdate {
    /// Flags are left as they were.
    #[default]
    None,
    /// Replace all four flags.
    Set(Pstate),
    /// Replace N and Z only; C and V keep their values.
    NegativeZero(Pstate),
}

impl FlagsUpdate {
    /// Applies the update to `current`.
    #[must_use]
    pub const fn apply(self, current: Pstate) -> Pstate {
        match self {
            Self::None => current,
            Self::Set(flags) => flags,
            Self::NegativeZero(flags) => Pstate {
                n: flags.n,
                z: flags.z,
                ..current
            },
        }
    }
}

const fn width_mask(sf: bool) -> u64 {
    if sf {
        u64::MAX
    } else {
        0xFFFF_FFFF
    }
}

const fn sign_bit(value: u64, sf: bool) -> bool {
    let top = if sf { 63 } else { 31 };
    (value >> top) & 1 == 1
}

/// Adds at the operating width and returns the result with `NZCV`.
///
/// `C` is the unsigned carry out; `V` is set when both operands share a sign
/// the result does not.
#[must_use]
pub const fn add_with_flags(op1: u64, op2: u64, sf: bool) -> (u64, Pstate) {
    let mask = width_mask(sf);
    let a = op1 & mask;
    let b = op2 & mask;
    let result = a.wrapping_add(b) & mask;
    let (sa, sb, sr) = (sign_bit(a, sf), sign_bit(b, sf), sign_bit(result, sf));
    (
        result,
        Pstate {
            n: sr,
            z: result == 0,
            c: result < a,
            v: sa == sb && sr != sa,
        },
    )
}

/// Subtracts at the operating width and returns the result with `NZCV`.
///
/// `C` is set when no borrow occurs (`op1 >= op2`); `V` is set when the
/// operands differ in sign and the result's sign differs from `op1`.
#[must_use]
pub const fn sub_with_flags(op1: u64, op2: u64, sf: bool) -> (u64, Pstate) {
    let mask = width_mask(sf);
    let a = op1 & mask;
    let b = op2 & mask;
    let result = a.wrapping_sub(b) & mask;
    let (sa, sb, sr) = (sign_bit(a, sf), sign_bit(b, sf), sign_bit(result, sf));
    (
        result,
        Pstate {
            n: sr,
            z: result == 0,
            c: a >= b,
            v: sa != sb && sr != sa,
        },
    )
}

/// Flags for a logical result: `N` and `Z` from the value, `C` and `V` clear.
#[must_use]
pub const fn logical_flags(result: u64, sf: bool) -> Pstate {
    let result = result & width_mask(sf);
    Pstate {
        n: sign_bit(result, sf),
        z: result == 0,
        c: false,
        v: false,
    }
}
