//! Script verification flags.
//!
//! Every rule the engine knows about occupies a single bit of the `flags`
//! argument of `bitcoinconsensus_verify_script`. [`VerifyFlag`] names those
//! rules, [`FlagSet`] is a duplicate-free collection of them and [`combine`]
//! folds any collection into the mask that crosses the C boundary.

use core::{
    fmt,
    ops::{BitOr, BitOrAssign},
    str::FromStr,
};

use crate::{
    error::ParseFlagError,
    types::c_uint,
    VERIFY_CHECKLOCKTIMEVERIFY, VERIFY_CLEANSTACK, VERIFY_DERSIG,
    VERIFY_DISCOURAGE_UPGRADABLE_NOPS, VERIFY_LOW_S, VERIFY_MINIMALDATA, VERIFY_NONE,
    VERIFY_NULLDUMMY, VERIFY_P2SH, VERIFY_SIGPUSHONLY, VERIFY_STRICTENC,
};

/// A single script verification rule.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u32)]
pub enum VerifyFlag {
    /// No special handling.
    None = VERIFY_NONE,
    /// Evaluate P2SH (BIP16) subscripts.
    P2sh = VERIFY_P2SH,
    /// Require defined sighash types and strictly encoded signatures and public keys.
    ///
    /// Not a consensus rule, only relay policy.
    StrictEnc = VERIFY_STRICTENC,
    /// Enforce strict DER (BIP66) signature encoding.
    DerSig = VERIFY_DERSIG,
    /// Require signatures with S at most half the curve order (BIP62 rule 5).
    LowS = VERIFY_LOW_S,
    /// The dummy element consumed by CHECKMULTISIG must be empty (BIP62 rule 7).
    NullDummy = VERIFY_NULLDUMMY,
    /// scriptSig may only contain push operations (BIP62 rule 2).
    SigPushOnly = VERIFY_SIGPUSHONLY,
    /// Require minimal push encodings and minimally encoded numbers (BIP62 rules 3 and 4).
    MinimalData = VERIFY_MINIMALDATA,
    /// Fail when an executed NOP1-NOP10 is encountered.
    ///
    /// Never part of the mandatory set: NOPs inside unexecuted branches are
    /// still accepted and the opcodes remain available for future soft forks.
    DiscourageUpgradableNops = VERIFY_DISCOURAGE_UPGRADABLE_NOPS,
    /// Exactly one stack element may remain after evaluation (BIP62 rule 6).
    ///
    /// Only meaningful together with [`VerifyFlag::P2sh`].
    CleanStack = VERIFY_CLEANSTACK,
    /// Enable OP_CHECKLOCKTIMEVERIFY (BIP65).
    CheckLockTimeVerify = VERIFY_CHECKLOCKTIMEVERIFY,
}

impl VerifyFlag {
    /// Every rule that occupies a bit, in ascending bit order. [`VerifyFlag::None`] is not listed.
    pub const ALL: [VerifyFlag; 10] = [
        VerifyFlag::P2sh,
        VerifyFlag::StrictEnc,
        VerifyFlag::DerSig,
        VerifyFlag::LowS,
        VerifyFlag::NullDummy,
        VerifyFlag::SigPushOnly,
        VerifyFlag::MinimalData,
        VerifyFlag::DiscourageUpgradableNops,
        VerifyFlag::CleanStack,
        VerifyFlag::CheckLockTimeVerify,
    ];

    /// Returns the bit this rule occupies in a flags mask (`0` for [`VerifyFlag::None`]).
    pub const fn bits(self) -> c_uint {
        self as c_uint
    }

    /// Returns the rule name as used by Bitcoin Core, e.g. `"DISCOURAGE_UPGRADABLE_NOPS"`.
    pub const fn name(self) -> &'static str {
        match self {
            VerifyFlag::None => "NONE",
            VerifyFlag::P2sh => "P2SH",
            VerifyFlag::StrictEnc => "STRICTENC",
            VerifyFlag::DerSig => "DERSIG",
            VerifyFlag::LowS => "LOW_S",
            VerifyFlag::NullDummy => "NULLDUMMY",
            VerifyFlag::SigPushOnly => "SIGPUSHONLY",
            VerifyFlag::MinimalData => "MINIMALDATA",
            VerifyFlag::DiscourageUpgradableNops => "DISCOURAGE_UPGRADABLE_NOPS",
            VerifyFlag::CleanStack => "CLEANSTACK",
            VerifyFlag::CheckLockTimeVerify => "CHECKLOCKTIMEVERIFY",
        }
    }
}

impl fmt::Display for VerifyFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for VerifyFlag {
    type Err = ParseFlagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        if name == VerifyFlag::None.name() {
            return Ok(VerifyFlag::None);
        }
        VerifyFlag::ALL
            .into_iter()
            .find(|flag| flag.name() == name)
            .ok_or_else(|| ParseFlagError(name.to_string()))
    }
}

/// Returns the fixed bit value of `flag`.
pub const fn value_of(flag: VerifyFlag) -> c_uint {
    flag.bits()
}

/// Folds `flags` into a single mask by OR-ing their bit values.
///
/// Order and repetition do not matter; an empty collection, or one holding
/// only [`VerifyFlag::None`], yields `0`.
pub fn combine<I>(flags: I) -> c_uint
where
    I: IntoIterator<Item = VerifyFlag>,
{
    flags
        .into_iter()
        .fold(VERIFY_NONE, |mask, flag| mask | value_of(flag))
}

/// A set of [`VerifyFlag`]s stored as the mask passed to the engine.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct FlagSet(c_uint);

impl FlagSet {
    /// The empty set, equivalent to `VERIFY_NONE`.
    pub const NONE: FlagSet = FlagSet(VERIFY_NONE);

    const KNOWN_BITS: c_uint = FlagSet::from_slice(&VerifyFlag::ALL).0;

    /// Builds a set in constant context.
    pub const fn from_slice(flags: &[VerifyFlag]) -> Self {
        let mut bits = VERIFY_NONE;
        let mut i = 0;
        while i < flags.len() {
            bits |= flags[i].bits();
            i += 1;
        }
        FlagSet(bits)
    }

    /// Converts a raw mask, returning `None` if it carries bits no [`VerifyFlag`] names.
    pub const fn from_bits(bits: c_uint) -> Option<Self> {
        if bits & !Self::KNOWN_BITS != 0 {
            None
        } else {
            Some(FlagSet(bits))
        }
    }

    /// Converts a raw mask, dropping bits no [`VerifyFlag`] names.
    pub const fn from_bits_truncate(bits: c_uint) -> Self {
        FlagSet(bits & Self::KNOWN_BITS)
    }

    /// The combined mask.
    pub const fn bits(self) -> c_uint {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == VERIFY_NONE
    }

    /// Number of rules in the set.
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Whether `flag` is a member. [`VerifyFlag::None`] is only contained in the empty set.
    pub const fn contains(self, flag: VerifyFlag) -> bool {
        match flag {
            VerifyFlag::None => self.is_empty(),
            _ => self.0 & flag.bits() == flag.bits(),
        }
    }

    /// Whether every member of `self` is also a member of `other`.
    pub const fn is_subset(self, other: FlagSet) -> bool {
        self.0 & !other.0 == 0
    }

    pub fn insert(&mut self, flag: VerifyFlag) {
        self.0 |= flag.bits();
    }

    pub fn remove(&mut self, flag: VerifyFlag) {
        self.0 &= !flag.bits();
    }

    /// Iterates over the members in ascending bit order.
    pub fn iter(self) -> impl Iterator<Item = VerifyFlag> {
        VerifyFlag::ALL
            .into_iter()
            .filter(move |flag| self.0 & flag.bits() != 0)
    }
}

/// Flags that every new block must comply with to be valid.
///
/// Old blocks may violate them. Currently only P2SH.
pub const MANDATORY_VERIFY_FLAGS: FlagSet = FlagSet::from_slice(&[VerifyFlag::P2sh]);

/// Flags that standard transactions comply with.
///
/// Scripts violating them may still appear in valid blocks, so they are
/// enforced by relay and mempool policy only.
pub const STANDARD_VERIFY_FLAGS: FlagSet = FlagSet::from_slice(&[
    VerifyFlag::P2sh,
    VerifyFlag::DerSig,
    VerifyFlag::StrictEnc,
    VerifyFlag::MinimalData,
    VerifyFlag::NullDummy,
    VerifyFlag::DiscourageUpgradableNops,
    VerifyFlag::CleanStack,
    VerifyFlag::CheckLockTimeVerify,
]);

impl From<VerifyFlag> for FlagSet {
    fn from(flag: VerifyFlag) -> Self {
        FlagSet(flag.bits())
    }
}

impl From<FlagSet> for c_uint {
    fn from(flags: FlagSet) -> Self {
        flags.bits()
    }
}

impl FromIterator<VerifyFlag> for FlagSet {
    fn from_iter<I: IntoIterator<Item = VerifyFlag>>(iter: I) -> Self {
        FlagSet(combine(iter))
    }
}

impl Extend<VerifyFlag> for FlagSet {
    fn extend<I: IntoIterator<Item = VerifyFlag>>(&mut self, iter: I) {
        self.0 |= combine(iter);
    }
}

impl BitOr for FlagSet {
    type Output = FlagSet;

    fn bitor(self, rhs: FlagSet) -> FlagSet {
        FlagSet(self.0 | rhs.0)
    }
}

impl BitOr<VerifyFlag> for FlagSet {
    type Output = FlagSet;

    fn bitor(self, rhs: VerifyFlag) -> FlagSet {
        FlagSet(self.0 | rhs.bits())
    }
}

impl BitOr for VerifyFlag {
    type Output = FlagSet;

    fn bitor(self, rhs: VerifyFlag) -> FlagSet {
        FlagSet(self.bits() | rhs.bits())
    }
}

impl BitOrAssign for FlagSet {
    fn bitor_assign(&mut self, rhs: FlagSet) {
        self.0 |= rhs.0;
    }
}

impl BitOrAssign<VerifyFlag> for FlagSet {
    fn bitor_assign(&mut self, rhs: VerifyFlag) {
        self.insert(rhs);
    }
}

/// Renders the members as a comma separated list of rule names, `NONE` when empty.
impl fmt::Display for FlagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str(VerifyFlag::None.name());
        }
        for (i, flag) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            f.write_str(flag.name())?;
        }
        Ok(())
    }
}

/// Parses the comma separated form used by Bitcoin Core's script test vectors,
/// e.g. `"P2SH,STRICTENC"`. The empty string and `"NONE"` both yield the empty set.
impl FromStr for FlagSet {
    type Err = ParseFlagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(VerifyFlag::from_str)
            .collect()
    }
}
