use std::fmt;

/// Fixed-point decimal with 4 decimal places, stored as a scaled integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct Amount(i64);

impl Amount {
    pub(crate) const SCALE: i64 = 10_000;

    pub const ZERO: Amount = Amount(0);

    /// Whole currency units, e.g. `Amount::from_units(22_500)` for Rp 22.500.
    pub fn from_units(units: i64) -> Self {
        Amount(units * Self::SCALE)
    }

    /// Like [`Amount::from_units`], `None` if the scaled value overflows.
    pub fn checked_from_units(units: i64) -> Option<Self> {
        units.checked_mul(Self::SCALE).map(Amount)
    }

    pub fn from_scaled(value: i64) -> Self {
        Amount(value)
    }

    pub fn scaled(self) -> i64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Amount)
    }

    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Amount)
    }

    /// `self - rhs`, floored at zero.
    pub fn saturating_sub_zero(self, rhs: Self) -> Self {
        Amount((self.0 - rhs.0).max(0))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.abs();
        let whole = abs / Self::SCALE;
        let frac = abs % Self::SCALE;
        write!(f, "{sign}{whole}.{frac:04}")
    }
}

impl std::ops::Add for Amount {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Amount(self.0 + rhs.0)
    }
}

impl std::ops::Sub for Amount {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Amount(self.0 - rhs.0)
    }
}

impl std::ops::AddAssign for Amount {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl std::ops::SubAssign for Amount {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}
