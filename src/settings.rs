//! Display/computation settings and user/system flags (C10).

use strum::EnumIter;

/// Number base display groupings and separators (§4.10 "Spacing").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spacing {
    /// Digits per group in the integer part of a mantissa.
    pub mantissa_group: u8,
    /// Digits per group in a fraction's numerator/denominator render.
    pub fraction_group: u8,
    /// Digits per group in a based-integer render.
    pub based_group: u8,
    /// Separator glyph, e.g. `'\''`, `' '`, `','`, `'.'`, `'_'`.
    pub separator: char,
}

impl Default for Spacing {
    fn default() -> Self {
        Self { mantissa_group: 3, fraction_group: 5, based_group: 4, separator: ' ' }
    }
}

/// Display mode for decimals (§4.10).
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum DisplayMode {
    Std,
    Fix,
    Sci,
    Eng,
    Sig,
}

/// Angle unit used by trigonometric operations (§4.4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum AngleMode {
    Degrees,
    Radians,
    Grads,
    PiRadians,
}

/// Fraction rendering style (§4.10).
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum FractionStyle {
    Big,
    Small,
    Mixed,
    Improper,
}

/// Policy for `0^0` (§4.4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZeroPowerZeroPolicy {
    IsOne,
    IsUndefined,
}

/// The settings surface of C10. No file-based configuration: this struct,
/// constructed programmatically or deserialized from a host-provided blob
/// behind the `serde` feature, is the entire configuration boundary.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Settings {
    precision: usize,
    display_digits: usize,
    #[cfg_attr(feature = "serde", serde(skip, default = "default_display_mode"))]
    display_mode: DisplayMode,
    #[cfg_attr(feature = "serde", serde(skip, default = "default_angle_mode"))]
    angle_mode: AngleMode,
    word_size: u32,
    base: u32,
    #[cfg_attr(feature = "serde", serde(skip, default = "default_fraction_style"))]
    fraction_style: FractionStyle,
    #[cfg_attr(feature = "serde", serde(skip))]
    spacing: Spacing,
    auto_simplify: bool,
    numerical_results: bool,
    #[cfg_attr(feature = "serde", serde(skip, default = "default_zero_power_zero"))]
    zero_power_zero: ZeroPowerZeroPolicy,
    set_angle_units: bool,
    number_variables: bool,
    max_denominator: u64,
    hardware_float_fast_path: bool,
}

fn default_display_mode() -> DisplayMode {
    DisplayMode::Std
}
fn default_angle_mode() -> AngleMode {
    AngleMode::Degrees
}
fn default_fraction_style() -> FractionStyle {
    FractionStyle::Big
}
fn default_zero_power_zero() -> ZeroPowerZeroPolicy {
    ZeroPowerZeroPolicy::IsOne
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            precision: 24,
            display_digits: 12,
            display_mode: DisplayMode::Std,
            angle_mode: AngleMode::Degrees,
            word_size: 64,
            base: 16,
            fraction_style: FractionStyle::Big,
            spacing: Spacing::default(),
            auto_simplify: true,
            numerical_results: false,
            zero_power_zero: ZeroPowerZeroPolicy::IsOne,
            set_angle_units: false,
            number_variables: false,
            max_denominator: 1_000_000,
            hardware_float_fast_path: false,
        }
    }
}

impl Settings {
    pub fn precision(&self) -> usize {
        self.precision
    }

    /// `Precision` must stay at least 1 digit (§4.10 "1..∞").
    pub fn set_precision(&mut self, digits: usize) {
        self.precision = digits.max(1);
    }

    pub fn display_digits(&self) -> usize {
        self.display_digits
    }

    pub fn set_display_digits(&mut self, digits: usize) {
        self.display_digits = digits.max(1);
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.display_mode
    }

    pub fn set_display_mode(&mut self, mode: DisplayMode) {
        self.display_mode = mode;
    }

    pub fn angle_mode(&self) -> AngleMode {
        self.angle_mode
    }

    pub fn set_angle_mode(&mut self, mode: AngleMode) {
        self.angle_mode = mode;
    }

    pub fn word_size(&self) -> u32 {
        self.word_size
    }

    pub fn set_word_size(&mut self, bits: u32) {
        self.word_size = bits.max(1);
    }

    pub fn base(&self) -> u32 {
        self.base
    }

    /// Bases are 2..=36 (§4.10); out-of-range requests are clamped rather
    /// than silently accepted, since an invalid base must surface as
    /// `ErrorKind::InvalidBase` at the call site, not here.
    pub fn set_base(&mut self, base: u32) -> Result<(), crate::error::ErrorKind> {
        if (2..=36).contains(&base) {
            self.base = base;
            Ok(())
        } else {
            Err(crate::error::ErrorKind::InvalidBase)
        }
    }

    pub fn fraction_style(&self) -> FractionStyle {
        self.fraction_style
    }

    pub fn set_fraction_style(&mut self, style: FractionStyle) {
        self.fraction_style = style;
    }

    pub fn spacing(&self) -> &Spacing {
        &self.spacing
    }

    pub fn spacing_mut(&mut self) -> &mut Spacing {
        &mut self.spacing
    }

    pub fn auto_simplify(&self) -> bool {
        self.auto_simplify
    }

    pub fn set_auto_simplify(&mut self, on: bool) {
        self.auto_simplify = on;
    }

    pub fn numerical_results(&self) -> bool {
        self.numerical_results
    }

    pub fn set_numerical_results(&mut self, on: bool) {
        self.numerical_results = on;
    }

    pub fn zero_power_zero(&self) -> ZeroPowerZeroPolicy {
        self.zero_power_zero
    }

    pub fn set_zero_power_zero(&mut self, policy: ZeroPowerZeroPolicy) {
        self.zero_power_zero = policy;
    }

    pub fn set_angle_units(&self) -> bool {
        self.set_angle_units
    }

    pub fn set_set_angle_units(&mut self, on: bool) {
        self.set_angle_units = on;
    }

    pub fn number_variables(&self) -> bool {
        self.number_variables
    }

    pub fn set_number_variables(&mut self, on: bool) {
        self.number_variables = on;
    }

    pub fn max_denominator(&self) -> u64 {
        self.max_denominator
    }

    pub fn set_max_denominator(&mut self, bound: u64) {
        self.max_denominator = bound.max(1);
    }

    pub fn hardware_float_fast_path(&self) -> bool {
        self.hardware_float_fast_path
    }

    pub fn set_hardware_float_fast_path(&mut self, on: bool) {
        self.hardware_float_fast_path = on;
    }
}

/// At least 128 numbered boolean slots, settable/testable by `SF`/`CF`/
/// `FS?`/`FC?`/`FS?C`/`FC?C`/`STOF`/`RCLF` (§4.10). A parallel system-flag
/// block mirrors a subset for HP-compatible programs.
pub const FLAG_COUNT: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Flags {
    bits: [bool; FLAG_COUNT],
}

impl Default for Flags {
    fn default() -> Self {
        Self { bits: [false; FLAG_COUNT] }
    }
}

impl Flags {
    pub fn set(&mut self, n: usize) {
        if let Some(b) = self.bits.get_mut(n) {
            *b = true;
        }
    }

    pub fn clear(&mut self, n: usize) {
        if let Some(b) = self.bits.get_mut(n) {
            *b = false;
        }
    }

    pub fn is_set(&self, n: usize) -> bool {
        self.bits.get(n).copied().unwrap_or(false)
    }

    /// `FS?C`: test then clear.
    pub fn test_and_clear(&mut self, n: usize) -> bool {
        let v = self.is_set(n);
        self.clear(n);
        v
    }

    /// `FC?C`: test-clear then clear.
    pub fn test_clear_and_clear(&mut self, n: usize) -> bool {
        let v = !self.is_set(n);
        self.clear(n);
        v
    }

    /// `STOF`: overwrite flags `lo..lo+bits.len()` from a bit sequence.
    pub fn store(&mut self, lo: usize, bits: &[bool]) {
        for (i, b) in bits.iter().enumerate() {
            if let Some(slot) = self.bits.get_mut(lo + i) {
                *slot = *b;
            }
        }
    }

    /// `RCLF`: read back `count` flags starting at `lo`.
    pub fn recall(&self, lo: usize, count: usize) -> Vec<bool> {
        (lo..lo + count).map(|i| self.is_set(i)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precision_cannot_go_below_one() {
        let mut s = Settings::default();
        s.set_precision(0);
        assert_eq!(s.precision(), 1);
    }

    #[test]
    fn invalid_base_is_rejected() {
        let mut s = Settings::default();
        assert!(s.set_base(1).is_err());
        assert!(s.set_base(37).is_err());
        assert!(s.set_base(36).is_ok());
    }

    #[test]
    fn flags_round_trip_through_store_and_recall() {
        let mut f = Flags::default();
        f.set(5);
        assert!(f.is_set(5));
        assert!(f.test_and_clear(5));
        assert!(!f.is_set(5));

        f.store(10, &[true, false, true]);
        assert_eq!(f.recall(10, 3), vec![true, false, true]);
    }
}
