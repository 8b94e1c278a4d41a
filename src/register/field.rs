//! Bit-field descriptors.

/// Location of a named field inside a 32-bit register.
///
/// Invariant: `offset + width <= 32` and `width >= 1`, checked when the
/// constant is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FieldSpec {
    /// 7-bit register address.
    pub register: u8,
    /// Position of the least significant bit.
    pub offset: u8,
    /// Number of bits.
    pub width: u8,
    /// Two's complement field, sign-extended on decode.
    pub signed: bool,
}

impl FieldSpec {
    /// Unsigned field of `width` bits starting at `offset`.
    pub const fn new(register: u8, offset: u8, width: u8) -> Self {
        assert!(width >= 1 && offset as u32 + width as u32 <= 32);
        Self {
            register,
            offset,
            width,
            signed: false,
        }
    }

    /// Signed (two's complement) field.
    pub const fn signed(register: u8, offset: u8, width: u8) -> Self {
        let mut spec = Self::new(register, offset, width);
        spec.signed = true;
        spec
    }

    /// Single bit flag.
    pub const fn flag(register: u8, bit: u8) -> Self {
        Self::new(register, bit, 1)
    }

    /// Field mask aligned to bit 0.
    #[inline]
    pub const fn value_mask(self) -> u32 {
        if self.width >= 32 {
            u32::MAX
        } else {
            (1u32 << self.width) - 1
        }
    }

    /// Field mask in register position.
    #[inline]
    pub const fn mask(self) -> u32 {
        self.value_mask() << self.offset
    }

    /// Whether the field spans the whole register, so writes need no read first.
    #[inline]
    pub const fn covers_register(self) -> bool {
        self.offset == 0 && self.width == 32
    }

    /// Raw bits of the field, right-aligned and never sign-extended.
    #[inline]
    pub const fn bits(self, word: u32) -> u32 {
        (word >> self.offset) & self.value_mask()
    }

    /// Extract the field from a register word.
    ///
    /// An unsigned field 32 bits wide wraps to a negative value above
    /// `i32::MAX`; use [`bits`](Self::bits) for those.
    pub fn decode(self, word: u32) -> i32 {
        let raw = self.bits(word);
        if self.signed && self.width < 32 {
            let shift = 32 - self.width as u32;
            ((raw << shift) as i32) >> shift
        } else {
            raw as i32
        }
    }

    /// Replace the field's bits in `word` with `value`, keeping every other bit.
    ///
    /// Bits of `value` above the field width are dropped.
    pub fn encode(self, word: u32, value: i32) -> u32 {
        let bits = (value as u32) & self.value_mask();
        (word & !self.mask()) | (bits << self.offset)
    }

    /// `value` as [`decode`](Self::decode) would return it after an
    /// [`encode`](Self::encode): truncated to the width and sign-extended
    /// for signed fields.
    pub fn normalize(self, value: i32) -> i32 {
        self.decode(self.encode(0, value))
    }
}
