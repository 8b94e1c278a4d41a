//! Register map and bit-field codec for the TMC2209.
//!
//! Every chip register is a 32-bit word. Named fields are described by
//! compile-time [`FieldSpec`] constants and encoded/decoded without any I/O.

mod field;
pub mod map;

pub use field::FieldSpec;
