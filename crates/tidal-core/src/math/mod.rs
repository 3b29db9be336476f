//! # Math Module
//!
//! Arithmetic layers, bottom up: checked primitives (`safe_math`), 256-bit
//! intermediates (`big_int`), 18-decimal fixed point (`fixed_point`), and
//! tick-to-price conversion (`tick_math`).

pub mod big_int;
pub mod fixed_point;
pub mod safe_math;
pub mod tick_math;

pub use big_int::{mul_div_u128, Rounding, U256};
pub use fixed_point::{div_wad, mul_wad, pow_wad};
pub use tick_math::price_wad_at_tick;
