//! Gray-coded phase-shift keying over NRZ code values.

use rustfft::num_complex::Complex;
use std::f32::consts::FRAC_1_SQRT_2;

const COS_PI_8: f32 = 0.923_879_5;
const SIN_PI_8: f32 = 0.382_683_43;

/// QPSK: two NRZ values become the I and Q signs, unit magnitude.
pub struct Qpsk;

impl Qpsk {
    pub const BITS: usize = 2;

    pub fn map(b: &[i8]) -> Complex<f32> {
        Complex::new(
            FRAC_1_SQRT_2 * f32::from(b[0]),
            FRAC_1_SQRT_2 * f32::from(b[1]),
        )
    }
}

/// 8-PSK: three NRZ values select a unit phasor; neighboring phasors
/// differ in exactly one bit.
pub struct Psk8;

impl Psk8 {
    pub const BITS: usize = 3;

    pub fn map(b: &[i8]) -> Complex<f32> {
        match (b[0] < 0, b[1] < 0, b[2] < 0) {
            (false, false, false) => Complex::new(COS_PI_8, SIN_PI_8),
            (false, false, true) => Complex::new(SIN_PI_8, COS_PI_8),
            (false, true, true) => Complex::new(-SIN_PI_8, COS_PI_8),
            (false, true, false) => Complex::new(-COS_PI_8, SIN_PI_8),
            (true, true, false) => Complex::new(-COS_PI_8, -SIN_PI_8),
            (true, true, true) => Complex::new(-SIN_PI_8, -COS_PI_8),
            (true, false, true) => Complex::new(SIN_PI_8, -COS_PI_8),
            (true, false, false) => Complex::new(COS_PI_8, -SIN_PI_8),
        }
    }
}
