//! Synchronization and channel-estimation symbols.

use crate::bits::nrz;
use crate::mls::Mls;
use crate::ofdm::bin;
use crate::{MLS0_LEN, MLS0_POLY, MLS2_POLY};
use rustfft::num_complex::Complex;

/// Fill `fdom` with the pilot block: BPSK pilots across the data band,
/// scaled so the symbol carries the same power as a data symbol. The
/// receiver uses these bins as the channel-estimation reference, and the
/// first data symbol differentially multiplies onto them.
pub fn pilot_block(fdom: &mut [Complex<f32>], code_off: i32, code_cols: usize) {
    let len = fdom.len();
    let mut seq = Mls::new(MLS2_POLY);
    let amp = (len as f32 / code_cols as f32).sqrt();
    for value in fdom.iter_mut() {
        *value = Complex::new(0.0, 0.0);
    }
    for i in code_off..code_off + code_cols as i32 {
        fdom[bin(i, len)] = Complex::new(amp * f32::from(nrz(seq.next())), 0.0);
    }
}

/// Fill `fdom` with the Schmidl-Cox symbol: differentially encoded BPSK on
/// every other bin, with an amplitude anchor two bins below the sequence.
/// Occupying only even carriers repeats the time signal at half-symbol lag,
/// which the receiver detects by delayed autocorrelation. This symbol must
/// be synthesized without PAPR reduction to keep that structure intact.
pub fn schmidl_cox(fdom: &mut [Complex<f32>], mls0_off: i32) {
    let len = fdom.len();
    let mut seq = Mls::new(MLS0_POLY);
    let amp = (2.0 * len as f32 / MLS0_LEN as f32).sqrt();
    for value in fdom.iter_mut() {
        *value = Complex::new(0.0, 0.0);
    }
    fdom[bin(mls0_off - 2, len)] = Complex::new(amp, 0.0);
    for i in 0..MLS0_LEN as i32 {
        fdom[bin(2 * i + mls0_off, len)] = Complex::new(f32::from(nrz(seq.next())), 0.0);
    }
    for i in 0..MLS0_LEN as i32 {
        let prev = fdom[bin(2 * (i - 1) + mls0_off, len)];
        fdom[bin(2 * i + mls0_off, len)] *= prev;
    }
}
