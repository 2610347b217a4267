//! Metadata header: call-sign framing, checksum, coding and modulation.
//!
//! The 55-bit metadata field packs the base-37 call sign above the mode
//! byte. A CRC-16 extends it to 71 information bits, a (255, 71) BCH code
//! adds 184 parity bits, and the codeword rides as differentially encoded
//! BPSK under a whitening sequence, anchored one bin below the band.

use crate::bch::BchEncoder;
use crate::bits::{get_be_bit, nrz, set_be_bit};
use crate::crc::Crc16;
use crate::error::{ModemError, Result};
use crate::mls::Mls;
use crate::ofdm::bin;
use crate::{CRC16_POLY, MLS1_LEN, MLS1_POLY};
use rustfft::num_complex::Complex;

/// Largest representable call sign plus one: 37^9.
pub const CALL_SIGN_LIMIT: u64 = 129_961_739_795_077;

/// Encode a call sign as a base-37 integer. Digits map to 1..=10, letters
/// (case folded) to 11..=36 and space to 0; a space keeps its weight, so
/// interior and trailing spaces shift the accumulator without adding a
/// digit. The result must be in (0, 37^9).
pub fn base37_encode(call_sign: &str) -> Result<u64> {
    let mut acc: u64 = 0;
    for c in call_sign.chars() {
        acc = acc.checked_mul(37).ok_or(ModemError::InvalidCallSign)?;
        match c {
            '0'..='9' => acc += c as u64 - '0' as u64 + 1,
            'a'..='z' => acc += c as u64 - 'a' as u64 + 11,
            'A'..='Z' => acc += c as u64 - 'A' as u64 + 11,
            ' ' => {}
            _ => return Err(ModemError::InvalidCallSign),
        }
    }
    if acc == 0 || acc >= CALL_SIGN_LIMIT {
        return Err(ModemError::InvalidCallSign);
    }
    Ok(acc)
}

/// Fill `fdom` with the header symbol for the 55-bit metadata value `md`.
pub fn metadata_symbol(fdom: &mut [Complex<f32>], mls1_off: i32, bch: &BchEncoder, md: u64) {
    let len = fdom.len();
    let mut data = [0u8; 9];
    let mut parity = [0u8; 23];
    for i in 0..55 {
        set_be_bit(&mut data, i, (md >> i) & 1 != 0);
    }
    let mut crc = Crc16::new(CRC16_POLY);
    crc.reset();
    let check = crc.feed_u64(md << 9);
    for i in 0..16 {
        set_be_bit(&mut data, i + 55, (check >> i) & 1 != 0);
    }
    bch.encode(&data, &mut parity, 71);

    let mut seq = Mls::new(MLS1_POLY);
    let amp = (len as f32 / MLS1_LEN as f32).sqrt();
    for value in fdom.iter_mut() {
        *value = Complex::new(0.0, 0.0);
    }
    fdom[bin(mls1_off - 1, len)] = Complex::new(amp, 0.0);
    for i in 0..71 {
        fdom[bin(i + mls1_off, len)] = Complex::new(f32::from(nrz(get_be_bit(&data, i as usize))), 0.0);
    }
    for i in 71..MLS1_LEN as i32 {
        fdom[bin(i + mls1_off, len)] =
            Complex::new(f32::from(nrz(get_be_bit(&parity, (i - 71) as usize))), 0.0);
    }
    for i in 0..MLS1_LEN as i32 {
        let prev = fdom[bin(i - 1 + mls1_off, len)];
        fdom[bin(i + mls1_off, len)] *= prev;
    }
    for i in 0..MLS1_LEN as i32 {
        fdom[bin(i + mls1_off, len)] *= f32::from(nrz(seq.next()));
    }
}
