//! Frame assembly.
//!
//! Drives the whole pipeline for one frame: scramble, outer BCH, inner
//! LDPC, interleave, constellation mapping, and the fixed symbol schedule
//! of pilots, Schmidl-Cox synchronization, metadata headers and data
//! symbols, bracketed by one second of silence on each side.
//!
//! Data symbols are differentially referenced: each occupied bin is the
//! previous symbol's bin value times the new constellation point, with the
//! preceding pilot block as the initial reference. The frequency-domain
//! buffer therefore persists across the data rows and must be multiplied
//! strictly in sequence.

use crate::bch::{BchEncoder, BCH_255_71_FACTORS, BCH_65535_65375_FACTORS};
use crate::bits::{get_le_bit, nrz};
use crate::error::{ModemError, Result};
use crate::framing;
use crate::ldpc::LdpcEncoder;
use crate::ldpc_tables::DVB_T2_TABLE_A3;
use crate::ofdm::{bin, decibel, SymbolShaper};
use crate::pcm::PcmSink;
use crate::psk::{Psk8, Qpsk};
use crate::scramble::Xorshift32;
use crate::sync;
use crate::{symbol_len, OperMode, BCH_BITS, DATA_BITS, DATA_BYTES, LDPC_BITS, MLS0_LEN, MLS1_LEN, SUPPORTED_RATES};
use rustfft::num_complex::Complex;

/// Per-axis PAPR extremes over one frame, in dB.
#[derive(Debug, Clone, Copy)]
pub struct PaprReport {
    pub real_min_db: f32,
    pub real_max_db: f32,
    pub imag_min_db: f32,
    pub imag_max_db: f32,
}

pub struct Encoder {
    rate: u32,
    mode: OperMode,
    call_sign: u64,
    symbol_len: usize,
    cons_cnt: usize,
    code_rows: usize,
    code_off: i32,
    mls0_off: i32,
    mls1_off: i32,
    shaper: SymbolShaper,
    fdom: Vec<Complex<f32>>,
    code: Vec<i8>,
    bint: Vec<i8>,
    bch_header: BchEncoder,
    bch_payload: BchEncoder,
    ldpc: LdpcEncoder,
}

impl Encoder {
    pub fn new(
        rate: u32,
        channels: u16,
        freq_off: i32,
        call_sign: u64,
        mode: OperMode,
    ) -> Result<Self> {
        if channels != 1 && channels != 2 {
            return Err(ModemError::UnsupportedChannels(channels));
        }
        if !SUPPORTED_RATES.contains(&rate) {
            return Err(ModemError::UnsupportedRate(rate));
        }
        let band_width = mode.band_width() as i32;
        let half_rate = rate as i32 / 2;
        if (channels == 1 && freq_off < band_width / 2)
            || freq_off < band_width / 2 - half_rate
            || freq_off > half_rate - band_width / 2
        {
            return Err(ModemError::UnsupportedOffset(freq_off));
        }
        if freq_off % 50 != 0 {
            return Err(ModemError::OffsetNotDivisible(freq_off));
        }
        if call_sign == 0 || call_sign >= framing::CALL_SIGN_LIMIT {
            return Err(ModemError::InvalidCallSign);
        }

        let symbol_len = symbol_len(rate);
        let cons_cnt = LDPC_BITS / mode.mod_bits();
        let code_rows = cons_cnt / mode.code_cols();
        let offset = (freq_off as i64 * symbol_len as i64 / rate as i64) as i32;
        let code_off = offset - mode.code_cols() as i32 / 2;
        let mls0_off = offset - MLS0_LEN as i32 + 1;
        let mls1_off = offset - MLS1_LEN as i32 / 2;

        Ok(Self {
            rate,
            mode,
            call_sign,
            symbol_len,
            cons_cnt,
            code_rows,
            code_off,
            mls0_off,
            mls1_off,
            shaper: SymbolShaper::new(symbol_len),
            fdom: vec![Complex::new(0.0, 0.0); symbol_len],
            code: vec![0i8; LDPC_BITS],
            bint: vec![0i8; LDPC_BITS],
            bch_header: BchEncoder::new(255, 71, &BCH_255_71_FACTORS),
            bch_payload: BchEncoder::new(65535, 65375, &BCH_65535_65375_FACTORS),
            ldpc: LdpcEncoder::new(&DVB_T2_TABLE_A3),
        })
    }

    /// Data OFDM symbols per frame for this mode.
    pub fn code_rows(&self) -> usize {
        self.code_rows
    }

    /// Total OFDM symbols per frame including preambles, headers and the
    /// trailing crossfade flush.
    pub fn frame_symbols(&self) -> usize {
        8 + self.code_rows
    }

    /// Encode one payload of up to [`DATA_BYTES`] bytes; shorter payloads
    /// are zero-filled. Writes one second of silence, the modulated frame
    /// and another second of silence to the sink, and returns the PAPR
    /// extremes seen across the frame.
    pub fn encode(&mut self, payload: &[u8], sink: &mut dyn PcmSink) -> Result<PaprReport> {
        if payload.len() > DATA_BYTES {
            return Err(ModemError::PayloadTooLarge(payload.len()));
        }

        let parity_bytes = self.bch_payload.parity_bits() / 8;
        let mut data = vec![0u8; DATA_BYTES + parity_bytes];
        data[..payload.len()].copy_from_slice(payload);
        Xorshift32::new().mix(&mut data[..DATA_BYTES]);

        self.shaper.reset();
        sink.silence(self.rate as usize)?;

        let md = (self.call_sign << 8) | self.mode.number() as u64;
        self.pilot(sink)?;
        self.schmidl_cox(sink)?;
        self.header(md, sink)?;
        self.pilot(sink)?;

        {
            let (message, parity) = data.split_at_mut(DATA_BYTES);
            self.bch_payload.encode(message, parity, DATA_BITS);
        }
        for i in 0..BCH_BITS {
            self.code[i] = nrz(get_le_bit(&data, i));
        }
        {
            let (info, parity) = self.code.split_at_mut(BCH_BITS);
            self.ldpc.encode(info, parity);
        }
        self.interleave();

        let mod_bits = self.mode.mod_bits();
        let code_cols = self.mode.code_cols();
        for row in 0..self.code_rows {
            for col in 0..code_cols {
                let at = mod_bits * (code_cols * row + col);
                let point = self.map(&self.bint[at..at + mod_bits]);
                let slot = bin(col as i32 + self.code_off, self.symbol_len);
                self.fdom[slot] *= point;
            }
            self.shaper.write_symbol(&self.fdom, sink, true)?;
        }

        self.schmidl_cox(sink)?;
        self.header(md, sink)?;
        self.pilot(sink)?;

        // flush the guard crossfade with one silent symbol
        for value in self.fdom.iter_mut() {
            *value = Complex::new(0.0, 0.0);
        }
        self.shaper.write_symbol(&self.fdom, sink, true)?;

        sink.silence(self.rate as usize)?;

        let (min, max) = self.shaper.papr_range();
        Ok(PaprReport {
            real_min_db: decibel(min.re),
            real_max_db: decibel(max.re),
            imag_min_db: decibel(min.im),
            imag_max_db: decibel(max.im),
        })
    }

    fn pilot(&mut self, sink: &mut dyn PcmSink) -> Result<()> {
        sync::pilot_block(&mut self.fdom, self.code_off, self.mode.code_cols());
        self.shaper.write_symbol(&self.fdom, sink, true)
    }

    fn schmidl_cox(&mut self, sink: &mut dyn PcmSink) -> Result<()> {
        sync::schmidl_cox(&mut self.fdom, self.mls0_off);
        self.shaper.write_symbol(&self.fdom, sink, false)
    }

    fn header(&mut self, md: u64, sink: &mut dyn PcmSink) -> Result<()> {
        framing::metadata_symbol(&mut self.fdom, self.mls1_off, &self.bch_header, md);
        self.shaper.write_symbol(&self.fdom, sink, true)
    }

    fn interleave(&mut self) {
        let mod_bits = self.mode.mod_bits();
        for i in 0..self.cons_cnt {
            for k in 0..mod_bits {
                self.bint[mod_bits * i + k] = self.code[self.cons_cnt * k + i];
            }
        }
    }

    fn map(&self, code: &[i8]) -> Complex<f32> {
        match self.mode {
            OperMode::Mode2 | OperMode::Mode3 => Psk8::map(code),
            OperMode::Mode4 | OperMode::Mode5 => Qpsk::map(code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pcm::SampleBuffer;

    #[test]
    fn test_geometry_per_mode() {
        for (mode, rows) in [
            (OperMode::Mode2, 50),
            (OperMode::Mode3, 54),
            (OperMode::Mode4, 81),
            (OperMode::Mode5, 90),
        ] {
            let enc = Encoder::new(8000, 2, 0, 1, mode).unwrap();
            assert_eq!(enc.code_rows(), rows);
            assert_eq!(enc.frame_symbols(), rows + 8);
        }
    }

    #[test]
    fn test_bin_offsets() {
        let enc = Encoder::new(8000, 1, 2000, 1, OperMode::Mode2).unwrap();
        // 2000 Hz at 6.25 Hz per bin
        assert_eq!(enc.code_off, 320 - 216);
        assert_eq!(enc.mls0_off, 320 - 126);
        assert_eq!(enc.mls1_off, 320 - 127);
    }

    #[test]
    fn test_offset_validation() {
        // mono must clear half the bandwidth
        assert!(Encoder::new(8000, 1, 1350, 1, OperMode::Mode2).is_ok());
        assert!(Encoder::new(8000, 1, 1300, 1, OperMode::Mode2).is_err());
        // mode 4: 1250 Hz is exactly half the bandwidth
        assert!(Encoder::new(8000, 1, 1250, 1, OperMode::Mode4).is_ok());
        assert!(Encoder::new(8000, 1, 1200, 1, OperMode::Mode4).is_err());
        // stereo allows negative offsets down to the band edge
        assert!(Encoder::new(8000, 2, 0, 1, OperMode::Mode2).is_ok());
        assert!(Encoder::new(8000, 2, -2650, 1, OperMode::Mode2).is_ok());
        assert!(Encoder::new(8000, 2, -2700, 1, OperMode::Mode2).is_err());
        assert!(Encoder::new(8000, 2, 2700, 1, OperMode::Mode2).is_err());
    }

    #[test]
    fn test_offset_must_be_multiple_of_50() {
        assert!(matches!(
            Encoder::new(8000, 1, 2075, 1, OperMode::Mode2),
            Err(ModemError::OffsetNotDivisible(2075))
        ));
        assert!(Encoder::new(8000, 1, 2050, 1, OperMode::Mode2).is_ok());
    }

    #[test]
    fn test_rate_validation() {
        assert!(matches!(
            Encoder::new(22050, 1, 2000, 1, OperMode::Mode2),
            Err(ModemError::UnsupportedRate(22050))
        ));
    }

    #[test]
    fn test_payload_size_guard() {
        let mut enc = Encoder::new(8000, 1, 2000, 1, OperMode::Mode2).unwrap();
        let mut sink = SampleBuffer::new(1);
        let payload = vec![0u8; DATA_BYTES + 1];
        assert!(enc.encode(&payload, &mut sink).is_err());
    }

    #[test]
    fn test_interleave_rule() {
        let mut enc = Encoder::new(8000, 2, 0, 1, OperMode::Mode2).unwrap();
        for (i, value) in enc.code.iter_mut().enumerate() {
            *value = if (i * 2654435761) % 7 < 3 { -1 } else { 1 };
        }
        enc.interleave();
        let cons_cnt = enc.cons_cnt;
        let mod_bits = enc.mode.mod_bits();
        for i in (0..cons_cnt).step_by(997) {
            for k in 0..mod_bits {
                assert_eq!(enc.bint[mod_bits * i + k], enc.code[cons_cnt * k + i]);
            }
        }
    }
}
