//! OFDM waveform encoder for narrowband acoustic and radio channels
//!
//! Turns a fixed-size payload into a baseband OFDM frame with Schmidl-Cox
//! synchronization, pilot blocks, a BCH-protected metadata header and a
//! concatenated BCH+LDPC coded data section, with iterative clipping for
//! peak-to-average power reduction.

pub mod bch;
pub mod bits;
pub mod crc;
pub mod encoder;
pub mod error;
pub mod framing;
pub mod ldpc;
pub mod ldpc_tables;
pub mod mls;
pub mod ofdm;
pub mod pcm;
pub mod psk;
pub mod scramble;
pub mod sync;

pub use encoder::{Encoder, PaprReport};
pub use error::{ModemError, Result};
pub use framing::base37_encode;
pub use pcm::{PcmSink, SampleBuffer};
pub use rustfft::num_complex::Complex;

// Coded block geometry (fixed across modes)
pub const LDPC_BITS: usize = 64800;
pub const BCH_BITS: usize = LDPC_BITS - 21600; // 43200
pub const DATA_BITS: usize = BCH_BITS - 10 * 16; // 43040
pub const DATA_BYTES: usize = DATA_BITS / 8; // 5380

// Synchronization and whitening sequences
pub const MLS0_LEN: usize = 127;
pub const MLS0_POLY: u64 = 0b1000_1001;
pub const MLS1_LEN: usize = 255;
pub const MLS1_POLY: u64 = 0b1_0010_1011;
pub const MLS2_POLY: u64 = 0b1001_0101_0001;

/// Header checksum polynomial (reflected form).
pub const CRC16_POLY: u16 = 0xA8F4;

pub const SUPPORTED_RATES: [u32; 4] = [8000, 16000, 44100, 48000];

/// Samples per OFDM symbol at the given rate (160 ms of signal).
pub fn symbol_len(rate: u32) -> usize {
    (1280 * rate as usize) / 8000
}

/// Guard interval length, one eighth of a symbol.
pub fn guard_len(rate: u32) -> usize {
    symbol_len(rate) / 8
}

/// Operating mode: fixes constellation, data-band width and bandwidth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperMode {
    Mode2,
    Mode3,
    Mode4,
    Mode5,
}

impl OperMode {
    pub fn from_number(mode: u8) -> Result<Self> {
        match mode {
            2 => Ok(OperMode::Mode2),
            3 => Ok(OperMode::Mode3),
            4 => Ok(OperMode::Mode4),
            5 => Ok(OperMode::Mode5),
            other => Err(ModemError::UnsupportedMode(other)),
        }
    }

    pub fn number(self) -> u8 {
        match self {
            OperMode::Mode2 => 2,
            OperMode::Mode3 => 3,
            OperMode::Mode4 => 4,
            OperMode::Mode5 => 5,
        }
    }

    /// Number of occupied carriers in the data band.
    pub fn code_cols(self) -> usize {
        match self {
            OperMode::Mode2 => 432,
            OperMode::Mode3 | OperMode::Mode4 => 400,
            OperMode::Mode5 => 360,
        }
    }

    /// Coded bits per constellation point.
    pub fn mod_bits(self) -> usize {
        match self {
            OperMode::Mode2 | OperMode::Mode3 => 3,
            OperMode::Mode4 | OperMode::Mode5 => 2,
        }
    }

    /// Occupied bandwidth in Hz.
    pub fn band_width(self) -> u32 {
        match self {
            OperMode::Mode2 => 2700,
            OperMode::Mode3 | OperMode::Mode4 => 2500,
            OperMode::Mode5 => 2250,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_geometry() {
        assert_eq!(symbol_len(8000), 1280);
        assert_eq!(guard_len(8000), 160);
        assert_eq!(symbol_len(16000), 2560);
        assert_eq!(symbol_len(44100), 7056);
        assert_eq!(symbol_len(48000), 7680);
        assert_eq!(guard_len(48000), 960);
    }

    #[test]
    fn test_mode_table() {
        for (num, cols, bits, bw) in [
            (2u8, 432usize, 3usize, 2700u32),
            (3, 400, 3, 2500),
            (4, 400, 2, 2500),
            (5, 360, 2, 2250),
        ] {
            let mode = OperMode::from_number(num).unwrap();
            assert_eq!(mode.number(), num);
            assert_eq!(mode.code_cols(), cols);
            assert_eq!(mode.mod_bits(), bits);
            assert_eq!(mode.band_width(), bw);
            // data symbols divide the coded block evenly
            assert_eq!((LDPC_BITS / bits) % cols, 0);
        }
        assert!(OperMode::from_number(1).is_err());
        assert!(OperMode::from_number(6).is_err());
    }

    #[test]
    fn test_coded_block_sizes() {
        assert_eq!(BCH_BITS, 43200);
        assert_eq!(DATA_BITS, 43040);
        assert_eq!(DATA_BYTES, 5380);
    }
}
