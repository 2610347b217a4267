//! PCM sample sink interface.
//!
//! The encoder produces complex baseband samples in strict time order. A
//! stereo sink carries the real part on channel 0 and the imaginary part on
//! channel 1; a mono sink keeps only the real part.

use crate::error::Result;
use rustfft::num_complex::Complex;

pub trait PcmSink {
    /// Append samples in time order.
    fn write(&mut self, samples: &[Complex<f32>]) -> Result<()>;

    /// Append `count` frames of silence.
    fn silence(&mut self, count: usize) -> Result<()>;

    fn channels(&self) -> u16;
}

/// Growable in-memory sink.
pub struct SampleBuffer {
    pub samples: Vec<Complex<f32>>,
    channels: u16,
}

impl SampleBuffer {
    pub fn new(channels: u16) -> Self {
        Self {
            samples: Vec::new(),
            channels,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl PcmSink for SampleBuffer {
    fn write(&mut self, samples: &[Complex<f32>]) -> Result<()> {
        self.samples.extend_from_slice(samples);
        Ok(())
    }

    fn silence(&mut self, count: usize) -> Result<()> {
        self.samples
            .resize(self.samples.len() + count, Complex::new(0.0, 0.0));
        Ok(())
    }

    fn channels(&self) -> u16 {
        self.channels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_buffer_accumulates_in_order() {
        let mut sink = SampleBuffer::new(2);
        sink.silence(3).unwrap();
        sink.write(&[Complex::new(1.0, -1.0)]).unwrap();
        assert_eq!(sink.len(), 4);
        assert_eq!(sink.samples[2], Complex::new(0.0, 0.0));
        assert_eq!(sink.samples[3], Complex::new(1.0, -1.0));
        assert_eq!(sink.channels(), 2);
    }
}
