//! OFDM symbol synthesis.
//!
//! Frequency-domain bins go through an optional clipping pass for
//! peak-to-average power reduction, an inverse FFT with explicit
//! normalization, and a raised-cosine guard interval that crossfades the
//! cached cyclic prefix of the previous symbol into the tail of the new
//! one. Per-axis PAPR extremes are tracked across the whole frame because
//! the real and imaginary parts travel as independent PCM channels.
//!
//! The clipping pass works on a 4x zero-padded spectrum: the oversampled
//! time signal is clipped per axis to the unit square, transformed back,
//! and only the originally occupied bins are replaced, which keeps the
//! spectral regrowth out of band at the cost of a little PAPR creep.

use crate::error::Result;
use crate::pcm::PcmSink;
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::f32::consts::PI;
use std::sync::Arc;

/// Wrap a signed carrier index into FFT bin order.
pub fn bin(carrier: i32, len: usize) -> usize {
    let n = len as i32;
    (((carrier % n) + n) % n) as usize
}

/// Power ratio to dB.
pub fn decibel(power: f32) -> f32 {
    10.0 * power.log10()
}

fn lerp(a: Complex<f32>, b: Complex<f32>, x: f32) -> Complex<f32> {
    a + (b - a) * x
}

pub struct SymbolShaper {
    symbol_len: usize,
    guard_len: usize,
    bwd: Arc<dyn Fft<f32>>,
    fwd4: Arc<dyn Fft<f32>>,
    bwd4: Arc<dyn Fft<f32>>,
    temp: Vec<Complex<f32>>,
    tdom: Vec<Complex<f32>>,
    fdom4: Vec<Complex<f32>>,
    tdom4: Vec<Complex<f32>>,
    guard: Vec<Complex<f32>>,
    papr_min: Complex<f32>,
    papr_max: Complex<f32>,
}

impl SymbolShaper {
    pub fn new(symbol_len: usize) -> Self {
        let mut planner = FftPlanner::new();
        let bwd = planner.plan_fft_inverse(symbol_len);
        let fwd4 = planner.plan_fft_forward(4 * symbol_len);
        let bwd4 = planner.plan_fft_inverse(4 * symbol_len);
        let zero = Complex::new(0.0, 0.0);
        Self {
            symbol_len,
            guard_len: symbol_len / 8,
            bwd,
            fwd4,
            bwd4,
            temp: vec![zero; symbol_len],
            tdom: vec![zero; symbol_len],
            fdom4: vec![zero; 4 * symbol_len],
            tdom4: vec![zero; 4 * symbol_len],
            guard: vec![zero; symbol_len / 8],
            papr_min: Complex::new(1000.0, 1000.0),
            papr_max: Complex::new(-1000.0, -1000.0),
        }
    }

    /// Clear crossfade and PAPR state before a new frame.
    pub fn reset(&mut self) {
        for g in self.guard.iter_mut() {
            *g = Complex::new(0.0, 0.0);
        }
        self.papr_min = Complex::new(1000.0, 1000.0);
        self.papr_max = Complex::new(-1000.0, -1000.0);
    }

    /// Synthesize one symbol from `fdom` and emit guard + body to the sink.
    pub fn write_symbol(
        &mut self,
        fdom: &[Complex<f32>],
        sink: &mut dyn PcmSink,
        reduce_papr: bool,
    ) -> Result<()> {
        self.temp.copy_from_slice(fdom);
        if reduce_papr {
            self.improve_papr();
        }

        self.tdom.copy_from_slice(&self.temp);
        self.bwd.process(&mut self.tdom);
        let scale = 1.0 / (8.0 * self.symbol_len as f32).sqrt();
        for sample in self.tdom.iter_mut() {
            *sample = *sample * scale;
        }

        for i in 0..self.guard_len {
            let x = i as f32 / (self.guard_len - 1) as f32;
            let weight = 0.5 * (1.0 - (PI * x).cos());
            self.guard[i] = lerp(
                self.guard[i],
                self.tdom[self.symbol_len - self.guard_len + i],
                weight,
            );
        }

        let mut peak = Complex::new(0.0f32, 0.0);
        let mut mean = Complex::new(0.0f32, 0.0);
        for sample in self.tdom.iter() {
            let power = Complex::new(sample.re * sample.re, sample.im * sample.im);
            peak = Complex::new(peak.re.max(power.re), peak.im.max(power.im));
            mean += power;
        }
        if mean.re > 0.0 && mean.im > 0.0 {
            let papr = Complex::new(peak.re / mean.re, peak.im / mean.im) * self.symbol_len as f32;
            self.papr_min = Complex::new(self.papr_min.re.min(papr.re), self.papr_min.im.min(papr.im));
            self.papr_max = Complex::new(self.papr_max.re.max(papr.re), self.papr_max.im.max(papr.im));
        }

        sink.write(&self.guard)?;
        sink.write(&self.tdom)?;
        self.guard.copy_from_slice(&self.tdom[..self.guard_len]);
        Ok(())
    }

    /// Per-axis PAPR extremes seen so far, as linear power ratios.
    pub fn papr_range(&self) -> (Complex<f32>, Complex<f32>) {
        (self.papr_min, self.papr_max)
    }

    fn improve_papr(&mut self) {
        let n = self.symbol_len as i32;
        let zero = Complex::new(0.0, 0.0);
        for value in self.fdom4.iter_mut() {
            *value = zero;
        }
        for i in -n / 2..n / 2 {
            self.fdom4[bin(i, 4 * self.symbol_len)] = self.temp[bin(i, self.symbol_len)];
        }

        self.tdom4.copy_from_slice(&self.fdom4);
        self.bwd4.process(&mut self.tdom4);
        let scale = 1.0 / (4.0 * self.symbol_len as f32).sqrt();
        for sample in self.tdom4.iter_mut() {
            *sample = *sample * scale;
        }
        for sample in self.tdom4.iter_mut() {
            let amp = sample.re.abs().max(sample.im.abs());
            if amp > 1.0 {
                *sample = *sample / amp;
            }
        }

        self.fdom4.copy_from_slice(&self.tdom4);
        self.fwd4.process(&mut self.fdom4);
        for i in -n / 2..n / 2 {
            let b = bin(i, self.symbol_len);
            if self.temp[b].norm_sqr() != 0.0 {
                self.temp[b] = self.fdom4[bin(i, 4 * self.symbol_len)] * scale;
            } else {
                self.temp[b] = zero;
            }
        }
    }
}
