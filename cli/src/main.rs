use clap::Parser;
use hound::{SampleFormat, WavSpec, WavWriter};
use std::fs::File;
use std::io::{BufWriter, Read};
use std::path::PathBuf;
use wavecall_core::{base37_encode, Complex, Encoder, ModemError, OperMode, PcmSink, DATA_BYTES};

#[derive(Parser)]
#[command(name = "encode")]
#[command(about = "OFDM waveform encoder producing WAV output")]
#[command(version)]
struct Cli {
    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Sample rate in Hz (8000, 16000, 44100 or 48000)
    #[arg(value_name = "RATE")]
    rate: u32,

    /// Bits per sample (8, 16 or 32)
    #[arg(value_name = "BITS")]
    bits: u16,

    /// Channel count: 1 = real only, 2 = real/imag split
    #[arg(value_name = "CHANNELS")]
    channels: u16,

    /// Input payload file (up to 5380 bytes, zero-filled when shorter)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Carrier frequency offset in Hz, multiple of 50
    #[arg(value_name = "OFFSET")]
    offset: Option<i32>,

    /// Call sign (A-Z, 0-9 and space, up to nine characters)
    #[arg(value_name = "CALLSIGN", default_value = "ANONYMOUS")]
    call_sign: String,

    /// Operation mode (2, 3, 4 or 5)
    #[arg(value_name = "MODE", default_value = "2")]
    mode: u8,
}

/// WAV-backed PCM sink; stereo splits real/imag across the channels.
struct WavSink<W: std::io::Write + std::io::Seek> {
    writer: WavWriter<W>,
    channels: u16,
    bits: u16,
}

impl<W: std::io::Write + std::io::Seek> WavSink<W> {
    fn put(&mut self, value: f32) -> wavecall_core::Result<()> {
        let clamped = value.clamp(-1.0, 1.0);
        let result = match self.bits {
            8 => self.writer.write_sample((clamped * 127.0).round() as i8),
            16 => self.writer.write_sample((clamped * 32767.0).round() as i16),
            _ => self.writer.write_sample(clamped),
        };
        result.map_err(|e| ModemError::Sink(e.to_string()))
    }
}

impl<W: std::io::Write + std::io::Seek> PcmSink for WavSink<W> {
    fn write(&mut self, samples: &[Complex<f32>]) -> wavecall_core::Result<()> {
        for sample in samples {
            self.put(sample.re)?;
            if self.channels == 2 {
                self.put(sample.im)?;
            }
        }
        Ok(())
    }

    fn silence(&mut self, count: usize) -> wavecall_core::Result<()> {
        for _ in 0..count {
            for _ in 0..self.channels {
                self.put(0.0)?;
            }
        }
        Ok(())
    }

    fn channels(&self) -> u16 {
        self.channels
    }
}

fn run(cli: Cli) -> Result<(), String> {
    if cli.bits != 8 && cli.bits != 16 && cli.bits != 32 {
        return Err(format!("Unsupported bits per sample: {}", cli.bits));
    }
    if cli.channels != 1 && cli.channels != 2 {
        return Err(format!("Unsupported channel count: {}", cli.channels));
    }

    let offset = cli
        .offset
        .unwrap_or(if cli.channels == 1 { 2000 } else { 0 });
    let call_sign = base37_encode(&cli.call_sign).map_err(|e| e.to_string())?;
    let mode = OperMode::from_number(cli.mode).map_err(|e| e.to_string())?;

    let mut encoder =
        Encoder::new(cli.rate, cli.channels, offset, call_sign, mode).map_err(|e| e.to_string())?;

    let mut payload = vec![0u8; DATA_BYTES];
    let mut input = File::open(&cli.input)
        .map_err(|e| format!("Couldn't open \"{}\" for reading: {}", cli.input.display(), e))?;
    let mut filled = 0;
    while filled < DATA_BYTES {
        let n = input
            .read(&mut payload[filled..])
            .map_err(|e| format!("Couldn't read \"{}\": {}", cli.input.display(), e))?;
        if n == 0 {
            break;
        }
        filled += n;
    }

    let spec = WavSpec {
        channels: cli.channels,
        sample_rate: cli.rate,
        bits_per_sample: cli.bits,
        sample_format: if cli.bits == 32 {
            SampleFormat::Float
        } else {
            SampleFormat::Int
        },
    };
    let file = File::create(&cli.output)
        .map_err(|e| format!("Couldn't open \"{}\" for writing: {}", cli.output.display(), e))?;
    let writer = WavWriter::new(BufWriter::new(file), spec)
        .map_err(|e| format!("Couldn't write \"{}\": {}", cli.output.display(), e))?;
    let mut sink = WavSink {
        writer,
        channels: cli.channels,
        bits: cli.bits,
    };

    let report = encoder
        .encode(&payload, &mut sink)
        .map_err(|e| e.to_string())?;
    sink.writer
        .finalize()
        .map_err(|e| format!("Couldn't finalize \"{}\": {}", cli.output.display(), e))?;

    eprintln!(
        "real PAPR: {} .. {} dB",
        report.real_min_db, report.real_max_db
    );
    if cli.channels == 2 {
        eprintln!(
            "imag PAPR: {} .. {} dB",
            report.imag_min_db, report.imag_max_db
        );
    }
    Ok(())
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // keep a single diagnostic and exit code 1 for bad usage
            eprintln!("{}", err);
            std::process::exit(1);
        }
    };
    if let Err(message) = run(cli) {
        eprintln!("{}", message);
        std::process::exit(1);
    }
}
