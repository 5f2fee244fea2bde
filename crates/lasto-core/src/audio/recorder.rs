//! Default-device microphone recording to in-memory WAV.
//!
//! The vendor accepts plain WAV uploads, so no resampling or encoding is
//! done here: samples are captured at the device's native rate and written
//! out as 16-bit PCM.

use std::io::Cursor;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, Stream, StreamConfig};

/// An in-progress recording on the default input device.
pub struct Recorder {
    stream: Stream,
    samples: Arc<Mutex<Vec<f32>>>,
    sample_rate: u32,
    channels: u16,
}

impl Recorder {
    /// Start capturing from the default input device.
    pub fn start() -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .context("No input device available")?;
        let config = device
            .default_input_config()
            .context("Failed to query input device configuration")?;

        crate::verbose!(
            "Recording from '{}' at {} Hz, {} channel(s)",
            device.name().unwrap_or_else(|_| "unknown".to_string()),
            config.sample_rate(),
            config.channels()
        );

        let samples = Arc::new(Mutex::new(Vec::new()));
        let stream_config: StreamConfig = config.config();
        let stream = match config.sample_format() {
            SampleFormat::F32 => {
                build_stream::<f32>(&device, &stream_config, samples.clone())?
            }
            SampleFormat::I16 => {
                build_stream::<i16>(&device, &stream_config, samples.clone())?
            }
            SampleFormat::U16 => {
                build_stream::<u16>(&device, &stream_config, samples.clone())?
            }
            format => anyhow::bail!("Unsupported input sample format: {format:?}"),
        };
        stream.play().context("Failed to start audio stream")?;

        Ok(Self {
            stream,
            samples,
            sample_rate: stream_config.sample_rate,
            channels: stream_config.channels,
        })
    }

    /// Stop capturing and encode what was recorded as 16-bit PCM WAV.
    pub fn stop(self) -> Result<Vec<u8>> {
        drop(self.stream);
        let samples = self
            .samples
            .lock()
            .map_err(|_| anyhow::anyhow!("Audio buffer lock poisoned"))?;
        if samples.is_empty() {
            anyhow::bail!("No audio captured");
        }
        crate::verbose!(
            "Captured {:.1}s of audio",
            samples.len() as f64 / (self.sample_rate as f64 * self.channels as f64)
        );
        encode_wav(&samples, self.sample_rate, self.channels)
    }
}

fn build_stream<T>(
    device: &Device,
    config: &StreamConfig,
    samples: Arc<Mutex<Vec<f32>>>,
) -> Result<Stream>
where
    T: cpal::Sample + cpal::SizedSample,
    f32: cpal::FromSample<T>,
{
    // ALSA reports sporadic non-fatal stream errors; they don't interrupt
    // capture, so they are only worth a verbose note.
    let err_fn = |err| crate::verbose!("Audio stream error (non-fatal): {err}");

    let stream = device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            let mut buffer = samples.lock().unwrap();
            buffer.extend(data.iter().map(|&s| {
                let sample: f32 = cpal::Sample::from_sample(s);
                sample
            }));
        },
        err_fn,
        None,
    )?;
    Ok(stream)
}

fn encode_wav(samples: &[f32], sample_rate: u32, channels: u16) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    let mut writer =
        hound::WavWriter::new(&mut cursor, spec).context("Failed to create WAV writer")?;
    for &sample in samples {
        let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        writer.write_sample(value).context("Failed to write WAV sample")?;
    }
    writer.finalize().context("Failed to finalize WAV data")?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoded_wav_parses_back() {
        let samples: Vec<f32> = (0..1600)
            .map(|i| (i as f32 * 0.05).sin() * 0.5)
            .collect();
        let wav = encode_wav(&samples, 16_000, 1).unwrap();

        let reader = hound::WavReader::new(Cursor::new(wav)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.sample_rate, 16_000);
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(reader.len(), 1600);
    }

    #[test]
    fn clipping_samples_are_clamped() {
        let wav = encode_wav(&[2.0, -2.0], 8_000, 1).unwrap();
        let mut reader = hound::WavReader::new(Cursor::new(wav)).unwrap();
        let values: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(values, vec![i16::MAX, i16::MIN + 1]);
    }
}
