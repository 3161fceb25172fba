//! Captured audio clips and WAV conversion

use std::io::Cursor;
use std::path::Path;

use crate::{Error, Result};

/// Interleaved 16-bit PCM audio as captured by the browser
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    /// Samples per second per channel
    pub sample_rate: u32,

    /// Number of interleaved channels
    pub channels: u16,

    /// Interleaved samples
    pub samples: Vec<i16>,
}

impl AudioClip {
    /// Create a mono clip
    #[must_use]
    pub const fn mono(sample_rate: u32, samples: Vec<i16>) -> Self {
        Self {
            sample_rate,
            channels: 1,
            samples,
        }
    }

    /// Whether the clip carries no audio
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Length of the clip in seconds
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 || self.channels == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / (self.sample_rate as f32 * f32::from(self.channels))
    }

    /// Build a clip from raw little-endian 16-bit PCM bytes
    ///
    /// # Errors
    ///
    /// Returns error if the format is invalid or the byte count is not a
    /// whole number of frames
    pub fn from_pcm16le(bytes: &[u8], sample_rate: u32, channels: u16) -> Result<Self> {
        validate_format(sample_rate, channels)?;

        let frame_bytes = 2 * usize::from(channels);
        if bytes.len() % frame_bytes != 0 {
            return Err(Error::Audio(format!(
                "PCM payload of {} bytes is not a whole number of {channels}-channel frames",
                bytes.len()
            )));
        }

        let samples = bytes
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
            .collect();

        Ok(Self {
            sample_rate,
            channels,
            samples,
        })
    }

    /// Decode a WAV file into a clip
    ///
    /// Integer PCM of up to 16 bits is taken as-is; float and wider integer
    /// formats are scaled to 16 bits.
    ///
    /// # Errors
    ///
    /// Returns error if the bytes are not a readable WAV file
    pub fn from_wav(bytes: &[u8]) -> Result<Self> {
        let mut reader =
            hound::WavReader::new(Cursor::new(bytes)).map_err(|e| Error::Audio(e.to_string()))?;
        let spec = reader.spec();

        let samples = match (spec.sample_format, spec.bits_per_sample) {
            (hound::SampleFormat::Int, bits) if bits <= 16 => reader
                .samples::<i16>()
                .collect::<std::result::Result<Vec<_>, _>>(),
            (hound::SampleFormat::Int, bits) => {
                let shift = u32::from(bits - 16);
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| narrow_i32(v >> shift)))
                    .collect()
            }
            (hound::SampleFormat::Float, _) => reader
                .samples::<f32>()
                .map(|s| s.map(f32_to_i16))
                .collect(),
        }
        .map_err(|e| Error::Audio(e.to_string()))?;

        Ok(Self {
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            samples,
        })
    }

    /// Encode the clip as 16-bit PCM WAV bytes
    ///
    /// # Errors
    ///
    /// Returns error if WAV encoding fails
    pub fn to_wav_bytes(&self) -> Result<Vec<u8>> {
        validate_format(self.sample_rate, self.channels)?;

        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, self.wav_spec())
                .map_err(|e| Error::Audio(e.to_string()))?;
            for &sample in &self.samples {
                writer
                    .write_sample(sample)
                    .map_err(|e| Error::Audio(e.to_string()))?;
            }
            writer.finalize().map_err(|e| Error::Audio(e.to_string()))?;
        }

        Ok(cursor.into_inner())
    }

    /// Write the clip to `path` as a 16-bit PCM WAV file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be created or encoding fails
    pub fn write_wav(&self, path: &Path) -> Result<()> {
        validate_format(self.sample_rate, self.channels)?;

        let mut writer = hound::WavWriter::create(path, self.wav_spec())
            .map_err(|e| Error::Audio(e.to_string()))?;
        for &sample in &self.samples {
            writer
                .write_sample(sample)
                .map_err(|e| Error::Audio(e.to_string()))?;
        }
        writer.finalize().map_err(|e| Error::Audio(e.to_string()))?;

        Ok(())
    }

    const fn wav_spec(&self) -> hound::WavSpec {
        hound::WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        }
    }
}

fn validate_format(sample_rate: u32, channels: u16) -> Result<()> {
    if sample_rate == 0 {
        return Err(Error::Audio("sample rate must be greater than zero".to_string()));
    }
    if channels == 0 {
        return Err(Error::Audio("channel count must be greater than zero".to_string()));
    }
    Ok(())
}

/// Convert f32 [-1.0, 1.0] to i16
#[allow(clippy::cast_possible_truncation)]
fn f32_to_i16(sample: f32) -> i16 {
    (sample * 32767.0).clamp(-32768.0, 32767.0) as i16
}

#[allow(clippy::cast_possible_truncation)]
fn narrow_i32(sample: i32) -> i16 {
    sample.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pcm_bytes_decode_little_endian() {
        let bytes = [0x01, 0x00, 0xff, 0xff, 0x00, 0x80];
        let clip = AudioClip::from_pcm16le(&bytes, 16_000, 1).unwrap();
        assert_eq!(clip.samples, vec![1, -1, i16::MIN]);
    }

    #[test]
    fn pcm_rejects_partial_frames() {
        assert!(AudioClip::from_pcm16le(&[0x00, 0x01, 0x02], 16_000, 1).is_err());
        // Three samples cannot form stereo frames
        assert!(AudioClip::from_pcm16le(&[0; 6], 16_000, 2).is_err());
    }

    #[test]
    fn pcm_rejects_zero_rate() {
        assert!(AudioClip::from_pcm16le(&[0; 4], 0, 1).is_err());
    }

    #[test]
    fn wav_bytes_decode_back() {
        let clip = AudioClip::mono(22_050, vec![0, 1000, -1000, i16::MAX]);
        let wav = clip.to_wav_bytes().unwrap();
        assert_eq!(&wav[..4], b"RIFF");

        let decoded = AudioClip::from_wav(&wav).unwrap();
        assert_eq!(decoded, clip);
    }

    #[test]
    fn float_wav_is_scaled() {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 8_000,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            writer.write_sample(1.0_f32).unwrap();
            writer.write_sample(-2.0_f32).unwrap();
            writer.finalize().unwrap();
        }

        let clip = AudioClip::from_wav(&cursor.into_inner()).unwrap();
        assert_eq!(clip.samples, vec![32767, -32768]);
    }

    #[test]
    fn garbage_is_not_wav() {
        assert!(AudioClip::from_wav(b"definitely not audio").is_err());
    }

    #[test]
    fn duration() {
        let clip = AudioClip {
            sample_rate: 8_000,
            channels: 2,
            samples: vec![0; 16_000],
        };
        assert!((clip.duration_secs() - 1.0).abs() < f32::EPSILON);
    }
}
