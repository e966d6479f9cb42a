//! RIFF/WAVE reader and writer for 16-bit mono PCM.
//!
//! Only one sample layout is accepted: format tag 1, one channel, 16 bits per
//! sample at [`SAMPLE_RATE`]. Anything else is rejected with
//! [`WavError::UnsupportedFormat`] naming the offending field. Unknown chunks
//! are skipped by their declared length (plus the RIFF pad byte for odd
//! sizes), but "fmt " must come before "data".

use std::io::{self, Read, Write};

use crate::error::WavError;

/// Sample rate every clip must be recorded at.
pub const SAMPLE_RATE: u32 = 44_100;

const PCM_FORMAT: u16 = 1;
const CHANNELS: u16 = 1;
const BITS_PER_SAMPLE: u16 = 16;
const BLOCK_ALIGN: u16 = CHANNELS * BITS_PER_SAMPLE / 8;
const BYTE_RATE: u32 = SAMPLE_RATE * BLOCK_ALIGN as u32;
const FMT_PAYLOAD_SIZE: u32 = 16;

/// Most sample bytes reserved before reading. The declared size is not
/// trusted, so larger chunks grow as they arrive.
const MAX_DATA_RESERVE: u32 = 1 << 20;

/// Fields of the "fmt " chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FormatChunk {
    format: u16,
    channels: u16,
    sample_rate: u32,
    byte_rate: u32,
    block_align: u16,
    bits_per_sample: u16,
}

impl FormatChunk {
    fn parse(payload: &[u8; 16]) -> Self {
        let u16_at = |i: usize| u16::from_le_bytes([payload[i], payload[i + 1]]);
        let u32_at = |i: usize| {
            u32::from_le_bytes([payload[i], payload[i + 1], payload[i + 2], payload[i + 3]])
        };
        Self {
            format: u16_at(0),
            channels: u16_at(2),
            sample_rate: u32_at(4),
            byte_rate: u32_at(8),
            block_align: u16_at(12),
            bits_per_sample: u16_at(14),
        }
    }

    fn validate(&self) -> Result<(), WavError> {
        if self.format != PCM_FORMAT {
            return Err(WavError::unsupported(format!(
                "format tag {} (only PCM is supported)",
                self.format
            )));
        }
        if self.channels != CHANNELS {
            return Err(WavError::unsupported(format!(
                "{} channels (only mono is supported)",
                self.channels
            )));
        }
        if self.sample_rate != SAMPLE_RATE {
            return Err(WavError::unsupported(format!(
                "sample rate {} Hz (expected {} Hz)",
                self.sample_rate, SAMPLE_RATE
            )));
        }
        if self.bits_per_sample != BITS_PER_SAMPLE {
            return Err(WavError::unsupported(format!(
                "{} bits per sample (expected {})",
                self.bits_per_sample, BITS_PER_SAMPLE
            )));
        }
        if self.byte_rate != BYTE_RATE || self.block_align != BLOCK_ALIGN {
            return Err(WavError::unsupported(format!(
                "byte rate {} / block align {} (expected {} / {})",
                self.byte_rate, self.block_align, BYTE_RATE, BLOCK_ALIGN
            )));
        }
        Ok(())
    }
}

/// Read as many bytes as possible into `buf`, stopping early only at EOF.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Discard `count` bytes, failing if the stream ends first.
fn skip<R: Read>(reader: &mut R, count: u64) -> Result<(), WavError> {
    let skipped = io::copy(&mut reader.take(count), &mut io::sink())?;
    if skipped != count {
        return Err(WavError::TruncatedHeader);
    }
    Ok(())
}

/// Decode a RIFF/WAVE stream into mono 16-bit samples.
pub fn read_wav<R: Read>(mut reader: R) -> Result<Vec<i16>, WavError> {
    let mut header = [0u8; 12];
    if read_full(&mut reader, &mut header)? != header.len() {
        return Err(WavError::TruncatedHeader);
    }
    if &header[0..4] != b"RIFF" || &header[8..12] != b"WAVE" {
        return Err(WavError::NotRiff);
    }

    let mut format: Option<FormatChunk> = None;
    loop {
        let mut chunk_header = [0u8; 8];
        match read_full(&mut reader, &mut chunk_header)? {
            0 => return Err(WavError::MissingData),
            8 => {}
            _ => return Err(WavError::TruncatedHeader),
        }
        let id = [chunk_header[0], chunk_header[1], chunk_header[2], chunk_header[3]];
        let size = u32::from_le_bytes([
            chunk_header[4],
            chunk_header[5],
            chunk_header[6],
            chunk_header[7],
        ]);
        let padding = u64::from(size & 1);

        match &id {
            b"fmt " => {
                if size < FMT_PAYLOAD_SIZE {
                    return Err(WavError::TruncatedHeader);
                }
                let mut payload = [0u8; 16];
                if read_full(&mut reader, &mut payload)? != payload.len() {
                    return Err(WavError::TruncatedHeader);
                }
                let chunk = FormatChunk::parse(&payload);
                chunk.validate()?;
                format = Some(chunk);
                skip(&mut reader, u64::from(size - FMT_PAYLOAD_SIZE) + padding)?;
            }
            b"data" => {
                if format.is_none() {
                    return Err(WavError::MissingFormatChunk);
                }
                let mut bytes = Vec::with_capacity(size.min(MAX_DATA_RESERVE) as usize);
                let found = reader.take(u64::from(size)).read_to_end(&mut bytes)? as u64;
                if found != u64::from(size) {
                    return Err(WavError::TruncatedData {
                        expected: size,
                        found,
                    });
                }
                if size & 1 == 1 {
                    log::warn!(
                        "WAV data chunk has an odd size ({} bytes); dropping the trailing byte",
                        size
                    );
                }
                let samples = bytes
                    .chunks_exact(2)
                    .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
                    .collect();
                return Ok(samples);
            }
            _ => {
                log::trace!(
                    "Skipping WAV chunk {:?} ({} bytes)",
                    String::from_utf8_lossy(&id),
                    size
                );
                skip(&mut reader, u64::from(size) + padding)?;
            }
        }
    }
}

/// Encode mono 16-bit samples as a minimal RIFF/WAVE stream.
pub fn write_wav<W: Write>(mut writer: W, samples: &[i16]) -> io::Result<()> {
    let data_size = u32::try_from(samples.len() * 2)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "too many samples for WAV"))?;
    let riff_size = 4 + (8 + FMT_PAYLOAD_SIZE) + 8 + data_size + (data_size & 1);

    writer.write_all(b"RIFF")?;
    writer.write_all(&riff_size.to_le_bytes())?;
    writer.write_all(b"WAVE")?;

    writer.write_all(b"fmt ")?;
    writer.write_all(&FMT_PAYLOAD_SIZE.to_le_bytes())?;
    writer.write_all(&PCM_FORMAT.to_le_bytes())?;
    writer.write_all(&CHANNELS.to_le_bytes())?;
    writer.write_all(&SAMPLE_RATE.to_le_bytes())?;
    writer.write_all(&BYTE_RATE.to_le_bytes())?;
    writer.write_all(&BLOCK_ALIGN.to_le_bytes())?;
    writer.write_all(&BITS_PER_SAMPLE.to_le_bytes())?;

    writer.write_all(b"data")?;
    writer.write_all(&data_size.to_le_bytes())?;
    for sample in samples {
        writer.write_all(&sample.to_le_bytes())?;
    }
    Ok(())
}

/// Duplicate each mono sample into an interleaved left/right pair.
pub fn to_stereo(mono: &[i16]) -> Vec<i16> {
    mono.iter().flat_map(|&sample| [sample, sample]).collect()
}
