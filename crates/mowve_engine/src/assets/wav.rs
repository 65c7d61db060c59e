//! RIFF/WAVE parsing
//!
//! Only the canonical layout is accepted: a `RIFF` header, the `WAVE` form
//! type, a 16-byte `fmt ` chunk, then any number of chunks up to `data`.
//! Anything else is reported as [`AssetError::MalformedWav`].

use super::AssetError;

/// PCM format block (the 16-byte `fmt ` chunk)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaveFormat {
    /// 1 for integer PCM
    pub format_tag: u16,
    /// Interleaved channel count
    pub channels: u16,
    /// Sample rate in Hz
    pub samples_per_sec: u32,
    /// Byte rate
    pub avg_bytes_per_sec: u32,
    /// Bytes per sample frame
    pub block_align: u16,
    /// Bits per sample
    pub bits_per_sample: u16,
}

impl WaveFormat {
    /// 16-bit integer PCM
    pub const fn pcm16(channels: u16, samples_per_sec: u32) -> Self {
        let block_align = channels * 2;
        Self {
            format_tag: 1,
            channels,
            samples_per_sec,
            avg_bytes_per_sec: samples_per_sec * block_align as u32,
            block_align,
            bits_per_sample: 16,
        }
    }
}

/// Decoded WAV contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WavData {
    /// Sample format
    pub format: WaveFormat,
    /// Raw sample bytes from the `data` chunk
    pub pcm: Vec<u8>,
}

const FORMAT_CHUNK_LEN: u32 = 16;

struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, len: usize) -> Result<&'a [u8], AssetError> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| AssetError::MalformedWav(format!("truncated at byte {}", self.offset)))?;
        let slice = &self.bytes[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    fn tag(&mut self) -> Result<[u8; 4], AssetError> {
        let b = self.take(4)?;
        Ok([b[0], b[1], b[2], b[3]])
    }

    fn expect_tag(&mut self, expected: &[u8; 4]) -> Result<(), AssetError> {
        let found = self.tag()?;
        if &found == expected {
            Ok(())
        } else {
            Err(AssetError::MalformedWav(format!(
                "expected '{}' tag, found '{}'",
                String::from_utf8_lossy(expected),
                String::from_utf8_lossy(&found)
            )))
        }
    }

    fn u16(&mut self) -> Result<u16, AssetError> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32, AssetError> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }
}

/// Parse a WAV file held in memory
pub fn parse_wav(bytes: &[u8]) -> Result<WavData, AssetError> {
    let mut reader = Reader { bytes, offset: 0 };

    reader.expect_tag(b"RIFF")?;
    let _riff_len = reader.u32()?;
    reader.expect_tag(b"WAVE")?;
    reader.expect_tag(b"fmt ")?;

    let format_len = reader.u32()?;
    if format_len != FORMAT_CHUNK_LEN {
        return Err(AssetError::MalformedWav(format!(
            "format chunk is {format_len} bytes, expected {FORMAT_CHUNK_LEN}"
        )));
    }
    let format = WaveFormat {
        format_tag: reader.u16()?,
        channels: reader.u16()?,
        samples_per_sec: reader.u32()?,
        avg_bytes_per_sec: reader.u32()?,
        block_align: reader.u16()?,
        bits_per_sample: reader.u16()?,
    };

    loop {
        let tag = reader.tag()?;
        let len = reader.u32()? as usize;
        if &tag == b"data" {
            let pcm = reader.take(len)?.to_vec();
            return Ok(WavData { format, pcm });
        }
        // chunks are word aligned
        reader.take(len.saturating_add(len & 1))?;
    }
}

/// Serialise PCM into a canonical WAV file
pub fn encode_wav(format: &WaveFormat, pcm: &[u8]) -> Vec<u8> {
    let data_len = u32::try_from(pcm.len()).unwrap_or(u32::MAX);
    let mut out = Vec::with_capacity(44 + pcm.len());
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&data_len.saturating_add(36).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&FORMAT_CHUNK_LEN.to_le_bytes());
    out.extend_from_slice(&format.format_tag.to_le_bytes());
    out.extend_from_slice(&format.channels.to_le_bytes());
    out.extend_from_slice(&format.samples_per_sec.to_le_bytes());
    out.extend_from_slice(&format.avg_bytes_per_sec.to_le_bytes());
    out.extend_from_slice(&format.block_align.to_le_bytes());
    out.extend_from_slice(&format.bits_per_sample.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    out.extend_from_slice(pcm);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<u8> {
        encode_wav(&WaveFormat::pcm16(2, 44_100), &[1, 0, 2, 0, 3, 0, 4, 0])
    }

    #[test]
    fn test_parses_canonical_file() {
        let wav = parse_wav(&sample()).unwrap();
        assert_eq!(wav.format.channels, 2);
        assert_eq!(wav.format.samples_per_sec, 44_100);
        assert_eq!(wav.format.block_align, 4);
        assert_eq!(wav.pcm, vec![1, 0, 2, 0, 3, 0, 4, 0]);
    }

    #[test]
    fn test_skips_chunks_before_data() {
        let mut bytes = sample();
        // splice a 3-byte LIST chunk (padded to 4) in front of "data"
        let extra = [b'L', b'I', b'S', b'T', 3, 0, 0, 0, 9, 9, 9, 0];
        bytes.splice(36..36, extra);
        let wav = parse_wav(&bytes).unwrap();
        assert_eq!(wav.pcm.len(), 8);
    }

    #[test]
    fn test_rejects_bad_tags() {
        let mut bytes = sample();
        bytes[0] = b'X';
        assert!(matches!(parse_wav(&bytes), Err(AssetError::MalformedWav(_))));

        let mut bytes = sample();
        bytes[8..12].copy_from_slice(b"AVI ");
        assert!(matches!(parse_wav(&bytes), Err(AssetError::MalformedWav(_))));

        let mut bytes = sample();
        bytes[12..16].copy_from_slice(b"junk");
        assert!(matches!(parse_wav(&bytes), Err(AssetError::MalformedWav(_))));
    }

    #[test]
    fn test_rejects_extended_format_chunk() {
        let mut bytes = sample();
        bytes[16..20].copy_from_slice(&18u32.to_le_bytes());
        assert!(matches!(parse_wav(&bytes), Err(AssetError::MalformedWav(_))));
    }

    #[test]
    fn test_truncated_data_is_an_error() {
        let bytes = sample();
        assert!(parse_wav(&bytes[..bytes.len() - 1]).is_err());
        assert!(parse_wav(&bytes[..20]).is_err());
        assert!(parse_wav(&[]).is_err());
    }

    #[test]
    fn test_missing_data_chunk_is_an_error() {
        let bytes = sample();
        assert!(parse_wav(&bytes[..36]).is_err());
    }
}
