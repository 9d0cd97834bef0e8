//! WAV utilities for generated segment clips.
//!
//! Pure functions — no I/O, no async runtime.

/// Parsed WAV header fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WavHeader {
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    /// Byte offset in the buffer where raw PCM data begins.
    pub data_offset: usize,
    /// Declared size of the data chunk. `None` for the streaming sentinel.
    pub data_size: Option<usize>,
}

impl WavHeader {
    /// Bytes per interleaved frame.
    pub fn frame_size(&self) -> usize {
        self.channels as usize * (self.bits_per_sample as usize).div_ceil(8)
    }
}

fn read_u32(buf: &[u8], pos: usize) -> u32 {
    u32::from_le_bytes([buf[pos], buf[pos + 1], buf[pos + 2], buf[pos + 3]])
}

fn read_u16(buf: &[u8], pos: usize) -> u16 {
    u16::from_le_bytes([buf[pos], buf[pos + 1]])
}

/// Parse a WAV header from a byte buffer.
///
/// TTS servers that stream WAV write `0xFFFFFFFF` for the RIFF and `data`
/// sizes; those are ignored.
pub fn parse_wav_header(buf: &[u8]) -> Result<WavHeader, &'static str> {
    if buf.len() < 12 {
        return Err("too short for RIFF header");
    }
    if &buf[0..4] != b"RIFF" {
        return Err("missing RIFF tag");
    }
    if &buf[8..12] != b"WAVE" {
        return Err("missing WAVE tag");
    }

    let mut pos = 12;
    let mut channels: Option<u16> = None;
    let mut sample_rate: Option<u32> = None;
    let mut bits_per_sample: Option<u16> = None;

    while pos + 8 <= buf.len() {
        let chunk_id = &buf[pos..pos + 4];
        let chunk_size = read_u32(buf, pos + 4);

        if chunk_id == b"fmt " {
            if pos + 24 > buf.len() {
                return Err("fmt chunk truncated");
            }
            if read_u16(buf, pos + 8) != 1 {
                return Err("not PCM format");
            }
            channels = Some(read_u16(buf, pos + 10));
            sample_rate = Some(read_u32(buf, pos + 12));
            bits_per_sample = Some(read_u16(buf, pos + 22));

            let skip = if chunk_size == 0xFFFFFFFF {
                16 // standard fmt chunk payload
            } else {
                chunk_size as usize
            };
            pos += 8 + skip;
            continue;
        }

        if chunk_id == b"data" {
            let ch = channels.ok_or("data chunk before fmt chunk")?;
            let sr = sample_rate.ok_or("data chunk before fmt chunk")?;
            let bps = bits_per_sample.ok_or("data chunk before fmt chunk")?;
            let data_size = (chunk_size != 0xFFFFFFFF).then_some(chunk_size as usize);
            return Ok(WavHeader {
                channels: ch,
                sample_rate: sr,
                bits_per_sample: bps,
                data_offset: pos + 8,
                data_size,
            });
        }

        // Skip unknown chunks
        let skip = if chunk_size == 0xFFFFFFFF {
            0
        } else {
            chunk_size as usize
        };
        pos += 8 + skip;
    }

    Err("data chunk not found")
}

/// Fix WAV files with indeterminate sizes (0xFFFFFFFF).
///
/// Streamed responses carry sentinel RIFF and `data` sizes. Once the whole
/// body is buffered the real sizes can be computed.
pub fn fix_wav_sizes(mut wav: Vec<u8>) -> Vec<u8> {
    if wav.len() < 44 {
        return wav;
    }
    if &wav[0..4] != b"RIFF" {
        return wav;
    }
    // Patch RIFF chunk size: total_len - 8
    let riff_size = (wav.len() - 8) as u32;
    wav[4..8].copy_from_slice(&riff_size.to_le_bytes());

    // Find the "data" sub-chunk and patch its size
    let mut pos = 12; // skip "RIFF" + size + "WAVE"
    while pos + 8 <= wav.len() {
        let chunk_id = &wav[pos..pos + 4];
        let chunk_size = read_u32(&wav, pos + 4);
        if chunk_id == b"data" {
            if chunk_size == 0xFFFFFFFF {
                let data_size = (wav.len() - pos - 8) as u32;
                wav[pos + 4..pos + 8].copy_from_slice(&data_size.to_le_bytes());
            }
            break;
        }
        let skip = if chunk_size == 0xFFFFFFFF {
            0
        } else {
            chunk_size as usize
        };
        pos += 8 + skip;
    }

    wav
}

/// Append `millis` of silence to the end of the PCM data.
///
/// Chunks that follow `data` (e.g. `LIST`) stay after it. Sizes are patched.
pub fn append_silence(wav: Vec<u8>, millis: u32) -> Result<Vec<u8>, &'static str> {
    let mut wav = fix_wav_sizes(wav);
    let header = parse_wav_header(&wav)?;
    let frame = header.frame_size();
    if frame == 0 {
        return Err("zero-sized frames");
    }

    let available = wav.len() - header.data_offset;
    let data_size = header.data_size.unwrap_or(available).min(available);
    let data_end = header.data_offset + data_size;

    let frames = header.sample_rate as u64 * millis as u64 / 1000;
    let pad_len = frames as usize * frame;
    // Unsigned 8-bit PCM is centred on 0x80, everything wider on zero.
    let fill = if header.bits_per_sample == 8 { 0x80 } else { 0x00 };
    let trailing = wav.split_off(data_end);
    wav.resize(data_end + pad_len, fill);
    wav.extend_from_slice(&trailing);

    let new_data = (data_size + pad_len) as u32;
    let size_pos = header.data_offset - 4;
    wav[size_pos..header.data_offset].copy_from_slice(&new_data.to_le_bytes());
    let riff_size = (wav.len() - 8) as u32;
    wav[4..8].copy_from_slice(&riff_size.to_le_bytes());

    Ok(wav)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal 16-bit PCM WAV file from interleaved samples.
    fn write_wav(samples: &[i16], channels: u16, sample_rate: u32) -> Vec<u8> {
        let data_len = (samples.len() * 2) as u32;
        let file_len = 36 + data_len;
        let block_align = channels * 2;
        let mut buf = Vec::with_capacity(44 + data_len as usize);

        // RIFF header
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&file_len.to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        // fmt chunk
        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes()); // chunk size
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&channels.to_le_bytes());
        buf.extend_from_slice(&sample_rate.to_le_bytes());
        buf.extend_from_slice(&(sample_rate * block_align as u32).to_le_bytes()); // byte rate
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&16u16.to_le_bytes()); // bits per sample

        // data chunk
        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_len.to_le_bytes());
        for &sample in samples {
            buf.extend_from_slice(&sample.to_le_bytes());
        }

        buf
    }

    #[test]
    fn write_wav_produces_valid_header() {
        let samples = vec![0i16; 100];
        let wav = write_wav(&samples, 1, 16000);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[12..16], b"fmt ");
        assert_eq!(wav.len(), 44 + 200); // 44 header + 100 samples * 2 bytes
    }

    #[test]
    fn write_wav_stereo_block_align() {
        let wav = write_wav(&[0i16; 4], 2, 48000);
        let hdr = parse_wav_header(&wav).unwrap();
        assert_eq!(hdr.channels, 2);
        assert_eq!(hdr.frame_size(), 4);
        assert_eq!(read_u32(&wav, 28), 48000 * 4); // byte rate
    }

    #[test]
    fn fix_wav_sizes_patches_sentinel() {
        let mut wav = write_wav(&vec![0i16; 50], 1, 16000);
        wav[4..8].copy_from_slice(&0xFFFFFFFFu32.to_le_bytes());
        wav[40..44].copy_from_slice(&0xFFFFFFFFu32.to_le_bytes());
        let fixed = fix_wav_sizes(wav);
        assert_eq!(read_u32(&fixed, 4), (fixed.len() - 8) as u32);
        assert_eq!(read_u32(&fixed, 40), 100);
    }

    #[test]
    fn fix_wav_sizes_noop_on_good_wav() {
        let wav = write_wav(&vec![0i16; 50], 1, 16000);
        let fixed = fix_wav_sizes(wav.clone());
        assert_eq!(wav, fixed);
    }

    #[test]
    fn parse_wav_header_basic() {
        let wav = write_wav(&vec![0i16; 50], 1, 24000);
        let hdr = parse_wav_header(&wav).unwrap();
        assert_eq!(hdr.channels, 1);
        assert_eq!(hdr.sample_rate, 24000);
        assert_eq!(hdr.bits_per_sample, 16);
        assert_eq!(hdr.data_offset, 44);
        assert_eq!(hdr.data_size, Some(100));
    }

    #[test]
    fn parse_wav_header_sentinel_sizes() {
        let mut wav = write_wav(&vec![0i16; 50], 1, 24000);
        wav[4..8].copy_from_slice(&0xFFFFFFFFu32.to_le_bytes());
        wav[40..44].copy_from_slice(&0xFFFFFFFFu32.to_le_bytes());
        let hdr = parse_wav_header(&wav).unwrap();
        assert_eq!(hdr.sample_rate, 24000);
        assert_eq!(hdr.data_offset, 44);
        assert_eq!(hdr.data_size, None);
    }

    #[test]
    fn parse_wav_header_too_short() {
        assert!(parse_wav_header(b"RIFF").is_err());
    }

    #[test]
    fn parse_wav_header_not_riff() {
        let mut wav = write_wav(&vec![0i16; 10], 1, 16000);
        wav[0..4].copy_from_slice(b"NOPE");
        assert!(parse_wav_header(&wav).is_err());
    }

    #[test]
    fn append_silence_extends_data() {
        let wav = write_wav(&[1000i16; 10], 1, 1000);
        let padded = append_silence(wav, 300).unwrap();
        // 300 ms at 1 kHz mono 16-bit = 300 frames * 2 bytes
        assert_eq!(padded.len(), 44 + 20 + 600);
        assert_eq!(read_u32(&padded, 40), 620);
        assert_eq!(read_u32(&padded, 4), (padded.len() - 8) as u32);
        assert!(padded[64..].iter().all(|&b| b == 0));
        assert_eq!(&padded[44..46], &1000i16.to_le_bytes());
    }

    #[test]
    fn append_silence_keeps_trailing_chunks_last() {
        let mut wav = write_wav(&[0i16; 4], 1, 1000);
        wav.extend_from_slice(b"LIST");
        wav.extend_from_slice(&4u32.to_le_bytes());
        wav.extend_from_slice(b"INFO");
        let riff = (wav.len() - 8) as u32;
        wav[4..8].copy_from_slice(&riff.to_le_bytes());

        let padded = append_silence(wav, 10).unwrap();
        assert_eq!(read_u32(&padded, 40), 8 + 20);
        assert_eq!(&padded[padded.len() - 12..padded.len() - 8], b"LIST");
    }

    #[test]
    fn append_silence_on_streamed_wav() {
        let mut wav = write_wav(&[0i16; 4], 1, 1000);
        wav[4..8].copy_from_slice(&0xFFFFFFFFu32.to_le_bytes());
        wav[40..44].copy_from_slice(&0xFFFFFFFFu32.to_le_bytes());
        let padded = append_silence(wav, 5).unwrap();
        assert_eq!(read_u32(&padded, 40), 8 + 10);
    }

    #[test]
    fn append_silence_rejects_garbage() {
        assert!(append_silence(b"not a wav file at all".to_vec(), 300).is_err());
    }
}
