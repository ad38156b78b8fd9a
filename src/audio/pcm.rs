//! Raw PCM helpers for the file replay and the recognition session.

/// Size of the header skipped at the start of every audio file.
pub const WAV_HEADER_LEN: usize = 44;

/// Convert little-endian signed 16-bit PCM bytes to normalized f32 samples.
///
/// Each sample is divided by 32768, so the output lies in `[-1.0, 1.0)`.
/// A trailing odd byte is ignored.
///
/// # Arguments
/// * `pcm` - Raw interleaved sample bytes
///
/// # Returns
/// Vector of `pcm.len() / 2` samples
pub fn pcm16_le_to_f32(pcm: &[u8]) -> Vec<f32> {
    pcm.chunks_exact(2).map(|pair| f32::from(i16::from_le_bytes([pair[0], pair[1]])) / 32768.0).collect()
}

/// Drop the fixed-size header and return the PCM payload, or `None` if the data is too short.
///
/// No header field is inspected.
pub fn strip_header(data: &[u8]) -> Option<&[u8]> {
    data.get(WAV_HEADER_LEN..)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_values() {
        let bytes = [0x00, 0x00, 0xFF, 0x7F, 0x00, 0x80, 0xFF, 0xFF, 0x00, 0x40];
        let samples = pcm16_le_to_f32(&bytes);
        assert_eq!(samples, vec![0.0, 32767.0 / 32768.0, -1.0, -1.0 / 32768.0, 0.5]);
    }

    #[test]
    fn test_even_length_yields_half_samples() {
        let bytes: Vec<u8> = (0..=255).collect();
        let samples = pcm16_le_to_f32(&bytes);
        assert_eq!(samples.len(), bytes.len() / 2);

        for (pair, sample) in bytes.chunks_exact(2).zip(&samples) {
            let expected = i16::from_le_bytes([pair[0], pair[1]]) as f32 / 32768.0;
            assert_eq!(*sample, expected);
        }
    }

    #[test]
    fn test_odd_length_drops_last_byte() {
        assert_eq!(pcm16_le_to_f32(&[0x00, 0x40, 0x12]), vec![0.5]);
        assert!(pcm16_le_to_f32(&[0x12]).is_empty());
        assert!(pcm16_le_to_f32(&[]).is_empty());
    }

    #[test]
    fn test_mapping_is_monotonic() {
        let values: Vec<i16> = vec![i16::MIN, -20000, -1, 0, 1, 12345, i16::MAX];
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        let samples = pcm16_le_to_f32(&bytes);

        assert!(samples.windows(2).all(|w| w[0] < w[1]));
        for (value, sample) in values.iter().zip(&samples) {
            assert_eq!(sample.signum() == -1.0, *value < 0);
        }
    }

    #[test]
    fn test_strip_header() {
        assert!(strip_header(&[0u8; 43]).is_none());
        assert_eq!(strip_header(&[0u8; 44]), Some(&[][..]));

        let mut data = vec![0u8; 44];
        data.extend_from_slice(&[1, 2, 3]);
        assert_eq!(strip_header(&data), Some(&[1u8, 2, 3][..]));
    }
}
