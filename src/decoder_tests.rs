//! Unit tests for the decoder module

#[cfg(test)]
mod tests {
    use crate::constants::SOURCE_SAMPLE_RATE;
    use crate::decoder::decode_fragment;
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine;
    use tokio_test::assert_ok;

    /// Encode i16 samples the way the service does: PCM16 LE, base64.
    fn encode_samples(samples: &[i16]) -> String {
        let mut bytes = Vec::with_capacity(samples.len() * 2);
        for sample in samples {
            bytes.extend_from_slice(&sample.to_le_bytes());
        }
        BASE64.encode(bytes)
    }

    #[test]
    fn test_decode_normalizes_to_unit_range() {
        let encoded = encode_samples(&[0, 16384, -16384, 32767, -32768]);
        let fragment = tokio_test::assert_ok!(decode_fragment(&encoded));

        let samples = fragment.samples();
        assert_eq!(samples.len(), 5);
        assert_eq!(samples[0], 0.0);
        assert_eq!(samples[1], 0.5);
        assert_eq!(samples[2], -0.5);
        assert_eq!(samples[3], 32767.0 / 32768.0);
        assert_eq!(samples[4], -1.0);
    }

    #[test]
    fn test_decode_binds_source_sample_rate() {
        let encoded = encode_samples(&[1, 2, 3]);
        let fragment = decode_fragment(&encoded).unwrap();

        assert_eq!(fragment.sample_rate(), SOURCE_SAMPLE_RATE);
    }

    #[test]
    fn test_duration_follows_sample_count() {
        let samples = vec![0i16; SOURCE_SAMPLE_RATE as usize];
        let fragment = decode_fragment(&encode_samples(&samples)).unwrap();

        assert_eq!(fragment.duration(), 1.0);
    }

    #[test]
    fn test_empty_payload_decodes_to_empty_fragment() {
        let fragment = decode_fragment("").unwrap();

        assert!(fragment.samples().is_empty());
        assert_eq!(fragment.duration(), 0.0);
    }

    #[test]
    fn test_odd_byte_count_is_rejected() {
        let encoded = BASE64.encode([0u8, 1, 2]);
        let result = decode_fragment(&encoded);

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("odd byte count"));
    }

    #[test]
    fn test_invalid_base64_is_rejected() {
        let result = decode_fragment("not!!valid@@base64");

        assert!(result.is_err());
    }

    #[test]
    fn test_fragment_clone_shares_samples() {
        let fragment = decode_fragment(&encode_samples(&[100, 200])).unwrap();
        let clone = fragment.clone();

        assert_eq!(fragment.samples(), clone.samples());
        assert_eq!(fragment.duration(), clone.duration());
    }
}
