use crate::io::format::{AudioFormat, BitDepth};

/// Offset that turns a signed 8-bit amplitude into unsigned PCM.
pub const U8_BIAS: i32 = 128;

/// Write one frame holding `value` on every channel.
///
/// `frame` must be exactly `format.frame_size()` bytes long.
#[inline]
pub fn write_frame(frame: &mut [u8], value: i32, format: &AudioFormat) {
    debug_assert_eq!(frame.len(), format.frame_size());

    match format.bit_depth() {
        BitDepth::Eight => {
            // wraps like a byte cast; amplitudes stay well inside ±127
            frame.fill((value + U8_BIAS) as u8);
        }
        BitDepth::Sixteen => {
            let bytes = (value as i16).to_le_bytes();
            for sample in frame.chunks_exact_mut(2) {
                sample.copy_from_slice(&bytes);
            }
        }
    }
}

/// Decode the first channel of a frame back into a signed amplitude.
pub fn read_frame(frame: &[u8], depth: BitDepth) -> i32 {
    match depth {
        BitDepth::Eight => frame[0] as i32 - U8_BIAS,
        BitDepth::Sixteen => i16::from_le_bytes([frame[0], frame[1]]) as i32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eight_bit_is_biased_and_duplicated() {
        let format = AudioFormat::new(8_000, 3, 1).unwrap();
        let mut frame = [0u8; 3];

        write_frame(&mut frame, 36, &format);
        assert_eq!(frame, [164, 164, 164]);

        write_frame(&mut frame, -12, &format);
        assert_eq!(frame, [116, 116, 116]);
        assert_eq!(read_frame(&frame, BitDepth::Eight), -12);
    }

    #[test]
    fn sixteen_bit_is_little_endian_signed() {
        let format = AudioFormat::new(8_000, 2, 2).unwrap();
        let mut frame = [0u8; 4];

        write_frame(&mut frame, 9828, &format);
        assert_eq!(frame, [0x64, 0x26, 0x64, 0x26]);

        write_frame(&mut frame, -1, &format);
        assert_eq!(frame, [0xff, 0xff, 0xff, 0xff]);
        assert_eq!(read_frame(&frame, BitDepth::Sixteen), -1);
    }
}
