use crate::frame::{Frame, QuantizedFrame};

use super::config::OverflowPolicy;

/// Round to the nearest integer, ties to even (banker's rounding).
pub fn round_half_even(value: f64) -> f64 {
    value.round_ties_even()
}

impl OverflowPolicy {
    /// Convert an already-rounded value to u16. NaN becomes 0.
    pub fn to_u16(self, rounded: f64) -> u16 {
        if rounded.is_nan() {
            return 0;
        }
        match self {
            Self::Clamp => rounded.clamp(0.0, u16::MAX as f64) as u16,
            // f64 -> i64 saturates; i64 -> u16 keeps the low 16 bits.
            Self::Wrap => rounded as i64 as u16,
        }
    }
}

/// Round every pixel and convert the frame to unsigned 16-bit.
pub fn quantize(frame: Frame, policy: OverflowPolicy) -> QuantizedFrame {
    QuantizedFrame {
        data: frame.data.mapv(|v| policy.to_u16(round_half_even(v))),
        header: frame.header,
    }
}
