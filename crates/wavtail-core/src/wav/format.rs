//! Capture format parameters.

/// Sample rate of every capture, in Hz.
pub const SAMPLE_RATE: u32 = 44100;

/// Bits per sample of every capture.
pub const BITS_PER_SAMPLE: u16 = 16;

/// WAV file format parameters.
///
/// Captures are always mono 16-bit PCM at 44.1 kHz; the struct exists so the
/// derived header fields are computed in one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavFormat {
    /// Number of channels (always 1).
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bits per sample.
    pub bits_per_sample: u16,
}

impl WavFormat {
    /// The fixed capture format: mono, 44100 Hz, 16-bit.
    pub const CAPTURE: WavFormat = WavFormat {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: BITS_PER_SAMPLE,
    };

    /// Calculates bytes per sample (per channel).
    pub const fn bytes_per_sample(&self) -> u16 {
        self.bits_per_sample / 8
    }

    /// Calculates block align (bytes per sample frame).
    pub const fn block_align(&self) -> u16 {
        self.channels * self.bytes_per_sample()
    }

    /// Calculates byte rate (bytes per second).
    pub const fn byte_rate(&self) -> u32 {
        self.sample_rate * self.block_align() as u32
    }

    /// Number of data bytes covering `millis` milliseconds.
    ///
    /// Computed as `byte_rate * millis / 1000` with integer truncation. The
    /// result may fall mid-frame; callers that need whole frames use
    /// [`WavFormat::frame_aligned_up`].
    pub fn bytes_for_millis(&self, millis: u64) -> u64 {
        (u64::from(self.byte_rate()).saturating_mul(millis)) / 1000
    }

    /// Rounds a byte count up to the next whole frame.
    pub fn frame_aligned_up(&self, bytes: u64) -> u64 {
        let align = u64::from(self.block_align());
        bytes.div_ceil(align).saturating_mul(align)
    }

    /// Duration in milliseconds of `data_len` bytes of audio.
    pub fn millis_for_bytes(&self, data_len: u64) -> u64 {
        data_len * 1000 / u64::from(self.byte_rate())
    }
}

impl Default for WavFormat {
    fn default() -> Self {
        Self::CAPTURE
    }
}
