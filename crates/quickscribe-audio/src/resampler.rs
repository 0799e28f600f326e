/// Streaming linear resampler for mono i16 audio. Callers push
/// arbitrary-sized chunks; output is produced as soon as enough input has
/// accumulated. Linear interpolation is plenty for speech recognition input
/// and keeps the capture callback cheap.
pub struct LinearResampler {
    in_rate: u32,
    out_rate: u32,
    /// Unconsumed input samples carried between chunks.
    carry: Vec<i16>,
    /// Fractional read position into `carry`, in input samples.
    pos: f64,
    /// Input samples advanced per output sample.
    step: f64,
}

impl LinearResampler {
    pub fn new(in_rate: u32, out_rate: u32) -> Self {
        Self {
            in_rate,
            out_rate,
            carry: Vec::new(),
            pos: 0.0,
            step: in_rate as f64 / out_rate as f64,
        }
    }

    /// Resample one chunk, returning whatever full output samples the
    /// accumulated input allows.
    pub fn process(&mut self, input: &[i16]) -> Vec<i16> {
        if self.in_rate == self.out_rate {
            return input.to_vec();
        }

        self.carry.extend_from_slice(input);

        let mut out = Vec::with_capacity((input.len() as f64 / self.step) as usize + 1);
        // Interpolation needs the sample after the read position.
        while self.pos + 1.0 < self.carry.len() as f64 {
            let idx = self.pos as usize;
            let frac = self.pos - idx as f64;
            let s0 = self.carry[idx] as f64;
            let s1 = self.carry[idx + 1] as f64;
            let sample = s0 + (s1 - s0) * frac;
            out.push(sample.round().clamp(i16::MIN as f64, i16::MAX as f64) as i16);
            self.pos += self.step;
        }

        // Drop consumed input so the carry buffer stays bounded.
        let consumed = (self.pos as usize).min(self.carry.len());
        if consumed > 0 {
            self.carry.drain(..consumed);
            self.pos -= consumed as f64;
        }

        out
    }

    pub fn reset(&mut self) {
        self.carry.clear();
        self.pos = 0.0;
    }
}

/// Average interleaved channels down to mono. A no-op copy for mono input.
pub fn downmix_to_mono(samples: &[i16], channels: u16) -> Vec<i16> {
    if channels <= 1 {
        return samples.to_vec();
    }
    let channels = channels as usize;
    samples
        .chunks_exact(channels)
        .map(|group| {
            let sum: i32 = group.iter().map(|&s| s as i32).sum();
            (sum / channels as i32) as i16
        })
        .collect()
}
