//! Tempo and the seconds-to-ticks mapping.

/// Sequencer tick (a division of a quarter note).
pub type Tick = u32;

/// Tempo in hundredths of a BPM (12000 = 120.00 BPM).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tempo(pub u32);

impl Tempo {
    pub const DEFAULT: Tempo = Tempo::from_bpm(120);

    pub const fn from_bpm(bpm: u32) -> Self {
        Self(bpm * 100)
    }

    /// Convert a MIDI set-tempo value (microseconds per quarter note).
    pub fn from_micros_per_quarter(us: u32) -> Self {
        if us == 0 {
            return Self::DEFAULT;
        }
        Self((6_000_000_000u64 / us as u64) as u32)
    }

    pub fn bpm(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Integer rescale in tenths: `self / 10 * tenths`.
    pub const fn scaled_tenths(self, tenths: u32) -> Self {
        Self(self.0 / 10 * tenths)
    }

    /// Ticks elapsed over `seconds` at this tempo and `division` ticks per quarter.
    ///
    /// Monotonic in `seconds`; non-positive input maps to tick 0.
    pub fn seconds_to_ticks(self, seconds: f64, division: u16) -> Tick {
        if seconds <= 0.0 {
            return 0;
        }
        let ticks = libm::floor(seconds * self.bpm() / 60.0 * division as f64);
        if ticks >= Tick::MAX as f64 {
            Tick::MAX
        } else {
            ticks as Tick
        }
    }
}

impl Default for Tempo {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_second_at_120_bpm_is_two_quarters() {
        assert_eq!(Tempo::from_bpm(120).seconds_to_ticks(1.0, 96), 192);
    }

    #[test]
    fn negative_seconds_clamp_to_zero() {
        assert_eq!(Tempo::from_bpm(120).seconds_to_ticks(-0.5, 96), 0);
    }

    #[test]
    fn faster_tempo_yields_more_ticks() {
        let slow = Tempo::from_bpm(60).seconds_to_ticks(2.0, 480);
        let fast = Tempo::from_bpm(180).seconds_to_ticks(2.0, 480);
        assert!(fast > slow);
    }

    #[test]
    fn micros_per_quarter_roundtrip() {
        assert_eq!(Tempo::from_micros_per_quarter(500_000), Tempo::from_bpm(120));
        assert_eq!(Tempo::from_micros_per_quarter(0), Tempo::DEFAULT);
    }

    #[test]
    fn scaled_tenths_uses_integer_steps() {
        assert_eq!(Tempo(12000).scaled_tenths(8), Tempo(9600));
        assert_eq!(Tempo(12345).scaled_tenths(12), Tempo(14808));
    }
}
