//! Clock/weather display alternation.
//!
//! Two states, no terminal one: every tick of the alternation timer flips the
//! mode and the label is re-rendered.

/// Which branch the label renderer takes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMode {
    #[default]
    Clock,
    Weather,
}

impl DisplayMode {
    pub fn toggled(self) -> Self {
        match self {
            DisplayMode::Clock => DisplayMode::Weather,
            DisplayMode::Weather => DisplayMode::Clock,
        }
    }

    pub fn shows_weather(self) -> bool {
        matches!(self, DisplayMode::Weather)
    }
}

/// Current mode plus the number of flips since the panel started
#[derive(Debug, Default)]
pub struct Alternator {
    mode: DisplayMode,
    flips: u64,
}

impl Alternator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn flips(&self) -> u64 {
        self.flips
    }

    /// Advance to the other mode and return it.
    pub fn flip(&mut self) -> DisplayMode {
        self.mode = self.mode.toggled();
        self.flips += 1;
        self.mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_on_clock() {
        let alternator = Alternator::new();
        assert_eq!(alternator.mode(), DisplayMode::Clock);
        assert!(!alternator.mode().shows_weather());
        assert_eq!(alternator.flips(), 0);
    }

    #[test]
    fn test_toggles_strictly_on_each_flip() {
        let mut alternator = Alternator::new();
        for n in 1..=25u64 {
            let mode = alternator.flip();
            assert_eq!(mode.shows_weather(), n % 2 == 1, "after {n} flips");
            assert_eq!(alternator.flips(), n);
        }
    }

    #[test]
    fn test_toggled_is_an_involution() {
        assert_eq!(DisplayMode::Clock.toggled().toggled(), DisplayMode::Clock);
        assert_eq!(DisplayMode::Weather.toggled(), DisplayMode::Clock);
    }
}
