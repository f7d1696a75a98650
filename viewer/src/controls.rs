use tracing::info;

/// Which transform runs on processed ticks. Exactly one mode is active at a
/// time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Edge,
    Motion,
    Roi,
}

impl Mode {
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Normal => "normal",
            Mode::Edge => "edge",
            Mode::Motion => "motion",
            Mode::Roi => "roi",
        }
    }
}

/// Outcome of applying one key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Unrecognized key, state unchanged.
    Ignored,
    /// Mode selection, including re-selecting the current mode.
    ModeChanged { from: Mode, to: Mode },
    SkipChanged(u32),
    Quit,
}

/// Runtime-interactive pipeline settings, owned by the driver and mutated
/// only here in response to polled key events. Read once per tick.
#[derive(Debug)]
pub struct Controls {
    pub mode: Mode,
    /// Process 1 of every N frames. Floored at 1, no upper bound.
    pub skip_interval: u32,
}

impl Controls {
    pub fn new(skip_interval: u32) -> Self {
        Self {
            mode: Mode::Normal,
            skip_interval: skip_interval.max(1),
        }
    }

    /// Apply one key event: `1`..`4` select the mode, `+`/`-` adjust the
    /// skip cadence, `q` quits. Anything else is a no-op.
    pub fn apply(&mut self, key: char) -> KeyAction {
        match key {
            '1' => self.switch_mode(Mode::Edge),
            '2' => self.switch_mode(Mode::Motion),
            '3' => self.switch_mode(Mode::Roi),
            '4' => self.switch_mode(Mode::Normal),
            '+' | '=' => {
                self.skip_interval = self.skip_interval.saturating_add(1);
                info!(skip_interval = self.skip_interval, "skip cadence raised");
                KeyAction::SkipChanged(self.skip_interval)
            }
            '-' | '_' => {
                self.skip_interval = self.skip_interval.saturating_sub(1).max(1);
                info!(skip_interval = self.skip_interval, "skip cadence lowered");
                KeyAction::SkipChanged(self.skip_interval)
            }
            'q' => KeyAction::Quit,
            _ => KeyAction::Ignored,
        }
    }

    fn switch_mode(&mut self, to: Mode) -> KeyAction {
        let from = self.mode;
        self.mode = to;
        if from != to {
            info!(mode = to.label(), "mode switched");
        }
        KeyAction::ModeChanged { from, to }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digit_keys_map_to_modes() {
        let mut controls = Controls::new(1);
        controls.apply('1');
        assert_eq!(controls.mode, Mode::Edge);
        controls.apply('2');
        assert_eq!(controls.mode, Mode::Motion);
        controls.apply('3');
        assert_eq!(controls.mode, Mode::Roi);
        controls.apply('4');
        assert_eq!(controls.mode, Mode::Normal);
    }

    #[test]
    fn unrecognized_keys_are_noops() {
        let mut controls = Controls::new(1);
        // '2' then '1' then an unrecognized '9' then '4'
        controls.apply('2');
        controls.apply('1');
        assert_eq!(controls.mode, Mode::Edge);
        assert_eq!(controls.apply('9'), KeyAction::Ignored);
        assert_eq!(controls.mode, Mode::Edge);
        controls.apply('4');
        assert_eq!(controls.mode, Mode::Normal);
    }

    #[test]
    fn skip_interval_has_a_floor_of_one() {
        let mut controls = Controls::new(2);
        assert_eq!(controls.apply('-'), KeyAction::SkipChanged(1));
        assert_eq!(controls.apply('-'), KeyAction::SkipChanged(1));
        assert_eq!(controls.skip_interval, 1);
    }

    #[test]
    fn skip_interval_is_unbounded_above() {
        let mut controls = Controls::new(1);
        for _ in 0..20 {
            controls.apply('+');
        }
        assert_eq!(controls.skip_interval, 21);
    }

    #[test]
    fn plus_and_equals_are_aliases() {
        let mut controls = Controls::new(1);
        controls.apply('=');
        assert_eq!(controls.skip_interval, 2);
    }

    #[test]
    fn quit_leaves_state_untouched() {
        let mut controls = Controls::new(3);
        controls.apply('1');
        assert_eq!(controls.apply('q'), KeyAction::Quit);
        assert_eq!(controls.mode, Mode::Edge);
        assert_eq!(controls.skip_interval, 3);
    }

    #[test]
    fn mode_change_reports_the_transition() {
        let mut controls = Controls::new(1);
        controls.apply('2');
        let action = controls.apply('4');
        assert_eq!(
            action,
            KeyAction::ModeChanged {
                from: Mode::Motion,
                to: Mode::Normal
            }
        );
    }

    #[test]
    fn zero_configured_interval_is_clamped() {
        let controls = Controls::new(0);
        assert_eq!(controls.skip_interval, 1);
    }
}
