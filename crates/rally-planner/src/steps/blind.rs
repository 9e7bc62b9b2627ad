use rally_core::ControlOutput;

use crate::plan::{Step, StepCtx, StepProgress};

/// Holds a fixed output for a fixed amount of time, ignoring the world.
#[derive(Debug, Clone)]
pub struct BlindStep {
    output: ControlOutput,
    duration: f64,
    started_at: Option<f64>,
}

impl BlindStep {
    /// Hold `output` for `duration` seconds from the first tick. The output is
    /// emitted at least once.
    pub fn new(duration: f64, output: ControlOutput) -> Self {
        Self {
            output,
            duration,
            started_at: None,
        }
    }
}

impl Step for BlindStep {
    fn update(&mut self, ctx: &StepCtx<'_>) -> StepProgress {
        let now = ctx.input.time;
        match self.started_at {
            Some(start) if now >= start + self.duration => StepProgress::Done,
            Some(_) => StepProgress::Continue(self.output),
            None => {
                self.started_at = Some(now);
                StepProgress::Continue(self.output)
            }
        }
    }

    fn can_interrupt(&self) -> bool {
        false
    }

    fn situation(&self) -> String {
        format!("Blind {}", self.output)
    }
}

/// Emits a fixed output for a fixed number of ticks.
#[derive(Debug, Clone)]
pub struct TapStep {
    output: ControlOutput,
    ticks: u32,
    emitted: u32,
}

impl TapStep {
    pub fn new(ticks: u32, output: ControlOutput) -> Self {
        Self {
            output,
            ticks,
            emitted: 0,
        }
    }
}

impl Step for TapStep {
    fn update(&mut self, _: &StepCtx<'_>) -> StepProgress {
        if self.emitted >= self.ticks {
            return StepProgress::Done;
        }
        self.emitted += 1;
        StepProgress::Continue(self.output)
    }

    fn can_interrupt(&self) -> bool {
        false
    }

    fn situation(&self) -> String {
        format!("Tapping {} ({}/{})", self.output, self.emitted, self.ticks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::tests::Fixture;

    #[test]
    fn test_blind_step_holds_for_duration() {
        let mut fixture = Fixture::default_scene();
        let output = ControlOutput::new().with_jump(true);
        let mut step = BlindStep::new(0.1, output);
        assert!(matches!(step.update(&fixture.ctx()), StepProgress::Continue(o) if o == output));
        fixture.advance(0.05);
        assert!(matches!(step.update(&fixture.ctx()), StepProgress::Continue(_)));
        fixture.advance(0.06);
        assert!(matches!(step.update(&fixture.ctx()), StepProgress::Done));
    }

    #[test]
    fn test_zero_length_blind_step_emits_once() {
        let mut fixture = Fixture::default_scene();
        let mut step = BlindStep::new(0.0, ControlOutput::new());
        assert!(matches!(step.update(&fixture.ctx()), StepProgress::Continue(_)));
        fixture.advance(0.016);
        assert!(matches!(step.update(&fixture.ctx()), StepProgress::Done));
        assert!(!step.can_interrupt());
    }

    #[test]
    fn test_tap_step_counts_ticks() {
        let fixture = Fixture::default_scene();
        let mut step = TapStep::new(2, ControlOutput::new().with_pitch(-1.0));
        let ctx = fixture.ctx();
        assert!(matches!(step.update(&ctx), StepProgress::Continue(_)));
        assert!(matches!(step.update(&ctx), StepProgress::Continue(_)));
        assert!(matches!(step.update(&ctx), StepProgress::Done));
    }
}
