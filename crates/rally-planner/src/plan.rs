use std::cell::RefCell;

use rally_core::{ControlOutput, GameSnapshot, PlannerSettings, VehicleState};
use rally_physics::{ArenaModel, BallPath};
use serde::{Deserialize, Serialize};

/// How urgent a plan is, from least to most.
///
/// A running plan can only be replaced by one that is at least as urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Posture {
    Menial,
    Neutral,
    Offensive,
    Defensive,
    Clear,
    Save,
    EscapeGoal,
    Landing,
}

/// Human-readable log lines produced during a tick.
pub struct TickLog {
    prefix: String,
    lines: RefCell<Vec<String>>,
}

impl TickLog {
    pub fn new(player_index: usize) -> Self {
        Self {
            prefix: format!("bot {}", player_index),
            lines: RefCell::new(Vec::new()),
        }
    }

    pub fn println(&self, line: impl Into<String>) {
        let line = line.into();
        log::info!("[{}] {}", self.prefix, line);
        self.lines.borrow_mut().push(line);
    }

    pub fn take(&self) -> Vec<String> {
        self.lines.take()
    }
}

/// Everything a step may look at during one tick.
#[derive(Clone, Copy)]
pub struct StepCtx<'a> {
    pub input: &'a GameSnapshot,
    pub car: &'a VehicleState,
    pub ball_path: &'a BallPath,
    pub arena: &'a ArenaModel,
    pub settings: &'a PlannerSettings,
    pub log: &'a TickLog,
}

/// The progress of a step execution
#[derive(Debug)]
pub enum StepProgress {
    Continue(ControlOutput),
    Done,
}

/// One stage of a maneuver.
pub trait Step: Send {
    /// Advance the step by one tick.
    fn update(&mut self, ctx: &StepCtx<'_>) -> StepProgress;

    /// Whether a more urgent plan may take over while this step runs.
    fn can_interrupt(&self) -> bool {
        true
    }

    /// Short description for logs and telemetry.
    fn situation(&self) -> String;
}

/// An ordered sequence of steps with a posture.
pub struct Plan {
    posture: Posture,
    label: Option<String>,
    steps: Vec<Box<dyn Step>>,
    cursor: usize,
    interruptible: bool,
    started: bool,
}

impl Plan {
    pub fn new(posture: Posture) -> Self {
        Self {
            posture,
            label: None,
            steps: Vec::new(),
            cursor: 0,
            interruptible: true,
            started: false,
        }
    }

    pub fn with_step(mut self, step: impl Step + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Prevent the plan from being interrupted until it completes.
    pub fn unstoppable(mut self) -> Self {
        self.interruptible = false;
        self
    }

    pub fn begin(&mut self) {
        self.started = true;
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn posture(&self) -> Posture {
        self.posture
    }

    pub fn is_complete(&self) -> bool {
        self.cursor >= self.steps.len()
    }

    /// Whether the running plan may be dropped for another one.
    pub fn can_interrupt(&self) -> bool {
        self.is_complete()
            || (self.interruptible && self.steps[self.cursor].can_interrupt())
    }

    /// Whether a plan with `posture` may replace this one.
    pub fn yields_to(&self, posture: Posture) -> bool {
        self.is_complete() || (posture >= self.posture && self.can_interrupt())
    }

    pub fn situation(&self) -> String {
        match (&self.label, self.steps.get(self.cursor)) {
            (Some(label), Some(step)) => format!("{}: {}", label, step.situation()),
            (None, Some(step)) => step.situation(),
            (Some(label), None) => label.clone(),
            (None, None) => "Done".to_string(),
        }
    }

    /// Output of the current step, skipping past steps that finish this tick.
    ///
    /// Returns `None` once every step is done.
    pub fn get_output(&mut self, ctx: &StepCtx<'_>) -> Option<ControlOutput> {
        if !self.started {
            log::warn!("Plan ticked before begin(): {}", self.situation());
            self.started = true;
        }
        while let Some(step) = self.steps.get_mut(self.cursor) {
            match step.update(ctx) {
                StepProgress::Continue(output) => return Some(output),
                StepProgress::Done => {
                    log::debug!("Step done: {}", step.situation());
                    self.cursor += 1;
                }
            }
        }
        None
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rally_core::{BallState, Team, Vector2, Vector3};

    /// A step that runs for a fixed number of ticks.
    pub(crate) struct CountdownStep {
        pub ticks: u32,
        pub interruptible: bool,
    }

    impl Step for CountdownStep {
        fn update(&mut self, _: &StepCtx<'_>) -> StepProgress {
            if self.ticks == 0 {
                return StepProgress::Done;
            }
            self.ticks -= 1;
            StepProgress::Continue(ControlOutput::new().with_throttle(1.0))
        }

        fn can_interrupt(&self) -> bool {
            self.interruptible
        }

        fn situation(&self) -> String {
            format!("Counting down {}", self.ticks)
        }
    }

    /// Owned data behind a [`StepCtx`] for tests.
    pub(crate) struct Fixture {
        pub input: GameSnapshot,
        pub ball_path: BallPath,
        pub arena: ArenaModel,
        pub settings: PlannerSettings,
        pub log: TickLog,
    }

    impl Fixture {
        pub fn new(car: VehicleState, ball: BallState) -> Self {
            let settings = PlannerSettings::default();
            let arena = ArenaModel::new(settings.arena.clone()).unwrap();
            let ball_path = arena.predict(&ball);
            Self {
                input: GameSnapshot {
                    time: car.time,
                    frame: car.frame,
                    team: car.team,
                    player_index: 0,
                    cars: vec![car],
                    ball,
                },
                ball_path,
                arena,
                settings,
                log: TickLog::new(0),
            }
        }

        pub fn default_scene() -> Self {
            Self::new(
                VehicleState::at_rest(Vector3::new(0.0, -30.0, 0.34), Vector2::y(), Team::Blue),
                BallState::new(Vector3::new(0.0, 0.0, 1.8555), Vector3::zeros(), 0.0),
            )
        }

        /// Move the clock forward, keeping the car and ball where they are.
        pub fn advance(&mut self, seconds: f64) {
            self.input.time += seconds;
            self.input.frame += 1;
            for car in &mut self.input.cars {
                car.time = self.input.time;
                car.frame = self.input.frame;
            }
            self.input.ball.time = self.input.time;
            self.ball_path = self.arena.predict(&self.input.ball);
        }

        pub fn ctx(&self) -> StepCtx<'_> {
            StepCtx {
                input: &self.input,
                car: &self.input.cars[0],
                ball_path: &self.ball_path,
                arena: &self.arena,
                settings: &self.settings,
                log: &self.log,
            }
        }
    }

    #[test]
    fn test_posture_order() {
        assert!(Posture::Menial < Posture::Neutral);
        assert!(Posture::Offensive < Posture::Defensive);
        assert!(Posture::Save < Posture::Landing);
    }

    #[test]
    fn test_plan_runs_steps_in_order() {
        let fixture = Fixture::default_scene();
        let mut plan = Plan::new(Posture::Neutral)
            .with_step(CountdownStep { ticks: 1, interruptible: true })
            .with_step(CountdownStep { ticks: 2, interruptible: true });
        plan.begin();
        let ctx = fixture.ctx();
        assert!(plan.get_output(&ctx).is_some());
        assert_eq!(plan.situation(), "Counting down 0");
        // first step finishes and the second produces output in the same tick
        assert!(plan.get_output(&ctx).is_some());
        assert_eq!(plan.situation(), "Counting down 1");
        assert!(plan.get_output(&ctx).is_some());
        assert!(plan.get_output(&ctx).is_none());
        assert!(plan.is_complete());
    }

    #[test]
    fn test_interruption_rule() {
        let plan = Plan::new(Posture::Offensive).with_step(CountdownStep {
            ticks: 5,
            interruptible: true,
        });
        assert!(plan.yields_to(Posture::Offensive));
        assert!(plan.yields_to(Posture::Save));
        assert!(!plan.yields_to(Posture::Neutral));

        let locked = Plan::new(Posture::Offensive).with_step(CountdownStep {
            ticks: 5,
            interruptible: false,
        });
        assert!(!locked.yields_to(Posture::Landing));

        let unstoppable = Plan::new(Posture::Neutral)
            .with_step(CountdownStep { ticks: 5, interruptible: true })
            .unstoppable();
        assert!(!unstoppable.yields_to(Posture::Save));
    }

    #[test]
    fn test_complete_plan_always_yields() {
        let fixture = Fixture::default_scene();
        let mut plan = Plan::new(Posture::Landing)
            .with_step(CountdownStep { ticks: 0, interruptible: false })
            .unstoppable();
        plan.begin();
        assert!(plan.get_output(&fixture.ctx()).is_none());
        assert!(plan.yields_to(Posture::Menial));
    }

    #[test]
    fn test_label_in_situation() {
        let plan = Plan::new(Posture::Neutral)
            .with_label("Warmup")
            .with_step(CountdownStep { ticks: 3, interruptible: true });
        assert_eq!(plan.situation(), "Warmup: Counting down 3");
    }
}
