use rally_core::{ControlOutput, GameSnapshot, PlannerSettings};
use rally_physics::{ArenaModel, ConfigError, TrajectorySample};
use serde::Serialize;

use crate::{
    behavior::Behavior,
    plan::{Plan, Posture, StepCtx, TickLog},
    steering::steer_toward_ground_position,
};

const FALLBACK_SITUATION: &str = "Chasing the ball";

/// What the bot predicted and decided on its last tick.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Telemetry {
    pub ball_path: Vec<TrajectorySample>,
    pub posture: Option<Posture>,
    pub situation: String,
    pub log_lines: Vec<String>,
    pub output: ControlOutput,
}

/// Holds the active plan of one car and runs it tick by tick.
pub struct Bot {
    settings: PlannerSettings,
    arena: ArenaModel,
    behavior: Box<dyn Behavior>,
    plan: Option<Plan>,
    telemetry: Telemetry,
}

impl Bot {
    pub fn new(settings: PlannerSettings, behavior: Box<dyn Behavior>) -> Result<Self, ConfigError> {
        let arena = ArenaModel::new(settings.arena.clone())?;
        Ok(Self {
            settings,
            arena,
            behavior,
            plan: None,
            telemetry: Telemetry::default(),
        })
    }

    pub fn settings(&self) -> &PlannerSettings {
        &self.settings
    }

    /// Whether a plan with `posture` would replace the current one.
    pub fn can_interrupt_plan_for(&self, posture: Posture) -> bool {
        self.plan.as_ref().map_or(true, |plan| plan.yields_to(posture))
    }

    /// Install `plan` if the current plan yields to it. Returns whether it was taken.
    pub fn set_plan(&mut self, plan: Plan) -> bool {
        if !self.can_interrupt_plan_for(plan.posture()) {
            return false;
        }
        Self::install(&mut self.plan, plan);
        true
    }

    pub fn current_plan(&self) -> Option<&Plan> {
        self.plan.as_ref()
    }

    pub fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }

    fn install(slot: &mut Option<Plan>, mut plan: Plan) {
        log::debug!("New plan ({:?}): {}", plan.posture(), plan.situation());
        plan.begin();
        *slot = Some(plan);
    }

    /// Run one tick for the car at `input.player_index`: predict the ball, let the
    /// behavior propose a plan, tick the plan.
    pub fn process_input(&mut self, input: &GameSnapshot) -> ControlOutput {
        let Some(car) = input.my_car() else {
            log::warn!(
                "No car for player {} in a snapshot of {} cars",
                input.player_index,
                input.cars.len()
            );
            return ControlOutput::new();
        };
        let log = TickLog::new(input.player_index);

        let ball_path = self.arena.predict(&input.ball);
        let ctx = StepCtx {
            input,
            car,
            ball_path: &ball_path,
            arena: &self.arena,
            settings: &self.settings,
            log: &log,
        };

        if let Some(plan) = self.behavior.choose_plan(&ctx, self.plan.as_ref()) {
            if self.plan.as_ref().map_or(true, |p| p.yields_to(plan.posture())) {
                Self::install(&mut self.plan, plan);
            }
        }

        let planned = self.plan.as_mut().and_then(|plan| plan.get_output(&ctx));
        let output = match planned {
            Some(output) => output,
            None => {
                if let Some(done) = self.plan.take() {
                    log::debug!("Plan finished: {}", done.label().unwrap_or("unlabeled"));
                }
                steer_toward_ground_position(car, &ball_path.start().position.xy(), &self.settings.turn)
            }
        };

        let situation = self
            .plan
            .as_ref()
            .map(|plan| plan.situation())
            .unwrap_or_else(|| FALLBACK_SITUATION.to_string());
        if situation != self.telemetry.situation {
            ctx.log.println(format!("[Sitch] {}", situation));
        }

        self.telemetry = Telemetry {
            ball_path: ball_path.samples().to_vec(),
            posture: self.plan.as_ref().map(|plan| plan.posture()),
            situation,
            log_lines: log.take(),
            output,
        };
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::tests::CountdownStep;

    struct Idle;

    impl Behavior for Idle {
        fn choose_plan(&mut self, _: &StepCtx<'_>, _: Option<&Plan>) -> Option<Plan> {
            None
        }
    }

    fn bot() -> Bot {
        Bot::new(PlannerSettings::default(), Box::new(Idle)).unwrap()
    }

    #[test]
    fn test_set_plan_respects_interruption() {
        let mut bot = bot();
        assert!(bot.can_interrupt_plan_for(Posture::Menial));
        assert!(bot.set_plan(
            Plan::new(Posture::Defensive).with_step(CountdownStep { ticks: 3, interruptible: true })
        ));
        assert!(bot.current_plan().unwrap().is_started());
        assert!(!bot.can_interrupt_plan_for(Posture::Offensive));
        assert!(bot.can_interrupt_plan_for(Posture::Save));
    }

    #[test]
    fn test_invalid_arena_is_rejected() {
        let mut settings = PlannerSettings::default();
        settings.arena.restitution = 2.0;
        assert!(Bot::new(settings, Box::new(Idle)).is_err());
    }
}
