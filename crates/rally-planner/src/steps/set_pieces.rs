//! Canned input sequences for dodges and jumps.

use rally_core::ControlOutput;

use super::BlindStep;
use crate::plan::{Plan, Posture};

const JUMP_SECONDS: f64 = 0.08;
const RELEASE_SECONDS: f64 = 0.04;
const DODGE_PRESS_SECONDS: f64 = 0.05;
const DODGE_HOLD_SECONDS: f64 = 0.6;

/// Jump, release, then dodge forward.
pub fn front_flip(posture: Posture) -> Plan {
    dodge(posture, "Front flip", ControlOutput::new().with_pitch(-1.0), JUMP_SECONDS)
}

/// Jump, release, then dodge sideways. `right` picks the side.
pub fn side_flip(posture: Posture, right: bool) -> Plan {
    let yaw = if right { 1.0 } else { -1.0 };
    dodge(posture, "Side flip", ControlOutput::new().with_yaw(yaw), JUMP_SECONDS)
}

/// Hold the jump to gain height, then dodge forward into the ball.
pub fn jump_hit(posture: Posture, hold_seconds: f64) -> Plan {
    dodge(
        posture,
        "Jump hit",
        ControlOutput::new().with_pitch(-1.0),
        hold_seconds.max(JUMP_SECONDS),
    )
}

/// Dodge right away, for a car that is already in the air.
pub fn air_dodge(posture: Posture, direction: ControlOutput) -> Plan {
    Plan::new(posture)
        .with_label("Air dodge")
        .with_step(BlindStep::new(0.005, ControlOutput::new()))
        .with_step(BlindStep::new(DODGE_PRESS_SECONDS, direction.with_jump(true)))
        .with_step(BlindStep::new(DODGE_HOLD_SECONDS, direction))
        .unstoppable()
}

fn dodge(posture: Posture, label: &str, direction: ControlOutput, jump_seconds: f64) -> Plan {
    Plan::new(posture)
        .with_label(label)
        .with_step(BlindStep::new(jump_seconds, ControlOutput::new().with_jump(true)))
        .with_step(BlindStep::new(RELEASE_SECONDS, ControlOutput::new()))
        .with_step(BlindStep::new(DODGE_PRESS_SECONDS, direction.with_jump(true)))
        .with_step(BlindStep::new(DODGE_HOLD_SECONDS, direction))
        .unstoppable()
}
