use glam::Vec3;

use super::{ArbiterInput, BehaviorArbiter, Decision};
use crate::pet::climb::ClimbSession;
use crate::pet::physics::ClimbState;
use crate::pet::{Facing, MotionState, Support};

impl BehaviorArbiter {
    /// One frame on the wall: sub-state transitions, ascent, sway, and
    /// the exits to `OnWindowTop` or `Falling`.
    pub(super) fn climb(
        &mut self,
        input: &ArbiterInput,
        mut session: ClimbSession,
        rng: &mut fastrand::Rng,
    ) -> Decision {
        let pet = input.pet;
        let climbing = self.cfg.climbing;
        let body = self.cfg.movement.body_half_width * pet.scale;

        let Some(window) = input
            .windows
            .iter()
            .find(|w| w.id == session.window_id)
            .copied()
        else {
            log::info!("Window {} vanished mid-climb", session.window_id);
            return self.begin_fall(input, false);
        };
        session.anchor_to(window, body);
        session.time_climbing += input.dt;

        if session.deadline_passed(input.time) {
            let stamina = input.stamina;
            let slipping = matches!(
                session.climb_state,
                ClimbState::Steady | ClimbState::Tired | ClimbState::Reaching
            ) && self.physics.should_slip(
                stamina,
                input.dt,
                session.climbed_height,
                session.total_height,
                rng,
            );
            let rest = matches!(session.climb_state, ClimbState::Steady | ClimbState::Tired)
                && self
                    .physics
                    .should_rest(stamina, session.time_climbing, input.dt, rng);

            let next = self.physics.next_climb_state(
                session.climb_state,
                stamina,
                session.progress(),
                slipping,
                rest,
            );
            if next != session.climb_state {
                let hold = match next {
                    ClimbState::Starting => Some(climbing.start_duration as f64),
                    ClimbState::Slipping => Some(climbing.slip_recovery_time as f64),
                    ClimbState::Resting => {
                        Some(self.physics.rest_duration(stamina).as_secs_f64())
                    }
                    _ => None,
                };
                log::debug!("Climb {:?} -> {:?}", session.climb_state, next);
                session.enter(next, hold.map(|h| input.time + h));
            }
        }

        let speed = self.physics.climb_speed(
            input.stamina,
            session.climbed_height,
            session.total_height,
            session.climb_state,
        ) * self.cfg.physics_scale();
        session.speed = speed;
        session.climbed_height = (session.climbed_height + speed * input.dt).min(session.total_height);

        if session.climbed_height <= 0.0 && speed < 0.0 {
            log::debug!("Slipped off window {}", window.id);
            return self.begin_fall(input, false);
        }

        if session.is_complete() || session.total_height <= 0.0 {
            let inset = (self.cfg.movement.window_top_inset * pet.scale).min(window.width() * 0.5);
            let x = match session.side {
                Facing::Right => window.left + inset,
                Facing::Left => window.right - inset,
            };
            log::info!("Pulled up onto window {}", window.id);
            return Decision {
                delta: Vec3::new(x - pet.position.x, window.top - pet.position.y, 0.0),
                facing: session.side,
                support: Support::Window(window.id),
                ..Decision::still(input, MotionState::OnWindowTop, None)
            };
        }

        let sway = self
            .physics
            .sway(session.time_climbing, input.stamina, session.climbed_height);
        let target = Vec3::new(session.base_x + sway, session.current_y(), pet.position.z);
        Decision {
            delta: target - pet.position,
            facing: session.side,
            climb: Some(session),
            ..Decision::still(input, MotionState::Climbing, None)
        }
    }
}
