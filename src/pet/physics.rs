use std::f32::consts::TAU;
use std::time::Duration;

use crate::config::ClimbConfig;

/// Sub-state of an active climb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClimbState {
    Starting,
    Steady,
    Tired,
    Resting,
    Slipping,
    Reaching,
    PullingUp,
}

impl ClimbState {
    fn speed_multiplier(self) -> f32 {
        match self {
            ClimbState::Starting => 0.7,
            ClimbState::Steady => 1.0,
            ClimbState::Tired => 0.6,
            ClimbState::Resting => 0.0,
            ClimbState::Slipping => -0.5,
            ClimbState::Reaching => 0.8,
            ClimbState::PullingUp => 0.5,
        }
    }
}

/// Climb completion below which `Starting` settles into a rhythm.
const START_CONFIRM_PROGRESS: f32 = 0.1;
/// Completion at which the pet reaches for the top.
const REACH_PROGRESS: f32 = 0.9;
/// Completion at which a reach turns into pulling up.
const PULL_UP_PROGRESS: f32 = 0.98;
/// Climbing time before rest is considered.
const MIN_CLIMB_TIME_BEFORE_REST: f32 = 2.0;
/// Height at which sway has grown by 20%.
const SWAY_HEIGHT_REFERENCE: f32 = 2000.0;

/// Stateless climbing math. Only `should_slip` and `should_rest` draw
/// random numbers, always from the caller's RNG.
#[derive(Debug, Clone, Copy)]
pub struct Physics {
    cfg: ClimbConfig,
}

impl Physics {
    pub fn new(cfg: ClimbConfig) -> Self {
        Self { cfg }
    }

    fn progress(climbed: f32, total: f32) -> f32 {
        (climbed / total.max(1.0)).min(1.0)
    }

    /// 1.0 above the tired threshold, falling linearly to 0.5 at zero.
    fn tiredness_speed(&self, stamina: f32) -> f32 {
        if stamina > self.cfg.tired_threshold {
            1.0
        } else {
            0.5 + (stamina / self.cfg.tired_threshold) * 0.5
        }
    }

    /// Signed climb speed (px/s). Negative while slipping.
    pub fn climb_speed(&self, stamina: f32, climbed: f32, total: f32, state: ClimbState) -> f32 {
        let progress = Self::progress(climbed, total);

        let progress_mul = if progress < 0.2 {
            0.6 + (progress / 0.2) * 0.4
        } else if progress > 0.8 {
            1.0 - ((progress - 0.8) / 0.2) * 0.3
        } else {
            1.0
        };

        let height_mul = if total < self.cfg.short_climb_height {
            1.2
        } else if total > self.cfg.tall_climb_height {
            0.8
        } else {
            1.0
        };

        self.cfg.climb_speed
            * progress_mul
            * self.tiredness_speed(stamina)
            * state.speed_multiplier()
            * height_mul
    }

    /// Slip probability per second for the current conditions.
    pub fn slip_rate(&self, stamina: f32, climbed: f32, total: f32) -> f32 {
        let mut rate = self.cfg.base_slip_chance;
        if stamina < self.cfg.tired_threshold {
            rate *= 1.0 + (1.0 - stamina / self.cfg.tired_threshold) * 2.0;
        }
        if total > self.cfg.tall_climb_height {
            rate *= 1.5;
        }
        let progress = climbed / total.max(1.0);
        if progress > 0.3 && progress < 0.7 {
            rate *= 1.3;
        }
        rate
    }

    pub fn should_slip(
        &self,
        stamina: f32,
        dt: f32,
        climbed: f32,
        total: f32,
        rng: &mut fastrand::Rng,
    ) -> bool {
        rng.f32() < self.slip_rate(stamina, climbed, total) * dt
    }

    /// Stamina lost per second. Negative means recovery.
    pub fn stamina_drain(&self, climb_speed: f32, window_height: f32, state: ClimbState) -> f32 {
        if state == ClimbState::Resting {
            return -self.cfg.recovery_rate;
        }

        let mut drain = self.cfg.drain_rate * (climb_speed / self.cfg.climb_speed);
        if window_height > self.cfg.tall_climb_height {
            drain *= 1.5;
        }
        match state {
            ClimbState::Slipping => drain * 2.0,
            ClimbState::PullingUp => drain * 1.8,
            ClimbState::Starting | ClimbState::Reaching => drain * 1.2,
            _ => drain,
        }
    }

    pub fn should_rest(
        &self,
        stamina: f32,
        time_climbing: f32,
        dt: f32,
        rng: &mut fastrand::Rng,
    ) -> bool {
        if stamina >= self.cfg.rest_threshold || time_climbing <= MIN_CLIMB_TIME_BEFORE_REST {
            return false;
        }
        let deficit = 1.0 - stamina / self.cfg.rest_threshold;
        rng.f32() < self.cfg.rest_chance_per_second * deficit * dt
    }

    /// Horizontal wobble (px) around the climb anchor.
    pub fn sway(&self, time_climbing: f32, stamina: f32, climbed: f32) -> f32 {
        let tired_mul = if stamina < self.cfg.tired_threshold {
            1.0 + (1.0 - stamina / self.cfg.tired_threshold) * 0.3
        } else {
            1.0
        };
        let height_mul = 1.0 + (climbed / SWAY_HEIGHT_REFERENCE) * 0.2;
        let amplitude = self.cfg.sway_amplitude * tired_mul * height_mul;
        (time_climbing * self.cfg.sway_frequency * TAU).sin() * amplitude
    }

    /// Priority-ordered climb sub-state transitions.
    pub fn next_climb_state(
        &self,
        current: ClimbState,
        stamina: f32,
        progress: f32,
        is_slipping: bool,
        should_rest: bool,
    ) -> ClimbState {
        let rhythm = if stamina > self.cfg.tired_threshold {
            ClimbState::Steady
        } else {
            ClimbState::Tired
        };

        if is_slipping && current != ClimbState::Slipping {
            return ClimbState::Slipping;
        }
        if current == ClimbState::Slipping {
            return rhythm;
        }
        if should_rest && current != ClimbState::Resting {
            return ClimbState::Resting;
        }
        if current == ClimbState::Resting {
            return rhythm;
        }
        if current == ClimbState::Starting && progress < START_CONFIRM_PROGRESS {
            return rhythm;
        }
        if progress > REACH_PROGRESS
            && current != ClimbState::Reaching
            && current != ClimbState::PullingUp
        {
            return ClimbState::Reaching;
        }
        if progress >= PULL_UP_PROGRESS && current == ClimbState::Reaching {
            return ClimbState::PullingUp;
        }
        if current == ClimbState::Steady && stamina < self.cfg.tired_threshold {
            return ClimbState::Tired;
        }
        if current == ClimbState::Tired && stamina > self.cfg.tired_threshold * 1.5 {
            return ClimbState::Steady;
        }
        current
    }

    /// Lower stamina means a longer rest.
    pub fn rest_duration(&self, stamina: f32) -> Duration {
        let fatigue = (1.0 - stamina / self.cfg.max_stamina).clamp(0.0, 1.0);
        let span = self.cfg.max_rest_duration - self.cfg.min_rest_duration;
        Duration::from_secs_f32(self.cfg.min_rest_duration + span * fatigue)
    }
}
