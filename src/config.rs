use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Environment variable naming an optional JSON config file.
pub const CONFIG_ENV_VAR: &str = "DESKPET_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config value: {0}")]
    Invalid(String),
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Ground locomotion. Speeds are pixels/second at scale 1.0.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    pub walk_speed: f32,
    pub slow_run_speed: f32,
    pub fast_run_speed: f32,
    /// Effective distance above which the pet breaks into a slow run.
    pub slow_run_distance: f32,
    /// Effective distance above which the pet sprints.
    pub fast_run_distance: f32,
    /// No movement is requested while |dx| stays inside this band (scaled).
    pub dead_zone: f32,
    /// Slack past a window edge before the pet loses its footing.
    pub edge_buffer: f32,
    /// Horizontal half-extent of the body used for collisions (scaled).
    pub body_half_width: f32,
    /// How far onto a window top the pet lands after pulling up.
    pub window_top_inset: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            walk_speed: 130.0,
            slow_run_speed: 380.0,
            fast_run_speed: 550.0,
            slow_run_distance: 200.0,
            fast_run_distance: 500.0,
            dead_zone: 5.0,
            edge_buffer: 5.0,
            body_half_width: 20.0,
            window_top_inset: 20.0,
        }
    }
}

/// Hopping across a virtual-desktop boundary.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct JumpConfig {
    pub prepare_distance: f32,
    pub exit_buffer: f32,
    pub jump_speed: f32,
    /// Time the pet may stand still inside the jump band before landing.
    pub settle_time: f32,
}

impl Default for JumpConfig {
    fn default() -> Self {
        Self {
            prepare_distance: 150.0,
            exit_buffer: 50.0,
            jump_speed: 380.0,
            settle_time: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct FallConfig {
    pub gravity: f32,
    pub terminal_velocity: f32,
    /// Horizontal speed above which walking off a ledge becomes an arc.
    pub safety_jump_speed_threshold: f32,
    /// Upward kick applied at the start of a safety jump.
    pub safety_jump_kick: f32,
}

impl Default for FallConfig {
    fn default() -> Self {
        Self {
            gravity: 2000.0,
            terminal_velocity: 1500.0,
            safety_jump_speed_threshold: 300.0,
            safety_jump_kick: 400.0,
        }
    }
}

/// Climbing physics tunables.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct ClimbConfig {
    pub enabled: bool,
    pub climb_speed: f32,
    pub max_stamina: f32,
    pub tired_threshold: f32,
    pub rest_threshold: f32,
    /// Stamina lost per second at base climb speed.
    pub drain_rate: f32,
    /// Stamina regained per second while resting on the wall.
    pub recovery_rate: f32,
    /// Stamina regained per second while not climbing.
    pub ground_recovery_rate: f32,
    /// Slip probability per second before multipliers.
    pub base_slip_chance: f32,
    pub short_climb_height: f32,
    pub tall_climb_height: f32,
    /// Windows taller than this are treated as walls.
    pub max_climb_height: f32,
    pub rest_chance_per_second: f32,
    pub min_rest_duration: f32,
    pub max_rest_duration: f32,
    pub slip_recovery_time: f32,
    /// Length of the grab phase at the foot of a wall.
    pub start_duration: f32,
    pub sway_amplitude: f32,
    pub sway_frequency: f32,
}

impl Default for ClimbConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            climb_speed: 100.0,
            max_stamina: 100.0,
            tired_threshold: 30.0,
            rest_threshold: 20.0,
            drain_rate: 8.0,
            recovery_rate: 15.0,
            ground_recovery_rate: 10.0,
            base_slip_chance: 0.02,
            short_climb_height: 200.0,
            tall_climb_height: 600.0,
            max_climb_height: 2000.0,
            rest_chance_per_second: 0.3,
            min_rest_duration: 1.0,
            max_rest_duration: 3.0,
            slip_recovery_time: 0.5,
            start_duration: 0.4,
            sway_amplitude: 0.5,
            sway_frequency: 0.3,
        }
    }
}

/// Ambient idle scheduling. All times in seconds.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct IdleConfig {
    pub long_idle_timeout: f32,
    pub rotation_transition_duration: f32,
    pub long_idle_duration: f32,
    pub scratch_check_interval: f32,
    pub scratch_chance: f32,
    pub scratch_duration: f32,
    pub look_around_min_interval: f32,
    pub look_around_max_interval: f32,
    pub look_around_duration: f32,
}

impl Default for IdleConfig {
    fn default() -> Self {
        Self {
            long_idle_timeout: 30.0,
            rotation_transition_duration: 5.0,
            long_idle_duration: 3.0,
            scratch_check_interval: 3.0,
            scratch_chance: 0.15,
            scratch_duration: 2.0,
            look_around_min_interval: 5.0,
            look_around_max_interval: 10.0,
            look_around_duration: 2.0,
        }
    }
}

/// Mouse-reactive gestures. Velocities in px/s, distances in px.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    pub sudden_velocity: f32,
    pub rapid_velocity: f32,
    pub close_proximity: f32,
    pub near_proximity: f32,
    pub hover_duration: f32,
    pub duration: f32,
    pub surprise_cooldown: f32,
    pub angry_cooldown: f32,
    pub double_wave_cooldown: f32,
    pub one_hand_wave_cooldown: f32,
    pub pointing_cooldown: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            sudden_velocity: 3000.0,
            rapid_velocity: 1500.0,
            close_proximity: 100.0,
            near_proximity: 250.0,
            hover_duration: 1.5,
            duration: 2.0,
            surprise_cooldown: 10.0,
            angry_cooldown: 12.0,
            double_wave_cooldown: 15.0,
            one_hand_wave_cooldown: 15.0,
            pointing_cooldown: 5.0,
        }
    }
}

/// Snapshot polling cadences and frame clamping.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    pub space_interval: f32,
    /// Window cadence while riding or climbing a window.
    pub window_interval: f32,
    /// Window cadence otherwise.
    pub idle_window_interval: f32,
    /// Largest dt fed to the controller after a stall.
    pub max_frame_dt: f32,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            space_interval: 1.0,
            window_interval: 0.05,
            idle_window_interval: 1.0,
            max_frame_dt: 0.1,
        }
    }
}

// ---------------------------------------------------------------------------
// PetConfig
// ---------------------------------------------------------------------------

/// Every tunable the pet reads. Missing JSON keys fall back to defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PetConfig {
    pub character_scale: f32,
    /// Standing height at scale 1.0.
    pub pet_height: f32,
    /// Blend-out used between clips of the same category.
    pub transition_duration: f32,
    pub movement: MovementConfig,
    pub jump: JumpConfig,
    pub fall: FallConfig,
    pub climbing: ClimbConfig,
    pub idle: IdleConfig,
    pub gestures: GestureConfig,
    pub polling: PollingConfig,
}

impl Default for PetConfig {
    fn default() -> Self {
        Self {
            character_scale: 1.0,
            pet_height: 120.0,
            transition_duration: 0.3,
            movement: MovementConfig::default(),
            jump: JumpConfig::default(),
            fall: FallConfig::default(),
            climbing: ClimbConfig::default(),
            idle: IdleConfig::default(),
            gestures: GestureConfig::default(),
            polling: PollingConfig::default(),
        }
    }
}

impl PetConfig {
    /// Load from the file named by `DESKPET_CONFIG`, or defaults when unset.
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::from_file(Path::new(&path)),
            None => {
                log::info!("{CONFIG_ENV_VAR} not set, using default config");
                Ok(Self::default())
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let cfg = Self::from_json(&text)?;
        log::info!("Loaded config from {}", path.display());
        Ok(cfg)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        fn positive(name: &str, v: f32) -> Result<(), ConfigError> {
            if v > 0.0 && v.is_finite() {
                Ok(())
            } else {
                Err(ConfigError::Invalid(format!("{name} must be positive, got {v}")))
            }
        }
        fn ordered(name: &str, lo: f32, hi: f32) -> Result<(), ConfigError> {
            if lo <= hi {
                Ok(())
            } else {
                Err(ConfigError::Invalid(format!("{name}: min {lo} exceeds max {hi}")))
            }
        }

        positive("character_scale", self.character_scale)?;
        positive("pet_height", self.pet_height)?;
        positive("climbing.climb_speed", self.climbing.climb_speed)?;
        positive("climbing.max_stamina", self.climbing.max_stamina)?;
        positive("climbing.tired_threshold", self.climbing.tired_threshold)?;
        positive("climbing.rest_threshold", self.climbing.rest_threshold)?;
        positive("climbing.min_rest_duration", self.climbing.min_rest_duration)?;
        positive("climbing.start_duration", self.climbing.start_duration)?;
        positive("climbing.slip_recovery_time", self.climbing.slip_recovery_time)?;
        positive("fall.gravity", self.fall.gravity)?;
        positive("fall.terminal_velocity", self.fall.terminal_velocity)?;
        positive("polling.window_interval", self.polling.window_interval)?;
        positive("polling.space_interval", self.polling.space_interval)?;

        ordered(
            "movement run distances",
            self.movement.slow_run_distance,
            self.movement.fast_run_distance,
        )?;
        ordered(
            "climbing rest duration",
            self.climbing.min_rest_duration,
            self.climbing.max_rest_duration,
        )?;
        ordered(
            "idle look-around interval",
            self.idle.look_around_min_interval,
            self.idle.look_around_max_interval,
        )?;
        ordered(
            "gesture proximity",
            self.gestures.close_proximity,
            self.gestures.near_proximity,
        )?;

        if self.climbing.tired_threshold > self.climbing.max_stamina {
            return Err(ConfigError::Invalid(
                "climbing.tired_threshold exceeds max_stamina".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.idle.scratch_chance) {
            return Err(ConfigError::Invalid(format!(
                "idle.scratch_chance must be in [0, 1], got {}",
                self.idle.scratch_chance
            )));
        }
        Ok(())
    }

    /// `sqrt(scale)`: speeds grow with the square root of body size.
    pub fn physics_scale(&self) -> f32 {
        self.character_scale.sqrt()
    }
}
