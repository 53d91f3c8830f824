use crate::types::*;

/// User-side inputs to [`interpret`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InterpretConfig {
    pub use_external_temp: bool,
    pub use_cooling: bool,
    pub current_preset: Preset,
}

/// Map one status snapshot to climate entity state. Never fails.
///
/// The device only reports a single "active" bit, so with cooling enabled the
/// direction is inferred from which side of `target + dif` the current
/// temperature sits. This is a heuristic, not something the device confirms.
pub fn interpret(status: &DeviceStatus, config: &InterpretConfig) -> EntityState {
    let current_temperature = status.current_temp(config.use_external_temp);
    let target_temperature = status.thermostat_temp;

    let (hvac_mode, preset_mode) = if status.power == Power::Off {
        (HvacMode::Off, Preset::None)
    } else if status.auto_mode == ControlMode::Manual || status.temp_manual == ControlMode::Manual {
        let mode = if config.use_cooling {
            HvacMode::HeatCool
        } else {
            HvacMode::Heat
        };
        (mode, config.current_preset)
    } else {
        // following the schedule always drops the away preset
        (HvacMode::Auto, Preset::None)
    };

    let hvac_action = match (status.power, status.active) {
        (Power::Off, _) => HvacAction::Off,
        (Power::On, Activity::Idle) => HvacAction::Idle,
        (Power::On, Activity::Active) if !config.use_cooling => HvacAction::Heating,
        (Power::On, Activity::Active) => {
            if target_temperature + f64::from(status.dif) < current_temperature {
                HvacAction::Cooling
            } else {
                HvacAction::Heating
            }
        }
    };

    EntityState {
        current_temperature,
        target_temperature,
        min_temp: f64::from(status.svl),
        max_temp: f64::from(status.svh),
        hvac_mode,
        hvac_action,
        preset_mode,
    }
}
