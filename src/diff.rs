use serde_json::{json, Value};

use crate::types::*;

/// Field-level changes between two flat status records, as journal entries.
/// Keys missing from `previous` report `null` as the old value.
pub(crate) fn status_changes(previous: &Value, current: &Value) -> Vec<Value> {
    let (Some(prev), Some(curr)) = (previous.as_object(), current.as_object()) else {
        if previous == current {
            return Vec::new();
        }
        return vec![json!({ "path": "", "old": previous, "new": current })];
    };
    curr.iter()
        .filter_map(|(key, new)| {
            let old = prev.get(key).unwrap_or(&Value::Null);
            (old != new).then(|| json!({ "path": key, "old": old, "new": new }))
        })
        .collect()
}

/// Typed events for every field that differs. With no previous state every
/// field counts as changed.
pub(crate) fn state_events(previous: Option<&EntityState>, current: &EntityState) -> Vec<Event> {
    let mut events = Vec::new();

    if previous.is_none_or(|p| p.current_temperature != current.current_temperature) {
        events.push(Event::CurrentTemperatureChanged {
            temp: current.current_temperature,
        });
    }
    if previous.is_none_or(|p| p.target_temperature != current.target_temperature) {
        events.push(Event::TargetTemperatureChanged {
            temp: current.target_temperature,
        });
    }
    if previous.is_none_or(|p| p.min_temp != current.min_temp || p.max_temp != current.max_temp) {
        events.push(Event::RangeChanged {
            min: current.min_temp,
            max: current.max_temp,
        });
    }
    if previous.is_none_or(|p| p.hvac_mode != current.hvac_mode) {
        events.push(Event::ModeChanged {
            mode: current.hvac_mode,
        });
    }
    if previous.is_none_or(|p| p.hvac_action != current.hvac_action) {
        events.push(Event::ActionChanged {
            action: current.hvac_action,
        });
    }
    if previous.is_none_or(|p| p.preset_mode != current.preset_mode) {
        events.push(Event::PresetChanged {
            preset: current.preset_mode,
        });
    }
    events
}
