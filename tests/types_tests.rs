use chrono::NaiveDate;
use floureon::{
    Activity, ControlMode, DeviceStatus, DeviceTime, Error, HvacAction, HvacMode, LoopMode, Power, Preset,
    RawStatus, SwitchState,
};

#[test]
fn device_time_uses_iso_weekday() {
    // 2024-03-03 was a Sunday
    let sunday = NaiveDate::from_ymd_opt(2024, 3, 3)
        .unwrap()
        .and_hms_opt(23, 59, 58)
        .unwrap();
    let t = DeviceTime::from_datetime(&sunday);
    assert_eq!(t.weekday, 7);
    assert_eq!((t.hour, t.minute, t.second), (23, 59, 58));

    let monday = NaiveDate::from_ymd_opt(2024, 3, 4)
        .unwrap()
        .and_hms_opt(6, 0, 0)
        .unwrap();
    assert_eq!(DeviceTime::from_datetime(&monday).weekday, 1);
}

#[test]
fn device_time_display() {
    let t = DeviceTime {
        hour: 7,
        minute: 5,
        second: 9,
        weekday: 2,
    };
    assert_eq!(t.to_string(), "07:05:09 (day 2)");
}

#[test]
fn hass_strings() {
    assert_eq!(HvacMode::HeatCool.as_hass_str(), "heat_cool");
    assert_eq!(HvacMode::from_hass_str("auto"), Some(HvacMode::Auto));
    assert_eq!(HvacMode::from_hass_str("cool"), None);
    assert_eq!(HvacAction::Cooling.as_hass_str(), "cooling");
    assert_eq!(Preset::from_hass_str("away"), Some(Preset::Away));
    assert_eq!(Preset::None.as_hass_str(), "none");
    assert_eq!(SwitchState::Unavailable.as_hass_str(), "unavailable");
}

#[test]
fn loop_mode_codes() {
    assert_eq!(LoopMode::from_raw(1), Some(LoopMode::SixPlusOne));
    assert_eq!(LoopMode::from_raw(3), None);
    assert!(LoopMode::try_from(9u8).is_err());
    assert_eq!(u8::from(LoopMode::AllWeek), 2);
}

#[test]
fn hvac_mode_serializes_as_hass_string() {
    assert_eq!(serde_json::to_value(HvacMode::HeatCool).unwrap(), "heat_cool");
    assert_eq!(serde_json::to_value(Preset::Away).unwrap(), "away");
}

#[test]
fn link_status_decodes_through_raw_record() {
    let raw: RawStatus = serde_json::from_value(serde_json::json!({
        "room_temp": 19.5,
        "external_temp": 17.0,
        "thermostat_temp": 21.0,
        "svl": 5,
        "svh": 30,
        "dif": 1,
        "power": 1,
        "active": 0,
        "auto_mode": 0,
        "temp_manual": 1,
    }))
    .unwrap();
    let status = DeviceStatus::try_from(raw.clone()).unwrap();
    assert_eq!(status.power, Power::On);
    assert_eq!(status.active, Activity::Idle);
    assert_eq!(status.auto_mode, ControlMode::Manual);
    assert_eq!(status.temp_manual, ControlMode::Manual);

    let bad = RawStatus { power: 9, ..raw };
    assert!(matches!(DeviceStatus::try_from(bad), Err(Error::Protocol(_))));
}
