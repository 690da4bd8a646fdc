use serde_json::{Value, json};
use uuid::Uuid;

use crate::types::{AcMode, ControlRequest, DeviceSnapshot, FanLevel, Swing};
use crate::{Error, Result};

pub const DEFAULT_SENDER_ID: &str = "switcher_breeze";

pub fn control_message(sender_id: &str, device_id: &str, request: &ControlRequest) -> Value {
    // An OFF command carries only the state; the remote rejects payloads
    // that pair "off" with thermostat settings.
    let data = if request.power_on {
        json!({
            "state": "on",
            "mode": request.mode.as_api_str(),
            "targetTemperature": request.temperature,
            "fanLevel": request.fan_level.as_api_str(),
            "swing": request.swing.as_api_str(),
        })
    } else {
        json!({ "state": "off" })
    };

    json!({
        "MessageType": "Control",
        "SenderID": sender_id,
        "MessageID": Uuid::new_v4().to_string(),
        "DeviceID": device_id,
        "Data": data
    })
}

pub fn parse_state_response(body: &str) -> Result<DeviceSnapshot> {
    let parsed: Value = serde_json::from_str(body)
        .map_err(|e| Error::Protocol(format!("invalid state body: {e}")))?;

    let state = parsed
        .get("state")
        .and_then(|v| v.as_str())
        .ok_or_else(|| Error::Protocol("missing state field".to_string()))?;
    let power_on = match state {
        "on" => true,
        "off" => false,
        other => return Err(Error::Protocol(format!("unknown state: {other}"))),
    };

    let mode_str = parsed
        .get("mode")
        .and_then(|v| v.as_str())
        .ok_or_else(|| Error::Protocol("missing mode field".to_string()))?;
    let mode =
        AcMode::from_api_str(mode_str).ok_or_else(|| Error::InvalidMode(mode_str.to_string()))?;

    let target_temperature = parsed
        .get("targetTemperature")
        .and_then(|v| v.as_i64())
        .ok_or_else(|| Error::Protocol("missing targetTemperature field".to_string()))?
        as i32;

    let current_temperature = parsed.get("currentTemperature").and_then(|v| v.as_f64());

    // Fan and swing are absent from some firmware responses.
    let fan_level = parsed
        .get("fanLevel")
        .and_then(|v| v.as_str())
        .and_then(FanLevel::from_api_str)
        .unwrap_or(FanLevel::Medium);
    let swing = parsed
        .get("swing")
        .and_then(|v| v.as_str())
        .and_then(Swing::from_api_str)
        .unwrap_or(Swing::Off);

    Ok(DeviceSnapshot {
        power_on,
        mode,
        target_temperature,
        current_temperature,
        fan_level,
        swing,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn on_request() -> ControlRequest {
        ControlRequest {
            power_on: true,
            mode: AcMode::Cool,
            temperature: 24,
            fan_level: FanLevel::Medium,
            swing: Swing::Off,
        }
    }

    #[test]
    fn control_message_on_structure() {
        let msg = control_message("test_app", "abc123", &on_request());
        assert_eq!(msg["MessageType"], "Control");
        assert_eq!(msg["SenderID"], "test_app");
        assert_eq!(msg["DeviceID"], "abc123");
        assert_eq!(msg["Data"]["state"], "on");
        assert_eq!(msg["Data"]["mode"], "cool");
        assert_eq!(msg["Data"]["targetTemperature"], 24);
        assert_eq!(msg["Data"]["fanLevel"], "medium");
        assert!(!msg["MessageID"].as_str().unwrap().is_empty());
    }

    #[test]
    fn control_message_off_carries_state_only() {
        let request = ControlRequest {
            power_on: false,
            ..on_request()
        };
        let msg = control_message("test_app", "abc123", &request);
        assert_eq!(msg["Data"]["state"], "off");
        assert!(msg["Data"].get("mode").is_none());
        assert!(msg["Data"].get("targetTemperature").is_none());
    }

    #[test]
    fn parse_state_full() {
        let body = r#"{"state":"on","mode":"heat","targetTemperature":20,
                       "currentTemperature":18.5,"fanLevel":"high","swing":"on"}"#;
        let snap = parse_state_response(body).unwrap();
        assert!(snap.power_on);
        assert_eq!(snap.mode, AcMode::Heat);
        assert_eq!(snap.target_temperature, 20);
        assert_eq!(snap.current_temperature, Some(18.5));
        assert_eq!(snap.fan_level, FanLevel::High);
        assert_eq!(snap.swing, Swing::On);
    }

    #[test]
    fn parse_state_defaults_fan_and_swing() {
        let body = r#"{"state":"off","mode":"cool","targetTemperature":24}"#;
        let snap = parse_state_response(body).unwrap();
        assert!(!snap.power_on);
        assert_eq!(snap.fan_level, FanLevel::Medium);
        assert_eq!(snap.swing, Swing::Off);
    }

    #[test]
    fn parse_state_rejects_unknown_mode() {
        let body = r#"{"state":"on","mode":"dry","targetTemperature":24}"#;
        assert!(matches!(
            parse_state_response(body),
            Err(Error::InvalidMode(m)) if m == "dry"
        ));
    }

    #[test]
    fn parse_state_rejects_missing_fields() {
        assert!(matches!(
            parse_state_response(r#"{"mode":"cool"}"#),
            Err(Error::Protocol(_))
        ));
        assert!(matches!(
            parse_state_response("not json"),
            Err(Error::Protocol(_))
        ));
    }
}
