//! Sensor classification for polled variables
//!
//! Maps a variable name and its typed value to the kind of entity a
//! home-automation host should create. Pure functions only; no I/O.

use serde::Serialize;

use crate::coordinator::PollResult;
use crate::value::PlcValue;

/// Entity kind chosen from the value type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    Binary,
    Numeric,
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceClass {
    Temperature,
    Humidity,
    Power,
    Energy,
}

impl DeviceClass {
    pub fn unit(self) -> &'static str {
        match self {
            DeviceClass::Temperature => "°C",
            DeviceClass::Humidity => "%",
            DeviceClass::Power => "W",
            DeviceClass::Energy => "kWh",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StateClass {
    Measurement,
    TotalIncreasing,
}

/// How one variable should be presented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SensorDescription {
    pub kind: SensorKind,
    pub device_class: Option<DeviceClass>,
    pub unit: Option<&'static str>,
    pub state_class: Option<StateClass>,
}

// First match wins, so "TEMP_POWER_STAGE" is a temperature.
const NAME_RULES: [(&str, DeviceClass); 4] = [
    ("temp", DeviceClass::Temperature),
    ("humidity", DeviceClass::Humidity),
    ("power", DeviceClass::Power),
    ("energy", DeviceClass::Energy),
];

/// Classify a variable by its value type and, for numbers, its name.
pub fn classify(name: &str, value: &PlcValue) -> SensorDescription {
    match value {
        PlcValue::Bool(_) => SensorDescription {
            kind: SensorKind::Binary,
            device_class: None,
            unit: None,
            state_class: None,
        },
        PlcValue::Int(_) | PlcValue::Float(_) => {
            let folded = name.to_lowercase();
            let device_class = NAME_RULES
                .iter()
                .find(|(needle, _)| folded.contains(needle))
                .map(|(_, class)| *class);
            let state_class = match device_class {
                Some(DeviceClass::Energy) => StateClass::TotalIncreasing,
                _ => StateClass::Measurement,
            };
            SensorDescription {
                kind: SensorKind::Numeric,
                device_class,
                unit: device_class.map(DeviceClass::unit),
                state_class: Some(state_class),
            }
        }
        PlcValue::String(_) => SensorDescription {
            kind: SensorKind::Text,
            device_class: None,
            unit: None,
            state_class: None,
        },
    }
}

/// Value as shown to the host; floats are rounded to two decimals.
pub fn display_value(value: &PlcValue) -> PlcValue {
    match value {
        PlcValue::Float(f) => PlcValue::Float((f * 100.0).round() / 100.0),
        other => other.clone(),
    }
}

pub fn unique_id(entry_id: &str, variable: &str) -> String {
    format!("{}_{}", entry_id, variable)
}

pub fn entity_name(variable: &str) -> String {
    format!("Foxtrot PLC {}", variable)
}

/// Entity description of every variable in `result`, in name order.
pub fn describe_all<'a>(
    result: &'a PollResult,
) -> impl Iterator<Item = (&'a str, SensorDescription)> + 'a {
    result
        .iter()
        .map(|(name, value)| (name.as_str(), classify(name, value)))
}
