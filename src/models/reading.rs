use serde::Deserialize;

/// Glyph shown for any field the server did not supply.
pub const PLACEHOLDER: &str = "–";

/// Raw sensor payload as returned by the wakesys API.
///
/// All fields are optional; the server omits them when the sensor has no
/// reading. The value is kept as text, it is never parsed as a number.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SensorReading {
    #[serde(default)]
    pub col_value: Option<String>,
    #[serde(default)]
    pub col_unit: Option<String>,
    #[serde(default)]
    pub col_datetime: Option<String>,
}

impl SensorReading {
    /// Lenient conversion from an arbitrary JSON value, as delivered by the
    /// JSONP callback. Anything that does not fit the expected shape degrades
    /// to an empty reading rather than an error.
    pub fn from_value(value: serde_json::Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }
}

/// Display projection of a reading: the three strings rendered into the
/// info region.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingDisplay {
    pub temperature: String,
    pub unit: String,
    pub last_update: String,
}

impl Default for ReadingDisplay {
    fn default() -> Self {
        Self {
            temperature: PLACEHOLDER.to_string(),
            unit: PLACEHOLDER.to_string(),
            last_update: PLACEHOLDER.to_string(),
        }
    }
}

impl From<&SensorReading> for ReadingDisplay {
    fn from(reading: &SensorReading) -> Self {
        Self {
            // Decimal comma for display, e.g. "21.5" -> "21,5"
            temperature: reading
                .col_value
                .as_deref()
                .map(|v| v.replace('.', ","))
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
            unit: reading
                .col_unit
                .clone()
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
            last_update: reading
                .col_datetime
                .clone()
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(value: Option<&str>, unit: Option<&str>, datetime: Option<&str>) -> SensorReading {
        SensorReading {
            col_value: value.map(String::from),
            col_unit: unit.map(String::from),
            col_datetime: datetime.map(String::from),
        }
    }

    #[test]
    fn test_decimal_comma_substitution() {
        let display = ReadingDisplay::from(&reading(Some("21.5"), Some("°C"), Some("2024-01-01 10:00")));
        assert_eq!(display.temperature, "21,5");
        assert_eq!(display.unit, "°C");
        assert_eq!(display.last_update, "2024-01-01 10:00");
    }

    #[test]
    fn test_every_dot_is_replaced() {
        let display = ReadingDisplay::from(&reading(Some("1.2.3"), None, None));
        assert_eq!(display.temperature, "1,2,3");
    }

    #[test]
    fn test_missing_fields_render_placeholders_independently() {
        let display = ReadingDisplay::from(&reading(None, Some("°C"), None));
        assert_eq!(display.temperature, PLACEHOLDER);
        assert_eq!(display.unit, "°C");
        assert_eq!(display.last_update, PLACEHOLDER);

        let display = ReadingDisplay::from(&reading(Some("3.0"), None, Some("now")));
        assert_eq!(display.temperature, "3,0");
        assert_eq!(display.unit, PLACEHOLDER);
        assert_eq!(display.last_update, "now");
    }

    #[test]
    fn test_empty_payload_renders_all_placeholders() {
        let display = ReadingDisplay::from(&SensorReading::default());
        assert_eq!(display, ReadingDisplay::default());
    }

    #[test]
    fn test_from_value_accepts_well_formed_payload() {
        let value = serde_json::json!({
            "col_value": "18.2",
            "col_unit": "°C",
            "col_datetime": "2024-06-01 08:30"
        });
        let reading = SensorReading::from_value(value);
        assert_eq!(reading.col_value.as_deref(), Some("18.2"));
        assert_eq!(reading.col_unit.as_deref(), Some("°C"));
        assert_eq!(reading.col_datetime.as_deref(), Some("2024-06-01 08:30"));
    }

    #[test]
    fn test_from_value_degrades_on_malformed_payload() {
        let reading = SensorReading::from_value(serde_json::json!([1, 2, 3]));
        assert!(reading.col_value.is_none());
        assert!(reading.col_unit.is_none());
        assert!(reading.col_datetime.is_none());
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let value = serde_json::json!({"col_value": "7.5", "col_extra": "x"});
        let reading = SensorReading::from_value(value);
        assert_eq!(reading.col_value.as_deref(), Some("7.5"));
    }
}
