//! Temperature values and their display classification
//!
//! A temperature is stored as a whole number of tenths so that the zone and
//! recommendation thresholds compare exactly. Colors are interpolated from
//! the floating point value.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::scenario::ScenarioId;

/// Lowest temperature the slider allows.
pub const MIN_TEMPERATURE: f32 = 0.0;
/// Highest temperature the slider allows.
pub const MAX_TEMPERATURE: f32 = 2.0;

const MAX_TENTHS: u8 = 20;

/// Sampling temperature, clamped to [0.0, 2.0] in steps of 0.1
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "f32", into = "f32")]
pub struct Temperature {
    tenths: u8,
}

impl Temperature {
    pub const MIN: Temperature = Temperature { tenths: 0 };
    pub const BALANCED: Temperature = Temperature { tenths: 10 };
    pub const MAX: Temperature = Temperature { tenths: MAX_TENTHS };

    /// Build a temperature from any float, clamping into range and snapping
    /// to the nearest tenth. NaN maps to the minimum.
    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            return Self::MIN;
        }
        let clamped = value.clamp(MIN_TEMPERATURE, MAX_TEMPERATURE);
        Self {
            tenths: (clamped * 10.0).round() as u8,
        }
    }

    pub fn from_tenths(tenths: u8) -> Self {
        Self {
            tenths: tenths.min(MAX_TENTHS),
        }
    }

    pub fn tenths(self) -> u8 {
        self.tenths
    }

    pub fn value(self) -> f32 {
        f32::from(self.tenths) / 10.0
    }

    pub fn step_up(self) -> Self {
        Self::from_tenths(self.tenths.saturating_add(1))
    }

    pub fn step_down(self) -> Self {
        Self::from_tenths(self.tenths.saturating_sub(1))
    }

    /// Every slider position from 0.0 to 2.0.
    pub fn all() -> impl Iterator<Item = Temperature> {
        (0..=MAX_TENTHS).map(Self::from_tenths)
    }
}

impl Default for Temperature {
    fn default() -> Self {
        Self { tenths: 5 }
    }
}

impl From<f32> for Temperature {
    fn from(value: f32) -> Self {
        Self::new(value)
    }
}

impl From<Temperature> for f32 {
    fn from(value: Temperature) -> Self {
        value.value()
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.value())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

pub const COLD: Rgb = Rgb::new(0, 100, 255);
pub const MID: Rgb = Rgb::new(100, 150, 155);
pub const HOT: Rgb = Rgb::new(255, 50, 0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Zone {
    Coder,
    Balanced,
    Poet,
}

impl Zone {
    pub fn short_name(&self) -> &'static str {
        match self {
            Zone::Coder => "Coder zone",
            Zone::Balanced => "Balanced zone",
            Zone::Poet => "Poet zone",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Zone::Coder => "Zone: The Coder (Precision & Consistency)",
            Zone::Balanced => "Zone: Balanced",
            Zone::Poet => "Zone: The Poet (Hallucination & Flair)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub color: Rgb,
    pub zone: Zone,
}

fn channel(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Slider color: cold blue to purple up to 1.0, then purple to hot orange.
pub fn color_for(temperature: Temperature) -> Rgb {
    let t = temperature.value();
    if t <= 1.0 {
        Rgb::new(
            channel(100.0 * t),
            channel(100.0 + 50.0 * t),
            channel(255.0 - 100.0 * t),
        )
    } else {
        let t = t - 1.0;
        Rgb::new(
            channel(100.0 + 155.0 * t),
            channel(150.0 - 100.0 * t),
            channel(155.0 - 155.0 * t),
        )
    }
}

/// Zone split: <= 0.4 coder, >= 1.4 poet, balanced in between.
pub fn zone_for(temperature: Temperature) -> Zone {
    match temperature.tenths() {
        0..=4 => Zone::Coder,
        14.. => Zone::Poet,
        _ => Zone::Balanced,
    }
}

pub fn classify(temperature: Temperature) -> Classification {
    Classification {
        color: color_for(temperature),
        zone: zone_for(temperature),
    }
}

/// Whether a scenario card should be highlighted at this temperature.
///
/// These thresholds differ from [`zone_for`]: between 0.5 and 1.2 neither
/// card is recommended.
pub fn is_recommended(scenario: ScenarioId, temperature: Temperature) -> bool {
    match scenario {
        ScenarioId::Coder => temperature.tenths() < 5,
        ScenarioId::Poet => temperature.tenths() >= 12,
    }
}

/// The scenario recommended at this temperature, if any.
pub fn recommended_scenario(temperature: Temperature) -> Option<ScenarioId> {
    ScenarioId::all()
        .into_iter()
        .find(|id| is_recommended(*id, temperature))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_clamps_and_snaps() {
        assert_eq!(Temperature::new(-1.0), Temperature::MIN);
        assert_eq!(Temperature::new(7.5), Temperature::MAX);
        assert_eq!(Temperature::new(f32::NAN), Temperature::MIN);
        assert_eq!(Temperature::new(f32::INFINITY), Temperature::MAX);
        assert_eq!(Temperature::new(0.34).tenths(), 3);
        assert_eq!(Temperature::new(0.36).tenths(), 4);
        assert_eq!(Temperature::new(1.5).to_string(), "1.5");
        assert_eq!(Temperature::default().to_string(), "0.5");
    }

    #[test]
    fn steps_saturate_at_the_ends() {
        assert_eq!(Temperature::MAX.step_up(), Temperature::MAX);
        assert_eq!(Temperature::MIN.step_down(), Temperature::MIN);
        assert_eq!(Temperature::new(0.9).step_up(), Temperature::BALANCED);
        assert_eq!(Temperature::new(1.1).step_down(), Temperature::BALANCED);
        assert_eq!(Temperature::all().count(), 21);
    }

    #[test]
    fn color_endpoints() {
        assert_eq!(color_for(Temperature::MIN), COLD);
        assert_eq!(color_for(Temperature::BALANCED), MID);
        assert_eq!(color_for(Temperature::MAX), HOT);
        assert_eq!(color_for(Temperature::new(0.1)), Rgb::new(10, 105, 245));
        assert_eq!(color_for(Temperature::new(1.5)).to_string(), "rgb(178, 100, 78)");
    }

    #[test]
    fn color_is_monotonic_within_each_segment() {
        let cold: Vec<Rgb> = Temperature::all()
            .filter(|t| t.tenths() <= 10)
            .map(color_for)
            .collect();
        for pair in cold.windows(2) {
            assert!(pair[1].r >= pair[0].r);
            assert!(pair[1].g >= pair[0].g);
            assert!(pair[1].b <= pair[0].b);
        }

        let hot: Vec<Rgb> = Temperature::all()
            .filter(|t| t.tenths() >= 10)
            .map(color_for)
            .collect();
        for pair in hot.windows(2) {
            assert!(pair[1].r >= pair[0].r);
            assert!(pair[1].g <= pair[0].g);
            assert!(pair[1].b <= pair[0].b);
        }
    }

    #[test]
    fn zone_table() {
        let cases = [
            (0.0, Zone::Coder),
            (0.1, Zone::Coder),
            (0.4, Zone::Coder),
            (0.5, Zone::Balanced),
            (0.8, Zone::Balanced),
            (1.0, Zone::Balanced),
            (1.3, Zone::Balanced),
            (1.4, Zone::Poet),
            (1.5, Zone::Poet),
            (2.0, Zone::Poet),
        ];
        for (value, zone) in cases {
            assert_eq!(zone_for(Temperature::new(value)), zone, "temperature {value}");
        }
    }

    #[test]
    fn every_slider_position_has_exactly_one_zone() {
        for t in Temperature::all() {
            let zones = [Zone::Coder, Zone::Balanced, Zone::Poet]
                .into_iter()
                .filter(|z| *z == zone_for(t))
                .count();
            assert_eq!(zones, 1);
        }
    }

    #[test]
    fn recommendation_has_a_gap() {
        let coder_prompt_temp = Temperature::new(0.1);
        assert_eq!(classify(coder_prompt_temp).zone, Zone::Coder);
        assert!(is_recommended(ScenarioId::Coder, coder_prompt_temp));
        assert!(!is_recommended(ScenarioId::Poet, coder_prompt_temp));

        let poet_prompt_temp = Temperature::new(1.5);
        assert_eq!(classify(poet_prompt_temp).zone, Zone::Poet);
        assert!(is_recommended(ScenarioId::Poet, poet_prompt_temp));

        let middle = Temperature::new(0.8);
        assert_eq!(classify(middle).zone, Zone::Balanced);
        assert_eq!(recommended_scenario(middle), None);

        assert!(!is_recommended(ScenarioId::Coder, Temperature::new(0.5)));
        assert!(!is_recommended(ScenarioId::Poet, Temperature::new(1.1)));
        assert!(is_recommended(ScenarioId::Poet, Temperature::new(1.2)));
        // 1.2 and 1.3 recommend the poet while the zone is still balanced
        assert_eq!(zone_for(Temperature::new(1.3)), Zone::Balanced);
        assert_eq!(recommended_scenario(Temperature::new(1.3)), Some(ScenarioId::Poet));
    }

    #[test]
    fn classify_has_no_hidden_state() {
        for t in Temperature::all() {
            assert_eq!(classify(t), classify(t));
        }
    }

    #[test]
    fn serde_uses_plain_floats() {
        let json = serde_json::to_string(&Temperature::new(1.2)).unwrap();
        assert_eq!(json, "1.2");
        let parsed: Temperature = serde_json::from_str("3.0").unwrap();
        assert_eq!(parsed, Temperature::MAX);
    }
}
