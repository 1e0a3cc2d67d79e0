//! Weather Simulator

use std::f64::consts::TAU;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::reading::TelemetryReading;

const BASE_WIND_SPEED_KMH: f64 = 30.0;
const BASE_WAVE_HEIGHT_M: f64 = 1.5;

const DAY_SECS: f64 = 86_400.0;
const YEAR_SECS: f64 = 31_536_000.0;
/// Semi-diurnal tide, 12.4 h
const TIDE_SECS: f64 = 44_640.0;

const MAX_WIND_SPEED_KMH: f64 = 120.0;
const MIN_WAVE_HEIGHT_M: f64 = 0.1;
const MAX_WAVE_HEIGHT_M: f64 = 8.0;

/// Generates plausible coastal weather readings.
///
/// Cycles are measured from the moment the simulator was created.
#[derive(Debug)]
pub struct TelemetrySimulator<R = StdRng> {
    rng: R,
    started: Instant,
}

impl TelemetrySimulator<StdRng> {
    /// Simulator seeded from the OS
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Reproducible simulator
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> TelemetrySimulator<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            started: Instant::now(),
        }
    }

    /// Reading for the current wall-clock time
    pub fn next_reading(&mut self) -> TelemetryReading {
        let elapsed = self.started.elapsed().as_secs_f64();
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or_default();
        self.reading_at(elapsed, timestamp)
    }

    /// Reading `elapsed_secs` into the simulation, stamped with `timestamp`
    pub fn reading_at(&mut self, elapsed_secs: f64, timestamp: i64) -> TelemetryReading {
        let wind_speed = round1(self.wind_speed(elapsed_secs));
        let wave_height = round1(self.wave_height(wind_speed, elapsed_secs));
        let weather_condition = self.weather_condition(wind_speed).to_string();

        TelemetryReading {
            timestamp,
            wind_speed,
            wave_height,
            weather_condition,
            temperature: round1(self.rng.gen_range(15.0..=25.0)),
            humidity: round1(self.rng.gen_range(60.0..=90.0)),
            pressure: round1(self.rng.gen_range(1010.0..=1020.0)),
            alert_active: false,
        }
    }

    fn wind_speed(&mut self, t: f64) -> f64 {
        let daily_cycle = (t / DAY_SECS * TAU).sin() * 10.0;
        let gust = self.rng.gen_range(0.8..=1.5);
        let seasonal = 1.0 + (t / YEAR_SECS * TAU).sin() * 0.3;
        let noise = self.rng.gen_range(-5.0..=5.0);

        ((BASE_WIND_SPEED_KMH + daily_cycle + noise) * gust * seasonal).clamp(0.0, MAX_WIND_SPEED_KMH)
    }

    fn wave_height(&mut self, wind_speed: f64, t: f64) -> f64 {
        let wind_wave = wind_speed / 20.0;
        let tidal_cycle = (t / TIDE_SECS * TAU).sin() * 0.5;
        let swell = self.rng.gen_range(0.5..=1.5);

        ((BASE_WAVE_HEIGHT_M + wind_wave + tidal_cycle) * swell)
            .clamp(MIN_WAVE_HEIGHT_M, MAX_WAVE_HEIGHT_M)
    }

    fn weather_condition(&mut self, wind_speed: f64) -> &'static str {
        let options: &[&'static str] = if wind_speed > 80.0 {
            &["Stormy"]
        } else if wind_speed > 50.0 {
            &["Heavy Rain", "Stormy", "Cloudy"]
        } else if wind_speed > 30.0 {
            &["Light Rain", "Cloudy", "Partly Cloudy"]
        } else {
            &["Clear", "Partly Cloudy", "Cloudy", "Foggy"]
        };
        options[self.rng.gen_range(0..options.len())]
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn has_one_decimal(value: f64) -> bool {
        ((value * 10.0).round() - value * 10.0).abs() < 1e-9
    }

    #[test]
    fn test_seeded_simulator_is_reproducible() {
        let a = TelemetrySimulator::seeded(7).reading_at(3600.0, 1_700_000_000);
        let b = TelemetrySimulator::seeded(7).reading_at(3600.0, 1_700_000_000);
        assert_eq!(a, b);
    }

    #[test]
    fn test_reading_fields() {
        let mut simulator = TelemetrySimulator::seeded(1);
        let reading = simulator.reading_at(0.0, 42);

        assert_eq!(reading.timestamp, 42);
        assert!(!reading.alert_active);
        assert!(has_one_decimal(reading.wind_speed));
        assert!(has_one_decimal(reading.wave_height));
        assert!(has_one_decimal(reading.pressure));
    }

    #[test]
    fn test_next_reading_uses_wall_clock() {
        let reading = TelemetrySimulator::from_entropy().next_reading();
        assert!(reading.timestamp > 1_600_000_000);
    }

    #[test]
    fn test_weather_condition_follows_wind() {
        let mut simulator = TelemetrySimulator::seeded(3);
        assert_eq!(simulator.weather_condition(95.0), "Stormy");
        for _ in 0..20 {
            let calm = simulator.weather_condition(10.0);
            assert!(["Clear", "Partly Cloudy", "Cloudy", "Foggy"].contains(&calm));
            let windy = simulator.weather_condition(60.0);
            assert!(["Heavy Rain", "Stormy", "Cloudy"].contains(&windy));
        }
    }

    proptest! {
        #[test]
        fn prop_readings_stay_in_range(seed in any::<u64>(), elapsed in 0.0f64..63_072_000.0) {
            let reading = TelemetrySimulator::seeded(seed).reading_at(elapsed, 0);

            prop_assert!((0.0..=120.0).contains(&reading.wind_speed));
            prop_assert!((0.1..=8.0).contains(&reading.wave_height));
            prop_assert!((15.0..=25.0).contains(&reading.temperature));
            prop_assert!((60.0..=90.0).contains(&reading.humidity));
            prop_assert!((1010.0..=1020.0).contains(&reading.pressure));
        }
    }
}
