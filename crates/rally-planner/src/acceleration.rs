use rally_core::{settings::AccelerationSettings, VehicleState};
use serde::Serialize;

/// How far a car has travelled, and how fast it is going, after some time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DistanceTimeSpeed {
    pub distance: f64,
    pub time: f64,
    pub speed: f64,
}

/// A stretch of constant acceleration.
#[derive(Debug, Clone, Copy)]
struct Segment {
    start: DistanceTimeSpeed,
    accel: f64,
    duration: f64,
}

impl Segment {
    fn at(&self, tau: f64) -> DistanceTimeSpeed {
        DistanceTimeSpeed {
            distance: self.start.distance + self.start.speed * tau + 0.5 * self.accel * tau * tau,
            time: self.start.time + tau,
            speed: self.start.speed + self.accel * tau,
        }
    }

    fn end(&self) -> DistanceTimeSpeed {
        self.at(self.duration)
    }

    /// Time into the segment at which `distance` is reached.
    fn time_to(&self, distance: f64) -> Option<f64> {
        let d = distance - self.start.distance;
        let v = self.start.speed;
        if self.accel.abs() < 1e-12 {
            return (v > 1e-12).then(|| d / v);
        }
        let discriminant = v * v + 2.0 * self.accel * d;
        (discriminant >= 0.0).then(|| (-v + discriminant.sqrt()) / self.accel)
    }
}

/// Straight-line travel of a car accelerating as hard as it can, starting now.
///
/// Distance, time and speed are all non-decreasing along the plot.
#[derive(Debug, Clone)]
pub struct DistancePlot {
    segments: Vec<Segment>,
}

impl DistancePlot {
    pub fn horizon(&self) -> f64 {
        self.segments.last().map(|s| s.end().time).unwrap_or(0.0)
    }

    pub fn max_distance(&self) -> f64 {
        self.segments.last().map(|s| s.end().distance).unwrap_or(0.0)
    }

    pub fn max_speed(&self) -> f64 {
        self.segments.last().map(|s| s.end().speed).unwrap_or(0.0)
    }

    /// Travel after `time` seconds, or `None` outside the plot.
    pub fn motion_at(&self, time: f64) -> Option<DistanceTimeSpeed> {
        if time < 0.0 {
            return None;
        }
        let segment = self
            .segments
            .iter()
            .find(|s| time <= s.start.time + s.duration)?;
        Some(segment.at(time - segment.start.time))
    }

    /// Earliest moment at which `distance` has been covered.
    pub fn motion_after_distance(&self, distance: f64) -> Option<DistanceTimeSpeed> {
        if distance <= 0.0 {
            return self.segments.first().map(|s| s.start);
        }
        let segment = self.segments.iter().find(|s| distance <= s.end().distance)?;
        let tau = segment.time_to(distance)?.clamp(0.0, segment.duration);
        Some(DistanceTimeSpeed {
            distance,
            ..segment.at(tau)
        })
    }
}

/// Closed-form model of straight-line acceleration in speed bands.
#[derive(Debug, Clone)]
pub struct AccelerationModel {
    settings: AccelerationSettings,
}

impl AccelerationModel {
    pub fn new(settings: &AccelerationSettings) -> Self {
        Self {
            settings: settings.clone(),
        }
    }

    /// Plot for a car driving forward from its current state.
    pub fn for_car(&self, car: &VehicleState, horizon: f64) -> DistancePlot {
        self.distance_plot(car.forward_speed().max(0.0), car.boost, horizon)
    }

    /// Build the plot from a start speed and boost amount.
    pub fn distance_plot(&self, start_speed: f64, boost: f64, horizon: f64) -> DistancePlot {
        let s = &self.settings;
        let mut boost_left = if s.boost_per_second > 0.0 {
            boost.max(0.0) / s.boost_per_second
        } else {
            f64::INFINITY
        };
        let mut state = DistanceTimeSpeed {
            distance: 0.0,
            time: 0.0,
            speed: start_speed.max(0.0),
        };
        let mut segments = Vec::new();

        // every segment ends on a band edge, boost exhaustion or the horizon
        while state.time < horizon && segments.len() < 16 {
            let (throttle_accel, band_top) = self.band(state.speed);
            let boosting = boost_left > 0.0 && state.speed < s.supersonic_speed;
            let accel = throttle_accel + if boosting { s.boost_accel } else { 0.0 };

            let mut duration = horizon - state.time;
            let mut reaches_band_top = false;
            if accel > 0.0 && (band_top - state.speed) / accel <= duration {
                duration = (band_top - state.speed) / accel;
                reaches_band_top = true;
            }
            if boosting && boost_left < duration {
                duration = boost_left;
                reaches_band_top = false;
            }

            let segment = Segment {
                start: state,
                accel,
                duration,
            };
            segments.push(segment);
            state = segment.end();
            if reaches_band_top {
                state.speed = band_top;
            }
            if boosting {
                boost_left -= duration;
            }
        }

        DistancePlot { segments }
    }

    /// Throttle acceleration and the upper edge of the band containing `speed`.
    fn band(&self, speed: f64) -> (f64, f64) {
        let s = &self.settings;
        if speed < s.low_band_top {
            (s.low_band_accel, s.low_band_top)
        } else if speed < s.medium_speed {
            (s.medium_band_accel, s.medium_speed)
        } else {
            (0.0, s.supersonic_speed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn model() -> AccelerationModel {
        AccelerationModel::new(&AccelerationSettings::default())
    }

    #[test]
    fn test_closed_form_in_low_band() {
        let plot = model().distance_plot(0.0, 0.0, 5.0);
        let motion = plot.motion_at(0.5).unwrap();
        assert_relative_eq!(motion.speed, 13.0, epsilon = 1e-9);
        assert_relative_eq!(motion.distance, 3.25, epsilon = 1e-9);

        let back = plot.motion_after_distance(3.25).unwrap();
        assert_relative_eq!(back.time, 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_monotonic_in_distance() {
        for (speed, boost) in [(0.0, 0.0), (0.0, 100.0), (20.0, 30.0), (45.0, 100.0)] {
            let plot = model().distance_plot(speed, boost, 5.0);
            let mut previous = plot.motion_after_distance(0.0).unwrap();
            let mut d = 1.0;
            while d < plot.max_distance() {
                let motion = plot.motion_after_distance(d).unwrap();
                assert!(motion.speed >= previous.speed - 1e-9);
                assert!(motion.time >= previous.time);
                previous = motion;
                d += 1.0;
            }
        }
    }

    #[test]
    fn test_boost_helps_and_caps_at_supersonic() {
        let plain = model().distance_plot(0.0, 0.0, 5.0);
        let boosted = model().distance_plot(0.0, 100.0, 5.0);
        assert!(boosted.max_distance() > plain.max_distance());
        assert_relative_eq!(plain.max_speed(), 28.0, epsilon = 1e-9);
        assert_relative_eq!(boosted.max_speed(), 46.0, epsilon = 1e-9);
    }

    #[test]
    fn test_boost_runs_out() {
        // one tenth of a second of boost
        let plot = model().distance_plot(28.0, 3.33, 5.0);
        assert_relative_eq!(plot.max_speed(), 28.0 + 19.8 * 0.1, epsilon = 1e-6);
    }

    #[test]
    fn test_beyond_horizon() {
        let plot = model().distance_plot(10.0, 0.0, 2.0);
        assert!(plot.motion_at(2.5).is_none());
        assert!(plot.motion_after_distance(plot.max_distance() + 1.0).is_none());
        assert_relative_eq!(plot.horizon(), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_standing_still_without_acceleration() {
        let settings = AccelerationSettings {
            low_band_accel: 0.0,
            ..Default::default()
        };
        let plot = AccelerationModel::new(&settings).distance_plot(0.0, 0.0, 1.0);
        assert!(plot.motion_after_distance(1.0).is_none());
        assert_relative_eq!(plot.motion_at(1.0).unwrap().distance, 0.0);
    }
}
