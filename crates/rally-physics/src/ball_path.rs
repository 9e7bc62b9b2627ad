use rally_core::Vector3;
use serde::{Deserialize, Serialize};

use crate::{PathError, Surface, Wall};

/// Ball position and velocity at one instant of a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectorySample {
    pub time: f64,
    pub position: Vector3,
    pub velocity: Vector3,
}

impl TrajectorySample {
    pub fn new(time: f64, position: Vector3, velocity: Vector3) -> Self {
        Self {
            time,
            position,
            velocity,
        }
    }
}

/// A predicted ball trajectory: samples strictly increasing in time.
///
/// Paths are immutable once built. A new one is produced every tick.
#[derive(Debug, Clone)]
pub struct BallPath {
    samples: Vec<TrajectorySample>,
    walls: Vec<Wall>,
    /// Per sample, the walls touched since the previous sample as a bit set over
    /// `walls`.
    contacts: Vec<u8>,
}

impl BallPath {
    pub(crate) fn from_parts(samples: Vec<TrajectorySample>, walls: Vec<Wall>, contacts: Vec<u8>) -> Self {
        Self {
            samples,
            walls,
            contacts,
        }
    }

    /// A path with no knowledge of the arena. Bounce queries on it find nothing.
    pub fn from_samples(samples: Vec<TrajectorySample>) -> Result<Self, PathError> {
        if samples.is_empty() {
            return Err(PathError::Empty);
        }
        if samples.windows(2).any(|w| w[1].time <= w[0].time) {
            return Err(PathError::NotIncreasing);
        }
        let contacts = vec![0; samples.len()];
        Ok(Self::from_parts(samples, Vec::new(), contacts))
    }

    pub fn samples(&self) -> &[TrajectorySample] {
        &self.samples
    }

    pub fn start(&self) -> &TrajectorySample {
        &self.samples[0]
    }

    pub fn end(&self) -> &TrajectorySample {
        &self.samples[self.samples.len() - 1]
    }

    /// Samples strictly after `time`.
    pub fn samples_after(&self, time: f64) -> impl Iterator<Item = &TrajectorySample> {
        let first = self.samples.partition_point(|s| s.time <= time);
        self.samples[first..].iter()
    }

    /// Interpolated position at `time`.
    pub fn position_at(&self, time: f64) -> Result<Vector3, PathError> {
        self.motion_at(time).map(|sample| sample.position)
    }

    /// Interpolated position and velocity at `time`.
    ///
    /// Both are linear between the two bracketing samples.
    pub fn motion_at(&self, time: f64) -> Result<TrajectorySample, PathError> {
        let start = self.start().time;
        let end = self.end().time;
        if !(start..=end).contains(&time) {
            return Err(PathError::OutOfRange { time, start, end });
        }

        let upper = self.samples.partition_point(|s| s.time < time);
        if upper == 0 {
            return Ok(self.samples[0]);
        }
        let a = &self.samples[upper - 1];
        let b = &self.samples[upper];
        let t = (time - a.time) / (b.time - a.time);
        Ok(TrajectorySample::new(
            time,
            a.position.lerp(&b.position, t),
            a.velocity.lerp(&b.velocity, t),
        ))
    }

    /// The first sample after `time` at which the ball has just bounced off any surface.
    pub fn first_bounce_after(&self, time: f64) -> Option<TrajectorySample> {
        self.first_bounce_matching(time, |_| true)
    }

    /// Like [`BallPath::first_bounce_after`], ignoring floor bounces.
    pub fn first_wall_bounce_after(&self, time: f64) -> Option<TrajectorySample> {
        self.first_bounce_matching(time, |wall| wall.surface != Surface::Floor)
    }

    fn first_bounce_matching(
        &self,
        time: f64,
        accept: impl Fn(&Wall) -> bool,
    ) -> Option<TrajectorySample> {
        (1..self.samples.len())
            .filter(|&i| self.samples[i].time > time)
            .find(|&i| {
                let (prev, cur) = (&self.samples[i - 1], &self.samples[i]);
                self.walls.iter().enumerate().any(|(w, wall)| {
                    self.contacts[i] & (1 << w) != 0
                        && accept(wall)
                        && wall.normal.dot(&prev.velocity) < 0.0
                        && wall.normal.dot(&cur.velocity) > 0.0
                })
            })
            .map(|i| self.samples[i])
    }
}

/// Detects when the real ball leaves the previously predicted trajectory, for
/// example because someone touched it.
#[derive(Debug, Clone)]
pub struct DisruptionMeter {
    threshold: f64,
    previous: Option<BallPath>,
}

impl DisruptionMeter {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            previous: None,
        }
    }

    /// Compare the start of `path` with the previous prediction, then remember `path`.
    pub fn is_disrupted(&mut self, path: &BallPath) -> bool {
        let start = path.start();
        let disrupted = self
            .previous
            .as_ref()
            .and_then(|previous| previous.position_at(start.time).ok())
            .map(|predicted| (predicted - start.position).norm() > self.threshold)
            .unwrap_or(false);
        if disrupted {
            log::debug!("Ball path disrupted at t={:.2}", start.time);
        }
        self.previous = Some(path.clone());
        disrupted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn linear_path() -> BallPath {
        BallPath::from_samples(vec![
            TrajectorySample::new(0.0, Vector3::new(0.0, 0.0, 2.0), Vector3::new(10.0, 0.0, 0.0)),
            TrajectorySample::new(0.1, Vector3::new(1.0, 0.0, 2.0), Vector3::new(10.0, 0.0, 0.0)),
            TrajectorySample::new(0.2, Vector3::new(2.0, 4.0, 2.0), Vector3::new(10.0, 0.0, 0.0)),
        ])
        .unwrap()
    }

    #[test]
    fn test_interpolation_lies_on_segment() {
        let path = linear_path();
        let a = path.samples()[1].position;
        let b = path.samples()[2].position;
        for time in [0.1, 0.125, 0.15, 0.19, 0.2] {
            let p = path.position_at(time).unwrap();
            let along = (p - a).dot(&(b - a)) / (b - a).norm_squared();
            assert!((-1e-9..=1.0 + 1e-9).contains(&along));
            let off_segment = (p - (a + (b - a) * along)).norm();
            assert_relative_eq!(off_segment, 0.0, epsilon = 1e-9);
        }
        assert_relative_eq!(path.position_at(0.15).unwrap().y, 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_out_of_range() {
        let path = linear_path();
        assert!(matches!(
            path.position_at(0.3),
            Err(PathError::OutOfRange { .. })
        ));
        assert!(path.position_at(-0.01).is_err());
        assert_eq!(path.position_at(0.0).unwrap(), path.start().position);
    }

    #[test]
    fn test_rejects_bad_samples() {
        assert_eq!(BallPath::from_samples(vec![]).unwrap_err(), PathError::Empty);
        let sample = TrajectorySample::new(1.0, Vector3::zeros(), Vector3::zeros());
        assert_eq!(
            BallPath::from_samples(vec![sample, sample]).unwrap_err(),
            PathError::NotIncreasing
        );
    }

    #[test]
    fn test_samples_after() {
        let path = linear_path();
        let times: Vec<f64> = path.samples_after(0.1).map(|s| s.time).collect();
        assert_eq!(times, vec![0.2]);
    }

    #[test]
    fn test_bounce_queries_without_walls() {
        assert!(linear_path().first_bounce_after(0.0).is_none());
    }

    #[test]
    fn test_disruption_meter() {
        let path = linear_path();
        let mut meter = DisruptionMeter::new(0.5);
        assert!(!meter.is_disrupted(&path));

        let on_track = BallPath::from_samples(vec![TrajectorySample::new(
            0.1,
            Vector3::new(1.0, 0.0, 2.0),
            Vector3::zeros(),
        )])
        .unwrap();
        assert!(!meter.is_disrupted(&on_track));

        let knocked = BallPath::from_samples(vec![TrajectorySample::new(
            0.1,
            Vector3::new(1.0, 3.0, 2.0),
            Vector3::zeros(),
        )])
        .unwrap();
        let mut meter = DisruptionMeter::new(0.5);
        meter.is_disrupted(&path);
        assert!(meter.is_disrupted(&knocked));
    }
}
