use crate::errors::AppError;
use log::debug;
use std::time::Duration;

/// Ordered list of scheduled shot offsets for one session.
///
/// Offsets run {0, I, 2I, ..., floor(D/I)*I}: a shot fires at time zero and
/// at every whole interval up to and including the configured duration, so a
/// plan always holds floor(D/I) + 1 shots.
#[derive(Debug, Clone)]
pub struct ShotPlan {
    offsets: Vec<Duration>,
}

impl ShotPlan {
    pub fn build(duration: Duration, interval: Duration) -> Result<Self, AppError> {
        if duration.is_zero() {
            return Err(AppError::Config(
                "Session duration must be positive.".to_string(),
            ));
        }
        if interval.is_zero() {
            return Err(AppError::Config(
                "Shot interval must be positive.".to_string(),
            ));
        }

        // Nanosecond arithmetic so sub-second intervals schedule correctly.
        let count = (duration.as_nanos() / interval.as_nanos()) as u64 + 1;
        let offsets: Vec<Duration> = (0..count).map(|i| interval * i as u32).collect();
        debug!(
            "🗓️ Built shot plan: {} shots over {:?} at {:?} intervals.",
            offsets.len(),
            duration,
            interval
        );
        Ok(ShotPlan { offsets })
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    pub fn offsets(&self) -> &[Duration] {
        &self.offsets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn sixty_second_run_at_ten_second_interval_yields_seven_shots() {
        let plan = ShotPlan::build(secs(60), secs(10)).unwrap();
        assert_eq!(plan.len(), 7);
        let expected: Vec<Duration> = [0u64, 10, 20, 30, 40, 50, 60]
            .iter()
            .map(|&s| secs(s))
            .collect();
        assert_eq!(plan.offsets(), expected.as_slice());
    }

    #[test]
    fn offsets_are_strictly_increasing_and_bounded_by_duration() {
        for (d, i) in [(60u64, 10u64), (3600, 30), (7, 3), (100, 100), (5, 60)] {
            let plan = ShotPlan::build(secs(d), secs(i)).unwrap();
            assert_eq!(plan.len() as u64, d / i + 1, "duration={} interval={}", d, i);
            for pair in plan.offsets().windows(2) {
                assert!(pair[0] < pair[1]);
            }
            assert!(*plan.offsets().last().unwrap() <= secs(d));
        }
    }

    #[test]
    fn sub_second_intervals_are_scheduled_exactly() {
        let plan = ShotPlan::build(secs(2), Duration::from_millis(500)).unwrap();
        assert_eq!(plan.len(), 5);
        assert_eq!(plan.offsets()[1], Duration::from_millis(500));
        assert_eq!(*plan.offsets().last().unwrap(), secs(2));
    }

    #[test]
    fn interval_longer_than_duration_gives_single_shot_at_zero() {
        let plan = ShotPlan::build(secs(5), secs(60)).unwrap();
        assert_eq!(plan.offsets(), &[Duration::ZERO]);
    }

    #[test]
    fn zero_duration_or_interval_is_rejected() {
        assert!(matches!(
            ShotPlan::build(Duration::ZERO, secs(10)),
            Err(AppError::Config(_))
        ));
        assert!(matches!(
            ShotPlan::build(secs(10), Duration::ZERO),
            Err(AppError::Config(_))
        ));
    }
}
