use crate::modes::shooting_mode::ShootingMode;
use std::time::Duration;

/// Exposure bracketing presets, mirroring the EV steps the camera firmware
/// exposes for auto-exposure bracketing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bracketing {
    Off,
    Ev1_3,
    Ev2_3,
    Ev1,
    Ev1_1_3,
    Ev1_2_3,
    Ev2,
}

impl Bracketing {
    fn step(&self) -> Option<f32> {
        match self {
            Bracketing::Off => None,
            Bracketing::Ev1_3 => Some(1.0 / 3.0),
            Bracketing::Ev2_3 => Some(2.0 / 3.0),
            Bracketing::Ev1 => Some(1.0),
            Bracketing::Ev1_1_3 => Some(4.0 / 3.0),
            Bracketing::Ev1_2_3 => Some(5.0 / 3.0),
            Bracketing::Ev2 => Some(2.0),
        }
    }

    /// EV compensation offsets to apply, in increasing exposure order.
    /// `Off` still yields the single zero offset so the sequencer can treat
    /// every shot as "one capture per offset".
    pub fn offsets(&self) -> Vec<f32> {
        match self.step() {
            None => vec![0.0],
            Some(step) => vec![-step, 0.0, step],
        }
    }
}

/// Parameter set for one shooting mode. Aperture/shutter/ISO are lists so
/// that transition modes (sunrise, sunset) can alternate between two
/// exposures from shot to shot; steady modes carry a single entry.
#[derive(Debug, Clone)]
pub struct CaptureSettings {
    pub interval: Duration,
    pub apertures: Vec<&'static str>,
    pub shutter_speeds: Vec<&'static str>,
    pub isos: Vec<u32>,
    pub white_balance: &'static str,
    pub bracketing: Bracketing,
}

/// Settings resolved for a single scheduled shot.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSettings {
    pub aperture: &'static str,
    pub shutter_speed: &'static str,
    pub iso: u32,
    pub white_balance: &'static str,
}

#[derive(Debug, Clone)]
pub struct ShootingProfile {
    pub mode: ShootingMode,
    settings: CaptureSettings,
}

impl ShootingProfile {
    /// Pure lookup: every mode maps to exactly one parameter set.
    pub fn for_mode(mode: ShootingMode) -> Self {
        let settings = match mode {
            ShootingMode::Day => CaptureSettings {
                interval: Duration::from_secs(30),
                apertures: vec!["8"],
                shutter_speeds: vec!["1/250"],
                isos: vec![200],
                white_balance: "Daylight",
                bracketing: Bracketing::Ev1,
            },
            ShootingMode::Night => CaptureSettings {
                interval: Duration::from_secs(60),
                apertures: vec!["4"],
                shutter_speeds: vec!["30"],
                isos: vec![800],
                white_balance: "Daylight",
                bracketing: Bracketing::Ev1_1_3,
            },
            ShootingMode::Sunrise | ShootingMode::Sunset => CaptureSettings {
                interval: Duration::from_secs(15),
                apertures: vec!["8", "5.6"],
                shutter_speeds: vec!["1/250", "1/125"],
                isos: vec![200, 400],
                white_balance: "Daylight",
                bracketing: Bracketing::Ev1_2_3,
            },
            ShootingMode::Custom => CaptureSettings {
                interval: Duration::from_secs(60),
                apertures: vec!["8"],
                shutter_speeds: vec!["1/250"],
                isos: vec![200],
                white_balance: "Daylight",
                bracketing: Bracketing::Off,
            },
        };
        ShootingProfile { mode, settings }
    }

    pub fn settings(&self) -> &CaptureSettings {
        &self.settings
    }

    /// Resolve list-valued settings for the shot at `index`, cycling through
    /// each list so transition modes alternate exposures across the run.
    pub fn resolved_for_shot(&self, index: usize) -> ResolvedSettings {
        let s = &self.settings;
        ResolvedSettings {
            aperture: s.apertures[index % s.apertures.len()],
            shutter_speed: s.shutter_speeds[index % s.shutter_speeds.len()],
            iso: s.isos[index % s.isos.len()],
            white_balance: s.white_balance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_total_and_deterministic() {
        for mode in ShootingMode::ALL {
            let a = ShootingProfile::for_mode(mode);
            let b = ShootingProfile::for_mode(mode);
            assert!(!a.settings().apertures.is_empty());
            assert!(a.settings().interval > Duration::ZERO);
            assert_eq!(a.resolved_for_shot(0), b.resolved_for_shot(0));
            assert_eq!(a.resolved_for_shot(7), b.resolved_for_shot(7));
        }
    }

    #[test]
    fn bracket_offsets_are_strictly_increasing() {
        for bracketing in [
            Bracketing::Off,
            Bracketing::Ev1_3,
            Bracketing::Ev2_3,
            Bracketing::Ev1,
            Bracketing::Ev1_1_3,
            Bracketing::Ev1_2_3,
            Bracketing::Ev2,
        ] {
            let offsets = bracketing.offsets();
            assert!(!offsets.is_empty());
            for pair in offsets.windows(2) {
                assert!(pair[0] < pair[1], "{:?} offsets not increasing", bracketing);
            }
        }
    }

    #[test]
    fn off_bracketing_yields_single_zero_offset() {
        assert_eq!(Bracketing::Off.offsets(), vec![0.0]);
    }

    #[test]
    fn day_mode_brackets_one_ev() {
        let offsets = ShootingProfile::for_mode(ShootingMode::Day)
            .settings()
            .bracketing
            .offsets();
        assert_eq!(offsets, vec![-1.0, 0.0, 1.0]);
    }

    #[test]
    fn sunrise_alternates_exposures_by_shot_index() {
        let profile = ShootingProfile::for_mode(ShootingMode::Sunrise);
        let even = profile.resolved_for_shot(0);
        let odd = profile.resolved_for_shot(1);
        assert_eq!(even.aperture, "8");
        assert_eq!(odd.aperture, "5.6");
        assert_eq!(even.iso, 200);
        assert_eq!(odd.iso, 400);
        // Cycle wraps around
        assert_eq!(profile.resolved_for_shot(2), even);
        assert_eq!(profile.resolved_for_shot(3), odd);
    }

    #[test]
    fn custom_mode_has_no_bracketing() {
        let profile = ShootingProfile::for_mode(ShootingMode::Custom);
        assert_eq!(profile.settings().bracketing, Bracketing::Off);
    }
}
