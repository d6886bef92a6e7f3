//! Fixed-timestep animation driver
//!
//! Called once per display refresh. Simulation steps run at the target rate
//! no matter how fast or slow the display refreshes; every refresh still
//! updates the camera controls and renders.

use super::state::SimulationState;
use crate::consts::TARGET_FPS;

/// Collaborators invoked on every refresh, stepped or not
pub trait FrameHost {
    /// Advance orbit controls one tick
    fn update_controls(&mut self);
    /// Submit the scene for rendering
    fn render(&mut self, state: &SimulationState);
}

/// Driver lifecycle; there is no terminal state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// No refresh seen yet
    Idle,
    /// Steady state
    Ticking,
}

#[derive(Debug, Clone)]
pub struct AnimationDriver {
    state: DriverState,
    /// Milliseconds per simulation step
    target_interval: f64,
    /// Timestamp the last step is credited to (drift-corrected)
    last_step_time: f64,
    frames: u64,
    steps: u64,
}

impl Default for AnimationDriver {
    fn default() -> Self {
        Self::new(TARGET_FPS)
    }
}

impl AnimationDriver {
    /// Driver stepping `target_fps` times per second.
    ///
    /// Non-positive or non-finite rates fall back to the default rate.
    pub fn new(target_fps: f64) -> Self {
        let fps = if target_fps.is_finite() && target_fps > 0.0 {
            target_fps
        } else {
            log::warn!("Invalid target fps {}, using {}", target_fps, TARGET_FPS);
            TARGET_FPS
        };
        Self {
            state: DriverState::Idle,
            target_interval: 1000.0 / fps,
            last_step_time: 0.0,
            frames: 0,
            steps: 0,
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn target_interval(&self) -> f64 {
        self.target_interval
    }

    pub fn last_step_time(&self) -> f64 {
        self.last_step_time
    }

    /// Refreshes seen
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Simulation steps run
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Handle one display refresh at `time` (ms). Returns whether a
    /// simulation step ran.
    pub fn frame<H: FrameHost>(&mut self, time: f64, sim: &mut SimulationState, host: &mut H) -> bool {
        if self.state == DriverState::Idle {
            log::debug!("Animation driver started at t={:.2}ms", time);
            self.state = DriverState::Ticking;
        }
        self.frames += 1;

        let elapsed = time - self.last_step_time;
        let stepped = elapsed >= self.target_interval;
        if stepped {
            // Keep the remainder so steps stay on the target grid
            self.last_step_time = time - (elapsed % self.target_interval);
            sim.step();
            self.steps += 1;
        }

        host.update_controls();
        host.render(sim);
        stepped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::ObjectId;
    use crate::sim::state::Sphere;
    use crate::sim::WaveParams;
    use glam::Vec3;

    /// Records collaborator calls
    #[derive(Default)]
    struct RecordingHost {
        controls: u32,
        renders: u32,
        rendered_phases: Vec<f64>,
    }

    impl FrameHost for RecordingHost {
        fn update_controls(&mut self) {
            self.controls += 1;
        }

        fn render(&mut self, state: &SimulationState) {
            self.renders += 1;
            self.rendered_phases.push(state.wave.phase());
        }
    }

    fn sim_with_sphere() -> SimulationState {
        let mut sim = SimulationState::new(WaveParams::default());
        sim.spheres.push(Sphere {
            object: ObjectId(0),
            position: Vec3::new(1.0, 2.0, 1.0),
        });
        sim
    }

    /// Step count predicted by the drift-correcting rule
    fn expected_steps(times: &[f64], interval: f64) -> u64 {
        let mut last = 0.0;
        let mut steps = 0;
        for &t in times {
            let elapsed = t - last;
            if elapsed >= interval {
                last = t - elapsed % interval;
                steps += 1;
            }
        }
        steps
    }

    fn run(times: &[f64]) -> (AnimationDriver, SimulationState, RecordingHost) {
        let mut driver = AnimationDriver::new(60.0);
        let mut sim = sim_with_sphere();
        let mut host = RecordingHost::default();
        for &t in times {
            driver.frame(t, &mut sim, &mut host);
        }
        (driver, sim, host)
    }

    #[test]
    fn test_idle_until_first_frame() {
        let mut driver = AnimationDriver::default();
        assert_eq!(driver.state(), DriverState::Idle);
        driver.frame(0.0, &mut sim_with_sphere(), &mut RecordingHost::default());
        assert_eq!(driver.state(), DriverState::Ticking);
    }

    #[test]
    fn test_drift_correction_sequence() {
        let times = [0.0, 16.0, 35.0, 50.0];
        let (driver, sim, host) = run(&times);
        let interval = 1000.0 / 60.0;

        assert_eq!(driver.steps(), expected_steps(&times, interval));
        // Only t = 35 steps: 0 and 16 are short of the interval, and 35
        // credits the step to 33.33, leaving 50 just short again.
        assert_eq!(driver.steps(), 1);
        assert!((driver.last_step_time() - 2.0 * interval).abs() < 1e-9);
        assert_eq!(sim.wave.steps(), 1);
        assert_eq!(host.renders, 4);
        assert_eq!(host.controls, 4);
    }

    #[test]
    fn test_steady_slow_display() {
        // 17ms refreshes: every refresh after the first steps
        let times = [0.0, 17.0, 34.0, 51.0, 68.0];
        let (driver, _, _) = run(&times);
        assert_eq!(driver.steps(), expected_steps(&times, 1000.0 / 60.0));
        assert_eq!(driver.steps(), 4);
    }

    #[test]
    fn test_fast_display_steps_at_target_rate() {
        // 100Hz display over one second: ~60 steps, never more
        let times: Vec<f64> = (0..=100).map(|i| i as f64 * 10.0).collect();
        let (driver, _, host) = run(&times);
        assert_eq!(driver.steps(), expected_steps(&times, 1000.0 / 60.0));
        assert!(driver.steps() >= 59 && driver.steps() <= 60, "steps {}", driver.steps());
        assert_eq!(host.renders, 101);
        assert_eq!(driver.frames(), 101);
    }

    #[test]
    fn test_phase_only_advances_on_steps() {
        let times = [0.0, 5.0, 10.0, 20.0, 25.0, 30.0, 40.0];
        let (driver, sim, host) = run(&times);
        let v = sim.params.velocity() as f64;
        assert!((sim.wave.phase() - driver.steps() as f64 * v).abs() < 1e-9);

        // Rendered phase only changes on refreshes that stepped
        let changes = host
            .rendered_phases
            .windows(2)
            .filter(|w| w[1] != w[0])
            .count() as u64
            + u64::from(host.rendered_phases[0] != 0.0);
        assert_eq!(changes, driver.steps());
    }

    #[test]
    fn test_reads_live_parameters_each_step() {
        let mut driver = AnimationDriver::new(60.0);
        let mut sim = sim_with_sphere();
        let mut host = RecordingHost::default();

        driver.frame(20.0, &mut sim, &mut host);
        let after_first = sim.wave.phase();
        sim.params.set_velocity(0.2);
        driver.frame(40.0, &mut sim, &mut host);
        assert!((sim.wave.phase() - after_first - 0.2f32 as f64).abs() < 1e-12);

        sim.params.set_amplitude(10.0);
        driver.frame(60.0, &mut sim, &mut host);
        let y = sim.spheres.get(0).unwrap().position.y;
        assert!(y <= 10.0 && y >= -3.0);
    }

    #[test]
    fn test_invalid_rate_falls_back() {
        assert_eq!(AnimationDriver::new(0.0).target_interval(), 1000.0 / TARGET_FPS);
        assert_eq!(AnimationDriver::new(f64::NAN).target_interval(), 1000.0 / TARGET_FPS);
        assert_eq!(AnimationDriver::new(120.0).target_interval(), 1000.0 / 120.0);
    }
}
