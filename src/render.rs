// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The RenderLoop owns everything a run needs: the map, the orbit,
//! the histogram, the palette and the surface they are painted onto.
//! The host calls `tick()` for as long as `running()` says so,
//! interleaved with whatever event handling it needs to do; each tick
//! is a bounded amount of work.

use num::Complex;
use tracing::{debug, info, warn};

use crate::canvas::{Framebuffer, HistogramCanvas};
use crate::errors::ConfigurationError;
use crate::map::{MapParameters, SymmetricMap};
use crate::palette::{self, ControlPoint, Palette};

/// Where every orbit begins.
pub const SEED: Complex<f64> = Complex {
    re: 0.001,
    im: 0.002,
};

/// Iterations discarded at the start of a run while the orbit settles
/// onto its attractor.
pub const TRANSIENT_ITERATIONS: usize = 20;

/// Default saturation cap.
pub const DEFAULT_MAX_HIT: u32 = 1200;

/// Default iterations per tick.
pub const DEFAULT_TICK_ITERATIONS: u64 = 10_000_000;

/// Default length of a run.
pub const DEFAULT_TOTAL_ITERATIONS: u64 = 80_000_000;

/// Everything needed to start a run, apart from the surface.
#[derive(Clone, Debug, PartialEq)]
pub struct RunConfig {
    /// The map coefficients.
    pub params: MapParameters,
    /// Side of the square of the complex plane that is plotted.
    pub extent: f64,
    /// Gradient anchors for the palette.
    pub control_points: Vec<ControlPoint>,
    /// Counters saturate here; the palette has one more color than
    /// this.
    pub max_hit: u32,
    /// Iterations per tick.
    pub tick_iterations: u64,
    /// The run stops once this many iterations have been recorded.
    pub total_iterations: u64,
}

impl RunConfig {
    /// A configuration with the default run length and saturation.
    pub fn new(params: MapParameters, extent: f64, control_points: Vec<ControlPoint>) -> Self {
        RunConfig {
            params,
            extent,
            control_points,
            max_hit: DEFAULT_MAX_HIT,
            tick_iterations: DEFAULT_TICK_ITERATIONS,
            total_iterations: DEFAULT_TOTAL_ITERATIONS,
        }
    }

    /// Override the saturation cap.
    pub fn with_max_hit(mut self, max_hit: u32) -> Self {
        self.max_hit = max_hit;
        self
    }

    /// Override the iterations per tick.
    pub fn with_tick_iterations(mut self, tick_iterations: u64) -> Self {
        self.tick_iterations = tick_iterations;
        self
    }

    /// Override the run length.
    pub fn with_total_iterations(mut self, total_iterations: u64) -> Self {
        self.total_iterations = total_iterations;
        self
    }

    /// Checks everything that doesn't depend on the surface.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.params.validate()?;
        palette::validate(&self.control_points)?;
        if !(self.extent.is_finite() && self.extent > 0.0) {
            return Err(ConfigurationError::Extent {
                extent: self.extent,
            });
        }
        if self.max_hit == 0 {
            return Err(ConfigurationError::MaxHit);
        }
        if self.tick_iterations == 0 {
            return Err(ConfigurationError::TickIterations);
        }
        Ok(())
    }
}

/// Where a RenderLoop is in its life.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RunState {
    /// Never started.
    Uninitialized,
    /// Ticks make progress.
    Running,
    /// Finished or interrupted.  Only `start()` leaves this state.
    Stopped,
}

// Everything replaced wholesale by start().
struct Run {
    config: RunConfig,
    map: SymmetricMap,
    canvas: HistogramCanvas,
    palette: Palette,
    z: Complex<f64>,
    iterations: u64,
}

/// Drives one attractor onto one surface.
pub struct RenderLoop<F: Framebuffer> {
    framebuffer: F,
    run: Option<Run>,
    state: RunState,
}

impl<F: Framebuffer> RenderLoop<F> {
    /// An idle loop that will paint onto `framebuffer`.  The raster
    /// size of every run is the size of this surface.
    pub fn new(framebuffer: F) -> Self {
        RenderLoop {
            framebuffer,
            run: None,
            state: RunState::Uninitialized,
        }
    }

    /// Begin a new run, discarding whatever came before.  If the
    /// configuration is refused the previous run is left exactly as
    /// it was.
    pub fn start(&mut self, config: RunConfig) -> Result<(), ConfigurationError> {
        let run = self.prepare(config).map_err(|err| {
            warn!(error = %err, "refusing run configuration");
            err
        })?;

        let params = run.config.params;
        info!(
            lambda = params.lambda,
            alpha = params.alpha,
            beta = params.beta,
            gamma = params.gamma,
            delta = params.delta,
            omega = params.omega,
            n = params.n,
            p = params.p,
            extent = run.config.extent,
            total = run.config.total_iterations,
            "starting run"
        );

        let mut run = run;
        run.canvas.clear(&mut self.framebuffer);
        self.run = Some(run);
        self.state = RunState::Running;
        Ok(())
    }

    fn prepare(&self, config: RunConfig) -> Result<Run, ConfigurationError> {
        config.validate()?;
        let map = SymmetricMap::new(config.params)?;
        let canvas = HistogramCanvas::new(
            self.framebuffer.width(),
            self.framebuffer.height(),
            config.extent,
            config.max_hit,
        )?;
        let palette = Palette::build(&config.control_points, config.max_hit as usize + 1)?;
        let z = map
            .orbit(SEED)
            .nth(TRANSIENT_ITERATIONS - 1)
            .unwrap_or(SEED);
        Ok(Run {
            config,
            map,
            canvas,
            palette,
            z,
            iterations: 0,
        })
    }

    /// Advance the orbit by one batch, record it, and repaint the
    /// surface.  Does nothing unless the loop is running.
    pub fn tick(&mut self) {
        if self.state != RunState::Running {
            return;
        }
        let run = match self.run.as_mut() {
            Some(run) => run,
            None => return,
        };

        let mut z = run.z;
        for _ in 0..run.config.tick_iterations {
            z = run.map.iterate(z);
            run.canvas.increment(z.re, z.im);
        }
        run.z = z;

        run.canvas.colorize(&run.palette, &mut self.framebuffer);
        self.framebuffer.present();

        run.iterations = run.iterations.saturating_add(run.config.tick_iterations);
        debug!(
            iterations = run.iterations,
            total = run.config.total_iterations,
            "tick"
        );
        if run.iterations >= run.config.total_iterations {
            info!(iterations = run.iterations, hits = run.canvas.hits(), "run complete");
            self.state = RunState::Stopped;
        }
    }

    /// True while ticks make progress.
    pub fn running(&self) -> bool {
        self.state == RunState::Running
    }

    /// Stop the run.  The histogram and surface are left as they are.
    pub fn stop(&mut self) {
        debug!(state = ?self.state, "stopping");
        self.state = RunState::Stopped;
    }

    /// Tick until the run is over.
    pub fn run_to_completion(&mut self) {
        while self.running() {
            self.tick();
        }
    }

    /// The current state.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Iterations recorded so far in this run.
    pub fn iterations(&self) -> u64 {
        self.run.as_ref().map_or(0, |run| run.iterations)
    }

    /// The current orbit point.
    pub fn orbit_point(&self) -> Option<Complex<f64>> {
        self.run.as_ref().map(|run| run.z)
    }

    /// The histogram of the current run.
    pub fn canvas(&self) -> Option<&HistogramCanvas> {
        self.run.as_ref().map(|run| &run.canvas)
    }

    /// The palette of the current run.
    pub fn palette(&self) -> Option<&Palette> {
        self.run.as_ref().map(|run| &run.palette)
    }

    /// The surface.
    pub fn framebuffer(&self) -> &F {
        &self.framebuffer
    }

    /// Give the surface back to the host.
    pub fn into_framebuffer(self) -> F {
        self.framebuffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{RgbBuffer, BACKGROUND};
    use crate::palette::Rgb;
    use crate::planes::Pixel;
    use itertools::iproduct;

    fn grayscale() -> Vec<ControlPoint> {
        vec![
            ControlPoint::new(0.0, 0.0, 0.0, 0.0),
            ControlPoint::new(1.0, 255.0, 255.0, 255.0),
        ]
    }

    fn halloween() -> RunConfig {
        RunConfig::new(
            MapParameters {
                lambda: -2.7,
                alpha: 5.0,
                beta: 1.5,
                gamma: 1.0,
                delta: 0.0,
                omega: 0.0,
                n: 6,
                p: 1,
            },
            1.8,
            grayscale(),
        )
        .with_max_hit(50)
        .with_tick_iterations(10_000)
        .with_total_iterations(30_000)
    }

    fn runner() -> RenderLoop<RgbBuffer> {
        RenderLoop::new(RgbBuffer::new(64, 64))
    }

    struct CountingBuffer {
        inner: RgbBuffer,
        presented: usize,
    }

    impl Framebuffer for CountingBuffer {
        fn width(&self) -> usize {
            self.inner.width()
        }
        fn height(&self) -> usize {
            self.inner.height()
        }
        fn write(&mut self, x: usize, y: usize, color: Rgb) {
            self.inner.write(x, y, color)
        }
        fn present(&mut self) {
            self.presented += 1;
        }
    }

    #[test]
    fn starts_uninitialized() {
        let mut rl = runner();
        assert_eq!(rl.state(), RunState::Uninitialized);
        assert!(!rl.running());
        rl.tick();
        assert_eq!(rl.iterations(), 0);
        assert!(rl.canvas().is_none());
    }

    #[test]
    fn start_discards_transients() {
        let mut rl = runner();
        rl.start(halloween()).unwrap();
        assert!(rl.running());
        let map = SymmetricMap::new(halloween().params).unwrap();
        let mut z = SEED;
        for _ in 0..TRANSIENT_ITERATIONS {
            z = map.iterate(z);
        }
        assert_eq!(rl.orbit_point(), Some(z));
        assert_eq!(rl.canvas().unwrap().hits(), 0);
        assert_eq!(rl.palette().unwrap().len(), 51);
    }

    #[test]
    fn ticks_until_total_is_reached() {
        let mut rl = runner();
        rl.start(halloween()).unwrap();
        rl.tick();
        rl.tick();
        assert!(rl.running());
        assert_eq!(rl.iterations(), 20_000);
        rl.tick();
        assert_eq!(rl.state(), RunState::Stopped);
        assert_eq!(rl.iterations(), 30_000);
        rl.tick();
        assert_eq!(rl.iterations(), 30_000);
    }

    #[test]
    fn orbit_continues_across_ticks() {
        let mut split = runner();
        split.start(halloween().with_tick_iterations(500)).unwrap();
        split.tick();
        split.tick();

        let mut whole = runner();
        whole.start(halloween().with_tick_iterations(1000)).unwrap();
        whole.tick();

        assert_eq!(split.orbit_point(), whole.orbit_point());
        assert_eq!(
            split.canvas().unwrap().counts(),
            whole.canvas().unwrap().counts()
        );
    }

    #[test]
    fn each_tick_repaints_and_presents() {
        let mut rl = RenderLoop::new(CountingBuffer {
            inner: RgbBuffer::new(32, 32),
            presented: 0,
        });
        rl.start(halloween()).unwrap();
        rl.run_to_completion();
        assert_eq!(rl.framebuffer().presented, 3);

        let canvas = rl.canvas().unwrap();
        let palette = rl.palette().unwrap();
        for (y, x) in iproduct!(0..32, 0..32) {
            let count = canvas.count(Pixel(x, y));
            assert!(count <= 50);
            assert_eq!(rl.framebuffer().inner.get(x, y), palette.color(count));
        }
    }

    #[test]
    fn restart_is_idempotent() {
        let mut rl = runner();
        rl.start(halloween()).unwrap();
        rl.tick();
        let first = rl.canvas().unwrap().counts().to_vec();
        let first_pixels = rl.framebuffer().clone();

        rl.start(halloween()).unwrap();
        assert_eq!(rl.iterations(), 0);
        assert_eq!(rl.canvas().unwrap().hits(), 0);
        assert_eq!(rl.framebuffer().get(10, 10), BACKGROUND);
        rl.tick();
        assert_eq!(rl.canvas().unwrap().counts(), &first[..]);
        assert_eq!(rl.framebuffer(), &first_pixels);
    }

    #[test]
    fn restart_after_stop() {
        let mut rl = runner();
        rl.start(halloween()).unwrap();
        rl.stop();
        assert_eq!(rl.state(), RunState::Stopped);
        rl.tick();
        assert_eq!(rl.iterations(), 0);
        rl.start(halloween()).unwrap();
        assert!(rl.running());
    }

    #[test]
    fn refused_start_keeps_previous_run() {
        let mut rl = runner();
        rl.start(halloween()).unwrap();
        rl.tick();
        let before = rl.canvas().unwrap().counts().to_vec();

        let mut bad = halloween();
        bad.params.n = 2;
        assert_eq!(
            rl.start(bad),
            Err(ConfigurationError::SymmetryOrder { n: 2 })
        );
        assert!(rl.running());
        assert_eq!(rl.iterations(), 10_000);
        assert_eq!(rl.canvas().unwrap().counts(), &before[..]);
    }

    #[test]
    fn refuses_bad_configurations() {
        let mut rl = runner();
        let mut config = halloween();
        config.control_points.truncate(1);
        assert_eq!(
            rl.start(config),
            Err(ConfigurationError::TooFewControlPoints { count: 1 })
        );
        let mut config = halloween();
        config.control_points.reverse();
        assert_eq!(
            rl.start(config),
            Err(ConfigurationError::UnorderedControlPoints { index: 1 })
        );
        assert!(rl.start(halloween().with_tick_iterations(0)).is_err());
        assert!(rl.start(halloween().with_max_hit(0)).is_err());
        assert_eq!(rl.state(), RunState::Uninitialized);

        let mut empty = RenderLoop::new(RgbBuffer::new(0, 0));
        assert_eq!(
            empty.start(halloween()),
            Err(ConfigurationError::RasterSize {
                width: 0,
                height: 0
            })
        );
    }

    #[test]
    fn bounded_attractor_fills_the_canvas() {
        let mut rl = runner();
        rl.start(halloween()).unwrap();
        rl.run_to_completion();
        let canvas = rl.canvas().unwrap();
        assert!(canvas.hits() > 100);
        assert!(canvas.counts().iter().any(|c| *c == 50));
    }

    #[test]
    fn divergent_orbit_is_dropped_quietly() {
        let extent = 4.0e6;
        let config = RunConfig::new(
            MapParameters {
                lambda: -2.5,
                alpha: 0.0,
                beta: 0.0,
                gamma: 0.0,
                delta: 0.0,
                omega: 0.0,
                n: 3,
                p: 1,
            },
            extent,
            grayscale(),
        )
        .with_tick_iterations(10_000)
        .with_total_iterations(10_000);
        let mut rl = runner();
        rl.start(config).unwrap();
        rl.tick();
        assert!(!rl.running());

        let canvas = rl.canvas().unwrap();
        assert!(canvas.hits() > 0);
        for (y, x) in iproduct!(0..64, 0..64) {
            if canvas.count(Pixel(x, y)) > 0 {
                let point = Complex::new(
                    (0.5 - y as f64 / 64.0) * extent,
                    (x as f64 / 64.0 - 0.5) * extent,
                );
                assert!(point.norm() <= extent);
            }
        }
    }

    #[test]
    fn independent_loops_do_not_interact() {
        let mut a = runner();
        let mut b = runner();
        a.start(halloween()).unwrap();
        b.start(halloween()).unwrap();
        a.tick();
        a.tick();
        b.tick();
        assert_eq!(a.iterations(), 20_000);
        assert_eq!(b.iterations(), 10_000);
        assert_ne!(a.canvas().unwrap().counts(), b.canvas().unwrap().counts());
    }
}
