//! The escape functions, one per fractal family.
//!
//! Each takes a starting point on the complex plane and iterates a
//! family-specific rule until either the value runs past the family's
//! bailout test (the point escaped) or the iteration budget is spent
//! (the point is assumed to belong to the set).  Everything a family
//! needs from the configuration is captured when it is built, once
//! per render, so the per-point call is a pure function of the point.

use config::RenderConfig;
use num::Complex;
use planes::Pixel;

/// How often the classic family records a value to watch for cycles.
const PERIOD: usize = 20;

/// The outcome of iterating one point.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Escape {
    /// True if the point escaped before the budget ran out.
    pub escaped: bool,
    /// Iterations used, never more than the budget.
    pub iterations: usize,
    /// The last value of the iteration.
    pub z: Complex<f64>,
}

impl Escape {
    /// A point that stopped after `iterations` of a `limit` budget.
    /// It escaped exactly when it stopped short of the budget.
    pub fn new(iterations: usize, limit: usize, z: Complex<f64>) -> Escape {
        Escape {
            escaped: iterations < limit,
            iterations,
            z,
        }
    }

    /// A point known not to escape, whatever the remaining budget.
    pub fn captured(limit: usize, z: Complex<f64>) -> Escape {
        Escape {
            escaped: false,
            iterations: limit,
            z,
        }
    }

    /// Attaches the pixel this point was sampled for.
    pub fn at(self, pixel: Pixel) -> EscapeResult {
        EscapeResult {
            pixel,
            z: self.z,
            iterations: self.iterations,
            escaped: self.escaped,
        }
    }
}

/// One pixel's worth of output, ready for colouring.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EscapeResult {
    /// Where the result lands in the image.
    pub pixel: Pixel,
    /// The last value of the iteration.
    pub z: Complex<f64>,
    /// Iterations used.
    pub iterations: usize,
    /// True if the point escaped.
    pub escaped: bool,
}

/// A fractal family's iteration rule, ready to run against any point.
/// Implementations hold only read-only parameters, so one instance is
/// shared by every worker.
pub trait EscapeFunction: Sync {
    /// Iterates from the point `c`.
    fn escape(&self, c: Complex<f64>) -> Escape;
}

/// The classic Mandelbrot set: `z = z² + c` from `z = 0`.
#[derive(Copy, Clone, Debug)]
pub struct Mandelbrot {
    limit: usize,
    bailout_sqr: f64,
}

impl Mandelbrot {
    /// Constructor.
    pub fn new(config: &RenderConfig) -> Mandelbrot {
        Mandelbrot {
            limit: config.max_iterations,
            bailout_sqr: config.bailout * config.bailout,
        }
    }
}

impl Mandelbrot {
    /// Iterates from `c`, also returning the step at which the loop
    /// stopped.  A cycle stops it short of the budget while still
    /// reporting the budget as spent.
    fn orbit(&self, c: Complex<f64>) -> (Escape, usize) {
        if (c.re + 1.0) * (c.re + 1.0) + c.im * c.im <= 0.0625 {
            return (Escape::captured(self.limit, Complex::new(0.0, 0.0)), 0);
        }

        let (mut rsquare, mut isquare, mut zsquare) = (0.0, 0.0, 0.0);
        let mut z = Complex::new(0.0, 0.0);
        let mut seen = Complex::new(::std::f64::MAX, ::std::f64::MAX);
        let mut iteration = 1;

        while rsquare + isquare <= self.bailout_sqr && iteration < self.limit {
            z = Complex::new(rsquare - isquare + c.re, zsquare - rsquare - isquare + c.im);
            if z == seen {
                return (Escape::captured(self.limit, z), iteration);
            }
            rsquare = z.re * z.re;
            isquare = z.im * z.im;
            zsquare = (z.re + z.im) * (z.re + z.im);

            if iteration % PERIOD == 0 {
                seen = z;
            }
            iteration += 1;
        }

        (Escape::new(iteration, self.limit, z), iteration)
    }
}

impl EscapeFunction for Mandelbrot {
    /// The squares of the components are carried between iterations,
    /// which leaves three multiplications per step.  Points in the
    /// period-2 bulb are answered without iterating at all, and a
    /// value that recurs after a sampling interval proves a cycle,
    /// which never escapes.
    fn escape(&self, c: Complex<f64>) -> Escape {
        self.orbit(c).0
    }
}

/// The filled Julia set of a fixed constant: `z = z² + k`, starting
/// from the sampled point.
#[derive(Copy, Clone, Debug)]
pub struct Julia {
    limit: usize,
    constant: Complex<f64>,
    bailout_sqr: f64,
}

impl Julia {
    /// Constructor.  The bailout is derived from the constant here,
    /// once, and the configured bailout is ignored.
    pub fn new(config: &RenderConfig) -> Julia {
        Julia {
            limit: config.max_iterations,
            constant: config.constant,
            bailout_sqr: julia_bailout(config.constant),
        }
    }

    /// The squared escape radius in use.
    pub fn bailout_sqr(&self) -> f64 {
        self.bailout_sqr
    }
}

/// The squared escape radius for the constant `k`: `R² - R = |k|`,
/// taking the larger root.
pub fn julia_bailout(k: Complex<f64>) -> f64 {
    let (a, b) = quadratic(1.0, -1.0, -k.norm());
    (a * a).max(b * b)
}

/// Both roots of `ax² + bx + c = 0`.
fn quadratic(a: f64, b: f64, c: f64) -> (f64, f64) {
    let d = (b * b - 4.0 * a * c).sqrt();
    ((-b + d) / (2.0 * a), (-b - d) / (2.0 * a))
}

impl EscapeFunction for Julia {
    fn escape(&self, c: Complex<f64>) -> Escape {
        let k = self.constant;
        let mut z = c;
        let mut iteration = 0;
        while z.norm_sqr() < self.bailout_sqr && iteration < self.limit {
            z = Complex::new(z.re * z.re - z.im * z.im + k.re, 2.0 * z.re * z.im + k.im);
            iteration += 1;
        }
        Escape::new(iteration, self.limit, z)
    }
}

/// The burning ship: both components are folded to their absolute
/// values before squaring, `z = (|re z| + i|im z|)² + c`, from `z = c`.
#[derive(Copy, Clone, Debug)]
pub struct BurningShip {
    limit: usize,
    bailout: f64,
}

impl BurningShip {
    /// Constructor.  Unlike the classic family, the bailout is compared
    /// with `|z|²` directly.
    pub fn new(config: &RenderConfig) -> BurningShip {
        BurningShip {
            limit: config.max_iterations,
            bailout: config.bailout,
        }
    }
}

impl EscapeFunction for BurningShip {
    fn escape(&self, c: Complex<f64>) -> Escape {
        let mut z = c;
        let mut iteration = 0;
        while iteration < self.limit && z.norm_sqr() < self.bailout {
            z = Complex::new(
                z.re * z.re - z.im * z.im + c.re,
                2.0 * (z.re * z.im).abs() + c.im,
            );
            iteration += 1;
        }
        Escape::new(iteration, self.limit, z)
    }
}

/// A Mandelbrot whose constant drifts.  Every `n` iterations the
/// constant is nudged towards the current value by `count / p`, after
/// which `n` shrinks and `p` grows, so nudges come more often and
/// weigh less.
#[derive(Copy, Clone, Debug)]
pub struct MutantMandelbrot {
    limit: usize,
}

impl MutantMandelbrot {
    const FIRST_INTERVAL: usize = 50;
    const FIRST_DIVISOR: usize = 100;
    const BAILOUT: f64 = 20.0;

    /// Constructor.  The bailout is fixed and the configured one is
    /// ignored.
    pub fn new(config: &RenderConfig) -> MutantMandelbrot {
        MutantMandelbrot {
            limit: config.max_iterations,
        }
    }
}

impl EscapeFunction for MutantMandelbrot {
    fn escape(&self, c: Complex<f64>) -> Escape {
        let mut z = c;
        let mut k = c;
        let mut n = Self::FIRST_INTERVAL;
        let mut p = Self::FIRST_DIVISOR;
        let mut count = 0;

        while count < self.limit && z.norm_sqr() < Self::BAILOUT {
            if n > 0 && (count + 1) % n == 0 {
                let weight = count as f64 / p as f64;
                k = k + z * weight;
                n -= 1;
                p += 1;
            }
            z = Complex::new(z.re * z.re - z.im * z.im + k.re, 2.0 * z.re * z.im + k.im);
            count += 1;
        }
        Escape::new(count, self.limit, z)
    }
}

/// `z = (z + 1)(z + c)(z + i)`, from `z = 0`.
#[derive(Copy, Clone, Debug)]
pub struct Z1ZcZi {
    limit: usize,
}

impl Z1ZcZi {
    /// Constructor.
    pub fn new(config: &RenderConfig) -> Z1ZcZi {
        Z1ZcZi {
            limit: config.max_iterations,
        }
    }
}

impl EscapeFunction for Z1ZcZi {
    fn escape(&self, c: Complex<f64>) -> Escape {
        let mut z = Complex::new(0.0, 0.0);
        let mut count = 0;
        while count < self.limit && z.norm() < 4.0 {
            z = (z + 1.0) * (z + c) * (z + Complex::i());
            count += 1;
        }
        Escape::new(count, self.limit, z)
    }
}

/// The shark fin: add `c`, then square with the sign of the imaginary
/// part folded into the real term.
#[derive(Copy, Clone, Debug)]
pub struct SharkFin {
    limit: usize,
}

impl SharkFin {
    /// Constructor.
    pub fn new(config: &RenderConfig) -> SharkFin {
        SharkFin {
            limit: config.max_iterations,
        }
    }
}

impl EscapeFunction for SharkFin {
    fn escape(&self, c: Complex<f64>) -> Escape {
        let mut z = c;
        let mut count = 0;
        while count < self.limit && z.norm_sqr() < 4.0 {
            let w = z + c;
            z = Complex::new(w.re * w.re - w.im.abs() * w.im, w.re * w.im * 2.0);
            count += 1;
        }
        Escape::new(count, self.limit, z)
    }
}

/// `z = z ln(c) tan(z) + c`, from `z = c`.  Exploratory: it is
/// unstable near the branch cut of the logarithm and around the poles
/// of the tangent, and tends to want a small iteration budget.
#[derive(Copy, Clone, Debug)]
pub struct LogTan {
    limit: usize,
}

impl LogTan {
    const BAILOUT: f64 = 1000.0;

    /// Constructor.
    pub fn new(config: &RenderConfig) -> LogTan {
        LogTan {
            limit: config.max_iterations,
        }
    }
}

impl EscapeFunction for LogTan {
    fn escape(&self, c: Complex<f64>) -> Escape {
        let log_c = c.ln();
        let mut z = c;
        let mut iteration = 1;
        while z.im * z.re <= Self::BAILOUT && iteration < self.limit {
            z = z * log_c * z.tan() + c;
            iteration += 1;
        }
        Escape::new(iteration, self.limit, z)
    }
}

/// `w = z⁶; z = 2(asin w + cot w)`, from `z = c`.  Exploratory.  The
/// loop only continues while `|z| < -55`, which no magnitude
/// satisfies, so every point escapes without iterating.
#[derive(Copy, Clone, Debug)]
pub struct Boujee {
    limit: usize,
}

impl Boujee {
    const BAILOUT: f64 = -55.0;

    /// Constructor.
    pub fn new(config: &RenderConfig) -> Boujee {
        Boujee {
            limit: config.max_iterations,
        }
    }
}

impl EscapeFunction for Boujee {
    fn escape(&self, c: Complex<f64>) -> Escape {
        let six = Complex::new(6.0, 0.0);
        let mut z = c;
        let mut count = 0;
        while count < self.limit && z.norm() < Self::BAILOUT {
            let w = z.powc(six);
            z = (w.asin() + w.tan().inv()) * 2.0;
            count += 1;
        }
        Escape::new(count, self.limit, z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(max_iterations: usize, bailout: f64) -> RenderConfig {
        RenderConfig {
            max_iterations,
            bailout,
            ..RenderConfig::default()
        }
    }

    #[test]
    fn mandelbrot_midpoint_is_answered_without_iterating() {
        let m = Mandelbrot::new(&config(1000, 4.0));
        let e = m.escape(Complex::new(-0.75, 0.0));
        assert!(!e.escaped);
        assert_eq!(e.iterations, 1000);
        assert_eq!(e.z, Complex::new(0.0, 0.0));
    }

    #[test]
    fn mandelbrot_escapes_at_the_real_edge() {
        let m = Mandelbrot::new(&config(1000, 4.0));
        let e = m.escape(Complex::new(-2.25, 0.0));
        assert!(e.escaped);
        assert_eq!(e.iterations, 4);
        assert_eq!(e.z.re, 5.66015625);
        assert_eq!(e.z.im, 0.0);
    }

    #[test]
    fn mandelbrot_detects_cycles() {
        // The origin is a fixed point of z² + 0 but sits outside the
        // period-2 bulb.  The value recorded at step 20 comes round
        // again at step 21.
        let m = Mandelbrot::new(&config(1_000_000, 2.0));
        let (e, steps) = m.orbit(Complex::new(0.0, 0.0));
        assert_eq!(e, Escape::captured(1_000_000, Complex::new(0.0, 0.0)));
        assert_eq!(steps, 21);

        // -2 lands on the fixed point 2, right on the bailout circle.
        let (e, steps) = m.orbit(Complex::new(-2.0, 0.0));
        assert_eq!(e, Escape::captured(1_000_000, Complex::new(2.0, 0.0)));
        assert_eq!(steps, 21);
    }

    #[test]
    fn mandelbrot_bulb_takes_no_steps() {
        let m = Mandelbrot::new(&config(1000, 4.0));
        let (e, steps) = m.orbit(Complex::new(-1.0, 0.1));
        assert!(!e.escaped);
        assert_eq!(steps, 0);
    }

    #[test]
    fn mandelbrot_with_a_single_iteration_budget() {
        let m = Mandelbrot::new(&config(1, 2.0));
        let e = m.escape(Complex::new(1.0, 1.0));
        assert_eq!(e, Escape::captured(1, Complex::new(0.0, 0.0)));
    }

    #[test]
    fn julia_bailout_solves_the_radius_quadratic() {
        assert_eq!(julia_bailout(Complex::new(0.0, 0.0)), 1.0);
        assert_eq!(julia_bailout(Complex::new(2.0, 0.0)), 4.0);
        assert_eq!(julia_bailout(Complex::new(0.0, -6.0)), 9.0);
    }

    #[test]
    fn julia_ignores_configured_bailout() {
        let mut c = config(100, 1e9);
        c.constant = Complex::new(2.0, 0.0);
        let j = Julia::new(&c);
        assert_eq!(j.bailout_sqr(), 4.0);

        // 3 is past the radius before the first step.
        let e = j.escape(Complex::new(3.0, 0.0));
        assert_eq!(e, Escape::new(0, 100, Complex::new(3.0, 0.0)));

        // 1 + 2 = 3 after one step.
        let e = j.escape(Complex::new(1.0, 0.0));
        assert_eq!(e.iterations, 1);
        assert_eq!(e.z, Complex::new(3.0, 0.0));
    }

    #[test]
    fn julia_origin_with_zero_constant_never_escapes() {
        let j = Julia::new(&config(500, 4.0));
        let e = j.escape(Complex::new(0.0, 0.0));
        assert!(!e.escaped);
        assert_eq!(e.iterations, 500);
    }

    #[test]
    fn burning_ship_folds_before_squaring() {
        let ship = BurningShip::new(&config(1, 1e9));
        // One step from (-1, 1): (1 + i)² + (-1 + i) = -1 + 3i.
        let e = ship.escape(Complex::new(-1.0, 1.0));
        assert_eq!(e.z, Complex::new(-1.0, 3.0));

        let ship = BurningShip::new(&config(100, 4.0));
        let e = ship.escape(Complex::new(0.0, 0.0));
        assert!(!e.escaped);
        let e = ship.escape(Complex::new(1.0, 1.0));
        assert!(e.escaped);
    }

    #[test]
    fn mutant_escapes_far_points_immediately() {
        let m = MutantMandelbrot::new(&config(100, 4.0));
        let e = m.escape(Complex::new(5.0, 0.0));
        assert_eq!(e, Escape::new(0, 100, Complex::new(5.0, 0.0)));
        let e = m.escape(Complex::new(0.0, 0.0));
        assert!(!e.escaped);
    }

    #[test]
    fn mutant_drifts_the_constant() {
        // -2 settles on the fixed point 2.  At count 49 the constant
        // takes its first nudge, -2 + 2 * 49/100 = -1.02, and the orbit
        // then leaves: 2.98, 7.8604.
        let m = MutantMandelbrot::new(&config(1000, 4.0));
        let e = m.escape(Complex::new(-2.0, 0.0));
        assert!(e.escaped);
        assert_eq!(e.iterations, 51);
        assert!((e.z.re - 7.8604).abs() < 1e-12);
        assert_eq!(e.z.im, 0.0);

        // A budget that ends just after the nudge.
        let m = MutantMandelbrot::new(&config(50, 4.0));
        let e = m.escape(Complex::new(-2.0, 0.0));
        assert!(!e.escaped);
        assert!((e.z.re - 2.98).abs() < 1e-12);

        // Without the nudge the orbit would still be sitting on 2.
        let m = MutantMandelbrot::new(&config(49, 4.0));
        let e = m.escape(Complex::new(-2.0, 0.0));
        assert_eq!(e.z, Complex::new(2.0, 0.0));
    }

    #[test]
    fn z1zczi_steps_from_the_origin() {
        // (0 + 1)(0 + c)(0 + i) = ci.
        let f = Z1ZcZi::new(&config(1, 4.0));
        let e = f.escape(Complex::new(0.5, 0.0));
        assert_eq!(e.z, Complex::new(0.0, 0.5));

        // (1 + 0.5i)(0.5 + 0.5i)(1.5i) = -1.125 + 0.375i.
        let f = Z1ZcZi::new(&config(2, 4.0));
        let e = f.escape(Complex::new(0.5, 0.0));
        assert_eq!(e.z, Complex::new(-1.125, 0.375));
        assert!(!e.escaped);

        let f = Z1ZcZi::new(&config(100, 4.0));
        // 3i, then (1 + 3i)(3 + 3i)(4i) = -48 - 24i, which is out.
        let e = f.escape(Complex::new(3.0, 0.0));
        assert_eq!(e, Escape::new(2, 100, Complex::new(-48.0, -24.0)));
    }

    #[test]
    fn sharkfin_folds_the_imaginary_sign() {
        // w = 2c = 0.5 + 0.5i, then (0.25 - 0.25, 0.5).
        let f = SharkFin::new(&config(1, 4.0));
        assert_eq!(f.escape(Complex::new(0.25, 0.25)).z, Complex::new(0.0, 0.5));

        // w = 0.25 + 0.75i, then (0.0625 - 0.5625, 0.375).
        let f = SharkFin::new(&config(2, 4.0));
        assert_eq!(f.escape(Complex::new(0.25, 0.25)).z, Complex::new(-0.5, 0.375));

        // w = 0.5 - 0.5i: the real term adds |im| * im back on.
        let f = SharkFin::new(&config(1, 4.0));
        assert_eq!(f.escape(Complex::new(0.25, -0.25)).z, Complex::new(0.5, -0.5));
    }

    #[test]
    fn logtan_step_and_product_bailout() {
        let f = LogTan::new(&config(2, 4.0));
        let e = f.escape(Complex::new(2.0, 0.0));
        let expected = 2.0 * 2f64.ln() * 2f64.tan() + 2.0;
        assert_eq!(e.iterations, 2);
        assert!(!e.escaped);
        assert!((e.z.re - expected).abs() < 1e-12);
        assert!(e.z.im.abs() < 1e-12);

        // 40 * 40 is past the product bailout although |z| is small
        // beside it.
        let f = LogTan::new(&config(10, 4.0));
        let e = f.escape(Complex::new(40.0, 40.0));
        assert_eq!(e, Escape::new(1, 10, Complex::new(40.0, 40.0)));
    }

    #[test]
    fn boujee_escapes_everything_at_once() {
        let b = Boujee::new(&config(100, 4.0));
        let e = b.escape(Complex::new(0.1, 0.1));
        assert_eq!(e, Escape::new(0, 100, Complex::new(0.1, 0.1)));
    }

    #[test]
    fn every_family_respects_the_budget() {
        let cfg = RenderConfig {
            max_iterations: 64,
            constant: Complex::new(-0.8, 0.156),
            ..RenderConfig::default()
        };
        let families: Vec<Box<dyn EscapeFunction>> = vec![
            Box::new(Mandelbrot::new(&cfg)),
            Box::new(Julia::new(&cfg)),
            Box::new(BurningShip::new(&cfg)),
            Box::new(MutantMandelbrot::new(&cfg)),
            Box::new(Z1ZcZi::new(&cfg)),
            Box::new(SharkFin::new(&cfg)),
            Box::new(LogTan::new(&cfg)),
            Box::new(Boujee::new(&cfg)),
        ];
        for family in &families {
            for i in 0..40 {
                for j in 0..40 {
                    let c = Complex::new(-2.5 + f64::from(i) * 0.1, -2.0 + f64::from(j) * 0.1);
                    let e = family.escape(c);
                    assert!(e.iterations <= cfg.max_iterations);
                    assert_eq!(e.escaped, e.iterations < cfg.max_iterations);
                }
            }
        }
    }
}
