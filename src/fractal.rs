//! The closed set of fractal families.  A family bundles the plane it
//! is viewed within with its escape function; choosing one happens
//! once per render, after which the engine runs a concrete escape
//! function with no per-pixel dispatch.

use config::RenderConfig;
use engine::{PlotSink, PointEngine};
use error::FractalError;
use escape::{
    Boujee, BurningShip, Julia, LogTan, Mandelbrot, MutantMandelbrot, SharkFin, Z1ZcZi,
};
use num::Complex;
use planes::{Pixel, Plane, PlaneMapper};
use std::fmt;
use std::str::FromStr;

const MANDELBROT_PLANE: Plane = Plane::from_bounds(-2.25, 0.75, -1.5, 1.5);
const JULIA_PLANE: Plane = Plane::from_bounds(-2.0, 2.0, -2.0, 2.0);
const SHIP_PLANE: Plane = Plane::from_bounds(-2.0, 1.5, -2.0, 1.5);

/// Every supported family.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Fractal {
    /// The classic Mandelbrot set.
    Mandelbrot,
    /// A filled Julia set; the constant comes from the configuration.
    Julia,
    /// The burning ship.
    BurningShip,
    /// The Mandelbrot with a drifting constant.
    MutantMandelbrot,
    /// `(z + 1)(z + c)(z + i)`.
    Z1ZcZi,
    /// The shark fin.
    SharkFin,
    /// `z ln(c) tan(z) + c`.
    LogTan,
    /// `2(asin z⁶ + cot z⁶)`.
    Boujee,
}

impl Fractal {
    /// Every family, in the order they are listed to users.
    pub const ALL: [Fractal; 8] = [
        Fractal::Mandelbrot,
        Fractal::Julia,
        Fractal::BurningShip,
        Fractal::MutantMandelbrot,
        Fractal::Z1ZcZi,
        Fractal::SharkFin,
        Fractal::LogTan,
        Fractal::Boujee,
    ];

    /// The name used on the command line and in output file names.
    pub fn name(self) -> &'static str {
        match self {
            Fractal::Mandelbrot => "mandelbrot",
            Fractal::Julia => "julia",
            Fractal::BurningShip => "ship",
            Fractal::MutantMandelbrot => "mutant_mandelbrot",
            Fractal::Z1ZcZi => "z1zczi",
            Fractal::SharkFin => "sharkfin",
            Fractal::LogTan => "logtan",
            Fractal::Boujee => "boujee",
        }
    }

    /// The region this family is conventionally viewed within.
    pub fn plane(self) -> Plane {
        match self {
            Fractal::Julia | Fractal::Boujee => JULIA_PLANE,
            Fractal::BurningShip => SHIP_PLANE,
            Fractal::Mandelbrot
            | Fractal::MutantMandelbrot
            | Fractal::Z1ZcZi
            | Fractal::SharkFin
            | Fractal::LogTan => MANDELBROT_PLANE,
        }
    }

    /// The mapping for a render of this family.
    pub fn mapper(self, config: &RenderConfig) -> Result<PlaneMapper, FractalError> {
        PlaneMapper::new(&self.plane(), config)
    }

    /// Reports the point on the complex plane a single pixel samples,
    /// without iterating anything.  The answer is bit-for-bit the one
    /// the renderer uses for that pixel.
    pub fn coordinates_at(
        self,
        config: &RenderConfig,
        pixel: Pixel,
    ) -> Result<Complex<f64>, FractalError> {
        config.validate()?;
        Ok(self.mapper(config)?.pixel_to_point(pixel))
    }

    /// Builds this family's escape function from `config` and runs
    /// every pixel of `engine` through it into `sink`.
    pub fn plot<S>(
        self,
        engine: &PointEngine,
        config: &RenderConfig,
        sink: &mut S,
    ) -> Result<usize, FractalError>
    where
        S: PlotSink + Send,
    {
        match self {
            Fractal::Mandelbrot => engine.run(&Mandelbrot::new(config), sink),
            Fractal::Julia => engine.run(&Julia::new(config), sink),
            Fractal::BurningShip => engine.run(&BurningShip::new(config), sink),
            Fractal::MutantMandelbrot => engine.run(&MutantMandelbrot::new(config), sink),
            Fractal::Z1ZcZi => engine.run(&Z1ZcZi::new(config), sink),
            Fractal::SharkFin => engine.run(&SharkFin::new(config), sink),
            Fractal::LogTan => engine.run(&LogTan::new(config), sink),
            Fractal::Boujee => engine.run(&Boujee::new(config), sink),
        }
    }
}

impl fmt::Display for Fractal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Fractal {
    type Err = FractalError;

    fn from_str(s: &str) -> Result<Fractal, FractalError> {
        Fractal::ALL
            .iter()
            .find(|fractal| fractal.name() == s)
            .cloned()
            .ok_or_else(|| FractalError::UnknownFractal(s.to_string()))
    }
}
