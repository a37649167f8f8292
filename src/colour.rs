//! Turns escape results into pixel colours.

use escape::EscapeResult;
use error::FractalError;
use gradient::{Colour, Gradient};
use std::fmt;
use std::str::FromStr;

/// Number of entries in the palette used by the banded and smooth
/// modes.
pub const PALETTE_LENGTH: usize = 16;

const WHITE: Colour = [255, 255, 255];

/// The ways an escaped point can be coloured.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ColourMode {
    /// The gradient, sampled at the fraction of the iteration budget
    /// the point used.
    True,
    /// The palette, blended by a fractional escape count.
    Smooth,
    /// The palette, cycled by iteration count.
    Banded,
    /// Plain white.
    None,
}

impl ColourMode {
    /// Every mode, in the order they are listed to users.
    pub const ALL: [ColourMode; 4] = [
        ColourMode::True,
        ColourMode::Banded,
        ColourMode::Smooth,
        ColourMode::None,
    ];

    /// The name used on the command line.
    pub fn name(self) -> &'static str {
        match self {
            ColourMode::True => "true",
            ColourMode::Smooth => "smooth",
            ColourMode::Banded => "banded",
            ColourMode::None => "none",
        }
    }
}

impl fmt::Display for ColourMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ColourMode {
    type Err = FractalError;

    fn from_str(s: &str) -> Result<ColourMode, FractalError> {
        ColourMode::ALL
            .iter()
            .find(|mode| mode.name() == s)
            .cloned()
            .ok_or_else(|| FractalError::UnknownColourMode(s.to_string()))
    }
}

/// Colours escape results under one mode.  The palette is sampled
/// from the gradient once, up front.
#[derive(Clone, Debug)]
pub struct ColourMapper {
    gradient: Gradient,
    palette: Vec<Colour>,
    mode: ColourMode,
    max_iterations: usize,
}

impl ColourMapper {
    /// Constructor.
    pub fn new(gradient: Gradient, mode: ColourMode, max_iterations: usize) -> ColourMapper {
        let palette = (0..PALETTE_LENGTH)
            .map(|i| gradient.at(i as f64 / PALETTE_LENGTH as f64))
            .collect();
        ColourMapper {
            gradient,
            palette,
            mode,
            max_iterations,
        }
    }

    /// The colour for one result.  Whether the point escaped is the
    /// caller's business; this only looks at the numbers.
    pub fn colour(&self, result: &EscapeResult) -> Colour {
        match self.mode {
            ColourMode::True => self
                .gradient
                .at(result.iterations as f64 / self.max_iterations as f64),
            ColourMode::Banded => self.palette[result.iterations % PALETTE_LENGTH],
            ColourMode::Smooth => self.smooth(result),
            ColourMode::None => WHITE,
        }
    }

    fn smooth(&self, result: &EscapeResult) -> Colour {
        let mut escape = fractional_escape(result);
        if !escape.is_finite() {
            escape = result.iterations as f64;
        }
        let whole = escape.abs().trunc();
        let t2 = escape - whole;
        let t1 = 1.0 - t2;

        let index = (whole as usize) % PALETTE_LENGTH;
        let (low, high) = (self.palette[index], self.palette[(index + 1) % PALETTE_LENGTH]);
        let blend = |c: usize| (f64::from(low[c]) * t1 + f64::from(high[c]) * t2) as u8;
        [blend(0), blend(1), blend(2)]
    }
}

/// The renormalised escape count, `n + 1 - log2(ln |z|)`, which varies
/// continuously across iteration bands.
fn fractional_escape(result: &EscapeResult) -> f64 {
    let magnitude = result.z.norm();
    (result.iterations + 1) as f64 - magnitude.ln().ln() / 2.0_f64.ln()
}
