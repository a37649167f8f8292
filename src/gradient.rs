//! Gradients map a position between 0.0 and 1.0 to a colour by
//! interpolating between control points.  Each channel gets its own
//! monotone cubic interpolant, so the curve never overshoots the
//! control points and channels stay within range.

use error::FractalError;
use num::clamp;
use serde::Deserialize;

/// The gradient used when none is supplied: deep blue through white
/// and orange, back to deep blue.
pub const DEFAULT_GRADIENT: &str = r#"[["0.0", "000764"],["0.16", "026bcb"],["0.42", "edffff"],["0.6425", "ffaa00"],["0.8675", "000200"],["1.0","000764"]]"#;

/// An RGB triple.
pub type Colour = [u8; 3];

/// A control point as it appears in the JSON specification: a
/// position and a six-digit hex colour, both as strings.
#[derive(Deserialize)]
struct ControlPoint(String, String);

/// A piecewise cubic through a set of points that preserves the
/// monotonicity of the data between each pair of them.
#[derive(Clone, Debug)]
struct MonotonicCubic {
    xs: Vec<f64>,
    ys: Vec<f64>,
    c1s: Vec<f64>,
    c2s: Vec<f64>,
    c3s: Vec<f64>,
}

impl MonotonicCubic {
    /// `xs` must be strictly increasing and at least two long; the
    /// caller checks.
    fn new(xs: &[f64], ys: &[f64]) -> MonotonicCubic {
        let n = xs.len();
        let dxs: Vec<f64> = xs.windows(2).map(|w| w[1] - w[0]).collect();
        let ms: Vec<f64> = (0..n - 1).map(|i| (ys[i + 1] - ys[i]) / dxs[i]).collect();

        // Tangents at each point.  Zero at local extrema, otherwise the
        // weighted harmonic mean of the neighbouring secants.
        let mut c1s = Vec::with_capacity(n);
        c1s.push(ms[0]);
        for i in 0..dxs.len() - 1 {
            let (m, m_next) = (ms[i], ms[i + 1]);
            if m * m_next <= 0.0 {
                c1s.push(0.0);
            } else {
                let (dx, dx_next) = (dxs[i], dxs[i + 1]);
                let common = dx + dx_next;
                c1s.push(3.0 * common / ((common + dx_next) / m + (common + dx) / m_next));
            }
        }
        c1s.push(ms[ms.len() - 1]);

        let mut c2s = Vec::with_capacity(n - 1);
        let mut c3s = Vec::with_capacity(n - 1);
        for i in 0..n - 1 {
            let (c1, m) = (c1s[i], ms[i]);
            let inv_dx = 1.0 / dxs[i];
            let common = c1 + c1s[i + 1] - m - m;
            c2s.push((m - c1 - common) * inv_dx);
            c3s.push(common * inv_dx * inv_dx);
        }

        MonotonicCubic {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            c1s,
            c2s,
            c3s,
        }
    }

    /// Positions outside the control points take the nearest end value.
    fn at(&self, x: f64) -> f64 {
        let last = self.xs.len() - 1;
        if !(x > self.xs[0]) {
            return self.ys[0];
        }
        if x >= self.xs[last] {
            return self.ys[last];
        }
        // The segment whose left end is the last control point <= x.
        let i = match self
            .xs
            .binary_search_by(|stop| stop.partial_cmp(&x).unwrap_or(::std::cmp::Ordering::Less))
        {
            Ok(i) => return self.ys[i],
            Err(i) => i - 1,
        };
        let diff = x - self.xs[i];
        self.ys[i] + self.c1s[i] * diff + self.c2s[i] * diff * diff + self.c3s[i] * diff * diff * diff
    }
}

/// An immutable colour gradient.  Built once per render and handed to
/// whatever does the colouring; nothing about it is global.
#[derive(Clone, Debug)]
pub struct Gradient {
    red: MonotonicCubic,
    green: MonotonicCubic,
    blue: MonotonicCubic,
}

impl Gradient {
    /// Builds a gradient from `(position, colour)` control points.
    /// Positions must lie in [0, 1] and strictly increase; at least two
    /// points are needed.
    pub fn new(stops: &[(f64, Colour)]) -> Result<Gradient, FractalError> {
        if stops.len() < 2 {
            return Err(FractalError::InvalidGradient(format!(
                "need at least two control points, got {}",
                stops.len()
            )));
        }
        for stop in stops {
            if !(stop.0 >= 0.0 && stop.0 <= 1.0) {
                return Err(FractalError::InvalidGradient(format!(
                    "position {} is outside 0..1",
                    stop.0
                )));
            }
        }
        for pair in stops.windows(2) {
            if !(pair[0].0 < pair[1].0) {
                return Err(FractalError::InvalidGradient(format!(
                    "positions must increase, but {} is followed by {}",
                    pair[0].0, pair[1].0
                )));
            }
        }

        let xs: Vec<f64> = stops.iter().map(|s| s.0).collect();
        let column = |c: usize| -> Vec<f64> { stops.iter().map(|s| f64::from((s.1)[c])).collect() };
        Ok(Gradient {
            red: MonotonicCubic::new(&xs, &column(0)),
            green: MonotonicCubic::new(&xs, &column(1)),
            blue: MonotonicCubic::new(&xs, &column(2)),
        })
    }

    /// Parses the JSON form, `[["0.0", "000764"], ["1.0", "ffffff"]]`.
    pub fn from_spec(spec: &str) -> Result<Gradient, FractalError> {
        let points: Vec<ControlPoint> = serde_json::from_str(spec)
            .map_err(|e| FractalError::InvalidGradient(e.to_string()))?;
        let stops = points
            .iter()
            .map(|p| Ok((parse_position(&p.0)?, parse_hex(&p.1)?)))
            .collect::<Result<Vec<_>, FractalError>>()?;
        Gradient::new(&stops)
    }

    /// The colour at `position`, which is normally between 0.0 and 1.0.
    pub fn at(&self, position: f64) -> Colour {
        [
            channel(self.red.at(position)),
            channel(self.green.at(position)),
            channel(self.blue.at(position)),
        ]
    }
}

fn channel(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    clamp(value, 0.0, 255.0) as u8
}

fn parse_position(s: &str) -> Result<f64, FractalError> {
    s.trim()
        .parse::<f64>()
        .map_err(|_| FractalError::InvalidGradient(format!("{:?} is not a position", s)))
}

fn parse_hex(s: &str) -> Result<Colour, FractalError> {
    let s = s.trim().trim_start_matches('#');
    let bad = || FractalError::InvalidGradient(format!("{:?} is not a six digit hex colour", s));
    if s.len() != 6 || !s.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(bad());
    }
    let byte = |i: usize| u8::from_str_radix(&s[i..i + 2], 16).map_err(|_| bad());
    Ok([byte(0)?, byte(2)?, byte(4)?])
}
