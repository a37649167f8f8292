extern crate clap;
extern crate env_logger;
extern crate escapetime;
#[macro_use]
extern crate log;
extern crate num;
extern crate num_cpus;

use clap::{App, Arg, ArgMatches};
use escapetime::{ColourMode, Fractal, FractalError, Pixel, RenderConfig, DEFAULT_GRADIENT};
use num::Complex;
use std::cmp;
use std::path::Path;
use std::str::FromStr;

fn validate_parse<T: FromStr>(s: &str, err: &str) -> Result<(), String> {
    match T::from_str(s) {
        Ok(_) => Ok(()),
        Err(_) => Err(err.to_string()),
    }
}

fn validate_range<T: FromStr + PartialOrd>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

fn validate_positive(s: &str, what: &str) -> Result<(), String> {
    match f64::from_str(s) {
        Ok(f) if f > 0.0 && f.is_finite() => Ok(()),
        Ok(_) => Err(format!("{} must be a positive number", what)),
        Err(_) => Err(format!("Could not parse {}", what)),
    }
}

const ALGORITHM: &str = "algorithm";
const REAL: &str = "real";
const IMAG: &str = "imag";
const ZOOM: &str = "zoom";
const OUTPUT: &str = "output";
const FILENAME: &str = "filename";
const COLOUR: &str = "colour";
const BAILOUT: &str = "bailout";
const WIDTH: &str = "width";
const HEIGHT: &str = "height";
const ITERATIONS: &str = "iterations";
const GRADIENT: &str = "gradient";
const MODE: &str = "mode";
const POINT_X: &str = "x";
const POINT_Y: &str = "y";
const CONST_REAL: &str = "cr";
const CONST_IMAG: &str = "ci";
const THREADS: &str = "threads";

const IMAGE_MODE: &str = "image";
const COORDS_MODE: &str = "coords";

fn args<'a>() -> ArgMatches<'a> {
    let max_threads = cmp::max(num_cpus::get(), escapetime::DEFAULT_WORKERS);
    let algorithms: Vec<&str> = Fractal::ALL.iter().map(|f| f.name()).collect();
    let colourings: Vec<&str> = ColourMode::ALL.iter().map(|c| c.name()).collect();

    App::new("fractal")
        .version("0.1.0")
        .about("Escape-time fractal renderer")
        .arg(
            Arg::with_name(ALGORITHM)
                .long(ALGORITHM)
                .short("a")
                .takes_value(true)
                .default_value("mandelbrot")
                .possible_values(&algorithms)
                .help("Fractal algorithm"),
        )
        .arg(
            Arg::with_name(REAL)
                .long(REAL)
                .short("r")
                .takes_value(true)
                .allow_hyphen_values(true)
                .validator(|s| validate_parse::<f64>(&s, "Could not parse the real midpoint"))
                .help("Real component of the midpoint [default: centre of the plane]"),
        )
        .arg(
            Arg::with_name(IMAG)
                .long(IMAG)
                .short("i")
                .takes_value(true)
                .allow_hyphen_values(true)
                .validator(|s| validate_parse::<f64>(&s, "Could not parse the imaginary midpoint"))
                .help("Imaginary component of the midpoint [default: centre of the plane]"),
        )
        .arg(
            Arg::with_name(ZOOM)
                .long(ZOOM)
                .short("z")
                .takes_value(true)
                .default_value("1")
                .validator(|s| validate_positive(&s, "zoom"))
                .help("Zoom level"),
        )
        .arg(
            Arg::with_name(OUTPUT)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .default_value(".")
                .help("Output directory"),
        )
        .arg(
            Arg::with_name(FILENAME)
                .long(FILENAME)
                .short("f")
                .takes_value(true)
                .help("Output file name [default: derived from the family, midpoint and zoom]"),
        )
        .arg(
            Arg::with_name(COLOUR)
                .long(COLOUR)
                .short("c")
                .takes_value(true)
                .default_value("none")
                .possible_values(&colourings)
                .help("Colour mode"),
        )
        .arg(
            Arg::with_name(BAILOUT)
                .long(BAILOUT)
                .short("b")
                .takes_value(true)
                .default_value("4")
                .validator(|s| validate_positive(&s, "bailout"))
                .help("Bailout value"),
        )
        .arg(
            Arg::with_name(WIDTH)
                .long(WIDTH)
                .short("W")
                .takes_value(true)
                .default_value("1600")
                .validator(|s| {
                    validate_range(
                        &s,
                        2,
                        65_535,
                        "Could not parse width",
                        "Width must be between 2 and 65535",
                    )
                })
                .help("Width of render"),
        )
        .arg(
            Arg::with_name(HEIGHT)
                .long(HEIGHT)
                .short("H")
                .takes_value(true)
                .default_value("1600")
                .validator(|s| {
                    validate_range(
                        &s,
                        2,
                        65_535,
                        "Could not parse height",
                        "Height must be between 2 and 65535",
                    )
                })
                .help("Height of render"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .long(ITERATIONS)
                .short("m")
                .takes_value(true)
                .default_value("2000")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        usize::max_value(),
                        "Could not parse iteration count",
                        "Iteration count must be positive",
                    )
                })
                .help("Maximum iterations before giving up on finding an escape"),
        )
        .arg(
            Arg::with_name(GRADIENT)
                .long(GRADIENT)
                .short("g")
                .takes_value(true)
                .default_value(DEFAULT_GRADIENT)
                .help("Gradient to use, as JSON [[\"position\", \"rrggbb\"], ...]"),
        )
        .arg(
            Arg::with_name(MODE)
                .long(MODE)
                .takes_value(true)
                .default_value(IMAGE_MODE)
                .possible_values(&[IMAGE_MODE, COORDS_MODE])
                .help("Render an image, or report the coordinates at one pixel"),
        )
        .arg(
            Arg::with_name(POINT_X)
                .short(POINT_X)
                .takes_value(true)
                .default_value("0")
                .validator(|s| validate_parse::<usize>(&s, "Could not parse x"))
                .help("x coordinate of a pixel for coords mode; 0,0 is top left"),
        )
        .arg(
            Arg::with_name(POINT_Y)
                .short(POINT_Y)
                .takes_value(true)
                .default_value("0")
                .validator(|s| validate_parse::<usize>(&s, "Could not parse y"))
                .help("y coordinate of a pixel for coords mode; 0,0 is top left"),
        )
        .arg(
            Arg::with_name(CONST_REAL)
                .long(CONST_REAL)
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("0")
                .validator(|s| validate_parse::<f64>(&s, "Could not parse the constant"))
                .help("Real component of the Julia constant"),
        )
        .arg(
            Arg::with_name(CONST_IMAG)
                .long(CONST_IMAG)
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("0")
                .validator(|s| validate_parse::<f64>(&s, "Could not parse the constant"))
                .help("Imaginary component of the Julia constant"),
        )
        .arg(
            Arg::with_name(THREADS)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .validator(move |s| {
                    validate_range(
                        &s,
                        1,
                        max_threads,
                        "Could not parse thread count",
                        &format!("Thread count must be between 1 and {}", max_threads),
                    )
                })
                .help("Number of threads to use in solver [default: 5]"),
        )
        .get_matches()
}

/// Parses an argument that has already passed its validator.
fn value<T: FromStr>(matches: &ArgMatches, name: &str) -> Result<T, FractalError> {
    let raw = matches.value_of(name).unwrap_or_default();
    T::from_str(raw).map_err(|_| FractalError::InvalidConfig(format!("could not parse {} from {:?}", name, raw)))
}

fn config(matches: &ArgMatches, fractal: Fractal) -> Result<RenderConfig, FractalError> {
    let plane = fractal.plane();
    let centre = match (matches.value_of(REAL), matches.value_of(IMAG)) {
        (None, None) => None,
        _ => Some(Complex::new(
            matches
                .value_of(REAL)
                .map_or(Ok(plane.centre().re), |_| value(matches, REAL))?,
            matches
                .value_of(IMAG)
                .map_or(Ok(plane.centre().im), |_| value(matches, IMAG))?,
        )),
    };
    Ok(RenderConfig {
        max_iterations: value(matches, ITERATIONS)?,
        bailout: value(matches, BAILOUT)?,
        width: value(matches, WIDTH)?,
        height: value(matches, HEIGHT)?,
        centre,
        zoom: value(matches, ZOOM)?,
        colour_mode: value(matches, COLOUR)?,
        gradient: value(matches, GRADIENT)?,
        constant: Complex::new(value(matches, CONST_REAL)?, value(matches, CONST_IMAG)?),
    })
}

/// Shortest round-trip scientific notation with a signed exponent of
/// at least two digits, as in `-7.5E-01`.
fn scientific(value: f64) -> String {
    let formatted = format!("{:E}", value);
    match formatted.find('E') {
        Some(at) => {
            let (mantissa, exponent) = formatted.split_at(at);
            let exponent = &exponent[1..];
            let (sign, digits) = if exponent.starts_with('-') {
                ('-', &exponent[1..])
            } else {
                ('+', exponent)
            };
            format!("{}E{}{:0>2}", mantissa, sign, digits)
        }
        None => formatted,
    }
}

fn default_filename(fractal: Fractal, config: &RenderConfig) -> String {
    let mid = config.midpoint(&fractal.plane());
    format!(
        "{}_{}_{}_{}.jpg",
        fractal,
        scientific(mid.re),
        scientific(mid.im),
        scientific(config.zoom)
    )
}

fn run(matches: &ArgMatches) -> Result<(), FractalError> {
    let fractal: Fractal = value(matches, ALGORITHM)?;
    let config = config(matches, fractal)?;

    if matches.value_of(MODE) == Some(COORDS_MODE) {
        let pixel = Pixel(value(matches, POINT_X)?, value(matches, POINT_Y)?);
        let point = fractal.coordinates_at(&config, pixel)?;
        println!("{:18.17e}, {:18.17e}", point.re, point.im);
        return Ok(());
    }

    let threads = match matches.value_of(THREADS) {
        Some(_) => value(matches, THREADS)?,
        None => escapetime::DEFAULT_WORKERS,
    };
    info!(
        "rendering {} at {}x{}, {} iterations, zoom {}",
        fractal, config.width, config.height, config.max_iterations, config.zoom
    );
    let canvas = escapetime::render(fractal, &config, threads)?;

    let filename = match matches.value_of(FILENAME) {
        Some(name) => name.to_string(),
        None => default_filename(fractal, &config),
    };
    let path = Path::new(matches.value_of(OUTPUT).unwrap_or(".")).join(filename);
    canvas.write_jpeg(&path)?;
    println!("{}", path.display());
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = args();
    if let Err(e) = run(&matches) {
        error!("{}", e);
        eprintln!("Render failure: {}", e);
        std::process::exit(1);
    }
}
