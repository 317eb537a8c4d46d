extern crate clap;
extern crate crossbeam;
extern crate image;
extern crate num_cpus;

use clap::{App, Arg, ArgMatches};
use crossbeam::thread::ScopedJoinHandle;
use failure::{format_err, Error};
use image::ColorType;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use symmetry::{Dataset, DatasetCatalog, Framebuffer, RenderLoop, Rgb, RgbBuffer};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

fn parse_pair<T>(s: &str, separator: char) -> Option<(T, T)>
where
    T: FromStr,
{
    match s.find(separator) {
        None => None,
        Some(index) => match (T::from_str(&s[..index]), T::from_str(&s[index + 1..])) {
            (Ok(l), Ok(r)) => Some((l, r)),
            _ => None,
        },
    }
}

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    match parse_pair::<T>(s, separator) {
        Some(_) => Ok(()),
        None => Err(err.to_string()),
    }
}

fn validate_range<T: FromStr + Ord>(
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

const DATASET: &str = "dataset";
const DATASETS: &str = "datasets";
const OUTPUT: &str = "output";
const SIZE: &str = "size";
const MAX_HIT: &str = "max-hit";
const TICK_ITERATIONS: &str = "tick-iterations";
const TOTAL_ITERATIONS: &str = "total-iterations";
const LIST: &str = "list";
const ALL: &str = "all";
const THREADS: &str = "threads";

fn args<'a>() -> ArgMatches<'a> {
    let max_threads = num_cpus::get();

    App::new("symmetry")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Symmetry icon renderer")
        .arg(
            Arg::with_name(DATASET)
                .required_unless_one(&[LIST, ALL])
                .long(DATASET)
                .short("d")
                .takes_value(true)
                .help("Name of the dataset to render"),
        )
        .arg(
            Arg::with_name(DATASETS)
                .required(false)
                .long(DATASETS)
                .short("f")
                .takes_value(true)
                .default_value("datasets.json")
                .help("Dataset catalog"),
        )
        .arg(
            Arg::with_name(OUTPUT)
                .required(false)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .conflicts_with(ALL)
                .help("Output file; the format follows the extension [default: <dataset>.png]"),
        )
        .arg(
            Arg::with_name(SIZE)
                .required(false)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("1000x1000")
                .validator(|s| validate_pair::<u16>(&s, 'x', "Could not parse output image size"))
                .help("Size of output image"),
        )
        .arg(
            Arg::with_name(MAX_HIT)
                .required(false)
                .long(MAX_HIT)
                .short("m")
                .takes_value(true)
                .default_value("1200")
                .validator(|s| {
                    validate_range(
                        &s,
                        1u32,
                        1_000_000,
                        "Could not parse max hit",
                        "Max hit must be between 1 and 1000000",
                    )
                })
                .help("Hit count at which a pixel reaches the end of the palette"),
        )
        .arg(
            Arg::with_name(TICK_ITERATIONS)
                .required(false)
                .long(TICK_ITERATIONS)
                .short("k")
                .takes_value(true)
                .default_value("10000000")
                .validator(|s| {
                    validate_range(
                        &s,
                        1u64,
                        1_000_000_000,
                        "Could not parse tick iteration count",
                        "Tick iteration count must be between 1 and 1000000000",
                    )
                })
                .help("Iterations between repaints"),
        )
        .arg(
            Arg::with_name(TOTAL_ITERATIONS)
                .required(false)
                .long(TOTAL_ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("80000000")
                .validator(|s| {
                    validate_range(
                        &s,
                        1u64,
                        100_000_000_000,
                        "Could not parse total iteration count",
                        "Total iteration count must be between 1 and 100000000000",
                    )
                })
                .help("Iterations in the whole run"),
        )
        .arg(
            Arg::with_name(LIST)
                .long(LIST)
                .short("l")
                .help("List the datasets in the catalog and exit"),
        )
        .arg(
            Arg::with_name(ALL)
                .long(ALL)
                .short("a")
                .takes_value(true)
                .conflicts_with(DATASET)
                .help("Render every dataset in the catalog into this directory"),
        )
        .arg(
            Arg::with_name(THREADS)
                .required(false)
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
                .help("Number of datasets rendered at once with --all [default: all CPUs]"),
        )
        .get_matches()
}

/// What every run shares, whatever the dataset.
#[derive(Copy, Clone, Debug)]
struct Settings {
    width: usize,
    height: usize,
    max_hit: u32,
    tick_iterations: u64,
    total_iterations: u64,
}

impl Settings {
    fn from_matches(matches: &ArgMatches) -> Result<Settings, Error> {
        let (width, height) = value_of(matches, SIZE)
            .and_then(|s| parse_pair::<usize>(s, 'x').ok_or_else(|| format_err!("bad size {}", s)))?;
        Ok(Settings {
            width,
            height,
            max_hit: parse_value(matches, MAX_HIT)?,
            tick_iterations: parse_value(matches, TICK_ITERATIONS)?,
            total_iterations: parse_value(matches, TOTAL_ITERATIONS)?,
        })
    }
}

fn value_of<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a str, Error> {
    matches
        .value_of(name)
        .ok_or_else(|| format_err!("missing --{}", name))
}

fn parse_value<T>(matches: &ArgMatches, name: &str) -> Result<T, Error>
where
    T: FromStr,
{
    let s = value_of(matches, name)?;
    T::from_str(s).map_err(|_| format_err!("could not parse --{} {}", name, s))
}

/// The host's side of the surface: an RGB raster that reports each
/// completed frame.
struct Canvas<'a> {
    name: &'a str,
    pixels: RgbBuffer,
    frames: usize,
}

impl<'a> Framebuffer for Canvas<'a> {
    fn width(&self) -> usize {
        self.pixels.width()
    }

    fn height(&self) -> usize {
        self.pixels.height()
    }

    fn write(&mut self, x: usize, y: usize, color: Rgb) {
        self.pixels.write(x, y, color);
    }

    fn fill(&mut self, color: Rgb) {
        self.pixels.fill(color);
    }

    fn present(&mut self) {
        self.frames += 1;
        debug!(dataset = self.name, frame = self.frames, "frame ready");
    }
}

fn render(name: &str, dataset: &Dataset, settings: &Settings) -> Result<RgbBuffer, Error> {
    let config = dataset
        .run_config()
        .with_max_hit(settings.max_hit)
        .with_tick_iterations(settings.tick_iterations)
        .with_total_iterations(settings.total_iterations);
    let canvas = Canvas {
        name,
        pixels: RgbBuffer::new(settings.width, settings.height),
        frames: 0,
    };
    let mut runner = RenderLoop::new(canvas);
    runner.start(config)?;
    while runner.running() {
        runner.tick();
    }
    Ok(runner.into_framebuffer().pixels)
}

fn write_image(outfile: &Path, pixels: &RgbBuffer) -> Result<(), std::io::Error> {
    image::save_buffer(
        outfile,
        pixels.as_bytes(),
        pixels.width() as u32,
        pixels.height() as u32,
        ColorType::RGB(8),
    )
}

fn render_to_file(
    name: &str,
    dataset: &Dataset,
    settings: &Settings,
    outfile: &Path,
) -> Result<(), Error> {
    let pixels = render(name, dataset, settings)?;
    write_image(outfile, &pixels)?;
    info!(dataset = name, path = %outfile.display(), "wrote image");
    Ok(())
}

/// Renders every dataset in the catalog, one run per dataset, spread
/// over a pool of worker threads.  A failed dataset doesn't stop the
/// others.
fn render_all(
    catalog: &DatasetCatalog,
    settings: &Settings,
    outdir: &Path,
    threads: usize,
) -> Result<(), Error> {
    fs::create_dir_all(outdir)?;
    let jobs = Arc::new(Mutex::new(catalog.iter()));

    let mut failures: Vec<(String, Error)> = vec![];
    crossbeam::scope(|spawner| {
        let handles: Vec<ScopedJoinHandle<Vec<(String, Error)>>> = (0..threads)
            .map(|_| {
                let jobs = jobs.clone();
                spawner.spawn(move |_| {
                    let mut failures = vec![];
                    loop {
                        let job = match jobs.lock() {
                            Ok(mut jobs) => jobs.next(),
                            Err(_) => None,
                        };
                        match job {
                            Some((name, dataset)) => {
                                let outfile = outdir.join(format!("{}.png", name));
                                if let Err(e) = render_to_file(name, dataset, settings, &outfile) {
                                    failures.push((name.to_string(), e));
                                }
                            }
                            None => {
                                break;
                            }
                        }
                    }
                    failures
                })
            })
            .collect();

        for handle in handles {
            match handle.join() {
                Ok(f) => failures.extend(f),
                Err(_) => failures.push(("?".to_string(), format_err!("render thread panicked"))),
            }
        }
    })
    .map_err(|_| format_err!("render thread panicked"))?;

    for (name, e) in &failures {
        error!(dataset = name.as_str(), error = %e, "render failed");
    }
    if failures.is_empty() {
        Ok(())
    } else {
        Err(format_err!(
            "{} of {} datasets failed",
            failures.len(),
            catalog.len()
        ))
    }
}

fn run(matches: &ArgMatches) -> Result<(), Error> {
    let catalog = DatasetCatalog::load(value_of(matches, DATASETS)?)?;

    if matches.is_present(LIST) {
        for name in catalog.names() {
            println!("{}", name);
        }
        return Ok(());
    }

    let settings = Settings::from_matches(matches)?;

    if let Some(outdir) = matches.value_of(ALL) {
        let threads = match matches.value_of(THREADS) {
            Some(_) => parse_value(matches, THREADS)?,
            None => num_cpus::get(),
        };
        return render_all(&catalog, &settings, Path::new(outdir), threads);
    }

    let name = value_of(matches, DATASET)?;
    let dataset = catalog.get(name)?;
    let outfile = match matches.value_of(OUTPUT) {
        Some(path) => PathBuf::from(path),
        None => PathBuf::from(format!("{}.png", name)),
    };
    render_to_file(name, dataset, &settings, &outfile)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();
    let matches = args();
    if let Err(e) = run(&matches) {
        eprintln!("Render failure: {}", e);
        std::process::exit(1);
    }
}
