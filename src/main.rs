//! pageproof – command-line print-preview check for a Markdown file.
//!
//! Usage:
//!   pageproof <input.md> [--url <endpoint>] [--seed <params.json>]
//!             [--paper letter|a4|legal] [--margin <length>]
//!             [--density compact|normal|roomy] [--zoom <factor>]
//!             [--css] [--sample]
//!
//! Renders the file through the converter service, paginates the result with
//! the built-in extent estimator, and prints the page breakdown.

use std::{env, fs, path::PathBuf, process};
use std::sync::Arc;

use pageproof::measure::FragmentEstimator;
use pageproof::paginate::Pagination;
use pageproof::params::{Field, ParameterSeed};
use pageproof::render::HttpConverter;
use pageproof::{templates, PreviewSession};

/// Matches the converter service the original preview ships with.
const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:54443/render";

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    let mut input_path: Option<PathBuf> = None;
    let mut endpoint = DEFAULT_ENDPOINT.to_string();
    let mut seed_path: Option<PathBuf> = None;
    let mut paper: Option<String> = None;
    let mut margin: Option<String> = None;
    let mut density: Option<String> = None;
    let mut zoom: Option<String> = None;
    let mut show_css = false;
    let mut use_sample = false;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--url" | "-u" => match iter.next() {
                Some(v) => endpoint = v.clone(),
                None => fail_usage(&args[0], "--url requires a value"),
            },
            "--seed" | "-s" => match iter.next() {
                Some(v) => seed_path = Some(PathBuf::from(v)),
                None => fail_usage(&args[0], "--seed requires a value"),
            },
            "--paper" | "-p" => paper = iter.next().cloned(),
            "--margin" | "-m" => margin = iter.next().cloned(),
            "--density" | "-d" => density = iter.next().cloned(),
            "--zoom" | "-z" => zoom = iter.next().cloned(),
            "--css" => show_css = true,
            "--sample" => use_sample = true,
            "--help" | "-h" => {
                print_usage(&args[0]);
                process::exit(0);
            }
            other if other.starts_with('-') => {
                fail_usage(&args[0], &format!("Unknown flag: {other}"));
            }
            path => {
                if input_path.is_some() {
                    fail_usage(&args[0], &format!("Unexpected argument: {path}"));
                }
                input_path = Some(PathBuf::from(path));
            }
        }
    }

    let text = if use_sample {
        templates::report_sample().to_string()
    } else {
        let input = match input_path {
            Some(p) => p,
            None => {
                eprintln!("Error: no input file specified.");
                print_usage(&args[0]);
                process::exit(1);
            }
        };
        match fs::read_to_string(&input) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Error reading '{}': {e}", input.display());
                process::exit(1);
            }
        }
    };

    // Single-threaded cooperative scheduling: one current-thread runtime.
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error starting runtime: {e}");
            process::exit(1);
        }
    };

    // Raw strings in the seed file go through the same per-field parsing and
    // fallback as interactive input, so a bad field degrades to its default.
    let seed = match seed_path {
        Some(p) => match fs::read_to_string(&p) {
            Ok(json) => match serde_json::from_str::<ParameterSeed>(&json) {
                Ok(seed) => seed,
                Err(e) => {
                    eprintln!("Error parsing seed '{}': {e}", p.display());
                    process::exit(1);
                }
            },
            Err(e) => {
                eprintln!("Error reading seed '{}': {e}", p.display());
                process::exit(1);
            }
        },
        None => ParameterSeed::default(),
    };

    let converter = Arc::new(HttpConverter::new(endpoint));
    let mut session = PreviewSession::new(converter, &seed, FragmentEstimator);

    if let Some(v) = paper {
        session.set_param(Field::PaperSize, &v);
    }
    if let Some(v) = margin {
        session.set_param(Field::Margin, &v);
    }
    if let Some(v) = density {
        session.set_param(Field::Density, &v);
    }
    if let Some(v) = zoom {
        session.set_param(Field::PreviewZoom, &v);
    }

    runtime.block_on(session.pipeline().submit(&text));
    session.run_due();

    let display = session.display();
    if let Some(message) = display.message() {
        eprintln!("{message}");
        if display.error.is_some() {
            process::exit(1);
        }
        process::exit(0);
    }

    match session.pagination() {
        Pagination::Continuous => {
            println!("Page geometry unresolved; content flows unpaginated.");
        }
        Pagination::Paged(slices) => {
            let params = session.params().live();
            println!(
                "{} page{} on {:?} paper, margin {}, zoom {:.2}",
                slices.len(),
                if slices.len() == 1 { "" } else { "s" },
                params.paper_size,
                params.margin,
                params.preview_zoom,
            );
            for slice in slices {
                println!(
                    "  page {:>3}: offset {:>8.1}px, height {:.1}px",
                    slice.label(),
                    slice.offset,
                    slice.height,
                );
            }
        }
    }

    if show_css {
        println!("\n{}", session.print_css());
    }
}

fn fail_usage(program: &str, message: &str) -> ! {
    eprintln!("{message}");
    print_usage(program);
    process::exit(1);
}

fn print_usage(program: &str) {
    eprintln!(
        "Usage: {program} <input.md> [--url <endpoint>] [--seed <params.json>] \
         [--paper letter|a4|legal] [--margin <length>] \
         [--density compact|normal|roomy] [--zoom <factor>] [--css] [--sample]"
    );
}
