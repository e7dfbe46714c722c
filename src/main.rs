//! gaussvib command-line interface
//!
//! Reads a Gaussian anharmonic frequency log and prints the harmonic-basis
//! vibrational Hamiltonian built from its force constants.
//!
//! # Usage
//!
//! ```bash
//! # Build the Hamiltonian with settings from gaussvib_config.cfg
//! gaussvib freq_anharm.log
//!
//! # Override basis size, truncation and threshold, export JSON
//! gaussvib freq_anharm.log --modals 3 --order 2 --threshold 1e-8 --json terms.json
//!
//! # Create a settings template
//! gaussvib ci gaussvib_config.cfg
//! ```

use gaussvib::hamiltonian::{self, HarmonicHamiltonian, HarmonicTerm};
use gaussvib::settings::{OutputFormat, Settings, SettingsManager, CONFIG_FILE_NAME};
use gaussvib::GaussianLog;
use log::{info, warn};
use std::env;
use std::path::{Path, PathBuf};
use std::process;
use std::str::FromStr;

/// Command-line overrides of the settings file.
#[derive(Debug, Default)]
struct CliOptions {
    log_path: PathBuf,
    num_modals: Option<usize>,
    truncation_order: Option<usize>,
    threshold: Option<f64>,
    json_file: Option<PathBuf>,
    no_normalize: bool,
}

fn print_usage(program_name: &str) {
    eprintln!("gaussvib - vibrational Hamiltonian from Gaussian anharmonic logs");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  {} <log_file> [options]", program_name);
    eprintln!("                    Build the harmonic-basis Hamiltonian from a log");
    eprintln!();
    eprintln!("  {} ci {}", program_name, CONFIG_FILE_NAME);
    eprintln!("                    Create a settings template file");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --modals N        Harmonic basis functions per mode");
    eprintln!("  --order K         Truncation order (1, 2 or 3)");
    eprintln!("  --threshold T     Discard matrix elements at or below T");
    eprintln!("  --json FILE       Write the harmonic terms as JSON to FILE");
    eprintln!("  --no-normalize    Do not divide by the index multinomial");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {} freq_anharm.log", program_name);
    eprintln!("  {} freq_anharm.log --modals 3 --order 2", program_name);
    eprintln!("  {} ci {}", program_name, CONFIG_FILE_NAME);
}

/// argv[0], or the binary name when the platform passes no arguments at all.
fn program_name(args: &[String]) -> &str {
    args.first().map(String::as_str).unwrap_or("gaussvib")
}

fn parse_flag<T: FromStr>(flag: &str, value: Option<&String>) -> Result<T, String> {
    let value = value.ok_or_else(|| format!("Missing value for {}", flag))?;
    value
        .parse()
        .map_err(|_| format!("Invalid value for {}: {}", flag, value))
}

fn parse_args(args: &[String]) -> Result<CliOptions, String> {
    let mut options = CliOptions {
        log_path: PathBuf::from(&args[1]),
        ..CliOptions::default()
    };

    let mut iter = args[2..].iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--modals" => options.num_modals = Some(parse_flag(arg, iter.next())?),
            "--order" => options.truncation_order = Some(parse_flag(arg, iter.next())?),
            "--threshold" => options.threshold = Some(parse_flag(arg, iter.next())?),
            "--json" => options.json_file = Some(parse_flag(arg, iter.next())?),
            "--no-normalize" => options.no_normalize = true,
            other => return Err(format!("Unknown option: {}", other)),
        }
    }

    Ok(options)
}

/// Initializes env_logger at the configured level. Records go to
/// gaussvib_debug_<log_stem>.log when file logging is enabled, otherwise to
/// stdout, or stderr when stdout carries JSON.
fn init_logging(settings: &Settings, log_path: Option<&Path>) -> Result<Option<String>, String> {
    let level = log::LevelFilter::from_str(&settings.logging.level).unwrap_or_else(|_| {
        eprintln!(
            "Unknown log level '{}', using info",
            settings.logging.level
        );
        log::LevelFilter::Info
    });

    let mut builder = env_logger::Builder::from_default_env();
    builder.filter_level(level).format_timestamp_millis();

    let mut debug_log_file = None;
    match log_path {
        Some(log_path) if settings.logging.file_logging => {
            let stem = log_path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("job");
            let file_name = format!("gaussvib_debug_{}.log", stem);
            let file = std::fs::File::create(&file_name)
                .map_err(|e| format!("Failed to create log file {}: {}", file_name, e))?;
            builder.target(env_logger::Target::Pipe(Box::new(file)));
            debug_log_file = Some(file_name);
        }
        _ if settings.output.format == OutputFormat::Json => {
            builder.target(env_logger::Target::Stderr);
        }
        _ => {
            builder.target(env_logger::Target::Stdout);
        }
    }

    builder.init();
    Ok(debug_log_file)
}

fn print_harmonics(harmonics: &[Vec<HarmonicTerm>]) {
    for terms in harmonics {
        let order = terms.first().map(|t| t.modes.len()).unwrap_or(0);
        println!();
        println!("Order {} terms: {}", order, terms.len());
        println!("{}", "-".repeat(60));
        for term in terms {
            let coords: Vec<String> = term
                .modes
                .iter()
                .map(|[mode, row, col]| format!("[{:>3} {:>3} {:>3}]", mode, row, col))
                .collect();
            println!("  {}  {:>18.10e}", coords.join(" "), term.coefficient);
        }
    }
}

fn run(options: &CliOptions, settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    let log = GaussianLog::from_path(&options.log_path)?;

    let numbering = log.a_to_h_numbering();
    let quadratic = log.quadratic_force_constants();
    let cubic = log.cubic_force_constants();
    let quartic = log.quartic_force_constants();

    let num_modals = options.num_modals.unwrap_or(settings.hamiltonian.num_modals);
    let truncation_order = options
        .truncation_order
        .unwrap_or(settings.hamiltonian.truncation_order);
    let threshold = options.threshold.unwrap_or(settings.hamiltonian.threshold);
    let normalize = settings.hamiltonian.normalize && !options.no_normalize;

    let text_output = settings.output.format == OutputFormat::Text;
    if text_output {
        println!("Log file:                {}", options.log_path.display());
        println!("Modes in numbering:      {}", numbering.len());
        println!("Quadratic constants:     {}", quadratic.len());
        println!("Cubic constants:         {}", cubic.len());
        println!("Quartic constants:       {}", quartic.len());
        println!("Modals per mode:         {}", num_modals);
        println!("Truncation order:        {}", truncation_order);
        println!("Threshold:               {:e}", threshold);
        println!("Normalized:              {}", normalize);
    }

    if numbering.is_empty() {
        warn!("No A to H mode numbering found in {}", options.log_path.display());
    }

    let entries = log.compute_modes(normalize);
    let harmonics = HarmonicHamiltonian::new(num_modals, truncation_order, threshold)
        .build(numbering.len(), &entries)?;

    if text_output {
        print_harmonics(&harmonics);
    } else {
        println!("{}", hamiltonian::to_json_string(&harmonics)?);
    }

    let json_file = options
        .json_file
        .clone()
        .or_else(|| settings.output.json_file.as_ref().map(PathBuf::from));
    if let Some(json_file) = json_file {
        hamiltonian::write_json(&harmonics, &json_file)?;
    }

    info!(
        "Finished: {} terms in total",
        harmonics.iter().map(|terms| terms.len()).sum::<usize>()
    );
    Ok(())
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let program = program_name(&args);
    if args.len() < 2 {
        print_usage(program);
        process::exit(1);
    }

    if args[1] == "--help" || args[1] == "-h" {
        print_usage(program);
        process::exit(0);
    }

    let settings_manager = SettingsManager::load().unwrap_or_else(|e| {
        eprintln!("Warning: failed to load settings ({}), using defaults", e);
        SettingsManager::from_settings(Settings::default())
    });

    if args[1] == "ci" {
        if args.len() < 3 || args[2] != CONFIG_FILE_NAME {
            eprintln!("Error: Missing or unknown file argument");
            eprintln!("Usage:");
            eprintln!("  {} ci {}  - Create settings template", program, CONFIG_FILE_NAME);
            process::exit(1);
        }
        if let Err(e) = init_logging(settings_manager.settings(), None) {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
        match SettingsManager::create_template(Path::new(CONFIG_FILE_NAME)) {
            Ok(()) => println!("Settings template created: {}", CONFIG_FILE_NAME),
            Err(e) => {
                eprintln!("Error creating settings template: {}", e);
                process::exit(1);
            }
        }
        return;
    }

    if args[1].starts_with('-') {
        eprintln!("Error: Unknown command: {}", args[1]);
        print_usage(program);
        process::exit(1);
    }

    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {}", e);
            print_usage(program);
            process::exit(1);
        }
    };

    match init_logging(settings_manager.settings(), Some(&options.log_path)) {
        Ok(Some(file_name)) => eprintln!("Debug log file: {}", file_name),
        Ok(None) => {}
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
    info!("Configuration loaded from: {}", settings_manager.config_source());

    if let Err(e) = run(&options, settings_manager.settings()) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
