use clap::{Arg, ArgAction, Command};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use indicatif_log_bridge::LogWrapper;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use libddc2_level1::config::Config;
use libddc2_level1::process::process;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

fn cli() -> Command {
    Command::new("ddc2_level1_cli")
        .about("Level-1 processing of DDC2 level0 waveform dumps")
        .arg_required_else_help(true)
        .subcommand(Command::new("new").about("Write a template configuration to --path"))
        .arg(
            Arg::new("path")
                .short('p')
                .long("path")
                .required(true)
                .value_parser(clap::value_parser!(PathBuf))
                .help("Configuration yaml file"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Debug logging; every dropped record is reported"),
        )
}

/// Install the terminal logger behind the progress bar manager
fn init_logging(verbose: bool) -> Result<MultiProgress, log::SetLoggerError> {
    let level = if verbose {
        simplelog::LevelFilter::Debug
    } else {
        simplelog::LevelFilter::Info
    };
    let logger = simplelog::TermLogger::new(
        level,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    let bars = MultiProgress::new();
    LogWrapper::new(bars.clone(), logger).try_init()?;
    Ok(bars)
}

fn write_template(path: &Path) -> Result<(), String> {
    let yaml = serde_yaml::to_string(&Config::default()).map_err(|e| e.to_string())?;
    std::fs::write(path, yaml)
        .map_err(|e| format!("Could not write template config {}: {e}", path.display()))
}

fn log_config(config: &Config) {
    log::info!("Input directory: {}", config.input_path.display());
    log::info!("Output file: {}", config.output_path.display());
    log::info!("Polarity: {:?}", config.polarity);
    log::info!("Drop unintegrable waveforms: {}", config.drop_unintegrable);
    match config.schema {
        Some(_) => log::info!("Record layout: custom schema"),
        None => log::info!("Record layout: DDC2 default"),
    }
}

/// Run the Level-1 pass on a worker thread, mirroring its progress on a bar
fn run(config: Config, bars: &MultiProgress) {
    let bar = bars.add(ProgressBar::new(100));
    if let Ok(style) = ProgressStyle::with_template("{bar:40} {pos:>3}% [{elapsed_precise}]") {
        bar.set_style(style);
    }

    let status = Arc::new(Mutex::new(0.0_f32));
    let worker = {
        let status = Arc::clone(&status);
        std::thread::spawn(move || process(config, status))
    };

    while !worker.is_finished() {
        std::thread::sleep(POLL_INTERVAL);
        if let Ok(fraction) = status.lock() {
            bar.set_position((*fraction * 100.0) as u64);
        }
    }

    match worker.join() {
        Ok(Ok(())) => {
            bar.finish();
            log::info!("Level-1 file written.");
        }
        Ok(Err(e)) => {
            bar.abandon();
            log::error!("Level-1 processing failed: {e}");
        }
        Err(_) => {
            bar.abandon();
            log::error!("Level-1 worker thread panicked");
        }
    }
}

fn main() {
    let matches = cli().get_matches();
    let verbose = matches.get_flag("verbose");
    let Some(config_path) = matches.get_one::<PathBuf>("path") else {
        return;
    };

    let bars = match init_logging(verbose) {
        Ok(bars) => bars,
        Err(e) => {
            eprintln!("Could not initialize logging: {e}");
            return;
        }
    };

    if let Some(("new", _)) = matches.subcommand() {
        match write_template(config_path) {
            Ok(()) => log::info!("Template config written to {}", config_path.display()),
            Err(e) => log::error!("{e}"),
        }
        return;
    }

    let mut config = match Config::read_config_file(config_path) {
        Ok(c) => c,
        Err(e) => {
            log::error!("{e}");
            return;
        }
    };
    config.trace_dropped |= verbose;
    log::info!("Loaded config {}", config_path.display());
    log_config(&config);

    run(config, &bars);
}
