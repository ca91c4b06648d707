/**
 * AUV Supervisor Console
 *
 * Brings up the supervisor on the STM32 link (or without hardware when the
 * port cannot be opened) and takes operator commands from stdin.
 *
 * Usage: auv_supervisor [config.toml]
 *        auv_supervisor --config <path>
 * Default: /etc/auv-supervisor.toml if present, else built-in values
 */

use auv_supervisor::{AppConfig, Error, Result, Runtime, StartOutcome, StopOutcome};
use std::env;
use std::io::{self, BufRead, Write};
use std::path::Path;

const DEFAULT_CONFIG_PATH: &str = "/etc/auv-supervisor.toml";

fn parse_config_path() -> Option<String> {
    let args: Vec<String> = env::args().collect();

    for i in 1..args.len() {
        if (args[i] == "--config" || args[i] == "-c") && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
    }

    if args.len() > 1 && !args[1].starts_with('-') {
        return Some(args[1].clone());
    }

    None
}

fn load_config() -> Result<AppConfig> {
    match parse_config_path() {
        Some(path) => AppConfig::load(path),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => AppConfig::load(DEFAULT_CONFIG_PATH),
        None => Ok(AppConfig::default()),
    }
}

fn print_status(runtime: &Runtime) {
    let status = runtime.status();
    println!(
        "[STATUS] running: {}, hardware: {}",
        status.running,
        if status.hardware_available { "connected" } else { "unavailable (mock mode)" }
    );
}

fn main() -> Result<()> {
    let config = load_config()?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.logging.level)).init();

    log::info!("AUV supervisor v{} starting", env!("CARGO_PKG_VERSION"));
    let runtime = Runtime::from_config(&config);
    if let Some(port) = runtime.port_name() {
        log::info!("Hardware on {} at {} baud", port, config.hardware.baud_rate);
    }

    println!("\n[Commands]");
    println!("  start  - submerge, run laps, surface");
    println!("  stop   - abort the run and stop thrusters");
    println!("  status - show run state");
    println!("  quit   - stop and exit\n");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let line = match lines.next() {
            Some(line) => line?,
            None => break,
        };

        match line.trim() {
            "start" => match runtime.start() {
                Ok(StartOutcome::Started) => println!("[STARTED]"),
                Ok(StartOutcome::AlreadyRunning) => println!("[ALREADY RUNNING]"),
                Err(Error::HardwareUnavailable) => println!("[REFUSED] hardware not initialized"),
                Err(e) => println!("[ERROR] {}", e),
            },
            "stop" => match runtime.stop() {
                StopOutcome::Stopped => println!("[STOPPED]"),
                StopOutcome::AlreadyStopped => println!("[NOT RUNNING]"),
            },
            "status" => print_status(&runtime),
            "quit" | "exit" | "x" => break,
            "" => {}
            other => println!("Unknown command: {}", other),
        }
    }

    runtime.stop();
    log::info!("Shutdown complete");
    Ok(())
}
