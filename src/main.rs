use anyhow::Context;
use clap::{Parser, Subcommand};
use laserkit::{
    controller_config, default_config_path, init_logging, list_ports, Config, ControllerEvent,
    LaserController, LaserId, SimulatedPeer, BUILD_DATE, VERSION,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "laserkit", version, about = "Control a bank of serially driven lasers")]
struct Cli {
    /// Configuration file (.toml or .json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Serial port, overriding the configuration
    #[arg(long)]
    port: Option<String>,

    /// Baud rate, overriding the configuration
    #[arg(long)]
    baud: Option<u32>,

    /// Number of lasers, overriding the configuration
    #[arg(long)]
    lasers: Option<usize>,

    /// Drive a simulated board instead of a serial port
    #[arg(long)]
    simulate: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List serial ports that may host the board
    Ports,
    /// Connect and print the laser states
    Status,
    /// Toggle one laser
    Toggle { id: LaserId },
    /// Turn one laser on
    On { id: LaserId },
    /// Turn one laser off
    Off { id: LaserId },
    /// Turn every laser on
    AllOn,
    /// Turn every laser off
    AllOff,
    /// Flash one laser, then restore its state
    Flash {
        id: LaserId,
        #[arg(long)]
        count: Option<usize>,
        #[arg(long)]
        interval_ms: Option<u64>,
    },
    /// Light each laser in turn
    Pattern {
        #[arg(long)]
        delay_ms: Option<u64>,
        #[arg(long)]
        cycles: Option<usize>,
    },
    /// Turn every laser off immediately
    Stop,
    /// Walk through every laser once
    Demo,
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => match default_config_path() {
            Ok(path) => Config::load_or_default(&path)
                .with_context(|| format!("Failed to load {}", path.display()))?,
            Err(e) => {
                tracing::debug!("{}, using defaults", e);
                Config::default()
            }
        },
    };

    if let Some(port) = &cli.port {
        config.connection.port = port.clone();
    }
    if let Some(baud) = cli.baud {
        config.connection.baud_rate = baud;
    }
    if let Some(lasers) = cli.lasers {
        config.lasers.count = lasers;
    }
    // Commands connect through a session.
    config.lasers.auto_connect = false;

    config.validate()?;
    Ok(config)
}

fn build_controller(cli: &Cli, config: &Config) -> anyhow::Result<LaserController> {
    let controller_config = controller_config(config);
    let mut controller = if cli.simulate {
        let peer = SimulatedPeer::new(config.lasers.count);
        let transport = peer.transport(config.connection.port.clone());
        LaserController::with_transport(controller_config, Box::new(transport))?
    } else {
        LaserController::new(controller_config)?
    };

    controller.add_listener(Arc::new(|event: &ControllerEvent| {
        tracing::debug!("Controller event: {}", event);
    }));
    Ok(controller)
}

fn print_states(controller: &LaserController) {
    for (id, state) in controller.get_all_states().iter() {
        println!("  Laser {}: {}", id, state);
    }
}

fn run(cli: &Cli, config: &Config) -> anyhow::Result<()> {
    if let Command::Ports = cli.command {
        let ports = list_ports()?;
        if ports.is_empty() {
            println!("No candidate serial ports found");
        }
        for port in ports {
            match port.usb_ids {
                Some((vid, pid)) => println!(
                    "{}  {}  [{:04x}:{:04x}]",
                    port.port_name, port.description, vid, pid
                ),
                None => println!("{}  {}", port.port_name, port.description),
            }
        }
        return Ok(());
    }

    let mut controller = build_controller(cli, config)?;
    let mut session = controller
        .session()
        .with_context(|| format!("Could not connect to {}", config.connection.port))?;

    match cli.command {
        Command::Ports => {}
        Command::Status => {
            println!("{}", *session);
            print_states(&session);
        }
        Command::Toggle { id } => {
            let state = session.toggle(id)?;
            println!("Laser {}: {}", id, state);
        }
        Command::On { id } => {
            session.turn_on(id)?;
            println!("Laser {}: {}", id, session.get_state(id)?);
        }
        Command::Off { id } => {
            session.turn_off(id)?;
            println!("Laser {}: {}", id, session.get_state(id)?);
        }
        Command::AllOn => {
            session.all_on()?;
            println!("All lasers ON");
        }
        Command::AllOff => {
            session.all_off()?;
            println!("All lasers OFF");
        }
        Command::Flash {
            id,
            count,
            interval_ms,
        } => {
            let count = count.unwrap_or(config.patterns.flash_count);
            let interval =
                Duration::from_millis(interval_ms.unwrap_or(config.patterns.flash_interval_ms));
            session.flash(id, count, interval)?;
            println!("Flashed laser {} {} times", id, count);
        }
        Command::Pattern { delay_ms, cycles } => {
            let delay =
                Duration::from_millis(delay_ms.unwrap_or(config.patterns.sequence_delay_ms));
            let cycles = cycles.unwrap_or(config.patterns.sequence_cycles);
            session.sequential_pattern(delay, cycles)?;
            println!("Sequential pattern completed ({} cycles)", cycles);
        }
        Command::Stop => {
            session.emergency_stop()?;
            println!("Emergency stop: all lasers off");
        }
        Command::Demo => {
            let step = Duration::from_millis(config.patterns.sequence_delay_ms);
            println!("Controller: {}", *session);
            println!("Initial laser states:");
            print_states(&session);

            for id in 1..=session.laser_count() {
                println!("Turning on laser {}", id);
                session.turn_on(id)?;
                println!("  State: {}", session.get_state(id)?);
                thread::sleep(step);
            }
            thread::sleep(step * 2);

            println!("Turning off all lasers");
            session.all_off()?;
            println!("Final states: {}", session.get_all_states());
        }
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;
    tracing::debug!("laserkit {} built {}", VERSION, BUILD_DATE);

    let config = load_config(&cli)?;
    run(&cli, &config)
}
