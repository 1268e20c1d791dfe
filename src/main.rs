//! raksha-sia - SIA receiver daemon for Galaxy security control panels
//!
//! Wires the components together: serial transport -> SIA codec ->
//! receiver engine -> galaxy facade -> commander, with the poll engine
//! and output fan-out alongside, and a TCP line-protocol server for
//! clients.

use raksha_sia::commander::{Commander, CommanderHandle};
use raksha_sia::config::Config;
use raksha_sia::error::{Error, Result};
use raksha_sia::galaxy::Galaxy;
use raksha_sia::output::{FileSink, OutputFanout, Sink};
use raksha_sia::poll::{PollDelivery, PollEngine};
use raksha_sia::receiver::Receiver;
use raksha_sia::sia::SiaCodec;
use raksha_sia::streaming::{ClientHub, TcpReceiver};
use raksha_sia::transport::SerialTransport;
use std::env;
use std::net::TcpListener;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

/// Parse the config path from the command line.
///
/// Supports:
/// - `raksha-sia <path>` (positional)
/// - `raksha-sia --config <path>` (flag-based)
/// - `raksha-sia -c <path>` (short flag)
///
/// Defaults to `/etc/raksha-sia.toml` if not specified.
fn parse_config_path() -> String {
    let args: Vec<String> = env::args().collect();

    for i in 1..args.len() {
        if (args[i] == "--config" || args[i] == "-c") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }

    if args.len() > 1 && !args[1].starts_with('-') {
        return args[1].clone();
    }

    "/etc/raksha-sia.toml".to_string()
}

fn main() -> Result<()> {
    let config_path = parse_config_path();
    let config = match Config::from_file(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Cannot load {} ({}), using built-in defaults",
                config_path, e
            );
            Config::default()
        }
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.clone()),
    )
    .init();

    log::info!("raksha-sia v{} starting...", env!("CARGO_PKG_VERSION"));
    log::info!(
        "Panel link: {} at {} baud",
        config.panel.port,
        config.panel.baud_rate
    );

    // Serial transport and codec, owned by the receiver thread
    let transport = SerialTransport::open(&config.panel.port, config.panel.baud_rate)?;
    let codec = SiaCodec::new(&config.panel.remote_code, config.panel.alt_control_blocks);

    // Client hub: session registry, reply delivery and event broadcast
    let hub = Arc::new(ClientHub::new());

    // Output sinks from config
    let mut sinks: Vec<Box<dyn Sink>> = Vec::new();
    if let Some(path) = &config.sinks.file {
        sinks.push(Box::new(FileSink::new(path)));
    }
    let broadcast_hub = Arc::clone(&hub);
    let fanout = OutputFanout::spawn(Arc::new(move |text: &str| broadcast_hub.broadcast(text)), sinks)?;

    // Receiver engine owns the panel link
    let mut receiver = Receiver::spawn(Box::new(transport), codec, fanout.sender())?;
    let galaxy = Arc::new(Galaxy::new(receiver.handle(), config.panel.dip8));

    // Commander and poll engine reference each other through their handles;
    // the command queue exists before either worker starts
    let (commander_handle, command_queue) = CommanderHandle::channel();
    let delivery_hub = Arc::clone(&hub);
    let delivery: PollDelivery = Arc::new(move |session, text: &str| {
        delivery_hub.send(session, text);
    });
    let mut poll = PollEngine::spawn(commander_handle.clone(), receiver.handle(), delivery)?;
    let mut commander = Commander::spawn(
        command_queue,
        commander_handle.clone(),
        Arc::clone(&galaxy),
        poll.handle(),
    )?;

    // Shutdown flag, set from the signal handler
    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        r.store(false, Ordering::Relaxed);
    })
    .map_err(|e| Error::Other(format!("Error setting Ctrl-C handler: {}", e)))?;

    // TCP server for client commands and event delivery
    let bind_addr = &config.network.bind_address;
    let listener = TcpListener::bind(bind_addr)?;
    if let Err(e) = listener.set_nonblocking(true) {
        log::warn!("Failed to set nonblocking mode: {}", e);
    }

    log::info!("TCP server listening on {}", bind_addr);
    log::info!("raksha-sia running. Press Ctrl-C to stop.");

    while running.load(Ordering::Relaxed) {
        match listener.accept() {
            Ok((stream, addr)) => {
                let session = match hub.register(&stream) {
                    Ok(session) => session,
                    Err(e) => {
                        log::error!("Cannot register client {}: {}", addr, e);
                        continue;
                    }
                };
                log::info!("TCP client connected: {} (session {})", addr, session);

                let commander = commander_handle.clone();
                let client_hub = Arc::clone(&hub);
                let client_running = Arc::clone(&running);
                let poll_handle = poll.handle();
                let spawned = thread::Builder::new()
                    .name(format!("client-{}", session))
                    .spawn(move || {
                        let receiver = TcpReceiver::new(
                            commander,
                            Arc::clone(&client_hub),
                            client_running,
                        );
                        if let Err(e) = receiver.run(stream, session) {
                            log::error!("TCP receiver error: {}", e);
                        }
                        // The session's poll registration dies with the
                        // connection
                        poll_handle.remove_session(session);
                        client_hub.unregister(session);
                    });
                if let Err(e) = spawned {
                    log::error!("Failed to spawn client thread: {}", e);
                    hub.unregister(session);
                }
            }
            Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                thread::sleep(std::time::Duration::from_millis(100));
            }
            Err(e) => {
                log::error!("Accept error: {}", e);
            }
        }
    }

    log::info!("Shutting down...");
    poll.shutdown();
    commander.shutdown();
    receiver.shutdown();
    drop(fanout);

    log::info!("raksha-sia stopped");
    Ok(())
}
