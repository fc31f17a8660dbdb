// UDP control loop with watchdog
// Note: the joystick app sends a frame whenever the stick moves or a button changes.
// The board failsafe also stops the motors if it stops being written to, but
// the watchdog here stops them explicitly and reports the stale state.

use std::future::Future;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::{Duration, Instant};

use tokio::net::UdpSocket;
use tracing::{debug, error, info, warn};

// local imports
use crate::config::{
    AxisConfig, BridgeConfig, IDENTITY_REPLY, RECV_BUFFER_SIZE, VERSION_REPLY,
};
use crate::control::{map, DriveLimits, FaultMonitor, FaultStatus};
use crate::error::{BridgeError, ConfigError, MotorError};
use crate::messages::{DriveCommand, RuntimeHealth};
use crate::motor::{BoardDriver, MotorBoard};
use crate::protocol::{classify, ChannelFrame, Request};
use crate::telemetry::TelemetrySink;

/// Result of handling one datagram
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    /// Send these bytes back to the sender
    Reply(&'static [u8]),
    /// Motors were set to this drive
    Drive(DriveCommand),
    /// Not a valid request, ignored
    Dropped,
}

pub struct Session<B: MotorBoard> {
    driver: BoardDriver<B>,
    axes: AxisConfig,
    limits: DriveLimits,
    faults: FaultMonitor,
    cmd_timeout: Option<Duration>,
    frame_received_at: Instant,
    health: RuntimeHealth,
}

impl<B: MotorBoard> Session<B> {
    pub fn new(config: &BridgeConfig, board: B) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            driver: BoardDriver::new(board),
            axes: config.axes.clone(),
            limits: DriveLimits::from_config(config),
            faults: FaultMonitor::new(),
            cmd_timeout: config.cmd_timeout(),
            frame_received_at: Instant::now(),
            health: RuntimeHealth::CmdStale, // Start stale until first frame
        })
    }

    /// Bring the board up. Shutdown runs when the session is dropped.
    pub fn start(&mut self) -> Result<(), MotorError> {
        self.driver.initialize()
    }

    /// Process one received datagram
    pub fn handle_datagram(&mut self, payload: &[u8], now: Instant) -> Outcome {
        match classify(payload) {
            Ok(Request::Identify) => Outcome::Reply(IDENTITY_REPLY),
            Ok(Request::Version) => Outcome::Reply(VERSION_REPLY),
            Ok(Request::Control(frame)) => match self.on_frame(&frame, now) {
                Some(drive) => Outcome::Drive(drive),
                None => Outcome::Dropped,
            },
            Err(e) => {
                warn!("Dropping datagram: {}", e);
                Outcome::Dropped
            }
        }
    }

    fn on_frame(&mut self, frame: &ChannelFrame, now: Instant) -> Option<DriveCommand> {
        let inputs = match map(frame, &self.axes) {
            Ok(inputs) => inputs,
            Err(e) => {
                error!("Failed to map frame: {}", e);
                return None;
            }
        };
        let drive = self.limits.apply(&inputs);
        debug!("Frame {:?} -> {:?}", frame.as_array(), drive);

        // Write failures surface through the fault bits below
        if let Err(e) = self.driver.set_drive(&drive) {
            warn!("Failed to set motors: {}", e);
        }
        self.frame_received_at = now;

        let (fault1, fault2) = self.driver.read_faults();
        if let Some(status) = self.faults.observe(fault1, fault2) {
            match status {
                FaultStatus::Fault => warn!("Motor fault (1: {}, 2: {})", fault1, fault2),
                FaultStatus::Normal => info!("Motor fault cleared"),
            }
            if let Err(e) = self.driver.show_status(status) {
                warn!("Failed to update status LED: {}", e);
            }
        }

        self.health = match self.faults.status() {
            FaultStatus::Fault => RuntimeHealth::Fault,
            FaultStatus::Normal => RuntimeHealth::Ok,
        };
        Some(drive)
    }

    /// When the watchdog will trip if no frame arrives, `None` if disabled
    /// or already tripped
    pub fn watchdog_deadline(&self) -> Option<Instant> {
        if self.health == RuntimeHealth::CmdStale {
            return None;
        }
        self.cmd_timeout
            .map(|timeout| self.frame_received_at + timeout)
    }

    /// Stop the motors if the last frame is too old. Returns true when the
    /// watchdog trips on this call.
    pub fn check_watchdog(&mut self, now: Instant) -> bool {
        let Some(timeout) = self.cmd_timeout else {
            return false;
        };
        if self.health == RuntimeHealth::CmdStale {
            return false;
        }

        let frame_age = now.saturating_duration_since(self.frame_received_at);
        if frame_age <= timeout {
            return false;
        }

        warn!("Command stale ({:?} old), stopping robot", frame_age);
        if let Err(e) = self.driver.stop() {
            warn!("Failed to stop motors: {}", e);
        }
        self.health = RuntimeHealth::CmdStale;
        true
    }

    pub fn health(&self) -> RuntimeHealth {
        self.health
    }

    pub fn fault_status(&self) -> FaultStatus {
        self.faults.status()
    }

    pub fn board(&self) -> &B {
        self.driver.board()
    }

    pub fn shutdown(&mut self) {
        self.driver.shutdown();
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await,
        None => std::future::pending().await,
    }
}

/// Resolves on Ctrl+C
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        // Without a signal handler the loop only ends with the process
        warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Run the receive loop on a bound socket until `shutdown` resolves.
///
/// Replies go to the sender's address on `tx_port`. The session is shut
/// down on return, and by its drop if this future is cancelled.
pub async fn serve<B, T, F>(
    mut session: Session<B>,
    socket: UdpSocket,
    tx_port: u16,
    telemetry: &T,
    shutdown: F,
) -> Result<(), BridgeError>
where
    B: MotorBoard,
    T: TelemetrySink,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut buf = [0u8; RECV_BUFFER_SIZE];

    if let Err(e) = telemetry.publish_health(session.health()).await {
        warn!("Failed to publish health: {}", e);
    }

    loop {
        let health_before = session.health();

        tokio::select! {
            _ = &mut shutdown => {
                info!("User shutdown");
                break;
            }
            _ = wait_until(session.watchdog_deadline()) => {
                session.check_watchdog(Instant::now());
            }
            received = socket.recv_from(&mut buf) => match received {
                Ok((len, addr)) => match session.handle_datagram(&buf[..len], Instant::now()) {
                    Outcome::Reply(reply) => {
                        let target = SocketAddr::new(addr.ip(), tx_port);
                        debug!("Replying {:?} to {}", String::from_utf8_lossy(reply), target);
                        if let Err(e) = socket.send_to(reply, target).await {
                            warn!("Failed to reply to {}: {}", target, e);
                        }
                    }
                    Outcome::Drive(drive) => {
                        if let Err(e) = telemetry.publish_drive(&drive).await {
                            warn!("Failed to publish drive: {}", e);
                        }
                    }
                    Outcome::Dropped => {}
                },
                Err(e) => warn!("Receive failed: {}", e),
            },
        }

        if session.health() != health_before {
            if let Err(e) = telemetry.publish_health(session.health()).await {
                warn!("Failed to publish health: {}", e);
            }
        }
    }

    session.shutdown();
    Ok(())
}

pub async fn run<B, T>(config: BridgeConfig, board: B, telemetry: T) -> Result<(), BridgeError>
where
    B: MotorBoard,
    T: TelemetrySink,
{
    let mut session = Session::new(&config, board)?;
    session.start()?;

    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, config.rx_port)).await?;

    info!(
        "Bridge started: rx port {}, tx port {}, max power {:.2}",
        config.rx_port,
        config.tx_port,
        DriveLimits::from_config(&config).max_power
    );
    match config.cmd_timeout() {
        Some(timeout) => info!("Watchdog timeout {}ms", timeout.as_millis()),
        None => info!("Watchdog disabled, motors hold the last command"),
    }
    info!("Real time command interface ready ... (press CTRL+C to abort)");

    serve(session, socket, config.tx_port, &telemetry, shutdown_signal()).await
}
