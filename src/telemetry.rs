// Optional zenoh telemetry: drive levels and health status as JSON

use tracing::info;

use crate::config::{TOPIC_HEALTH, TOPIC_RT_DRIVE};
use crate::error::BridgeError;
use crate::messages::{DriveCommand, RuntimeHealth};

/// Where the runtime reports what it is doing
#[allow(async_fn_in_trait)]
pub trait TelemetrySink {
    async fn publish_drive(&self, drive: &DriveCommand) -> Result<(), BridgeError>;

    async fn publish_health(&self, health: RuntimeHealth) -> Result<(), BridgeError>;
}

/// Telemetry disabled
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTelemetry;

impl TelemetrySink for NoTelemetry {
    async fn publish_drive(&self, _drive: &DriveCommand) -> Result<(), BridgeError> {
        Ok(())
    }

    async fn publish_health(&self, _health: RuntimeHealth) -> Result<(), BridgeError> {
        Ok(())
    }
}

fn telemetry_error(e: impl std::fmt::Display) -> BridgeError {
    BridgeError::Telemetry(e.to_string())
}

pub struct ZenohTelemetry {
    // Publishers stop when the session is dropped
    _session: zenoh::Session,
    pub_drive: zenoh::pubsub::Publisher<'static>,
    pub_health: zenoh::pubsub::Publisher<'static>,
}

impl ZenohTelemetry {
    pub async fn open() -> Result<Self, BridgeError> {
        info!("Opening Zenoh session...");
        let session = zenoh::open(zenoh::Config::default())
            .await
            .map_err(telemetry_error)?;

        let pub_drive = session
            .declare_publisher(TOPIC_RT_DRIVE)
            .await
            .map_err(telemetry_error)?;
        let pub_health = session
            .declare_publisher(TOPIC_HEALTH)
            .await
            .map_err(telemetry_error)?;

        info!("Publishing to: {}, {}", TOPIC_RT_DRIVE, TOPIC_HEALTH);
        Ok(Self {
            _session: session,
            pub_drive,
            pub_health,
        })
    }
}

impl TelemetrySink for ZenohTelemetry {
    async fn publish_drive(&self, drive: &DriveCommand) -> Result<(), BridgeError> {
        let json = serde_json::to_string(drive).map_err(telemetry_error)?;
        self.pub_drive.put(json).await.map_err(telemetry_error)
    }

    async fn publish_health(&self, health: RuntimeHealth) -> Result<(), BridgeError> {
        let json = serde_json::to_string(&health).map_err(telemetry_error)?;
        self.pub_health.put(json).await.map_err(telemetry_error)
    }
}
