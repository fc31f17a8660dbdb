// End-to-end: real datagrams over loopback through the serve loop

use std::time::Duration;

use tokio::net::UdpSocket;
use tokio::sync::oneshot;
use tokio::time::timeout;

use diddyborg_udp_bridge::config::BridgeConfig;
use diddyborg_udp_bridge::motor::SimulatedBoard;
use diddyborg_udp_bridge::protocol::{encode, ChannelFrame};
use diddyborg_udp_bridge::runtime::{serve, Session};
use diddyborg_udp_bridge::telemetry::NoTelemetry;

const WAIT: Duration = Duration::from_secs(2);

struct Harness {
    client: UdpSocket,
    bridge_addr: std::net::SocketAddr,
    board: SimulatedBoard,
    stop: oneshot::Sender<()>,
    task: tokio::task::JoinHandle<()>,
}

async fn start_bridge(config: BridgeConfig) -> Harness {
    // Client listens where the bridge sends replies
    let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let tx_port = client.local_addr().unwrap().port();

    let bridge = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let bridge_addr = bridge.local_addr().unwrap();

    let board = SimulatedBoard::new();
    let mut session = Session::new(&config, board.clone()).unwrap();
    session.start().unwrap();

    let (stop, stopped) = oneshot::channel::<()>();
    let task = tokio::spawn(async move {
        let shutdown = async {
            let _ = stopped.await;
        };
        serve(session, bridge, tx_port, &NoTelemetry, shutdown)
            .await
            .unwrap();
    });

    Harness {
        client,
        bridge_addr,
        board,
        stop,
        task,
    }
}

async fn wait_for<F: Fn() -> bool>(condition: F) {
    timeout(WAIT, async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

#[tokio::test]
async fn test_identify_and_version_replies() {
    let h = start_bridge(BridgeConfig::default()).await;
    let mut buf = [0u8; 64];

    h.client.send_to(b"?", h.bridge_addr).await.unwrap();
    let (len, _) = timeout(WAIT, h.client.recv_from(&mut buf))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(&buf[..len], b"T=Diddyborg");

    h.client.send_to(b"0", h.bridge_addr).await.unwrap();
    let (len, _) = timeout(WAIT, h.client.recv_from(&mut buf))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(&buf[..len], b"1.0");

    h.stop.send(()).unwrap();
    h.task.await.unwrap();
}

#[tokio::test]
async fn test_frames_drive_motors_and_shutdown_stops_them() {
    let config = BridgeConfig {
        cmd_timeout_ms: 0,
        ..BridgeConfig::default()
    };
    let h = start_bridge(config).await;

    // Garbage first: dropped without stopping the loop
    h.client.send_to(&[1, 2, 3], h.bridge_addr).await.unwrap();

    let forward = encode(&ChannelFrame::new([
        1000, 1500, 1000, 1000, 1500, 1500, 1500, 1500,
    ]));
    h.client.send_to(&forward, h.bridge_addr).await.unwrap();

    let board = h.board.clone();
    wait_for(|| board.state().motor1 > 0.9).await;
    let state = h.board.state();
    assert!((state.motor1 - 0.95).abs() < 1e-9);
    assert!((state.motor2 - 0.95).abs() < 1e-9);

    h.stop.send(()).unwrap();
    h.task.await.unwrap();

    let state = h.board.state();
    assert_eq!((state.motor1, state.motor2), (0.0, 0.0));
    assert!(!state.failsafe);
    assert_eq!(state.leds, (0.0, 0.0, 0.0));
}

#[tokio::test]
async fn test_watchdog_stops_motors_when_frames_stop() {
    let config = BridgeConfig {
        cmd_timeout_ms: 50,
        ..BridgeConfig::default()
    };
    let h = start_bridge(config).await;

    let forward = encode(&ChannelFrame::new([
        1000, 1500, 1000, 1000, 1500, 1500, 1500, 1500,
    ]));
    h.client.send_to(&forward, h.bridge_addr).await.unwrap();

    let board = h.board.clone();
    wait_for(|| board.state().motor1 > 0.9).await;
    wait_for(|| board.state().motor1 == 0.0).await;

    // Still running: the next frame drives again
    h.client.send_to(&forward, h.bridge_addr).await.unwrap();
    wait_for(|| board.state().motor1 > 0.9).await;

    h.stop.send(()).unwrap();
    h.task.await.unwrap();
}

#[tokio::test]
async fn test_aborted_loop_still_cleans_up() {
    let config = BridgeConfig {
        cmd_timeout_ms: 0,
        ..BridgeConfig::default()
    };
    let h = start_bridge(config).await;
    let forward = encode(&ChannelFrame::new([
        1000, 1500, 1000, 1000, 1500, 1500, 1500, 1500,
    ]));
    h.client.send_to(&forward, h.bridge_addr).await.unwrap();

    let board = h.board.clone();
    wait_for(|| board.state().motor1 > 0.9).await;

    // Dropping the serve future drops the session
    h.task.abort();
    let _ = h.task.await;
    let state = h.board.state();
    assert_eq!((state.motor1, state.motor2), (0.0, 0.0));
    assert!(!state.failsafe);
    drop(h.stop);
}
