// MIT License - Copyright (c) 2026 lifesos-lan-bridge contributors

//! Drives `BaseUnit` against a scripted base unit on a loopback socket.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::time::timeout;

use lifesos_lan_bridge::{
    BaseUnit, BaseUnitConfig, BaseUnitEvent, BaseUnitState, EnableStatusFlags, EventReceiver,
    LifeSosError, OperationMode, PropertyValue,
};

const CONTROLLER_ID: u32 = 0x123456;
const PIR_ID: u32 = 0xf01a7a;

/// Canned answer for each command the client sends.
fn reply(command: &str) -> Option<String> {
    let reply = match command {
        "!vn?" => "!vn1.2.3&".to_string(),
        "!n0?" => "!n00&".to_string(),
        "!l0?" => "!l010&".to_string(),
        "!l1?" => "!l11e&".to_string(),
        "!kc?00" => "!kc101234560000000101400000009a00&".to_string(),
        "!kb?00" => "!kb50f01a7a0010e41102541000005b05&".to_string(),
        "!ib?1102" => "!ib0050f01a7a0010e41102541000005b05&".to_string(),
        "!ibs00030454100000" => "!ibs0003045410&".to_string(),
        "!ev000" => "!evno&".to_string(),
        "!l0s1>" => "!l0s1>&".to_string(),
        c if c.starts_with("!n0s") => format!("{c}&"),
        // Any other device index is empty
        c if c.starts_with("!k") && c.len() == 6 => format!("!{}no&", &c[1..3]),
        _ => return None,
    };
    Some(reply + "\r\n")
}

/// Accepts one client and answers it; returns the writer for unsolicited lines.
async fn fake_base_unit() -> (u16, tokio::sync::oneshot::Receiver<Arc<Mutex<OwnedWriteHalf>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let (tx, rx) = tokio::sync::oneshot::channel();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let (mut reader, writer) = stream.into_split();
        let writer = Arc::new(Mutex::new(writer));
        let _ = tx.send(writer.clone());

        let mut pending = String::new();
        let mut buf = [0u8; 1024];
        loop {
            let n = match reader.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(n) => n,
            };
            pending.push_str(&String::from_utf8_lossy(&buf[..n]));
            while let Some(end) = pending.find('&') {
                let command: String = pending.drain(..=end).collect();
                if let Some(line) = reply(command.trim_end_matches('&')) {
                    if writer.lock().await.write_all(line.as_bytes()).await.is_err() {
                        return;
                    }
                }
            }
        }
    });

    (port, rx)
}

async fn wait_for(
    events: &mut EventReceiver,
    mut predicate: impl FnMut(&BaseUnitEvent) -> bool,
) -> BaseUnitEvent {
    timeout(Duration::from_secs(5), async {
        loop {
            let event = events.recv().await.unwrap();
            if predicate(&event) {
                return event;
            }
        }
    })
    .await
    .expect("timed out waiting for event")
}

fn is_state(event: &BaseUnitEvent, state: BaseUnitState) -> bool {
    matches!(
        event,
        BaseUnitEvent::PropertyChanged(change)
            if change.name == "state" && change.new_value == PropertyValue::State(state)
    )
}

async fn connect(port: u16) -> BaseUnit {
    let config = BaseUnitConfig::builder()
        .host("127.0.0.1")
        .port(port)
        .command_timeout(Duration::from_millis(500))
        .retry_max(2)
        .build();
    BaseUnit::connect(config).await.unwrap()
}

#[tokio::test]
async fn test_discovery_and_state_transitions() {
    let (port, writer_rx) = fake_base_unit().await;
    let mut base_unit = connect(port).await;
    let mut events = base_unit.subscribe();
    let writer = writer_rx.await.unwrap();

    wait_for(&mut events, |e| matches!(e, BaseUnitEvent::DiscoveryComplete)).await;

    let state = base_unit.state().await;
    assert!(state.is_connected);
    assert_eq!(state.rom_version.as_deref(), Some("1.2.3"));
    assert_eq!(state.operation_mode, Some(OperationMode::Disarm));
    assert_eq!(state.exit_delay, Some(16));
    assert_eq!(state.entry_delay, Some(30));

    let devices = base_unit.devices().await;
    let ids: Vec<u32> = devices.iter().map(|d| d.device_id).collect();
    assert_eq!(ids, vec![CONTROLLER_ID, PIR_ID]);

    // Remote controller arms Away with an exit delay
    writer
        .lock()
        .await
        .write_all(b"MINPIC=0a101012345600009a\r\n")
        .await
        .unwrap();
    wait_for(&mut events, |e| is_state(e, BaseUnitState::AwayExitDelay)).await;

    // Base unit reports arming once the delay has passed
    writer
        .lock()
        .await
        .write_all(b"(1ac318140800000c)\r\n")
        .await
        .unwrap();
    wait_for(&mut events, |e| is_state(e, BaseUnitState::Away)).await;
    assert_eq!(
        base_unit.state().await.operation_mode,
        Some(OperationMode::Away)
    );

    // PIR trips while armed: entry delay
    writer
        .lock()
        .await
        .write_all(b"MINPIC=0a5850f01a7a00109a\r\n")
        .await
        .unwrap();
    wait_for(&mut events, |e| is_state(e, BaseUnitState::AwayEntryDelay)).await;

    base_unit.disconnect().await.unwrap();
    assert!(!base_unit.is_connected());
}

#[tokio::test]
async fn test_commands_through_facade() {
    let (port, _writer_rx) = fake_base_unit().await;
    let mut base_unit = connect(port).await;
    let mut events = base_unit.subscribe();
    wait_for(&mut events, |e| matches!(e, BaseUnitEvent::DiscoveryComplete)).await;

    base_unit
        .set_operation_mode(OperationMode::Home, None)
        .await
        .unwrap();
    wait_for(&mut events, |e| is_state(e, BaseUnitState::Home)).await;

    base_unit.set_exit_delay(30).await.unwrap();
    assert_eq!(base_unit.get_event_log(0).await.unwrap(), None);
    // Past the end of the ring; rejected before anything is sent
    assert!(matches!(
        base_unit.get_event_log(512).await,
        Err(LifeSosError::InvalidFormat { .. })
    ));

    // No reply to the clock query
    assert!(matches!(
        base_unit.get_datetime().await,
        Err(LifeSosError::CommandTimeout { .. })
    ));

    base_unit
        .change_device(PIR_ID, 0x03, 0x04, EnableStatusFlags::from_bits_retain(0x5410))
        .await
        .unwrap();
    wait_for(&mut events, |e| {
        matches!(e, BaseUnitEvent::DevicePropertyChanged { device_id, change }
            if *device_id == PIR_ID && change.name == "unit_number")
    })
    .await;
    assert_eq!(base_unit.device(PIR_ID).await.unwrap().zone(), "03-04");

    assert!(matches!(
        base_unit.delete_device(0xabcdef).await,
        Err(LifeSosError::UnknownDevice { device_id: 0xabcdef })
    ));

    base_unit.disconnect().await.unwrap();
}

#[tokio::test]
async fn test_connection_loss_is_reported() {
    let (port, writer_rx) = fake_base_unit().await;
    let base_unit = connect(port).await;
    let mut events = base_unit.subscribe();
    let writer = writer_rx.await.unwrap();
    wait_for(&mut events, |e| matches!(e, BaseUnitEvent::DiscoveryComplete)).await;

    writer.lock().await.shutdown().await.unwrap();
    drop(writer);

    wait_for(&mut events, |e| {
        matches!(e, BaseUnitEvent::PropertyChanged(change)
            if change.name == "is_connected" && change.new_value == PropertyValue::Bool(false))
    })
    .await;
    assert!(!base_unit.is_connected());
    assert!(matches!(
        base_unit.clear_status(None).await,
        Err(LifeSosError::NotConnected)
    ));
}

#[tokio::test]
async fn test_drop_stops_background_commands() {
    // Base unit that records commands but never answers
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let (done_tx, done_rx) = tokio::sync::oneshot::channel();
    let (dropped_tx, mut dropped_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut late = Vec::new();
        let mut buf = [0u8; 256];
        loop {
            match stream.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    if *dropped_rx.borrow_and_update() {
                        late.push(String::from_utf8_lossy(&buf[..n]).to_string());
                    }
                }
            }
        }
        let _ = done_tx.send(late);
    });

    let config = BaseUnitConfig::builder()
        .host("127.0.0.1")
        .port(port)
        .command_timeout(Duration::from_millis(200))
        .build();
    let base_unit = BaseUnit::connect(config).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    drop(base_unit);
    dropped_tx.send(true).unwrap();

    // Socket closes once every task holding it is gone
    let late = timeout(Duration::from_secs(2), done_rx)
        .await
        .expect("connection still open after drop")
        .unwrap();
    assert!(late.is_empty(), "commands sent after drop: {late:?}");
}
