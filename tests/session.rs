// MIT License - Copyright (c) 2026 lifesos-lan-bridge contributors

//! Engine, framer and reconciler wired together over an in-memory stream.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};
use tokio::sync::mpsc;

use lifesos_lan_bridge::event::event_channel;
use lifesos_lan_bridge::reconciler::Reconciler;
use lifesos_lan_bridge::transport::direct::spawn_reader_task;
use lifesos_lan_bridge::transport::{CommandEngine, ProtocolMessage, Transport, TransportEvent};
use lifesos_lan_bridge::{BaseUnitEvent, BaseUnitState, Command, DeviceCategory, Response};

struct Session {
    engine: Arc<CommandEngine>,
    base_unit: DuplexStream,
    events: mpsc::UnboundedReceiver<TransportEvent>,
}

fn session(password: &str) -> Session {
    let (client, base_unit) = tokio::io::duplex(4096);
    let (reader, writer) = tokio::io::split(client);
    let engine = Arc::new(CommandEngine::new(writer, password, Duration::from_secs(2)));
    let (tx, events) = mpsc::unbounded_channel();
    spawn_reader_task(reader, engine.clone(), tx);
    Session {
        engine,
        base_unit,
        events,
    }
}

async fn read_command(stream: &mut DuplexStream) -> String {
    let mut buf = [0u8; 128];
    let n = stream.read(&mut buf).await.unwrap();
    String::from_utf8_lossy(&buf[..n]).to_string()
}

#[tokio::test]
async fn test_response_resolves_command_and_reaches_reconciler() {
    let mut s = session("1234");
    let (tx, mut rx) = event_channel(32);
    let mut reconciler = Reconciler::new(tx);

    let caller = {
        let engine = s.engine.clone();
        tokio::spawn(async move { engine.execute(&Command::GetEntryDelay, None, None).await })
    };
    assert_eq!(read_command(&mut s.base_unit).await, "!l1?1234&");

    // Reply split across writes, with an unrelated heartbeat in between
    s.base_unit.write_all(b"(1ac3181602005006)\r\n!l1").await.unwrap();
    s.base_unit.write_all(b"1e&\r\n").await.unwrap();

    let response = caller.await.unwrap().unwrap();
    assert_eq!(
        response,
        Response::EntryDelay {
            seconds: 30,
            was_set: false
        }
    );

    for _ in 0..2 {
        let Some(TransportEvent::Message(message)) = s.events.recv().await else {
            panic!("expected a message");
        };
        assert_eq!(reconciler.handle_message(&message), None);
    }
    assert_eq!(reconciler.base_unit().entry_delay, Some(30));
    assert!(matches!(rx.try_recv(), Ok(BaseUnitEvent::ContactId(_))));
    assert!(matches!(rx.try_recv(), Ok(BaseUnitEvent::PropertyChanged(c)) if c.name == "entry_delay"));
}

#[tokio::test]
async fn test_unsolicited_response_is_forwarded() {
    let mut s = session("");
    s.base_unit.write_all(b"!n0s2&\r\n").await.unwrap();

    let Some(TransportEvent::Message(message)) = s.events.recv().await else {
        panic!("expected a message");
    };
    let (tx, _rx) = event_channel(8);
    let mut reconciler = Reconciler::new(tx);
    reconciler.handle_message(&message);
    assert_eq!(reconciler.base_unit().state, Some(BaseUnitState::Away));
    assert_eq!(s.engine.pending_count().await, 0);
}

#[tokio::test]
async fn test_enrolled_device_is_read_back() {
    let mut s = session("");
    let (tx, _rx) = event_channel(8);
    let mut reconciler = Reconciler::new(tx);

    s.base_unit.write_all(b"!ibl0512031410&\r\n").await.unwrap();
    let Some(TransportEvent::Message(message)) = s.events.recv().await else {
        panic!("expected a message");
    };
    let follow_up = reconciler.handle_message(&message).unwrap();
    assert_eq!(
        follow_up,
        Command::GetDeviceByIndex {
            category: DeviceCategory::Burglar,
            index: 5
        }
    );

    let retry = {
        let engine = s.engine.clone();
        tokio::spawn(async move { engine.execute_retry(&follow_up, "new device", 3).await })
    };
    assert_eq!(read_command(&mut s.base_unit).await, "!kb?05&");
    s.base_unit
        .write_all(b"!kb50f01a7a0010e41203141000005b05&\r\n")
        .await
        .unwrap();
    assert!(matches!(retry.await.unwrap(), Some(Response::DeviceInfo(_))));

    let Some(TransportEvent::Message(message @ ProtocolMessage::Response(_))) =
        s.events.recv().await
    else {
        panic!("expected a response");
    };
    reconciler.handle_message(&message);
    assert_eq!(reconciler.device(0xf01a7a).unwrap().zone(), "12-03");
}

#[tokio::test]
async fn test_stream_end_rejects_waiters() {
    let mut s = session("");
    let caller = {
        let engine = s.engine.clone();
        tokio::spawn(async move { engine.execute(&Command::GetRomVersion, None, None).await })
    };
    read_command(&mut s.base_unit).await;
    drop(s.base_unit);

    assert!(caller.await.unwrap().is_err());
    assert_eq!(s.events.recv().await, Some(TransportEvent::Disconnected));
    assert!(!s.engine.is_connected());
}
