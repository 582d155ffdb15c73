// MIT License - Copyright (c) 2026 lifesos-lan-bridge contributors

use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::error;

use crate::constants::{BaseUnitState, DeviceEventCode, OperationMode};
use crate::contact_id::ContactId;
use crate::devices::device::Device;
use crate::devices::flags::{CharacteristicsFlags, EnableStatusFlags};

/// Value of a tracked property, before or after a change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    None,
    Bool(bool),
    Number(u32),
    Text(String),
    OperationMode(OperationMode),
    State(BaseUnitState),
    EnableStatus(EnableStatusFlags),
    Characteristics(CharacteristicsFlags),
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        PropertyValue::Bool(v)
    }
}

impl From<u8> for PropertyValue {
    fn from(v: u8) -> Self {
        PropertyValue::Number(v as u32)
    }
}

impl From<u32> for PropertyValue {
    fn from(v: u32) -> Self {
        PropertyValue::Number(v)
    }
}

impl From<String> for PropertyValue {
    fn from(v: String) -> Self {
        PropertyValue::Text(v)
    }
}

impl From<OperationMode> for PropertyValue {
    fn from(v: OperationMode) -> Self {
        PropertyValue::OperationMode(v)
    }
}

impl From<BaseUnitState> for PropertyValue {
    fn from(v: BaseUnitState) -> Self {
        PropertyValue::State(v)
    }
}

impl From<EnableStatusFlags> for PropertyValue {
    fn from(v: EnableStatusFlags) -> Self {
        PropertyValue::EnableStatus(v)
    }
}

impl From<CharacteristicsFlags> for PropertyValue {
    fn from(v: CharacteristicsFlags) -> Self {
        PropertyValue::Characteristics(v)
    }
}

impl<T: Into<PropertyValue>> From<Option<T>> for PropertyValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(PropertyValue::None, Into::into)
    }
}

/// A property that changed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyChange {
    pub name: &'static str,
    pub old_value: PropertyValue,
    pub new_value: PropertyValue,
}

impl PropertyChange {
    /// Store `value` in `slot`, returning the change if the value differs.
    pub fn track<T>(name: &'static str, slot: &mut T, value: T) -> Option<Self>
    where
        T: PartialEq + Clone + Into<PropertyValue>,
    {
        if *slot == value {
            return None;
        }
        let old_value = std::mem::replace(slot, value);
        Some(Self {
            name,
            old_value: old_value.into(),
            new_value: slot.clone().into(),
        })
    }
}

/// All events that can be emitted by the base unit.
///
/// Users subscribe via `base_unit.subscribe()` to receive a
/// `tokio::sync::broadcast::Receiver<BaseUnitEvent>`, or register an
/// [`Observer`].
#[derive(Debug, Clone)]
pub enum BaseUnitEvent {
    /// A base unit property changed (connectivity, mode, state, delays, ROM version)
    PropertyChanged(PropertyChange),
    /// Initial state and all enrolled devices have been read
    DiscoveryComplete,
    /// A device was seen for the first time
    DeviceAdded(Device),
    /// A device was removed from the base unit
    DeviceDeleted(Device),
    /// A property of an enrolled device changed
    DevicePropertyChanged { device_id: u32, change: PropertyChange },
    /// An enrolled device raised a known event
    DeviceEvent {
        device_id: u32,
        event_code: DeviceEventCode,
    },
    /// A Contact ID message was received
    ContactId(ContactId),
}

/// Error type returned by observers.
pub type ObserverError = Box<dyn std::error::Error + Send + Sync>;

/// Receives events synchronously from the event-processing task.
pub trait Observer: Send + Sync {
    /// Name used when logging failures.
    fn name(&self) -> &str {
        "observer"
    }

    fn notify(&mut self, event: &BaseUnitEvent) -> std::result::Result<(), ObserverError>;
}

/// Type alias for the broadcast sender.
pub type EventSender = tokio::sync::broadcast::Sender<BaseUnitEvent>;

/// Type alias for the broadcast receiver.
pub type EventReceiver = tokio::sync::broadcast::Receiver<BaseUnitEvent>;

/// Create a new event channel with the given capacity, at least 1.
pub fn event_channel(capacity: usize) -> (EventSender, EventReceiver) {
    tokio::sync::broadcast::channel(capacity.max(1))
}

/// Delivers events to observers and broadcast subscribers.
///
/// Failures inside an observer, whether returned errors or panics, are
/// logged here and never reach the caller.
pub struct Notifier {
    tx: EventSender,
    observers: Vec<Box<dyn Observer>>,
}

impl Notifier {
    pub fn new(tx: EventSender) -> Self {
        Self {
            tx,
            observers: Vec::new(),
        }
    }

    pub fn add_observer(&mut self, observer: Box<dyn Observer>) {
        self.observers.push(observer);
    }

    pub fn subscribe(&self) -> EventReceiver {
        self.tx.subscribe()
    }

    pub fn emit(&mut self, event: BaseUnitEvent) {
        for observer in &mut self.observers {
            match catch_unwind(AssertUnwindSafe(|| observer.notify(&event))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => error!("Unhandled error in {} callback: {}", observer.name(), e),
                Err(_) => error!("Unhandled panic in {} callback", observer.name()),
            }
        }
        // No subscribers is not an error
        let _ = self.tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_track_skips_equal_values() {
        let mut slot = Some(OperationMode::Away);
        assert_eq!(
            PropertyChange::track("operation_mode", &mut slot, Some(OperationMode::Away)),
            None
        );
        let change =
            PropertyChange::track("operation_mode", &mut slot, Some(OperationMode::Home)).unwrap();
        assert_eq!(change.old_value, PropertyValue::OperationMode(OperationMode::Away));
        assert_eq!(change.new_value, PropertyValue::OperationMode(OperationMode::Home));
        assert_eq!(slot, Some(OperationMode::Home));

        let mut delay: Option<u32> = Some(5);
        let change = PropertyChange::track("exit_delay", &mut delay, None).unwrap();
        assert_eq!(change.new_value, PropertyValue::None);
    }

    struct Failing;

    impl Observer for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn notify(&mut self, _event: &BaseUnitEvent) -> std::result::Result<(), ObserverError> {
            Err("boom".into())
        }
    }

    struct Panicking;

    impl Observer for Panicking {
        fn notify(&mut self, _event: &BaseUnitEvent) -> std::result::Result<(), ObserverError> {
            panic!("observer panic");
        }
    }

    struct Counting(Arc<Mutex<u32>>);

    impl Observer for Counting {
        fn notify(&mut self, _event: &BaseUnitEvent) -> std::result::Result<(), ObserverError> {
            *self.0.lock().unwrap() += 1;
            Ok(())
        }
    }

    #[test]
    fn test_observer_failures_are_contained() {
        let (tx, mut rx) = event_channel(16);
        let count = Arc::new(Mutex::new(0));
        let mut notifier = Notifier::new(tx);
        notifier.add_observer(Box::new(Failing));
        notifier.add_observer(Box::new(Panicking));
        notifier.add_observer(Box::new(Counting(count.clone())));

        notifier.emit(BaseUnitEvent::DiscoveryComplete);
        notifier.emit(BaseUnitEvent::DiscoveryComplete);

        assert_eq!(*count.lock().unwrap(), 2);
        assert!(matches!(rx.try_recv(), Ok(BaseUnitEvent::DiscoveryComplete)));
    }

    #[test]
    fn test_zero_capacity_channel() {
        let (tx, mut rx) = event_channel(0);
        tx.send(BaseUnitEvent::DiscoveryComplete).unwrap();
        assert!(matches!(rx.try_recv(), Ok(BaseUnitEvent::DiscoveryComplete)));
    }

    #[test]
    fn test_emit_without_subscribers() {
        let (tx, rx) = event_channel(4);
        drop(rx);
        let mut notifier = Notifier::new(tx);
        notifier.emit(BaseUnitEvent::DiscoveryComplete);
    }
}
