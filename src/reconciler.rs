// MIT License - Copyright (c) 2026 lifesos-lan-bridge contributors

//! Alarm state machine.
//!
//! Operating mode and composite state are derived from two independent
//! sources: command responses and Contact ID reports from the base unit,
//! and events raised by individual devices. The [`Reconciler`] is the only
//! writer of the base unit and device records, and every change it makes
//! goes through one notification path.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::constants::{
    BaseUnitState, ContactIdEventCategory, ContactIdEventCode, ContactIdEventQualifier,
    DeviceEventCode, OperationMode,
};
use crate::contact_id::ContactId;
use crate::device_event::DeviceEvent;
use crate::devices::{BaseUnitRecord, Device, DeviceCategory, EnableStatusFlags};
use crate::event::{BaseUnitEvent, EventReceiver, EventSender, Notifier, Observer, PropertyChange};
use crate::protocol::Command;
use crate::response::{DeviceSettings, Response};
use crate::transport::ProtocolMessage;

pub struct Reconciler {
    base_unit: BaseUnitRecord,
    devices: HashMap<u32, Device>,
    notifier: Notifier,
}

impl Reconciler {
    pub fn new(tx: EventSender) -> Self {
        Self {
            base_unit: BaseUnitRecord::default(),
            devices: HashMap::new(),
            notifier: Notifier::new(tx),
        }
    }

    pub fn add_observer(&mut self, observer: Box<dyn Observer>) {
        self.notifier.add_observer(observer);
    }

    pub fn subscribe(&self) -> EventReceiver {
        self.notifier.subscribe()
    }

    pub fn base_unit(&self) -> &BaseUnitRecord {
        &self.base_unit
    }

    pub fn device(&self, device_id: u32) -> Option<&Device> {
        self.devices.get(&device_id)
    }

    /// Devices sorted by category, then zone.
    pub fn devices(&self) -> Vec<Device> {
        let mut devices: Vec<_> = self.devices.values().cloned().collect();
        devices.sort_by_key(|d| (d.category.index(), d.group_number, d.unit_number, d.device_id));
        devices
    }

    pub fn set_connected(&mut self, connected: bool) {
        let change = self.base_unit.set_connected(connected);
        self.emit_change(change);
    }

    pub fn discovery_complete(&mut self) {
        info!("Device discovery completed and got initial state");
        self.notifier.emit(BaseUnitEvent::DiscoveryComplete);
    }

    /// Apply any message from the base unit.
    ///
    /// Returns a follow-up command the caller should issue, if any.
    pub fn handle_message(&mut self, message: &ProtocolMessage) -> Option<Command> {
        match message {
            ProtocolMessage::Response(response) => return self.handle_response(response),
            ProtocolMessage::DeviceEvent(event) => self.handle_device_event(event),
            ProtocolMessage::ContactId(contact_id) => self.handle_contact_id(contact_id),
        }
        None
    }

    pub fn handle_response(&mut self, response: &Response) -> Option<Command> {
        match response {
            Response::RomVersion { version } => {
                let change = self.base_unit.set_rom_version(version.clone());
                self.emit_change(change);
            }
            Response::OpMode { mode, .. } => {
                self.set_operation_mode(*mode);
                self.set_state((*mode).into());
            }
            Response::ExitDelay { seconds, .. } => {
                let change = self.base_unit.set_exit_delay(*seconds);
                self.emit_change(change);
            }
            Response::EntryDelay { seconds, .. } => {
                let change = self.base_unit.set_entry_delay(*seconds);
                self.emit_change(change);
            }
            Response::DateTime { value, was_set } => {
                info!(
                    "Remote date/time {} {}",
                    if *was_set { "was set to" } else { "is" },
                    value
                );
            }
            Response::DeviceInfo(info) => match self.devices.get_mut(&info.device_id) {
                Some(device) => {
                    let changes = device.apply_info(info);
                    self.emit_device_changes(info.device_id, changes);
                }
                None => {
                    let device = Device::from_info(info);
                    info!(
                        "Found {} device {:06x} in zone {}",
                        device.category.description(),
                        device.device_id,
                        device.zone()
                    );
                    self.devices.insert(device.device_id, device.clone());
                    self.notifier.emit(BaseUnitEvent::DeviceAdded(device));
                }
            },
            Response::DeviceAdded(settings) => {
                // Enrollment only reports settings; read back the full record
                return Some(Command::GetDeviceByIndex {
                    category: settings.category,
                    index: settings.index,
                });
            }
            _ => {}
        }
        None
    }

    pub fn handle_device_event(&mut self, event: &DeviceEvent) {
        let Some(device) = self.devices.get_mut(&event.device_id) else {
            // Not yet enumerated, or enrolled after discovery
            warn!("Event for device not in our collection: Id: {:06x}", event.device_id);
            return;
        };

        let changes = device.apply_event(event);
        let category = device.category;
        let enable_status = device.enable_status;
        self.emit_device_changes(event.device_id, changes);

        let Some(code) = event.event() else {
            debug!(
                "Unknown event code {:04x} from device {:06x}",
                event.event_code, event.device_id
            );
            return;
        };
        self.notifier.emit(BaseUnitEvent::DeviceEvent {
            device_id: event.device_id,
            event_code: code,
        });

        match code {
            DeviceEventCode::Away if self.base_unit.operation_mode != Some(OperationMode::Away) => {
                if category == DeviceCategory::Controller
                    && !enable_status.contains(EnableStatusFlags::BYPASS)
                    && enable_status.contains(EnableStatusFlags::DELAY)
                    && self.base_unit.exit_delay.unwrap_or(0) > 0
                {
                    self.set_state(BaseUnitState::AwayExitDelay);
                } else {
                    self.set_mode_and_state(OperationMode::Away);
                }
            }
            DeviceEventCode::Home => self.set_mode_and_state(OperationMode::Home),
            DeviceEventCode::Disarm => self.set_mode_and_state(OperationMode::Disarm),
            _ => {}
        }

        let is_trigger = matches!(code, DeviceEventCode::Trigger | DeviceEventCode::Open);
        if is_trigger
            && self.base_unit.operation_mode == Some(OperationMode::Away)
            && category == DeviceCategory::Burglar
            && !enable_status.contains(EnableStatusFlags::BYPASS)
            && !enable_status.contains(EnableStatusFlags::INACTIVITY)
            && enable_status.contains(EnableStatusFlags::DELAY)
            && self.base_unit.entry_delay.unwrap_or(0) > 0
        {
            self.set_state(BaseUnitState::AwayEntryDelay);
        }
    }

    pub fn handle_contact_id(&mut self, contact_id: &ContactId) {
        let qualifier = contact_id.qualifier();
        match contact_id.event() {
            Some(ContactIdEventCode::AwayQuickArm) => {
                self.set_mode_and_state(OperationMode::Away)
            }
            // Some firmware reports arming as Away with a qualifier
            Some(ContactIdEventCode::Away)
                if qualifier == Some(ContactIdEventQualifier::Restore) =>
            {
                self.set_mode_and_state(OperationMode::Away)
            }
            Some(ContactIdEventCode::Home) => self.set_mode_and_state(OperationMode::Home),
            Some(ContactIdEventCode::Disarm) => self.set_mode_and_state(OperationMode::Disarm),
            Some(ContactIdEventCode::Away) if qualifier == Some(ContactIdEventQualifier::Event) => {
                self.set_mode_and_state(OperationMode::Disarm)
            }
            Some(ContactIdEventCode::MonitorMode) => {
                self.set_mode_and_state(OperationMode::Monitor)
            }
            _ => {
                // Alarm raised: the entry delay has run out
                if contact_id.category() == Some(ContactIdEventCategory::Alarm)
                    && qualifier == Some(ContactIdEventQualifier::Event)
                    && self.base_unit.state == Some(BaseUnitState::AwayEntryDelay)
                {
                    self.set_state(BaseUnitState::Away);
                }
            }
        }

        self.notifier
            .emit(BaseUnitEvent::ContactId(contact_id.clone()));
    }

    /// Apply settings the base unit confirmed for a device.
    pub fn apply_device_settings(&mut self, device_id: u32, settings: &DeviceSettings) {
        match self.devices.get_mut(&device_id) {
            Some(device) => {
                let changes = device.apply_settings(settings);
                self.emit_device_changes(device_id, changes);
            }
            None => warn!("Settings for device not in our collection: Id: {:06x}", device_id),
        }
    }

    pub fn remove_device(&mut self, device_id: u32) -> Option<Device> {
        let device = self.devices.remove(&device_id)?;
        info!("Deleted device {:06x}", device_id);
        self.notifier.emit(BaseUnitEvent::DeviceDeleted(device.clone()));
        Some(device)
    }

    fn set_operation_mode(&mut self, mode: OperationMode) {
        let change = self.base_unit.set_operation_mode(mode);
        self.emit_change(change);
    }

    fn set_state(&mut self, state: BaseUnitState) {
        let change = self.base_unit.set_state(state);
        self.emit_change(change);
    }

    fn set_mode_and_state(&mut self, mode: OperationMode) {
        self.set_operation_mode(mode);
        self.set_state(mode.into());
    }

    fn emit_change(&mut self, change: Option<PropertyChange>) {
        if let Some(change) = change {
            debug!("{}: {:?} -> {:?}", change.name, change.old_value, change.new_value);
            self.notifier.emit(BaseUnitEvent::PropertyChanged(change));
        }
    }

    fn emit_device_changes(&mut self, device_id: u32, changes: Vec<PropertyChange>) {
        for change in changes {
            self.notifier
                .emit(BaseUnitEvent::DevicePropertyChanged { device_id, change });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::CharacteristicsFlags;
    use crate::event::{event_channel, PropertyValue};

    /// Remote controller in zone 01-01 with DELAY set
    const CONTROLLER_INFO: &str = "kc101234560000000101400000009a00";
    /// Burglar PIR in zone 11-02 with DELAY set
    const PIR_INFO: &str = "kb50f01a7a0010e41102541000005b05";

    fn reconciler() -> (Reconciler, EventReceiver) {
        let (tx, rx) = event_channel(64);
        (Reconciler::new(tx), rx)
    }

    fn respond(reconciler: &mut Reconciler, text: &str) -> Option<Command> {
        let response = Response::parse(text).unwrap().unwrap();
        reconciler.handle_response(&response)
    }

    fn device_event(code: u16, device_id: u32) -> DeviceEvent {
        DeviceEvent {
            event_code: code,
            device_type: 0,
            device_id,
            message_attribute: 0,
            characteristics: CharacteristicsFlags::empty(),
            current_status: 0x9a,
        }
    }

    fn drain(rx: &mut EventReceiver) -> Vec<BaseUnitEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn state_changes(events: &[BaseUnitEvent]) -> Vec<PropertyValue> {
        events
            .iter()
            .filter_map(|e| match e {
                BaseUnitEvent::PropertyChanged(c) if c.name == "state" => {
                    Some(c.new_value.clone())
                }
                _ => None,
            })
            .collect()
    }

    fn armed_setup() -> (Reconciler, EventReceiver, u32, u32) {
        let (mut r, mut rx) = reconciler();
        respond(&mut r, CONTROLLER_INFO);
        respond(&mut r, PIR_INFO);
        respond(&mut r, "l010");
        respond(&mut r, "l11e");
        respond(&mut r, "n00");
        drain(&mut rx);
        (r, rx, 0x123456, 0xf01a7a)
    }

    #[test]
    fn test_device_info_adds_then_updates() {
        let (mut r, mut rx) = reconciler();
        respond(&mut r, PIR_INFO);
        let events = drain(&mut rx);
        assert!(matches!(events.as_slice(), [BaseUnitEvent::DeviceAdded(d)] if d.device_id == 0xf01a7a));

        respond(&mut r, PIR_INFO);
        assert!(drain(&mut rx).is_empty());
        assert_eq!(r.devices().len(), 1);
    }

    #[test]
    fn test_opmode_response_sets_mode_and_state() {
        let (mut r, mut rx) = reconciler();
        respond(&mut r, "n02");
        assert_eq!(r.base_unit().operation_mode, Some(OperationMode::Away));
        assert_eq!(r.base_unit().state, Some(BaseUnitState::Away));
        assert_eq!(drain(&mut rx).len(), 2);

        // Unchanged values notify nothing
        respond(&mut r, "n0s2");
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_device_added_requests_full_record() {
        let (mut r, _rx) = reconciler();
        let follow_up = respond(&mut r, "ibl0512031410");
        assert_eq!(
            follow_up,
            Some(Command::GetDeviceByIndex {
                category: DeviceCategory::Burglar,
                index: 5
            })
        );
    }

    #[test]
    fn test_remote_away_with_exit_delay() {
        let (mut r, mut rx, controller, _) = armed_setup();
        r.handle_device_event(&device_event(DeviceEventCode::Away as u16, controller));

        assert_eq!(r.base_unit().state, Some(BaseUnitState::AwayExitDelay));
        assert_eq!(r.base_unit().operation_mode, Some(OperationMode::Disarm));
        let events = drain(&mut rx);
        assert_eq!(state_changes(&events), vec![PropertyValue::State(BaseUnitState::AwayExitDelay)]);

        // Base unit confirms once the delay has passed
        let armed = ContactId::parse("1ac318140800000c").unwrap();
        r.handle_contact_id(&armed);
        assert_eq!(r.base_unit().operation_mode, Some(OperationMode::Away));
        assert_eq!(r.base_unit().state, Some(BaseUnitState::Away));
    }

    #[test]
    fn test_remote_away_without_exit_delay() {
        let (mut r, _rx, controller, _) = armed_setup();
        respond(&mut r, "l000");
        r.handle_device_event(&device_event(DeviceEventCode::Away as u16, controller));
        assert_eq!(r.base_unit().operation_mode, Some(OperationMode::Away));
        assert_eq!(r.base_unit().state, Some(BaseUnitState::Away));
    }

    #[test]
    fn test_entry_delay_then_alarm() {
        let (mut r, mut rx, _, pir) = armed_setup();
        respond(&mut r, "n02");
        drain(&mut rx);

        r.handle_device_event(&device_event(DeviceEventCode::Trigger as u16, pir));
        assert_eq!(r.base_unit().state, Some(BaseUnitState::AwayEntryDelay));

        // Retriggering while delayed notifies once
        r.handle_device_event(&device_event(DeviceEventCode::Trigger as u16, pir));
        let events = drain(&mut rx);
        assert_eq!(state_changes(&events), vec![PropertyValue::State(BaseUnitState::AwayEntryDelay)]);

        // Burglary alarm
        let alarm = ContactId::parse("1ac3181130011012").unwrap();
        r.handle_contact_id(&alarm);
        assert_eq!(r.base_unit().state, Some(BaseUnitState::Away));
        let events = drain(&mut rx);
        assert_eq!(state_changes(&events), vec![PropertyValue::State(BaseUnitState::Away)]);
        assert!(matches!(events.last(), Some(BaseUnitEvent::ContactId(_))));
    }

    #[test]
    fn test_unrecognised_contact_id_is_only_forwarded() {
        let (mut r, mut rx, _, pir) = armed_setup();
        respond(&mut r, "n02");
        r.handle_device_event(&device_event(DeviceEventCode::Trigger as u16, pir));
        assert_eq!(r.base_unit().state, Some(BaseUnitState::AwayEntryDelay));
        drain(&mut rx);

        let unknown = ContactId::parse("1ac318177701101a").unwrap();
        assert_eq!(unknown.event(), None);
        assert_eq!(unknown.category(), None);
        r.handle_contact_id(&unknown);

        assert_eq!(r.base_unit().state, Some(BaseUnitState::AwayEntryDelay));
        assert_eq!(r.base_unit().operation_mode, Some(OperationMode::Away));
        let events = drain(&mut rx);
        assert!(matches!(events.as_slice(), [BaseUnitEvent::ContactId(c)] if c.event_code == 0x777));
    }

    #[test]
    fn test_trigger_ignored_when_disarmed() {
        let (mut r, mut rx, _, pir) = armed_setup();
        r.handle_device_event(&device_event(DeviceEventCode::Trigger as u16, pir));
        assert_eq!(r.base_unit().state, Some(BaseUnitState::Disarm));
        assert!(state_changes(&drain(&mut rx)).is_empty());
    }

    #[test]
    fn test_contact_id_mode_changes() {
        let (mut r, _rx) = reconciler();
        let disarm = ContactId {
            account_number: 0x1ac3,
            message_type: 0x18,
            event_qualifier: ContactIdEventQualifier::Event as u8,
            event_code: ContactIdEventCode::Away as u16,
            device_category: Some(DeviceCategory::BaseUnit),
            group_number: None,
            unit_number: None,
            user_id: None,
            checksum: 0,
        };
        r.handle_contact_id(&disarm);
        assert_eq!(r.base_unit().state, Some(BaseUnitState::Disarm));

        let monitor = ContactId {
            event_code: ContactIdEventCode::MonitorMode as u16,
            ..disarm.clone()
        };
        r.handle_contact_id(&monitor);
        assert_eq!(r.base_unit().operation_mode, Some(OperationMode::Monitor));

        let home = ContactId {
            event_code: ContactIdEventCode::Home as u16,
            ..disarm
        };
        r.handle_contact_id(&home);
        assert_eq!(r.base_unit().state, Some(BaseUnitState::Home));
    }

    #[test]
    fn test_unknown_device_event_is_dropped() {
        let (mut r, mut rx) = reconciler();
        r.handle_device_event(&device_event(DeviceEventCode::Home as u16, 0x123456));
        assert_eq!(r.base_unit().state, None);
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_settings_and_removal() {
        let (mut r, mut rx, _, pir) = armed_setup();
        let Ok(Some(Response::DeviceChanged(settings))) = Response::parse("ibs0512031410") else {
            panic!("expected device changed");
        };
        r.apply_device_settings(pir, &settings);
        assert_eq!(r.device(pir).unwrap().zone(), "12-03");
        assert_eq!(drain(&mut rx).len(), 3);

        assert!(r.remove_device(pir).is_some());
        assert!(r.device(pir).is_none());
        assert!(matches!(drain(&mut rx).as_slice(), [BaseUnitEvent::DeviceDeleted(_)]));
        assert!(r.remove_device(pir).is_none());
    }
}
