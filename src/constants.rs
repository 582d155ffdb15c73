// MIT License - Copyright (c) 2026 lifesos-lan-bridge contributors

use std::time::Duration;

/// Default TCP port the base unit listens on.
pub const DEFAULT_PORT: u16 = 1680;
/// Default time to wait for a command response.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(8);
/// Default attempt ceiling for retried commands.
pub const DEFAULT_RETRY_MAX: u32 = 3;
/// Entries in the base unit's event log ring.
pub const EVENT_LOG_SIZE: u16 = 512;

/// Command name tokens.
pub const CMD_CLEAR_STATUS: &str = "l5";
pub const CMD_DATETIME: &str = "dt";
pub const CMD_DEVBYIDX_PREFIX: &str = "k";
pub const CMD_DEVICE_PREFIX: &str = "i";
pub const CMD_ENTRY_DELAY: &str = "l1";
pub const CMD_EVENT_LOG: &str = "ev";
pub const CMD_EXIT_DELAY: &str = "l0";
pub const CMD_OPMODE: &str = "n0";
pub const CMD_ROMVER: &str = "vn";
pub const CMD_SENSOR_LOG: &str = "et";

/// Action tokens.
pub const ACTION_NONE: &str = "";
pub const ACTION_GET: &str = "?";
pub const ACTION_SET: &str = "s";
pub const ACTION_ADD: &str = "l";
pub const ACTION_DEL: &str = "k";

/// Markers around command and response lines.
pub const MARKER_START: char = '!';
pub const MARKER_END: char = '&';

/// Appended to a response when the base unit reports an error.
pub const RESPONSE_ERROR: &str = "no";

/// Line prefixes for unsolicited messages.
pub const DEVICE_EVENT_PREFIX: &str = "MINPIC=";
pub const UNENROLLED_DEVICE_PREFIX: &str = "XINPIC=";
pub const SWITCH_TRIGGER_FAILED: &str = "X10 ERR";

/// Type of LifeSOS device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DeviceType {
    HumidSensor = 0x01,
    HumidSensor2 = 0x02,
    TempSensor = 0x03,
    TempSensor2 = 0x04,
    FloodDetector = 0x05,
    FloodDetector2 = 0x06,
    MedicalButton = 0x08,
    LightSensor = 0x0a,
    LightDetector = 0x0b,
    InactivityReport = 0x0c,
    AnalogSensor = 0x0e,
    AnalogSensor2 = 0x0f,
    RemoteController = 0x10,
    CardReader = 0x12,
    KeyPad = 0x18,
    XKeyPad = 0x19,
    SmokeDetector = 0x20,
    PressureSensor = 0x22,
    PressureSensor2 = 0x23,
    CODetector = 0x25,
    CO2Sensor = 0x26,
    CO2Sensor2 = 0x27,
    ACCurrentMeter = 0x28,
    ACCurrentMeter2 = 0x29,
    ThreePhaseACMeter = 0x2b,
    GasDetector = 0x30,
    DoorMagnet = 0x40,
    Repeater = 0x41,
    VibrationSensor = 0x42,
    PIRSensor = 0x50,
    StatusIndicator = 0x56,
    Repeater2 = 0x57,
    GlassBreakDetector = 0x60,
    RemoteSiren = 0x70,
    BaseUnit = 0x80,
    RFBell = 0x90,
    RFSW = 0xa0,
    RFSWOnTime = 0xa1,
    RFSiren = 0xc0,
    RFSirenOnTime = 0xc1,
}

impl DeviceType {
    const ALL: [Self; 40] = [
        Self::HumidSensor, Self::HumidSensor2, Self::TempSensor, Self::TempSensor2,
        Self::FloodDetector, Self::FloodDetector2, Self::MedicalButton, Self::LightSensor,
        Self::LightDetector, Self::InactivityReport, Self::AnalogSensor, Self::AnalogSensor2,
        Self::RemoteController, Self::CardReader, Self::KeyPad, Self::XKeyPad,
        Self::SmokeDetector, Self::PressureSensor, Self::PressureSensor2, Self::CODetector,
        Self::CO2Sensor, Self::CO2Sensor2, Self::ACCurrentMeter, Self::ACCurrentMeter2,
        Self::ThreePhaseACMeter, Self::GasDetector, Self::DoorMagnet, Self::Repeater,
        Self::VibrationSensor, Self::PIRSensor, Self::StatusIndicator, Self::Repeater2,
        Self::GlassBreakDetector, Self::RemoteSiren, Self::BaseUnit, Self::RFBell,
        Self::RFSW, Self::RFSWOnTime, Self::RFSiren, Self::RFSirenOnTime,
    ];

    pub fn from_u8(v: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| *t as u8 == v)
    }
}

/// Type of event raised by a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum DeviceEventCode {
    Button = 0x0a01,
    Away = 0x0a10,
    CheckStatus = 0x0a13,
    Disarm = 0x0a14,
    Home = 0x0a18,
    Heartbeat = 0x0a20,
    Reading = 0x0a24,
    PowerOnReset = 0x0a2a,
    BatteryLow = 0x0a30,
    Display = 0x0a33,
    Open = 0x0a40,
    Close = 0x0a48,
    Tamper = 0x0a50,
    Trigger = 0x0a58,
    Panic = 0x0a60,
}

impl DeviceEventCode {
    pub fn from_u16(v: u16) -> Option<Self> {
        match v {
            0x0a01 => Some(Self::Button),
            0x0a10 => Some(Self::Away),
            0x0a13 => Some(Self::CheckStatus),
            0x0a14 => Some(Self::Disarm),
            0x0a18 => Some(Self::Home),
            0x0a20 => Some(Self::Heartbeat),
            0x0a24 => Some(Self::Reading),
            0x0a2a => Some(Self::PowerOnReset),
            0x0a30 => Some(Self::BatteryLow),
            0x0a33 => Some(Self::Display),
            0x0a40 => Some(Self::Open),
            0x0a48 => Some(Self::Close),
            0x0a50 => Some(Self::Tamper),
            0x0a58 => Some(Self::Trigger),
            0x0a60 => Some(Self::Panic),
            _ => None,
        }
    }
}

/// Operating mode of the base unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OperationMode {
    Disarm = 0x0,
    Home = 0x1,
    Away = 0x2,
    Monitor = 0x8,
}

impl OperationMode {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0x0 => Some(Self::Disarm),
            0x1 => Some(Self::Home),
            0x2 => Some(Self::Away),
            0x8 => Some(Self::Monitor),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disarm => "Disarm",
            Self::Home => "Home",
            Self::Away => "Away",
            Self::Monitor => "Monitor",
        }
    }
}

/// Composite state of the base unit: the operating mode plus the two
/// transient delay sub-states of Away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BaseUnitState {
    Disarm = 0x0,
    Home = 0x1,
    Away = 0x2,
    Monitor = 0x8,
    AwayExitDelay = 0x10,
    AwayEntryDelay = 0x11,
}

impl BaseUnitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disarm => "Disarm",
            Self::Home => "Home",
            Self::Away => "Away",
            Self::Monitor => "Monitor",
            Self::AwayExitDelay => "AwayExitDelay",
            Self::AwayEntryDelay => "AwayEntryDelay",
        }
    }
}

impl From<OperationMode> for BaseUnitState {
    fn from(mode: OperationMode) -> Self {
        match mode {
            OperationMode::Disarm => Self::Disarm,
            OperationMode::Home => Self::Home,
            OperationMode::Away => Self::Away,
            OperationMode::Monitor => Self::Monitor,
        }
    }
}

/// Context for the event in a Contact ID message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ContactIdEventQualifier {
    /// New event or opening
    Event = 0x1,
    /// New restore or closing
    Restore = 0x3,
    /// Previously reported condition still present
    Repeat = 0x6,
}

impl ContactIdEventQualifier {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0x1 => Some(Self::Event),
            0x3 => Some(Self::Restore),
            0x6 => Some(Self::Repeat),
            _ => None,
        }
    }
}

/// Category of event in a Contact ID message (high nibble of the event code).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ContactIdEventCategory {
    Alarm = 0x100,
    Supervisory = 0x200,
    Trouble = 0x300,
    OpenCloseAccess = 0x400,
    BypassDisable = 0x500,
    TestMisc = 0x600,
    Automation = 0x900,
}

impl ContactIdEventCategory {
    /// Category of the given event code.
    pub fn of_code(code: u16) -> Option<Self> {
        match code & 0xf00 {
            0x100 => Some(Self::Alarm),
            0x200 => Some(Self::Supervisory),
            0x300 => Some(Self::Trouble),
            0x400 => Some(Self::OpenCloseAccess),
            0x500 => Some(Self::BypassDisable),
            0x600 => Some(Self::TestMisc),
            0x900 => Some(Self::Automation),
            _ => None,
        }
    }
}

/// Event reported in a Contact ID message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ContactIdEventCode {
    // ALARMS
    // Medical Alarms -100
    MedicalAlarm = 0x100,
    PersonalEmergency = 0x101,
    FailToReportIn = 0x102,
    // Fire Alarms -110
    FireAlarm = 0x110,
    SmokeAlarm = 0x111,
    Combustion = 0x112,
    WaterFlow = 0x113,
    Heat = 0x114,
    PullStation = 0x115,
    Duct = 0x116,
    Flame = 0x117,
    NearAlarmFire = 0x118,
    // Panic Alarms -120
    PanicAlarm = 0x120,
    Duress = 0x121,
    Silent = 0x122,
    Audible = 0x123,
    DuressAccessGranted = 0x124,
    DuressEgressGranted = 0x125,
    // Burglar Alarms -130
    BurglarAlarm = 0x130,
    Perimeter = 0x131,
    Interior = 0x132,
    Hour24Burglar = 0x133,
    EntryExit = 0x134,
    DayNight = 0x135,
    Outdoor = 0x136,
    BurglarSensorTampered = 0x137,
    NearAlarmBurglar = 0x138,
    IntrusionVerifier = 0x139,
    // General Alarm -140
    GeneralAlarm = 0x140,
    PollingLoopOpenAlarm = 0x141,
    PollingLoopShortAlarm = 0x142,
    ExpansionModuleFailureAlarm = 0x143,
    KeypadSensorTampered = 0x144,
    ExpansionModuleTamper = 0x145,
    SilentBurglary = 0x146,
    SensorSupervisionFailure = 0x147,
    // 24 Hour Non-Burglary - 150 and 160
    Hour24NonBurglary = 0x150,
    GasDetected = 0x151,
    Refrigeration = 0x152,
    LossOfHeat = 0x153,
    WaterLeakage = 0x154,
    FoilBreak = 0x155,
    DayTrouble = 0x156,
    LowBottledGasLevel = 0x157,
    HighTemp = 0x158,
    LowTemp = 0x159,
    LossOfAirFlow = 0x161,
    CarbonMonoxideDetected = 0x162,
    TankLevel = 0x163,
    HighLimitAlarm = 0x168,
    LowLimitAlarm = 0x169,
    // SUPERVISORY
    // Fire Supervisory - 200 and 210
    FireSupervisory = 0x200,
    LowWaterPressure = 0x201,
    LowCO2 = 0x202,
    GateValveSensor = 0x203,
    LowWaterLevel = 0x204,
    PumpActivated = 0x205,
    PumpFailure = 0x206,
    // TROUBLES
    // System Troubles -300 and 310
    SystemTrouble = 0x300,
    ACPowerLoss = 0x301,
    BaseUnitLowBattery = 0x302,
    RAMChecksumBad = 0x303,
    ROMChecksumBad = 0x304,
    SystemReset = 0x305,
    PanelProgrammingChanged = 0x306,
    SelfTestFailure = 0x307,
    SystemShutdown = 0x308,
    BatteryTestFailure = 0x309,
    GroundFault = 0x310,
    BatteryMissingDead = 0x311,
    PowerSupplyOvercurrent = 0x312,
    EngineerReset = 0x313,
    // Sounder / Relay Troubles -320
    SounderRelay = 0x320,
    Bell1 = 0x321,
    Bell2 = 0x322,
    AlarmRelay = 0x323,
    TroubleRelay = 0x324,
    ReversingRelay = 0x325,
    NotificationApplianceCkt3 = 0x326,
    NotificationApplianceCkt4 = 0x327,
    // System Peripheral Trouble -330 and 340
    SystemPeripheralTrouble = 0x330,
    PollingLoopOpenTrouble = 0x331,
    PollingLoopShortTrouble = 0x332,
    ExpansionModuleFailureTrouble = 0x333,
    RepeaterFailure = 0x334,
    LocalPrinterOutOfPaper = 0x335,
    LocalPrinterFailure = 0x336,
    ExpModuleDCLoss = 0x337,
    ExpModuleLowBatt = 0x338,
    ExpModuleReset = 0x339,
    ExpModuleTamper = 0x341,
    ExpModuleACLoss = 0x342,
    ExpModuleSelfTestFail = 0x343,
    RFReceiverJamDetect = 0x344,
    // Communication Troubles -350 and 360
    CommunicationTrouble = 0x350,
    Telco1Fault = 0x351,
    Telco2Fault = 0x352,
    LongRangeRadioXmitterFault = 0x353,
    CMSReportFail = 0x354,
    LossOfRadioSupervision = 0x355,
    LossOfCMSPolling = 0x356,
    LongRangeRadioVSWRProblem = 0x357,
    // Protection Loop -370
    ProtectionLoop = 0x370,
    ProtectionLoopOpen = 0x371,
    ProtectionLoopShort = 0x372,
    FireTrouble = 0x373,
    ExitErrorAlarm = 0x374,
    PanicZoneTrouble = 0x375,
    HoldUpZoneTrouble = 0x376,
    SwingerTrouble = 0x377,
    CrossZoneTrouble = 0x378,
    // Sensor Trouble -380
    SensorTrouble = 0x380,
    LossOfSupervisionRF = 0x381,
    LossOfSupervisionRPM = 0x382,
    SensorTamper = 0x383,
    RFLowBattery = 0x384,
    SmokeDetectorHiSensitivity = 0x385,
    SmokeDetectorLowSensitivity = 0x386,
    IntrusionDetectorHiSensitivity = 0x387,
    IntrusionDetectorLowSensitivity = 0x388,
    SensorSelfTestFailure = 0x389,
    SensorWatchTrouble = 0x391,
    DriftCompensationError = 0x392,
    MaintenanceAlert = 0x393,
    // OPEN/CLOSE/REMOTE ACCESS
    // Open/Close -400, 440,450
    Away = 0x400,
    OCByUser = 0x401,
    GroupOC = 0x402,
    AutomaticOC = 0x403,
    LateToOC = 0x404,
    DeferredOC = 0x405,
    Cancel = 0x406,
    RemoteArmDisarm = 0x407,
    AwayQuickArm = 0x408,
    KeyswitchOC = 0x409,
    ArmedSTAY = 0x441,
    KeyswitchArmedSTAY = 0x442,
    ExceptionOC = 0x450,
    EarlyOC = 0x451,
    LateOC = 0x452,
    FailedToOpen = 0x453,
    FailedToClose = 0x454,
    AutoArmFailed = 0x455,
    PartialArm = 0x456,
    ExitError = 0x457,
    UserOnPremises = 0x458,
    RecentClose = 0x459,
    WrongCodeEntry = 0x461,
    LegalCodeEntry = 0x462,
    ReArmAfterAlarm = 0x463,
    AutoArmTimeExtended = 0x464,
    PanicAlarmReset = 0x465,
    ServiceOnOffPremises = 0x466,
    // Remote Access -410
    CallbackRequestMade = 0x411,
    SuccessfulDownloadAccess = 0x412,
    UnsuccessfulAccess = 0x413,
    SystemShutdownCommandReceived = 0x414,
    DialerShutdownCommandReceived = 0x415,
    SuccessfulUpload = 0x416,
    // Access control -420,430
    AccessDenied = 0x421,
    AccessReportByUser = 0x422,
    ForcedAccess = 0x423,
    EgressDenied = 0x424,
    EgressGranted = 0x425,
    AccessDoorProppedOpen = 0x426,
    AccessPointDoorStatusMonitorTrouble = 0x427,
    AccessPointRequestToExitTrouble = 0x428,
    AccessProgramModeEntry = 0x429,
    AccessProgramModeExit = 0x430,
    AccessThreatLevelChange = 0x431,
    AccessRelayTriggerFail = 0x432,
    AccessRTEShunt = 0x433,
    AccessDSMShunt = 0x434,
    // BYPASSES / DISABLES
    // System Disables -500 and 510
    AccessReaderDisable = 0x501,
    // Sounder / Relay Disables -520
    SounderRelayDisable = 0x520,
    Bell1Disable = 0x521,
    Bell2Disable = 0x522,
    AlarmRelayDisable = 0x523,
    TroubleRelayDisable = 0x524,
    ReversingRelayDisable = 0x525,
    NotificationApplianceCkt3Disable = 0x526,
    NotificationApplianceCkt4Disable = 0x527,
    // System Peripheral Disables -530 and 540
    ModuleAdded = 0x531,
    ModuleRemoved = 0x532,
    // Communication Disables -550 and 560
    DialerDisabled = 0x551,
    RadioTransmitterDisabled = 0x552,
    RemoteUploadDownloadDisabled = 0x553,
    // Bypasses -570
    ZoneSensorBypass = 0x570,
    FireBypass = 0x571,
    Hour24ZoneBypass = 0x572,
    Disarm = 0x573,
    Home = 0x574,
    SwingerBypass = 0x575,
    AccessZoneShunt = 0x576,
    AccessPointBypass = 0x577,
    // TEST / MISC.
    // Test/Misc. -600, 610
    ManualTriggerTestReport = 0x601,
    PeriodicTestReport = 0x602,
    PeriodicRFTransmission = 0x603,
    FireTest = 0x604,
    StatusReportToFollow = 0x605,
    TwoWayVoice = 0x606,
    WalkTestMode = 0x607,
    PeriodicTestSystemTroublePresent = 0x608,
    VideoXmitterActive = 0x609,
    PointTestedOK = 0x611,
    PointNotTested = 0x612,
    IntrusionZoneWalkTested = 0x613,
    FireZoneWalkTested = 0x614,
    PanicZoneWalkTested = 0x615,
    ServiceRequest = 0x616,
    MotionStop = 0x617,
    TriggerMonitor = 0x618,
    MonitorMode = 0x619,
    // Event Log -620
    EventLogReset = 0x621,
    EventLog50PctFull = 0x622,
    EventLog90PctFull = 0x623,
    EventLogOverflow = 0x624,
    TimeDateReset = 0x625,
    TimeDateInaccurate = 0x626,
    ProgramModeEntry = 0x627,
    ProgramModeExit = 0x628,
    Hour32EventLogMarker = 0x629,
    // Scheduling -630
    ScheduleChange = 0x630,
    ExceptionScheduleChange = 0x631,
    AccessScheduleChange = 0x632,
    // Personnel Monitoring -640
    InactivityAlarm = 0x641,
    LatchKeySupervision = 0x642,
    DoorOpenMonitor = 0x648,
    DoorCloseMonitor = 0x649,
    // Misc. -650
    ReservedForAdemcoUse = 0x651,
    ReservedForAdemcoUse2 = 0x652,
    ReservedForAdemcoUse3 = 0x653,
    SystemInactivity = 0x654,
    SystemClear = 0x659,
    SwitchOnOff = 0x901,
    HighLimitOperation = 0x912,
    LowLimitOperation = 0x913,
}

impl ContactIdEventCode {
    const ALL: [Self; 236] = [
        Self::MedicalAlarm, Self::PersonalEmergency, Self::FailToReportIn, Self::FireAlarm,
        Self::SmokeAlarm, Self::Combustion, Self::WaterFlow, Self::Heat,
        Self::PullStation, Self::Duct, Self::Flame, Self::NearAlarmFire,
        Self::PanicAlarm, Self::Duress, Self::Silent, Self::Audible,
        Self::DuressAccessGranted, Self::DuressEgressGranted, Self::BurglarAlarm, Self::Perimeter,
        Self::Interior, Self::Hour24Burglar, Self::EntryExit, Self::DayNight,
        Self::Outdoor, Self::BurglarSensorTampered, Self::NearAlarmBurglar, Self::IntrusionVerifier,
        Self::GeneralAlarm, Self::PollingLoopOpenAlarm, Self::PollingLoopShortAlarm, Self::ExpansionModuleFailureAlarm,
        Self::KeypadSensorTampered, Self::ExpansionModuleTamper, Self::SilentBurglary, Self::SensorSupervisionFailure,
        Self::Hour24NonBurglary, Self::GasDetected, Self::Refrigeration, Self::LossOfHeat,
        Self::WaterLeakage, Self::FoilBreak, Self::DayTrouble, Self::LowBottledGasLevel,
        Self::HighTemp, Self::LowTemp, Self::LossOfAirFlow, Self::CarbonMonoxideDetected,
        Self::TankLevel, Self::HighLimitAlarm, Self::LowLimitAlarm, Self::FireSupervisory,
        Self::LowWaterPressure, Self::LowCO2, Self::GateValveSensor, Self::LowWaterLevel,
        Self::PumpActivated, Self::PumpFailure, Self::SystemTrouble, Self::ACPowerLoss,
        Self::BaseUnitLowBattery, Self::RAMChecksumBad, Self::ROMChecksumBad, Self::SystemReset,
        Self::PanelProgrammingChanged, Self::SelfTestFailure, Self::SystemShutdown, Self::BatteryTestFailure,
        Self::GroundFault, Self::BatteryMissingDead, Self::PowerSupplyOvercurrent, Self::EngineerReset,
        Self::SounderRelay, Self::Bell1, Self::Bell2, Self::AlarmRelay,
        Self::TroubleRelay, Self::ReversingRelay, Self::NotificationApplianceCkt3, Self::NotificationApplianceCkt4,
        Self::SystemPeripheralTrouble, Self::PollingLoopOpenTrouble, Self::PollingLoopShortTrouble, Self::ExpansionModuleFailureTrouble,
        Self::RepeaterFailure, Self::LocalPrinterOutOfPaper, Self::LocalPrinterFailure, Self::ExpModuleDCLoss,
        Self::ExpModuleLowBatt, Self::ExpModuleReset, Self::ExpModuleTamper, Self::ExpModuleACLoss,
        Self::ExpModuleSelfTestFail, Self::RFReceiverJamDetect, Self::CommunicationTrouble, Self::Telco1Fault,
        Self::Telco2Fault, Self::LongRangeRadioXmitterFault, Self::CMSReportFail, Self::LossOfRadioSupervision,
        Self::LossOfCMSPolling, Self::LongRangeRadioVSWRProblem, Self::ProtectionLoop, Self::ProtectionLoopOpen,
        Self::ProtectionLoopShort, Self::FireTrouble, Self::ExitErrorAlarm, Self::PanicZoneTrouble,
        Self::HoldUpZoneTrouble, Self::SwingerTrouble, Self::CrossZoneTrouble, Self::SensorTrouble,
        Self::LossOfSupervisionRF, Self::LossOfSupervisionRPM, Self::SensorTamper, Self::RFLowBattery,
        Self::SmokeDetectorHiSensitivity, Self::SmokeDetectorLowSensitivity, Self::IntrusionDetectorHiSensitivity, Self::IntrusionDetectorLowSensitivity,
        Self::SensorSelfTestFailure, Self::SensorWatchTrouble, Self::DriftCompensationError, Self::MaintenanceAlert,
        Self::Away, Self::OCByUser, Self::GroupOC, Self::AutomaticOC,
        Self::LateToOC, Self::DeferredOC, Self::Cancel, Self::RemoteArmDisarm,
        Self::AwayQuickArm, Self::KeyswitchOC, Self::ArmedSTAY, Self::KeyswitchArmedSTAY,
        Self::ExceptionOC, Self::EarlyOC, Self::LateOC, Self::FailedToOpen,
        Self::FailedToClose, Self::AutoArmFailed, Self::PartialArm, Self::ExitError,
        Self::UserOnPremises, Self::RecentClose, Self::WrongCodeEntry, Self::LegalCodeEntry,
        Self::ReArmAfterAlarm, Self::AutoArmTimeExtended, Self::PanicAlarmReset, Self::ServiceOnOffPremises,
        Self::CallbackRequestMade, Self::SuccessfulDownloadAccess, Self::UnsuccessfulAccess, Self::SystemShutdownCommandReceived,
        Self::DialerShutdownCommandReceived, Self::SuccessfulUpload, Self::AccessDenied, Self::AccessReportByUser,
        Self::ForcedAccess, Self::EgressDenied, Self::EgressGranted, Self::AccessDoorProppedOpen,
        Self::AccessPointDoorStatusMonitorTrouble, Self::AccessPointRequestToExitTrouble, Self::AccessProgramModeEntry, Self::AccessProgramModeExit,
        Self::AccessThreatLevelChange, Self::AccessRelayTriggerFail, Self::AccessRTEShunt, Self::AccessDSMShunt,
        Self::AccessReaderDisable, Self::SounderRelayDisable, Self::Bell1Disable, Self::Bell2Disable,
        Self::AlarmRelayDisable, Self::TroubleRelayDisable, Self::ReversingRelayDisable, Self::NotificationApplianceCkt3Disable,
        Self::NotificationApplianceCkt4Disable, Self::ModuleAdded, Self::ModuleRemoved, Self::DialerDisabled,
        Self::RadioTransmitterDisabled, Self::RemoteUploadDownloadDisabled, Self::ZoneSensorBypass, Self::FireBypass,
        Self::Hour24ZoneBypass, Self::Disarm, Self::Home, Self::SwingerBypass,
        Self::AccessZoneShunt, Self::AccessPointBypass, Self::ManualTriggerTestReport, Self::PeriodicTestReport,
        Self::PeriodicRFTransmission, Self::FireTest, Self::StatusReportToFollow, Self::TwoWayVoice,
        Self::WalkTestMode, Self::PeriodicTestSystemTroublePresent, Self::VideoXmitterActive, Self::PointTestedOK,
        Self::PointNotTested, Self::IntrusionZoneWalkTested, Self::FireZoneWalkTested, Self::PanicZoneWalkTested,
        Self::ServiceRequest, Self::MotionStop, Self::TriggerMonitor, Self::MonitorMode,
        Self::EventLogReset, Self::EventLog50PctFull, Self::EventLog90PctFull, Self::EventLogOverflow,
        Self::TimeDateReset, Self::TimeDateInaccurate, Self::ProgramModeEntry, Self::ProgramModeExit,
        Self::Hour32EventLogMarker, Self::ScheduleChange, Self::ExceptionScheduleChange, Self::AccessScheduleChange,
        Self::InactivityAlarm, Self::LatchKeySupervision, Self::DoorOpenMonitor, Self::DoorCloseMonitor,
        Self::ReservedForAdemcoUse, Self::ReservedForAdemcoUse2, Self::ReservedForAdemcoUse3, Self::SystemInactivity,
        Self::SystemClear, Self::SwitchOnOff, Self::HighLimitOperation, Self::LowLimitOperation,
    ];

    pub fn from_u16(v: u16) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| *c as u16 == v)
    }
}

/// Contact ID message type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageType {
    Preferred = 0x18,
    Optional = 0x98,
}

impl MessageType {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0x18 => Some(Self::Preferred),
            0x98 => Some(Self::Optional),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_type_lookup() {
        assert_eq!(DeviceType::from_u8(0x40), Some(DeviceType::DoorMagnet));
        assert_eq!(DeviceType::from_u8(0x50), Some(DeviceType::PIRSensor));
        assert_eq!(DeviceType::from_u8(0x07), None);
    }

    #[test]
    fn test_contact_id_code_lookup() {
        assert_eq!(
            ContactIdEventCode::from_u16(0x602),
            Some(ContactIdEventCode::PeriodicTestReport)
        );
        assert_eq!(
            ContactIdEventCode::from_u16(0x408),
            Some(ContactIdEventCode::AwayQuickArm)
        );
        assert_eq!(
            ContactIdEventCode::from_u16(0x913),
            Some(ContactIdEventCode::LowLimitOperation)
        );
        assert_eq!(ContactIdEventCode::from_u16(0x999), None);
    }

    #[test]
    fn test_event_category_of_code() {
        assert_eq!(
            ContactIdEventCategory::of_code(0x384),
            Some(ContactIdEventCategory::Trouble)
        );
        assert_eq!(
            ContactIdEventCategory::of_code(0x130),
            Some(ContactIdEventCategory::Alarm)
        );
        assert_eq!(ContactIdEventCategory::of_code(0x700), None);
    }

    #[test]
    fn test_state_from_mode() {
        assert_eq!(BaseUnitState::from(OperationMode::Monitor), BaseUnitState::Monitor);
        assert_eq!(BaseUnitState::AwayEntryDelay as u8, 0x11);
        assert_eq!(OperationMode::from_u8(8), Some(OperationMode::Monitor));
        assert_eq!(OperationMode::from_u8(3), None);
    }
}
