//! Application port table (`portnums.proto`).

/// Application-level payload discriminant carried in [`crate::protocol::Data`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum PortNum {
    UnknownApp = 0,
    TextMessageApp = 1,
    RemoteHardwareApp = 2,
    PositionApp = 3,
    NodeinfoApp = 4,
    RoutingApp = 5,
    AdminApp = 6,
    TextMessageCompressedApp = 7,
    WaypointApp = 8,
    AudioApp = 9,
    DetectionSensorApp = 10,
    ReplyApp = 32,
    IpTunnelApp = 33,
    PaxcounterApp = 34,
    SerialApp = 64,
    StoreForwardApp = 65,
    RangeTestApp = 66,
    TelemetryApp = 67,
    ZpsApp = 68,
    SimulatorApp = 69,
    TracerouteApp = 70,
    NeighborinfoApp = 71,
    AtakPlugin = 72,
    MapReportApp = 73,
    PowerstressApp = 74,
    PrivateApp = 256,
    AtakForwarder = 257,
    Max = 511,
}

const ALL: [PortNum; 28] = [
    PortNum::UnknownApp,
    PortNum::TextMessageApp,
    PortNum::RemoteHardwareApp,
    PortNum::PositionApp,
    PortNum::NodeinfoApp,
    PortNum::RoutingApp,
    PortNum::AdminApp,
    PortNum::TextMessageCompressedApp,
    PortNum::WaypointApp,
    PortNum::AudioApp,
    PortNum::DetectionSensorApp,
    PortNum::ReplyApp,
    PortNum::IpTunnelApp,
    PortNum::PaxcounterApp,
    PortNum::SerialApp,
    PortNum::StoreForwardApp,
    PortNum::RangeTestApp,
    PortNum::TelemetryApp,
    PortNum::ZpsApp,
    PortNum::SimulatorApp,
    PortNum::TracerouteApp,
    PortNum::NeighborinfoApp,
    PortNum::AtakPlugin,
    PortNum::MapReportApp,
    PortNum::PowerstressApp,
    PortNum::PrivateApp,
    PortNum::AtakForwarder,
    PortNum::Max,
];

impl PortNum {
    /// Largest valid portnum value.
    pub const MAX_VALUE: i32 = 511;

    /// Look up a known portnum.
    pub fn from_i32(v: i32) -> Option<Self> {
        ALL.iter().copied().find(|p| *p as i32 == v)
    }

    /// Canonical protobuf name (e.g. `TEXT_MESSAGE_APP`).
    pub fn as_str(self) -> &'static str {
        match self {
            PortNum::UnknownApp => "UNKNOWN_APP",
            PortNum::TextMessageApp => "TEXT_MESSAGE_APP",
            PortNum::RemoteHardwareApp => "REMOTE_HARDWARE_APP",
            PortNum::PositionApp => "POSITION_APP",
            PortNum::NodeinfoApp => "NODEINFO_APP",
            PortNum::RoutingApp => "ROUTING_APP",
            PortNum::AdminApp => "ADMIN_APP",
            PortNum::TextMessageCompressedApp => "TEXT_MESSAGE_COMPRESSED_APP",
            PortNum::WaypointApp => "WAYPOINT_APP",
            PortNum::AudioApp => "AUDIO_APP",
            PortNum::DetectionSensorApp => "DETECTION_SENSOR_APP",
            PortNum::ReplyApp => "REPLY_APP",
            PortNum::IpTunnelApp => "IP_TUNNEL_APP",
            PortNum::PaxcounterApp => "PAXCOUNTER_APP",
            PortNum::SerialApp => "SERIAL_APP",
            PortNum::StoreForwardApp => "STORE_FORWARD_APP",
            PortNum::RangeTestApp => "RANGE_TEST_APP",
            PortNum::TelemetryApp => "TELEMETRY_APP",
            PortNum::ZpsApp => "ZPS_APP",
            PortNum::SimulatorApp => "SIMULATOR_APP",
            PortNum::TracerouteApp => "TRACEROUTE_APP",
            PortNum::NeighborinfoApp => "NEIGHBORINFO_APP",
            PortNum::AtakPlugin => "ATAK_PLUGIN",
            PortNum::MapReportApp => "MAP_REPORT_APP",
            PortNum::PowerstressApp => "POWERSTRESS_APP",
            PortNum::PrivateApp => "PRIVATE_APP",
            PortNum::AtakForwarder => "ATAK_FORWARDER",
            PortNum::Max => "MAX",
        }
    }

    /// Display name for a raw portnum, falling back to `UNKNOWN(<n>)`.
    pub fn name_of(v: i32) -> String {
        match Self::from_i32(v) {
            Some(p) => p.as_str().to_string(),
            None => format!("UNKNOWN({v})"),
        }
    }
}
