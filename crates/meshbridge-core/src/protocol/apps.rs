//! Application payload records, decoded for log previews and the node-info
//! nickname rewrite. Forwarding never depends on these decoding successfully.

use prost::Message;

/// Longest `User::long_name` the firmware accepts, in bytes.
pub const LONG_NAME_MAX_BYTES: usize = 39;

/// `NODEINFO_APP` payload.
#[derive(Clone, PartialEq, Message)]
pub struct User {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub long_name: String,
    #[prost(string, tag = "3")]
    pub short_name: String,
    #[prost(bytes = "vec", tag = "4")]
    pub macaddr: Vec<u8>,
    #[prost(int32, tag = "5")]
    pub hw_model: i32,
    #[prost(bool, tag = "6")]
    pub is_licensed: bool,
    #[prost(int32, tag = "7")]
    pub role: i32,
    #[prost(bytes = "vec", tag = "8")]
    pub public_key: Vec<u8>,
    #[prost(bool, optional, tag = "9")]
    pub is_unmessagable: Option<bool>,
}

/// `POSITION_APP` payload (subset).
#[derive(Clone, PartialEq, Message)]
pub struct Position {
    #[prost(sfixed32, optional, tag = "1")]
    pub latitude_i: Option<i32>,
    #[prost(sfixed32, optional, tag = "2")]
    pub longitude_i: Option<i32>,
    #[prost(int32, optional, tag = "3")]
    pub altitude: Option<i32>,
    #[prost(fixed32, tag = "4")]
    pub time: u32,
    #[prost(int32, tag = "5")]
    pub location_source: i32,
    #[prost(uint32, tag = "19")]
    pub sats_in_view: u32,
    #[prost(uint32, tag = "23")]
    pub precision_bits: u32,
}

/// Hop list carried by routing replies and `TRACEROUTE_APP`.
#[derive(Clone, PartialEq, Message)]
pub struct RouteDiscovery {
    #[prost(fixed32, repeated, tag = "1")]
    pub route: Vec<u32>,
    #[prost(int32, repeated, tag = "2")]
    pub snr_towards: Vec<i32>,
    #[prost(fixed32, repeated, tag = "3")]
    pub route_back: Vec<u32>,
    #[prost(int32, repeated, tag = "4")]
    pub snr_back: Vec<i32>,
}

/// `ROUTING_APP` payload.
#[derive(Clone, PartialEq, Message)]
pub struct Routing {
    #[prost(oneof = "RoutingVariant", tags = "1, 2, 3")]
    pub variant: Option<RoutingVariant>,
}

#[derive(Clone, PartialEq, prost::Oneof)]
pub enum RoutingVariant {
    #[prost(message, tag = "1")]
    RouteRequest(RouteDiscovery),
    #[prost(message, tag = "2")]
    RouteReply(RouteDiscovery),
    #[prost(int32, tag = "3")]
    ErrorReason(i32),
}

/// `WAYPOINT_APP` payload.
#[derive(Clone, PartialEq, Message)]
pub struct Waypoint {
    #[prost(uint32, tag = "1")]
    pub id: u32,
    #[prost(sfixed32, optional, tag = "2")]
    pub latitude_i: Option<i32>,
    #[prost(sfixed32, optional, tag = "3")]
    pub longitude_i: Option<i32>,
    #[prost(uint32, tag = "4")]
    pub expire: u32,
    #[prost(uint32, tag = "5")]
    pub locked_to: u32,
    #[prost(string, tag = "6")]
    pub name: String,
    #[prost(string, tag = "7")]
    pub description: String,
    #[prost(fixed32, tag = "8")]
    pub icon: u32,
}

/// `TELEMETRY_APP` payload (device and environment variants only).
#[derive(Clone, PartialEq, Message)]
pub struct Telemetry {
    #[prost(fixed32, tag = "1")]
    pub time: u32,
    #[prost(oneof = "TelemetryVariant", tags = "2, 3")]
    pub variant: Option<TelemetryVariant>,
}

#[derive(Clone, PartialEq, prost::Oneof)]
pub enum TelemetryVariant {
    #[prost(message, tag = "2")]
    DeviceMetrics(DeviceMetrics),
    #[prost(message, tag = "3")]
    EnvironmentMetrics(EnvironmentMetrics),
}

#[derive(Clone, PartialEq, Message)]
pub struct DeviceMetrics {
    #[prost(uint32, optional, tag = "1")]
    pub battery_level: Option<u32>,
    #[prost(float, optional, tag = "2")]
    pub voltage: Option<f32>,
    #[prost(float, optional, tag = "3")]
    pub channel_utilization: Option<f32>,
    #[prost(float, optional, tag = "4")]
    pub air_util_tx: Option<f32>,
    #[prost(uint32, optional, tag = "5")]
    pub uptime_seconds: Option<u32>,
}

#[derive(Clone, PartialEq, Message)]
pub struct EnvironmentMetrics {
    #[prost(float, optional, tag = "1")]
    pub temperature: Option<f32>,
    #[prost(float, optional, tag = "2")]
    pub relative_humidity: Option<f32>,
    #[prost(float, optional, tag = "3")]
    pub barometric_pressure: Option<f32>,
}

impl User {
    /// Append `nickname` to the long name unless it already appears there.
    ///
    /// Returns `true` when the name changed. The original part is cut on a
    /// char boundary so the result stays within [`LONG_NAME_MAX_BYTES`].
    pub fn tag_long_name(&mut self, nickname: &str) -> bool {
        let nickname = nickname.trim();
        if nickname.is_empty() || self.long_name.contains(nickname) {
            return false;
        }

        let suffix = format!(" {nickname}");
        let budget = LONG_NAME_MAX_BYTES.saturating_sub(suffix.len());
        let mut base = self.long_name.trim_end();
        if base.len() > budget {
            let mut cut = budget;
            while cut > 0 && !base.is_char_boundary(cut) {
                cut -= 1;
            }
            base = base[..cut].trim_end();
        }

        let tagged = format!("{base}{suffix}");
        // a nickname longer than the whole budget is cut as well
        let mut end = tagged.len().min(LONG_NAME_MAX_BYTES);
        while end > 0 && !tagged.is_char_boundary(end) {
            end -= 1;
        }
        self.long_name = tagged[..end].trim_start().to_string();
        true
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    fn user(long: &str) -> User {
        User {
            id: "!a1b2c3d4".into(),
            long_name: long.into(),
            short_name: "ab".into(),
            ..Default::default()
        }
    }

    #[test]
    fn tag_appends_once() {
        let mut u = user("Base Station");
        assert!(u.tag_long_name("LF"));
        assert_eq!(u.long_name, "Base Station LF");
        assert!(!u.tag_long_name("LF"));
        assert_eq!(u.long_name, "Base Station LF");
    }

    #[test]
    fn tag_respects_length_limit() {
        let mut u = user("A very long node name that fills it up!");
        assert_eq!(u.long_name.len(), 39);
        assert!(u.tag_long_name("MF"));
        assert!(u.long_name.len() <= LONG_NAME_MAX_BYTES);
        assert!(u.long_name.ends_with(" MF"));
    }

    #[test]
    fn tag_cuts_on_char_boundary() {
        let mut u = user("ÄÄÄÄÄÄÄÄÄÄÄÄÄÄÄÄÄÄÄ");
        assert!(u.tag_long_name("SF"));
        assert!(u.long_name.len() <= LONG_NAME_MAX_BYTES);
        assert!(u.long_name.ends_with(" SF"));
    }

    #[test]
    fn tagging_keeps_other_user_fields() {
        let mut u = User {
            hw_model: 43,
            role: 2,
            public_key: vec![7; 32],
            is_unmessagable: Some(true),
            ..user("Base")
        };
        assert!(u.tag_long_name("LF"));
        let back = User::decode(u.encode_to_vec().as_slice()).unwrap();
        assert_eq!(back.long_name, "Base LF");
        assert_eq!(back.is_unmessagable, Some(true));
        assert_eq!((back.hw_model, back.role, back.public_key.len()), (43, 2, 32));
    }

    #[test]
    fn empty_nickname_is_noop() {
        let mut u = user("Node");
        assert!(!u.tag_long_name("  "));
        assert_eq!(u.long_name, "Node");
    }

    #[test]
    fn route_discovery_decodes() {
        let rd = RouteDiscovery {
            route: vec![0x1111_1111, 0x2222_2222],
            snr_towards: vec![20, -8],
            ..Default::default()
        };
        let back = RouteDiscovery::decode(rd.encode_to_vec().as_slice()).unwrap();
        assert_eq!(back.route.len(), 2);
        assert_eq!(back.snr_towards, vec![20, -8]);
    }
}
