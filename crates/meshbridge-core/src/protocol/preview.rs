//! Portnum -> payload decoder table used for human-readable log previews.
//!
//! Previews have no effect on forwarding. Unknown portnums and payloads that
//! fail their portnum-specific decode degrade to a hex preview.

use prost::Message;

use super::apps::{Position, Routing, RouteDiscovery, Telemetry, User, Waypoint};
use super::portnum::PortNum;

/// Longest preview emitted, in chars.
pub const MAX_PREVIEW_CHARS: usize = 200;

/// Decoder capability: render a payload, or `None` if it does not parse.
pub type PreviewFn = fn(&[u8]) -> Option<String>;

fn text(b: &[u8]) -> Option<String> {
    Some(String::from_utf8_lossy(b).into_owned())
}

fn record<M: Message + Default>(b: &[u8]) -> Option<String> {
    M::decode(b).ok().map(|m| format!("{m:?}"))
}

/// Look up the decoder for a portnum.
pub fn decoder_for(port: PortNum) -> Option<PreviewFn> {
    let f: PreviewFn = match port {
        PortNum::TextMessageApp | PortNum::RangeTestApp | PortNum::DetectionSensorApp => text,
        PortNum::NodeinfoApp => record::<User>,
        PortNum::PositionApp => record::<Position>,
        PortNum::RoutingApp => record::<Routing>,
        PortNum::TracerouteApp => record::<RouteDiscovery>,
        PortNum::WaypointApp => record::<Waypoint>,
        PortNum::TelemetryApp => record::<Telemetry>,
        _ => return None,
    };
    Some(f)
}

/// Render a payload for logs. Never fails.
pub fn preview(portnum: i32, payload: &[u8]) -> String {
    let rendered = PortNum::from_i32(portnum)
        .and_then(decoder_for)
        .and_then(|f| f(payload))
        .unwrap_or_else(|| hex::encode(payload));
    truncate_chars(rendered, MAX_PREVIEW_CHARS)
}

fn truncate_chars(s: String, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}…", &s[..idx]),
        None => s,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn text_is_utf8() {
        assert_eq!(preview(1, "héllo".as_bytes()), "héllo");
    }

    #[test]
    fn nodeinfo_is_structured() {
        let u = User {
            long_name: "Base Station".into(),
            short_name: "BS".into(),
            ..Default::default()
        };
        let p = preview(4, &u.encode_to_vec());
        assert!(p.contains("long_name: \"Base Station\""), "{p}");
    }

    #[test]
    fn unknown_port_falls_back_to_hex() {
        assert_eq!(preview(300, &[0xde, 0xad]), "dead");
        assert_eq!(preview(6, &[0x01, 0x02]), "0102");
    }

    #[test]
    fn undecodable_record_falls_back_to_hex() {
        // truncated length-delimited field
        assert_eq!(preview(4, &[0x12, 0x09, 0x41]), "120941");
    }

    #[test]
    fn long_previews_are_cut() {
        let p = preview(1, "x".repeat(500).as_bytes());
        assert_eq!(p.chars().count(), MAX_PREVIEW_CHARS + 1);
    }
}
