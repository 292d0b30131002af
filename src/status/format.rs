//! Display helpers for worker network counters.

use super::types::NetworkStats;

/// Latency above this is highlighted.
pub const HIGH_LATENCY_MS: f64 = 100.0;

const BYTE_UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// Human-readable byte count using 1024 steps, one decimal, trailing `.0` dropped.
///
/// ```
/// use dllama::status::format_bytes;
///
/// assert_eq!(format_bytes(0), "0 B");
/// assert_eq!(format_bytes(1536), "1.5 KB");
/// assert_eq!(format_bytes(1048576), "1 MB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut unit = 0;
    let mut scale = 1u64;
    while unit < BYTE_UNITS.len() - 1 && bytes >= scale * 1024 {
        scale *= 1024;
        unit += 1;
    }

    let value = ((bytes as f64 / scale as f64) * 10.0).round() / 10.0;
    format!("{} {}", value, BYTE_UNITS[unit])
}

/// `"12.3 ms"`, or `"N/A"` when there is no measurement.
pub fn latency_label(latency_ms: f64) -> String {
    if latency_ms > 0.0 {
        format!("{:.1} ms", latency_ms)
    } else {
        "N/A".to_string()
    }
}

pub fn is_latency_high(latency_ms: f64) -> bool {
    latency_ms > HIGH_LATENCY_MS
}

/// `"N packets"`, or `"None"` when nothing was dropped.
pub fn packet_loss_label(stats: &NetworkStats) -> String {
    match stats.packet_loss() {
        0 => "None".to_string(),
        n => format!("{} packets", n),
    }
}

/// `"<recv> in / <sent> out"`.
pub fn network_io_label(stats: &NetworkStats) -> String {
    format!(
        "{} in / {} out",
        format_bytes(stats.bytes_recv),
        format_bytes(stats.bytes_sent)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes_units() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1), "1 B");
        assert_eq!(format_bytes(1023), "1023 B");
        assert_eq!(format_bytes(1024), "1 KB");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024 + 300 * 1024), "5.3 MB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3 GB");
    }

    #[test]
    fn test_format_bytes_caps_at_gb() {
        assert_eq!(format_bytes(2 * 1024u64.pow(4)), "2048 GB");
    }

    #[test]
    fn test_latency_label() {
        assert_eq!(latency_label(12.345), "12.3 ms");
        assert_eq!(latency_label(0.0), "N/A");
        assert_eq!(latency_label(-1.0), "N/A");
    }

    #[test]
    fn test_latency_threshold() {
        assert!(!is_latency_high(100.0));
        assert!(is_latency_high(100.1));
    }

    #[test]
    fn test_packet_loss_label() {
        assert_eq!(packet_loss_label(&NetworkStats::default()), "None");
        let stats = NetworkStats {
            dropin: 2,
            dropout: 3,
            ..Default::default()
        };
        assert_eq!(packet_loss_label(&stats), "5 packets");
    }

    #[test]
    fn test_network_io_label() {
        let stats = NetworkStats {
            bytes_recv: 2048,
            bytes_sent: 0,
            ..Default::default()
        };
        assert_eq!(network_io_label(&stats), "2 KB in / 0 B out");
    }
}
