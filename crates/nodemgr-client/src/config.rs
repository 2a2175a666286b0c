use std::time::Duration;

use nodemgr_envelope::ReplyPolicy;
use nodemgr_frame::{FrameConfig, DEFAULT_MAX_PAYLOAD};

/// Default bound on a single round trip.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Per-client configuration. Fixed for the lifetime of a client instance.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// How long `call` waits for a reply. Also bounds TCP connect and a
    /// stalled partial reply.
    pub timeout: Duration,
    /// Which reply codes count as success.
    pub reply_policy: ReplyPolicy,
    /// Largest request or reply payload accepted on the channel.
    pub max_payload_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            reply_policy: ReplyPolicy::default(),
            max_payload_size: DEFAULT_MAX_PAYLOAD,
        }
    }
}

impl ClientConfig {
    /// Frame settings for a channel opened with this configuration.
    pub fn frame_config(&self) -> FrameConfig {
        FrameConfig {
            max_payload_size: self.max_payload_size,
            read_timeout: Some(self.timeout),
            write_timeout: Some(self.timeout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.reply_policy.success_codes(), &[200, 204]);
        assert_eq!(config.max_payload_size, DEFAULT_MAX_PAYLOAD);
    }

    #[test]
    fn frame_config_inherits_timeout() {
        let config = ClientConfig {
            timeout: Duration::from_millis(250),
            max_payload_size: 4096,
            ..ClientConfig::default()
        };
        let frame = config.frame_config();
        assert_eq!(frame.max_payload_size, 4096);
        assert_eq!(frame.read_timeout, Some(Duration::from_millis(250)));
        assert_eq!(frame.write_timeout, Some(Duration::from_millis(250)));
    }
}
