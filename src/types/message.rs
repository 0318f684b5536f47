//! The message envelope that wraps a component list on the wire.
//!
//! Discord only renders Components v2 layouts when the message carries the
//! `IS_COMPONENTS_V2` flag (bit 7). That bit is a protocol constant, not a
//! setting.

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::types::component::Component;

bitflags! {
    /// Message flags relevant to component messages.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MessageFlags: u64 {
        const SUPPRESS_EMBEDS = 1 << 2;
        const EPHEMERAL = 1 << 6;
        const IS_COMPONENTS_V2 = 1 << 7;
    }
}

impl Default for MessageFlags {
    fn default() -> Self {
        Self::IS_COMPONENTS_V2
    }
}

// Discord transmits flags as a plain integer; unknown bits are preserved.
impl Serialize for MessageFlags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.bits())
    }
}

impl<'de> Deserialize<'de> for MessageFlags {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self::from_bits_retain(u64::deserialize(deserializer)?))
    }
}

/// `{ "components": [...], "flags": 128 }`
///
/// ```ignore
/// let message = DiscordMessage::new(components);
/// assert!(message.flags.contains(MessageFlags::IS_COMPONENTS_V2));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscordMessage {
    pub components: Vec<Component>,
    #[serde(default)]
    pub flags: MessageFlags,
}

impl DiscordMessage {
    /// Wrap `components` with the Components v2 flag set.
    pub fn new(components: Vec<Component>) -> Self {
        Self {
            components,
            flags: MessageFlags::IS_COMPONENTS_V2,
        }
    }

    /// Append a root component.
    pub fn component(mut self, component: Component) -> Self {
        self.components.push(component);
        self
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
