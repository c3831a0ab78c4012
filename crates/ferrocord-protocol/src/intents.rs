//! Intents capability bitmask
//!
//! Client-declared subscription set controlling which event categories the
//! server delivers over the gateway.

use bitflags::bitflags;

bitflags! {
    /// Gateway intents bitmask
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Intents: u64 {
        const GUILDS = 1 << 0;
        const GUILD_MEMBERS = 1 << 1;
        const GUILD_MESSAGES = 1 << 9;
        const GUILD_MESSAGE_REACTIONS = 1 << 10;
        const DIRECT_MESSAGES = 1 << 12;
        const MESSAGE_CONTENT = 1 << 15;
    }
}

impl Default for Intents {
    /// Guild and guild-message events, the minimum for a message bot
    fn default() -> Self {
        Self::GUILDS | Self::GUILD_MESSAGES
    }
}
