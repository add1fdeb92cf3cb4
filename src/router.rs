//! Channel selection per recipient.
//!
//! The router is a pure decision: given an alert and a recipient's
//! preferences, which channels should carry the notification. It never looks
//! at transports or addresses beyond presence checks.

use serde::{Deserialize, Serialize};

use crate::{Alert, Severity, config};

/// A notification channel.
///
/// Adding a channel means adding one adapter implementation and one variant
/// here; nothing in the router or coordinator branches on concrete channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Sms,
    Email,
    Push,
    Messenger,
}

impl Channel {
    pub const ALL: [Channel; 4] = [Channel::Sms, Channel::Email, Channel::Push, Channel::Messenger];
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Channel::Sms => "sms",
            Channel::Email => "email",
            Channel::Push => "push",
            Channel::Messenger => "messenger",
        };
        write!(f, "{label}")
    }
}

/// Per-channel contact addresses for one recipient
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactAddresses {
    pub phone: Option<String>,
    pub email: Option<String>,
    pub push_endpoint: Option<String>,
    pub messenger_id: Option<String>,
}

impl ContactAddresses {
    /// The configured address for a channel, if any
    pub fn address_for(&self, channel: Channel) -> Option<&str> {
        let address = match channel {
            Channel::Sms => &self.phone,
            Channel::Email => &self.email,
            Channel::Push => &self.push_endpoint,
            Channel::Messenger => &self.messenger_id,
        };

        address.as_deref().filter(|address| !address.is_empty())
    }
}

/// Which channels a recipient wants to be notified on, and from what severity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelPreferences {
    pub min_severity: Severity,

    #[serde(default)]
    pub sms_enabled: bool,

    #[serde(default)]
    pub email_enabled: bool,

    #[serde(default)]
    pub push_enabled: bool,

    #[serde(default)]
    pub messenger_enabled: bool,
}

impl ChannelPreferences {
    fn enabled(&self, channel: Channel) -> bool {
        match channel {
            Channel::Sms => self.sms_enabled,
            Channel::Email => self.email_enabled,
            Channel::Push => self.push_enabled,
            Channel::Messenger => self.messenger_enabled,
        }
    }

    /// Most conservative fallback for recipients without stored preferences:
    /// email only, from MEDIUM upwards
    pub fn conservative_default() -> Self {
        Self {
            min_severity: config::default_min_severity(),
            sms_enabled: false,
            email_enabled: true,
            push_enabled: false,
            messenger_enabled: false,
        }
    }
}

/// One person to notify about alerts for a site
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipient {
    pub id: String,
    pub name: Option<String>,

    #[serde(default)]
    pub contacts: ContactAddresses,

    /// Absent preferences fall back to `ChannelPreferences::conservative_default`
    pub preference: Option<ChannelPreferences>,
}

impl Recipient {
    pub fn display(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// Decide which channels carry an alert to one recipient.
///
/// A channel is selected when it is enabled in the preferences and the alert
/// severity is at or above the recipient's minimum. CRITICAL alerts override
/// the preferences entirely: every channel with a configured contact address
/// is selected, so a critical condition always reaches every way of
/// contacting the recipient.
pub fn select_channels(alert: &Alert, recipient: &Recipient) -> Vec<Channel> {
    if alert.severity == Severity::Critical {
        return Channel::ALL
            .into_iter()
            .filter(|channel| recipient.contacts.address_for(*channel).is_some())
            .collect();
    }

    let default_preference = ChannelPreferences::conservative_default();
    let preference = recipient.preference.as_ref().unwrap_or(&default_preference);

    if alert.severity < preference.min_severity {
        return Vec::new();
    }

    Channel::ALL
        .into_iter()
        .filter(|channel| preference.enabled(*channel))
        .collect()
}
