// ── Well-known daemon names ──
//
// Interface, method, and error names the neard daemon uses on the bus.

use std::fmt;

use strum::EnumString;

/// Interfaces an object can carry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumString)]
pub enum Interface {
    #[strum(serialize = "org.neard.Manager")]
    Manager,
    #[strum(serialize = "org.neard.Adapter")]
    Adapter,
    #[strum(serialize = "org.neard.Tag")]
    Tag,
    #[strum(serialize = "org.neard.Device")]
    Device,
    #[strum(serialize = "org.neard.Record")]
    Record,
    /// Standard property accessor interface (`Get` / `Set`).
    #[strum(serialize = "org.freedesktop.DBus.Properties")]
    Properties,
    /// Anything else (introspection, agent managers, ...).
    #[strum(default)]
    Other(String),
}

impl Interface {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Manager => "org.neard.Manager",
            Self::Adapter => "org.neard.Adapter",
            Self::Tag => "org.neard.Tag",
            Self::Device => "org.neard.Device",
            Self::Record => "org.neard.Record",
            Self::Properties => "org.freedesktop.DBus.Properties",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Interface {
    fn from(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| Self::Other(name.to_owned()))
    }
}

/// Method names.
pub mod method {
    pub const START_POLL_LOOP: &str = "StartPollLoop";
    pub const STOP_POLL_LOOP: &str = "StopPollLoop";
    pub const WRITE: &str = "Write";
    pub const PUSH: &str = "Push";
    /// `org.freedesktop.DBus.Properties.Set(interface, name, value)`
    pub const SET: &str = "Set";
}

/// Error names the daemon replies with.
pub mod error_name {
    pub const ALREADY_ENABLED: &str = "org.neard.Error.AlreadyEnabled";
    pub const NOT_SUPPORTED: &str = "org.neard.Error.NotSupported";
    pub const FAILED: &str = "org.neard.Error.Failed";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_known_names_round_trip() {
        for iface in [
            Interface::Manager,
            Interface::Adapter,
            Interface::Tag,
            Interface::Device,
            Interface::Record,
            Interface::Properties,
        ] {
            assert_eq!(Interface::from(iface.as_str()), iface);
        }
    }

    #[test]
    fn unknown_names_are_preserved() {
        let iface = Interface::from("org.freedesktop.DBus.Introspectable");
        assert_eq!(
            iface,
            Interface::Other("org.freedesktop.DBus.Introspectable".into())
        );
        assert_eq!(iface.to_string(), "org.freedesktop.DBus.Introspectable");
    }

    #[test]
    fn parse_falls_back_to_other() {
        assert_eq!("org.neard.Tag".parse::<Interface>(), Ok(Interface::Tag));
        assert_eq!(
            "org.neard.tag".parse::<Interface>(),
            Ok(Interface::Other("org.neard.tag".into()))
        );
    }
}
