use std::fmt;

/// Status bitmask reported by the audio server when opening a client
/// connection fails (or partially succeeds).
///
/// Bit values match the server's wire constants, so backend crates can pass
/// the raw status through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ServerStatus(u32);

impl ServerStatus {
    /// Overall operation failed.
    pub const FAILURE: ServerStatus = ServerStatus(0x01);
    /// The operation contained an invalid or unsupported option.
    pub const INVALID_OPTION: ServerStatus = ServerStatus(0x02);
    /// The desired client name is not unique.
    pub const NAME_NOT_UNIQUE: ServerStatus = ServerStatus(0x04);
    /// The server was started as a result of this operation.
    pub const SERVER_STARTED: ServerStatus = ServerStatus(0x08);
    /// Unable to connect to the server.
    pub const SERVER_FAILED: ServerStatus = ServerStatus(0x10);
    /// Communication error with the server.
    pub const SERVER_ERROR: ServerStatus = ServerStatus(0x20);
    /// Requested client does not exist.
    pub const NO_SUCH_CLIENT: ServerStatus = ServerStatus(0x40);
    /// Unable to load initial client.
    pub const LOAD_FAILURE: ServerStatus = ServerStatus(0x80);
    /// Unable to initialize client.
    pub const INIT_FAILURE: ServerStatus = ServerStatus(0x100);
    /// Unable to access shared memory.
    pub const SHM_FAILURE: ServerStatus = ServerStatus(0x200);
    /// Client's protocol version does not match.
    pub const VERSION_ERROR: ServerStatus = ServerStatus(0x400);
    /// A backend error occurred.
    pub const BACKEND_ERROR: ServerStatus = ServerStatus(0x800);
    /// Client zombified.
    pub const CLIENT_ZOMBIE: ServerStatus = ServerStatus(0x1000);

    pub const fn empty() -> Self {
        ServerStatus(0)
    }

    pub const fn from_bits(bits: u32) -> Self {
        ServerStatus(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, flag: ServerStatus) -> bool {
        self.0 & flag.0 != 0
    }

    /// Decodes the bitmask into human-readable diagnostics, one line per set
    /// flag, in canonical flag order. Unknown bits contribute nothing.
    pub fn describe(self) -> Vec<&'static str> {
        DESCRIPTIONS
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, line)| *line)
            .collect()
    }
}

/// Canonical decode order, matching the server's documentation.
const DESCRIPTIONS: [(ServerStatus, &'static str); 13] = [
    (ServerStatus::FAILURE, "Failure - overall operation failed"),
    (
        ServerStatus::INVALID_OPTION,
        "InvalidOption - the operation contained an invalid or unsupported option",
    ),
    (
        ServerStatus::NAME_NOT_UNIQUE,
        "NameNotUnique - the desired client name is not unique",
    ),
    (
        ServerStatus::SERVER_STARTED,
        "ServerStarted - the server was started as a result of this operation",
    ),
    (
        ServerStatus::SERVER_FAILED,
        "ServerFailed - unable to connect to the audio server",
    ),
    (
        ServerStatus::SERVER_ERROR,
        "ServerError - communication error with the audio server",
    ),
    (
        ServerStatus::NO_SUCH_CLIENT,
        "NoSuchClient - requested client does not exist",
    ),
    (
        ServerStatus::LOAD_FAILURE,
        "LoadFailure - unable to load initial client",
    ),
    (
        ServerStatus::INIT_FAILURE,
        "InitFailure - unable to initialize client",
    ),
    (
        ServerStatus::SHM_FAILURE,
        "ShmFailure - unable to access shared memory",
    ),
    (
        ServerStatus::VERSION_ERROR,
        "VersionError - client's protocol version does not match",
    ),
    (
        ServerStatus::BACKEND_ERROR,
        "BackendError - a backend error occurred",
    ),
    (
        ServerStatus::CLIENT_ZOMBIE,
        "ClientZombie - client zombified",
    ),
];

impl std::ops::BitOr for ServerStatus {
    type Output = ServerStatus;

    fn bitor(self, rhs: ServerStatus) -> ServerStatus {
        ServerStatus(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for ServerStatus {
    fn bitor_assign(&mut self, rhs: ServerStatus) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for ServerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_status_decodes_to_nothing() {
        assert!(ServerStatus::empty().describe().is_empty());
    }

    #[test]
    fn each_flag_decodes_to_one_line() {
        for (flag, line) in DESCRIPTIONS {
            let decoded = flag.describe();
            assert_eq!(decoded.len(), 1);
            assert_eq!(decoded[0], line);
        }
    }

    #[test]
    fn combined_flags_decode_in_canonical_order() {
        // Set in reverse order; output order must not depend on that.
        let status = ServerStatus::SERVER_FAILED | ServerStatus::NAME_NOT_UNIQUE;
        let decoded = status.describe();

        assert_eq!(decoded.len(), 2);
        assert!(decoded[0].starts_with("NameNotUnique"));
        assert!(decoded[1].starts_with("ServerFailed"));
    }

    #[test]
    fn unknown_bits_are_ignored() {
        let status = ServerStatus::from_bits(0x8000_0000);
        assert!(status.describe().is_empty());
        assert!(!status.is_empty());
    }

    #[test]
    fn contains_checks_individual_bits() {
        let status = ServerStatus::FAILURE | ServerStatus::CLIENT_ZOMBIE;
        assert!(status.contains(ServerStatus::FAILURE));
        assert!(status.contains(ServerStatus::CLIENT_ZOMBIE));
        assert!(!status.contains(ServerStatus::SHM_FAILURE));
    }
}
