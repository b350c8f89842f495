//! Environment fact collection.
//!
//! Environment facts are static per-launch metadata about the running
//! application and device, captured exactly once at agent initialization and
//! stamped onto every record. Collection is an injected collaborator behind
//! the [`FactsProvider`] seam so each host platform can supply its own
//! implementation; the agent caches the snapshot for its whole lifetime and
//! never re-collects.

use serde::{Deserialize, Serialize};

/// Flat set of application/device facts stamped onto every record.
///
/// All fields serialize inline into the record object (snake_case). Fields a
/// platform cannot determine stay empty rather than being omitted, keeping
/// the wire schema stable.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentFacts {
    /// Human-readable application name.
    pub app_name: String,
    /// Application version string.
    pub app_version: String,
    /// Build or revision number.
    pub build_number: String,
    /// Package/bundle identifier.
    pub package_id: String,
    /// Stable device identifier.
    pub device_id: String,
    /// Platform name (e.g. "linux", "macos", "android").
    pub platform: String,
    /// Operating system version.
    pub os_version: String,
    /// Device model.
    pub model: String,
    /// Whether this is physical hardware rather than an emulator.
    pub is_physical_device: bool,
    /// User-visible device name.
    pub device_name: String,
    /// Localized device model name.
    pub localized_model: String,
    /// Machine/architecture identifier.
    pub machine: String,
    /// Operating system name.
    pub system_name: String,
}

/// Seam for platform-specific fact collection.
///
/// Called once per agent instance; the result is cached. Implementations
/// must not block for long and must not fail — facts that cannot be
/// determined are left at their defaults.
pub trait FactsProvider: Send + Sync {
    /// Collects a snapshot of the current environment.
    fn collect(&self) -> EnvironmentFacts;
}

/// Default provider for desktop/server hosts.
///
/// Fills the device-side facts from the operating system (platform,
/// architecture, host name) and carries the application identity fields the
/// host supplies at construction. Mobile or embedded hosts should provide
/// their own [`FactsProvider`] instead.
#[derive(Clone, Debug, Default)]
pub struct HostFacts {
    /// Human-readable application name.
    pub app_name: String,
    /// Application version string.
    pub app_version: String,
    /// Build or revision number.
    pub build_number: String,
    /// Package identifier.
    pub package_id: String,
}

impl HostFacts {
    /// Creates a provider carrying the given application identity.
    #[must_use]
    pub fn new(
        app_name: impl Into<String>,
        app_version: impl Into<String>,
        build_number: impl Into<String>,
        package_id: impl Into<String>,
    ) -> Self {
        HostFacts {
            app_name: app_name.into(),
            app_version: app_version.into(),
            build_number: build_number.into(),
            package_id: package_id.into(),
        }
    }
}

impl FactsProvider for HostFacts {
    fn collect(&self) -> EnvironmentFacts {
        let host = hostname::get()
            .ok()
            .and_then(|name| name.into_string().ok())
            .unwrap_or_default();

        EnvironmentFacts {
            app_name: self.app_name.clone(),
            app_version: self.app_version.clone(),
            build_number: self.build_number.clone(),
            package_id: self.package_id.clone(),
            device_id: host.clone(),
            platform: std::env::consts::OS.to_string(),
            os_version: String::new(),
            model: String::new(),
            is_physical_device: true,
            device_name: host,
            localized_model: String::new(),
            machine: std::env::consts::ARCH.to_string(),
            system_name: std::env::consts::OS.to_string(),
        }
    }
}
