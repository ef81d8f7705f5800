//! Serialized forms of prebuilt configurations, one module per schema version

pub mod pre_v1;
pub mod v1_0;

use tracing::debug;

/// Version written by this build
pub const CURRENT_VERSION: f64 = v1_0::VERSION;

/// A historical schema that knows how to become the schema after it.
///
/// Upgrading is pure and total: the same input always produces the same
/// output and never fails.
pub trait UpgradeToNext {
    type Next;

    fn upgrade(self) -> Self::Next;
}

/// A prebuilt configuration document of any known schema version
#[derive(Debug, Clone, PartialEq)]
pub enum VersionedPrebuiltConfigurations {
    V0_1(pre_v1::PrebuiltConfigurations),
    V1_0(v1_0::PrebuiltConfigurations),
}

impl VersionedPrebuiltConfigurations {
    pub fn version(&self) -> f64 {
        match self {
            Self::V0_1(_) => pre_v1::VERSION,
            Self::V1_0(_) => v1_0::VERSION,
        }
    }

    pub fn is_current(&self) -> bool {
        matches!(self, Self::V1_0(_))
    }

    /// Upgrade one version. The current version is returned unchanged.
    pub fn upgrade(self) -> Self {
        match self {
            Self::V0_1(configurations) => Self::V1_0(configurations.upgrade()),
            current @ Self::V1_0(_) => current,
        }
    }

    /// Upgrade step by step until the current version is reached
    pub fn into_current(self) -> v1_0::PrebuiltConfigurations {
        let mut document = self;
        loop {
            match document {
                Self::V1_0(current) => return current,
                older => {
                    let from = older.version();
                    document = older.upgrade();
                    debug!(from, to = document.version(), "upgraded prebuilt configurations");
                }
            }
        }
    }
}

impl From<pre_v1::PrebuiltConfigurations> for VersionedPrebuiltConfigurations {
    fn from(configurations: pre_v1::PrebuiltConfigurations) -> Self {
        Self::V0_1(configurations)
    }
}

impl From<v1_0::PrebuiltConfigurations> for VersionedPrebuiltConfigurations {
    fn from(configurations: v1_0::PrebuiltConfigurations) -> Self {
        Self::V1_0(configurations)
    }
}
