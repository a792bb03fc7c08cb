use core::{fmt::Display, ops::Deref};

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Identifier the control plane assigned to this device at activation
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(CompactString);

impl DeviceId {
    pub const fn const_new(s: &'static str) -> Self {
        Self(CompactString::const_new(s))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl<T: AsRef<str>> From<T> for DeviceId {
    fn from(value: T) -> Self {
        DeviceId(CompactString::from(value.as_ref()))
    }
}

impl Deref for DeviceId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

impl<T: AsRef<str> + ?Sized> PartialEq<T> for DeviceId {
    fn eq(&self, other: &T) -> bool {
        self.0.as_str() == other.as_ref()
    }
}

impl Display for DeviceId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_id_serde() {
        assert_eq!(
            serde_json::to_string(&DeviceId::from("6c1f0a7b2e")).unwrap(),
            r#""6c1f0a7b2e""#
        );

        assert_eq!(
            serde_json::from_str::<DeviceId>(r#""6c1f0a7b2e""#).unwrap(),
            DeviceId::from("6c1f0a7b2e")
        );
    }
}
