//! Hiding of platform-managed roles and bindings.

/// Name prefixes of roles and bindings installed by Kubernetes, kubeadm,
/// KubeSphere and common add-ons.
pub const DEFAULT_SYSTEM_PREFIXES: &[&str] = &[
    "system:",
    "kubeadm:",
    "kubesphere",
    "ks-",
    "ingress-nginx",
    "notification-manager",
    "unity-",
    "vxflexos",
];

/// Decides whether an object name belongs to the platform.
///
/// # Example
///
/// ```
/// use rbac_model::SystemFilter;
///
/// let filter = SystemFilter::default();
/// assert!(filter.is_system("system:node"));
/// assert!(!filter.is_system("team-admin"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemFilter {
    prefixes: Vec<String>,
}

impl Default for SystemFilter {
    fn default() -> Self {
        Self::from_prefixes(DEFAULT_SYSTEM_PREFIXES.iter().copied())
    }
}

impl SystemFilter {
    /// Build a filter from custom prefixes. Blank prefixes are ignored.
    pub fn from_prefixes<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes
                .into_iter()
                .map(Into::into)
                .map(|p: String| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    /// Check if a name starts with a system prefix.
    pub fn is_system(&self, name: &str) -> bool {
        self.prefixes.iter().any(|prefix| name.starts_with(prefix.as_str()))
    }

    /// The configured prefixes.
    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }
}
