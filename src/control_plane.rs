use std::{net::IpAddr, time::Duration};

use crate::{
    error::Error,
    flags::{FlagRegistry, FlagValues},
};

pub const FLAG_XDS_ADDRESS: &str = "xds-address";
pub const FLAG_CERT_DIR: &str = "cert-dir";
pub const FLAG_XDS_LABEL: &str = "xds-label";
pub const FLAG_XDS_PORT: &str = "xds-port";
pub const FLAG_TIMEOUT: &str = "timeout";

pub const DEFAULT_XDS_PORT: u16 = 15012;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Options shared by every subcommand that talks to the control plane over xDS.
///
/// Populated from flags and not yet checked. Use [`ControlPlaneTarget::validate`]
/// to obtain a [`ValidatedTarget`] before connecting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlPlaneTarget {
    /// xDS endpoint, e.g. `localhost:15010`.
    pub address: String,
    /// Kubernetes label selector matching the control plane pods.
    pub pod_label_selector: String,
    /// Port exposing xDS on a discovered pod (typically 15010 or 15012).
    pub port: u16,
    /// Local directory containing certificates.
    pub cert_dir: String,
    /// How long to wait before giving up on xDS.
    pub timeout: Duration,
}

impl Default for ControlPlaneTarget {
    fn default() -> Self {
        Self {
            address: String::new(),
            pod_label_selector: String::new(),
            port: DEFAULT_XDS_PORT,
            cert_dir: String::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ControlPlaneTarget {
    pub fn register_flags<R: FlagRegistry + ?Sized>(registry: &mut R) {
        registry.string_flag(FLAG_XDS_ADDRESS, "", "XDS Endpoint");
        registry.string_flag(FLAG_CERT_DIR, "", "XDS Endpoint certificate directory");
        registry.string_flag(FLAG_XDS_LABEL, "", "Istiod pod label selector");
        registry.int_flag(FLAG_XDS_PORT, DEFAULT_XDS_PORT as i64, "Istiod pod port");
        registry.duration_flag(
            FLAG_TIMEOUT,
            DEFAULT_TIMEOUT,
            "the duration to wait before failing",
        );
    }

    pub fn from_flags<V: FlagValues + ?Sized>(values: &V) -> Result<Self, Error> {
        let port = values.int(FLAG_XDS_PORT)?;
        let port = u16::try_from(port)
            .ok()
            .filter(|p| *p != 0)
            .ok_or(Error::InvalidFlag {
                name: FLAG_XDS_PORT.to_string(),
                msg: format!("port must be between 1 and 65535, got {port}"),
            })?;

        Ok(Self {
            address: values.string(FLAG_XDS_ADDRESS)?,
            pod_label_selector: values.string(FLAG_XDS_LABEL)?,
            port,
            cert_dir: values.string(FLAG_CERT_DIR)?,
            timeout: values.duration(FLAG_TIMEOUT)?,
        })
    }

    /// Checks that at most one addressing mode is given.
    ///
    /// A target with neither an address nor a label passes; whether that is
    /// acceptable is up to the subcommand.
    pub fn validate(&self) -> Result<ValidatedTarget, Error> {
        if !self.address.is_empty() && !self.pod_label_selector.is_empty() {
            return Err(Error::ConflictingTarget);
        }
        Ok(ValidatedTarget {
            inner: self.clone(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Addressing<'a> {
    Direct(&'a str),
    PodLabel(&'a str),
    Undetermined,
}

/// A [`ControlPlaneTarget`] that passed validation. Read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedTarget {
    inner: ControlPlaneTarget,
}

impl ValidatedTarget {
    pub fn address(&self) -> &str {
        &self.inner.address
    }

    pub fn pod_label_selector(&self) -> &str {
        &self.inner.pod_label_selector
    }

    pub fn port(&self) -> u16 {
        self.inner.port
    }

    pub fn cert_dir(&self) -> &str {
        &self.inner.cert_dir
    }

    pub fn timeout(&self) -> Duration {
        self.inner.timeout
    }

    pub fn addressing(&self) -> Addressing<'_> {
        if !self.inner.address.is_empty() {
            Addressing::Direct(&self.inner.address)
        } else if !self.inner.pod_label_selector.is_empty() {
            Addressing::PodLabel(&self.inner.pod_label_selector)
        } else {
            Addressing::Undetermined
        }
    }

    /// Direct address with the port appended when it names a bare host.
    ///
    /// Addresses carrying a scheme or a port are returned as given.
    pub fn authority(&self) -> Option<String> {
        match self.addressing() {
            Addressing::Direct(addr) => Some(with_default_port(addr, self.inner.port)),
            _ => None,
        }
    }
}

fn with_default_port(addr: &str, port: u16) -> String {
    if addr.contains("://") || addr.starts_with('[') {
        return addr.to_string();
    }
    match addr.parse::<IpAddr>() {
        Ok(IpAddr::V6(ip)) => return format!("[{ip}]:{port}"),
        Ok(IpAddr::V4(ip)) => return format!("{ip}:{port}"),
        Err(_) => {}
    }
    match addr.rsplit_once(':') {
        Some(_) => addr.to_string(),
        None => format!("{addr}:{port}"),
    }
}
