use serde::Serialize;
use tabled::Tabled;

use crate::control_plane::{Addressing, ValidatedTarget};

#[derive(Clone, Debug, Serialize, Tabled)]
#[serde(rename_all = "camelCase")]
pub struct TargetInfo {
    pub mode: String,
    pub address: String,
    pub pod_label_selector: String,
    pub port: u16,
    pub cert_dir: String,
    pub timeout: String,
    pub endpoint: String,
}

impl From<&ValidatedTarget> for TargetInfo {
    fn from(value: &ValidatedTarget) -> Self {
        let (mode, address) = match value.addressing() {
            Addressing::Direct(_) => ("direct", value.authority().unwrap_or_default()),
            Addressing::PodLabel(_) => ("pod-label", String::new()),
            Addressing::Undetermined => ("undetermined", String::new()),
        };
        Self {
            mode: mode.to_string(),
            address,
            pod_label_selector: value.pod_label_selector().to_string(),
            port: value.port(),
            cert_dir: value.cert_dir().to_string(),
            timeout: humantime::format_duration(value.timeout()).to_string(),
            endpoint: String::new(),
        }
    }
}
