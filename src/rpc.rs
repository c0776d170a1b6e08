use tonic::transport::Endpoint;

use crate::{
    control_plane::{Addressing, ValidatedTarget},
    error::Error,
};

/// Builds the transport endpoint for a directly addressed control plane.
///
/// Nothing is dialed here. Label-selected targets must first be resolved by pod discovery.
pub fn endpoint(target: &ValidatedTarget) -> Result<Endpoint, Error> {
    let uri = match target.addressing() {
        Addressing::Direct(addr) if addr.contains("://") => addr.to_string(),
        Addressing::Direct(_) => {
            let scheme = if target.cert_dir().is_empty() {
                "http"
            } else {
                "https"
            };
            // authority() is always Some for direct addressing
            format!("{}://{}", scheme, target.authority().unwrap_or_default())
        }
        Addressing::PodLabel(selector) => {
            return Err(Error::DiscoveryRequired {
                selector: selector.to_string(),
            })
        }
        Addressing::Undetermined => return Err(Error::UndeterminedTarget),
    };

    let endpoint = Endpoint::from_shared(uri)
        .map_err(Error::InvalidEndpoint)?
        .timeout(target.timeout())
        .connect_timeout(target.timeout());
    Ok(endpoint)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::control_plane::ControlPlaneTarget;
    use rstest::rstest;

    #[rstest(
        address,
        cert_dir,
        scheme,
        host,
        port,
        case("localhost:15010", "", "http", "localhost", 15010),
        case("istiod.istio-system", "", "http", "istiod.istio-system", 15012),
        case("istiod.istio-system", "/etc/certs", "https", "istiod.istio-system", 15012),
        case("https://10.0.0.1:15443", "", "https", "10.0.0.1", 15443),
    )]
    fn works_endpoint(address: &str, cert_dir: &str, scheme: &str, host: &str, port: u16) {
        let target = ControlPlaneTarget {
            address: address.to_string(),
            cert_dir: cert_dir.to_string(),
            timeout: Duration::from_secs(3),
            ..Default::default()
        }
        .validate()
        .unwrap();

        let endpoint = endpoint(&target).unwrap();
        let uri = endpoint.uri();
        assert_eq!(uri.scheme_str(), Some(scheme));
        assert_eq!(uri.host(), Some(host));
        assert_eq!(uri.port_u16(), Some(port));
    }

    #[test]
    fn fails_endpoint_for_pod_label() {
        let target = ControlPlaneTarget {
            pod_label_selector: "app=istiod".to_string(),
            ..Default::default()
        }
        .validate()
        .unwrap();

        match endpoint(&target) {
            Err(Error::DiscoveryRequired { selector }) => assert_eq!(selector, "app=istiod"),
            other => panic!("this test should not be pass here: {:?}", other),
        }
    }

    #[test]
    fn fails_endpoint_for_undetermined_target() {
        let target = ControlPlaneTarget::default().validate().unwrap();
        assert!(matches!(endpoint(&target), Err(Error::UndeterminedTarget)));
    }

    #[test]
    fn fails_endpoint_for_malformed_address() {
        let target = ControlPlaneTarget {
            address: "bad host name".to_string(),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert!(matches!(endpoint(&target), Err(Error::InvalidEndpoint(_))));
    }
}
