use crate::{
    constants::*,
    error::{log_rejection, VerificationError},
    normalize,
};
use std::path::Path;
use url::{Host, Url};

/// Structural checks on the `SignatureCertChainUrl` header. Nothing here touches
/// the network, so an attacker controlled url is never fetched.
///
/// Every check runs and logs its own failure; the first failure is returned.
pub fn validate_cert_url(signature_cert_chain_url: &str) -> Result<Url, VerificationError> {
    let parsed_url =
        Url::parse(signature_cert_chain_url).map_err(|_| VerificationError::UrlParse {
            url: signature_cert_chain_url.to_string(),
        })?;

    let failures = cert_url_failures(&parsed_url);
    failures.iter().for_each(log_rejection);

    match failures.into_iter().next() {
        Some(first) => Err(first),
        None => Ok(parsed_url),
    }
}

/// All structural problems with an already parsed chain url, in check order
pub fn cert_url_failures(parsed_url: &Url) -> Vec<VerificationError> {
    let mut failures = vec![];

    // Scheme is lowercased by the parser
    let scheme = parsed_url.scheme();
    if scheme != CERT_CHAIN_URL_SCHEME {
        failures.push(VerificationError::UrlScheme {
            scheme: scheme.to_string(),
        });
    }

    match parsed_url.host() {
        Some(Host::Domain(hostname)) => {
            if hostname.to_lowercase() != CERT_CHAIN_URL_HOSTNAME {
                failures.push(VerificationError::UrlHostname {
                    hostname: hostname.to_string(),
                });
            }
        }
        Some(Host::Ipv4(ip)) => failures.push(VerificationError::UrlHostname {
            hostname: format!("{}", ip),
        }),
        Some(Host::Ipv6(ip)) => failures.push(VerificationError::UrlHostname {
            hostname: format!("{}", ip),
        }),
        None => failures.push(VerificationError::UrlHostname {
            hostname: "".to_string(),
        }),
    }

    // `port()` is None for both an omitted port and an explicit default port
    if let Some(port) = parsed_url.port() {
        if port != CERT_CHAIN_URL_PORT {
            failures.push(VerificationError::UrlPort { port });
        }
    }

    let normalized_path = normalize::normalize_path(Path::new(parsed_url.path()));
    let normalized_path = format!("{}", normalized_path.display());
    if !normalized_path.starts_with(CERT_CHAIN_URL_STARTPATH) {
        failures.push(VerificationError::UrlPath {
            path: normalized_path,
        });
    }

    failures
}
