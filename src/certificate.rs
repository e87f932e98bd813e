use crate::{
    constants::*,
    error::{log_rejection, VerificationError},
};
use log::debug;
use time::OffsetDateTime;
use x509_parser::{extensions::GeneralName, pem::parse_x509_pem};

const SECONDS_PER_DAY: i64 = 86_400;

/// The parts of a signing certificate the authentication pipeline relies on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateInfo {
    pub common_name: Option<String>,
    pub subject_alt_names: Vec<String>,
    /// Whole days until `notAfter`, rounded down. Negative once expired.
    pub remaining_validity_days: i64,
    pub not_yet_valid: bool,
    /// DER encoded `RSAPublicKey` from the subject public key info
    pub public_key: Vec<u8>,
}

impl CertificateInfo {
    /// Convert the fetched pem to der, then parse as x509. Validity is measured
    /// against `now`.
    pub fn from_pem(pem_bytes: &[u8], now: OffsetDateTime) -> Result<Self, VerificationError> {
        let (_, pem) = parse_x509_pem(pem_bytes).map_err(|_| VerificationError::PemParse)?;
        let certificate = pem.parse_x509().map_err(|_| VerificationError::CertParse)?;

        let common_name = certificate
            .subject()
            .iter_common_name()
            .next()
            .and_then(|cn| cn.as_str().ok())
            .map(str::to_string);

        let mut subject_alt_names = vec![];
        if let Some(san) = certificate
            .subject_alternative_name()
            .map_err(|_| VerificationError::SanExtension)?
        {
            for name in &san.value.general_names {
                if let GeneralName::DNSName(dns_name) = name {
                    subject_alt_names.push(dns_name.to_string());
                }
            }
        }

        let validity = certificate.validity();
        let now = now.unix_timestamp();
        let remaining_validity_days =
            (validity.not_after.timestamp() - now).div_euclid(SECONDS_PER_DAY);
        let not_yet_valid = validity.not_before.timestamp() > now;

        let public_key = certificate
            .public_key()
            .subject_public_key
            .data
            .to_vec();

        let info = CertificateInfo {
            common_name,
            subject_alt_names,
            remaining_validity_days,
            not_yet_valid,
            public_key,
        };
        debug!(
            "Parsed certificate cn={:?} san={:?} remaining_days={}",
            info.common_name, info.subject_alt_names, info.remaining_validity_days
        );

        Ok(info)
    }

    /// True when the pinned platform domain appears in the common name or any
    /// subjectAltName entry
    pub fn is_trusted(&self) -> bool {
        self.common_name
            .iter()
            .chain(self.subject_alt_names.iter())
            .any(|name| name.contains(CERT_CHAIN_DOMAIN))
    }

    /// Every failed gate, in check order. No gate is skipped because an earlier
    /// one failed.
    pub fn failures(&self) -> Vec<VerificationError> {
        let mut failures = vec![];

        if !self.is_trusted() {
            failures.push(VerificationError::DomainNotTrusted);
        }

        if self.remaining_validity_days < MIN_REMAINING_VALIDITY_DAYS {
            failures.push(VerificationError::ExpiredCert {
                remaining_days: self.remaining_validity_days,
            });
        }

        if self.not_yet_valid {
            failures.push(VerificationError::CertNotYetValid);
        }

        failures
    }

    /// Trust and expiry gates. Every failure is logged and the first is returned.
    ///
    /// Trust is pinned to a name, there is no walk to a root CA.
    pub fn validate(&self) -> Result<(), VerificationError> {
        let failures = self.failures();
        failures.iter().for_each(log_rejection);

        match failures.into_iter().next() {
            Some(first) => Err(first),
            None => Ok(()),
        }
    }
}
