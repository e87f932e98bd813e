mod common;

use alexa_skill_webhook::{AuthVerdict, ErrorKind, RequestAuthenticator, VerificationError};
use common::*;
use std::time::Duration;

fn invalid_kind(verdict: &AuthVerdict) -> Option<ErrorKind> {
    match verdict {
        AuthVerdict::Valid => None,
        AuthVerdict::Invalid(e) => Some(e.kind()),
    }
}

#[tokio::test]
async fn valid_signed_request_is_authenticated() {
    let fetcher = StaticFetcher::serving(TRUSTED_CERT);
    let authenticator = RequestAuthenticator::with_fetcher(fetcher.clone());
    let request = signed_request(launch_body(SKILL_ID, NOW), CERT_URL);

    assert_eq!(authenticator.authenticate(&request).await, AuthVerdict::Valid);
    assert_eq!(fetcher.calls(), 1);
}

#[tokio::test]
async fn explicit_port_and_dot_segments_are_accepted() {
    let authenticator = RequestAuthenticator::with_fetcher(StaticFetcher::serving(TRUSTED_CERT));

    for url in &[
        "https://s3.amazonaws.com:443/echo.api/echo-api-cert.pem",
        "https://s3.amazonaws.com/echo.api/../echo.api/./echo-api-cert.pem",
    ] {
        let request = signed_request(launch_body(SKILL_ID, NOW), url);
        assert!(authenticator.authenticate(&request).await.is_valid(), "{}", url);
    }
}

#[tokio::test]
async fn tampered_body_fails_signature() {
    let authenticator = RequestAuthenticator::with_fetcher(StaticFetcher::serving(TRUSTED_CERT));
    let signed = signed_request(launch_body(SKILL_ID, NOW), CERT_URL);
    let signature = signed.header("signature").unwrap().to_string();

    let tampered_body = launch_body("987654321", NOW);
    let headers = vec![("signaturecertchainurl", CERT_URL.to_string()), ("signature", signature)]
        .into_iter()
        .collect();
    let tampered = alexa_skill_webhook::InboundRequest::new(tampered_body, Some(headers))
        .with_received_at(now());

    assert_eq!(
        authenticator.authenticate(&tampered).await,
        AuthVerdict::Invalid(VerificationError::InvalidSignature)
    );
}

#[tokio::test]
async fn reserialized_body_fails_signature() {
    let authenticator = RequestAuthenticator::with_fetcher(StaticFetcher::serving(TRUSTED_CERT));
    let pretty = serde_json::to_vec_pretty(&serde_json::from_slice::<serde_json::Value>(
        &launch_body(SKILL_ID, NOW),
    )
    .unwrap())
    .unwrap();
    let signed = signed_request(pretty, CERT_URL);
    let signature = signed.header("signature").unwrap().to_string();

    // Same JSON, compact bytes
    let compact = launch_body(SKILL_ID, NOW);
    let headers = vec![("signaturecertchainurl", CERT_URL.to_string()), ("signature", signature)]
        .into_iter()
        .collect();
    let request =
        alexa_skill_webhook::InboundRequest::new(compact, Some(headers)).with_received_at(now());

    assert_eq!(
        invalid_kind(&authenticator.authenticate(&request).await),
        Some(ErrorKind::Signature)
    );
}

#[tokio::test]
async fn foreign_cert_urls_are_never_fetched() {
    let fetcher = StaticFetcher::serving(TRUSTED_CERT);
    let authenticator = RequestAuthenticator::with_fetcher(fetcher.clone());

    for url in &[
        "http://s3.amazonaws.com/echo.api/echo-api-cert.pem",
        "https://notamazon.com/echo.api/echo-api-cert.pem",
        "https://s3.amazonaws.com/EcHo.aPi/echo-api-cert.pem",
        "https://s3.amazonaws.com/invalid.path/echo-api-cert.pem",
        "https://s3.amazonaws.com:563/echo.api/echo-api-cert.pem",
        "https://s3.amazonaws.com/echo.api/../evil/echo-api-cert.pem",
    ] {
        let request = signed_request(launch_body(SKILL_ID, NOW), url);
        assert_eq!(
            invalid_kind(&authenticator.authenticate(&request).await),
            Some(ErrorKind::UrlFormat),
            "{}",
            url
        );
    }

    assert_eq!(fetcher.calls(), 0);
}

#[tokio::test]
async fn missing_headers() {
    let fetcher = StaticFetcher::serving(TRUSTED_CERT);
    let authenticator = RequestAuthenticator::with_fetcher(fetcher.clone());
    let body = launch_body(SKILL_ID, NOW);

    let no_headers = alexa_skill_webhook::InboundRequest::new(body.clone(), None);
    assert_eq!(
        authenticator.authenticate(&no_headers).await,
        AuthVerdict::Invalid(VerificationError::NoHeaders)
    );

    let no_url = alexa_skill_webhook::InboundRequest::new(
        body.clone(),
        Some(vec![("signature", sign(&body))].into_iter().collect()),
    );
    assert_eq!(
        authenticator.authenticate(&no_url).await,
        AuthVerdict::Invalid(VerificationError::NoSignatureUrl)
    );

    let no_signature = alexa_skill_webhook::InboundRequest::new(
        body,
        Some(vec![("signaturecertchainurl", CERT_URL)].into_iter().collect()),
    );
    assert_eq!(
        authenticator.authenticate(&no_signature).await,
        AuthVerdict::Invalid(VerificationError::NoSignature)
    );

    assert_eq!(fetcher.calls(), 0);
}

#[tokio::test]
async fn certificate_download_failures() {
    let request = signed_request(launch_body(SKILL_ID, NOW), CERT_URL);

    let missing = RequestAuthenticator::with_fetcher(StaticFetcher::status(404));
    assert_eq!(
        missing.authenticate(&request).await,
        AuthVerdict::Invalid(VerificationError::CertNotPresent { status: 404 })
    );

    let unreachable = RequestAuthenticator::with_fetcher(UnreachableFetcher);
    assert_eq!(
        unreachable.authenticate(&request).await,
        AuthVerdict::Invalid(VerificationError::RetrieveCert)
    );
}

#[tokio::test]
async fn untrusted_and_expired_certificates() {
    let request = signed_request(launch_body(SKILL_ID, NOW), CERT_URL);

    let untrusted = RequestAuthenticator::with_fetcher(StaticFetcher::serving(UNTRUSTED_CERT));
    assert_eq!(
        untrusted.authenticate(&request).await,
        AuthVerdict::Invalid(VerificationError::DomainNotTrusted)
    );

    // Signature is valid for the expired certificate's key too
    let expired = RequestAuthenticator::with_fetcher(StaticFetcher::serving(EXPIRED_CERT));
    assert!(matches!(
        expired.authenticate(&request).await,
        AuthVerdict::Invalid(VerificationError::ExpiredCert { .. })
    ));
}

#[tokio::test]
async fn same_request_same_verdict() {
    let authenticator = RequestAuthenticator::with_fetcher(StaticFetcher::serving(TRUSTED_CERT));

    let good = signed_request(launch_body(SKILL_ID, NOW), CERT_URL);
    let first = authenticator.authenticate(&good).await;
    let second = authenticator.authenticate(&good).await;
    assert_eq!(first, second);
    assert!(first.is_valid());

    let bad = signed_request(launch_body(SKILL_ID, NOW), "https://evil.com/echo.api/cert.pem");
    assert_eq!(
        authenticator.authenticate(&bad).await,
        authenticator.authenticate(&bad).await
    );
}

#[tokio::test]
async fn fetches_every_request_by_default() {
    let fetcher = StaticFetcher::serving(TRUSTED_CERT);
    let authenticator = RequestAuthenticator::with_fetcher(fetcher.clone());
    let request = signed_request(launch_body(SKILL_ID, NOW), CERT_URL);

    authenticator.authenticate(&request).await;
    authenticator.authenticate(&request).await;

    assert_eq!(fetcher.calls(), 2);
}

#[tokio::test]
async fn cache_skips_download_but_not_checks() {
    let fetcher = StaticFetcher::serving(TRUSTED_CERT);
    let authenticator = RequestAuthenticator::with_fetcher(fetcher.clone())
        .with_cert_cache(Duration::from_secs(60));

    let request = signed_request(launch_body(SKILL_ID, NOW), CERT_URL);
    assert!(authenticator.authenticate(&request).await.is_valid());
    assert!(authenticator.authenticate(&request).await.is_valid());
    assert_eq!(fetcher.calls(), 1);

    // Certificate is still checked against arrival time
    let late = signed_request(launch_body(SKILL_ID, NOW), CERT_URL).with_received_at(
        time::OffsetDateTime::from_unix_timestamp(4_733_510_400).unwrap(),
    );
    assert!(matches!(
        authenticator.authenticate(&late).await,
        AuthVerdict::Invalid(VerificationError::ExpiredCert { .. })
    ));
    assert_eq!(fetcher.calls(), 1);
}

#[tokio::test]
async fn failed_downloads_are_not_cached() {
    let fetcher = StaticFetcher::status(503);
    let authenticator = RequestAuthenticator::with_fetcher(fetcher.clone())
        .with_cert_cache(Duration::from_secs(60));
    let request = signed_request(launch_body(SKILL_ID, NOW), CERT_URL);

    authenticator.authenticate(&request).await;
    authenticator.authenticate(&request).await;

    assert_eq!(fetcher.calls(), 2);
}

#[tokio::test]
async fn cache_ignores_query_and_stays_bounded() {
    let fetcher = StaticFetcher::serving(TRUSTED_CERT);
    let authenticator = RequestAuthenticator::with_fetcher(fetcher.clone())
        .with_cert_cache(Duration::from_secs(60));

    for i in 0..50 {
        let url = format!("{}?x={}", CERT_URL, i);
        let request = signed_request(launch_body(SKILL_ID, NOW), &url);
        authenticator.authenticate(&request).await;
    }
    assert_eq!(fetcher.calls(), 1);
    assert_eq!(authenticator.cached_certificates().await, 1);

    for i in 0..50 {
        let url = format!("https://s3.amazonaws.com/echo.api/cert-{}.pem", i);
        authenticator
            .authenticate(&signed_request(launch_body(SKILL_ID, NOW), &url))
            .await;
    }
    assert!(authenticator.cached_certificates().await <= 16);
}
