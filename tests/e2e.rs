use std::time::Duration;

use burnt_verification::{
    config::{Mode, ProofRequestSetup, VerifierConfig},
    error::VerificationError,
    normalize::RESERVED_CLAIM_KEYS,
    provider::mock::{MOCK_VERIFICATION_DELAY, MOCK_VERIFICATION_URL},
    verifier::Verifier,
    VerificationRequestOptions,
};
use serde_json::{json, Map};


use fake_backend::{verifier, FakeBackend, Script};

fn metadata() -> Map<String, serde_json::Value> {
    let serde_json::Value::Object(map) = json!({
        "fullName": "Jane Doe",
        "workEmail": "jane@co.com"
    }) else {
        unreachable!()
    };
    map
}

#[tokio::test(start_paused = true)]
async fn mock_session_resolves_to_fixed_claims() {
    let verifier = Verifier::builder()
        .with_config(VerifierConfig::new("", "").with_mode(Mode::Mock))
        .build()
        .unwrap();
    assert_eq!(verifier.provider_name(), "mock");

    let session = verifier
        .initialize_session(&VerificationRequestOptions::new("x"))
        .await
        .unwrap();
    assert!(session.url.starts_with(MOCK_VERIFICATION_URL));
    assert!(!session.session_id.is_empty());

    let started = tokio::time::Instant::now();
    let certificate = verifier.verify(&session.session_id).await.unwrap();
    assert!(started.elapsed() >= MOCK_VERIFICATION_DELAY);

    assert_eq!(
        serde_json::Value::Object(certificate.claims),
        json!({
            "companyName": "Mock Company Inc.",
            "email": "test@mockcompany.com",
            "employmentStatus": "Active"
        })
    );
    assert!(certificate.timestamp_s > 0);
    assert!(certificate.created_at > 0);
}

#[tokio::test]
async fn metadata_is_recovered_from_proof_context() {
    let backend = FakeBackend::new(Script::Prove);
    let verifier = verifier(backend.clone());

    let options = VerificationRequestOptions::new("abc").with_metadata(metadata());
    let session = verifier.initialize_session(&options).await.unwrap();
    assert_eq!(session.session_id, "fake_session_1");
    assert_eq!(
        session.url,
        "https://share.example.com/verifier/fake_session_1"
    );

    {
        let recorded = backend.recorded.lock().unwrap();
        assert_eq!(recorded.contexts.len(), 1);
        let (address, message) = &recorded.contexts[0];
        assert_eq!(address, "0x0");
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(message).unwrap(),
            json!({ "fullName": "Jane Doe", "workEmail": "jane@co.com" })
        );
    }

    let certificate = verifier.verify(&session.session_id).await.unwrap();

    assert_eq!(certificate.session_id, "fake_session_1");
    assert_eq!(certificate.verification_type_id, "abc");
    assert_eq!(certificate.timestamp_s, 1_700_000_000);
    assert_eq!(certificate.claims["fullName"], json!("Jane Doe"));
    assert_eq!(certificate.claims["workEmail"], json!("jane@co.com"));
    assert_eq!(certificate.claims["companyName"], json!("Co"));
    assert_eq!(certificate.claims["email"], json!("jane@co.com"));
    assert_eq!(certificate.claims["method"], json!("GET"));
    for key in RESERVED_CLAIM_KEYS {
        assert!(!certificate.claims.contains_key(key));
    }
    assert_eq!(certificate.context.unwrap()["identifier"], json!("0xabc"));
}

#[tokio::test]
async fn empty_metadata_is_not_attached() {
    let backend = FakeBackend::new(Script::Prove);
    let verifier = verifier(backend.clone());

    verifier
        .initialize_session(&VerificationRequestOptions::new("abc"))
        .await
        .unwrap();
    verifier
        .initialize_session(&VerificationRequestOptions::new("abc").with_metadata(Map::new()))
        .await
        .unwrap();

    assert_eq!(backend.inits(), 2);
    assert!(backend.recorded.lock().unwrap().contexts.is_empty());
}

#[tokio::test]
async fn callback_url_and_setup_are_forwarded() {
    let backend = FakeBackend::new(Script::Prove);
    let setup = ProofRequestSetup {
        use_app_clip: true,
        log: false,
        custom_share_page_url: None,
    };
    let verifier = Verifier::builder()
        .with_config(VerifierConfig::new("app-id", "app-secret"))
        .with_backend(backend.clone())
        .with_setup(setup.clone())
        .build()
        .unwrap();

    verifier
        .initialize_session(
            &VerificationRequestOptions::new("abc")
                .with_callback_url("https://app.example.com/callback"),
        )
        .await
        .unwrap();

    let recorded = backend.recorded.lock().unwrap();
    assert_eq!(
        recorded.callback_urls,
        vec!["https://app.example.com/callback".to_owned()]
    );
    assert_eq!(recorded.setups, vec![setup]);
}

#[tokio::test]
async fn session_resolves_at_most_once() {
    let backend = FakeBackend::new(Script::Prove);
    let verifier = verifier(backend.clone());

    let session = verifier
        .initialize_session(&VerificationRequestOptions::new("abc"))
        .await
        .unwrap();

    verifier.verify(&session.session_id).await.unwrap();
    let err = verifier.verify(&session.session_id).await.unwrap_err();

    assert!(matches!(err, VerificationError::SessionNotFound(id) if id == session.session_id));
    assert_eq!(backend.started(), 1);
}

#[tokio::test]
async fn unknown_session_is_not_found() {
    let backend = FakeBackend::new(Script::Prove);
    let verifier = verifier(backend.clone());

    let err = verifier.verify("never_issued").await.unwrap_err();

    assert!(matches!(err, VerificationError::SessionNotFound(_)));
    assert_eq!(backend.inits(), 0);
    assert_eq!(backend.started(), 0);
}

#[tokio::test]
async fn provider_error_consumes_session() {
    let backend = FakeBackend::new(Script::Fail);
    let verifier = verifier(backend.clone());

    let session = verifier
        .initialize_session(&VerificationRequestOptions::new("abc"))
        .await
        .unwrap();

    let err = verifier.verify(&session.session_id).await.unwrap_err();
    assert!(matches!(err, VerificationError::ProviderVerification(_)));
    assert!(err.to_string().contains("user rejected the proof"));

    let err = verifier.verify(&session.session_id).await.unwrap_err();
    assert!(matches!(err, VerificationError::SessionNotFound(_)));
}

#[tokio::test]
async fn hangup_without_result_is_a_verification_error() {
    let backend = FakeBackend::new(Script::Hangup);
    let verifier = verifier(backend.clone());

    let session = verifier
        .initialize_session(&VerificationRequestOptions::new("abc"))
        .await
        .unwrap();

    let err = verifier.verify(&session.session_id).await.unwrap_err();
    assert!(matches!(err, VerificationError::ProviderVerification(_)));

    let err = verifier.verify(&session.session_id).await.unwrap_err();
    assert!(matches!(err, VerificationError::SessionNotFound(_)));
}

#[tokio::test]
async fn empty_proof_list_is_a_verification_error() {
    let backend = FakeBackend::new(Script::Respond(json!([])));
    let verifier = verifier(backend.clone());

    let session = verifier
        .initialize_session(&VerificationRequestOptions::new("abc"))
        .await
        .unwrap();

    let err = verifier.verify(&session.session_id).await.unwrap_err();
    assert!(matches!(err, VerificationError::ProviderVerification(_)));
    assert!(err.to_string().contains("no proof received"));

    let err = verifier.verify(&session.session_id).await.unwrap_err();
    assert!(matches!(err, VerificationError::SessionNotFound(_)));
}

#[tokio::test]
async fn failed_session_start_consumes_session() {
    let backend = FakeBackend::new(Script::FailStart);
    let verifier = verifier(backend.clone());

    let session = verifier
        .initialize_session(&VerificationRequestOptions::new("abc"))
        .await
        .unwrap();

    let err = verifier.verify(&session.session_id).await.unwrap_err();
    assert!(matches!(err, VerificationError::ProviderVerification(_)));
    assert!(err.to_string().contains("session socket refused"));

    let err = verifier.verify(&session.session_id).await.unwrap_err();
    assert!(matches!(err, VerificationError::SessionNotFound(_)));
    assert_eq!(backend.started(), 1);
}

#[tokio::test]
async fn concurrent_wait_on_claimed_session_fails() {
    let backend = FakeBackend::new(Script::Silent);
    let verifier = verifier(backend.clone());

    let session = verifier
        .initialize_session(&VerificationRequestOptions::new("abc"))
        .await
        .unwrap();

    let first = tokio::spawn({
        let verifier = verifier.clone();
        let session_id = session.session_id.clone();
        async move { verifier.verify(&session_id).await }
    });

    while backend.started() == 0 {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    let err = verifier.verify(&session.session_id).await.unwrap_err();
    assert!(matches!(err, VerificationError::SessionNotFound(_)));

    let listener = backend.recorded.lock().unwrap().pending.pop().unwrap();
    listener.on_success(json!({ "extractedParameterValues": { "email": "jane@co.com" } }));

    let certificate = first.await.unwrap().unwrap();
    assert_eq!(certificate.claims["email"], json!("jane@co.com"));
    assert_eq!(backend.started(), 1);
}

#[tokio::test]
async fn multiple_proofs_merge_in_order() {
    let response = json!([
        {
            "providerId": "employer",
            "timestampS": 1_600_000_000u64,
            "extractedParameterValues": { "email": "old@co.com", "companyName": "Co" }
        },
        {
            "providerId": "other",
            "timestampS": 1_700_000_000u64,
            "extractedParameterValues": { "email": "new@co.com" }
        }
    ]);
    let backend = FakeBackend::new(Script::Respond(response.clone()));
    let verifier = verifier(backend);

    let session = verifier
        .initialize_session(&VerificationRequestOptions::new("employer"))
        .await
        .unwrap();
    let certificate = verifier.verify(&session.session_id).await.unwrap();

    assert_eq!(certificate.claims["email"], json!("new@co.com"));
    assert_eq!(certificate.claims["companyName"], json!("Co"));
    assert_eq!(certificate.verification_type_id, "employer");
    assert_eq!(certificate.timestamp_s, 1_600_000_000);
    assert_eq!(certificate.context, Some(response));
}

#[tokio::test]
async fn session_ids_are_distinct() {
    for script in [Script::Prove, Script::Anonymous] {
        let verifier = verifier(FakeBackend::new(script));

        let mut ids = Vec::new();
        for _ in 0..5 {
            let session = verifier
                .initialize_session(&VerificationRequestOptions::new("abc"))
                .await
                .unwrap();
            assert!(!ids.contains(&session.session_id));
            ids.push(session.session_id);
        }
    }
}

#[tokio::test]
async fn anonymous_request_gets_fallback_session_id() {
    let verifier = verifier(FakeBackend::new(Script::Anonymous));

    let session = verifier
        .initialize_session(&VerificationRequestOptions::new("abc"))
        .await
        .unwrap();
    assert!(session.session_id.starts_with("reclaim_session_"));

    let certificate = verifier.verify(&session.session_id).await.unwrap();
    assert_eq!(certificate.session_id, session.session_id);
}

#[tokio::test]
async fn initialization_failures_register_nothing() {
    for script in [Script::FailInit, Script::FailUrl] {
        let backend = FakeBackend::new(script);
        let verifier = verifier(backend.clone());

        let err = verifier
            .initialize_session(&VerificationRequestOptions::new("abc"))
            .await
            .unwrap_err();
        assert!(matches!(err, VerificationError::ProviderInitialization(_)));

        let err = verifier.verify("fake_session_1").await.unwrap_err();
        assert!(matches!(err, VerificationError::SessionNotFound(_)));
        assert_eq!(backend.started(), 0);
    }
}

#[test]
fn provider_selection_performs_no_io() {
    let backend = FakeBackend::new(Script::Prove);

    let reclaim = Verifier::builder()
        .with_config(VerifierConfig::new("app-id", "app-secret"))
        .with_backend(backend.clone())
        .build()
        .unwrap();
    assert_eq!(reclaim.provider_name(), "reclaim");

    let mock = Verifier::builder()
        .with_config(VerifierConfig::new("app-id", "app-secret").with_provider("mock"))
        .with_backend(backend.clone())
        .build()
        .unwrap();
    assert_eq!(mock.provider_name(), "mock");

    let err = Verifier::builder()
        .with_config(VerifierConfig::new("app-id", "app-secret").with_provider("primus"))
        .with_backend(backend.clone())
        .build()
        .unwrap_err();
    assert!(matches!(err, VerificationError::Configuration(_)));

    let err = Verifier::builder()
        .with_config(VerifierConfig::new("", "app-secret"))
        .with_backend(backend.clone())
        .build()
        .unwrap_err();
    assert!(matches!(err, VerificationError::Configuration(_)));

    assert_eq!(backend.inits(), 0);
}
