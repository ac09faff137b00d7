//! Tests for the JSON state entry points of the provider.

mod common;

use serde_json::{json, Value};
use std::sync::Arc;

use common::{FakeIncapsula, SiteGone};
use incapsula_provider::schema::ImportKind;
use incapsula_provider::{IncapsulaProvider, ProviderError, ProviderSettings, Sensitive};

fn setup() -> (Arc<FakeIncapsula>, IncapsulaProvider) {
    let mut settings = ProviderSettings::default();
    settings.propagation.min_window_ms = 0;
    settings.propagation.timeout_ms = 0;

    let fake = Arc::new(FakeIncapsula::new());
    let provider = IncapsulaProvider::new(fake.clone(), &settings);
    (fake, provider)
}

fn certificate_doc() -> Value {
    json!({
        "site_id": "100",
        "certificate": "BASE64A",
        "private_key": "PRIVATEKEY",
        "passphrase": "PASS",
    })
}

#[test]
fn test_resource_types_and_schemas() {
    let (_fake, provider) = setup();

    assert_eq!(provider.resource_types(), &["incapsula_certificate", "incapsula_user"]);

    let certificate = provider.schema("incapsula_certificate").unwrap();
    assert!(certificate.supports_update);
    assert_eq!(
        certificate.force_new_attributes().collect::<Vec<_>>(),
        vec!["site_id"]
    );

    let user = provider.schema("incapsula_user").unwrap();
    assert!(!user.supports_update);
    assert_eq!(user.import, ImportKind::Passthrough);

    assert!(matches!(
        provider.schema("incapsula_site").unwrap_err(),
        ProviderError::UnknownResource { .. }
    ));
}

#[tokio::test]
async fn test_certificate_state_hashes_secrets() {
    let (fake, provider) = setup();

    let state = provider.create("incapsula_certificate", certificate_doc()).await.unwrap();

    assert_eq!(state["id"], "12345");
    assert_eq!(state["site_id"], "100");
    assert_eq!(state["private_key"], Sensitive::new("PRIVATEKEY").state_hash());
    assert_eq!(state["passphrase"], Sensitive::new("PASS").state_hash());
    assert!(!state.to_string().contains("PRIVATEKEY"));

    // the API still received the clear-text key
    let stored = fake.certificate("100").unwrap();
    assert_eq!(stored.private_key.as_ref().map(Sensitive::expose), Some("PRIVATEKEY"));

    // refreshing does not hash the digest again
    let refreshed = provider.read("incapsula_certificate", state.clone()).await.unwrap();
    assert_eq!(refreshed, state);
}

#[tokio::test]
async fn test_certificate_read_of_deleted_site() {
    let (fake, provider) = setup();
    let state = provider.create("incapsula_certificate", certificate_doc()).await.unwrap();

    fake.delete_site("100", SiteGone::InResponse);
    let refreshed = provider.read("incapsula_certificate", state).await.unwrap();

    assert_eq!(refreshed["id"], Value::Null);
}

#[tokio::test]
async fn test_certificate_update_and_delete() {
    let (fake, provider) = setup();
    let state = provider.create("incapsula_certificate", certificate_doc()).await.unwrap();

    let mut planned = certificate_doc();
    planned["certificate"] = json!("BASE64B");
    let updated = provider.update("incapsula_certificate", state, planned).await.unwrap();
    assert_eq!(updated["certificate"], "BASE64B");
    assert_eq!(fake.certificate("100").unwrap().certificate, "BASE64B");

    let deleted = provider.delete("incapsula_certificate", updated).await.unwrap();
    assert_eq!(deleted["id"], Value::Null);
    assert!(fake.certificate("100").is_none());
}

#[tokio::test]
async fn test_user_lifecycle_through_documents() {
    let (fake, provider) = setup();
    fake.set_next_user_id(777);

    let state = provider
        .create(
            "incapsula_user",
            json!({"account_id": 5, "email": "a@b.com", "role_names": ["admin", "viewer"]}),
        )
        .await
        .unwrap();

    assert_eq!(state["id"], "777");
    assert_eq!(state["role_names"], json!(["admin", "viewer"]));
    assert!(state.get("first_name").is_none());

    let err = provider
        .update("incapsula_user", state.clone(), state.clone())
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::RequiresReplacement { .. }));

    let deleted = provider.delete("incapsula_user", state).await.unwrap();
    assert_eq!(deleted["id"], Value::Null);
}

#[tokio::test]
async fn test_partial_create_returns_state_document() {
    let (fake, provider) = setup();
    fake.set_next_user_id(777);
    fake.never_visible(5, "a@b.com");

    let err = provider
        .create(
            "incapsula_user",
            json!({"account_id": 5, "email": "a@b.com", "role_names": ["admin"]}),
        )
        .await
        .unwrap_err();

    let document = err.partial_state().unwrap().clone();
    assert_eq!(document["id"], "777");
    assert_eq!(document["email"], "a@b.com");

    // the persisted document drives a normal delete
    let deleted = provider.delete("incapsula_user", document).await.unwrap();
    assert_eq!(deleted["id"], Value::Null);
    assert_eq!(fake.call_count("AddUser"), 1);
}

#[tokio::test]
async fn test_certificate_partial_create_hashes_secrets() {
    let (fake, provider) = setup();
    fake.fail_transport("ListCertificates", "connection reset");

    let err = provider
        .create("incapsula_certificate", certificate_doc())
        .await
        .unwrap_err();

    let document = err.partial_state().unwrap();
    assert_eq!(document["id"], "12345");
    assert_eq!(
        document["private_key"],
        Sensitive::new("PRIVATEKEY").state_hash()
    );
}

#[test]
fn test_import() {
    let (_fake, provider) = setup();

    let user = provider
        .import("incapsula_user", "98765", json!({"account_id": 5, "email": "a@b.com"}))
        .unwrap();
    assert_eq!(user["id"], "98765");
    assert_eq!(user["email"], "a@b.com");

    let certificate = provider
        .import("incapsula_certificate", "ignored", json!({"site_id": "100"}))
        .unwrap();
    assert_eq!(certificate["id"], "12345");
    assert_eq!(certificate["site_id"], "100");
}

#[tokio::test]
async fn test_user_id_12345_stays_assigned() {
    let (fake, provider) = setup();
    fake.set_next_user_id(12345);

    let state = provider
        .create("incapsula_user", json!({"account_id": 5, "email": "a@b.com"}))
        .await
        .unwrap();
    assert_eq!(state["id"], "12345");

    let refreshed = provider.read("incapsula_user", state).await.unwrap();
    assert_eq!(refreshed["id"], "12345");
}

#[tokio::test]
async fn test_errors() {
    let (fake, provider) = setup();

    let err = provider.create("incapsula_site", json!({})).await.unwrap_err();
    assert!(matches!(err, ProviderError::UnknownResource { .. }));

    let err = provider
        .read("incapsula_user", json!({"id": "1", "account_id": "five"}))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::InvalidState { .. }));

    assert!(fake.calls().is_empty());
}
