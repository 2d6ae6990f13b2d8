//! Session helper against the in-memory site

mod support;

use formpilot_common::Credentials;
use formpilot_e2e::{DriverError, E2eError, Navigator, SessionHelper};
use support::{env_config, MockSite, BASE_URL};

#[tokio::test]
async fn login_with_valid_credentials() {
    let site = MockSite::new().with_account("alice", "pw-alice");
    let browser = site.open();
    let config = env_config();
    let session = SessionHelper::new(Navigator::new(&browser, &config));

    session
        .login(&Credentials::new("alice", "pw-alice"))
        .await
        .unwrap();

    assert_eq!(browser.logged_in_as().as_deref(), Some("alice"));
    assert!(!browser.url().starts_with(&format!("{}/login", BASE_URL)));
}

#[tokio::test]
async fn wrong_password_is_an_authentication_error() {
    let site = MockSite::new().with_account("alice", "pw-alice");
    let browser = site.open();
    let config = env_config();
    let session = SessionHelper::new(Navigator::new(&browser, &config));

    let err = session
        .login(&Credentials::new("alice", "not-her-password"))
        .await
        .unwrap_err();

    assert!(matches!(err, E2eError::Authentication { ref username, .. } if username == "alice"));
    assert_eq!(browser.url(), format!("{}/login", BASE_URL));
    assert!(browser.logged_in_as().is_none());
}

#[tokio::test]
async fn login_for_user_uses_fixture() {
    let site = MockSite::new().with_account("existing", "existing-pw");
    let browser = site.open();
    let config = env_config();
    let session = SessionHelper::new(Navigator::new(&browser, &config));

    session.login_for_user("student").await.unwrap();
    assert_eq!(browser.logged_in_as().as_deref(), Some("existing"));
}

#[tokio::test]
async fn login_for_unknown_user_is_a_config_error() {
    let site = MockSite::new();
    let browser = site.open();
    let config = env_config();
    let session = SessionHelper::new(Navigator::new(&browser, &config));

    let err = session.login_for_user("teacher").await.unwrap_err();
    assert_eq!(err.kind(), "ConfigError");
    assert!(site.navigations().is_empty());
}

#[tokio::test]
async fn renamed_login_input_is_a_field_error() {
    let site = MockSite::new().with_account("alice", "pw-alice");
    site.remove_element("#password");
    let browser = site.open();
    let config = env_config();
    let session = SessionHelper::new(Navigator::new(&browser, &config));

    let err = session
        .login(&Credentials::new("alice", "pw-alice"))
        .await
        .unwrap_err();
    assert!(matches!(err, E2eError::FieldInteraction { ref selector, .. } if selector == "#password"));
}

#[tokio::test]
async fn browser_lost_during_login_is_not_an_authentication_error() {
    let site = MockSite::new().with_account("alice", "pw-alice");
    site.crash_on_click("#login_button");
    let browser = site.open();
    let config = env_config();
    let session = SessionHelper::new(Navigator::new(&browser, &config));

    let err = session
        .login(&Credentials::new("alice", "pw-alice"))
        .await
        .unwrap_err();
    assert!(matches!(err, E2eError::Driver(DriverError::Closed)));
    assert_eq!(err.kind(), "BrowserError");
}
