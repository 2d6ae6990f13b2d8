//! Navigation helper against the in-memory site

mod support;

use formpilot_e2e::{E2eError, Navigator, PageTarget};
use support::{env_config, MockSite, BASE_URL};

#[tokio::test]
async fn go_to_page_lands_on_resolved_url() {
    let site = MockSite::new();
    let browser = site.open();
    let config = env_config();
    let nav = Navigator::new(&browser, &config);

    nav.go_to_page("register_student_page").await.unwrap();

    assert_eq!(
        browser.url(),
        config.registry.url_for("register_student_page").unwrap()
    );
}

#[tokio::test]
async fn unknown_page_fails_without_moving_the_browser() {
    let site = MockSite::new();
    let browser = site.open();
    let config = env_config();
    let nav = Navigator::new(&browser, &config);

    nav.go_to_page("landing_page").await.unwrap();
    let before = browser.url();

    let err = nav.go_to_page("no_such_page").await.unwrap_err();

    assert!(matches!(err, E2eError::UnknownPage { ref name } if name == "no_such_page"));
    assert_eq!(err.kind(), "UnknownPageError");
    assert_eq!(browser.url(), before);
    assert_eq!(site.navigations().len(), 1);
}

#[tokio::test]
async fn wrappers_match_go_to_page() {
    let site = MockSite::new();
    let config = env_config();

    let wrapped = site.open();
    let nav = Navigator::new(&wrapped, &config);
    nav.go_to_register_student().await.unwrap();
    let via_wrapper = wrapped.url();
    nav.go_to_register_teacher().await.unwrap();
    let teacher_via_wrapper = wrapped.url();
    nav.go_to_login().await.unwrap();
    let login_via_wrapper = wrapped.url();
    nav.go_to_landing().await.unwrap();
    let landing_via_wrapper = wrapped.url();

    let direct = site.open();
    let nav = Navigator::new(&direct, &config);
    nav.go_to_page(PageTarget::Name("register_student_page".into()))
        .await
        .unwrap();
    assert_eq!(direct.url(), via_wrapper);
    nav.go_to_page("register_teacher_page").await.unwrap();
    assert_eq!(direct.url(), teacher_via_wrapper);
    nav.go_to_page("login_page").await.unwrap();
    assert_eq!(direct.url(), login_via_wrapper);
    nav.go_to_page("landing_page").await.unwrap();
    assert_eq!(direct.url(), landing_via_wrapper);
    assert_eq!(landing_via_wrapper, format!("{}/landing", BASE_URL));
}

#[tokio::test]
async fn literal_locations_skip_the_registry() {
    let site = MockSite::new();
    let browser = site.open();
    let config = env_config();
    let nav = Navigator::new(&browser, &config);

    nav.go_to_page("/register/student").await.unwrap();
    assert_eq!(browser.url(), format!("{}/register/student", BASE_URL));
}

#[tokio::test]
async fn slow_page_times_out() {
    let site = MockSite::new();
    let browser = site.open();
    let config = env_config();
    let nav = Navigator::new(&browser, &config);

    let err = nav.go_to_page("slow_page").await.unwrap_err();
    assert!(matches!(err, E2eError::NavigationTimeout { .. }));
}

#[tokio::test]
async fn foreign_host_is_a_navigation_failure() {
    let site = MockSite::new();
    let browser = site.open();
    let config = env_config();
    let nav = Navigator::new(&browser, &config);

    let err = nav
        .go_to_page("https://elsewhere.test/login")
        .await
        .unwrap_err();
    assert!(matches!(err, E2eError::NavigationFailed { .. }));
}
