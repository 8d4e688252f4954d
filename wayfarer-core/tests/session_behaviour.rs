//! Behavioural tests for the session store.

mod support;

use std::cell::RefCell;
use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{Duration, Utc};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use wayfarer_core::test_support::{MemoryAuthService, MemoryTokenStore};
use wayfarer_core::{Credentials, RecordingNavigator, Role, ServiceError, Session, TokenStore};

use support::{block_on, user};

struct SessionWorld {
    auth: RefCell<Arc<MemoryAuthService>>,
    tokens: Arc<MemoryTokenStore>,
    navigator: Arc<RecordingNavigator>,
    session: RefCell<Option<Session<Arc<MemoryAuthService>>>>,
}

impl SessionWorld {
    fn session(&self) -> std::cell::RefMut<'_, Option<Session<Arc<MemoryAuthService>>>> {
        let mut slot = self.session.borrow_mut();
        if slot.is_none() {
            *slot = Some(Session::new(
                Arc::clone(&self.auth.borrow()),
                Arc::clone(&self.tokens) as Arc<dyn TokenStore>,
                Arc::clone(&self.navigator) as Arc<dyn wayfarer_core::Navigator>,
            ));
        }
        slot
    }

    fn with_session<T>(&self, action: impl FnOnce(&mut Session<Arc<MemoryAuthService>>) -> T) -> T {
        let mut slot = self.session();
        match slot.as_mut() {
            Some(session) => action(session),
            None => panic!("session should be initialised"),
        }
    }
}

#[fixture]
fn world() -> SessionWorld {
    SessionWorld {
        auth: RefCell::new(Arc::new(MemoryAuthService::default())),
        tokens: Arc::new(MemoryTokenStore::default()),
        navigator: Arc::new(RecordingNavigator::at("/")),
        session: RefCell::new(None),
    }
}

fn login(world: &SessionWorld, password: &str) {
    let credentials = Credentials {
        email: "tourist-1@example.com".to_owned(),
        password: password.to_owned(),
    };
    let _ = world.with_session(|session| block_on(session.login(&credentials)));
}

#[given("a stored token that expired yesterday")]
fn expired_token(#[from(world)] world: &SessionWorld) {
    let exp = (Utc::now() - Duration::days(1)).timestamp();
    let claims = URL_SAFE_NO_PAD.encode(format!(r#"{{"id":"u1","exp":{exp}}}"#));
    let stored = world.tokens.store(&format!("header.{claims}.signature"));
    assert!(stored.is_ok());
}

#[given("a registered tourist")]
fn registered_tourist(#[from(world)] world: &SessionWorld) {
    world.auth.replace(Arc::new(MemoryAuthService::with_account(
        user("tourist-1", "Tourist"),
        "secret",
    )));
}

#[given("the backend fails when loading the current user")]
fn current_user_fails(#[from(world)] world: &SessionWorld) {
    world.auth.borrow().fail_current_user(ServiceError::Server {
        status: 503,
        message: Some("Profile service unavailable".to_owned()),
    });
}

#[when("the session initialises")]
fn initialise(#[from(world)] world: &SessionWorld) {
    world.with_session(|session| {
        let _ = block_on(session.init());
        assert!(!session.is_loading());
    });
}

#[when("the tourist logs in")]
fn tourist_logs_in(#[from(world)] world: &SessionWorld) {
    login(world, "secret");
}

#[when("the tourist logs in with the wrong password")]
fn wrong_password(#[from(world)] world: &SessionWorld) {
    login(world, "guess");
}

#[when("the tourist logs out")]
fn tourist_logs_out(#[from(world)] world: &SessionWorld) {
    world.with_session(Session::logout);
}

#[then("nobody is signed in")]
fn nobody(#[from(world)] world: &SessionWorld) {
    world.with_session(|session| {
        assert!(!session.is_authenticated());
        assert_eq!(session.role(), None);
    });
}

#[then("the stored token is cleared")]
fn token_cleared(#[from(world)] world: &SessionWorld) {
    assert_eq!(world.tokens.token(), None);
}

#[then("the backend was not asked for the current user")]
fn no_network(#[from(world)] world: &SessionWorld) {
    assert_eq!(world.auth.borrow().current_user_calls(), 0);
}

#[then("the tourist is signed in with the tourist role")]
fn signed_in(#[from(world)] world: &SessionWorld) {
    world.with_session(|session| {
        assert_eq!(session.role(), Some(Role::Tourist));
        assert_eq!(session.last_error(), None);
    });
}

#[then("the token is stored")]
fn token_stored(#[from(world)] world: &SessionWorld) {
    assert_eq!(world.tokens.token().as_deref(), Some("token-tourist-1"));
}

#[then("the last error is {message}")]
fn last_error(#[from(world)] world: &SessionWorld, message: String) {
    world.with_session(|session| {
        assert_eq!(session.last_error(), Some(message.trim_matches('"')));
    });
}

#[then("the user is sent to the login page")]
fn sent_to_login(#[from(world)] world: &SessionWorld) {
    assert_eq!(world.navigator.redirects(), vec!["/login".to_owned()]);
}

#[scenario(path = "tests/features/session.feature", index = 0)]
fn expired_token_is_discarded(world: SessionWorld) {
    let _ = (world,);
}

#[scenario(path = "tests/features/session.feature", index = 1)]
fn login_persists_token(world: SessionWorld) {
    let _ = (world,);
}

#[scenario(path = "tests/features/session.feature", index = 2)]
fn rejected_login_keeps_message(world: SessionWorld) {
    let _ = (world,);
}

#[scenario(path = "tests/features/session.feature", index = 3)]
fn logout_returns_to_login(world: SessionWorld) {
    let _ = (world,);
}

#[scenario(path = "tests/features/session.feature", index = 4)]
fn failed_user_lookup_clears_token(world: SessionWorld) {
    let _ = (world,);
}
