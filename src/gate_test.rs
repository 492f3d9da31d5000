use super::*;

fn login_redirect(reason: Denial) -> Admission {
    Admission::Redirect { to: Route::Login, reason }
}

#[test]
fn anonymous_denied_for_every_role() {
    let session = Session::anonymous();
    for role in Role::ALL {
        assert!(!can_access(role, &session));
        assert_eq!(admit(role, &session), login_redirect(Denial::NotAuthenticated));
    }
}

#[test]
fn matching_role_allowed() {
    for role in Role::ALL {
        let session = Session::authenticated("tok", role);
        assert!(can_access(role, &session));
        assert_eq!(admit(role, &session), Admission::Allow);
    }
}

#[test]
fn mismatched_role_denied() {
    for held in Role::ALL {
        for required in Role::ALL.into_iter().filter(|r| *r != held) {
            let session = Session::authenticated("tok", held);
            assert!(!can_access(required, &session));
            assert_eq!(
                admit(required, &session),
                login_redirect(Denial::RoleMismatch { required, actual: held })
            );
        }
    }
}

#[test]
fn empty_store_denies_student_view() {
    let store = crate::session::SessionStore::open(crate::storage::MemoryStorage::new()).unwrap();
    assert!(!store.is_authenticated());
    let admission = admit(Role::Student, &store.snapshot());
    assert!(matches!(admission, Admission::Redirect { to: Route::Login, .. }));
}

#[test]
fn admin_login_allows_admin_and_denies_student() {
    let store = crate::session::SessionStore::open(crate::storage::MemoryStorage::new()).unwrap();
    store.login("tok123", Role::Admin).unwrap();
    let session = store.snapshot();
    assert!(can_access(Role::Admin, &session));
    assert!(!can_access(Role::Student, &session));
}

#[test]
fn denial_does_not_clear_session() {
    let store = crate::session::SessionStore::open(crate::storage::MemoryStorage::new()).unwrap();
    store.login("tok123", Role::Student).unwrap();
    let _ = admit(Role::Admin, &store.snapshot());
    assert!(store.is_authenticated());
    assert_eq!(store.role(), Some(Role::Student));
}

#[test]
fn empty_token_still_counts_as_authenticated() {
    // Token format is opaque; presence is all that matters.
    let session = Session::authenticated("", Role::Student);
    assert!(can_access(Role::Student, &session));
}
