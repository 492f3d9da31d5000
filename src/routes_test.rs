use super::*;

// =============================================================================
// Route table
// =============================================================================

#[test]
fn paths_round_trip_through_from_path() {
    for route in Route::ALL {
        assert_eq!(Route::from_path(route.path()), Some(route));
    }
}

#[test]
fn from_path_ignores_trailing_slash() {
    assert_eq!(Route::from_path("/profile/"), Some(Route::Profile));
    assert_eq!(Route::from_path("/"), Some(Route::Login));
}

#[test]
fn from_path_ignores_query_and_fragment() {
    assert_eq!(Route::from_path("/review-feedback?assignmentId=3"), Some(Route::ReviewFeedback));
    assert_eq!(Route::from_path("/collaboration/?tab=files#top"), Some(Route::Collaboration));
    assert_eq!(Route::from_path("/?next=/profile"), Some(Route::Login));
    assert_eq!(Route::from_path("/reviews?assignmentId=3"), None);
}

#[test]
fn navigate_with_query_resolves_route() {
    let session = Session::authenticated("tok", Role::Student);
    assert_eq!(
        navigate("/review-feedback?assignmentId=3", &session),
        Ok(Navigation::Render(Route::ReviewFeedback))
    );
}

#[test]
fn from_path_unknown_is_none() {
    assert_eq!(Route::from_path("/dashboard"), None);
    assert_eq!(Route::from_path(""), None);
}

#[test]
fn public_routes_need_no_role() {
    assert_eq!(Route::Login.required_role(), None);
    assert_eq!(Route::Register.required_role(), None);
}

#[test]
fn only_admin_dashboard_requires_admin() {
    let admin_routes: Vec<Route> =
        Route::ALL.into_iter().filter(|r| r.required_role() == Some(Role::Admin)).collect();
    assert_eq!(admin_routes, vec![Route::AdminDashboard]);
}

#[test]
fn landing_depends_on_role() {
    assert_eq!(landing(Role::Admin), Route::AdminDashboard);
    assert_eq!(landing(Role::Student), Route::StudentDashboard);
}

// =============================================================================
// Navigation
// =============================================================================

#[test]
fn public_route_renders_for_anonymous() {
    let session = Session::anonymous();
    assert_eq!(resolve(Route::Register, &session), Navigation::Render(Route::Register));
}

#[test]
fn protected_route_redirects_anonymous_to_login() {
    let nav = navigate("/collaboration", &Session::anonymous()).unwrap();
    assert_eq!(nav, Navigation::Redirect { to: Route::Login, reason: Denial::NotAuthenticated });
}

#[test]
fn student_cannot_open_admin_dashboard() {
    let session = Session::authenticated("tok", Role::Student);
    let nav = navigate("/admin-dashboard", &session).unwrap();
    assert_eq!(
        nav,
        Navigation::Redirect {
            to: Route::Login,
            reason: Denial::RoleMismatch { required: Role::Admin, actual: Role::Student },
        }
    );
}

#[test]
fn admin_cannot_open_student_views() {
    let session = Session::authenticated("tok", Role::Admin);
    for route in Route::ALL.into_iter().filter(|r| r.required_role() == Some(Role::Student)) {
        assert!(matches!(resolve(route, &session), Navigation::Redirect { to: Route::Login, .. }));
    }
}

#[test]
fn landing_route_is_always_admitted() {
    for role in Role::ALL {
        let session = Session::authenticated("tok", role);
        assert_eq!(resolve(landing(role), &session), Navigation::Render(landing(role)));
    }
}

#[test]
fn navigate_unknown_path_is_error() {
    let err = navigate("/forgot-password", &Session::anonymous()).unwrap_err();
    assert_eq!(err, RouteError::NotFound("/forgot-password".to_owned()));
}

// =============================================================================
// Nav bar
// =============================================================================

#[test]
fn nav_items_for_anonymous() {
    assert_eq!(
        nav_items(&Session::anonymous()),
        vec![
            NavItem::Link { label: "Login", route: Route::Login },
            NavItem::Link { label: "Register", route: Route::Register },
        ]
    );
}

#[test]
fn nav_items_for_admin() {
    let session = Session::authenticated("tok", Role::Admin);
    assert_eq!(
        nav_items(&session),
        vec![NavItem::Link { label: "Dashboard", route: Route::AdminDashboard }, NavItem::Logout]
    );
}

#[test]
fn nav_items_for_student_are_all_admitted() {
    let session = Session::authenticated("tok", Role::Student);
    let items = nav_items(&session);
    assert_eq!(items.len(), 4);
    assert_eq!(items.last(), Some(&NavItem::Logout));
    for item in items {
        if let NavItem::Link { route, .. } = item {
            assert_eq!(resolve(route, &session), Navigation::Render(route));
        }
    }
}
