use accessible_places::{
    auth::AuthUser,
    error::AppError,
    models::Role,
    policy::{Action, Decision, authorize, decide},
};
use uuid::Uuid;

const OWNER: Uuid = Uuid::from_u128(10);
const OTHER: Uuid = Uuid::from_u128(11);
const ADMIN: Uuid = Uuid::from_u128(12);

fn owner() -> AuthUser {
    AuthUser::new(OWNER, vec![Role::User])
}

fn other() -> AuthUser {
    AuthUser::new(OTHER, vec![Role::User])
}

fn admin() -> AuthUser {
    AuthUser::new(ADMIN, vec![Role::Admin])
}

#[test]
fn test_any_identity_may_create() {
    for caller in [owner(), other(), admin()] {
        assert!(decide(&caller, Action::CreatePlace).is_allowed());
        assert!(decide(&caller, Action::CreateReview).is_allowed());
    }
}

#[test]
fn test_place_mutation_is_owner_or_admin() {
    for action in [
        Action::UpdatePlace { owner_id: OWNER },
        Action::DeletePlace { owner_id: OWNER },
    ] {
        assert!(decide(&owner(), action).is_allowed());
        assert!(decide(&admin(), action).is_allowed());
        assert!(!decide(&other(), action).is_allowed());
    }
}

#[test]
fn test_moderation_is_admin_only() {
    for action in [Action::ApprovePlace, Action::ListUnapprovedPlaces, Action::ListUsers] {
        assert_eq!(decide(&admin(), action), Decision::Allow);
        assert!(!decide(&owner(), action).is_allowed());
    }
}

#[test]
fn test_review_update_is_author_only_even_for_admins() {
    let action = Action::UpdateReview { author_id: OWNER };
    assert!(decide(&owner(), action).is_allowed());
    assert!(!decide(&admin(), action).is_allowed());
    assert!(!decide(&other(), action).is_allowed());
}

#[test]
fn test_review_delete_is_author_or_admin() {
    let action = Action::DeleteReview { author_id: OWNER };
    assert!(decide(&owner(), action).is_allowed());
    assert!(decide(&admin(), action).is_allowed());
    assert!(!decide(&other(), action).is_allowed());
}

#[test]
fn test_user_maintenance_is_self_or_admin() {
    for action in [
        Action::UpdateUser { user_id: OWNER },
        Action::DeleteUser { user_id: OWNER },
    ] {
        assert!(decide(&owner(), action).is_allowed());
        assert!(decide(&admin(), action).is_allowed());
        assert!(!decide(&other(), action).is_allowed());
    }
}

#[test]
fn test_authorize_maps_denial_to_access_denied() {
    let result = authorize(&other(), Action::DeletePlace { owner_id: OWNER });
    assert!(matches!(result, Err(AppError::AccessDenied(_))));
    assert!(authorize(&owner(), Action::DeletePlace { owner_id: OWNER }).is_ok());
}
