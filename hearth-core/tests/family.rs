use chrono::{Duration, Utc};
use hearth_core::expenses::{ExpenseStore, DEFAULT_EXPENSE_CATEGORIES};
use hearth_core::family::{FamilyStore, InvitationStatus, MemberRole};
use hearth_core::lists::{ListStore, DEFAULT_GROCERY_CATEGORIES};
use hearth_core::{Database, StoreError};
use tempfile::{tempdir, TempDir};

fn database() -> (TempDir, Database) {
    let dir = tempdir().unwrap();
    let db = Database::new(dir.path().join("hearth.sqlite")).unwrap();
    db.initialize().unwrap();
    (dir, db)
}

#[test]
fn creating_a_family_seeds_defaults() {
    let (_dir, db) = database();
    let families = FamilyStore::new(db.clone());
    let (family, owner) = families
        .create_family("The Parkers", "pat@example.com", Some("Pat"))
        .unwrap();

    assert_eq!(owner.role, MemberRole::Owner);
    assert_eq!(family.owner.as_deref(), Some("pat@example.com"));
    assert_eq!(
        ListStore::new(db.clone()).categories(&family.family_id).unwrap().len(),
        DEFAULT_GROCERY_CATEGORIES.len()
    );
    let expenses = ExpenseStore::new(db);
    assert_eq!(
        expenses.categories(&family.family_id).unwrap().len(),
        DEFAULT_EXPENSE_CATEGORIES.len()
    );
    assert_eq!(expenses.ensure_default_categories(&family.family_id).unwrap(), 0);
    assert_eq!(families.families_for("pat@example.com").unwrap().len(), 1);
}

#[test]
fn invitation_lifecycle() {
    let (_dir, db) = database();
    let families = FamilyStore::new(db);
    let (family, _) = families
        .create_family("The Parkers", "pat@example.com", None)
        .unwrap();
    let now = Utc::now();

    let first = families
        .create_invitation(&family.family_id, "sam@example.com", MemberRole::Member, "pat@example.com", now)
        .unwrap();
    assert_eq!(first.token.len(), 64);
    assert_eq!(first.expires_at - first.created_at.unwrap(), Duration::days(7));

    let second = families
        .create_invitation(&family.family_id, "sam@example.com", MemberRole::Admin, "pat@example.com", now)
        .unwrap();
    let first = families.fetch_invitation(&first.invitation_id).unwrap().unwrap();
    assert_eq!(first.status, InvitationStatus::Cancelled);

    let member = families
        .accept_invitation(&second.token, Some("Sam"), now + Duration::days(1))
        .unwrap();
    assert_eq!(member.role, MemberRole::Admin);
    assert_eq!(families.list_members(&family.family_id).unwrap().len(), 2);

    let again = families.accept_invitation(&second.token, None, now + Duration::days(1));
    assert!(matches!(again, Err(StoreError::Conflict(_))));
}

#[test]
fn expired_invitation_is_rejected() {
    let (_dir, db) = database();
    let families = FamilyStore::new(db);
    let (family, _) = families
        .create_family("The Parkers", "pat@example.com", None)
        .unwrap();
    let now = Utc::now();
    let invitation = families
        .create_invitation(&family.family_id, "kid@example.com", MemberRole::Child, "pat@example.com", now)
        .unwrap();

    let result = families.accept_invitation(&invitation.token, None, now + Duration::days(8));
    assert!(matches!(result, Err(StoreError::Conflict(_))));
    let invitation = families.fetch_invitation(&invitation.invitation_id).unwrap().unwrap();
    assert_eq!(invitation.status, InvitationStatus::Expired);
    assert!(families
        .member_for(&family.family_id, "kid@example.com")
        .unwrap()
        .is_none());
}

#[test]
fn owners_cannot_be_added_twice() {
    let (_dir, db) = database();
    let families = FamilyStore::new(db);
    let (family, _) = families
        .create_family("The Parkers", "pat@example.com", None)
        .unwrap();
    assert!(families
        .add_member(&family.family_id, "lee@example.com", None, MemberRole::Owner)
        .is_err());
    families
        .add_member(&family.family_id, "lee@example.com", None, MemberRole::Member)
        .unwrap();
    assert!(matches!(
        families.add_member(&family.family_id, "lee@example.com", None, MemberRole::Child),
        Err(StoreError::Conflict(_))
    ));
}
