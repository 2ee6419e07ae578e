//! End-to-end family resolution scenarios over the in-memory stores.

mod common;

use common::{draft, TestApp};

use parivar::application::handlers::family::{ResolveFamilyQuery, ResolveFamilyTreeQuery};
use parivar::application::handlers::member::MemberDraft;
use parivar::domain::foundation::{FamilyId, MemberKey, MemberRef};
use parivar::domain::member::{Gender, MaritalStatus, Member};

fn keys(members: &[Member]) -> Vec<MemberKey> {
    members.iter().map(|m| *m.key()).collect()
}

/// Seeds the canonical Dad(F1, primary) / Son(F1) / Daughter(F2, married out)
/// constellation through the upsert engine.
async fn seed_household(app: &TestApp) -> (Member, Member, Member) {
    let dad = app.create(draft("Dad", Gender::Male, MaritalStatus::Married)).await;

    let mut son = draft("Son", Gender::Male, MaritalStatus::Single);
    son.father = Some(*dad.key());
    son.family_id = Some(dad.family_id().clone());
    let son = app.create(son).await;

    // The daughter lives under her husband's family but keeps her birth link.
    let mut daughter = draft("Daughter", Gender::Female, MaritalStatus::Married);
    daughter.father = Some(*dad.key());
    daughter.family_id = Some(FamilyId::new_request());
    let daughter = app.create(daughter).await;

    (dad, son, daughter)
}

#[tokio::test]
async fn cross_household_visibility_is_symmetric() {
    let app = TestApp::new();
    let (dad, son, daughter) = seed_household(&app).await;
    assert_ne!(dad.family_id(), daughter.family_id());

    let from_dad = app
        .resolve_family
        .handle(
            ResolveFamilyQuery {
                member: MemberRef::Key(*dad.key()),
            },
            &app.admin(),
        )
        .await
        .unwrap();
    let dad_keys = keys(&from_dad.members);
    assert!(dad_keys.contains(dad.key()));
    assert!(dad_keys.contains(son.key()));
    assert!(dad_keys.contains(daughter.key()));

    // Symmetric visibility through the shared father.
    let from_son = app
        .resolve_family
        .handle(
            ResolveFamilyQuery {
                member: MemberRef::Key(*son.key()),
            },
            &app.admin(),
        )
        .await
        .unwrap();
    let son_keys = keys(&from_son.members);
    assert!(son_keys.contains(dad.key()));
    assert!(son_keys.contains(daughter.key()));
}

#[tokio::test]
async fn tree_view_reaches_ancestors_of_married_out_member() {
    let app = TestApp::new();
    let (dad, son, daughter) = seed_household(&app).await;

    let resolved = app
        .resolve_tree
        .handle(
            ResolveFamilyTreeQuery {
                member: MemberRef::Public(daughter.member_id().clone()),
            },
            &app.admin(),
        )
        .await
        .unwrap();

    let resolved_keys = keys(&resolved);
    assert!(resolved_keys.contains(dad.key()), "ancestor must be included");
    assert!(
        resolved_keys.contains(son.key()),
        "sibling through the shared father must be included"
    );
}

#[tokio::test]
async fn marriage_only_link_surfaces_spouse_from_unrelated_household() {
    let app = TestApp::new();

    // X and Y end up in different households linked purely by marriage:
    // X marries, then Y is moved to a household of her own.
    let mut x = draft("X", Gender::Male, MaritalStatus::Married);
    x.spouse = Some(Box::new(MemberDraft {
        first_name: Some("Y".to_string()),
        ..MemberDraft::default()
    }));
    let x = app.create(x).await;
    let y_key = *x.spouse().expect("spouse must be linked");

    let y_move = MemberDraft {
        key: Some(y_key),
        family_id: Some(FamilyId::new_request()),
        ..MemberDraft::default()
    };
    let y = app.create(y_move).await;
    assert_ne!(x.family_id(), y.family_id());

    let resolved = app
        .resolve_family
        .handle(
            ResolveFamilyQuery {
                member: MemberRef::Key(*x.key()),
            },
            &app.admin(),
        )
        .await
        .unwrap();

    let resolved_keys = keys(&resolved.members);
    assert!(
        resolved_keys.contains(&y_key),
        "spouse must surface through marriage resolution alone"
    );

    // Injected links are symmetric on the in-memory copies.
    let rx = resolved.members.iter().find(|m| m.key() == x.key()).unwrap();
    let ry = resolved.members.iter().find(|m| *m.key() == y_key).unwrap();
    assert_eq!(rx.spouse(), Some(&y_key));
    assert_eq!(ry.spouse(), Some(x.key()));
}

#[tokio::test]
async fn resolution_is_idempotent_without_intervening_writes() {
    let app = TestApp::new();
    let (dad, _son, _daughter) = seed_household(&app).await;

    let query = || ResolveFamilyQuery {
        member: MemberRef::Key(*dad.key()),
    };
    let first = app.resolve_family.handle(query(), &app.admin()).await.unwrap();
    let second = app.resolve_family.handle(query(), &app.admin()).await.unwrap();

    let mut first_keys = keys(&first.members);
    let mut second_keys = keys(&second.members);
    first_keys.sort_by_key(|k| k.to_string());
    second_keys.sort_by_key(|k| k.to_string());
    assert_eq!(first_keys, second_keys);
}

#[tokio::test]
async fn unknown_target_fails_with_not_found() {
    let app = TestApp::new();
    let result = app
        .resolve_family
        .handle(
            ResolveFamilyQuery {
                member: MemberRef::Key(MemberKey::new()),
            },
            &app.admin(),
        )
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn grandchildren_of_the_household_appear_in_the_tree() {
    let app = TestApp::new();
    let (dad, _son, daughter) = seed_household(&app).await;

    // A child of the married-out daughter, in her household.
    let mut grandchild = draft("Grandchild", Gender::Male, MaritalStatus::Single);
    grandchild.mother = Some(*daughter.key());
    grandchild.family_id = Some(daughter.family_id().clone());
    let grandchild = app.create(grandchild).await;

    let resolved = app
        .resolve_tree
        .handle(
            ResolveFamilyTreeQuery {
                member: MemberRef::Key(*dad.key()),
            },
            &app.admin(),
        )
        .await
        .unwrap();

    assert!(keys(&resolved).contains(grandchild.key()));
}
