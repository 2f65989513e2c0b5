use chrono::{NaiveDate, Utc};
use hearth_core::family::FamilyStore;
use hearth_core::lists::{ListStore, ListType, NewListItem};
use hearth_core::{Database, StoreError};
use tempfile::{tempdir, TempDir};

fn setup() -> (TempDir, ListStore, String) {
    let dir = tempdir().unwrap();
    let db = Database::new(dir.path().join("hearth.sqlite")).unwrap();
    db.initialize().unwrap();
    let (family, _) = FamilyStore::new(db.clone())
        .create_family("The Parkers", "pat@example.com", None)
        .unwrap();
    (dir, ListStore::new(db), family.family_id)
}

#[test]
fn grocery_items_are_categorised() {
    let (_dir, lists, family_id) = setup();
    let list = lists
        .create_list(&family_id, "Weekly shop", ListType::Grocery, Some("pat@example.com"))
        .unwrap();
    let items = lists
        .add_items(
            &list.list_id,
            &[
                NewListItem::named("Bananas"),
                NewListItem::named("Cheddar cheese"),
                NewListItem::named("Mystery item"),
            ],
        )
        .unwrap();

    let categories = lists.categories(&family_id).unwrap();
    let name_of = |id: &Option<String>| {
        id.as_ref()
            .and_then(|id| categories.iter().find(|c| &c.category_id == id))
            .map(|c| c.name.clone())
    };
    assert_eq!(name_of(&items[0].category_id).as_deref(), Some("Produce"));
    assert_eq!(name_of(&items[1].category_id).as_deref(), Some("Dairy & Eggs"));
    assert_eq!(items[2].category_id, None);
    assert_eq!(
        items.iter().map(|item| item.position).collect::<Vec<_>>(),
        vec![0, 1, 2]
    );
}

#[test]
fn non_grocery_lists_skip_categories() {
    let (_dir, lists, family_id) = setup();
    let list = lists
        .create_list(&family_id, "Chores", ListType::Todo, None)
        .unwrap();
    let item = lists
        .add_item(
            &list.list_id,
            &NewListItem {
                name: "Buy bananas".into(),
                due_date: NaiveDate::from_ymd_opt(2025, 5, 1),
                ..NewListItem::default()
            },
        )
        .unwrap();
    assert_eq!(item.category_id, None);
    assert_eq!(item.due_date, NaiveDate::from_ymd_opt(2025, 5, 1));
}

#[test]
fn completing_grocery_items_records_history_once() {
    let (_dir, lists, family_id) = setup();
    let list = lists
        .create_list(&family_id, "Weekly shop", ListType::Grocery, None)
        .unwrap();
    let item = lists
        .add_item(&list.list_id, &NewListItem::named("Milk"))
        .unwrap();

    let now = Utc::now();
    let done = lists.set_completed(&item.item_id, true, now).unwrap();
    assert!(done.completed);
    lists.set_completed(&item.item_id, true, now).unwrap();

    let history = lists.completed_history(&family_id, 10).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].item_name, "Milk");
    assert_eq!(history[0].list_name, "Weekly shop");

    let undone = lists.set_completed(&item.item_id, false, now).unwrap();
    assert!(!undone.completed);
    assert_eq!(undone.completed_at, None);
}

#[test]
fn reorder_requires_the_full_item_set() {
    let (_dir, lists, family_id) = setup();
    let list = lists
        .create_list(&family_id, "Chores", ListType::Todo, None)
        .unwrap();
    let items = lists
        .add_items(
            &list.list_id,
            &[NewListItem::named("a"), NewListItem::named("b"), NewListItem::named("c")],
        )
        .unwrap();
    let ids: Vec<String> = items.iter().map(|item| item.item_id.clone()).collect();

    let partial = lists.reorder_items(&list.list_id, &ids[..2]);
    assert!(matches!(partial, Err(StoreError::Invalid { .. })));

    let reversed: Vec<String> = ids.iter().rev().cloned().collect();
    lists.reorder_items(&list.list_id, &reversed).unwrap();
    let names: Vec<String> = lists
        .items(&list.list_id)
        .unwrap()
        .into_iter()
        .map(|item| item.name)
        .collect();
    assert_eq!(names, vec!["c", "b", "a"]);
}

#[test]
fn archived_lists_are_hidden_by_default() {
    let (_dir, lists, family_id) = setup();
    let list = lists
        .create_list(&family_id, "Old", ListType::Other, None)
        .unwrap();
    lists.set_archived(&list.list_id, true).unwrap();
    assert!(lists.lists_for_family(&family_id, false).unwrap().is_empty());
    assert_eq!(lists.lists_for_family(&family_id, true).unwrap().len(), 1);

    let bad_color = lists.update_list(&list.list_id, None, None, Some("green"));
    assert!(bad_color.is_err());
    let updated = lists
        .update_list(&list.list_id, Some("Archive"), None, Some("#123abc"))
        .unwrap();
    assert_eq!(updated.name, "Archive");
    assert_eq!(updated.color, "#123abc");
}
