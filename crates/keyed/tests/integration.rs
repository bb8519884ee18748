pub mod fixtures;

use fixtures::*;
use keyed::prelude::*;
use std::sync::Arc;

#[test]
fn test_identity_across_calls() {
    let factory = contacts(&directory());

    let a = factory.construct("ada", Some("Ada".into()));
    let b = factory.construct("ada", Some("Ada L.".into()));

    assert_eq!(a, b);
    assert_eq!(factory.len(), 1);
}

#[test]
fn test_key_is_immutable_string_form() {
    let factory = contacts(&directory());

    let entity = factory.construct(42_u64, None);
    assert_eq!(entity.key(), "42");
    assert_eq!(factory.construct("42", None), entity);
    assert!(factory.loaded(42_u64));
}

#[test]
fn test_reconfiguration_keeps_identity() {
    let factory = contacts(&directory());

    let first = factory.construct("ada", Some("Ada".into()));
    let second = factory.construct("ada", Some("Countess".into()));

    assert!(Entity::ptr_eq(&first, &second));
    assert_eq!(first.read().name.as_deref(), Some("Countess"));
    assert_eq!(first.read().configured, 2);
}

#[test]
fn test_select_order_length_and_defaults() {
    let factory = contacts(&directory());
    let known = factory.construct("b", Some("Bob".into()));

    let selected = factory.select(["a", "b", "c", "a"]);

    assert_eq!(selected.len(), 4);
    let keys: Vec<&str> = selected.iter().map(|e| e.key().as_str()).collect();
    assert_eq!(keys, ["a", "b", "c", "a"]);
    assert_eq!(selected[1], known);
    assert_eq!(selected[0], selected[3]);
    assert_eq!(known.read().configured, 1);

    let fresh = &selected[0];
    assert_eq!(fresh.read().name, None);
    assert_eq!(fresh.read().configured, 1);
    assert_eq!(factory.len(), 3);
}

#[test]
fn test_purge_frees_the_key() {
    let factory = contacts(&directory());

    let old = factory.fetch("ada");
    old.purge();

    assert!(!factory.loaded("ada"));
    let new = factory.fetch("ada");
    assert_ne!(old, new);
    assert!(factory.loaded("ada"));
}

#[test]
fn test_purge_freezes_but_values_stay_readable() {
    let factory = contacts(&directory());

    let entity = factory.construct("ada", Some("Ada".into()));
    entity.purge();

    let res = entity.update(|c| c.name = Some("changed".into()));
    assert!(matches!(res, Err(KeyedError::Purged { ref key, .. }) if key == "ada"));
    assert!(entity.replace(Contact::default()).is_err());
    assert_eq!(entity.read().name.as_deref(), Some("Ada"));
}

#[test]
fn test_assign_supersedes_previous() {
    let dir = directory();
    let factory = contacts(&dir);
    let old = factory.construct("ada", Some("Ada".into()));
    let replacement = Entity::new("ada", Contact::default(), Arc::clone(&dir));

    let previous = factory.assign("ada", replacement.clone()).expect("Assign failed");

    assert_eq!(previous.as_ref(), Some(&old));
    assert!(old.is_purged());
    assert_eq!(factory.fetch("ada"), replacement);
    assert_eq!(replacement.read().configured, 1);
}

#[test]
fn test_assign_rejects_purged_value() {
    let factory = contacts(&directory());
    let entity = factory.fetch("ada");
    entity.purge();

    let res = factory.assign("ada", entity);

    assert!(matches!(res, Err(KeyedError::Purged { .. })));
    assert!(!factory.loaded("ada"));
}

#[test]
fn test_verify_policy_rejects_mismatched_key() {
    let dir = directory();
    let factory = contacts_with(&dir, AssignPolicy::Verify);
    let existing = factory.fetch("ada");
    let stranger = Entity::new("grace", Contact::default(), Arc::clone(&dir));

    let err = factory.assign("ada", stranger).unwrap_err();

    assert!(matches!(err, KeyedError::KeyMismatch { .. }));
    assert_eq!(
        err.to_string(),
        "Key mismatch (contacts): expected 'ada', entity reports 'grace'"
    );
    assert_eq!(factory.peek("ada"), Some(existing.clone()));
    assert!(!existing.is_purged());
}

#[test]
fn test_stale_handle_purge_leaves_successor() {
    let dir = directory();
    let factory = contacts(&dir);
    let stale = factory.fetch("ada");
    let successor = Entity::new("ada", Contact::default(), Arc::clone(&dir));
    factory.assign("ada", successor.clone()).expect("Assign failed");

    stale.purge();

    assert_eq!(factory.peek("ada"), Some(successor));
}

#[test]
fn test_purge_all_empties_and_freezes() {
    let factory = contacts(&directory());
    let entities = factory.select(["a", "b"]);

    assert_eq!(factory.purge_all(), 2);
    assert!(factory.is_empty());
    assert!(entities.iter().all(Keyed::is_purged));
}

#[test]
fn test_purge_after_factory_drop_only_freezes() {
    let entity = {
        let factory = contacts(&directory());
        factory.construct("ada", Some("Ada".into()))
    };

    entity.purge();

    assert!(entity.is_purged());
    assert_eq!(entity.read().name.as_deref(), Some("Ada"));
}

#[test]
fn test_shared_base_across_factories() {
    let dir = directory();
    let people = contacts(&dir);
    let teams = KeyedFactory::builder()
        .base(Arc::clone(&dir))
        .configure(|members: &mut Vec<String>, member: String| members.push(member))
        .build();

    let ada = people.fetch("ada");
    let core = teams.construct("core", "ada".to_owned());

    assert_eq!(ada.address(), "ada@example.org");
    assert_eq!(core.address(), "core@example.org");
    assert!(Arc::ptr_eq(people.base(), teams.base()));
}

#[test]
fn test_factories_do_not_share_keys() {
    let dir = directory();
    let left = contacts(&dir);
    let right = contacts(&dir);

    let a = left.fetch("ada");
    assert!(!right.loaded("ada"));
    assert_ne!(right.fetch("ada"), a);
}

#[test]
fn test_concurrent_construct_yields_one_entity() {
    let factory = contacts(&directory());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let factory = factory.clone();
            std::thread::spawn(move || factory.fetch("shared"))
        })
        .collect();

    let entities: Vec<_> = handles.into_iter().map(|h| h.join().expect("thread panicked")).collect();

    assert!(entities.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(entities[0].read().configured, 8);
    assert_eq!(factory.len(), 1);
}
