//! Chain invariant tests: single root, no forks, no cycles, ordering.

use crate::migration::domain::{MigrationChain, MigrationError, Revision, RevisionId};
use rstest::rstest;

fn rev(id: &str, down: Option<&str>) -> Revision {
    let revision_id = RevisionId::new(id).expect("valid revision id");
    let parent = down.map(|value| RevisionId::new(value).expect("valid parent id"));
    Revision::new(revision_id, parent, format!("-- {id}\nSELECT 1;"))
}

#[rstest]
fn orders_revisions_by_their_links_not_input_order() {
    let chain = MigrationChain::from_revisions(vec![
        rev("c", Some("b")),
        rev("a", None),
        rev("b", Some("a")),
    ])
    .expect("valid chain");

    let ids: Vec<&str> = chain
        .ordered()
        .iter()
        .map(|revision| revision.id().as_str())
        .collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
    assert_eq!(chain.head().map(|revision| revision.id().as_str()), Some("c"));
    assert_eq!(chain.len(), 3);
}

#[rstest]
fn empty_chains_are_allowed() {
    let chain = MigrationChain::from_revisions(Vec::new()).expect("empty chain");
    assert!(chain.is_empty());
    assert!(chain.head().is_none());
}

#[rstest]
fn single_revision_is_both_root_and_head() {
    let chain = MigrationChain::from_revisions(vec![rev("only", None)]).expect("valid chain");
    assert_eq!(chain.len(), 1);
    assert_eq!(chain.head().map(|revision| revision.id().as_str()), Some("only"));
}

#[rstest]
fn rejects_duplicate_ids() {
    let result = MigrationChain::from_revisions(vec![rev("a", None), rev("a", None)]);
    assert!(matches!(result, Err(MigrationError::DuplicateRevision(_))));
}

#[rstest]
fn rejects_two_roots() {
    let result = MigrationChain::from_revisions(vec![rev("a", None), rev("b", None)]);
    assert!(matches!(result, Err(MigrationError::MultipleRoots)));
}

#[rstest]
fn rejects_a_dangling_parent() {
    let result = MigrationChain::from_revisions(vec![rev("a", None), rev("b", Some("missing"))]);
    assert!(matches!(
        result,
        Err(MigrationError::UnknownParent { id, parent })
            if id.as_str() == "b" && parent.as_str() == "missing"
    ));
}

#[rstest]
fn rejects_forked_history() {
    let result = MigrationChain::from_revisions(vec![
        rev("a", None),
        rev("b", Some("a")),
        rev("c", Some("a")),
    ]);
    assert!(matches!(
        result,
        Err(MigrationError::Fork { parent }) if parent.as_str() == "a"
    ));
}

#[rstest]
fn rejects_a_cycle_off_the_main_path() {
    let result = MigrationChain::from_revisions(vec![
        rev("a", None),
        rev("b", Some("c")),
        rev("c", Some("b")),
    ]);
    assert!(matches!(result, Err(MigrationError::Cycle)));
}

#[rstest]
fn rejects_a_chain_without_a_root() {
    let result = MigrationChain::from_revisions(vec![rev("a", Some("b")), rev("b", Some("a"))]);
    assert!(matches!(result, Err(MigrationError::MissingRoot)));
}

#[rstest]
fn pending_after_slices_the_remaining_path() {
    let chain = MigrationChain::from_revisions(vec![
        rev("a", None),
        rev("b", Some("a")),
        rev("c", Some("b")),
    ])
    .expect("valid chain");

    let all = chain.pending_after(None).expect("full path");
    assert_eq!(all.len(), 3);

    let current = RevisionId::new("b").expect("valid revision id");
    let pending = chain.pending_after(Some(&current)).expect("partial path");
    let ids: Vec<&str> = pending.iter().map(|revision| revision.id().as_str()).collect();
    assert_eq!(ids, vec!["c"]);

    let head = RevisionId::new("c").expect("valid revision id");
    assert!(chain.pending_after(Some(&head)).expect("empty path").is_empty());
}

#[rstest]
fn pending_after_rejects_unknown_revisions() {
    let chain = MigrationChain::from_revisions(vec![rev("a", None)]).expect("valid chain");
    let stranger = RevisionId::new("stranger").expect("valid revision id");
    let result = chain.pending_after(Some(&stranger));
    assert!(matches!(result, Err(MigrationError::UnknownApplied { .. })));
}

#[rstest]
fn checksums_are_stable_and_content_sensitive() {
    let first = rev("a", None);
    let again = rev("a", None);
    assert_eq!(first.checksum(), again.checksum());
    assert_eq!(first.checksum().to_hex().len(), 64);

    let changed = Revision::new(
        RevisionId::new("a").expect("valid revision id"),
        None,
        "SELECT 2;".to_owned(),
    );
    assert_ne!(first.checksum(), changed.checksum());
}
