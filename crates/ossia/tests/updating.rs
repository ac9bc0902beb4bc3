mod common;

use common::seeded;
use ossia::{find_node, set_updating};
use serde_json::json;

fn tree() -> serde_json::Value {
    json!({
        "child": {
            "@type": "float",
            "grandchild": { "@type": "int" }
        },
        "sibling": {}
    })
}

#[test]
fn test_flag_reaches_every_descendant() {
    let (_session, root) = seeded(&tree());
    let child = find_node(&root, "/child").unwrap();
    let grandchild = find_node(&root, "/child/grandchild").unwrap();
    let sibling = find_node(&root, "/sibling").unwrap();

    set_updating(&root, true);
    assert!(root.is_updating());
    assert!(child.is_updating());
    assert!(grandchild.is_updating());
    assert!(sibling.is_updating());
    assert!(child.endpoint().unwrap().is_updating());
    assert!(grandchild.endpoint().unwrap().is_updating());

    set_updating(&root, false);
    for handle in [&root, &child, &grandchild, &sibling] {
        assert!(!handle.is_updating());
    }
    assert!(!grandchild.endpoint().unwrap().is_updating());
}

#[test]
fn test_flag_stays_within_subtree() {
    let (_session, root) = seeded(&tree());
    let child = find_node(&root, "/child").unwrap();
    let grandchild = find_node(&root, "/child/grandchild").unwrap();
    let sibling = find_node(&root, "/sibling").unwrap();

    child.set_updating(true);
    assert!(child.is_updating());
    assert!(grandchild.is_updating());
    assert!(!root.is_updating());
    assert!(!sibling.is_updating());
}

#[test]
fn test_flag_visible_to_handles_created_later() {
    let (_session, root) = seeded(&tree());
    let grandchild = find_node(&root, "/child/grandchild").unwrap();
    set_updating(&root, true);
    let again = find_node(&root, "/child/grandchild").unwrap();
    assert!(again.is_updating());
    drop(grandchild);
    assert!(again.is_updating());
}

#[test]
fn test_flag_not_kept_for_unheld_nodes() {
    let (session, root) = seeded(&tree());
    set_updating(&root, true);
    assert!(root.is_updating());
    assert_eq!(session.tracked_nodes(), 1);

    let child = root.child_at(0).unwrap();
    assert_eq!(child.name().as_deref(), Some("child"));
    assert!(!child.is_updating());
    assert!(!child.endpoint().unwrap().is_updating());
}

#[test]
fn test_invalid_node_is_skipped() {
    let (session, root) = seeded(&tree());
    let child = find_node(&root, "/child").unwrap();
    assert!(session.boundary().delete_path("/child"));
    let before = session.boundary().stats();
    set_updating(&child, true);
    assert!(!child.is_updating());
    assert_eq!(session.boundary().stats(), before);
}
