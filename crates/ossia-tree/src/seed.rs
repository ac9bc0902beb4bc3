//! JSON seeding and snapshots.
//!
//! A node is a JSON object whose keys are its children, in order, plus an
//! optional `"@type"` key naming its endpoint's [`ValueType`].

use ossia_core::ValueType;
use serde_json::{Map, Value};

use crate::arena::Arena;
use crate::error::TreeError;
use crate::types::NodeId;

pub const TYPE_KEY: &str = "@type";

pub(crate) fn seed(arena: &mut Arena, node: NodeId, tree: &Value) -> Result<(), TreeError> {
    let Value::Object(fields) = tree else {
        return Err(TreeError::InvalidSeed(format!(
            "expected an object at {}",
            arena.path_of(node)?
        )));
    };
    for (key, value) in fields {
        if key == TYPE_KEY {
            let value_type: ValueType = serde_json::from_value(value.clone())
                .map_err(|e| TreeError::InvalidSeed(format!("{key}: {e}")))?;
            arena.create_endpoint(node, value_type)?;
        } else {
            let child = arena.add_child(node, key)?;
            seed(arena, child, value)?;
        }
    }
    Ok(())
}

pub(crate) fn snapshot(arena: &Arena, node: NodeId) -> Result<Value, TreeError> {
    let entry = arena.get(node)?;
    let mut fields = Map::new();
    if let Some((_, value_type)) = entry.endpoint {
        let value_type = serde_json::to_value(value_type)
            .map_err(|e| TreeError::InvalidSeed(e.to_string()))?;
        fields.insert(TYPE_KEY.to_owned(), value_type);
    }
    for &child in &entry.children {
        fields.insert(arena.get(child)?.name.clone(), snapshot(arena, child)?);
    }
    Ok(Value::Object(fields))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_seed_then_snapshot() {
        let tree = json!({
            "@type": "impulse",
            "b": { "@type": "int" },
            "a": { "x": {}, "y": { "@type": "vec3f" } }
        });
        let (mut arena, root) = Arena::new();
        seed(&mut arena, root, &tree).unwrap();
        assert_eq!(arena.len(), 5);
        // Key order survives.
        assert_eq!(snapshot(&arena, root).unwrap(), tree);
        let keys: Vec<String> = snapshot(&arena, root)
            .unwrap()
            .as_object()
            .unwrap()
            .keys()
            .cloned()
            .collect();
        assert_eq!(keys, ["@type", "b", "a"]);
    }

    #[test]
    fn test_seed_rejects_bad_input() {
        let (mut arena, root) = Arena::new();
        assert!(matches!(
            seed(&mut arena, root, &json!([1, 2])),
            Err(TreeError::InvalidSeed(_))
        ));
        assert!(matches!(
            seed(&mut arena, root, &json!({ "a": { "@type": "matrix" } })),
            Err(TreeError::InvalidSeed(_))
        ));
        assert!(matches!(
            seed(&mut arena, root, &json!({ "bad name": {} })),
            Err(TreeError::InvalidName(_))
        ));
        assert!(matches!(
            seed(&mut arena, root, &json!({ "leaf": 3 })),
            Err(TreeError::InvalidSeed(_))
        ));
    }
}
