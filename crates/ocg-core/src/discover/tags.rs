use indexmap::{IndexMap, IndexSet};

use crate::parse::spec::OpenApiSpec;

use super::operations;

/// Every tag of the document: declared tags in document order, then tags
/// that only appear on operations, in first-occurrence order.
pub fn discover_tags(spec: &OpenApiSpec) -> Vec<String> {
    let mut tags: IndexSet<&str> = spec.tags.iter().map(|tag| tag.name.as_str()).collect();
    let declared = tags.len();
    for op in operations(spec) {
        for tag in &op.operation.tags {
            if tags.insert(tag.as_str()) {
                log::debug!("undeclared tag '{tag}' first used by {} {}", op.method.as_str(), op.path);
            }
        }
    }
    log::debug!("{} declared and {} undeclared tags", declared, tags.len() - declared);
    tags.into_iter().map(String::from).collect()
}

/// Operation indices (in [`operations`] order) per tag, in tag order.
/// Untagged operations belong to no group; tags without operations are kept
/// with an empty list.
pub fn group_operations(spec: &OpenApiSpec) -> IndexMap<String, Vec<usize>> {
    let mut groups: IndexMap<String, Vec<usize>> = discover_tags(spec)
        .into_iter()
        .map(|tag| (tag, Vec::new()))
        .collect();
    for (index, op) in operations(spec).enumerate() {
        let mut seen = IndexSet::new();
        for tag in &op.operation.tags {
            if seen.insert(tag.as_str())
                && let Some(group) = groups.get_mut(tag)
            {
                group.push(index);
            }
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    #[test]
    fn undeclared_tags_follow_first_occurrence() {
        let spec = parse::from_yaml(
            r#"
openapi: "3.1.0"
info: { title: Tags, version: "1" }
paths:
  /pet:
    post: { tags: [pet], responses: {} }
    get: { tags: [pet], responses: {} }
  /store:
    get: { tags: [store], responses: {} }
"#,
        )
        .unwrap();
        assert_eq!(discover_tags(&spec), ["pet", "store"]);

        let groups = group_operations(&spec);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups["pet"], [0, 1]);
        assert_eq!(groups["store"], [2]);
    }

    #[test]
    fn declared_tags_come_first() {
        let spec = parse::from_yaml(
            r#"
openapi: "3.1.0"
info: { title: Tags, version: "1" }
tags:
  - name: store
  - name: admin
paths:
  /users:
    put: { tags: [user, store], responses: {} }
    get: { tags: [audit], responses: {} }
  /health:
    get: { responses: {} }
"#,
        )
        .unwrap();
        // GET is visited before PUT within one path item.
        assert_eq!(discover_tags(&spec), ["store", "admin", "audit", "user"]);

        let groups = group_operations(&spec);
        assert!(groups["admin"].is_empty());
        assert_eq!(groups["store"], [1]);
        assert!(groups.values().all(|ops| !ops.contains(&2)));
    }
}
