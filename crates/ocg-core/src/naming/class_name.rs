use crate::error::NamingError;

/// Characters a components key may contain.
pub const COMPONENT_KEY_PATTERN: &str = "^[a-zA-Z0-9._-]+$";

const KEY_SEPARATORS: [char; 3] = ['.', '-', '_'];

/// Upper-case the first letter of every alphanumeric run and drop the
/// characters between runs: `food` → `Food`, `pet-food` → `PetFood`,
/// `petId` → `PetId`.
pub fn capitalize(word: &str) -> String {
    word.split(|c: char| !c.is_alphanumeric())
        .filter(|run| !run.is_empty())
        .map(upper_first)
        .collect()
}

fn upper_first(run: &str) -> String {
    let mut chars = run.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Name of an inline schema found under `property` of the schema named `parent`.
pub fn from_parent_and_property(parent: &str, property: &str) -> String {
    format!("{parent}{}", capitalize(property))
}

/// Name of the schema addressed by a `$ref`: its last pointer segment, folded
/// like a components key.
pub fn from_reference_path(reference: &str) -> Result<String, NamingError> {
    let last = reference.rsplit('/').next().unwrap_or(reference);
    let decoded = last.replace("~1", "/").replace("~0", "~");
    from_components_key(&decoded)
}

/// Fold a components key into a class name.
///
/// `pet.food_item` → `PetFoodItem`, `_internal-id` → `InternalId`,
/// `pet123` → `Pet123`. A name that would start with a digit gets a leading
/// underscore.
pub fn from_components_key(key: &str) -> Result<String, NamingError> {
    let invalid = || NamingError::InvalidComponentKey {
        key: key.to_string(),
        pattern: COMPONENT_KEY_PATTERN,
    };

    if key.is_empty()
        || !key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || KEY_SEPARATORS.contains(&c))
    {
        return Err(invalid());
    }

    let name: String = key
        .trim_start_matches(KEY_SEPARATORS)
        .split(KEY_SEPARATORS)
        .filter(|segment| !segment.is_empty())
        .map(upper_first)
        .collect();

    if name.is_empty() {
        return Err(invalid());
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        return Ok(format!("_{name}"));
    }
    Ok(name)
}
