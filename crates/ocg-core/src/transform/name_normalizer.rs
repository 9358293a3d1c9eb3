use heck::{ToLowerCamelCase, ToPascalCase, ToShoutySnakeCase, ToSnakeCase};

use crate::ir::NormalizedName;

/// Casing variants of a wire name (property, parameter, tag), each a valid
/// identifier: `pet-store` → `PetStore`, `petStore`, `pet_store`, `PET_STORE`.
pub fn normalize_name(name: &str) -> NormalizedName {
    let words = split_words(name);

    NormalizedName {
        original: name.to_string(),
        pascal_case: identifier(words.to_pascal_case()),
        camel_case: identifier(words.to_lower_camel_case()),
        snake_case: identifier(words.to_snake_case()),
        screaming_snake: identifier(words.to_shouty_snake_case()),
    }
}

/// Replace every run of non-alphanumeric characters with one `_` so heck sees
/// word boundaries.
fn split_words(name: &str) -> String {
    let mut words = String::with_capacity(name.len());
    let mut pending_separator = false;
    for ch in name.chars() {
        if ch.is_alphanumeric() {
            if pending_separator && !words.is_empty() {
                words.push('_');
            }
            words.push(ch);
            pending_separator = false;
        } else {
            pending_separator = true;
        }
    }
    words
}

fn identifier(cased: String) -> String {
    if cased.is_empty() {
        "unnamed".to_string()
    } else if cased.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{cased}")
    } else {
        cased
    }
}
