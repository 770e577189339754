//! Collection name derivation.
//!
//! A record type named `OrderItem` stores into the collection
//! `order_items`: the type name converted to snake case, then pluralized.

/// Derives the collection name for a record type name.
pub(crate) fn collection_name(type_name: &str) -> String {
    pluralize(&to_snake_case(type_name))
}

pub(crate) fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let after_lower = i > 0 && (chars[i - 1].is_lowercase() || chars[i - 1].is_ascii_digit());
            let before_lower = chars.get(i + 1).is_some_and(|next| next.is_lowercase());
            if i > 0 && (after_lower || before_lower) {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

pub(crate) fn pluralize(word: &str) -> String {
    match word {
        "person" => return "people".to_string(),
        "child" => return "children".to_string(),
        _ => {}
    }

    if let Some(stem) = word.strip_suffix('y') {
        let consonant_y = !stem
            .chars()
            .next_back()
            .is_some_and(|c| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u'));
        if consonant_y && !stem.is_empty() {
            return format!("{stem}ies");
        }
    }

    if ["s", "x", "z", "ch", "sh"]
        .iter()
        .any(|suffix| word.ends_with(suffix))
    {
        return format!("{word}es");
    }

    format!("{word}s")
}
