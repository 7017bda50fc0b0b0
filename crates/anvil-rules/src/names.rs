//! Name helpers shared by the registry and the material catalog.
//!
//! Display names are matched loosely: case, spaces, underscores and hyphens
//! are ignored, so `"Fire Aspect"`, `"fire_aspect"` and `"FIRE-ASPECT"` all
//! produce the same lookup key.

/// Characters ignored when comparing names.
const IGNORED_CHARS: &[char] = &[' ', '_', '-', '\t'];

/// Reduce a name to its loose lookup key.
///
/// # Examples
///
/// ```
/// use anvil_rules::names::lookup_key;
///
/// assert_eq!(lookup_key("Fire Aspect"), "fireaspect");
/// assert_eq!(lookup_key("fire_aspect"), "fireaspect");
/// ```
pub fn lookup_key(name: &str) -> String {
    name.chars()
        .filter(|c| !IGNORED_CHARS.contains(c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Turn a snake-case identifier into a spaced title (`diamond_block` ->
/// `Diamond Block`). Any namespace prefix is dropped.
pub fn title_case(snake: &str) -> String {
    let bare = snake.rsplit_once(':').map(|(_, k)| k).unwrap_or(snake);
    bare.split(|c: char| c == '_' || c == '/')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
