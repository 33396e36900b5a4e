/// Prefix words the game prepends to an item name without changing what the
/// item is.
pub const REFORGES: [&str; 27] = [
    "Gentle", "Odd", "Fast", "Fair", "Epic", "Sharp", "Heroic", "Spicy", "Legendary", "Dirty",
    "Fabled", "Suspicious", "Gilded", "Warped", "Withered", "Bulky", "Salty", "Treacherous",
    "Stiff", "Lucky", "Very", "Highly", "Extremely", "Not So", "Thicc", "Absolutely", "Even More",
];

/// Drops non-printable characters and collapses runs of whitespace.
pub fn clean_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_control() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// `clean_name` plus removal of leading reforge words.
pub fn normalize_name(name: &str) -> String {
    let mut name = clean_name(name);

    loop {
        let stripped = REFORGES.iter().find_map(|reforge| {
            name.strip_prefix(reforge)
                .filter(|rest| rest.starts_with(' '))
                .map(|rest| rest.trim_start().to_string())
        });
        match stripped {
            Some(rest) if !rest.is_empty() => name = rest,
            _ => break,
        }
    }

    name
}
