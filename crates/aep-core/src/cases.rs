use heck::{ToKebabCase, ToSnakeCase};

/// Convert a kebab-case name to camelCase, keeping the first part as is.
///
/// `book-editions` → `bookEditions`
pub fn kebab_to_camel_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for (i, part) in s.split('-').enumerate() {
        if i == 0 {
            out.push_str(part);
        } else {
            out.push_str(&upper_first(part));
        }
    }
    out
}

/// `book-editions` → `BookEditions`
pub fn kebab_to_pascal_case(s: &str) -> String {
    upper_first(&kebab_to_camel_case(s))
}

pub fn kebab_to_snake_case(s: &str) -> String {
    s.to_snake_case()
}

/// Convert a PascalCase schema name to kebab-case. Runs of capitals are
/// treated as an acronym: `IAMPolicy` → `iam-policy`.
pub fn pascal_case_to_kebab_case(s: &str) -> String {
    s.to_kebab_case()
}

pub fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kebab_to_camel_case() {
        assert_eq!(kebab_to_camel_case("book-editions"), "bookEditions");
        assert_eq!(kebab_to_camel_case("books"), "books");
        assert_eq!(kebab_to_camel_case(""), "");
    }

    #[test]
    fn test_kebab_to_pascal_case() {
        assert_eq!(kebab_to_pascal_case("book-editions"), "BookEditions");
        assert_eq!(kebab_to_pascal_case("a"), "A");
    }

    #[test]
    fn test_pascal_case_to_kebab_case() {
        assert_eq!(pascal_case_to_kebab_case("BookEdition"), "book-edition");
        assert_eq!(pascal_case_to_kebab_case("IAMPolicy"), "iam-policy");
        assert_eq!(pascal_case_to_kebab_case("Publisher"), "publisher");
    }

    #[test]
    fn test_kebab_to_snake_case() {
        assert_eq!(kebab_to_snake_case("book-editions"), "book_editions");
    }

    #[test]
    fn test_first_char_helpers() {
        assert_eq!(lower_first("BookEditions"), "bookEditions");
        assert_eq!(upper_first("book"), "Book");
        assert_eq!(lower_first(""), "");
    }
}
