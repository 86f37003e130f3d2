//! Glob Pattern Module
//!
//! Redis-style key patterns for the in-memory backend: `*` matches any run of
//! characters, `?` exactly one, and `\` makes the next character literal.

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Star,
    One,
    Literal(char),
}

fn tokenize(pattern: &str) -> Vec<Token> {
    let mut tokens = Vec::with_capacity(pattern.len());
    let mut chars = pattern.chars();

    while let Some(c) = chars.next() {
        let token = match c {
            '*' => Token::Star,
            '?' => Token::One,
            '\\' => Token::Literal(chars.next().unwrap_or('\\')),
            other => Token::Literal(other),
        };
        tokens.push(token);
    }

    tokens
}

// == Glob Match ==
/// Returns true if `key` matches `pattern` in full.
pub fn glob_match(pattern: &str, key: &str) -> bool {
    let tokens = tokenize(pattern);
    let key: Vec<char> = key.chars().collect();

    let (mut p, mut k) = (0, 0);
    // Position of the last `*` seen and the key index it is currently absorbing up to
    let mut backtrack: Option<(usize, usize)> = None;

    while k < key.len() {
        match tokens.get(p) {
            Some(Token::Star) => {
                backtrack = Some((p, k));
                p += 1;
            }
            Some(Token::One) => {
                p += 1;
                k += 1;
            }
            Some(Token::Literal(c)) if *c == key[k] => {
                p += 1;
                k += 1;
            }
            _ => match backtrack {
                Some((star_p, star_k)) => {
                    p = star_p + 1;
                    k = star_k + 1;
                    backtrack = Some((star_p, star_k + 1));
                }
                None => return false,
            },
        }
    }

    tokens[p..].iter().all(|t| *t == Token::Star)
}

// == Escape ==
/// Escapes glob metacharacters so `key` only ever matches itself.
pub fn escape(key: &str) -> String {
    let mut escaped = String::with_capacity(key.len());
    for c in key.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_wildcard() {
        assert!(glob_match("products:*", "products:all"));
        assert!(glob_match("products:*", "products:"));
        assert!(!glob_match("products:*", "product:42"));
        assert!(!glob_match("products:*", "orders:products:all"));
    }

    #[test]
    fn test_entity_namespaces_do_not_overlap() {
        // "product:" is not a prefix of "products:" and vice versa
        assert!(glob_match("product:*", "product:42"));
        assert!(!glob_match("product:*", "products:all"));
    }

    #[test]
    fn test_exact_pattern() {
        assert!(glob_match("product:42", "product:42"));
        assert!(!glob_match("product:42", "product:420"));
        assert!(!glob_match("product:42", "product:4"));
    }

    #[test]
    fn test_single_char_wildcard() {
        assert!(glob_match("product:?", "product:7"));
        assert!(!glob_match("product:?", "product:42"));
    }

    #[test]
    fn test_star_in_middle_backtracks() {
        assert!(glob_match("a*b*c", "aXXbYYbZc"));
        assert!(!glob_match("a*b*c", "aXXbYY"));
        assert!(glob_match("*:all", "products:all"));
    }

    #[test]
    fn test_lone_star_matches_everything() {
        assert!(glob_match("*", ""));
        assert!(glob_match("*", "anything:at:all"));
    }

    #[test]
    fn test_escape_makes_pattern_literal() {
        let key = "weird*key?";
        let pattern = escape(key);
        assert_eq!(pattern, "weird\\*key\\?");
        assert!(glob_match(&pattern, key));
        assert!(!glob_match(&pattern, "weirdXkeyY"));
    }

    #[test]
    fn test_escape_plain_key_is_unchanged() {
        assert_eq!(escape("product:42"), "product:42");
    }
}
