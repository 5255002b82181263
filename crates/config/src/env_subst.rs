/// Replace `${ENV_VAR}` placeholders in raw config text.
///
/// Unresolvable variables are left as-is.
pub fn substitute_env(input: &str) -> String {
    substitute_env_with(input, |name| std::env::var(name).ok())
}

/// Replace `${ENV_VAR}` placeholders using a custom lookup function.
fn substitute_env_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut result = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) if end > 0 => {
                let name = &after[..end];
                match lookup(name) {
                    Some(value) => result.push_str(&value),
                    None => {
                        result.push_str("${");
                        result.push_str(name);
                        result.push('}');
                    },
                }
                rest = &after[end + 1..];
            },
            _ => {
                // Malformed or empty placeholder, emit literally.
                result.push_str("${");
                rest = after;
            },
        }
    }
    result.push_str(rest);

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(name: &str) -> Option<String> {
        match name {
            "WIT_TOKEN" => Some("abc123".to_string()),
            "PAGE_TOKEN" => Some("EAAG".to_string()),
            _ => None,
        }
    }

    #[test]
    fn substitutes_known_var() {
        assert_eq!(
            substitute_env_with("token = \"${WIT_TOKEN}\"", lookup),
            "token = \"abc123\""
        );
    }

    #[test]
    fn substitutes_several_vars_on_one_line() {
        assert_eq!(
            substitute_env_with("${WIT_TOKEN}:${PAGE_TOKEN}", lookup),
            "abc123:EAAG"
        );
    }

    #[test]
    fn leaves_unknown_var() {
        assert_eq!(
            substitute_env_with("${QUANDARY_NONEXISTENT_XYZ}", lookup),
            "${QUANDARY_NONEXISTENT_XYZ}"
        );
    }

    #[test]
    fn unterminated_placeholder_is_literal() {
        assert_eq!(substitute_env_with("a ${WIT_TOKEN", lookup), "a ${WIT_TOKEN");
        assert_eq!(substitute_env_with("${}", lookup), "${}");
    }

    #[test]
    fn no_placeholders() {
        assert_eq!(substitute_env("plain text"), "plain text");
    }
}
