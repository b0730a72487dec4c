//! Value grammars for structured tags (`@field`, `@param`, `@return`, …).

use crate::model::{DependencyDoc, ExampleDoc, FieldDoc, ResponseDoc, ReturnDoc};
use regex::Regex;
use std::sync::LazyLock;

// -- Regex patterns -----------------------------------------------------------

// name (type): description
static RE_TYPED_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^\s(]+)\s*\(([^)]*)\)\s*:?\s*(.*)$").unwrap());

// [name] (type)[:] description
static RE_RETURN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:([^\s(]+)\s+)?\(([^)]*)\)\s*:?\s*(.*)$").unwrap());

static RE_RESPONSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\b\s*(.*)$").unwrap());

// `code` description
static RE_INLINE_EXAMPLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^`([^`]*)`\s*(?:[-:]\s*)?(.*)$").unwrap());

// (h *Receiver) Name  /  (Receiver) Name
static RE_METHOD_SIGNATURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\(\s*(?:[A-Za-z_]\w*\s+)?\*?\s*([A-Za-z_][\w.]*)\s*\)\s*([^\s(]+)").unwrap()
});

// -- Parsers ------------------------------------------------------------------

/// `@field` / `@param`: `name (type): description`. Without a parenthesized
/// type the first word is the name and the rest the description.
pub fn typed_name(value: &str) -> Result<FieldDoc, String> {
    let value = value.trim();
    if value.is_empty() {
        return Err("expected `name (type): description`".to_string());
    }
    if let Some(caps) = RE_TYPED_NAME.captures(value) {
        return Ok(FieldDoc {
            name: caps[1].to_string(),
            ty: caps[2].trim().to_string(),
            description: caps[3].trim().to_string(),
        });
    }
    let (name, rest) = split_word(value);
    Ok(FieldDoc {
        name: name.to_string(),
        ty: String::new(),
        description: rest.to_string(),
    })
}

/// `@return (type) description`, optionally named and optionally with a
/// colon after the type. A type of `error` marks an error return.
pub fn return_value(value: &str) -> ReturnDoc {
    let value = value.trim();
    match RE_RETURN.captures(value) {
        Some(caps) => {
            let ty = caps[2].trim().to_string();
            ReturnDoc {
                name: caps.get(1).map(|m| m.as_str().to_string()).unwrap_or_default(),
                is_error: is_error_type(&ty),
                ty,
                description: caps[3].trim().to_string(),
            }
        }
        None => ReturnDoc {
            description: value.to_string(),
            ..Default::default()
        },
    }
}

fn is_error_type(ty: &str) -> bool {
    ty == "error" || ty == "*error"
}

/// `@res 404 Not Found - reason`
pub fn response(value: &str) -> Result<ResponseDoc, String> {
    let caps = RE_RESPONSE
        .captures(value.trim())
        .ok_or_else(|| format!("expected a leading status code, got `{}`", value))?;
    let code = caps[1]
        .parse::<u16>()
        .map_err(|_| format!("status code out of range: {}", &caps[1]))?;
    Ok(ResponseDoc {
        code,
        description: caps[2].trim().to_string(),
    })
}

/// Inline `@ex`: a backquoted snippet followed by its description, or the
/// whole value as code.
pub fn inline_example(value: &str) -> ExampleDoc {
    let value = value.trim();
    match RE_INLINE_EXAMPLE.captures(value) {
        Some(caps) => ExampleDoc {
            code: caps[1].trim().to_string(),
            description: caps[2].trim().to_string(),
        },
        None => ExampleDoc {
            code: value.to_string(),
            description: String::new(),
        },
    }
}

/// Function name as written after `@func`. A method signature such as
/// `(h *UserHandler) GetUserByID` also yields the receiver type.
pub fn function_signature(value: &str) -> (String, Option<String>) {
    let value = value.trim();
    if let Some(caps) = RE_METHOD_SIGNATURE.captures(value) {
        return (caps[2].to_string(), Some(caps[1].to_string()));
    }
    let (name, _) = split_word(value);
    (name.trim_end_matches("()").to_string(), None)
}

/// `@rec *UserHandler` → `UserHandler`
pub fn receiver(value: &str) -> String {
    let (name, _) = split_word(value.trim());
    name.trim_start_matches('*').to_string()
}

/// Brace-less `@dep github.com/gorilla/mux`.
pub fn bare_dependency(value: &str) -> DependencyDoc {
    let import_path = value.trim().to_string();
    let name = import_path
        .rsplit('/')
        .next()
        .unwrap_or(&import_path)
        .to_string();
    DependencyDoc {
        name,
        import_path,
        ..Default::default()
    }
}

fn split_word(value: &str) -> (&str, &str) {
    match value.find(char::is_whitespace) {
        Some(i) => (&value[..i], value[i..].trim_start()),
        None => (value, ""),
    }
}
