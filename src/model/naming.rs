//! Name derivation helpers shared by the scanner and the emitter.

/// Suffix appended to a controller's simple name to form the stub class.
pub const STUB_SUFFIX: &str = "Stub";

/// Simple name of the shared base artifact emitted once per package.
pub const STUB_BASE_NAME: &str = "StubBase";

/// Split a dot-delimited qualified name into `(package, simple_name)`.
///
/// A name without any dot has an empty package.
///
/// ```
/// use stubgen::model::split_qualified;
///
/// assert_eq!(split_qualified("com.example.FooController"), ("com.example", "FooController"));
/// assert_eq!(split_qualified("FooController"), ("", "FooController"));
/// ```
pub fn split_qualified(qualified_name: &str) -> (&str, &str) {
    match qualified_name.rsplit_once('.') {
        Some((package, simple)) => (package, simple),
        None => ("", qualified_name),
    }
}

/// Join a package and a simple name, omitting the dot for the empty package.
pub fn qualify(package: &str, simple_name: &str) -> String {
    if package.is_empty() {
        simple_name.to_string()
    } else {
        format!("{package}.{simple_name}")
    }
}

/// Whether `segment` can appear between the dots of a qualified name.
pub fn is_name_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

/// Upper-case the first character and leave the rest untouched.
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Strip trailing empty-invocation markers (`()`) from a declared type.
///
/// `OrderView()` becomes `OrderView`; a bare unit type `()` becomes empty.
pub fn normalize_response_type(declared: &str) -> String {
    let mut ty = declared.trim();
    while let Some(stripped) = ty.strip_suffix("()") {
        ty = stripped.trim_end();
    }
    ty.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_name_segment() {
        assert!(is_name_segment("acme"));
        assert!(is_name_segment("order_v2"));
        assert!(!is_name_segment(""));
        assert!(!is_name_segment("my-crate"));
        assert!(!is_name_segment("a/b"));
    }

    #[test]
    fn test_split_qualified() {
        assert_eq!(split_qualified("com.acme.OrderController"), ("com.acme", "OrderController"));
        assert_eq!(split_qualified("a.B"), ("a", "B"));
        assert_eq!(split_qualified("Bare"), ("", "Bare"));
    }

    #[test]
    fn test_qualify_skips_empty_package() {
        assert_eq!(qualify("com.acme", "StubBase"), "com.acme.StubBase");
        assert_eq!(qualify("", "StubBase"), "StubBase");
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("getOrder"), "GetOrder");
        assert_eq!(capitalize("get_order"), "Get_order");
        assert_eq!(capitalize("X"), "X");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_normalize_response_type() {
        assert_eq!(normalize_response_type("OrderView()"), "OrderView");
        assert_eq!(normalize_response_type("OrderView"), "OrderView");
        assert_eq!(normalize_response_type("Vec<OrderView>"), "Vec<OrderView>");
        assert_eq!(normalize_response_type("()"), "");
        assert_eq!(normalize_response_type(" Json<Order> ()"), "Json<Order>");
    }
}
