//! Event name mapping

/// Handler prop for an event name: `click` -> `onClick`
pub fn prop_from_event(event: &str) -> String {
    let mut chars = event.chars();
    match chars.next() {
        Some(first) => format!("on{}{}", first.to_uppercase(), chars.as_str()),
        None => "on".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prop_from_event() {
        assert_eq!(prop_from_event("click"), "onClick");
        assert_eq!(prop_from_event("mouseEnter"), "onMouseEnter");
        assert_eq!(prop_from_event(""), "on");
    }
}
