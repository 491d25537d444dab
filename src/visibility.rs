//! Per-device hiding via `display: none` media rules

use crate::stylesheet::{CssRule, Declaration};
use crate::types::{Device, PHONE_MAX_WIDTH, TABLET_MAX_WIDTH};
use serde_json::Value;

/// Media condition that matches exactly one device class.
pub fn device_only_media(device: Device) -> String {
    match device {
        Device::Phone => format!("(max-width: {}px)", PHONE_MAX_WIDTH),
        Device::Tablet => format!(
            "(max-width: {}px) and (min-width: {}px)",
            TABLET_MAX_WIDTH,
            PHONE_MAX_WIDTH + 1
        ),
        Device::Desktop => format!("(min-width: {}px)", TABLET_MAX_WIDTH + 1),
    }
}

fn is_hidden(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(visible)) => !visible,
        Some(Value::String(s)) => matches!(s.trim(), "false" | "0" | "off"),
        Some(Value::Number(n)) => n.as_i64() == Some(0),
        _ => false,
    }
}

/// Hide rules for every device explicitly marked not visible. Unset means visible.
pub fn visibility_rules(selector: &str, visibility: &Value) -> Vec<CssRule> {
    if !visibility.is_object() {
        return Vec::new();
    }

    [Device::Tablet, Device::Phone, Device::Desktop]
        .into_iter()
        .filter(|d| is_hidden(visibility.get(d.key())))
        .map(|d| {
            CssRule::new(selector, vec![Declaration::new("display", "none !important")])
                .within(Some(device_only_media(d)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_visible_everywhere_emits_nothing() {
        assert!(visibility_rules("#m", &json!({ "desktop": true, "tablet": true, "phone": true })).is_empty());
        assert!(visibility_rules("#m", &json!({})).is_empty());
        assert!(visibility_rules("#m", &json!("hidden")).is_empty());
    }

    #[test]
    fn test_media_boundaries() {
        let rules = visibility_rules("#m", &json!({ "desktop": false, "tablet": false, "phone": false }));
        let media: Vec<_> = rules.iter().map(|r| r.media.clone().unwrap()).collect();
        assert_eq!(
            media,
            vec![
                "(max-width: 980px) and (min-width: 768px)".to_string(),
                "(max-width: 767px)".to_string(),
                "(min-width: 981px)".to_string(),
            ]
        );
        assert_eq!(rules[0].declarations[0].value, "none !important");
    }

    #[test]
    fn test_only_hidden_devices() {
        let rules = visibility_rules("#m", &json!({ "phone": false }));
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].media.as_deref(), Some("(max-width: 767px)"));
    }
}
