// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! String display mode: read-only transformed text.
//!
//! Structured broker values are JSON-encoded rather than debug-printed.
//! A configured mapping table matches the raw string and takes precedence
//! over transformation and truncation. Never writes.

use std::sync::Arc;

use serde_json::Value;

use crate::broker::BrokerClient;
use crate::config::{TextTransform, WidgetConfig};
use crate::value::{PLACEHOLDER, ValueMapping, to_display_string};

use super::ModeLogic;

/// Characters consumed by the truncation ellipsis.
const ELLIPSIS_LEN: usize = 3;

/// String display configuration, extracted from the widget configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct StringDisplayConfig {
    /// Displayed data point.
    pub value_oid: Option<String>,
    /// Maximum rendered length, in characters.
    pub max_length: usize,
    /// Whether truncation appends `...` (consuming three characters of
    /// the budget).
    pub ellipsis: bool,
    /// Transformation applied before truncation.
    pub transform: TextTransform,
    /// Prefix prepended to the rendered value.
    pub prefix: String,
    /// Suffix appended to the rendered value.
    pub suffix: String,
    /// Optional value→label table; takes precedence over formatting.
    pub mapping: Option<ValueMapping>,
}

impl StringDisplayConfig {
    /// Extracts the string-display fields, applying defaults.
    #[must_use]
    pub fn from_widget(config: &WidgetConfig) -> Self {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let max_length = config
            .string_display_max_length
            .filter(|len| *len >= 1.0)
            .map_or(50, |len| len as usize);

        Self {
            value_oid: config.string_display_value_oid.clone(),
            max_length,
            ellipsis: config.string_display_ellipsis.unwrap_or(true),
            transform: config.string_display_text_transform.unwrap_or_default(),
            prefix: config.string_display_prefix.clone().unwrap_or_default(),
            suffix: config.string_display_suffix.clone().unwrap_or_default(),
            mapping: ValueMapping::parse(config.string_display_value_mapping.as_deref()),
        }
    }
}

/// String display runtime state.
#[derive(Debug, Clone, PartialEq)]
pub struct StringDisplayState {
    /// Last coerced raw value.
    pub value: Option<String>,
    /// Fully rendered display string.
    pub formatted_value: String,
}

impl Default for StringDisplayState {
    fn default() -> Self {
        Self {
            value: None,
            formatted_value: PLACEHOLDER.to_string(),
        }
    }
}

/// String display logic unit. Read-only: never writes to the broker.
pub struct StringDisplayLogic<B> {
    config: StringDisplayConfig,
    broker: Arc<B>,
    state: StringDisplayState,
}

impl<B: BrokerClient> StringDisplayLogic<B> {
    /// Creates the unit.
    #[must_use]
    pub fn new(config: StringDisplayConfig, broker: Arc<B>) -> Self {
        Self {
            config,
            broker,
            state: StringDisplayState::default(),
        }
    }

    /// Snapshot of the current runtime state.
    #[must_use]
    pub fn state(&self) -> &StringDisplayState {
        &self.state
    }

    fn update_value(&mut self, raw: &Value) {
        let Some(value) = to_display_string(raw) else {
            self.state = StringDisplayState::default();
            return;
        };

        let body = match self
            .config
            .mapping
            .as_ref()
            .and_then(|mapping| mapping.lookup(&value))
        {
            // Mapped labels bypass transformation and truncation.
            Some(label) => label.to_string(),
            None => self.truncate(&self.transform(&value)),
        };

        self.state = StringDisplayState {
            value: Some(value),
            formatted_value: format!("{}{}{}", self.config.prefix, body, self.config.suffix),
        };
    }

    fn transform(&self, value: &str) -> String {
        match self.config.transform {
            TextTransform::None => value.to_string(),
            TextTransform::Uppercase => value.to_uppercase(),
            TextTransform::Lowercase => value.to_lowercase(),
            TextTransform::Capitalize => {
                let mut chars = value.chars();
                match chars.next() {
                    Some(first) => {
                        first.to_uppercase().collect::<String>()
                            + &chars.as_str().to_lowercase()
                    }
                    None => String::new(),
                }
            }
        }
    }

    /// Truncates to the configured length, counted in characters. With
    /// the ellipsis enabled the `...` consumes three characters of the
    /// budget.
    fn truncate(&self, value: &str) -> String {
        let max = self.config.max_length;
        if value.chars().count() <= max {
            return value.to_string();
        }
        if self.config.ellipsis {
            let keep = max.saturating_sub(ELLIPSIS_LEN);
            let truncated: String = value.chars().take(keep).collect();
            format!("{truncated}...")
        } else {
            value.chars().take(max).collect()
        }
    }
}

impl<B: BrokerClient> ModeLogic for StringDisplayLogic<B> {
    async fn initialize(&mut self) {
        let Some(oid) = self.config.value_oid.clone() else {
            self.state = StringDisplayState::default();
            return;
        };
        match self.broker.get_state(&oid).await {
            Ok(Some(state)) => self.update_value(&state.val),
            Ok(None) => self.state = StringDisplayState::default(),
            Err(error) => {
                tracing::warn!(oid = %oid, error = %error, "String display fetch failed");
                self.state = StringDisplayState::default();
            }
        }
    }

    fn subscription_oids(&self) -> Vec<String> {
        self.config.value_oid.iter().cloned().collect()
    }

    fn handle_state_change(&mut self, _oid: &str, value: &Value) {
        self.update_value(value);
    }

    /// Display modes never highlight.
    fn is_active(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::MemoryBroker;
    use serde_json::json;

    fn config() -> StringDisplayConfig {
        StringDisplayConfig {
            value_oid: Some("state.text".to_string()),
            max_length: 50,
            ellipsis: true,
            transform: TextTransform::None,
            prefix: String::new(),
            suffix: String::new(),
            mapping: None,
        }
    }

    fn unit(
        config: StringDisplayConfig,
        broker: &Arc<MemoryBroker>,
    ) -> StringDisplayLogic<MemoryBroker> {
        StringDisplayLogic::new(config, Arc::clone(broker))
    }

    #[tokio::test]
    async fn passes_plain_strings_through() {
        let broker = Arc::new(MemoryBroker::new());
        let mut display = unit(config(), &broker);
        display.handle_state_change("state.text", &json!("running"));
        assert_eq!(display.state().formatted_value, "running");
        assert_eq!(display.state().value.as_deref(), Some("running"));
    }

    #[tokio::test]
    async fn null_renders_placeholder() {
        let broker = Arc::new(MemoryBroker::new());
        let mut display = unit(config(), &broker);
        display.handle_state_change("state.text", &Value::Null);
        assert_eq!(display.state().formatted_value, "--");
    }

    #[tokio::test]
    async fn objects_are_json_encoded() {
        let broker = Arc::new(MemoryBroker::new());
        let mut display = unit(config(), &broker);
        display.handle_state_change("state.text", &json!({"mode": "eco"}));
        assert_eq!(display.state().formatted_value, "{\"mode\":\"eco\"}");
    }

    #[tokio::test]
    async fn transforms_apply() {
        let broker = Arc::new(MemoryBroker::new());
        for (transform, expected) in [
            (TextTransform::Uppercase, "RUNNING FAST"),
            (TextTransform::Lowercase, "running fast"),
            (TextTransform::Capitalize, "Running fast"),
            (TextTransform::None, "rUnning FAST"),
        ] {
            let mut display = unit(
                StringDisplayConfig {
                    transform,
                    ..config()
                },
                &broker,
            );
            display.handle_state_change("state.text", &json!("rUnning FAST"));
            assert_eq!(display.state().formatted_value, expected);
        }
    }

    #[tokio::test]
    async fn truncates_with_ellipsis_consuming_budget() {
        let broker = Arc::new(MemoryBroker::new());
        let mut display = unit(
            StringDisplayConfig {
                max_length: 10,
                ..config()
            },
            &broker,
        );
        display.handle_state_change("state.text", &json!("a very long status"));
        assert_eq!(display.state().formatted_value, "a very ...");
        assert_eq!(display.state().formatted_value.chars().count(), 10);
    }

    #[tokio::test]
    async fn truncates_hard_without_ellipsis() {
        let broker = Arc::new(MemoryBroker::new());
        let mut display = unit(
            StringDisplayConfig {
                max_length: 6,
                ellipsis: false,
                ..config()
            },
            &broker,
        );
        display.handle_state_change("state.text", &json!("overflowing"));
        assert_eq!(display.state().formatted_value, "overfl");
    }

    #[tokio::test]
    async fn short_values_are_not_truncated() {
        let broker = Arc::new(MemoryBroker::new());
        let mut display = unit(
            StringDisplayConfig {
                max_length: 10,
                ..config()
            },
            &broker,
        );
        display.handle_state_change("state.text", &json!("short"));
        assert_eq!(display.state().formatted_value, "short");
    }

    #[tokio::test]
    async fn mapping_bypasses_transform_and_truncation() {
        let broker = Arc::new(MemoryBroker::new());
        let mut display = unit(
            StringDisplayConfig {
                max_length: 4,
                transform: TextTransform::Uppercase,
                mapping: ValueMapping::parse(Some(r#"{"0": "Everything shut"}"#)),
                prefix: "> ".to_string(),
                ..config()
            },
            &broker,
        );

        // Numbers stringify for the raw-key lookup.
        display.handle_state_change("state.text", &json!(0));
        assert_eq!(display.state().formatted_value, "> Everything shut");

        display.handle_state_change("state.text", &json!("opened"));
        assert_eq!(display.state().formatted_value, "> O...");
    }

    #[tokio::test]
    async fn initialize_pulls_value() {
        let broker = Arc::new(MemoryBroker::new().with_state("state.text", json!("idle")));
        let mut display = unit(config(), &broker);
        display.initialize().await;
        assert_eq!(display.state().formatted_value, "idle");
        assert!(!display.is_active());
    }
}
