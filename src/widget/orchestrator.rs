// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The widget orchestrator.
//!
//! [`FlexWidget`] owns one logic unit per mode but drives only the one
//! matching the configured mode tag. It routes lifecycle events, detects
//! per-mode configuration changes and reinitializes the affected unit,
//! swaps broker subscriptions, dispatches clicks, and derives the render
//! projection.
//!
//! There are no automatic mode transitions: the active mode changes only
//! when the host supplies a configuration with a different mode tag.

use std::sync::Arc;

use serde_json::Value;

use crate::broker::BrokerClient;
use crate::config::{ClickAction, WidgetConfig};
use crate::modes::{
    DimmerConfig, DimmerLogic, HeatingConfig, HeatingLogic, Mode, ModeLogic, NumericDisplayConfig,
    NumericDisplayLogic, StringDisplayConfig, StringDisplayLogic, SwitchConfig, SwitchLogic,
    WindowShutterConfig, WindowShutterLogic,
};

use super::dialog::{
    DialogContent, DialogView, DimmerDialog, HeatingDialog, WindowShutterDialog, quick_buttons,
    resolve_title,
};
use super::projection::{DEFAULT_TEXT_COLOR, DisplayLayout, RenderProjection, ShutterGraphic};

/// What a click on the widget resulted in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Nothing happened (edit mode, or a display mode without an action).
    Ignored,
    /// The shared dialog was opened.
    DialogOpened,
    /// The switch was toggled.
    Toggled,
    /// The host should navigate to this view.
    Navigate(String),
}

/// One logic unit per mode, constructed eagerly from the current
/// configuration. Only the active unit is initialized and subscribed.
struct ModeUnits<B: BrokerClient> {
    dimmer: DimmerLogic<B>,
    switch: SwitchLogic<B>,
    heating: HeatingLogic<B>,
    window_shutter: WindowShutterLogic<B>,
    numeric_display: NumericDisplayLogic<B>,
    string_display: StringDisplayLogic<B>,
}

impl<B: BrokerClient> ModeUnits<B> {
    fn from_config(config: &WidgetConfig, broker: &Arc<B>) -> Self {
        Self {
            dimmer: DimmerLogic::new(DimmerConfig::from_widget(config), Arc::clone(broker)),
            switch: SwitchLogic::new(SwitchConfig::from_widget(config), Arc::clone(broker)),
            heating: HeatingLogic::new(HeatingConfig::from_widget(config), Arc::clone(broker)),
            window_shutter: WindowShutterLogic::new(
                WindowShutterConfig::from_widget(config),
                Arc::clone(broker),
            ),
            numeric_display: NumericDisplayLogic::new(
                NumericDisplayConfig::from_widget(config),
                Arc::clone(broker),
            ),
            string_display: StringDisplayLogic::new(
                StringDisplayConfig::from_widget(config),
                Arc::clone(broker),
            ),
        }
    }
}

/// The multi-mode control widget.
///
/// The host drives it event-loop style: construct, [`initialize`], feed
/// broker pushes into [`handle_state_change`], feed user input into
/// [`handle_click`] and the per-mode action methods, and paint
/// [`projection`] after every event.
///
/// [`initialize`]: Self::initialize
/// [`handle_state_change`]: Self::handle_state_change
/// [`handle_click`]: Self::handle_click
/// [`projection`]: Self::projection
pub struct FlexWidget<B: BrokerClient> {
    broker: Arc<B>,
    config: WidgetConfig,
    units: ModeUnits<B>,
    edit_mode: bool,
    dialog_open: bool,
    /// Display name of the active mode's primary OID, fetched once per
    /// (re)initialization for the dialog title.
    oid_name: Option<String>,
}

impl<B: BrokerClient> FlexWidget<B> {
    /// Creates the widget with all mode units constructed from the given
    /// configuration. No broker traffic until [`Self::initialize`].
    #[must_use]
    pub fn new(config: WidgetConfig, broker: Arc<B>) -> Self {
        let units = ModeUnits::from_config(&config, &broker);
        Self {
            broker,
            config,
            units,
            edit_mode: false,
            dialog_open: false,
            oid_name: None,
        }
    }

    /// The current configuration.
    #[must_use]
    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    /// The active mode.
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.config.mode
    }

    /// Whether the widget is in layout/edit mode (writes suppressed).
    #[must_use]
    pub fn edit_mode(&self) -> bool {
        self.edit_mode
    }

    /// Switches layout/edit mode on or off.
    pub fn set_edit_mode(&mut self, edit_mode: bool) {
        self.edit_mode = edit_mode;
    }

    /// Whether the shared dialog is open.
    #[must_use]
    pub fn dialog_open(&self) -> bool {
        self.dialog_open
    }

    /// Closes the shared dialog. Dialog-local state does not persist
    /// across opens.
    pub fn close_dialog(&mut self) {
        self.dialog_open = false;
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Mount: initializes the active mode's unit, subscribes its OIDs,
    /// and resolves the primary OID's display name.
    pub async fn initialize(&mut self) {
        self.initialize_active().await;
        let oids = self.subscription_oids();
        if !oids.is_empty()
            && let Err(error) = self.broker.subscribe(&oids).await
        {
            tracing::warn!(error = %error, "Subscribing widget OIDs failed");
        }
        self.refresh_oid_name().await;
    }

    /// Applies an edited configuration.
    ///
    /// A changed mode tag rebuilds every unit and initializes the new
    /// active one. Within the same mode, only a change to a field the
    /// active mode consumes discards and reinitializes that unit; styling
    /// edits never do.
    pub async fn update_config(&mut self, new_config: WidgetConfig) {
        let mode_changed = new_config.mode != self.config.mode;
        let unit_changed =
            mode_changed || mode_config_changed(self.config.mode, &self.config, &new_config);

        if !unit_changed {
            self.config = new_config;
            return;
        }

        let old_oids = self.subscription_oids();
        self.config = new_config;
        if mode_changed {
            // A fresh arena: prior mode runtime state is discarded.
            self.units = ModeUnits::from_config(&self.config, &self.broker);
        } else {
            self.rebuild_active_unit();
        }
        self.initialize_active().await;
        self.swap_subscriptions(&old_oids).await;
        self.refresh_oid_name().await;
    }

    /// Unmount: drops subscriptions. Pending debounce timers die with the
    /// units.
    pub async fn teardown(&mut self) {
        let oids = self.subscription_oids();
        if !oids.is_empty()
            && let Err(error) = self.broker.unsubscribe(&oids).await
        {
            tracing::warn!(error = %error, "Unsubscribing widget OIDs failed");
        }
    }

    /// The OIDs the active mode wants push notifications for.
    #[must_use]
    pub fn subscription_oids(&self) -> Vec<String> {
        match self.config.mode {
            Mode::Dimmer => self.units.dimmer.subscription_oids(),
            Mode::Switch => self.units.switch.subscription_oids(),
            Mode::Heating => self.units.heating.subscription_oids(),
            Mode::WindowShutter => self.units.window_shutter.subscription_oids(),
            Mode::NumericDisplay => self.units.numeric_display.subscription_oids(),
            Mode::StringDisplay => self.units.string_display.subscription_oids(),
        }
    }

    /// Routes a broker push to the active mode's unit.
    ///
    /// Pushes for OIDs the active mode is not subscribed to are ignored,
    /// as are pushes arriving for a superseded configuration.
    pub fn handle_state_change(&mut self, oid: &str, value: &Value) {
        if !self.subscription_oids().iter().any(|s| s == oid) {
            return;
        }
        match self.config.mode {
            Mode::Dimmer => self.units.dimmer.handle_state_change(oid, value),
            Mode::Switch => self.units.switch.handle_state_change(oid, value),
            Mode::Heating => self.units.heating.handle_state_change(oid, value),
            Mode::WindowShutter => self.units.window_shutter.handle_state_change(oid, value),
            Mode::NumericDisplay => self.units.numeric_display.handle_state_change(oid, value),
            Mode::StringDisplay => self.units.string_display.handle_state_change(oid, value),
        }
    }

    // =========================================================================
    // User input
    // =========================================================================

    /// Dispatches a click on the widget body.
    ///
    /// Dialog modes open the shared dialog, the switch toggles, display
    /// modes optionally request navigation. Everything is suppressed in
    /// edit mode.
    pub async fn handle_click(&mut self) -> ClickOutcome {
        if self.edit_mode {
            return ClickOutcome::Ignored;
        }
        match self.config.mode {
            Mode::Dimmer | Mode::Heating | Mode::WindowShutter => {
                self.dialog_open = true;
                ClickOutcome::DialogOpened
            }
            Mode::Switch => {
                self.units.switch.toggle(self.edit_mode).await;
                ClickOutcome::Toggled
            }
            Mode::NumericDisplay | Mode::StringDisplay => {
                let action = self.config.display_click_action.unwrap_or_default();
                if action == ClickAction::Navigate
                    && let Some(view) = self
                        .config
                        .display_target_view
                        .clone()
                        .filter(|view| !view.is_empty())
                {
                    return ClickOutcome::Navigate(view);
                }
                ClickOutcome::Ignored
            }
        }
    }

    /// Dimmer: live slider change (debounced write).
    pub fn dimmer_live_change(&mut self, value: f64) {
        let edit_mode = self.edit_mode;
        self.units.dimmer.handle_live_change(value, edit_mode);
    }

    /// Dimmer: committed slider change (immediate write).
    pub async fn dimmer_commit(&mut self, value: f64) {
        let edit_mode = self.edit_mode;
        self.units.dimmer.handle_commit(value, edit_mode).await;
    }

    /// Dimmer: quick-set preset (immediate write).
    pub async fn dimmer_quick_set(&mut self, value: f64) {
        let edit_mode = self.edit_mode;
        self.units.dimmer.handle_quick_set(value, edit_mode).await;
    }

    /// Heating: setpoint increase pulse.
    pub async fn heating_increase(&self) {
        self.units.heating.handle_increase(self.edit_mode).await;
    }

    /// Heating: setpoint decrease pulse.
    pub async fn heating_decrease(&self) {
        self.units.heating.handle_decrease(self.edit_mode).await;
    }

    /// Heating: cycle to the next operating mode.
    pub async fn heating_mode_cycle(&self) {
        self.units.heating.handle_mode_cycle(self.edit_mode).await;
    }

    /// Heating: select an operating mode by its control value.
    pub async fn heating_mode_select(&self, control_value: f64) {
        self.units
            .heating
            .handle_mode_select(control_value, self.edit_mode)
            .await;
    }

    /// Shutter: write a position chosen on the dialog slider.
    pub async fn shutter_set_position(&self, percent: f64) {
        self.units
            .window_shutter
            .set_position(percent, self.edit_mode)
            .await;
    }

    /// Shutter: move up.
    pub async fn shutter_up(&self) {
        self.units.window_shutter.shutter_up(self.edit_mode).await;
    }

    /// Shutter: move down.
    pub async fn shutter_down(&self) {
        self.units.window_shutter.shutter_down(self.edit_mode).await;
    }

    /// Shutter: stop movement.
    pub async fn shutter_stop(&self) {
        self.units.window_shutter.shutter_stop(self.edit_mode).await;
    }

    // =========================================================================
    // Projection
    // =========================================================================

    /// Whether the active mode reports the highlighted state.
    #[must_use]
    pub fn is_active(&self) -> bool {
        match self.config.mode {
            Mode::Dimmer => self.units.dimmer.is_active(),
            Mode::Switch => self.units.switch.is_active(),
            Mode::Heating => self.units.heating.is_active(),
            Mode::WindowShutter => self.units.window_shutter.is_active(),
            Mode::NumericDisplay => self.units.numeric_display.is_active(),
            Mode::StringDisplay => self.units.string_display.is_active(),
        }
    }

    /// Derives the values the rendering surface paints. Computed per
    /// call; nothing is cached.
    #[must_use]
    pub fn projection(&self) -> RenderProjection {
        let is_active = self.is_active();

        let icon = if !is_active
            && self.config.use_different_inactive_icon.unwrap_or(false)
            && self
                .config
                .icon_inactive
                .as_ref()
                .is_some_and(|icon| !icon.is_empty())
        {
            self.config.icon_inactive.clone().unwrap_or_default()
        } else {
            self.config.icon.clone().unwrap_or_default()
        };

        let icon_color = if is_active {
            self.config.active_color.clone().unwrap_or_default()
        } else {
            self.config.inactive_color.clone().unwrap_or_default()
        };

        RenderProjection {
            is_active,
            icon,
            icon_color,
            top_text: self.top_text(),
            bottom_text: self.bottom_text(),
            display: self.display_layout(),
            shutter: self.shutter_graphic(),
            dialog_open: self.dialog_open,
            dialog: self.dialog_view(),
        }
    }

    fn top_text(&self) -> Option<String> {
        match self.config.mode {
            Mode::Heating => Some(
                self.units
                    .heating
                    .format_temperature(self.units.heating.state().setpoint_value),
            ),
            _ => None,
        }
    }

    fn bottom_text(&self) -> Option<String> {
        match self.config.mode {
            Mode::Heating => Some(
                self.units
                    .heating
                    .format_valve_position(self.units.heating.state().valve_value),
            ),
            Mode::Dimmer if self.config.show_percentage.unwrap_or(false) => Some(format!(
                "{}%",
                self.units.dimmer.state().local_value.round()
            )),
            Mode::Switch if self.config.show_status_text.unwrap_or(false) => {
                Some(if self.units.switch.state().is_on {
                    self.config
                        .status_on_text
                        .clone()
                        .filter(|t| !t.is_empty())
                        .unwrap_or_else(|| "ON".to_string())
                } else {
                    self.config
                        .status_off_text
                        .clone()
                        .filter(|t| !t.is_empty())
                        .unwrap_or_else(|| "OFF".to_string())
                })
            }
            _ => None,
        }
    }

    fn display_layout(&self) -> Option<DisplayLayout> {
        let value = match self.config.mode {
            Mode::NumericDisplay => self.units.numeric_display.state().formatted_value.clone(),
            Mode::StringDisplay => self.units.string_display.state().formatted_value.clone(),
            _ => return None,
        };
        Some(DisplayLayout {
            value,
            icon_position: self.config.display_icon_position.unwrap_or_default(),
            color: self.display_text_color(),
        })
    }

    /// Value text color: threshold color when one applies, else the
    /// configured color, else the default.
    fn display_text_color(&self) -> String {
        if self.config.mode == Mode::NumericDisplay {
            let color = &self.units.numeric_display.state().current_color;
            if !color.is_empty() {
                return color.clone();
            }
        }
        self.config
            .display_text_color
            .clone()
            .filter(|color| !color.is_empty())
            .unwrap_or_else(|| DEFAULT_TEXT_COLOR.to_string())
    }

    fn shutter_graphic(&self) -> Option<ShutterGraphic> {
        if self.config.mode != Mode::WindowShutter {
            return None;
        }
        let state = self.units.window_shutter.state();
        Some(ShutterGraphic {
            panes: state.pane_states.clone(),
            coverage: state.shutter_position.unwrap_or(0.0) / 100.0,
        })
    }

    fn dialog_view(&self) -> Option<DialogView> {
        if !self.dialog_open || !self.config.mode.has_dialog() {
            return None;
        }

        let content = match self.config.mode {
            Mode::Dimmer => {
                let config = self.units.dimmer.config();
                DialogContent::Dimmer(DimmerDialog {
                    value: self.units.dimmer.state().local_value,
                    min: config.min,
                    max: config.max,
                    step: config.step,
                    quick_buttons: if config.show_quick_buttons {
                        quick_buttons(config.min, config.max)
                    } else {
                        Vec::new()
                    },
                })
            }
            Mode::Heating => {
                let heating = &self.units.heating;
                let state = heating.state();
                DialogContent::Heating(HeatingDialog {
                    setpoint_text: heating.format_temperature(state.setpoint_value),
                    valve_text: heating.format_valve_position(state.valve_value),
                    current_mode_name: heating.current_mode_name(),
                    modes: heating.modes().to_vec(),
                    control_style: heating.config().control_style,
                })
            }
            Mode::WindowShutter => {
                let shutter = &self.units.window_shutter;
                let state = shutter.state();
                let config = shutter.config();
                let has_position = config.position_oid.is_some();
                DialogContent::WindowShutter(WindowShutterDialog {
                    panes: state.pane_states.clone(),
                    position: state.shutter_position.unwrap_or(0.0),
                    position_text: shutter.format_position(state.shutter_position),
                    can_move_up: config.up_oid.is_some() || has_position,
                    can_move_down: config.down_oid.is_some() || has_position,
                    can_stop: config.stop_oid.is_some(),
                })
            }
            Mode::Switch | Mode::NumericDisplay | Mode::StringDisplay => return None,
        };

        Some(DialogView {
            title: resolve_title(
                self.config.dialog_title.as_deref(),
                self.oid_name.as_deref(),
                self.config.mode,
            ),
            content,
        })
    }

    // =========================================================================
    // Internals
    // =========================================================================

    async fn initialize_active(&mut self) {
        match self.config.mode {
            Mode::Dimmer => self.units.dimmer.initialize().await,
            Mode::Switch => self.units.switch.initialize().await,
            Mode::Heating => self.units.heating.initialize().await,
            Mode::WindowShutter => self.units.window_shutter.initialize().await,
            Mode::NumericDisplay => self.units.numeric_display.initialize().await,
            Mode::StringDisplay => self.units.string_display.initialize().await,
        }
    }

    /// Discards and reconstructs the active mode's unit from the current
    /// configuration (fresh caches, cancelled timers).
    fn rebuild_active_unit(&mut self) {
        let broker = Arc::clone(&self.broker);
        match self.config.mode {
            Mode::Dimmer => {
                self.units.dimmer =
                    DimmerLogic::new(DimmerConfig::from_widget(&self.config), broker);
            }
            Mode::Switch => {
                self.units.switch =
                    SwitchLogic::new(SwitchConfig::from_widget(&self.config), broker);
            }
            Mode::Heating => {
                self.units.heating =
                    HeatingLogic::new(HeatingConfig::from_widget(&self.config), broker);
            }
            Mode::WindowShutter => {
                self.units.window_shutter = WindowShutterLogic::new(
                    WindowShutterConfig::from_widget(&self.config),
                    broker,
                );
            }
            Mode::NumericDisplay => {
                self.units.numeric_display = NumericDisplayLogic::new(
                    NumericDisplayConfig::from_widget(&self.config),
                    broker,
                );
            }
            Mode::StringDisplay => {
                self.units.string_display = StringDisplayLogic::new(
                    StringDisplayConfig::from_widget(&self.config),
                    broker,
                );
            }
        }
    }

    async fn swap_subscriptions(&self, old_oids: &[String]) {
        let new_oids = self.subscription_oids();
        if old_oids == new_oids.as_slice() {
            return;
        }
        if !old_oids.is_empty()
            && let Err(error) = self.broker.unsubscribe(old_oids).await
        {
            tracing::warn!(error = %error, "Unsubscribing stale OIDs failed");
        }
        if !new_oids.is_empty()
            && let Err(error) = self.broker.subscribe(&new_oids).await
        {
            tracing::warn!(error = %error, "Subscribing new OIDs failed");
        }
    }

    /// The OID whose display name titles the dialog, per mode.
    fn primary_oid(&self) -> Option<&str> {
        match self.config.mode {
            Mode::Dimmer | Mode::Switch => self.config.control_oid.as_deref(),
            Mode::Heating => self.config.heating_setpoint_oid.as_deref(),
            Mode::WindowShutter => self.config.shutter_position_oid.as_deref(),
            Mode::NumericDisplay => self.config.numeric_display_value_oid.as_deref(),
            Mode::StringDisplay => self.config.string_display_value_oid.as_deref(),
        }
    }

    /// Fetches the primary OID's display name. Failures keep the prior
    /// name; the title chain has further fallbacks anyway.
    async fn refresh_oid_name(&mut self) {
        let Some(oid) = self.primary_oid().map(str::to_string) else {
            self.oid_name = None;
            return;
        };
        match self.broker.get_object(&oid).await {
            Ok(Some(object)) => {
                self.oid_name = object
                    .name
                    .as_ref()
                    .and_then(|name| name.display_name(self.config.language()))
                    .map(str::to_string);
            }
            Ok(None) => self.oid_name = None,
            Err(error) => {
                tracing::warn!(oid = %oid, error = %error, "Fetching OID display name failed");
            }
        }
    }
}

/// Whether a field relevant to the given mode differs between two
/// configurations. Expressed structurally: each unit's config extractor
/// collects exactly the fields that unit consumes.
fn mode_config_changed(mode: Mode, old: &WidgetConfig, new: &WidgetConfig) -> bool {
    match mode {
        Mode::Dimmer => DimmerConfig::from_widget(old) != DimmerConfig::from_widget(new),
        Mode::Switch => SwitchConfig::from_widget(old) != SwitchConfig::from_widget(new),
        Mode::Heating => HeatingConfig::from_widget(old) != HeatingConfig::from_widget(new),
        Mode::WindowShutter => {
            WindowShutterConfig::from_widget(old) != WindowShutterConfig::from_widget(new)
        }
        Mode::NumericDisplay => {
            NumericDisplayConfig::from_widget(old) != NumericDisplayConfig::from_widget(new)
        }
        Mode::StringDisplay => {
            StringDisplayConfig::from_widget(old) != StringDisplayConfig::from_widget(new)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::{MemoryBroker, ObjectName};
    use serde_json::json;

    fn dimmer_config() -> WidgetConfig {
        WidgetConfig::from_json(json!({
            "mode": "dimmer",
            "controlOid": "light.level",
        }))
    }

    async fn widget(
        config: WidgetConfig,
        broker: &Arc<MemoryBroker>,
    ) -> FlexWidget<MemoryBroker> {
        let mut widget = FlexWidget::new(config, Arc::clone(broker));
        widget.initialize().await;
        widget
    }

    #[tokio::test]
    async fn initialize_subscribes_active_mode_oids_only() {
        let broker = Arc::new(MemoryBroker::new().with_state("light.level", json!(30)));
        let config = WidgetConfig::from_json(json!({
            "mode": "dimmer",
            "controlOid": "light.level",
            // Fields of inactive modes are carried but ignored.
            "numericDisplayValueOid": "sensor.unrelated",
        }));
        let w = widget(config, &broker).await;

        assert_eq!(broker.subscriptions(), vec!["light.level".to_string()]);
        assert!(w.is_active());
    }

    #[tokio::test]
    async fn relevant_config_change_reinitializes_unit() {
        let broker = Arc::new(MemoryBroker::new().with_state("light.level", json!(90)));
        let mut w = widget(dimmer_config(), &broker).await;
        let reads_before = broker.reads().len();

        let mut edited = w.config().clone();
        edited.dimmer_max_value = Some(80.0);
        w.update_config(edited).await;

        // The unit was rebuilt and re-initialized: a fresh fetch happened
        // and the new clamp applies.
        assert!(broker.reads().len() > reads_before);
        assert!((w.units.dimmer.state().local_value - 80.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn styling_change_does_not_reinitialize() {
        let broker = Arc::new(MemoryBroker::new().with_state("light.level", json!(30)));
        let mut w = widget(dimmer_config(), &broker).await;
        let reads_before = broker.reads().len();

        let mut edited = w.config().clone();
        edited.active_color = Some("#ff0000".to_string());
        w.update_config(edited).await;

        assert_eq!(broker.reads().len(), reads_before);
        assert_eq!(w.config().active_color.as_deref(), Some("#ff0000"));
    }

    #[tokio::test]
    async fn mode_change_swaps_subscriptions_and_state() {
        let broker = Arc::new(
            MemoryBroker::new()
                .with_state("light.level", json!(30))
                .with_state("sensor.power", json!(1500)),
        );
        let mut w = widget(dimmer_config(), &broker).await;
        assert_eq!(broker.subscriptions(), vec!["light.level".to_string()]);

        let edited = WidgetConfig::from_json(json!({
            "mode": "numeric_display",
            "controlOid": "light.level",
            "numericDisplayValueOid": "sensor.power",
        }));
        w.update_config(edited).await;

        assert_eq!(broker.subscriptions(), vec!["sensor.power".to_string()]);
        assert_eq!(w.mode(), Mode::NumericDisplay);
        assert_eq!(
            w.units.numeric_display.state().formatted_value,
            "1500".to_string()
        );
        // Display modes never highlight.
        assert!(!w.is_active());
    }

    #[tokio::test]
    async fn pushes_route_to_active_unit_and_unrelated_oids_are_ignored() {
        let broker = Arc::new(MemoryBroker::new());
        let mut w = widget(dimmer_config(), &broker).await;

        w.handle_state_change("light.level", &json!(42));
        assert!((w.units.dimmer.state().local_value - 42.0).abs() < f64::EPSILON);

        w.handle_state_change("some.other.oid", &json!(99));
        assert!((w.units.dimmer.state().local_value - 42.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn click_opens_dialog_for_dialog_modes() {
        let broker = Arc::new(MemoryBroker::new());
        let mut w = widget(dimmer_config(), &broker).await;

        assert_eq!(w.handle_click().await, ClickOutcome::DialogOpened);
        assert!(w.dialog_open());
        let projection = w.projection();
        assert!(matches!(
            projection.dialog.as_ref().map(|d| &d.content),
            Some(DialogContent::Dimmer(_))
        ));

        w.close_dialog();
        assert!(!w.dialog_open());
        assert!(w.projection().dialog.is_none());
    }

    #[tokio::test]
    async fn click_toggles_switch_without_dialog() {
        let broker = Arc::new(MemoryBroker::new().with_state("light.power", json!(false)));
        let config = WidgetConfig::from_json(json!({
            "mode": "switch",
            "controlOid": "light.power",
        }));
        let mut w = widget(config, &broker).await;

        assert_eq!(w.handle_click().await, ClickOutcome::Toggled);
        assert!(!w.dialog_open());
        assert_eq!(
            broker.writes(),
            vec![("light.power".to_string(), json!(true))]
        );
    }

    #[tokio::test]
    async fn click_navigates_for_display_modes_when_configured() {
        let broker = Arc::new(MemoryBroker::new());
        let config = WidgetConfig::from_json(json!({
            "mode": "string_display",
            "stringDisplayValueOid": "state.text",
            "displayClickAction": "navigate",
            "displayTargetView": "details",
        }));
        let mut w = widget(config, &broker).await;
        assert_eq!(
            w.handle_click().await,
            ClickOutcome::Navigate("details".to_string())
        );

        let mut plain = w.config().clone();
        plain.display_click_action = Some(ClickAction::None);
        w.update_config(plain).await;
        assert_eq!(w.handle_click().await, ClickOutcome::Ignored);
    }

    #[tokio::test]
    async fn edit_mode_suppresses_click_dispatch() {
        let broker = Arc::new(MemoryBroker::new());
        let config = WidgetConfig::from_json(json!({
            "mode": "switch",
            "controlOid": "light.power",
        }));
        let mut w = widget(config, &broker).await;
        w.set_edit_mode(true);

        assert_eq!(w.handle_click().await, ClickOutcome::Ignored);
        assert!(broker.writes().is_empty());
    }

    #[tokio::test]
    async fn dialog_title_priority() {
        let broker = Arc::new(
            MemoryBroker::new()
                .with_object_name("light.level", ObjectName::Text("Ceiling lamp".to_string())),
        );

        // Explicit title wins.
        let mut config = dimmer_config();
        config.dialog_title = Some("My dimmer".to_string());
        let mut w = widget(config, &broker).await;
        w.handle_click().await;
        assert_eq!(w.projection().dialog.unwrap().title, "My dimmer");

        // OID display name next.
        let mut w = widget(dimmer_config(), &broker).await;
        w.handle_click().await;
        assert_eq!(w.projection().dialog.unwrap().title, "Ceiling lamp");

        // Mode label last.
        let config = WidgetConfig::from_json(json!({
            "mode": "dimmer",
            "controlOid": "light.unnamed",
        }));
        let mut w = widget(config, &broker).await;
        w.handle_click().await;
        assert_eq!(w.projection().dialog.unwrap().title, "Dimmer");
    }

    #[tokio::test]
    async fn heating_projection_has_top_and_bottom_text() {
        let broker = Arc::new(
            MemoryBroker::new()
                .with_state("knx.setpoint", json!(21.5))
                .with_state("knx.valve", json!(47)),
        );
        let config = WidgetConfig::from_json(json!({
            "mode": "heating",
            "heatingSetpointOid": "knx.setpoint",
            "heatingValvePositionOid": "knx.valve",
            "heatingShowUnits": true,
        }));
        let w = widget(config, &broker).await;

        let projection = w.projection();
        assert_eq!(projection.top_text.as_deref(), Some("21.5°C"));
        assert_eq!(projection.bottom_text.as_deref(), Some("47%"));
        assert!(projection.is_active);
    }

    #[tokio::test]
    async fn dimmer_projection_shows_percentage_when_enabled() {
        let broker = Arc::new(MemoryBroker::new().with_state("light.level", json!(74.6)));
        let mut config = dimmer_config();
        config.show_percentage = Some(true);
        let w = widget(config, &broker).await;
        assert_eq!(w.projection().bottom_text.as_deref(), Some("75%"));

        let plain = widget(dimmer_config(), &broker).await;
        assert!(plain.projection().bottom_text.is_none());
    }

    #[tokio::test]
    async fn switch_projection_status_text() {
        let broker = Arc::new(MemoryBroker::new().with_state("light.power", json!(true)));
        let config = WidgetConfig::from_json(json!({
            "mode": "switch",
            "controlOid": "light.power",
            "showStatusText": true,
        }));
        let mut w = widget(config, &broker).await;
        assert_eq!(w.projection().bottom_text.as_deref(), Some("ON"));

        w.handle_state_change("light.power", &json!(false));
        assert_eq!(w.projection().bottom_text.as_deref(), Some("OFF"));
    }

    #[tokio::test]
    async fn display_projection_carries_layout_and_color() {
        let broker = Arc::new(MemoryBroker::new().with_state("sensor.power", json!(80)));
        let config = WidgetConfig::from_json(json!({
            "mode": "numeric_display",
            "numericDisplayValueOid": "sensor.power",
            "numericDisplayUseColorThresholds": true,
            "numericDisplayThresholdLow": 30,
            "numericDisplayThresholdHigh": 70,
            "displayIconPosition": "left",
        }));
        let w = widget(config, &broker).await;

        let display = w.projection().display.unwrap();
        assert_eq!(display.value, "80");
        assert_eq!(display.icon_position, crate::config::IconPosition::Left);
        assert_eq!(display.color, "#f44336");
    }

    #[tokio::test]
    async fn inactive_icon_is_selected_when_configured() {
        let broker = Arc::new(MemoryBroker::new().with_state("light.level", json!(0)));
        let config = WidgetConfig::from_json(json!({
            "mode": "dimmer",
            "controlOid": "light.level",
            "icon": "bulb-on.svg",
            "iconInactive": "bulb-off.svg",
            "useDifferentInactiveIcon": true,
            "activeColor": "#ffcc00",
            "inactiveColor": "#444444",
        }));
        let mut w = widget(config, &broker).await;

        let projection = w.projection();
        assert!(!projection.is_active);
        assert_eq!(projection.icon, "bulb-off.svg");
        assert_eq!(projection.icon_color, "#444444");

        w.handle_state_change("light.level", &json!(60));
        let projection = w.projection();
        assert_eq!(projection.icon, "bulb-on.svg");
        assert_eq!(projection.icon_color, "#ffcc00");
    }

    #[tokio::test]
    async fn teardown_unsubscribes() {
        let broker = Arc::new(MemoryBroker::new());
        let mut w = widget(dimmer_config(), &broker).await;
        assert!(!broker.subscriptions().is_empty());

        w.teardown().await;
        assert!(broker.subscriptions().is_empty());
    }
}
