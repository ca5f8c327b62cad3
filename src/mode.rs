//! Change-detection and replay configuration.

/// How a [`ReactiveProperty`](crate::ReactiveProperty) filters assignments and
/// greets new subscribers. Both options are on by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct ReactivePropertyMode {
    /// Skip an assignment, and its notification, when the new value equals
    /// the current one.
    pub distinct_until_changed: bool,
    /// Hand the current value to each new observer while it subscribes.
    pub raise_latest_value_on_subscribe: bool,
}

impl ReactivePropertyMode {
    /// Both options off: every assignment notifies, subscribers wait for the
    /// next change.
    pub const PLAIN: Self = Self {
        distinct_until_changed: false,
        raise_latest_value_on_subscribe: false,
    };

    pub fn distinct_until_changed(mut self, enabled: bool) -> Self {
        self.distinct_until_changed = enabled;
        self
    }

    pub fn raise_latest_value_on_subscribe(mut self, enabled: bool) -> Self {
        self.raise_latest_value_on_subscribe = enabled;
        self
    }
}

impl Default for ReactivePropertyMode {
    fn default() -> Self {
        Self {
            distinct_until_changed: true,
            raise_latest_value_on_subscribe: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mode() {
        let mode = ReactivePropertyMode::default();
        assert!(mode.distinct_until_changed);
        assert!(mode.raise_latest_value_on_subscribe);
    }

    #[test]
    fn test_builder_setters() {
        let mode = ReactivePropertyMode::default().distinct_until_changed(false);
        assert!(!mode.distinct_until_changed);
        assert!(mode.raise_latest_value_on_subscribe);
        assert_eq!(
            mode.raise_latest_value_on_subscribe(false),
            ReactivePropertyMode::PLAIN
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_mode_from_json() {
        let mode: ReactivePropertyMode =
            serde_json::from_str(r#"{"raiseLatestValueOnSubscribe": false}"#).unwrap();
        assert!(mode.distinct_until_changed);
        assert!(!mode.raise_latest_value_on_subscribe);

        let json = serde_json::to_string(&ReactivePropertyMode::PLAIN).unwrap();
        assert_eq!(
            json,
            r#"{"distinctUntilChanged":false,"raiseLatestValueOnSubscribe":false}"#
        );
    }
}
