#![forbid(unsafe_code)]

//! Environment facts reported in the `startSession` handshake.
//!
//! Facts are gathered through [`EnvironmentProbe`] each time a handshake is
//! built, so a restarted session reports the current state of the page.

use rui_wire::{Record, Value};

/// Capabilities and preferences of the hosting page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvironmentFacts {
    pub touch: bool,
    /// Computed text direction of the document body (`ltr` / `rtl`).
    pub direction: Option<String>,
    pub language: Option<String>,
    pub languages: Vec<String>,
    pub user_agent: Option<String>,
    /// The page prefers a dark color scheme.
    pub dark: bool,
    pub pixel_ratio: Option<f64>,
    /// Persisted key/value pairs in storage order.
    pub storage: Vec<(String, String)>,
}

impl EnvironmentFacts {
    /// Encode as the `startSession` handshake record.
    ///
    /// Absent facts are omitted; `touch` is always present as `0` or `1`.
    #[must_use]
    pub fn start_session_record(&self) -> Record {
        let languages = (!self.languages.is_empty()).then(|| self.languages.join(","));
        let mut record = Record::new("startSession")
            .with_int("touch", i64::from(self.touch))
            .with_opt_bare("direction", self.direction.as_deref())
            .with_opt_text("language", self.language.as_deref())
            .with_opt_text("languages", languages)
            .with_opt_text("user-agent", self.user_agent.as_deref())
            .with_flag("dark", self.dark);
        if let Some(ratio) = self.pixel_ratio.filter(|r| r.is_finite() && *r > 0.0) {
            record = record.with_float("pixel-ratio", ratio);
        }
        if !self.storage.is_empty() {
            let mut storage = Record::anonymous();
            for (key, value) in &self.storage {
                storage.insert(key.as_str(), Value::Text(value.clone()));
            }
            record = record.with_record("storage", storage);
        }
        record
    }
}

/// Source of [`EnvironmentFacts`], implemented by the rendering surface.
pub trait EnvironmentProbe {
    fn environment_facts(&self) -> EnvironmentFacts;
}

impl EnvironmentProbe for EnvironmentFacts {
    fn environment_facts(&self) -> EnvironmentFacts {
        self.clone()
    }
}

impl<F> EnvironmentProbe for F
where
    F: Fn() -> EnvironmentFacts,
{
    fn environment_facts(&self) -> EnvironmentFacts {
        self()
    }
}
