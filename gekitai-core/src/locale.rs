//! Locale selection and the cached localized-string context.
//!
//! String storage itself lives behind [`StringCatalog`]; this module only owns
//! which locale is current and the single cached table derived from it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Locales the host ships strings for.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    English,
    Japanese,
}

impl Locale {
    /// Resolve a language tag sent by content. Unknown tags fall back to English.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "ja" | "jp" | "ja-JP" => Locale::Japanese,
            _ => Locale::English,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Locale::English => "en",
            Locale::Japanese => "ja",
        }
    }
}

/// Host strings used by dialogs, rationale prompts and notifications.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum StringId {
    AppName,
    Ok,
    Cancel,
    CantUseVibration,
    NeedsVibration,
}

/// Lookup contract for localized strings.
pub trait StringCatalog: Send {
    fn load(&self, locale: Locale) -> HashMap<StringId, String>;
}

/// Strings compiled into the host.
#[derive(Default)]
pub struct BuiltinCatalog;

impl StringCatalog for BuiltinCatalog {
    fn load(&self, locale: Locale) -> HashMap<StringId, String> {
        let entries: [(StringId, &str); 5] = match locale {
            Locale::English => [
                (StringId::AppName, "Gekitai"),
                (StringId::Ok, "OK"),
                (StringId::Cancel, "Cancel"),
                (StringId::CantUseVibration, "Vibration is not available."),
                (
                    StringId::NeedsVibration,
                    "This app uses vibration for alerts. Please allow it.",
                ),
            ],
            Locale::Japanese => [
                (StringId::AppName, "撃退"),
                (StringId::Ok, "OK"),
                (StringId::Cancel, "キャンセル"),
                (StringId::CantUseVibration, "振動が使えません。"),
                (
                    StringId::NeedsVibration,
                    "このアプリは警報に振動を使います。許可してください。",
                ),
            ],
        };
        entries
            .into_iter()
            .map(|(id, text)| (id, text.to_owned()))
            .collect()
    }
}

/// A resolved string table for one locale.
pub struct LocaleContext {
    locale: Locale,
    strings: HashMap<StringId, String>,
}

impl LocaleContext {
    pub fn locale(&self) -> Locale {
        self.locale
    }
}

/// Current locale plus at most one cached [`LocaleContext`].
pub struct Locales {
    current: Locale,
    cached: Option<LocaleContext>,
    catalog: Box<dyn StringCatalog>,
}

impl Locales {
    pub fn new(initial: Locale, catalog: Box<dyn StringCatalog>) -> Self {
        Self {
            current: initial,
            cached: None,
            catalog,
        }
    }

    pub fn current(&self) -> Locale {
        self.current
    }

    /// Switch locale. The cached context is dropped even if the locale is unchanged.
    pub fn set_current(&mut self, locale: Locale) {
        self.current = locale;
        self.cached = None;
    }

    /// Drop the cached context so the next lookup reloads it.
    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    pub fn is_cached(&self) -> bool {
        self.cached.is_some()
    }

    /// Look up a string, building the context for the current locale on demand.
    pub fn get(&mut self, id: StringId) -> String {
        let current = self.current;
        let catalog = &self.catalog;
        let ctx = self.cached.get_or_insert_with(|| LocaleContext {
            locale: current,
            strings: catalog.load(current),
        });
        ctx.strings
            .get(&id)
            .cloned()
            .unwrap_or_else(|| format!("{id:?}"))
    }

    pub fn cached_context(&self) -> Option<&LocaleContext> {
        self.cached.as_ref()
    }
}
