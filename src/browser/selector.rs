//! Typed selectors for the application under test
//!
//! A selector has two renderings: the engine string handed to agent-browser
//! for clicks and fills, and a JavaScript expression that resolves every
//! matching element on the live page for waits, reads and captures.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::{Result, VerifyError};

/// Whitespace-normalising, lower-casing helper shared by the text matchers
const NORM_JS: &str = "const norm = s => (s || '').replace(/\\s+/g, ' ').trim().toLowerCase();";

/// Locates elements in the externally running page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Selector {
    /// Plain CSS selector (`#loading`)
    Css(String),
    /// Innermost elements containing the text (`text=Global Settings`), or
    /// whose whole text equals it when quoted (`text="Roles"`)
    Text { text: String, exact: bool },
    /// CSS matches filtered by contained text (`a.nav-link:has-text('Roles')`)
    CssHasText { css: String, text: String },
    /// ARIA role with an accessible name (`role=button[name="Export"s]`)
    Role {
        role: String,
        name: String,
        exact: bool,
    },
    /// Matches of `inner` inside a match of `scope` (`tr:has-text("A") >> button`)
    Within {
        scope: Box<Selector>,
        inner: Box<Selector>,
    },
}

impl Selector {
    /// CSS selector
    pub fn css(css: impl Into<String>) -> Self {
        Self::Css(css.into())
    }

    /// Text selector matching a substring, case-insensitively
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            exact: false,
        }
    }

    /// Text selector matching the whole text, case-sensitively
    pub fn text_exact(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            exact: true,
        }
    }

    /// Restrict `self` to matches inside a match of `scope`
    pub fn within(self, scope: Selector) -> Self {
        Self::Within {
            scope: Box::new(scope),
            inner: Box::new(self),
        }
    }

    /// CSS selector filtered by text
    pub fn has_text(css: impl Into<String>, text: impl Into<String>) -> Self {
        Self::CssHasText {
            css: css.into(),
            text: text.into(),
        }
    }

    /// Role selector matching the accessible name exactly
    pub fn role_exact(role: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Role {
            role: role.into(),
            name: name.into(),
            exact: true,
        }
    }

    /// Parse the engine string form
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(VerifyError::Selector(input.to_string()));
        }

        if input.contains(" >> ") {
            let mut parts = input.split(" >> ").map(Self::parse);
            let first = parts
                .next()
                .ok_or_else(|| VerifyError::Selector(input.to_string()))??;
            return parts.try_fold(first, |scope, inner| Ok(inner?.within(scope)));
        }

        if let Some(raw) = input.strip_prefix("text=") {
            let (text, exact) = match unquote(raw) {
                Some(text) => (text, true),
                None => (raw.to_string(), false),
            };
            if text.is_empty() {
                return Err(VerifyError::Selector(input.to_string()));
            }
            return Ok(Self::Text { text, exact });
        }

        if let Some(rest) = input.strip_prefix("role=") {
            return parse_role(rest).ok_or_else(|| VerifyError::Selector(input.to_string()));
        }

        if let Some(idx) = input.rfind(":has-text(") {
            let css = &input[..idx];
            let arg = input[idx + ":has-text(".len()..]
                .strip_suffix(')')
                .ok_or_else(|| VerifyError::Selector(input.to_string()))?;
            let text = unquote(arg).ok_or_else(|| VerifyError::Selector(input.to_string()))?;
            if css.is_empty() {
                return Err(VerifyError::Selector(input.to_string()));
            }
            return Ok(Self::CssHasText {
                css: css.to_string(),
                text,
            });
        }

        Ok(Self::Css(input.to_string()))
    }

    /// JavaScript expression evaluating to an array of matching elements
    pub fn elements_js(&self) -> String {
        match self {
            Self::Css(css) => format!(
                "Array.from(document.querySelectorAll({}))",
                js_string(css)
            ),
            Self::Text { text, exact } => format!(
                "(() => {{ {NORM_JS} const collapse = s => (s || '').replace(/\\s+/g, ' ').trim(); \
                 const wanted = {}; const hit = el => {}; \
                 const all = Array.from(document.querySelectorAll('body *')) \
                 .filter(el => !['SCRIPT', 'STYLE', 'TEMPLATE'].includes(el.tagName) && hit(el)); \
                 return all.filter(el => !all.some(other => other !== el && el.contains(other))); }})()",
                js_string(text),
                if *exact {
                    "collapse(el.textContent) === collapse(wanted)"
                } else {
                    "norm(el.textContent).includes(norm(wanted))"
                }
            ),
            Self::CssHasText { css, text } => format!(
                "(() => {{ {NORM_JS} const needle = norm({}); \
                 return Array.from(document.querySelectorAll({})).filter(el => norm(el.textContent).includes(needle)); }})()",
                js_string(text),
                js_string(css)
            ),
            Self::Role { role, name, exact } => format!(
                "(() => {{ {NORM_JS} const wanted = {}; \
                 const label = el => el.getAttribute('aria-label') || (el.tagName === 'INPUT' ? el.value : el.textContent); \
                 const matches = el => {} ; \
                 return Array.from(document.querySelectorAll({})).filter(matches); }})()",
                js_string(name),
                if *exact {
                    "(label(el) || '').replace(/\\s+/g, ' ').trim() === wanted"
                } else {
                    "norm(label(el)).includes(norm(wanted))"
                },
                js_string(&implicit_role_css(role))
            ),
            Self::Within { scope, inner } => format!(
                "(() => {{ const scopes = {}; \
                 return {}.filter(el => scopes.some(s => s !== el && s.contains(el))); }})()",
                scope.elements_js(),
                inner.elements_js()
            ),
        }
    }

    /// JavaScript expression evaluating to `{count, visible, value}`
    pub fn state_js(&self) -> String {
        format!(
            "(() => {{ const els = {}; \
             const isVisible = el => {{ const style = window.getComputedStyle(el); \
             if (style.visibility === 'hidden' || style.display === 'none') return false; \
             const r = el.getBoundingClientRect(); return r.width > 0 && r.height > 0; }}; \
             const first = els[0]; \
             return {{ count: els.length, visible: els.some(isVisible), \
             value: first && typeof first.value === 'string' ? first.value : null }}; }})()",
            self.elements_js()
        )
    }

    /// JavaScript expression evaluating to the document-space box of the
    /// first matching element, scaled to device pixels, or `null`
    pub fn bounding_box_js(&self) -> String {
        format!(
            "(() => {{ const el = {}[0]; if (!el) return null; \
             el.scrollIntoView({{ block: 'nearest' }}); \
             const r = el.getBoundingClientRect(); const dpr = window.devicePixelRatio || 1; \
             return {{ x: (r.left + window.scrollX) * dpr, y: (r.top + window.scrollY) * dpr, \
             width: r.width * dpr, height: r.height * dpr }}; }})()",
            self.elements_js()
        )
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(css) => write!(f, "{}", css),
            Self::Text { text, exact: false } => write!(f, "text={}", text),
            Self::Text { text, exact: true } => write!(f, "text={}", js_string(text)),
            Self::CssHasText { css, text } => write!(f, "{}:has-text({})", css, js_string(text)),
            Self::Role { role, name, exact } => write!(
                f,
                "role={}[name={}{}]",
                role,
                js_string(name),
                if *exact { "s" } else { "i" }
            ),
            Self::Within { scope, inner } => write!(f, "{} >> {}", scope, inner),
        }
    }
}

impl FromStr for Selector {
    type Err = VerifyError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Selector {
    type Error = VerifyError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Selector> for String {
    fn from(selector: Selector) -> Self {
        selector.to_string()
    }
}

/// Quote a string as a JavaScript (JSON) string literal
pub fn js_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

/// Strip one level of single or double quotes
fn unquote(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        return serde_json::from_str(raw).ok();
    }
    if raw.len() >= 2 && raw.starts_with('\'') && raw.ends_with('\'') {
        return Some(raw[1..raw.len() - 1].to_string());
    }
    None
}

/// `button[name="Export"s]`
fn parse_role(rest: &str) -> Option<Selector> {
    let open = rest.find('[')?;
    let role = &rest[..open];
    let attr = rest[open + 1..].strip_suffix(']')?;
    let value = attr.strip_prefix("name=")?;

    let (quoted, exact) = if let Some(v) = value.strip_suffix('s') {
        (v, true)
    } else if let Some(v) = value.strip_suffix('i') {
        (v, false)
    } else {
        (value, false)
    };

    if role.is_empty() {
        return None;
    }

    Some(Selector::Role {
        role: role.to_string(),
        name: unquote(quoted)?,
        exact,
    })
}

/// CSS matching elements that carry `role` explicitly or implicitly
fn implicit_role_css(role: &str) -> String {
    let implicit = match role {
        "button" => "button, input[type=\"button\"], input[type=\"submit\"], input[type=\"reset\"], ",
        "link" => "a[href], ",
        "textbox" => "input:not([type]), input[type=\"text\"], textarea, ",
        "checkbox" => "input[type=\"checkbox\"], ",
        _ => "",
    };
    format!("{}[role=\"{}\"]", implicit, role)
}
