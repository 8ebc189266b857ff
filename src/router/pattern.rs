//! Template compilation.
//!
//! A template such as `/users/:id/posts/index` is parsed once, left to right,
//! into a case-insensitive regex plus the ordered list of parameter names.
//! The two are produced together, so capture group `n + 1` always belongs to
//! `param_names[n]`.
//!
//! | Template fragment      | Regex fragment                  |
//! |------------------------|---------------------------------|
//! | literal text           | escaped literal                 |
//! | `:name` / `%name`      | `([^?/]+)`                      |
//! | trailing `/index`      | `(?:/(?:[:%]?index)?)?`         |
//! | (always appended)      | `(?:\?(?P<query>(?s:.*)))?$`    |

use regex::Regex;
use std::sync::Arc;

use super::core::ParamVec;

/// Capture used for every path parameter: one or more chars that are neither `/` nor `?`.
const PARAM_CAPTURE: &str = "([^?/]+)";

/// Optional suffix replacing a trailing `/index`.
const INDEX_SUFFIX: &str = "(?:/(?:[:%]?index)?)?";

/// Optional query string, captured without its leading `?`. `.` also matches
/// a raw newline so a query containing one still matches.
const QUERY_SUFFIX: &str = r"(?:\?(?P<query>(?s:.*)))?$";

/// Literal name of the segment that folds onto its parent directory.
pub const INDEX_SEGMENT: &str = "index";

/// Returns true for the two parameter markers. `%` stands in for `:` on
/// filesystems that cannot store a colon in a file name.
#[inline]
#[must_use]
pub fn is_param_marker(c: char) -> bool {
    c == ':' || c == '%'
}

/// Parameters and query data extracted by a successful match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternMatch {
    /// Path parameters in template order, values as they appear in the URL.
    pub params: ParamVec,
    /// Decoded query pairs in request order. Duplicate keys are all kept.
    pub query: ParamVec,
}

/// A compiled route template.
#[derive(Debug, Clone)]
pub struct RoutePattern {
    regex: Regex,
    param_names: Vec<Arc<str>>,
    is_index: bool,
}

impl RoutePattern {
    /// Compile a residual template (method token already removed).
    ///
    /// # Errors
    ///
    /// Returns the regex error if the generated expression cannot be built,
    /// which only happens for templates large enough to exceed the regex size limit.
    pub fn compile(template: &str) -> Result<Self, regex::Error> {
        let (body, is_index) = split_index(template);

        let mut pattern = String::with_capacity(body.len() * 2 + INDEX_SUFFIX.len() + 32);
        pattern.push_str("(?i)^");
        let mut param_names = Vec::new();

        let mut literal_start = 0;
        let mut chars = body.char_indices().peekable();
        while let Some((pos, c)) = chars.next() {
            if !is_param_marker(c) {
                continue;
            }
            let name_start = pos + c.len_utf8();
            let name_end = body[name_start..]
                .find('/')
                .map_or(body.len(), |offset| name_start + offset);
            if name_end == name_start {
                // A bare marker (`:/` or trailing `:`) stays literal.
                continue;
            }

            pattern.push_str(&regex::escape(&body[literal_start..pos]));
            pattern.push_str(PARAM_CAPTURE);
            param_names.push(Arc::from(&body[name_start..name_end]));
            literal_start = name_end;

            while chars.peek().is_some_and(|(next, _)| *next < name_end) {
                chars.next();
            }
        }
        pattern.push_str(&regex::escape(&body[literal_start..]));

        if is_index && body.len() < template.len() {
            pattern.push_str(INDEX_SUFFIX);
        }
        pattern.push_str(QUERY_SUFFIX);

        Ok(Self {
            regex: Regex::new(&pattern)?,
            param_names,
            is_index,
        })
    }

    /// True when the template's final segment is the literal `index`.
    #[inline]
    #[must_use]
    pub fn is_index(&self) -> bool {
        self.is_index
    }

    /// Parameter names in the order their captures appear.
    #[must_use]
    pub fn param_names(&self) -> &[Arc<str>] {
        &self.param_names
    }

    /// The generated regular expression.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Cheap check without extracting anything.
    #[inline]
    #[must_use]
    pub fn is_match(&self, url: &str) -> bool {
        self.regex.is_match(url)
    }

    /// Match a request URL (path plus optional `?query`).
    ///
    /// Returns `None` when the URL does not fit the template. A missing, empty
    /// or partly malformed query string never prevents a match; pairs that
    /// cannot be split simply yield fewer entries.
    #[must_use]
    pub fn matches(&self, url: &str) -> Option<PatternMatch> {
        let caps = self.regex.captures(url)?;

        let params = self
            .param_names
            .iter()
            .enumerate()
            .filter_map(|(idx, name)| {
                caps.get(idx + 1)
                    .map(|value| (Arc::clone(name), value.as_str().to_string()))
            })
            .collect();

        let query = caps
            .name("query")
            .map(|q| parse_query(q.as_str()))
            .unwrap_or_default();

        Some(PatternMatch { params, query })
    }
}

/// Decode a raw query string (`a=1&b=two%20words`) into ordered pairs.
///
/// Uses form-urlencoded rules: `&` separates pairs, the first `=` splits key
/// from value, `+` is a space and percent escapes are decoded in both halves.
/// Empty segments are skipped.
#[must_use]
pub fn parse_query(raw: &str) -> ParamVec {
    url::form_urlencoded::parse(raw.as_bytes())
        .map(|(k, v)| (Arc::from(&*k), v.into_owned()))
        .collect()
}

/// Split a trailing `index` segment off a template.
///
/// Returns the body to compile and whether the template is an index route.
/// Only a `/index` suffix is folded; a bare `index` template is marked but
/// kept literal.
fn split_index(template: &str) -> (&str, bool) {
    let last_segment = template.rsplit('/').next().unwrap_or(template);
    if last_segment != INDEX_SEGMENT {
        return (template, false);
    }
    match template.strip_suffix("/index") {
        Some(body) => (body, true),
        None => (template, true),
    }
}
