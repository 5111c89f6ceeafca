use std::fmt;
use std::sync::OnceLock;

use itertools::Itertools;
use regex::Regex;

// Endpoint templates, relative to the API base URL. Handlers and link
// builders must agree on these exactly, so they live in one place.
pub const ACTIVITIES: &str = "/activities";
pub const ACTIVITIES_PAGE: &str = "/activities/{pageNo}";
pub const MONITORING: &str = "/monitoring";
pub const INDEXER_VERSION: &str = "/indexer/version";
pub const SITEMAP_UPDATE: &str = "/sitemap/update";
pub const SITEMAP_STATUS: &str = "/sitemap/status";
pub const SITEMAP_FILES: &str = "/sitemap/files";
pub const OPENAPI: &str = "/openapi.json";

/// Record view page, served by the viewer application rather than this API.
/// Keeps the trailing slash the application expects.
pub const RECORD_PAGE: &str = "/records/{pi}/";

fn placeholder_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"\{\w+\}").ok())
        .as_ref()
}

/// Configured base URLs of the REST API and the viewer application, both
/// stored without a trailing slash. All endpoint URLs are built from here.
#[derive(Debug, Clone)]
pub struct ApiUrls {
    api_url: String,
    application_url: String,
}

impl ApiUrls {
    pub fn new(api_url: &str, application_url: &str) -> Self {
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            application_url: application_url.trim_end_matches('/').to_string(),
        }
    }

    /// Base URL of the API, without trailing slash
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Base URL of the viewer application, without trailing slash
    pub fn application_url(&self) -> &str {
        &self.application_url
    }

    /// Start a URL from the API base followed by the given path fragments.
    /// Fragment syntax is not validated.
    pub fn path<'a>(&self, fragments: impl IntoIterator<Item = &'a str>) -> ApiPath {
        Self::build_path(&self.api_url, fragments)
    }

    /// Start a URL from the application base followed by the given fragments.
    pub fn application_path<'a>(&self, fragments: impl IntoIterator<Item = &'a str>) -> ApiPath {
        Self::build_path(&self.application_url, fragments)
    }

    fn build_path<'a>(base: &str, fragments: impl IntoIterator<Item = &'a str>) -> ApiPath {
        let mut segments = vec![base.to_string()];
        segments.extend(fragments.into_iter().map(|f| f.to_string()));
        ApiPath {
            segments,
            params: Vec::new(),
            queries: Vec::new(),
        }
    }
}

/// Accumulated URL under construction: literal path segments (possibly
/// containing `{name}` placeholders), positional parameter values, and an
/// insertion-ordered query set.
#[derive(Debug, Clone)]
pub struct ApiPath {
    segments: Vec<String>,
    params: Vec<String>,
    queries: Vec<(String, String)>,
}

impl ApiPath {
    /// Record positional values for placeholder substitution. On `build()`,
    /// placeholders are filled left-to-right, each value consuming exactly one
    /// placeholder occurrence. Surplus placeholders stay literal and surplus
    /// values are ignored; neither is an error.
    pub fn params<I, T>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        self.params.extend(values.into_iter().map(|v| v.to_string()));
        self
    }

    /// Append a query parameter. Repeated keys overwrite the earlier value in
    /// place, keeping the original insertion position.
    pub fn query(mut self, key: &str, value: &str) -> Self {
        match self.queries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.queries.push((key.to_string(), value.to_string())),
        }
        self
    }

    pub fn build(&self) -> String {
        let mut url = self.segments.concat();
        if !self.params.is_empty() {
            url = fill_placeholders(&url, &self.params);
        }
        if !self.queries.is_empty() {
            let query = self
                .queries
                .iter()
                .map(|(key, value)| format!("{}={}", key, value))
                .join("&");
            url.push('?');
            url.push_str(&query);
        }
        url
    }
}

impl fmt::Display for ApiPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.build())
    }
}

fn fill_placeholders(url: &str, values: &[String]) -> String {
    let Some(pattern) = placeholder_pattern() else {
        return url.to_string();
    };
    let mut result = String::with_capacity(url.len());
    let mut copied = 0;
    let mut values = values.iter();
    for placeholder in pattern.find_iter(url) {
        let Some(value) = values.next() else {
            // No further values. Cannot keep replacing.
            break;
        };
        result.push_str(&url[copied..placeholder.start()]);
        result.push_str(value);
        copied = placeholder.end();
    }
    result.push_str(&url[copied..]);
    result
}

/// Recover the value substituted for `parameter` by locating the literal text
/// surrounding its placeholder in `template` within the concrete `url`.
///
/// Returns an empty string instead of failing when the placeholder is missing
/// from the template, either bounding literal cannot be found in the URL, the
/// placeholder directly borders another placeholder (no literal to anchor on),
/// or `url`/`parameter` is blank.
pub fn parse_parameter(template: &str, url: &str, parameter: &str) -> String {
    if url.trim().is_empty() || parameter.trim().is_empty() {
        return String::new();
    }
    let braced;
    let needle = if parameter.starts_with('{') && parameter.ends_with('}') {
        parameter
    } else {
        braced = format!("{{{}}}", parameter);
        braced.as_str()
    };

    let Some(start) = template.find(needle) else {
        return String::new();
    };
    let end = start + needle.len();
    let raw_before = &template[..start];
    let raw_after = &template[end..];

    // A neighbouring placeholder leaves no literal text to anchor on.
    if raw_before.ends_with('}') || raw_after.starts_with('{') {
        return String::new();
    }

    // Trim the bounding literals at the nearest enclosing placeholders.
    let before = match raw_before.rfind('}') {
        Some(idx) => &raw_before[idx + 1..],
        None => raw_before,
    };
    let after = match raw_after.find('{') {
        Some(idx) => &raw_after[..idx],
        None => raw_after,
    };

    let Some(before_idx) = url.find(before) else {
        return String::new();
    };
    let value_start = before_idx + before.len();
    if after.is_empty() {
        // Placeholder at the end of the template, value runs to the end.
        return url[value_start..].to_string();
    }
    match url[value_start..].find(after) {
        Some(after_idx) => url[value_start..value_start + after_idx].to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls() -> ApiUrls {
        ApiUrls::new("https://api.example.org", "https://viewer.example.org/")
    }

    #[test]
    fn test_base_urls_stored_without_trailing_slash() {
        let urls = urls();
        assert_eq!(urls.api_url(), "https://api.example.org");
        assert_eq!(urls.application_url(), "https://viewer.example.org");
    }

    #[test]
    fn test_path_concatenates_fragments_in_order() {
        let url = urls().path(["/records", "/all"]).build();
        assert_eq!(url, "https://api.example.org/records/all");
    }

    #[test]
    fn test_params_fill_placeholders_left_to_right() {
        let url = urls()
            .path(["/records/{pi}/{action}/"])
            .params(["ABC123", "manifest"])
            .build();
        assert_eq!(url, "https://api.example.org/records/ABC123/manifest/");
    }

    #[test]
    fn test_surplus_placeholders_stay_literal() {
        let url = urls()
            .path(["/records/{pi}/{action}/"])
            .params(["ABC123"])
            .build();
        assert_eq!(url, "https://api.example.org/records/ABC123/{action}/");
    }

    #[test]
    fn test_surplus_values_are_ignored() {
        let url = urls()
            .path(["/records/{pi}/"])
            .params(["ABC123", "ignored"])
            .build();
        assert_eq!(url, "https://api.example.org/records/ABC123/");
    }

    #[test]
    fn test_repeated_placeholder_consumes_one_value_per_occurrence() {
        let url = urls()
            .path(["/compare/{pi}/with/{pi}/"])
            .params(["FIRST", "SECOND"])
            .build();
        assert_eq!(url, "https://api.example.org/compare/FIRST/with/SECOND/");
    }

    #[test]
    fn test_numeric_params_convert_to_string() {
        let url = urls().path([ACTIVITIES_PAGE]).params([3]).build();
        assert_eq!(url, "https://api.example.org/activities/3");
    }

    #[test]
    fn test_query_parameters_keep_insertion_order() {
        let url = urls()
            .path(["/records"])
            .query("start", "0")
            .query("rows", "10")
            .build();
        assert_eq!(url, "https://api.example.org/records?start=0&rows=10");
    }

    #[test]
    fn test_repeated_query_key_overwrites_in_place() {
        let url = urls()
            .path(["/records"])
            .query("start", "0")
            .query("rows", "10")
            .query("start", "20")
            .build();
        assert_eq!(url, "https://api.example.org/records?start=20&rows=10");
    }

    #[test]
    fn test_empty_query_set_adds_no_separator() {
        let url = urls().path(["/records"]).build();
        assert!(!url.contains('?'));
    }

    #[test]
    fn test_params_and_queries_combine() {
        let url = urls()
            .path(["/records/{pi}/pages"])
            .params(["ABC123"])
            .query("page", "2")
            .build();
        assert_eq!(url, "https://api.example.org/records/ABC123/pages?page=2");
    }

    #[test]
    fn test_display_matches_build() {
        let path = urls().path([ACTIVITIES_PAGE]).params([0]);
        assert_eq!(path.to_string(), path.build());
    }

    #[test]
    fn test_parse_parameter_recovers_value() {
        let value = parse_parameter("/records/{pi}/manifest/", "/records/ABC123/manifest/", "pi");
        assert_eq!(value, "ABC123");
    }

    #[test]
    fn test_parse_parameter_accepts_braced_name() {
        let value = parse_parameter("/records/{pi}/manifest/", "/records/ABC123/manifest/", "{pi}");
        assert_eq!(value, "ABC123");
    }

    #[test]
    fn test_parse_parameter_placeholder_at_template_end() {
        let value = parse_parameter("/activities/{pageNo}", "/activities/12", "pageNo");
        assert_eq!(value, "12");
    }

    #[test]
    fn test_parse_parameter_second_placeholder() {
        let value = parse_parameter(
            "/records/{pi}/sections/{div}/",
            "/records/ABC123/sections/LOG_0001/",
            "div",
        );
        assert_eq!(value, "LOG_0001");
    }

    #[test]
    fn test_parse_parameter_blank_inputs_yield_empty() {
        assert_eq!(parse_parameter("/records/{pi}/", "", "pi"), "");
        assert_eq!(parse_parameter("/records/{pi}/", "/records/A/", " "), "");
    }

    #[test]
    fn test_parse_parameter_missing_placeholder_yields_empty() {
        assert_eq!(
            parse_parameter("/records/{pi}/", "/records/ABC123/", "action"),
            ""
        );
    }

    #[test]
    fn test_parse_parameter_unmatched_bounds_yield_empty() {
        assert_eq!(
            parse_parameter("/records/{pi}/manifest/", "/collections/ABC123/", "pi"),
            ""
        );
    }

    #[test]
    fn test_parse_parameter_adjacent_placeholders_yield_empty() {
        assert_eq!(
            parse_parameter("/records/{pi}{action}/", "/records/ABCmanifest/", "pi"),
            ""
        );
        assert_eq!(
            parse_parameter("/records/{pi}{action}/", "/records/ABCmanifest/", "action"),
            ""
        );
    }

    #[test]
    fn test_parse_parameter_round_trip() {
        let template = "/records/{pi}/sections/{div}/";
        let built = urls().path([template]).params(["ABC123", "LOG_0001"]).build();
        assert_eq!(parse_parameter(template, &built, "pi"), "ABC123");
        assert_eq!(parse_parameter(template, &built, "div"), "LOG_0001");
    }
}
