use std::fs;
use std::path::PathBuf;

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Method;

use crate::error::{Error, Result};

/// Parsed request modifiers, populated once per invocation from the flag
/// tail and immutable thereafter.
#[derive(Debug, Clone, Default)]
pub struct Flags {
    pub body: Option<String>,
    pub body_file: Option<PathBuf>,
    pub json: bool,
    pub provider: Option<String>,
    pub method: Option<String>,
    pub count: bool,
    pub cdn: bool,
    pub total: bool,
    pub limit: bool,
    pub compare: Option<PathBuf>,
    pub reverse_compare: bool,
}

/// A fully built request: substituted URL, resolved method and body, and
/// whether the pagination loop applies.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: Method,
    pub url: String,
    pub body: String,
    pub paginate: bool,
}

static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{(arg|base)\}\}").expect("valid regex"));

/// Replace every `{{arg}}` with the trailing command token and every
/// `{{base}}` with the configured base URL.
pub fn substitute(template: &str, arg: &str, base_url: &str) -> String {
    PLACEHOLDER_RE
        .replace_all(template, |caps: &regex::Captures<'_>| match &caps[1] {
            "arg" => arg.to_string(),
            _ => base_url.to_string(),
        })
        .to_string()
}

/// Build the [`RequestSpec`] for a resolved template.
///
/// Substitution comes first, then the query-string separator (exactly one
/// `?`), then flag-derived parameters in fixed precedence: json, provider,
/// count, cdn, total.
///
/// # Errors
///
/// `Error::BodyFileUnreadable` when `--body-file` cannot be read (fatal, no
/// request is made); `Error::UnsupportedMethod` for a `--method` value
/// outside the five supported verbs.
pub fn build_request(
    template: &str,
    path: &[String],
    base_url: &str,
    flags: &Flags,
) -> Result<RequestSpec> {
    let arg = path.last().map(String::as_str).unwrap_or_default();
    let mut url = substitute(template, arg, base_url);

    if !url.contains('?') {
        url.push('?');
    }

    if flags.json {
        url.push_str("&json=true");
    }
    if let Some(provider) = flags.provider.as_deref() {
        if !provider.is_empty() {
            url.push_str(&format!("&provider={provider}"));
        }
    }
    if flags.count {
        url.push_str("&count=true");
    }
    if flags.cdn {
        url.push_str("&cdn=true");
    }
    if flags.total {
        url.push_str("&total=true");
    }

    let method = match flags.method.as_deref() {
        Some(m) => parse_method(m)?,
        None => infer_method(path),
    };

    let paginate = !flags.limit && pagination_eligible(path);

    let body = if let Some(text) = &flags.body {
        text.clone()
    } else if let Some(file) = &flags.body_file {
        fs::read_to_string(file).map_err(|source| Error::BodyFileUnreadable {
            path: file.clone(),
            source,
        })?
    } else {
        String::new()
    };

    Ok(RequestSpec {
        method,
        url,
        body,
        paginate,
    })
}

fn parse_method(method: &str) -> Result<Method> {
    let m = match method.to_uppercase().as_str() {
        "GET" => Method::GET,
        "POST" => Method::POST,
        "PUT" => Method::PUT,
        "PATCH" => Method::PATCH,
        "DELETE" => Method::DELETE,
        other => return Err(Error::UnsupportedMethod(other.to_string())),
    };
    Ok(m)
}

/// Default-method lookup used when no `--method` override is given.
fn infer_method(path: &[String]) -> Method {
    let head = path.first().map(String::as_str).unwrap_or_default();
    let second = path.get(1).map(String::as_str);
    match head {
        "regexp" => match second {
            Some("test") => Method::POST,
            Some("apply") => Method::PUT,
            _ => Method::GET,
        },
        "orch" | "put" => Method::PATCH,
        "delete" => Method::DELETE,
        _ => Method::GET,
    }
}

/// Commands that page through large result sets by default. `--limit`
/// overrides this and forces a single request.
fn pagination_eligible(path: &[String]) -> bool {
    path.first().map(String::as_str) == Some("get")
        && matches!(
            path.get(1).map(String::as_str),
            Some("lives" | "fresh" | "subdomains" | "latest")
        )
}
