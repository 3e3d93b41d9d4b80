//! Base Path Resolution
//!
//! Works out where the site's data files live relative to the page that
//! shows them. The page may be served from a local root
//! (`http://localhost:8000/index.html`) or from a repository sub-path on
//! static hosting (`https://user.github.io/trend-archive/`); both resolve
//! to the directory that contains the page.

use reqwest::Url;
use thiserror::Error;

/// Errors raised while interpreting a page location
#[derive(Error, Debug)]
pub enum LocationError {
    #[error("Invalid page location {location:?}: {error}")]
    Invalid { location: String, error: String },

    #[error("Page location {0:?} cannot serve as a base URL")]
    CannotBeBase(String),

    #[error("Failed to join {path:?} onto base {base}: {error}")]
    Join {
        base: String,
        path: String,
        error: String,
    },
}

/// Parse a page location string into a URL
pub fn parse_location(location: &str) -> Result<Url, LocationError> {
    let url = Url::parse(location).map_err(|e| LocationError::Invalid {
        location: location.to_string(),
        error: e.to_string(),
    })?;

    if url.cannot_be_a_base() {
        return Err(LocationError::CannotBeBase(location.to_string()));
    }

    Ok(url)
}

/// Resolve the base URL for a page location.
///
/// The base is the directory component of the page path: the last
/// non-slash segment is stripped and the result always ends with `/`.
/// Query string and fragment are dropped. A path without a sub-path
/// segment resolves to the origin root.
///
/// ```
/// use trendview::location::{parse_location, resolve_base};
///
/// let page = parse_location("https://user.github.io/trend-archive/index.html").unwrap();
/// assert_eq!(resolve_base(&page).as_str(), "https://user.github.io/trend-archive/");
/// ```
pub fn resolve_base(location: &Url) -> Url {
    let mut base = location.clone();
    base.set_query(None);
    base.set_fragment(None);
    base.set_path(&directory_of(location.path()));
    base
}

/// Directory component of a URL path, always with a trailing slash
fn directory_of(path: &str) -> String {
    match path.rfind('/') {
        Some(idx) => path[..=idx].to_string(),
        None => "/".to_string(),
    }
}

/// URL of the index document under `base`
pub fn index_url(base: &Url, data_dir: &str, index_file: &str) -> Result<Url, LocationError> {
    join(base, &format!("{}/{}", data_path(data_dir), urlencoding::encode(index_file)))
}

/// URL of a snapshot file under `base`.
///
/// The file name is escaped as a single path component, so a `/` or `?`
/// inside it cannot escape the data directory.
pub fn file_url(base: &Url, data_dir: &str, file: &str) -> Result<Url, LocationError> {
    join(base, &format!("{}/{}", data_path(data_dir), urlencoding::encode(file)))
}

fn data_path(data_dir: &str) -> String {
    data_dir
        .trim_matches('/')
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn join(base: &Url, path: &str) -> Result<Url, LocationError> {
    base.join(path).map_err(|e| LocationError::Join {
        base: base.to_string(),
        path: path.to_string(),
        error: e.to_string(),
    })
}
