//! Request URI assembly.

use crate::errors::{XMattersError, XMattersResult};
use serde::Serialize;

/// Query parameter the server expects unescaped and last.
const GROUPS_PARAM: &str = "groups";

/// Builds `path?query` from a serializable parameter struct.
///
/// Parameters keep their declared order. A `groups` parameter is pulled out
/// of the encoded set and appended raw at the end; the server splits its
/// comma-separated value itself.
pub fn build_uri<P: Serialize + ?Sized>(path: &str, params: &P) -> XMattersResult<String> {
    let encoded = serde_urlencoded::to_string(params)
        .map_err(|e| XMattersError::request(format!("failed to encode query: {}", e)))?;
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(&encoded)
        .map_err(|e| XMattersError::request(format!("failed to encode query: {}", e)))?;

    let mut groups = None;
    let mut rest = Vec::with_capacity(pairs.len());
    for (key, value) in pairs {
        if key == GROUPS_PARAM {
            groups = Some(value);
        } else {
            rest.push((key, value));
        }
    }

    let mut query = serde_urlencoded::to_string(&rest)
        .map_err(|e| XMattersError::request(format!("failed to encode query: {}", e)))?;
    if let Some(groups) = groups.filter(|g| !g.is_empty()) {
        if !query.is_empty() {
            query.push('&');
        }
        query.push_str(GROUPS_PARAM);
        query.push('=');
        query.push_str(&groups);
    }

    if query.is_empty() {
        Ok(path.to_string())
    } else {
        Ok(format!("{}?{}", path, query))
    }
}

/// `embed` selector used by single-resource getters.
#[derive(Debug, Serialize)]
pub(crate) struct Embed<'a> {
    pub(crate) embed: &'a str,
}
