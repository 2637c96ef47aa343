use indexmap::IndexMap;

use super::resource::Resource;
use crate::error::PatternError;

/// Strip the braces from a `{placeholder}` token.
pub fn placeholder_name(elem: &str) -> &str {
    elem.strip_prefix('{')
        .and_then(|e| e.strip_suffix('}'))
        .unwrap_or(elem)
}

/// Build the URL of a resource's parent collection, used by create and list.
///
/// Literal segments are copied verbatim; placeholders are replaced by their
/// value in `parameters`. A value that is itself a path (`publishers/p1`)
/// contributes only its last segment. The trailing self placeholder is
/// skipped. `suffix` is appended as is.
pub fn collection_url(
    resource: &Resource,
    server_url: &str,
    parameters: &IndexMap<String, String>,
    suffix: &str,
) -> Result<String, PatternError> {
    let mut url_elems = vec![server_url.trim_end_matches('/')];
    let parent_elems = resource
        .pattern_elems
        .split_last()
        .map(|(_, rest)| rest)
        .unwrap_or_default();

    for (i, elem) in parent_elems.iter().enumerate() {
        if i % 2 == 0 {
            url_elems.push(elem.as_str());
            continue;
        }
        let name = placeholder_name(elem);
        let value = parameters
            .get(name)
            .ok_or_else(|| PatternError::MissingParameter {
                name: name.to_string(),
            })?;
        url_elems.push(value.rsplit('/').next().unwrap_or(value.as_str()));
    }

    let mut url = url_elems.join("/");
    url.push_str(suffix);
    Ok(url)
}

/// Join a base address and a fully qualified resource path with exactly one `/`.
pub fn resource_url(server_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        server_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
