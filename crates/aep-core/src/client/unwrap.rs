use serde_json::{Map, Value};

use crate::cases::{kebab_to_pascal_case, lower_first};
use crate::constants::FIELD_RESULTS_NAME;
use crate::error::ClientError;

/// Keys a list response may carry its items under, in priority order:
/// `results`, the plural as given, its PascalCase form, and that form with
/// a lower-case first letter.
pub fn candidate_keys(plural: &str) -> Vec<String> {
    let pascal = kebab_to_pascal_case(plural);
    let lower = if pascal.chars().count() > 1 {
        lower_first(&pascal)
    } else {
        String::new()
    };

    [FIELD_RESULTS_NAME.to_string(), plural.to_string(), pascal, lower]
        .into_iter()
        .filter(|k| !k.is_empty())
        .collect()
}

/// Extract the item objects from a decoded list response.
///
/// The first candidate key holding an array wins, even if a later key also
/// holds one. Array elements that are not objects are dropped.
pub fn list_items(
    mut data: Map<String, Value>,
    plural: &str,
) -> Result<Vec<Map<String, Value>>, ClientError> {
    for key in candidate_keys(plural) {
        if !matches!(data.get(&key), Some(Value::Array(_))) {
            continue;
        }
        if let Some(Value::Array(items)) = data.remove(&key) {
            return Ok(items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Object(obj) => Some(obj),
                    _ => None,
                })
                .collect());
        }
    }

    Err(ClientError::NoListKeyFound {
        plural: plural.to_string(),
    })
}
