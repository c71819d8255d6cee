//! Upgrades for state files written by older versions.
//!
//! Rounds saved before hand modes existed have no `handMode`; those hands
//! were all scored as MINUS, so that is what they get.

use serde_json::Value;

use crate::model::HandMode;

/// Upgrade a raw state blob in place. Returns the number of rounds changed.
pub fn upgrade(state: &mut Value) -> usize {
    let Some(matches) = state.get_mut("matches").and_then(Value::as_array_mut) else {
        return 0;
    };

    let mut upgraded = 0;
    for m in matches {
        let Some(rounds) = m.get_mut("rounds").and_then(Value::as_array_mut) else {
            continue;
        };
        for round in rounds {
            if let Some(obj) = round.as_object_mut() {
                let missing = obj.get("handMode").map_or(true, Value::is_null);
                if missing {
                    obj.insert(
                        "handMode".to_string(),
                        Value::String(HandMode::Minus.as_str().to_string()),
                    );
                    upgraded += 1;
                }
            }
        }
    }
    upgraded
}
