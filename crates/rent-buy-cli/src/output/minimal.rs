use serde_json::Value;

use super::format_cell;

/// Print just the key answer value from the output.
///
/// Looks for well-known fields in the result (then in its `summary`), and
/// falls back to the first field.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result").or_else(|| m.get("results")))
        .unwrap_or(value);

    let priority_keys = [
        "payment",
        "final_net_worth_buy",
        "median",
        "net_worth_after_sale",
        "balance",
    ];

    // Per-loan summaries print one line each.
    if let Value::Array(items) = result_obj {
        for item in items {
            let label = item.get("label").map(format_cell);
            if let Some(val) = find_priority(item, &priority_keys) {
                match label {
                    Some(l) => println!("{}: {}", l, format_cell(val)),
                    None => println!("{}", format_cell(val)),
                }
            }
        }
        return;
    }

    if let Some(val) = find_priority(result_obj, &priority_keys) {
        println!("{}", format_cell(val));
        return;
    }

    if let Value::Object(map) = result_obj {
        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_cell(val));
            return;
        }
    }

    println!("{}", format_cell(result_obj));
}

fn find_priority<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    let map = value.as_object()?;
    let nested = map.get("summary").and_then(Value::as_object);
    keys.iter().find_map(|key| {
        map.get(*key)
            .or_else(|| nested.and_then(|n| n.get(*key)))
            .filter(|v| !v.is_null())
    })
}
