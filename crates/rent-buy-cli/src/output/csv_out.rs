use serde_json::Value;
use std::io;

use super::{format_cell, rows_of};

/// Write output as CSV to stdout.
///
/// Row lists (schedules, per-month scenario rows, summaries) become one
/// record per row; a single result object becomes `field,value` pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match value {
        Value::Object(map) => {
            if let Some(rows) = rows_of(map) {
                write_array_csv(&mut wtr, rows);
            } else if let Some(Value::Object(result)) = map.get("result") {
                if let Some(rows) = scenario_rows(result) {
                    write_array_csv(&mut wtr, &rows);
                } else {
                    write_pairs(&mut wtr, result);
                }
            } else {
                write_pairs(&mut wtr, map);
            }
        }
        Value::Array(arr) => write_array_csv(&mut wtr, arr),
        _ => {
            let _ = wtr.write_record([&format_cell(value)]);
        }
    }

    let _ = wtr.flush();
}

/// Flatten `scenarios[].rows[]` into one table, tagging each row with its loan.
fn scenario_rows(result: &serde_json::Map<String, Value>) -> Option<Vec<Value>> {
    let scenarios = result.get("scenarios")?.as_array()?;
    let mut rows = Vec::new();
    for scenario in scenarios {
        let label = scenario.get("label").cloned().unwrap_or(Value::Null);
        for row in scenario.get("rows")?.as_array()? {
            let mut tagged = serde_json::Map::new();
            tagged.insert("loan".into(), label.clone());
            if let Value::Object(fields) = row {
                tagged.extend(fields.clone());
            }
            rows.push(Value::Object(tagged));
        }
    }
    Some(rows)
}

fn write_pairs(wtr: &mut csv::Writer<io::StdoutLock<'_>>, map: &serde_json::Map<String, Value>) {
    let _ = wtr.write_record(["field", "value"]);
    for (key, val) in map {
        let _ = wtr.write_record([key.as_str(), &format_cell(val)]);
    }
}

fn write_array_csv(wtr: &mut csv::Writer<io::StdoutLock<'_>>, arr: &[Value]) {
    if arr.is_empty() {
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
        let _ = wtr.write_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(*h).map(format_cell).unwrap_or_default())
                    .collect();
                let _ = wtr.write_record(&row);
            }
        }
    } else {
        for item in arr {
            let _ = wtr.write_record([&format_cell(item)]);
        }
    }
}
