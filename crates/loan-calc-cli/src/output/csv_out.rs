use serde_json::Value;
use std::io::{self, Write};

use super::format_value;

/// Write output as CSV to stdout.
///
/// Listings and balance schedules become one row per item; anything else is
/// written as two-column `field,value` pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());
    write_csv(&mut wtr, value);
    let _ = wtr.flush();
}

fn write_csv<W: Write>(wtr: &mut csv::Writer<W>, value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(Value::Array(rows)) = map.get("results") {
                write_rows(wtr, rows);
            } else if let Some(Value::Object(result)) = map.get("result") {
                if let Some(Value::Array(schedule)) = result.get("balance_series") {
                    write_rows(wtr, schedule);
                } else {
                    write_pairs(wtr, result.iter());
                }
            } else {
                write_pairs(wtr, map.iter());
            }
        }
        Value::Array(arr) => write_rows(wtr, arr),
        _ => {
            let _ = wtr.write_record([&format_value(value)]);
        }
    }
}

fn write_pairs<'a, W: Write>(
    wtr: &mut csv::Writer<W>,
    fields: impl Iterator<Item = (&'a String, &'a Value)>,
) {
    let _ = wtr.write_record(["field", "value"]);
    for (key, val) in fields {
        let _ = wtr.write_record([key.as_str(), &format_value(val)]);
    }
}

fn write_rows<W: Write>(wtr: &mut csv::Writer<W>, arr: &[Value]) {
    let Some(Value::Object(first)) = arr.first() else {
        for item in arr {
            let _ = wtr.write_record([&format_value(item)]);
        }
        return;
    };

    let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
    let _ = wtr.write_record(&headers);
    for item in arr {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(format_value).unwrap_or_default())
                .collect();
            let _ = wtr.write_record(&row);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(value: &Value) -> String {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        write_csv(&mut wtr, value);
        String::from_utf8(wtr.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_listing_rows() {
        let value = json!({"results": [
            {"position": 1, "loanAmount": "1000"},
            {"position": 2, "loanAmount": "2000"}
        ], "total": 2});
        assert_eq!(render(&value), "loanAmount,position\n1000,1\n2000,2\n");
    }

    #[test]
    fn test_result_pairs() {
        let value = json!({"result": {"reset": true}});
        assert_eq!(render(&value), "field,value\nreset,true\n");
    }

    #[test]
    fn test_schedule_rows() {
        let value = json!({"result": {"monthly_payment": "10", "balance_series": [
            {"month": 1, "remaining_balance": "5"}
        ]}});
        assert_eq!(render(&value), "month,remaining_balance\n1,5\n");
    }
}
