use clap::Args;
use serde_json::{json, Value};

use loan_calc_core::calculator::Calculator;
use loan_calc_core::history::KeyValueStore;

/// Arguments for listing past calculations
#[derive(Args)]
pub struct HistoryArgs {
    /// Number of pages to reveal (three loans per page)
    #[arg(long, default_value_t = 1)]
    pub pages: usize,
}

pub fn run_history<S: KeyValueStore>(
    args: HistoryArgs,
    calc: &mut Calculator<S>,
) -> Result<Value, Box<dyn std::error::Error>> {
    if args.pages == 0 {
        return Err("--pages must be at least 1".into());
    }
    for _ in 1..args.pages {
        calc.view_more();
    }

    let entries = calc.visible_history();
    let lines: Vec<String> = entries.iter().map(|e| e.to_string()).collect();

    Ok(json!({
        "results": entries,
        "summary": lines,
        "total": calc.history().len(),
        "visible_count": calc.window().visible_count(),
        "has_more": calc.has_more(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use loan_calc_core::history::MemoryStore;
    use loan_calc_core::seed::parse_seed;

    fn seeded(count: usize) -> Calculator<MemoryStore> {
        let loans: Vec<String> = (1..=count)
            .map(|i| format!(r#"{{"loanAmount": {}, "interestRate": 5, "loanTerm": 1}}"#, i * 1000))
            .collect();
        let doc = format!(r#"{{"loans": [{}]}}"#, loans.join(","));
        let mut calc = Calculator::new(MemoryStore::new());
        let ticket = calc.begin_seed();
        calc.apply_seed(ticket, parse_seed(&doc));
        calc
    }

    #[test]
    fn test_first_page() {
        let mut calc = seeded(7);
        let value = run_history(HistoryArgs { pages: 1 }, &mut calc).unwrap();
        assert_eq!(value["results"].as_array().map(Vec::len), Some(3));
        assert_eq!(value["total"], 7);
        assert_eq!(value["has_more"], true);
        assert_eq!(value["summary"][0], "Loan 1: 1000 USD, Rate: 5%, Term: 1 years");
    }

    #[test]
    fn test_pages_reveal_everything() {
        let mut calc = seeded(7);
        let value = run_history(HistoryArgs { pages: 3 }, &mut calc).unwrap();
        assert_eq!(value["results"].as_array().map(Vec::len), Some(7));
        assert_eq!(value["visible_count"], 9);
        assert_eq!(value["has_more"], false);
    }

    #[test]
    fn test_zero_pages_rejected() {
        let mut calc = seeded(1);
        assert!(run_history(HistoryArgs { pages: 0 }, &mut calc).is_err());
    }
}
