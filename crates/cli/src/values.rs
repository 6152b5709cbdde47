//! `stockbook normalize` and `stockbook due-date`: single-value probes.

use serde::Serialize;
use stockbook_rollup::due_date::{earliest_due_date, DueDate};
use stockbook_rollup::numeric::{normalize, DecimalStyle, NumberLike};

use crate::exit_codes::EXIT_ROLLUP_RUNTIME;
use crate::CliError;

#[derive(Serialize)]
struct NormalizedValue<'a> {
    input: &'a str,
    value: f64,
}

#[derive(Serialize)]
struct ResolvedDueDate {
    should_pay_date: Option<DueDate>,
    candidates: usize,
    valid: usize,
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::new(EXIT_ROLLUP_RUNTIME, format!("JSON serialization error: {e}")))?;
    println!("{json}");
    Ok(())
}

pub fn cmd_normalize(values: Vec<String>, style: DecimalStyle, json: bool) -> Result<(), CliError> {
    let normalized: Vec<NormalizedValue> = values
        .iter()
        .map(|input| NormalizedValue {
            input,
            value: normalize(Some(&NumberLike::from(input.as_str())), style),
        })
        .collect();

    if json {
        return print_json(&normalized);
    }

    for n in &normalized {
        println!("{}\t{}", n.input, n.value);
    }
    Ok(())
}

pub fn cmd_due_date(dates: Vec<String>, json: bool) -> Result<(), CliError> {
    let resolved = ResolvedDueDate {
        should_pay_date: earliest_due_date(&dates),
        candidates: dates.len(),
        valid: dates.iter().filter_map(|d| DueDate::parse(d)).count(),
    };

    if json {
        return print_json(&resolved);
    }

    match resolved.should_pay_date {
        Some(date) => println!("{date}"),
        None => println!("none"),
    }
    if resolved.valid < resolved.candidates {
        eprintln!(
            "ignored {} unparseable date(s)",
            resolved.candidates - resolved.valid
        );
    }
    Ok(())
}
