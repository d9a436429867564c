//! Terminal form that collects one customer record per interaction.

use crate::schema::{RawRecord, RawValue};
use std::io::{self, BufRead, Write};

/// An input control. Each control enforces its own range or enumeration.
#[derive(Debug, Clone, PartialEq)]
pub enum Control {
    Slider { min: i64, max: i64, default: i64 },
    Select { options: &'static [&'static str] },
    Number { min: f64, default: f64, step: f64 },
}

impl Control {
    fn default_value(&self) -> RawValue {
        match self {
            Control::Slider { default, .. } => RawValue::Numeric(*default as f64),
            Control::Select { options } => {
                RawValue::Categorical(options.first().copied().unwrap_or_default().to_string())
            }
            Control::Number { default, .. } => RawValue::Numeric(*default),
        }
    }

    fn hint(&self) -> String {
        match self {
            Control::Slider { min, max, default } => format!("{min}-{max}, default {default}"),
            Control::Select { options } => options
                .iter()
                .enumerate()
                .map(|(i, o)| format!("{}={o}", i + 1))
                .collect::<Vec<_>>()
                .join(", "),
            Control::Number { min, default, step } => {
                format!(">= {min:.2}, step {step:.2}, default {default:.2}")
            }
        }
    }

    /// Parses one line of user input. An empty line selects the default.
    pub fn parse(&self, input: &str) -> Result<RawValue, String> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(self.default_value());
        }
        match self {
            Control::Slider { min, max, .. } => match input.parse::<i64>() {
                Ok(v) if (*min..=*max).contains(&v) => Ok(RawValue::Numeric(v as f64)),
                Ok(v) => Err(format!("{v} is outside {min}-{max}")),
                Err(_) => Err(format!("expected a whole number between {min} and {max}")),
            },
            Control::Select { options } => {
                if let Ok(i) = input.parse::<usize>() {
                    return match i.checked_sub(1).and_then(|i| options.get(i)) {
                        Some(o) => Ok(RawValue::Categorical(o.to_string())),
                        None => Err(format!("choose 1-{}", options.len())),
                    };
                }
                options
                    .iter()
                    .find(|o| o.eq_ignore_ascii_case(input))
                    .map(|o| RawValue::Categorical(o.to_string()))
                    .ok_or_else(|| format!("{input:?} is not one of {}", options.join(", ")))
            }
            Control::Number { min, .. } => match input.parse::<f64>() {
                Ok(v) if v.is_finite() && v >= *min => {
                    Ok(RawValue::Numeric((v * 100.0).round() / 100.0))
                }
                Ok(_) => Err(format!("must be a number >= {min:.2}")),
                Err(_) => Err("expected a number".to_string()),
            },
        }
    }
}

/// A labelled control bound to a raw record column.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub label: &'static str,
    pub column: &'static str,
    pub control: Control,
}

fn slider(label: &'static str, column: &'static str, min: i64, max: i64, default: i64) -> Field {
    Field {
        label,
        column,
        control: Control::Slider { min, max, default },
    }
}

fn select(label: &'static str, options: &'static [&'static str]) -> Field {
    Field {
        label,
        column: label,
        control: Control::Select { options },
    }
}

/// The customer attributes the model was trained on.
pub fn customer_form() -> Vec<Field> {
    vec![
        slider("Age", "Age", 16, 90, 30),
        select("Gender", &["Male", "Female", "Other"]),
        slider("Tenure (months)", "Tenure", 0, 120, 12),
        slider("Usage Frequency (per month)", "Usage Frequency", 0, 500, 20),
        slider("Support Calls (last 3 months)", "Support Calls", 0, 50, 2),
        slider("Payment Delay (days)", "Payment Delay", 0, 365, 0),
        select("Subscription Type", &["Basic", "Standard", "Premium"]),
        select("Contract Length", &["Monthly", "Quarterly", "Yearly"]),
        Field {
            label: "Total Spend (lifetime)",
            column: "Total Spend",
            control: Control::Number {
                min: 0.0,
                default: 500.0,
                step: 1.0,
            },
        },
        slider("Last Interaction (days ago)", "Last Interaction", 0, 365, 10),
    ]
}

fn read_line(input: &mut impl BufRead) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Prompts for every field in turn. Returns `None` when input ends.
pub fn collect(
    fields: &[Field],
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> io::Result<Option<RawRecord>> {
    writeln!(out, "Customer details")?;
    let mut record = RawRecord::new();
    for field in fields {
        loop {
            write!(out, "{} [{}]: ", field.label, field.control.hint())?;
            out.flush()?;
            let Some(line) = read_line(input)? else {
                return Ok(None);
            };
            match field.control.parse(&line) {
                Ok(value) => {
                    record.set(field.column, value);
                    break;
                }
                Err(hint) => writeln!(out, "  ↳ {hint}")?,
            }
        }
    }
    Ok(Some(record))
}

/// Prints the record one attribute per line.
pub fn render_preview(out: &mut impl Write, record: &RawRecord) -> io::Result<()> {
    writeln!(out, "Preview of input data")?;
    let width = record.iter().map(|(n, _)| n.chars().count()).max().unwrap_or(0);
    for (name, value) in record.iter() {
        writeln!(out, "{name:>width$} | {value}")?;
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Predict,
    Exit,
}

/// Waits for the single action control.
pub fn await_action(input: &mut impl BufRead, out: &mut impl Write) -> io::Result<Action> {
    write!(out, "Press Enter to predict (or 'exit'): ")?;
    out.flush()?;
    match read_line(input)? {
        None => Ok(Action::Exit),
        Some(l) if l.eq_ignore_ascii_case("exit") || l.eq_ignore_ascii_case("quit") => {
            Ok(Action::Exit)
        }
        Some(_) => Ok(Action::Predict),
    }
}
