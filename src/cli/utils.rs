use serde::Serialize;
use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::pagination::{PageItem, PageView};
use crate::validation::ValidationError;

/// Output a success message in the appropriate format
pub fn output_success(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(target), Some(Value::Object(extra))) = (response.as_object_mut(), data) {
                target.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(output_format: &OutputFormat, message: &str, details: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": false,
                "message": message
            });

            if let Some(details) = details {
                response["details"] = details;
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
    }
    Ok(())
}

/// Print per-field messages and turn the failure into a command error
pub fn report_validation(output_format: &OutputFormat, err: ValidationError) -> anyhow::Error {
    let printed = match output_format {
        OutputFormat::Json => output_error(output_format, &err.message, Some(json!({ "fields": err.fields }))),
        OutputFormat::Text => {
            for (field, message) in &err.fields {
                eprintln!("  {}: {}", field, message);
            }
            Ok(())
        }
    };
    if let Err(e) = printed {
        return e;
    }
    anyhow::anyhow!(err.message)
}

/// Output a single entity
pub fn output_item<T: Serialize>(output_format: &OutputFormat, item: &T, lines: &[(&str, String)]) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(item)?),
        OutputFormat::Text => {
            let width = lines.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
            for (label, value) in lines {
                println!("{:<width$}  {}", label, value, width = width);
            }
        }
    }
    Ok(())
}

/// Output one page of a list: rows, totals and the page-number control
pub fn output_page<T: Serialize>(
    output_format: &OutputFormat,
    view: &PageView<T>,
    headers: &[&str],
    row: impl Fn(&T) -> Vec<String>,
    empty_message: &str,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(view)?),
        OutputFormat::Text => {
            if view.items.is_empty() {
                println!("{}", empty_message);
            } else {
                let rows: Vec<Vec<String>> = view.items.iter().map(row).collect();
                print_table(headers, &rows);
            }
            println!();
            println!(
                "Page {} of {} ({} total)   {}",
                view.meta.page,
                view.meta.total_pages.max(1),
                view.meta.total,
                page_control(&view.pages, view.meta.page)
            );
            match (view.meta.has_prev(), view.meta.has_next()) {
                (true, true) => println!("Use --page {} or --page {} to move", view.meta.page - 1, view.meta.page + 1),
                (false, true) => println!("Use --page {} for more", view.meta.page + 1),
                (true, false) => println!("Use --page {} to go back", view.meta.page - 1),
                (false, false) => {}
            }
        }
    }
    Ok(())
}

/// `1 … 4 [5] 6 … 20`
pub fn page_control(pages: &[PageItem], current: u32) -> String {
    pages
        .iter()
        .map(|item| match item {
            PageItem::Page(n) if *n == current => format!("[{}]", n),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let line = |cells: Vec<String>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    println!("{}", line(headers.iter().map(|h| h.to_string()).collect()));
    println!("{}", line(widths.iter().map(|w| "-".repeat(*w)).collect()));
    for row in rows {
        println!("{}", line(row.clone()));
    }
}
