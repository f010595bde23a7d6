//! Terminal rendering of cutting stock results.

use colored::*;
use cutstock_core::{
    CuttingStockResult, ItemType, ModelText, PatternRow, Phase, PhaseKind, PlanRow, PlanSummary,
};
use std::fmt::Write;

/// Draws a grid table: `+---+` rules, `|` cell walls and `+===+` under the header.
pub fn render_grid(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let rule = |fill: char| {
        let mut line = String::from("+");
        for width in &widths {
            line.extend(std::iter::repeat(fill).take(width + 2));
            line.push('+');
        }
        line
    };
    let line = |cells: &[String]| {
        let mut line = String::from("|");
        for (index, &width) in widths.iter().enumerate() {
            let cell = cells.get(index).map(String::as_str).unwrap_or("");
            let _ = write!(line, " {cell:<width$} |");
        }
        line
    };

    let mut out = String::new();
    let _ = writeln!(out, "{}", rule('-'));
    let _ = writeln!(out, "{}", line(headers));
    let _ = writeln!(out, "{}", rule('='));
    for row in rows {
        let _ = writeln!(out, "{}", line(row.as_slice()));
        let _ = writeln!(out, "{}", rule('-'));
    }
    if rows.is_empty() {
        let _ = writeln!(out, "{}", rule('-'));
    }
    out
}

/// Integers print bare, fractions with four decimals.
pub fn format_quantity(value: f64) -> String {
    if (value - value.round()).abs() < 1e-9 {
        format!("{}", value.round() as i64)
    } else {
        format!("{value:.4}")
    }
}

fn format_counts(counts: &[u32]) -> String {
    let parts: Vec<String> = counts.iter().map(u32::to_string).collect();
    format!("({})", parts.join(", "))
}

pub fn pattern_table(rows: &[PatternRow]) -> String {
    let headers = vec!["Pattern".to_string(), "Waste".to_string()];
    let body: Vec<Vec<String>> = rows
        .iter()
        .map(|row| vec![format_counts(&row.counts), row.waste.to_string()])
        .collect();
    render_grid(&headers, &body)
}

pub fn solution_table(rows: &[PlanRow], items: &[ItemType]) -> String {
    let mut headers = vec!["Quantity".to_string()];
    headers.extend(items.iter().enumerate().map(|(i, item)| item.label(i)));
    headers.push("Waste".to_string());

    let body: Vec<Vec<String>> = rows
        .iter()
        .filter(|row| row.quantity > 0.0)
        .map(|row| {
            let mut cells = vec![format_quantity(row.quantity)];
            cells.extend(row.counts.iter().map(u32::to_string));
            cells.push(row.waste.to_string());
            cells
        })
        .collect();
    render_grid(&headers, &body)
}

pub fn summary_lines(summary: &PlanSummary) -> Vec<String> {
    vec![
        format!("Total quantity: {}", format_quantity(summary.total_quantity)),
        format!("Total waste: {}", format_quantity(summary.total_waste)),
        format!("Bars used: {}", summary.bars_used),
    ]
}

fn print_model(model: &ModelText) {
    println!("{}", "Objective function:".bright_yellow().bold());
    println!("  {}", model.objective);
    println!("{}", "Constraints:".bright_yellow().bold());
    for constraint in &model.constraints {
        println!("  {constraint}");
    }
    println!();
}

fn print_table(title: &str, rows: &[PlanRow], summary: &PlanSummary, items: &[ItemType]) {
    println!("{}", title.bright_yellow().bold());
    print!("{}", solution_table(rows, items));
    for line in summary_lines(summary) {
        println!("  {}", line.bright_white());
    }
    println!();
}

fn print_phase(phase: &Phase, items: &[ItemType]) {
    println!(
        "{}",
        format!("Phase {}", phase.number).bright_blue().bold()
    );
    println!("  Demand: {}", format_counts(&phase.demand));

    if let Some(relaxation) = &phase.relaxation {
        println!(
            "  Column generation converged after {} iterations (LP objective {})",
            relaxation.pricing_iterations,
            format_quantity(relaxation.objective)
        );
        print_table(
            "Optimal LP solution:",
            &relaxation.rows,
            &relaxation.summary,
            items,
        );
    }

    let title = match phase.kind {
        PhaseKind::Truncation => "Truncated integer solution:",
        PhaseKind::FirstFitDecreasing => "Integer solution from first-fit-decreasing:",
    };
    print_table(title, &phase.rows, &phase.summary, items);

    if phase.residual_demand.iter().any(|&d| d > 0) {
        println!(
            "  Residual demand: {}",
            format_counts(&phase.residual_demand)
        );
        println!();
    }
}

/// The enumerated patterns, or the final pool when enumeration was skipped.
fn pattern_section(result: &CuttingStockResult) -> (&'static str, &[PatternRow]) {
    if result.enumerated_patterns.is_empty() {
        ("Patterns generated by column generation:", result.patterns.as_slice())
    } else {
        ("Cutting patterns and waste:", result.enumerated_patterns.as_slice())
    }
}

/// Prints every section of a result to stdout.
pub fn print_result(result: &CuttingStockResult) {
    let (title, patterns) = pattern_section(result);
    if !patterns.is_empty() {
        println!("{}", title.bright_yellow().bold());
        print!("{}", pattern_table(patterns));
        println!();
    }

    if let Some(model) = &result.enumerated_model {
        print_model(model);
    }

    for phase in &result.phases {
        print_phase(phase, &result.items);
    }

    print_table(
        "Final cutting plan:",
        &result.plan,
        &result.summary,
        &result.items,
    );
}
