use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use survey_common::format_numeric;
use survey_model::{FieldSpec, SurveySchema};
use survey_report::{CategoricalTally, NumericTally, RunSummary};
use survey_standards::Codebook;

pub fn print_summary(summary: &RunSummary) {
    match summary.year {
        Some(year) => println!("Survey: {} {year}", summary.survey),
        None => println!("Survey: {}", summary.survey),
    }
    println!("Source: {}", summary.source);
    println!(
        "Codebook: {} ({})",
        summary.codebook,
        short_fingerprint(&summary.codebook_fingerprint)
    );
    match &summary.output {
        Some(path) => println!("Output: {path}"),
        None => println!("Output: (dry run)"),
    }

    let mut table = Table::new();
    table.set_header(vec![header_cell("Stage"), header_cell("Records")]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    let extract = &summary.extract;
    table.add_row(vec![Cell::new("Read"), Cell::new(extract.records_read)]);
    table.add_row(vec![
        Cell::new("Matched population"),
        Cell::new(extract.records_matched),
    ]);
    table.add_row(vec![
        Cell::new("Complete interviews")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(summary.records_complete()).add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![dim_cell("Blank lines"), dim_cell(extract.blank_lines)]);
    table.add_row(vec![
        dim_cell("No readable key"),
        count_cell(extract.missing_key, Color::Yellow),
    ]);
    println!("{table}");

    for tally in &summary.frequencies.categorical {
        println!("{}", categorical_table(tally));
    }
    if !summary.frequencies.numeric.is_empty() {
        println!("{}", numeric_table(&summary.frequencies.numeric));
    }
}

fn categorical_table(tally: &CategoricalTally) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell(&tally.variable), header_cell("Count")]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for entry in &tally.labels {
        table.add_row(vec![Cell::new(&entry.label), Cell::new(entry.count)]);
    }
    table.add_row(vec![dim_cell("Missing"), dim_cell(tally.missing)]);
    table.add_row(vec![
        dim_cell("Unmapped code"),
        count_cell(tally.unmapped, Color::Yellow),
    ]);
    table
}

fn numeric_table(tallies: &[NumericTally]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Variable"),
        header_cell("Count"),
        header_cell("Missing"),
        header_cell("Min"),
        header_cell("Max"),
        header_cell("Mean"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 1..6 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for tally in tallies {
        table.add_row(vec![
            Cell::new(&tally.variable),
            Cell::new(tally.count),
            dim_cell(tally.missing),
            number_cell(tally.min),
            number_cell(tally.max),
            number_cell(tally.mean.map(|mean| (mean * 100.0).round() / 100.0)),
        ]);
    }
    table
}

pub fn print_layout(codebook: &Codebook) {
    let schema = &codebook.schema;
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Field"),
        header_cell("Start"),
        header_cell("End"),
        header_cell("Width"),
        header_cell("Kind"),
        header_cell("Alias of"),
    ]);
    apply_table_style(&mut table);
    for index in 1..4 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for field in schema.layout.fields() {
        table.add_row(vec![
            Cell::new(&field.name),
            Cell::new(field.start),
            Cell::new(field.end),
            Cell::new(field.width()),
            Cell::new(field_kind(schema, field)),
            field
                .alias_of
                .as_deref()
                .map_or_else(|| dim_cell("-"), Cell::new),
        ]);
    }
    println!("{table}");
    println!("Record width: {}", schema.layout.record_width());
}

pub fn print_check(codebook: &Codebook) {
    let schema = &codebook.schema;
    let mut table = Table::new();
    table.set_header(vec![header_cell("Codebook"), header_cell("Value")]);
    apply_table_style(&mut table);
    let rows = [
        ("Source", codebook.source.describe()),
        ("Fingerprint", codebook.fingerprint.clone()),
        ("Survey", schema.name.clone()),
        (
            "Year",
            schema.year.map_or_else(|| "-".to_string(), |year| year.to_string()),
        ),
        (
            "Population",
            format!("{} = {:?}", schema.population.field, schema.population.target),
        ),
        (
            "Completion",
            format!("{} = {:?}", schema.completion.field, schema.completion.complete),
        ),
        ("Fields", schema.layout.len().to_string()),
        ("Numeric variables", schema.numeric.len().to_string()),
        ("Categorical variables", schema.categorical.len().to_string()),
        ("Unmapped codes", format!("{:?}", schema.unmapped).to_lowercase()),
    ];
    for (name, value) in rows {
        table.add_row(vec![Cell::new(name), Cell::new(value)]);
    }
    println!("{table}");
    println!("Codebook is valid.");
}

fn field_kind(schema: &SurveySchema, field: &FieldSpec) -> &'static str {
    if field.name == schema.population.field {
        "population key"
    } else if field.name == schema.completion.field {
        "disposition"
    } else if schema.numeric_variable(&field.name).is_some() {
        "numeric"
    } else if schema.categorical_variable(&field.name).is_some() {
        "categorical"
    } else {
        "raw"
    }
}

fn short_fingerprint(fingerprint: &str) -> &str {
    fingerprint.get(..12).unwrap_or(fingerprint)
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn count_cell<T: ToString + PartialEq + Default>(count: T, color: Color) -> Cell {
    if count == T::default() {
        dim_cell(count)
    } else {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    }
}

fn number_cell(value: Option<f64>) -> Cell {
    match value {
        Some(value) => Cell::new(format_numeric(value)),
        None => dim_cell("-"),
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
