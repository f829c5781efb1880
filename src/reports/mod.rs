use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use greywolf::optimizer::{convergence_coefficient, OptimizationResult, RunParameters};
use greywolf::playback::{Frame, Role};
use greywolf::GwoResult;
use serde::Serialize;
use std::io::Write;

fn role_color(role: Role) -> Color {
    match role {
        Role::Alpha => Color::Red,
        Role::Beta => Color::Yellow,
        Role::Delta => Color::Cyan,
        Role::Follower => Color::Grey,
    }
}

pub fn print_run_header(params: &RunParameters) {
    let mut table = Table::new();
    table.load_preset(ASCII_FULL);
    table.add_row(vec![
        Cell::new("Wolves").add_attribute(Attribute::Bold),
        Cell::new(params.num_wolves),
        Cell::new("Iterations").add_attribute(Attribute::Bold),
        Cell::new(params.num_iterations),
    ]);
    table.add_row(vec![
        Cell::new("Target").add_attribute(Attribute::Bold),
        Cell::new(format!("{:.2}", params.target_point)).fg(Color::Green),
        Cell::new("Policy").add_attribute(Attribute::Bold),
        Cell::new(params.update_policy.to_string()),
    ]);
    table.add_row(vec![
        Cell::new("Min").add_attribute(Attribute::Bold),
        Cell::new(format!("{:.2}", params.min_bound)),
        Cell::new("Max").add_attribute(Attribute::Bold),
        Cell::new(format!("{:.2}", params.max_bound)),
    ]);
    println!("\n{}", table);
}

/// One row every `every` iterations, plus the first and last.
pub fn print_convergence(result: &OptimizationResult, every: usize) {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.add_row(vec![
        Cell::new("Iter").add_attribute(Attribute::Bold),
        Cell::new("a(t)"),
        Cell::new("Best").fg(Color::Cyan),
        Cell::new("Mean"),
        Cell::new("Alpha").fg(Color::Red),
        Cell::new("Leader Est.").fg(Color::Green),
    ]);

    for i in 1..=3 {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }

    let last = result.snapshot_count() - 1;
    let every = every.max(1);
    let total = result.iterations_performed();

    for it in (0..=last).filter(|&it| it % every == 0 || it == last) {
        // Coefficient that produced this snapshot; the initial one has none.
        let a = if it == 0 {
            "-".to_string()
        } else {
            format!("{:.3}", convergence_coefficient(it - 1, total))
        };
        table.add_row(vec![
            Cell::new(it).add_attribute(Attribute::Bold),
            Cell::new(a),
            Cell::new(format!("{:.4}", result.best_fitness(it))).fg(Color::Cyan),
            Cell::new(format!("{:.4}", result.mean_fitness(it))),
            Cell::new(format!("{:.3}", result.snapshot(it)[0])).fg(Color::Red),
            Cell::new(format!("{:.3}", result.leader_estimate(it))).fg(Color::Green),
        ]);
    }
    println!("\n{}", table);
}

pub fn print_frame(frame: &Frame, last: usize) {
    println!(
        "\nIteration {} of {} | Target {:.2} | Leader Est. {:.3}",
        frame.iteration, last, frame.target, frame.leader_estimate
    );

    let mut table = Table::new();
    table.load_preset(ASCII_FULL);
    table.add_row(vec![
        Cell::new("Rank").add_attribute(Attribute::Bold),
        Cell::new("Role"),
        Cell::new("X"),
        Cell::new("Y"),
        Cell::new("Fitness").fg(Color::Cyan),
    ]);

    for i in 2..=4 {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }

    for (rank, m) in frame.markers.iter().enumerate() {
        table.add_row(vec![
            Cell::new(rank),
            Cell::new(m.role.to_string()).fg(role_color(m.role)),
            Cell::new(format!("{:.3}", m.position.x)),
            Cell::new(format!("{:.3}", m.position.y)),
            Cell::new(format!("{:.4}", m.fitness)).fg(Color::Cyan),
        ]);
    }
    println!("{}", table);
}

#[derive(Debug, Serialize)]
struct TraceRow {
    iteration: usize,
    best_fitness: f32,
    mean_fitness: f32,
    alpha_x: f32,
    alpha_y: f32,
    leader_x: f32,
    leader_y: f32,
}

/// Per-iteration convergence trace as CSV.
pub fn write_trace_csv<W: Write>(writer: W, result: &OptimizationResult) -> GwoResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for it in 0..result.snapshot_count() {
        let alpha = result.snapshot(it)[0];
        let leader = result.leader_estimate(it);
        wtr.serialize(TraceRow {
            iteration: it,
            best_fitness: result.best_fitness(it),
            mean_fitness: result.mean_fitness(it),
            alpha_x: alpha.x,
            alpha_y: alpha.y,
            leader_x: leader.x,
            leader_y: leader.y,
        })?;
    }
    wtr.flush()?;
    Ok(())
}
