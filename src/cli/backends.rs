//! `backends`: the extension routing table.

use owo_colors::OwoColorize;

use crate::backend::{BackendDescriptor, table};

pub fn print_table() {
    println!("{}", format_row("extension", "diagram", "backend").bold());
    for (ext, descriptor) in table() {
        println!("{}", row(ext, descriptor));
    }
}

fn row(ext: &str, descriptor: &BackendDescriptor) -> String {
    format_row(
        &format!(".{ext}"),
        descriptor.diagram.name(),
        descriptor.kind.name(),
    )
}

fn format_row(ext: &str, diagram: &str, backend: &str) -> String {
    format!("{ext:<12}{diagram:<14}{backend}")
}
