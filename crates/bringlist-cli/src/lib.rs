//! CLI logic for the bringlist tool.
//!
//! Compiles a template file, prints consistency warnings, and renders the
//! packing list visible under the requested filter.

pub mod error_adapter;

mod args;

pub use args::{Args, Format};

use std::fs;

use log::info;

use bringlist::{evaluate, BringList, BringListError, Filter};

/// Run the bringlist CLI application.
///
/// Compiles the template (the built-in one when no path is given), prints
/// one `warning:` line per consistency finding, and then renders the list
/// in the requested format.
///
/// # Errors
///
/// Returns `BringListError` for:
/// - File I/O errors
/// - Template compile errors
/// - Output rendering errors
pub fn run(args: &Args) -> Result<(), BringListError> {
    let source = match &args.template {
        Some(path) => {
            info!(path = path.as_str(); "reading template");
            fs::read_to_string(path)?
        }
        None => {
            info!("using the built-in template");
            bringlist::DEFAULT_TEMPLATE.to_string()
        }
    };

    let list = bringlist::compile(&source)
        .map_err(|err| BringListError::new_compile_error(err, source.clone()))?;

    for warning in bringlist::check_consistency(&list) {
        eprintln!("warning: {warning}");
    }

    if args.check_only {
        return Ok(());
    }

    let filter = Filter::new(args.tags.iter().cloned(), args.nights);
    info!(nights = filter.nights, tags = filter.tags.len(); "rendering list");

    match args.format {
        Format::Text => print_text(&list, &filter),
        Format::Json => {
            let json = serde_json::to_string_pretty(&list)
                .map_err(|err| BringListError::Render(Box::new(err)))?;
            println!("{json}");
        }
    }

    Ok(())
}

/// Print the categories and items visible under the filter, with cadence
/// quantities prefixed the way the packing view shows them.
fn print_text(list: &BringList, filter: &Filter) {
    for category in list {
        if !category.tags.matches(filter) {
            continue;
        }
        println!("# {}", category.name);
        for item in &category.items {
            if !evaluate(filter, &item.tags).is_match {
                continue;
            }
            match item.quantity(filter.nights) {
                Some(quantity) => println!("{quantity}x {}", item.name),
                None => println!("{}", item.name),
            }
        }
        println!();
    }
}
