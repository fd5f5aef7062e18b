//! The template compiler: raw text to a [`BringList`].

use log::{debug, trace};

use bringlist_core::{BringList, Category};

use crate::error::CompileError;
use crate::grammar::{self, Line};

/// Compile template text into an ordered document.
///
/// Blank lines and `//` comment lines are ignored. Every other line must
/// parse as a category header or an item; the first line that does not
/// aborts compilation with a [`CompileError`] naming the original line
/// number. An item line before the first category header is a structural
/// error.
///
/// Malformed input is an expected outcome and never panics.
pub fn compile(template: &str) -> Result<BringList, CompileError> {
    debug!(bytes = template.len(); "compiling template");

    let mut categories: Vec<Category> = Vec::new();
    let mut current: Option<Category> = None;

    for (index, raw) in template.lines().enumerate() {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with("//") {
            continue;
        }
        let number = index + 1;

        let (line, _) =
            grammar::line(raw).map_err(|failure| CompileError::syntax(number, &failure))?;

        match line {
            Line::Category { name, tags } => {
                trace!(line = number, category = name.as_str(); "category header");
                if let Some(finished) = current.take() {
                    categories.push(finished);
                }
                current = Some(Category {
                    name,
                    tags,
                    items: Vec::new(),
                });
            }
            Line::Item(item) => match current.as_mut() {
                Some(category) => category.items.push(item),
                None => {
                    return Err(CompileError::ItemWithoutCategory {
                        line: number,
                        text: raw.to_string(),
                    });
                }
            },
        }
    }

    if let Some(finished) = current.take() {
        categories.push(finished);
    }

    let list = BringList::new(categories);
    debug!(categories = list.len(); "template compiled");
    Ok(list)
}
