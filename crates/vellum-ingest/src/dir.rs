//! Directory listings as synthetic element trees.

use crate::Input;
use std::io;
use std::path::Path;
use vellum_tree::{Element, Item};

/// Build a `<directory>` tree for `path`. Entries are sorted by name so the
/// listing is stable across platforms; `max_depth` bounds recursion whether
/// or not `recursive` is set.
pub(crate) fn directory_tree<'a>(
    input: &Input<'a>,
    path: &Path,
    recursive: bool,
    max_depth: usize,
) -> io::Result<Item<'a>> {
    let el = walk(input, path, recursive, max_depth, 1)?;
    Ok(Item::Element(el))
}

fn walk<'a>(
    input: &Input<'a>,
    path: &Path,
    recursive: bool,
    max_depth: usize,
    depth: usize,
) -> io::Result<&'a Element<'a>> {
    let el = Element::new_in(input.arena, input.names.intern("directory"));
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned());
    el.set_attr(
        input.names.intern("name"),
        Item::String(input.arena.alloc_str(&name)),
    );
    el.set_attr(
        input.names.intern("path"),
        Item::String(input.arena.alloc_str(&path.to_string_lossy())),
    );

    let mut entries: Vec<_> = std::fs::read_dir(path)?.flatten().collect();
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let entry_path = entry.path();
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if entry_path.is_dir() {
            if recursive && depth < max_depth {
                match walk(input, &entry_path, recursive, max_depth, depth + 1) {
                    Ok(child) => el.add_child(Item::Element(child)),
                    Err(error) => {
                        tracing::warn!(path = %entry_path.display(), %error, "skipping unreadable directory");
                    }
                }
            } else {
                let stub = Element::new_in(input.arena, input.names.intern("directory"));
                stub.set_attr(
                    input.names.intern("name"),
                    Item::String(input.arena.alloc_str(&file_name)),
                );
                el.add_child(Item::Element(stub));
            }
        } else {
            let file = Element::new_in(input.arena, input.names.intern("file"));
            file.set_attr(
                input.names.intern("name"),
                Item::String(input.arena.alloc_str(&file_name)),
            );
            if let Ok(meta) = entry.metadata() {
                file.set_attr(input.names.intern("size"), Item::Int(meta.len() as i64));
            }
            el.add_child(Item::Element(file));
        }
    }
    Ok(el)
}
