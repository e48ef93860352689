//! Example: parse a document to a tree, navigate it and write it back.
//!
//! Run with: cargo run --example tree_parse

use tagtree_core::{parse_str, ElementRef, WriteOptions};

fn main() {
    let input = r#"<?xml version="1.0"?>
<!--editor session-->
<session version="2">
  <window id="main" width="1280" height="800" maximized="false">
    <!--left side-->
    <pane name="files" ratio="0.2">"~/projects"</pane>
    <pane name="editor" ratio="0.8">
      <tab path="notes.txt" line="120"></tab>
      <tab path="todo &amp; ideas.txt" line="4"></tab>
    </pane>
  </window>
</session>
"#;

    let mut doc = parse_str(input).expect("parse failed");

    println!("=== Document Tree ===\n");
    print_element(doc.root_element(), 0);

    println!("\n=== Window ===\n");
    let window = doc
        .root_element()
        .find_child_by_attribute("id", "main")
        .expect("no main window");
    println!("width: {}", window.get_int_default("width", 800).unwrap_or(800));
    println!("height: {}", window.get_int_default("height", 600).unwrap_or(600));
    println!("maximized: {}", window.get_bool_default("maximized", false));
    let editor = window.find_child_by_attribute("name", "EDITOR").expect("no editor pane");
    for tab in editor.children() {
        println!("tab: {} @ {}", tab.attribute("path").unwrap_or("?"), tab.get_int_default("line", 1).unwrap_or(1));
    }

    let window = window.id();
    doc.element_mut(window).add_bool_attribute("maximized", true).unwrap();

    println!("\n=== Saved ===\n");
    print!("{}", doc.rendered(&WriteOptions { indent: 4, header: true }));
}

fn print_element(element: ElementRef<'_>, depth: usize) {
    let indent = "  ".repeat(depth);
    if let Some(comment) = element.comment() {
        println!("{}# {}", indent, comment);
    }
    let attrs: Vec<String> = element
        .attributes()
        .map(|(name, value)| format!("{}={:?}", name, value))
        .collect();
    println!("{}{} [{}]", indent, element.tag_name(), attrs.join(", "));
    if let Some(contents) = element.contents() {
        println!("{}  {:?}", indent, contents);
    }
    for child in element.children() {
        print_element(child, depth + 1);
    }
}
