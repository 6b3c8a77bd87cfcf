//! Print a catalog fixture the way the schema browser shows it
//!
//! Run with: cargo run --bin catalog_dump -- <fixture.toml> [filter] [--expand]
//!
//! Without arguments the fixture and filter come from the configuration file.

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result};
use catalog_tree::catalog::CatalogTree;
use catalog_tree::config::TreeConfig;
use catalog_tree::fixture::StaticCatalog;
use catalog_tree::tree::NodeHandle;

const USAGE: &str = "usage: catalog_dump <fixture.toml> [filter] [--expand]";

fn main() -> Result<()> {
    env_logger::init();

    let config = TreeConfig::load();
    let mut fixture = None;
    let mut filter = None;
    let mut expand = false;
    for arg in std::env::args().skip(1) {
        if arg == "--expand" {
            expand = true;
        } else if fixture.is_none() {
            fixture = Some(PathBuf::from(arg));
        } else {
            filter = Some(arg);
        }
    }

    let fixture = fixture.or_else(|| config.fixture.clone()).context(USAGE)?;
    let filter = filter.or_else(|| config.filter.clone());

    let catalog = Rc::new(
        StaticCatalog::load(&fixture).with_context(|| format!("Failed to load fixture {}", fixture.display()))?,
    );
    let base = Rc::new(RefCell::new(CatalogTree::with_config(&config)));
    {
        let mut base = base.borrow_mut();
        base.set_fetch_delegate(&catalog);
        base.refresh_schemata();
        if expand {
            expand_all(&mut base);
        }
    }

    let shown = match filter {
        Some(filter) => {
            let view = CatalogTree::new_filtered_view(&base);
            {
                let mut view = view.borrow_mut();
                view.set_filter(&filter);
                view.filter_data();
            }
            view
        }
        None => Rc::clone(&base),
    };

    let tree = shown.borrow();
    for (depth, node) in tree.root_node().visible_nodes() {
        let marker = if node.bold { "*" } else { "" };
        println!("{}{}{}", "  ".repeat(depth), node.caption, marker);
    }
    Ok(())
}

/// Expand every node, loading whatever each expansion needs
fn expand_all(tree: &mut CatalogTree) {
    let mut pending = vec![NodeHandle::root()];
    while let Some(parent) = pending.pop() {
        let count = tree.node(&parent).map_or(0, |node| node.count());
        for index in 0..count {
            let handle = parent.child(index);
            tree.expand_toggled(&handle, true);
            pending.push(handle);
        }
    }
}
