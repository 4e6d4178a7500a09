//! The `list` and `remove` commands.

use anyhow::Result;

use crate::{
    config::Config,
    icon::{IconRecord, IconStore},
    log,
    svg::geom::format_number,
    utils::plural_count,
};

/// Print every stored icon, one per line.
pub fn list_icons(config: &Config) -> Result<()> {
    let store = IconStore::open(&config.store.path)?;
    if store.list().is_empty() {
        log!("store"; "no icons in {}", store.path().display());
        return Ok(());
    }

    for record in store.list() {
        println!("{}", format_record(record));
    }
    log!("store"; "{} in {}", plural_count(store.list().len(), "icon"), store.path().display());
    Ok(())
}

/// Remove icons by id. Unknown ids are reported, not fatal.
pub fn remove_icons(ids: &[String], config: &Config) -> Result<()> {
    let mut store = IconStore::open(&config.store.path)?;
    let mut removed = 0;
    for id in ids {
        if store.delete(id)? {
            removed += 1;
        } else {
            log!("warning"; "no icon with id `{}`", id);
        }
    }
    log!("store"; "removed {}", plural_count(removed, "icon"));
    Ok(())
}

/// `id  name  WxH  source (strategy)`
fn format_record(record: &IconRecord) -> String {
    format!(
        "{}  {}  {}x{}  {} ({})",
        record.id,
        record.name,
        format_number(record.width),
        format_number(record.height),
        record.source,
        record.strategy
    )
}
