//! Show an object's storage record.

use std::path::PathBuf;

use cubecap_common::config::AppConfig;
use cubecap_storage_index::StorageIndex;

pub fn run(object: String, output: Option<PathBuf>) -> anyhow::Result<()> {
    let app = AppConfig::load();
    let root = output.unwrap_or(app.output_root);
    let index = StorageIndex::open(&root);

    let Some(record) = index.record(&object) else {
        anyhow::bail!("no storage record for '{object}' under {}", root.display());
    };

    println!("Object: {}", record.object_name);
    println!("  Probe source: {}", record.is_probe_source);
    println!("  Folder: {}", root.join(&record.folder_path).display());
    println!(
        "  Last capture: {}",
        record.last_capture_date.as_deref().unwrap_or("never")
    );
    println!(
        "  Existing output: {}",
        StorageIndex::has_existing_output(&root.join(&record.folder_path))
    );

    if !record.capture_history.is_empty() {
        println!("  History ({} captures):", record.capture_history.len());
        for entry in record.capture_history.iter().rev() {
            println!("    {entry}");
        }
    }

    Ok(())
}
