use qrstudio::config::StudioConfig;
use qrstudio::history::{self, HistoryStore};
use qrstudio::output;

fn open_history_store(config: &StudioConfig) -> Option<Box<dyn HistoryStore>> {
    match history::open_store(&config.store_dir, config.backend) {
        Ok(s) => Some(s),
        Err(e) => {
            eprintln!("[qrstudio] error opening history: {e}");
            None
        }
    }
}

pub fn cmd_history_list(config: &StudioConfig, json: bool) -> i32 {
    let Some(store) = open_history_store(config) else {
        return 1;
    };
    let listing = match store.list_all() {
        Ok(l) => l,
        Err(e) => {
            eprintln!("[qrstudio] error listing history: {e}");
            return 1;
        }
    };

    for line in &listing.corrupt {
        eprintln!(
            "[qrstudio] warning: skipped unreadable history line {}: {:?}",
            line.line_number, line.content
        );
    }

    if json {
        output::print_json(&listing);
        return 0;
    }

    if listing.records.is_empty() {
        eprintln!("[qrstudio] no QR codes generated yet");
        return 0;
    }
    for record in &listing.records {
        println!("{}\t{}", record.identifier, record.payload);
    }
    0
}

#[derive(serde::Serialize)]
struct ShowEntry<'a> {
    identifier: &'a str,
    payload: &'a str,
    image_path: std::path::PathBuf,
    image_exists: bool,
}

pub fn cmd_history_show(config: &StudioConfig, identifier: &str, json: bool) -> i32 {
    let Some(store) = open_history_store(config) else {
        return 1;
    };
    let record = match store.find(identifier) {
        Ok(Some(r)) => r,
        Ok(None) => {
            eprintln!("[qrstudio] no QR code named {identifier}");
            return 1;
        }
        Err(e) => {
            eprintln!("[qrstudio] error reading history: {e}");
            return 1;
        }
    };
    let image_path = match store.image_path(&record.identifier) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("[qrstudio] error: {e}");
            return 1;
        }
    };
    let entry = ShowEntry {
        identifier: &record.identifier,
        payload: &record.payload,
        image_exists: image_path.is_file(),
        image_path,
    };

    if json {
        output::print_json(&entry);
        return 0;
    }

    println!("Identifier: {}", entry.identifier);
    println!(
        "Image: {}{}",
        entry.image_path.display(),
        if entry.image_exists { "" } else { " (missing)" }
    );
    println!("Stored Data: {}", entry.payload);
    0
}

pub fn cmd_history_delete(config: &StudioConfig, identifier: &str) -> i32 {
    let Some(store) = open_history_store(config) else {
        return 1;
    };
    match store.delete(identifier) {
        Ok(outcome) => {
            if outcome.records_removed == 0 && !outcome.image_removed {
                eprintln!("[qrstudio] nothing to delete for {identifier}");
            } else {
                eprintln!(
                    "[qrstudio] deleted {identifier} ({} record(s), image {})",
                    outcome.records_removed,
                    if outcome.image_removed {
                        "removed"
                    } else {
                        "already absent"
                    }
                );
            }
            0
        }
        Err(e) => {
            eprintln!("[qrstudio] error deleting {identifier}: {e}");
            1
        }
    }
}

pub fn cmd_history_check(config: &StudioConfig) -> i32 {
    let Some(store) = open_history_store(config) else {
        return 1;
    };
    let report = match store.check() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("[qrstudio] error checking history: {e}");
            return 1;
        }
    };

    for identifier in &report.missing_images {
        println!("missing image: {identifier}");
    }
    for identifier in &report.orphan_images {
        println!("orphan image: {identifier}");
    }
    if report.is_consistent() {
        eprintln!("[qrstudio] history and images are consistent");
        0
    } else {
        1
    }
}
