use std::io::Read as _;
use std::path::Path;

use qrstudio::codec::StandardCodec;
use qrstudio::output;
use qrstudio::scan::{self, ScanOutcome};

fn read_input(image: Option<&Path>) -> Option<Vec<u8>> {
    match image {
        Some(path) => match std::fs::read(path) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                eprintln!("[qrstudio] error: cannot read {}: {e}", path.display());
                None
            }
        },
        None => {
            let mut bytes = Vec::new();
            match std::io::stdin().read_to_end(&mut bytes) {
                Ok(_) => Some(bytes),
                Err(e) => {
                    eprintln!("[qrstudio] error: cannot read stdin: {e}");
                    None
                }
            }
        }
    }
}

/// Scan `image`, or stdin when `None`.
pub fn cmd_scan(image: Option<&Path>, json: bool) -> i32 {
    let Some(bytes) = read_input(image) else {
        return 1;
    };
    let outcome = match scan::scan_bytes(&StandardCodec, &bytes) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("[qrstudio] error: {e}");
            return 1;
        }
    };

    if json {
        output::print_json(&outcome);
        return i32::from(outcome == ScanOutcome::NotFound);
    }

    match outcome {
        ScanOutcome::Found { payload, link } => {
            eprintln!("[qrstudio] QR code detected");
            println!("{payload}");
            if let Some(link) = link {
                eprintln!("[qrstudio] link: {link}");
            }
            0
        }
        ScanOutcome::NotFound => {
            eprintln!("[qrstudio] warning: no QR code detected");
            1
        }
    }
}
