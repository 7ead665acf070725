use std::path::Path;

use qrstudio::codec::{HexColor, StandardCodec, StyleOptions};
use qrstudio::config::StudioConfig;
use qrstudio::generate::{self, GenerateRequest, PayloadSource};
use qrstudio::{StudioError, history, output};

pub struct GenerateArgs<'a> {
    pub text: Option<&'a str>,
    pub image: Option<&'a Path>,
    pub video: Option<&'a Path>,
    pub color: Option<HexColor>,
    pub background: Option<HexColor>,
    pub size: Option<u32>,
    pub border: Option<u32>,
    pub output: Option<&'a Path>,
    pub json: bool,
}

impl GenerateArgs<'_> {
    fn source(&self) -> PayloadSource {
        if let Some(path) = self.image {
            PayloadSource::Image(path.to_path_buf())
        } else if let Some(path) = self.video {
            PayloadSource::Video(path.to_path_buf())
        } else {
            PayloadSource::Text(self.text.unwrap_or_default().to_owned())
        }
    }

    /// Configured style with per-invocation flags on top.
    fn style(&self, base: &StyleOptions) -> StyleOptions {
        StyleOptions {
            module_color: self.color.unwrap_or(base.module_color),
            background_color: self.background.unwrap_or(base.background_color),
            module_size: self.size.unwrap_or(base.module_size),
            border: self.border.unwrap_or(base.border),
        }
    }
}

pub fn cmd_generate(config: &StudioConfig, args: &GenerateArgs<'_>) -> i32 {
    let store = match history::open_store(&config.store_dir, config.backend) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("[qrstudio] error opening store: {e}");
            return 1;
        }
    };
    let request = GenerateRequest {
        source: args.source(),
        style: args.style(&config.style),
    };

    let now = chrono::Local::now();
    let code = match generate::generate(&StandardCodec, store.as_ref(), &request, &now) {
        Ok(c) => c,
        Err(StudioError::EmptyInput) => {
            eprintln!("[qrstudio] warning: please enter input");
            return 1;
        }
        Err(e) => {
            eprintln!("[qrstudio] error: {e}");
            return 1;
        }
    };

    if let Some(path) = args.output
        && let Err(e) = std::fs::write(path, &code.png)
    {
        eprintln!("[qrstudio] error: cannot write {}: {e}", path.display());
        return 1;
    }

    if args.json {
        output::print_json(&code);
    } else {
        println!("{}", code.identifier);
        eprintln!("[qrstudio] saved {}", code.image_path.display());
        if let Some(path) = args.output {
            eprintln!("[qrstudio] copy written to {}", path.display());
        }
    }
    0
}
