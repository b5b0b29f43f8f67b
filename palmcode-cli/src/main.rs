use clap::{Parser, Subcommand};
use palmcode::io::{decode_png, encode_png, load_gray_image};
use palmcode::{
    EnrollmentRecord, PalmcodeError, PalmcodeResult, Scanner, Template, TemplateStore,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Palmprint enrollment and verification")]
struct Cli {
    /// Template store directory.
    #[arg(short, long, value_name = "DIR", default_value = "palmstore")]
    store: PathBuf,
    /// Enable tracing output for pipeline profiling.
    #[arg(long)]
    trace: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Enroll one or more palm images under an identity.
    Enroll {
        /// Identity label to enroll under.
        identity: String,
        /// Palm image files (PNG or JPEG).
        #[arg(required = true)]
        images: Vec<PathBuf>,
    },
    /// Verify a palm image against every enrolled template.
    Verify {
        /// Palm image file to verify.
        image: PathBuf,
    },
    /// List enrolled identities and their record counts.
    List,
}

/// One persisted enrollment in the store index.
#[derive(Debug, Serialize, Deserialize)]
struct IndexEntry {
    identity: String,
    code: String,
    mask: String,
    roi: String,
    source: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Index {
    prints: Vec<IndexEntry>,
}

/// Directory-backed template store: an `index.json` plus one PNG set
/// (code, mask, roi, source capture) per enrollment.
struct DirStore {
    root: PathBuf,
    index: Index,
}

impl DirStore {
    fn open(root: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        fs::create_dir_all(root)?;
        let index_path = root.join("index.json");
        let index = if index_path.exists() {
            serde_json::from_str(&fs::read_to_string(&index_path)?)?
        } else {
            Index::default()
        };
        Ok(Self {
            root: root.to_path_buf(),
            index,
        })
    }

    fn save_index(&self) -> PalmcodeResult<()> {
        let json = serde_json::to_string_pretty(&self.index).map_err(store_error)?;
        fs::write(self.root.join("index.json"), json).map_err(store_error)
    }

    fn write_png(&self, name: &str, bytes: &[u8]) -> PalmcodeResult<()> {
        fs::write(self.root.join(name), bytes).map_err(store_error)
    }

    /// Loads every stored print back as a comparison-ready template.
    fn templates(&self) -> PalmcodeResult<Vec<Template>> {
        self.index
            .prints
            .iter()
            .map(|entry| {
                let code = decode_png(&fs::read(self.root.join(&entry.code)).map_err(store_error)?)?;
                let mask = decode_png(&fs::read(self.root.join(&entry.mask)).map_err(store_error)?)?;
                Template::from_images(entry.identity.clone(), code, mask)
            })
            .collect()
    }
}

fn store_error(err: impl std::fmt::Display) -> PalmcodeError {
    PalmcodeError::Store {
        reason: err.to_string(),
    }
}

impl TemplateStore for DirStore {
    fn store(&mut self, identity: &str, record: EnrollmentRecord) -> PalmcodeResult<()> {
        let seq = self
            .index
            .prints
            .iter()
            .filter(|p| p.identity == identity)
            .count();
        let entry = IndexEntry {
            identity: identity.to_string(),
            code: format!("{identity}-{seq}.code.png"),
            mask: format!("{identity}-{seq}.mask.png"),
            roi: format!("{identity}-{seq}.roi.png"),
            source: format!("{identity}-{seq}.source.png"),
        };

        self.write_png(&entry.code, &encode_png(record.code.as_gray())?)?;
        self.write_png(&entry.mask, &encode_png(record.mask.as_gray())?)?;
        self.write_png(&entry.roi, &encode_png(&record.roi)?)?;
        self.write_png(&entry.source, &encode_png(&record.source)?)?;

        self.index.prints.push(entry);
        self.save_index()
    }
}

#[derive(Debug, Serialize)]
struct VerifyOutput {
    accepted: bool,
    identity: Option<String>,
    distance: Option<f64>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("palmcode=info".parse()?))
            .with_target(false)
            .init();
    }

    let scanner = Scanner::new();
    let mut store = DirStore::open(&cli.store)?;

    match cli.command {
        Command::Enroll { identity, images } => {
            let frames = images
                .iter()
                .map(load_gray_image)
                .collect::<PalmcodeResult<Vec<_>>>()?;
            let stored = scanner.enroll(&identity, &frames, &mut store)?;
            println!("enrolled {stored} print(s) under '{identity}'");
        }
        Command::Verify { image } => {
            let frame = load_gray_image(&image)?;
            let templates = store.templates()?;
            let decision = scanner.verify(&frame, &templates)?;
            let output = VerifyOutput {
                accepted: decision.is_accepted(),
                identity: decision.best().map(|b| b.identity.clone()),
                distance: decision.best().map(|b| b.distance),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Command::List => {
            let mut counts: Vec<(String, usize)> = Vec::new();
            for entry in &store.index.prints {
                match counts.iter_mut().find(|(id, _)| *id == entry.identity) {
                    Some((_, n)) => *n += 1,
                    None => counts.push((entry.identity.clone(), 1)),
                }
            }
            for (identity, n) in counts {
                println!("{identity}: {n} print(s)");
            }
        }
    }

    Ok(())
}
