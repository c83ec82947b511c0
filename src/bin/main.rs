//! CMod CLI
//!
//! Inspect and convert CMod character and object files.

use clap::{Parser, Subcommand};
use cmod::{
    export_obj, load_character, load_cmo, save_character, save_cmo, BoundingBox,
    ConversionConfig, FormatKind, ImportConfig, ImportedCharacter, ImportedMesh, MemoryScene,
    SkeletonKind,
};
use serde::Serialize;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "cmod")]
#[command(author, version, about = "Inspect and convert CMod model files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a JSON summary of a model file
    Info {
        /// Model file (.cmc or .cmo)
        file: PathBuf,

        /// File format (cmo, cmc, legacy-cmc); guessed when omitted
        #[arg(short, long)]
        kind: Option<FormatKind>,
    },

    /// Decode a model file and dump it as Wavefront OBJ
    Obj {
        /// Model file (.cmc or .cmo)
        file: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// File format (cmo, cmc, legacy-cmc); guessed when omitted
        #[arg(short, long)]
        kind: Option<FormatKind>,
    },

    /// Decode a model file and write it in another format
    Convert {
        /// Input model file
        input: PathBuf,

        /// Output model file
        output: PathBuf,

        /// Input format; guessed when omitted
        #[arg(long)]
        from: Option<FormatKind>,

        /// Output format
        #[arg(long)]
        to: FormatKind,

        /// JSON file with "import" and "export" options
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Serialize)]
struct Summary {
    format: FormatKind,
    skeleton: Option<SkeletonKind>,
    vertices: usize,
    triangles: usize,
    bounds: Option<BoundingBox>,
    weights: usize,
}

enum Decoded {
    Object(ImportedMesh),
    Character(ImportedCharacter),
}

impl Decoded {
    fn mesh(&self) -> &ImportedMesh {
        match self {
            Decoded::Object(mesh) => mesh,
            Decoded::Character(character) => &character.mesh,
        }
    }

    fn summary(&self) -> Summary {
        let mesh = self.mesh();
        let (format, skeleton, weights) = match self {
            Decoded::Object(_) => (FormatKind::Cmo, None, 0),
            Decoded::Character(character) => (
                FormatKind::for_skeleton(character.skeleton),
                Some(character.skeleton),
                character.weights.len(),
            ),
        };
        Summary {
            format,
            skeleton,
            vertices: mesh.vertex_count(),
            triangles: mesh.triangle_count(),
            bounds: mesh.bounds(),
            weights,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Info { file, kind } => {
            let decoded = decode(&file, kind, &ImportConfig::default())?;
            println!("{}", serde_json::to_string_pretty(&decoded.summary())?);
        }
        Commands::Obj { file, output, kind } => {
            let decoded = decode(&file, kind, &ImportConfig::default().mesh_only())?;
            let obj_path = if output.extension().is_some() {
                output
            } else {
                output.with_extension("obj")
            };
            let file = BufWriter::new(File::create(&obj_path)?);
            export_obj(decoded.mesh(), file)?;
            println!("Exported OBJ to {:?}", obj_path);
        }
        Commands::Convert {
            input,
            output,
            from,
            to,
            config,
        } => {
            let config = match config {
                Some(path) => ConversionConfig::from_json(&fs::read_to_string(path)?)?,
                None => ConversionConfig::default(),
            };
            convert(&input, &output, from, to, &config)?;
        }
    }

    Ok(())
}

/// Object files by extension, everything else as a character file.
fn guess_kind(path: &Path) -> Option<FormatKind> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("cmo") => Some(FormatKind::Cmo),
        _ => None,
    }
}

fn decode(
    path: &Path,
    kind: Option<FormatKind>,
    config: &ImportConfig,
) -> Result<Decoded, Box<dyn std::error::Error>> {
    let decoded = match kind.or_else(|| guess_kind(path)) {
        Some(FormatKind::Cmo) => Decoded::Object(load_cmo(path, config)?),
        Some(format) => Decoded::Character(load_character(path, format.skeleton(), config)?),
        None => Decoded::Character(load_character(path, None, config)?),
    };
    Ok(decoded)
}

fn convert(
    input: &Path,
    output: &Path,
    from: Option<FormatKind>,
    to: FormatKind,
    config: &ConversionConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Loading {:?}...", input);
    let decoded = decode(input, from, &config.import)?;
    let mesh = decoded.mesh();
    println!(
        "  {} vertices, {} triangles",
        mesh.vertex_count(),
        mesh.triangle_count()
    );

    let mut scene = MemoryScene::new();
    match &decoded {
        Decoded::Object(mesh) => {
            mesh.apply(&mut scene);
        }
        Decoded::Character(character) => {
            character.apply(&mut scene);
        }
    }

    match to {
        FormatKind::Cmo => save_cmo(output, scene.mesh_objects(), &config.export)?,
        format => save_character(output, scene.last_mesh(), format, &config.export)?,
    }
    println!("Exported {} to {:?}", to, output);

    Ok(())
}
