//! M2 model file command implementations

use anyhow::{Context, Result};
use clap::Subcommand;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use wbs_m2::{AnimDirectory, M2Model, M2Skin, anim_filename, skin_filename};

use crate::utils::{add_table_row, create_table, format_bounds, format_bytes};

#[derive(Subcommand)]
pub enum M2Commands {
    /// Display information about an M2 model and the skins next to it
    Info {
        /// Path to the M2 file
        file: PathBuf,

        /// List every sequence
        #[arg(short, long)]
        detailed: bool,
    },
}

pub fn execute(cmd: M2Commands) -> Result<()> {
    match cmd {
        M2Commands::Info { file, detailed } => handle_info(&file, detailed),
    }
}

fn handle_info(path: &Path, detailed: bool) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("File not found: {}", path.display());
    }

    let file =
        File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
    let size = file.metadata()?.len();
    let model = M2Model::read(&mut BufReader::new(file), &AnimDirectory::new(path))
        .with_context(|| format!("Failed to parse M2 model: {}", path.display()))?;

    println!("M2 Model Information");
    println!("====================");
    println!();
    println!("Name: {}", model.name);
    println!("Size: {}", format_bytes(size));
    println!("Flags: {:?}", model.flags);
    println!("Sequences: {}", model.sequences.len());
    println!("Bones: {}", model.bones.len());
    println!("Vertices: {}", model.vertices.len());
    println!("Textures: {}", model.textures.len());
    println!("Materials: {}", model.materials.len());
    println!("Attachments: {}", model.attachments.len());
    println!("Events: {}", model.events.len());
    println!("Lights: {}", model.lights.len());
    println!("Cameras: {}", model.cameras.len());
    println!("Ribbon emitters: {}", model.ribbon_emitters.len());
    println!("Particle emitters: {}", model.particle_emitters.len());
    println!("Global Loops: {}", model.global_loops.len());
    println!(
        "\nBounds: {} (radius {:.2})",
        format_bounds(&model.bounds.bounding_box),
        model.bounds.radius
    );

    println!("\nSkin Profiles: {}", model.skin_profile_count);
    for index in 0..model.skin_profile_count as usize {
        let skin_path = skin_filename(path, index);
        let name = skin_path.display();
        if !skin_path.is_file() {
            println!("  {name}: missing");
            continue;
        }

        let file = File::open(&skin_path)
            .with_context(|| format!("Failed to open skin file: {name}"))?;
        let skin = M2Skin::read(&mut BufReader::new(file))
            .with_context(|| format!("Failed to parse skin file: {name}"))?;
        println!(
            "  {name}: {} vertices, {} triangles, {} submeshes, {} texture units",
            skin.vertex_lookup.len(),
            skin.triangle_count(),
            skin.submeshes.len(),
            skin.texture_units.len()
        );
    }

    if detailed && !model.sequences.is_empty() {
        println!("\nSequences:");
        let mut table = create_table(&["Index", "Id", "Variation", "Duration", "Storage"]);
        for (i, sequence) in model.sequences.iter().enumerate() {
            let storage = if sequence.is_alias() {
                format!("alias of {}", sequence.alias_next)
            } else if sequence.is_external() {
                let anim = anim_filename(path, sequence.id, sequence.variation_index);
                if anim.is_file() {
                    "anim file".to_string()
                } else {
                    "anim file (missing)".to_string()
                }
            } else {
                "embedded".to_string()
            };
            add_table_row(
                &mut table,
                vec![
                    i.to_string(),
                    sequence.id.to_string(),
                    sequence.variation_index.to_string(),
                    format!("{} ms", sequence.duration),
                    storage,
                ],
            );
        }
        table.printstd();
    }

    Ok(())
}
