//! WMO world map object command implementations

use anyhow::{Context, Result};
use clap::Subcommand;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use wbs_wmo::{
    BspOptions, BspStats, BspTree, WmoFile, WmoFileType, WmoGroupFile, WmoValidator,
    detect_file_type, scan_chunks,
};

use crate::utils::{add_table_row, create_table, format_bounds, format_bytes};

#[derive(Subcommand)]
pub enum WmoCommands {
    /// Show information about a root WMO file and its groups
    Info {
        /// Path to the root WMO file
        file: PathBuf,

        /// Show a row per group
        #[arg(short, long)]
        detailed: bool,
    },

    /// List the top-level chunks of a root or group file
    Chunks {
        /// Path to the WMO file
        file: PathBuf,
    },

    /// Validate a root WMO file and its groups
    Validate {
        /// Path to the root WMO file
        file: PathBuf,

        /// Show warnings in addition to errors
        #[arg(short, long)]
        warnings: bool,
    },

    /// Rebuild the collision tree of a group file and compare it with the stored one
    Bsp {
        /// Path to the group WMO file
        file: PathBuf,

        /// Largest triangle count of a leaf
        #[arg(long, default_value_t = BspOptions::default().max_face_count)]
        max_faces: usize,

        /// Depth at which nodes stop splitting
        #[arg(long, default_value_t = BspOptions::default().max_depth)]
        max_depth: usize,
    },
}

pub fn execute(command: WmoCommands) -> Result<()> {
    match command {
        WmoCommands::Info { file, detailed } => info(&file, detailed),
        WmoCommands::Chunks { file } => chunks(&file),
        WmoCommands::Validate { file, warnings } => validate(&file, warnings),
        WmoCommands::Bsp {
            file,
            max_faces,
            max_depth,
        } => bsp(
            &file,
            &BspOptions {
                max_face_count: max_faces,
                max_depth,
            },
        ),
    }
}

fn open_wmo(path: &Path) -> Result<WmoFile> {
    if !path.exists() {
        anyhow::bail!("File not found: {}", path.display());
    }
    WmoFile::open(path).with_context(|| format!("Failed to load WMO file: {}", path.display()))
}

fn info(path: &Path, detailed: bool) -> Result<()> {
    let wmo = open_wmo(path)?;
    let root = &wmo.root;

    println!("WMO Information");
    println!("===============");
    println!();
    println!("Version: {}", root.version);
    println!("Materials: {}", root.materials.len());
    println!("Groups: {}", wmo.groups.len());
    println!("Portals: {}", root.portals.len());
    println!("Lights: {}", root.lights.len());
    println!("Doodad Definitions: {}", root.doodad_defs.len());
    println!("Doodad Sets: {}", root.doodad_sets.len());
    println!("Texture Names (MOTX): {}", format_bytes(root.textures.len() as u64));
    println!("\nBounding Box: {}", format_bounds(&root.header.bounding_box));
    println!("Header Flags: {:?}", root.header.flags);

    if let Some(ref skybox) = root.skybox {
        println!("Skybox: {skybox}");
    }

    let triangles: usize = wmo.groups.iter().map(WmoGroupFile::triangle_count).sum();
    let vertices: usize = wmo.groups.iter().map(|g| g.vertices.len()).sum();
    println!("\nTriangles: {triangles}");
    println!("Vertices: {vertices}");

    if detailed && !wmo.groups.is_empty() {
        println!("\nGroups:");
        let mut table = create_table(&[
            "Index",
            "Name",
            "Flags",
            "Vertices",
            "Triangles",
            "Batches",
            "BSP Nodes",
        ]);
        for (i, group) in wmo.groups.iter().enumerate() {
            add_table_row(
                &mut table,
                vec![
                    i.to_string(),
                    root.group_name(i).into_owned(),
                    format!("{:?}", group.header.flags),
                    group.vertices.len().to_string(),
                    group.triangle_count().to_string(),
                    group.batches.len().to_string(),
                    group.bsp.len().to_string(),
                ],
            );
        }
        table.printstd();
    }

    Ok(())
}

fn chunks(path: &Path) -> Result<()> {
    let file =
        File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
    let mut reader = BufReader::new(file);

    let kind = detect_file_type(&mut reader)
        .with_context(|| format!("Not a WMO file: {}", path.display()))?;
    let found = scan_chunks(&mut reader)
        .with_context(|| format!("Failed to scan chunks: {}", path.display()))?;

    println!(
        "{} file, {} chunks",
        match kind {
            WmoFileType::Root => "Root",
            WmoFileType::Group => "Group",
        },
        found.len()
    );

    let mut table = create_table(&["Offset", "Chunk", "Size"]);
    for chunk in &found {
        add_table_row(
            &mut table,
            vec![
                format!("0x{:08X}", chunk.offset),
                chunk.header.id.to_string(),
                chunk.header.size.to_string(),
            ],
        );
    }
    table.printstd();

    Ok(())
}

fn validate(path: &Path, show_warnings: bool) -> Result<()> {
    let wmo = open_wmo(path)?;
    let report = WmoValidator::new().validate(&wmo);

    println!("WMO Validation Report");
    println!("=====================");
    println!();

    if report.has_errors() {
        println!("Errors:");
        for error in &report.errors {
            println!("  ✗ {error}");
        }
    } else {
        println!("✓ WMO file is valid");
    }

    if show_warnings && report.has_warnings() {
        println!("\nWarnings:");
        for warning in &report.warnings {
            println!("  ⚠ {warning}");
        }
    }

    if report.has_errors() {
        anyhow::bail!(
            "{} failed validation with {} errors",
            path.display(),
            report.errors.len()
        );
    }

    Ok(())
}

fn print_stats(title: &str, stats: &BspStats) {
    println!("{title}:");
    println!("  Nodes: {}", stats.node_count);
    println!("  Leaves: {} ({} empty)", stats.leaf_count, stats.empty_leaf_count);
    println!("  Max Depth: {}", stats.max_depth);
    println!("  Max Leaf Faces: {}", stats.max_leaf_faces);
    println!("  Face References: {}", stats.face_references);
}

fn bsp(path: &Path, options: &BspOptions) -> Result<()> {
    let file =
        File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
    let group = WmoGroupFile::read(&mut BufReader::new(file))
        .with_context(|| format!("Failed to parse WMO group file: {}", path.display()))?;

    println!("Triangles: {}", group.triangle_count());
    if group.bsp.is_empty() {
        println!("Stored tree: none");
    } else {
        print_stats("Stored tree", &group.bsp.stats());
    }

    let rebuilt = BspTree::build(&group.vertices, &group.indices, options)
        .context("Failed to build the collision tree")?;
    print_stats(
        &format!(
            "Rebuilt tree (max {} faces, depth {})",
            options.max_face_count, options.max_depth
        ),
        &rebuilt.stats(),
    );

    Ok(())
}
