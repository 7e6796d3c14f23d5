//! Command-line layer preview renderer.
//!
//! Slices an STL through the planner engine, shows the selected layer
//! in an on-screen viewer (or writes it to a PNG with `--output`), and
//! optionally lists the mesh triangles intersecting that layer's
//! plane.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod viewer;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use preview_render::{
    engine, find_intersecting_default, plan_layer, render_selection, RenderOptions,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Render a sliced-path layer preview.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// STL file to slice and preview.
    stl: PathBuf,

    /// Layer height in millimetres.
    #[arg(long, default_value_t = 1)]
    layer_height: u32,

    /// Infill line spacing in millimetres.
    #[arg(long, default_value_t = 1.0)]
    infill_spacing: f64,

    /// Layer index to preview (clamped to the sliced range).
    #[arg(long, default_value_t = 0)]
    layer: i64,

    /// Path to the planner shared library (defaults to the platform
    /// library search path).
    #[arg(long)]
    engine_path: Option<PathBuf>,

    /// Draw the source mesh as a translucent shell.
    #[arg(long)]
    show_mesh: bool,

    /// Draw the layer's contour segments.
    #[arg(long)]
    show_contours: bool,

    /// Draw the layer's infill segments.
    #[arg(long)]
    show_infill: bool,

    /// Mark the planner's raw intersection points.
    #[arg(long)]
    show_raw_intersections: bool,

    /// Color mesh triangles that intersect the layer plane.
    #[arg(long)]
    color_intersecting_tris: bool,

    /// Print the intersecting triangles instead of only rendering.
    #[arg(long)]
    list_intersecting_tris: bool,

    /// Write the preview to this PNG path instead of opening a
    /// viewer window.
    #[arg(long)]
    output: Option<PathBuf>,
}

impl Args {
    fn render_options(&self) -> RenderOptions {
        RenderOptions {
            layer_height: self.layer_height,
            infill_spacing: self.infill_spacing,
            layer: self.layer,
            show_mesh: self.show_mesh,
            show_contours: self.show_contours,
            show_infill: self.show_infill,
            show_raw_intersections: self.show_raw_intersections,
            color_intersecting: self.color_intersecting_tris,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let args = Args::parse();
    let options = args.render_options();

    let binding = engine::load_engine(args.engine_path.as_deref())?;
    let selection = plan_layer(&binding, &args.stl, &options)
        .with_context(|| format!("failed to plan {}", args.stl.display()))?;

    if args.list_intersecting_tris {
        for mesh in &selection.meshes {
            let hits = find_intersecting_default(mesh, selection.layer.z);
            if hits.is_empty() {
                continue;
            }
            println!(
                "Layer z={}: {} intersecting tris",
                selection.layer.z,
                hits.len()
            );
            for hit in &hits {
                if let Some([a, b, c]) = mesh.triangle_points(hit.index) {
                    println!(
                        "  tri {}: ({}, {}, {}) ({}, {}, {}) ({}, {}, {})",
                        hit.index, a.x, a.y, a.z, b.x, b.y, b.z, c.x, c.y, c.z
                    );
                }
            }
        }
    }

    let artifact = render_selection(&selection, &options)?;

    if let Some(output) = &args.output {
        std::fs::write(output, &artifact.png)
            .with_context(|| format!("failed to write {}", output.display()))?;
        info!(
            output = %output.display(),
            layer = artifact.selected_layer,
            layers = artifact.layer_count,
            "Wrote layer preview"
        );
        println!(
            "Wrote {} (layer {} of {}, z={}mm)",
            output.display(),
            artifact.selected_layer,
            artifact.layer_count,
            artifact.z_height
        );
    } else {
        let title = format!(
            "Layer {} at z={}mm",
            artifact.selected_layer, artifact.z_height
        );
        viewer::show(&artifact.png, &title).context("failed to open the preview window")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }

    #[test]
    fn flags_default_off() {
        let args = Args::parse_from(["preview-cli", "model.stl"]);
        assert_eq!(args.layer_height, 1);
        assert!((args.infill_spacing - 1.0).abs() < f64::EPSILON);
        assert_eq!(args.layer, 0);
        assert!(!args.show_mesh);
        assert!(!args.color_intersecting_tris);
        assert!(args.output.is_none());
    }

    #[test]
    fn output_flag_selects_file_mode() {
        let args = Args::parse_from(["preview-cli", "model.stl", "--output", "preview.png"]);
        assert_eq!(args.output, Some(PathBuf::from("preview.png")));
    }

    #[test]
    fn options_mirror_arguments() {
        let args = Args::parse_from([
            "preview-cli",
            "model.stl",
            "--layer-height",
            "2",
            "--layer",
            "5",
            "--show-mesh",
            "--color-intersecting-tris",
        ]);
        let options = args.render_options();
        assert_eq!(options.layer_height, 2);
        assert_eq!(options.layer, 5);
        assert!(options.show_mesh);
        assert!(options.color_intersecting);
    }
}
