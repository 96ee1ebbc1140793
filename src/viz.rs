//! Point cloud visualization.
//!
//! The lidar check hands three aligned coordinate sequences to a
//! [`PointCloudViewer`]. The default viewer renders an isometric 3D scatter
//! to SVG next to the other artifacts and then waits for the operator.

use crate::artifacts::ArtifactStore;
use crate::cli::console::Console;
use crate::config::ViewerConfig;
use crate::{PreflightError, Result};
use std::fmt::{self, Write as _};
use std::io::BufRead;
use std::path::Path;
use std::process::Command;
use tracing::{info, warn};

/// "Display these points" capability.
///
/// Anything meant for the operator goes to `console`.
pub trait PointCloudViewer {
    fn show(
        &self,
        title: &str,
        xs: &[f32],
        ys: &[f32],
        zs: &[f32],
        console: &dyn Console,
    ) -> Result<()>;
}

/// Viewer for unattended runs
pub struct NullViewer;

impl PointCloudViewer for NullViewer {
    fn show(
        &self,
        _title: &str,
        _xs: &[f32],
        _ys: &[f32],
        _zs: &[f32],
        _console: &dyn Console,
    ) -> Result<()> {
        Ok(())
    }
}

/// Build the viewer selected by configuration
pub fn build_viewer(config: &ViewerConfig, artifacts: &ArtifactStore) -> Box<dyn PointCloudViewer> {
    if !config.enabled {
        return Box::new(NullViewer);
    }
    Box::new(SvgPointViewer {
        store: artifacts.clone(),
        file_name: config.svg_file.clone(),
        pause: config.pause,
        open_command: config.open_command.clone(),
    })
}

/// Configuration for SVG rendering
#[derive(Clone, Debug)]
pub struct ScatterConfig {
    pub width: f32,
    pub height: f32,
    pub padding: f32,
    pub point_radius: f32,
    pub point_color: &'static str,
    pub axis_color: &'static str,
}

impl Default for ScatterConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            padding: 40.0,
            point_radius: 1.5,
            point_color: "#1f3fbf",
            axis_color: "#555555",
        }
    }
}

/// Isometric projection of a 3D point onto the page plane (y grows upward)
fn project(x: f32, y: f32, z: f32) -> (f32, f32) {
    let (sin30, cos30) = (0.5_f32, 0.866_025_4_f32);
    ((x - y) * cos30, (x + y) * sin30 + z)
}

/// Render a labeled 3D scatter as an SVG document.
///
/// Sequences are zipped, so only the common prefix is drawn if lengths differ.
pub fn render_scatter(config: &ScatterConfig, title: &str, xs: &[f32], ys: &[f32], zs: &[f32]) -> String {
    let mut svg = String::new();
    // Writing into a String cannot fail
    let _ = write_scatter(&mut svg, config, title, xs, ys, zs);
    svg
}

fn write_scatter(
    svg: &mut String,
    config: &ScatterConfig,
    title: &str,
    xs: &[f32],
    ys: &[f32],
    zs: &[f32],
) -> fmt::Result {
    let projected: Vec<(f32, f32)> = xs
        .iter()
        .zip(ys)
        .zip(zs)
        .map(|((&x, &y), &z)| project(x, y, z))
        .collect();

    // Axis tripod spans the data extent from its minimum corner
    let min = |v: &[f32]| v.iter().copied().fold(f32::INFINITY, f32::min);
    let max = |v: &[f32]| v.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let n = projected.len();
    let (x0, y0, z0) = if n == 0 {
        (0.0, 0.0, 0.0)
    } else {
        (min(&xs[..n]), min(&ys[..n]), min(&zs[..n]))
    };
    let extent = if n == 0 {
        1.0
    } else {
        (max(&xs[..n]) - x0)
            .max(max(&ys[..n]) - y0)
            .max(max(&zs[..n]) - z0)
            .max(f32::EPSILON)
    };
    let axes = [
        ("x", project(x0 + extent, y0, z0)),
        ("y", project(x0, y0 + extent, z0)),
        ("z", project(x0, y0, z0 + extent)),
    ];
    let origin = project(x0, y0, z0);

    // Fit everything into the drawable area
    let all = projected
        .iter()
        .copied()
        .chain(axes.iter().map(|(_, p)| *p))
        .chain(std::iter::once(origin));
    let (mut u_min, mut u_max, mut v_min, mut v_max) =
        (f32::INFINITY, f32::NEG_INFINITY, f32::INFINITY, f32::NEG_INFINITY);
    for (u, v) in all {
        u_min = u_min.min(u);
        u_max = u_max.max(u);
        v_min = v_min.min(v);
        v_max = v_max.max(v);
    }
    let title_height = 30.0;
    let draw_w = config.width - 2.0 * config.padding;
    let draw_h = config.height - 2.0 * config.padding - title_height;
    let scale = (draw_w / (u_max - u_min).max(f32::EPSILON)).min(draw_h / (v_max - v_min).max(f32::EPSILON));
    let to_px = |(u, v): (f32, f32)| {
        (
            config.padding + (u - u_min) * scale,
            config.padding + title_height + (v_max - v) * scale,
        )
    };

    writeln!(svg, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{:.0}" height="{:.0}" viewBox="0 0 {:.0} {:.0}">"#,
        config.width, config.height, config.width, config.height
    )?;
    writeln!(svg, r##"  <rect width="100%" height="100%" fill="#FFFFFF"/>"##)?;
    writeln!(
        svg,
        r#"  <text x="{:.1}" y="{:.1}" font-family="sans-serif" font-size="18" text-anchor="middle">{}</text>"#,
        config.width / 2.0,
        config.padding,
        escape_xml(title)
    )?;

    writeln!(svg, r#"  <g id="axes">"#)?;
    let (ox, oy) = to_px(origin);
    for (label, end) in axes {
        let (ex, ey) = to_px(end);
        writeln!(
            svg,
            r#"    <line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="{}" stroke-width="1"/>"#,
            ox, oy, ex, ey, config.axis_color
        )?;
        writeln!(
            svg,
            r#"    <text x="{:.1}" y="{:.1}" font-family="sans-serif" font-size="12" fill="{}">{}</text>"#,
            ex + 4.0,
            ey - 4.0,
            config.axis_color,
            label
        )?;
    }
    writeln!(svg, "  </g>")?;

    writeln!(svg, r#"  <g id="points" fill="{}">"#, config.point_color)?;
    for p in &projected {
        let (px, py) = to_px(*p);
        writeln!(svg, r#"    <circle cx="{:.1}" cy="{:.1}" r="{}"/>"#, px, py, config.point_radius)?;
    }
    writeln!(svg, "  </g>")?;
    writeln!(svg, "</svg>")
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Renders to SVG in the results directory and pauses for the operator
pub struct SvgPointViewer {
    store: ArtifactStore,
    file_name: String,
    pause: bool,
    open_command: Option<String>,
}

impl SvgPointViewer {
    fn open(&self, command: &str, path: &Path) {
        match Command::new(command).arg(path).spawn() {
            Ok(_) => info!("Opened {} with {}", path.display(), command),
            Err(e) => warn!("Could not launch viewer '{}': {}", command, e),
        }
    }
}

impl PointCloudViewer for SvgPointViewer {
    fn show(
        &self,
        title: &str,
        xs: &[f32],
        ys: &[f32],
        zs: &[f32],
        console: &dyn Console,
    ) -> Result<()> {
        let svg = render_scatter(&ScatterConfig::default(), title, xs, ys, zs);
        let path = self.store.write_bytes(&self.file_name, svg.as_bytes())?;
        info!("Point cloud rendered to {}", path.display());

        if let Some(command) = &self.open_command {
            self.open(command, &path);
        }

        console.status(&format!("Point cloud saved to {}", path.display()));

        if self.pause {
            console.status("Press Enter to continue...");
            let mut line = String::new();
            std::io::stdin()
                .lock()
                .read_line(&mut line)
                .map_err(|e| PreflightError::Io {
                    context: "waiting for operator".to_string(),
                    message: e.to_string(),
                })?;
        }
        Ok(())
    }
}
