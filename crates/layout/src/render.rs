use plotters::prelude::*;
use std::path::Path;
use tracing::info;

use crate::error::{LayoutError, Result};
use crate::{GraphLayout, NodeRole};

#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub width: u32,
    pub height: u32,
    pub node_radius: i32,
    /// Draw node texts. Needs a system font.
    pub labels: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 1600,
            height: 1200,
            node_radius: 10,
            labels: true,
        }
    }
}

fn color((r, g, b): (u8, u8, u8)) -> RGBColor {
    RGBColor(r, g, b)
}

/// Draw a laid-out graph to a PNG file.
pub fn render_png(layout: &GraphLayout, path: &Path, options: &RenderOptions) -> Result<()> {
    draw(layout, path, options).map_err(LayoutError::Render)?;
    info!(path = %path.display(), nodes = layout.nodes.len(), "Saved graph image");
    Ok(())
}

fn draw(layout: &GraphLayout, path: &Path, options: &RenderOptions) -> std::result::Result<(), String> {
    let root = BitMapBackend::new(path, (options.width, options.height)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| e.to_string())?;

    let mut chart = ChartBuilder::on(&root)
        .margin(40)
        .build_cartesian_2d(-1.15f64..1.15f64, -1.15f64..1.15f64)
        .map_err(|e| e.to_string())?;

    let position = |id: &str| {
        layout
            .nodes
            .iter()
            .find(|n| n.id == id)
            .map(|n| (n.position.x, n.position.y))
    };

    chart
        .draw_series(layout.edges.iter().filter_map(|edge| {
            let from = position(&edge.source)?;
            let to = position(&edge.target)?;
            Some(PathElement::new(vec![from, to], BLACK.mix(0.35)))
        }))
        .map_err(|e| e.to_string())?;

    for role in [NodeRole::Predicate, NodeRole::Subject, NodeRole::Object, NodeRole::Shared] {
        let radius = if role == NodeRole::Predicate {
            options.node_radius + 4
        } else {
            options.node_radius
        };
        let fill = color(role.fill());
        let border = color(role.border());
        let nodes = layout.nodes.iter().filter(|n| n.role == role);

        chart
            .draw_series(nodes.clone().map(|n| {
                Circle::new((n.position.x, n.position.y), radius, fill.filled())
            }))
            .map_err(|e| e.to_string())?;
        chart
            .draw_series(nodes.clone().map(|n| {
                Circle::new((n.position.x, n.position.y), radius, border.stroke_width(2))
            }))
            .map_err(|e| e.to_string())?;

        if options.labels {
            chart
                .draw_series(nodes.map(|n| {
                    Text::new(
                        n.id.clone(),
                        (n.position.x, n.position.y),
                        ("sans-serif", 14).into_font(),
                    )
                }))
                .map_err(|e| e.to_string())?;
        }
    }

    root.present().map_err(|e| e.to_string())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LayoutConfig, layout};
    use extract::Triple;

    #[test]
    fn writes_png_without_labels() {
        let triples = vec![
            Triple::new("WD-40", "is a", "Product").unwrap(),
            Triple::new("WD-40", "includes", "LVP").unwrap(),
        ];
        let graph = layout(&triples, &LayoutConfig::default()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.png");

        let options = RenderOptions {
            width: 200,
            height: 150,
            labels: false,
            ..RenderOptions::default()
        };
        render_png(&graph, &path, &options).unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }
}
