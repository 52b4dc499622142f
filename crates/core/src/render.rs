use std::io::Write;
use std::path::Path;

use crate::config::ChartConfig;
use crate::human::{human_percent, human_weight};
use crate::model::{NodeId, Tree, TreeNode};
use crate::treemap::Treemap;

const FALLBACK_COLOR: &str = "#cccccc";

const STYLE: &str = "\
#title{font-size:24px;font-weight:700;fill:#333}\
.world{fill:none;stroke:#777;stroke-width:2}\
.cell{stroke:#fff;stroke-width:1.5}\
.label{text-anchor:middle;fill:#fff;pointer-events:none}\
.label .name{font-weight:700}\
.label .value{font-size:60%}\
.hoverer{fill:transparent;stroke:none}\
.hoverer:hover{fill:#000;fill-opacity:0.15}\
.tiny{fill:#555}";

/// Text drawn on a leaf: the short code for light leaves, the full name otherwise.
pub fn label_text<'a>(node: &'a TreeNode, config: &ChartConfig) -> &'a str {
    if node.weight < config.label_threshold {
        node.code.as_deref().unwrap_or(&node.name)
    } else {
        &node.name
    }
}

/// Percentage shown under the name, only for leaves above the threshold.
pub fn value_text(node: &TreeNode, config: &ChartConfig) -> Option<String> {
    (node.weight > config.label_threshold).then(|| human_percent(node.weight))
}

pub fn tooltip_text(node: &TreeNode) -> String {
    format!("{}\n{}", node.name, human_percent(node.value))
}

/// Fill of a leaf: the color of its group.
pub fn leaf_color<'a>(tree: &'a Tree, id: NodeId) -> &'a str {
    tree.get(id)
        .parent
        .and_then(|p| tree.inherited_color(p))
        .or_else(|| tree.get(id).color.as_deref())
        .unwrap_or(FALLBACK_COLOR)
}

pub fn render_svg(tree: &Tree, treemap: &Treemap, config: &ChartConfig) -> String {
    let mut svg = String::with_capacity(16 * 1024);
    let width = config.svg_width;
    let height = config.svg_height;
    let radius = config.treemap_radius;
    let center = config.center();
    let shift = format!("translate({},{})", human_weight(-radius), human_weight(-radius));
    let leaves = tree.leaves();

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!("<style>{STYLE}</style>"));
    svg.push_str(&format!(
        "<g class=\"drawingArea\" transform=\"translate({},{})\">",
        config.margin.left, config.margin.top
    ));

    svg.push_str(&format!(
        "<g class=\"treemap-container\" transform=\"translate({},{})\">",
        human_weight(center.x),
        human_weight(center.y)
    ));
    svg.push_str(&format!(
        "<path class=\"world\" transform=\"{shift}\" d=\"{}\"/>",
        treemap.boundary.to_path_data()
    ));

    svg.push_str(&format!("<g class=\"cells\" transform=\"{shift}\">"));
    for &id in &leaves {
        let Some(cell) = treemap.cell(id).filter(|c| !c.polygon.is_empty()) else {
            continue;
        };
        svg.push_str(&format!(
            "<path class=\"cell\" d=\"{}\" style=\"fill:{}\"/>",
            cell.polygon.to_path_data(),
            escape_xml(leaf_color(tree, id))
        ));
    }
    svg.push_str("</g>");

    svg.push_str(&format!("<g class=\"labels\" transform=\"{shift}\">"));
    for &id in &leaves {
        let Some(cell) = treemap.cell(id).filter(|c| !c.polygon.is_empty()) else {
            continue;
        };
        let node = tree.get(id);
        let font_size = config.font_scale.for_weight(node.weight);
        svg.push_str(&format!(
            "<g class=\"label\" transform=\"translate({:.2},{:.2})\" style=\"font-size:{}px\">",
            cell.site.x,
            cell.site.y,
            human_weight(font_size)
        ));
        svg.push_str(&format!(
            "<text class=\"name\">{}</text>",
            escape_xml(label_text(node, config))
        ));
        if let Some(value) = value_text(node, config) {
            svg.push_str(&format!("<text class=\"value\" dy=\"1.2em\">{value}</text>"));
        }
        svg.push_str("</g>");
    }
    svg.push_str("</g>");

    svg.push_str(&format!("<g class=\"hoverers\" transform=\"{shift}\">"));
    for &id in &leaves {
        let Some(cell) = treemap.cell(id).filter(|c| !c.polygon.is_empty()) else {
            continue;
        };
        svg.push_str(&format!(
            "<path class=\"hoverer\" d=\"{}\"><title>{}</title></path>",
            cell.polygon.to_path_data(),
            escape_xml(&tooltip_text(tree.get(id)))
        ));
    }
    svg.push_str("</g>");
    svg.push_str("</g>");

    svg.push_str(&format!(
        "<text id=\"title\" transform=\"translate({},{})\" text-anchor=\"middle\">{}</text>",
        human_weight(config.width() / 2.0),
        human_weight(config.title_y),
        escape_xml(&config.title)
    ));

    svg.push_str(&legend_svg(tree, config));
    svg.push_str("</g></svg>");
    svg
}

fn legend_svg(tree: &Tree, config: &ChartConfig) -> String {
    let origin = config.legend_origin();
    let h = config.legend_height;
    let color_width = config.legend_color_width();
    let mut out = format!(
        "<g class=\"legend\" transform=\"translate({},{})\">",
        human_weight(origin.x),
        human_weight(origin.y)
    );
    for (i, group) in tree.top_level().enumerate() {
        let color = tree.inherited_color(group.id).unwrap_or(FALLBACK_COLOR);
        out.push_str(&format!(
            "<g class=\"legend\" transform=\"translate({},0)\">",
            human_weight(i as f64 * (color_width + config.inter_legend))
        ));
        out.push_str(&format!(
            "<rect class=\"legend-color\" y=\"{}\" width=\"{}\" height=\"{}\" style=\"fill:{}\"/>",
            human_weight(-h),
            human_weight(color_width),
            human_weight(h),
            escape_xml(color)
        ));
        out.push_str(&format!(
            "<text class=\"tiny\" transform=\"translate({},{})\" text-anchor=\"middle\" style=\"font-size:{}px;font-weight:700\">{}</text>",
            human_weight(color_width / 2.0),
            human_weight(-h - 3.0),
            human_weight(h - 4.0),
            escape_xml(&group.name)
        ));
        out.push_str("</g>");
    }
    out.push_str("</g>");
    out
}

pub fn write_svg(svg: &str, output: Option<&Path>) -> std::io::Result<()> {
    match output {
        Some(path) => std::fs::write(path, svg),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(svg.as_bytes())?;
            stdout.flush()
        }
    }
}

pub fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TreemapConfig;
    use crate::geometry::circling_polygon;
    use crate::hierarchy;
    use crate::model::DatasetNode;
    use crate::treemap::{Partitioner, VoronoiTreemap};

    fn chart() -> (Tree, Treemap) {
        let tree = hierarchy::build(&DatasetNode::group(
            "Root",
            None,
            vec![
                DatasetNode::group(
                    "Europe",
                    Some("#aaa"),
                    vec![
                        DatasetNode::leaf("France", "FR", 5.0),
                        DatasetNode::leaf("Andorra", "AD", 0.3),
                    ],
                ),
                DatasetNode::group(
                    "Americas",
                    Some("#b0c"),
                    vec![DatasetNode::leaf("Trinidad & Tobago", "TT", 2.5)],
                ),
            ],
        ))
        .unwrap();
        let boundary = circling_polygon(500.0, 60).unwrap();
        let map = VoronoiTreemap::new(TreemapConfig::default())
            .partition(&tree, &boundary)
            .unwrap();
        (tree, map)
    }

    fn leaf<'a>(tree: &'a Tree, name: &str) -> &'a TreeNode {
        tree.nodes.iter().find(|n| n.name == name).unwrap()
    }

    #[test]
    fn light_leaf_shows_code_without_value() {
        let (tree, _) = chart();
        let config = ChartConfig::default();
        let andorra = leaf(&tree, "Andorra");
        assert_eq!(label_text(andorra, &config), "AD");
        assert_eq!(value_text(andorra, &config), None);
    }

    #[test]
    fn heavy_leaf_shows_name_and_percentage() {
        let (tree, _) = chart();
        let config = ChartConfig::default();
        let france = leaf(&tree, "France");
        assert_eq!(label_text(france, &config), "France");
        assert_eq!(value_text(france, &config).as_deref(), Some("5%"));
        assert_eq!(tooltip_text(france), "France\n5%");
    }

    #[test]
    fn threshold_weight_uses_the_name_but_no_value() {
        let config = ChartConfig::default();
        let mut node = TreeNode {
            id: NodeId(0),
            parent: None,
            name: "Edge".into(),
            code: None,
            color: None,
            weight: 0.5,
            value: 0.5,
            depth: 0,
            children: vec![],
        };
        assert_eq!(label_text(&node, &config), "Edge");
        assert_eq!(value_text(&node, &config), None);
        node.weight = 0.1;
        assert_eq!(label_text(&node, &config), "Edge");
    }

    #[test]
    fn leaves_take_their_group_color() {
        let (tree, _) = chart();
        assert_eq!(leaf_color(&tree, leaf(&tree, "France").id), "#aaa");
        assert_eq!(leaf_color(&tree, leaf(&tree, "Trinidad & Tobago").id), "#b0c");
    }

    #[test]
    fn svg_contains_every_layer() {
        let (tree, map) = chart();
        let svg = render_svg(&tree, &map, &ChartConfig::default());
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert_eq!(svg.matches("class=\"cell\"").count(), 3);
        assert_eq!(svg.matches("class=\"hoverer\"").count(), 3);
        assert_eq!(svg.matches("class=\"label\"").count(), 3);
        assert_eq!(svg.matches("class=\"value\"").count(), 2);
        assert_eq!(svg.matches("class=\"legend-color\"").count(), 2);
        assert!(svg.contains("class=\"world\""));
        assert!(svg.contains(">Share of papers by country</text>"));
        assert!(svg.contains("translate(154,0)"));
        assert!(svg.contains("Trinidad &amp; Tobago"));
        assert!(!svg.contains("Trinidad & Tobago"));
    }

    #[test]
    fn label_font_size_follows_the_scale() {
        let (tree, map) = chart();
        let svg = render_svg(&tree, &map, &ChartConfig::default());
        // 2.5² = 6.25 → 15 + 25 · 6.25/40
        assert!(svg.contains("font-size:18.91px"));
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_xml("<a href='x'>&\"</a>"), "&lt;a href=&apos;x&apos;&gt;&amp;&quot;&lt;/a&gt;");
    }
}
