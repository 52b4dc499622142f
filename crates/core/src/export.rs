use crate::config::ChartConfig;
use crate::error::{Error, Result};
use crate::model::*;
use crate::render::{label_text, leaf_color};
use crate::treemap::Treemap;

pub fn to_csv(tree: &Tree, treemap: &Treemap, mut w: impl std::io::Write) -> csv::Result<()> {
    let mut writer = csv::Writer::from_writer(&mut w);
    writer.write_record([
        "name", "code", "group", "weight", "value", "area", "site_x", "site_y",
    ])?;
    for id in tree.leaves() {
        let n = tree.get(id);
        let group = n.parent.map(|p| tree.get(p).name.clone()).unwrap_or_default();
        let (area, site_x, site_y) = match treemap.cell(id) {
            Some(c) => (
                format!("{:.2}", c.polygon.area()),
                format!("{:.2}", c.site.x),
                format!("{:.2}", c.site.y),
            ),
            None => Default::default(),
        };
        writer.write_record([
            n.name.clone(),
            n.code.clone().unwrap_or_default(),
            group,
            n.weight.to_string(),
            n.value.to_string(),
            area,
            site_x,
            site_y,
        ])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn to_json(tree: &Tree, treemap: &Treemap) -> serde_json::Value {
    serde_json::json!({
        "root": tree.root.0,
        "boundary": treemap.boundary.points.iter().map(|p| [p.x, p.y]).collect::<Vec<_>>(),
        "nodes": tree.nodes.iter().map(|n| {
            let cell = treemap.cell(n.id);
            serde_json::json!({
                "id": n.id.0,
                "parent": n.parent.as_ref().map(|p| p.0),
                "name": n.name,
                "code": n.code,
                "color": tree.inherited_color(n.id),
                "weight": n.weight,
                "value": n.value,
                "depth": n.depth,
                "children": n.children.iter().map(|c| c.0).collect::<Vec<_>>(),
                "polygon": cell.map(|c| c.polygon.points.iter().map(|p| [p.x, p.y]).collect::<Vec<_>>()),
                "site": cell.map(|c| [c.site.x, c.site.y]),
            })
        }).collect::<Vec<_>>()
    })
}

/// A4 landscape page with the title and the filled leaf cells.
pub fn to_pdf(tree: &Tree, treemap: &Treemap, config: &ChartConfig, out: &std::path::Path) -> Result<()> {
    use printpdf::path::{PaintMode, WindingOrder};
    use printpdf::{BuiltinFont, Color, Mm, PdfDocument, Rgb};

    let pdf_err = |e: printpdf::Error| Error::Export(e.to_string());
    let (page_w, page_h) = (297.0_f32, 210.0_f32);
    let side = 170.0_f32;
    let scale = f64::from(side) / (2.0 * config.treemap_radius);
    let (left, bottom) = ((page_w - side) / 2.0, 12.0_f32);
    let to_mm = |p: crate::geometry::Point| {
        (
            Mm(left + (p.x * scale) as f32),
            Mm(bottom + side - (p.y * scale) as f32),
        )
    };

    let (doc, page1, layer1) = PdfDocument::new(&config.title, Mm(page_w), Mm(page_h), "Treemap");
    let layer = doc.get_page(page1).get_layer(layer1);
    let font = doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(pdf_err)?;
    layer.use_text(&config.title, 14.0, Mm(15.0), Mm(page_h - 12.0), &font);

    layer.set_outline_color(Color::Rgb(Rgb::new(1.0, 1.0, 1.0, None)));
    layer.set_outline_thickness(0.6);
    for id in tree.leaves() {
        let Some(cell) = treemap.cell(id).filter(|c| c.polygon.len() >= 3) else {
            continue;
        };
        let (r, g, b) = parse_hex_color(leaf_color(tree, id)).unwrap_or((0.8, 0.8, 0.8));
        layer.set_fill_color(Color::Rgb(Rgb::new(r, g, b, None)));
        let ring = cell
            .polygon
            .points
            .iter()
            .map(|p| {
                let (x, y) = to_mm(*p);
                (printpdf::Point::new(x, y), false)
            })
            .collect();
        layer.add_polygon(printpdf::Polygon {
            rings: vec![ring],
            mode: PaintMode::FillStroke,
            winding_order: WindingOrder::NonZero,
        });
    }

    layer.set_fill_color(Color::Rgb(Rgb::new(1.0, 1.0, 1.0, None)));
    for id in tree.leaves() {
        let Some(cell) = treemap.cell(id) else { continue };
        let node = tree.get(id);
        // px → pt at the page scale
        let size = (config.font_scale.for_weight(node.weight) * scale * 2.83).max(4.0);
        let (x, y) = to_mm(cell.site);
        layer.use_text(label_text(node, config), size as f32, x, y, &font);
    }

    let file = std::fs::File::create(out)?;
    let mut buf = std::io::BufWriter::new(file);
    doc.save(&mut buf).map_err(pdf_err)?;
    Ok(())
}

/// `#rgb` or `#rrggbb` to unit floats.
pub fn parse_hex_color(s: &str) -> Option<(f32, f32, f32)> {
    let hex = s.trim().strip_prefix('#')?;
    let channel = |h: &str| u8::from_str_radix(h, 16).ok().map(|v| v as f32 / 255.0);
    match hex.len() {
        3 => {
            let mut it = hex.chars().map(|c| channel(&format!("{c}{c}")));
            Some((it.next()??, it.next()??, it.next()??))
        }
        6 => Some((channel(hex.get(0..2)?)?, channel(hex.get(2..4)?)?, channel(hex.get(4..6)?)?)),
        _ => None,
    }
}
