//! SVG maps of a solved instance.
//!
//! The route map sizes facilities and customers by their supply and demand
//! and draws one labelled arrow per route. The residual map places the same
//! nodes and labels each with what is left after shipping.

use std::io::{self, Write};
use transflow_api::TransportReport;
use transflow_core::instance::{Instance, Point};
use transflow_core::math::{flush_to_zero, Scalar};

use crate::text::format_general;

const SIZE: Scalar = 640.0;
const MARGIN: Scalar = 60.0;
const FACILITY_COLOR: &str = "#d62728";
const CUSTOMER_COLOR: &str = "#1f77b4";

/// Maps instance coordinates onto the square canvas, north up.
struct Canvas {
    min_x: Scalar,
    min_y: Scalar,
    scale: Scalar,
}

impl Canvas {
    fn fit(points: impl Iterator<Item = Point>) -> Self {
        let (mut min_x, mut min_y) = (Scalar::INFINITY, Scalar::INFINITY);
        let (mut max_x, mut max_y) = (Scalar::NEG_INFINITY, Scalar::NEG_INFINITY);
        for p in points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        if !min_x.is_finite() {
            (min_x, min_y, max_x, max_y) = (0.0, 0.0, 1.0, 1.0);
        }
        let span = (max_x - min_x).max(max_y - min_y).max(1.0);
        Self {
            min_x,
            min_y,
            scale: (SIZE - 2.0 * MARGIN) / span,
        }
    }

    fn project(&self, p: Point) -> (Scalar, Scalar) {
        (
            MARGIN + (p.x - self.min_x) * self.scale,
            SIZE - MARGIN - (p.y - self.min_y) * self.scale,
        )
    }
}

fn radius(quantity: Scalar) -> Scalar {
    3.0 + quantity.max(0.0).sqrt() * 2.0
}

fn label(value: Scalar) -> String {
    format_general(flush_to_zero((value * 100.0).round() / 100.0, 1e-9), 6)
}

fn header<W: Write>(out: &mut W, title: &str) -> io::Result<()> {
    writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{SIZE}" height="{SIZE}" viewBox="0 0 {SIZE} {SIZE}">"#
    )?;
    writeln!(out, "  <defs>")?;
    writeln!(
        out,
        r##"    <marker id="arrow" markerWidth="10" markerHeight="7" refX="10" refY="3.5" orient="auto"><path d="M0,0 L10,3.5 L0,7 z" fill="#444"/></marker>"##
    )?;
    writeln!(out, "  </defs>")?;
    writeln!(out, r##"  <rect width="100%" height="100%" fill="#ffffff"/>"##)?;
    writeln!(
        out,
        r#"  <text x="{MARGIN}" y="24" font-family="sans-serif" font-size="14">{title}</text>"#
    )?;
    writeln!(
        out,
        r#"  <text x="{MARGIN}" y="42" font-family="sans-serif" font-size="11"><tspan fill="{FACILITY_COLOR}">&#9679; facility</tspan> <tspan fill="{CUSTOMER_COLOR}">&#9632; customer</tspan> (axes: east / north, km)</text>"#
    )
}

fn write_nodes<W: Write>(
    out: &mut W,
    canvas: &Canvas,
    instance: &Instance,
    sizes: (&[Scalar], &[Scalar]),
    labels: (&[Scalar], &[Scalar]),
) -> io::Result<()> {
    for (i, point) in instance.facilities.iter().enumerate() {
        let (x, y) = canvas.project(*point);
        let r = radius(sizes.0[i]);
        writeln!(
            out,
            r#"  <circle class="facility" cx="{x:.1}" cy="{y:.1}" r="{r:.1}" fill="{FACILITY_COLOR}" fill-opacity="0.7"/>"#
        )?;
        node_label(out, x, y - r - 3.0, &label(labels.0[i]))?;
    }
    for (j, point) in instance.customers.iter().enumerate() {
        let (x, y) = canvas.project(*point);
        let r = radius(sizes.1[j]);
        writeln!(
            out,
            r#"  <rect class="customer" x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{CUSTOMER_COLOR}" fill-opacity="0.7"/>"#,
            x - r,
            y - r,
            2.0 * r,
            2.0 * r
        )?;
        node_label(out, x, y - r - 3.0, &label(labels.1[j]))?;
    }
    Ok(())
}

fn node_label<W: Write>(out: &mut W, x: Scalar, y: Scalar, text: &str) -> io::Result<()> {
    writeln!(
        out,
        r#"  <text x="{x:.1}" y="{y:.1}" text-anchor="middle" font-family="sans-serif" font-size="11">{text}</text>"#
    )
}

/// Route map: node size follows supply and demand, one arrow per route
/// labelled with its rounded quantity.
pub fn write_route_map<W: Write>(
    out: &mut W,
    instance: &Instance,
    report: &TransportReport,
) -> io::Result<()> {
    let canvas = Canvas::fit(instance.facilities.iter().chain(&instance.customers).copied());
    header(out, "Transport routes")?;
    for route in report.routes() {
        let (x1, y1) = canvas.project(instance.facilities[route.facility]);
        let (x2, y2) = canvas.project(instance.customers[route.customer]);
        writeln!(
            out,
            r##"  <line class="route" x1="{x1:.1}" y1="{y1:.1}" x2="{x2:.1}" y2="{y2:.1}" stroke="#444" stroke-width="1.2" marker-end="url(#arrow)"/>"##
        )?;
        node_label(
            out,
            (x1 + x2) / 2.0,
            (y1 + y2) / 2.0 - 4.0,
            &label(route.quantity),
        )?;
    }
    write_nodes(
        out,
        &canvas,
        instance,
        (&instance.supply, &instance.demand),
        (&instance.supply, &instance.demand),
    )?;
    writeln!(out, "</svg>")
}

/// Residual map: every node labelled with the supply or demand left after
/// shipping.
pub fn write_residual_map<W: Write>(
    out: &mut W,
    instance: &Instance,
    report: &TransportReport,
) -> io::Result<()> {
    let canvas = Canvas::fit(instance.facilities.iter().chain(&instance.customers).copied());
    header(out, "Residual supply and demand")?;
    let supply = report.residual_supply();
    let demand = report.residual_demand();
    // uniform node size: only the labels carry information here
    let flat_f = vec![0.0; supply.len()];
    let flat_c = vec![0.0; demand.len()];
    write_nodes(out, &canvas, instance, (&flat_f, &flat_c), (&supply, &demand))?;
    writeln!(out, "</svg>")
}
