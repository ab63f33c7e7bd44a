//! Plain-text rendering in the program's stdout layout.
//!
//! Matrices are flattened row-major. Every value is followed by one space,
//! and a line holding a single space is ended before the first value of each
//! row after the first.

use itertools::Itertools;
use std::io::{self, Write};
use transflow_api::TransportReport;
use transflow_core::math::{flush_to_zero, Scalar};
use transflow_core::matrix::DenseMatrix;

/// Magnitudes below this print as `0`. Solved flows are already cleaned to
/// the report's `flow_tolerance`; this only catches rounding leftovers.
pub const DISPLAY_ZERO: Scalar = 1e-9;

/// `%g`-style formatting: `precision` significant digits, trailing zeros
/// removed, scientific notation for exponents below -4 or from `precision` up.
pub fn format_general(value: Scalar, precision: usize) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let precision = precision.max(1);
    let scientific = format!("{:.*e}", precision - 1, value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);
    if exponent < -4 || exponent >= precision as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{sign}{:02}", trim_fraction(mantissa), exponent.abs())
    } else {
        let decimals = (precision as i32 - 1 - exponent).max(0) as usize;
        trim_fraction(&format!("{value:.decimals$}")).to_string()
    }
}

fn trim_fraction(digits: &str) -> &str {
    if digits.contains('.') {
        digits.trim_end_matches('0').trim_end_matches('.')
    } else {
        digits
    }
}

pub fn write_matrix<W: Write>(out: &mut W, matrix: &DenseMatrix) -> io::Result<()> {
    for (k, value) in matrix.as_slice().iter().enumerate() {
        if k > 0 && k % matrix.cols() == 0 {
            writeln!(out, " ")?;
        }
        write!(out, "{} ", format_general(flush_to_zero(*value, DISPLAY_ZERO), 6))?;
    }
    writeln!(out)
}

pub fn write_distance_section<W: Write>(out: &mut W, distances: &DenseMatrix) -> io::Result<()> {
    writeln!(out, "result of distance calculation:")?;
    write_matrix(out, distances)
}

pub fn write_counts<W: Write>(out: &mut W, facilities: usize, customers: usize) -> io::Result<()> {
    writeln!(out, "num of warehouse:{customers}")?;
    writeln!(out, "num of factories:{facilities}")
}

pub fn write_flow_section<W: Write>(out: &mut W, flows: &DenseMatrix) -> io::Result<()> {
    writeln!(out, "result of output:")?;
    write_matrix(out, flows)
}

/// Status, objective and the list of non-zero shipments.
pub fn write_summary<W: Write>(out: &mut W, report: &TransportReport) -> io::Result<()> {
    writeln!(out, "status: {:?}", report.status)?;
    writeln!(out, "objective: {:.6}", report.objective)?;
    let routes = report.routes();
    writeln!(out, "routes: {}", routes.len())?;
    for route in &routes {
        writeln!(
            out,
            "  facility {} -> customer {}: {} (distance {})",
            route.facility,
            route.customer,
            format_general(route.quantity, 6),
            format_general(route.distance, 6)
        )?;
    }
    // each flushed flow entry can move a row or column sum by one tolerance
    let slack = report.flow_tolerance
        * (report.num_facilities().max(report.num_customers()) + 1) as Scalar;
    let leftovers = report
        .residual_supply()
        .iter()
        .chain(report.residual_demand().iter())
        .map(|r| flush_to_zero(*r, slack))
        .filter(|r| *r != 0.0)
        .count();
    if leftovers > 0 {
        writeln!(out, "unbalanced nodes after shipping: {leftovers}")?;
    }
    Ok(())
}

/// One line per row, values joined by single spaces.
pub fn matrix_to_string(matrix: &DenseMatrix) -> String {
    matrix
        .iter_rows()
        .map(|row| row.iter().map(|v| format_general(*v, 6)).join(" "))
        .join("\n")
}
