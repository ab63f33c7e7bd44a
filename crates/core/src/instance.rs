//! Facility/customer instance data.
//!
//! An [`Instance`] carries everything the transport model reads: where the
//! facilities and customers sit, how much each facility ships and how much
//! each customer needs. Instances are plain values; build one, validate it,
//! then hand it to the model by reference.

use crate::math::{totals_match, Scalar};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: Scalar,
    pub y: Scalar,
}

impl Point {
    pub const fn new(x: Scalar, y: Scalar) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> Scalar {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(Scalar, Scalar)> for Point {
    fn from((x, y): (Scalar, Scalar)) -> Self {
        Self::new(x, y)
    }
}

#[derive(Debug, Error)]
pub enum InstanceError {
    #[error("instance has no {what}")]
    Empty { what: &'static str },
    #[error("{what} has {found} entries, expected {expected}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("{what}[{index}] is negative ({value})")]
    NegativeQuantity {
        what: &'static str,
        index: usize,
        value: Scalar,
    },
    #[error("{what}[{index}] is not finite")]
    NonFinite { what: &'static str, index: usize },
    #[error("total supply {supply} does not match total demand {demand}")]
    Unbalanced { supply: Scalar, demand: Scalar },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub facilities: Vec<Point>,
    pub customers: Vec<Point>,
    pub supply: Vec<Scalar>,
    pub demand: Vec<Scalar>,
}

impl Instance {
    pub fn new(
        facilities: Vec<Point>,
        customers: Vec<Point>,
        supply: Vec<Scalar>,
        demand: Vec<Scalar>,
    ) -> Self {
        Self {
            facilities,
            customers,
            supply,
            demand,
        }
    }

    /// Ten factories shipping to eleven warehouses, 63 units in total.
    pub fn demo() -> Self {
        let facilities = [
            (5., 11.),
            (12., 8.),
            (9., 11.),
            (5., 15.),
            (0., 16.),
            (1., 12.),
            (7., 13.),
            (6., 18.),
            (5., 18.),
            (11., 10.),
        ];
        let customers = [
            (14., 18.),
            (4., 9.),
            (17., 0.),
            (13., 9.),
            (9., 7.),
            (1., 0.),
            (17., 8.),
            (13., 19.),
            (15., 10.),
            (8., 7.),
            (3., 6.),
        ];
        Self {
            facilities: facilities.into_iter().map(Point::from).collect(),
            customers: customers.into_iter().map(Point::from).collect(),
            supply: vec![5., 1., 9., 3., 4., 8., 1., 4., 0., 28.],
            demand: vec![9., 2., 0., 4., 9., 2., 7., 7., 9., 8., 6.],
        }
    }

    /// Draws a random instance whose totals balance.
    ///
    /// Coordinates and quantities are integers in `[0, coord_max)` and
    /// `[0, quantity_max)`. The surplus side is topped up on its last node:
    /// extra supply goes to the last customer's demand, extra demand to the
    /// last facility's supply.
    pub fn random<R: Rng>(
        facilities: usize,
        customers: usize,
        options: &GeneratorOptions,
        rng: &mut R,
    ) -> Result<Self, InstanceError> {
        if facilities == 0 {
            return Err(InstanceError::Empty { what: "facilities" });
        }
        if customers == 0 {
            return Err(InstanceError::Empty { what: "customers" });
        }
        let coord_max = options.coord_max.max(1);
        let quantity_max = options.quantity_max.max(1);
        let point = |rng: &mut R| {
            Point::new(
                Scalar::from(rng.gen_range(0..coord_max)),
                Scalar::from(rng.gen_range(0..coord_max)),
            )
        };
        let facility_points: Vec<Point> = (0..facilities).map(|_| point(rng)).collect();
        let customer_points: Vec<Point> = (0..customers).map(|_| point(rng)).collect();
        let mut supply: Vec<Scalar> = (0..facilities)
            .map(|_| Scalar::from(rng.gen_range(0..quantity_max)))
            .collect();
        let mut demand: Vec<Scalar> = (0..customers)
            .map(|_| Scalar::from(rng.gen_range(0..quantity_max)))
            .collect();

        let surplus: Scalar = supply.iter().sum::<Scalar>() - demand.iter().sum::<Scalar>();
        if surplus >= 0.0 {
            demand[customers - 1] += surplus;
        } else {
            supply[facilities - 1] -= surplus;
        }
        debug!(facilities, customers, surplus, "generated random instance");

        Ok(Self {
            facilities: facility_points,
            customers: customer_points,
            supply,
            demand,
        })
    }

    pub fn num_facilities(&self) -> usize {
        self.facilities.len()
    }

    pub fn num_customers(&self) -> usize {
        self.customers.len()
    }

    pub fn total_supply(&self) -> Scalar {
        self.supply.iter().sum()
    }

    pub fn total_demand(&self) -> Scalar {
        self.demand.iter().sum()
    }

    /// Checks sizes, finiteness and signs. Totals are not compared here.
    pub fn validate_shape(&self) -> Result<(), InstanceError> {
        if self.facilities.is_empty() {
            return Err(InstanceError::Empty { what: "facilities" });
        }
        if self.customers.is_empty() {
            return Err(InstanceError::Empty { what: "customers" });
        }
        if self.supply.len() != self.facilities.len() {
            return Err(InstanceError::DimensionMismatch {
                what: "supply",
                expected: self.facilities.len(),
                found: self.supply.len(),
            });
        }
        if self.demand.len() != self.customers.len() {
            return Err(InstanceError::DimensionMismatch {
                what: "demand",
                expected: self.customers.len(),
                found: self.demand.len(),
            });
        }
        check_points("facilities", &self.facilities)?;
        check_points("customers", &self.customers)?;
        check_quantities("supply", &self.supply)?;
        check_quantities("demand", &self.demand)?;
        Ok(())
    }

    pub fn validate_balance(&self, tolerance: Scalar) -> Result<(), InstanceError> {
        let supply = self.total_supply();
        let demand = self.total_demand();
        debug!(supply, demand, "comparing instance totals");
        if totals_match(supply, demand, tolerance) {
            Ok(())
        } else {
            Err(InstanceError::Unbalanced { supply, demand })
        }
    }

    pub fn validate(&self, tolerance: Scalar) -> Result<(), InstanceError> {
        self.validate_shape()?;
        self.validate_balance(tolerance)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorOptions {
    pub coord_max: u32,
    pub quantity_max: u32,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            coord_max: 20,
            quantity_max: 10,
        }
    }
}

fn check_points(what: &'static str, points: &[Point]) -> Result<(), InstanceError> {
    match points.iter().position(|p| !p.is_finite()) {
        Some(index) => Err(InstanceError::NonFinite { what, index }),
        None => Ok(()),
    }
}

fn check_quantities(what: &'static str, values: &[Scalar]) -> Result<(), InstanceError> {
    for (index, &value) in values.iter().enumerate() {
        if !value.is_finite() {
            return Err(InstanceError::NonFinite { what, index });
        }
        if value < 0.0 {
            return Err(InstanceError::NegativeQuantity { what, index, value });
        }
    }
    Ok(())
}
