use serde::{Deserialize, Serialize};
use transflow_core::distance::DistanceMatrix;
use transflow_core::math::Scalar;
use transflow_core::matrix::DenseMatrix;
use transflow_core::solution::Status;
use transflow_core::stats::SolveStats;

/// `Nf x Nc` matrix of shipped quantities.
pub type FlowMatrix = DenseMatrix;

/// One facility-to-customer shipment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub facility: usize,
    pub customer: usize,
    pub quantity: Scalar,
    pub distance: Scalar,
}

impl Route {
    pub fn cost(&self) -> Scalar {
        self.quantity * self.distance
    }
}

/// Everything known about a solved transport model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportReport {
    pub distances: DistanceMatrix,
    pub flows: FlowMatrix,
    pub supply: Vec<Scalar>,
    pub demand: Vec<Scalar>,
    pub objective: Scalar,
    pub status: Status,
    pub iterations: usize,
    /// Largest absolute violation of a balance row.
    pub balance_residual: Scalar,
    /// Absolute tolerance the flows were accepted under; smaller entries are
    /// exact zeros.
    pub flow_tolerance: Scalar,
    pub stats: SolveStats,
}

impl TransportReport {
    pub fn num_facilities(&self) -> usize {
        self.flows.rows()
    }

    pub fn num_customers(&self) -> usize {
        self.flows.cols()
    }

    pub fn shipped_from(&self) -> Vec<Scalar> {
        self.flows.row_sums()
    }

    pub fn received_by(&self) -> Vec<Scalar> {
        self.flows.col_sums()
    }

    /// Supply left at each facility after shipping.
    pub fn residual_supply(&self) -> Vec<Scalar> {
        subtract(&self.supply, &self.shipped_from())
    }

    /// Demand left unmet at each customer after shipping.
    pub fn residual_demand(&self) -> Vec<Scalar> {
        subtract(&self.demand, &self.received_by())
    }

    /// Cost recomputed from the flow matrix.
    pub fn total_cost(&self) -> Scalar {
        self.flows.weighted_sum(&self.distances)
    }

    /// Shipments whose quantity is non-zero once rounded to two decimals,
    /// ordered by facility then customer.
    pub fn routes(&self) -> Vec<Route> {
        let mut routes = Vec::new();
        for i in 0..self.num_facilities() {
            for j in 0..self.num_customers() {
                let quantity = (self.flows.get(i, j) * 100.0).round() / 100.0;
                if quantity != 0.0 {
                    routes.push(Route {
                        facility: i,
                        customer: j,
                        quantity,
                        distance: self.distances.get(i, j),
                    });
                }
            }
        }
        routes
    }
}

fn subtract(lhs: &[Scalar], rhs: &[Scalar]) -> Vec<Scalar> {
    lhs.iter().zip(rhs).map(|(a, b)| a - b).collect()
}
