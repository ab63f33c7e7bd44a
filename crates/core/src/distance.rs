use crate::instance::{Instance, Point};
use crate::matrix::DenseMatrix;

/// `Nf x Nc` matrix of facility-to-customer Euclidean distances.
pub type DistanceMatrix = DenseMatrix;

impl DistanceMatrix {
    /// Pairwise distances, facilities along rows and customers along columns.
    pub fn between(facilities: &[Point], customers: &[Point]) -> Self {
        DenseMatrix::from_fn(facilities.len(), customers.len(), |i, j| {
            facilities[i].distance_to(&customers[j])
        })
    }

    pub fn for_instance(instance: &Instance) -> Self {
        Self::between(&instance.facilities, &instance.customers)
    }
}
