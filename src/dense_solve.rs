use crate::{PoissonError, Real, Result};
use na::{DMatrix, DVector};

/// Solves the dense system `L x = v` for the basis-weight vector.
///
/// The assembled matrix carries no exploitable structure (it is dense and
/// not symmetric in general), so this is a plain LU factorization with
/// partial pivoting. Fails with [`PoissonError::SingularSystem`] when the
/// system is zero-sized or the factorization cannot back-substitute.
pub fn solve_dense(lhs: DMatrix<Real>, rhs: DVector<Real>) -> Result<DVector<Real>> {
    assert_eq!(lhs.nrows(), lhs.ncols(), "The system matrix must be square.");
    assert_eq!(
        lhs.nrows(),
        rhs.len(),
        "Exactly one rhs entry per matrix row must be provided."
    );

    if lhs.nrows() == 0 {
        return Err(PoissonError::SingularSystem);
    }

    lhs.lu().solve(&rhs).ok_or(PoissonError::SingularSystem)
}
