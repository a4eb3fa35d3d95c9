use na::{allocator::Allocator, DefaultAllocator, Dim, Matrix, MatrixMN, RealField, SquareMatrix, Vector};
use na::storage::{Storage, StorageMut};
use na::constraint::{DimEq, ShapeConstraint};
use nalgebra as na;

/// Computes the quadratic form `mat = alpha * lhs * diagonal(mid) * lhs.transpose() + beta * mat`.
///
/// `mid` is a vector representing a diagonal matrix, accumulated as rank 1 updates.
pub fn quadform_tr<N: RealField, D1, S, R3, C3, S3, D4, S4>(
    mat: &mut SquareMatrix<N, D1, S>,
    alpha: N,
    lhs: &Matrix<N, R3, C3, S3>,
    mid: &Vector<N, D4, S4>,
    beta: N,
) where
    D1: Dim,
    S: StorageMut<N, D1, D1>,
    R3: Dim,
    C3: Dim,
    D4: Dim,
    S3: Storage<N, R3, C3>,
    S4: Storage<N, D4>,
    ShapeConstraint: DimEq<D1, R3> + DimEq<C3, D4>,
{
    mat.ger(alpha * mid[0], &lhs.column(0), &lhs.column(0), beta);

    for j in 1..mid.nrows() {
        mat.ger(alpha * mid[j], &lhs.column(j), &lhs.column(j), N::one());
    }
}

pub fn as_zeros<N: RealField, R: Dim, C: Dim>(shape: (R, C)) -> MatrixMN<N, R, C>
where
    DefaultAllocator: Allocator<N, R, C>,
{
    MatrixMN::zeros_generic(shape.0, shape.1)
}

/**
 * Checks a reciprocal condition number is > 0
 * IEC 559 NaN values are never true
 */
pub fn check_positive<'a, N: RealField>(rcond: N, message: &'a str) -> Result<N, &'a str> {
    if rcond > N::zero() {
        Result::Ok(rcond)
    } else {
        Result::Err(message)
    }
}

/**
 * Checks a reciprocal condition number is >= 0
 * IEC 559 NaN values are never true
 */
pub fn check_non_negativ<'a, N: RealField>(rcond: N, message: &'a str) -> Result<N, &'a str> {
    if rcond >= N::zero() {
        Result::Ok(rcond)
    } else {
        Result::Err(message)
    }
}
