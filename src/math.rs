use ndarray::{Array, Array1, Array2, LinalgScalar};
use num_traits::Float;

/// Generate the Vandermonde matrix of `degree` for observations `x`
///
/// The Vandermonde matrix is a (n x degree + 1) matrix. Each row of the matrix is a geometric
/// progression for an individual observation `x` from power `0` to `degree` inclusive. For
/// `degree = 1` this is the design matrix of a straight-line least squares fit: a column of ones
/// followed by the observations.
///
/// # Examples
///
/// ```
/// use bca_assay::math::vandermonde;
/// use ndarray::arr2;
///
/// let observations: Vec<f64> = vec![2., 3.];
/// let vander = vandermonde(&observations, 2);
///
/// let expected = arr2(&[[1., 2., 4.], [1., 3., 9.]]);
/// assert_eq!(vander, expected);
/// ```
pub fn vandermonde<T: Float + LinalgScalar>(x: &[T], degree: usize) -> Array2<T> {
    Array::from_shape_fn((x.len(), degree + 1), |(row, power)| {
        (0..power).fold(T::one(), |acc, _| acc * x[row])
    })
}

/// Arithmetic mean of a non-empty vector, `None` when empty
pub fn mean<T: Float + LinalgScalar>(x: &Array1<T>) -> Option<T> {
    T::from(x.len())
        .filter(|n| !n.is_zero())
        .map(|n| x.sum() / n)
}

#[cfg(test)]
mod tests {
    use super::{mean, vandermonde};

    use ndarray::arr1;
    use ndarray_rand::rand::Rng;
    use ndarray_rand::rand::SeedableRng;
    use rand_isaac::isaac64::Isaac64Rng;

    #[test]
    fn vandermonde_matrices_are_generated_correctly() {
        let seed = 40;
        let mut rng = Isaac64Rng::seed_from_u64(seed);
        let num_data_points = 10;
        let degree = 5;

        let data_points = (0..num_data_points)
            .map(|_| rng.gen())
            .collect::<Vec<f64>>();

        let vandermonde = vandermonde(&data_points, degree);

        for (ii, data_point) in data_points.iter().enumerate() {
            for jj in 0..=degree {
                let expected = data_point.powi(i32::try_from(jj).unwrap());
                let actual = vandermonde[[ii, jj]];
                approx::assert_relative_eq!(expected, actual, max_relative = 1e-12);
            }
        }
    }

    #[test]
    fn linear_design_matrix_has_a_column_of_ones() {
        let design = vandermonde(&[0.1, 0.2, 0.4], 1);
        assert_eq!(design.shape(), &[3, 2]);
        assert_eq!(design.column(0).to_vec(), vec![1.0, 1.0, 1.0]);
        assert_eq!(design.column(1).to_vec(), vec![0.1, 0.2, 0.4]);
    }

    #[test]
    fn mean_of_empty_vector_is_none() {
        assert_eq!(mean::<f64>(&arr1(&[])), None);
        approx::assert_relative_eq!(mean(&arr1(&[1.0, 2.0, 6.0])).unwrap(), 3.0);
    }
}
