use num_traits::{One, Zero};

use crate::{Ring, RingOps};

/// The determinant of a row-major `n × n` matrix over any ring, by cofactor
/// expansion along the first column. Fine for the small matrices this crate
/// feeds it (characteristic polynomials, torsion blocks).
pub fn det<R>(n: usize, a: &[R]) -> R
where R: Ring, for<'x> &'x R: RingOps<R> {
    assert_eq!(a.len(), n * n);

    match n {
        0 => R::one(),
        1 => a[0].clone(),
        _ => {
            let mut res = R::zero();

            for i in 0..n {
                let c = &a[i * n];
                if c.is_zero() {
                    continue
                }

                let minor = (0..n).filter(|&i1| i1 != i).flat_map(|i1|
                    (1..n).map(move |j1| a[i1 * n + j1].clone())
                ).collect::<Vec<_>>();

                let d = c * det(n - 1, &minor);

                if i % 2 == 0 {
                    res += d;
                } else {
                    res -= d;
                }
            }

            res
        }
    }
}
