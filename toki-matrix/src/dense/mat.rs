use std::fmt::{Debug, Display};
use std::ops::{Add, AddAssign, Index, IndexMut, Mul, MulAssign, Neg, Range, Sub, SubAssign};
use auto_impl_ops::auto_ops;
use delegate::delegate;
use nalgebra::DMatrix;
use num_traits::{One, Zero};
use toki::{Ring, RingOps};

pub trait MatTrait {
    fn shape(&self) -> (usize, usize);
    fn nrows(&self) -> usize { self.shape().0 }
    fn ncols(&self) -> usize { self.shape().1 }
    fn is_square(&self) -> bool {
        let (m, n) = self.shape();
        m == n
    }
}

/// A dense matrix over an exact ring, backed by `nalgebra::DMatrix`.
pub struct Mat<R> {
    inner: DMatrix<R>
}

impl<R> Clone for Mat<R>
where R: Ring, for<'x> &'x R: RingOps<R> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<R> PartialEq for Mat<R>
where R: Ring, for<'x> &'x R: RingOps<R> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<R> Eq for Mat<R>
where R: Ring, for<'x> &'x R: RingOps<R> {}

impl<R> MatTrait for Mat<R> {
    fn shape(&self) -> (usize, usize) {
        (self.inner.nrows(), self.inner.ncols())
    }
}

impl<R> Mat<R> {
    pub fn inner(&self) -> &DMatrix<R> {
        &self.inner
    }

    pub fn into_inner(self) -> DMatrix<R> {
        self.inner
    }
}

impl<R> From<DMatrix<R>> for Mat<R> {
    fn from(inner: DMatrix<R>) -> Self {
        Self { inner }
    }
}

impl<R> Mat<R>
where R: Ring, for<'x> &'x R: RingOps<R> {
    // Entries with their positions, column-major as stored.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &R)> {
        let m = self.nrows();
        self.inner.iter().enumerate().map(move |(i, a)|
            (i % m, i / m, a)
        )
    }

    pub fn from_data<I>(shape: (usize, usize), data: I) -> Self
    where I: IntoIterator<Item = R> {
        DMatrix::from_row_iterator(shape.0, shape.1, data).into()
    }

    pub fn from_fn<F>(shape: (usize, usize), f: F) -> Self
    where F: FnMut(usize, usize) -> R {
        DMatrix::from_fn(shape.0, shape.1, f).into()
    }

    pub fn zero(shape: (usize, usize)) -> Self {
        DMatrix::zeros(shape.0, shape.1).into()
    }

    pub fn id(size: usize) -> Self {
        DMatrix::identity(size, size).into()
    }

    pub fn diag<I>(shape: (usize, usize), entries: I) -> Self
    where I: IntoIterator<Item = R> {
        let mut mat = Self::zero(shape);
        for (i, a) in entries.into_iter().enumerate() {
            mat[(i, i)] = a;
        }
        mat
    }

    pub fn is_zero(&self) -> bool {
        self.iter().all(|e| e.2.is_zero())
    }

    pub fn is_id(&self) -> bool {
        self.is_square() && self.iter().all(|(i, j, a)|
            i == j && a.is_one() ||
            i != j && a.is_zero()
        )
    }

    pub fn is_diag(&self) -> bool {
        self.iter().all(|(i, j, a)|
            i == j || a.is_zero()
        )
    }

    pub fn submat(&self, rows: Range<usize>, cols: Range<usize>) -> Mat<R> {
        let (i0, i1) = (rows.start, rows.end);
        let (j0, j1) = (cols.start, cols.end);

        assert!(i0 <= i1 && i1 <= self.nrows());
        assert!(j0 <= j1 && j1 <= self.ncols());

        let view = self.inner.view((i0, j0), (i1 - i0, j1 - j0));
        Self::from(view.clone_owned())
    }

    pub fn submat_rows(&self, rows: Range<usize>) -> Mat<R> {
        let n = self.ncols();
        self.submat(rows, 0..n)
    }

    pub fn submat_cols(&self, cols: Range<usize>) -> Mat<R> {
        let m = self.nrows();
        self.submat(0..m, cols)
    }

    pub fn transpose(&self) -> Mat<R> {
        self.inner.transpose().into()
    }

    /// `[self | other]`.
    pub fn concat(&self, other: &Mat<R>) -> Mat<R> {
        assert_eq!(self.nrows(), other.nrows());

        let (m, n0, n1) = (self.nrows(), self.ncols(), other.ncols());
        Self::from_fn((m, n0 + n1), |i, j|
            if j < n0 {
                self[(i, j)].clone()
            } else {
                other[(i, j - n0)].clone()
            }
        )
    }

    /// `[self; other]`.
    pub fn stack(&self, other: &Mat<R>) -> Mat<R> {
        assert_eq!(self.ncols(), other.ncols());

        let (m0, m1, n) = (self.nrows(), other.nrows(), self.ncols());
        Self::from_fn((m0 + m1, n), |i, j|
            if i < m0 {
                self[(i, j)].clone()
            } else {
                other[(i - m0, j)].clone()
            }
        )
    }

    pub fn col_vec(&self, j: usize) -> Vec<R> {
        (0..self.nrows()).map(|i| self[(i, j)].clone()).collect()
    }

    pub fn mul_vec(&self, v: &[R]) -> Vec<R> {
        assert_eq!(v.len(), self.ncols());

        (0..self.nrows()).map(|i| {
            let mut a = R::zero();
            for (j, x) in v.iter().enumerate() {
                if x.is_zero() || self[(i, j)].is_zero() { continue }
                a += &self[(i, j)] * x;
            }
            a
        }).collect()
    }

    pub fn swap_rows(&mut self, i: usize, j: usize) {
        self.inner.swap_rows(i, j);
    }

    pub fn swap_cols(&mut self, i: usize, j: usize) {
        self.inner.swap_columns(i, j);
    }

    pub fn mul_row(&mut self, i: usize, r: &R) {
        for j in 0..self.ncols() {
            let a = &self.inner[(i, j)] * r;
            self.inner[(i, j)] = a;
        }
    }

    pub fn mul_col(&mut self, j: usize, r: &R) {
        for i in 0..self.nrows() {
            let a = &self.inner[(i, j)] * r;
            self.inner[(i, j)] = a;
        }
    }

    // Multiply [a, b; c, d] from the left onto rows (i, j).
    pub fn left_elementary(&mut self, comps: [&R; 4], i: usize, j: usize) {
        let [a, b, c, d] = comps;

        for l in 0..self.ncols() {
            let x = self.inner[(i, l)].clone();
            let y = self.inner[(j, l)].clone();

            self.inner[(i, l)] = a * &x + b * &y;
            self.inner[(j, l)] = c * &x + d * &y;
        }
    }

    // Multiply [a, c; b, d] from the right onto cols (i, j).
    pub fn right_elementary(&mut self, comps: [&R; 4], i: usize, j: usize) {
        let [a, b, c, d] = comps;

        for l in 0..self.nrows() {
            let x = self.inner[(l, i)].clone();
            let y = self.inner[(l, j)].clone();

            self.inner[(l, i)] = a * &x + b * &y;
            self.inner[(l, j)] = c * &x + d * &y;
        }
    }
}

impl<R> Index<(usize, usize)> for Mat<R>
where R: Ring, for<'x> &'x R: RingOps<R> {
    type Output = R;
    delegate! {
        to self.inner {
            fn index(&self, index: (usize, usize)) -> &R;
        }
    }
}

impl<R> IndexMut<(usize, usize)> for Mat<R>
where R: Ring, for<'x> &'x R: RingOps<R> {
    delegate! {
        to self.inner {
            fn index_mut(&mut self, index: (usize, usize)) -> &mut Self::Output;
        }
    }
}

impl<R> Default for Mat<R>
where R: Ring, for<'x> &'x R: RingOps<R> {
    fn default() -> Self {
        Self::zero((0, 0))
    }
}

impl<R> Display for Mat<R>
where R: Ring, for<'x> &'x R: RingOps<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.inner, f)
    }
}

impl<R> Debug for Mat<R>
where R: Ring, for<'x> &'x R: RingOps<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl<R> Neg for Mat<R>
where R: Ring, for<'x> &'x R: RingOps<R> {
    type Output = Self;
    fn neg(self) -> Self::Output {
        Mat::from(-self.inner)
    }
}

impl<R> Neg for &Mat<R>
where R: Ring, for<'x> &'x R: RingOps<R> {
    type Output = Mat<R>;
    fn neg(self) -> Self::Output {
        Mat::from(-&self.inner)
    }
}

#[auto_ops]
impl<R> AddAssign<&Mat<R>> for Mat<R>
where R: Ring, for<'x> &'x R: RingOps<R> {
    fn add_assign(&mut self, rhs: &Self) {
        assert_eq!(self.shape(), rhs.shape());
        self.inner += &rhs.inner;
    }
}

#[auto_ops]
impl<R> SubAssign<&Mat<R>> for Mat<R>
where R: Ring, for<'x> &'x R: RingOps<R> {
    fn sub_assign(&mut self, rhs: &Self) {
        assert_eq!(self.shape(), rhs.shape());
        self.inner -= &rhs.inner;
    }
}

#[auto_ops]
impl<'a, 'b, R> Mul<&'b Mat<R>> for &'a Mat<R>
where R: Ring, for<'x> &'x R: RingOps<R> {
    type Output = Mat<R>;
    fn mul(self, rhs: &'b Mat<R>) -> Self::Output {
        assert_eq!(self.ncols(), rhs.nrows());
        Mat::from(&self.inner * &rhs.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init() {
        let a = Mat::from_data((2, 3), [1, 2, 3, 4, 5, 6]);
        assert_eq!(a.nrows(), 2);
        assert_eq!(a.ncols(), 3);
        assert_eq!(a[(0, 2)], 3);
        assert_eq!(a[(1, 0)], 4);
    }

    #[test]
    fn eq() {
        let a = Mat::from_data((2, 3), [1, 2, 3, 4, 5, 6]);
        let b = Mat::from_data((2, 3), [1, 2, 0, 4, 5, 6]);
        let c = Mat::from_data((3, 2), [1, 2, 3, 4, 5, 6]);

        assert_eq!(a, a);
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn zero_id_diag() {
        let z: Mat<i64> = Mat::zero((3, 2));
        assert!(z.is_zero());

        let e: Mat<i64> = Mat::id(3);
        assert!(e.is_id());
        assert!(e.is_diag());

        let d = Mat::diag((3, 3), [1, 2, 3]);
        assert!(d.is_diag());
        assert!(!d.is_id());
    }

    #[test]
    fn swap() {
        let mut a = Mat::from_data((3, 3), 1..=9);
        a.swap_rows(0, 1);
        assert_eq!(a, Mat::from_data((3, 3), [4, 5, 6, 1, 2, 3, 7, 8, 9]));

        a.swap_cols(0, 2);
        assert_eq!(a, Mat::from_data((3, 3), [6, 5, 4, 3, 2, 1, 9, 8, 7]));
    }

    #[test]
    fn mul_row_col() {
        let mut a = Mat::from_data((2, 2), [1, 2, 3, 4]);
        a.mul_row(0, &-1);
        assert_eq!(a, Mat::from_data((2, 2), [-1, -2, 3, 4]));

        a.mul_col(1, &3);
        assert_eq!(a, Mat::from_data((2, 2), [-1, -6, 3, 12]));
    }

    #[test]
    fn left_elementary() {
        let mut a = Mat::from_data((3, 3), 1..=9);
        let e = [&3, &2, &4, &3]; // det = 1
        a.left_elementary(e, 0, 1);
        assert_eq!(a, Mat::from_data((3, 3), [11, 16, 21, 16, 23, 30, 7, 8, 9]));
    }

    #[test]
    fn right_elementary() {
        let mut a = Mat::from_data((3, 3), 1..=9);
        let e = [&3, &2, &4, &3]; // det = 1
        a.right_elementary(e, 0, 1);
        assert_eq!(a, Mat::from_data((3, 3), [7, 10, 3, 22, 31, 6, 37, 52, 9]));
    }

    #[test]
    fn add_sub_neg() {
        let a = Mat::from_data((2, 2), [1, 2, 3, 4]);
        let b = Mat::from_data((2, 2), [8, 2, 4, 0]);

        assert_eq!(&a + &b, Mat::from_data((2, 2), [9, 4, 7, 4]));
        assert_eq!(&a - &b, Mat::from_data((2, 2), [-7, 0, -1, 4]));
        assert_eq!(-&a, Mat::from_data((2, 2), [-1, -2, -3, -4]));
    }

    #[test]
    fn mul() {
        let a = Mat::from_data((2, 3), [1, 2, 3, 4, 5, 6]);
        let b = Mat::from_data((3, 2), [1, 2, 1, -1, 0, 2]);
        assert_eq!(&a * &b, Mat::from_data((2, 2), [3, 6, 9, 15]));
    }

    #[test]
    fn submat() {
        let a = Mat::from_data((3, 4), [
            1,  2,  3,  7,
            4,  5,  6,  8,
            9, 10, 11, 12
        ]);
        let b = a.submat(1..3, 2..4);
        assert_eq!(b, Mat::from_data((2, 2), [6, 8, 11, 12]));

        let r = a.submat_rows(0..1);
        assert_eq!(r, Mat::from_data((1, 4), [1, 2, 3, 7]));

        let c = a.submat_cols(3..4);
        assert_eq!(c, Mat::from_data((3, 1), [7, 8, 12]));
    }

    #[test]
    fn concat_stack() {
        let a = Mat::from_data((2, 2), [1, 2, 3, 4]);
        let b = Mat::from_data((2, 1), [5, 6]);
        assert_eq!(a.concat(&b), Mat::from_data((2, 3), [1, 2, 5, 3, 4, 6]));

        let c = Mat::from_data((1, 2), [7, 8]);
        assert_eq!(a.stack(&c), Mat::from_data((3, 2), [1, 2, 3, 4, 7, 8]));
    }

    #[test]
    fn transpose() {
        let a = Mat::from_data((2, 3), [1, 2, 3, 4, 5, 6]);
        assert_eq!(a.transpose(), Mat::from_data((3, 2), [1, 4, 2, 5, 3, 6]));
    }

    #[test]
    fn mul_vec() {
        let a = Mat::from_data((2, 3), [1, 2, 3, 4, 5, 6]);
        let v = vec![1, 0, -1];
        assert_eq!(a.mul_vec(&v), vec![-2, -2]);
    }

    #[test]
    fn col_vec() {
        let a = Mat::from_data((2, 3), [1, 2, 3, 4, 5, 6]);
        assert_eq!(a.col_vec(1), vec![2, 5]);
    }

    #[test]
    fn empty_shapes() {
        let a: Mat<i64> = Mat::zero((0, 3));
        let b: Mat<i64> = Mat::zero((3, 0));
        let c = &a * &b;
        assert_eq!(c.shape(), (0, 0));

        let v: Vec<i64> = vec![1, 2, 3];
        assert_eq!(a.mul_vec(&v), Vec::<i64>::new());
    }
}
