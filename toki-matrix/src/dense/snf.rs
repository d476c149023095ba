use std::cmp::min;
use log::{debug, trace};
use num_traits::{One, Zero};
use toki::{EucRing, EucRingOps, Ring};
use crate::dense::*;

/// Which of the transforms `[p, pinv, q, qinv]` to track, for
/// `p * a * q = d` and `pinv * d * qinv = a`.
pub type SnfFlags = [bool; 4];

pub fn snf<R>(target: &Mat<R>, flags: SnfFlags) -> Snf<R>
where R: EucRing, for<'x> &'x R: EucRingOps<R> {
    snf_in_place(target.clone(), flags)
}

pub fn snf_in_place<R>(target: Mat<R>, flags: SnfFlags) -> Snf<R>
where R: EucRing, for<'x> &'x R: EucRingOps<R> {
    debug!("start snf: {:?}, flags: {:?}.", target.shape(), flags);
    trace!("{}", target);

    let mut calc = Reducer::new(target, flags);
    calc.process();

    debug!("snf done.");
    trace!("{}", calc.d);

    calc.result()
}

#[derive(Clone, Debug)]
pub struct Snf<R>
where R: EucRing, for<'x> &'x R: EucRingOps<R> {
    d: Mat<R>,
    p:    Option<Mat<R>>,
    pinv: Option<Mat<R>>,
    q:    Option<Mat<R>>,
    qinv: Option<Mat<R>>
}

impl<R> Snf<R>
where R: EucRing, for<'x> &'x R: EucRingOps<R> {
    pub fn d(&self) -> &Mat<R> {
        &self.d
    }

    pub fn p(&self) -> Option<&Mat<R>> {
        self.p.as_ref()
    }

    pub fn pinv(&self) -> Option<&Mat<R>> {
        self.pinv.as_ref()
    }

    pub fn q(&self) -> Option<&Mat<R>> {
        self.q.as_ref()
    }

    pub fn qinv(&self) -> Option<&Mat<R>> {
        self.qinv.as_ref()
    }

    pub fn destruct(self) -> (Mat<R>, [Option<Mat<R>>; 4]) {
        (self.d, [self.p, self.pinv, self.q, self.qinv])
    }

    pub fn rank(&self) -> usize {
        let n = min(self.d.nrows(), self.d.ncols());
        (0..n).find(|&i| self.d[(i, i)].is_zero()).unwrap_or(n)
    }

    pub fn factors(&self) -> Vec<&R> {
        let n = min(self.d.nrows(), self.d.ncols());
        (0..n).map_while(|i| {
            let a = &self.d[(i, i)];
            if a.is_zero() { None } else { Some(a) }
        }).collect()
    }
}

struct Reducer<R>
where R: EucRing, for<'x> &'x R: EucRingOps<R> {
    d: Mat<R>,
    p:    Option<Mat<R>>,
    pinv: Option<Mat<R>>,
    q:    Option<Mat<R>>,
    qinv: Option<Mat<R>>
}

impl<R> Reducer<R>
where R: EucRing, for<'x> &'x R: EucRingOps<R> {
    fn new(d: Mat<R>, flags: SnfFlags) -> Self {
        let id_opt = |size, flag| {
            if flag { Some(Mat::id(size)) } else { None }
        };

        let (m, n) = d.shape();
        let p    = id_opt(m, flags[0]);
        let pinv = id_opt(m, flags[1]);
        let q    = id_opt(n, flags[2]);
        let qinv = id_opt(n, flags[3]);

        Reducer { d, p, pinv, q, qinv }
    }

    fn result(self) -> Snf<R> {
        Snf {
            d: self.d,
            p: self.p,
            pinv: self.pinv,
            q: self.q,
            qinv: self.qinv
        }
    }

    fn process(&mut self) {
        if self.d.is_zero() {
            return
        }

        self.eliminate();
        self.normalize_diag();
    }

    // Bring the matrix to diagonal shape, walking columns left to right.
    // Processed rows/columns keep a single nonzero entry on the diagonal.
    fn eliminate(&mut self) {
        let (m, n) = self.d.shape();
        let mut t = 0;

        for j in 0..n {
            if t >= m { break }
            if self.pivot_step(t, j) {
                t += 1;
            }
        }
    }

    fn pivot_step(&mut self, t: usize, j: usize) -> bool {
        let Some(i_p) = self.select_pivot(t, j) else {
            return false
        };

        trace!("pivot: ({i_p}, {j}) -> ({t}, {t})");

        if i_p > t {
            self.swap_rows(t, i_p);
        }
        if j > t {
            self.swap_cols(t, j);
        }

        let u = self.d[(t, t)].normalizing_unit();
        if !u.is_one() {
            self.mul_col(t, &u);
        }

        self.isolate(t);

        true
    }

    // The row below `t` with a nonzero entry in column `j` and the fewest
    // nonzero entries overall.
    fn select_pivot(&self, t: usize, j: usize) -> Option<usize> {
        (t..self.d.nrows())
            .filter(|&i| !self.d[(i, j)].is_zero())
            .min_by_key(|&i| self.row_nnz(i))
    }

    fn row_nnz(&self, i: usize) -> usize {
        (0..self.d.ncols()).filter(|&j| !self.d[(i, j)].is_zero()).count()
    }

    fn col_nnz(&self, j: usize) -> usize {
        (0..self.d.nrows()).filter(|&i| !self.d[(i, j)].is_zero()).count()
    }

    // Clear row `t` and column `t`, alternating until both are single.
    // Each pass strictly divides the pivot, so this terminates.
    fn isolate(&mut self, t: usize) {
        assert!(!self.d[(t, t)].is_zero());

        while self.row_nnz(t) > 1 || self.col_nnz(t) > 1 {
            let modified = self.clear_col(t) | self.clear_row(t);
            if !modified {
                panic!("no progress while isolating pivot ({t}, {t})");
            }
        }
    }

    fn clear_row(&mut self, t: usize) -> bool {
        let mut modified = false;

        for j1 in 0..self.d.ncols() {
            if j1 == t || self.d[(t, j1)].is_zero() { continue }

            // d = sx + ty, a = x/d, b = y/d:
            // [x y][s -b] = [d 0]
            //      [t  a]

            let x = &self.d[(t, t )];
            let y = &self.d[(t, j1)];

            let (d, s, u) = Self::gcdx(x, y);
            let (a, b) = (x / &d, y / &d);

            self.right_elementary([&s, &u, &-b, &a], t, j1);
            modified = true
        }

        modified
    }

    fn clear_col(&mut self, t: usize) -> bool {
        let mut modified = false;

        for i1 in 0..self.d.nrows() {
            if i1 == t || self.d[(i1, t)].is_zero() { continue }

            // d = sx + ty, a = x/d, b = y/d:
            // [ s t][x] = [d]
            // [-b a][y]   [0]

            let x = &self.d[(t,  t)];
            let y = &self.d[(i1, t)];

            let (d, s, u) = Self::gcdx(x, y);
            let (a, b) = (x / &d, y / &d);

            self.left_elementary([&s, &u, &-b, &a], t, i1);
            modified = true
        }

        modified
    }

    // gcdx, preferring the trivial combination when x already divides y.
    fn gcdx(x: &R, y: &R) -> (R, R, R) {
        let (d, s, t) = EucRing::gcdx(x, y);

        let a = x / &d;
        if a.is_unit() {
            (d, a, R::zero())
        } else {
            (d, s, t)
        }
    }

    // Sort the diagonal into a divisibility chain d_1 | d_2 | ..., then
    // normalize units.
    fn normalize_diag(&mut self) {
        debug_assert!(self.d.is_diag());

        let n = min(self.d.nrows(), self.d.ncols());
        let r = (0..n).find(|&i| self.d[(i, i)].is_zero()).unwrap_or(n);

        if r == 0 {
            return
        }

        'sweep: loop {
            for i in 0..r - 1 {
                if !self.chain_step(i) {
                    continue 'sweep
                }
            }
            break
        }

        for i in 0..r {
            let u = self.d[(i, i)].normalizing_unit();
            if !u.is_one() {
                self.mul_row(i, &u);
            }
        }
    }

    // Returns true when d[i,i] | d[i+1,i+1] already holds.
    fn chain_step(&mut self, i: usize) -> bool {
        let x = &self.d[(i, i)];
        let y = &self.d[(i + 1, i + 1)];

        assert!(!x.is_zero());
        assert!(!y.is_zero());

        if x.divides(y) {
            return true
        }

        if y.divides(x) {
            self.swap_rows(i, i + 1);
            self.swap_cols(i, i + 1);
            return false
        }

        // sx + ty = d, a = x/d, b = y/d:
        //
        // [1   1 ][x   ][s  -b] = [d      ]
        // [-tb sa][   y][t   a]   [   xy/d]

        let (d, s, t) = Self::gcdx(x, y);
        let (a, b) = (x / &d, y / &d);
        let (tb, sa) = (&t * &b, &s * &a);

        self.left_elementary([&R::one(), &R::one(), &-tb, &sa], i, i + 1);
        self.right_elementary([&s, &t, &-b, &a], i, i + 1);

        false
    }

    fn swap_rows(&mut self, i: usize, j: usize) {
        self.d.swap_rows(i, j);
        if let Some(p) = self.p.as_mut() {
            p.swap_rows(i, j)
        }
        if let Some(pinv) = self.pinv.as_mut() {
            pinv.swap_cols(i, j)
        }

        trace!("swap-rows: ({i}, {j})\n{}", self.d);
    }

    fn swap_cols(&mut self, i: usize, j: usize) {
        self.d.swap_cols(i, j);
        if let Some(q) = self.q.as_mut() {
            q.swap_cols(i, j)
        }
        if let Some(qinv) = self.qinv.as_mut() {
            qinv.swap_rows(i, j)
        }

        trace!("swap-cols: ({i}, {j})\n{}", self.d);
    }

    fn mul_row(&mut self, i: usize, u: &R) {
        self.d.mul_row(i, u);
        if let Some(p) = self.p.as_mut() {
            p.mul_row(i, u)
        }
        if let Some(pinv) = self.pinv.as_mut() {
            let uinv = u.inv().expect("unit");
            pinv.mul_col(i, &uinv)
        }

        trace!("mul-row: {i} by {u}\n{}", self.d);
    }

    fn mul_col(&mut self, j: usize, u: &R) {
        self.d.mul_col(j, u);
        if let Some(q) = self.q.as_mut() {
            q.mul_col(j, u)
        }
        if let Some(qinv) = self.qinv.as_mut() {
            let uinv = u.inv().expect("unit");
            qinv.mul_row(j, &uinv)
        }

        trace!("mul-col: {j} by {u}\n{}", self.d);
    }

    // Multiply [a, b; c, d] from the left, assuming det = 1.
    fn left_elementary(&mut self, comps: [&R; 4], i: usize, j: usize) {
        let [a, b, c, d] = comps;
        debug_assert!((a * d - b * c).is_one());

        self.d.left_elementary(comps, i, j);
        if let Some(p) = self.p.as_mut() {
            p.left_elementary(comps, i, j)
        }
        if let Some(pinv) = self.pinv.as_mut() {
            let inv = [d, &-c, &-b, a];
            pinv.right_elementary(inv, i, j)
        }

        trace!("left-elem: [{a}, {b}; {c}, {d}] on rows ({i}, {j})\n{}", self.d);
    }

    // Multiply [a, c; b, d] from the right, assuming det = 1.
    fn right_elementary(&mut self, comps: [&R; 4], i: usize, j: usize) {
        let [a, b, c, d] = comps;
        debug_assert!((a * d - b * c).is_one());

        self.d.right_elementary(comps, i, j);
        if let Some(q) = self.q.as_mut() {
            q.right_elementary(comps, i, j)
        }
        if let Some(qinv) = self.qinv.as_mut() {
            let inv = [d, &-c, &-b, a];
            qinv.left_elementary(inv, i, j)
        }

        trace!("right-elem: [{a}, {b}; {c}, {d}] on cols ({i}, {j})\n{}", self.d);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn assert_trans<R>(a: &Mat<R>, s: &Snf<R>)
    where R: EucRing, for<'x> &'x R: EucRingOps<R> {
        let d = s.d();
        let (p, pinv) = (s.p().unwrap(), s.pinv().unwrap());
        let (q, qinv) = (s.q().unwrap(), s.qinv().unwrap());

        assert_eq!(&(p * a) * q, *d);
        assert_eq!(&(pinv * d) * qinv, *a);
        assert!((p * pinv).is_id());
        assert!((q * qinv).is_id());
    }

    #[test]
    fn zero() {
        let a: Mat<i64> = Mat::zero((2, 3));
        let s = snf(&a, [true; 4]);

        assert!(s.d().is_zero());
        assert_eq!(s.rank(), 0);
        assert!(s.factors().is_empty());
        assert_trans(&a, &s);
    }

    #[test]
    fn diag_3x3() {
        let a = Mat::from_data((3, 3), [
            1, 2, 3,
            4, 5, 6,
            7, 8, 9
        ]);
        let s = snf(&a, [true; 4]);

        assert_eq!(*s.d(), Mat::diag((3, 3), [1, 3, 0]));
        assert_eq!(s.rank(), 2);
        assert_eq!(s.factors(), vec![&1, &3]);
        assert_trans(&a, &s);
    }

    #[test]
    fn rect_6x9() {
        let a = Mat::from_data((6, 9), [
            1, 0, 1, 0, 0, 1, 1, 0, 1,
            0, 1, 3, 1, 0, 1, 0, 2, 0,
            0, 0, 1, 1, 0, 0, 0, 5, 1,
            0, 1, 1, 0, 3, 0, 0, 0, 0,
            0, 1, 0, 1, 0, 0, 1, 0, 1,
            1, 0, 2, 0, 1, 1, 0, 1, 1
        ]);
        let s = snf(&a, [true; 4]);

        assert_eq!(*s.d(), Mat::diag((6, 9), [1, 1, 1, 1, 1, 1]));
        assert_eq!(s.rank(), 6);
        assert_trans(&a, &s);
    }

    #[test]
    fn invariant_factors_5x5() {
        let a: Mat<i64> = Mat::from_data((5, 5), [
            -20, -7, -27,  2, 29,
             17,  8,  14, -4, -10,
             13,  8,  10, -4, -6,
             -9, -2, -14,  0, 16,
              5,  0,   5, -1, -4
        ]);
        let s = snf(&a, [true; 4]);

        assert_eq!(*s.d(), Mat::diag((5, 5), [1, 1, 1, 2, 60]));
        assert_trans(&a, &s);
    }

    #[test]
    fn torsion_2x2() {
        let a = Mat::from_data((2, 2), [
            2, 0,
            0, 4
        ]);
        let s = snf(&a, [true; 4]);

        assert_eq!(*s.d(), Mat::diag((2, 2), [2, 4]));
        assert_trans(&a, &s);
    }

    #[test]
    fn divisibility_chain() {
        let a = Mat::diag((4, 4), [4, 6, -2, 1]);
        let s = snf(&a, [true; 4]);

        let d = s.d();
        assert!(d.is_diag());

        let fs = s.factors();
        assert_eq!(fs.len(), 4);
        for i in 0..fs.len() - 1 {
            assert!(fs[i].divides(fs[i + 1]));
            assert!(*fs[i] > 0);
        }

        assert_trans(&a, &s);
    }

    #[test]
    fn no_trans() {
        let a = Mat::from_data((2, 2), [2, 1, 0, 2]);
        let s = snf(&a, [false; 4]);

        assert_eq!(*s.d(), Mat::diag((2, 2), [1, 4]));
        assert!(s.p().is_none());
        assert!(s.pinv().is_none());
        assert!(s.q().is_none());
        assert!(s.qinv().is_none());
    }

    #[test]
    fn rand_5x4() {
        let mut rng = rand::thread_rng();

        for _ in 0..20 {
            let a: Mat<i64> = Mat::from_fn((5, 4), |_, _| rng.gen_range(-4..5));
            let s = snf(&a, [true; 4]);

            let d = s.d();
            assert!(d.is_diag());

            let fs = s.factors();
            for i in 0..fs.len().saturating_sub(1) {
                assert!(fs[i].divides(fs[i + 1]));
            }

            assert_trans(&a, &s);
        }
    }

    #[test]
    fn bigint() {
        use num_bigint::BigInt;

        let a: Mat<BigInt> = Mat::from_data((3, 3), [
            2, 4, 4,
            -6, 6, 12,
            10, 4, 16
        ].map(BigInt::from));
        let s = snf(&a, [true; 4]);

        assert_eq!(*s.d(), Mat::diag((3, 3), [2, 2, 156].map(BigInt::from)));
        assert_trans(&a, &s);
    }
}
