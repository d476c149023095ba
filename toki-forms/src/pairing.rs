use std::fmt::{Debug, Display};
use itertools::Itertools;
use log::debug;
use num_traits::{One, Zero};
use toki::{EucRing, IntOps, Integer, LPoly, MIdx, SparseGrid};
use toki::algo::det;
use toki_matrix::dense::Mat;

use crate::{MagHom, MarkedAbelianGroup};

/// A bilinear form `μ : A × B → C` between marked abelian groups, given by
/// a rank-3 tensor in chain coordinates of `(A, B, C)`. The unreduced
/// tensor is stored verbatim; the induced tensor in SNF coordinates is
/// computed once at construction, its entries canonical modulo the `k`-th
/// range invariant factor on torsion range indices.
#[derive(Clone)]
pub struct BilinearForm<I>
where I: Integer, for<'x> &'x I: IntOps<I> {
    lhs: MarkedAbelianGroup<I>,
    rhs: MarkedAbelianGroup<I>,
    range: MarkedAbelianGroup<I>,
    unred: SparseGrid<I>,
    red: SparseGrid<I>,
}

impl<I> BilinearForm<I>
where I: Integer, for<'x> &'x I: IntOps<I> {
    pub fn new(
        lhs: MarkedAbelianGroup<I>,
        rhs: MarkedAbelianGroup<I>,
        range: MarkedAbelianGroup<I>,
        unred: SparseGrid<I>
    ) -> Self {
        assert_eq!(unred.dim(), 3);
        for (idx, _) in unred.iter() {
            assert!(idx[0] < lhs.rank_cc() && idx[1] < rhs.rank_cc() && idx[2] < range.rank_cc(),
                "tensor index out of range");
        }

        let (ga, gb) = (lhs.min_gens(), rhs.min_gens());
        let reps_a = (0..ga).map(|i| lhs.cc_rep(i)).collect_vec();
        let reps_b = (0..gb).map(|j| rhs.cc_rep(j)).collect_vec();

        let mut red = SparseGrid::new(3);

        for (i, ra) in reps_a.iter().enumerate() {
            for (j, rb) in reps_b.iter().enumerate() {
                let mut w = vec![I::zero(); range.rank_cc()];
                for (idx, v) in unred.iter() {
                    let (ii, jj, kk) = (idx[0], idx[1], idx[2]);
                    if ra[ii].is_zero() || rb[jj].is_zero() { continue }
                    w[kk] += &(&ra[ii] * &rb[jj]) * v;
                }

                assert!(range.is_cycle(&w), "pairing does not land in cycles");

                for (k, val) in range.snf_rep(&w).into_iter().enumerate() {
                    red.set([i, j, k], val);
                }
            }
        }

        debug!("bilinear form ({}) x ({}) -> {}: {} reduced entries",
            lhs, rhs, range, red.nterms());

        Self { lhs, rhs, range, unred, red }
    }

    pub fn lhs(&self) -> &MarkedAbelianGroup<I> {
        &self.lhs
    }

    pub fn rhs(&self) -> &MarkedAbelianGroup<I> {
        &self.rhs
    }

    pub fn range(&self) -> &MarkedAbelianGroup<I> {
        &self.range
    }

    pub fn unreduced(&self) -> &SparseGrid<I> {
        &self.unred
    }

    pub fn reduced(&self) -> &SparseGrid<I> {
        &self.red
    }

    /// The reduced entry `μ[i, j, k]` in SNF coordinates.
    pub fn reduced_entry(&self, i: usize, j: usize, k: usize) -> I {
        self.red.get(&MIdx::from([i, j, k])).cloned().unwrap_or_else(I::zero)
    }

    /// Evaluates the pairing on chain coordinates. Wrongly sized input
    /// yields an empty vector.
    pub fn eval(&self, a: &[I], b: &[I]) -> Vec<I> {
        if a.len() != self.lhs.rank_cc() || b.len() != self.rhs.rank_cc() {
            return vec![]
        }

        let mut w = vec![I::zero(); self.range.rank_cc()];
        for (idx, v) in self.unred.iter() {
            let (i, j, k) = (idx[0], idx[1], idx[2]);
            if a[i].is_zero() || b[j].is_zero() { continue }
            w[k] += &(&a[i] * &b[j]) * v;
        }
        w
    }

    /// The subgroup of the range generated by all `μ(e_i, e_j)`.
    pub fn image(&self) -> MarkedAbelianGroup<I> {
        let (ga, gb, gc) = (self.lhs.min_gens(), self.rhs.min_gens(), self.range.min_gens());

        let vals = Mat::from_fn((gc, ga * gb), |k, c| {
            let (i, j) = (c / gb, c % gb);
            self.reduced_entry(i, j, k)
        });

        let lam = self.range.tor_relations();
        let gens = vals.concat(&lam);
        MarkedAbelianGroup::quotient_lattice(&gens, &lam)
    }

    fn cmp_mirror<F>(&self, rel: F) -> bool
    where F: Fn(&I, &I, usize) -> bool {
        if self.lhs != self.rhs {
            return false
        }

        let zero = I::zero();
        self.red.iter().all(|(idx, v)| {
            let (i, j, k) = (idx[0], idx[1], idx[2]);
            let w = self.red.get(&MIdx::from([j, i, k])).unwrap_or(&zero);
            rel(v, w, k)
        })
    }

    pub fn is_symmetric(&self) -> bool {
        // entries are canonical, so plain equality works on both the
        // torsion and the free range indices.
        self.cmp_mirror(|v, w, _| v == w)
    }

    pub fn is_anti_symmetric(&self) -> bool {
        let kc = self.range.num_invariant_factors();
        self.cmp_mirror(|v, w, k| {
            if k < kc {
                (v + w).rem_euc(self.range.invariant_factor(k)).is_zero()
            } else {
                (v + w).is_zero()
            }
        })
    }

    /// The free-part matrix of a symmetric form with range `Z`.
    fn free_block(&self) -> Mat<I> {
        let (r, ka) = (self.lhs.rank(), self.lhs.num_invariant_factors());
        Mat::from_fn((r, r), |a, b| self.reduced_entry(ka + a, ka + b, 0))
    }

    /// The signature of a symmetric form `Z^r × Z^r → Z`, read off as the
    /// Descartes sign-change number of `det(t·I - M)`: for a symmetric
    /// integer matrix all eigenvalues are real, so the count equals
    /// `#positive - #negative` eigenvalues.
    pub fn signature(&self) -> isize {
        assert!(self.lhs == self.rhs, "signature requires equal sides");
        assert!(self.is_symmetric(), "signature requires a symmetric form");
        assert!(self.range.rank() == 1 && self.range.is_free(), "signature requires range Z");

        let r = self.lhs.rank();
        let m = self.free_block();

        let chi_mat = (0..r * r).map(|c| {
            let (a, b) = (c / r, c % r);
            let mut f = LPoly::<'t', I>::from_term(0, -m[(a, b)].clone());
            if a == b {
                f += LPoly::<'t', I>::variable();
            }
            f
        }).collect_vec();

        let chi = det::<LPoly<'t', I>>(r, &chi_mat);
        debug!("char poly: {chi}");

        chi.descartes_no()
    }

    /// `(odd, definiteness)`: whether some diagonal entry of the free
    /// block is odd, and `±1` when the signature is `±rank`, else `0`.
    pub fn z_form_type(&self) -> (bool, i8) {
        let r = self.lhs.rank();
        let m = self.free_block();
        let two = I::one() + I::one();

        let odd = (0..r).any(|a| !m[(a, a)].rem_euc(&two).is_zero());

        let sig = self.signature();
        let def = if r > 0 && sig == r as isize {
            1
        } else if r > 0 && sig == -(r as isize) {
            -1
        } else {
            0
        };

        (odd, def)
    }

    /// Precomposition on the left with `f : A' → A`.
    pub fn left_compose(&self, f: &MagHom<I>) -> Self {
        assert!(f.dst() == &self.lhs, "left composition with mismatched range");

        let mut grid = SparseGrid::new(3);
        for (idx, v) in self.unred.iter() {
            let (ii, j, k) = (idx[0], idx[1], idx[2]);
            for i2 in 0..f.src().rank_cc() {
                let c = &f.mat()[(ii, i2)];
                if c.is_zero() { continue }
                grid.add([i2, j, k], c * v);
            }
        }

        Self::new(f.src().clone(), self.rhs.clone(), self.range.clone(), grid)
    }

    /// Precomposition on the right with `f : B' → B`.
    pub fn right_compose(&self, f: &MagHom<I>) -> Self {
        assert!(f.dst() == &self.rhs, "right composition with mismatched range");

        let mut grid = SparseGrid::new(3);
        for (idx, v) in self.unred.iter() {
            let (i, jj, k) = (idx[0], idx[1], idx[2]);
            for j2 in 0..f.src().rank_cc() {
                let c = &f.mat()[(jj, j2)];
                if c.is_zero() { continue }
                grid.add([i, j2, k], c * v);
            }
        }

        Self::new(self.lhs.clone(), f.src().clone(), self.range.clone(), grid)
    }

    /// Postcomposition with `g : C → C'`.
    pub fn post_compose(&self, g: &MagHom<I>) -> Self {
        assert!(g.src() == &self.range, "post composition with mismatched domain");

        let mut grid = SparseGrid::new(3);
        for (idx, v) in self.unred.iter() {
            let (i, j, kk) = (idx[0], idx[1], idx[2]);
            for k2 in 0..g.dst().rank_cc() {
                let c = &g.mat()[(k2, kk)];
                if c.is_zero() { continue }
                grid.add([i, j, k2], c * v);
            }
        }

        Self::new(self.lhs.clone(), self.rhs.clone(), g.dst().clone(), grid)
    }

    // The order of the generator pair (x, k) in Hom(X, C), and the divisor
    // turning a reduced entry into coordinates of that generator: a value
    // c mod d_k stands for the homomorphism e_x ↦ c·e_k, well-defined iff
    // d_x·c ≡ 0 (mod d_k), i.e. iff (d_k / gcd(d_x, d_k)) divides c.
    fn hom_order(dx: Option<&I>, dk: Option<&I>) -> I {
        match (dx, dk) {
            (_, Some(dk)) => {
                let dx = dx.cloned().unwrap_or_else(I::zero);
                EucRing::gcd(&dx, dk)
            },
            (Some(_), None) => I::one(),
            (None, None) => I::zero()
        }
    }

    fn adjoint_hom(
        arg: &MarkedAbelianGroup<I>,     // the side being dualized against
        other: &MarkedAbelianGroup<I>,   // the remaining side
        range: &MarkedAbelianGroup<I>,
        entry: impl Fn(usize, usize, usize) -> I  // (arg gen, other gen, range gen)
    ) -> MagHom<I> {
        let (go, gc) = (other.min_gens(), range.min_gens());
        let (ko, kc) = (other.num_invariant_factors(), range.num_invariant_factors());

        let ord = |x: usize, k: usize| {
            let dx = (x < ko).then(|| &other.tors()[x]);
            let dk = (k < kc).then(|| &range.tors()[k]);
            Self::hom_order(dx, dk)
        };

        let hom_grp = MarkedAbelianGroup::from_presentation(
            Mat::from_fn((go * gc, go * gc), |r, c|
                if r == c { ord(r / gc, r % gc) } else { I::zero() }
            )
        );

        let f = Mat::from_fn((go * gc, arg.min_gens()), |row, i| {
            let (x, k) = (row / gc, row % gc);
            let c = entry(i, x, k);

            if k < kc {
                let o = ord(x, k);
                let div = range.invariant_factor(k) / &o;
                let (q, r) = c.div_rem_euc(&div);
                assert!(r.is_zero(), "pairing does not descend to the quotient");
                q
            } else if x < ko {
                assert!(c.is_zero(), "pairing does not descend to the quotient");
                I::zero()
            } else {
                c
            }
        });

        MagHom::new(arg.snf_presentation(), hom_grp, f)
    }

    /// The adjoint `A → Hom(B, C)`, expressed on the canonical SNF models.
    pub fn left_adjoint(&self) -> MagHom<I> {
        Self::adjoint_hom(&self.lhs, &self.rhs, &self.range,
            |i, j, k| self.reduced_entry(i, j, k))
    }

    /// The adjoint `B → Hom(A, C)`, expressed on the canonical SNF models.
    pub fn right_adjoint(&self) -> MagHom<I> {
        Self::adjoint_hom(&self.rhs, &self.lhs, &self.range,
            |j, i, k| self.reduced_entry(i, j, k))
    }
}

impl<I> Display for BilinearForm<I>
where I: Integer, for<'x> &'x I: IntOps<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}) x ({}) -> {}", self.lhs, self.rhs, self.range)
    }
}

impl<I> Debug for BilinearForm<I>
where I: Integer, for<'x> &'x I: IntOps<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {:?}", self, self.red)
    }
}
