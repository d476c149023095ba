use std::fmt::{Debug, Display};
use itertools::Itertools;
use log::debug;
use num_traits::Zero;
use toki::{ExtInt, IntOps, Integer, Ring};
use toki::util::format::superscript;
use toki_matrix::dense::{snf, Mat, MatTrait, Snf};

/// A finitely generated abelian group presented as the homology
/// `H = ker(M) / im(N)` of a two-stage chain complex
/// `Z^p --N--> Z^n --M--> Z^l` with `M·N = 0`.
///
/// All Smith normal forms are computed once at construction. Elements are
/// handled in three coordinate systems: chain coordinates (full length-`n`
/// vectors), cycle coordinates (with respect to a fixed basis of `ker(M)`),
/// and SNF coordinates. SNF coordinates are torsion-first: the leading `k`
/// entries are taken modulo the invariant factors `d_1 | d_2 | … | d_k`
/// (each `d_i > 1`), the remaining `r` entries span the free part.
#[derive(Clone)]
pub struct MarkedAbelianGroup<I>
where I: Integer, for<'x> &'x I: IntOps<I> {
    m: Mat<I>,       // M : Z^n -> Z^l
    n: Mat<I>,       // N : Z^p -> Z^n
    rank: usize,
    tors: Vec<I>,
    ker: Mat<I>,     // n × dim ker(M), a basis of the cycle lattice
    gens_cc: Mat<I>, // n × (k + r), chain representatives of SNF generators
    to_snf: Mat<I>,  // (k + r) × n, cycle -> SNF coordinates
    bnd: Snf<I>,     // SNF of N, inverted by write_as_boundary
}

impl<I> MarkedAbelianGroup<I>
where I: Integer, for<'x> &'x I: IntOps<I> {
    pub fn new(m: Mat<I>, n: Mat<I>) -> Self {
        assert_eq!(m.ncols(), n.nrows());
        assert!((&m * &n).is_zero(), "M·N ≠ 0: not a chain complex");

        let dim = m.ncols();

        // A basis of ker(M) from the column transform of snf(M):
        // M·Q has its first rank(M) columns nonzero, the rest vanish.
        let sm = snf(&m, [false, false, true, true]);
        let rm = sm.rank();
        let kd = dim - rm;

        let ker = sm.q().unwrap().submat_cols(rm..dim);
        let ker_proj = sm.qinv().unwrap().submat_rows(rm..dim);

        // N expressed in cycle coordinates, then its SNF. Unit factors
        // kill generators, the rest are the invariant factors.
        let n_ker = &ker_proj * &n;
        let sn = snf(&n_ker, [true, true, false, false]);
        let rn = sn.rank();

        let tors = sn.factors().into_iter()
            .filter(|a| !a.is_unit())
            .cloned()
            .collect_vec();

        let k = tors.len();
        let u = rn - k;
        let rank = kd - rn;

        // Generator representatives (torsion first), and the projection
        // taking a cycle to its SNF coordinates.
        let pinv = sn.pinv().unwrap();
        let gens_ker = pinv.submat_cols(u..rn).concat(&pinv.submat_cols(rn..kd));
        let gens_cc = &ker * &gens_ker;

        let p2 = sn.p().unwrap();
        let sel = p2.submat_rows(u..rn).stack(&p2.submat_rows(rn..kd));
        let to_snf = &sel * &ker_proj;

        let bnd = snf(&n, [true, false, true, false]);

        debug!("marked abelian group: rank = {rank}, tors = {tors:?}");

        Self { m, n, rank, tors, ker, gens_cc, to_snf, bnd }
    }

    /// The free group `Z^r` with its identity presentation.
    pub fn free(rank: usize) -> Self {
        Self::new(Mat::zero((0, rank)), Mat::zero((rank, 0)))
    }

    /// The group presented by a single relation matrix, the free part
    /// implicit: `Z^n / im(N)`.
    pub fn from_presentation(n: Mat<I>) -> Self {
        let dim = n.nrows();
        Self::new(Mat::zero((0, dim)), n)
    }

    pub fn m(&self) -> &Mat<I> {
        &self.m
    }

    pub fn n(&self) -> &Mat<I> {
        &self.n
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn tors(&self) -> &[I] {
        &self.tors
    }

    pub fn num_invariant_factors(&self) -> usize {
        self.tors.len()
    }

    pub fn invariant_factor(&self, i: usize) -> &I {
        &self.tors[i]
    }

    pub fn min_gens(&self) -> usize {
        self.rank + self.tors.len()
    }

    pub fn rank_cc(&self) -> usize {
        self.m.ncols()
    }

    pub fn is_trivial(&self) -> bool {
        self.rank == 0 && self.tors.is_empty()
    }

    pub fn is_free(&self) -> bool {
        self.tors.is_empty()
    }

    /// The order of the `i`-th SNF generator: `d_i` on the torsion part,
    /// `∞` on the free part.
    pub fn gen_order(&self, i: usize) -> ExtInt<I> {
        assert!(i < self.min_gens());
        if i < self.tors.len() {
            ExtInt::from(self.tors[i].clone())
        } else {
            ExtInt::Inf
        }
    }

    pub fn is_isomorphic_to(&self, other: &Self) -> bool {
        self.rank == other.rank && self.tors == other.tors
    }

    /// A fixed basis of the cycle lattice `ker(M)`.
    pub fn cycle_basis(&self) -> &Mat<I> {
        &self.ker
    }

    /// The chain representative of the `i`-th SNF generator.
    pub fn cc_rep(&self, i: usize) -> Vec<I> {
        assert!(i < self.min_gens());
        self.gens_cc.col_vec(i)
    }

    /// The chain representative of the `i`-th torsion generator, in
    /// invariant factor order.
    pub fn torsion_rep(&self, i: usize) -> Vec<I> {
        assert!(i < self.tors.len());
        self.cc_rep(i)
    }

    pub fn is_cycle(&self, v: &[I]) -> bool {
        v.len() == self.rank_cc() && self.m.mul_vec(v).iter().all(|a| a.is_zero())
    }

    pub fn boundary_map(&self, v: &[I]) -> Vec<I> {
        assert_eq!(v.len(), self.rank_cc());
        self.m.mul_vec(v)
    }

    /// Reduces a cycle to its SNF coordinates, torsion entries canonical in
    /// `[0, d_i)`.
    pub fn snf_rep(&self, v: &[I]) -> Vec<I> {
        assert!(self.is_cycle(v), "not a cycle");

        let mut u = self.to_snf.mul_vec(v);
        for (i, d) in self.tors.iter().enumerate() {
            u[i] = u[i].rem_euc(d);
        }
        u
    }

    /// Solves `N·w = v`, if `v` is a boundary.
    pub fn write_as_boundary(&self, v: &[I]) -> Option<Vec<I>> {
        assert_eq!(v.len(), self.rank_cc());

        let y = self.bnd.p().unwrap().mul_vec(v);
        let rk = self.bnd.rank();

        let mut z = vec![I::zero(); self.n.ncols()];
        for (i, yi) in y.iter().enumerate() {
            if i < rk {
                let d = &self.bnd.d()[(i, i)];
                let (q, r) = yi.div_rem_euc(d);
                if !r.is_zero() {
                    return None
                }
                z[i] = q;
            } else if !yi.is_zero() {
                return None
            }
        }

        Some(self.bnd.q().unwrap().mul_vec(&z))
    }

    pub fn is_boundary(&self, v: &[I]) -> bool {
        self.write_as_boundary(v).is_some()
    }

    /// The relation lattice `⟨d_i e_i⟩` in SNF coordinates, as a
    /// `min_gens × k` diagonal matrix.
    pub(crate) fn tor_relations(&self) -> Mat<I> {
        let (g, k) = (self.min_gens(), self.tors.len());
        Mat::from_fn((g, k), |i, j|
            if i == j { self.tors[j].clone() } else { I::zero() }
        )
    }

    /// The canonical diagonal model `Z^{k+r} / ⟨d_i e_i⟩` of this group,
    /// whose chain coordinates are the SNF coordinates of `self`.
    pub fn snf_presentation(&self) -> Self {
        Self::from_presentation(self.tor_relations())
    }

    /// The quotient `⟨gens⟩ / ⟨rels⟩` of two lattices in the same ambient
    /// `Z^g`, with `rels ⊆ span(gens)`.
    pub(crate) fn quotient_lattice(gens: &Mat<I>, rels: &Mat<I>) -> Self {
        assert_eq!(gens.nrows(), rels.nrows());

        let s = snf(gens, [true, false, false, false]);
        let rk = s.rank();
        let p = s.p().unwrap();

        // span(gens) has basis {δ_i · (P⁻¹ e_i)}; write each relation in it.
        let cols = (0..rels.ncols()).map(|j| {
            let y = p.mul_vec(&rels.col_vec(j));

            for yi in y.iter().skip(rk) {
                assert!(yi.is_zero(), "relation outside the generated lattice");
            }

            (0..rk).map(|i| {
                let d = &s.d()[(i, i)];
                let (q, r) = y[i].div_rem_euc(d);
                assert!(r.is_zero(), "relation outside the generated lattice");
                q
            }).collect_vec()
        }).collect_vec();

        let e = Mat::from_fn((rk, rels.ncols()), |i, j| cols[j][i].clone());
        Self::from_presentation(e)
    }
}

impl<I> PartialEq for MarkedAbelianGroup<I>
where I: Integer, for<'x> &'x I: IntOps<I> {
    // Equality of presentations, not of isomorphism types.
    fn eq(&self, other: &Self) -> bool {
        self.m == other.m && self.n == other.n
    }
}

impl<I> Eq for MarkedAbelianGroup<I>
where I: Integer, for<'x> &'x I: IntOps<I> {}

pub(crate) fn group_symbol<I>(rank: usize, tors: &[I], dflt: &str) -> String
where I: Integer, for<'x> &'x I: IntOps<I> {
    if rank == 0 && tors.is_empty() {
        return dflt.to_string()
    }

    let mut res = vec![];

    if rank == 1 {
        res.push(String::from("Z"));
    } else if rank > 1 {
        res.push(format!("Z{}", superscript(rank as isize)));
    }

    for (t, c) in tors.iter().dedup_with_count().map(|(c, t)| (t, c)) {
        if c == 1 {
            res.push(format!("(Z/{t})"));
        } else {
            res.push(format!("(Z/{t}){}", superscript(c as isize)));
        }
    }

    res.join(" ⊕ ")
}

impl<I> Display for MarkedAbelianGroup<I>
where I: Integer, for<'x> &'x I: IntOps<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&group_symbol(self.rank, &self.tors, "0"))
    }
}

impl<I> Debug for MarkedAbelianGroup<I>
where I: Integer, for<'x> &'x I: IntOps<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}
