use log::info;
use toki::{MIdx, SparseGrid};
use toki_matrix::dense::Mat;
use toki_forms::{BilinearForm, MagHom, MarkedAbelianGroup, TorsionLinkingForm};

type G = MarkedAbelianGroup<i64>;
type B = BilinearForm<i64>;
type T = TorsionLinkingForm<i64>;

fn init_logger() {
    use toki::util::log::init_simple_logger;
    let _ = init_simple_logger(log::LevelFilter::Warn);
}

// H_1 of the lens space L(p, q) from a redundant two-generator chain
// complex: C_2 --N--> C_1 --M--> C_0 with relations (p, 0) and (1, 1),
// so the class of e_0 generates Z/p and e_1 ~ -e_0. The linking form is
// μ(g, g) = q/p, encoded as a rank-3 tensor in chain coordinates.
fn lens_space_form(p: i64, q: i64) -> B {
    let m = Mat::zero((1, 2));
    let n = Mat::from_data((2, 2), [
        p, 1,
        0, 1
    ]);
    let h1 = G::new(m, n);
    assert_eq!(h1.tors(), &[p]);

    let range = G::from_presentation(Mat::from_data((1, 1), [p]));

    // μ(e_i, e_j) = v_i v_j q / p with v = (1, -1).
    let v = [1, -1];
    let grid = SparseGrid::from_iter(
        (0..2).flat_map(|i| (0..2).map(move |j|
            (MIdx::from([i, j, 0]), v[i] * v[j] * q)
        ))
    );

    B::new(h1.clone(), h1, range, grid)
}

#[test]
fn lens_space_l41() {
    init_logger();

    let mu = lens_space_form(4, 1);
    assert!(mu.is_symmetric());

    let tlf = T::new(&mu, true);
    info!("L(4,1): {} / {}", tlf.rank_vector_string(), tlf.sigma_string());

    assert_eq!(tlf.rank_vector_string(), "2(0 1)");
    assert_eq!(tlf.sigma_string(), "1 inf");
    assert_eq!(tlf.legendre_string(), "no odd p-torsion");
    assert!(!tlf.is_split());
}

#[test]
fn lens_space_l31() {
    let mu = lens_space_form(3, 1);
    let tlf = T::new(&mu, true);

    assert_eq!(tlf.rank_vector_string(), "3(1)");
    assert_eq!(tlf.sigma_string(), "no 2-torsion");
    assert_eq!(tlf.legendre_string(), "3(1)");
    assert!(!tlf.is_split());
    assert!(!tlf.is_hyperbolic());
}

#[test]
fn connected_sum_is_hyperbolic() {
    // L(3,1) # L(3,2): the form ⟨1/3⟩ ⊕ ⟨2/3⟩ on (Z/3)² is hyperbolic.
    let h1 = G::from_presentation(Mat::from_data((2, 2), [3, 0, 0, 3]));
    let range = G::from_presentation(Mat::from_data((1, 1), [3]));

    let grid = SparseGrid::from_iter([
        (MIdx::from([0, 0, 0]), 1),
        (MIdx::from([1, 1, 0]), 2),
    ]);
    let mu = B::new(h1.clone(), h1, range, grid);
    let tlf = T::new(&mu, true);

    assert_eq!(tlf.rank_vector_string(), "3(2)");
    assert_eq!(tlf.legendre_string(), "3(-1)");
    assert!(tlf.is_split());
    assert!(tlf.is_hyperbolic());
}

#[test]
fn torus_intersection_form() {
    // H_1(T²) = Z² with the symplectic intersection pairing.
    let h1 = G::free(2);
    let grid = SparseGrid::from_iter([
        (MIdx::from([0, 1, 0]), 1),
        (MIdx::from([1, 0, 0]), -1),
    ]);
    let mu = B::new(h1.clone(), h1.clone(), G::free(1), grid);

    assert!(!mu.is_symmetric());
    assert!(mu.is_anti_symmetric());
    assert_eq!(mu.eval(&[1, 0], &[0, 1]), vec![1]);
    assert_eq!(mu.eval(&[0, 1], &[1, 0]), vec![-1]);

    // restricting along a degree-2 covering map scales the pairing.
    let f = MagHom::new(h1.clone(), h1.clone(), Mat::from_data((2, 2), [2, 0, 0, 1]));
    let pulled = mu.left_compose(&f);
    assert_eq!(pulled.eval(&[1, 0], &[0, 1]), vec![2]);
}

#[test]
fn k3_like_signature() {
    // the E8-free toy block diag(1, 1, 1, -1, -1): signature 1.
    let h2 = G::free(5);
    let grid = SparseGrid::from_iter(
        (0..5).map(|i| (MIdx::from([i, i, 0]), if i < 3 { 1 } else { -1 }))
    );
    let mu = B::new(h2.clone(), h2, G::free(1), grid);

    assert!(mu.is_symmetric());
    assert_eq!(mu.signature(), 1);
    assert_eq!(mu.z_form_type(), (true, 0));
    assert!(mu.left_adjoint().is_iso());
}
