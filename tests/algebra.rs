use exprarray::{Array, Config, Context, Reference, Routine, Trans, transpose};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

fn x() -> Array<f64, 1> { Array::new([3], [0.0, 1.0, 2.0]) }
fn y() -> Array<f64, 1> { Array::new([3], [3.0, 2.0, 1.0]) }

/// [[1, 2, 3], [4, 5, 6], [7, 8, 9]]
fn a() -> Array<f64, 2> { Array::from_fn([3, 3], |[i, j]| (3 * i + j + 1) as f64) }

/// [[-2, -3, -4], [-5, -6, -7], [-8, -9, -10]]
fn b() -> Array<f64, 2> { Array::from_fn([3, 3], |[i, j]| -((3 * i + j + 2) as f64)) }

fn random<const D: usize>(rng: &mut ChaCha20Rng, shape: [usize; D]) -> Array<f64, D> {
    Array::from_fn(shape, |_| rng.random_range(-1.0..1.0))
}

fn naive(a: &Array<f64, 2>, b: &Array<f64, 2>) -> Array<f64, 2> {
    assert_eq!(a.columns(), b.rows());
    Array::from_fn([a.rows(), b.columns()], |[i, j]| (0..a.columns()).map(|l| a[[i, l]] * b[[l, j]]).sum())
}

fn close<const D: usize>(a: &Array<f64, D>, b: &Array<f64, D>) -> bool {
    a.shape() == b.shape() && a.as_ref().iter().zip(b.as_ref()).all(|(p, q)| (p - q).abs() <= 1e-12)
}

fn traced() -> Context<Reference> { Context::init(Reference, Config {trace: true, ..Config::default()}) }

// ----------------------------------------------------------------------------

#[test]
fn vector_scenario() {
    let (x, y) = (x(), y());
    assert_eq!(Array::from(&x + &y).as_ref(), [3.0, 3.0, 3.0]);
    assert_eq!(Array::from(&x - &y).as_ref(), [-3.0, -1.0, 1.0]);
    assert_eq!(Array::from(2.0 * &x).as_ref(), [0.0, 2.0, 4.0]);
    assert_eq!(Array::from(2.0 * &x + &y).as_ref(), [3.0, 4.0, 5.0]);
    assert_eq!(Array::from(&x + 2.0 * &y).as_ref(), [6.0, 5.0, 4.0]);
    assert_eq!(Array::from((&x + 2.0 * &y) + &y).as_ref(), [9.0, 7.0, 5.0]);
    assert_eq!(Array::from(&y + (&x + 2.0 * &y)).as_ref(), [9.0, 7.0, 5.0]);
    assert_eq!(Array::from(2.0 * &x + 3.0 * &y).as_ref(), [9.0, 8.0, 7.0]);
    assert_eq!((transpose(&x) * &y).eval(), 4.0);
    assert_eq!((transpose(&x) * &y / (transpose(&x) * &x)).eval(), 0.8);
}

#[test]
fn outer_products() {
    let (x, y) = (x(), y());
    let expected: Array<f64, 2> = Array::from_fn([3, 3], |[i, j]| x[i] * y[j]);
    assert_eq!(Array::from(&x * transpose(&y)), expected);
    let twice = Array::from(2.0 * &expected);
    assert_eq!(Array::from(2.0 * &x * transpose(&y)), twice);
    assert_eq!(Array::from(&x * (2.0 * transpose(&y))), twice);
    let four = Array::from(4.0 * &expected);
    assert_eq!(Array::from(&x * (2.0 * (2.0 * transpose(&y)))), four);
    assert_eq!(Array::from(&x * ((transpose(&y) * 2.0) * 2.0)), four);
}

#[test]
fn matrix_scenario() {
    let a = a();
    let at = Array::from(transpose(&a));
    assert_eq!(at, Array::from_fn([3, 3], |[i, j]| a[[j, i]]));
    assert_eq!(Array::from(&a + &a), Array::from(2.0 * &a));
    assert_eq!(Array::from(&a + 2.0 * &a), Array::from(3.0 * &a));
    assert_eq!(Array::from(2.0 * &a + &a), Array::from(3.0 * &a));
    assert_eq!(Array::from(&a - &a), Array::zeros([3, 3]));
    assert_eq!(Array::from(&a - 2.0 * &a), Array::from(-&a));
    assert_eq!(Array::from(2.0 * &a - 2.0 * &a), Array::zeros([3, 3]));
    let aa = naive(&a, &a);
    assert_eq!(aa.as_ref()[..3], [30.0, 66.0, 102.0]);
    assert_eq!(Array::from(&a * &a), aa);
    assert_eq!(Array::from(&a * (2.0 * &a)), Array::from(2.0 * &aa));
    assert_eq!(Array::from((2.0 * &a) * &a), Array::from(2.0 * &aa));
    assert_eq!(Array::from((2.0 * &a) * (2.0 * &a)), Array::from(4.0 * &aa));
}

#[test]
fn matrix_vector_scenario() {
    let (a, x) = (a(), x());
    assert_eq!(Array::from(&a * &x).as_ref(), [8.0, 17.0, 26.0]);
    assert_eq!(Array::from(&a * (2.0 * &x)).as_ref(), [16.0, 34.0, 52.0]);
    assert_eq!(Array::from((2.0 * &a) * &x).as_ref(), [16.0, 34.0, 52.0]);
    assert_eq!(Array::from((2.0 * &a) * (3.0 * &x)).as_ref(), [48.0, 102.0, 156.0]);
    // A vector times a 1 x n matrix.
    let e: Array<f64, 2> = Array::new([1, 3], [-1.0, -4.0, -7.0]);
    let xe = Array::from(2.0 * &x * &e);
    assert_eq!(xe, Array::from_fn([3, 3], |[i, j]| 2.0 * x[i] * e[[0, j]]));
    // An m x 1 matrix times a transposed vector.
    let d: Array<f64, 2> = Array::new([3, 1], [0.0, 3.0, 6.0]);
    let dx = Array::from(2.0 * &d * transpose(&x));
    assert_eq!(dx.as_ref(), [0.0, 0.0, 0.0, 0.0, 6.0, 12.0, 0.0, 12.0, 24.0]);
}

#[test]
fn compound_assignment_scenario() {
    let (a, b) = (a(), b());
    let mut c = a.clone();
    c += &a;
    assert_eq!(c, Array::from(2.0 * &a));
    c += 2.0 * &a;
    assert_eq!(c, Array::from(4.0 * &a));
    c += 2.0 * &a * &b;
    assert_eq!(c[[0, 0]], -68.0);
    assert_eq!(c[[2, 2]], 36.0 - 348.0);
    c -= 2.0 * &a * &b;
    assert_eq!(c, Array::from(4.0 * &a));
    c -= 2.0 * &a;
    c -= &a;
    assert_eq!(c, a);
}

#[test]
fn transposed_operands() {
    // A is 5 x 3 and B is 3 x 5.
    let a: Array<f64, 2> = Array::from_fn([5, 3], |[i, j]| (3 * i + j + 1) as f64);
    let b: Array<f64, 2> = Array::from_fn([3, 5], |[j, i]| -((3 * i + j + 2) as f64));
    let c = self::a();
    let bt = Array::from(transpose(&b));
    let at = Array::from(transpose(&a));

    let btc = naive(&bt, &c);
    assert_eq!(btc.proxy(0).at(0).get(), -42.0);
    assert_eq!(Array::from(transpose(&b) * &c), btc);
    assert_eq!(Array::from(2.0 * transpose(&b) * &c), Array::from(2.0 * &btc));
    assert_eq!(Array::from(transpose(&b) * (2.0 * &c)), Array::from(2.0 * &btc));
    assert_eq!(Array::from((4.0 * transpose(&b)) * (0.5 * &c)), Array::from(2.0 * &btc));

    let cat = naive(&c, &at);
    assert_eq!(Array::from(&c * transpose(&a)), cat);
    assert_eq!(Array::from((2.0 * &c) * transpose(&a)), Array::from(2.0 * &cat));
    assert_eq!(Array::from(&c * (2.0 * transpose(&a))), Array::from(2.0 * &cat));
    assert_eq!(Array::from((4.0 * &c) * (0.5 * transpose(&a))), Array::from(2.0 * &cat));

    let btat = naive(&bt, &at);
    assert_eq!(btat.shape(), [5, 5]);
    assert_eq!(Array::from(transpose(&b) * transpose(&a)), btat);
    assert_eq!(Array::from((2.0 * transpose(&b)) * transpose(&a)), Array::from(2.0 * &btat));
    assert_eq!(Array::from(transpose(&b) * (2.0 * transpose(&a))), Array::from(2.0 * &btat));
    assert_eq!(Array::from((4.0 * transpose(&b)) * (0.5 * transpose(&a))), Array::from(2.0 * &btat));
}

// ----------------------------------------------------------------------------

#[test]
fn elementwise_properties() {
    let mut rng = ChaCha20Rng::seed_from_u64(0x42);
    for _ in 0..10 {
        let p = random(&mut rng, [4, 3]);
        let q = random(&mut rng, [4, 3]);
        let sum = Array::from(&p + &q);
        let difference = Array::from(&p - &q);
        for i in 0..4 {
            for j in 0..3 {
                assert_eq!(sum[[i, j]], p[[i, j]] + q[[i, j]]);
                assert_eq!(difference[[i, j]], p[[i, j]] - q[[i, j]]);
            }
        }
    }
}

#[test]
fn scalar_distributivity() {
    let mut rng = ChaCha20Rng::seed_from_u64(7);
    let alpha: f64 = rng.random_range(-3.0..3.0);
    let p = random(&mut rng, [5]);
    let q = random(&mut rng, [5]);
    let left = Array::from(alpha * (&p + &q));
    let right = Array::from(alpha * &p + alpha * &q);
    assert!(close(&left, &right));
}

#[test]
fn transpose_involution() {
    let mut rng = ChaCha20Rng::seed_from_u64(1);
    let p = random(&mut rng, [3, 5]);
    assert_eq!(Array::from(transpose(transpose(&p))), p);
    let pt = Array::from(transpose(&p));
    assert_eq!(pt.shape(), [5, 3]);
    assert_eq!(Array::from(transpose(&pt)), p);
}

#[test]
fn fusion_equivalence() {
    let mut rng = ChaCha20Rng::seed_from_u64(3);
    let p = random(&mut rng, [4, 6]);
    let q = random(&mut rng, [6, 5]);
    let c0 = random(&mut rng, [4, 5]);
    let alpha = 1.5;

    let ctx = traced();
    let mut fused = c0.clone();
    fused.add_assign_with(alpha * &p * &q, &ctx).unwrap();
    assert_eq!(ctx.routines(), [Routine::Gemm]);
    assert_eq!(ctx.calls()[0].beta, 1.0);

    // The same sum, one operation at a time.
    let product = Array::from(&p * &q);
    let unfused = Array::from(&c0 + alpha * &product);
    assert!(close(&fused, &unfused));
}

#[test]
fn fallback_products() {
    let mut rng = ChaCha20Rng::seed_from_u64(11);
    for (m, k, n) in [(1, 4, 3), (4, 1, 3), (3, 4, 1), (1, 1, 1), (5, 3, 2)] {
        let p = random(&mut rng, [m, k]);
        let q = random(&mut rng, [m, k]);
        let r = random(&mut rng, [k, n]);
        let x = random(&mut rng, [k]);
        let s = random(&mut rng, [m]);
        let sum = Array::from(&p + &q);

        assert!(close(&Array::from((&p + &q) * &r), &naive(&sum, &r)));

        let px: Array<f64, 1> = Array::from_fn([m], |[i]| (0..k).map(|l| sum[[i, l]] * x[l]).sum());
        assert!(close(&Array::from((&p + &q) * &x), &px));
        let row = transpose((&p + &q) * &x).eval();
        assert_eq!(row.shape(), [1, m]);
        assert!(close(&row, &Array::from_fn([1, m], |[_, j]| px[j])));

        let expected = Array::from_fn([m], |[i]| s[i] + px[i]);
        assert!(close(&Array::from(&s + (&p + &q) * &x), &expected));
        let mut c = s.clone();
        c += (&p + &q) * &x;
        assert!(close(&c, &expected));
    }
}

#[test]
fn one_row_product_transposed() {
    // [[1, 2, 3]]
    let e: Array<f64, 2> = Array::new([1, 3], [1.0, 2.0, 3.0]);
    let ones: Array<f64, 1> = Array::filled([3], 1.0);
    assert_eq!(Array::from((&e + &e) * &ones).as_ref(), [12.0]);
    let row = transpose((&e + &e) * &ones).eval();
    assert_eq!(row.shape(), [1, 1]);
    assert_eq!(row.as_ref(), [12.0]);
}

#[test]
fn dot_and_outer_patterns() {
    let mut rng = ChaCha20Rng::seed_from_u64(5);
    let p = random(&mut rng, [7]);
    let q = random(&mut rng, [4]);
    let dot = (transpose(&p) * &p).eval();
    assert!((dot - p.as_ref().iter().map(|v| v * v).sum::<f64>()).abs() <= 1e-12);
    let alpha = -0.5;
    let r = Array::from((alpha * &p) * transpose(&q));
    assert_eq!(r.shape(), [7, 4]);
    for i in 0..7 {
        for j in 0..4 {
            assert!((r[[i, j]] - alpha * p[i] * q[j]).abs() <= 1e-15);
        }
    }
}

// ----------------------------------------------------------------------------

#[test]
fn rule_selection() {
    let (a, b, x, y) = (a(), b(), x(), y());
    let ctx = traced();
    let routines = |run: &dyn Fn()| {
        ctx.clear();
        run();
        ctx.routines()
    };
    assert_eq!(routines(&|| { (2.0 * &x).eval_with(&ctx).unwrap(); }), [Routine::Scale]);
    assert_eq!(routines(&|| { (&x + &y).eval_with(&ctx).unwrap(); }), [Routine::Axpy]);
    assert_eq!(routines(&|| { (2.0 * &x - 3.0 * &y).eval_with(&ctx).unwrap(); }), [Routine::Scale, Routine::Axpy]);
    assert_eq!(routines(&|| { (x.t() * &y).eval_with(&ctx).unwrap(); }), [Routine::Dot]);
    assert_eq!(routines(&|| { (&x * y.t()).eval_with(&ctx).unwrap(); }), [Routine::Outer]);
    assert_eq!(routines(&|| { (&a * &x).eval_with(&ctx).unwrap(); }), [Routine::Gemv]);
    assert_eq!(routines(&|| { (x.t() * &a).eval_with(&ctx).unwrap(); }), [Routine::Gemv]);
    assert_eq!(routines(&|| { (&a * b.t()).eval_with(&ctx).unwrap(); }), [Routine::Gemm]);
    // No rule matches a sum times a vector, so the sum is computed first.
    assert_eq!(routines(&|| { ((&a + &b) * &x).eval_with(&ctx).unwrap(); }), [Routine::Axpy, Routine::Gemv]);
}

#[test]
fn transposes_reach_the_kernel() {
    let (a, b) = (a(), b());
    let ctx = traced();
    (a.t() * &b).eval_with(&ctx).unwrap();
    (4.0 * a.t() * (0.5 * b.t())).eval_with(&ctx).unwrap();
    let calls = ctx.calls();
    assert_eq!(calls[0].trans, [Trans::T, Trans::N]);
    assert_eq!(calls[1].trans, [Trans::T, Trans::T]);
    assert_eq!(calls[1].alpha, 2.0);
}

#[test]
fn fused_assignments() {
    let (a, x, y) = (a(), x(), y());
    let ctx = traced();
    let mut c = a.clone();
    c.add_assign_with(2.0 * &a, &ctx).unwrap();
    c.add_assign_with(&x * y.t(), &ctx).unwrap();
    c.sub_assign_with(&a * &a, &ctx).unwrap();
    let mut z = y.clone();
    z.add_assign_with(&a * &x, &ctx).unwrap();
    assert_eq!(ctx.routines(), [Routine::Axpy, Routine::Outer, Routine::Gemm, Routine::Gemv]);
    assert_eq!(z.as_ref(), [11.0, 19.0, 27.0]);
}

#[test]
fn mixed_element_types() {
    let narrow: Array<f32, 1> = Array::new([3], [0.5, 0.5, 0.5]);
    let wide = x();
    let sum: Array<f64, 1> = Array::from(&narrow + &wide);
    assert_eq!(sum.as_ref(), [0.5, 1.5, 2.5]);
    assert_eq!((transpose(&narrow) * &wide).eval(), 1.5);
    let mut acc = wide.clone();
    acc -= 2.0f32 * &narrow;
    assert_eq!(acc.as_ref(), [-1.0, 0.0, 1.0]);
}

#[test]
fn kernel_errors_are_values() {
    let x = x();
    let ctx = traced();
    ctx.teardown();
    let error = (x.t() * &x).eval_with(&ctx).unwrap_err();
    assert!(error.to_string().contains("torn down"));
}

#[test]
fn printing() {
    let (a, x, y) = (a(), x(), y());
    assert_eq!(format!("{}", &x + &y), "Array<1> (3)\n 3\n 3\n 3\n");
    assert_eq!(format!("{}", a), "Array<2> (3x3)\n 1 2 3\n 4 5 6\n 7 8 9\n");
    assert_eq!(format!("{}", transpose(&a)), "Array<2> (3x3)\n 1 4 7\n 2 5 8\n 3 6 9\n");
    assert_eq!(format!("{:.2}", transpose(&x) * &y), "4.00\n");
    assert_eq!(format!("{}", transpose(&y)), " 3 2 1\n");
}

// ----------------------------------------------------------------------------

#[test]
#[should_panic(expected = "Shape mismatch")]
fn adding_mismatched_matrices() {
    let p: Array<f64, 2> = Array::zeros([3, 3]);
    let q: Array<f64, 2> = Array::zeros([2, 2]);
    let _ = Array::from(&p + &q);
}

#[test]
#[should_panic(expected = "Shape mismatch")]
fn adding_column_to_row() {
    let p: Array<f64, 2> = Array::new([3, 1], [1.0, 2.0, 3.0]);
    let q: Array<f64, 2> = Array::new([1, 3], [10.0, 20.0, 30.0]);
    let _ = Array::from(&p + &q);
}

#[test]
#[should_panic(expected = "Shape mismatch")]
fn accumulating_row_into_column() {
    let q: Array<f64, 2> = Array::new([1, 3], [10.0, 20.0, 30.0]);
    let mut c: Array<f64, 2> = Array::zeros([3, 1]);
    c += &q;
}

#[test]
#[should_panic(expected = "Shape mismatch")]
fn multiplying_mismatched_matrices() {
    let p: Array<f64, 2> = Array::zeros([3, 2]);
    let _ = Array::from(&p * &p);
}

#[test]
#[should_panic(expected = "out of bounds")]
fn index_out_of_bounds() {
    let a = a();
    let _ = a[[3, 0]];
}
