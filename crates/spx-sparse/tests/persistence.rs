//! Text dump/load through files and conversions to faer and sprs

use faer::Mat;
use spx_sparse::{SparseError, SparseMatrix};
use tempfile::TempDir;

fn jacobian_block() -> SparseMatrix {
    SparseMatrix::from_triplets(
        4,
        5,
        [
            (0, 0, 1.0),
            (0, 4, -0.1),
            (1, 1, 1.0 / 3.0),
            (2, 2, 0.0),
            (2, 3, 6.02e23),
            (3, 0, -2.5e-310),
        ],
    )
    .unwrap()
}

#[test]
fn save_and_load_roundtrip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("jacobian.spx");

    let a = jacobian_block();
    a.save(&path).unwrap();
    let b = SparseMatrix::load(&path).unwrap();

    assert_eq!(a, b);
    for (i, j, v) in a.triplets() {
        assert_eq!(b.get(i, j).unwrap().to_bits(), v.to_bits(), "entry ({i}, {j})");
    }
}

#[test]
fn load_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let err = SparseMatrix::load(&dir.path().join("absent.spx")).unwrap_err();
    assert!(matches!(err, SparseError::Io(_)));
}

#[test]
fn load_corrupt_file_reports_line() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.spx");
    std::fs::write(&path, "2 2\n1 0 1.0\n1 9 1.0\n").unwrap();
    match SparseMatrix::load(&path) {
        Err(SparseError::Parse { line, .. }) => assert_eq!(line, 3),
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn dense_roundtrip() {
    let a = jacobian_block();
    let dense = a.to_dense();
    assert_eq!(dense.nrows(), 4);
    assert_eq!(dense.ncols(), 5);
    assert_eq!(dense.read(0, 4), -0.1);

    // Thresholding drops the stored zero and the denormal
    let b = SparseMatrix::from_dense(&dense, 1e-300).unwrap();
    assert_eq!(b.nnz(), a.nnz() - 2);

    let identity = Mat::<f64>::from_fn(3, 3, |i, j| if i == j { 1.0 } else { 0.0 });
    let eye = SparseMatrix::from_dense(&identity, 0.0).unwrap();
    assert_eq!(eye.nnz(), 3);
    assert!((0..3).all(|i| eye.has_diag(i)));
}

#[test]
fn csmat_roundtrip() {
    let a = jacobian_block();
    let cs = a.to_csmat();
    assert_eq!(cs.shape(), (4, 5));
    assert_eq!(cs.nnz(), a.nnz());
    let b = SparseMatrix::from_csmat(&cs).unwrap();
    assert_eq!(a, b);

    let csc = cs.to_csc();
    let c = SparseMatrix::from_csmat(&csc).unwrap();
    assert_eq!(a, c);
}
