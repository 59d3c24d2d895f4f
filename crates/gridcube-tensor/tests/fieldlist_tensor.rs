//! Field-list tensors built from the canonical fixtures.
//!
//! Each test: fixture field list → `FieldListTensor::from_fieldlist` →
//! check coordinates, shapes, selected fields and materialized values.

use gridcube_core::{FieldList, Value};
use gridcube_tensor::{
    FieldListTensor, Indexer, Selector, Slice, Tensor, TensorError, TensorOptions,
};
use gridcube_test_utils::{
    cartesian_fields, cartesian_grid_fields, ds_date_level_param, ints, strs, VALUES_LEN,
};
use ndarray::IxDyn;

// ── Helpers ─────────────────────────────────────────────────────

type DictTensor = FieldListTensor<gridcube_core::DictFieldList>;

/// `date x levelist` tensor over the `t` fields of the 8-field fixture.
fn t_tensor() -> DictTensor {
    let ds = ds_date_level_param().sel(&[("param", Value::from("t"))]);
    FieldListTensor::from_fieldlist(&ds, &["date", "levelist"], TensorOptions::default())
        .unwrap()
}

fn values(t: &DictTensor, key: &str) -> Vec<Option<Value>> {
    t.source().metadata_all(key)
}

// ── Construction ────────────────────────────────────────────────

#[test]
fn date_level_scenario() {
    let t = t_tensor();
    assert_eq!(t.user_shape().as_slice(), &[2, 2]);
    assert_eq!(t.field_shape().as_slice(), &[VALUES_LEN]);
    assert_eq!(t.full_shape().as_slice(), &[2, 2, VALUES_LEN]);
    assert_eq!(
        t.user_coords().get("levelist").unwrap(),
        &[Value::from(850), Value::from(1000)]
    );
    assert_eq!(
        t.full_dims().keys().collect::<Vec<_>>(),
        vec!["date", "levelist", "values"]
    );

    let first = t.index(&[Indexer::Index(0), Indexer::Index(0)]).unwrap();
    assert_eq!(first.source().len(), 1);
    assert_eq!(first.source().metadata(0, "date"), Some(Value::from(20210101)));
    assert_eq!(first.source().metadata(0, "levelist"), Some(Value::from(850)));
    assert_eq!(first.source().metadata(0, "param"), Some(Value::from("t")));
    assert_eq!(first.user_shape().as_slice(), &[1, 1]);
}

#[test]
fn unsorted_input_is_sorted_by_dimension_keys() {
    let ds = ds_date_level_param().sel(&[("param", Value::from("t"))]);
    let reversed: Vec<usize> = (0..ds.len()).rev().collect();
    let shuffled = ds.select(&reversed);
    let t = FieldListTensor::from_fieldlist(
        &shuffled,
        &["date", "levelist"],
        TensorOptions::default(),
    )
    .unwrap();
    assert_eq!(t.to_array().unwrap(), t_tensor().to_array().unwrap());
}

#[test]
fn empty_field_list_rejected() {
    let ds = ds_date_level_param().sel(&[("param", Value::from("q"))]);
    let err =
        FieldListTensor::from_fieldlist(&ds, &["date"], TensorOptions::default()).unwrap_err();
    assert_eq!(err, TensorError::Field(gridcube_core::FieldError::EmptyFieldList));
}

#[test]
fn unsupported_key_suffix_rejected() {
    let ds = ds_date_level_param();
    let err = FieldListTensor::from_fieldlist(&ds, &["date", "levelist:x"], TensorOptions::default())
        .unwrap_err();
    assert_eq!(
        err,
        TensorError::Field(gridcube_core::FieldError::UnsupportedKeyType {
            key: "levelist:x".into(),
            suffix: "x".into(),
        })
    );
}

#[test]
fn no_dimensions_single_field() {
    let ds = ds_date_level_param().select(&[3]);
    let t = FieldListTensor::from_fieldlist(&ds, &[], TensorOptions::default()).unwrap();
    assert!(t.user_shape().is_empty());
    assert_eq!(t.to_array().unwrap().shape(), &[VALUES_LEN]);
}

#[test]
fn precomputed_coordinates_are_used() {
    let ds = ds_date_level_param().sel(&[("param", Value::from("t"))]);
    let coords = t_tensor().user_coords().clone();
    let options = TensorOptions {
        user_coords: Some(coords.clone()),
        ..Default::default()
    };
    let t = FieldListTensor::from_fieldlist(&ds, &["date", "levelist"], options).unwrap();
    assert_eq!(t.user_coords(), &coords);
}

// ── Materialization ─────────────────────────────────────────────

#[test]
fn to_array_reshapes_to_full_shape() {
    let t = t_tensor();
    let a = t.to_array().unwrap();
    assert_eq!(a.shape(), &[2, 2, VALUES_LEN]);
    // fixture field i holds i; t fields are the odd ones
    assert_eq!(a[IxDyn(&[0, 0, 0])], 1.0);
    assert_eq!(a[IxDyn(&[1, 1, 3])], 7.0);
}

#[test]
fn grid_fields_keep_their_grid() {
    let table = vec![
        ("date", ints(&[20210101, 20210102])),
        ("levelist", ints(&[850, 1000])),
    ];
    let ds = cartesian_grid_fields(&table, 3, 4);
    let t = FieldListTensor::from_fieldlist(&ds, &["date", "levelist"], TensorOptions::default())
        .unwrap();
    assert_eq!(t.full_shape().as_slice(), &[2, 2, 3, 4]);
    assert_eq!(
        t.field_grid().coords()["latitude"],
        vec![90.0, 0.0, -90.0]
    );
    assert_eq!(
        t.field_grid().coords()["longitude"],
        vec![0.0, 90.0, 180.0, 270.0]
    );
    let a = t.to_array().unwrap();
    assert_eq!(a[IxDyn(&[1, 0, 2, 3])], 211.0);

    let sub = t.sel(&[("levelist", Selector::from(1000))]).unwrap();
    assert_eq!(sub.full_shape().as_slice(), &[2, 1, 3, 4]);

    let flat = FieldListTensor::from_fieldlist(
        &ds,
        &["date", "levelist"],
        TensorOptions {
            flatten_values: true,
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(flat.full_shape().as_slice(), &[2, 2, 12]);
}

#[test]
fn to_array_at_selects_fields() {
    let t = t_tensor();
    let all = t.to_array_at(&[Indexer::all()]).unwrap();
    assert_eq!(all, t.to_array().unwrap());
    let a = t.to_array_at(&[Indexer::Index(1)]).unwrap();
    assert_eq!(a.shape(), &[1, 2, VALUES_LEN]);
    assert_eq!(a[IxDyn(&[0, 0, 0])], 5.0);
}

#[test]
fn copy_detaches_into_array_tensor() {
    let t = t_tensor();
    let c = t.copy().unwrap();
    assert_eq!(c.user_coords(), t.user_coords());
    assert_eq!(c.array(), &t.to_array().unwrap());

    let from_copy = c.index(&[Indexer::all(), Indexer::Index(1)]).unwrap();
    let from_fields = t.index(&[Indexer::all(), Indexer::Index(1)]).unwrap();
    assert_eq!(from_copy.array(), &from_fields.to_array().unwrap());
}

// ── Selection ───────────────────────────────────────────────────

#[test]
fn sel_and_isel_agree() {
    let t = t_tensor();
    let by_label = t.sel(&[("levelist", Selector::from(850))]).unwrap();
    let by_position = t.isel(&[("levelist", Indexer::Index(0))]).unwrap();
    assert_eq!(by_label.user_coords(), by_position.user_coords());
    assert_eq!(values(&by_label, "levelist"), values(&by_position, "levelist"));
    assert_eq!(values(&by_label, "date"), values(&by_position, "date"));
    assert_eq!(by_label.to_array().unwrap(), by_position.to_array().unwrap());
    assert_eq!(by_label.user_shape().as_slice(), &[2, 1]);
}

#[test]
fn sel_with_several_labels() {
    let t = t_tensor();
    let s = t
        .sel(&[(
            "date",
            Selector::from(vec![Value::from(20210102), Value::from(20210101)]),
        )])
        .unwrap();
    // membership keeps coordinate order
    assert_eq!(s.user_shape().as_slice(), &[2, 2]);
    assert_eq!(s.user_coords(), t.user_coords());
}

#[test]
fn sel_without_match_gives_empty_dimension() {
    let t = t_tensor();
    let s = t.sel(&[("levelist", Selector::from(500))]).unwrap();
    assert_eq!(s.user_shape().as_slice(), &[2, 0]);
    assert!(s.source().is_empty());
    assert_eq!(s.to_array().unwrap().len(), 0);
}

#[test]
fn slices_and_lists() {
    let t = t_tensor();
    let s = t
        .index(&[Indexer::from(Slice::FULL.step_by(-1)), Indexer::List(vec![1])])
        .unwrap();
    assert_eq!(
        values(&s, "date"),
        vec![Some(Value::from(20210102)), Some(Value::from(20210101))]
    );
    assert_eq!(
        s.user_coords().get("date").unwrap(),
        &[Value::from(20210102), Value::from(20210101)]
    );
    assert_eq!(values(&s, "levelist"), vec![Some(Value::from(1000)); 2]);
}

#[test]
fn trailing_ellipsis_is_ignored() {
    let t = t_tensor();
    let a = t.index(&[Indexer::Index(0), Indexer::Ellipsis]).unwrap();
    let b = t.index(&[Indexer::Index(0)]).unwrap();
    assert_eq!(a.user_coords(), b.user_coords());
}

#[test]
fn selection_errors() {
    let t = t_tensor();
    assert_eq!(
        t.index(&[Indexer::Index(0), Indexer::Index(0), Indexer::Index(0)])
            .unwrap_err(),
        TensorError::TooManyIndexers { got: 3, ndim: 2 }
    );
    assert_eq!(
        t.index(&[Indexer::Index(2)]).unwrap_err(),
        TensorError::IndexOutOfBounds {
            dim: "date".into(),
            index: 2,
            len: 2
        }
    );
    assert_eq!(
        t.sel(&[("number", Selector::from(1))]).unwrap_err(),
        TensorError::UnknownDimension {
            name: "number".into()
        }
    );
    assert_eq!(
        t.isel(&[("step", Indexer::Index(0))]).unwrap_err(),
        TensorError::UnknownDimension {
            name: "step".into()
        }
    );
}

// ── Valid datetime ──────────────────────────────────────────────

#[test]
fn valid_datetime_from_date_and_step() {
    let ds = cartesian_fields(&[
        ("param", strs(&["t"])),
        ("date", strs(&["20210101", "20210102"])),
        ("time", strs(&["1200"])),
        ("step", ints(&[0, 6])),
        ("levelist", ints(&[850, 1000])),
    ]);
    let t = FieldListTensor::from_fieldlist(
        &ds,
        &["date", "step", "levelist"],
        TensorOptions::default(),
    )
    .unwrap();
    let vd = t.valid_datetime().unwrap().unwrap();
    assert_eq!(vd.dims, vec!["date", "step"]);
    assert_eq!(vd.values.shape(), &[2, 2]);
    let text: Vec<String> = vd
        .values
        .iter()
        .map(|dt| dt.format("%Y-%m-%dT%H:%M").to_string())
        .collect();
    assert_eq!(
        text,
        vec![
            "2021-01-01T12:00",
            "2021-01-01T18:00",
            "2021-01-02T12:00",
            "2021-01-02T18:00"
        ]
    );
}

#[test]
fn valid_datetime_from_valid_time_dimension() {
    let ds = cartesian_fields(&[
        ("param", strs(&["t"])),
        ("date", strs(&["20210101"])),
        ("time", strs(&["0"])),
        ("step", ints(&[0, 6])),
    ]);
    let t = FieldListTensor::from_fieldlist(&ds, &["valid_time"], TensorOptions::default())
        .unwrap();
    let vd = t.valid_datetime().unwrap().unwrap();
    assert_eq!(vd.dims, vec!["valid_time"]);
    assert_eq!(vd.values.len(), 2);
}

#[test]
fn no_time_dimensions() {
    let ds = ds_date_level_param().sel(&[
        ("param", Value::from("t")),
        ("date", Value::from(20210101)),
    ]);
    let t =
        FieldListTensor::from_fieldlist(&ds, &["levelist"], TensorOptions::default()).unwrap();
    assert_eq!(t.valid_datetime().unwrap(), None);
}
