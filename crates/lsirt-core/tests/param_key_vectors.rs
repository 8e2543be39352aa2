//! # Parameter Key Wire-Format Vectors
//!
//! Column names exactly as they appear in sampler draws tables, with the
//! key each must parse to. A change to either list is a change to the
//! `bracket-v1` wire format and must bump `PARAM_KEY_FORMAT`.

use lsirt_core::{ParamKey, PARAM_KEY_FORMAT};

const ACCEPTED: &[(&str, &str, usize, usize)] = &[
    ("xi[1,1]", "xi", 1, 1),
    ("xi[120,2]", "xi", 120, 2),
    ("zt_centered[3,2]", "zt_centered", 3, 2),
    ("zt_centered[40,10]", "zt_centered", 40, 10),
    ("gamma_raw[7,3]", "gamma_raw", 7, 3),
];

const REJECTED: &[&str] = &[
    "chain__",
    "draw__",
    "lp__",
    "sigma",
    "beta[3]",
    "xi.1.2",
    "xi[1,2,1]",
    "xi[ 1,2]",
    "xi[1,0]",
];

#[test]
fn format_version_is_pinned() {
    assert_eq!(PARAM_KEY_FORMAT, "bracket-v1");
}

#[test]
fn sampler_column_names_parse() {
    for (column, prefix, entity, dimension) in ACCEPTED {
        let key = ParamKey::parse(column).unwrap();
        assert_eq!(key.prefix(), *prefix, "prefix of {column}");
        assert_eq!(key.entity(), *entity, "entity of {column}");
        assert_eq!(key.dimension(), *dimension, "dimension of {column}");
        assert_eq!(key.column_name(), *column);
    }
}

#[test]
fn non_coordinate_columns_do_not_parse() {
    for column in REJECTED {
        assert!(ParamKey::parse(column).is_err(), "{column} parsed");
    }
}
