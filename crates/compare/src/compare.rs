//! Recursive almost-equals comparison of runtime values.
//!
//! Dispatch at each node, first match wins:
//!
//! 1. different variants: "Types not equal", no recursion
//! 2. mappings: key sets must match, then recurse per key
//! 3. sets: exact set equality
//! 4. lists, tuples and byte strings: lengths must match, then recurse per index
//! 5. floats outside exact mode: NaN equals NaN, otherwise the isclose rule
//! 6. arrays and tables: compared through their encoded form
//! 7. anything else: `!=`
//!
//! Note the NaN asymmetry: in exact mode rule 7 applies and `NaN != NaN`.

use std::fmt;
use std::mem::discriminant;

use snappiershot_core::{Table, Value};

use crate::divergence::DivergenceSet;
use crate::path::{Accessor, OpPath};

/// Float tolerances for almost-equals comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub relative: f64,
    pub absolute: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Tolerances {
            relative: 0.001,
            absolute: 1e-6,
        }
    }
}

impl Tolerances {
    pub fn new(relative: f64, absolute: f64) -> Self {
        Tolerances { relative, absolute }
    }

    /// `|a - b| <= max(relative * max(|a|, |b|), absolute)`.
    ///
    /// Identical values are close; an infinity is close only to itself.
    /// NaN is never close to anything.
    pub fn is_close(&self, a: f64, b: f64) -> bool {
        if a == b {
            return true;
        }
        if a.is_infinite() || b.is_infinite() {
            return false;
        }
        let diff = (a - b).abs();
        diff <= self.relative * b.abs()
            || diff <= self.relative * a.abs()
            || diff <= self.absolute
    }
}

/// The outcome of comparing an actual value against an expected one.
///
/// The comparison runs in full on construction and never fails; any
/// inequality is recorded as a divergence.
#[derive(Debug, Clone)]
pub struct Comparison {
    divergences: DivergenceSet,
}

impl Comparison {
    pub fn new(actual: &Value, expected: &Value, tolerances: Tolerances, exact: bool) -> Self {
        let mut comparator = Comparator {
            tolerances,
            exact,
            path: OpPath::root(),
            divergences: DivergenceSet::new(),
        };
        comparator.compare(actual, expected);
        Comparison {
            divergences: comparator.divergences,
        }
    }

    /// True when no divergence was found.
    pub fn is_equal(&self) -> bool {
        self.divergences.is_empty()
    }

    pub fn divergences(&self) -> &DivergenceSet {
        &self.divergences
    }

    pub fn into_divergences(self) -> DivergenceSet {
        self.divergences
    }
}

struct Comparator {
    tolerances: Tolerances,
    exact: bool,
    path: OpPath,
    divergences: DivergenceSet,
}

impl Comparator {
    fn compare(&mut self, actual: &Value, expected: &Value) {
        if discriminant(actual) != discriminant(expected) {
            self.record(format!(
                "Types not equal: {} != {}",
                actual.type_name(),
                expected.type_name()
            ));
            return;
        }

        match (actual, expected) {
            (Value::Map(a), Value::Map(e)) => {
                if !a.same_keys(e) {
                    let missing = e.keys_missing_from(a);
                    let extra = a.keys_missing_from(e);
                    self.record(format!(
                        "Dictionary keys do not match. Missing: {}; Extra: {}",
                        SetRepr(missing.iter().map(|k| format!("{:?}", k))),
                        SetRepr(extra.iter().map(|k| format!("{:?}", k))),
                    ));
                    return;
                }
                for (key, a_item) in a.iter() {
                    if let Some(e_item) = e.get(key) {
                        self.descend(Accessor::Key(key.to_string()), a_item, e_item);
                    }
                }
            }
            (Value::Set(a), Value::Set(e)) => {
                if a != e {
                    let missing = e.difference(a);
                    let extra = a.difference(e);
                    self.record(format!(
                        "Sets do not match. Missing: {}; Extra: {}",
                        SetRepr(missing.iter()),
                        SetRepr(extra.iter()),
                    ));
                }
            }
            (Value::List(a), Value::List(e)) | (Value::Tuple(a), Value::Tuple(e)) => {
                if self.same_size(a.len(), e.len()) {
                    for (index, (a_item, e_item)) in a.iter().zip(e).enumerate() {
                        self.descend(Accessor::Index(index), a_item, e_item);
                    }
                }
            }
            (Value::Bytes(a), Value::Bytes(e)) => {
                if self.same_size(a.len(), e.len()) {
                    for (index, (a_byte, e_byte)) in a.iter().zip(e).enumerate() {
                        if a_byte != e_byte {
                            self.path.push(Accessor::Index(index));
                            self.record(format!("{} != {}", a_byte, e_byte));
                            self.path.pop();
                        }
                    }
                }
            }
            (Value::Float(a), Value::Float(e)) if !self.exact => {
                if a.is_nan() && e.is_nan() {
                    return;
                }
                if !self.tolerances.is_close(*a, *e) {
                    self.record(format!(
                        "Floats not almost equal ({:?} != {:?}). Relative tolerance: {:?} Absolute tolerance: {:?}",
                        a, e, self.tolerances.relative, self.tolerances.absolute
                    ));
                }
            }
            (Value::Array(a), Value::Array(e)) => {
                self.compare(&a.to_nested(), &e.to_nested());
            }
            (Value::Table(a), Value::Table(e)) => match (a, e) {
                (Table::Frame(_), Table::Frame(_)) | (Table::Series(_), Table::Series(_)) => {
                    self.compare(&a.to_mapping(), &e.to_mapping());
                }
                _ => self.record(format!(
                    "Types not equal: {} != {}",
                    table_kind(a),
                    table_kind(e)
                )),
            },
            _ => {
                if actual != expected {
                    self.record(format!("{} != {}", actual, expected));
                }
            }
        }
    }

    fn descend(&mut self, accessor: Accessor, actual: &Value, expected: &Value) {
        self.path.push(accessor);
        self.compare(actual, expected);
        self.path.pop();
    }

    fn same_size(&mut self, actual: usize, expected: usize) -> bool {
        if actual != expected {
            self.record(format!(
                "Collections do not have the same size: {} != {}",
                actual, expected
            ));
            return false;
        }
        true
    }

    fn record(&mut self, message: String) {
        self.divergences.add(self.path.clone(), message);
    }
}

fn table_kind(table: &Table) -> &'static str {
    match table {
        Table::Frame(_) => "DataFrame",
        Table::Series(_) => "Series",
    }
}

/// Renders items as `{a, b}`, or `set()` when empty.
struct SetRepr<I>(I);

impl<I> fmt::Display for SetRepr<I>
where
    I: Iterator + Clone,
    I::Item: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut items = self.0.clone().peekable();
        if items.peek().is_none() {
            return write!(f, "set()");
        }
        write!(f, "{{")?;
        for (i, item) in items.enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", item)?;
        }
        write!(f, "}}")
    }
}
