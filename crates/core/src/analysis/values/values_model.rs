//! Typed attribute value maps.
//!
//! Each entity kind declares its attributes as a closed enum implementing
//! [`BucketAttr`]; a [`ValueMap`] is generic over that enum, so an
//! attribute outside the owning kind's set cannot even be expressed.
//! An absent attribute means "never happened" and reads as `None`,
//! which callers must distinguish from an explicit zero.

use chrono::NaiveDate;
use num_traits::Zero;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::hash::Hash;

/// The value type an attribute carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttrKind {
    Money,
    Units,
    Price,
    Rate,
    Date,
    Integer,
}

impl AttrKind {
    /// True for kinds backed by a decimal quantity.
    pub fn is_decimal(&self) -> bool {
        matches!(
            self,
            AttrKind::Money | AttrKind::Units | AttrKind::Price | AttrKind::Rate
        )
    }
}

/// One typed attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AttrValue {
    Money(Decimal),
    Units(Decimal),
    Price(Decimal),
    Rate(Decimal),
    Date(NaiveDate),
    Integer(i64),
}

impl AttrValue {
    pub fn kind(&self) -> AttrKind {
        match self {
            AttrValue::Money(_) => AttrKind::Money,
            AttrValue::Units(_) => AttrKind::Units,
            AttrValue::Price(_) => AttrKind::Price,
            AttrValue::Rate(_) => AttrKind::Rate,
            AttrValue::Date(_) => AttrKind::Date,
            AttrValue::Integer(_) => AttrKind::Integer,
        }
    }

    /// The decimal payload of a Money/Units/Price/Rate value.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            AttrValue::Money(v)
            | AttrValue::Units(v)
            | AttrValue::Price(v)
            | AttrValue::Rate(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            AttrValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            AttrValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Wraps a decimal in the value constructor for `kind`.
    ///
    /// Only meaningful for decimal kinds; flow attributes are always
    /// decimal-kind, which is what the rebasing arithmetic relies on.
    pub fn from_decimal(kind: AttrKind, value: Decimal) -> AttrValue {
        match kind {
            AttrKind::Money => AttrValue::Money(value),
            AttrKind::Units => AttrValue::Units(value),
            AttrKind::Price => AttrValue::Price(value),
            AttrKind::Rate => AttrValue::Rate(value),
            AttrKind::Date | AttrKind::Integer => {
                unreachable!("decimal arithmetic on a non-decimal attribute")
            }
        }
    }
}

/// The closed attribute set of one entity kind.
pub trait BucketAttr:
    Copy + Clone + Eq + Ord + Hash + Debug + Serialize + Send + Sync + 'static
{
    /// Every attribute of the kind, in declaration order.
    const ALL: &'static [Self];

    /// The value type this attribute carries.
    fn kind(self) -> AttrKind;

    /// Period-flow attributes are re-based and reset when deriving a
    /// ranged view; point-in-time attributes stay absolute. Flow
    /// attributes must be decimal-kind.
    fn is_flow(self) -> bool;
}

/// An ordered attribute -> value store for one entity at one point in
/// time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValueMap<A: BucketAttr> {
    values: BTreeMap<A, AttrValue>,
}

impl<A: BucketAttr> Default for ValueMap<A> {
    fn default() -> Self {
        ValueMap {
            values: BTreeMap::new(),
        }
    }
}

impl<A: BucketAttr> ValueMap<A> {
    pub fn new() -> Self {
        ValueMap::default()
    }

    /// Raw lookup; `None` means the attribute was never set.
    pub fn get(&self, attr: A) -> Option<AttrValue> {
        self.values.get(&attr).copied()
    }

    /// Typed decimal lookup for Money/Units/Price/Rate attributes.
    pub fn decimal(&self, attr: A) -> Option<Decimal> {
        self.get(attr).and_then(|v| v.as_decimal())
    }

    /// Decimal lookup treating "never set" as zero.
    pub fn decimal_or_zero(&self, attr: A) -> Decimal {
        self.decimal(attr).unwrap_or_else(Decimal::zero)
    }

    pub fn date(&self, attr: A) -> Option<NaiveDate> {
        self.get(attr).and_then(|v| v.as_date())
    }

    pub fn integer(&self, attr: A) -> Option<i64> {
        self.get(attr).and_then(|v| v.as_integer())
    }

    /// Unconditional overwrite. The value's type must match the
    /// attribute's declared kind.
    pub fn set(&mut self, attr: A, value: AttrValue) {
        debug_assert_eq!(value.kind(), attr.kind(), "attribute kind mismatch");
        self.values.insert(attr, value);
    }

    /// Sets a decimal attribute, wrapping in the attribute's kind.
    pub fn set_decimal(&mut self, attr: A, value: Decimal) {
        self.set(attr, AttrValue::from_decimal(attr.kind(), value));
    }

    pub fn set_date(&mut self, attr: A, value: NaiveDate) {
        self.set(attr, AttrValue::Date(value));
    }

    pub fn set_integer(&mut self, attr: A, value: i64) {
        self.set(attr, AttrValue::Integer(value));
    }

    /// Adds `delta` to a decimal attribute, materialising it from zero
    /// when absent.
    pub fn add_decimal(&mut self, attr: A, delta: Decimal) {
        let next = self.decimal_or_zero(attr) + delta;
        self.set_decimal(attr, next);
    }

    /// Subtracts `delta` from a decimal attribute.
    pub fn subtract_decimal(&mut self, attr: A, delta: Decimal) {
        let next = self.decimal_or_zero(attr) - delta;
        self.set_decimal(attr, next);
    }

    /// True when the attribute is unset or exactly zero.
    pub fn is_zero(&self, attr: A) -> bool {
        self.decimal(attr).map_or(true, |v| v.is_zero())
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// A deep, independent copy: mutating the snapshot never affects
    /// this map and vice versa.
    pub fn snapshot(&self) -> Self {
        self.clone()
    }

    /// Folds every decimal attribute present in `other` into this map.
    /// Used by totals production to sum child buckets into a parent.
    pub fn add_all(&mut self, other: &Self) {
        for &attr in A::ALL {
            if let Some(value) = other.decimal(attr) {
                self.add_decimal(attr, value);
            }
        }
    }

    /// Converts this map from absolute values into a period delta by
    /// subtracting the base's flow attributes attribute-by-attribute.
    /// Point-in-time attributes are left absolute.
    pub fn adjust_to_base_values(&mut self, base: &Self) {
        for &attr in A::ALL {
            if !attr.is_flow() {
                continue;
            }
            let own = self.decimal(attr);
            let other = base.decimal(attr);
            if own.is_none() && other.is_none() {
                continue;
            }
            self.set_decimal(
                attr,
                own.unwrap_or_default() - other.unwrap_or_default(),
            );
        }
    }

    /// Zeroes the flow attributes so this map can stand as the opening
    /// state of a new period. Point-in-time attributes are untouched.
    pub fn reset_base_values(&mut self) {
        for &attr in A::ALL {
            if attr.is_flow() && self.values.contains_key(&attr) {
                self.set_decimal(attr, Decimal::ZERO);
            }
        }
    }
}
