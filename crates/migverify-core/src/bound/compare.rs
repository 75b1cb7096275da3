use crate::bound::{BoundValue, EncodedDocument, Number, exact::cmp_exact, rank::element_rank};
use bson::{Bson, Document};
use std::cmp::Ordering;

/// 2^63 as f64; the first double above every i64.
const I64_UPPER_F64: f64 = 9_223_372_036_854_775_808.0;

/// Total canonical comparator for partition bounds.
///
/// Ordering rules:
/// 1. Canonical variant rank (MinKey lowest, MaxKey highest)
/// 2. Variant-specific comparison for same-ranked values
///
/// Values of different kinds never compare equal, so a range built from two
/// bounds of different kinds still admits everything ranked between them.
#[must_use]
pub fn canonical_cmp(left: &BoundValue, right: &BoundValue) -> Ordering {
    let rank = left.canonical_rank().cmp(&right.canonical_rank());
    if rank != Ordering::Equal {
        return rank;
    }

    canonical_cmp_same_rank(left, right)
}

fn canonical_cmp_same_rank(left: &BoundValue, right: &BoundValue) -> Ordering {
    #[allow(clippy::match_same_arms)]
    match (left, right) {
        (BoundValue::MinKey, BoundValue::MinKey)
        | (BoundValue::Null, BoundValue::Null)
        | (BoundValue::MaxKey, BoundValue::MaxKey) => Ordering::Equal,
        (BoundValue::Number(a), BoundValue::Number(b)) => cmp_numbers(*a, *b),
        (BoundValue::Text(a), BoundValue::Text(b)) => a.cmp(b),
        (BoundValue::Document(a), BoundValue::Document(b)) => cmp_encoded_documents(a, b),
        (
            BoundValue::Binary {
                subtype: left_subtype,
                bytes: left_bytes,
            },
            BoundValue::Binary {
                subtype: right_subtype,
                bytes: right_bytes,
            },
        ) => cmp_binary(*left_subtype, left_bytes, *right_subtype, right_bytes),
        (BoundValue::ObjectId(a), BoundValue::ObjectId(b)) => a.cmp(b),
        (BoundValue::Bool(a), BoundValue::Bool(b)) => a.cmp(b),
        (BoundValue::DateTime(a), BoundValue::DateTime(b)) => a.cmp(b),
        (
            BoundValue::Timestamp {
                time: left_time,
                increment: left_increment,
            },
            BoundValue::Timestamp {
                time: right_time,
                increment: right_increment,
            },
        ) => (left_time, left_increment).cmp(&(right_time, right_increment)),
        _ => Ordering::Equal,
    }
}

/// Numeric comparison across integer widths, doubles and decimal128.
///
/// Integers compare exactly against doubles (no lossy widening), and any
/// pair involving a decimal128 compares exactly on the decoded value. NaN
/// orders below every other number and equals itself.
#[must_use]
pub(crate) fn cmp_numbers(left: Number, right: Number) -> Ordering {
    match (left, right) {
        (Number::Decimal128(_), _) | (_, Number::Decimal128(_)) => cmp_exact(left, right),
        (Number::Double(a), Number::Double(b)) => cmp_doubles(a, b),
        (Number::Double(a), Number::Int32(b)) => cmp_int_double(i64::from(b), a).reverse(),
        (Number::Double(a), Number::Int64(b)) => cmp_int_double(b, a).reverse(),
        (Number::Int32(a), Number::Double(b)) => cmp_int_double(i64::from(a), b),
        (Number::Int64(a), Number::Double(b)) => cmp_int_double(a, b),
        _ => left.integral().cmp(&right.integral()),
    }
}

fn cmp_doubles(left: f64, right: f64) -> Ordering {
    match (left.is_nan(), right.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => left.partial_cmp(&right).unwrap_or(Ordering::Equal),
    }
}

fn cmp_int_double(int: i64, double: f64) -> Ordering {
    if double.is_nan() {
        return Ordering::Greater;
    }
    if double >= I64_UPPER_F64 {
        return Ordering::Less;
    }
    if double < -I64_UPPER_F64 {
        return Ordering::Greater;
    }

    let truncated = double.trunc();
    // In range after the checks above.
    #[allow(clippy::cast_possible_truncation)]
    let whole = truncated as i64;

    match int.cmp(&whole) {
        Ordering::Equal => 0.0_f64
            .partial_cmp(&(double - truncated))
            .unwrap_or(Ordering::Equal),
        other => other,
    }
}

// Binary values order by length first, then subtype, then content.
fn cmp_binary(left_subtype: u8, left: &[u8], right_subtype: u8, right: &[u8]) -> Ordering {
    left.len()
        .cmp(&right.len())
        .then(left_subtype.cmp(&right_subtype))
        .then_with(|| left.cmp(right))
}

fn cmp_encoded_documents(left: &EncodedDocument, right: &EncodedDocument) -> Ordering {
    match (left.decode(), right.decode()) {
        (Ok(left), Ok(right)) => cmp_documents(&left, &right),
        // Encoded documents are validated on construction; keep the order total anyway.
        _ => left.as_bytes().cmp(right.as_bytes()),
    }
}

/// Structural document comparison: element by element, comparing the
/// element kind rank, then the field name, then the element value. A
/// document that is a strict prefix of another orders first.
#[must_use]
pub(crate) fn cmp_documents(left: &Document, right: &Document) -> Ordering {
    for ((left_key, left_value), (right_key, right_value)) in left.iter().zip(right.iter()) {
        let rank = element_rank(left_value).cmp(&element_rank(right_value));
        if rank != Ordering::Equal {
            return rank;
        }

        let key = left_key.cmp(right_key);
        if key != Ordering::Equal {
            return key;
        }

        let value = cmp_elements(left_value, right_value);
        if value != Ordering::Equal {
            return value;
        }
    }

    left.len().cmp(&right.len())
}

fn cmp_arrays(left: &[Bson], right: &[Bson]) -> Ordering {
    for (left, right) in left.iter().zip(right.iter()) {
        let cmp = cmp_elements(left, right);
        if cmp != Ordering::Equal {
            return cmp;
        }
    }

    left.len().cmp(&right.len())
}

/// Total comparator over arbitrary BSON elements nested in document bounds.
#[must_use]
pub(crate) fn cmp_elements(left: &Bson, right: &Bson) -> Ordering {
    let rank = element_rank(left).cmp(&element_rank(right));
    if rank != Ordering::Equal {
        return rank;
    }

    #[allow(clippy::match_same_arms)]
    match (left, right) {
        (Bson::String(a) | Bson::Symbol(a), Bson::String(b) | Bson::Symbol(b)) => a.cmp(b),
        (Bson::Document(a), Bson::Document(b)) => cmp_documents(a, b),
        (Bson::Array(a), Bson::Array(b)) => cmp_arrays(a, b),
        (Bson::Binary(a), Bson::Binary(b)) => {
            cmp_binary(u8::from(a.subtype), &a.bytes, u8::from(b.subtype), &b.bytes)
        }
        (Bson::ObjectId(a), Bson::ObjectId(b)) => a.bytes().cmp(&b.bytes()),
        (Bson::Boolean(a), Bson::Boolean(b)) => a.cmp(b),
        (Bson::DateTime(a), Bson::DateTime(b)) => a.timestamp_millis().cmp(&b.timestamp_millis()),
        (Bson::Timestamp(a), Bson::Timestamp(b)) => {
            (a.time, a.increment).cmp(&(b.time, b.increment))
        }
        (Bson::RegularExpression(a), Bson::RegularExpression(b)) => a
            .pattern
            .cmp(&b.pattern)
            .then_with(|| a.options.cmp(&b.options)),
        (Bson::JavaScriptCode(a), Bson::JavaScriptCode(b)) => a.cmp(b),
        (Bson::JavaScriptCodeWithScope(a), Bson::JavaScriptCodeWithScope(b)) => a
            .code
            .cmp(&b.code)
            .then_with(|| cmp_documents(&a.scope, &b.scope)),
        _ => match (Number::from_bson(left), Number::from_bson(right)) {
            (Some(a), Some(b)) => cmp_numbers(a, b),
            _ => Ordering::Equal,
        },
    }
}
