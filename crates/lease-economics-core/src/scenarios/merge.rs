use serde_json::Value;

use crate::deal::DealDefinition;
use crate::error::LeaseEconError;
use crate::LeaseEconResult;

/// Deep-merge `overrides` into `target` in place.
///
/// Objects merge key by key; arrays, primitives and explicit `null` replace
/// the target value wholesale.
pub fn deep_merge(target: &mut Value, overrides: &Value) {
    match (target, overrides) {
        (Value::Object(target), Value::Object(overrides)) => {
            for (key, value) in overrides {
                let slot = target.entry(key.clone()).or_insert(Value::Null);
                if slot.is_object() && value.is_object() {
                    deep_merge(slot, value);
                } else {
                    *slot = value.clone();
                }
            }
        }
        (target, overrides) => *target = overrides.clone(),
    }
}

/// Apply a partial deal to `base`, producing an independent deal.
///
/// The base is serialized, merged and deserialized back, so the result
/// shares nothing with it.
pub fn merge_scenario(base: &DealDefinition, overrides: &Value) -> LeaseEconResult<DealDefinition> {
    if !overrides.is_object() {
        return Err(LeaseEconError::InvalidInput {
            field: "overrides".into(),
            reason: "Scenario overrides must be a JSON object".into(),
        });
    }
    let mut merged = serde_json::to_value(base)?;
    deep_merge(&mut merged, overrides);
    Ok(serde_json::from_value(merged)?)
}

/// Nested override object setting a single dotted `path` to `value`.
pub fn override_at(path: &str, value: Value) -> Value {
    path.rsplit('.').fold(value, |inner, key| {
        let mut object = serde_json::Map::new();
        object.insert(key.to_string(), inner);
        Value::Object(object)
    })
}

/// Value at a dotted `path` inside a serialized deal.
pub(crate) fn value_at<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(root, |node, key| node.get(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deal::{AbatementConfig, KeyDates, RentRow};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn base() -> DealDefinition {
        DealDefinition {
            name: "Base".into(),
            rentable_area: dec!(1200),
            key_dates: KeyDates {
                commencement: NaiveDate::from_ymd_opt(2024, 1, 1),
                expiration: NaiveDate::from_ymd_opt(2028, 12, 31),
                ..Default::default()
            },
            base_rent_schedule: vec![
                RentRow {
                    start: None,
                    rent_psf: dec!(30),
                    escalation_pct: None,
                },
                RentRow {
                    start: NaiveDate::from_ymd_opt(2026, 1, 1),
                    rent_psf: dec!(33),
                    escalation_pct: None,
                },
            ],
            discount_rate: dec!(0.08),
            ..Default::default()
        }
    }

    #[test]
    fn test_nested_objects_merge_key_by_key() {
        let deal = base();
        let merged = merge_scenario(&deal, &json!({ "key_dates": { "expiration": "2029-12-31" } })).unwrap();
        assert_eq!(merged.key_dates.expiration, NaiveDate::from_ymd_opt(2029, 12, 31));
        assert_eq!(merged.key_dates.commencement, deal.key_dates.commencement);
        assert_eq!(merged.base_rent_schedule, deal.base_rent_schedule);
    }

    #[test]
    fn test_arrays_replace_entirely() {
        let merged = merge_scenario(&base(), &json!({ "base_rent_schedule": [{ "rent_psf": "28" }] })).unwrap();
        assert_eq!(merged.base_rent_schedule.len(), 1);
        assert_eq!(merged.base_rent_schedule[0].rent_psf, dec!(28));
    }

    #[test]
    fn test_tagged_config_override() {
        let merged = merge_scenario(
            &base(),
            &json!({ "concessions": { "abatement": { "type": "at_commencement", "months": 3 } } }),
        )
        .unwrap();
        assert_eq!(
            merged.concessions.abatement,
            AbatementConfig::AtCommencement {
                months: 3,
                includes_nnn: false
            }
        );
    }

    #[test]
    fn test_explicit_null_clears_optional_field() {
        let merged = merge_scenario(&base(), &json!({ "key_dates": { "expiration": null } })).unwrap();
        assert_eq!(merged.key_dates.expiration, None);
    }

    #[test]
    fn test_base_is_never_mutated() {
        let deal = base();
        let before = deal.clone();
        let _ = merge_scenario(&deal, &json!({ "rentable_area": 2000, "name": "Variant" })).unwrap();
        assert_eq!(deal, before);
    }

    #[test]
    fn test_non_object_override_rejected() {
        let err = merge_scenario(&base(), &json!([1, 2])).unwrap_err();
        assert!(matches!(err, LeaseEconError::InvalidInput { .. }));
    }

    #[test]
    fn test_bad_override_type_is_serialization_error() {
        let err = merge_scenario(&base(), &json!({ "rentable_area": "lots" })).unwrap_err();
        assert!(matches!(err, LeaseEconError::SerializationError(_)));
    }

    #[test]
    fn test_override_at_and_value_at() {
        let o = override_at("concessions.ti_allowance_psf", json!("45"));
        assert_eq!(o, json!({ "concessions": { "ti_allowance_psf": "45" } }));
        assert_eq!(value_at(&o, "concessions.ti_allowance_psf"), Some(&json!("45")));
        assert_eq!(value_at(&o, "concessions.missing"), None);
    }
}
