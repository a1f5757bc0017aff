//! End-to-end validation tests against the real endpoint schemas

use pvoutput_sdk::{
    registry, validate, Operation, ParamMap, ValidationContext, ValidationError, ALERT_TYPES,
};
use serde_json::{json, Value};

fn free_account() -> ValidationContext {
    ValidationContext::new(false)
}

fn donor_account() -> ValidationContext {
    ValidationContext::new(true)
}

mod add_status_tests {
    use super::*;

    #[test]
    fn test_requires_at_least_one_reading() {
        let schema = registry::schema(Operation::AddStatus);
        let mut data = ParamMap::from([("t".to_string(), json!("12:34"))]);
        let result = validate(&mut data, schema, &free_account());
        assert!(matches!(result, Err(ValidationError::MutualExclusion(keys)) if keys == "v1,v2,v3,v4"));

        for reading in ["v1", "v2", "v3", "v4"] {
            let mut data = ParamMap::from([
                ("t".to_string(), json!("12:34")),
                (reading.to_string(), json!(100)),
            ]);
            assert!(validate(&mut data, schema, &free_account()).is_ok());
        }
    }

    #[test]
    fn test_minimal_reading_gets_date_injected() {
        let schema = registry::schema(Operation::AddStatus);
        let mut data = ParamMap::from([
            ("v1".to_string(), json!(123)),
            ("t".to_string(), json!("12:34")),
        ]);
        assert!(validate(&mut data, schema, &donor_account()).is_ok());

        // the date default landed in the caller's mapping
        let date = data.get("d").and_then(Value::as_str).unwrap();
        assert_eq!(date.len(), 8);
        assert!(date.starts_with("20"));

        // validating again is a no-op on the already-defaulted mapping
        let snapshot = data.clone();
        assert!(validate(&mut data, schema, &donor_account()).is_ok());
        assert_eq!(data, snapshot);
    }

    #[test]
    fn test_donation_gated_field_rejected_for_free_account() {
        let schema = registry::schema(Operation::AddStatus);
        let mut data = ParamMap::from([
            ("v1".to_string(), json!(123)),
            ("t".to_string(), json!("12:34")),
            ("m1".to_string(), json!("test")),
        ]);
        assert!(matches!(
            validate(&mut data.clone(), schema, &free_account()),
            Err(ValidationError::DonationRequired(key)) if key == "m1"
        ));
        assert!(validate(&mut data, schema, &donor_account()).is_ok());
    }

    #[test]
    fn test_unknown_key_is_a_hard_error() {
        let schema = registry::schema(Operation::AddStatus);
        let mut data = ParamMap::from([
            ("v1".to_string(), json!(123)),
            ("t".to_string(), json!("12:34")),
            ("v99".to_string(), json!(0)),
        ]);
        assert!(matches!(
            validate(&mut data, schema, &free_account()),
            Err(ValidationError::UnknownField(key)) if key == "v99"
        ));
    }

    #[test]
    fn test_consumption_bound_and_cumulative_override() {
        let schema = registry::schema(Operation::AddStatus);

        // over the 200000 Wh bound
        let mut over = ParamMap::from([
            ("v3".to_string(), json!(250_000)),
            ("t".to_string(), json!("12:34")),
        ]);
        assert!(matches!(
            validate(&mut over, schema, &free_account()),
            Err(ValidationError::BoundViolation { key, .. }) if key == "v3"
        ));

        // any of the three flag values lifts the bound
        for flag in 1..=3 {
            let mut lifetime = ParamMap::from([
                ("v3".to_string(), json!(250_000)),
                ("c1".to_string(), json!(flag)),
                ("t".to_string(), json!("12:34")),
            ]);
            assert!(validate(&mut lifetime, schema, &free_account()).is_ok());
        }

        // 0 is not a recognised flag value
        let mut bad_flag = ParamMap::from([
            ("v3".to_string(), json!(250_000)),
            ("c1".to_string(), json!(0)),
            ("t".to_string(), json!("12:34")),
        ]);
        assert!(validate(&mut bad_flag, schema, &free_account()).is_err());
    }

    #[test]
    fn test_consumption_reading_must_be_numeric() {
        // the bound on v3 cannot be checked against a string, so the
        // value is rejected instead of slipping past the limit
        let schema = registry::schema(Operation::AddStatus);
        let mut data = ParamMap::from([
            ("v3".to_string(), json!("250000")),
            ("t".to_string(), json!("12:34")),
        ]);
        assert!(matches!(
            validate(&mut data, schema, &free_account()),
            Err(ValidationError::TypeMismatch { key, .. }) if key == "v3"
        ));
    }

    #[test]
    fn test_date_format() {
        let schema = registry::schema(Operation::AddStatus);
        for (date, ok) in [("20190515", true), ("19000515", false), ("201905150", false)] {
            let mut data = ParamMap::from([
                ("v1".to_string(), json!(1)),
                ("t".to_string(), json!("12:34")),
                ("d".to_string(), json!(date)),
            ]);
            let result = validate(&mut data, schema, &free_account());
            if ok {
                assert!(result.is_ok(), "{date} should validate");
            } else {
                assert!(
                    matches!(result, Err(ValidationError::FormatMismatch { .. })),
                    "{date} should fail the format check"
                );
            }
        }
    }

    #[test]
    fn test_time_format() {
        let schema = registry::schema(Operation::AddStatus);
        for (time, ok) in [("00:00", true), ("23:59", true), ("24:00", false), ("9:05", false)] {
            let mut data = ParamMap::from([
                ("v1".to_string(), json!(1)),
                ("t".to_string(), json!(time)),
            ]);
            assert_eq!(
                validate(&mut data, schema, &free_account()).is_ok(),
                ok,
                "time {time}"
            );
        }
    }

    #[test]
    fn test_message_length_limit() {
        let schema = registry::schema(Operation::AddStatus);
        let mut data = ParamMap::from([
            ("v1".to_string(), json!(1)),
            ("t".to_string(), json!("12:34")),
            ("m1".to_string(), json!("x".repeat(31))),
        ]);
        assert!(matches!(
            validate(&mut data, schema, &donor_account()),
            Err(ValidationError::LengthExceeded { maxlen: 30, .. })
        ));
    }
}

mod add_output_tests {
    use super::*;

    #[test]
    fn test_daily_summary_validates() {
        let schema = registry::schema(Operation::AddOutput);
        let mut data = ParamMap::from([
            ("g".to_string(), json!(12345)),
            ("cd".to_string(), json!("Partly Cloudy")),
            ("tm".to_string(), json!(8.5)),
            ("tx".to_string(), json!(21.5)),
        ]);
        assert!(validate(&mut data, schema, &free_account()).is_ok());
        // the date default landed
        assert!(data.contains_key("d"));
    }

    #[test]
    fn test_condition_must_be_a_known_value() {
        let schema = registry::schema(Operation::AddOutput);
        let mut data = ParamMap::from([("cd".to_string(), json!("Apocalyptic"))]);
        assert!(matches!(
            validate(&mut data, schema, &free_account()),
            Err(ValidationError::FormatMismatch { .. })
        ));
    }

    #[test]
    fn test_generated_must_be_integer() {
        let schema = registry::schema(Operation::AddOutput);
        let mut data = ParamMap::from([("g".to_string(), json!("lots"))]);
        assert!(matches!(
            validate(&mut data, schema, &free_account()),
            Err(ValidationError::TypeMismatch { .. })
        ));
    }
}

mod notification_tests {
    use super::*;

    #[test]
    fn test_every_listed_alert_type_is_accepted() {
        let schema = registry::schema(Operation::DeregisterNotification);
        for code in ALERT_TYPES.keys() {
            let mut data = ParamMap::from([
                ("appid".to_string(), json!("my.app.id")),
                ("alerttype".to_string(), json!(code)),
            ]);
            assert!(
                validate(&mut data, schema, &free_account()).is_ok(),
                "alert type {code} should be accepted"
            );
        }
    }

    #[test]
    fn test_unlisted_alert_type_is_rejected() {
        let schema = registry::schema(Operation::RegisterNotification);
        for code in [2, 7, 25, -1] {
            let mut data = ParamMap::from([
                ("appid".to_string(), json!("my.app.id")),
                ("url".to_string(), json!("http://example.com/api/")),
                ("alerttype".to_string(), json!(code)),
            ]);
            assert!(
                matches!(
                    validate(&mut data, schema, &free_account()),
                    Err(ValidationError::ChoiceViolation { .. })
                ),
                "alert type {code} should be rejected"
            );
        }
    }

    #[test]
    fn test_register_needs_a_url() {
        let schema = registry::schema(Operation::RegisterNotification);
        let mut data = ParamMap::from([
            ("appid".to_string(), json!("my.app.id")),
            ("alerttype".to_string(), json!(0)),
        ]);
        assert!(matches!(
            validate(&mut data, schema, &free_account()),
            Err(ValidationError::MissingRequiredField(key)) if key == "url"
        ));

        // deregister does not
        let mut data = ParamMap::from([
            ("appid".to_string(), json!("my.app.id")),
            ("alerttype".to_string(), json!(0)),
        ]);
        let schema = registry::schema(Operation::DeregisterNotification);
        assert!(validate(&mut data, schema, &free_account()).is_ok());
    }

    #[test]
    fn test_appid_and_url_length_limits() {
        let schema = registry::schema(Operation::RegisterNotification);

        let mut long_appid = ParamMap::from([
            ("appid".to_string(), json!("a".repeat(101))),
            ("url".to_string(), json!("http://example.com/")),
            ("alerttype".to_string(), json!(0)),
        ]);
        assert!(matches!(
            validate(&mut long_appid, schema, &free_account()),
            Err(ValidationError::LengthExceeded { maxlen: 100, .. })
        ));

        let mut long_url = ParamMap::from([
            ("appid".to_string(), json!("my.app.id")),
            ("url".to_string(), json!(format!("http://example.com/{}", "a".repeat(150)))),
            ("alerttype".to_string(), json!(0)),
        ]);
        assert!(matches!(
            validate(&mut long_url, schema, &free_account()),
            Err(ValidationError::LengthExceeded { maxlen: 150, .. })
        ));
    }
}
