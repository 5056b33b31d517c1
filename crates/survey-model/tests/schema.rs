//! Tests for survey schema validation.

use survey_model::{
    CategoricalVariable, CompletionFilter, FieldLayout, FieldSpec, MAX_IMPLIED_DECIMALS,
    NumericVariable, PopulationFilter, SchemaError, SurveySchema, UnmappedPolicy,
};

fn layout() -> FieldLayout {
    FieldLayout::new(vec![
        FieldSpec::new("_STATE", 0, 2),
        FieldSpec::new("DISPCODE", 2, 6),
        FieldSpec::new("PHYSHLTH", 6, 8),
        FieldSpec::new("_SEX", 8, 9),
    ])
    .expect("valid layout")
}

fn schema() -> SurveySchema {
    SurveySchema::new(
        "BRFSS",
        layout(),
        PopulationFilter::new("_STATE", "27"),
        CompletionFilter::new("DISPCODE", "1100"),
    )
    .with_numeric(NumericVariable::new("PHYSHLTH").with_sentinels(["77", "99"]))
    .with_categorical(
        CategoricalVariable::new("_SEX")
            .with_label("1", "Male")
            .with_label("2", "Female"),
    )
}

#[test]
fn valid_schema_passes() {
    let schema = schema();
    assert_eq!(schema.validate(), Ok(()));
    assert_eq!(schema.unmapped, UnmappedPolicy::Missing);
    assert_eq!(
        schema.output_columns(),
        vec![
            "_STATE",
            "DISPCODE",
            "PHYSHLTH",
            "_SEX",
            "PHYSHLTH_NUM",
            "_SEX_LABEL"
        ]
    );
    assert_eq!(
        schema.required_columns(),
        vec!["DISPCODE", "PHYSHLTH", "_SEX"]
    );
}

#[test]
fn population_field_must_exist() {
    let mut schema = schema();
    schema.population = PopulationFilter::new("_REGION", "27");
    assert!(matches!(
        schema.validate(),
        Err(SchemaError::UnknownField {
            role: "population",
            ..
        })
    ));
}

#[test]
fn empty_targets_are_rejected() {
    let schema = schema().with_population_target("");
    assert!(matches!(
        schema.validate(),
        Err(SchemaError::EmptyFilterValue { .. })
    ));
}

#[test]
fn filter_values_must_fill_their_field() {
    let schema = schema().with_population_target("5");
    assert_eq!(
        schema.validate(),
        Err(SchemaError::FilterWidthMismatch {
            role: "population target",
            field: "_STATE".to_string(),
            width: 2,
            value: "5".to_string(),
        })
    );

    let mut schema = crate::schema();
    schema.completion = CompletionFilter::new("DISPCODE", "11000");
    assert_eq!(
        schema.validate(),
        Err(SchemaError::FilterWidthMismatch {
            role: "completion code",
            field: "DISPCODE".to_string(),
            width: 4,
            value: "11000".to_string(),
        })
    );

    let padded = crate::schema().with_population_target(" 5");
    assert_eq!(padded.validate(), Ok(()));
}

#[test]
fn implied_decimals_are_bounded() {
    let mut schema = schema();
    schema.numeric[0] = NumericVariable::new("PHYSHLTH").with_implied_decimals(MAX_IMPLIED_DECIMALS);
    assert_eq!(schema.validate(), Ok(()));

    schema.numeric[0] = NumericVariable::new("PHYSHLTH").with_implied_decimals(u32::MAX);
    assert_eq!(
        schema.validate(),
        Err(SchemaError::ImpliedDecimalsOutOfRange {
            name: "PHYSHLTH".to_string(),
            places: u32::MAX,
        })
    );
}

#[test]
fn declared_variables_must_exist() {
    let schema = schema().with_numeric(NumericVariable::new("MENTHLTH"));
    assert_eq!(
        schema.validate(),
        Err(SchemaError::UnknownField {
            role: "numeric",
            name: "MENTHLTH".to_string(),
        })
    );
}

#[test]
fn variable_cannot_be_both_kinds() {
    let schema = schema().with_categorical(CategoricalVariable::new("PHYSHLTH").with_label("1", "One"));
    assert!(matches!(
        schema.validate(),
        Err(SchemaError::ConflictingKind { .. })
    ));
}

#[test]
fn duplicate_declarations_are_rejected() {
    let schema = schema().with_numeric(NumericVariable::new("PHYSHLTH"));
    assert!(matches!(
        schema.validate(),
        Err(SchemaError::DuplicateVariable { .. })
    ));
}

#[test]
fn empty_code_map_is_rejected() {
    let mut schema = schema();
    schema.categorical[0] = CategoricalVariable::new("_SEX");
    assert!(matches!(
        schema.validate(),
        Err(SchemaError::EmptyCodeMap { .. })
    ));
}

#[test]
fn substitution_cannot_be_sentinel() {
    let mut schema = schema();
    schema.numeric[0] = NumericVariable::new("PHYSHLTH")
        .with_sentinels(["77", "88"])
        .with_substitution("88", 0.0);
    assert_eq!(
        schema.validate(),
        Err(SchemaError::SentinelSubstitution {
            name: "PHYSHLTH".to_string(),
            code: "88".to_string(),
        })
    );
}

#[test]
fn derived_column_cannot_shadow_layout_field() {
    let layout = FieldLayout::new(vec![
        FieldSpec::new("_STATE", 0, 2),
        FieldSpec::new("DISPCODE", 2, 6),
        FieldSpec::new("_SEX", 6, 7),
        FieldSpec::new("_SEX_LABEL", 7, 8),
    ])
    .unwrap();
    let schema = SurveySchema::new(
        "BRFSS",
        layout,
        PopulationFilter::new("_STATE", "27"),
        CompletionFilter::new("DISPCODE", "1100"),
    )
    .with_categorical(CategoricalVariable::new("_SEX").with_label("1", "Male"));

    assert_eq!(
        schema.validate(),
        Err(SchemaError::DerivedNameCollision {
            name: "_SEX".to_string(),
            column: "_SEX_LABEL".to_string(),
        })
    );
}

#[test]
fn filters_compare_untrimmed_values() {
    let filter = PopulationFilter::new("_STATE", "27");
    assert!(filter.matches(Some("27")));
    assert!(!filter.matches(Some(" 27")));
    assert!(!filter.matches(Some("27 ")));
    assert!(!filter.matches(None));

    let completion = CompletionFilter::new("DISPCODE", "1100");
    assert!(completion.matches(Some("1100")));
    assert!(!completion.matches(Some("1200")));
}

#[test]
fn layout_deserializes_through_validation() {
    #[derive(serde::Deserialize)]
    struct Wrapper {
        fields: FieldLayout,
    }

    let ok: Wrapper = toml::from_str(
        r#"
        [[fields]]
        name = "SEQNO"
        start = 35
        end = 45

        [[fields]]
        name = "_PSU"
        start = 35
        end = 45
        alias_of = "SEQNO"
        "#,
    )
    .expect("aliased layout parses");
    assert_eq!(ok.fields.len(), 2);
    assert_eq!(ok.fields.get("_PSU").and_then(|f| f.alias_of.as_deref()), Some("SEQNO"));

    let bad = toml::from_str::<Wrapper>(
        r#"
        [[fields]]
        name = "A"
        start = 0
        end = 4

        [[fields]]
        name = "B"
        start = 3
        end = 5
        "#,
    );
    let message = bad.err().map(|err| err.to_string()).unwrap_or_default();
    assert!(message.contains("fields A and B overlap"), "{message}");
}

#[test]
fn unmapped_policy_serde_names() {
    let policy: UnmappedPolicy = serde_json::from_str("\"unrecognized\"").unwrap();
    assert_eq!(policy, UnmappedPolicy::Unrecognized);
    assert_eq!(
        serde_json::to_string(&UnmappedPolicy::Missing).unwrap(),
        "\"missing\""
    );
}
