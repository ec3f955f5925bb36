#![cfg(feature = "ml")]

use std::path::PathBuf;
use std::sync::Arc;

use loan_eligibility_core::criteria::Criterion;
use loan_eligibility_core::ml::{ApprovalModel, ModelLoader};
use loan_eligibility_core::{
    normalize, ApplicantProfile, Decision, EligibilityEngine, EligibilityError, EmploymentType,
    EngineConfig, IncomeSource,
};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;

fn demo_path(file: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../demos")
        .join(file)
}

fn engine() -> EligibilityEngine {
    EligibilityEngine::new(EngineConfig::default()).unwrap()
}

fn demo_model() -> Arc<dyn ApprovalModel> {
    Arc::new(ModelLoader::new().load(demo_path("loan_model.json")).unwrap())
}

fn strong_applicant() -> ApplicantProfile {
    ApplicantProfile {
        bank_balance: dec!(100000),
        cibil_score: 820,
        loan_amount: dec!(400000),
        monthly_income: dec!(100000),
        loan_tenure_months: 24,
        existing_loans: false,
        emi_existing: Decimal::ZERO,
        age: 30,
        employment_type: EmploymentType::Permanent,
        income_source: IncomeSource::Salary,
    }
}

fn stretched_applicant() -> ApplicantProfile {
    ApplicantProfile {
        bank_balance: dec!(20000),
        cibil_score: 690,
        loan_amount: dec!(900000),
        monthly_income: dec!(15000),
        loan_tenure_months: 36,
        existing_loans: true,
        emi_existing: dec!(4000),
        age: 52,
        employment_type: EmploymentType::Other("Self-employed".into()),
        income_source: IncomeSource::Business,
    }
}

// ===========================================================================
// Worked example
// ===========================================================================

#[test]
fn test_strong_applicant_rule_only() {
    let result = engine().evaluate(&strong_applicant()).unwrap();

    // 40 + 25 + 20 + 10 + 5 + 5 = 105, clamped to 100
    assert_eq!(result.base_score, dec!(105));
    assert_eq!(result.eligibility_score, dec!(100));
    assert_eq!(result.status, Decision::Approved);
    assert_eq!(result.status_class, "success");
    assert_eq!(result.estimated_emi, dec!(18829.39));
    assert_eq!(result.emi_ratio, dec!(18.83));
    assert!(result.reasons.is_empty());
    assert!(result.ml_prediction.is_none());
    assert_eq!(
        result.recommendation,
        "Congratulations! Your loan application is approved."
    );

    let labels: Vec<&str> = result.criteria_scores.iter().map(|(_, l)| l).collect();
    assert_eq!(
        labels,
        vec!["Excellent", "Excellent", "Excellent", "Excellent", "Optimal", "Stable"]
    );
}

#[test]
fn test_raw_application_matches_typed_profile() {
    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(demo_path("application.json")).unwrap())
            .unwrap();
    let from_json = engine().evaluate_json(&raw).unwrap();
    let from_profile = engine().evaluate(&strong_applicant()).unwrap();
    assert_eq!(from_json, from_profile);
}

#[test]
fn test_evaluation_is_deterministic() {
    let engine = engine().with_model(demo_model());
    let first = engine.evaluate(&stretched_applicant()).unwrap();
    for _ in 0..5 {
        assert_eq!(engine.evaluate(&stretched_applicant()).unwrap(), first);
    }
}

// ===========================================================================
// Weak applicants
// ===========================================================================

#[test]
fn test_stretched_applicant_reasons_in_order() {
    let result = engine().evaluate(&stretched_applicant()).unwrap();

    // CIBIL Fair, income Good (900000 <= 15000 * 60), EMI very high,
    // balance Low (< 45000), age Acceptable, employment Variable
    assert_eq!(result.criteria_scores.get(Criterion::CibilScore), Some("Fair"));
    assert_eq!(result.criteria_scores.get(Criterion::IncomeAnalysis), Some("Good"));
    assert_eq!(result.criteria_scores.get(Criterion::EmiRatio), Some("Very High"));
    assert_eq!(result.criteria_scores.get(Criterion::BankBalance), Some("Low"));
    assert_eq!(result.criteria_scores.get(Criterion::AgeFactor), Some("Acceptable"));
    assert_eq!(result.criteria_scores.get(Criterion::Employment), Some("Variable"));

    // 15 + 20 + 0 + 0 + 3 + 0 = 38
    assert_eq!(result.eligibility_score, dec!(38));
    assert_eq!(result.status, Decision::Rejected);
    assert_eq!(result.status_class, "danger");
    assert_eq!(
        result.reasons,
        vec![
            "CIBIL score needs improvement".to_string(),
            "EMI to income ratio is too high".to_string(),
            "Insufficient bank balance for loan security".to_string(),
            "Employment type affects stability assessment".to_string(),
        ]
    );
}

#[test]
fn test_zero_income_is_domain_error() {
    let mut profile = strong_applicant();
    profile.monthly_income = Decimal::ZERO;
    let err = engine().evaluate(&profile).unwrap_err();
    assert!(err.is_domain());
    assert!(!err.is_validation());
}

#[test]
fn test_missing_field_is_validation_error() {
    let raw = json!({
        "bank_balance": 100000,
        "cibil_score": 820,
        "loan_amount": 400000,
        "loan_tenure": 24,
        "age": 30,
        "employment_type": "Permanent",
        "income_source": "Salary",
        "existing_loans": "No"
    });
    match engine().evaluate_json(&raw).unwrap_err() {
        EligibilityError::MissingField(field) => assert_eq!(field, "monthly_income"),
        other => panic!("Expected MissingField, got {other:?}"),
    }
}

#[test]
fn test_tenure_changes_emi_not_income_tier() {
    let mut short = strong_applicant();
    short.loan_tenure_months = 12;
    let result = engine().evaluate(&short).unwrap();
    // 400000 over 12 months at 1% per month
    assert_eq!(result.estimated_emi, dec!(35539.52));
    assert_eq!(result.criteria_scores.get(Criterion::IncomeAnalysis), Some("Excellent"));
    // 35.54% of income
    assert_eq!(result.criteria_scores.get(Criterion::EmiRatio), Some("Good"));
}

#[test]
fn test_oversized_inputs_are_domain_errors() {
    let raw = json!({
        "bank_balance": 100000,
        "cibil_score": 820,
        "loan_amount": 400000,
        "monthly_income": 100000,
        "loan_tenure": 24,
        "age": 30,
        "employment_type": "Permanent",
        "income_source": "Salary",
        "existing_loans": "No"
    });

    let mut long_tenure = raw.clone();
    long_tenure["loan_tenure"] = json!(10000);
    let err = engine().evaluate_json(&long_tenure).unwrap_err();
    assert!(err.is_domain());

    let mut huge_income = raw;
    huge_income["monthly_income"] = json!("70000000000000000000000000000");
    let err = engine().evaluate_json(&huge_income).unwrap_err();
    assert!(err.is_domain());
}

#[test]
fn test_longest_tenure_still_scores() {
    let mut profile = strong_applicant();
    profile.loan_tenure_months = 600;
    let result = engine().evaluate(&profile).unwrap();
    assert!(result.estimated_emi > dec!(4000));
    assert!(result.estimated_emi < dec!(4100));
}

// ===========================================================================
// Classifier adapter
// ===========================================================================

#[test]
fn test_demo_model_loads_and_scores() {
    let model = demo_model();
    assert_eq!(model.name(), "loan-approval-logit-v1");
    let features = model.encode(&strong_applicant()).unwrap();
    let prediction = model.predict(&features).unwrap();
    assert!(prediction.probability >= Decimal::ZERO && prediction.probability <= Decimal::ONE);
}

#[test]
fn test_model_cannot_demote_a_perfect_profile() {
    // Base 105: even a confident rejection removes at most 20 points
    let result = engine()
        .with_model(demo_model())
        .evaluate(&strong_applicant())
        .unwrap();
    assert!(result.eligibility_score >= dec!(85));
    assert_eq!(result.status, Decision::Approved);
    assert!(result.ml_prediction.is_some());
}

#[test]
fn test_adjustment_bounded_by_span() {
    let rule_only = engine().evaluate(&stretched_applicant()).unwrap();
    let fused = engine()
        .with_model(demo_model())
        .evaluate(&stretched_applicant())
        .unwrap();
    assert!((fused.eligibility_score - rule_only.eligibility_score).abs() <= dec!(20));
    assert_eq!(fused.base_score, rule_only.base_score);
}

#[test]
fn test_unencodable_applicant_falls_back_to_rules() {
    let mut profile = stretched_applicant();
    profile.income_source = IncomeSource::Other("Rental".into());

    let with_model = engine().with_model(demo_model());
    let fused = with_model.evaluate(&profile).unwrap();
    let rule_only = engine().evaluate(&profile).unwrap();

    assert!(fused.ml_prediction.is_none());
    assert_eq!(fused, rule_only);
    assert_eq!(fused.criteria_scores, rule_only.criteria_scores);

    let output = with_model.assess(&profile).unwrap();
    assert_eq!(output.warnings.len(), 1);
    assert!(output.warnings[0].starts_with("ML adjustment skipped"));
}

#[test]
fn test_engine_from_config_with_missing_model_is_rule_only() {
    let config = EngineConfig {
        model_path: Some(demo_path("does_not_exist.json")),
        ..EngineConfig::default()
    };
    let engine = EligibilityEngine::from_config(config).unwrap();
    assert!(engine.model_name().is_none());
    assert!(engine.evaluate(&strong_applicant()).is_ok());
}

#[test]
fn test_engine_from_config_loads_model() {
    let config = EngineConfig {
        model_path: Some(demo_path("loan_model.json")),
        ..EngineConfig::default()
    };
    let engine = EligibilityEngine::from_config(config).unwrap();
    assert_eq!(engine.model_name(), Some("loan-approval-logit-v1"));
}

// ===========================================================================
// Configuration
// ===========================================================================

#[test]
fn test_demo_config_parses() {
    let config = EngineConfig::from_file(demo_path("engine.yaml")).unwrap();
    assert_eq!(config.annual_interest_rate, dec!(0.12));
    assert_eq!(config.model_path, Some(PathBuf::from("demos/loan_model.json")));
}

#[test]
fn test_lower_rate_lowers_emi() {
    let config = EngineConfig {
        annual_interest_rate: dec!(0.09),
        ..EngineConfig::default()
    };
    let cheaper = EligibilityEngine::new(config)
        .unwrap()
        .evaluate(&strong_applicant())
        .unwrap();
    let standard = engine().evaluate(&strong_applicant()).unwrap();
    assert!(cheaper.estimated_emi < standard.estimated_emi);
    assert_eq!(cheaper.loan_details.estimated_interest_rate, dec!(9));
}

#[test]
fn test_shared_engine_across_threads() {
    let engine = Arc::new(engine().with_model(demo_model()));
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let engine = Arc::clone(&engine);
            std::thread::spawn(move || engine.evaluate(&strong_applicant()).unwrap())
        })
        .collect();
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(results.windows(2).all(|w| w[0] == w[1]));
}

#[test]
fn test_normalize_accepts_string_numbers() {
    let raw = json!({
        "bank_balance": "100000",
        "cibil_score": "820",
        "loan_amount": "400000",
        "monthly_income": "100000",
        "loan_tenure": "24",
        "age": "30",
        "employment_type": "permanent",
        "income_source": "salary",
        "existing_loans": false
    });
    assert_eq!(normalize(&raw).unwrap(), strong_applicant());
}
