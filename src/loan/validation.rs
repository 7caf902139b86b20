//! Field validation for loan submissions
//!
//! A pure function over the submitted fields: no storage access, rules
//! checked in a fixed order, first violation returned. A zero numeric field
//! reads as missing; a negative one as out of range.

use chrono::NaiveDate;
use thiserror::Error;

use super::LoanSubmission;

/// A violated validation rule
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("full name required")]
    FullNameRequired,
    #[error("birth date required")]
    BirthDateRequired,
    #[error("birth date not valid date")]
    BirthDateNotValidDate,
    #[error("full address required")]
    FullAddressRequired,
    #[error("phone required")]
    PhoneRequired,
    #[error("phone min 10 characters")]
    PhoneMin10,
    #[error("phone max 15 characters")]
    PhoneMax15,
    #[error("phone should only contain numbers")]
    PhoneNotNumbers,
    #[error("experience year required")]
    ExpInYearRequired,
    #[error("experience year should be greater than zero")]
    ExpInYearNotPositive,
    #[error("active fields required")]
    ActiveFieldRequired,
    #[error("active fields should be greater than zero")]
    ActiveFieldNotPositive,
    #[error("sow seeds per cycle required")]
    SowSeedsPerCycleRequired,
    #[error("sow seeds per cycle should be greater than zero")]
    SowSeedsPerCycleNotPositive,
    #[error("needed fertilizer per cycle in kg required")]
    NeededFertilizerRequired,
    #[error("needed fertilizer per cycle in kg should be greater than zero")]
    NeededFertilizerNotPositive,
    #[error("estimated yield in kg required")]
    EstimatedYieldRequired,
    #[error("estimated yield in kg should be greater than zero")]
    EstimatedYieldNotPositive,
    #[error("estimated price of harvest per kg required")]
    EstimatedPriceRequired,
    #[error("estimated price of harvest per kg should be greater than zero")]
    EstimatedPriceNotPositive,
    #[error("harvest cycle in months required")]
    HarvestCycleRequired,
    #[error("harvest cycle in months should be greater than zero")]
    HarvestCycleNotPositive,
    #[error("loan application in idr required")]
    LoanIdrRequired,
    #[error("loan application in idr should be greater than zero")]
    LoanIdrNotPositive,
    #[error("business income per month required")]
    IncomePerMonthRequired,
    #[error("business income per month should be greater than zero")]
    IncomePerMonthNotPositive,
    #[error("business outcome per month required")]
    OutcomePerMonthRequired,
    #[error("business outcome per month should be greater than zero")]
    OutcomePerMonthNotPositive,
    #[error("id card reference required")]
    IdCardRequired,
}

fn check_positive(
    value: i64,
    required: ValidationError,
    not_positive: ValidationError,
) -> Result<(), ValidationError> {
    if value == 0 {
        return Err(required);
    }
    if value < 0 {
        return Err(not_positive);
    }
    Ok(())
}

/// Validate a candidate submission, returning the first violated rule
pub fn validate_submission(submission: &LoanSubmission) -> Result<(), ValidationError> {
    use ValidationError::*;

    if submission.full_name.is_empty() {
        return Err(FullNameRequired);
    }
    if submission.birth_date.is_empty() {
        return Err(BirthDateRequired);
    }
    if NaiveDate::parse_from_str(&submission.birth_date, "%Y-%m-%d").is_err() {
        return Err(BirthDateNotValidDate);
    }
    if submission.full_address.is_empty() {
        return Err(FullAddressRequired);
    }
    if submission.phone.is_empty() {
        return Err(PhoneRequired);
    }
    let phone_len = submission.phone.chars().count();
    if phone_len < 10 {
        return Err(PhoneMin10);
    }
    if phone_len > 15 {
        return Err(PhoneMax15);
    }
    if !submission.phone.chars().all(|c| c.is_ascii_digit()) {
        return Err(PhoneNotNumbers);
    }
    check_positive(submission.exp_in_year, ExpInYearRequired, ExpInYearNotPositive)?;
    check_positive(
        submission.active_field_number,
        ActiveFieldRequired,
        ActiveFieldNotPositive,
    )?;
    check_positive(
        submission.sow_seeds_per_cycle,
        SowSeedsPerCycleRequired,
        SowSeedsPerCycleNotPositive,
    )?;
    check_positive(
        submission.needed_fertilizer_per_cycle_in_kg,
        NeededFertilizerRequired,
        NeededFertilizerNotPositive,
    )?;
    check_positive(
        submission.estimated_yield_in_kg,
        EstimatedYieldRequired,
        EstimatedYieldNotPositive,
    )?;
    check_positive(
        submission.estimated_price_of_harvest_per_kg,
        EstimatedPriceRequired,
        EstimatedPriceNotPositive,
    )?;
    check_positive(
        submission.harvest_cycle_in_months,
        HarvestCycleRequired,
        HarvestCycleNotPositive,
    )?;
    check_positive(
        submission.loan_application_in_idr,
        LoanIdrRequired,
        LoanIdrNotPositive,
    )?;
    check_positive(
        submission.business_income_per_month_in_idr,
        IncomePerMonthRequired,
        IncomePerMonthNotPositive,
    )?;
    check_positive(
        submission.business_outcome_per_month_in_idr,
        OutcomePerMonthRequired,
        OutcomePerMonthNotPositive,
    )?;
    if submission.id_card_url.is_empty() {
        return Err(IdCardRequired);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_submission() -> LoanSubmission {
        LoanSubmission {
            is_private_field: false,
            exp_in_year: 3,
            active_field_number: 2,
            sow_seeds_per_cycle: 100,
            needed_fertilizer_per_cycle_in_kg: 50,
            estimated_yield_in_kg: 800,
            estimated_price_of_harvest_per_kg: 12_000,
            harvest_cycle_in_months: 4,
            loan_application_in_idr: 5_000_000,
            business_income_per_month_in_idr: 2_000_000,
            business_outcome_per_month_in_idr: 1_500_000,
            full_name: "Sri Rahayu".to_string(),
            birth_date: "1988-04-17".to_string(),
            full_address: "Jl. Raya Bogor KM 30".to_string(),
            phone: "081234567890".to_string(),
            other_business: String::new(),
            id_card_url: "file/id-card.jpg".to_string(),
        }
    }

    #[test]
    fn test_valid_submission_passes() {
        assert_eq!(validate_submission(&valid_submission()), Ok(()));
    }

    #[test]
    fn test_validation_is_pure_and_idempotent() {
        let submission = valid_submission();
        let first = validate_submission(&submission);
        let second = validate_submission(&submission);
        assert_eq!(first, second);
    }

    #[test]
    fn test_text_rules_in_order() {
        let mut submission = valid_submission();
        submission.full_name.clear();
        assert_eq!(
            validate_submission(&submission),
            Err(ValidationError::FullNameRequired)
        );

        let mut submission = valid_submission();
        submission.birth_date.clear();
        assert_eq!(
            validate_submission(&submission),
            Err(ValidationError::BirthDateRequired)
        );

        let mut submission = valid_submission();
        submission.birth_date = "17-04-1988".to_string();
        assert_eq!(
            validate_submission(&submission),
            Err(ValidationError::BirthDateNotValidDate)
        );

        let mut submission = valid_submission();
        submission.full_address.clear();
        assert_eq!(
            validate_submission(&submission),
            Err(ValidationError::FullAddressRequired)
        );
    }

    #[test]
    fn test_phone_rules() {
        let mut submission = valid_submission();
        submission.phone.clear();
        assert_eq!(
            validate_submission(&submission),
            Err(ValidationError::PhoneRequired)
        );

        let mut submission = valid_submission();
        submission.phone = "08123".to_string();
        assert_eq!(
            validate_submission(&submission),
            Err(ValidationError::PhoneMin10)
        );

        let mut submission = valid_submission();
        submission.phone = "0812345678901234".to_string();
        assert_eq!(
            validate_submission(&submission),
            Err(ValidationError::PhoneMax15)
        );

        let mut submission = valid_submission();
        submission.phone = "08123abc890".to_string();
        assert_eq!(
            validate_submission(&submission),
            Err(ValidationError::PhoneNotNumbers)
        );
    }

    #[test]
    fn test_zero_numeric_field_reads_as_missing() {
        let mut submission = valid_submission();
        submission.exp_in_year = 0;
        assert_eq!(
            validate_submission(&submission),
            Err(ValidationError::ExpInYearRequired)
        );

        let mut submission = valid_submission();
        submission.loan_application_in_idr = 0;
        assert_eq!(
            validate_submission(&submission),
            Err(ValidationError::LoanIdrRequired)
        );
    }

    #[test]
    fn test_negative_numeric_field_must_be_positive() {
        let mut submission = valid_submission();
        submission.estimated_yield_in_kg = -5;
        assert_eq!(
            validate_submission(&submission),
            Err(ValidationError::EstimatedYieldNotPositive)
        );

        let mut submission = valid_submission();
        submission.business_outcome_per_month_in_idr = -1;
        assert_eq!(
            validate_submission(&submission),
            Err(ValidationError::OutcomePerMonthNotPositive)
        );
    }

    #[test]
    fn test_numeric_rules_precede_id_card() {
        // Harvest cycle is checked before the id card reference.
        let mut submission = valid_submission();
        submission.harvest_cycle_in_months = 0;
        submission.id_card_url.clear();
        assert_eq!(
            validate_submission(&submission),
            Err(ValidationError::HarvestCycleRequired)
        );
    }

    #[test]
    fn test_id_card_reference_required() {
        let mut submission = valid_submission();
        submission.id_card_url.clear();
        assert_eq!(
            validate_submission(&submission),
            Err(ValidationError::IdCardRequired)
        );
    }

    #[test]
    fn test_minimal_positive_values_pass() {
        let mut submission = valid_submission();
        submission.exp_in_year = 1;
        submission.active_field_number = 1;
        submission.sow_seeds_per_cycle = 1;
        submission.needed_fertilizer_per_cycle_in_kg = 1;
        submission.estimated_yield_in_kg = 1;
        submission.estimated_price_of_harvest_per_kg = 1;
        submission.harvest_cycle_in_months = 1;
        submission.loan_application_in_idr = 1;
        submission.business_income_per_month_in_idr = 1;
        submission.business_outcome_per_month_in_idr = 1;
        assert_eq!(validate_submission(&submission), Ok(()));
    }
}
