use cashflow_core::currency::ConversionTable;
use cashflow_core::errors::ForecastError;
use cashflow_core::forecast::{forecast, ForecastInput};
use cashflow_core::ledger::{
    Account, AccountKind, BillDirection, BillPayment, BillStatus, Frequency, Goal, LoanTerms,
    OverrideSet, PropertyCosts, RecurrenceRule, RuleKind, WeekendPolicy,
};
use chrono::NaiveDate;
use uuid::Uuid;

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

struct Fixture {
    accounts: Vec<Account>,
    rules: Vec<RecurrenceRule>,
    overrides: OverrideSet,
    bills: Vec<BillPayment>,
    goals: Vec<Goal>,
    rates: ConversionTable,
}

impl Fixture {
    fn new() -> Self {
        Self {
            accounts: Vec::new(),
            rules: Vec::new(),
            overrides: OverrideSet::new(),
            bills: Vec::new(),
            goals: Vec::new(),
            rates: ConversionTable::new("EUR"),
        }
    }

    fn input(&self, today: NaiveDate, horizon_end: NaiveDate) -> ForecastInput<'_> {
        ForecastInput {
            accounts: &self.accounts,
            rules: &self.rules,
            overrides: &self.overrides,
            loan_overrides: &[],
            bills: &self.bills,
            goals: &self.goals,
            transactions: &[],
            rates: &self.rates,
            today,
            horizon_end,
        }
    }
}

#[test]
fn single_expense_rule_finds_the_lowest_point() {
    let mut fixture = Fixture::new();
    let checking = Account::new("Checking", AccountKind::Checking, "EUR").with_balance(1000.0);
    let rule = RecurrenceRule::new(
        "Rent",
        checking.id,
        1500.0,
        RuleKind::Expense,
        "EUR",
        Frequency::Monthly,
        1,
        ymd(2025, 1, 5),
    )
    .unwrap();
    fixture.accounts.push(checking);
    fixture.rules.push(rule);

    let today = ymd(2025, 3, 1);
    let report = forecast(&fixture.input(today, ymd(2025, 3, 31))).unwrap();

    // First occurrence on or after today is 2025-03-05: 1000 - 1500.
    assert!(report.lowest.balance <= -500.0);
    assert_eq!(report.lowest.date, ymd(2025, 3, 5));
    assert_eq!(report.accounts[0].ending_balance, -500.0);
    assert!(report.rule_issues.is_empty());
}

#[test]
fn invalid_rule_is_isolated_from_other_accounts() {
    let mut fixture = Fixture::new();
    let healthy = Account::new("Checking", AccountKind::Checking, "EUR").with_balance(500.0);
    let broken = Account::new("Savings", AccountKind::Savings, "EUR").with_balance(100.0);

    let good_rule = RecurrenceRule::new(
        "Salary",
        healthy.id,
        1000.0,
        RuleKind::Income,
        "EUR",
        Frequency::Monthly,
        1,
        ymd(2025, 1, 1),
    )
    .unwrap();
    let mut bad_rule = RecurrenceRule::new(
        "Corrupt",
        broken.id,
        50.0,
        RuleKind::Expense,
        "EUR",
        Frequency::Monthly,
        1,
        ymd(2025, 1, 1),
    )
    .unwrap();
    bad_rule.interval = 0;
    let bad_id = bad_rule.id;

    fixture.accounts.push(healthy);
    fixture.accounts.push(broken);
    fixture.rules.push(good_rule);
    fixture.rules.push(bad_rule);

    let report = forecast(&fixture.input(ymd(2025, 1, 1), ymd(2025, 3, 31))).unwrap();

    assert_eq!(report.rule_issues.len(), 1);
    assert_eq!(report.rule_issues[0].rule_id, bad_id);
    assert!(matches!(
        report.rule_issues[0].error,
        ForecastError::InvalidRule { .. }
    ));
    // The healthy account still accrued its salary events.
    let healthy_projection = report
        .accounts
        .iter()
        .find(|p| p.starting_balance == 500.0)
        .unwrap();
    assert_eq!(healthy_projection.ending_balance, 3500.0);
    // The broken rule's account is untouched.
    let broken_projection = report
        .accounts
        .iter()
        .find(|p| p.starting_balance == 100.0)
        .unwrap();
    assert_eq!(broken_projection.ending_balance, 100.0);
}

#[test]
fn balances_and_events_normalize_to_the_base_currency() {
    let mut fixture = Fixture::new();
    fixture.rates.insert("USD", 0.9);
    let usd = Account::new("US account", AccountKind::Checking, "USD").with_balance(1000.0);
    let rule = RecurrenceRule::new(
        "US subscription",
        usd.id,
        100.0,
        RuleKind::Expense,
        "USD",
        Frequency::Monthly,
        1,
        ymd(2025, 1, 1),
    )
    .unwrap();
    fixture.accounts.push(usd);
    fixture.rules.push(rule);

    let report = forecast(&fixture.input(ymd(2025, 1, 1), ymd(2025, 2, 28))).unwrap();
    assert_eq!(report.base_currency, "EUR");
    assert_eq!(report.accounts[0].starting_balance, 900.0);
    assert_eq!(report.accounts[0].ending_balance, 720.0);
}

#[test]
fn missing_rate_for_a_rule_excludes_only_that_rule() {
    let mut fixture = Fixture::new();
    let checking = Account::new("Checking", AccountKind::Checking, "EUR").with_balance(100.0);
    let rule = RecurrenceRule::new(
        "GBP charge",
        checking.id,
        10.0,
        RuleKind::Expense,
        "GBP",
        Frequency::Monthly,
        1,
        ymd(2025, 1, 1),
    )
    .unwrap();
    fixture.accounts.push(checking);
    fixture.rules.push(rule);

    let report = forecast(&fixture.input(ymd(2025, 1, 1), ymd(2025, 3, 31))).unwrap();
    assert_eq!(report.accounts[0].ending_balance, 100.0);
    assert!(matches!(
        report.rule_issues[0].error,
        ForecastError::MissingConversionRate { .. }
    ));
}

#[test]
fn unpaid_bills_count_and_paid_bills_do_not() {
    let mut fixture = Fixture::new();
    let checking = Account::new("Checking", AccountKind::Checking, "EUR").with_balance(300.0);
    let mut paid = BillPayment::new(
        checking.id,
        "Old invoice",
        ymd(2025, 2, 10),
        120.0,
        BillDirection::Payment,
    );
    paid.status = BillStatus::Paid;
    let unpaid = BillPayment::new(
        checking.id,
        "Insurance",
        ymd(2025, 2, 20),
        80.0,
        BillDirection::Payment,
    );
    let deposit = BillPayment::new(
        checking.id,
        "Tax refund",
        ymd(2025, 3, 1),
        50.0,
        BillDirection::Deposit,
    );
    fixture.accounts.push(checking);
    fixture.bills.extend([paid, unpaid, deposit]);

    let report = forecast(&fixture.input(ymd(2025, 2, 1), ymd(2025, 3, 31))).unwrap();
    assert_eq!(report.accounts[0].ending_balance, 270.0);
}

#[test]
fn weekend_policy_shifts_settlement_without_drifting_the_cadence() {
    let mut fixture = Fixture::new();
    let checking = Account::new("Checking", AccountKind::Checking, "EUR").with_balance(0.0);
    // 2025-02-01 is a Saturday; the cadence stays on the 1st.
    let rule = RecurrenceRule::new(
        "Payday",
        checking.id,
        100.0,
        RuleKind::Income,
        "EUR",
        Frequency::Monthly,
        1,
        ymd(2025, 2, 1),
    )
    .unwrap()
    .with_weekend_policy(WeekendPolicy::NextBusinessDay);
    fixture.accounts.push(checking);
    fixture.rules.push(rule);

    let report = forecast(&fixture.input(ymd(2025, 2, 1), ymd(2025, 4, 30))).unwrap();
    let dates: Vec<NaiveDate> = report.accounts[0]
        .trajectory
        .iter()
        .skip(1)
        .map(|p| p.date)
        .collect();
    // February settles on Monday the 3rd; March 1 is again a Saturday and
    // settles on the 3rd; April stays on its cadence date.
    assert_eq!(dates, vec![ymd(2025, 2, 3), ymd(2025, 3, 3), ymd(2025, 4, 1)]);
}

#[test]
fn loan_and_property_obligations_enter_the_stream() {
    let mut fixture = Fixture::new();
    let checking = Account::new("Checking", AccountKind::Checking, "EUR").with_balance(5000.0);
    let loan = Account::new("Car loan", AccountKind::Loan, "EUR")
        .with_settlement_account(checking.id)
        .with_loan_terms(LoanTerms {
            principal: 2400.0,
            annual_rate: 0.0,
            term_months: 24,
            first_payment_date: ymd(2025, 1, 10),
            payment_day: None,
        });
    let rental = Account::new("Flat", AccountKind::Property, "EUR")
        .with_settlement_account(checking.id)
        .with_property_costs(PropertyCosts {
            tax: Some(150.0),
            insurance: None,
            hoa: None,
            frequency: Frequency::Monthly,
            first_due_date: ymd(2025, 1, 5),
            rental_income: Some(900.0),
        });
    let checking_id = checking.id;
    fixture.accounts.extend([checking, loan, rental]);

    let report = forecast(&fixture.input(ymd(2025, 1, 1), ymd(2025, 2, 28))).unwrap();
    let projection = report
        .accounts
        .iter()
        .find(|p| p.account_id == checking_id)
        .unwrap();
    // Two months of: -100 loan, -150 tax, +900 rent.
    assert_eq!(projection.ending_balance, 5000.0 + 2.0 * (900.0 - 150.0 - 100.0));
}

#[test]
fn goal_projection_tracks_the_linked_account() {
    let mut fixture = Fixture::new();
    let savings = Account::new("Savings", AccountKind::Savings, "EUR").with_balance(800.0);
    let rule = RecurrenceRule::new(
        "Monthly saving",
        savings.id,
        100.0,
        RuleKind::Income,
        "EUR",
        Frequency::Monthly,
        1,
        ymd(2025, 1, 1),
    )
    .unwrap();
    let goal = Goal::new("Emergency fund", 1000.0).with_linked_account(savings.id);
    fixture.accounts.push(savings);
    fixture.rules.push(rule);
    fixture.goals.push(goal);

    let report = forecast(&fixture.input(ymd(2025, 1, 1), ymd(2025, 3, 31))).unwrap();
    assert_eq!(report.goals.len(), 1);
    assert_eq!(report.goals[0].projected_balance, 1100.0);
    assert!(report.goals[0].attainable);
}

#[test]
fn missing_rate_for_an_account_balance_fails_the_call() {
    let mut fixture = Fixture::new();
    fixture
        .accounts
        .push(Account::new("CHF account", AccountKind::Checking, "CHF").with_balance(100.0));
    let err = forecast(&fixture.input(ymd(2025, 1, 1), ymd(2025, 3, 31))).unwrap_err();
    assert!(matches!(err, ForecastError::MissingConversionRate { .. }));
}

#[test]
fn combined_trajectory_starts_at_the_portfolio_total() {
    let mut fixture = Fixture::new();
    fixture
        .accounts
        .push(Account::new("A", AccountKind::Checking, "EUR").with_balance(250.0));
    fixture
        .accounts
        .push(Account::new("B", AccountKind::Savings, "EUR").with_balance(750.0));
    let report = forecast(&fixture.input(ymd(2025, 1, 1), ymd(2025, 1, 31))).unwrap();
    assert_eq!(report.combined[0].balance, 1000.0);
    assert_eq!(report.lowest.balance, 1000.0);
    assert_eq!(report.lowest.account_id, None);
}
