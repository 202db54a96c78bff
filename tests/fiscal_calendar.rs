use time::macros::date;
use vendorpull::fiscal::{FiscalPeriod, dates_in_range, period_for_date, periods_for_range};

#[test]
fn range_is_inclusive_ordered_and_gapless() {
    let dates = dates_in_range(date!(2024 - 02 - 27), date!(2024 - 03 - 02)).unwrap();
    assert_eq!(dates.len(), 5);
    assert_eq!(dates.first().copied(), Some(date!(2024 - 02 - 27)));
    assert_eq!(dates.last().copied(), Some(date!(2024 - 03 - 02)));
    for pair in dates.windows(2) {
        assert_eq!(pair[0].next_day(), Some(pair[1]));
    }
}

#[test]
fn single_day_range_is_valid() {
    let dates = dates_in_range(date!(2024 - 06 - 01), date!(2024 - 06 - 01)).unwrap();
    assert_eq!(dates.len(), 1);
}

#[test]
fn inverted_range_is_rejected() {
    assert!(dates_in_range(date!(2024 - 06 - 02), date!(2024 - 06 - 01)).is_err());
}

#[test]
fn tail_months_resolve_into_next_fiscal_year() {
    // With the default offset of 9, October opens the next fiscal year.
    let sep = period_for_date(2024, 2025, date!(2024 - 09 - 30), 9);
    let oct = period_for_date(2024, 2025, date!(2024 - 10 - 01), 9);
    assert_eq!(sep, FiscalPeriod { year: 2024, period: 12 });
    assert_eq!(oct, FiscalPeriod { year: 2025, period: 1 });
}

#[test]
fn periods_deduplicate_across_a_year_boundary() {
    let dates = dates_in_range(date!(2024 - 09 - 28), date!(2024 - 10 - 03)).unwrap();
    let periods = periods_for_range(2024, 2025, &dates, 9);
    assert_eq!(
        periods,
        vec![
            FiscalPeriod { year: 2024, period: 12 },
            FiscalPeriod { year: 2025, period: 1 },
        ]
    );
}

#[test]
fn identical_inputs_produce_identical_period_sets() {
    let dates = dates_in_range(date!(2024 - 01 - 10), date!(2024 - 03 - 20)).unwrap();
    let a = periods_for_range(2024, 2025, &dates, 9);
    let b = periods_for_range(2024, 2025, &dates, 9);
    assert_eq!(a, b);
    // January with offset 9 sits in period 4 of the current label.
    assert_eq!(a.first().copied(), Some(FiscalPeriod { year: 2024, period: 4 }));
}
